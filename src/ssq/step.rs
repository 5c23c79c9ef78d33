//! Step chunk decoding
//!
//! A step chunk holds `count` offsets, `count` step bytes, and after
//! aligning to two bytes a table of extension records. Every zero step byte
//! (except the last) owns the next extension record in file order; a record
//! of type [`extension::RELEASE`] turns that zero byte into the release
//! point of a hold on the lane it names.
//!
//! Decoding runs in two stages: [`RawSteps::decode`] reads the arrays as
//! stored, [`StepTrack::resolve`] pairs zero bytes with their extension
//! records and computes hold lengths.

use super::chunk::Chunk;
use super::reader::SsqReader;
use crate::chart::{Lane, LaneSet};
use crate::error::{Error, Result};
use crate::timeline::ticks_between;
use serde::Serialize;

/// Extension record types
pub mod extension {
    /// The zero byte releases a hold
    pub const RELEASE: u8 = 0x01;
}

/// Auxiliary record attached to a zero step byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExtensionRecord {
    pub lane_bit: u8,
    pub kind: u8,
}

/// Step chunk arrays as stored on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSteps {
    pub offsets: Vec<u32>,
    pub states: Vec<u8>,
    /// Every complete extension record after the step bytes
    pub extensions: Vec<ExtensionRecord>,
    /// Payload position of the first extension record
    pub extensions_start: usize,
    context: String,
}

impl RawSteps {
    pub fn decode(chunk: &Chunk) -> Result<Self> {
        let count = chunk.count as usize;
        let mut reader = SsqReader::for_chunk(chunk);
        let offsets = reader.read_u32_array(count)?;
        let states = reader.read_bytes(count)?;

        // Extension records start on an even payload offset
        reader.align(2);
        let extensions_start = reader.position();
        let mut extensions = Vec::with_capacity(reader.remaining() / 2);
        while reader.remaining() >= 2 {
            let lane_bit = reader.read_u8()?;
            let kind = reader.read_u8()?;
            extensions.push(ExtensionRecord { lane_bit, kind });
        }

        log::debug!(
            "step chunk {:#06x}: {} steps, {} extension records",
            chunk.param,
            count,
            extensions.len()
        );

        Ok(Self {
            offsets,
            states,
            extensions,
            extensions_start,
            context: format!("extension records of {}", chunk.describe()),
        })
    }
}

/// Resolved meaning of one step byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LaneState {
    /// Step byte as stored; zero means no lane
    Raw(u8),
    /// Zero byte that releases a hold on this lane
    Release(Lane),
}

impl LaneState {
    /// Pressed lanes; a release marker presses nothing
    pub fn pressed(self) -> LaneSet {
        match self {
            LaneState::Raw(byte) => LaneSet::from_byte(byte),
            LaneState::Release(_) => LaneSet::EMPTY,
        }
    }

    /// Lanes a note is emitted on: the pressed lanes, or the lane of a
    /// release marker
    pub fn lanes(self) -> LaneSet {
        match self {
            LaneState::Raw(byte) => LaneSet::from_byte(byte),
            LaneState::Release(lane) => LaneSet::from(lane),
        }
    }

    pub fn released_lane(self) -> Option<Lane> {
        match self {
            LaneState::Release(lane) => Some(lane),
            LaneState::Raw(_) => None,
        }
    }

    /// Stored byte was zero
    pub fn is_zero(self) -> bool {
        matches!(self, LaneState::Raw(0) | LaneState::Release(_))
    }
}

/// One step position with its resolved state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepEvent {
    pub offset: u32,
    pub state: LaneState,
    /// Chart ticks to the next step when this step starts a hold, else 0
    pub hold_ticks: u32,
}

/// Resolved steps of one chart, in offset order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StepTrack {
    pub events: Vec<StepEvent>,
}

impl StepTrack {
    /// Decode and resolve a step chunk
    pub fn decode(chunk: &Chunk) -> Result<Self> {
        Self::resolve(&RawSteps::decode(chunk)?)
    }

    /// Pair zero bytes with extension records and compute hold lengths
    ///
    /// The last step is never a hold start nor a release target.
    pub fn resolve(raw: &RawSteps) -> Result<Self> {
        let len = raw.states.len();
        let mut states: Vec<LaneState> =
            raw.states.iter().map(|&b| LaneState::Raw(b)).collect();
        let mut hold_ticks = vec![0u32; len];
        let mut extensions = raw.extensions.iter();
        let mut consumed = 0usize;

        for i in 0..len.saturating_sub(1) {
            let byte = raw.states[i];
            if byte != 0 && raw.states[i + 1] == 0 {
                hold_ticks[i] = ticks_between(raw.offsets[i], raw.offsets[i + 1]);
            } else if byte == 0 {
                // Each zero step takes the next record, whatever its type
                let record = extensions.next().ok_or_else(|| Error::TruncatedRecord {
                    context: raw.context.clone(),
                    offset: raw.extensions_start + consumed * 2,
                    needed: 2,
                    available: 0,
                })?;
                consumed += 1;

                if record.kind == extension::RELEASE {
                    let lane = Lane::from_bit(record.lane_bit)
                        .ok_or(Error::InvalidReleaseLane {
                            index: i,
                            lane_bit: record.lane_bit,
                        })?;
                    states[i] = LaneState::Release(lane);
                }
            }
        }

        let events = raw
            .offsets
            .iter()
            .zip(states)
            .zip(hold_ticks)
            .map(|((&offset, state), hold_ticks)| StepEvent {
                offset,
                state,
                hold_ticks,
            })
            .collect();

        Ok(Self { events })
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Highest step offset
    pub fn last_offset(&self) -> Option<u32> {
        self.events.iter().map(|e| e.offset).max()
    }
}
