//! Tempo chunk decoding and BPM map construction

use super::chunk::Chunk;
use super::reader::SsqReader;
use crate::error::{Error, Result};
use crate::timeline::OFFSETS_PER_MEASURE;
use serde::Serialize;

/// Raw control points of a tempo chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TempoChunk {
    /// Chunk offsets of each control point
    pub offsets: Vec<u32>,
    /// Timer value at each control point
    pub ticks: Vec<u32>,
    /// Timer ticks per second
    pub timebase: u16,
}

impl TempoChunk {
    /// Decode the two parallel arrays of a tempo chunk
    pub fn decode(chunk: &Chunk) -> Result<Self> {
        let count = chunk.count as usize;
        let mut reader = SsqReader::for_chunk(chunk);
        let offsets = reader.read_u32_array(count)?;
        let ticks = reader.read_u32_array(count)?;
        Ok(Self {
            offsets,
            ticks,
            timebase: chunk.timebase(),
        })
    }
}

/// A constant-tempo interval starting at `offset`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BpmSegment {
    pub offset: u32,
    pub bpm: f64,
}

/// Ordered BPM segments of a chart
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TempoMap {
    pub segments: Vec<BpmSegment>,
}

impl TempoMap {
    /// Build one segment per pair of consecutive control points
    ///
    /// `bpm = (delta_offset / 4096) / ((delta_ticks / timebase) / 240)`
    pub fn build(tempo: &TempoChunk) -> Result<Self> {
        let points = tempo.offsets.len().min(tempo.ticks.len());
        let timebase = f64::from(tempo.timebase);
        let mut segments = Vec::with_capacity(points.saturating_sub(1));

        for i in 1..points {
            let delta_offset = i64::from(tempo.offsets[i]) - i64::from(tempo.offsets[i - 1]);
            let delta_ticks = i64::from(tempo.ticks[i]) - i64::from(tempo.ticks[i - 1]);
            if delta_ticks == 0 || tempo.timebase == 0 {
                return Err(Error::DegenerateTempoSegment { index: i - 1 });
            }

            let measures = delta_offset as f64 / f64::from(OFFSETS_PER_MEASURE);
            let seconds = delta_ticks as f64 / timebase;
            let bpm = measures / (seconds / 240.0);
            segments.push(BpmSegment {
                offset: tempo.offsets[i - 1],
                bpm,
            });
        }

        let mut map = Self { segments };
        map.correct_leading_segment()?;
        log::debug!("tempo map: {} segments", map.segments.len());
        Ok(map)
    }

    /// Charts commonly open with a zero-length lead-in segment whose BPM
    /// comes out as zero or negative. Such a first segment takes the BPM of
    /// the second one. Only the first segment is corrected.
    fn correct_leading_segment(&mut self) -> Result<()> {
        let Some(first) = self.segments.first().map(|s| s.bpm) else {
            return Ok(());
        };
        if first > 0.0 {
            return Ok(());
        }
        match self.segments.get(1).map(|s| s.bpm) {
            Some(second) => {
                log::warn!("first BPM segment is {first}, using following BPM {second}");
                self.segments[0].bpm = second;
                Ok(())
            }
            None => Err(Error::DegenerateTempoSegment { index: 0 }),
        }
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BpmSegment> {
        self.segments.iter()
    }
}
