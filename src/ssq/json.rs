//! JSON serialization types for SSQ data

use super::chunk::{Chunk, Difficulty};
use super::step::StepTrack;
use super::tempo::{TempoChunk, TempoMap};
use crate::chart::{classify, end_position, LaneTracks};
use crate::error::Result;
use crate::timeline::Mbt;
use serde::Serialize;

/// Top-level JSON structure for an SSQ file
#[derive(Debug, Clone, Serialize)]
pub struct SsqJson {
    /// Every chunk header in file order
    pub chunks: Vec<ChunkJson>,
    /// Tempo map (if a tempo chunk is present)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tempo: Option<TempoMap>,
    /// Decoded step charts
    pub charts: Vec<ChartJson>,
}

/// JSON representation of a chunk header
#[derive(Debug, Clone, Serialize)]
pub struct ChunkJson {
    pub length: u32,
    pub kind: u16,
    pub param: u16,
    pub count: u16,
    pub flags: u16,
    pub payload_len: usize,
    /// Chart selected by a step chunk's param
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

/// JSON representation of one step chart
#[derive(Debug, Clone, Serialize)]
pub struct ChartJson {
    pub difficulty: Difficulty,
    pub end_position: Mbt,
    /// Resolved steps before classification
    pub steps: StepTrack,
    /// Notes per lane
    pub lanes: LaneTracks,
}

impl SsqJson {
    /// Decode chunks for dumping
    ///
    /// With no difficulty every step chunk of a known chart is decoded.
    pub fn new(chunks: &[Chunk], difficulty: Option<Difficulty>) -> Result<Self> {
        let tempo = chunks
            .iter()
            .find(|c| c.is_tempo())
            .map(|c| TempoChunk::decode(c).and_then(|t| TempoMap::build(&t)))
            .transpose()?;

        let selected: Vec<Difficulty> = match difficulty {
            Some(d) => vec![d],
            None => Difficulty::ALL.to_vec(),
        };

        let mut charts = Vec::new();
        for d in selected {
            let Some(chunk) = chunks.iter().find(|c| c.is_step_for(d)) else {
                continue;
            };
            let steps = StepTrack::decode(chunk)?;
            let lanes = classify(&steps)?;
            charts.push(ChartJson {
                difficulty: d,
                end_position: end_position(&steps),
                steps,
                lanes,
            });
        }

        Ok(Self {
            chunks: chunks.iter().map(ChunkJson::from).collect(),
            tempo,
            charts,
        })
    }
}

impl From<&Chunk> for ChunkJson {
    fn from(chunk: &Chunk) -> Self {
        let difficulty = if chunk.kind == super::chunk::kind::STEP {
            Difficulty::from_code(chunk.param)
        } else {
            None
        };
        Self {
            length: chunk.length,
            kind: chunk.kind,
            param: chunk.param,
            count: chunk.count,
            flags: chunk.flags,
            payload_len: chunk.payload.len(),
            difficulty,
        }
    }
}
