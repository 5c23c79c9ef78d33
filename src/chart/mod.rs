//! Chart model built from SSQ chunks

pub mod classifier;
pub mod lane;
pub mod vox;

pub use classifier::{classify, LaneTracks, Note, Rule, Successor};
pub use lane::{Lane, LaneSet};
pub use vox::VoxWriter;

use crate::error::{Error, Result};
use crate::ssq::{Chunk, Difficulty, StepTrack, TempoChunk, TempoMap};
use crate::timeline::{offset_to_mbt, Mbt};
use serde::Serialize;

/// Measures of silence kept after the last step
const END_PADDING_MEASURES: u32 = 3;

/// One converted chart
#[derive(Debug, Clone, Serialize)]
pub struct Chart {
    pub difficulty: Difficulty,
    pub tempo: TempoMap,
    pub tracks: LaneTracks,
    pub end_position: Mbt,
}

impl Chart {
    /// Build a chart from the tempo chunk and the step chunk of `difficulty`
    pub fn from_chunks(chunks: &[Chunk], difficulty: Difficulty) -> Result<Self> {
        let tempo_chunk = chunks
            .iter()
            .find(|c| c.is_tempo())
            .ok_or_else(|| Error::MissingRecord("tempo chunk".into()))?;
        let step_chunk = chunks
            .iter()
            .find(|c| c.is_step_for(difficulty))
            .ok_or_else(|| {
                Error::MissingRecord(format!(
                    "step chunk for {difficulty} ({:#06x})",
                    difficulty.code()
                ))
            })?;

        let tempo = TempoMap::build(&TempoChunk::decode(tempo_chunk)?)?;
        let steps = StepTrack::decode(step_chunk)?;
        let tracks = classify(&steps)?;

        Ok(Self {
            difficulty,
            tempo,
            tracks,
            end_position: end_position(&steps),
        })
    }
}

/// Start of the third measure after the measure holding the last step
pub fn end_position(steps: &StepTrack) -> Mbt {
    let last = offset_to_mbt(steps.last_offset().unwrap_or(0));
    Mbt::measure_start(last.measure + END_PADDING_MEASURES)
}
