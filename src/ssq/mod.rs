pub mod chunk;
pub mod json;
pub mod reader;
pub mod step;
pub mod tempo;

pub use chunk::{Chunk, Difficulty};
pub use json::SsqJson;
pub use reader::{parse_chunks, SsqReader};
pub use step::{ExtensionRecord, LaneState, RawSteps, StepEvent, StepTrack};
pub use tempo::{BpmSegment, TempoChunk, TempoMap};
