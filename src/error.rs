use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "Truncated {context} at byte {offset:#x}: needed {needed} bytes, {available} available"
    )]
    TruncatedRecord {
        context: String,
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("Missing record: {0}")]
    MissingRecord(String),

    #[error("Degenerate tempo segment {index}: zero tick delta or timebase")]
    DegenerateTempoSegment { index: usize },

    #[error("Unclassified step pattern at event {index}")]
    UnclassifiedEventPattern { index: usize },

    #[error("Unsupported difficulty: '{0}' (expected csp, esp, dsp or bsp)")]
    UnsupportedDifficulty(String),

    #[error("Invalid release lane {lane_bit:#04x} at step event {index}")]
    InvalidReleaseLane { index: usize, lane_bit: u8 },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
