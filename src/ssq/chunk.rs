//! SSQ chunk definitions

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Chunk header size in bytes
pub const CHUNK_HEADER_SIZE: usize = 12;

/// Chunk kinds
pub mod kind {
    /// Tempo map
    pub const TEMPO: u16 = 0x0001;
    /// Step data for one chart
    pub const STEP: u16 = 0x0003;
}

/// One length-prefixed chunk of an SSQ container
///
/// On disk the header is `length:u32, kind:u16, param:u16, count:u16,
/// flags:u16`, little endian, followed by `length - 12` payload bytes and
/// padding to a 4-byte boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// Declared length including the header
    pub length: u32,
    pub kind: u16,
    /// Timebase for tempo chunks, difficulty code for step chunks
    pub param: u16,
    /// Number of entries in the payload arrays
    pub count: u16,
    pub flags: u16,
    pub payload: Vec<u8>,
}

impl Chunk {
    /// Ticks per second reference of a tempo chunk
    pub fn timebase(&self) -> u16 {
        self.param
    }

    /// Difficulty code of a step chunk
    pub fn difficulty_code(&self) -> u16 {
        self.param
    }

    pub fn is_tempo(&self) -> bool {
        self.kind == kind::TEMPO
    }

    /// Whether this is the step chunk of the given chart
    pub fn is_step_for(&self, difficulty: Difficulty) -> bool {
        self.kind == kind::STEP && self.param == difficulty.code()
    }

    /// Short description used in error context
    pub fn describe(&self) -> String {
        format!("chunk kind {} (param {:#06x})", self.kind, self.param)
    }
}

/// Single-play chart difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    /// `bsp`
    Basic,
    /// `dsp`
    Difficult,
    /// `esp`
    Expert,
    /// `csp`
    Challenge,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [
        Difficulty::Basic,
        Difficulty::Difficult,
        Difficulty::Expert,
        Difficulty::Challenge,
    ];

    /// Step chunk `param` value for this chart
    pub fn code(self) -> u16 {
        match self {
            Difficulty::Basic => 0x0114,
            Difficulty::Difficult => 0x0214,
            Difficulty::Expert => 0x0314,
            Difficulty::Challenge => 0x0614,
        }
    }

    /// Selector name as used on the command line and in output names
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Basic => "bsp",
            Difficulty::Difficult => "dsp",
            Difficulty::Expert => "esp",
            Difficulty::Challenge => "csp",
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.code() == code)
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Difficulty {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.name() == lower)
            .ok_or_else(|| Error::UnsupportedDifficulty(s.to_string()))
    }
}
