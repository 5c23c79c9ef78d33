//! Measure/beat/tick timeline arithmetic
//!
//! Chunk offsets are measured on a fixed grid of 4096 units per measure.
//! The text chart counts 48 ticks per beat, 192 per measure. The two spaces
//! only meet through [`offset_to_mbt`], which rounds, so durations must
//! always be computed as differences of [`Mbt::to_ticks`] values.

use serde::{Serialize, Serializer};
use std::fmt;

/// Offset units per measure in chunk data
pub const OFFSETS_PER_MEASURE: u32 = 4096;

/// Beats per measure (fixed 4/4)
pub const BEATS_PER_MEASURE: u32 = 4;

/// Chart ticks per beat
pub const TICKS_PER_BEAT: u32 = 48;

/// Chart ticks per measure
pub const TICKS_PER_MEASURE: u32 = BEATS_PER_MEASURE * TICKS_PER_BEAT;

/// A 1-based measure/beat/tick position
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mbt {
    pub measure: u32,
    pub beat: u32,
    pub tick: u32,
}

impl Mbt {
    /// Build a position, carrying an overflowing tick or beat upward
    pub fn new(measure: u32, beat: u32, tick: u32) -> Self {
        let mut mbt = Self {
            measure,
            beat,
            tick,
        };
        if mbt.tick >= TICKS_PER_BEAT {
            mbt.beat += mbt.tick / TICKS_PER_BEAT;
            mbt.tick %= TICKS_PER_BEAT;
        }
        if mbt.beat > BEATS_PER_MEASURE {
            mbt.measure += (mbt.beat - 1) / BEATS_PER_MEASURE;
            mbt.beat = (mbt.beat - 1) % BEATS_PER_MEASURE + 1;
        }
        mbt
    }

    /// Position of an absolute chart tick count
    pub fn from_ticks(ticks: u32) -> Self {
        Self {
            measure: ticks / TICKS_PER_MEASURE + 1,
            beat: (ticks % TICKS_PER_MEASURE) / TICKS_PER_BEAT + 1,
            tick: ticks % TICKS_PER_BEAT,
        }
    }

    /// Absolute chart tick count
    pub fn to_ticks(&self) -> u32 {
        (self.measure - 1) * TICKS_PER_MEASURE + (self.beat - 1) * TICKS_PER_BEAT + self.tick
    }

    /// First beat of a measure
    pub fn measure_start(measure: u32) -> Self {
        Self::new(measure, 1, 0)
    }
}

impl Default for Mbt {
    fn default() -> Self {
        Self::measure_start(1)
    }
}

impl fmt::Display for Mbt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03},{:02},{:02}", self.measure, self.beat, self.tick)
    }
}

impl Serialize for Mbt {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Convert a chunk offset to a chart position
///
/// The fractional beat is scaled to 48 ticks and rounded half-to-even.
pub fn offset_to_mbt(offset: u32) -> Mbt {
    let measure_float = f64::from(offset) / f64::from(OFFSETS_PER_MEASURE);
    let measure = measure_float.trunc();
    let beat_float = (measure_float - measure) * f64::from(BEATS_PER_MEASURE);
    let beat = beat_float.trunc();
    let tick = ((beat_float - beat) * f64::from(TICKS_PER_BEAT)).round_ties_even();

    Mbt::new(measure as u32 + 1, beat as u32 + 1, tick as u32)
}

/// Absolute chart tick count of a position
pub fn mbt_to_ticks(mbt: Mbt) -> u32 {
    mbt.to_ticks()
}

/// Chart tick distance between two chunk offsets
///
/// Saturates to zero when `end` lies before `start`.
pub fn ticks_between(start: u32, end: u32) -> u32 {
    let from = mbt_to_ticks(offset_to_mbt(start));
    let to = mbt_to_ticks(offset_to_mbt(end));
    if to < from {
        log::warn!("offset {end} precedes offset {start}, clamping length to 0");
    }
    to.saturating_sub(from)
}
