//! Lanes and lane sets

use serde::Serialize;

/// One of the four single-player input columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lane {
    Left,
    Down,
    Up,
    Right,
}

impl Lane {
    /// All lanes in bit order
    pub const ALL: [Lane; 4] = [Lane::Left, Lane::Down, Lane::Up, Lane::Right];

    /// Bit of this lane in a step byte
    pub fn bit(self) -> u8 {
        1 << self.index()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Lane for a single-bit value, if it names exactly one lane
    pub fn from_bit(bit: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|lane| lane.bit() == bit)
    }

    /// VOX track section holding this lane
    pub fn track(self) -> &'static str {
        match self {
            Lane::Left => "#TRACK3",
            Lane::Down => "#TRACK4",
            Lane::Up => "#TRACK5",
            Lane::Right => "#TRACK6",
        }
    }
}

/// Set of lanes pressed on one step, the low four bits of a step byte
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct LaneSet(u8);

impl LaneSet {
    pub const EMPTY: LaneSet = LaneSet(0);

    /// Lanes of a raw step byte; bits above the four lanes are ignored
    pub fn from_byte(byte: u8) -> Self {
        Self(byte & 0x0F)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, lane: Lane) -> bool {
        self.0 & lane.bit() != 0
    }

    /// Lanes in ascending bit order
    pub fn iter(self) -> impl Iterator<Item = Lane> {
        Lane::ALL.into_iter().filter(move |&lane| self.contains(lane))
    }
}

impl From<Lane> for LaneSet {
    fn from(lane: Lane) -> Self {
        Self(lane.bit())
    }
}

impl FromIterator<Lane> for LaneSet {
    fn from_iter<I: IntoIterator<Item = Lane>>(iter: I) -> Self {
        Self(iter.into_iter().fold(0, |acc, lane| acc | lane.bit()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_bits() {
        assert_eq!(Lane::Left.bit(), 0b0001);
        assert_eq!(Lane::Down.bit(), 0b0010);
        assert_eq!(Lane::Up.bit(), 0b0100);
        assert_eq!(Lane::Right.bit(), 0b1000);
        assert_eq!(Lane::from_bit(4), Some(Lane::Up));
        assert_eq!(Lane::from_bit(3), None);
        assert_eq!(Lane::from_bit(0x10), None);
    }

    #[test]
    fn test_lane_set_from_byte() {
        let set = LaneSet::from_byte(0b1010_1001);
        assert_eq!(set.len(), 2);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Lane::Left, Lane::Right]);
        assert!(LaneSet::from_byte(0x30).is_empty());
    }

    #[test]
    fn test_lane_set_collect() {
        let set: LaneSet = [Lane::Up, Lane::Down].into_iter().collect();
        assert_eq!(set.bits(), 0b0110);
        assert!(set.contains(Lane::Down));
        assert!(!set.contains(Lane::Left));
    }
}
