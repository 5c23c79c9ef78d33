//! Step classification into per-lane notes and holds
//!
//! Holds are not stored as such: a press is followed by one or two zero
//! steps marking where the held lanes end. The classifier walks the
//! resolved steps with a cursor, looks at up to two following steps, and
//! picks the first matching [`Rule`] from a fixed decision table. The rule
//! decides every lane's hold length and how many steps it consumes.

use super::lane::Lane;
use crate::error::{Error, Result};
use crate::ssq::step::{LaneState, StepEvent, StepTrack};
use crate::timeline::{offset_to_mbt, ticks_between, Mbt};
use serde::Serialize;

/// A note or hold on one lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Note {
    pub time: Mbt,
    /// Hold length in chart ticks, 0 for a plain note
    pub hold: u32,
}

/// Notes of each lane in chart order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaneTracks {
    notes: [Vec<Note>; 4],
}

impl LaneTracks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, lane: Lane, note: Note) {
        self.notes[lane.index()].push(note);
    }

    pub fn lane(&self, lane: Lane) -> &[Note] {
        &self.notes[lane.index()]
    }

    /// Non-empty lanes with their notes, in lane order
    pub fn iter(&self) -> impl Iterator<Item = (Lane, &[Note])> {
        Lane::ALL
            .into_iter()
            .map(move |lane| (lane, self.lane(lane)))
            .filter(|(_, notes)| !notes.is_empty())
    }

    pub fn note_count(&self) -> usize {
        self.notes.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.note_count() == 0
    }
}

impl Serialize for LaneTracks {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(Lane::ALL.len()))?;
        for lane in Lane::ALL {
            map.serialize_entry(&lane, self.lane(lane))?;
        }
        map.end()
    }
}

/// What a step after the cursor looks like
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Successor {
    /// Past the end of the chart
    Missing,
    /// Any step pressing a lane
    Press,
    /// Zero step without a release, at this offset
    Empty(u32),
    /// Release marker for a lane, at this offset
    Release(Lane, u32),
}

impl Successor {
    fn of(events: &[StepEvent], index: usize) -> Self {
        let Some(event) = events.get(index) else {
            return Successor::Missing;
        };
        match event.state {
            LaneState::Release(lane) => Successor::Release(lane, event.offset),
            state if state.pressed().is_empty() => Successor::Empty(event.offset),
            _ => Successor::Press,
        }
    }
}

/// Outcome of the decision table for one cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Two lanes, each released by its own marker at a different offset
    DistinctReleases {
        first: Lane,
        first_end: u32,
        second: Lane,
        second_end: u32,
    },
    /// Two lanes ending together at the next two zero steps
    SharedEnd,
    /// Two lanes ending at two plain zero steps with different offsets
    DistinctEmpties { first_end: u32, second_end: u32 },
    /// Two lanes, one released by a marker, the other ending at a later
    /// plain zero step
    ReleaseThenEmpty {
        lane: Lane,
        release_end: u32,
        empty_end: u32,
    },
    /// Two lanes, only one of which is held
    PairWithOneRelease { lane: Lane },
    /// One lane released by the next step
    SingleRelease,
    /// One lane held until the next plain zero step
    SingleEmpty { end: u32 },
    /// Every lane of the step is a plain note, including the lane of a
    /// release marker no press consumed
    Plain,
}

impl Rule {
    /// Pick the rule for a cursor step and its two successors
    ///
    /// Returns `None` for a lane pair followed by a plain zero step and then
    /// a release at a different offset, which has no known meaning. A release
    /// marker at the cursor always takes the default rule.
    pub fn select(cursor: LaneState, next: Successor, after: Successor) -> Option<Self> {
        use Successor::{Empty, Release};

        let lanes = match cursor {
            LaneState::Release(_) => return Some(Rule::Plain),
            LaneState::Raw(_) => cursor.pressed().len(),
        };

        let rule = match (lanes, next, after) {
            (2, Release(first, first_end), Release(second, second_end))
                if first_end != second_end =>
            {
                Rule::DistinctReleases {
                    first,
                    first_end,
                    second,
                    second_end,
                }
            }
            (2, Release(..), Release(..)) => Rule::SharedEnd,
            (2, Release(_, a), Empty(b)) | (2, Empty(a), Release(_, b)) | (2, Empty(a), Empty(b))
                if a == b =>
            {
                Rule::SharedEnd
            }
            (2, Empty(first_end), Empty(second_end)) => Rule::DistinctEmpties {
                first_end,
                second_end,
            },
            (2, Release(lane, release_end), Empty(empty_end)) => Rule::ReleaseThenEmpty {
                lane,
                release_end,
                empty_end,
            },
            (2, Empty(_), Release(..)) => return None,
            (2, Release(lane, _), _) => Rule::PairWithOneRelease { lane },
            (1, Release(..), _) => Rule::SingleRelease,
            (1, Empty(end), _) => Rule::SingleEmpty { end },
            _ => Rule::Plain,
        };
        Some(rule)
    }

    /// Steps consumed, including the cursor
    pub fn advance(self) -> usize {
        match self {
            Rule::DistinctReleases { .. }
            | Rule::SharedEnd
            | Rule::DistinctEmpties { .. }
            | Rule::ReleaseThenEmpty { .. } => 3,
            Rule::PairWithOneRelease { .. } | Rule::SingleRelease | Rule::SingleEmpty { .. } => 2,
            Rule::Plain => 1,
        }
    }

    /// Emit the notes of the cursor step
    fn emit(self, event: &StepEvent, tracks: &mut LaneTracks) {
        let time = offset_to_mbt(event.offset);
        let length_to = |end: u32| ticks_between(event.offset, end);
        let lanes = event.state.lanes();

        for (position, lane) in lanes.iter().enumerate() {
            let hold = match self {
                Rule::DistinctReleases {
                    first,
                    first_end,
                    second,
                    second_end,
                } => {
                    if lane == first {
                        length_to(first_end)
                    } else if lane == second {
                        length_to(second_end)
                    } else {
                        0
                    }
                }
                Rule::SharedEnd | Rule::SingleRelease => event.hold_ticks,
                Rule::DistinctEmpties {
                    first_end,
                    second_end,
                } => {
                    if position == 0 {
                        length_to(first_end)
                    } else {
                        length_to(second_end)
                    }
                }
                Rule::ReleaseThenEmpty {
                    lane: released,
                    release_end,
                    empty_end,
                } => {
                    if lane == released {
                        length_to(release_end)
                    } else {
                        length_to(empty_end)
                    }
                }
                Rule::PairWithOneRelease { lane: released } => {
                    if lane == released {
                        event.hold_ticks
                    } else {
                        0
                    }
                }
                Rule::SingleEmpty { end } => length_to(end),
                Rule::Plain => 0,
            };
            tracks.push(lane, Note { time, hold });
        }
    }
}

/// Classify resolved steps into per-lane notes
pub fn classify(track: &StepTrack) -> Result<LaneTracks> {
    let events = &track.events;
    let mut tracks = LaneTracks::new();
    let mut i = 0;

    while i < events.len() {
        let event = &events[i];
        let next = Successor::of(events, i + 1);
        let after = Successor::of(events, i + 2);
        let rule = Rule::select(event.state, next, after)
            .ok_or(Error::UnclassifiedEventPattern { index: i })?;

        log::trace!("step {i} at offset {}: {rule:?}", event.offset);

        rule.emit(event, &mut tracks);
        i += rule.advance();
    }

    log::debug!("classified {} steps into {} notes", events.len(), tracks.note_count());
    Ok(tracks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn press(offset: u32, byte: u8, hold_ticks: u32) -> StepEvent {
        StepEvent {
            offset,
            state: LaneState::Raw(byte),
            hold_ticks,
        }
    }

    fn release(offset: u32, lane: Lane) -> StepEvent {
        StepEvent {
            offset,
            state: LaneState::Release(lane),
            hold_ticks: 0,
        }
    }

    fn empty(offset: u32) -> StepEvent {
        press(offset, 0, 0)
    }

    fn run(events: Vec<StepEvent>) -> LaneTracks {
        classify(&StepTrack { events }).unwrap()
    }

    fn holds(tracks: &LaneTracks, lane: Lane) -> Vec<u32> {
        tracks.lane(lane).iter().map(|n| n.hold).collect()
    }

    #[test]
    fn test_plain_notes() {
        let tracks = run(vec![
            press(0, 0b0001, 0),
            press(1024, 0b1001, 0),
            press(2048, 0b0100, 0),
        ]);
        assert_eq!(holds(&tracks, Lane::Left), vec![0, 0]);
        assert_eq!(holds(&tracks, Lane::Right), vec![0]);
        assert_eq!(holds(&tracks, Lane::Up), vec![0]);
        assert_eq!(tracks.lane(Lane::Right)[0].time.to_string(), "001,02,00");
        assert_eq!(tracks.lane(Lane::Up)[0].time.to_string(), "001,03,00");
    }

    #[test]
    fn test_single_lane_release() {
        let tracks = run(vec![
            press(0, 0b0001, 96),
            release(2048, Lane::Left),
            press(4096, 0b0010, 0),
        ]);
        assert_eq!(holds(&tracks, Lane::Left), vec![96]);
        assert_eq!(holds(&tracks, Lane::Down), vec![0]);
        assert_eq!(tracks.note_count(), 2);
    }

    #[test]
    fn test_single_lane_empty_successor() {
        let tracks = run(vec![press(1024, 0b0100, 48), empty(3072)]);
        assert_eq!(holds(&tracks, Lane::Up), vec![96]);
        assert_eq!(tracks.note_count(), 1);
    }

    #[test]
    fn test_distinct_releases() {
        let tracks = run(vec![
            press(0, 0b0011, 96),
            release(2048, Lane::Left),
            release(4096, Lane::Down),
        ]);
        assert_eq!(holds(&tracks, Lane::Left), vec![96]);
        assert_eq!(holds(&tracks, Lane::Down), vec![192]);
    }

    #[test]
    fn test_distinct_releases_in_reverse_lane_order() {
        let tracks = run(vec![
            press(0, 0b1001, 48),
            release(1024, Lane::Right),
            release(3072, Lane::Left),
        ]);
        assert_eq!(holds(&tracks, Lane::Right), vec![48]);
        assert_eq!(holds(&tracks, Lane::Left), vec![144]);
    }

    #[test]
    fn test_distinct_releases_off_beat() {
        let tracks = run(vec![
            press(0, 0b0011, 4),
            release(96, Lane::Left),
            release(192, Lane::Down),
        ]);
        assert_eq!(holds(&tracks, Lane::Left), vec![4]);
        assert_eq!(holds(&tracks, Lane::Down), vec![9]);
    }

    #[test]
    fn test_shared_release() {
        let tracks = run(vec![
            press(0, 0b0110, 96),
            release(2048, Lane::Down),
            release(2048, Lane::Up),
            press(4096, 0b0001, 0),
        ]);
        assert_eq!(holds(&tracks, Lane::Down), vec![96]);
        assert_eq!(holds(&tracks, Lane::Up), vec![96]);
        assert_eq!(holds(&tracks, Lane::Left), vec![0]);
    }

    #[test]
    fn test_shared_release_and_empty() {
        let tracks = run(vec![press(0, 0b0011, 48), release(1024, Lane::Left), empty(1024)]);
        assert_eq!(holds(&tracks, Lane::Left), vec![48]);
        assert_eq!(holds(&tracks, Lane::Down), vec![48]);
    }

    #[test]
    fn test_shared_empty() {
        let tracks = run(vec![press(0, 0b1100, 48), empty(1024), empty(1024)]);
        assert_eq!(holds(&tracks, Lane::Up), vec![48]);
        assert_eq!(holds(&tracks, Lane::Right), vec![48]);
    }

    #[test]
    fn test_distinct_empties() {
        let tracks = run(vec![press(0, 0b0101, 48), empty(1024), empty(2048)]);
        assert_eq!(holds(&tracks, Lane::Left), vec![48]);
        assert_eq!(holds(&tracks, Lane::Up), vec![96]);
    }

    #[test]
    fn test_release_then_empty() {
        let tracks = run(vec![press(0, 0b0011, 48), release(1024, Lane::Down), empty(3072)]);
        assert_eq!(holds(&tracks, Lane::Down), vec![48]);
        assert_eq!(holds(&tracks, Lane::Left), vec![144]);
    }

    #[test]
    fn test_pair_with_one_release() {
        let tracks = run(vec![
            press(0, 0b1010, 96),
            release(2048, Lane::Right),
            press(3072, 0b0001, 0),
        ]);
        assert_eq!(holds(&tracks, Lane::Right), vec![96]);
        assert_eq!(holds(&tracks, Lane::Down), vec![0]);
        assert_eq!(holds(&tracks, Lane::Left), vec![0]);
    }

    #[test]
    fn test_pair_with_release_at_chart_end() {
        let tracks = run(vec![press(0, 0b0011, 48), release(1024, Lane::Left)]);
        assert_eq!(holds(&tracks, Lane::Left), vec![48]);
        assert_eq!(holds(&tracks, Lane::Down), vec![0]);
    }

    #[test]
    fn test_unclassified_pattern() {
        let err = classify(&StepTrack {
            events: vec![
                press(0, 0b0001, 0),
                press(1024, 0b0011, 48),
                empty(2048),
                release(3072, Lane::Left),
            ],
        })
        .unwrap_err();
        assert!(matches!(err, Error::UnclassifiedEventPattern { index: 1 }));
    }

    #[test]
    fn test_unconsumed_release_is_plain_note() {
        let tracks = run(vec![release(0, Lane::Left), press(1024, 0b0001, 0)]);
        assert_eq!(holds(&tracks, Lane::Left), vec![0, 0]);
        assert_eq!(tracks.lane(Lane::Left)[0].time.to_string(), "001,01,00");
        assert_eq!(tracks.lane(Lane::Left)[1].time.to_string(), "001,02,00");
    }

    #[test]
    fn test_releases_after_three_lane_jump() {
        let tracks = run(vec![
            press(0, 0b0111, 0),
            release(2048, Lane::Left),
            release(2048, Lane::Down),
            release(2048, Lane::Up),
            press(4096, 0b1000, 0),
        ]);
        for lane in [Lane::Left, Lane::Down, Lane::Up] {
            let times: Vec<String> =
                tracks.lane(lane).iter().map(|n| n.time.to_string()).collect();
            assert_eq!(times, vec!["001,01,00", "001,03,00"]);
            assert_eq!(holds(&tracks, lane), vec![0, 0]);
        }
        assert_eq!(holds(&tracks, Lane::Right), vec![0]);
    }

    #[test]
    fn test_jump_with_three_lanes_is_plain() {
        let tracks = run(vec![press(0, 0b0111, 48), release(1024, Lane::Left)]);
        assert_eq!(tracks.note_count(), 4);
        assert!(tracks.iter().all(|(_, notes)| notes[0].hold == 0));
    }

    #[test]
    fn test_terminal_step() {
        let tracks = run(vec![press(0, 0b0010, 0)]);
        assert_eq!(holds(&tracks, Lane::Down), vec![0]);
        assert!(run(Vec::new()).is_empty());
        assert!(run(vec![empty(0)]).is_empty());
    }

    #[test]
    fn test_rule_table_order() {
        use Successor::*;
        let pair = LaneState::Raw(0b0011);
        assert_eq!(
            Rule::select(pair, Release(Lane::Left, 5), Release(Lane::Down, 5)),
            Some(Rule::SharedEnd)
        );
        assert_eq!(
            Rule::select(pair, Empty(5), Release(Lane::Down, 5)),
            Some(Rule::SharedEnd)
        );
        assert_eq!(Rule::select(pair, Empty(5), Release(Lane::Down, 6)), None);
        assert_eq!(
            Rule::select(pair, Release(Lane::Left, 5), Press),
            Some(Rule::PairWithOneRelease { lane: Lane::Left })
        );
        assert_eq!(Rule::select(pair, Empty(5), Press), Some(Rule::Plain));
        assert_eq!(Rule::select(pair, Missing, Missing), Some(Rule::Plain));
        assert_eq!(
            Rule::select(LaneState::Raw(0b1000), Empty(9), Missing),
            Some(Rule::SingleEmpty { end: 9 })
        );
        assert_eq!(Rule::select(LaneState::Raw(0), Empty(9), Missing), Some(Rule::Plain));
        assert_eq!(
            Rule::select(
                LaneState::Release(Lane::Up),
                Release(Lane::Left, 5),
                Release(Lane::Down, 9)
            ),
            Some(Rule::Plain)
        );
    }

    #[test]
    fn test_advance() {
        assert_eq!(Rule::SharedEnd.advance(), 3);
        assert_eq!(Rule::SingleRelease.advance(), 2);
        assert_eq!(Rule::Plain.advance(), 1);
    }

    fn arb_event() -> impl Strategy<Value = (u32, LaneState)> {
        let state = prop_oneof![
            (0u8..16).prop_map(LaneState::Raw),
            (0usize..4).prop_map(|i| LaneState::Release(Lane::ALL[i])),
        ];
        (0u32..2048, state)
    }

    proptest! {
        #[test]
        fn prop_holds_bounded_by_chart(steps in prop::collection::vec(arb_event(), 0..40)) {
            let mut offset = 0;
            let events: Vec<StepEvent> = steps
                .into_iter()
                .map(|(delta, state)| {
                    offset += delta;
                    StepEvent { offset, state, hold_ticks: 0 }
                })
                .collect();
            let span = events
                .last()
                .map(|e| ticks_between(0, e.offset))
                .unwrap_or(0);

            match classify(&StepTrack { events }) {
                Ok(tracks) => {
                    for (_, notes) in tracks.iter() {
                        for note in notes {
                            prop_assert!(note.hold <= span);
                        }
                    }
                }
                Err(err) => {
                    let is_unclassified = matches!(err, Error::UnclassifiedEventPattern { .. });
                    prop_assert!(is_unclassified);
                }
            }
        }
    }
}
