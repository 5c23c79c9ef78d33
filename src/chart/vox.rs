//! VOX text chart writer

use super::Chart;
use crate::timeline::{offset_to_mbt, Mbt};
use std::io::{self, Write};

/// Comment line between sections
pub const SEPARATOR: &str = "//====================================";

/// Format version written to `#FORMAT VERSION`
pub const FORMAT_VERSION: u32 = 10;

/// Track sections with no content in a single-play step chart
const EMPTY_TRACKS_BEFORE: [&str; 2] = ["#TRACK1", "#TRACK2"];
const EMPTY_TRACKS_AFTER: [&str; 2] = ["#TRACK7", "#TRACK8"];

const NO_LINES: [&str; 0] = [];

/// Writes a [`Chart`] as VOX text
pub struct VoxWriter<W: Write> {
    out: W,
}

impl<W: Write> VoxWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Write the complete file
    pub fn write_chart(&mut self, chart: &Chart) -> io::Result<()> {
        self.write_banner("SOUND VOLTEX OUTPUT TEXT FILE")?;

        self.write_section("#FORMAT VERSION", [FORMAT_VERSION.to_string()])?;
        self.write_section("#BEAT INFO", [format!("{}\t4\t4", Mbt::default())])?;
        self.write_section(
            "#BPM INFO",
            chart
                .tempo
                .iter()
                .map(|s| format!("{}\t{:8.4}\t4", offset_to_mbt(s.offset), s.bpm)),
        )?;
        self.write_section("#TILT MODE INFO", [format!("{}\t0", Mbt::default())])?;
        self.write_section("#LYRIC INFO", NO_LINES)?;
        self.write_section("#END POSITION", [chart.end_position.to_string()])?;
        for name in [
            "#TAB EFFECT INFO",
            "#FXBUTTON EFFECT INFO",
            "#TAB PARAM ASSIGN INFO",
            "#REVERB EFFECT PARAM",
        ] {
            self.write_section(name, NO_LINES)?;
        }

        self.write_banner("TRACK INFO")?;
        for name in EMPTY_TRACKS_BEFORE {
            self.write_section(name, NO_LINES)?;
            self.write_separator()?;
        }
        self.write_lane_tracks(chart)?;
        for name in EMPTY_TRACKS_AFTER {
            self.write_separator()?;
            self.write_section(name, NO_LINES)?;
        }
        self.write_separator()?;

        self.write_banner("SPCONTROLER INFO")?;
        writeln!(self.out, "#SPCONTROLER")?;
        writeln!(self.out, "#END")?;
        self.out.flush()
    }

    /// Non-empty lane tracks, separated from each other
    fn write_lane_tracks(&mut self, chart: &Chart) -> io::Result<()> {
        for (n, (lane, notes)) in chart.tracks.iter().enumerate() {
            if n > 0 {
                self.write_separator()?;
            }
            self.write_section(
                lane.track(),
                notes.iter().map(|note| format!("{}\t{}\t0", note.time, note.hold)),
            )?;
        }
        Ok(())
    }

    fn write_banner(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.out, "{SEPARATOR}")?;
        writeln!(self.out, "// {title}")?;
        writeln!(self.out, "{SEPARATOR}")?;
        writeln!(self.out)
    }

    fn write_separator(&mut self) -> io::Result<()> {
        writeln!(self.out, "{SEPARATOR}")?;
        writeln!(self.out)
    }

    fn write_section<I, S>(&mut self, name: &str, lines: I) -> io::Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        writeln!(self.out, "{name}")?;
        for line in lines {
            writeln!(self.out, "{}", line.as_ref())?;
        }
        writeln!(self.out, "#END")?;
        writeln!(self.out)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
