//! SSQ to VOX conversion driver

use crate::chart::{Chart, VoxWriter};
use crate::error::Result;
use crate::ssq::{parse_chunks, Difficulty};
use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Converts one chart of an SSQ file
pub struct Converter {
    difficulty: Difficulty,
}

impl Converter {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    /// Parse container bytes into the selected chart
    pub fn load(&self, data: &[u8]) -> Result<Chart> {
        // Split the container into chunks
        let chunks = parse_chunks(data)?;
        log::debug!("{} chunks in container", chunks.len());
        let chart = Chart::from_chunks(&chunks, self.difficulty)?;
        log::info!(
            "{}: {} BPM segments, {} notes",
            self.difficulty,
            chart.tempo.len(),
            chart.tracks.note_count()
        );
        Ok(chart)
    }

    /// Convert container bytes, writing VOX text to `output`
    pub fn convert<W: Write>(&self, data: &[u8], output: W) -> Result<Chart> {
        let chart = self.load(data)?;
        VoxWriter::new(output).write_chart(&chart)?;
        Ok(chart)
    }

    /// Convert an SSQ file into a VOX file
    ///
    /// The whole chart is rendered before the output file is created.
    pub fn convert_file(&self, input: &Path, output: &Path) -> Result<Chart> {
        let data = read_ssq_file(input)?;

        // Render to memory so a failed conversion leaves no file behind
        let mut text = Vec::new();
        let chart = self.convert(&data, &mut text)?;
        fs::write(output, text)?;
        log::info!("wrote {}", output.display());
        Ok(chart)
    }
}

/// `<stem>-<difficulty>.vox` in the current directory
///
/// The stem is the file name up to its first dot.
pub fn default_output_path(input: &Path, difficulty: Difficulty) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = name.split('.').next().unwrap_or_default();
    PathBuf::from(format!("{stem}-{difficulty}.vox"))
}

/// Read an SSQ file, decompressing if necessary
pub fn read_ssq_file(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;

    // Check for gzip by extension or magic (0x1f 0x8b)
    let is_gzip = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("gz"))
        .unwrap_or(false)
        || data.starts_with(&[0x1f, 0x8b]);

    if is_gzip {
        let mut decoder = GzDecoder::new(data.as_slice());
        let mut decompressed = Vec::new();
        decoder.read_to_end(&mut decompressed)?;
        Ok(decompressed)
    } else {
        Ok(data)
    }
}
