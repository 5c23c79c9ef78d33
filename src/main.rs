use clap::Parser;
use ssqvox::converter::{default_output_path, read_ssq_file};
use ssqvox::ssq::Difficulty;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ssqvox")]
#[command(version = "0.1.0")]
#[command(about = "SSQ step chart to VOX converter", long_about = None)]
struct Args {
    /// Input SSQ file (optionally gzip-compressed)
    input: PathBuf,

    /// Chart to extract: csp, esp, dsp or bsp
    #[arg(short, long, default_value = "csp")]
    difficulty: String,

    /// Output VOX file (defaults to <name>-<difficulty>.vox)
    #[arg(short, long, conflicts_with = "stdout")]
    output: Option<PathBuf>,

    /// Write the chart to stdout instead of a file
    #[arg(long)]
    stdout: bool,
}

fn main() -> Result<(), ssqvox::Error> {
    env_logger::init();
    let args = Args::parse();

    // Map the chart selector to its step chunk code
    let difficulty: Difficulty = args.difficulty.parse()?;
    let converter = ssqvox::Converter::new(difficulty);

    if args.stdout {
        let data = read_ssq_file(&args.input)?;
        let mut text = Vec::new();
        converter.convert(&data, &mut text)?;
        io::stdout().lock().write_all(&text)?;
        return Ok(());
    }

    // Write <name>-<difficulty>.vox unless told otherwise
    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input, difficulty));
    converter.convert_file(&args.input, &output)?;
    println!("Data written to {}.", output.display());

    Ok(())
}
