//! SSQ to JSON dumper

use clap::Parser;
use ssqvox::converter::read_ssq_file;
use ssqvox::ssq::{parse_chunks, Difficulty, SsqJson};
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "ssq2json")]
#[command(version = "0.1.0")]
#[command(about = "Dump SSQ chunks, tempo and step charts as JSON", long_about = None)]
struct Args {
    /// Input SSQ file (optionally gzip-compressed)
    input: PathBuf,

    /// Only decode this chart (csp, esp, dsp or bsp)
    #[arg(short, long)]
    difficulty: Option<String>,

    /// Output JSON file (writes to stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output compact JSON (default is pretty-printed)
    #[arg(short, long)]
    compact: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let difficulty = args
        .difficulty
        .as_deref()
        .map(str::parse::<Difficulty>)
        .transpose()?;

    let data = read_ssq_file(&args.input)?;
    let chunks = parse_chunks(&data)?;
    let dump = SsqJson::new(&chunks, difficulty)?;

    let json_string = if args.compact {
        serde_json::to_string(&dump)?
    } else {
        serde_json::to_string_pretty(&dump)?
    };

    match args.output {
        Some(path) => {
            let mut file = File::create(path)?;
            file.write_all(json_string.as_bytes())?;
            file.write_all(b"\n")?;
        }
        None => {
            println!("{}", json_string);
        }
    }

    Ok(())
}
