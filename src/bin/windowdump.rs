use std::fs::File;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use boundedio::{BoundedReader, Origin};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Hex-dump a byte window of a file
#[derive(Debug, Parser)]
#[command(name = "windowdump", version)]
struct Args {
    /// File to read from
    file: PathBuf,

    /// Absolute offset where the window starts
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// Window length in bytes, defaults to the rest of the file
    #[arg(long, conflicts_with = "length_prefix")]
    size: Option<u64>,

    /// Take the window length from a little-endian u32 at --start
    #[arg(long)]
    length_prefix: bool,

    /// Only dump the last N bytes of the window
    #[arg(long, value_name = "N")]
    seek_end: Option<i64>,

    /// Bytes per output line
    #[arg(long, default_value_t = 16, env = "WINDOWDUMP_WIDTH")]
    width: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.width == 0 {
        bail!("--width must be at least 1");
    }

    let file = File::open(&args.file).with_context(|| format!("opening {}", args.file.display()))?;

    let mut window = if args.length_prefix {
        BoundedReader::length_prefixed(file, args.start)
            .with_context(|| format!("reading length prefix at {}", args.start))?
    } else {
        let size = match args.size {
            Some(size) => size,
            None => file.metadata()?.len().saturating_sub(args.start)
        };
        BoundedReader::new(file, args.start, size)?
    };

    if let Some(back) = args.seek_end {
        window.seek_window(back, Origin::End)
            .with_context(|| format!("{} bytes do not fit into a window of {}", back, window.size()))?;
    }

    println!("Window at {} of {} bytes, dumping from {}", window.start_pos(), window.size(), window.position());

    let base = window.start_pos() + window.position();
    dump(&mut window, base, args.width)
}

fn dump<R: Read>(reader: &mut R, base: u64, width: usize) -> Result<()> {
    let mut offset = base;
    let mut line = Vec::with_capacity(width);
    loop {
        line.clear();
        reader.by_ref().take(width as u64).read_to_end(&mut line)?;
        if line.is_empty() {
            return Ok(());
        }

        let hex = line.iter().map(|b| format!("{:02x}", b)).collect::<Vec<_>>().join(" ");
        let text = line.iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '.' })
            .collect::<String>();
        println!("{:08x}  {:<w$}  |{}|", offset, hex, text, w = width * 3 - 1);

        offset += line.len() as u64;
    }
}
