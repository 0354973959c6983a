use anyhow::{bail, Context, Result};
use boardstate::{PackedPosition, Position};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{self, BufRead, Write};

#[derive(Parser, Debug)]
#[command(name = "pack", about = "Convert between FEN and 32-byte packed position records")]
struct Args {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Read FENs (one per line) from stdin, write JSON lines with the packed hex
    Encode,
    /// Read packed hex records (one per line) from stdin, write JSON lines with the FEN
    Decode {
        /// Game ply to assign, since records do not store it
        #[arg(long, default_value_t = 0)]
        ply: i32,
        /// Flip files while decoding
        #[arg(long, default_value_t = false)]
        mirror: bool,
    },
}

#[derive(Serialize)]
struct Record<'a> {
    fen: &'a str,
    packed: &'a str,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    boardstate::init();

    let stdin = io::stdin();
    let mut out = io::BufWriter::new(io::stdout().lock());
    let mut pos = Position::new();

    for (n, line) in stdin.lock().lines().enumerate() {
        let line = line.context("reading stdin")?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match args.cmd {
            Cmd::Encode => {
                pos.set_fen(line, false).with_context(|| format!("line {}: invalid FEN", n + 1))?;
                let hex = pos.pack().to_hex();
                serde_json::to_writer(&mut out, &Record { fen: &pos.fen(), packed: &hex })?;
            }
            Cmd::Decode { ply, mirror } => {
                let Some(record) = PackedPosition::from_hex(line) else {
                    bail!("line {}: expected 64 hex digits", n + 1);
                };
                pos.set_packed(&record, ply, mirror).with_context(|| format!("line {}: invalid record", n + 1))?;
                serde_json::to_writer(&mut out, &Record { fen: &pos.fen(), packed: line })?;
            }
        }
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}
