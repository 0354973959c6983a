use anyhow::{Context, Result};
use boardstate::perft::{divide, perft};
use boardstate::Position;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::time::Instant;

#[derive(Parser, Debug)]
#[command(name = "perft", about = "Perft driver for the boardstate position")]
struct Args {
    /// Search depth
    #[arg(value_name = "DEPTH")]
    depth: u32,
    /// FEN string or "startpos"
    #[arg(value_name = "FEN", default_value = "startpos")]
    fen: String,
    /// Number of threads for root-split
    #[arg(long, default_value_t = 1)]
    threads: usize,
    /// Treat the FEN as Chess960 (Shredder/X-FEN castling)
    #[arg(long, default_value_t = false)]
    chess960: bool,
    /// Print per-move counts
    #[arg(long, default_value_t = false)]
    divide: bool,
    /// Report elapsed time and NPS
    #[arg(long, default_value_t = false)]
    nps: bool,
    /// Show a progress bar over root moves
    #[arg(long, default_value_t = false)]
    progress: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    boardstate::init();

    let base = if args.fen == "startpos" {
        Position::new()
    } else {
        Position::from_fen_960(&args.fen, args.chess960).with_context(|| format!("invalid FEN: {}", args.fen))?
    };
    log::debug!("perft {} on {}", args.depth, base.fen());

    if args.divide {
        let mut pos = base.clone();
        let t0 = Instant::now();
        let rows = divide(&mut pos, args.depth);
        let total: u64 = rows.iter().map(|(_, n)| n).sum();
        for (m, n) in rows {
            println!("{}: {}", m.to_uci(args.chess960), n);
        }
        println!();
        report(total, t0.elapsed().as_secs_f64(), args.nps);
        return Ok(());
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(args.threads.max(1))
        .build()
        .context("building thread pool")?;

    let (nodes, dt) = pool.install(|| -> Result<(u64, f64)> {
        let t0 = Instant::now();
        if args.threads <= 1 || args.depth <= 1 {
            let mut pos = base.clone();
            return Ok((perft(&mut pos, args.depth), t0.elapsed().as_secs_f64()));
        }
        let root_moves = boardstate::movegen::legal_moves(&base);
        let bar = if args.progress { ProgressBar::new(root_moves.len() as u64) } else { ProgressBar::hidden() };
        bar.set_style(
            ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} root moves {elapsed_precise}")
                .context("progress template")?,
        );
        let nodes = root_moves
            .par_iter()
            .map(|&m| {
                // One position (and state stack) per worker.
                let mut pos = base.clone();
                pos.do_move(m);
                let n = perft(&mut pos, args.depth - 1);
                bar.inc(1);
                n
            })
            .sum::<u64>();
        bar.finish_and_clear();
        Ok((nodes, t0.elapsed().as_secs_f64()))
    })?;

    report(nodes, dt, args.nps);
    Ok(())
}

fn report(nodes: u64, dt: f64, nps: bool) {
    if nps {
        println!("nodes: {nodes} elapsed: {:.3}s nps: {:.1}", dt, nodes as f64 / dt.max(f64::EPSILON));
    } else {
        println!("nodes: {nodes}");
    }
}
