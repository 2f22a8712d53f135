use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use titan_smp::board::Position;
use titan_smp::search::{LogReporter, MaterialEval, PstEval, SearchConfig, SearchLimits, ThreadPool};

#[derive(Parser, Debug)]
#[command(name = "titan-bench", version, about = "Benchmark titan-smp search speed and depth")]
struct Args {
    /// FEN string or 'startpos'
    #[arg(long, default_value = "startpos")]
    fen: String,

    /// Threads (overrides the config file)
    #[arg(long)]
    threads: Option<usize>,

    /// Movetime in milliseconds (ignored if depth or nodes is set)
    #[arg(long, default_value_t = 1000)]
    movetime: u64,

    /// Fixed search depth (overrides movetime when > 0)
    #[arg(long, default_value_t = 0)]
    depth: u32,

    /// Node budget (overrides movetime when > 0)
    #[arg(long, default_value_t = 0)]
    nodes: u64,

    /// Transposition table size in MB (overrides the config file)
    #[arg(long)]
    hash_mb: Option<usize>,

    /// JSON search configuration
    #[arg(long)]
    config: Option<String>,

    /// Plays this many random legal moves from the FEN before searching
    #[arg(long, default_value_t = 0)]
    random_plies: u32,

    /// Seed for --random-plies
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Material-only evaluation instead of piece-square tables
    #[arg(long, default_value_t = false)]
    material: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut config = match args.config.as_deref() {
        Some(path) => SearchConfig::from_json_file(path).with_context(|| format!("loading config '{path}'"))?,
        None => SearchConfig::default(),
    };
    if let Some(t) = args.threads {
        config.threads = t.max(1);
    }
    if let Some(mb) = args.hash_mb {
        config.hash_mb = mb;
    }

    let mut pos = if args.fen == "startpos" {
        Position::startpos()
    } else {
        Position::from_fen(&args.fen).with_context(|| format!("parsing FEN '{}'", args.fen))?
    };
    let mut rng = SmallRng::seed_from_u64(args.seed);
    for _ in 0..args.random_plies {
        let moves = pos.legal_moves();
        if moves.is_empty() {
            break;
        }
        let mv = moves[rng.gen_range(0..moves.len())];
        let _ = pos.make(mv);
    }
    if args.random_plies > 0 {
        println!("position: {}", pos.to_fen());
    }

    let limits = if args.depth > 0 {
        SearchLimits::depth(args.depth)
    } else if args.nodes > 0 {
        SearchLimits::nodes(args.nodes)
    } else {
        SearchLimits::movetime(Duration::from_millis(args.movetime))
    };

    let threads = config.threads;
    let mut pool = if args.material {
        ThreadPool::with_evaluator(config, Arc::new(MaterialEval))
    } else {
        ThreadPool::with_evaluator(config, Arc::new(PstEval))
    }
    .context("creating search pool")?;
    pool.set_reporter(Arc::new(LogReporter));

    let out = pool.search(&pos, limits).context("running search")?;
    let secs = out.elapsed.as_secs_f64();
    let nps = out.nodes as f64 / secs.max(f64::EPSILON);
    let best = out.best_move.map_or_else(|| "(none)".to_string(), |m| m.to_string());
    let pv: Vec<String> = out.pv.iter().map(|m| m.to_string()).collect();
    println!(
        "threads={} depth={} seldepth={} score={} nodes={} time={:.3}s nps={:.0} best={} pv={}",
        threads,
        out.depth,
        out.seldepth,
        out.score,
        out.nodes,
        secs,
        nps,
        best,
        pv.join(" ")
    );
    Ok(())
}
