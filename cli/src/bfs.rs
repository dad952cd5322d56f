/*
 * SPDX-FileCopyrightText: 2026 The dobfs developers
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::{num_threads_parser, positive_parser, store_ascii, GlobalArgs, GranularityArgs};
use anyhow::{Context, Result};
use clap::Parser;
use dobfs::bfs::{DEFAULT_ALPHA, DEFAULT_BETA};
use dobfs::build::{read_arcs, uniform, DEFAULT_SEED};
use dobfs::frontier::DEFAULT_BUFFER_CAPACITY;
use dobfs::prelude::*;
use dsi_progress_logger::{progress_logger, ProgressLog};
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Parser, Debug)]
#[command(
    name = "bfs",
    about = "Benchmarks direction-optimizing breadth-first visits.",
    long_about = None
)]
pub struct CliArgs {
    #[arg(short = 'f', long, conflicts_with = "uniform")]
    /// A file containing a list of arcs, one per line, as pairs of node
    /// identifiers separated by whitespace; if neither this option nor
    /// --uniform is given, arcs are read from standard input.
    pub arcs: Option<PathBuf>,

    #[arg(short = 'u', long)]
    /// Generate a uniform random graph with 2^SCALE nodes instead of reading
    /// arcs.
    pub uniform: Option<u32>,

    #[arg(short = 'k', long, default_value_t = 16, requires = "uniform")]
    /// The average outdegree of the uniform random graph.
    pub degree: usize,

    #[arg(long, default_value_t = DEFAULT_SEED)]
    /// The seed of the uniform random graph generator.
    pub seed: u64,

    #[arg(short = 's', long)]
    /// Add the reverse of every arc, making the graph symmetric.
    pub symmetrize: bool,

    #[arg(long)]
    /// Renumber nodes by decreasing outdegree.
    pub relabel: bool,

    #[arg(long)]
    /// The number of nodes of the graph (by default, one plus the largest
    /// node appearing in an arc).
    pub num_nodes: Option<usize>,

    #[arg(short = 'n', long, default_value_t = 16, value_parser = positive_parser)]
    /// The number of visits.
    pub trials: usize,

    #[arg(short = 'r', long)]
    /// The source of all visits; by default, each visit starts from a random
    /// node with nonzero outdegree.
    pub source: Option<usize>,

    #[arg(short = 'a', long)]
    /// Log the size of the tree computed by each visit.
    pub analyze: bool,

    #[arg(short = 'v', long)]
    /// Check each result against a sequential visit.
    pub verify: bool,

    #[arg(long, default_value_t = DEFAULT_ALPHA, value_parser = positive_parser)]
    /// Switch to bottom-up steps when the outdegrees of the frontier sum to
    /// more than the unexplored arcs divided by this value.
    pub alpha: usize,

    #[arg(long, default_value_t = DEFAULT_BETA, value_parser = positive_parser)]
    /// Switch back to top-down steps when the frontier shrinks below the
    /// number of nodes divided by this value.
    pub beta: usize,

    #[clap(flatten)]
    pub granularity: GranularityArgs,

    #[arg(long, default_value_t = DEFAULT_BUFFER_CAPACITY, value_parser = positive_parser)]
    /// The capacity of the thread-private buffers filling the queue (advanced
    /// option).
    pub buffer_capacity: usize,

    #[arg(short = 'j', long, default_value_t = rayon::current_num_threads().max(1), value_parser = num_threads_parser)]
    /// The number of threads to use.
    pub num_threads: usize,

    #[arg(long)]
    /// Store the parents computed by the last visit in this file, in ASCII
    /// format, one per line.
    pub parents: Option<PathBuf>,
}

impl CliArgs {
    fn config(&self) -> DobfsConfig {
        DobfsConfig::default()
            .alpha(self.alpha)
            .beta(self.beta)
            .granularity(self.granularity.into_granularity())
            .buffer_capacity(self.buffer_capacity)
    }
}

/// The outcome of a sequence of visits.
#[derive(Debug)]
pub struct Trials {
    /// The duration of each visit.
    pub times: Vec<Duration>,
    /// The result of the last visit.
    pub last: BfsTree,
}

impl Trials {
    /// Returns the average, minimum, and maximum duration of the visits.
    pub fn summary(&self) -> (Duration, Duration, Duration) {
        let total = self.times.iter().sum::<Duration>();
        let min = self.times.iter().min().copied().unwrap_or_default();
        let max = self.times.iter().max().copied().unwrap_or_default();
        (total / self.times.len().max(1) as u32, min, max)
    }
}

pub fn main(global_args: GlobalArgs, args: CliArgs) -> Result<()> {
    let built = load_graph(&args)?;
    let trials = run(&global_args, &args, &built)?;

    let (avg, min, max) = trials.summary();
    log::info!(
        "Average time: {:.5}s (min {:.5}s, max {:.5}s) over {} trials",
        avg.as_secs_f64(),
        min.as_secs_f64(),
        max.as_secs_f64(),
        trials.times.len()
    );

    if let Some(path) = &args.parents {
        log::info!("Storing parents in {}", path.display());
        store_ascii(path, trials.last.parents())?;
    }
    Ok(())
}

/// Reads or generates the graph described by `args`.
pub fn load_graph(args: &CliArgs) -> Result<BuiltGraph> {
    let builder = match (&args.arcs, args.uniform) {
        (_, Some(scale)) => {
            log::info!(
                "Generating a uniform random graph with 2^{scale} nodes and average outdegree {}",
                args.degree
            );
            uniform(scale, args.degree, args.seed)
        }
        (Some(path), None) => {
            log::info!("Reading arcs from {}", path.display());
            let file = File::open(path)
                .with_context(|| format!("Could not open {}", path.display()))?;
            read_arcs(BufReader::new(file))
                .with_context(|| format!("Could not read arcs from {}", path.display()))?
        }
        (None, None) => {
            log::info!("Reading arcs from standard input");
            read_arcs(std::io::stdin().lock())?
        }
    };

    let builder = match args.num_nodes {
        Some(num_nodes) => builder.num_nodes(Some(num_nodes)),
        None => builder,
    };
    let mut built = builder.symmetric(args.symmetrize).build()?;
    if args.relabel {
        if !built.is_symmetric() {
            log::warn!("Relabeling a directed graph by outdegree only");
        }
        built = built.relabel_by_degree();
    }
    log::info!(
        "The graph has {} nodes and {} arcs",
        built.num_nodes(),
        built.num_arcs()
    );
    Ok(built)
}

/// Visits `built` `args.trials` times.
///
/// # Errors
///
/// If the visits cannot start, or if verification is requested and fails.
pub fn run(global_args: &GlobalArgs, args: &CliArgs, built: &BuiltGraph) -> Result<Trials> {
    let (graph, transpose) = (built.graph(), built.transpose());
    let config = args.config();
    let thread_pool = thread_pool![args.num_threads];
    log::info!("Using {} threads", thread_pool.current_num_threads());

    let mut pl = progress_logger![];
    if let Some(log_interval) = global_args.log_interval {
        pl.log_interval(log_interval);
    }

    let mut sources = SourcePicker::new(graph, args.source, args.seed)?;
    let mut times = Vec::with_capacity(args.trials);
    let mut last = None;
    for trial in 0..args.trials {
        let source = sources.next_source();
        let start = Instant::now();
        let tree = dobfs(graph, transpose, source, &config, &thread_pool, &mut pl)?;
        let elapsed = start.elapsed();
        log::info!(
            "Trial {trial}: visited {} nodes from {source} in {:.5}s ({} steps)",
            tree.num_visited(),
            elapsed.as_secs_f64(),
            tree.steps().len()
        );
        times.push(elapsed);

        if args.analyze {
            log::info!("{}", TreeStats::new(graph, tree.parents()));
        }
        if args.verify {
            verify(graph, transpose, source, tree.parents())
                .with_context(|| format!("Verification of trial {trial} failed"))?;
            log::info!("Verification of trial {trial} passed");
        }
        last = Some(tree);
    }

    Ok(Trials {
        times,
        last: last.context("No trials were run")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use webgraph::utils::Granularity;

    fn parse(args: &[&str]) -> Result<(GlobalArgs, CliArgs)> {
        let cli = crate::Cli::try_parse_from(args)?;
        match cli.command {
            crate::SubCommands::Bfs(bfs_args) => Ok((cli.args, bfs_args)),
        }
    }

    #[test]
    fn test_uniform() -> Result<()> {
        let (global_args, args) = parse(&[
            "dobfs", "bfs", "-u", "8", "-k", "4", "-s", "-n", "3", "-v", "-a", "-j", "2",
        ])?;
        let built = load_graph(&args)?;
        assert_eq!(built.num_nodes(), 256);
        assert!(built.is_symmetric());
        let trials = run(&global_args, &args, &built)?;
        assert_eq!(trials.times.len(), 3);
        let (avg, min, max) = trials.summary();
        assert!(min <= avg && avg <= max);
        Ok(())
    }

    #[test]
    fn test_arcs_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let arcs = dir.path().join("arcs.txt");
        std::fs::write(&arcs, "# path\n0 1\n1 2\n2 3\n")?;
        let parents = dir.path().join("out").join("parents.txt");
        let (global_args, args) = parse(&[
            "dobfs",
            "bfs",
            "--arcs",
            arcs.to_str().unwrap(),
            "--num-nodes",
            "5",
            "-r",
            "0",
            "-n",
            "2",
            "--verify",
            "--parents",
            parents.to_str().unwrap(),
            "--log-interval",
            "1s",
        ])?;
        assert_eq!(global_args.log_interval, Some(Duration::from_secs(1)));
        main(global_args, args)?;
        assert_eq!(std::fs::read_to_string(&parents)?, "0\n0\n1\n2\n-1\n");
        Ok(())
    }

    #[test]
    fn test_invalid_args() {
        assert!(parse(&["dobfs", "bfs", "-u", "4", "--alpha", "0"]).is_err());
        assert!(parse(&["dobfs", "bfs", "-u", "4", "-n", "0"]).is_err());
        assert!(parse(&["dobfs", "bfs", "-u", "4", "-f", "arcs.txt"]).is_err());
    }

    #[test]
    fn test_granularity() -> Result<()> {
        let (global_args, args) = parse(&[
            "dobfs", "bfs", "-u", "6", "-n", "2", "-v", "--arc-granularity", "32",
        ])?;
        assert!(matches!(
            args.config().granularity,
            Granularity::Arcs(32)
        ));
        let built = load_graph(&args)?;
        run(&global_args, &args, &built)?;

        let (_, args) = parse(&["dobfs", "bfs", "-u", "6", "--node-granularity", "8"])?;
        assert!(matches!(args.config().granularity, Granularity::Nodes(8)));
        let (_, args) = parse(&["dobfs", "bfs", "-u", "6"])?;
        assert!(matches!(args.config().granularity, Granularity::Nodes(1000)));

        assert!(parse(&[
            "dobfs",
            "bfs",
            "-u",
            "6",
            "--arc-granularity",
            "32",
            "--node-granularity",
            "8",
        ])
        .is_err());
        // Zero granularity is rejected when the visit starts
        let (global_args, args) = parse(&["dobfs", "bfs", "-u", "6", "--node-granularity", "0"])?;
        let built = load_graph(&args)?;
        assert!(run(&global_args, &args, &built).is_err());
        Ok(())
    }

    #[test]
    fn test_invalid_source() -> Result<()> {
        let (global_args, args) = parse(&["dobfs", "bfs", "-u", "4", "-r", "16"])?;
        let built = load_graph(&args)?;
        assert!(run(&global_args, &args, &built).is_err());
        Ok(())
    }
}
