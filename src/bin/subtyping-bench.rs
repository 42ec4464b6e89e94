//! Times both subtyping checkers on families of generated types.
//!
//! Every check runs under a deadline. One CSV line per check goes to stdout:
//!
//! ```text
//! algorithm,index,completed,nanos
//! inductive,1,1,5120
//! coinductive,1,1,3980
//! ```
//!
//! Logs go to stderr, so stdout can be redirected straight into a file.

use std::{
    io::{self, Write},
    sync::Arc,
    time::Duration,
};

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use fastrand::Rng;
use session_subtyping::{
    generate::{exponential_counterexample, random_isomorphic_type, random_type, GeneratorConfig},
    runtimes,
    unfold_once, Algorithm, Supervised, Type,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "subtyping-bench", version)]
#[command(about = "Time inductive and coinductive session subtyping", long_about = None)]
struct Cli {
    /// Suites to run, in order. Runs all of them when omitted.
    #[arg(long, value_enum)]
    suite: Vec<Suite>,

    /// Seed for the random suites.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Largest k of the exponential family.
    #[arg(long, default_value_t = 10)]
    k_max: usize,

    /// Generated types per random suite.
    #[arg(long, default_value_t = 100)]
    instances: usize,

    /// Repetitions of each check in the reflexive and unfolded suites.
    #[arg(long, default_value_t = 10_000)]
    iterations: usize,

    /// Deadline per timed run, in seconds.
    #[arg(long, default_value_t = 10)]
    timeout: u64,

    /// Print the CSV column names first.
    #[arg(long)]
    header: bool,

    /// More logging on stderr, repeatable. `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Suite {
    /// exponential_counterexample(k) against k + 1.
    Exponential,
    /// Pairs of random types equal to μX. p0⊕{l0: X, l1: X}.
    Isomorphic,
    /// Random types against themselves.
    Reflexive,
    /// Random types against their one-step unfolding.
    Unfolded,
}

impl Suite {
    const ALL: [Suite; 4] = [Suite::Exponential, Suite::Isomorphic, Suite::Reflexive, Suite::Unfolded];
}

struct Bench {
    out: io::Stdout,
    timeout: Duration,
}

impl Bench {
    /// Runs `algorithm` on the pair `iterations` times under one deadline and
    /// reports the run as line `index`.
    async fn time(
        &mut self,
        index: usize,
        algorithm: Algorithm,
        left: &Arc<Type>,
        right: &Arc<Type>,
        iterations: usize,
    ) -> anyhow::Result<()> {
        let (left, right) = (Arc::clone(left), Arc::clone(right));
        let run: Supervised<bool> = runtimes::tokio::run_with_deadline(self.timeout, move |cancel| {
            let mut holds = true;
            for _ in 0..iterations {
                holds &= algorithm.subtype(&left, &right, cancel);
                if cancel.is_cancelled() {
                    break;
                }
            }
            holds
        })
        .await;

        if run.verdict() == Some(false) {
            warn!(%algorithm, index, "expected related types were refuted");
        }
        writeln!(
            self.out,
            "{algorithm},{index},{},{}",
            u8::from(run.completed),
            run.elapsed.as_nanos()
        )
        .context("writing to stdout")
    }

    async fn both(
        &mut self,
        index: usize,
        left: Type,
        right: Type,
        iterations: usize,
    ) -> anyhow::Result<()> {
        let (left, right) = (Arc::new(left), Arc::new(right));
        for algorithm in Algorithm::ALL {
            self.time(index, algorithm, &left, &right, iterations).await?;
        }
        Ok(())
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let suites = if cli.suite.is_empty() { Suite::ALL.to_vec() } else { cli.suite.clone() };
    let mut bench = Bench {
        out: io::stdout(),
        timeout: Duration::from_secs(cli.timeout),
    };
    if cli.header {
        writeln!(bench.out, "algorithm,index,completed,nanos")?;
    }

    for suite in suites {
        info!(?suite, seed = cli.seed, "running suite");
        let mut rng = Rng::with_seed(cli.seed);
        match suite {
            Suite::Exponential => {
                for k in 1..=cli.k_max {
                    let (left, right) = (exponential_counterexample(k), exponential_counterexample(k + 1));
                    bench.both(k, left, right, 1).await?;
                }
            }
            Suite::Isomorphic => {
                for k in 1..=cli.instances {
                    let left = random_isomorphic_type(k, &mut rng);
                    let right = random_isomorphic_type(k, &mut rng);
                    bench.both(k, left, right, 1).await?;
                }
            }
            Suite::Reflexive => {
                let config = GeneratorConfig { max_size: 10_000, ..GeneratorConfig::default() };
                for i in 0..cli.instances {
                    let ty = random_type(&config, &mut rng);
                    debug!(i, nodes = ty.len(), "generated");
                    bench.both(i, ty.clone(), ty, cli.iterations).await?;
                }
            }
            Suite::Unfolded => {
                let config = GeneratorConfig { max_size: 1_000, ..GeneratorConfig::default() };
                for i in 0..cli.instances {
                    // a type without edges into its root unfolds to itself
                    let (ty, unfolded) = loop {
                        let ty = random_type(&config, &mut rng);
                        let unfolded = unfold_once(&ty);
                        if unfolded.len() != ty.len() {
                            break (ty, unfolded);
                        }
                    };
                    debug!(i, nodes = ty.len(), unfolded = unfolded.len(), "generated");
                    bench.both(i, ty, unfolded, cli.iterations).await?;
                }
            }
        }
        bench.out.flush()?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .init();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("building the tokio runtime")?;
    runtime.block_on(run(cli))
}
