//! Filtering a noisy voltmeter.
//!
//! A Kalman filter with one state estimates a constant voltage from noisy readings.
//! The scenario defaults can be replaced by a JSON file and overridden on the command line.
//!
//! ```text
//! cargo run --example voltmeter -- --steps 100 --seed 42 --csv trace.csv
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

use kalman1d::models::Estimator;
use kalman1d::simulation::{simulate, Scenario};

#[derive(Parser, Debug)]
#[command(about = "Kalman filter estimating a constant voltage from noisy measurements")]
struct Args {
    /// JSON scenario, fields not given take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of measurements
    #[arg(long)]
    steps: Option<usize>,

    /// Seed for the measurement noise
    #[arg(long)]
    seed: Option<u64>,

    /// Write the trace as CSV to this file
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut scenario: Scenario = match &args.config {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            serde_json::from_reader(file).with_context(|| format!("reading {}", path.display()))?
        }
        None => Scenario::default(),
    };
    if let Some(steps) = args.steps {
        scenario.steps = steps;
    }
    if args.seed.is_some() {
        scenario.seed = args.seed;
    }

    let rng = match scenario.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut voltmeter = scenario.voltmeter(rng)?;
    let mut filter = scenario.filter()?;
    info!("initial state {} covariance {}", filter.state(), filter.covariance());

    let trace = simulate(&scenario, &mut filter, &mut voltmeter)?;

    println!("{:>5} {:>8} {:>10} {:>10}", "step", "actual", "measured", "estimate");
    for k in 0..trace.len() {
        println!(
            "{:>5} {:>8.3} {:>10.3} {:>10.3}",
            k, trace.actual[k], trace.measured[k], trace.estimated[k]
        );
    }
    println!("final estimate {:.5}", filter.state().epsilon_rounded());
    println!("final covariance {:.5}", filter.covariance().epsilon_rounded());

    if let Some(path) = &args.csv {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        trace.to_csv(BufWriter::new(file))?;
        info!("trace written to {}", path.display());
    }
    Ok(())
}
