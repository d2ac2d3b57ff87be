use std::io::Write;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use env_logger::Builder;

use offload_sim::collector::ProgressLogger;
use offload_sim::experiment::Experiment;
use offload_sim::{OffloadSimulation, SimulationConfig};

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
/// Simulates a mobile offloading system with a cloudlet and a cloud
struct Args {
    /// Path to YAML config (defaults are used for absent parameters)
    #[arg(short, long)]
    config: Option<String>,

    /// Overrides the seed from config
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of independent replications
    #[arg(short, long, default_value_t = 1)]
    replications: usize,

    /// Number of threads used for replications
    #[arg(short, long, default_value_t = 4)]
    threads: usize,

    /// Print results as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    Builder::from_default_env()
        .format(|buf, record| writeln!(buf, "{}", record.args()))
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => SimulationConfig::from_file(path)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
        config.validate()?;
    }

    let t = Instant::now();
    if args.replications > 1 {
        let results = Experiment::new(config, args.replications).run(args.threads)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
        } else {
            for run in &results.runs {
                println!(
                    "run {} (seed {}): system response time = {}",
                    run.id, run.seed, run.report.metrics.system_response_time
                );
            }
            println!("across {} replications:", results.runs.len());
            for (name, estimate) in results.summary.iter() {
                println!("  - {}: {}", name, estimate);
            }
        }
    } else {
        let mut sim = OffloadSimulation::new(config)?;
        sim.run_with_callbacks(&mut ProgressLogger::default())?;
        let report = sim.report();
        if args.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print!("{}", report);
        }
    }
    log::info!("Elapsed time: {:.2}s", t.elapsed().as_secs_f64());
    Ok(())
}
