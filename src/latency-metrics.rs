use clap::Parser;
use hashring_eval::config::LoggingConfig;
use hashring_eval::output::format::format_latency_ns;
use hashring_eval::{Summary, loader, logging, stats};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "latency-metrics")]
#[command(about = "Tail and average latency of a load generator latency file")]
#[command(version)]
struct Cli {
    /// File with one latency per line
    #[arg(value_name = "FILE")]
    filename: PathBuf,

    /// Lines carry a unit suffix (ns, µs), as written by older load generators
    #[arg(long)]
    multiple_units: bool,

    /// Also print a full percentile summary
    #[arg(long)]
    summary: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(&LoggingConfig::default());

    tracing::info!(path = %cli.filename.display(), "grabbing latency numbers");

    let loaded = loader::load_latency_file(&cli.filename, cli.multiple_units)?;
    let p99 = stats::percentile(&loaded.samples, 99.0)?;
    let mean = stats::mean(&loaded.samples)?;
    let summary = if cli.summary {
        Some(Summary::from_samples(&loaded.samples)?)
    } else {
        None
    };

    let units: Vec<&str> = loaded.units.iter().map(|u| u.as_str()).collect();
    println!("units present: {{{}}}", units.join(", "));
    println!("99% tail latency: {} ns", p99);
    println!("average latency: {} ns", mean);

    if let Some(s) = summary {
        println!();
        println!("  {:>8} {:>10}", "stat", "latency");
        println!("  {:->8} {:->10}", "", "");
        println!("  {:>8} {:>10}", "count", s.count);
        for (name, value) in [
            ("min", s.min),
            ("p50", s.p50),
            ("p90", s.p90),
            ("p99", s.p99),
            ("p99.9", s.p999),
            ("max", s.max),
            ("mean", s.mean),
        ] {
            println!("  {:>8} {:>10}", name, format_latency_ns(value));
        }
    }

    Ok(())
}
