use clap::Parser;
use hashring_eval::config::{Config, LatencyExperiment, RatioExperiment, ThroughputExperiment};
use hashring_eval::experiment::{self, LatencyOutcome, RatioOutcome};
use hashring_eval::output::{self, format};
use hashring_eval::{ExperimentGrid, logging, render};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "hashring-eval")]
#[command(about = "Compare overlay latency and load generator throughput across experiments")]
#[command(version)]
struct Cli {
    /// Path to the experiment configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Run only the named experiment (may be repeated)
    #[arg(long, value_name = "NAME")]
    only: Vec<String>,

    /// Validate the configuration and list experiments without loading data
    #[arg(long)]
    dry_run: bool,

    /// Print tables only, don't write charts or JSON summaries
    #[arg(long)]
    no_write: bool,
}

impl Cli {
    fn selected(&self, name: &str) -> bool {
        self.only.is_empty() || self.only.iter().any(|n| n == name)
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    logging::init(&config.logging);

    let names = config.experiment_names();
    if let Some(unknown) = cli.only.iter().find(|n| !names.contains(&n.as_str())) {
        return Err(format!(
            "unknown experiment '{}', expected one of: {}",
            unknown,
            names.join(", ")
        )
        .into());
    }

    if cli.dry_run {
        println!("configuration ok: {}", cli.config.display());
        for name in names.iter().filter(|n| cli.selected(n)) {
            println!("  {}", name);
        }
        return Ok(());
    }

    let report = experiment::run_selected(&config, |name| cli.selected(name))?;
    let out_dir = (!cli.no_write).then_some(config.output.directory.as_path());

    for (exp, outcome) in &report.latency {
        latency(exp, outcome, out_dir)?;
    }
    for (exp, grid) in &report.throughput {
        throughput(exp, grid, out_dir)?;
    }
    for (exp, outcome) in &report.ratio {
        ratio(exp, outcome, out_dir)?;
    }

    Ok(())
}

fn latency(
    exp: &LatencyExperiment,
    outcome: &LatencyOutcome,
    out_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let statistic = format!("p{}", exp.percentile);

    println!("{} ({} latency):", exp.name, statistic);
    print!("{}", render::table(&outcome.grid, format::format_latency_ns));
    println!();

    if let Some(dir) = out_dir {
        let opts = exp.chart.options(
            &exp.name,
            "replicas",
            &format!("{} latency (ns)", statistic),
        );
        output::write_chart(
            &dir.join(format!("{}.html", exp.name)),
            &render::html(&outcome.grid, &opts),
        )?;
        output::write_latency_json(
            &dir.join(format!("{}.json", exp.name)),
            &exp.name,
            &statistic,
            outcome,
        )?;
    }
    Ok(())
}

fn throughput(
    exp: &ThroughputExperiment,
    grid: &ExperimentGrid,
    out_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    println!("{} (max throughput):", exp.name);
    print!("{}", render::table(grid, format::format_rate));
    println!();

    if let Some(dir) = out_dir {
        let opts = exp
            .chart
            .options(&exp.name, "target rate (req/s)", "throughput (req/s)");
        output::write_chart(&dir.join(format!("{}.html", exp.name)), &render::html(grid, &opts))?;
        output::write_grid_json(
            &dir.join(format!("{}.json", exp.name)),
            &exp.name,
            "max_throughput",
            grid,
        )?;
    }
    Ok(())
}

fn ratio(
    exp: &RatioExperiment,
    outcome: &RatioOutcome,
    out_dir: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let RatioOutcome {
        counts,
        ratios,
        summaries,
    } = outcome;

    println!("{} (ratio to {}):", exp.name, exp.baseline);
    print!("{}", render::table(ratios, format::format_ratio));
    for summary in summaries {
        for (key, err) in &summary.errors {
            println!("  {} @ {}: {}", summary.numerator, key, err);
        }
    }
    println!();

    if let Some(dir) = out_dir {
        let opts = exp
            .chart
            .options(&exp.name, "timestamp bucket (second)", "requests");
        let html = render::html(counts, &opts);
        output::write_chart(&dir.join(format!("{}-counts.html", exp.name)), &html)?;

        let ratio_opts = render::ChartOptions {
            title: format!("{} ratio to {}", opts.title, exp.baseline),
            y_title: "ratio".to_string(),
            threshold: None,
            ..opts
        };
        let html = render::html(ratios, &ratio_opts);
        output::write_chart(&dir.join(format!("{}-ratio.html", exp.name)), &html)?;
        output::write_ratio_json(&dir.join(format!("{}.json", exp.name)), summaries)?;
    }
    Ok(())
}
