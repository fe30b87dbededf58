//! End-to-end tests: files on disk through loading, aggregation, grids,
//! ratio reports and rendering.

use hashring_eval::config::Config;
use hashring_eval::experiment;
use hashring_eval::{AnalysisError, loader, max_per_run, mean, percentile};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn test_suffixed_latency_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "latency.txt", "100ns\n200ns\n300ns\n");

    let loaded = loader::load_latency_file(&dir.path().join("latency.txt"), true).unwrap();
    assert_eq!(loaded.units.iter().collect::<Vec<_>>(), vec!["ns"]);
    assert!(approx(percentile(&loaded.samples, 99.0).unwrap(), 298.0));
    assert_eq!(mean(&loaded.samples).unwrap(), 200.0);
}

#[test]
fn test_plain_latency_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "latency.txt", "1000\n2000\n3000\n");

    let loaded = loader::load_latency_file(&dir.path().join("latency.txt"), false).unwrap();
    assert!(loaded.units.is_empty());
    assert!(approx(percentile(&loaded.samples, 99.0).unwrap(), 2980.0));
    assert_eq!(mean(&loaded.samples).unwrap(), 2000.0);
}

#[test]
fn test_run_keyed_file() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "runs.txt", "100 5.0\n100 7.0\n200 3.0\n");

    let obs = loader::load_run_keyed_file(&dir.path().join("runs.txt")).unwrap();
    let maxima = max_per_run(&obs, &[100, 200]).unwrap();
    assert_eq!(maxima, vec![(100, 7.0), (200, 3.0)]);

    assert!(matches!(
        max_per_run(&obs, &[100, 300]),
        Err(AnalysisError::MissingRun { key: 300 })
    ));
}

#[test]
fn test_load_errors_carry_path() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "bad.txt", "100ns\n5ms\n");

    let path = dir.path().join("bad.txt");
    let err = loader::load_latency_file(&path, true).unwrap_err();
    assert!(matches!(err.root(), AnalysisError::UnknownUnit { .. }));
    assert!(err.to_string().contains("bad.txt"));

    let missing = loader::load_latency_file(&dir.path().join("nope.txt"), false).unwrap_err();
    assert!(matches!(missing.root(), AnalysisError::Io(_)));
}

const CONFIG: &str = r#"
[output]
directory = "out"

[[latency]]
name = "replicas"
percentile = 90.0
axis = [100, 1, 10]
x_scale = "log"

[[latency.series]]
label = "kademlia"
path = "kademlia/latency_{axis}_replicas.csv"
format = "csv"

[[latency.series]]
label = "cycle"
path = "cycle/1-{axis}.txt"
units = true

[[throughput]]
name = "scalability"
rates = [100, 200]

[[throughput.series]]
label = "3 nodes"
path = "throughput_3.txt"

[[throughput.series]]
label = "5 nodes"
path = "throughput_5.txt"

[[ratio]]
name = "server-share"
path = "single_url.log"
baseline = "sent"
numerators = ["a:80", "b:80"]
"#;

fn fixture() -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    let root = dir.path();

    for replicas in [1, 10, 100] {
        let base = replicas as f64;
        write(
            root,
            &format!("kademlia/latency_{}_replicas.csv", replicas),
            &format!("{},{}\n{},{}\n", base, base * 2.0, base * 3.0, base * 4.0),
        );
        write(
            root,
            &format!("cycle/1-{}.txt", replicas),
            &format!("{}µs\n{}ns\n", replicas, replicas),
        );
    }
    write(root, "throughput_3.txt", "100 90.0\n200 150.0\n100 95.0\n400 10.0\n");
    write(root, "throughput_5.txt", "200 190.0\n100 99.0\n");
    write(
        root,
        "single_url.log",
        "Requests sent per second: map[0:10 1:0 2:20]\n\
         Error making request: timeout\n\
         Responses received per second for host a:80: map[0:5 2:10 3:1]\n\
         Responses received per second for host b:80: map[1:4]\n",
    );
    write(root, "experiments.toml", CONFIG);

    let config = Config::load(&root.join("experiments.toml")).unwrap();
    (dir, config)
}

#[test]
fn test_latency_experiment() {
    let (_dir, config) = fixture();
    let outcome = experiment::run_latency(&config.latency[0]).unwrap();
    let grid = &outcome.grid;

    assert_eq!(grid.labels(), vec!["kademlia", "cycle"]);

    let kademlia = grid.get("kademlia").unwrap();
    let axis: Vec<u64> = kademlia.cells.iter().map(|c| c.axis).collect();
    assert_eq!(axis, vec![100, 1, 10]);
    // samples base * [1, 2, 3, 4]; p90 rank 2.7 -> base * 3.7
    assert!(approx(kademlia.value_at(10).unwrap(), 37.0));

    // samples [x ns, 1000x ns]; p90 = x + 0.9 * 999x
    let cycle = grid.get("cycle").unwrap();
    assert!(approx(cycle.value_at(1).unwrap(), 1.0 + 0.9 * 999.0));

    let summary = &outcome.summaries["kademlia"][&10];
    assert_eq!(summary.count, 4);
    assert_eq!(summary.max, 40.0);
    assert!(approx(summary.mean, 25.0));
}

#[test]
fn test_run_selected_computes_before_output() {
    let (dir, config) = fixture();

    let report = experiment::run_selected(&config, |_| true).unwrap();
    assert_eq!(report.latency.len(), 1);
    assert_eq!(report.throughput.len(), 1);
    assert_eq!(report.ratio.len(), 1);

    // a failing later experiment fails the whole run
    fs::remove_file(dir.path().join("single_url.log")).unwrap();
    let err = experiment::run_selected(&config, |_| true).unwrap_err();
    assert!(matches!(err.root(), AnalysisError::Io(_)));

    let report = experiment::run_selected(&config, |name| name != "server-share").unwrap();
    assert!(report.ratio.is_empty());
    assert_eq!(report.latency[0].0.name, "replicas");
}

#[test]
fn test_throughput_experiment() {
    let (_dir, config) = fixture();
    let grid = experiment::run_throughput(&config.throughput[0]).unwrap();

    let three = grid.get("3 nodes").unwrap();
    assert_eq!(three.value_at(100), Some(95.0));
    assert_eq!(three.value_at(200), Some(150.0));
    assert_eq!(three.value_at(400), None);

    let five = grid.get("5 nodes").unwrap();
    assert_eq!(five.cells.iter().map(|c| c.axis).collect::<Vec<_>>(), vec![100, 200]);
    assert_eq!(five.value_at(200), Some(190.0));
}

#[test]
fn test_throughput_missing_rate() {
    let (_dir, mut config) = fixture();
    config.throughput[0].rates.push(800);

    let err = experiment::run_throughput(&config.throughput[0]).unwrap_err();
    assert!(matches!(err.root(), AnalysisError::MissingRun { key: 800 }));
}

#[test]
fn test_ratio_experiment() {
    let (_dir, config) = fixture();
    let outcome = experiment::run_ratio(&config.ratio[0]).unwrap();

    // baseline has keys 0..=2, numerators reach bucket 3
    assert_eq!(outcome.counts.labels(), vec!["sent", "a:80", "b:80"]);
    assert_eq!(outcome.counts.axis_values(), vec![0, 1, 2, 3]);
    assert_eq!(outcome.counts.get("sent").unwrap().value_at(3), Some(0.0));

    let a = outcome.ratios.get("a:80").unwrap();
    assert_eq!(a.value_at(0), Some(0.5));
    assert_eq!(a.value_at(1), None);
    assert_eq!(a.value_at(2), Some(0.5));
    assert_eq!(a.value_at(3), None);

    let b = outcome.ratios.get("b:80").unwrap();
    assert_eq!(b.value_at(0), Some(0.0));
    assert_eq!(b.value_at(2), Some(0.0));

    // bucket 1 has a zero baseline for both numerators
    assert_eq!(outcome.degenerate(), 2);
    assert!(outcome.summaries[0].errors.contains_key("1"));
}

#[test]
fn test_ratio_unknown_label() {
    let (_dir, mut config) = fixture();
    config.ratio[0].numerators.push("c:80".to_string());

    let err = experiment::run_ratio(&config.ratio[0]).unwrap_err();
    assert!(matches!(err.root(), AnalysisError::Config(_)));
}

#[test]
fn test_rendered_outputs() {
    let (dir, config) = fixture();
    let grid = experiment::run_latency(&config.latency[0]).unwrap().grid;
    let opts = config.latency[0]
        .chart
        .options("replicas", "replicas", "p90 latency (ns)");

    let out = dir.path().join("out").join("replicas.html");
    hashring_eval::output::write_chart(&out, &hashring_eval::render::html(&grid, &opts)).unwrap();

    let page = fs::read_to_string(&out).unwrap();
    assert!(page.contains("\"logarithmic\""));
    assert!(page.contains("\"kademlia\""));
    assert!(page.contains("\"cycle\""));
}
