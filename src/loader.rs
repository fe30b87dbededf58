//! Loaders for the raw measurement files written by the load generators.
//!
//! Every loader makes one forward pass over its input. Any malformed line
//! fails the whole load; there are no partial results.

use crate::error::{AnalysisError, Result};
use crate::stats::RunObservations;
use crate::units::{UnitNormalizer, parse_float};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Layout of a latency sample file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// One value per line, optionally unit suffixed.
    #[default]
    Lines,
    /// Comma separated values, any number per row.
    Csv,
}

impl std::str::FromStr for SampleFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lines" => Ok(SampleFormat::Lines),
            "csv" => Ok(SampleFormat::Csv),
            _ => Err(format!("invalid format '{}', expected: lines, csv", s)),
        }
    }
}

/// Latency samples in nanoseconds, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatencySamples {
    pub samples: Vec<f64>,
    /// Distinct unit markers seen in the file. Empty for bare values.
    pub units: BTreeSet<String>,
}

/// Per-second counts keyed by label (`sent` or a host address).
pub type BucketMaps = BTreeMap<String, BTreeMap<u64, f64>>;

/// Parse a flat latency file: one measurement per line.
pub fn parse_latency_lines<R: BufRead>(reader: R, suffixed: bool) -> Result<LatencySamples> {
    let mut normalizer = UnitNormalizer::new(suffixed);
    let mut samples = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        let value = normalizer
            .normalize(token)
            .map_err(|e| at_line(e, idx + 1))?;
        samples.push(value);
    }

    Ok(LatencySamples {
        samples,
        units: normalizer.into_units_seen(),
    })
}

/// Parse a comma separated sample file. Rows are flattened in order.
pub fn parse_csv_samples<R: Read>(reader: R) -> Result<Vec<f64>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut samples = Vec::new();
    for record in csv.records() {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        for field in record.iter() {
            let value = parse_float(field).map_err(|e| at_line(e, line))?;
            samples.push(value);
        }
    }

    Ok(samples)
}

/// Parse a run-keyed throughput file: `<run_id> <throughput>` per line.
pub fn parse_run_keyed<R: BufRead>(reader: R) -> Result<RunObservations> {
    let mut observations = RunObservations::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let lineno = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(AnalysisError::parse(
                lineno,
                &line,
                format!("expected 2 fields, found {}", fields.len()),
            ));
        }

        let key = fields[0]
            .parse::<u64>()
            .map_err(|e| AnalysisError::parse(lineno, fields[0], e))?;
        let value = parse_float(fields[1]).map_err(|e| at_line(e, lineno))?;

        observations.push(key, value);
    }

    Ok(observations)
}

/// Parse one printed per-second count map, e.g.
/// `Responses received per second for host 10.0.0.7:8080: map[0:49 1:400]`.
///
/// Returns the label and the counts. The label is the host for response
/// lines, `sent` for the request line, and the text before the map otherwise.
pub fn parse_bucket_map(line: &str) -> Result<(String, BTreeMap<u64, f64>)> {
    let start = line
        .find("map[")
        .ok_or_else(|| AnalysisError::parse(0, line, "missing map["))?;
    let end = line
        .rfind(']')
        .filter(|&end| end > start)
        .ok_or_else(|| AnalysisError::parse(0, line, "missing closing ]"))?;

    let prefix = line[..start].trim().trim_end_matches(':').trim();
    let label = if let Some((_, host)) = prefix.split_once(" for host ") {
        host.to_string()
    } else if prefix.contains(" sent ") {
        "sent".to_string()
    } else {
        prefix.to_string()
    };

    let mut counts = BTreeMap::new();
    for entry in line[start + 4..end].split_whitespace() {
        let (key, value) = entry
            .split_once(':')
            .ok_or_else(|| AnalysisError::parse(0, entry, "expected key:value"))?;
        let key = key
            .parse::<u64>()
            .map_err(|e| AnalysisError::parse(0, entry, e))?;
        let value = parse_float(value)?;
        counts.insert(key, value);
    }

    Ok((label, counts))
}

/// Parse every count map in a load generator log. Lines without a map
/// (request errors, progress output) are skipped.
pub fn parse_bucket_maps<R: BufRead>(reader: R) -> Result<BucketMaps> {
    let mut maps = BucketMaps::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if !line.contains("map[") {
            continue;
        }
        let (label, counts) = parse_bucket_map(&line).map_err(|e| at_line(e, idx + 1))?;
        if maps.contains_key(&label) {
            return Err(AnalysisError::parse(
                idx + 1,
                &label,
                "label appears more than once",
            ));
        }
        maps.insert(label, counts);
    }

    Ok(maps)
}

pub fn load_latency_file(path: &Path, suffixed: bool) -> Result<LatencySamples> {
    let loaded = open(path)
        .and_then(|r| parse_latency_lines(r, suffixed))
        .map_err(|e| e.in_file(path))?;

    tracing::debug!(
        path = %path.display(),
        samples = loaded.samples.len(),
        units = ?loaded.units,
        "loaded latency file"
    );

    Ok(loaded)
}

pub fn load_csv_file(path: &Path) -> Result<Vec<f64>> {
    let samples = open(path)
        .and_then(parse_csv_samples)
        .map_err(|e| e.in_file(path))?;

    tracing::debug!(path = %path.display(), samples = samples.len(), "loaded csv file");

    Ok(samples)
}

/// Load latency samples in either layout.
pub fn load_samples(
    path: &Path,
    format: SampleFormat,
    suffixed: bool,
) -> Result<LatencySamples> {
    match format {
        SampleFormat::Lines => load_latency_file(path, suffixed),
        SampleFormat::Csv => Ok(LatencySamples {
            samples: load_csv_file(path)?,
            units: BTreeSet::new(),
        }),
    }
}

pub fn load_run_keyed_file(path: &Path) -> Result<RunObservations> {
    let observations = open(path)
        .and_then(parse_run_keyed)
        .map_err(|e| e.in_file(path))?;

    tracing::debug!(
        path = %path.display(),
        runs = observations.len(),
        observations = observations.observations(),
        "loaded run-keyed file"
    );

    Ok(observations)
}

pub fn load_bucket_map_file(path: &Path) -> Result<BucketMaps> {
    let maps = open(path)
        .and_then(parse_bucket_maps)
        .map_err(|e| e.in_file(path))?;

    tracing::debug!(path = %path.display(), labels = maps.len(), "loaded bucket maps");

    Ok(maps)
}

fn open(path: &Path) -> Result<BufReader<File>> {
    Ok(BufReader::new(File::open(path)?))
}

/// Set the line number on a parse error raised below the line loop.
fn at_line(err: AnalysisError, lineno: usize) -> AnalysisError {
    match err {
        AnalysisError::Parse { text, reason, .. } => AnalysisError::Parse {
            line: lineno,
            text,
            reason,
        },
        other => other,
    }
}
