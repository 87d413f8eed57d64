use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "mapdeque automation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the deque workload suite once per global allocator
    Bench {
        /// Run quickly (lower sample size/time)
        #[arg(long, default_value_t = false)]
        quick: bool,

        /// Generate report only (skip running benchmarks)
        #[arg(long, default_value_t = false)]
        report_only: bool,

        /// Restrict the run to these allocator features
        #[arg(long = "alloc", value_name = "FEATURE")]
        allocators: Vec<String>,
    },
}

const ALLOCATORS: &[&str] = &["alloc-system", "alloc-mimalloc", "alloc-snmalloc", "alloc-jemalloc"];

const CRITERION_DIR: &str = "target/criterion";
const REPORT_DIR: &str = "benchmark_results";

/// Mean throughput of one workload under one allocator baseline.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Measurement {
    workload: String,
    allocator: String,
    ops_per_sec: f64,
}

/// Criterion's `benchmark.json`, reduced to what the report needs.
#[derive(Debug, Deserialize)]
struct BenchmarkMeta {
    throughput: Option<Throughput>,
}

#[derive(Debug, Deserialize)]
enum Throughput {
    Elements(u64),
    Bytes(u64),
}

/// Criterion's `estimates.json`, reduced to the mean.
#[derive(Debug, Deserialize)]
struct Estimates {
    mean: Estimate,
}

#[derive(Debug, Deserialize)]
struct Estimate {
    point_estimate: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Bench {
            quick,
            report_only,
            allocators,
        } => {
            let selected = select_allocators(&allocators)?;
            if !report_only {
                run_benchmarks(&selected, quick)?;
            }
            generate_report(&selected)?;
        }
    }

    Ok(())
}

fn select_allocators(requested: &[String]) -> Result<Vec<&'static str>> {
    if requested.is_empty() {
        return Ok(ALLOCATORS.to_vec());
    }
    requested
        .iter()
        .map(|name| {
            ALLOCATORS
                .iter()
                .copied()
                .find(|a| *a == name.as_str() || baseline_name(a) == name.as_str())
                .with_context(|| format!("unknown allocator feature `{name}`"))
        })
        .collect()
}

fn run_benchmarks(allocators: &[&str], quick: bool) -> Result<()> {
    println!("Running allocator comparison...");

    println!("Compiling benchmarks...");
    let status = Command::new("cargo")
        .args(["build", "--bench", "suite", "--release"])
        .status()
        .context("failed to spawn cargo")?;
    if !status.success() {
        anyhow::bail!("Failed to compile benchmarks");
    }

    for &alloc in allocators {
        println!("\n>>> Benchmarking with feature: {alloc}");
        let start = Instant::now();

        let mut cmd = Command::new("cargo");
        cmd.env("CARGO_INCREMENTAL", "0")
            .args(["bench", "--bench", "suite", "--no-default-features", "--features", alloc])
            .arg("--")
            .arg("--save-baseline")
            .arg(baseline_name(alloc));

        if quick {
            cmd.args(["--measurement-time", "0.1", "--noplot", "--sample-size", "10"]);
        }

        let status = cmd
            .status()
            .with_context(|| format!("Failed to run bench for {alloc}"))?;

        if status.success() {
            println!("Finished {alloc} in {:.2?}", start.elapsed());
        } else {
            eprintln!("Warning: Benchmark failed for {alloc}");
        }
    }

    Ok(())
}

fn baseline_name(alloc: &str) -> &str {
    alloc.trim_start_matches("alloc-")
}

fn generate_report(allocators: &[&str]) -> Result<()> {
    println!("\n>>> Generating Report...");

    let criterion_dir = Path::new(CRITERION_DIR);
    if !criterion_dir.exists() {
        eprintln!("No criterion output found at {}", criterion_dir.display());
        return Ok(());
    }

    let mut measurements = Vec::new();
    collect_results(criterion_dir, &mut measurements)?;

    let mut table: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
    for m in &measurements {
        table
            .entry(m.workload.as_str())
            .or_default()
            .insert(m.allocator.as_str(), m.ops_per_sec);
    }

    fs::create_dir_all(REPORT_DIR)?;
    let report_path = PathBuf::from(REPORT_DIR).join("report.md");
    let mut file = fs::File::create(&report_path)
        .with_context(|| format!("cannot create {}", report_path.display()))?;

    writeln!(file, "# mapdeque Allocator Comparison")?;
    writeln!(file)?;

    write!(file, "| Workload |")?;
    for alloc in allocators {
        write!(file, " {} (Ops/s) | vs System |", baseline_name(alloc))?;
    }
    writeln!(file)?;

    write!(file, "|---|")?;
    for _ in allocators {
        write!(file, "---|---|")?;
    }
    writeln!(file)?;

    for (workload, by_alloc) in &table {
        write!(file, "| {workload} |")?;
        let system_ops = by_alloc.get("system").copied().unwrap_or(0.0);

        for alloc in allocators {
            match by_alloc.get(baseline_name(alloc)) {
                Some(&ops) => {
                    let rel = if system_ops > 0.0 { ops / system_ops } else { 0.0 };
                    write!(file, " {} | **{rel:.2}x** |", format_ops(ops))?;
                }
                None => write!(file, " N/A | - |")?,
            }
        }
        writeln!(file)?;
    }

    let json_path = PathBuf::from(REPORT_DIR).join("measurements.json");
    fs::write(&json_path, serde_json::to_string_pretty(&measurements)?)
        .with_context(|| format!("cannot write {}", json_path.display()))?;

    println!("Report written to {}", report_path.display());
    Ok(())
}

fn format_ops(ops: f64) -> String {
    if ops > 1_000_000.0 {
        format!("{:.2}M", ops / 1_000_000.0)
    } else if ops > 1_000.0 {
        format!("{:.2}K", ops / 1_000.0)
    } else {
        format!("{ops:.0}")
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|s| s.to_str())
}

/// Walks `target/criterion`; every `<workload>/<baseline>/estimates.json`
/// becomes one measurement.
fn collect_results(dir: &Path, out: &mut Vec<Measurement>) -> Result<()> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Ok(());
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_results(&path, out)?;
            continue;
        }
        if file_name(&path) != Some("estimates.json") {
            continue;
        }

        let Some(baseline_dir) = path.parent() else { continue };
        let Some(workload_dir) = baseline_dir.parent() else { continue };
        let (Some(baseline), Some(workload)) = (file_name(baseline_dir), file_name(workload_dir)) else {
            continue;
        };
        if baseline == "report" || workload == "report" {
            continue;
        }

        let elements = fs::read_to_string(workload_dir.join("benchmark.json"))
            .ok()
            .and_then(|content| serde_json::from_str::<BenchmarkMeta>(&content).ok())
            .and_then(|meta| meta.throughput)
            .map(|t| match t {
                Throughput::Elements(n) | Throughput::Bytes(n) => n as f64,
            });

        let content = fs::read_to_string(&path).with_context(|| format!("cannot read {}", path.display()))?;
        let estimates: Estimates =
            serde_json::from_str(&content).with_context(|| format!("malformed {}", path.display()))?;

        let time_ns = estimates.mean.point_estimate;
        if time_ns <= 0.0 {
            continue;
        }
        let ops_per_sec = elements.unwrap_or(1.0) * 1e9 / time_ns;

        out.push(Measurement {
            workload: workload.to_string(),
            allocator: baseline.to_string(),
            ops_per_sec,
        });
    }

    Ok(())
}
