//! STREAM bandwidth sweep over cores, threads per core and cache affinity.
//!
//! Usage:
//!   stream-affinity                       # Full 8 x 8 x 2 sweep with defaults
//!   stream-affinity --max-cores 4 --split # Smaller sweep, add split-L3 mode
//!   stream-affinity --csv results.csv     # Also export raw results
//!   stream-affinity --help                # Show help

use std::env;
use std::process;

use stream_affinity::config::{AffinityMode, BenchConfig};
use stream_affinity::topology::CacheTopology;
use stream_affinity::utils::runner::StreamBench;
use stream_affinity::{tui, utils, StreamError};
use tracing_subscriber::EnvFilter;

fn parse_count(flag: &str, value: Option<&String>) -> Result<usize, String> {
    let value = value.ok_or_else(|| format!("{} requires a value", flag))?;
    value
        .trim()
        .parse()
        .map_err(|_| format!("{} expects a non-negative integer, got '{}'", flag, value))
}

fn parse_cores(flag: &str, value: Option<&String>) -> Result<Vec<usize>, String> {
    let value = value.ok_or_else(|| format!("{} requires a value", flag))?;
    value
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| {
            s.trim()
                .parse()
                .map_err(|_| format!("{} expects comma-separated core ids, got '{}'", flag, s))
        })
        .collect()
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();

    let mut config = BenchConfig::default();
    let defaults = CacheTopology::default();
    let mut shared_l3 = defaults.shared_l3().to_vec();
    let mut disjoint_l3 = defaults.disjoint_l3().to_vec();
    let mut csv_path: Option<String> = None;

    // Parse arguments
    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let parsed = match flag {
            "--help" | "-h" => {
                tui::print_help();
                return;
            }
            "--size" => parse_count(flag, args.get(i + 1)).map(|n| config.array_size = n),
            "--offset" => parse_count(flag, args.get(i + 1)).map(|n| config.offset = n),
            "--ntimes" => parse_count(flag, args.get(i + 1)).map(|n| config.ntimes = n),
            "--max-cores" => parse_count(flag, args.get(i + 1)).map(|n| config.max_cores = n),
            "--max-threads" => {
                parse_count(flag, args.get(i + 1)).map(|n| config.max_threads_per_core = n)
            }
            "--l3-cores" => parse_cores(flag, args.get(i + 1)).map(|c| shared_l3 = c),
            "--other-cores" => parse_cores(flag, args.get(i + 1)).map(|c| disjoint_l3 = c),
            "--csv" => args
                .get(i + 1)
                .map(|p| csv_path = Some(p.clone()))
                .ok_or_else(|| "--csv requires a path".to_string()),
            "--split" => {
                if !config.modes.contains(&AffinityMode::SplitL3) {
                    config.modes.push(AffinityMode::SplitL3);
                }
                i += 1;
                continue;
            }
            _ => Err(format!("Unknown option: {}", flag)),
        };
        if let Err(message) = parsed {
            fail(message);
        }
        i += 2;
    }

    let topology = CacheTopology::new(shared_l3, disjoint_l3).unwrap_or_else(|e| fail(e));

    let mut bench = match StreamBench::new(config, topology) {
        Ok(bench) => bench,
        Err(StreamError::Allocation { bytes }) => {
            fail(format!("Failed to allocate memory! ({} bytes per array)", bytes))
        }
        Err(e) => fail(e),
    };

    tui::print_header(bench.config(), bench.topology());

    let reports = tui::run_sweep(&mut bench).unwrap_or_else(|e| fail(e));

    if let Some(path) = csv_path {
        match utils::export_csv(&path, &reports) {
            Ok(()) => println!("Raw data exported to: {}", path),
            Err(e) => fail(format!("Failed to export CSV: {}", e)),
        }
    }
}
