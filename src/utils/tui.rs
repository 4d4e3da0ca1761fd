//! Text User Interface (TUI) utilities.
//!
//! Formats the console report. `format_*` functions build strings so the
//! layout can be tested; `print_*` and [`run_sweep`] write to stdout.

use terminal_size::{terminal_size, Width};

use crate::config::{AffinityMode, BenchConfig, StreamElement, TestConfig};
use crate::error::Result;
use crate::stream::Validation;
use crate::topology::CacheTopology;
use crate::utils::runner::{StreamBench, TestReport};
use crate::utils::timer::KernelStats;

/// Get the current terminal width, constrained to a reasonable range
fn get_term_width() -> usize {
    if let Some((Width(w), _)) = terminal_size() {
        (w as usize).clamp(40, 200)
    } else {
        80
    }
}

/// Banner width: the terminal width, capped so banners stay compact.
fn banner_width() -> usize {
    get_term_width().min(53)
}

fn plural(n: usize, upper: bool) -> &'static str {
    match (n > 1, upper) {
        (true, true) => "S",
        (true, false) => "s",
        (false, _) => "",
    }
}

fn join_cores<'a>(cores: impl IntoIterator<Item = &'a usize>) -> String {
    cores
        .into_iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Title framed by two rules of `fill`.
pub fn format_banner(title: &str, fill: char, width: usize) -> String {
    let rule = fill.to_string().repeat(width);
    format!("{}\n{}\n{}\n", rule, title, rule)
}

/// Opening block: title, array sizes, repeat count and topology.
pub fn format_header(config: &BenchConfig, topology: &CacheTopology, width: usize) -> String {
    let bytes_per_word = std::mem::size_of::<StreamElement>() as f64;
    let elems = config.array_size as f64;
    let mib = |n: f64| n / 1024.0 / 1024.0;
    let gib = |n: f64| n / 1024.0 / 1024.0 / 1024.0;

    let mut out = format_banner("STREAM Benchmark with pthread and Cache Affinity", '=', width);
    out.push_str(&format!(
        "Array size = {} (elements), Offset = {} (elements)\n",
        config.array_size, config.offset
    ));
    out.push_str(&format!(
        "Memory per array = {:.1} MiB (= {:.1} GiB).\n",
        bytes_per_word * mib(elems),
        bytes_per_word * gib(elems)
    ));
    out.push_str(&format!(
        "Total memory required = {:.1} MiB (= {:.1} GiB).\n",
        3.0 * bytes_per_word * mib(elems),
        3.0 * bytes_per_word * gib(elems)
    ));
    out.push_str(&format!(
        "Each kernel will be executed {} times.\n\n",
        config.ntimes
    ));

    out.push_str("CPU L3 Cache Topology Configuration:\n");
    out.push_str(&format!(
        "  Cores sharing L3: [{}]\n",
        join_cores(topology.shared_l3())
    ));
    out.push_str(&format!(
        "  Cores NOT sharing L3: [{}]\n\n",
        join_cores(topology.disjoint_l3())
    ));
    out
}

/// Subsection title of one affinity mode.
pub fn mode_title(mode: AffinityMode) -> &'static str {
    match mode {
        AffinityMode::Disabled => "--- WITHOUT Cache Affinity ---",
        AffinityMode::SharedL3 => "--- WITH Cache Affinity ---",
        AffinityMode::SplitL3 => "--- SPLIT Cache Affinity ---",
    }
}

/// `>>> 2 Cores x 3 Threads = 6 Total Threads <<<`
pub fn format_pair_header(num_cores: usize, threads_per_core: usize) -> String {
    format!(
        ">>> {} Core{} x {} Thread{} = {} Total Threads <<<\n",
        num_cores,
        plural(num_cores, false),
        threads_per_core,
        plural(threads_per_core, false),
        num_cores * threads_per_core
    )
}

/// Configuration block printed before each test.
pub fn format_test_config(test: &TestConfig, topology: &CacheTopology) -> String {
    let total = test.total_threads();
    let mut out = format!(
        "Configuration: {} core(s) x {} thread(s) = {} total threads\n",
        test.num_cores, test.threads_per_core, total
    );
    let affinity = match test.affinity {
        AffinityMode::Disabled => "DISABLED",
        AffinityMode::SharedL3 => "ENABLED (cores share L3)",
        AffinityMode::SplitL3 => "SPLIT (alternating L3 domains)",
    };
    out.push_str(&format!("Affinity: {}\n", affinity));

    if test.affinity.is_pinned() {
        let cores: Vec<usize> = topology
            .cores_for(total, test.num_cores, test.affinity)
            .into_iter()
            .flatten()
            .collect();
        out.push_str(&format!("Cores used: [{}]\n", join_cores(&cores)));
    }
    out.push('\n');
    out
}

/// The per-kernel throughput table.
pub fn format_results_table(stats: &[KernelStats]) -> String {
    let mut out =
        String::from("Function    Best Rate MB/s  Avg time     Min time     Max time\n");
    for s in stats {
        out.push_str(&format!(
            "{}{:12.1}  {:11.6}  {:11.6}  {:11.6}\n",
            s.kernel.label(),
            s.best_rate_mb_s(),
            s.avg_time,
            s.min_time,
            s.max_time
        ));
    }
    out
}

pub fn format_validation(validation: &Validation) -> String {
    if validation.passed {
        "Solution Validates\n".to_string()
    } else {
        format!(
            "Solution does NOT validate (max relative error {:e})\n",
            validation.max_rel_error
        )
    }
}

/// Lines printed before a test, given the `(cores, threads_per_core)` pair of
/// the previous one.
///
/// A new core count opens a `#` banner and a new pair opens its header. Pairs
/// after the first are separated from the previous pair by a blank line.
pub fn format_transition(last: Option<(usize, usize)>, test: &TestConfig, width: usize) -> String {
    let pair = (test.num_cores, test.threads_per_core);
    if last == Some(pair) {
        return "\n".to_string();
    }

    let mut out = String::new();
    if last.is_some() {
        out.push('\n');
    }
    if last.map(|(cores, _)| cores) != Some(test.num_cores) {
        let title = format!(
            "# TESTING WITH {} CORE{}",
            test.num_cores,
            plural(test.num_cores, true)
        );
        out.push('\n');
        out.push_str(&format_banner(&title, '#', width));
        out.push('\n');
    }
    out.push_str(&format_pair_header(test.num_cores, test.threads_per_core));
    out.push('\n');
    out
}

/// Print the opening block
pub fn print_header(config: &BenchConfig, topology: &CacheTopology) {
    print!("{}", format_header(config, topology, banner_width()));
}

/// Run every configuration of the sweep, printing each result as it completes.
pub fn run_sweep(bench: &mut StreamBench) -> Result<Vec<TestReport>> {
    let width = banner_width();
    let tests: Vec<TestConfig> = bench.config().sweep().collect();
    let mut reports = Vec::with_capacity(tests.len());

    print!(
        "\n{}\n",
        format_banner("COMPREHENSIVE TEST: All Core/Thread Combinations", '=', width)
    );

    let mut last: Option<(usize, usize)> = None;
    for test in tests {
        print!("{}", format_transition(last, &test, width));
        last = Some((test.num_cores, test.threads_per_core));

        println!("{}", mode_title(test.affinity));
        print!("{}", format_test_config(&test, bench.topology()));

        let report = bench.run_test(test)?;
        print!("{}", format_results_table(&report.stats));
        print!("{}", format_validation(&report.validation));
        reports.push(report);
    }
    println!();

    Ok(reports)
}

/// Print the help message
pub fn print_help() {
    println!("Usage: stream-affinity [OPTIONS]");
    println!();
    println!("Runs Copy/Scale/Add/Triad over every core x thread x affinity combination.");
    println!();
    println!("Options:");
    println!("  --size N            Array elements (default: 10000000)");
    println!("  --offset N          Padding elements per array (default: 0)");
    println!("  --ntimes N          Repeats per kernel, first is discarded (default: 10)");
    println!("  --max-cores N       Sweep core counts 1..=N (default: 8)");
    println!("  --max-threads N     Sweep threads per core 1..=N (default: 8)");
    println!("  --l3-cores LIST     Cores sharing one L3 cache (default: 0,1,2,3)");
    println!("  --other-cores LIST  Cores outside that L3 cache (default: 4,5,6,7)");
    println!("  --split             Also run with workers split across both groups");
    println!("  --csv PATH          Export one row per configuration and kernel to CSV");
    println!("  --help, -h          Show this help message");
    println!();
    println!("Logging goes to stderr and is controlled by RUST_LOG (default: warn).");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{expected_values, validate, Kernel};
    use crate::utils::timer::TimingTable;
    use std::time::Duration;

    #[test]
    fn test_results_table_layout() {
        let mut table = TimingTable::new(2);
        for kernel in Kernel::ALL {
            table.record(kernel, 1, Duration::from_millis(10));
        }
        let text = format_results_table(&table.summarize(1_000_000));
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("Function    Best Rate MB/s"));
        assert!(lines[1].starts_with("Copy:      "));
        assert!(lines[2].starts_with("Scale:     "));
        assert!(lines[3].starts_with("Add:       "));
        assert!(lines[4].starts_with("Triad:     "));
        assert!(lines[1].contains("0.010000"));
    }

    #[test]
    fn test_pair_header_pluralization() {
        assert_eq!(
            format_pair_header(1, 1),
            ">>> 1 Core x 1 Thread = 1 Total Threads <<<\n"
        );
        assert_eq!(
            format_pair_header(2, 3),
            ">>> 2 Cores x 3 Threads = 6 Total Threads <<<\n"
        );
    }

    #[test]
    fn test_config_lists_cores_only_when_pinned() {
        let topo = CacheTopology::default();
        let pinned = format_test_config(&TestConfig::new(2, 3, AffinityMode::SharedL3), &topo);
        assert!(pinned.contains("Affinity: ENABLED (cores share L3)"));
        assert!(pinned.contains("Cores used: [0, 1, 0, 1, 0, 1]"));

        let free = format_test_config(&TestConfig::new(2, 3, AffinityMode::Disabled), &topo);
        assert!(free.contains("Affinity: DISABLED"));
        assert!(!free.contains("Cores used"));
    }

    #[test]
    fn test_header_lists_topology() {
        let config = BenchConfig {
            array_size: 1000,
            ntimes: 2,
            ..BenchConfig::default()
        };
        let text = format_header(&config, &CacheTopology::default(), 53);
        assert!(text.contains("Array size = 1000 (elements), Offset = 0 (elements)"));
        assert!(text.contains("Each kernel will be executed 2 times."));
        assert!(text.contains("Cores sharing L3: [0, 1, 2, 3]"));
        assert!(text.contains("Cores NOT sharing L3: [4, 5, 6, 7]"));
    }

    #[test]
    fn test_banner() {
        assert_eq!(format_banner("X", '#', 3), "###\nX\n###\n");
    }

    #[test]
    fn test_validation_line() {
        assert_eq!(
            format_validation(&validate(expected_values(4), 4)),
            "Solution Validates\n"
        );
        let (a, b, c) = expected_values(4);
        assert!(format_validation(&validate((a * 2.0, b, c), 4)).contains("does NOT validate"));
    }

    #[test]
    fn test_transition_separates_pairs() {
        let banner = |n: usize| {
            let title = format!("# TESTING WITH {} CORE{}", n, plural(n, true));
            format_banner(&title, '#', 5)
        };

        let first = format_transition(None, &TestConfig::new(1, 1, AffinityMode::Disabled), 5);
        assert_eq!(first, format!("\n{}\n{}\n", banner(1), format_pair_header(1, 1)));

        let same = format_transition(Some((1, 1)), &TestConfig::new(1, 1, AffinityMode::SharedL3), 5);
        assert_eq!(same, "\n");

        let next_pair = format_transition(Some((1, 1)), &TestConfig::new(1, 2, AffinityMode::Disabled), 5);
        assert_eq!(next_pair, format!("\n{}\n", format_pair_header(1, 2)));

        let next_cores = format_transition(Some((1, 8)), &TestConfig::new(2, 1, AffinityMode::Disabled), 5);
        assert_eq!(
            next_cores,
            format!("\n\n{}\n{}\n", banner(2), format_pair_header(2, 1))
        );
    }

    #[test]
    fn test_run_sweep_small() {
        let config = BenchConfig {
            array_size: 1000,
            ntimes: 2,
            max_cores: 2,
            max_threads_per_core: 2,
            ..BenchConfig::default()
        };
        let mut bench = StreamBench::new(config, CacheTopology::default()).unwrap();
        let reports = run_sweep(&mut bench).unwrap();
        assert_eq!(reports.len(), 2 * 2 * 2);
        assert!(reports.iter().all(|r| r.validation.passed));
    }
}
