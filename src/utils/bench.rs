//! CSV export of sweep results.

use std::io::Write;

use crate::error::Result;
use crate::utils::runner::TestReport;

const CSV_HEADER: &str =
    "cores,threads_per_core,total_threads,affinity,kernel,best_rate_mb_s,avg_s,min_s,max_s,validated";

/// Write one row per (configuration, kernel).
pub fn write_csv<W: Write>(mut out: W, reports: &[TestReport]) -> Result<()> {
    writeln!(out, "{}", CSV_HEADER)?;

    for report in reports {
        let config = &report.config;
        for stats in &report.stats {
            writeln!(
                out,
                "{},{},{},{},{},{:.1},{:.6},{:.6},{:.6},{}",
                config.num_cores,
                config.threads_per_core,
                config.total_threads(),
                config.affinity.name(),
                stats.kernel.name(),
                stats.best_rate_mb_s(),
                stats.avg_time,
                stats.min_time,
                stats.max_time,
                report.validation.passed
            )?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Export sweep results to a CSV file at `path`.
pub fn export_csv(path: &str, reports: &[TestReport]) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(std::io::BufWriter::new(file), reports)
}
