//! Utility modules for running and reporting the benchmark.

pub mod bench;
pub mod cpu_affinity;
pub mod gate;
pub mod runner;
pub mod timer;
pub mod tui;

// Re-export commonly used items
pub use bench::export_csv;
pub use cpu_affinity::CpuPinGuard;
pub use gate::StartGate;
pub use runner::{StreamBench, TestReport};
pub use timer::{KernelStats, TimingTable};
