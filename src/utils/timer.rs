//! Timing table and per-kernel statistics.
//!
//! Every test configuration fills a `4 x ntimes` grid of wall-clock durations.
//! Repeat 0 is a warm-up and never contributes to the statistics.

use std::time::{Duration, Instant};

use crate::stream::Kernel;

/// Aggregated timings of one kernel, in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelStats {
    pub kernel: Kernel,
    pub avg_time: f64,
    pub min_time: f64,
    pub max_time: f64,
    /// Samples that entered the statistics (`ntimes - 1`).
    pub samples: usize,
    /// Bytes counted per execution of the kernel.
    pub bytes: f64,
}

impl KernelStats {
    /// Best observed rate in MB/s (10^6 bytes), computed from the minimum time.
    pub fn best_rate_mb_s(&self) -> f64 {
        if self.min_time > 0.0 {
            1.0e-6 * self.bytes / self.min_time
        } else {
            f64::INFINITY
        }
    }
}

/// Raw `kernel x repeat` grid of elapsed times for one configuration.
#[derive(Clone, Debug)]
pub struct TimingTable {
    times: [Vec<Duration>; 4],
}

impl TimingTable {
    pub fn new(ntimes: usize) -> Self {
        Self {
            times: std::array::from_fn(|_| vec![Duration::ZERO; ntimes]),
        }
    }

    pub fn record(&mut self, kernel: Kernel, repeat: usize, elapsed: Duration) {
        self.times[kernel.index()][repeat] = elapsed;
    }

    /// Run `f` and record its wall-clock duration.
    pub fn time<R>(&mut self, kernel: Kernel, repeat: usize, f: impl FnOnce() -> R) -> R {
        let start = Instant::now();
        let result = f();
        self.record(kernel, repeat, start.elapsed());
        result
    }

    /// All samples of one kernel, warm-up included.
    pub fn samples(&self, kernel: Kernel) -> &[Duration] {
        &self.times[kernel.index()]
    }

    /// Min/avg/max of one kernel over repeats `1..ntimes`.
    pub fn stats(&self, kernel: Kernel, array_size: usize) -> KernelStats {
        let retained = self.samples(kernel).get(1..).unwrap_or(&[]);
        let secs = retained.iter().map(Duration::as_secs_f64);

        let (sum, min, max) = secs.fold((0.0, f64::MAX, 0.0_f64), |(sum, min, max), t| {
            (sum + t, min.min(t), max.max(t))
        });
        let samples = retained.len();

        KernelStats {
            kernel,
            avg_time: if samples > 0 { sum / samples as f64 } else { 0.0 },
            min_time: if samples > 0 { min } else { 0.0 },
            max_time: max,
            samples,
            bytes: kernel.bytes_moved(array_size),
        }
    }

    /// Statistics of the four kernels in execution order.
    pub fn summarize(&self, array_size: usize) -> [KernelStats; 4] {
        Kernel::ALL.map(|k| self.stats(k, array_size))
    }
}
