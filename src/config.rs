//! Benchmark configuration: compile-time defaults, the per-run `BenchConfig`
//! and the `TestConfig` values produced by the sweep.

use crate::error::{Result, StreamError};

/// Element type of the three stream arrays.
#[cfg(not(feature = "single_precision"))]
pub type StreamElement = f64;

#[cfg(feature = "single_precision")]
pub type StreamElement = f32;

/// Relative tolerance used when validating the final array contents.
#[cfg(not(feature = "single_precision"))]
pub const VALIDATION_EPSILON: f64 = 1.0e-13;

#[cfg(feature = "single_precision")]
pub const VALIDATION_EPSILON: f64 = 1.0e-6;

/// Default number of elements per array.
pub const STREAM_ARRAY_SIZE: usize = 10_000_000;

/// Default padding (in elements) appended to every array allocation.
pub const OFFSET: usize = 0;

/// Default number of repeats per kernel. The first repeat is a warm-up.
pub const NTIMES: usize = 10;

/// Multiplier used by Scale and Triad.
pub const SCALAR: StreamElement = 3.0;

/// Default upper bound of the core-count sweep.
pub const MAX_SWEEP_CORES: usize = 8;

/// Default upper bound of the threads-per-core sweep.
pub const MAX_SWEEP_THREADS_PER_CORE: usize = 8;

/// How worker threads are placed on cores.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AffinityMode {
    /// No pinning, the OS schedules workers anywhere.
    #[default]
    Disabled,
    /// Pin workers to cores that share one L3 cache.
    SharedL3,
    /// Alternate workers between the shared group and cores outside it.
    SplitL3,
}

impl AffinityMode {
    /// Short identifier used in CSV output and logs.
    pub fn name(self) -> &'static str {
        match self {
            AffinityMode::Disabled => "none",
            AffinityMode::SharedL3 => "shared_l3",
            AffinityMode::SplitL3 => "split_l3",
        }
    }

    pub fn is_pinned(self) -> bool {
        self != AffinityMode::Disabled
    }
}

/// Parameters of a single test in the sweep.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TestConfig {
    /// Number of physical cores to spread work over.
    pub num_cores: usize,
    /// Workers per core.
    pub threads_per_core: usize,
    pub affinity: AffinityMode,
}

impl TestConfig {
    pub fn new(num_cores: usize, threads_per_core: usize, affinity: AffinityMode) -> Self {
        Self {
            num_cores,
            threads_per_core,
            affinity,
        }
    }

    /// Number of workers spawned for every kernel repeat.
    pub fn total_threads(&self) -> usize {
        self.num_cores * self.threads_per_core
    }
}

/// Run-wide benchmark settings.
#[derive(Clone, Debug)]
pub struct BenchConfig {
    /// Elements touched by the kernels (default: `STREAM_ARRAY_SIZE`)
    pub array_size: usize,
    /// Extra, untouched elements per allocation (default: `OFFSET`)
    pub offset: usize,
    /// Repeats per kernel, including the discarded warm-up (default: `NTIMES`)
    pub ntimes: usize,
    /// Sweep core counts `1..=max_cores`
    pub max_cores: usize,
    /// Sweep threads per core `1..=max_threads_per_core`
    pub max_threads_per_core: usize,
    /// Affinity modes run for every (cores, threads) pair, in order
    pub modes: Vec<AffinityMode>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            array_size: STREAM_ARRAY_SIZE,
            offset: OFFSET,
            ntimes: NTIMES,
            max_cores: MAX_SWEEP_CORES,
            max_threads_per_core: MAX_SWEEP_THREADS_PER_CORE,
            modes: vec![AffinityMode::Disabled, AffinityMode::SharedL3],
        }
    }
}

impl BenchConfig {
    /// Reject settings the runner cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.array_size == 0 {
            return Err(StreamError::InvalidConfig(
                "array size must be at least 1".to_string(),
            ));
        }
        if self.ntimes < 2 {
            return Err(StreamError::InvalidConfig(format!(
                "ntimes must be at least 2 (got {}), the first repeat is discarded",
                self.ntimes
            )));
        }
        if self.max_cores == 0 || self.max_threads_per_core == 0 {
            return Err(StreamError::InvalidConfig(
                "sweep bounds must be at least 1".to_string(),
            ));
        }
        if self.modes.is_empty() {
            return Err(StreamError::InvalidConfig(
                "at least one affinity mode is required".to_string(),
            ));
        }
        Ok(())
    }

    /// Bytes needed for the three arrays, padding included. Saturates at `usize::MAX`.
    pub fn total_bytes(&self) -> usize {
        self.array_size
            .saturating_add(self.offset)
            .saturating_mul(3 * std::mem::size_of::<StreamElement>())
    }

    /// Every test configuration of the sweep, cores outermost, modes innermost.
    pub fn sweep(&self) -> impl Iterator<Item = TestConfig> + '_ {
        (1..=self.max_cores).flat_map(move |cores| {
            (1..=self.max_threads_per_core).flat_map(move |threads| {
                self.modes
                    .iter()
                    .map(move |&mode| TestConfig::new(cores, threads, mode))
            })
        })
    }
}
