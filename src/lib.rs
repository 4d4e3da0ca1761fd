//! # Stream-Affinity
//!
//! STREAM memory-bandwidth kernels run by a pool of freshly spawned worker
//! threads, swept across core counts, threads per core and L3-cache affinity
//! placements.

pub mod config;
pub mod error;
pub mod stream;
pub mod topology;
pub mod utils;

/// Re-export tui from utils
pub use utils::tui;

pub use error::{Result, StreamError};

/// Re-export commonly used items
pub mod prelude {
    pub use crate::config::{AffinityMode, BenchConfig, StreamElement, TestConfig};
    pub use crate::error::{Result, StreamError};
    pub use crate::stream::Kernel;
    pub use crate::topology::CacheTopology;
    pub use crate::utils::runner::{StreamBench, TestReport};
}
