//! Static L3 cache topology and the thread-to-core mapping.
//!
//! The topology is hand-edited, not detected: it lists which cores share an
//! L3 cache domain and which sit outside it. Edit [`CacheTopology::default`]
//! (or pass `--l3-cores` / `--other-cores`) to match the machine under test.

use crate::config::AffinityMode;
use crate::error::{Result, StreamError};
use crate::utils::cpu_affinity;

/// Cores grouped by L3 cache sharing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheTopology {
    shared_l3: Vec<usize>,
    disjoint_l3: Vec<usize>,
}

impl CacheTopology {
    /// Build a topology from the cores sharing one L3 and the cores outside it.
    ///
    /// The shared group must be non-empty and no core id may appear twice,
    /// within a group or across both.
    pub fn new(shared_l3: Vec<usize>, disjoint_l3: Vec<usize>) -> Result<Self> {
        if shared_l3.is_empty() {
            return Err(StreamError::InvalidTopology(
                "the L3-sharing core group is empty".to_string(),
            ));
        }

        let mut seen = Vec::with_capacity(shared_l3.len() + disjoint_l3.len());
        for &core in shared_l3.iter().chain(disjoint_l3.iter()) {
            if seen.contains(&core) {
                return Err(StreamError::InvalidTopology(format!(
                    "core {} is listed more than once",
                    core
                )));
            }
            seen.push(core);
        }

        if let Some(online) = cpu_affinity::get_core_ids() {
            for &core in seen.iter().filter(|c| !online.contains(*c)) {
                tracing::warn!(core, "topology lists a core that is not online, pinning to it will fail");
            }
        }

        Ok(Self {
            shared_l3,
            disjoint_l3,
        })
    }

    /// Cores that share the L3 cache.
    pub fn shared_l3(&self) -> &[usize] {
        &self.shared_l3
    }

    /// Cores that do not share the L3 cache with [`Self::shared_l3`].
    pub fn disjoint_l3(&self) -> &[usize] {
        &self.disjoint_l3
    }

    /// Map a worker index to the core it should be pinned to.
    ///
    /// Returns `None` when affinity is disabled. Otherwise the worker's slot is
    /// `thread_index % num_cores`, and slots beyond the group length wrap
    /// around, so several workers can land on the same core.
    pub fn core_for_thread(
        &self,
        thread_index: usize,
        num_cores: usize,
        mode: AffinityMode,
    ) -> Option<usize> {
        let slot = thread_index % num_cores.max(1);
        match mode {
            AffinityMode::Disabled => None,
            AffinityMode::SharedL3 => Some(self.shared_l3[slot % self.shared_l3.len()]),
            AffinityMode::SplitL3 => {
                if self.disjoint_l3.is_empty() {
                    return Some(self.shared_l3[slot % self.shared_l3.len()]);
                }
                let group = if slot % 2 == 0 {
                    &self.shared_l3
                } else {
                    &self.disjoint_l3
                };
                Some(group[(slot / 2) % group.len()])
            }
        }
    }

    /// Core assignment of every worker for the given layout.
    pub fn cores_for(
        &self,
        total_threads: usize,
        num_cores: usize,
        mode: AffinityMode,
    ) -> Vec<Option<usize>> {
        (0..total_threads)
            .map(|t| self.core_for_thread(t, num_cores, mode))
            .collect()
    }
}

impl Default for CacheTopology {
    /// Two CCX-style groups of four: cores 0-3 share an L3, 4-7 do not share
    /// it with them.
    fn default() -> Self {
        Self {
            shared_l3: vec![0, 1, 2, 3],
            disjoint_l3: vec![4, 5, 6, 7],
        }
    }
}
