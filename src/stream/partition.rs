//! Work partitioning: one contiguous index range per worker.

use super::kernel::Kernel;
use crate::config::{StreamElement, TestConfig};
use crate::topology::CacheTopology;

/// Task descriptor handed to one worker for one kernel repeat.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThreadData {
    pub thread_id: usize,
    /// Core to pin to, `None` to let the OS decide.
    pub core_id: Option<usize>,
    /// First index of the range (inclusive).
    pub start_idx: usize,
    /// End of the range (exclusive).
    pub end_idx: usize,
    pub scalar: StreamElement,
    pub kernel: Kernel,
}

impl ThreadData {
    pub fn len(&self) -> usize {
        self.end_idx - self.start_idx
    }

    pub fn is_empty(&self) -> bool {
        self.start_idx == self.end_idx
    }
}

/// Split `[0, array_size)` into `total_threads` contiguous ranges.
///
/// Every range is `array_size / total_threads` long except the last, which
/// also takes the remainder. With fewer elements than threads all but the last
/// range are empty.
///
/// # Panics
/// Panics if `total_threads` is zero.
pub fn partition(
    array_size: usize,
    total_threads: usize,
    kernel: Kernel,
    scalar: StreamElement,
    core_for: impl Fn(usize) -> Option<usize>,
) -> Vec<ThreadData> {
    assert!(total_threads > 0, "at least one worker thread is required");

    let chunk_size = array_size / total_threads;
    (0..total_threads)
        .map(|t| ThreadData {
            thread_id: t,
            core_id: core_for(t),
            start_idx: t * chunk_size,
            end_idx: if t == total_threads - 1 {
                array_size
            } else {
                (t + 1) * chunk_size
            },
            scalar,
            kernel,
        })
        .collect()
}

/// Build the task descriptors of one kernel repeat for a test configuration.
pub fn plan_tasks(
    test: &TestConfig,
    topology: &CacheTopology,
    array_size: usize,
    kernel: Kernel,
    scalar: StreamElement,
) -> Vec<ThreadData> {
    partition(array_size, test.total_threads(), kernel, scalar, |t| {
        topology.core_for_thread(t, test.num_cores, test.affinity)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AffinityMode;
    use rand::Rng;

    fn assert_exact_cover(tasks: &[ThreadData], array_size: usize) {
        assert_eq!(tasks.first().map(|t| t.start_idx), Some(0));
        assert_eq!(tasks.last().map(|t| t.end_idx), Some(array_size));
        for pair in tasks.windows(2) {
            assert_eq!(pair[1].start_idx, pair[0].end_idx);
        }
        assert_eq!(tasks.iter().map(ThreadData::len).sum::<usize>(), array_size);
    }

    #[test]
    fn test_partition_covers_range_for_all_thread_counts() {
        for array_size in [1, 7, 1000, 1001, 65_537] {
            for threads in 1..=64 {
                let tasks = partition(array_size, threads, Kernel::Copy, 3.0, |_| None);
                assert_eq!(tasks.len(), threads);
                assert_exact_cover(&tasks, array_size);
            }
        }
    }

    #[test]
    fn test_partition_random_sizes() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let array_size = rng.random_range(1..100_000);
            let threads = rng.random_range(1..=64);
            let tasks = partition(array_size, threads, Kernel::Add, 3.0, |_| None);
            assert_exact_cover(&tasks, array_size);
        }
    }

    #[test]
    fn test_last_thread_absorbs_remainder() {
        let tasks = partition(10, 3, Kernel::Scale, 3.0, |_| None);
        let ranges: Vec<_> = tasks.iter().map(|t| (t.start_idx, t.end_idx)).collect();
        assert_eq!(ranges, vec![(0, 3), (3, 6), (6, 10)]);
    }

    #[test]
    fn test_fewer_elements_than_threads() {
        let tasks = partition(3, 8, Kernel::Triad, 3.0, |_| None);
        assert!(tasks[..7].iter().all(ThreadData::is_empty));
        assert_eq!((tasks[7].start_idx, tasks[7].end_idx), (0, 3));
    }

    #[test]
    fn test_plan_tasks_two_cores_three_threads() {
        let topology = CacheTopology::default();
        let test = TestConfig::new(2, 3, AffinityMode::SharedL3);
        let tasks = plan_tasks(&test, &topology, 1000, Kernel::Copy, 3.0);

        assert_eq!(tasks.len(), 6);
        for (t, task) in tasks.iter().enumerate() {
            assert_eq!(task.thread_id, t);
            assert_eq!(task.kernel, Kernel::Copy);
            let core = task.core_id.expect("affinity enabled");
            assert!(topology.shared_l3().contains(&core));
        }
        assert_exact_cover(&tasks, 1000);
    }

    #[test]
    fn test_plan_tasks_without_affinity() {
        let topology = CacheTopology::default();
        let test = TestConfig::new(4, 2, AffinityMode::Disabled);
        let tasks = plan_tasks(&test, &topology, 1000, Kernel::Scale, 3.0);
        assert!(tasks.iter().all(|t| t.core_id.is_none()));
    }
}
