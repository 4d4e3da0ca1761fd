//! Affinity-aware parallel kernel runner.
//!
//! [`StreamBench`] owns the arrays, the topology and the run settings. For each
//! test configuration it resets the arrays, then for every repeat and every
//! kernel spawns one scoped worker per task, releases them together through a
//! [`StartGate`] and times the round from first spawn to last join.

use std::thread;

use crate::config::{BenchConfig, TestConfig, SCALAR};
use crate::error::{Result, StreamError};
use crate::stream::{plan_tasks, validate, Kernel, KernelLanes, StreamArrays, ThreadData, Validation};
use crate::topology::CacheTopology;
use crate::utils::cpu_affinity::{get_current_cpu, CpuPinGuard};
use crate::utils::gate::StartGate;
use crate::utils::timer::{KernelStats, TimingTable};

/// Everything measured for one test configuration.
#[derive(Clone, Debug)]
pub struct TestReport {
    pub config: TestConfig,
    /// Requested core of every worker, `None` when unpinned.
    pub cores_used: Vec<Option<usize>>,
    pub timings: TimingTable,
    /// Per-kernel statistics in execution order.
    pub stats: [KernelStats; 4],
    pub validation: Validation,
}

/// Benchmark context: arrays, topology and run settings.
pub struct StreamBench {
    config: BenchConfig,
    topology: CacheTopology,
    arrays: StreamArrays,
}

impl StreamBench {
    /// Validate the settings and allocate the arrays.
    pub fn new(config: BenchConfig, topology: CacheTopology) -> Result<Self> {
        config.validate()?;
        let arrays = StreamArrays::allocate(config.array_size, config.offset)?;
        tracing::debug!(
            array_size = config.array_size,
            offset = config.offset,
            bytes = config.total_bytes(),
            "allocated stream arrays"
        );
        Ok(Self {
            config,
            topology,
            arrays,
        })
    }

    pub fn config(&self) -> &BenchConfig {
        &self.config
    }

    pub fn topology(&self) -> &CacheTopology {
        &self.topology
    }

    pub fn arrays(&self) -> &StreamArrays {
        &self.arrays
    }

    /// Run all repeats of the four kernels for one configuration.
    pub fn run_test(&mut self, test: TestConfig) -> Result<TestReport> {
        let total_threads = test.total_threads();
        if total_threads == 0 {
            return Err(StreamError::InvalidConfig(
                "a test needs at least one core and one thread per core".to_string(),
            ));
        }

        let _span = tracing::debug_span!(
            "run_test",
            cores = test.num_cores,
            threads_per_core = test.threads_per_core,
            affinity = test.affinity.name()
        )
        .entered();

        let gate = StartGate::new(total_threads);
        self.arrays.reset();

        let ntimes = self.config.ntimes;
        let mut timings = TimingTable::new(ntimes);
        for repeat in 0..ntimes {
            for kernel in Kernel::ALL {
                let (tasks, lanes) = plan_round(&mut self.arrays, &self.topology, &test, kernel);
                timings.time(kernel, repeat, || spawn_workers(&tasks, lanes, &gate))?;
            }
        }

        let stats = timings.summarize(self.config.array_size);
        let validation = validate(self.arrays.first(), ntimes);
        if !validation.passed {
            tracing::warn!(
                expected = ?validation.expected,
                actual = ?validation.actual,
                rel_error = validation.max_rel_error,
                "array contents do not match the closed-form result"
            );
        }
        tracing::info!(
            total_threads,
            triad_mb_s = stats[Kernel::Triad.index()].best_rate_mb_s(),
            "test finished"
        );

        Ok(TestReport {
            config: test,
            cores_used: self
                .topology
                .cores_for(total_threads, test.num_cores, test.affinity),
            timings,
            stats,
            validation,
        })
    }
}

/// Task descriptors and array lanes of one kernel round.
///
/// Built before the round's clock starts, so samples only cover spawn to join.
fn plan_round<'a>(
    arrays: &'a mut StreamArrays,
    topology: &CacheTopology,
    test: &TestConfig,
    kernel: Kernel,
) -> (Vec<ThreadData>, Vec<KernelLanes<'a>>) {
    let tasks = plan_tasks(test, topology, arrays.array_size(), kernel, SCALAR);
    let lanes = arrays.lanes(&tasks);
    (tasks, lanes)
}

/// Spawn one worker per task, then join them all.
///
/// A spawn failure aborts the gate so workers already started return without
/// touching the arrays. Every spawned worker is joined before returning.
fn spawn_workers(tasks: &[ThreadData], lanes: Vec<KernelLanes<'_>>, gate: &StartGate) -> Result<()> {
    thread::scope(|scope| {
        let mut outcome = Ok(());
        let mut handles = Vec::with_capacity(tasks.len());

        for (&task, lanes) in tasks.iter().zip(lanes) {
            let spawned = thread::Builder::new()
                .name(format!("stream-worker-{}", task.thread_id))
                .spawn_scoped(scope, move || run_worker(task, lanes, gate));
            match spawned {
                Ok(handle) => handles.push((task.thread_id, handle)),
                Err(source) => {
                    gate.abort();
                    outcome = Err(StreamError::ThreadSpawn {
                        thread: task.thread_id,
                        source,
                    });
                    break;
                }
            }
        }

        for (thread, handle) in handles {
            if handle.join().is_err() && outcome.is_ok() {
                outcome = Err(StreamError::WorkerPanicked { thread });
            }
        }
        outcome
    })
}

fn run_worker(task: ThreadData, lanes: KernelLanes<'_>, gate: &StartGate) {
    let pin = CpuPinGuard::optional(task.core_id);
    tracing::trace!(
        thread = task.thread_id,
        requested = ?task.core_id,
        pinned = pin.is_pinned(),
        running_on = ?get_current_cpu(),
        "worker ready"
    );

    if gate.wait() {
        task.kernel.apply(lanes, task.scalar);
    }
}
