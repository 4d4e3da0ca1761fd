//! Start gate: a reusable barrier that can be aborted.
//!
//! Workers of one kernel round call [`StartGate::wait`] after pinning and are
//! released together once all `parties` have arrived. Unlike
//! `std::sync::Barrier`, the controller can [`abort`](StartGate::abort) the
//! gate when it fails to spawn the full set of workers, so the ones already
//! running are released instead of waiting forever.

use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

struct GateState {
    arrived: usize,
    generation: u64,
    aborted: bool,
}

pub struct StartGate {
    parties: usize,
    state: Mutex<GateState>,
    released: Condvar,
}

impl StartGate {
    /// Gate for `parties` workers per round. A zero count is treated as one.
    pub fn new(parties: usize) -> Self {
        Self {
            parties: parties.max(1),
            state: Mutex::new(GateState {
                arrived: 0,
                generation: 0,
                aborted: false,
            }),
            released: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until every party of the current round has arrived.
    ///
    /// Returns `true` when the round was released normally and `false` when
    /// the gate was aborted, in which case the caller must skip its work.
    pub fn wait(&self) -> bool {
        let mut state = self.lock();
        if state.aborted {
            return false;
        }

        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == self.parties {
            state.arrived = 0;
            state.generation = state.generation.wrapping_add(1);
            self.released.notify_all();
            return true;
        }

        while state.generation == generation && !state.aborted {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.generation != generation
    }

    /// Release every waiter and make all later `wait` calls return `false`.
    pub fn abort(&self) {
        let mut state = self.lock();
        state.aborted = true;
        self.released.notify_all();
    }
}
