//! Best-effort CPU pinning for worker threads.
//!
//! Platform APIs are called directly: `sched_setaffinity` through libc on
//! Linux, `SetThreadAffinityMask` on Windows. macOS only offers affinity
//! hints, so pinning there always reports failure and the thread stays free.
//! Failures are returned as `io::Error` for logging; callers never abort on them.

use std::io;

// ============================================================================
// Linux implementation using libc
// ============================================================================

#[cfg(target_os = "linux")]
mod platform {
    use std::cell::RefCell;
    use std::io;
    use std::mem;

    thread_local! {
        static ORIGINAL_AFFINITY: RefCell<Option<libc::cpu_set_t>> = const { RefCell::new(None) };
    }

    pub fn online_cpus() -> Option<usize> {
        let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
        (n > 0).then_some(n as usize)
    }

    pub fn current_cpu() -> Option<usize> {
        let cpu = unsafe { libc::sched_getcpu() };
        (cpu >= 0).then_some(cpu as usize)
    }

    pub fn save_affinity() {
        unsafe {
            let mut set: libc::cpu_set_t = mem::zeroed();
            if libc::sched_getaffinity(0, mem::size_of::<libc::cpu_set_t>(), &mut set) == 0 {
                ORIGINAL_AFFINITY.with(|cell| *cell.borrow_mut() = Some(set));
            }
        }
    }

    pub fn set_affinity(core_id: usize) -> io::Result<()> {
        if core_id >= libc::CPU_SETSIZE as usize {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("core {} exceeds CPU_SETSIZE", core_id),
            ));
        }
        unsafe {
            let mut set: libc::cpu_set_t = mem::zeroed();
            libc::CPU_ZERO(&mut set);
            libc::CPU_SET(core_id, &mut set);
            if libc::sched_setaffinity(0, mem::size_of::<libc::cpu_set_t>(), &set) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }

    pub fn restore_affinity() -> bool {
        ORIGINAL_AFFINITY.with(|cell| match cell.borrow_mut().take() {
            Some(set) => unsafe {
                libc::sched_setaffinity(0, mem::size_of::<libc::cpu_set_t>(), &set) == 0
            },
            None => false,
        })
    }
}

// ============================================================================
// macOS: no hard affinity, only scheduler hints
// ============================================================================

#[cfg(target_os = "macos")]
mod platform {
    use std::io;

    pub fn online_cpus() -> Option<usize> {
        let n = unsafe { libc::sysconf(libc::_SC_NPROCESSORS_ONLN) };
        (n > 0).then_some(n as usize)
    }

    pub fn current_cpu() -> Option<usize> {
        None
    }

    pub fn save_affinity() {}

    pub fn set_affinity(_core_id: usize) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "thread affinity is not supported on macOS",
        ))
    }

    pub fn restore_affinity() -> bool {
        true
    }
}

// ============================================================================
// Windows implementation
// ============================================================================

#[cfg(target_os = "windows")]
mod platform {
    use std::cell::RefCell;
    use std::io;

    type Handle = *mut std::ffi::c_void;
    type DwordPtr = usize;

    extern "system" {
        fn GetCurrentThread() -> Handle;
        fn SetThreadAffinityMask(thread: Handle, mask: DwordPtr) -> DwordPtr;
        fn GetCurrentProcessorNumber() -> u32;
        fn GetActiveProcessorCount(group: u16) -> u32;
    }

    const ALL_PROCESSOR_GROUPS: u16 = 0xffff;

    thread_local! {
        static ORIGINAL_MASK: RefCell<Option<DwordPtr>> = const { RefCell::new(None) };
    }

    pub fn online_cpus() -> Option<usize> {
        let n = unsafe { GetActiveProcessorCount(ALL_PROCESSOR_GROUPS) };
        (n > 0).then_some(n as usize)
    }

    pub fn current_cpu() -> Option<usize> {
        Some(unsafe { GetCurrentProcessorNumber() } as usize)
    }

    // The previous mask is captured by `set_affinity` itself.
    pub fn save_affinity() {}

    pub fn set_affinity(core_id: usize) -> io::Result<()> {
        if core_id >= DwordPtr::BITS as usize {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("core {} does not fit in a thread affinity mask", core_id),
            ));
        }
        let previous = unsafe { SetThreadAffinityMask(GetCurrentThread(), 1 << core_id) };
        if previous == 0 {
            return Err(io::Error::last_os_error());
        }
        ORIGINAL_MASK.with(|cell| {
            cell.borrow_mut().get_or_insert(previous);
        });
        Ok(())
    }

    pub fn restore_affinity() -> bool {
        ORIGINAL_MASK.with(|cell| match cell.borrow_mut().take() {
            Some(mask) => unsafe { SetThreadAffinityMask(GetCurrentThread(), mask) != 0 },
            None => false,
        })
    }
}

// ============================================================================
// Fallback for unsupported platforms
// ============================================================================

#[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
mod platform {
    use std::io;

    pub fn online_cpus() -> Option<usize> {
        std::thread::available_parallelism().ok().map(|n| n.get())
    }
    pub fn current_cpu() -> Option<usize> {
        None
    }
    pub fn save_affinity() {}
    pub fn set_affinity(_core_id: usize) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "thread affinity is not supported on this platform",
        ))
    }
    pub fn restore_affinity() -> bool {
        true
    }
}

// ============================================================================
// Public API
// ============================================================================

/// IDs of the online CPUs, `0..n`.
pub fn get_core_ids() -> Option<Vec<usize>> {
    platform::online_cpus().map(|n| (0..n).collect())
}

/// CPU the calling thread is running on right now, where the OS exposes it.
pub fn get_current_cpu() -> Option<usize> {
    platform::current_cpu()
}

/// Pin the calling thread to `core_id`, remembering the previous affinity.
pub fn pin_to_core(core_id: usize) -> io::Result<()> {
    platform::save_affinity();
    platform::set_affinity(core_id)
}

/// Restore the affinity saved by the last successful [`pin_to_core`].
pub fn unpin() -> bool {
    platform::restore_affinity()
}

// ============================================================================
// RAII Guard
// ============================================================================

/// Pins the current thread on creation and restores its affinity on drop.
///
/// Pinning failure is not an error: the guard just reports `is_pinned() == false`
/// and the thread keeps running wherever the scheduler puts it.
pub struct CpuPinGuard {
    pinned_core: Option<usize>,
}

impl CpuPinGuard {
    /// Try to pin the current thread to `core_id`.
    pub fn with_core(core_id: usize) -> Self {
        match pin_to_core(core_id) {
            Ok(()) => Self {
                pinned_core: Some(core_id),
            },
            Err(err) => {
                tracing::debug!(core_id, error = %err, "thread affinity not applied");
                Self { pinned_core: None }
            }
        }
    }

    /// Pin when a core is requested, otherwise leave the thread unpinned.
    pub fn optional(core_id: Option<usize>) -> Self {
        match core_id {
            Some(core) => Self::with_core(core),
            None => Self { pinned_core: None },
        }
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned_core.is_some()
    }
}

impl Drop for CpuPinGuard {
    fn drop(&mut self) {
        if self.pinned_core.is_some() {
            unpin();
        }
    }
}
