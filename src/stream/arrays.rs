//! The three stream arrays and their per-worker lanes.

use crate::config::StreamElement;
use crate::error::{Result, StreamError};

use super::partition::ThreadData;

/// Mutable views of `A`, `B` and `C` over one worker's index range.
pub struct KernelLanes<'a> {
    pub a: &'a mut [StreamElement],
    pub b: &'a mut [StreamElement],
    pub c: &'a mut [StreamElement],
}

/// Owner of the `A`, `B`, `C` buffers.
///
/// Each buffer holds `array_size + offset` elements; kernels only touch the
/// first `array_size`.
pub struct StreamArrays {
    a: Vec<StreamElement>,
    b: Vec<StreamElement>,
    c: Vec<StreamElement>,
    array_size: usize,
}

impl StreamArrays {
    /// Allocate the three arrays, reporting failure instead of aborting.
    pub fn allocate(array_size: usize, offset: usize) -> Result<Self> {
        let len = array_size
            .checked_add(offset)
            .ok_or(StreamError::Allocation { bytes: usize::MAX })?;
        Ok(Self {
            a: alloc_array(len)?,
            b: alloc_array(len)?,
            c: alloc_array(len)?,
            array_size,
        })
    }

    pub fn array_size(&self) -> usize {
        self.array_size
    }

    /// Set `A = 1.0`, `B = 2.0`, `C = 0.0` over the whole allocation.
    pub fn reset(&mut self) {
        self.a.fill(1.0);
        self.b.fill(2.0);
        self.c.fill(0.0);
    }

    pub fn a(&self) -> &[StreamElement] {
        &self.a[..self.array_size]
    }

    pub fn b(&self) -> &[StreamElement] {
        &self.b[..self.array_size]
    }

    pub fn c(&self) -> &[StreamElement] {
        &self.c[..self.array_size]
    }

    /// First element of each array, as `(a, b, c)`.
    pub fn first(&self) -> (StreamElement, StreamElement, StreamElement) {
        (self.a[0], self.b[0], self.c[0])
    }

    /// Split the arrays into one set of lanes per task.
    ///
    /// Tasks must cover `[0, array_size)` contiguously in order, which
    /// [`super::partition`] guarantees.
    pub fn lanes(&mut self, tasks: &[ThreadData]) -> Vec<KernelLanes<'_>> {
        let mut a = &mut self.a[..self.array_size];
        let mut b = &mut self.b[..self.array_size];
        let mut c = &mut self.c[..self.array_size];

        let mut lanes = Vec::with_capacity(tasks.len());
        for task in tasks {
            debug_assert_eq!(task.start_idx, self.array_size - a.len());
            let len = task.len();
            let (a_head, a_tail) = std::mem::take(&mut a).split_at_mut(len);
            let (b_head, b_tail) = std::mem::take(&mut b).split_at_mut(len);
            let (c_head, c_tail) = std::mem::take(&mut c).split_at_mut(len);
            a = a_tail;
            b = b_tail;
            c = c_tail;
            lanes.push(KernelLanes {
                a: a_head,
                b: b_head,
                c: c_head,
            });
        }
        lanes
    }
}

fn alloc_array(len: usize) -> Result<Vec<StreamElement>> {
    let bytes = len.saturating_mul(std::mem::size_of::<StreamElement>());
    let mut array = Vec::new();
    array
        .try_reserve_exact(len)
        .map_err(|_| StreamError::Allocation { bytes })?;
    array.resize(len, 0.0);
    Ok(array)
}
