//! Kernel selector and the per-range kernel bodies.

use super::arrays::KernelLanes;
use crate::config::StreamElement;

/// One of the four STREAM operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kernel {
    Copy,
    Scale,
    Add,
    Triad,
}

impl Kernel {
    /// Execution order within one repeat.
    pub const ALL: [Kernel; 4] = [Kernel::Copy, Kernel::Scale, Kernel::Add, Kernel::Triad];

    /// Position in [`Kernel::ALL`], used to index timing tables.
    pub fn index(self) -> usize {
        match self {
            Kernel::Copy => 0,
            Kernel::Scale => 1,
            Kernel::Add => 2,
            Kernel::Triad => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Kernel::Copy => "Copy",
            Kernel::Scale => "Scale",
            Kernel::Add => "Add",
            Kernel::Triad => "Triad",
        }
    }

    /// Report label, padded to the width of the table's first column.
    pub fn label(self) -> &'static str {
        match self {
            Kernel::Copy => "Copy:      ",
            Kernel::Scale => "Scale:     ",
            Kernel::Add => "Add:       ",
            Kernel::Triad => "Triad:     ",
        }
    }

    /// Number of arrays read or written per element.
    pub fn arrays_moved(self) -> usize {
        match self {
            Kernel::Copy | Kernel::Scale => 2,
            Kernel::Add | Kernel::Triad => 3,
        }
    }

    /// Bytes counted as moved when running this kernel over `array_size` elements.
    pub fn bytes_moved(self, array_size: usize) -> f64 {
        (self.arrays_moved() * std::mem::size_of::<StreamElement>() * array_size) as f64
    }

    /// Run this kernel over one worker's lanes.
    pub fn apply(self, lanes: KernelLanes<'_>, scalar: StreamElement) {
        let KernelLanes { a, b, c } = lanes;
        match self {
            Kernel::Copy => {
                for (cj, aj) in c.iter_mut().zip(a.iter()) {
                    *cj = *aj;
                }
            }
            Kernel::Scale => {
                for (bj, cj) in b.iter_mut().zip(c.iter()) {
                    *bj = scalar * *cj;
                }
            }
            Kernel::Add => {
                for ((cj, aj), bj) in c.iter_mut().zip(a.iter()).zip(b.iter()) {
                    *cj = *aj + *bj;
                }
            }
            Kernel::Triad => {
                for ((aj, bj), cj) in a.iter_mut().zip(b.iter()).zip(c.iter()) {
                    *aj = *bj + scalar * *cj;
                }
            }
        }
    }
}

impl std::fmt::Display for Kernel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
