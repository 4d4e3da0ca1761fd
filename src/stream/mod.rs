//! # STREAM Kernels
//!
//! The four McCalpin STREAM kernels over three arrays `A`, `B`, `C`:
//!
//! | Kernel | Operation              | Arrays moved |
//! |--------|------------------------|--------------|
//! | Copy   | `C[i] = A[i]`          | 2            |
//! | Scale  | `B[i] = s * C[i]`      | 2            |
//! | Add    | `C[i] = A[i] + B[i]`   | 3            |
//! | Triad  | `A[i] = B[i] + s * C[i]` | 3          |
//!
//! Work is split into contiguous index ranges, one per worker thread, and each
//! worker receives disjoint mutable lanes of the three arrays for its range.

pub mod arrays;
pub mod kernel;
pub mod partition;
pub mod test;
pub mod validate;

pub use arrays::{KernelLanes, StreamArrays};
pub use kernel::Kernel;
pub use partition::{partition, plan_tasks, ThreadData};
pub use validate::{expected_values, validate, Validation};
