//! Test utilities for the stream kernels.

#[cfg(test)]
mod tests {
    use crate::config::StreamElement;
    use crate::stream::*;
    use rand::Rng;

    fn random_vec(len: usize) -> Vec<StreamElement> {
        let mut rng = rand::rng();
        (0..len).map(|_| rng.random_range(-1.0..1.0)).collect()
    }

    /// Sequential reference for one kernel over whole arrays.
    fn reference(
        kernel: Kernel,
        a: &mut [StreamElement],
        b: &mut [StreamElement],
        c: &mut [StreamElement],
        scalar: StreamElement,
    ) {
        for j in 0..a.len() {
            match kernel {
                Kernel::Copy => c[j] = a[j],
                Kernel::Scale => b[j] = scalar * c[j],
                Kernel::Add => c[j] = a[j] + b[j],
                Kernel::Triad => a[j] = b[j] + scalar * c[j],
            }
        }
    }

    #[test]
    fn test_copy_basic() {
        let mut a = [1.0, 2.0, 3.0];
        let mut b = [0.0; 3];
        let mut c = [0.0; 3];
        Kernel::Copy.apply(
            KernelLanes {
                a: &mut a,
                b: &mut b,
                c: &mut c,
            },
            3.0,
        );
        assert_eq!(c, [1.0, 2.0, 3.0]);
        assert_eq!(b, [0.0; 3]);
    }

    #[test]
    fn test_scale_add_triad_basic() {
        let mut a = [1.0, 2.0];
        let mut b = [0.0, 0.0];
        let mut c = [1.0, 2.0];

        Kernel::Scale.apply(
            KernelLanes {
                a: &mut a,
                b: &mut b,
                c: &mut c,
            },
            3.0,
        );
        assert_eq!(b, [3.0, 6.0]);

        Kernel::Add.apply(
            KernelLanes {
                a: &mut a,
                b: &mut b,
                c: &mut c,
            },
            3.0,
        );
        assert_eq!(c, [4.0, 8.0]);

        Kernel::Triad.apply(
            KernelLanes {
                a: &mut a,
                b: &mut b,
                c: &mut c,
            },
            3.0,
        );
        assert_eq!(a, [15.0, 30.0]);
    }

    #[test]
    fn test_partitioned_kernels_match_sequential_reference() {
        let len = 1023;
        let base_a = random_vec(len);
        let base_b = random_vec(len);
        let base_c = random_vec(len);

        for threads in [1, 2, 3, 7, 16] {
            for kernel in Kernel::ALL {
                let (mut ra, mut rb, mut rc) = (base_a.clone(), base_b.clone(), base_c.clone());
                reference(kernel, &mut ra, &mut rb, &mut rc, 3.0);

                let (mut a, mut b, mut c) = (base_a.clone(), base_b.clone(), base_c.clone());
                let tasks = partition(len, threads, kernel, 3.0, |_| None);
                let (mut rest_a, mut rest_b, mut rest_c) =
                    (a.as_mut_slice(), b.as_mut_slice(), c.as_mut_slice());
                for task in &tasks {
                    let (ha, ta) = std::mem::take(&mut rest_a).split_at_mut(task.len());
                    let (hb, tb) = std::mem::take(&mut rest_b).split_at_mut(task.len());
                    let (hc, tc) = std::mem::take(&mut rest_c).split_at_mut(task.len());
                    rest_a = ta;
                    rest_b = tb;
                    rest_c = tc;
                    kernel.apply(KernelLanes { a: ha, b: hb, c: hc }, task.scalar);
                }

                assert_eq!(a, ra, "{} with {} threads: A differs", kernel, threads);
                assert_eq!(b, rb, "{} with {} threads: B differs", kernel, threads);
                assert_eq!(c, rc, "{} with {} threads: C differs", kernel, threads);
            }
        }
    }

    #[test]
    fn test_bytes_moved() {
        let elem = std::mem::size_of::<StreamElement>() as f64;
        assert_eq!(Kernel::Copy.bytes_moved(1000), 2.0 * elem * 1000.0);
        assert_eq!(Kernel::Scale.bytes_moved(1000), 2.0 * elem * 1000.0);
        assert_eq!(Kernel::Add.bytes_moved(1000), 3.0 * elem * 1000.0);
        assert_eq!(Kernel::Triad.bytes_moved(1000), 3.0 * elem * 1000.0);
    }

    #[test]
    fn test_kernel_order_and_index() {
        for (i, kernel) in Kernel::ALL.iter().enumerate() {
            assert_eq!(kernel.index(), i);
        }
        assert!(Kernel::ALL.iter().all(|k| k.label().len() == 11));
    }

    #[test]
    fn test_full_cycle_matches_recurrence() {
        let mut arrays = StreamArrays::allocate(64, 0).unwrap();
        arrays.reset();
        let ntimes = 5;
        for _ in 0..ntimes {
            for kernel in Kernel::ALL {
                let tasks = partition(64, 4, kernel, 3.0, |_| None);
                for lanes in arrays.lanes(&tasks) {
                    kernel.apply(lanes, 3.0);
                }
            }
        }
        let check = validate(arrays.first(), ntimes);
        assert!(check.passed, "{:?}", check);
        assert!(arrays.a().iter().all(|&x| x == arrays.a()[0]));
    }
}
