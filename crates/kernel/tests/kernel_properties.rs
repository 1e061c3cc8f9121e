//! Property tests for the smoothing kernel and boundary mapping.

use proptest::prelude::*;
use sph1d_kernel::{cubic_1d, d_cubic_1d, Boundary, BoundaryType};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn kernel_is_even(d in -5.0_f64..5.0, h in 0.01_f64..2.0) {
        prop_assert_eq!(cubic_1d(d, h), cubic_1d(-d, h));
    }

    #[test]
    fn derivative_is_odd(d in -5.0_f64..5.0, h in 0.01_f64..2.0) {
        prop_assert_eq!(d_cubic_1d(d, h), -d_cubic_1d(-d, h));
    }

    #[test]
    fn kernel_vanishes_outside_support(r in 2.001_f64..10.0, h in 0.01_f64..2.0) {
        let d = r * h;
        prop_assert_eq!(cubic_1d(d, h), 0.0);
        prop_assert_eq!(cubic_1d(-d, h), 0.0);
        prop_assert_eq!(d_cubic_1d(d, h), 0.0);
    }

    #[test]
    fn kernel_is_non_negative(d in -5.0_f64..5.0, h in 0.01_f64..2.0) {
        prop_assert!(cubic_1d(d, h) >= 0.0);
    }

    #[test]
    fn solid_reflection(delta in 1.0e-6_f64..1.0, v in -5.0_f64..5.0, a in -5.0_f64..5.0) {
        let boundary = Boundary::new(BoundaryType::Solid, 0.0, 10.0).unwrap();
        let (mut x, mut vx, mut ax) = (10.0 + delta, v, a);
        boundary.map_inside(&mut x, &mut vx, &mut ax);
        prop_assert!((x - (10.0 - delta)).abs() < 1.0e-12);
        prop_assert_eq!(vx, -v);
        prop_assert_eq!(ax, -a);
        prop_assert!(boundary.contains(x));
    }

    #[test]
    fn cyclic_wrap(delta in 1.0e-6_f64..1.0, v in -5.0_f64..5.0, a in -5.0_f64..5.0) {
        let boundary = Boundary::new(BoundaryType::Cyclic, 0.0, 10.0).unwrap();
        let (mut x, mut vx, mut ax) = (10.0 + delta, v, a);
        boundary.map_inside(&mut x, &mut vx, &mut ax);
        prop_assert!((x - delta).abs() < 1.0e-12);
        prop_assert_eq!(vx, v);
        prop_assert_eq!(ax, a);
        prop_assert!(boundary.contains(x));
    }

    #[test]
    fn ghosts_stay_outside_the_domain(
        positions in proptest::collection::vec(0.0_f64..10.0, 1..200),
        h in 0.05_f64..1.0,
        cyclic in any::<bool>(),
    ) {
        let kind = if cyclic { BoundaryType::Cyclic } else { BoundaryType::Solid };
        let mut boundary = Boundary::new(kind, 0.0, 10.0).unwrap();
        boundary.update(&positions, h);
        for &g in boundary.left_ghosts() {
            prop_assert!(g <= 0.0 && g > -2.0 * h);
        }
        for &g in boundary.right_ghosts() {
            prop_assert!(g >= 10.0 && g < 10.0 + 2.0 * h);
        }
    }
}

#[test]
fn kernel_continuity_at_branch_points() {
    for &h in &[0.05, 0.1, 0.5, 1.0] {
        for &r in &[1.0, 2.0] {
            let eps = 1.0e-10;
            let below = cubic_1d((r - eps) * h, h);
            let above = cubic_1d((r + eps) * h, h);
            assert!((below - above).abs() < 1.0e-6 / h, "h={h}, R={r}");
            let d_below = d_cubic_1d((r - eps) * h, h);
            let d_above = d_cubic_1d((r + eps) * h, h);
            assert!((d_below - d_above).abs() < 1.0e-6 / (h * h), "h={h}, R={r}");
        }
    }
}
