//! End-to-end scenarios and cross-cutting invariants, covering the
//! closed-form numeric checks a reaction-diffusion-drift engine must
//! satisfy regardless of its internal assembly order.

use approx::assert_relative_eq;
use reactor1d::geom::Geometry;
use reactor1d::grid::Grid;
use reactor1d::{JacobianLayout, SystemBuilder, SystemConfig};

fn base_config() -> SystemConfig {
    SystemConfig {
        x: vec![0.0, 1.0],
        n_species: 2,
        nstencil: 1,
        ..SystemConfig::default()
    }
}

#[test]
fn scenario_a_single_bin_decay() {
    let cfg = SystemConfig {
        stoich_reac: vec![vec![0]],
        stoich_prod: vec![vec![1]],
        k: vec![5.0],
        ..base_config()
    };
    let mut sys = SystemBuilder::build(cfg).unwrap();
    let y = vec![2.0, 3.0];
    let mut f = vec![0.0; sys.dim()];
    sys.f(0.0, &y, &mut f).unwrap();
    assert_relative_eq!(f[0], -10.0, epsilon = 1e-12);
    assert_relative_eq!(f[1], 10.0, epsilon = 1e-12);

    let dim = sys.dim();
    let mut dense = vec![0.0; dim * dim];
    sys.jacobian(0.0, &y, JacobianLayout::DenseRowMajor, &mut dense).unwrap();
    assert_relative_eq!(dense[0 * dim + 0], -5.0, epsilon = 1e-12);
    assert_relative_eq!(dense[1 * dim + 0], 5.0, epsilon = 1e-12);
    for (idx, &v) in dense.iter().enumerate() {
        if idx != 0 && idx != dim {
            assert_eq!(v, 0.0, "unexpected nonzero at flat index {idx}");
        }
    }
}

#[test]
fn scenario_c_three_bin_lrefl_weights() {
    let x = vec![5.0, 9.0, 13.0, 15.0];
    let grid = Grid::new(x, 3, true, false, false, Geometry::Flat).unwrap();
    let expect = [
        [1.0 / 16.0, -1.0 / 8.0, 1.0 / 16.0],
        [1.0 / 14.0, -1.0 / 6.0, 2.0 / 21.0],
        [1.0 / 14.0, -1.0 / 6.0, 2.0 / 21.0],
    ];
    for (row, erow) in grid.weights.iter().zip(expect.iter()) {
        for (w, e) in row.iter().zip(erow.iter()) {
            assert_relative_eq!(w, e, epsilon = 1e-12);
        }
    }
}

#[test]
fn scenario_f_logy_pure_decay() {
    let cfg = SystemConfig {
        x: vec![0.0, 1.0],
        n_species: 2,
        stoich_reac: vec![vec![0]],
        stoich_prod: vec![vec![1]],
        k: vec![5.0],
        logy: true,
        ..SystemConfig::default()
    };
    let mut sys = SystemBuilder::build(cfg).unwrap();
    let y = vec![2.0_f64.ln(), 3.0_f64.ln()];
    let mut f = vec![0.0; sys.dim()];
    sys.f(0.0, &y, &mut f).unwrap();
    assert_relative_eq!(f[0], -5.0, epsilon = 1e-10);
    assert_relative_eq!(f[1], 5.0 * (2.0 / 3.0), epsilon = 1e-10);
}

#[test]
fn invariant_layouts_agree_within_imperfect_jacobian_band() {
    let cfg = SystemConfig {
        x: vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        n_species: 2,
        stoich_reac: vec![vec![0]],
        stoich_prod: vec![vec![1]],
        k: vec![2.0],
        diffusion: vec![1.0, 0.5],
        nstencil: 3,
        ..SystemConfig::default()
    };
    let mut sys = SystemBuilder::build(cfg).unwrap();
    let y: Vec<f64> = (0..sys.dim()).map(|i| 1.0 + i as f64 * 0.1).collect();

    let dim = sys.dim();
    let mut dense = vec![0.0; dim * dim];
    sys.jacobian(0.0, &y, JacobianLayout::DenseRowMajor, &mut dense).unwrap();

    let n = sys.n_species();
    let mut packed = vec![0.0; sys.jacobian_len(JacobianLayout::BandedPacked)];
    sys.jacobian(0.0, &y, JacobianLayout::BandedPacked, &mut packed).unwrap();

    for i in 0..dim {
        for j in 0..dim {
            let bi = i / n;
            let bj = j / n;
            if (bi as isize - bj as isize).abs() > 1 {
                continue;
            }
            let r = n as isize + i as isize - j as isize;
            let rows = 2 * n + 1;
            if !(0..rows as isize).contains(&r) {
                continue;
            }
            let from_packed = packed[j * rows + r as usize];
            assert_relative_eq!(from_packed, dense[i * dim + j], epsilon = 1e-10);
        }
    }
}

#[test]
fn invariant_idempotent_without_efield() {
    let cfg = SystemConfig {
        x: vec![0.0, 1.0, 2.0, 3.0],
        n_species: 1,
        diffusion: vec![1.0],
        ..SystemConfig::default()
    };
    let mut sys = SystemBuilder::build(cfg).unwrap();
    let y = vec![1.0, 2.0, 3.0];
    let mut f1 = vec![0.0; sys.dim()];
    let mut f2 = vec![0.0; sys.dim()];
    sys.f(0.0, &y, &mut f1).unwrap();
    sys.f(0.0, &y, &mut f2).unwrap();
    assert_eq!(f1, f2);
}

#[test]
fn invariant_geometry_consistency_with_zero_diffusion() {
    let cfg = SystemConfig {
        x: vec![0.0, 1.0, 2.0, 3.0, 4.0],
        n_species: 1,
        ..SystemConfig::default()
    };
    let sys = SystemBuilder::build(cfg).unwrap();
    let y = vec![2.0, 2.0, 2.0, 2.0];
    let total = sys.integrated_conc(&y, 0).unwrap();
    // Flat geometry: integral of constant C=2 over length 4 is 8.
    assert_relative_eq!(total, 8.0, epsilon = 1e-8);
}

#[test]
fn unknown_state_shape_is_rejected() {
    let mut sys = SystemBuilder::build(base_config()).unwrap();
    let y = vec![1.0];
    let mut out = vec![0.0; sys.dim()];
    assert!(sys.f(0.0, &y, &mut out).is_err());
}
