//! LAPACK-style banded column-major Jacobian writers. Bandwidth is
//! fixed at `n` (one species block) regardless of stencil width,
//! because spec.md's imperfect-Jacobian contract restricts every entry
//! to neighbouring bins.

use super::Contributions;

/// Packed banded storage, shape `(2n+1, dim)` column-major: row
/// `r = n + i - j`, column `j`.
pub fn write_packed(contrib: &Contributions, n: usize, dim: usize, out: &mut [f64]) {
    let rows = 2 * n + 1;
    assert_eq!(out.len(), rows * dim, "banded packed buffer size mismatch");
    out.fill(0.0);
    for (i, j, val) in contrib.iter() {
        let r = n as isize + i as isize - j as isize;
        debug_assert!(
            (0..rows as isize).contains(&r),
            "entry ({i},{j}) falls outside the n-wide band"
        );
        out[j * rows + r as usize] = val;
    }
}

/// Padded banded storage, shape `(3n+1, dim)` column-major: same row
/// rule as [`write_packed`], offset down by `n` extra scratch rows
/// reserved for LU fill-in by the caller's linear solver.
pub fn write_padded(contrib: &Contributions, n: usize, dim: usize, out: &mut [f64]) {
    let rows = 3 * n + 1;
    assert_eq!(out.len(), rows * dim, "banded padded buffer size mismatch");
    out.fill(0.0);
    for (i, j, val) in contrib.iter() {
        let r = 2 * n as isize + i as isize - j as isize;
        debug_assert!(
            (n as isize..rows as isize).contains(&r),
            "entry ({i},{j}) falls outside the n-wide band"
        );
        out[j * rows + r as usize] = val;
    }
}

/// Reads back the dense value at `(row, col)` from packed storage, used
/// by tests to check cross-layout consistency (spec.md §8 property 3).
pub fn packed_get(out: &[f64], n: usize, dim: usize, row: usize, col: usize) -> f64 {
    let rows = 2 * n + 1;
    let r = n as isize + row as isize - col as isize;
    if !(0..rows as isize).contains(&r) {
        return 0.0;
    }
    out[col * rows + r as usize]
}
