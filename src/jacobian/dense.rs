//! Dense row-major and column-major Jacobian writers.

use nalgebra::DMatrix;

use super::Contributions;

/// Writes `out[i*dim+j]` (row-major).
pub fn write_row_major(contrib: &Contributions, dim: usize, out: &mut [f64]) {
    assert_eq!(out.len(), dim * dim, "dense row-major buffer size mismatch");
    out.fill(0.0);
    for (row, col, val) in contrib.iter() {
        out[row * dim + col] = val;
    }
}

/// Writes `out[j*dim+i]` (column-major), matching `nalgebra::DMatrix`'s
/// own storage convention (see `examples/mhovd-diffsol`'s use of
/// `nalgebra::DMatrix<f64>` as its dense matrix type).
pub fn write_col_major(contrib: &Contributions, dim: usize, out: &mut [f64]) {
    assert_eq!(out.len(), dim * dim, "dense col-major buffer size mismatch");
    out.fill(0.0);
    for (row, col, val) in contrib.iter() {
        out[col * dim + row] = val;
    }
}

/// Convenience builder returning an owned `nalgebra::DMatrix<f64>`.
pub fn to_nalgebra(contrib: &Contributions, dim: usize) -> DMatrix<f64> {
    let mut buf = vec![0.0; dim * dim];
    write_col_major(contrib, dim, &mut buf);
    DMatrix::from_column_slice(dim, dim, &buf)
}
