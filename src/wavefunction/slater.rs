//! Slater matrix construction and inversion.

use nalgebra::DMatrix;

/// Build the N×N Slater matrix D with D[e,:] = M[position(e),:].
pub fn slater_matrix(orbitals: &DMatrix<f64>, positions: &[usize]) -> DMatrix<f64> {
    let n = positions.len();
    let mut d = DMatrix::zeros(n, orbitals.ncols());
    for (eid, &pos) in positions.iter().enumerate() {
        d.row_mut(eid).copy_from(&orbitals.row(pos));
    }
    d
}

/// Invert D through a full-pivot LU decomposition.
///
/// D counts as singular when the smallest pivot is below `tolerance`
/// relative to the largest one.
pub fn invert_slater(d: &DMatrix<f64>, tolerance: f64) -> Option<DMatrix<f64>> {
    if !d.is_square() || d.nrows() == 0 {
        return None;
    }
    let lu = d.clone().full_piv_lu();
    let pivots = lu.u().diagonal();
    let (largest, smallest) = (pivots.amax(), pivots.amin());
    if !(largest > 0.0) || !(smallest / largest >= tolerance) {
        return None;
    }
    lu.try_inverse()
}
