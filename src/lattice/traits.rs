//! Lattice interface consumed by the variational state.
//!
//! Spin-orbital indices run over `[0, 2L)`: indices below `L` are the spin-up
//! orbitals of sites `0..L`, the remaining ones the spin-down orbitals.

/// Geometry information needed by the sampler.
pub trait Lattice {
    /// Number of lattice sites `L`.
    fn num_sites(&self) -> usize;

    /// Number of distinct neighbour distances available through [`Lattice::xnn`].
    fn num_shells(&self) -> usize;

    /// Spin-orbital indices at distance `x` (1 = nearest neighbours) from the
    /// spin-orbital `i`, in the same spin sector as `i`.
    fn xnn(&self, i: usize, x: usize) -> &[usize];

    /// Index of the displacement `j - i` folded back into the unit cell.
    fn reduce_idxrel(&self, i: usize, j: usize) -> usize;

    /// Site of a spin-orbital, expressed as its spin-up orbital index.
    fn spinup_site(&self, i: usize) -> usize {
        i % self.num_sites()
    }
}
