use rand::Rng;

/// The RNG collaborator contract required by [crate::TilingPath::tile]'s
/// traceback step: a uniform-integer primitive over `[0, n)`.
/// Isolating this behind a trait, rather than depending on a concrete
/// `rand::Rng` everywhere, keeps the crate's public API from forcing a
/// particular RNG algorithm on callers; a blanket impl is provided for
/// any `rand::Rng` below, which is how the crate's own tests and
/// benchmarks drive it.
pub trait TileRandom {
    /// A uniformly-distributed index in `[0, n)`. `n` is always
    /// greater than zero when called by the tiler.
    fn next_index(&mut self, n: usize) -> usize;
}

impl<R: Rng + ?Sized> TileRandom for R {
    #[inline]
    fn next_index(&mut self, n: usize) -> usize {
        self.gen_range(0..n)
    }
}
