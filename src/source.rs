use rand::Rng;


/// The single randomness capability this crate depends on.
///
/// Compiled evaluators never own a source; one is injected at roll time so
/// tests can substitute a deterministic implementation.
pub trait RollSource {
    /// Rolls one die with `faces` faces, returning a uniformly distributed
    /// value in `[1, faces]`. Compilation guarantees `faces >= 1`.
    fn roll_die(&mut self, faces: u16) -> u16;
}


/// The production [`RollSource`], backed by the thread-local generator.
#[derive(Debug, Clone)]
pub struct ThreadRngSource {
    rng: rand::rngs::ThreadRng,
}

impl ThreadRngSource {
    /// Creates a source over this thread's generator.
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for ThreadRngSource {
    fn default() -> Self {
        Self::new()
    }
}

impl RollSource for ThreadRngSource {
    fn roll_die(&mut self, faces: u16) -> u16 {
        self.rng.random_range(1..=faces)
    }
}


/// Adapts a closure into a [`RollSource`].
///
/// Useful for scripted dice in tests and for bridging any external
/// generator that can be expressed as a single function:
///
/// ```
/// use dicemill::{compile, FnSource};
///
/// let mut loaded = FnSource(|faces| faces); // every die rolls its maximum
/// let total = compile("3d6+1").unwrap().roll_with(&mut loaded).unwrap();
/// assert_eq!(total, 19);
/// ```
#[derive(Debug, Clone)]
pub struct FnSource<F>(pub F);

impl<F: FnMut(u16) -> u16> RollSource for FnSource<F> {
    fn roll_die(&mut self, faces: u16) -> u16 {
        (self.0)(faces)
    }
}
