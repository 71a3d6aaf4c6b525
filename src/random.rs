use std::cell::RefCell;

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};

/// Size of the shared random value pool.
pub const RND_DATA_SZ: usize = 1_048_576;

// Thread-local `SmallRng` state.
thread_local! {
    static THREAD_RNG_KEY: RefCell<SmallRng> = RefCell::new(SmallRng::from_os_rng());
}

/// A handle to the thread-local `SmallRng`—similar to `rand::ThreadRng`.
#[derive(Debug, Clone)]
pub struct SmallThreadRng;

impl RngCore for SmallThreadRng {
    fn next_u32(&mut self) -> u32 {
        THREAD_RNG_KEY.with(|rng_cell| rng_cell.borrow_mut().next_u32())
    }

    fn next_u64(&mut self) -> u64 {
        THREAD_RNG_KEY.with(|rng_cell| rng_cell.borrow_mut().next_u64())
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        THREAD_RNG_KEY.with(|rng_cell| rng_cell.borrow_mut().fill_bytes(dest))
    }
}

pub fn small_thread_rng() -> SmallThreadRng {
    SmallThreadRng
}

/// Uniform record index in `[0, n)`. `n` must be non-zero.
#[inline]
pub fn gen_key_index(n: usize) -> usize {
    debug_assert!(n > 0);
    small_thread_rng().random_range(0..n)
}

/// Pre-generated printable bytes (`' '..='~'`) sliced into record values.
///
/// Values are never randomized per call: only the initial fill is random, and
/// consecutive slices may overlap once the cursor wraps.
pub struct RandomBytePool {
    data: Box<[u8]>,
}

impl Default for RandomBytePool {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomBytePool {
    pub fn new() -> Self {
        Self::with_rng(&mut small_thread_rng())
    }

    /// Fills the pool from the given generator. Used with a seeded rng for
    /// reproducible payloads.
    pub fn with_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let data = (0..RND_DATA_SZ)
            .map(|_| rng.random_range(b' '..=b'~'))
            .collect::<Vec<u8>>()
            .into_boxed_slice();
        RandomBytePool { data }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Returns `len` contiguous bytes starting at `*pos` and advances `*pos`.
    /// If the slice would run past the end, `*pos` is reset to 0 first.
    ///
    /// # Panics
    /// Panics if `len` exceeds the pool capacity.
    pub fn next_slice(&self, pos: &mut usize, len: usize) -> &[u8] {
        assert!(
            len <= self.data.len(),
            "requested {} bytes from a {} byte pool",
            len,
            self.data.len()
        );
        if *pos + len > self.data.len() {
            *pos = 0;
        }
        let start = *pos;
        *pos += len;
        &self.data[start..start + len]
    }
}
