//! Seed sources for presets that randomize the obfuscator

use rand::Rng;

const SEED_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SEED_LENGTH: usize = 13;

/// Supplies the `seed` option for presets that ask for a fresh one.
pub trait SeedSource: Send + Sync {
    fn next_seed(&self) -> String;
}

/// Thread-local RNG, 13 base-36 characters per seed.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomSeed;

impl SeedSource for RandomSeed {
    fn next_seed(&self) -> String {
        let mut rng = rand::thread_rng();
        (0..SEED_LENGTH)
            .map(|_| SEED_ALPHABET[rng.gen_range(0..SEED_ALPHABET.len())] as char)
            .collect()
    }
}

/// Always returns the same seed. Makes every preset reproducible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSeed(String);

impl FixedSeed {
    pub fn new(seed: impl Into<String>) -> Self {
        Self(seed.into())
    }
}

impl SeedSource for FixedSeed {
    fn next_seed(&self) -> String {
        self.0.clone()
    }
}
