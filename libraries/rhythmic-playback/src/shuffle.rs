//! Shuffle for queue randomization

use rand::seq::SliceRandom;
use rand::{thread_rng, Rng};
use rhythmic_core::types::Index;

/// Every index in `0..len` in uniformly random order (Fisher-Yates)
pub fn shuffled_indices(len: usize) -> Vec<Index> {
    shuffled_indices_with(len, &mut thread_rng())
}

/// [`shuffled_indices`] with a caller-supplied generator
pub fn shuffled_indices_with<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Vec<Index> {
    let mut indices: Vec<Index> = (0..len).collect();
    indices.shuffle(rng);
    indices
}
