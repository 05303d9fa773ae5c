//! Sampler
//!
//! Strategies for sampling validation records before pruning a tree.
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::SeedableRng;

// A sampler can be used to subset the data prior to pruning.
pub trait Sampler {
    /// Sample the data, returning a tuple, where the first item is the samples
    /// chosen, and the second are the samples excluded.
    fn sample(&mut self, rng: &mut StdRng, index: &[usize]) -> (Vec<usize>, Vec<usize>);
}

/// Uniform sampling of a fixed number of records, without replacement.
pub struct FixedSizeSampler {
    sample_size: usize,
}

impl FixedSizeSampler {
    pub fn new(sample_size: usize) -> Self {
        FixedSizeSampler { sample_size }
    }
}

impl Sampler for FixedSizeSampler {
    fn sample(&mut self, rng: &mut StdRng, index: &[usize]) -> (Vec<usize>, Vec<usize>) {
        if self.sample_size >= index.len() {
            return (index.to_vec(), Vec::new());
        }
        let mut picked = vec![false; index.len()];
        for position in sample(rng, index.len(), self.sample_size).iter() {
            picked[position] = true;
        }
        let mut chosen = Vec::with_capacity(self.sample_size);
        let mut excluded = Vec::with_capacity(index.len() - self.sample_size);
        for (i, p) in index.iter().zip(picked) {
            if p {
                chosen.push(*i);
            } else {
                excluded.push(*i)
            }
        }
        (chosen, excluded)
    }
}

/// Random source for sampling, seeded when a seed is given.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}
