use std::sync::atomic::{AtomicU64, Ordering};

use rand::distr::{Distribution, Uniform};
use rand::rng;

/// Source of the only non-deterministic choices the responder makes: which
/// fallback text to send and the demo booking numbers.
pub trait RandomSource: Send + Sync {
    /// Uniform value in `0..bound`. `bound` is never zero.
    fn below(&self, bound: u64) -> u64;

    fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T>
    where
        Self: Sized,
    {
        pick_from(self, items)
    }
}

pub fn pick_from<'a, T>(source: &dyn RandomSource, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let idx = source.below(items.len() as u64) as usize;
    items.get(idx)
}

/// Thread-local RNG drawn through rand's uniform range distribution.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn below(&self, bound: u64) -> u64 {
        Uniform::new(0, bound.max(1))
            .map(|range| range.sample(&mut rng()))
            .unwrap_or(0)
    }
}

/// Deterministic source for tests: yields 0, 1, 2, ... modulo the bound.
#[derive(Debug, Default)]
pub struct CyclingRandom {
    next: AtomicU64,
}

impl CyclingRandom {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RandomSource for CyclingRandom {
    fn below(&self, bound: u64) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed) % bound.max(1)
    }
}

/// Always the same draw, clamped to the bound.
#[derive(Debug, Clone, Copy)]
pub struct FixedRandom(pub u64);

impl RandomSource for FixedRandom {
    fn below(&self, bound: u64) -> u64 {
        self.0.min(bound.max(1) - 1)
    }
}
