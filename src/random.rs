//! Uniform random selection
//!
//! The engine never reaches for a global generator. It draws through a
//! [`RandomSource`] so that games can be replayed from a seed and tests can
//! script every draw.

/// A source of uniformly distributed indices
pub trait RandomSource {
    /// Draws an index uniformly from `0..len`
    ///
    /// Callers never pass `len == 0`.
    fn index(&mut self, len: usize) -> usize;
}

impl RandomSource for fastrand::Rng {
    fn index(&mut self, len: usize) -> usize {
        self.usize(..len)
    }
}

/// Picks one element uniformly at random
///
/// Returns `None` for an empty slice.
pub fn choose<'a, T, R: RandomSource + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    if items.is_empty() {
        None
    } else {
        items.get(rng.index(items.len()))
    }
}

/// Picks `count` elements uniformly at random, without repetition
///
/// Runs the first `count` steps of a Fisher-Yates shuffle and keeps that
/// prefix, so every subset and every order is equally likely. When fewer
/// than `count` items are given, all of them are returned in random order.
pub fn sample<T, R: RandomSource + ?Sized>(
    rng: &mut R,
    mut items: Vec<T>,
    count: usize,
) -> Vec<T> {
    let len = items.len();
    let count = count.min(len);
    for i in 0..count {
        let j = i + rng.index(len - i);
        items.swap(i, j);
    }
    items.truncate(count);
    items
}

/// Replays a fixed list of draws, reduced modulo the requested range
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct Scripted(std::collections::VecDeque<usize>);

#[cfg(test)]
impl Scripted {
    pub(crate) fn new<I: IntoIterator<Item = usize>>(draws: I) -> Self {
        Self(draws.into_iter().collect())
    }
}

#[cfg(test)]
impl RandomSource for Scripted {
    fn index(&mut self, len: usize) -> usize {
        self.0.pop_front().unwrap_or_default() % len
    }
}
