//! Bounded rolling windows over recent samples.
//!
//! Every reduction is fail-soft: with fewer than two samples there is not
//! enough history to say anything, so [`NEUTRAL`] is returned instead.

use std::collections::VecDeque;

/// Score reported when a signal has no usable history yet.
pub const NEUTRAL: f64 = 0.5;

/// Fixed-capacity FIFO of the most recent samples.
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    samples: VecDeque<T>,
    capacity: usize,
}

impl<T> SlidingWindow<T> {
    /// Create an empty window. A capacity of 0 is raised to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, returning the evicted oldest sample when full.
    pub fn push(&mut self, sample: T) -> Option<T> {
        let evicted = if self.samples.len() == self.capacity {
            self.samples.pop_front()
        } else {
            None
        };
        self.samples.push_back(sample);
        evicted
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.samples.len() == self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&T> {
        self.samples.back()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    fn has_history(&self) -> bool {
        self.samples.len() >= 2
    }
}

impl SlidingWindow<f64> {
    /// Arithmetic mean, or [`NEUTRAL`] with fewer than two samples.
    pub fn mean(&self) -> f64 {
        if !self.has_history() {
            return NEUTRAL;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }
}

impl SlidingWindow<bool> {
    pub fn count_true(&self) -> usize {
        self.samples.iter().filter(|s| **s).count()
    }

    /// Fraction of `true` samples, or [`NEUTRAL`] with fewer than two samples.
    pub fn ratio_true(&self) -> f64 {
        if !self.has_history() {
            return NEUTRAL;
        }
        self.count_true() as f64 / self.samples.len() as f64
    }
}

impl<T: PartialEq> SlidingWindow<T> {
    /// Number of adjacent pairs that disagree.
    pub fn transitions(&self) -> usize {
        self.samples
            .iter()
            .zip(self.samples.iter().skip(1))
            .filter(|(a, b)| a != b)
            .count()
    }

    /// Disagreeing pairs over all adjacent pairs, or [`NEUTRAL`] with
    /// fewer than two samples.
    pub fn transition_rate(&self) -> f64 {
        if !self.has_history() {
            return NEUTRAL;
        }
        self.transitions() as f64 / (self.samples.len() - 1) as f64
    }
}
