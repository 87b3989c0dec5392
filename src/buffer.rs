//! Rolling magnitude buffer
//!
//! This module holds the fixed-capacity window of motion magnitudes that
//! drives activity classification. Variance over the window separates still,
//! walking, and running motion.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of samples in the rolling window
pub const DEFAULT_BUFFER_CAPACITY: usize = 50;

/// Fixed-capacity FIFO of scalar magnitudes with population statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalBuffer {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl Default for SignalBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_CAPACITY)
    }
}

impl SignalBuffer {
    /// Create a buffer holding at most `capacity` samples (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest when the window is full
    pub fn push(&mut self, magnitude: f64) {
        while self.samples.len() >= self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(magnitude);
    }

    /// Population mean of the current contents (0.0 when empty)
    pub fn mean(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f64>() / self.samples.len() as f64
    }

    /// Population variance of the current contents (0.0 when empty)
    pub fn variance(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        self.samples
            .iter()
            .map(|x| (x - mean).powi(2))
            .sum::<f64>()
            / self.samples.len() as f64
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

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
