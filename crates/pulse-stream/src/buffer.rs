//! Rolling Metric Buffer

use std::collections::VecDeque;

use pulse_core::MetricSample;

/// Number of samples retained per live view.
pub const BUFFER_CAPACITY: usize = 30;

/// Bounded FIFO of the most recent samples, in arrival order.
///
/// `append` is the only mutation: once full, each new sample evicts the
/// oldest one, and nothing else is ever dropped.
#[derive(Debug, Clone)]
pub struct RollingBuffer {
    samples: VecDeque<MetricSample>,
    capacity: usize,
}

impl RollingBuffer {
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, sample: MetricSample) {
        self.samples.push_back(sample);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// Owned copy of the buffer, oldest first
    pub fn snapshot(&self) -> Vec<MetricSample> {
        self.samples.iter().cloned().collect()
    }

    /// Most recent sample, or the zero sample when nothing has arrived
    pub fn latest(&self) -> MetricSample {
        self.samples.back().cloned().unwrap_or_else(MetricSample::zero)
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
}

impl Default for RollingBuffer {
    fn default() -> Self {
        Self::new(BUFFER_CAPACITY)
    }
}
