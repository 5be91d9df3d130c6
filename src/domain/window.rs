// Bounded FIFO window of live samples
use super::telemetry::TelemetrySample;
use std::collections::VecDeque;
use std::sync::Arc;

/// Most recent live samples in arrival order. Oldest is evicted once the
/// window is full.
#[derive(Debug, Clone)]
pub struct SampleWindow {
    capacity: usize,
    samples: VecDeque<TelemetrySample>,
}

impl SampleWindow {
    /// `capacity` is clamped to at least one sample.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    pub fn append(&mut self, sample: TelemetrySample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Copy of the current contents; later appends do not affect it.
    pub fn snapshot(&self) -> Arc<[TelemetrySample]> {
        self.samples.iter().cloned().collect()
    }

    pub fn current(&self) -> Option<&TelemetrySample> {
        self.samples.back()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
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
