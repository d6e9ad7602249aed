use std::sync::Mutex;

/// Point-in-time view of a window's intake counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Samples accepted and stored.
    pub processed: usize,
    /// Samples refused while paused or with zero capacity.
    pub dropped: usize,
    /// Samples pushed out by the eviction policy.
    pub evicted: usize,
}

/// Mutex-guarded counters safe for one writer and many readers.
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_processed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.processed += 1;
        }
    }

    pub fn record_dropped(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.dropped += 1;
        }
    }

    pub fn record_evicted(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.evicted += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let recorder = MetricsRecorder::new();
        recorder.record_processed();
        recorder.record_processed();
        recorder.record_evicted();
        recorder.record_dropped();

        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.processed, 2);
        assert_eq!(snapshot.evicted, 1);
        assert_eq!(snapshot.dropped, 1);
    }
}
