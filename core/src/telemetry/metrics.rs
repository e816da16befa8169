use std::sync::Mutex;

use serde::Serialize;

pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

/// Point-in-time copy of the run counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub submitted: usize,
    pub rejected: usize,
    pub completed: usize,
    pub abandoned: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_submitted(&self) {
        self.update(|metrics| metrics.submitted += 1);
    }

    pub fn record_rejected(&self) {
        self.update(|metrics| metrics.rejected += 1);
    }

    pub fn record_completed(&self) {
        self.update(|metrics| metrics.completed += 1);
    }

    pub fn record_abandoned(&self) {
        self.update(|metrics| metrics.abandoned += 1);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            MetricsSnapshot::default()
        }
    }

    fn update(&self, apply: impl FnOnce(&mut MetricsSnapshot)) {
        if let Ok(mut metrics) = self.inner.lock() {
            apply(&mut metrics);
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
        let metrics = MetricsRecorder::new();
        metrics.record_submitted();
        metrics.record_submitted();
        metrics.record_abandoned();
        metrics.record_completed();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.submitted, 2);
        assert_eq!(snapshot.abandoned, 1);
        assert_eq!(snapshot.completed, 1);
        assert_eq!(snapshot.rejected, 0);
    }
}
