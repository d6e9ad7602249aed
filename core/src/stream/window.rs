use crate::prelude::Sample;
use crate::processing::pipeline::Pipeline;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::{MetricsRecorder, MetricsSnapshot};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, RwLock};

/// A bounded, evicting buffer of samples, optionally pipeline-processed
/// on insert.
///
/// Exactly one producer writes through [`Window::add`]; any number of
/// readers take snapshot reads concurrently, so a window is shared as
/// `Arc<Window>` and every method takes `&self`. Capacity starts at 0,
/// which means "never store": `add` silently refuses to grow until
/// [`Window::set_capacity`] is called.
pub struct Window {
    state: RwLock<WindowState>,
    pipeline: Mutex<Option<Pipeline>>,
    paused: AtomicBool,
    metrics: MetricsRecorder,
    logger: LogManager,
}

struct WindowState {
    samples: VecDeque<Sample>,
    capacity: usize,
    time_offset: f64,
    needs_offset: bool,
    x_label: String,
    y_label: String,
}

impl Window {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(WindowState {
                samples: VecDeque::new(),
                capacity: 0,
                time_offset: 0.0,
                needs_offset: false,
                x_label: "Time".to_string(),
                y_label: "Value".to_string(),
            }),
            pipeline: Mutex::new(None),
            paused: AtomicBool::new(false),
            metrics: MetricsRecorder::new(),
            logger: LogManager::new("window"),
        }
    }

    /// Sets the maximum number of stored samples. Shrinking evicts the
    /// oldest samples immediately.
    pub fn set_capacity(&self, capacity: usize) {
        if let Ok(mut state) = self.state.write() {
            state.capacity = capacity;
            while state.samples.len() > capacity {
                if let Some(old) = state.samples.pop_front() {
                    state.time_offset = old.t;
                    self.metrics.record_evicted();
                }
            }
        }
        self.logger.record_debug(&format!("capacity set to {}", capacity));
    }

    pub fn capacity(&self) -> usize {
        self.state.read().map(|state| state.capacity).unwrap_or(0)
    }

    /// Attaches (or with `None` removes) the processing pipeline.
    /// Samples added with no pipeline are stored unprocessed.
    pub fn set_pipeline(&self, pipeline: Option<Pipeline>) {
        if let Ok(mut guard) = self.pipeline.lock() {
            *guard = pipeline;
        }
    }

    /// Locked access to the attached pipeline, for structural edits and
    /// control routing. Callers must quiesce the producer first; this
    /// lock also blocks `add` for its duration.
    pub fn with_pipeline<R>(&self, f: impl FnOnce(&mut Pipeline) -> R) -> Option<R> {
        if let Ok(mut guard) = self.pipeline.lock() {
            guard.as_mut().map(f)
        } else {
            None
        }
    }

    /// Pause or resume intake. Resuming flushes the stored samples and
    /// resynchronizes the time offset to the next added sample.
    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
        if !paused {
            if let Ok(mut state) = self.state.write() {
                state.samples.clear();
                state.needs_offset = true;
            }
            self.logger.record_debug("resumed, buffer flushed");
        }
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    /// Feeds a sample through the attached pipeline (if any) and stores
    /// the result, evicting the oldest sample when full. The evicted
    /// sample's timestamp becomes the new time offset.
    pub fn add(&self, sample: Sample) {
        if self.is_paused() {
            self.metrics.record_dropped();
            return;
        }
        if self.capacity() == 0 {
            self.metrics.record_dropped();
            return;
        }

        let processed = if let Ok(mut guard) = self.pipeline.lock() {
            match guard.as_mut() {
                Some(pipeline) => pipeline.push(sample),
                None => sample,
            }
        } else {
            sample
        };

        if let Ok(mut state) = self.state.write() {
            if state.samples.len() >= state.capacity {
                if let Some(old) = state.samples.pop_front() {
                    state.time_offset = old.t;
                    self.metrics.record_evicted();
                }
            } else if state.needs_offset {
                // resync against the raw input's timestamp
                state.time_offset = sample.t;
                state.needs_offset = false;
            }
            state.samples.push_back(processed);
            self.metrics.record_processed();
        }
    }

    /// The stored samples, oldest to newest.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.state
            .read()
            .map(|state| state.samples.iter().copied().collect())
            .unwrap_or_default()
    }

    /// The most recently stored sample.
    pub fn latest(&self) -> Option<Sample> {
        self.state
            .read()
            .ok()
            .and_then(|state| state.samples.back().copied())
    }

    pub fn len(&self) -> usize {
        self.state.read().map(|state| state.samples.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rolling time-offset reference: the timestamp of the most
    /// recently evicted sample, or the resync point after a resume.
    pub fn time_offset(&self) -> f64 {
        self.state.read().map(|state| state.time_offset).unwrap_or(0.0)
    }

    pub fn set_labels(&self, x_label: &str, y_label: &str) {
        if let Ok(mut state) = self.state.write() {
            state.x_label = x_label.to_string();
            state.y_label = y_label.to_string();
        }
    }

    pub fn labels(&self) -> (String, String) {
        self.state
            .read()
            .map(|state| (state.x_label.clone(), state.y_label.clone()))
            .unwrap_or_default()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Default for Window {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processing::threshold::Threshold;

    #[test]
    fn zero_capacity_refuses_to_store() {
        let window = Window::new();
        window.add(Sample::new(0.0, 1.0));
        assert!(window.is_empty());
        assert_eq!(window.metrics().dropped, 1);
    }

    #[test]
    fn eviction_keeps_newest_and_tracks_offset() {
        let window = Window::new();
        window.set_capacity(3);
        for i in 0..4 {
            window.add(Sample::new(i as f64, i as f64 * 10.0));
        }

        let stored = window.snapshot();
        assert_eq!(stored.len(), 3);
        assert_eq!(
            stored,
            vec![
                Sample::new(1.0, 10.0),
                Sample::new(2.0, 20.0),
                Sample::new(3.0, 30.0)
            ]
        );
        // offset is the evicted sample's timestamp
        assert_eq!(window.time_offset(), 0.0);
        assert_eq!(window.metrics().evicted, 1);
        assert_eq!(window.latest(), Some(Sample::new(3.0, 30.0)));
    }

    #[test]
    fn paused_window_drops_then_resumes_with_resync() {
        let window = Window::new();
        window.set_capacity(8);
        window.add(Sample::new(0.0, 1.0));
        window.add(Sample::new(1.0, 2.0));

        window.set_paused(true);
        window.add(Sample::new(2.0, 3.0));
        assert_eq!(window.len(), 2);

        window.set_paused(false);
        assert!(window.is_empty());

        window.add(Sample::new(5.0, 4.0));
        assert_eq!(window.len(), 1);
        // offset resynchronized to the first post-resume timestamp
        assert_eq!(window.time_offset(), 5.0);
    }

    #[test]
    fn pipeline_processes_samples_on_insert() {
        let window = Window::new();
        window.set_capacity(4);

        let mut pipeline = Pipeline::new();
        pipeline.add_stage(Box::new(Threshold::new(5.0)));
        window.set_pipeline(Some(pipeline));

        window.add(Sample::new(0.0, 10.0));
        window.add(Sample::new(1.0, 2.0));
        assert_eq!(
            window.snapshot(),
            vec![Sample::new(0.0, 1.0), Sample::new(1.0, 0.0)]
        );

        // removing the pipeline stores samples unprocessed
        window.set_pipeline(None);
        window.add(Sample::new(2.0, 10.0));
        assert_eq!(window.latest(), Some(Sample::new(2.0, 10.0)));
    }

    #[test]
    fn shrinking_capacity_evicts_oldest() {
        let window = Window::new();
        window.set_capacity(4);
        for i in 0..4 {
            window.add(Sample::new(i as f64, 0.0));
        }
        window.set_capacity(2);
        assert_eq!(window.len(), 2);
        assert_eq!(window.time_offset(), 1.0);
    }

    #[test]
    fn tap_mirrors_every_stage_output() {
        use crate::processing::moving_average::MovingAverage;
        use crate::Stage;
        use std::sync::Arc;

        let diagnostic = Arc::new(Window::new());
        diagnostic.set_capacity(16);

        let mut stage = MovingAverage::new(4).unwrap();
        stage.tap().attach(&diagnostic);

        let primary = Window::new();
        primary.set_capacity(16);
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(Box::new(stage));
        primary.set_pipeline(Some(pipeline));

        for i in 0..6 {
            primary.add(Sample::new(i as f64, 1.0));
        }

        // exact parity, warm-up placeholders included
        assert_eq!(diagnostic.snapshot(), primary.snapshot());
    }

    #[test]
    fn recalibration_routes_to_an_embedded_stage() {
        use crate::processing::gyro_detect::{GyroDetect, GyroMode};

        let window = Window::new();
        window.set_capacity(8);
        let mut pipeline = Pipeline::new();
        pipeline.add_stage(Box::new(
            GyroDetect::new(10.0, GyroMode::Position, false).unwrap(),
        ));
        window.set_pipeline(Some(pipeline));

        window.add(Sample::new(0.0, 100.0));
        assert_eq!(window.latest().map(|s| s.v), Some(100.0));

        let calibrated = window
            .with_pipeline(|pipeline| {
                pipeline
                    .stage_mut(0)
                    .and_then(|stage| stage.as_any_mut().downcast_mut::<GyroDetect>())
                    .map(|gyro| gyro.calibrate_center())
                    .is_some()
            })
            .unwrap_or(false);
        assert!(calibrated);

        window.add(Sample::new(0.1, 7.0));
        assert_eq!(window.latest().map(|s| s.v), Some(7.0));
    }

    #[test]
    fn concurrent_readers_observe_writer_progress() {
        use std::sync::Arc;

        let window = Arc::new(Window::new());
        window.set_capacity(64);

        let writer = {
            let window = Arc::clone(&window);
            std::thread::spawn(move || {
                for i in 0..1000 {
                    window.add(Sample::new(i as f64, i as f64));
                }
            })
        };
        let reader = {
            let window = Arc::clone(&window);
            std::thread::spawn(move || {
                let mut last_len = 0;
                for _ in 0..100 {
                    let snapshot = window.snapshot();
                    assert!(snapshot.len() <= 64);
                    last_len = snapshot.len();
                }
                last_len
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();
        assert_eq!(window.len(), 64);
        assert_eq!(window.metrics().processed, 1000);
    }
}
