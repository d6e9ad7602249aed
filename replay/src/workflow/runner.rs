use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use bcicore::math::StatsHelper;
use bcicore::stream::{self, Window};
use bcicore::telemetry::MetricsSnapshot;
use bcicore::Sample;
use std::sync::Arc;

/// Summary of one replay through a configured window.
pub struct WorkflowResult {
    pub snapshot: Vec<Sample>,
    pub nonzero_events: usize,
    pub peak: f64,
    pub time_offset: f64,
    pub metrics: MetricsSnapshot,
    /// The processed window re-serialized as a two-column trace.
    pub csv: String,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Replays a recorded two-column trace through a freshly built
    /// window.
    pub fn replay_trace(&self, text: &str) -> anyhow::Result<WorkflowResult> {
        let window = self.config.build_window()?;
        stream::from_csv(&window, text).context("replaying trace")?;
        self.summarize(&window)
    }

    /// Feeds pre-built samples through a freshly built window.
    pub fn replay_samples(&self, samples: &[Sample]) -> anyhow::Result<WorkflowResult> {
        let window = self.config.build_window()?;
        for &sample in samples {
            window.add(sample);
        }
        self.summarize(&window)
    }

    fn summarize(&self, window: &Arc<Window>) -> anyhow::Result<WorkflowResult> {
        let snapshot = window.snapshot();
        let nonzero_events = snapshot.iter().filter(|s| s.v != 0.0).count();
        let peak = StatsHelper::peak(snapshot.iter().map(|s| s.v));
        let csv = stream::to_csv(window).context("serializing processed window")?;

        Ok(WorkflowResult {
            nonzero_events,
            peak,
            time_offset: window.time_offset(),
            metrics: window.metrics(),
            csv,
            snapshot,
        })
    }
}
