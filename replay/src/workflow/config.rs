use anyhow::Context;
use bcicore::processing::{
    BandForm, Butterworth, EdgeDetect, GyroDetect, GyroMode, HighPassFilter, MovingAverage,
    Pipeline, Power, PulseCount, Threshold,
};
use bcicore::stream::Window;
use bcicore::{Stage, StageResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// One stage entry in a workflow config, in pipeline order.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StageSpec {
    Highpass {
        cutoff_hz: f64,
    },
    MovingAverage {
        window: usize,
    },
    Butterworth {
        order: usize,
        band: BandForm,
        sample_rate_hz: f64,
    },
    Power {
        period_secs: f64,
        sample_spacing_secs: f64,
    },
    Threshold {
        threshold: f64,
    },
    EdgeDetect,
    PulseCount {
        num_thres: u32,
        #[serde(default)]
        time_thres_secs: f64,
    },
    GyroDetect {
        threshold: f64,
        mode: GyroMode,
        #[serde(default)]
        rtz: bool,
    },
}

impl StageSpec {
    pub fn build(&self) -> StageResult<Box<dyn Stage>> {
        Ok(match *self {
            StageSpec::Highpass { cutoff_hz } => Box::new(HighPassFilter::new(cutoff_hz)?),
            StageSpec::MovingAverage { window } => Box::new(MovingAverage::new(window)?),
            StageSpec::Butterworth {
                order,
                band,
                sample_rate_hz,
            } => Box::new(Butterworth::new(order, band, sample_rate_hz)?),
            StageSpec::Power {
                period_secs,
                sample_spacing_secs,
            } => Box::new(Power::new(period_secs, sample_spacing_secs)?),
            StageSpec::Threshold { threshold } => Box::new(Threshold::new(threshold)),
            StageSpec::EdgeDetect => Box::new(EdgeDetect::new()),
            StageSpec::PulseCount {
                num_thres,
                time_thres_secs,
            } => Box::new(PulseCount::new(num_thres, time_thres_secs)?),
            StageSpec::GyroDetect {
                threshold,
                mode,
                rtz,
            } => Box::new(GyroDetect::new(threshold, mode, rtz)?),
        })
    }
}

fn default_x_label() -> String {
    "Time".to_string()
}

fn default_y_label() -> String {
    "Value".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub window_size: usize,
    #[serde(default = "default_x_label")]
    pub x_label: String,
    #[serde(default = "default_y_label")]
    pub y_label: String,
    #[serde(default)]
    pub stages: Vec<StageSpec>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn with_window_size(window_size: usize) -> Self {
        Self {
            window_size,
            x_label: default_x_label(),
            y_label: default_y_label(),
            stages: Vec::new(),
        }
    }

    /// Builds the configured window with its pipeline attached.
    pub fn build_window(&self) -> anyhow::Result<Arc<Window>> {
        let window = Arc::new(Window::new());
        window.set_capacity(self.window_size);
        window.set_labels(&self.x_label, &self.y_label);

        if !self.stages.is_empty() {
            let mut pipeline = Pipeline::new();
            for (index, spec) in self.stages.iter().enumerate() {
                let stage = spec
                    .build()
                    .with_context(|| format!("building stage {}", index))?;
                pipeline.add_stage(stage);
            }
            window.set_pipeline(Some(pipeline));
        }

        Ok(window)
    }
}
