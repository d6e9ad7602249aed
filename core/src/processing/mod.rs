pub mod butterworth;
pub mod edge_detect;
pub mod gyro_detect;
pub mod highpass;
pub mod moving_average;
pub mod pipeline;
pub mod power;
pub mod pulse_count;
pub mod threshold;

pub use butterworth::{BandForm, Butterworth};
pub use edge_detect::EdgeDetect;
pub use gyro_detect::{GyroDetect, GyroMode};
pub use highpass::HighPassFilter;
pub use moving_average::MovingAverage;
pub use pipeline::Pipeline;
pub use power::Power;
pub use pulse_count::PulseCount;
pub use threshold::Threshold;
