pub mod poly;
pub mod stats;

pub use stats::StatsHelper;
