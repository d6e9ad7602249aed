pub mod trace;
pub mod window;

pub use trace::{from_csv, to_csv, TraceError};
pub use window::Window;
