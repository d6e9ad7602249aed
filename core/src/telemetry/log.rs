use log::{debug, info};

/// Thin wrapper over the `log` facade tagging records with the owning
/// component. Nothing here logs per-sample on the hot path.
pub struct LogManager {
    component: &'static str,
}

impl LogManager {
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.component, message);
    }

    pub fn record_debug(&self, message: &str) {
        debug!("[{}] {}", self.component, message);
    }
}
