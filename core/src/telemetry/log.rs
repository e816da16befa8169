use log::{debug, info, warn};

/// Scoped logger; every line carries the scope tag (e.g. `run#3`).
#[derive(Debug, Clone)]
pub struct LogManager {
    scope: String,
}

impl LogManager {
    pub fn new(scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
        }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn record(&self, message: &str) {
        info!("[{}] {}", self.scope, message);
    }

    pub fn debug(&self, message: &str) {
        debug!("[{}] {}", self.scope, message);
    }

    pub fn warn(&self, message: &str) {
        warn!("[{}] {}", self.scope, message);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new("scancore")
    }
}
