use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bookkeeping block applications embed in their records for support and
/// debugging. The store never stamps it on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveInfo {
    pub app_version: String,
    pub test_build: bool,
    pub save_counter: u32,
    pub last_save: DateTime<Utc>,
}

impl Default for SaveInfo {
    fn default() -> Self {
        Self {
            app_version: "undefined".to_string(),
            test_build: false,
            save_counter: 0,
            last_save: DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl SaveInfo {
    /// Record the writing build and bump the save counter.
    pub fn stamp(&mut self, app_version: impl Into<String>, test_build: bool) {
        self.app_version = app_version.into();
        self.test_build = test_build;
        self.save_counter = self.save_counter.saturating_add(1);
        self.last_save = Utc::now();
    }
}
