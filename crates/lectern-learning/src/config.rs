//! Learning service configuration.

/// Configuration shared by the learning services.
#[derive(Debug, Clone)]
pub struct LearningConfig {
    /// Page size used when a list request does not name one (default: 10).
    pub default_page_size: u64,
    /// Upper bound applied to any requested page size (default: 100).
    pub max_page_size: u64,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            default_page_size: 10,
            max_page_size: 100,
        }
    }
}
