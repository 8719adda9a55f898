//! Parser configuration.

/// Runtime switches for one parser instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParserConfig {
    /// Enables resync and single-token recovery. Off by default: the first
    /// recognition error propagates to the caller.
    pub recovery_enabled: bool,
    /// Errors beyond this many are still recovered from but not recorded.
    pub max_recorded_errors: usize,
}

impl ParserConfig {
    pub const DEFAULT_MAX_RECORDED_ERRORS: usize = 100;

    pub const fn new() -> Self {
        ParserConfig {
            recovery_enabled: false,
            max_recorded_errors: Self::DEFAULT_MAX_RECORDED_ERRORS,
        }
    }

    #[must_use]
    pub const fn with_recovery(mut self, enabled: bool) -> Self {
        self.recovery_enabled = enabled;
        self
    }

    #[must_use]
    pub const fn with_max_recorded_errors(mut self, max: usize) -> Self {
        self.max_recorded_errors = max;
        self
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self::new()
    }
}
