use serde::Deserialize;

use crate::error::{JournalError, Result};

const DEFAULT_UNDO_DEPTH: usize = 100;
const DEFAULT_MAX_CONTINUE_STEPS: usize = 256;
const DEFAULT_CLICK_TOLERANCE: f64 = 4.0;

/// Session settings, read from a `[session]` table.
///
/// ```toml
/// [session]
/// undo-depth = 50
/// max-continue-steps = 64
/// click-tolerance = 2.5
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct SessionConfig {
    undo_depth: usize,
    max_continue_steps: usize,
    click_tolerance: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            undo_depth: DEFAULT_UNDO_DEPTH,
            max_continue_steps: DEFAULT_MAX_CONTINUE_STEPS,
            click_tolerance: DEFAULT_CLICK_TOLERANCE,
        }
    }
}

impl SessionConfig {
    /// Parse a bare session table (without the `[session]` header).
    ///
    /// # Errors
    ///
    /// Returns `JournalError::ConfigParse` for malformed TOML and
    /// `JournalError::InvalidConfig` for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns `JournalError::InvalidConfig` if a limit is zero or the click
    /// tolerance is negative or not finite.
    pub fn validate(&self) -> Result<()> {
        if self.undo_depth == 0 {
            return Err(JournalError::InvalidConfig(
                "undo-depth must be at least 1".to_string(),
            ));
        }
        if self.max_continue_steps == 0 {
            return Err(JournalError::InvalidConfig(
                "max-continue-steps must be at least 1".to_string(),
            ));
        }
        if !self.click_tolerance.is_finite() || self.click_tolerance < 0.0 {
            return Err(JournalError::InvalidConfig(format!(
                "click-tolerance must be a non-negative number, got {}",
                self.click_tolerance
            )));
        }
        Ok(())
    }

    /// Maximum number of entries kept on the undo stack; the oldest are dropped.
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.undo_depth
    }

    /// Maximum number of consecutive `Continue` results within one dispatch.
    #[must_use]
    pub fn max_continue_steps(&self) -> usize {
        self.max_continue_steps
    }

    /// Distance, in model units, within which a click still hits a target.
    #[must_use]
    pub fn click_tolerance(&self) -> f64 {
        self.click_tolerance
    }

    #[must_use]
    pub fn with_undo_depth(mut self, undo_depth: usize) -> Self {
        self.undo_depth = undo_depth;
        self
    }

    #[must_use]
    pub fn with_max_continue_steps(mut self, max_continue_steps: usize) -> Self {
        self.max_continue_steps = max_continue_steps;
        self
    }

    #[must_use]
    pub fn with_click_tolerance(mut self, click_tolerance: f64) -> Self {
        self.click_tolerance = click_tolerance;
        self
    }
}
