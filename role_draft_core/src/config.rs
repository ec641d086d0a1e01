// Draft configuration.
//
// `DraftConfig` holds every host-side tunable: turn length, offer size,
// faction caps, the random-card and weighting switches, and post-draft phase
// timings. Loaded from JSON; every field has a default so a partial (or
// empty `{}`) file is valid. `validated()` clamps out-of-range values instead
// of rejecting them.
//
// Only the host reads most of this. Followers use the post-draft timings to
// drive their own recap/teardown sequence.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bounds for `offered_roles_per_turn`.
pub const MIN_OFFERED: u8 = 1;
pub const MAX_OFFERED: u8 = 9;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading draft config: {0}")]
    Io(#[from] std::io::Error),
    #[error("parsing draft config: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftConfig {
    /// Seconds a picker has before the host auto-picks.
    pub turn_duration_secs: u64,
    /// Roles shown per turn (1–9).
    pub offered_roles_per_turn: u8,
    pub max_impostors: u32,
    pub max_neutral_killing: u32,
    /// Cap on non-killing neutrals.
    pub max_neutral_passive: u32,
    /// Whether the picker UI shows a "random" card after the offers. Also
    /// selects the timeout policy.
    pub random_option_enabled: bool,
    /// Weighted (by spawn chance) vs uniform sampling.
    pub weighted_selection: bool,
    /// Whether followers display the recap.
    pub show_recap: bool,
    pub recap_duration_secs: u64,
    /// Request a game start once the draft has finished.
    pub auto_start_game: bool,
    pub auto_start_delay_secs: u64,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            turn_duration_secs: 20,
            offered_roles_per_turn: 3,
            max_impostors: 1,
            max_neutral_killing: 1,
            max_neutral_passive: 1,
            random_option_enabled: true,
            weighted_selection: true,
            show_recap: true,
            recap_duration_secs: 5,
            auto_start_game: false,
            auto_start_delay_secs: 3,
        }
    }
}

impl DraftConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: DraftConfig = serde_json::from_str(json)?;
        Ok(config.validated())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Clamp values into their legal ranges.
    pub fn validated(mut self) -> Self {
        self.offered_roles_per_turn = self.offered_roles_per_turn.clamp(MIN_OFFERED, MAX_OFFERED);
        self.turn_duration_secs = self.turn_duration_secs.max(1);
        self
    }

    pub fn turn_duration(&self) -> Duration {
        Duration::from_secs(self.turn_duration_secs)
    }

    pub fn recap_duration(&self) -> Duration {
        Duration::from_secs(self.recap_duration_secs)
    }

    pub fn auto_start_delay(&self) -> Duration {
        Duration::from_secs(self.auto_start_delay_secs)
    }

    pub fn offer_target(&self) -> usize {
        usize::from(self.offered_roles_per_turn.clamp(MIN_OFFERED, MAX_OFFERED))
    }
}
