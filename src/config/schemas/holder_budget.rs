use crate::errors::CoreError;

/// Monthly credit policy for the holder analyzer (spec §4.5.2, §6).
#[derive(Debug, Clone)]
pub struct HolderBudgetConfig {
    pub monthly_cap: u64,
    pub target_pct: f64,
    pub hard_stop_pct: f64,
}

impl HolderBudgetConfig {
    pub fn from_env() -> Result<Self, CoreError> {
        Ok(Self {
            monthly_cap: super::env_u64("HOLDER_BUDGET", 10_000_000)?,
            target_pct: super::env_f64("HOLDER_TARGET_PCT", 62.5)?,
            hard_stop_pct: super::env_f64("HOLDER_HARD_STOP_PCT", 85.0)?,
        })
    }

    pub fn for_tests() -> Self {
        Self { monthly_cap: 10_000_000, target_pct: 62.5, hard_stop_pct: 85.0 }
    }

    pub fn hard_stop_credits(&self) -> u64 {
        (self.monthly_cap as f64 * self.hard_stop_pct / 100.0) as u64
    }

    pub fn target_credits(&self) -> u64 {
        (self.monthly_cap as f64 * self.target_pct / 100.0) as u64
    }
}
