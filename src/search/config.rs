use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Engine-wide settings, built once and shared read-only by the pool and
/// its workers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub threads: usize,
    pub hash_mb: usize,
    /// Subtracted from `movetime` to leave room for reporting.
    pub move_overhead_ms: u64,
    /// How long `wait` allows workers to wind down after stop is raised.
    pub join_timeout_ms: u64,
    /// Nodes a worker searches between flushing its count and polling stop.
    pub check_interval_nodes: u64,
    pub tuning: SearchTuning,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            threads: 1,
            hash_mb: 16,
            move_overhead_ms: 10,
            join_timeout_ms: 5_000,
            check_interval_nodes: 1024,
            tuning: SearchTuning::default(),
        }
    }
}

/// Pruning and reduction parameters. These are empirical; every value the
/// search uses lives here so it can be retuned without code changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchTuning {
    pub aspiration_min_depth: u32,
    pub aspiration_delta: i32,
    /// Window growth factor on fail-low/high, in percent of the current delta.
    pub aspiration_growth_pct: i32,
    /// Extra initial delta per helper worker index.
    pub helper_aspiration_step: i32,

    pub null_move_min_depth: u32,
    pub null_move_base_reduction: u32,
    pub null_move_depth_divisor: u32,

    pub lmr_min_depth: u32,
    /// Moves searched at full depth before reductions start.
    pub lmr_first_reduced_move: usize,
    /// Reduction = base + ln(depth) * ln(move) / divisor (both in hundredths).
    pub lmr_base_x100: i32,
    pub lmr_divisor_x100: i32,

    pub rfp_max_depth: u32,
    pub rfp_margin: i32,
    pub futility_max_depth: u32,
    pub futility_base: i32,
    pub futility_margin: i32,
    pub lmp_max_depth: u32,
    /// Quiet moves tried before late-move pruning, as `base + depth^2`.
    pub lmp_base: usize,
    pub iir_min_depth: u32,
    pub check_extension: bool,
    pub see_quiet_margin: i32,
    pub see_capture_margin: i32,

    pub qsearch_delta_margin: i32,
}

impl Default for SearchTuning {
    fn default() -> Self {
        SearchTuning {
            aspiration_min_depth: 4,
            aspiration_delta: 25,
            aspiration_growth_pct: 150,
            helper_aspiration_step: 8,
            null_move_min_depth: 3,
            null_move_base_reduction: 3,
            null_move_depth_divisor: 4,
            lmr_min_depth: 3,
            lmr_first_reduced_move: 3,
            lmr_base_x100: 75,
            lmr_divisor_x100: 225,
            rfp_max_depth: 7,
            rfp_margin: 80,
            futility_max_depth: 6,
            futility_base: 90,
            futility_margin: 100,
            lmp_max_depth: 6,
            lmp_base: 3,
            iir_min_depth: 4,
            check_extension: true,
            see_quiet_margin: -60,
            see_capture_margin: -20,
            qsearch_delta_margin: 200,
        }
    }
}

impl SearchConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: SearchConfig = serde_json::from_str(s).map_err(|e| EngineError::Config(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&text)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.threads == 0 {
            return Err(EngineError::Config("threads must be at least 1".into()));
        }
        if self.hash_mb == 0 {
            return Err(EngineError::Config("hash_mb must be at least 1".into()));
        }
        if self.check_interval_nodes == 0 {
            return Err(EngineError::Config("check_interval_nodes must be at least 1".into()));
        }
        let t = &self.tuning;
        if t.lmr_divisor_x100 <= 0 || t.null_move_depth_divisor == 0 {
            return Err(EngineError::Config("tuning divisors must be positive".into()));
        }
        if t.aspiration_delta <= 0 || t.aspiration_growth_pct <= 100 {
            return Err(EngineError::Config("aspiration window must be positive and grow".into()));
        }
        Ok(())
    }

    pub fn move_overhead(&self) -> Duration {
        Duration::from_millis(self.move_overhead_ms)
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg = SearchConfig::from_json_str(r#"{ "threads": 4, "tuning": { "rfp_margin": 120 } }"#).unwrap();
        assert_eq!(cfg.threads, 4);
        assert_eq!(cfg.hash_mb, SearchConfig::default().hash_mb);
        assert_eq!(cfg.tuning.rfp_margin, 120);
        assert_eq!(cfg.tuning.lmr_base_x100, SearchTuning::default().lmr_base_x100);
    }

    #[test]
    fn rejects_zero_threads() {
        assert!(matches!(SearchConfig::from_json_str(r#"{ "threads": 0 }"#), Err(EngineError::Config(_))));
        assert!(matches!(SearchConfig::from_json_str("not json"), Err(EngineError::Config(_))));
    }
}
