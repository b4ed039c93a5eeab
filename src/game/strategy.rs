//! Scoring strategies and their selection
//!
//! Both strategies share the claim-state shape and the contest rule; they
//! only differ in how strong a standing claim is when it gets challenged and
//! in the threshold the live status query reports.

use tracing::warn;

use crate::game::claim::ClaimState;
use crate::game::constants::scoring::MIN_REPORTED_THRESHOLD;
use crate::game::model::{Contest, ScoringMode};
use crate::util::time::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoringStrategy {
    Plain,
    /// `decay_rate` is in altitude units per second
    Decaying { decay_rate: f64 },
}

impl Default for ScoringStrategy {
    fn default() -> Self {
        ScoringStrategy::Plain
    }
}

impl ScoringStrategy {
    pub fn decaying(decay_rate: f64) -> Self {
        ScoringStrategy::Decaying { decay_rate }
    }

    pub fn mode(&self) -> ScoringMode {
        match self {
            ScoringStrategy::Plain => ScoringMode::Plain,
            ScoringStrategy::Decaying { .. } => ScoringMode::Decaying,
        }
    }

    /// Resolve the strategy for a contest.
    ///
    /// Unknown or unset modes fall back to plain scoring. A decaying contest
    /// without its own rate uses `default_decay_rate`.
    pub fn for_contest(contest: &Contest, default_decay_rate: f64) -> Self {
        let mode = match contest.parsed_mode() {
            Ok(mode) => mode.unwrap_or(ScoringMode::Plain),
            Err(e) => {
                warn!("Contest {}: {}, scoring as plain", contest.id, e);
                ScoringMode::Plain
            }
        };

        match mode {
            ScoringMode::Plain => ScoringStrategy::Plain,
            ScoringMode::Decaying => ScoringStrategy::Decaying {
                decay_rate: contest.decay_rate.unwrap_or(default_decay_rate),
            },
        }
    }

    /// Altitude a challenger at time `at` must strictly exceed.
    /// Negative infinity for an unclaimed zone.
    pub fn effective_threshold(&self, claim: &ClaimState, at: Timestamp) -> f64 {
        let Some(altitude) = claim.claim_altitude() else {
            return f64::NEG_INFINITY;
        };

        match self {
            ScoringStrategy::Plain => altitude,
            ScoringStrategy::Decaying { decay_rate } => {
                altitude - decay_rate * (at - claim.valid_since())
            }
        }
    }

    /// Threshold reported by the live status query at `at`.
    /// `None` for plain scoring and for unclaimed zones.
    pub fn decayed_report(&self, claim: &ClaimState, at: Timestamp) -> Option<f64> {
        match self {
            ScoringStrategy::Plain => None,
            ScoringStrategy::Decaying { .. } => claim
                .claim_altitude()
                .map(|_| self.effective_threshold(claim, at).max(MIN_REPORTED_THRESHOLD)),
        }
    }
}
