//! Per-zone claim state machine
//!
//! A zone starts unclaimed. A ping takes it over when it is inside the zone,
//! carries an altitude signal, is newer than the standing claim and outranks
//! the strategy's effective threshold. Taking over a held zone closes the
//! previous holder's interval of control.

use crate::game::constants::scoring::UNCLAIMED_SINCE;
use crate::game::model::{Ping, TeamId, Zone};
use crate::game::strategy::ScoringStrategy;
use crate::util::time::Timestamp;

/// Ownership record of one zone. Rebuilt for every scoring call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClaimState {
    holder: Option<TeamId>,
    valid_since: Timestamp,
    claim_altitude: Option<f64>,
}

impl Default for ClaimState {
    fn default() -> Self {
        Self {
            holder: None,
            valid_since: UNCLAIMED_SINCE,
            claim_altitude: None,
        }
    }
}

/// Span of time a team held a zone, closed by a successful challenge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditInterval {
    pub team: TeamId,
    pub from: Timestamp,
    pub to: Timestamp,
}

impl CreditInterval {
    #[inline]
    pub fn duration(&self) -> f64 {
        self.to - self.from
    }

    /// Seconds of the interval that fall before `settlement_time`
    #[inline]
    pub fn duration_until(&self, settlement_time: Timestamp) -> f64 {
        (self.to.min(settlement_time) - self.from).max(0.0)
    }
}

/// Result of testing one ping against one zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChallengeOutcome {
    /// Claim unchanged
    Rejected,
    /// Previously unclaimed zone is now held
    Claimed,
    /// Held zone changed hands (or was reaffirmed); the previous holder's
    /// interval is closed
    Overtaken(CreditInterval),
}

impl ChallengeOutcome {
    #[inline]
    pub fn succeeded(&self) -> bool {
        !matches!(self, ChallengeOutcome::Rejected)
    }

    pub fn credit(&self) -> Option<CreditInterval> {
        match self {
            ChallengeOutcome::Overtaken(interval) => Some(*interval),
            _ => None,
        }
    }
}

impl ClaimState {
    pub fn held_by(team: TeamId, since: Timestamp, altitude: f64) -> Self {
        Self {
            holder: Some(team),
            valid_since: since,
            claim_altitude: Some(altitude),
        }
    }

    #[inline]
    pub fn holder(&self) -> Option<TeamId> {
        self.holder
    }

    #[inline]
    pub fn valid_since(&self) -> Timestamp {
        self.valid_since
    }

    #[inline]
    pub fn claim_altitude(&self) -> Option<f64> {
        self.claim_altitude
    }

    #[inline]
    pub fn is_claimed(&self) -> bool {
        self.holder.is_some()
    }

    /// Apply the contest rule for `ping`, sent by a player of `team`, against
    /// this zone's claim. The claim is replaced only on success.
    pub fn challenge(
        &mut self,
        zone: &Zone,
        team: TeamId,
        ping: &Ping,
        strategy: &ScoringStrategy,
    ) -> ChallengeOutcome {
        // Pings without altitude never challenge or extend a claim
        let Some(altitude) = ping.altitude_signal() else {
            return ChallengeOutcome::Rejected;
        };

        if !zone.contains(ping.position) {
            return ChallengeOutcome::Rejected;
        }

        if self.is_claimed() && ping.timestamp <= self.valid_since {
            return ChallengeOutcome::Rejected;
        }

        // NaN never outranks
        if !(altitude > strategy.effective_threshold(self, ping.timestamp)) {
            return ChallengeOutcome::Rejected;
        }

        let outcome = match self.holder {
            Some(previous) => ChallengeOutcome::Overtaken(CreditInterval {
                team: previous,
                from: self.valid_since,
                to: ping.timestamp,
            }),
            None => ChallengeOutcome::Claimed,
        };

        *self = ClaimState::held_by(team, ping.timestamp, altitude);
        outcome
    }
}
