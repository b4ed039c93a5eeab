//! Cumulative scorer
//!
//! Replays every ping of the contest in global timestamp order and credits
//! each team with the seconds it held each zone. Zones still held when the
//! replay ends are credited up to the settlement time.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::game::claim::ClaimState;
use crate::game::model::{Contest, Ping, PlayerId, TeamId};
use crate::game::strategy::ScoringStrategy;
use crate::util::time::Timestamp;

/// Seconds of control per team. Every team of the contest has an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamScores(HashMap<TeamId, f64>);

impl TeamScores {
    /// Zero counter for every team of the contest
    pub fn zeroed(contest: &Contest) -> Self {
        Self(contest.teams.iter().map(|t| (t.id, 0.0)).collect())
    }

    #[inline]
    pub fn get(&self, team: TeamId) -> Option<f64> {
        self.0.get(&team).copied()
    }

    pub fn credit(&mut self, team: TeamId, seconds: f64) {
        *self.0.entry(team).or_insert(0.0) += seconds;
    }

    pub fn iter(&self) -> impl Iterator<Item = (TeamId, f64)> + '_ {
        self.0.iter().map(|(team, secs)| (*team, *secs))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum over all teams
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }

    /// Team with the most seconds, ties broken by the lower team id
    pub fn leader(&self) -> Option<(TeamId, f64)> {
        self.iter().max_by(|a, b| a.1.total_cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
    }
}

/// Final score plus replay statistics
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreReport {
    pub scores: TeamScores,
    /// `now` clamped to the contest end
    pub settlement_time: Timestamp,
    /// Pings tested against the zones
    pub pings_replayed: usize,
    /// Pings skipped for being later than the contest end
    pub pings_after_end: usize,
    /// Successful challenges
    pub claim_changes: usize,
}

/// A ping tagged with the player and team that sent it
#[derive(Debug, Clone, Copy)]
pub struct TeamPing<'a> {
    pub team: TeamId,
    pub player: PlayerId,
    pub ping: &'a Ping,
}

/// All pings of the contest ordered by ascending timestamp.
/// Equal timestamps keep their team → player → history order.
pub fn merged_timeline(contest: &Contest) -> Vec<TeamPing<'_>> {
    let mut timeline: Vec<TeamPing<'_>> = Vec::with_capacity(contest.ping_count());

    for team in &contest.teams {
        for player in &team.players {
            timeline.extend(player.pings.iter().map(|ping| TeamPing {
                team: team.id,
                player: player.id,
                ping,
            }));
        }
    }

    // sort_by is stable
    timeline.sort_by(|a, b| a.ping.timestamp.total_cmp(&b.ping.timestamp));
    timeline
}

/// Compute each team's total seconds of control as of `now`
pub fn score_total(contest: &Contest, strategy: &ScoringStrategy, now: Timestamp) -> ScoreReport {
    let settlement_time = contest.settlement_time(now);
    let mut scores = TeamScores::zeroed(contest);
    let mut claims = vec![ClaimState::default(); contest.zones.len()];

    let timeline = merged_timeline(contest);
    let mut pings_replayed = 0;
    let mut claim_changes = 0;

    for entry in &timeline {
        if entry.ping.timestamp > contest.end_time {
            break;
        }
        pings_replayed += 1;

        for (zone, claim) in contest.zones.iter().zip(claims.iter_mut()) {
            let outcome = claim.challenge(zone, entry.team, entry.ping, strategy);
            if outcome.succeeded() {
                claim_changes += 1;
            }
            // Only the part of a closed interval before settlement counts
            if let Some(interval) = outcome.credit() {
                scores.credit(interval.team, interval.duration_until(settlement_time));
            }
        }
    }

    for claim in &claims {
        if let Some(holder) = claim.holder() {
            // A claim newer than the settlement time earns nothing
            scores.credit(holder, (settlement_time - claim.valid_since()).max(0.0));
        }
    }

    let pings_after_end = timeline.len() - pings_replayed;
    debug!(
        "Contest {} scored ({}): {} pings replayed, {} after end, {} claim changes, settled at {}",
        contest.id,
        strategy.mode(),
        pings_replayed,
        pings_after_end,
        claim_changes,
        settlement_time
    );

    ScoreReport {
        scores,
        settlement_time,
        pings_replayed,
        pings_after_end,
        claim_changes,
    }
}
