//! Live zone status
//!
//! Reports who holds each zone without accumulating durations. Pings are
//! visited team by team, player by player, in each player's history order.
//! There is no global time merge: when players' histories interleave in
//! time, the reported holder is the last eligible ping this traversal
//! visits, which is not always the chronologically latest one.

use serde::{Deserialize, Serialize};

use crate::game::claim::ClaimState;
use crate::game::model::{Contest, TeamId, ZoneId};
use crate::game::strategy::ScoringStrategy;
use crate::util::time::Timestamp;

/// Current ownership of one zone
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneStatus {
    pub zone_id: ZoneId,
    pub lat: f64,
    pub lon: f64,
    pub radius: f64,
    pub holder_team_id: Option<TeamId>,
    pub holder_color: Option<String>,
    pub valid_since: Timestamp,
    /// Threshold a challenger must beat right now (decaying scoring only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

/// Compute the ownership of every zone, with decayed thresholds evaluated
/// at `query_time`. Output follows the contest's zone order.
pub fn zone_status(contest: &Contest, strategy: &ScoringStrategy, query_time: Timestamp) -> Vec<ZoneStatus> {
    let mut claims = vec![ClaimState::default(); contest.zones.len()];

    for team in &contest.teams {
        for player in &team.players {
            for ping in &player.pings {
                for (zone, claim) in contest.zones.iter().zip(claims.iter_mut()) {
                    // Credit intervals only matter to the cumulative scorer
                    let _ = claim.challenge(zone, team.id, ping, strategy);
                }
            }
        }
    }

    contest
        .zones
        .iter()
        .zip(claims.iter())
        .map(|(zone, claim)| ZoneStatus {
            zone_id: zone.id,
            lat: zone.center.lat,
            lon: zone.center.lon,
            radius: zone.radius,
            holder_team_id: claim.holder(),
            holder_color: claim
                .holder()
                .and_then(|id| contest.team(id))
                .and_then(|team| team.color_hex()),
            valid_since: claim.valid_since(),
            threshold: strategy.decayed_report(claim, query_time),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::model::{Ping, Player, Team, Zone};
    use crate::util::geo::GeoPoint;

    const TEAM_A: TeamId = 1;
    const TEAM_B: TeamId = 2;

    fn at(point: GeoPoint, t: Timestamp, altitude: Option<f64>) -> Ping {
        Ping::new(point, altitude, t)
    }

    fn base() -> Contest {
        Contest::starting_at(1, "status", 0.0)
            .with_end_time(100.0)
            .with_zone(Zone::new(10, GeoPoint::ORIGIN, 100.0))
            .with_zone(Zone::new(20, GeoPoint::new(1.0, 1.0), 100.0))
    }

    #[test]
    fn test_unclaimed_zones_reported() {
        let contest = base().with_team(Team::new(TEAM_A, "a"));
        let status = zone_status(&contest, &ScoringStrategy::Plain, 50.0);

        assert_eq!(status.len(), 2);
        assert_eq!(status[0].zone_id, 10);
        assert_eq!(status[1].zone_id, 20);
        for zone in &status {
            assert_eq!(zone.holder_team_id, None);
            assert_eq!(zone.holder_color, None);
            assert_eq!(zone.valid_since, 0.0);
            assert_eq!(zone.threshold, None);
        }
    }

    #[test]
    fn test_holder_and_color() {
        let contest = base()
            .with_team(
                Team::new(TEAM_A, "a")
                    .with_color(0x00ff10)
                    .with_player(Player::new(1, "p").with_pings(vec![
                        at(GeoPoint::ORIGIN, 5.0, Some(10.0)),
                    ])),
            )
            .with_team(
                Team::new(TEAM_B, "b").with_player(Player::new(2, "q").with_pings(vec![
                    at(GeoPoint::new(1.0, 1.0), 7.0, Some(3.0)),
                ])),
            );

        let status = zone_status(&contest, &ScoringStrategy::Plain, 50.0);
        assert_eq!(status[0].holder_team_id, Some(TEAM_A));
        assert_eq!(status[0].holder_color.as_deref(), Some("00ff10"));
        assert_eq!(status[0].valid_since, 5.0);
        assert_eq!(status[1].holder_team_id, Some(TEAM_B));
        assert_eq!(status[1].holder_color, None);
        assert_eq!(status[1].lat, 1.0);
    }

    #[test]
    fn test_traversal_order_not_time_order() {
        // Team A's later ping is visited before team B's earlier one. B's ping
        // is then rejected as stale, so A stays the holder.
        let contest = base()
            .with_team(Team::new(TEAM_A, "a").with_player(
                Player::new(1, "p").with_pings(vec![at(GeoPoint::ORIGIN, 60.0, Some(10.0))]),
            ))
            .with_team(Team::new(TEAM_B, "b").with_player(
                Player::new(2, "q").with_pings(vec![at(GeoPoint::ORIGIN, 30.0, Some(50.0))]),
            ));

        let status = zone_status(&contest, &ScoringStrategy::Plain, 100.0);
        assert_eq!(status[0].holder_team_id, Some(TEAM_A));
        assert_eq!(status[0].valid_since, 60.0);
    }

    #[test]
    fn test_last_visited_eligible_ping_wins() {
        // In time order B takes the zone at t=20 and A's t=40 ping (8 < 9)
        // fails. Traversal visits both of A's players first, so A holds the
        // zone from t=40 and B's t=20 ping is stale by the time it is visited.
        let contest = base()
            .with_team(
                Team::new(TEAM_A, "a")
                    .with_player(Player::new(1, "p").with_pings(vec![at(GeoPoint::ORIGIN, 10.0, Some(5.0))]))
                    .with_player(Player::new(3, "r").with_pings(vec![at(GeoPoint::ORIGIN, 40.0, Some(8.0))])),
            )
            .with_team(Team::new(TEAM_B, "b").with_player(
                Player::new(2, "q").with_pings(vec![at(GeoPoint::ORIGIN, 20.0, Some(9.0))]),
            ));

        let status = zone_status(&contest, &ScoringStrategy::Plain, 100.0);
        assert_eq!(status[0].holder_team_id, Some(TEAM_A));
        assert_eq!(status[0].valid_since, 40.0);
    }

    #[test]
    fn test_missing_altitude_ignored() {
        let contest = base().with_team(Team::new(TEAM_A, "a").with_player(
            Player::new(1, "p").with_pings(vec![
                at(GeoPoint::ORIGIN, 5.0, None),
                at(GeoPoint::ORIGIN, 6.0, Some(0.0)),
            ]),
        ));

        let status = zone_status(&contest, &ScoringStrategy::decaying(1.0), 10.0);
        assert_eq!(status[0].holder_team_id, None);
        assert_eq!(status[0].threshold, None);
    }

    #[test]
    fn test_decaying_threshold_at_query_time() {
        let contest = base().with_team(Team::new(TEAM_A, "a").with_player(
            Player::new(1, "p").with_pings(vec![at(GeoPoint::ORIGIN, 10.0, Some(30.0))]),
        ));
        let strategy = ScoringStrategy::decaying(1.0);

        let status = zone_status(&contest, &strategy, 25.0);
        assert_eq!(status[0].threshold, Some(15.0));
        assert_eq!(status[1].threshold, None);

        let status = zone_status(&contest, &strategy, 1_000.0);
        assert_eq!(status[0].threshold, Some(0.0));
    }

    #[test]
    fn test_idempotent_and_non_mutating() {
        let contest = base()
            .with_team(Team::new(TEAM_A, "a").with_player(
                Player::new(1, "p").with_pings(vec![at(GeoPoint::ORIGIN, 10.0, Some(30.0))]),
            ))
            .with_team(Team::new(TEAM_B, "b").with_player(
                Player::new(2, "q").with_pings(vec![at(GeoPoint::ORIGIN, 40.0, Some(20.0))]),
            ));
        let before = contest.clone();
        let strategy = ScoringStrategy::decaying(0.5);

        let first = zone_status(&contest, &strategy, 60.0);
        let second = zone_status(&contest, &strategy, 60.0);
        assert_eq!(first, second);
        assert_eq!(contest, before);
        // 30 - 0.5 * 30 = 15 < 20
        assert_eq!(first[0].holder_team_id, Some(TEAM_B));
    }

    #[test]
    fn test_threshold_omitted_from_plain_json() {
        let contest = base();
        let status = zone_status(&contest, &ScoringStrategy::Plain, 0.0);
        let json = serde_json::to_value(&status[0]).unwrap();
        assert!(json.get("threshold").is_none());
        assert!(json.get("holder_team_id").unwrap().is_null());
    }
}
