//! Contest aggregate handed to the scoring engine
//!
//! A contest owns its zones and teams, teams own their players and players
//! own their ping history. The engine only reads this structure.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::game::constants::contest::DEFAULT_DURATION_SECS;
use crate::util::geo::{within_radius, GeoPoint};
use crate::util::time::Timestamp;

pub type ContestId = u64;
pub type ZoneId = u64;
pub type TeamId = u64;
pub type PlayerId = u64;

/// Circular geofence a team can control
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Zone {
    pub id: ZoneId,
    #[serde(flatten)]
    pub center: GeoPoint,
    /// Radius in meters
    pub radius: f64,
}

impl Zone {
    pub fn new(id: ZoneId, center: GeoPoint, radius: f64) -> Self {
        Self { id, center, radius }
    }

    #[inline]
    pub fn contains(&self, point: GeoPoint) -> bool {
        within_radius(self.center, self.radius, point)
    }
}

/// One location observation from a player's device
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ping {
    #[serde(flatten)]
    pub position: GeoPoint,
    #[serde(default)]
    pub altitude: Option<f64>,
    pub timestamp: Timestamp,
}

impl Ping {
    pub fn new(position: GeoPoint, altitude: Option<f64>, timestamp: Timestamp) -> Self {
        Self {
            position,
            altitude,
            timestamp,
        }
    }

    /// Altitude usable as a priority signal. Absent and zero readings carry
    /// no signal and can never challenge a claim.
    #[inline]
    pub fn altitude_signal(&self) -> Option<f64> {
        self.altitude.filter(|alt| *alt != 0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub pings: Vec<Ping>,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            pings: Vec::new(),
        }
    }

    pub fn with_pings(mut self, pings: Vec<Ping>) -> Self {
        self.pings = pings;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Team {
    pub id: TeamId,
    #[serde(default)]
    pub name: String,
    /// 24-bit RGB color
    #[serde(default)]
    pub color: Option<u32>,
    #[serde(default)]
    pub players: Vec<Player>,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color: None,
            players: Vec::new(),
        }
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_player(mut self, player: Player) -> Self {
        self.players.push(player);
        self
    }

    /// Color as six lowercase hex digits, e.g. `00ff10`
    pub fn color_hex(&self) -> Option<String> {
        self.color.map(|c| format!("{:06x}", c & 0x00ff_ffff))
    }

    pub fn ping_count(&self) -> usize {
        self.players.iter().map(|p| p.pings.len()).sum()
    }
}

/// Scoring rule a contest is played under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Highest altitude wins, claims never weaken
    Plain,
    /// Claims weaken linearly with the time they stand unchallenged
    Decaying,
}

impl ScoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringMode::Plain => "plain",
            ScoringMode::Decaying => "decaying",
        }
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown scoring mode: {0}")]
pub struct UnknownScoringMode(pub String);

impl FromStr for ScoringMode {
    type Err = UnknownScoringMode;

    /// Accepts the current names and the legacy `trad`/`degress` names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plain" | "trad" | "traditional" => Ok(ScoringMode::Plain),
            "decaying" | "degress" | "degressive" => Ok(ScoringMode::Decaying),
            _ => Err(UnknownScoringMode(s.to_string())),
        }
    }
}

/// Lifecycle of a contest relative to a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContestStatus {
    NotStarted,
    Running,
    Finished,
}

/// Fully materialized contest: zones, teams, players and ping history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Contest {
    pub id: ContestId,
    #[serde(default)]
    pub name: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    /// Scoring mode name as configured upstream; unknown names score as plain
    #[serde(default)]
    pub scoring_mode: Option<String>,
    /// Decay rate in altitude units per second (decaying mode only)
    #[serde(default)]
    pub decay_rate: Option<f64>,
    #[serde(default)]
    pub zones: Vec<Zone>,
    #[serde(default)]
    pub teams: Vec<Team>,
}

impl Contest {
    /// Contest starting at `start_time` and lasting the default duration
    pub fn starting_at(id: ContestId, name: impl Into<String>, start_time: Timestamp) -> Self {
        Self {
            id,
            name: name.into(),
            start_time,
            end_time: start_time + DEFAULT_DURATION_SECS,
            scoring_mode: None,
            decay_rate: None,
            zones: Vec::new(),
            teams: Vec::new(),
        }
    }

    pub fn with_end_time(mut self, end_time: Timestamp) -> Self {
        self.end_time = end_time;
        self
    }

    pub fn with_mode(mut self, mode: ScoringMode, decay_rate: Option<f64>) -> Self {
        self.scoring_mode = Some(mode.as_str().to_string());
        self.decay_rate = decay_rate;
        self
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zones.push(zone);
        self
    }

    pub fn with_team(mut self, team: Team) -> Self {
        self.teams.push(team);
        self
    }

    /// Configured mode, strictly parsed. `Ok(None)` when unset.
    pub fn parsed_mode(&self) -> Result<Option<ScoringMode>, UnknownScoringMode> {
        self.scoring_mode.as_deref().map(str::parse).transpose()
    }

    pub fn status_at(&self, now: Timestamp) -> ContestStatus {
        if now < self.start_time {
            ContestStatus::NotStarted
        } else if now <= self.end_time {
            ContestStatus::Running
        } else {
            ContestStatus::Finished
        }
    }

    /// Whether a new ping taken at `t` may be recorded for this contest
    pub fn accepts_pings_at(&self, t: Timestamp) -> bool {
        self.status_at(t) == ContestStatus::Running
    }

    /// `now` clamped to the contest end
    #[inline]
    pub fn settlement_time(&self, now: Timestamp) -> Timestamp {
        now.min(self.end_time)
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    pub fn ping_count(&self) -> usize {
        self.teams.iter().map(Team::ping_count).sum()
    }
}
