pub mod claim;
pub mod constants;
pub mod cumulative;
pub mod model;
pub mod snapshot;
pub mod strategy;

pub use claim::{ChallengeOutcome, ClaimState, CreditInterval};
pub use cumulative::{score_total, ScoreReport, TeamScores};
pub use model::{Contest, ContestStatus, Ping, Player, ScoringMode, Team, Zone};
pub use snapshot::{zone_status, ZoneStatus};
pub use strategy::ScoringStrategy;
