//! Zone Control Scoring Library
//!
//! Geofence ownership and scoring for location-based capture contests.
//! Teams claim circular zones with altitude-ranked pings and earn one point
//! per second of control.
//!
//! # Modules
//!
//! - `game` - Claim state machine, scoring strategies, cumulative and live scorers
//! - `net` - HTTP scoring server
//! - `util` - Geodesic distance and time helpers

pub mod config;
pub mod util;
pub mod game;
pub mod net;
pub mod metrics;
