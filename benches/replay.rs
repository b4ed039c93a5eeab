//! Replay benchmarks for the zone control scorer
//!
//! Measures the cumulative scorer and the live status query at various
//! ping and zone counts.
//!
//! Run with: cargo bench --bench replay

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use zone_control::game::cumulative::score_total;
use zone_control::game::model::{Contest, Ping, Player, Team, Zone};
use zone_control::game::snapshot::zone_status;
use zone_control::game::strategy::ScoringStrategy;
use zone_control::util::geo::GeoPoint;

const TEAMS: u64 = 4;
const PLAYERS_PER_TEAM: u64 = 5;
const CONTEST_SECS: f64 = 3.0 * 3600.0;

/// Contest around a small area with randomly wandering players
fn create_contest(pings: usize, zones: usize) -> Contest {
    let mut rng = rand::thread_rng();
    let center = GeoPoint::new(47.37, 8.54);
    let mut contest = Contest::starting_at(1, "bench", 0.0).with_end_time(CONTEST_SECS);

    for id in 0..zones as u64 {
        let zone_center = GeoPoint::new(
            center.lat + rng.gen_range(-0.01..0.01),
            center.lon + rng.gen_range(-0.01..0.01),
        );
        contest = contest.with_zone(Zone::new(id, zone_center, rng.gen_range(50.0..200.0)));
    }

    let players = (TEAMS * PLAYERS_PER_TEAM) as usize;
    let per_player = pings / players;

    for team_id in 0..TEAMS {
        let mut team = Team::new(team_id, format!("Team{}", team_id)).with_color(rng.gen_range(0..0xff_ffff));
        for p in 0..PLAYERS_PER_TEAM {
            let mut t = 0.0;
            let history = (0..per_player)
                .map(|_| {
                    t += rng.gen_range(1.0..(2.0 * CONTEST_SECS / per_player.max(1) as f64));
                    Ping::new(
                        GeoPoint::new(
                            center.lat + rng.gen_range(-0.01..0.01),
                            center.lon + rng.gen_range(-0.01..0.01),
                        ),
                        Some(rng.gen_range(400.0..2500.0)),
                        t,
                    )
                })
                .collect();
            team = team.with_player(Player::new(team_id * 100 + p, format!("Player{}", p)).with_pings(history));
        }
        contest = contest.with_team(team);
    }

    contest
}

/// Benchmark the cumulative scorer at various ping counts
fn bench_score_total(c: &mut Criterion) {
    let mut group = c.benchmark_group("score_total");
    group.sample_size(50);

    for count in [1_000, 10_000, 50_000] {
        let contest = create_contest(count, 20);

        group.throughput(Throughput::Elements(count as u64));
        for (label, strategy) in [("plain", ScoringStrategy::Plain), ("decaying", ScoringStrategy::decaying(0.1))] {
            group.bench_with_input(BenchmarkId::new(label, count), &count, |b, _| {
                b.iter(|| black_box(score_total(&contest, &strategy, black_box(CONTEST_SECS))))
            });
        }
    }
    group.finish();
}

/// Benchmark the live status query at various zone counts
fn bench_zone_status(c: &mut Criterion) {
    let mut group = c.benchmark_group("zone_status");
    group.sample_size(50);

    for zones in [5, 20, 100] {
        let contest = create_contest(10_000, zones);
        let strategy = ScoringStrategy::decaying(0.1);

        group.throughput(Throughput::Elements(zones as u64));
        group.bench_with_input(BenchmarkId::new("zones", zones), &zones, |b, _| {
            b.iter(|| black_box(zone_status(&contest, &strategy, black_box(CONTEST_SECS / 2.0))))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_score_total, bench_zone_status);

criterion_main!(benches);
