//! End-to-end level build and a simulated lap.

use planet::{Flight, Level, LevelConfig, Turn};
use planet_geometry::{DirectionFlags, Span};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn config() -> LevelConfig {
    let mut config = LevelConfig::default();
    config.sphere.detail = 3;
    config
}

#[test]
fn default_level_builds_a_closed_path() {
    init_tracing();
    let level = Level::load(&config()).expect("level builds without maps");

    let path = &level.path;
    assert!(path.is_loop());
    assert!(path.length() > 0.0);

    // Segments tile the path exactly.
    let segments = path.segments();
    assert_eq!(segments[0].offset(), 0.0);
    for pair in segments.windows(2) {
        assert_eq!(pair[0].end(), pair[1].offset());
    }
    assert_eq!(segments.last().unwrap().end(), path.length());

    // Steps tile every segment.
    for segment in segments {
        let steps = segment.steps();
        assert_eq!(steps[0].offset(), segment.offset());
        for pair in steps.windows(2) {
            assert_eq!(pair[0].end(), pair[1].offset());
        }
        assert_eq!(steps.last().unwrap().end(), segment.end());
    }
}

#[test]
fn path_poses_stay_near_the_flight_shell() {
    init_tracing();
    let config = config();
    let level = Level::load(&config).unwrap();
    let path = &level.path;

    let low = config.path.height * 0.9;
    let high = (config.path.height + config.path.height_jitter) * 1.1;
    let samples = 500;
    for i in 0..samples {
        let offset = path.length() * i as f32 / samples as f32;
        let pose = path
            .direction_ex(offset, DirectionFlags::ALL)
            .unwrap_or_else(|| panic!("no pose at {offset}"));
        let r = pose.pos.length();
        assert!(r > low && r < high, "radius {r} at {offset}");
        assert!((pose.dir.length() - 1.0).abs() < 1e-3);
        assert!((pose.rot.length() - 1.0).abs() < 1e-4);
    }
}

#[test]
fn sphere_is_finalized_and_below_the_path() {
    let config = config();
    let level = Level::load(&config).unwrap();
    assert!(level.sphere.is_finalized());
    assert_eq!(level.sphere.triangle_count(), 20 * 4_usize.pow(config.sphere.detail));
    let max = level
        .sphere
        .vertices()
        .iter()
        .map(|v| v.pos().length())
        .fold(0.0, f32::max);
    assert!(max < config.path.height);
}

#[test]
fn a_full_lap_wraps_and_keeps_the_tube_around_the_ship() {
    init_tracing();
    let config = config();
    let level = Level::load(&config).unwrap();
    let mut flight = Flight::new(&config);

    let dt = 0.1;
    let lap = level.path.length() / config.ship.speed;
    let frames = (lap / dt) as usize + 20;

    let mut wrapped = false;
    let mut last = 0.0;
    for frame in 0..frames {
        if frame % 50 == 0 {
            flight.turn(Turn::Right);
            flight.shoot();
        }
        flight.update(&level.path, dt);

        let offset = flight.ship.offset();
        if offset < last {
            wrapped = true;
        }
        last = offset;

        assert!(!flight.tube.is_empty());
        assert!(flight.shooter.len() <= frames);
    }
    assert!(wrapped, "ship never completed a lap");
}
