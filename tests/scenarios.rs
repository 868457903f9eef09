use std::collections::HashSet;
use std::thread;
use std::time::{Duration, Instant};
use threadworms::{
    palette::Rgb, world::WALL_COLOR, Board, Observation, Placement, Point2, Settings, Worm,
    World,
};

const SHORT: Duration = Duration::from_millis(20);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn fast_settings() -> Settings {
    Settings {
        worm_speed_min_ms: 1,
        worm_speed_max_ms: 10,
        probe_timeout_ms: 20,
        trim_timeout_ms: 20,
        snapshot_timeout_ms: 5,
        ..Settings::default()
    }
}

/// Every worm's cells carry its marker, and no two worms share a cell.
fn assert_board_matches(board: &Board, worms: &[Worm]) {
    let mut seen = HashSet::new();

    for worm in worms {
        for cell in worm.body() {
            assert!(board.contains(*cell), "{} left the board", worm.name());
            assert!(seen.insert(*cell), "{} is claimed twice", cell);
            assert_eq!(
                board.read(*cell, SHORT),
                Some(Some(worm.marker())),
                "{} lost its marker at {}",
                worm.name(),
                cell
            );
        }
    }
}

fn wait_for_all_to_finish(world: &World, deadline: Duration) {
    let started = Instant::now();
    while world.running() > 0 {
        assert!(
            started.elapsed() < deadline,
            "{} worms still running after {:?}",
            world.running(),
            deadline
        );
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn two_worms_sharing_a_corridor_never_share_a_cell() {
    init_logging();
    let settings = Settings {
        grid_width: 4,
        grid_height: 4,
        worm_count: 2,
        worm_size_min: 2,
        worm_size_max: 2,
        long_worm_chance: 0.0,
        wall_pattern: Some("....\nXXXX\nXXXX\nXXXX".to_owned()),
        ..fast_settings()
    };
    let mut world = World::new(settings).expect("valid settings");
    let corridor: Vec<_> = (0..4).map(|x| Point2::new(x, 0)).collect();

    world
        .spawn(2, &Placement::At(vec![corridor[0], corridor[3]]))
        .expect("both ends of the corridor are free");

    // Sample while they run: the walls must never be touched.
    for _ in 0..20 {
        let snapshot = world.snapshot();
        for (at, observation) in snapshot.iter() {
            if at.y > 0 {
                assert!(matches!(
                    observation,
                    Observation::Occupied(WALL_COLOR) | Observation::Unknown
                ));
            }
        }
        thread::sleep(Duration::from_millis(10));
    }

    let board = std::sync::Arc::clone(world.board());
    let worms = world.join().expect("no worm panicked");

    assert_eq!(worms.len(), 2);
    assert_board_matches(&board, &worms);
    for worm in &worms {
        assert!(worm.body().len() <= 2);
        assert!(worm.body().iter().all(|cell| cell.y == 0));
        assert!(worm.stats().steps > 0);
    }

    let worm_cells: usize = worms.iter().map(|worm| worm.body().len()).sum();
    let empty = corridor
        .iter()
        .filter(|cell| board.read(**cell, SHORT) == Some(None))
        .count();
    assert_eq!(worm_cells + empty, corridor.len());
}

#[test]
fn stopping_a_full_population_finishes_promptly() {
    init_logging();
    let settings = fast_settings();
    // slowest sleep plus one probe and a trim per step, with slack for busy CI machines
    let bound = Duration::from_millis(
        settings.worm_speed_max_ms + settings.probe_timeout_ms + settings.trim_timeout_ms,
    ) * 10;
    let mut world = World::new(settings).expect("valid settings");

    world.populate().expect("24 worms fit on the default board");
    thread::sleep(Duration::from_millis(200));
    assert_eq!(world.running(), 24);

    world.request_stop();
    wait_for_all_to_finish(&world, bound);
    assert_eq!(world.running(), 0);

    let occupied = world.snapshot().occupied();
    let board = std::sync::Arc::clone(world.board());
    let worms = world.join().expect("no worm panicked");

    assert_eq!(worms.len(), 24);
    assert_board_matches(&board, &worms);
    let worm_cells: usize = worms.iter().map(|worm| worm.body().len()).sum();
    assert_eq!(occupied, worm_cells);
}

#[test]
fn lone_worm_settles_at_its_max_length() {
    init_logging();
    let board = std::sync::Arc::new(Board::new(10, 10));
    let head = Point2::new(5, 5);
    let marker = Rgb::new(255, 128, 0);
    assert!(board.claim(head, marker));

    let mut worm = Worm::builder()
        .name("lonely")
        .board(std::sync::Arc::clone(&board))
        .body(vec![head])
        .max_length(5)
        .marker(marker)
        .build();

    for _ in 0..50 {
        worm.step();
    }

    assert_eq!(worm.body().len(), 5);
    assert_board_matches(&board, &[worm]);
    let occupied = board
        .points()
        .filter(|at| board.read(*at, SHORT) == Some(Some(marker)))
        .count();
    assert_eq!(occupied, 5);
}

#[test]
fn hello_world_walls_survive_a_busy_board() {
    init_logging();
    let settings = threadworms::presets::init_preset_manager()
        .settings_for("hello_world")
        .expect("preset exists");
    let settings = Settings {
        worm_speed_min_ms: 1,
        worm_speed_max_ms: 10,
        probe_timeout_ms: 20,
        trim_timeout_ms: 20,
        ..settings
    };
    let pattern = settings.wall_pattern.clone().expect("preset has walls");
    let mut world = World::new(settings).expect("valid settings");
    world.populate().expect("worms fit between the walls");

    thread::sleep(Duration::from_millis(200));
    let board = std::sync::Arc::clone(world.board());
    let worms = world.join().expect("no worm panicked");

    assert_board_matches(&board, &worms);
    let walls: HashSet<_> = pattern
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .flat_map(|(y, line)| {
            line.chars()
                .enumerate()
                .filter(|(_, square)| *square != '.')
                .map(move |(x, _)| Point2::new(x as isize, y as isize))
        })
        .collect();
    for wall in walls {
        assert_eq!(board.read(wall, SHORT), Some(Some(WALL_COLOR)));
    }
}
