use std::{
    sync::mpsc::{self, Receiver},
    thread,
    time::{Duration, Instant},
};

use arena_siege_core::{BossKind, Command, EnemyKind, Event, SpawnRate, SpawnTuning, Tuning};
use arena_siege_system_spawning::{SchedulerError, SpawnScheduler};
use arena_siege_world::{self as world, query, World};
use glam::Vec2;

fn scheduler() -> (SpawnScheduler, Receiver<Command>) {
    let (sender, receiver) = mpsc::channel();
    (SpawnScheduler::new(sender, SpawnTuning::default(), 0x5eed), receiver)
}

fn drain(receiver: &Receiver<Command>) -> Vec<Command> {
    receiver.try_iter().collect()
}

#[test]
fn five_per_second_yields_five_proposals_in_one_second() {
    let (mut scheduler, receiver) = scheduler();
    scheduler
        .start(1, &[SpawnRate::new(EnemyKind::Normal, 5.0)])
        .expect("workers start");
    thread::sleep(Duration::from_millis(970));
    scheduler.stop().expect("workers stop");

    let proposals = drain(&receiver);
    assert_eq!(proposals.len(), 5);
    assert!(proposals
        .iter()
        .all(|command| matches!(command, Command::SpawnEnemy { kind: EnemyKind::Normal, wave: 1, .. })));
}

#[test]
fn paused_scheduler_proposes_nothing() {
    let (mut scheduler, receiver) = scheduler();
    scheduler.pause();
    scheduler
        .start(1, &[SpawnRate::new(EnemyKind::Small, 5.0)])
        .expect("workers start");
    thread::sleep(Duration::from_millis(600));
    assert!(scheduler.is_running(), "pause keeps workers alive");
    scheduler.stop().expect("workers stop");

    assert!(drain(&receiver).is_empty());
}

#[test]
fn stop_interrupts_long_sleeps() {
    let (mut scheduler, receiver) = scheduler();
    scheduler
        .start(2, &[SpawnRate::new(EnemyKind::Giant, 0.1)])
        .expect("workers start");
    thread::sleep(Duration::from_millis(50));

    let started = Instant::now();
    scheduler.stop().expect("workers stop");
    assert!(started.elapsed() < Duration::from_millis(500));
    assert_eq!(drain(&receiver).len(), 1);
}

#[test]
fn scheduler_is_reusable_after_stop() {
    let (mut scheduler, receiver) = scheduler();
    let rates = [SpawnRate::new(EnemyKind::Shooter, 2.0)];
    scheduler.start(1, &rates).expect("first wave starts");
    assert!(matches!(
        scheduler.start(2, &rates),
        Err(SchedulerError::AlreadyRunning { wave: 1 })
    ));
    scheduler.stop().expect("first wave stops");
    let _ = drain(&receiver);

    scheduler.start(2, &rates).expect("second wave starts");
    thread::sleep(Duration::from_millis(50));
    scheduler.stop().expect("second wave stops");

    let proposals = drain(&receiver);
    assert!(!proposals.is_empty());
    assert!(proposals
        .iter()
        .all(|command| matches!(command, Command::SpawnEnemy { wave: 2, .. })));
}

#[test]
fn disabled_and_boss_rates_start_no_workers() {
    let (mut scheduler, _receiver) = scheduler();
    scheduler
        .start(
            1,
            &[
                SpawnRate::new(EnemyKind::Slime, 0.0),
                SpawnRate::new(EnemyKind::JumperBoss, 1.0),
            ],
        )
        .expect("start succeeds");
    assert_eq!(scheduler.worker_count(), 0);
    scheduler.stop().expect("stop succeeds");
}

#[test]
fn boss_proposal_is_scaled_and_accepted_by_the_world() {
    let mut tuning = Tuning::default();
    tuning.walls.clusters_min = 0;
    tuning.walls.clusters_max = 0;
    let mut world = World::new(tuning.clone());
    let mut events = Vec::new();
    world::apply(&mut world, Command::BeginWave { wave: 2 }, &mut events);

    let (mut scheduler, receiver) = scheduler();
    scheduler
        .spawn_boss(BossKind::Caster, 2, Vec2::ZERO, &tuning.enemies)
        .expect("channel open");

    let proposals = drain(&receiver);
    assert_eq!(proposals.len(), 1);
    let Command::SpawnBoss { hit_points, .. } = proposals[0] else {
        panic!("expected a boss proposal");
    };
    assert!((hit_points - tuning.enemies.caster.hit_points * 2.0).abs() < 1e-3);

    events.clear();
    for command in proposals {
        world::apply(&mut world, command, &mut events);
    }
    assert!(query::boss_present(&world));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemySpawned { kind: EnemyKind::CasterBoss, .. })));
}

#[test]
fn proposals_from_an_earlier_wave_are_rejected() {
    let mut tuning = Tuning::default();
    tuning.walls.clusters_min = 0;
    tuning.walls.clusters_max = 0;
    let mut world = World::new(tuning);
    let mut events = Vec::new();
    world::apply(&mut world, Command::BeginWave { wave: 1 }, &mut events);

    let (mut scheduler, receiver) = scheduler();
    scheduler
        .start(1, &[SpawnRate::new(EnemyKind::Normal, 5.0)])
        .expect("workers start");
    thread::sleep(Duration::from_millis(50));
    scheduler.stop().expect("workers stop");
    world::apply(&mut world, Command::BeginWave { wave: 2 }, &mut events);

    events.clear();
    for command in drain(&receiver) {
        world::apply(&mut world, command, &mut events);
    }
    assert!(query::enemies(&world).is_empty());
    assert!(events
        .iter()
        .all(|event| matches!(event, Event::SpawnRejected { .. })));
}
