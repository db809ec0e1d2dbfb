use std::time::Duration;

use arena_siege_core::{BossKind, Command, EnemyId, EnemyKind, Event, Tuning, ZoneKind};
use arena_siege_system_ai::{Ai, Behavior, Caster, CasterState, JumpPhase, Jumper, SpecialAttack};
use arena_siege_world::{self as world, query, HazardPhase, World};
use glam::Vec2;

const TICK: Duration = Duration::from_millis(16);

fn open_world() -> World {
    world_at(Tuning::default(), 1)
}

fn world_at(tuning: Tuning, wave: u32) -> World {
    let mut tuning = tuning;
    tuning.walls.clusters_min = 0;
    tuning.walls.clusters_max = 0;
    let mut world = World::new(tuning);
    let mut events = Vec::new();
    world::apply(&mut world, Command::BeginWave { wave }, &mut events);
    world
}

fn boss_world(tuning: Tuning, wave: u32, kind: BossKind, position: Vec2) -> (World, EnemyId) {
    let mut world = world_at(tuning, wave);
    let id = spawn(
        &mut world,
        Command::SpawnBoss {
            kind,
            position,
            hit_points: 1_500.0,
            wave,
        },
    );
    (world, id)
}

fn drive(world: &mut World, id: EnemyId, behavior: &mut dyn Behavior) -> Vec<Command> {
    tick(world);
    let mut events = Vec::new();
    let mut commands = Vec::new();
    let mut frame = world.frame(&mut events, &mut commands);
    behavior.update(id, &mut frame);
    commands
}

fn boss_position(world: &World, id: EnemyId) -> Vec2 {
    query::enemies(world).get(id).expect("boss").position
}

fn spawn(world: &mut World, command: Command) -> EnemyId {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { id, .. } => Some(*id),
            _ => None,
        })
        .expect("spawn accepted")
}

fn tick(world: &mut World) {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt: TICK }, &mut events);
}

fn run_ai(world: &mut World, ai: &mut Ai) -> Vec<Command> {
    let mut events = Vec::new();
    let mut commands = Vec::new();
    let mut frame = world.frame(&mut events, &mut commands);
    ai.update(&mut frame);
    commands
}

#[test]
fn chasers_close_in_on_the_player() {
    let mut world = open_world();
    let id = spawn(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Normal,
            position: Vec2::new(400.0, 0.0),
            wave: 1,
        },
    );
    let mut ai = Ai::new();

    for _ in 0..30 {
        tick(&mut world);
        let _ = run_ai(&mut world, &mut ai);
    }

    let enemy = query::enemies(&world).get(id).expect("enemy alive");
    assert!(enemy.position.x < 400.0);
    assert!(enemy.position.y.abs() < 1e-3);
    assert_eq!(ai.len(), 1);
}

#[test]
fn dead_enemies_are_never_moved() {
    let mut world = open_world();
    let start = Vec2::new(300.0, 100.0);
    let id = spawn(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Small,
            position: start,
            wave: 1,
        },
    );
    {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        let mut frame = world.frame(&mut events, &mut commands);
        let enemy = frame.enemies.get_mut(id).expect("enemy");
        let _ = enemy.take_damage(100.0);
    }

    let mut ai = Ai::new();
    for _ in 0..10 {
        tick(&mut world);
        let _ = run_ai(&mut world, &mut ai);
    }
    assert_eq!(query::enemies(&world).get(id).map(|enemy| enemy.position), Some(start));
}

#[test]
fn shooters_fire_from_range() {
    let mut world = open_world();
    let _ = spawn(
        &mut world,
        Command::SpawnEnemy {
            kind: EnemyKind::Shooter,
            position: Vec2::new(250.0, 0.0),
            wave: 1,
        },
    );
    let mut ai = Ai::new();
    tick(&mut world);
    let _ = run_ai(&mut world, &mut ai);
    assert_eq!(query::projectiles(&world).enemy.len(), 1);

    tick(&mut world);
    let _ = run_ai(&mut world, &mut ai);
    assert_eq!(query::projectiles(&world).enemy.len(), 1, "fire interval respected");
}

#[test]
fn jumper_lands_exactly_on_its_target() {
    let mut world = open_world();
    let tuning = query::tuning(&world).clone();
    let id = spawn(
        &mut world,
        Command::SpawnBoss {
            kind: BossKind::Jumper,
            position: Vec2::new(300.0, 0.0),
            hit_points: 1_500.0,
            wave: 1,
        },
    );
    let mut jumper = Jumper::new(tuning.jumper.clone());

    let mut landing = None;
    for _ in 0..(120_000 / 16) {
        tick(&mut world);
        let before = jumper.phase();
        let mut events = Vec::new();
        let mut commands = Vec::new();
        {
            let mut frame = world.frame(&mut events, &mut commands);
            jumper.update(id, &mut frame);
        }
        if let JumpPhase::Jumping { target, .. } = before {
            if jumper.phase() == JumpPhase::Idle {
                landing = Some(target);
                break;
            }
        }
    }

    let target = landing.expect("a jump attack occurs within twenty special intervals");
    let boss = query::enemies(&world).get(id).expect("boss");
    assert_eq!(boss.position, target);
    assert!(!boss.airborne);
}

#[test]
fn caster_is_removable_only_after_its_death_countdown() {
    let mut world = open_world();
    let tuning = query::tuning(&world).clone();
    let id = spawn(
        &mut world,
        Command::SpawnBoss {
            kind: BossKind::Caster,
            position: Vec2::new(250.0, 0.0),
            hit_points: 1_200.0,
            wave: 1,
        },
    );
    {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        let mut frame = world.frame(&mut events, &mut commands);
        let boss = frame.enemies.get_mut(id).expect("boss");
        let _ = boss.take_damage(5_000.0);
    }

    let mut caster = Caster::new(tuning.caster.clone());
    let countdown = tuning.caster.death_frame * tuning.caster.death_frames;
    let mut elapsed = Duration::ZERO;
    loop {
        tick(&mut world);
        elapsed += TICK;
        let mut events = Vec::new();
        let mut commands = Vec::new();
        {
            let mut frame = world.frame(&mut events, &mut commands);
            caster.update(id, &mut frame);
        }
        let boss = query::enemies(&world).get(id).expect("boss stays until removed");
        if boss.death_complete {
            break;
        }
        assert!(matches!(caster.state(), CasterState::Dying { .. }));
        assert!(elapsed <= countdown + TICK, "countdown overran");
    }
    assert!(elapsed + TICK >= countdown);
    assert_eq!(caster.state(), CasterState::Dead);
}

fn quick_jumper(seed: u64) -> Tuning {
    let mut tuning = Tuning::default();
    tuning.timing.seed = seed;
    tuning.jumper.special_interval = Duration::from_millis(160);
    tuning
}

#[test]
fn jumper_stomp_opens_a_shockwave_where_it_stands() {
    let settings = Tuning::default().jumper;
    let (world, id) = (0..64)
        .find_map(|seed| {
            let (mut world, id) = boss_world(quick_jumper(seed), 1, BossKind::Jumper, Vec2::new(300.0, 0.0));
            let mut ai = Ai::new();
            for _ in 0..20 {
                tick(&mut world);
                let _ = run_ai(&mut world, &mut ai);
            }
            (!query::hazards(&world).is_empty()).then_some((world, id))
        })
        .expect("some seed stomps before its first jump lands");

    let hazards = query::hazards(&world);
    assert_eq!(hazards.len(), 1);
    assert_eq!(hazards[0].kind(), ZoneKind::Shockwave);
    assert!((hazards[0].radius() - settings.stomp_radius).abs() < f32::EPSILON);
    assert_eq!(hazards[0].center(), boss_position(&world, id));
    assert_eq!(hazards[0].phase(query::now(&world)), HazardPhase::Armed);
}

#[test]
fn jump_attack_chains_its_jumps_before_returning_to_ready() {
    let settings = Tuning::default().jumper;
    let (mut world, id, mut jumper) = (0..64)
        .find_map(|seed| {
            let tuning = quick_jumper(seed);
            let mut jumper = Jumper::new(tuning.jumper.clone());
            let (mut world, id) = boss_world(tuning, 1, BossKind::Jumper, Vec2::new(300.0, 0.0));
            for _ in 0..20 {
                let _ = drive(&mut world, id, &mut jumper);
                if jumper.special() != SpecialAttack::Ready {
                    break;
                }
            }
            matches!(jumper.special(), SpecialAttack::JumpAttacking { .. }).then_some((world, id, jumper))
        })
        .expect("some seed opens with a jump attack");

    let mut remaining = match jumper.special() {
        SpecialAttack::JumpAttacking { remaining: left } => vec![left],
        other => panic!("unexpected special {other:?}"),
    };
    assert!(matches!(jumper.phase(), JumpPhase::PreJump { .. }));
    let mut landings = 0;
    for _ in 0..1_000 {
        let before = jumper.phase();
        let _ = drive(&mut world, id, &mut jumper);
        match (before, jumper.phase()) {
            (JumpPhase::Idle, JumpPhase::PreJump { .. }) => {
                if let SpecialAttack::JumpAttacking { remaining: left } = jumper.special() {
                    remaining.push(left);
                }
            }
            (JumpPhase::Jumping { .. }, JumpPhase::Idle) => landings += 1,
            _ => {}
        }
        if jumper.special() == SpecialAttack::Ready {
            break;
        }
    }

    let expected: Vec<u32> = (0..settings.chain_length).rev().collect();
    assert_eq!(remaining, expected);
    assert_eq!(landings, settings.chain_length);
    let shockwaves = query::hazards(&world)
        .iter()
        .filter(|hazard| (hazard.radius() - settings.landing_radius).abs() < f32::EPSILON)
        .count();
    assert_eq!(shockwaves, settings.chain_length as usize);
    assert!(!query::enemies(&world).get(id).expect("boss").airborne);
}

/// Caster stranded outside the arena ring, stuck on every sample.
fn stranded_caster(tuning: Tuning) -> (World, EnemyId, Caster) {
    let mut tuning = tuning;
    tuning.caster.stuck_threshold = 1.0e6;
    tuning.caster.stuck_checks = 1;
    tuning.caster.attack_interval = Duration::from_secs(60);
    let caster = Caster::new(tuning.caster.clone());
    let (world, id) = boss_world(tuning, 1, BossKind::Caster, Vec2::new(-700.0, 0.0));
    (world, id, caster)
}

fn wait_for_teleport(world: &mut World, id: EnemyId, caster: &mut Caster) -> Vec2 {
    for _ in 0..100 {
        let _ = drive(world, id, caster);
        if let CasterState::Teleporting { destination, .. } = caster.state() {
            return destination;
        }
    }
    panic!("caster never teleported");
}

#[test]
fn caster_fades_out_swaps_at_the_midpoint_and_fades_in() {
    let tuning = Tuning::default();
    let settings = tuning.caster.clone();
    let (mut world, id, mut caster) = stranded_caster(tuning);
    assert!(query::walls(&world).is_wall(Vec2::new(-580.0, 0.0)));

    let destination = wait_for_teleport(&mut world, id, &mut caster);
    let origin = boss_position(&world, id);
    assert!(!query::walls(&world).is_wall(destination));
    let offset = destination.distance(query::player(&world).position);
    assert!(offset >= settings.teleport_min_offset - 1e-3 && offset <= settings.teleport_max_offset + 1e-3);

    let mut last_alpha = 1.0;
    let mut swapped = false;
    for _ in 0..100 {
        let _ = drive(&mut world, id, &mut caster);
        let boss = query::enemies(&world).get(id).expect("boss");
        match caster.state() {
            CasterState::Teleporting { swapped: false, .. } => {
                assert_eq!(boss.position, origin);
                assert!(boss.alpha < last_alpha);
            }
            CasterState::Teleporting { swapped: true, .. } => {
                assert_eq!(boss.position, destination);
                assert!(!swapped || boss.alpha > last_alpha);
                swapped = true;
            }
            CasterState::Moving => break,
            other => panic!("unexpected state {other:?}"),
        }
        last_alpha = boss.alpha;
    }

    assert!(swapped);
    assert_eq!(caster.state(), CasterState::Moving);
    let boss = query::enemies(&world).get(id).expect("boss");
    assert_eq!(boss.position, destination);
    assert!((boss.alpha - 1.0).abs() < f32::EPSILON);
}

#[test]
fn caster_teleports_onto_the_player_when_every_candidate_is_walled() {
    let mut tuning = Tuning::default();
    let ring = tuning.walls.arena_radius + tuning.walls.arena_thickness * 0.5;
    tuning.caster.teleport_min_offset = ring;
    tuning.caster.teleport_max_offset = ring;
    let (mut world, id, mut caster) = stranded_caster(tuning);

    let destination = wait_for_teleport(&mut world, id, &mut caster);
    assert_eq!(destination, query::player(&world).position);
}

fn first_caster_attack(seed: u64, wave: u32) -> (World, EnemyId, Caster, Vec<Command>) {
    let mut tuning = Tuning::default();
    tuning.timing.seed = seed;
    tuning.caster.attack_interval = Duration::from_millis(160);
    let mut caster = Caster::new(tuning.caster.clone());
    let (mut world, id) = boss_world(tuning, wave, BossKind::Caster, Vec2::new(250.0, 0.0));
    let mut commands = Vec::new();
    for _ in 0..15 {
        commands = drive(&mut world, id, &mut caster);
        if caster.state() != CasterState::Moving || !commands.is_empty() {
            break;
        }
    }
    (world, id, caster, commands)
}

#[test]
fn caster_meteors_drop_telegraphed_near_the_player() {
    let settings = Tuning::default().caster;
    let (mut world, id, mut caster, _) = (0..64)
        .map(|seed| first_caster_attack(seed, 1))
        .find(|(_, _, caster, _)| matches!(caster.state(), CasterState::Meteor { .. }))
        .expect("some seed opens with meteors");

    let player = query::player(&world).position;
    let mut dropped = 0;
    for _ in 0..500 {
        let _ = drive(&mut world, id, &mut caster);
        let hazards = query::hazards(&world);
        if hazards.len() > dropped {
            assert_eq!(hazards.len(), dropped + 1);
            let meteor = &hazards[dropped];
            assert_eq!(meteor.kind(), ZoneKind::Meteor);
            assert_eq!(meteor.phase(query::now(&world)), HazardPhase::Telegraph);
            let offset = meteor.center() - player;
            assert!(offset.x.abs() <= settings.meteor_scatter && offset.y.abs() <= settings.meteor_scatter);
            dropped += 1;
        }
        if caster.state() == CasterState::Moving {
            break;
        }
    }
    assert_eq!(dropped, settings.meteor_count as usize);
}

#[test]
fn caster_summons_minions_into_the_current_wave() {
    let settings = Tuning::default().caster;
    let (world, id, _, commands) = (0..64)
        .map(|seed| first_caster_attack(seed, 3))
        .find(|(_, _, _, commands)| !commands.is_empty())
        .expect("some seed opens with a summon");

    let center = boss_position(&world, id);
    assert_eq!(commands.len(), settings.summon_count as usize);
    for command in commands {
        match command {
            Command::SpawnEnemy { position, wave, .. } => {
                assert_eq!(wave, 3);
                assert!((position.distance(center) - settings.summon_radius).abs() < 1e-3);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
