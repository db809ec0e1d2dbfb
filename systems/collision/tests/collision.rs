use std::time::Duration;

use arena_siege_core::{BossKind, Command, DamageSource, EnemyId, EnemyKind, Event, Tuning, ZoneKind};
use arena_siege_system_collision::Resolver;
use arena_siege_world::{self as world, query, Blast, Hazard, Ignite, Projectile, Slow, World};
use glam::Vec2;

fn open_world(wave: u32) -> World {
    world_with(Tuning::default(), wave)
}

fn world_with(mut tuning: Tuning, wave: u32) -> World {
    tuning.walls.clusters_min = 0;
    tuning.walls.clusters_max = 0;
    let mut world = World::new(tuning);
    let mut events = Vec::new();
    world::apply(&mut world, Command::BeginWave { wave }, &mut events);
    world
}

fn spawn(world: &mut World, kind: EnemyKind, position: Vec2) -> EnemyId {
    let mut events = Vec::new();
    let wave = query::wave(world);
    world::apply(world, Command::SpawnEnemy { kind, position, wave }, &mut events);
    events
        .iter()
        .find_map(|event| match event {
            Event::EnemySpawned { id, .. } => Some(*id),
            _ => None,
        })
        .expect("spawn accepted")
}

/// World whose boss arena ring spans 100 to 180 units around the origin.
fn walled_world() -> World {
    let mut tuning = Tuning::default();
    tuning.walls.arena_radius = 100.0;
    tuning.walls.arena_thickness = 80.0;
    tuning.walls.arena_pillars = 0;
    let mut world = world_with(tuning, 1);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnBoss {
            kind: BossKind::Jumper,
            position: Vec2::new(-400.0, 0.0),
            hit_points: 1_500.0,
            wave: 1,
        },
        &mut events,
    );
    world
}

fn position(world: &World, id: EnemyId) -> Vec2 {
    query::enemies(world).get(id).expect("enemy present").position
}

fn tick(world: &mut World) {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt: Duration::from_millis(16) }, &mut events);
}

fn resolve(world: &mut World, resolver: &mut Resolver) -> Vec<Event> {
    let mut events = Vec::new();
    let mut commands = Vec::new();
    let mut frame = world.frame(&mut events, &mut commands);
    resolver.resolve(&mut frame);
    events
}

fn stationary_shot(position: Vec2, pierce: u32, damage: f32) -> Projectile {
    Projectile::player(position, Vec2::X, 0.0, pierce).with_hit(5.0, damage)
}

#[test]
fn piercing_shot_damages_at_most_its_pierce_count() {
    let mut world = open_world(1);
    let ids = [
        spawn(&mut world, EnemyKind::Normal, Vec2::new(300.0, 0.0)),
        spawn(&mut world, EnemyKind::Normal, Vec2::new(300.0, 5.0)),
        spawn(&mut world, EnemyKind::Normal, Vec2::new(300.0, 10.0)),
    ];
    {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        let mut frame = world.frame(&mut events, &mut commands);
        frame.projectiles.push(stationary_shot(Vec2::new(300.0, 5.0), 2, 5.0));
    }

    tick(&mut world);
    let _ = resolve(&mut world, &mut Resolver::new());

    let damaged = ids
        .iter()
        .filter_map(|id| query::enemies(&world).get(*id))
        .filter(|enemy| enemy.hit_points < enemy.max_hit_points)
        .count();
    assert_eq!(damaged, 2);
    assert!(query::projectiles(&world).player.is_empty(), "spent shot is removed");
}

#[test]
fn lethal_hit_removes_the_enemy_in_the_same_pass() {
    let mut world = open_world(1);
    let id = spawn(&mut world, EnemyKind::Normal, Vec2::new(300.0, 0.0));
    {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        let mut frame = world.frame(&mut events, &mut commands);
        if let Some(enemy) = frame.enemies.get_mut(id) {
            enemy.hit_points = 10.0;
        }
        frame.projectiles.push(stationary_shot(Vec2::new(300.0, 0.0), 1, 15.0));
    }

    tick(&mut world);
    let events = resolve(&mut world, &mut Resolver::new());

    assert!(query::enemies(&world).get(id).is_none());
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { id: killed, .. } if *killed == id)));
    assert_eq!(query::tally(&world).wave_kills, 1);
}

#[test]
fn explosion_hits_each_enemy_once() {
    let mut world = open_world(1);
    let id = spawn(&mut world, EnemyKind::Giant, Vec2::new(300.0, 0.0));
    {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        let mut frame = world.frame(&mut events, &mut commands);
        let now = frame.now;
        frame
            .blasts
            .push(Blast::explosion(Vec2::new(300.0, 0.0), 200.0, Duration::from_millis(400), 7.0, now));
    }

    let mut resolver = Resolver::new();
    for _ in 0..10 {
        tick(&mut world);
        let _ = resolve(&mut world, &mut resolver);
    }

    let enemy = query::enemies(&world).get(id).expect("giant survives");
    assert!((enemy.max_hit_points - enemy.hit_points - 7.0).abs() < 1e-3);
}

#[test]
fn hazard_damages_the_player_once() {
    let mut world = open_world(1);
    {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        let mut frame = world.frame(&mut events, &mut commands);
        let now = frame.now;
        frame.hazards.push(Hazard::new(
            ZoneKind::Meteor,
            Vec2::ZERO,
            50.0,
            20.0,
            now,
            now + Duration::from_secs(1),
        ));
    }

    let mut resolver = Resolver::new();
    let mut hits = 0;
    for _ in 0..20 {
        tick(&mut world);
        hits += resolve(&mut world, &mut resolver)
            .iter()
            .filter(|event| {
                matches!(event, Event::PlayerDamaged { source: DamageSource::Hazard(ZoneKind::Meteor), .. })
            })
            .count();
    }

    assert_eq!(hits, 1);
    let player = query::player(&world);
    assert!((player.max_hit_points - player.hit_points - 20.0).abs() < 1e-3);
}

#[test]
fn defeated_boss_awards_weighted_kills() {
    let mut world = open_world(3);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnBoss {
            kind: BossKind::Jumper,
            position: Vec2::new(300.0, 0.0),
            hit_points: 4_500.0,
            wave: 3,
        },
        &mut events,
    );
    {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        let mut frame = world.frame(&mut events, &mut commands);
        let boss = frame.enemies.iter_mut().find(|enemy| enemy.kind().is_boss()).expect("boss");
        let _ = boss.take_damage(10_000.0);
    }

    tick(&mut world);
    let events = resolve(&mut world, &mut Resolver::new());

    assert!(!query::boss_present(&world));
    assert_eq!(query::tally(&world).wave_kills, 30);
    assert!(events.contains(&Event::BossDefeated {
        kind: BossKind::Jumper,
        kills_awarded: 30,
    }));
}

#[test]
fn dying_caster_stays_until_its_countdown_completes() {
    let mut world = open_world(1);
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnBoss {
            kind: BossKind::Caster,
            position: Vec2::new(300.0, 0.0),
            hit_points: 1_200.0,
            wave: 1,
        },
        &mut events,
    );
    {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        let mut frame = world.frame(&mut events, &mut commands);
        let boss = frame.enemies.iter_mut().find(|enemy| enemy.kind().is_boss()).expect("boss");
        let _ = boss.take_damage(10_000.0);
    }

    let mut resolver = Resolver::new();
    tick(&mut world);
    let _ = resolve(&mut world, &mut resolver);
    assert!(query::boss_present(&world));

    {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        let mut frame = world.frame(&mut events, &mut commands);
        let boss = frame.enemies.iter_mut().find(|enemy| enemy.kind().is_boss()).expect("boss");
        boss.death_complete = true;
    }
    tick(&mut world);
    let _ = resolve(&mut world, &mut resolver);
    assert!(!query::boss_present(&world));
}

#[test]
fn wave_clear_kills_regular_enemies_but_spares_bosses() {
    let mut world = open_world(1);
    let minion = spawn(&mut world, EnemyKind::Giant, Vec2::new(600.0, 0.0));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnBoss {
            kind: BossKind::Jumper,
            position: Vec2::new(-300.0, 0.0),
            hit_points: 1_500.0,
            wave: 1,
        },
        &mut events,
    );
    {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        let mut frame = world.frame(&mut events, &mut commands);
        let now = frame.now;
        frame
            .blasts
            .push(Blast::wave_clear(Vec2::ZERO, 2_400.0, Duration::from_millis(1_200), now));
    }

    let mut resolver = Resolver::new();
    for _ in 0..100 {
        tick(&mut world);
        let mut events = Vec::new();
        let mut commands = Vec::new();
        let mut frame = world.frame(&mut events, &mut commands);
        resolver.apply_wave_clear(&mut frame);
    }

    assert!(query::enemies(&world).get(minion).is_none());
    assert!(query::boss_present(&world));
    assert!(query::blasts(&world).is_empty());
    assert!(!query::wave_clear_active(&world));
}

#[test]
fn contact_damage_respects_the_attack_cooldown() {
    let mut world = open_world(1);
    let _ = spawn(&mut world, EnemyKind::Normal, Vec2::new(20.0, 0.0));
    let mut resolver = Resolver::new();

    let mut hits = 0;
    for _ in 0..3 {
        tick(&mut world);
        hits += resolve(&mut world, &mut resolver)
            .iter()
            .filter(|event| matches!(event, Event::PlayerDamaged { source: DamageSource::Contact(EnemyKind::Normal), .. }))
            .count();
    }

    assert_eq!(hits, 1);
}

#[test]
fn separation_pushes_chasers_apart_but_leaves_shooters_and_bosses() {
    let mut world = open_world(1);
    let left = spawn(&mut world, EnemyKind::Normal, Vec2::new(100.0, 0.0));
    let right = spawn(&mut world, EnemyKind::Normal, Vec2::new(110.0, 0.0));
    let shooter = spawn(&mut world, EnemyKind::Shooter, Vec2::new(200.0, 100.0));
    let beside_shooter = spawn(&mut world, EnemyKind::Normal, Vec2::new(205.0, 100.0));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnBoss {
            kind: BossKind::Jumper,
            position: Vec2::new(-300.0, 0.0),
            hit_points: 1_500.0,
            wave: 1,
        },
        &mut events,
    );
    let beside_boss = spawn(&mut world, EnemyKind::Normal, Vec2::new(-290.0, 0.0));

    tick(&mut world);
    let _ = resolve(&mut world, &mut Resolver::new());

    assert!(position(&world, left).distance(position(&world, right)) > 10.0);
    assert_eq!(position(&world, shooter), Vec2::new(200.0, 100.0));
    assert_eq!(position(&world, beside_shooter), Vec2::new(205.0, 100.0));
    assert_eq!(position(&world, beside_boss), Vec2::new(-290.0, 0.0));
    let boss = query::enemies(&world).boss().expect("boss");
    assert_eq!(boss.position, Vec2::new(-300.0, 0.0));
}

#[test]
fn separation_never_pushes_an_enemy_into_a_wall() {
    let mut world = walled_world();
    let inner = spawn(&mut world, EnemyKind::Normal, Vec2::new(90.0, 0.0));
    let outer = spawn(&mut world, EnemyKind::Normal, Vec2::new(95.0, 0.0));

    tick(&mut world);
    let _ = resolve(&mut world, &mut Resolver::new());

    assert_eq!(position(&world, outer), Vec2::new(95.0, 0.0));
    assert!(position(&world, inner).x < 90.0);
}

#[test]
fn stuck_player_is_freed_only_on_the_check_interval() {
    let mut world = walled_world();
    let interval = query::tuning(&world).combat.stuck_check_interval;
    let trapped = Vec2::new(140.0, 0.0);
    {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        let mut frame = world.frame(&mut events, &mut commands);
        frame.player.position = trapped;
    }
    assert!(query::walls(&world).is_wall(trapped));

    let mut resolver = Resolver::new();
    let mut freed_at = None;
    for _ in 0..60 {
        tick(&mut world);
        let _ = resolve(&mut world, &mut resolver);
        if query::player(&world).position != trapped {
            freed_at = Some(query::now(&world));
            break;
        }
    }

    let freed_at = freed_at.expect("player freed");
    assert!(freed_at >= interval);
    assert!(!query::walls(&world).is_wall(query::player(&world).position));
}

#[test]
fn hits_ignite_and_chill_and_reapplication_resets_expiry() {
    let mut world = open_world(1);
    let id = spawn(&mut world, EnemyKind::Giant, Vec2::new(300.0, 0.0));
    let burn = Duration::from_secs(3);
    let chill = Duration::from_secs(2);
    let shoot = |world: &mut World| {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        let mut frame = world.frame(&mut events, &mut commands);
        let mut shot = stationary_shot(Vec2::new(300.0, 0.0), 1, 5.0);
        shot.ignite = Some(Ignite {
            damage_per_second: 4.0,
            duration: burn,
        });
        shot.slow = Some(Slow {
            multiplier: 0.5,
            duration: chill,
        });
        frame.projectiles.push(shot);
    };
    let mut resolver = Resolver::new();

    shoot(&mut world);
    tick(&mut world);
    let _ = resolve(&mut world, &mut resolver);
    let first = query::now(&world);
    let status = query::enemies(&world).get(id).expect("giant").status;
    assert_eq!(status.burn().expect("burning").expires_at, first + burn);
    let slowed = status.chilled().expect("chilled");
    assert_eq!(slowed.expires_at, first + chill);
    assert!((slowed.multiplier - 0.5).abs() < f32::EPSILON);

    for _ in 0..10 {
        tick(&mut world);
    }
    shoot(&mut world);
    tick(&mut world);
    let _ = resolve(&mut world, &mut resolver);
    let second = query::now(&world);
    let status = query::enemies(&world).get(id).expect("giant").status;
    assert!(second > first);
    assert_eq!(status.burn().expect("burning").expires_at, second + burn);
    assert_eq!(status.chilled().expect("chilled").expires_at, second + chill);
}

#[test]
fn burn_kills_are_reaped_and_credited() {
    let mut world = open_world(1);
    let id = spawn(&mut world, EnemyKind::Normal, Vec2::new(300.0, 0.0));
    {
        let mut events = Vec::new();
        let mut commands = Vec::new();
        let mut frame = world.frame(&mut events, &mut commands);
        let now = frame.now;
        let enemy = frame.enemies.get_mut(id).expect("enemy");
        enemy.hit_points = 0.1;
        enemy.status.ignite(now, 10.0, Duration::from_secs(1));
    }

    tick(&mut world);
    let mut events = Vec::new();
    let mut commands = Vec::new();
    {
        let mut frame = world.frame(&mut events, &mut commands);
        let (now, dt) = (frame.now, frame.dt);
        for enemy in frame.enemies.iter_mut() {
            let burn = enemy.status.refresh(now, dt);
            let _ = enemy.take_damage(burn);
        }
        Resolver::new().resolve(&mut frame);
    }

    assert!(query::enemies(&world).get(id).is_none());
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { id: killed, .. } if *killed == id)));
    assert_eq!(query::tally(&world).wave_kills, 1);
}
