use arena_siege_core::{PlayerInput, SceneSnapshot, Upgrade};
use glam::Vec2;

const KITE_DISTANCE: f32 = 220.0;
const DASH_DISTANCE: f32 = 60.0;
const CROWD_RADIUS: f32 = 160.0;
const CROWD_SIZE: usize = 5;

/// Scripted player used by the headless runner: aims at the nearest enemy,
/// backs away from it, and spends abilities when crowded.
#[derive(Debug, Default)]
pub(crate) struct Autopilot {
    next_upgrade: usize,
}

impl Autopilot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn input(&self, scene: &SceneSnapshot) -> PlayerInput {
        let player = scene.player.position;
        let nearest = scene
            .enemies
            .iter()
            .filter(|enemy| enemy.hit_points > 0.0)
            .min_by(|a, b| {
                a.position
                    .distance_squared(player)
                    .total_cmp(&b.position.distance_squared(player))
            });

        let Some(target) = nearest else {
            return PlayerInput {
                aim: player + Vec2::X,
                ..PlayerInput::default()
            };
        };

        let distance = target.position.distance(player) - target.radius;
        let away = (player - target.position).normalize_or_zero();
        let crowd = scene
            .enemies
            .iter()
            .filter(|enemy| enemy.position.distance(player) <= CROWD_RADIUS)
            .count();

        PlayerInput {
            movement: if distance < KITE_DISTANCE { away } else { Vec2::ZERO },
            aim: target.position,
            shoot: true,
            dash: distance < DASH_DISTANCE,
            explosion: crowd >= CROWD_SIZE,
        }
    }

    /// Upgrades are taken in a fixed rotation.
    pub(crate) fn next_upgrade(&mut self) -> Upgrade {
        let upgrade = Upgrade::ALL[self.next_upgrade % Upgrade::ALL.len()];
        self.next_upgrade += 1;
        upgrade
    }
}
