//! Bullets fired from the ship.

use glam::{Quat, Vec3};

use crate::config::BulletConfig;

/// A bullet flying forward while pitching down toward the planet.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bullet {
    id: u64,
    position: Vec3,
    rotation: Quat,
    /// Local flight direction, pitched further every update.
    dir: Vec3,
    travelled: f32,
}

impl Bullet {
    #[must_use]
    pub const fn new(id: u64, position: Vec3, rotation: Quat) -> Self {
        Self {
            id,
            position,
            rotation,
            dir: Vec3::Z,
            travelled: 0.0,
        }
    }

    /// Move by `dt` seconds. Returns `false` once a distance or altitude
    /// limit is crossed.
    pub fn advance(&mut self, dt: f32, config: &BulletConfig) -> bool {
        let linear = config.speed_linear * dt;
        self.travelled += linear;
        if config.distance_limit > 0.0 && config.distance_limit < self.travelled {
            tracing::debug!(
                id = self.id,
                distance = self.travelled,
                "Bullet distance limit reached"
            );
            return false;
        }

        self.dir = Quat::from_rotation_x(config.speed_angular * dt) * self.dir;
        self.position += self.rotation * self.dir * linear;

        let altitude = self.position.length();
        if altitude < config.altitude_min || altitude > config.altitude_max {
            tracing::debug!(id = self.id, altitude, "Bullet altitude limit reached");
            return false;
        }
        true
    }

    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    #[must_use]
    pub const fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub const fn rotation(&self) -> Quat {
        self.rotation
    }

    #[must_use]
    pub const fn travelled(&self) -> f32 {
        self.travelled
    }
}

/// Fires bullets with a cool-down and expires them.
#[derive(Debug, Clone)]
pub struct Shooter {
    config: BulletConfig,
    clock: f32,
    last_shot: Option<f32>,
    next_id: u64,
    bullets: Vec<Bullet>,
}

impl Shooter {
    #[must_use]
    pub fn new(config: &BulletConfig) -> Self {
        Self {
            config: config.clone(),
            clock: 0.0,
            last_shot: None,
            next_id: 0,
            bullets: Vec::new(),
        }
    }

    /// Fire from `position` facing `rotation` unless still cooling down.
    pub fn shoot(&mut self, position: Vec3, rotation: Quat) -> bool {
        if self
            .last_shot
            .is_some_and(|last| last + self.config.cooldown >= self.clock)
        {
            return false;
        }

        let bullet = Bullet::new(self.next_id, position, rotation);
        tracing::debug!(
            id = bullet.id(),
            "Shooting bullet :: pos=({:.2}, {:.2}, {:.2})",
            position.x,
            position.y,
            position.z
        );
        self.next_id += 1;
        self.bullets.push(bullet);
        self.last_shot = Some(self.clock);
        true
    }

    /// Advance the clock and every bullet, dropping expired ones.
    ///
    /// Returns the ids of the bullets that expired.
    pub fn update(&mut self, dt: f32) -> Vec<u64> {
        self.clock += dt;
        let mut expired = Vec::new();
        let config = &self.config;
        self.bullets.retain_mut(|bullet| {
            let alive = bullet.advance(dt, config);
            if !alive {
                expired.push(bullet.id());
            }
            alive
        });
        expired
    }

    #[must_use]
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bullets.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bullets.is_empty()
    }

    pub fn reset(&mut self) {
        self.clock = 0.0;
        self.last_shot = None;
        self.bullets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_spaces_shots() {
        let mut shooter = Shooter::new(&BulletConfig::default());
        let pos = Vec3::Y * 1.3;
        assert!(shooter.shoot(pos, Quat::IDENTITY));
        assert!(!shooter.shoot(pos, Quat::IDENTITY));
        shooter.update(0.05);
        assert!(!shooter.shoot(pos, Quat::IDENTITY));
        shooter.update(0.06);
        assert!(shooter.shoot(pos, Quat::IDENTITY));
        assert_eq!(shooter.len(), 2);
        assert_ne!(shooter.bullets()[0].id(), shooter.bullets()[1].id());
    }

    #[test]
    fn bullet_pitches_down() {
        let config = BulletConfig::default();
        let mut bullet = Bullet::new(0, Vec3::Y * 1.5, Quat::IDENTITY);
        assert!(bullet.advance(0.05, &config));
        let pos = bullet.position();
        assert!(pos.z > 0.0);
        assert!(pos.y < 1.5);
    }

    #[test]
    fn bullet_follows_rotation() {
        let config = BulletConfig::default();
        let rot = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let mut bullet = Bullet::new(0, Vec3::Y * 1.5, rot);
        assert!(bullet.advance(0.01, &config));
        // Local +Z is world +X after a quarter turn about +Y.
        assert!(bullet.position().x > 0.0);
        assert!(bullet.position().z.abs() < 1e-3);
    }

    #[test]
    fn bullet_expires_below_the_surface() {
        let config = BulletConfig {
            distance_limit: 0.0,
            ..BulletConfig::default()
        };
        let mut bullet = Bullet::new(0, Vec3::Y * 1.05, Quat::IDENTITY);
        let mut steps = 0;
        while bullet.advance(0.01, &config) {
            steps += 1;
            assert!(steps < 1_000, "bullet never expired");
        }
        assert!(bullet.position().length() < config.altitude_min);
    }

    #[test]
    fn bullet_expires_after_distance_limit() {
        let config = BulletConfig {
            altitude_min: 0.0,
            altitude_max: 100.0,
            ..BulletConfig::default()
        };
        let mut bullet = Bullet::new(0, Vec3::Y * 50.0, Quat::IDENTITY);
        while bullet.advance(0.1, &config) {}
        assert!(bullet.travelled() > config.distance_limit);
        assert!(bullet.travelled() <= config.distance_limit + 0.2 + 1e-4);
    }

    #[test]
    fn update_drops_expired_bullets() {
        let mut shooter = Shooter::new(&BulletConfig::default());
        shooter.shoot(Vec3::Y * 1.05, Quat::IDENTITY);
        let mut expired = Vec::new();
        for _ in 0..200 {
            expired.extend(shooter.update(0.01));
        }
        assert!(shooter.is_empty());
        assert_eq!(expired, vec![0]);
    }
}
