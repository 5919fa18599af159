use glam::Vec2;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub max_speed: f32,
    pub accel_ground: f32,
    pub accel_air: f32,
    pub decel_ground: f32,
    pub decel_air: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            max_speed: 800.0,
            accel_ground: 4000.0,
            accel_air: 1500.0,
            decel_ground: 5000.0,
            decel_air: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerMotion {
    pub position: Vec2,
    pub velocity: Vec2,
    pub grounded: bool,
}

/// Unit vector for any non-zero input, zero otherwise.
pub fn normalize_direction(direction: Vec2) -> Vec2 {
    direction.normalize_or_zero()
}

impl PlayerMotion {
    pub fn new(position: Vec2, grounded: bool) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            grounded,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// One explicit-Euler step. Steering accelerates along `direction`;
    /// no input brakes toward rest without crossing zero.
    pub fn step(&mut self, direction: Vec2, dt: f32, config: &MovementConfig) {
        let dir = normalize_direction(direction);

        if dir != Vec2::ZERO {
            let accel = if self.grounded {
                config.accel_ground
            } else {
                config.accel_air
            };
            self.velocity += dir * accel * dt;
        } else {
            self.brake(dt, config);
        }

        self.velocity = self.velocity.clamp_length_max(config.max_speed);
        self.position += self.velocity * dt;
    }

    /// `a = -v̂ * min(decel, |v| / dt)`. The stopping step lands exactly on
    /// zero instead of trusting the float product to cancel.
    fn brake(&mut self, dt: f32, config: &MovementConfig) {
        let speed = self.speed();
        if dt <= 0.0 || speed == 0.0 {
            return;
        }
        let decel = if self.grounded {
            config.decel_ground
        } else {
            config.decel_air
        };
        if decel * dt >= speed {
            self.velocity = Vec2::ZERO;
        } else {
            self.velocity -= self.velocity / speed * decel * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.016;

    fn resting() -> PlayerMotion {
        PlayerMotion::new(Vec2::new(180.0, 780.0), true)
    }

    #[test]
    fn zero_direction_normalizes_to_zero() {
        assert_eq!(normalize_direction(Vec2::ZERO), Vec2::ZERO);
        let diag = normalize_direction(Vec2::new(1.0, 1.0));
        assert!((diag.length() - 1.0).abs() < 1e-6);
        assert_eq!(normalize_direction(Vec2::new(-3.0, 0.0)), Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn zero_dt_changes_nothing() {
        let config = MovementConfig::default();
        let mut motion = resting();
        motion.velocity = Vec2::new(120.0, -40.0);
        let before = motion;

        motion.step(Vec2::new(1.0, 0.0), 0.0, &config);
        assert_eq!(motion, before);

        motion.step(Vec2::ZERO, 0.0, &config);
        assert_eq!(motion, before);
    }

    #[test]
    fn holding_right_strictly_increases_x() {
        let config = MovementConfig::default();
        let mut motion = resting();
        let mut last_x = motion.position.x;
        for _ in 0..4 {
            motion.step(Vec2::new(1.0, 0.0), DT, &config);
            assert!(motion.position.x > last_x);
            assert!(motion.velocity.x <= config.max_speed);
            last_x = motion.position.x;
        }
        assert_eq!(motion.position.y, 780.0);
    }

    #[test]
    fn speed_never_exceeds_max() {
        let config = MovementConfig::default();
        let mut motion = resting();
        for _ in 0..200 {
            motion.step(Vec2::new(1.0, 1.0), DT, &config);
            assert!(motion.speed() <= config.max_speed + 1e-3);
            assert!(motion.velocity.x.abs() <= config.max_speed + 1e-3);
        }
        assert!((motion.speed() - config.max_speed).abs() < 1e-3);
    }

    #[test]
    fn diagonal_is_not_faster_than_straight() {
        let config = MovementConfig::default();
        let mut straight = resting();
        let mut diagonal = resting();
        straight.step(Vec2::new(1.0, 0.0), DT, &config);
        diagonal.step(Vec2::new(1.0, 1.0), DT, &config);
        assert!((straight.speed() - diagonal.speed()).abs() < 1e-3);
    }

    #[test]
    fn releasing_input_stops_without_overshoot() {
        let config = MovementConfig::default();
        let mut motion = resting();
        for _ in 0..30 {
            motion.step(Vec2::new(1.0, 0.0), DT, &config);
        }
        assert!(motion.velocity.x > 0.0);

        let mut frames = 0;
        while motion.velocity != Vec2::ZERO {
            motion.step(Vec2::ZERO, DT, &config);
            assert!(motion.velocity.x >= 0.0, "velocity flipped sign");
            frames += 1;
            assert!(frames < 100, "braking never reached rest");
        }
        // 800 px/s against 5000 px/s^2 at 16 ms per frame.
        assert!(frames <= 11);

        let rest = motion.position;
        motion.step(Vec2::ZERO, DT, &config);
        assert_eq!(motion.position, rest);
    }

    #[test]
    fn air_control_is_weaker() {
        let config = MovementConfig::default();
        let mut ground = resting();
        let mut air = PlayerMotion::new(Vec2::ZERO, false);
        ground.step(Vec2::new(0.0, -1.0), DT, &config);
        air.step(Vec2::new(0.0, -1.0), DT, &config);
        assert!(air.speed() < ground.speed());
        assert!(air.velocity.y < 0.0);
    }

    #[test]
    fn large_dt_brakes_to_exact_rest() {
        let config = MovementConfig::default();
        let mut motion = resting();
        motion.velocity = Vec2::new(-300.0, 200.0);
        motion.step(Vec2::ZERO, 0.25, &config);
        assert_eq!(motion.velocity, Vec2::ZERO);
    }
}
