//! Scripted stick input for driving `PlayerMotion` without a window.
//!
//! A script is a JSON list of steps, each holding one direction for some
//! number of frames:
//!
//! ```json
//! { "dt": 0.016, "steps": [ { "dir": [1.0, 0.0], "hold": 4 }, { "hold": 40 } ] }
//! ```

use crate::movement::{MovementConfig, PlayerMotion};
use glam::Vec2;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct InputScript {
    #[serde(default = "InputScript::default_dt")]
    pub dt: f32,
    pub steps: Vec<ScriptStep>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScriptStep {
    /// Omitted means no input held.
    #[serde(default)]
    pub dir: Vec2,
    /// Frames this direction stays held. Zero counts as one.
    #[serde(default)]
    pub hold: u32,
}

impl InputScript {
    fn default_dt() -> f32 {
        1.0 / 60.0
    }

    pub fn parse(json: &str) -> Result<Self, String> {
        let script: Self =
            serde_json::from_str(json).map_err(|e| format!("Bad input script: {e}"))?;
        if script.dt.is_nan() || script.dt < 0.0 {
            return Err(format!("Input script dt must be >= 0, got {}", script.dt));
        }
        if script.steps.is_empty() {
            return Err("Input script has no steps".to_string());
        }
        Ok(script)
    }

    /// One clamped direction per frame.
    pub fn frames(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.steps.iter().flat_map(|step| {
            let dir = step.dir.clamp(Vec2::NEG_ONE, Vec2::ONE);
            std::iter::repeat_n(dir, step.hold.max(1) as usize)
        })
    }

    /// Step `motion` through every frame, recording the state after each.
    pub fn play(&self, mut motion: PlayerMotion, config: &MovementConfig) -> Vec<PlayerMotion> {
        self.frames()
            .map(|dir| {
                motion.step(dir, self.dt, config);
                motion
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: Vec2 = Vec2::new(180.0, 780.0);

    fn play(json: &str) -> Vec<PlayerMotion> {
        let script = InputScript::parse(json).expect("script should parse");
        script.play(PlayerMotion::new(START, true), &MovementConfig::default())
    }

    #[test]
    fn steps_expand_to_clamped_frames() {
        let script = InputScript::parse(
            r#"{ "steps": [ { "dir": [1.0, 0.0], "hold": 3 }, { "dir": [-4.0, 1.0] } ] }"#,
        )
        .expect("script should parse");
        assert!((script.dt - 1.0 / 60.0).abs() < 1e-9);
        let frames: Vec<Vec2> = script.frames().collect();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0], Vec2::X);
        assert_eq!(frames[3], Vec2::new(-1.0, 1.0));
    }

    #[test]
    fn malformed_scripts_are_rejected() {
        let empty = InputScript::parse(r#"{ "steps": [] }"#).unwrap_err();
        assert!(empty.contains("no steps"));
        let negative = InputScript::parse(r#"{ "dt": -0.1, "steps": [ {} ] }"#).unwrap_err();
        assert!(negative.contains("dt must be >= 0"));
        assert!(InputScript::parse("not json").is_err());
    }

    #[test]
    fn zero_dt_never_moves() {
        let states = play(r#"{ "dt": 0.0, "steps": [ { "dir": [1.0, -1.0], "hold": 30 } ] }"#);
        assert_eq!(states.len(), 30);
        for motion in states {
            assert_eq!(motion.position, START);
            assert_eq!(motion.velocity, Vec2::ZERO);
        }
    }

    #[test]
    fn holding_right_then_letting_go_comes_to_rest() {
        let states = play(
            r#"{ "dt": 0.016, "steps": [ { "dir": [1.0, 0.0], "hold": 4 }, { "hold": 40 } ] }"#,
        );
        let max_speed = MovementConfig::default().max_speed;

        let pushed = &states[..4];
        for pair in pushed.windows(2) {
            assert!(pair[1].position.x > pair[0].position.x);
        }
        assert!(pushed.iter().all(|m| m.velocity.x <= max_speed));

        for pair in states[4..].windows(2) {
            assert!(pair[1].velocity.x <= pair[0].velocity.x);
            assert!(pair[1].velocity.x >= 0.0);
        }
        assert_eq!(states.last().map(|m| m.velocity), Some(Vec2::ZERO));
    }

    #[test]
    fn same_script_same_trajectory() {
        let json = r#"{
          "dt": 0.016,
          "steps": [
            { "dir": [1.0, 0.0], "hold": 50 },
            { "dir": [1.0, -1.0], "hold": 25 },
            { "hold": 12 },
            { "dir": [-1.0, 0.0], "hold": 40 }
          ]
        }"#;
        assert_eq!(play(json), play(json));
    }
}
