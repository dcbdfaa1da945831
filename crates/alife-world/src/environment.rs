//! Ambient services: the light source green cells feed on.

use alife_core::{Position, SunConfig};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// A point light whose power may follow a seasonal cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sun {
    pub position: Position,
    pub power: f32,
    reach: f32,
    seasonal: bool,
    season_period: u64,
    tick: u64,
}

impl Sun {
    pub fn new(config: &SunConfig) -> Self {
        Self {
            position: config.position,
            power: 1.0,
            reach: config.reach,
            seasonal: config.seasonal,
            season_period: config.season_period.max(1),
            tick: 0,
        }
    }

    /// Advance the seasonal cycle by one tick
    pub fn update(&mut self) {
        if !self.seasonal {
            return;
        }
        self.tick += 1;
        let phase = TAU * (self.tick % self.season_period) as f32 / self.season_period as f32;
        // Swings between 0.55 and 0.85
        self.power = (phase.sin() / 2.0 * 0.30 + 0.7).max(0.0);
    }

    /// Light level in `[0, 1]` at `position`: saturated within half the
    /// reach, falling linearly to zero at the reach.
    pub fn illumination(&self, position: &Position) -> f32 {
        let distance = self.position.distance_to(position);
        (self.power * 2.0 * (1.0 - distance / self.reach)).clamp(0.0, 1.0)
    }

    /// Bearing from `from` towards the sun, or `None` when standing on it
    pub fn bearing_from(&self, from: &Position) -> Option<f32> {
        if from.distance_to(&self.position) <= f32::EPSILON {
            None
        } else {
            Some(from.radian_to(&self.position))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_illumination_profile() {
        let sun = Sun::new(&SunConfig::default());
        assert_eq!(sun.illumination(&Position::ORIGIN), 1.0);
        assert_eq!(sun.illumination(&Position::new(200.0, 0.0)), 1.0);

        let far = sun.illumination(&Position::new(450.0, 0.0));
        assert!((far - 0.5).abs() < 1e-5);

        assert_eq!(sun.illumination(&Position::new(0.0, 600.0)), 0.0);
        assert_eq!(sun.illumination(&Position::new(0.0, -5000.0)), 0.0);
    }

    #[test]
    fn test_illumination_decays_with_distance() {
        let sun = Sun::new(&SunConfig::default());
        let mut last = f32::MAX;
        for d in (300..=600).step_by(50) {
            let level = sun.illumination(&Position::new(d as f32, 0.0));
            assert!(level <= last);
            last = level;
        }
    }

    #[test]
    fn test_constant_without_seasons() {
        let mut sun = Sun::new(&SunConfig::default());
        for _ in 0..50 {
            sun.update();
        }
        assert_eq!(sun.power, 1.0);
    }

    #[test]
    fn test_seasonal_cycle() {
        let mut sun = Sun::new(&SunConfig {
            seasonal: true,
            season_period: 100,
            ..Default::default()
        });

        let mut min = f32::MAX;
        let mut max = f32::MIN;
        for _ in 0..100 {
            sun.update();
            min = min.min(sun.power);
            max = max.max(sun.power);
        }
        assert!((max - 0.85).abs() < 1e-3);
        assert!((min - 0.55).abs() < 1e-3);
        // Back to the start of the cycle
        assert!((sun.power - 0.7).abs() < 1e-5);
    }

    #[test]
    fn test_bearing() {
        let sun = Sun::new(&SunConfig::default());
        assert!(sun.bearing_from(&Position::ORIGIN).is_none());
        let bearing = sun.bearing_from(&Position::new(10.0, 0.0)).unwrap();
        assert!((bearing - std::f32::consts::PI).abs() < 1e-5);
    }
}
