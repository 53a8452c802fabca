//! Data-driven game balance
//!
//! Everything a designer would want to tweak without touching code: spawn
//! chances, item values, capture radii, launch and flight feel, payout rates.
//! Every section is `#[serde(default)]`, so a tuning file only needs the keys
//! it overrides.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Inclusive-exclusive range sampled with a uniform draw in [0, 1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub min: f32,
    pub max: f32,
}

impl Span {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn lerp(self, t: f32) -> f32 {
        self.min + (self.max - self.min) * t
    }
}

/// Procedural generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub star_chance: f32,
    /// No stars before this x (keeps the launch area clear)
    pub star_min_x: f32,
    pub rare_star_chance: f32,
    pub common_star_value: u32,
    pub rare_star_value: u32,
    pub space_star_chance: f32,
    pub space_star_value: u32,
    /// Space stars float at least this far above the terrain
    pub space_star_height: f32,
    pub crane_base_chance: f32,
    pub crane_chance_per_unit: f32,
    pub crane_max_chance: f32,
    pub crane_multiplier: f32,
    pub thermal_chance: f32,
    pub thermal_strength: Span,
    pub thermal_width: Span,
    pub wind_zone_chance: f32,
    pub wind_zone_min_x: f32,
    pub wind_zone_strength: Span,
    pub wind_zone_width: Span,
    pub cloud_chance: f32,
    pub shooting_star_interval_ticks: u32,
    pub shooting_star_chance: f32,
    pub shooting_star_lifetime_ticks: u32,
    /// Per-tick displacement of a shooting star
    pub shooting_star_velocity: Vec2,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self {
            star_chance: 0.5,
            star_min_x: 500.0,
            rare_star_chance: 0.2,
            common_star_value: 10,
            rare_star_value: 20,
            space_star_chance: 0.1,
            space_star_value: 50,
            space_star_height: 800.0,
            crane_base_chance: 0.03,
            crane_chance_per_unit: 0.000_002,
            crane_max_chance: 0.12,
            crane_multiplier: 2.0,
            thermal_chance: 0.15,
            thermal_strength: Span::new(0.0006, 0.0010),
            thermal_width: Span::new(60.0, 120.0),
            wind_zone_chance: 0.07,
            wind_zone_min_x: 3000.0,
            wind_zone_strength: Span::new(0.0003, 0.0008),
            wind_zone_width: Span::new(80.0, 160.0),
            cloud_chance: 0.3,
            shooting_star_interval_ticks: 120,
            shooting_star_chance: 0.35,
            shooting_star_lifetime_ticks: 300,
            shooting_star_velocity: Vec2::new(-6.0, 3.0),
        }
    }
}

impl WorldTuning {
    /// Crane chance grows with distance up to a cap
    pub fn crane_chance(&self, x: f32) -> f32 {
        (self.crane_base_chance + x.max(0.0) * self.crane_chance_per_unit)
            .min(self.crane_max_chance)
    }
}

/// Capture radii per collectible category (strict `<` test)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureTuning {
    pub star: f32,
    pub space_star: f32,
    pub crane: f32,
    pub shooting_star: f32,
}

impl Default for CaptureTuning {
    fn default() -> Self {
        Self {
            star: 40.0,
            space_star: 50.0,
            crane: 50.0,
            shooting_star: 60.0,
        }
    }
}

/// Launch gesture, ambient wind, camera and in-flight bonuses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightTuning {
    /// Shorter drags are discarded
    pub min_drag: f32,
    pub drag_power_divisor: f32,
    pub power_cap: f32,
    pub launch_velocity_scale: f32,
    pub min_launch_vx: f32,
    /// Upward bias: launch vy is never larger (less upward) than this
    pub max_launch_vy: f32,
    pub wind_interval_ms: f32,
    /// Full width of the ambient wind roll on each axis
    pub wind_force: Vec2,
    pub camera_smoothing: f32,
    pub multiplier_ticks: u32,
    pub boost_impulse: f32,
    pub boost_fuel_refill: f32,
    pub stop_speed: f32,
    pub ground_proximity: f32,
}

impl Default for FlightTuning {
    fn default() -> Self {
        Self {
            min_drag: 30.0,
            drag_power_divisor: 80.0,
            power_cap: 4.0,
            launch_velocity_scale: 0.1,
            min_launch_vx: 5.0,
            max_launch_vy: -2.0,
            wind_interval_ms: 2000.0,
            wind_force: Vec2::new(0.0005, 0.0003),
            camera_smoothing: 0.08,
            multiplier_ticks: 300,
            boost_impulse: 8.0,
            boost_fuel_refill: 30.0,
            stop_speed: 0.8,
            ground_proximity: 40.0,
        }
    }
}

/// Run payout rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyTuning {
    pub distance_rate: f32,
    pub altitude_rate: f32,
}

impl Default for EconomyTuning {
    fn default() -> Self {
        Self {
            distance_rate: 0.15,
            altitude_rate: 0.05,
        }
    }
}

impl EconomyTuning {
    /// Run earnings from distance, altitude (meters) and collected currency
    pub fn earnings(&self, distance: u32, altitude: u32, collected: u64) -> u64 {
        let from_distance = (distance as f32 * self.distance_rate).floor() as u64;
        let from_altitude = (altitude as f32 * self.altitude_rate).floor() as u64;
        from_distance + from_altitude + collected
    }
}

/// Complete balance table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldTuning,
    pub capture: CaptureTuning,
    pub flight: FlightTuning,
    pub economy: EconomyTuning,
}

impl Tuning {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse an optional tuning document, keeping defaults when it is absent or bad
    pub fn load_or_default(json: Option<&str>) -> Self {
        match json.map(Self::from_json) {
            Some(Ok(tuning)) => {
                log::info!("Loaded tuning overrides");
                tuning
            }
            Some(Err(err)) => {
                log::warn!("Bad tuning file, using defaults: {err}");
                Self::default()
            }
            None => Self::default(),
        }
    }
}
