//! Paper Glide - A paper-airplane fling-and-glide arcade game
//!
//! Core modules:
//! - `sim`: Flight simulation (physics capability, world generation, interactions, session)
//! - `progression`: Persistent currency and upgrades
//! - `renderer`: 2D canvas presentation
//! - `platform`: Browser/native platform abstraction
//! - `persistence`: Save/load of the progression snapshot
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod persistence;
pub mod platform;
pub mod progression;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{Error, Result};
pub use progression::{Progression, UpgradeKind, Upgrades};
pub use settings::Settings;
pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Reference physics step (ms). Velocities are measured per reference step.
    pub const BASE_DELTA_MS: f32 = 1000.0 / 60.0;
    /// Largest elapsed time a single physics step may consume (ms)
    pub const MAX_STEP_MS: f32 = 33.0;

    /// World gravity direction and magnitude (y points down)
    pub const GRAVITY: glam::Vec2 = glam::Vec2::new(0.0, 0.35);
    /// Gravity is scaled into force units like Matter does
    pub const GRAVITY_SCALE: f32 = 0.001;

    /// Terrain generation unit width
    pub const CHUNK_WIDTH: f32 = 300.0;
    /// Depth of each terrain collision block
    pub const GROUND_DEPTH: f32 = 200.0;
    /// Terrain baseline sits this far above the bottom of the world
    pub const GROUND_BASE_OFFSET: f32 = 150.0;
    /// Terrain must exist this far ahead of the player
    pub const LOOKAHEAD: f32 = 2500.0;
    /// Chunks generated on world creation/reset
    pub const INITIAL_CHUNKS: usize = 20;
    /// Spatial index bucket width for collectibles
    pub const BUCKET_WIDTH: f32 = 300.0;

    /// World units per displayed meter (distance/altitude)
    pub const UNITS_PER_METER: f32 = 10.0;
    /// Falling this far below the world height ends the run
    pub const LOWER_BOUNDARY_MARGIN: f32 = 100.0;

    /// Glider body dimensions
    pub const PLAYER_WIDTH: f32 = 50.0;
    pub const PLAYER_HEIGHT: f32 = 25.0;
    pub const PLAYER_SLOPE: f32 = 0.3;
    /// Spawn position: x, and height above the bottom of the world
    pub const PLAYER_START_X: f32 = 150.0;
    pub const PLAYER_START_LIFT: f32 = 200.0;
    /// Player trail points kept for rendering
    pub const TRAIL_LENGTH: usize = 30;

    /// Default viewport in pixels (world height == viewport height)
    pub const DEFAULT_VIEWPORT: glam::Vec2 = glam::Vec2::new(1280.0, 720.0);

    /// Floating "+10" style labels
    pub const FLOATING_TEXT_CAPACITY: usize = 32;
    pub const FLOATING_TEXT_TICKS: u32 = 60;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit heading vector for an angle (radians, y down)
#[inline]
pub fn heading(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_normalize_angle_wraps() {
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-4);
        assert!((normalize_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-4);
        assert_eq!(normalize_angle(0.5), 0.5);
    }
}
