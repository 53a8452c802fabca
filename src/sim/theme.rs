//! Location themes
//!
//! The world changes scenery as the player gets further out. Each theme sets
//! terrain and sky colors and the wave mix that shapes the terrain.

/// One sine component of the terrain profile: `amplitude * sin(x * frequency)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wave {
    pub frequency: f32,
    pub amplitude: f32,
}

const fn wave(frequency: f32, amplitude: f32) -> Wave {
    Wave {
        frequency,
        amplitude,
    }
}

/// A distance-keyed scenery/terrain parameter set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    /// Active from this x onward
    pub threshold: f32,
    pub terrain_color: &'static str,
    pub sky_color: &'static str,
    pub waves: [Wave; 2],
}

impl Theme {
    /// Terrain elevation above the baseline at `x`
    pub fn elevation(&self, x: f32) -> f32 {
        self.waves
            .iter()
            .map(|w| w.amplitude * (x * w.frequency).sin())
            .sum()
    }

    /// Largest possible elevation magnitude
    pub fn max_elevation(&self) -> f32 {
        self.waves.iter().map(|w| w.amplitude).sum()
    }
}

/// Ordered by threshold
pub const THEMES: [Theme; 5] = [
    Theme {
        name: "Meadow",
        threshold: 0.0,
        terrain_color: "#90EE90",
        sky_color: "#87CEEB",
        waves: [wave(0.005, 60.0), wave(0.013, 15.0)],
    },
    Theme {
        name: "Desert",
        threshold: 6000.0,
        terrain_color: "#E8C872",
        sky_color: "#F4C27A",
        waves: [wave(0.004, 40.0), wave(0.02, 8.0)],
    },
    Theme {
        name: "Mountains",
        threshold: 15000.0,
        terrain_color: "#8B8B83",
        sky_color: "#B0C4DE",
        waves: [wave(0.0025, 140.0), wave(0.009, 35.0)],
    },
    Theme {
        name: "Ocean",
        threshold: 25000.0,
        terrain_color: "#1E90FF",
        sky_color: "#5FA9D8",
        waves: [wave(0.03, 10.0), wave(0.011, 6.0)],
    },
    Theme {
        name: "Stratosphere",
        threshold: 40000.0,
        terrain_color: "#4B0082",
        sky_color: "#191970",
        waves: [wave(0.006, 90.0), wave(0.017, 20.0)],
    },
];

/// The last theme whose threshold is at or before `x`
pub fn theme_at(x: f32) -> &'static Theme {
    THEMES
        .iter()
        .rev()
        .find(|t| t.threshold <= x)
        .unwrap_or(&THEMES[0])
}
