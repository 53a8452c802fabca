//! Session state and core simulation types
//!
//! Run-scoped state, camera, ambient wind, input and the events the session
//! emits for presentation.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::consts::{BASE_DELTA_MS, GRAVITY, GRAVITY_SCALE, UNITS_PER_METER};
use crate::progression::UpgradeKind;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Menu/shop, no glider yet
    Idle,
    /// Glider placed, waiting for a drag gesture
    Launching,
    /// In the air
    Flying,
    /// Run over and settled
    Ended,
}

impl GamePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            GamePhase::Idle => "idle",
            GamePhase::Launching => "launching",
            GamePhase::Flying => "flying",
            GamePhase::Ended => "ended",
        }
    }

    /// The only legal transitions
    pub fn can_transition_to(self, next: GamePhase) -> bool {
        matches!(
            (self, next),
            (GamePhase::Idle, GamePhase::Launching)
                | (GamePhase::Launching, GamePhase::Flying)
                | (GamePhase::Flying, GamePhase::Ended)
                | (GamePhase::Ended, GamePhase::Launching)
        )
    }
}

/// Continuous controls held down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    PitchUp,
    PitchDown,
    Boost,
}

/// Held-control set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub pitch_up: bool,
    pub pitch_down: bool,
    pub boost: bool,
}

impl Controls {
    pub fn set(&mut self, control: Control, held: bool) {
        match control {
            Control::PitchUp => self.pitch_up = held,
            Control::PitchDown => self.pitch_down = held,
            Control::Boost => self.boost = held,
        }
    }
}

/// Keyboard keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Control(Control),
    Restart,
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "w" | "arrowup" => Some(Key::Control(Control::PitchUp)),
            "s" | "arrowdown" => Some(Key::Control(Control::PitchDown)),
            " " | "space" | "spacebar" => Some(Key::Control(Control::Boost)),
            "r" => Some(Key::Restart),
            _ => None,
        }
    }
}

/// A press-drag-release launch gesture (pixel space)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragGesture {
    pub start: Vec2,
    pub end: Vec2,
}

impl DragGesture {
    pub fn new(start: Vec2) -> Self {
        Self { start, end: start }
    }

    /// Pull-back vector: the glider flies opposite to the drag
    pub fn pull(&self) -> Vec2 {
        self.start - self.end
    }

    pub fn distance(&self) -> f32 {
        self.pull().length()
    }
}

/// Aim indicator while a drag is in progress
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchPreview {
    pub drag: DragGesture,
    /// Velocity the glider would leave with
    pub velocity: Vec2,
    /// Drag power over its cap, in [0, 1]
    pub power_fraction: f32,
    /// Releasing now would launch
    pub armed: bool,
}

impl LaunchPreview {
    pub fn power_percent(&self) -> u32 {
        (self.power_fraction * 100.0).floor() as u32
    }

    /// Drag-free ballistic path from `origin`, one point per reference step
    pub fn trajectory(&self, origin: Vec2, steps: usize) -> Vec<Vec2> {
        let gravity = GRAVITY * GRAVITY_SCALE * BASE_DELTA_MS * BASE_DELTA_MS;
        let mut pos = origin;
        let mut vel = self.velocity;
        (0..steps)
            .map(|_| {
                vel += gravity;
                pos += vel;
                pos
            })
            .collect()
    }
}

/// Per-run accumulators, created at launch and settled once at the end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Meters travelled (tracks position directly)
    pub distance: u32,
    /// Current altitude in meters
    pub altitude: u32,
    /// Best altitude in meters (never decreases)
    pub max_altitude: u32,
    /// Collected currency, already multiplied
    pub stars_collected: u64,
    /// Current payout for the run
    pub money_earned: u64,
    pub multiplier: f32,
    pub multiplier_ticks: u32,
    pub ticks: u64,
    /// Set once the earnings have been credited
    pub settled: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            distance: 0,
            altitude: 0,
            max_altitude: 0,
            stars_collected: 0,
            money_earned: 0,
            multiplier: 1.0,
            multiplier_ticks: 0,
            ticks: 0,
            settled: false,
        }
    }
}

impl RunState {
    /// Update distance/altitude from a world position
    pub fn record_position(&mut self, pos: Vec2, world_height: f32) {
        self.distance = (pos.x / UNITS_PER_METER).floor().max(0.0) as u32;
        self.altitude = ((world_height - pos.y) / UNITS_PER_METER).floor().max(0.0) as u32;
        self.max_altitude = self.max_altitude.max(self.altitude);
    }

    /// Add collected currency at the current multiplier
    pub fn collect(&mut self, currency: u32) {
        if currency > 0 {
            self.stars_collected += (currency as f32 * self.multiplier).floor() as u64;
        }
    }

    /// Stack a multiplier bonus and restart its timer
    pub fn add_multiplier(&mut self, delta: f32, duration_ticks: u32) {
        if delta > 0.0 {
            self.multiplier += delta;
            self.multiplier_ticks = duration_ticks;
        }
    }

    /// One tick of multiplier decay: back to exactly 1 when the timer runs out
    pub fn decay_multiplier(&mut self) {
        if self.multiplier_ticks > 0 {
            self.multiplier_ticks -= 1;
            if self.multiplier_ticks == 0 {
                self.multiplier = 1.0;
            }
        }
    }
}

/// Smoothed follow camera (top-left corner in world space)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera {
    pub pos: Vec2,
}

impl Camera {
    /// Where the camera wants to be for a player at `player` on `viewport`
    pub fn target_for(player: Vec2, viewport: Vec2) -> Vec2 {
        Vec2::new(
            player.x - viewport.x / 3.0,
            (player.y - viewport.y / 2.0).min(viewport.y / 4.0),
        )
    }

    /// Exponential smoothing toward `target`
    pub fn follow(&mut self, target: Vec2, smoothing: f32) {
        self.pos += (target - self.pos) * smoothing;
    }
}

/// Ambient wind, re-rolled on a fixed interval
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Wind {
    pub force: Vec2,
    timer_ms: f32,
}

impl Wind {
    /// Advance the timer; re-roll the force once the interval has passed.
    /// Returns true on a re-roll.
    pub fn update(
        &mut self,
        dt_ms: f32,
        interval_ms: f32,
        range: Vec2,
        rng: &mut impl Rng,
    ) -> bool {
        self.timer_ms += dt_ms;
        if self.timer_ms <= interval_ms {
            return false;
        }
        self.timer_ms = 0.0;
        self.force = Vec2::new(
            (rng.random::<f32>() - 0.5) * range.x,
            (rng.random::<f32>() - 0.5) * range.y,
        );
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Result of releasing a drag gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LaunchOutcome {
    /// Glider is flying with this initial velocity
    Launched { velocity: Vec2 },
    /// Drag too short; waiting for a new gesture
    Discarded,
    /// No gesture in progress or not in the launch phase
    Ignored,
}

/// Whether the scheduler should keep ticking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// This tick ended the run
    Ended,
    /// Not flying (or a stale loop); nothing happened
    Stopped,
}

/// Phase notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    Launching,
    Flying,
    GameOver,
    Restart,
}

/// Per-tick HUD payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HudData {
    pub distance: u32,
    pub altitude: u32,
    pub balance: u64,
    /// Remaining boost fuel in [0, 1]
    pub fuel_fraction: f32,
    pub multiplier: f32,
}

/// End-of-run summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub distance: u32,
    pub altitude: u32,
    pub collected: u64,
    pub earned: u64,
    pub total: u64,
}

/// Everything the session tells presentation
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    StateChanged(StateChange),
    Hud(HudData),
    RunSummary(RunSummary),
    Purchased {
        kind: UpgradeKind,
        level: u32,
        cost: u64,
    },
}
