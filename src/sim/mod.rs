//! Flight simulation
//!
//! All gameplay logic lives here, free of rendering and platform code:
//! - Seeded RNG only (world layout and wind are reproducible from a seed)
//! - Elapsed time clamped per step
//! - Stable iteration order (arena slots, body handles)

pub mod effects;
pub mod game;
pub mod index;
pub mod interaction;
pub mod physics;
pub mod player;
pub mod state;
pub mod theme;
pub mod world;

pub use effects::{FloatingText, FloatingTexts};
pub use game::Game;
pub use interaction::InteractionResult;
pub use physics::{BodyDesc, BodyHandle, BodyState, PhysicsEngine, Shape, SimplePhysics};
pub use player::{Player, TrailPoint};
pub use state::{
    Camera, Control, Controls, DragGesture, GameEvent, GamePhase, HudData, Key, LaunchOutcome,
    LaunchPreview, RunState, RunSummary, StateChange, TickOutcome, Wind,
};
pub use theme::{THEMES, Theme, theme_at};
pub use world::{
    Cloud, Collectible, CollectibleKind, CollectibleSet, FieldKind, ForceField, ShootingStar,
    TerrainSegment, World,
};
