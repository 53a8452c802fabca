//! Procedural world
//!
//! The world is an endless strip generated in fixed-width chunks ahead of the
//! player. Each chunk gets a static terrain block plus independent rolls for
//! collectibles, force fields and decorations. Chunks are only ever appended;
//! nothing is regenerated or removed short of a full [`World::reset`].
//!
//! The world owns every entity it spawns, including the terrain bodies in the
//! physics engine. Interaction code may flip `collected` flags but never adds
//! or removes entities.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::index::XIndex;
use super::physics::{BodyDesc, BodyHandle, PhysicsEngine};
use super::theme::{Theme, theme_at};
use crate::consts::*;
use crate::tuning::WorldTuning;

/// Ground friction (the glider's own friction is far lower and wins)
const GROUND_FRICTION: f32 = 0.8;

/// One chunk of terrain
#[derive(Debug, Clone)]
pub struct TerrainSegment {
    /// Left edge of the chunk
    pub x: f32,
    /// Top surface height (y down)
    pub surface_y: f32,
    pub theme: &'static Theme,
    pub body: BodyHandle,
}

impl TerrainSegment {
    pub fn color(&self) -> &'static str {
        self.theme.terrain_color
    }
}

/// Collectible categories kept in their own arenas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectibleKind {
    Star,
    RareStar,
    SpaceStar,
    Crane,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collectible {
    pub id: u32,
    pub kind: CollectibleKind,
    pub pos: Vec2,
    /// Currency awarded on capture
    pub value: u32,
    /// Multiplier increment awarded on capture (cranes)
    pub multiplier: f32,
    /// One-way: false -> true
    pub collected: bool,
}

/// An arena of one collectible category plus its spatial index.
///
/// Collected entries stay in the arena (rendered as absent); only
/// [`World::reset`] empties it.
#[derive(Debug, Clone, Default)]
pub struct CollectibleSet {
    items: Vec<Collectible>,
    index: XIndex,
}

impl CollectibleSet {
    fn push(&mut self, item: Collectible) {
        self.index.insert(self.items.len(), item.pos.x);
        self.items.push(item);
    }

    fn clear(&mut self) {
        self.items.clear();
        self.index.clear();
    }

    pub fn items(&self) -> &[Collectible] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Arena slots that may lie within `radius` of `pos`
    pub fn candidates(&self, pos: Vec2, radius: f32) -> Vec<usize> {
        self.index.near(pos.x, radius)
    }

    /// Items whose x falls roughly within `[x_min, x_max]` (for culling)
    pub fn in_span(&self, x_min: f32, x_max: f32) -> impl Iterator<Item = &Collectible> {
        self.index
            .span(x_min, x_max)
            .into_iter()
            .map(move |slot| &self.items[slot])
    }

    pub fn get(&self, slot: usize) -> Option<&Collectible> {
        self.items.get(slot)
    }

    /// Flip the collected flag. Returns the item only on the first capture.
    pub fn mark_collected(&mut self, slot: usize) -> Option<&Collectible> {
        let item = self.items.get_mut(slot)?;
        if item.collected {
            return None;
        }
        item.collected = true;
        Some(item)
    }

    /// Sum of values of everything collected so far
    pub fn collected_value(&self) -> u64 {
        self.items
            .iter()
            .filter(|c| c.collected)
            .map(|c| c.value as u64)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Lift
    Thermal,
    /// Hazard push, up or down
    WindZone,
}

/// A vertical force column
#[derive(Debug, Clone, PartialEq)]
pub struct ForceField {
    pub kind: FieldKind,
    /// Column centre
    pub x: f32,
    pub width: f32,
    /// Vertical force at the centre (negative = up)
    pub strength: f32,
}

impl ForceField {
    /// Force on a body at horizontal position `x`, with linear falloff
    pub fn force_at(&self, x: f32) -> Option<Vec2> {
        let dx = (x - self.x).abs();
        if dx >= self.width {
            return None;
        }
        let falloff = 1.0 - dx / self.width;
        Some(Vec2::new(0.0, self.strength * falloff))
    }
}

/// Background decoration, no physics
#[derive(Debug, Clone, PartialEq)]
pub struct Cloud {
    pub pos: Vec2,
    pub size: f32,
    /// Horizontal parallax drift per tick
    pub drift: f32,
}

/// Transient bonus streaking across the sky
#[derive(Debug, Clone, PartialEq)]
pub struct ShootingStar {
    pub id: u32,
    pub pos: Vec2,
    /// Per-tick displacement
    pub vel: Vec2,
    pub ticks_left: u32,
    pub collected: bool,
}

/// The procedural world
#[derive(Debug, Clone)]
pub struct World {
    rng: Pcg32,
    tuning: WorldTuning,
    world_height: f32,
    viewport_width: f32,
    segments: Vec<TerrainSegment>,
    stars: CollectibleSet,
    space_stars: CollectibleSet,
    cranes: CollectibleSet,
    fields: Vec<ForceField>,
    field_index: XIndex,
    max_field_width: f32,
    clouds: Vec<Cloud>,
    shooting_stars: Vec<ShootingStar>,
    shooting_star_timer: u32,
    next_id: u32,
}

impl World {
    /// Create a world and generate the initial chunk span
    pub fn new(
        seed: u64,
        tuning: WorldTuning,
        viewport: Vec2,
        physics: &mut dyn PhysicsEngine,
    ) -> Self {
        let mut world = Self {
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            world_height: viewport.y,
            viewport_width: viewport.x,
            segments: Vec::new(),
            stars: CollectibleSet::default(),
            space_stars: CollectibleSet::default(),
            cranes: CollectibleSet::default(),
            fields: Vec::new(),
            field_index: XIndex::new(),
            max_field_width: 0.0,
            clouds: Vec::new(),
            shooting_stars: Vec::new(),
            shooting_star_timer: 0,
            next_id: 1,
        };
        world.generate_initial(physics);
        world
    }

    fn generate_initial(&mut self, physics: &mut dyn PhysicsEngine) {
        for _ in 0..INITIAL_CHUNKS {
            self.generate_chunk(physics);
        }
        self.ensure_generated_ahead(physics, 0.0);
        log::debug!(
            "World generated: {} chunks, {} stars, {} fields",
            self.segments.len(),
            self.stars.len(),
            self.fields.len()
        );
    }

    /// Drop everything and re-roll the initial span.
    ///
    /// The RNG carries on from where it was, so the new layout differs.
    pub fn reset(&mut self, physics: &mut dyn PhysicsEngine) {
        for segment in self.segments.drain(..) {
            physics.remove_body(segment.body);
        }
        self.stars.clear();
        self.space_stars.clear();
        self.cranes.clear();
        self.fields.clear();
        self.field_index.clear();
        self.max_field_width = 0.0;
        self.clouds.clear();
        self.shooting_stars.clear();
        self.shooting_star_timer = 0;
        self.generate_initial(physics);
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    #[inline]
    fn roll(&mut self) -> f32 {
        self.rng.random::<f32>()
    }

    /// Right edge of generated terrain
    pub fn terrain_end(&self) -> f32 {
        self.segments.len() as f32 * CHUNK_WIDTH
    }

    /// Extend terrain until its right edge reaches `player_x + LOOKAHEAD`.
    /// Returns the number of chunks added.
    pub fn ensure_generated_ahead(
        &mut self,
        physics: &mut dyn PhysicsEngine,
        player_x: f32,
    ) -> usize {
        let target = player_x + LOOKAHEAD;
        let mut added = 0;
        while self.terrain_end() < target {
            self.generate_chunk(physics);
            added += 1;
        }
        added
    }

    /// Terrain surface for a chunk starting at `x`
    fn surface_for_chunk(&self, x: f32) -> f32 {
        self.baseline() - theme_at(x).elevation(x)
    }

    /// Flat terrain height before theme elevation
    pub fn baseline(&self) -> f32 {
        self.world_height - GROUND_BASE_OFFSET
    }

    /// Append one chunk and roll its contents
    fn generate_chunk(&mut self, physics: &mut dyn PhysicsEngine) {
        let x = self.terrain_end();
        let theme = theme_at(x);
        let surface_y = self.surface_for_chunk(x);

        let body = physics.create_body(&BodyDesc::static_rect(
            Vec2::new(x + CHUNK_WIDTH * 0.5, surface_y + GROUND_DEPTH * 0.5),
            CHUNK_WIDTH,
            GROUND_DEPTH,
            GROUND_FRICTION,
        ));
        self.segments.push(TerrainSegment {
            x,
            surface_y,
            theme,
            body,
        });

        // Rolls happen in a fixed order so a seeded world is reproducible.
        // Each gate roll is drawn even when its distance condition fails.
        let star_roll = self.roll();
        if star_roll < self.tuning.star_chance && x > self.tuning.star_min_x {
            let sx = x + self.roll() * 200.0;
            let lift = self.roll() * 150.0;
            let rare = self.roll() < self.tuning.rare_star_chance;
            let (kind, value, band) = if rare {
                (CollectibleKind::RareStar, self.tuning.rare_star_value, 250.0)
            } else {
                (CollectibleKind::Star, self.tuning.common_star_value, 120.0)
            };
            let id = self.next_entity_id();
            self.stars.push(Collectible {
                id,
                kind,
                pos: Vec2::new(sx, surface_y - band - lift),
                value,
                multiplier: 0.0,
                collected: false,
            });
        }

        let crane_roll = self.roll();
        if crane_roll < self.tuning.crane_chance(x) {
            let cx = x + self.roll() * 200.0;
            let cy = surface_y - 200.0 - self.roll() * 200.0;
            let id = self.next_entity_id();
            self.cranes.push(Collectible {
                id,
                kind: CollectibleKind::Crane,
                pos: Vec2::new(cx, cy),
                value: 0,
                multiplier: self.tuning.crane_multiplier,
                collected: false,
            });
        }

        let space_roll = self.roll();
        if space_roll < self.tuning.space_star_chance {
            let sx = x + self.roll() * CHUNK_WIDTH;
            let sy = surface_y - self.tuning.space_star_height - self.roll() * 600.0;
            let id = self.next_entity_id();
            self.space_stars.push(Collectible {
                id,
                kind: CollectibleKind::SpaceStar,
                pos: Vec2::new(sx, sy),
                value: self.tuning.space_star_value,
                multiplier: 0.0,
                collected: false,
            });
        }

        let thermal_roll = self.roll();
        if thermal_roll < self.tuning.thermal_chance {
            let fx = x + self.roll() * CHUNK_WIDTH;
            let (width_roll, strength_roll) = (self.roll(), self.roll());
            let width = self.tuning.thermal_width.lerp(width_roll);
            let strength = -self.tuning.thermal_strength.lerp(strength_roll);
            self.push_field(ForceField {
                kind: FieldKind::Thermal,
                x: fx,
                width,
                strength,
            });
        }

        let wind_roll = self.roll();
        if wind_roll < self.tuning.wind_zone_chance && x > self.tuning.wind_zone_min_x {
            let fx = x + self.roll() * CHUNK_WIDTH;
            let (width_roll, strength_roll) = (self.roll(), self.roll());
            let width = self.tuning.wind_zone_width.lerp(width_roll);
            let magnitude = self.tuning.wind_zone_strength.lerp(strength_roll);
            let sign = if self.roll() < 0.5 { -1.0 } else { 1.0 };
            self.push_field(ForceField {
                kind: FieldKind::WindZone,
                x: fx,
                width,
                strength: magnitude * sign,
            });
        }

        let cloud_roll = self.roll();
        if cloud_roll < self.tuning.cloud_chance {
            let pos = Vec2::new(x + self.roll() * CHUNK_WIDTH, 100.0 + self.roll() * 300.0);
            let size = 40.0 + self.roll() * 60.0;
            let drift = 0.1 + self.roll() * 0.3;
            self.clouds.push(Cloud { pos, size, drift });
        }
    }

    fn push_field(&mut self, field: ForceField) {
        self.field_index.insert(self.fields.len(), field.x);
        self.max_field_width = self.max_field_width.max(field.width);
        self.fields.push(field);
    }

    /// Tick-based transients: drift clouds, spawn, move and expire shooting stars
    pub fn update_transients(&mut self, player_pos: Vec2) {
        self.shooting_star_timer += 1;
        if self.shooting_star_timer >= self.tuning.shooting_star_interval_ticks {
            self.shooting_star_timer = 0;
            if self.roll() < self.tuning.shooting_star_chance {
                let pos = Vec2::new(
                    player_pos.x + self.viewport_width * 0.8 + self.roll() * 400.0,
                    player_pos.y - 300.0 - self.roll() * 200.0,
                );
                let id = self.next_entity_id();
                self.shooting_stars.push(ShootingStar {
                    id,
                    pos,
                    vel: self.tuning.shooting_star_velocity,
                    ticks_left: self.tuning.shooting_star_lifetime_ticks,
                    collected: false,
                });
            }
        }

        for cloud in &mut self.clouds {
            cloud.pos.x -= cloud.drift;
        }

        for star in &mut self.shooting_stars {
            star.pos += star.vel;
            star.ticks_left = star.ticks_left.saturating_sub(1);
        }
        let floor = self.world_height + LOWER_BOUNDARY_MARGIN;
        self.shooting_stars
            .retain(|s| s.ticks_left > 0 && s.pos.y <= floor);
    }

    /// Net field force at `pos`
    pub fn field_force_at(&self, pos: Vec2) -> Vec2 {
        self.field_index
            .near(pos.x, self.max_field_width)
            .into_iter()
            .filter_map(|slot| self.fields[slot].force_at(pos.x))
            .sum()
    }

    /// Push `body` with every field it is inside. Overlapping fields stack
    /// without clamping. Returns the total force applied.
    pub fn apply_fields(&self, physics: &mut dyn PhysicsEngine, body: BodyHandle) -> Vec2 {
        let Some(state) = physics.body(body) else {
            return Vec2::ZERO;
        };
        let mut total = Vec2::ZERO;
        for slot in self.field_index.near(state.position.x, self.max_field_width) {
            if let Some(force) = self.fields[slot].force_at(state.position.x) {
                physics.apply_force(body, state.position, force);
                total += force;
            }
        }
        total
    }

    /// Terrain surface height under `x`
    pub fn surface_at(&self, x: f32) -> f32 {
        if x >= 0.0 {
            let chunk = (x / CHUNK_WIDTH) as usize;
            if let Some(segment) = self.segments.get(chunk) {
                return segment.surface_y;
            }
        }
        self.surface_for_chunk((x / CHUNK_WIDTH).floor() * CHUNK_WIDTH)
    }

    pub fn theme_at(&self, x: f32) -> &'static Theme {
        theme_at(x)
    }

    /// Currency value of every collected star, derived from the arenas
    pub fn collected_star_value(&self) -> u64 {
        self.stars.collected_value() + self.space_stars.collected_value()
    }

    pub fn world_height(&self) -> f32 {
        self.world_height
    }

    pub fn segments(&self) -> &[TerrainSegment] {
        &self.segments
    }

    /// Segments overlapping `[x_min, x_max]`
    pub fn segments_in_span(&self, x_min: f32, x_max: f32) -> &[TerrainSegment] {
        let first = ((x_min / CHUNK_WIDTH).floor().max(0.0) as usize).min(self.segments.len());
        let last = ((x_max / CHUNK_WIDTH).floor().max(0.0) as usize + 1).min(self.segments.len());
        &self.segments[first..last.max(first)]
    }

    pub fn stars(&self) -> &CollectibleSet {
        &self.stars
    }

    pub fn space_stars(&self) -> &CollectibleSet {
        &self.space_stars
    }

    pub fn cranes(&self) -> &CollectibleSet {
        &self.cranes
    }

    pub(crate) fn stars_mut(&mut self) -> &mut CollectibleSet {
        &mut self.stars
    }

    pub(crate) fn space_stars_mut(&mut self) -> &mut CollectibleSet {
        &mut self.space_stars
    }

    pub(crate) fn cranes_mut(&mut self) -> &mut CollectibleSet {
        &mut self.cranes
    }

    pub fn shooting_stars(&self) -> &[ShootingStar] {
        &self.shooting_stars
    }

    pub(crate) fn shooting_stars_mut(&mut self) -> &mut [ShootingStar] {
        &mut self.shooting_stars
    }

    pub fn fields(&self) -> &[ForceField] {
        &self.fields
    }

    pub fn clouds(&self) -> &[Cloud] {
        &self.clouds
    }

    /// Test/debug hook: place a collectible directly
    #[cfg(test)]
    pub(crate) fn insert_collectible(&mut self, kind: CollectibleKind, pos: Vec2) -> u32 {
        let id = self.next_entity_id();
        let (value, multiplier) = match kind {
            CollectibleKind::Star => (self.tuning.common_star_value, 0.0),
            CollectibleKind::RareStar => (self.tuning.rare_star_value, 0.0),
            CollectibleKind::SpaceStar => (self.tuning.space_star_value, 0.0),
            CollectibleKind::Crane => (0, self.tuning.crane_multiplier),
        };
        let item = Collectible {
            id,
            kind,
            pos,
            value,
            multiplier,
            collected: false,
        };
        match kind {
            CollectibleKind::Star | CollectibleKind::RareStar => self.stars.push(item),
            CollectibleKind::SpaceStar => self.space_stars.push(item),
            CollectibleKind::Crane => self.cranes.push(item),
        }
        id
    }

    #[cfg(test)]
    pub(crate) fn insert_field(&mut self, field: ForceField) {
        self.push_field(field);
    }

    #[cfg(test)]
    pub(crate) fn insert_shooting_star(&mut self, pos: Vec2) {
        let id = self.next_entity_id();
        self.shooting_stars.push(ShootingStar {
            id,
            pos,
            vel: Vec2::ZERO,
            ticks_left: self.tuning.shooting_star_lifetime_ticks,
            collected: false,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::physics::{Shape, SimplePhysics};
    use proptest::prelude::*;

    fn world_with(seed: u64, tuning: WorldTuning) -> (World, SimplePhysics) {
        let mut physics = SimplePhysics::new();
        let world = World::new(seed, tuning, DEFAULT_VIEWPORT, &mut physics);
        (world, physics)
    }

    fn glider(physics: &mut SimplePhysics, pos: Vec2) -> BodyHandle {
        physics.create_body(&BodyDesc {
            shape: Shape::Rect {
                width: 10.0,
                height: 10.0,
            },
            position: pos,
            is_static: false,
            density: 0.001,
            friction: 0.0,
            friction_air: 0.0,
            restitution: 0.0,
        })
    }

    #[test]
    fn test_initial_generation() {
        let (world, physics) = world_with(1, WorldTuning::default());
        assert_eq!(world.segments().len(), INITIAL_CHUNKS);
        assert_eq!(physics.body_count(), INITIAL_CHUNKS);
        assert_eq!(world.segments()[0].x, 0.0);
        // x = 0 sits exactly on the baseline
        assert_eq!(world.segments()[0].surface_y, world.baseline());
    }

    #[test]
    fn test_ensure_generated_ahead_keeps_lookahead() {
        let (mut world, mut physics) = world_with(2, WorldTuning::default());
        assert_eq!(world.ensure_generated_ahead(&mut physics, 100.0), 0);

        let added = world.ensure_generated_ahead(&mut physics, 10_000.0);
        assert!(added > 0);
        assert!(world.terrain_end() >= 10_000.0 + LOOKAHEAD);
        assert!(world.terrain_end() - CHUNK_WIDTH < 10_000.0 + LOOKAHEAD);
        assert_eq!(physics.body_count(), world.segments().len());
    }

    #[test]
    fn test_star_rolls_position_then_height_then_tier() {
        let tuning = WorldTuning {
            star_chance: 1.0,
            star_min_x: -1.0,
            rare_star_chance: 0.5,
            ..Default::default()
        };
        let (world, _) = world_with(31, tuning);
        let first = &world.stars().items()[0];

        let mut rng = Pcg32::seed_from_u64(31);
        let _gate: f32 = rng.random();
        let (pos_roll, height_roll, tier_roll): (f32, f32, f32) =
            (rng.random(), rng.random(), rng.random());
        let (kind, band) = if tier_roll < 0.5 {
            (CollectibleKind::RareStar, 250.0)
        } else {
            (CollectibleKind::Star, 120.0)
        };
        let surface = world.segments()[0].surface_y;
        assert_eq!(first.kind, kind);
        assert_eq!(first.pos.x, pos_roll * 200.0);
        assert_eq!(first.pos.y, surface - band - height_roll * 150.0);
    }

    #[test]
    fn test_same_seed_same_world() {
        let (mut a, mut pa) = world_with(77, WorldTuning::default());
        let (mut b, mut pb) = world_with(77, WorldTuning::default());
        a.ensure_generated_ahead(&mut pa, 20_000.0);
        b.ensure_generated_ahead(&mut pb, 20_000.0);
        assert_eq!(a.stars().items(), b.stars().items());
        assert_eq!(a.cranes().items(), b.cranes().items());
        assert_eq!(a.fields(), b.fields());
        assert_eq!(a.clouds(), b.clouds());
    }

    #[test]
    fn test_reset_rerolls_and_releases_bodies() {
        let tuning = WorldTuning {
            star_chance: 0.9,
            star_min_x: 0.0,
            ..Default::default()
        };
        let (mut world, mut physics) = world_with(5, tuning);
        world.ensure_generated_ahead(&mut physics, 30_000.0);
        let before: Vec<Vec2> = world.stars().items().iter().map(|s| s.pos).collect();

        world.reset(&mut physics);
        assert_eq!(world.segments().len(), INITIAL_CHUNKS);
        assert_eq!(physics.body_count(), INITIAL_CHUNKS);
        assert!(!world.stars().is_empty());
        let after: Vec<Vec2> = world.stars().items().iter().map(|s| s.pos).collect();
        assert_ne!(before[..after.len().min(before.len())], after[..]);
    }

    #[test]
    fn test_no_stars_near_launch_and_no_wind_early() {
        let (world, _) = world_with(9, WorldTuning::default());
        for star in world.stars().items() {
            assert!(star.pos.x > 500.0);
        }
        for field in world.fields() {
            if field.kind == FieldKind::WindZone {
                assert!(field.x > WorldTuning::default().wind_zone_min_x);
            }
        }
    }

    #[test]
    fn test_star_tiers_and_heights() {
        let tuning = WorldTuning {
            star_chance: 1.0,
            space_star_chance: 1.0,
            ..Default::default()
        };
        let (world, _) = world_with(11, tuning);
        assert!(!world.stars().is_empty());
        for star in world.stars().items() {
            let surface = world.surface_at(star.pos.x);
            match star.kind {
                CollectibleKind::Star => assert_eq!(star.value, 10),
                CollectibleKind::RareStar => assert_eq!(star.value, 20),
                other => panic!("unexpected {other:?} in star arena"),
            }
            assert!(star.pos.y < surface);
        }
        for star in world.space_stars().items() {
            assert_eq!(star.value, 50);
            assert!(star.pos.y < world.baseline() - 700.0);
        }
    }

    #[test]
    fn test_field_falloff_and_stacking() {
        let tuning = WorldTuning {
            thermal_chance: 0.0,
            wind_zone_chance: 0.0,
            ..Default::default()
        };
        let (mut world, mut physics) = world_with(3, tuning);
        world.insert_field(ForceField {
            kind: FieldKind::Thermal,
            x: 1000.0,
            width: 100.0,
            strength: -0.001,
        });
        world.insert_field(ForceField {
            kind: FieldKind::WindZone,
            x: 1050.0,
            width: 100.0,
            strength: -0.0005,
        });

        // Centre of the thermal, halfway into the wind zone
        let force = world.field_force_at(Vec2::new(1000.0, 0.0));
        assert!((force.y - (-0.001 - 0.00025)).abs() < 1e-7);

        // Edge of the thermal is excluded
        assert_eq!(world.field_force_at(Vec2::new(900.0, 0.0)), Vec2::ZERO);

        let body = glider(&mut physics, Vec2::new(1000.0, 0.0));
        let applied = world.apply_fields(&mut physics, body);
        assert_eq!(applied, force);
    }

    #[test]
    fn test_shooting_stars_spawn_move_and_expire() {
        let tuning = WorldTuning {
            shooting_star_interval_ticks: 1,
            shooting_star_chance: 1.0,
            shooting_star_lifetime_ticks: 3,
            ..Default::default()
        };
        let (mut world, _) = world_with(4, tuning);
        world.update_transients(Vec2::new(0.0, 300.0));
        assert_eq!(world.shooting_stars().len(), 1);
        let first = world.shooting_stars()[0].clone();
        assert_eq!(first.ticks_left, 2);
        assert!(first.pos.x > DEFAULT_VIEWPORT.x * 0.8 - 10.0);

        world.update_transients(Vec2::new(0.0, 300.0));
        let moved = world
            .shooting_stars()
            .iter()
            .find(|s| s.id == first.id)
            .unwrap();
        assert_eq!(moved.pos, first.pos + Vec2::new(-6.0, 3.0));

        world.update_transients(Vec2::new(0.0, 300.0));
        assert!(world.shooting_stars().iter().all(|s| s.id != first.id));
    }

    #[test]
    fn test_shooting_stars_removed_below_world() {
        let tuning = WorldTuning {
            shooting_star_interval_ticks: u32::MAX,
            ..Default::default()
        };
        let (mut world, _) = world_with(4, tuning);
        let below = DEFAULT_VIEWPORT.y + LOWER_BOUNDARY_MARGIN + 1.0;
        world.insert_shooting_star(Vec2::new(0.0, below));
        world.update_transients(Vec2::ZERO);
        assert!(world.shooting_stars().is_empty());
    }

    #[test]
    fn test_surface_at_and_segments_in_span() {
        let (world, _) = world_with(8, WorldTuning::default());
        let seg = &world.segments()[3];
        assert_eq!(world.surface_at(seg.x + 10.0), seg.surface_y);
        assert_eq!(world.surface_at(-10.0), world.surface_for_chunk(-CHUNK_WIDTH));

        let span = world.segments_in_span(350.0, 950.0);
        assert_eq!(span.first().map(|s| s.x), Some(300.0));
        assert_eq!(span.last().map(|s| s.x), Some(900.0));
        assert!(world.segments_in_span(1.0e7, 1.0e7 + 10.0).is_empty());
    }

    #[test]
    fn test_mark_collected_is_one_way() {
        let (mut world, _) = world_with(6, WorldTuning::default());
        world.insert_collectible(CollectibleKind::Star, Vec2::new(100.0, 100.0));
        let slot = world.stars().len() - 1;
        assert!(world.stars_mut().mark_collected(slot).is_some());
        assert!(world.stars_mut().mark_collected(slot).is_none());
        assert!(world.stars().get(slot).unwrap().collected);
        assert_eq!(world.stars().collected_value(), 10);
    }

    proptest! {
        #[test]
        fn prop_terrain_is_gapless_and_append_only(
            seed in any::<u64>(),
            targets in prop::collection::vec(0.0f32..50_000.0, 1..6),
        ) {
            let (mut world, mut physics) = world_with(seed, WorldTuning::default());
            let mut previous: Vec<(f32, f32)> =
                world.segments().iter().map(|s| (s.x, s.surface_y)).collect();

            for target in targets {
                world.ensure_generated_ahead(&mut physics, target);
                let segments = world.segments();
                // Earlier segments are untouched
                for (i, (x, y)) in previous.iter().enumerate() {
                    prop_assert_eq!(segments[i].x, *x);
                    prop_assert_eq!(segments[i].surface_y, *y);
                }
                for pair in segments.windows(2) {
                    prop_assert_eq!(pair[1].x, pair[0].x + CHUNK_WIDTH);
                }
                previous = segments.iter().map(|s| (s.x, s.surface_y)).collect();
            }
        }
    }
}
