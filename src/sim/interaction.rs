//! Collectible interaction
//!
//! Once per tick the player's post-step position is tested against every
//! uncollected entity. Anything strictly inside its category's capture radius
//! is marked collected (exactly once) and its contribution is accumulated.
//! Categories run in a fixed order: stars, space stars, cranes, shooting
//! stars. Captures in several categories during one tick add up.

use glam::Vec2;

use super::effects::FloatingTexts;
use super::world::{CollectibleSet, World};
use crate::tuning::CaptureTuning;

/// What the player picked up this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionResult {
    pub currency_delta: u32,
    pub multiplier_delta: f32,
    pub boost_triggered: bool,
}

impl InteractionResult {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Capture everything in `set` within `radius` of `pos`. Calls `on_capture`
/// with the position, value and multiplier of each newly collected item.
fn capture_from(
    set: &mut CollectibleSet,
    pos: Vec2,
    radius: f32,
    mut on_capture: impl FnMut(Vec2, u32, f32),
) {
    for slot in set.candidates(pos, radius) {
        let in_reach = set
            .get(slot)
            .is_some_and(|item| !item.collected && item.pos.distance(pos) < radius);
        if !in_reach {
            continue;
        }
        if let Some(item) = set.mark_collected(slot) {
            on_capture(item.pos, item.value, item.multiplier);
        }
    }
}

/// Evaluate all captures at `pos`, flipping `collected` flags and queueing
/// floating labels
pub fn evaluate(
    world: &mut World,
    pos: Vec2,
    capture: &CaptureTuning,
    effects: &mut FloatingTexts,
) -> InteractionResult {
    let mut result = InteractionResult::default();

    let mut on_star = |at: Vec2, value: u32, _multiplier: f32| {
        result.currency_delta += value;
        effects.push(at, format!("+{value}"));
    };
    capture_from(world.stars_mut(), pos, capture.star, &mut on_star);
    capture_from(world.space_stars_mut(), pos, capture.space_star, &mut on_star);

    capture_from(world.cranes_mut(), pos, capture.crane, |at, _value, multiplier| {
        result.multiplier_delta += multiplier;
        effects.push(at, format!("x{multiplier}"));
    });

    for star in world.shooting_stars_mut() {
        if !star.collected && star.pos.distance(pos) < capture.shooting_star {
            star.collected = true;
            result.boost_triggered = true;
            effects.push(star.pos, "BOOST!");
        }
    }

    if !result.is_empty() {
        log::debug!("Captured at {pos}: {result:?}");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_VIEWPORT;
    use crate::sim::physics::SimplePhysics;
    use crate::sim::world::CollectibleKind;
    use crate::tuning::WorldTuning;
    use proptest::prelude::*;

    /// A world with nothing spawned except what the test inserts
    fn empty_world() -> World {
        let tuning = WorldTuning {
            star_chance: 0.0,
            space_star_chance: 0.0,
            crane_base_chance: 0.0,
            crane_max_chance: 0.0,
            shooting_star_chance: 0.0,
            ..Default::default()
        };
        World::new(1, tuning, DEFAULT_VIEWPORT, &mut SimplePhysics::new())
    }

    #[test]
    fn test_exact_position_is_collected() {
        let mut world = empty_world();
        let mut effects = FloatingTexts::default();
        let at = Vec2::new(1000.0, 200.0);
        world.insert_collectible(CollectibleKind::Star, at);

        let result = evaluate(&mut world, at, &CaptureTuning::default(), &mut effects);
        assert_eq!(result.currency_delta, 10);
        assert!(world.stars().items()[0].collected);
        assert_eq!(effects.iter().next().unwrap().label, "+10");
    }

    #[test]
    fn test_radius_boundary_is_exclusive() {
        let mut world = empty_world();
        let mut effects = FloatingTexts::default();
        let capture = CaptureTuning::default();
        world.insert_collectible(CollectibleKind::Star, Vec2::new(1000.0, 200.0));

        let result = evaluate(
            &mut world,
            Vec2::new(1000.0 + capture.star, 200.0),
            &capture,
            &mut effects,
        );
        assert!(result.is_empty());
        assert!(!world.stars().items()[0].collected);

        let result = evaluate(
            &mut world,
            Vec2::new(1000.0 + capture.star - 0.01, 200.0),
            &capture,
            &mut effects,
        );
        assert_eq!(result.currency_delta, 10);
    }

    #[test]
    fn test_categories_add_up_in_one_tick() {
        let mut world = empty_world();
        let mut effects = FloatingTexts::default();
        let at = Vec2::new(2000.0, 100.0);
        world.insert_collectible(CollectibleKind::RareStar, at);
        world.insert_collectible(CollectibleKind::SpaceStar, at + Vec2::new(5.0, 0.0));
        world.insert_collectible(CollectibleKind::Crane, at + Vec2::new(0.0, 5.0));
        world.insert_shooting_star(at - Vec2::new(5.0, 0.0));

        let result = evaluate(&mut world, at, &CaptureTuning::default(), &mut effects);
        assert_eq!(result.currency_delta, 20 + 50);
        assert_eq!(result.multiplier_delta, 2.0);
        assert!(result.boost_triggered);
        assert_eq!(effects.len(), 4);
        assert!(effects.iter().any(|t| t.label == "BOOST!"));
        assert!(effects.iter().any(|t| t.label == "x2"));
    }

    #[test]
    fn test_shooting_star_boost_is_one_shot() {
        let mut world = empty_world();
        let mut effects = FloatingTexts::default();
        let at = Vec2::new(500.0, 50.0);
        world.insert_shooting_star(at);

        assert!(evaluate(&mut world, at, &CaptureTuning::default(), &mut effects).boost_triggered);
        assert!(!evaluate(&mut world, at, &CaptureTuning::default(), &mut effects).boost_triggered);
    }

    proptest! {
        #[test]
        fn prop_collected_never_contributes_again(
            dx in -39.0f32..39.0,
            dy in -39.0f32..39.0,
            shrink in 0.0f32..1.0,
        ) {
            prop_assume!(Vec2::new(dx, dy).length() < 40.0);
            let mut world = empty_world();
            let mut effects = FloatingTexts::default();
            let capture = CaptureTuning::default();
            let star = Vec2::new(3000.0, 150.0);
            world.insert_collectible(CollectibleKind::Star, star);
            world.insert_collectible(CollectibleKind::Crane, star);

            let first = star + Vec2::new(dx, dy);
            let result = evaluate(&mut world, first, &capture, &mut effects);
            prop_assert_eq!(result.currency_delta, 10);
            prop_assert_eq!(result.multiplier_delta, 2.0);

            // Same spot, then closer
            let again = evaluate(&mut world, first, &capture, &mut effects);
            prop_assert!(again.is_empty());
            let closer = star + Vec2::new(dx, dy) * shrink;
            let closer = evaluate(&mut world, closer, &capture, &mut effects);
            prop_assert!(closer.is_empty());
            prop_assert_eq!(world.collected_star_value(), 10);
        }
    }
}
