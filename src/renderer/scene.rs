//! Frame composition
//!
//! Draws one frame of the session onto a [`DrawSurface`]. World-space layers
//! are drawn under the camera transform; the multiplier banner and the drag
//! indicator are drawn in screen space on top.

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI};

use super::surface::{DrawSurface, rgba};
use crate::consts::{CHUNK_WIDTH, GROUND_DEPTH};
use crate::settings::Settings;
use crate::sim::effects::FloatingTexts;
use crate::sim::game::Game;
use crate::sim::physics::{BodyState, PhysicsEngine};
use crate::sim::player::Player;
use crate::sim::state::{GamePhase, LaunchPreview};
use crate::sim::world::{Collectible, CollectibleKind, FieldKind, World};

/// Distance marker spacing in world units
const MARKER_SPACING: f32 = 1000.0;
const PREVIEW_STEPS: usize = 40;
const SKY_HORIZON: &str = "#FFFFFF";

/// The glider as drawn this frame
#[derive(Clone, Copy)]
pub struct GliderView<'a> {
    pub player: &'a Player,
    pub state: BodyState,
}

/// Everything a frame needs, borrowed from the session
#[derive(Clone, Copy)]
pub struct FrameView<'a> {
    pub world: &'a World,
    /// Top-left corner of the view in world space
    pub camera: Vec2,
    pub viewport: Vec2,
    pub glider: Option<GliderView<'a>>,
    pub effects: &'a FloatingTexts,
    pub multiplier: f32,
    pub preview: Option<LaunchPreview>,
    pub settings: &'a Settings,
}

impl<'a> FrameView<'a> {
    pub fn of<P: PhysicsEngine>(game: &'a Game<P>) -> Self {
        let glider = game.player().and_then(|player| {
            game.player_state()
                .map(|state| GliderView { player, state })
        });
        let multiplier = if game.phase() == GamePhase::Flying {
            game.run().multiplier
        } else {
            1.0
        };
        Self {
            world: game.world(),
            camera: game.camera().pos,
            viewport: game.viewport(),
            glider,
            effects: game.effects(),
            multiplier,
            preview: game.launch_preview(),
            settings: game.settings(),
        }
    }

    /// Visible world-space x span, padded by `margin`
    fn x_span(&self, margin: f32) -> (f32, f32) {
        (
            self.camera.x - margin,
            self.camera.x + self.viewport.x + margin,
        )
    }
}

/// Draw a complete frame
pub fn draw_frame(surface: &mut dyn DrawSurface, view: &FrameView) {
    draw_sky(surface, view);

    surface.save();
    surface.translate(-view.camera);
    draw_clouds(surface, view);
    draw_terrain(surface, view);
    draw_fields(surface, view);
    draw_collectibles(surface, view);
    draw_shooting_stars(surface, view);
    draw_distance_markers(surface, view);
    if let Some(glider) = view.glider {
        if view.settings.trails {
            draw_trail(surface, glider.player);
        }
        if let Some(preview) = view.preview.filter(|p| p.armed) {
            draw_trajectory(surface, glider.state.position, &preview);
        }
        draw_glider(surface, &glider);
    }
    if view.settings.floating_text {
        draw_floating_texts(surface, view.effects);
    }
    surface.restore();

    if view.multiplier > 1.0 {
        draw_multiplier_banner(surface, view);
    }
    if let Some(preview) = &view.preview {
        draw_drag_indicator(surface, preview);
    }
}

fn draw_sky(surface: &mut dyn DrawSurface, view: &FrameView) {
    let theme = view.world.theme_at(view.camera.x + view.viewport.x / 3.0);
    surface.vertical_gradient_rect(Vec2::ZERO, view.viewport, theme.sky_color, SKY_HORIZON);
}

fn draw_clouds(surface: &mut dyn DrawSurface, view: &FrameView) {
    let (x_min, x_max) = view.x_span(200.0);
    surface.set_fill(&rgba(255, 255, 255, 0.8));
    for cloud in view.world.clouds() {
        if cloud.pos.x < x_min || cloud.pos.x > x_max {
            continue;
        }
        let r = cloud.size * 0.5;
        surface.fill_circle(cloud.pos, r);
        surface.fill_circle(cloud.pos + Vec2::new(r * 0.8, r * 0.1), r * 0.8);
        surface.fill_circle(cloud.pos - Vec2::new(r * 0.8, -r * 0.1), r * 0.7);
    }
}

fn draw_terrain(surface: &mut dyn DrawSurface, view: &FrameView) {
    let (x_min, x_max) = view.x_span(CHUNK_WIDTH);
    surface.set_stroke(&rgba(0, 0, 0, 0.25));
    surface.set_line_width(2.0);
    for segment in view.world.segments_in_span(x_min, x_max) {
        surface.set_fill(segment.color());
        // Extend below the collision block so no sky shows under the ground
        surface.fill_rect(
            Vec2::new(segment.x, segment.surface_y),
            Vec2::new(CHUNK_WIDTH + 1.0, GROUND_DEPTH + view.viewport.y),
        );
        surface.stroke_line(
            Vec2::new(segment.x, segment.surface_y),
            Vec2::new(segment.x + CHUNK_WIDTH, segment.surface_y),
        );
    }
}

fn draw_fields(surface: &mut dyn DrawSurface, view: &FrameView) {
    let (x_min, x_max) = view.x_span(0.0);
    for field in view.world.fields() {
        if field.x + field.width < x_min || field.x - field.width > x_max {
            continue;
        }
        let color = match field.kind {
            FieldKind::Thermal => rgba(255, 140, 0, 0.12),
            FieldKind::WindZone if field.strength < 0.0 => rgba(120, 200, 255, 0.15),
            FieldKind::WindZone => rgba(90, 90, 140, 0.18),
        };
        surface.set_fill(&color);
        surface.fill_rect(
            Vec2::new(field.x - field.width, view.camera.y),
            Vec2::new(field.width * 2.0, view.viewport.y),
        );
    }
}

/// Five-pointed star outline
pub fn star_points(center: Vec2, outer: f32, inner: f32) -> Vec<Vec2> {
    (0..10)
        .map(|i| {
            let radius = if i % 2 == 0 { outer } else { inner };
            let angle = -FRAC_PI_2 + i as f32 * PI / 5.0;
            center + Vec2::from_angle(angle) * radius
        })
        .collect()
}

fn draw_collectible(surface: &mut dyn DrawSurface, item: &Collectible) {
    match item.kind {
        CollectibleKind::Star => {
            surface.set_fill("#FFD700");
            surface.fill_polygon(&star_points(item.pos, 15.0, 7.0));
        }
        CollectibleKind::RareStar => {
            surface.set_fill("#FF69B4");
            surface.fill_polygon(&star_points(item.pos, 18.0, 8.0));
        }
        CollectibleKind::SpaceStar => {
            surface.set_fill(&rgba(0, 255, 255, 0.3));
            surface.fill_circle(item.pos, 28.0);
            surface.set_fill("#00FFFF");
            surface.fill_polygon(&star_points(item.pos, 20.0, 9.0));
        }
        CollectibleKind::Crane => {
            let p = item.pos;
            surface.set_fill("#FF6B6B");
            surface.fill_polygon(&[
                p + Vec2::new(-20.0, 0.0),
                p + Vec2::new(0.0, -18.0),
                p + Vec2::new(20.0, 0.0),
                p + Vec2::new(0.0, 8.0),
            ]);
            surface.set_fill("#FFFFFF");
            surface.set_font("bold 14px sans-serif");
            surface.fill_text(&format!("x{}", item.multiplier), p + Vec2::new(-8.0, 26.0));
        }
    }
}

fn draw_collectibles(surface: &mut dyn DrawSurface, view: &FrameView) {
    let (x_min, x_max) = view.x_span(50.0);
    let world = view.world;
    for set in [world.stars(), world.space_stars(), world.cranes()] {
        for item in set.in_span(x_min, x_max).filter(|c| !c.collected) {
            draw_collectible(surface, item);
        }
    }
}

fn draw_shooting_stars(surface: &mut dyn DrawSurface, view: &FrameView) {
    surface.set_line_width(3.0);
    for star in view.world.shooting_stars().iter().filter(|s| !s.collected) {
        surface.set_stroke(&rgba(255, 255, 200, 0.6));
        surface.stroke_line(star.pos, star.pos - star.vel * 8.0);
        surface.set_fill("#FFFFAA");
        surface.fill_circle(star.pos, 8.0);
    }
}

fn draw_distance_markers(surface: &mut dyn DrawSurface, view: &FrameView) {
    let (x_min, x_max) = view.x_span(0.0);
    let first = (x_min / MARKER_SPACING).ceil().max(1.0) as i64;
    let last = (x_max / MARKER_SPACING).floor() as i64;
    surface.set_stroke(&rgba(255, 255, 255, 0.5));
    surface.set_line_width(2.0);
    surface.set_fill("#FFFFFF");
    surface.set_font("bold 18px sans-serif");
    for i in first..=last {
        let x = i as f32 * MARKER_SPACING;
        let ground = view.world.surface_at(x);
        surface.stroke_line(Vec2::new(x, ground), Vec2::new(x, ground - 60.0));
        surface.fill_text(&format!("{}m", i * 100), Vec2::new(x + 5.0, ground - 65.0));
    }
}

fn draw_trail(surface: &mut dyn DrawSurface, player: &Player) {
    for point in player.trail() {
        surface.set_fill(&rgba(255, 255, 255, point.life * 0.4));
        surface.fill_circle(point.pos, 3.0 * point.life);
    }
}

fn draw_trajectory(surface: &mut dyn DrawSurface, origin: Vec2, preview: &LaunchPreview) {
    for (i, p) in preview.trajectory(origin, PREVIEW_STEPS).into_iter().enumerate() {
        if i % 3 != 0 {
            continue;
        }
        let fade = 1.0 - i as f32 / PREVIEW_STEPS as f32;
        surface.set_fill(&rgba(255, 255, 255, 0.6 * fade));
        surface.fill_circle(p, 3.0);
    }
}

fn draw_glider(surface: &mut dyn DrawSurface, glider: &GliderView) {
    surface.save();
    surface.translate(glider.state.position);
    surface.rotate(glider.state.angle);

    surface.set_fill(&rgba(0, 0, 0, 0.15));
    surface.fill_polygon(&[
        Vec2::new(28.0, 6.0),
        Vec2::new(-28.0, -16.0),
        Vec2::new(-28.0, 16.0),
    ]);

    surface.set_fill("#FFFFFF");
    surface.set_stroke("#444444");
    surface.set_line_width(2.0);
    let body = [
        Vec2::new(28.0, 0.0),
        Vec2::new(-25.0, -14.0),
        Vec2::new(-20.0, 0.0),
        Vec2::new(-25.0, 14.0),
    ];
    surface.fill_polygon(&body);
    surface.stroke();

    surface.set_fill("#F0F0F0");
    for wing in [-20.0, 20.0] {
        surface.fill_polygon(&[
            Vec2::new(10.0, 0.0),
            Vec2::new(-20.0, wing),
            Vec2::new(-15.0, 0.0),
        ]);
        surface.stroke();
    }

    surface.set_stroke("#CCCCCC");
    surface.set_line_width(1.5);
    surface.stroke_line(Vec2::new(25.0, 0.0), Vec2::new(-18.0, 0.0));

    if glider.player.is_boosting() {
        for (i, color) in ["#FF4400", "#FF8800", "#FFCC00"].into_iter().enumerate() {
            surface.set_fill(color);
            surface.fill_circle(Vec2::new(-28.0 - i as f32 * 8.0, 0.0), 12.0 - i as f32 * 3.0);
        }
    }
    surface.restore();
}

fn draw_floating_texts(surface: &mut dyn DrawSurface, effects: &FloatingTexts) {
    surface.set_font("bold 20px sans-serif");
    for text in effects.iter() {
        surface.set_fill(&rgba(255, 215, 0, text.alpha()));
        surface.fill_text(&text.label, text.pos);
    }
}

fn draw_multiplier_banner(surface: &mut dyn DrawSurface, view: &FrameView) {
    surface.save();
    surface.set_font("bold 32px sans-serif");
    surface.set_fill("#FF6B6B");
    surface.fill_text(
        &format!("{}x MULTIPLIER!", view.multiplier),
        Vec2::new(view.viewport.x / 2.0 - 100.0, 120.0),
    );
    surface.restore();
}

/// Pull-back line, arrowhead and power readout (screen space)
fn draw_drag_indicator(surface: &mut dyn DrawSurface, preview: &LaunchPreview) {
    let drag = preview.drag;
    surface.save();
    surface.set_stroke(&rgba(255, 255, 255, preview.power_fraction));
    surface.set_line_width(5.0);
    surface.stroke_line(drag.start, drag.end);

    let pull = drag.pull();
    surface.translate(drag.end);
    surface.rotate(pull.y.atan2(pull.x));
    surface.set_fill("#FFFFFF");
    surface.fill_polygon(&[
        Vec2::ZERO,
        Vec2::new(-15.0, -8.0),
        Vec2::new(-15.0, 8.0),
    ]);
    surface.restore();

    surface.set_fill("#FFFFFF");
    surface.set_font("bold 24px sans-serif");
    surface.fill_text(
        &format!("Power: {}%", preview.power_percent()),
        drag.start + Vec2::new(10.0, -20.0),
    );
}
