//! Browser 2D canvas surface (WASM only)

use glam::Vec2;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::surface::DrawSurface;

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Wrap the canvas' 2D context, if the browser provides one
    pub fn new(canvas: &HtmlCanvasElement) -> Option<Self> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()?
            .dyn_into::<CanvasRenderingContext2d>()
            .ok()?;
        Some(Self { ctx })
    }
}

impl DrawSurface for CanvasSurface {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, offset: Vec2) {
        self.ctx.translate(offset.x as f64, offset.y as f64).ok();
    }

    fn rotate(&mut self, angle: f32) {
        self.ctx.rotate(angle as f64).ok();
    }

    fn scale(&mut self, factor: Vec2) {
        self.ctx.scale(factor.x as f64, factor.y as f64).ok();
    }

    fn set_fill(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_stroke(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }

    fn set_line_width(&mut self, width: f32) {
        self.ctx.set_line_width(width as f64);
    }

    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2) {
        self.ctx
            .fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, p: Vec2) {
        self.ctx.move_to(p.x as f64, p.y as f64);
    }

    fn line_to(&mut self, p: Vec2) {
        self.ctx.line_to(p.x as f64, p.y as f64);
    }

    fn arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32) {
        self.ctx
            .arc(
                center.x as f64,
                center.y as f64,
                radius.max(0.0) as f64,
                start as f64,
                end as f64,
            )
            .ok();
    }

    fn close_path(&mut self) {
        self.ctx.close_path();
    }

    fn fill(&mut self) {
        self.ctx.fill();
    }

    fn stroke(&mut self) {
        self.ctx.stroke();
    }

    fn fill_text(&mut self, text: &str, pos: Vec2) {
        self.ctx.fill_text(text, pos.x as f64, pos.y as f64).ok();
    }

    fn vertical_gradient_rect(&mut self, pos: Vec2, size: Vec2, top: &str, bottom: &str) {
        let gradient = self.ctx.create_linear_gradient(
            pos.x as f64,
            pos.y as f64,
            pos.x as f64,
            (pos.y + size.y) as f64,
        );
        gradient.add_color_stop(0.0, top).ok();
        gradient.add_color_stop(1.0, bottom).ok();
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx
            .fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
    }
}
