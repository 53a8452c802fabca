//! Drawing-surface capability
//!
//! Scene code draws through [`DrawSurface`], a thin mirror of the 2D canvas
//! API. Colors are CSS color strings. Coordinates are in the current
//! transform's space.

use glam::Vec2;
use std::f32::consts::TAU;

pub trait DrawSurface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, angle: f32);
    fn scale(&mut self, factor: Vec2);

    fn set_fill(&mut self, color: &str);
    fn set_stroke(&mut self, color: &str);
    fn set_line_width(&mut self, width: f32);
    fn set_font(&mut self, font: &str);

    fn fill_rect(&mut self, pos: Vec2, size: Vec2);
    fn begin_path(&mut self);
    fn move_to(&mut self, p: Vec2);
    fn line_to(&mut self, p: Vec2);
    fn arc(&mut self, center: Vec2, radius: f32, start: f32, end: f32);
    fn close_path(&mut self);
    fn fill(&mut self);
    fn stroke(&mut self);
    fn fill_text(&mut self, text: &str, pos: Vec2);

    /// Rectangle filled with a top-to-bottom linear gradient
    fn vertical_gradient_rect(&mut self, pos: Vec2, size: Vec2, top: &str, bottom: &str);

    /// Filled circle
    fn fill_circle(&mut self, center: Vec2, radius: f32) {
        self.begin_path();
        self.arc(center, radius, 0.0, TAU);
        self.fill();
    }

    /// Filled closed polygon
    fn fill_polygon(&mut self, points: &[Vec2]) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        self.begin_path();
        self.move_to(*first);
        for p in rest {
            self.line_to(*p);
        }
        self.close_path();
        self.fill();
    }

    fn stroke_line(&mut self, from: Vec2, to: Vec2) {
        self.begin_path();
        self.move_to(from);
        self.line_to(to);
        self.stroke();
    }
}

/// CSS `rgba()` string
pub fn rgba(r: u8, g: u8, b: u8, a: f32) -> String {
    format!("rgba({r},{g},{b},{:.3})", a.clamp(0.0, 1.0))
}

/// One recorded drawing call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Save,
    Restore,
    Translate(Vec2),
    Rotate(f32),
    Scale(Vec2),
    Fill(String),
    Stroke(String),
    LineWidth(f32),
    Font(String),
    FillRect { pos: Vec2, size: Vec2 },
    BeginPath,
    MoveTo(Vec2),
    LineTo(Vec2),
    Arc { center: Vec2, radius: f32 },
    ClosePath,
    FillPath,
    StrokePath,
    Text { text: String, pos: Vec2 },
    Gradient { top: String, bottom: String },
}

/// Surface that records calls instead of drawing (headless runs, tests)
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
    depth: usize,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Current save/restore nesting
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.depth = 0;
    }
}

impl DrawSurface for RecordingSurface {
    fn save(&mut self) {
        self.depth += 1;
        self.commands.push(DrawCommand::Save);
    }

    fn restore(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.commands.push(DrawCommand::Restore);
    }

    fn translate(&mut self, offset: Vec2) {
        self.commands.push(DrawCommand::Translate(offset));
    }

    fn rotate(&mut self, angle: f32) {
        self.commands.push(DrawCommand::Rotate(angle));
    }

    fn scale(&mut self, factor: Vec2) {
        self.commands.push(DrawCommand::Scale(factor));
    }

    fn set_fill(&mut self, color: &str) {
        self.commands.push(DrawCommand::Fill(color.to_string()));
    }

    fn set_stroke(&mut self, color: &str) {
        self.commands.push(DrawCommand::Stroke(color.to_string()));
    }

    fn set_line_width(&mut self, width: f32) {
        self.commands.push(DrawCommand::LineWidth(width));
    }

    fn set_font(&mut self, font: &str) {
        self.commands.push(DrawCommand::Font(font.to_string()));
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2) {
        self.commands.push(DrawCommand::FillRect { pos, size });
    }

    fn begin_path(&mut self) {
        self.commands.push(DrawCommand::BeginPath);
    }

    fn move_to(&mut self, p: Vec2) {
        self.commands.push(DrawCommand::MoveTo(p));
    }

    fn line_to(&mut self, p: Vec2) {
        self.commands.push(DrawCommand::LineTo(p));
    }

    fn arc(&mut self, center: Vec2, radius: f32, _start: f32, _end: f32) {
        self.commands.push(DrawCommand::Arc { center, radius });
    }

    fn close_path(&mut self) {
        self.commands.push(DrawCommand::ClosePath);
    }

    fn fill(&mut self) {
        self.commands.push(DrawCommand::FillPath);
    }

    fn stroke(&mut self) {
        self.commands.push(DrawCommand::StrokePath);
    }

    fn fill_text(&mut self, text: &str, pos: Vec2) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
        });
    }

    fn vertical_gradient_rect(&mut self, _pos: Vec2, _size: Vec2, top: &str, bottom: &str) {
        self.commands.push(DrawCommand::Gradient {
            top: top.to_string(),
            bottom: bottom.to_string(),
        });
    }
}
