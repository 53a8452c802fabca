//! Floating-text effects
//!
//! Short-lived labels ("+10", "BOOST!") spawned on captures. Stored in a
//! fixed-capacity ring so a busy flight never grows the buffer; when full the
//! oldest label is overwritten.

use glam::Vec2;

use crate::consts::{FLOATING_TEXT_CAPACITY, FLOATING_TEXT_TICKS};

/// Rise per tick (y up on screen)
const RISE_PER_TICK: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FloatingText {
    pub pos: Vec2,
    pub ticks_left: u32,
    pub label: String,
}

impl FloatingText {
    /// 1.0 when fresh, 0.0 when about to expire
    pub fn alpha(&self) -> f32 {
        self.ticks_left as f32 / FLOATING_TEXT_TICKS as f32
    }
}

#[derive(Debug, Clone)]
pub struct FloatingTexts {
    slots: Vec<Option<FloatingText>>,
    /// Next slot to write
    head: usize,
}

impl Default for FloatingTexts {
    fn default() -> Self {
        Self::with_capacity(FLOATING_TEXT_CAPACITY)
    }
}

impl FloatingTexts {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity.max(1)],
            head: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn push(&mut self, pos: Vec2, label: impl Into<String>) {
        self.slots[self.head] = Some(FloatingText {
            pos,
            ticks_left: FLOATING_TEXT_TICKS,
            label: label.into(),
        });
        self.head = (self.head + 1) % self.slots.len();
    }

    /// Age every label by one tick, dropping expired ones
    pub fn tick(&mut self) {
        for slot in &mut self.slots {
            let expired = match slot.as_mut() {
                Some(text) => {
                    text.ticks_left = text.ticks_left.saturating_sub(1);
                    text.pos.y -= RISE_PER_TICK;
                    text.ticks_left == 0
                }
                None => false,
            };
            if expired {
                *slot = None;
            }
        }
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|s| *s = None);
        self.head = 0;
    }

    pub fn iter(&self) -> impl Iterator<Item = &FloatingText> {
        self.slots.iter().flatten()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_rise_and_expire() {
        let mut texts = FloatingTexts::default();
        texts.push(Vec2::new(0.0, 100.0), "+10");
        texts.tick();
        let text = texts.iter().next().unwrap();
        assert_eq!(text.pos.y, 99.0);
        assert_eq!(text.ticks_left, FLOATING_TEXT_TICKS - 1);

        for _ in 1..FLOATING_TEXT_TICKS {
            texts.tick();
        }
        assert!(texts.is_empty());
    }

    #[test]
    fn test_full_ring_overwrites_oldest() {
        let mut texts = FloatingTexts::with_capacity(3);
        for i in 0..5 {
            texts.push(Vec2::ZERO, format!("#{i}"));
        }
        assert_eq!(texts.len(), 3);
        let labels: Vec<&str> = texts.iter().map(|t| t.label.as_str()).collect();
        assert!(!labels.contains(&"#0"));
        assert!(!labels.contains(&"#1"));
        assert!(labels.contains(&"#4"));
        assert_eq!(texts.capacity(), 3);
    }

    #[test]
    fn test_clear() {
        let mut texts = FloatingTexts::default();
        texts.push(Vec2::ZERO, "BOOST!");
        texts.clear();
        assert!(texts.is_empty());
    }
}
