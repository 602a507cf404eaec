//! Sensor Rules
//!
//! DOM-free decisions shared by the pointer and keyboard sensors.

use serde::{Deserialize, Serialize};
use taskwave_board::collision::detect_collisions;
use taskwave_board::{DragOverEvent, Droppable, OverTarget, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Pointer travel before a press becomes a drag
    pub activation_distance_px: f64,
    /// Distance one arrow key press moves a keyboard drag
    pub keyboard_step_px: f64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            activation_distance_px: 5.0,
            keyboard_step_px: 20.0,
        }
    }
}

/// Whether pointer travel from the press point starts a drag
pub fn exceeds_activation(dx: f64, dy: f64, distance: f64) -> bool {
    (dx * dx + dy * dy).sqrt() > distance
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KeyAction {
    /// Enter/Space: pick up when idle, drop when dragging
    Toggle,
    Cancel,
    Nudge { dx: f64, dy: f64 },
}

pub fn key_action(key: &str, step: f64) -> Option<KeyAction> {
    match key {
        "Enter" | " " | "Spacebar" => Some(KeyAction::Toggle),
        "Escape" | "Esc" => Some(KeyAction::Cancel),
        "ArrowUp" => Some(KeyAction::Nudge { dx: 0.0, dy: -step }),
        "ArrowDown" => Some(KeyAction::Nudge { dx: 0.0, dy: step }),
        "ArrowLeft" => Some(KeyAction::Nudge { dx: -step, dy: 0.0 }),
        "ArrowRight" => Some(KeyAction::Nudge { dx: step, dy: 0.0 }),
        _ => None,
    }
}

/// Drag-over event for the dragged element at `translated`. The dragged
/// element never counts as its own target.
pub fn resolve_over(active_id: &str, translated: &Rect, droppables: &[Droppable]) -> DragOverEvent {
    let candidates: Vec<Droppable> = droppables
        .iter()
        .filter(|droppable| droppable.id != active_id)
        .cloned()
        .collect();
    let over = detect_collisions(translated, &candidates).first().map(OverTarget::from);
    DragOverEvent {
        over,
        active_translated_top: Some(translated.top),
    }
}
