//! Collision Resolver
//!
//! Decides which droppable the dragged element is over. The base set is
//! every droppable overlapping the dragged rect, nearest center first;
//! column targets are then moved ahead of task targets so a column-level
//! intent is never starved by a narrower task hit-target.

use serde::{Deserialize, Serialize};

use crate::models::ItemKind;

/// Client-space rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    /// Same size, shifted by a pointer delta
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.left < other.right()
            && other.left < self.right()
            && self.top < other.bottom()
            && other.top < self.bottom()
    }

    fn center_distance(&self, other: &Rect) -> f64 {
        let (ax, ay) = self.center();
        let (bx, by) = other.center();
        ((ax - bx).powi(2) + (ay - by).powi(2)).sqrt()
    }
}

/// A measured drop target
#[derive(Debug, Clone, PartialEq)]
pub struct Droppable {
    pub id: String,
    pub kind: ItemKind,
    pub rect: Rect,
}

/// One candidate drop target for the current pointer tick
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    pub id: String,
    pub kind: ItemKind,
    pub rect: Rect,
    pub distance: f64,
}

/// Droppables overlapping `active`, nearest center first
pub fn closest_center(active: &Rect, droppables: &[Droppable]) -> Vec<Collision> {
    let mut collisions: Vec<Collision> = droppables
        .iter()
        .filter(|droppable| droppable.rect.intersects(active))
        .map(|droppable| Collision {
            id: droppable.id.clone(),
            kind: droppable.kind,
            rect: droppable.rect,
            distance: active.center_distance(&droppable.rect),
        })
        .collect();
    collisions.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    collisions
}

/// Stable re-sort putting column targets before task targets
pub fn prioritize_columns(mut collisions: Vec<Collision>) -> Vec<Collision> {
    collisions.sort_by_key(|collision| collision.kind != ItemKind::Column);
    collisions
}

/// Full resolution for one pointer tick
pub fn detect_collisions(active: &Rect, droppables: &[Droppable]) -> Vec<Collision> {
    prioritize_columns(closest_center(active, droppables))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collision(id: &str, kind: ItemKind, distance: f64) -> Collision {
        Collision {
            id: id.to_string(),
            kind,
            rect: Rect::default(),
            distance,
        }
    }

    fn order(collisions: &[Collision]) -> Vec<&str> {
        collisions.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_column_sorts_first_regardless_of_input_order() {
        let task_first = vec![collision("t1", ItemKind::Task, 1.0), collision("c1", ItemKind::Column, 9.0)];
        let column_first = vec![collision("c1", ItemKind::Column, 9.0), collision("t1", ItemKind::Task, 1.0)];

        assert_eq!(order(&prioritize_columns(task_first)), vec!["c1", "t1"]);
        assert_eq!(order(&prioritize_columns(column_first)), vec!["c1", "t1"]);
    }

    #[test]
    fn test_prioritize_is_stable_within_kind() {
        let input = vec![
            collision("t2", ItemKind::Task, 1.0),
            collision("c2", ItemKind::Column, 2.0),
            collision("t1", ItemKind::Task, 3.0),
            collision("c1", ItemKind::Column, 4.0),
        ];
        assert_eq!(order(&prioritize_columns(input)), vec!["c2", "c1", "t2", "t1"]);
    }

    #[test]
    fn test_closest_center_ignores_non_overlapping() {
        let active = Rect::new(0.0, 0.0, 100.0, 40.0);
        let droppables = vec![
            Droppable { id: "far".into(), kind: ItemKind::Task, rect: Rect::new(500.0, 0.0, 100.0, 40.0) },
            Droppable { id: "near".into(), kind: ItemKind::Task, rect: Rect::new(0.0, 20.0, 100.0, 40.0) },
            Droppable { id: "nearest".into(), kind: ItemKind::Task, rect: Rect::new(0.0, 5.0, 100.0, 40.0) },
        ];
        let collisions = closest_center(&active, &droppables);
        assert_eq!(order(&collisions), vec!["nearest", "near"]);
    }

    #[test]
    fn test_detect_collisions_prefers_column_zone() {
        let active = Rect::new(10.0, 100.0, 200.0, 40.0);
        let droppables = vec![
            Droppable { id: "t9".into(), kind: ItemKind::Task, rect: Rect::new(10.0, 100.0, 200.0, 40.0) },
            Droppable { id: "c2".into(), kind: ItemKind::Column, rect: Rect::new(0.0, 0.0, 300.0, 600.0) },
        ];
        let collisions = detect_collisions(&active, &droppables);
        assert_eq!(collisions[0].id, "c2");
        assert!(detect_collisions(&Rect::new(5000.0, 0.0, 1.0, 1.0), &droppables).is_empty());
    }
}
