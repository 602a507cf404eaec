//! Drag Session State Machine
//!
//! One gesture at a time: `Idle -> Dragging -> Idle`.
//!
//! - `start` enters `Dragging` and records the active item
//! - `drag_over` fires on every pointer tick and never changes state
//! - `end` computes the authoritative intent and always returns to `Idle`
//! - `cancel` returns to `Idle` without an intent
//!
//! Lookups run against the enriched columns of the current render, so an
//! item deleted mid-gesture simply resolves to no intent.

use std::mem;

use crate::collision::{Collision, Rect};
use crate::models::{ColumnId, EnrichedColumn, ItemKind, TaskDestination, TaskId};
use crate::position::{determine_task_position, find_column, find_task, reorder, task_index};

/// The dragged element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragItem {
    pub id: String,
    pub kind: ItemKind,
}

impl DragItem {
    pub fn task(id: impl Into<String>) -> Self {
        Self { id: id.into(), kind: ItemKind::Task }
    }

    pub fn column(id: impl Into<String>) -> Self {
        Self { id: id.into(), kind: ItemKind::Column }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragItem),
}

/// The droppable currently under the dragged element
#[derive(Debug, Clone, PartialEq)]
pub struct OverTarget {
    pub id: String,
    pub kind: ItemKind,
    pub rect: Rect,
}

impl From<&Collision> for OverTarget {
    fn from(collision: &Collision) -> Self {
        Self {
            id: collision.id.clone(),
            kind: collision.kind,
            rect: collision.rect,
        }
    }
}

/// Pointer tick while dragging
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DragOverEvent {
    pub over: Option<OverTarget>,
    /// Top edge of the dragged element after translation, when measured
    pub active_translated_top: Option<f64>,
}

/// Release of the pointer (or keyboard drop)
pub type DragEndEvent = DragOverEvent;

/// Proposed position change produced by a gesture
#[derive(Debug, Clone, PartialEq)]
pub enum DragIntent {
    MoveTask {
        task_id: TaskId,
        from: TaskDestination,
        to: TaskDestination,
    },
    ReorderColumns {
        column_ids: Vec<ColumnId>,
    },
}

#[derive(Debug, Default)]
pub struct DragSession {
    state: DragState,
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging(_))
    }

    pub fn active(&self) -> Option<&DragItem> {
        match &self.state {
            DragState::Dragging(item) => Some(item),
            DragState::Idle => None,
        }
    }

    /// Id of the dragged task, for drag styling
    pub fn active_task_id(&self) -> Option<&str> {
        self.active()
            .filter(|item| item.kind == ItemKind::Task)
            .map(|item| item.id.as_str())
    }

    /// `Idle -> Dragging`. A start while already dragging replaces the gesture.
    pub fn start(&mut self, item: DragItem) {
        if let DragState::Dragging(previous) = &self.state {
            tracing::warn!(previous = %previous.id, next = %item.id, "drag started over an unfinished gesture");
        }
        tracing::debug!(id = %item.id, kind = ?item.kind, "drag start");
        self.state = DragState::Dragging(item);
    }

    /// `Dragging -> Idle` with no intent
    pub fn cancel(&mut self) {
        if let DragState::Dragging(item) = mem::take(&mut self.state) {
            tracing::debug!(id = %item.id, "drag cancelled");
        }
    }

    /// Where the dragged task would land for this tick, ignoring whether it
    /// changes column. Hovering a column appends; hovering a task inserts
    /// above or below it depending on approach direction.
    pub fn hover_destination(&self, columns: &[EnrichedColumn], event: &DragOverEvent) -> Option<TaskDestination> {
        let active = self.active()?;
        let over = event.over.as_ref()?;
        if active.kind != ItemKind::Task || active.id == over.id {
            return None;
        }
        match over.kind {
            ItemKind::Column => {
                let column = find_column(columns, &over.id)?;
                Some(TaskDestination::new(over.id.clone(), column.tasks.len() as i32))
            }
            ItemKind::Task => {
                let over_task = find_task(columns, &over.id)?;
                let column = find_column(columns, &over_task.column_id)?;
                let over_index = task_index(column, &over.id)?;
                let position = determine_task_position(event.active_translated_top, over.rect.top, over_index);
                Some(TaskDestination::new(over_task.column_id.clone(), position))
            }
        }
    }

    /// Continuous resolution while dragging. Only cross-column task moves
    /// produce an intent here; everything else waits for [`DragSession::end`].
    pub fn drag_over(&self, columns: &[EnrichedColumn], event: &DragOverEvent) -> Option<DragIntent> {
        let active = self.active()?;
        let task = find_task(columns, &active.id)?;
        let destination = self.hover_destination(columns, event)?;
        if destination.column_id == task.column_id {
            return None;
        }
        tracing::debug!(task = %task.id, column = %destination.column_id, position = destination.position, "drag over");
        Some(DragIntent::MoveTask {
            task_id: task.id.clone(),
            from: task.location(),
            to: destination,
        })
    }

    /// Final resolution. Always leaves the session `Idle`.
    pub fn end(&mut self, columns: &[EnrichedColumn], event: &DragEndEvent) -> Option<DragIntent> {
        let DragState::Dragging(active) = mem::take(&mut self.state) else {
            return None;
        };
        let Some(over) = event.over.as_ref() else {
            tracing::debug!(id = %active.id, "drag ended over nothing");
            return None;
        };

        match (active.kind, over.kind) {
            (ItemKind::Column, ItemKind::Column) => {
                let from = columns.iter().position(|column| column.id() == active.id)?;
                let to = columns.iter().position(|column| column.id() == over.id)?;
                if from == to {
                    return None;
                }
                Some(DragIntent::ReorderColumns {
                    column_ids: reorder(columns, from, to),
                })
            }
            (ItemKind::Task, _) if is_same_column_task_move(columns, &active, over) => {
                let task = find_task(columns, &active.id)?;
                let column = find_column(columns, &task.column_id)?;
                let active_index = task_index(column, &active.id)?;
                let over_index = task_index(column, &over.id)?;
                if active_index == over_index {
                    return None;
                }
                // Lands on the hovered index as is, without the above/below
                // refinement used while hovering.
                Some(DragIntent::MoveTask {
                    task_id: task.id.clone(),
                    from: task.location(),
                    to: TaskDestination::new(task.column_id.clone(), over_index as i32),
                })
            }
            (ItemKind::Task, _) if is_different_column_move(columns, &active, over) => {
                let task = find_task(columns, &active.id)?;
                let column = find_column(columns, &over.id)?;
                Some(DragIntent::MoveTask {
                    task_id: task.id.clone(),
                    from: task.location(),
                    to: TaskDestination::new(over.id.clone(), column.tasks.len() as i32),
                })
            }
            _ => None,
        }
    }
}

/// Task dropped on another task of its own column
pub fn is_same_column_task_move(columns: &[EnrichedColumn], active: &DragItem, over: &OverTarget) -> bool {
    if active.kind != ItemKind::Task || over.kind != ItemKind::Task || active.id == over.id {
        return false;
    }
    match (find_task(columns, &active.id), find_task(columns, &over.id)) {
        (Some(task), Some(over_task)) => task.column_id == over_task.column_id,
        _ => false,
    }
}

/// Task dropped on a column other than its own
pub fn is_different_column_move(columns: &[EnrichedColumn], active: &DragItem, over: &OverTarget) -> bool {
    if active.kind != ItemKind::Task || over.kind != ItemKind::Column {
        return false;
    }
    find_task(columns, &active.id).is_some_and(|task| task.column_id != over.id)
}
