//! Position Model
//!
//! Ordering rules for columns and tasks. Sibling positions form an
//! unbroken run starting at the sibling kind's base (see
//! [`COLUMN_POSITION_BASE`] and [`crate::TASK_POSITION_BASE`]).
//!
//! Nothing here validates indices: callers bound-check first.

use crate::models::{Column, EnrichedColumn, Task, TaskDestination, COLUMN_POSITION_BASE};

/// Anything ranked among siblings
pub trait Positioned {
    fn item_id(&self) -> &str;
    fn position(&self) -> i32;
    fn set_position(&mut self, position: i32);
}

impl Positioned for Column {
    fn item_id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> i32 {
        self.position
    }
    fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}

impl Positioned for Task {
    fn item_id(&self) -> &str {
        &self.id
    }
    fn position(&self) -> i32 {
        self.position
    }
    fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}

impl Positioned for EnrichedColumn {
    fn item_id(&self) -> &str {
        &self.column.id
    }
    fn position(&self) -> i32 {
        self.column.position
    }
    fn set_position(&mut self, position: i32) {
        self.column.position = position;
    }
}

/// Remove the item at `from_index` and reinsert it at `to_index`
/// (array move, not swap), returning the resulting id order.
///
/// # Panics
///
/// If either index is out of range for `items`.
pub fn reorder<T: Positioned>(items: &[T], from_index: usize, to_index: usize) -> Vec<String> {
    let mut ids: Vec<String> = items.iter().map(|item| item.item_id().to_string()).collect();
    if from_index != to_index {
        let moved = ids.remove(from_index);
        ids.insert(to_index, moved);
    }
    ids
}

/// True unless the task already sits at `destination`
pub fn has_moved(task: &Task, destination: &TaskDestination) -> bool {
    !(task.column_id == destination.column_id && task.position == destination.position)
}

/// Rank of `id` within `ids`, counted from `base`
pub fn rank_of(ids: &[String], id: &str, base: i32) -> Option<i32> {
    ids.iter().position(|candidate| candidate == id).map(|index| base + index as i32)
}

/// Ids sorted by ascending position (stable for ties)
pub fn sorted_ids<T: Positioned>(items: &[T]) -> Vec<String> {
    let mut refs: Vec<&T> = items.iter().collect();
    refs.sort_by_key(|item| item.position());
    refs.into_iter().map(|item| item.item_id().to_string()).collect()
}

/// Whether sorted positions are exactly `base..base + len`
pub fn is_contiguous<T: Positioned>(items: &[T], base: i32) -> bool {
    let mut positions: Vec<i32> = items.iter().map(Positioned::position).collect();
    positions.sort_unstable();
    positions
        .iter()
        .enumerate()
        .all(|(index, position)| *position == base + index as i32)
}

/// Rewrite positions to match slice order
pub fn renumber<T: Positioned>(items: &mut [T], base: i32) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_position(base + index as i32);
    }
}

/// First index where two orders disagree
pub fn first_divergence(current: &[String], proposed: &[String]) -> Option<usize> {
    proposed
        .iter()
        .enumerate()
        .find(|(index, id)| current.get(*index) != Some(*id))
        .map(|(index, _)| index)
}

// ========================
// Column Navigation
// ========================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

/// Whether a column can still shift left or right
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnNav {
    pub can_move_left: bool,
    pub can_move_right: bool,
}

pub fn column_nav<T: Positioned>(columns: &[T], column_id: &str) -> Option<ColumnNav> {
    let ids = sorted_ids(columns);
    let index = ids.iter().position(|id| id == column_id)?;
    Some(ColumnNav {
        can_move_left: index > 0,
        can_move_right: index + 1 < ids.len(),
    })
}

/// Order after swapping a column with its neighbour; `None` at the edges
pub fn neighbor_swap<T: Positioned>(columns: &[T], column_id: &str, direction: Direction) -> Option<Vec<String>> {
    let mut ids = sorted_ids(columns);
    let index = ids.iter().position(|id| id == column_id)?;
    let target = match direction {
        Direction::Left => index.checked_sub(1)?,
        Direction::Right => index + 1,
    };
    if target >= ids.len() {
        return None;
    }
    ids.swap(index, target);
    Some(ids)
}

/// Order after moving a column to a 1-indexed position; `None` when out of range
pub fn move_to_position<T: Positioned>(columns: &[T], column_id: &str, position: i32) -> Option<Vec<String>> {
    let mut sorted: Vec<&T> = columns.iter().collect();
    sorted.sort_by_key(|column| column.position());
    let from = sorted.iter().position(|column| column.item_id() == column_id)?;
    let to = position - COLUMN_POSITION_BASE;
    if to < 0 || to as usize >= sorted.len() {
        return None;
    }
    let mut ids: Vec<String> = sorted.iter().map(|column| column.item_id().to_string()).collect();
    let moved = ids.remove(from);
    ids.insert(to as usize, moved);
    Some(ids)
}

/// Id order the server ends up with after moving one column to a
/// 1-indexed position and shifting the columns in between
pub fn cascade_column_move(ids: &[String], column_id: &str, position: i32) -> Option<Vec<String>> {
    let from = ids.iter().position(|id| id == column_id)?;
    let last = ids.len() as i32 - 1;
    let to = (position - COLUMN_POSITION_BASE).clamp(0, last) as usize;
    let mut ids = ids.to_vec();
    let moved = ids.remove(from);
    ids.insert(to, moved);
    Some(ids)
}

/// The single column position update sent for a reorder: the column
/// arriving at the first diverging index, at its 1-indexed rank in the new
/// order. The server shifts the others.
///
/// Only leftward moves land exactly. Moving a column right sends the column
/// that slid into its old slot, so the server ends up with that column
/// moved back by one instead.
pub fn single_column_update(current: &[String], proposed: &[String]) -> Option<(String, i32)> {
    let index = first_divergence(current, proposed)?;
    let id = proposed[index].clone();
    let position = rank_of(proposed, &id, COLUMN_POSITION_BASE)?;
    Some((id, position))
}

/// Render key that changes whenever column order changes
pub fn columns_key<T: Positioned>(columns: &[T]) -> String {
    columns
        .iter()
        .map(|column| format!("{}-{}", column.item_id(), column.position()))
        .collect::<Vec<_>>()
        .join("-")
}

// ========================
// Task Lookup
// ========================

pub fn find_task<'a>(columns: &'a [EnrichedColumn], task_id: &str) -> Option<&'a Task> {
    columns
        .iter()
        .flat_map(|column| column.tasks.iter())
        .find(|task| task.id == task_id)
}

pub fn find_column<'a>(columns: &'a [EnrichedColumn], column_id: &str) -> Option<&'a EnrichedColumn> {
    columns.iter().find(|column| column.id() == column_id)
}

pub fn task_index(column: &EnrichedColumn, task_id: &str) -> Option<usize> {
    column.tasks.iter().position(|task| task.id == task_id)
}

/// Insert before the hovered task when approaching from above, after it otherwise.
/// Without a measured active top the hovered index is used as is.
pub fn determine_task_position(active_translated_top: Option<f64>, over_top: f64, over_index: usize) -> i32 {
    match active_translated_top {
        Some(top) if top < over_top => over_index as i32,
        Some(_) => over_index as i32 + 1,
        None => over_index as i32,
    }
}
