//! Board Models
//!
//! Data structures matching the board API payloads, plus the derived
//! views the drag subsystem and renderer consume.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type BoardId = String;
pub type ColumnId = String;
pub type TaskId = String;

/// Columns are ranked from 1 within their board
pub const COLUMN_POSITION_BASE: i32 = 1;
/// Tasks are ranked from 0 within their column
pub const TASK_POSITION_BASE: i32 = 0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

/// What a draggable or droppable element represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Column,
    Task,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub background_color: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub color: Option<String>,
    pub position: i32,
    pub board_id: BoardId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Column {
    pub fn new(id: impl Into<ColumnId>, board_id: impl Into<BoardId>, title: impl Into<String>, position: i32) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            color: None,
            position,
            board_id: board_id.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub position: i32,
    pub column_id: ColumnId,
    #[serde(default)]
    pub assignee_id: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    pub fn new(id: impl Into<TaskId>, column_id: impl Into<ColumnId>, title: impl Into<String>, position: i32) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            priority: Priority::Normal,
            due_date: None,
            position,
            column_id: column_id.into(),
            assignee_id: None,
            completed: false,
            labels: Vec::new(),
            attachments: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Where this task currently sits
    pub fn location(&self) -> TaskDestination {
        TaskDestination {
            column_id: self.column_id.clone(),
            position: self.position,
        }
    }
}

/// Column as delivered by the board details endpoint, tasks embedded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnWithTasks {
    #[serde(flatten)]
    pub column: Column,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// Board details payload: the sole reconciliation snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardDetails {
    #[serde(flatten)]
    pub board: Board,
    #[serde(default)]
    pub columns: Vec<ColumnWithTasks>,
}

impl BoardDetails {
    /// Split into the raw collections the store keeps
    pub fn into_parts(self) -> (Board, Vec<Column>, Vec<Task>) {
        let mut columns = Vec::with_capacity(self.columns.len());
        let mut tasks = Vec::new();
        for entry in self.columns {
            columns.push(entry.column);
            tasks.extend(entry.tasks);
        }
        (self.board, columns, tasks)
    }
}

/// A column decorated with its position-sorted tasks.
///
/// Derived only; rebuilt from the raw collections, never edited in place.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedColumn {
    #[serde(flatten)]
    pub column: Column,
    pub tasks: Vec<Task>,
}

impl EnrichedColumn {
    pub fn id(&self) -> &str {
        &self.column.id
    }

    pub fn position(&self) -> i32 {
        self.column.position
    }
}

/// Target (column, position) for a task move
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDestination {
    pub column_id: ColumnId,
    pub position: i32,
}

impl TaskDestination {
    pub fn new(column_id: impl Into<ColumnId>, position: i32) -> Self {
        Self {
            column_id: column_id.into(),
            position,
        }
    }
}

// ========================
// Mutation Payloads
// ========================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewColumn {
    pub title: String,
    pub board_id: BoardId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Partial column update; `None` fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
}

impl ColumnPatch {
    pub fn position(position: i32) -> Self {
        Self {
            position: Some(position),
            ..Default::default()
        }
    }

    /// Apply the non-positional fields; positions are renumbered by the caller
    pub fn apply_fields(&self, column: &mut Column) {
        if let Some(title) = &self.title {
            column.title = title.clone();
        }
        if let Some(color) = &self.color {
            column.color = Some(color.clone());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    pub column_id: ColumnId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
    #[serde(default)]
    pub completed: bool,
}

impl NewTask {
    pub const DEFAULT_TITLE: &'static str = "New task";

    pub fn new(column_id: impl Into<ColumnId>, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            title: if title.trim().is_empty() { Self::DEFAULT_TITLE.to_string() } else { title },
            column_id: column_id.into(),
            description: None,
            priority: Priority::Normal,
            due_date: None,
            position: None,
            labels: Vec::new(),
            attachments: Vec::new(),
            completed: false,
        }
    }
}

/// Partial task update; `None` fields keep their stored value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column_id: Option<ColumnId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<Vec<String>>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }

    /// Whether this patch relocates the task
    pub fn moves(&self) -> bool {
        self.column_id.is_some() || self.position.is_some()
    }

    /// Apply the non-positional fields; relocation goes through the move path
    pub fn apply_fields(&self, task: &mut Task) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = Some(due_date);
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(labels) = &self.labels {
            task.labels = labels.clone();
        }
    }
}
