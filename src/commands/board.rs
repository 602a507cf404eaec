//! Board Commands
//!
//! [`BoardApi`] over the REST endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use taskwave_board::{
    BoardApi, BoardDetails, BoardResult, Column, ColumnPatch, NewColumn, NewTask, Task, TaskDestination, TaskPatch,
};

use super::{request, request_empty, Envelope};
use crate::config::ClientConfig;

// ========================
// Response Payloads
// ========================

#[derive(Deserialize)]
pub struct TaskData {
    pub task: Task,
}

#[derive(Deserialize)]
pub struct ColumnData {
    pub column: Column,
}

fn to_body<T: Serialize>(value: &T) -> BoardResult<Option<String>> {
    Ok(Some(serde_json::to_string(value)?))
}

// ========================
// Client
// ========================

pub struct HttpBoardApi {
    config: ClientConfig,
    token: Option<String>,
}

impl HttpBoardApi {
    pub fn new(config: ClientConfig, token: Option<String>) -> Self {
        Self { config, token }
    }

    fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }
}

#[async_trait(?Send)]
impl BoardApi for HttpBoardApi {
    async fn get_board_details(&self, board_id: &str) -> BoardResult<BoardDetails> {
        let url = self.config.endpoint(&format!("boards/{}", board_id));
        request("GET", &url, self.token(), None).await
    }

    async fn create_column(&self, column: NewColumn) -> BoardResult<Column> {
        let url = self.config.endpoint("columns");
        let envelope: Envelope<ColumnData> = request("POST", &url, self.token(), to_body(&column)?).await?;
        Ok(envelope.data.column)
    }

    async fn update_column(&self, column_id: &str, patch: ColumnPatch) -> BoardResult<Column> {
        let url = self.config.endpoint(&format!("columns/{}", column_id));
        let envelope: Envelope<ColumnData> = request("PUT", &url, self.token(), to_body(&patch)?).await?;
        Ok(envelope.data.column)
    }

    async fn delete_column(&self, column_id: &str) -> BoardResult<()> {
        let url = self.config.endpoint(&format!("columns/{}", column_id));
        request_empty("DELETE", &url, self.token()).await
    }

    async fn create_task(&self, task: NewTask) -> BoardResult<Task> {
        let url = self.config.endpoint("tasks");
        let envelope: Envelope<TaskData> = request("POST", &url, self.token(), to_body(&task)?).await?;
        Ok(envelope.data.task)
    }

    async fn update_task(&self, task_id: &str, patch: TaskPatch) -> BoardResult<Task> {
        let url = self.config.endpoint(&format!("tasks/{}", task_id));
        let envelope: Envelope<TaskData> = request("PUT", &url, self.token(), to_body(&patch)?).await?;
        Ok(envelope.data.task)
    }

    async fn move_task(&self, task_id: &str, destination: TaskDestination) -> BoardResult<Task> {
        let url = self.config.endpoint(&format!("tasks/{}/move", task_id));
        let envelope: Envelope<TaskData> = request("PUT", &url, self.token(), to_body(&destination)?).await?;
        Ok(envelope.data.task)
    }

    async fn delete_task(&self, task_id: &str) -> BoardResult<()> {
        let url = self.config.endpoint(&format!("tasks/{}", task_id));
        request_empty("DELETE", &url, self.token()).await
    }
}
