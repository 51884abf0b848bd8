//! Canned-response session.

use std::collections::VecDeque;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Row, Session, SessionError};
use crate::sql::Value;

/// A statement the session was asked to run.
#[derive(Debug, Clone, PartialEq)]
pub struct Executed {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Session that replays queued responses in order and records every
/// statement it receives. An empty queue answers with no rows.
#[derive(Debug, Default)]
pub struct MemorySession {
    responses: Mutex<VecDeque<Result<Vec<Row>, SessionError>>>,
    executed: Mutex<Vec<Executed>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful response.
    pub fn with_rows(mut self, rows: Vec<Row>) -> Self {
        self.responses.get_mut().push_back(Ok(rows));
        self
    }

    /// Queue a failure.
    pub fn with_error(mut self, err: SessionError) -> Self {
        self.responses.get_mut().push_back(Err(err));
        self
    }

    pub async fn push_rows(&self, rows: Vec<Row>) {
        self.responses.lock().await.push_back(Ok(rows));
    }

    /// Statements executed so far, oldest first.
    pub async fn executed(&self) -> Vec<Executed> {
        self.executed.lock().await.clone()
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, SessionError> {
        self.executed.lock().await.push(Executed {
            sql: sql.into(),
            params: params.to_vec(),
        });
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}
