//! Status - Supervisor の状態スナップショット
//!
//! # 使用例
//! ```ignore
//! let status = supervisor.status();
//! println!("{}", serde_json::to_string(&status)?);
//! ```
//!
//! Closing 時には同じ JSON が debug ログに出る。

use serde::Serialize;

/// Supervisor の状態遷移: Starting → Monitoring → Closing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SupervisorState {
    Starting,
    Monitoring,
    Closing,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkerStatus {
    pub queue: String,
    pub alive: bool,
    pub generation: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupervisorStatus {
    pub state: SupervisorState,
    pub restarts: u32,
    pub max_restarts: u32,
    pub alive: usize,
    pub workers: Vec<WorkerStatus>,
}
