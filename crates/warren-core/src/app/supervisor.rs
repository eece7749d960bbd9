//! Supervisor - Worker の起動・監視・再起動
//!
//! # 状態遷移
//! ```text
//! Starting ──start()──► Monitoring ──tick() == Close──► Closing
//!                         ▲    │
//!                         └────┘ sleep(heartbeat)
//! ```
//!
//! # tick の中身
//! 1. `restarts >= max_restarts` なら Closing へ
//! 2. 停止している Worker を登録順に再起動し、1 件ごとに `restarts += 1`
//!
//! 上限チェックは tick の先頭だけなので、1 回の tick で上限を超えて
//! 複数再起動することがある（最大 1 tick 遅れで止まる）。
//! 正常終了した Worker もクラッシュと同じ扱いで再起動する。

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::notification::Notification;
use super::plan::WorkerPlan;
use super::registry::WorkerRegistry;
use super::status::{SupervisorState, SupervisorStatus, WorkerStatus};
use super::worker::WorkerHandle;
use crate::domain::{ConfigDocument, ConfigError, QueueName, DEFAULT_HEARTBEAT, DEFAULT_MAX_RESTARTS};
use crate::handler::HandlerInvoker;
use crate::ports::{Clock, Notifier};

/// 1 回の tick の結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// 監視を続ける。この tick で再起動したキュー（順序どおり）
    Continue { restarted: Vec<QueueName> },
    /// 上限に達した
    Close,
}

/// Closing まで到達したときの報告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Closed {
    pub restarts: u32,
    pub notified: Option<bool>,
}

pub struct Supervisor {
    config: ConfigDocument,
    invoker: HandlerInvoker,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    workers: WorkerRegistry,
    contexts: Vec<String>,
    heartbeat: Duration,
    max_restarts: u32,
    restarts: u32,
    state: SupervisorState,
}

impl Supervisor {
    pub fn new(
        config: ConfigDocument,
        invoker: HandlerInvoker,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            invoker,
            notifier,
            clock,
            workers: WorkerRegistry::new(),
            contexts: Vec::new(),
            heartbeat: DEFAULT_HEARTBEAT,
            max_restarts: DEFAULT_MAX_RESTARTS,
            restarts: 0,
            state: SupervisorState::Starting,
        }
    }

    /// Starting: 設定を検証し、全キューの Worker を起動する
    ///
    /// 検証はすべて spawn の前に終わるので、Err の場合 Worker は 0 件。
    /// tokio runtime の中で呼ぶこと。
    pub fn start(&mut self) -> Result<(), ConfigError> {
        let heartbeat = self.config.heartbeat()?;
        let max_restarts = self.config.max_restarts()?;
        let plan = WorkerPlan::from_config(&self.config)?;

        self.heartbeat = heartbeat;
        self.max_restarts = max_restarts;
        self.contexts = plan.contexts;

        for planned in plan.workers {
            info!(
                "Create consumer in Queue: {} - Context: {}",
                planned.spec.queue(),
                planned.context
            );
            let queue = planned.spec.queue().clone();
            let handle = WorkerHandle::spawn(planned.spec, self.invoker.clone());
            self.workers.set(queue, handle);
        }

        self.state = SupervisorState::Monitoring;
        Ok(())
    }

    /// Monitoring の 1 周（sleep は含まない）
    pub fn tick(&mut self) -> Tick {
        if self.state == SupervisorState::Closing || self.restarts >= self.max_restarts {
            self.state = SupervisorState::Closing;
            return Tick::Close;
        }

        let dead = self.workers.dead_queues();
        for queue in &dead {
            self.restart(queue);
        }

        Tick::Continue { restarted: dead }
    }

    fn restart(&mut self, queue: &QueueName) {
        let Some(previous) = self.workers.get(queue) else {
            return;
        };
        let handle = previous.respawn(self.invoker.clone());

        self.restarts = self.restarts.saturating_add(1);
        warn!("[Restart process] queue: {} restarts: {}", queue, self.restarts);

        self.workers.set(queue.clone(), handle);
    }

    /// Closing: 通知（失敗は無視）して最終ログを出す
    pub async fn close(&mut self) -> Closed {
        self.state = SupervisorState::Closing;

        let notification = Notification::new(
            self.config.project_name(),
            self.contexts.clone(),
            self.restarts,
            self.clock.now(),
        );
        let notified = notification.send(self.notifier.as_ref()).await;

        if let Ok(status) = serde_json::to_string(&self.status()) {
            debug!(%status, "final worker status");
        }
        info!("[Close process] restarts {}", self.restarts);

        Closed {
            restarts: self.restarts,
            notified,
        }
    }

    /// start → tick/sleep を上限まで繰り返す → close
    ///
    /// 戻ってきたら呼び出し側はプロセスを終了する。
    /// 走っている Worker は待たない。
    pub async fn run(mut self) -> Result<Closed, ConfigError> {
        self.start()?;

        while let Tick::Continue { .. } = self.tick() {
            self.clock.sleep(self.heartbeat).await;
        }

        Ok(self.close().await)
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    pub fn restarts(&self) -> u32 {
        self.restarts
    }

    pub fn max_restarts(&self) -> u32 {
        self.max_restarts
    }

    pub fn heartbeat(&self) -> Duration {
        self.heartbeat
    }

    pub fn contexts(&self) -> &[String] {
        &self.contexts
    }

    pub fn workers(&self) -> &WorkerRegistry {
        &self.workers
    }

    pub fn status(&self) -> SupervisorStatus {
        let workers: Vec<WorkerStatus> = self
            .workers
            .iter()
            .map(|(queue, handle)| WorkerStatus {
                queue: queue.to_string(),
                alive: handle.is_alive(),
                generation: handle.generation(),
            })
            .collect();

        SupervisorStatus {
            state: self.state,
            restarts: self.restarts,
            max_restarts: self.max_restarts,
            alive: self.workers.alive_count(),
            workers,
        }
    }
}
