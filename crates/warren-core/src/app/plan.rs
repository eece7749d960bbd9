//! WorkerPlan - 設定から起動すべき Worker の一覧を導出する
//!
//! Starting の検証はすべてここで終わらせる。
//! 1 件でも設定エラーがあれば Worker は 1 つも起動しない。

use std::collections::HashSet;
use std::sync::Arc;

use super::worker::WorkerSpec;
use crate::domain::{ConfigDocument, ConfigError};

/// 起動予定の Worker 1 件
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedWorker {
    /// 最初にこのキューを列挙した context
    pub context: String,
    pub spec: Arc<WorkerSpec>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerPlan {
    pub contexts: Vec<String>,
    pub workers: Vec<PlannedWorker>,
}

impl WorkerPlan {
    /// context 順 → キュー順で走査する。
    /// 複数の context に出てくるキューは最初の 1 回だけ採用する。
    pub fn from_config(config: &ConfigDocument) -> Result<Self, ConfigError> {
        let contexts = config.context_names()?;

        let mut seen = HashSet::new();
        let mut workers = Vec::new();
        for context in &contexts {
            for queue in config.context_queues(context)? {
                let descriptor = config.queue_descriptor(context, &queue)?;
                let spec = WorkerSpec::from_descriptor(queue.clone(), &descriptor)?;
                if seen.insert(queue) {
                    workers.push(PlannedWorker {
                        context: context.clone(),
                        spec: Arc::new(spec),
                    });
                }
            }
        }

        Ok(Self { contexts, workers })
    }

    /// 設定が参照している handler 名（重複なし、出現順）
    pub fn handler_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.workers
            .iter()
            .map(|w| w.spec.handler().to_string())
            .filter(|h| seen.insert(h.clone()))
            .collect()
    }
}
