use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::domain::{ConfigError, QueueDescriptor, QueueName};
use crate::handler::HandlerInvoker;

/// Validated consumer configuration for one queue.
///
/// Built once during Starting and reused for every restart of that queue.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerSpec {
    queue: QueueName,
    handler: String,
    method: String,
    args: Vec<Value>,
}

impl WorkerSpec {
    pub fn new(queue: QueueName, handler: &str, method: &str, args: Vec<Value>) -> Self {
        Self {
            queue,
            handler: handler.to_string(),
            method: method.to_string(),
            args,
        }
    }

    /// `handler_class` / `method` must be non-blank; both are stored trimmed.
    pub fn from_descriptor(
        queue: QueueName,
        descriptor: &QueueDescriptor,
    ) -> Result<Self, ConfigError> {
        let handler = required(descriptor.handler_name())
            .ok_or_else(|| ConfigError::HandlerClassNotFound(queue.to_string()))?;
        let method = required(descriptor.method.as_deref())
            .ok_or_else(|| ConfigError::MethodNotFound(queue.to_string()))?;
        let args = descriptor.arguments()?;

        Ok(Self::new(queue, handler, method, args))
    }

    pub fn queue(&self) -> &QueueName {
        &self.queue
    }

    pub fn handler(&self) -> &str {
        &self.handler
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn args(&self) -> &[Value] {
        &self.args
    }
}

fn required(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Handle to one running worker task.
///
/// Dropping the handle detaches the task; it never cancels it.
pub struct WorkerHandle {
    spec: Arc<WorkerSpec>,
    generation: u32,
    join: JoinHandle<()>,
}

impl WorkerHandle {
    /// Spawn the first worker for `spec`.
    pub fn spawn(spec: Arc<WorkerSpec>, invoker: HandlerInvoker) -> Self {
        Self::spawn_generation(spec, invoker, 0)
    }

    /// Spawn a replacement for this (dead) worker from the same spec.
    pub fn respawn(&self, invoker: HandlerInvoker) -> Self {
        Self::spawn_generation(Arc::clone(&self.spec), invoker, self.generation + 1)
    }

    fn spawn_generation(spec: Arc<WorkerSpec>, invoker: HandlerInvoker, generation: u32) -> Self {
        let join = tokio::spawn(run_worker(Arc::clone(&spec), invoker));
        Self {
            spec,
            generation,
            join,
        }
    }

    pub fn queue(&self) -> &QueueName {
        self.spec.queue()
    }

    pub fn spec(&self) -> &Arc<WorkerSpec> {
        &self.spec
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Liveness query. A handle may report alive and finish right after.
    pub fn is_alive(&self) -> bool {
        !self.join.is_finished()
    }
}

/// Body of a worker: invoke the handler exactly once, then finish.
///
/// Retrying is the supervisor's job, so failures are only logged here.
async fn run_worker(spec: Arc<WorkerSpec>, invoker: HandlerInvoker) {
    info!("Initializing {}", spec.queue());

    let result = invoker
        .invoke(spec.handler(), spec.method(), spec.args().to_vec())
        .await;

    match result {
        Ok(_) => warn!(
            "{}: {}#{} returned",
            spec.queue(),
            spec.handler(),
            spec.method()
        ),
        Err(failure) => error!("{}: {} - {}", spec.queue(), failure.kind, failure.message),
    }
}
