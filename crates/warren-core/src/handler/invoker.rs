use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;

use super::registry::HandlerRegistry;
use crate::domain::{FailureKind, InvocationFailure};

/// HandlerInvoker executes `handler#method(args)` through the capability table.
///
/// Every failure (unknown handler, unknown method, bad arguments, an error
/// returned by user logic, a panic inside user logic) comes back as an
/// `InvocationFailure`.
#[derive(Clone)]
pub struct HandlerInvoker {
    registry: Arc<HandlerRegistry>,
}

impl HandlerInvoker {
    pub fn new(registry: Arc<HandlerRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub async fn invoke(
        &self,
        handler: &str,
        method: &str,
        args: Vec<Value>,
    ) -> Result<Value, InvocationFailure> {
        let failure =
            |kind, message: String| InvocationFailure::new(kind, handler, method, &args, message);

        // factory はユーザーコードなので panic し得る
        let capability = std::panic::catch_unwind(AssertUnwindSafe(|| {
            self.registry.resolve(handler)
        }))
        .map_err(|panic| failure(FailureKind::Panicked, panic_message(&*panic)))?
        .ok_or_else(|| {
            failure(
                FailureKind::NotFound,
                format!("handler {handler} is not registered"),
            )
        })?;

        let target = capability.get(method).ok_or_else(|| {
            failure(
                FailureKind::NotFound,
                format!("method {method} is not defined on {handler}"),
            )
        })?;

        match AssertUnwindSafe(target.call_dyn(args.clone()))
            .catch_unwind()
            .await
        {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(err)) => Err(failure(err.kind(), err.to_string())),
            Err(panic) => Err(failure(FailureKind::Panicked, panic_message(&*panic))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
