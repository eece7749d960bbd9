use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use serde_json::Value;

use super::method::{DynMethod, FnMethod, Method, TypedMethod};
use crate::domain::HandlerError;

/// Capability は名前付きの method の集まり
///
/// 設定ファイルの `handler_class` がこの名前、`method` が method 名に対応する。
///
/// # 使用例
/// ```ignore
/// let orders = Capability::new("Orders")
///     .method("consume", Consume)
///     .method_fn("ping", |_args| async { Ok(json!("pong")) });
/// ```
pub struct Capability {
    name: String,
    methods: HashMap<String, Arc<dyn DynMethod>>,
}

impl Capability {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            methods: HashMap::new(),
        }
    }

    /// 型付き method を追加する。同名は後勝ち。
    pub fn method<M: Method + 'static>(mut self, name: &str, method: M) -> Self {
        self.methods
            .insert(name.to_string(), Arc::new(TypedMethod::new(method)));
        self
    }

    /// `Vec<Value>` をそのまま受け取るクロージャを method として追加する。
    pub fn method_fn<F, Fut>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        self.methods
            .insert(name.to_string(), Arc::new(FnMethod::new(f)));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn get(&self, method: &str) -> Option<Arc<dyn DynMethod>> {
        self.methods.get(method).cloned()
    }

    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }
}
