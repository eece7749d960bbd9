//! HandlerRegistry - capability テーブル
//!
//! 設定ファイルの `handler_class` 文字列を Capability に解決する。
//! 起動時に組み立て（mutable）、実行時は `Arc` で共有して読むだけ（immutable）。

use std::collections::HashMap;
use std::sync::Arc;

use super::capability::Capability;

type Factory = Arc<dyn Fn() -> Capability + Send + Sync>;

/// Capability の供給方法
enum Provider {
    /// 1 つのインスタンスを全呼び出しで共有する
    Singleton(Arc<Capability>),
    /// 呼び出しごとに新しいインスタンスを作る
    Factory(Factory),
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("handler '{0}' is already registered")]
    AlreadyRegistered(String),
}

/// HandlerRegistry は handler 名 → Capability の対応表
///
/// # 使用例
/// ```ignore
/// let mut registry = HandlerRegistry::new();
/// registry.register(Capability::new("Orders").method("consume", Consume))?;
/// registry.register_factory("Mailer", || Capability::new("Mailer").method("drain", Drain::default()))?;
/// ```
#[derive(Default)]
pub struct HandlerRegistry {
    providers: HashMap<String, Provider>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// singleton として登録する。キーは `capability.name()`。
    pub fn register(&mut self, capability: Capability) -> Result<(), RegistryError> {
        let name = capability.name().to_string();
        self.insert(name, Provider::Singleton(Arc::new(capability)))
    }

    /// factory として登録する。呼び出しのたびに `factory()` が実行される。
    pub fn register_factory<F>(&mut self, name: &str, factory: F) -> Result<(), RegistryError>
    where
        F: Fn() -> Capability + Send + Sync + 'static,
    {
        self.insert(name.to_string(), Provider::Factory(Arc::new(factory)))
    }

    pub fn resolve(&self, handler: &str) -> Option<Arc<Capability>> {
        match self.providers.get(handler)? {
            Provider::Singleton(capability) => Some(Arc::clone(capability)),
            Provider::Factory(factory) => Some(Arc::new(factory())),
        }
    }

    pub fn contains(&self, handler: &str) -> bool {
        self.providers.contains_key(handler)
    }

    pub fn registered_handlers(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    fn insert(&mut self, name: String, provider: Provider) -> Result<(), RegistryError> {
        if self.providers.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        self.providers.insert(name, provider);
        Ok(())
    }
}
