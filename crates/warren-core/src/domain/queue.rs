use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::errors::ConfigError;

/// 設定ファイル上のキュー名。WorkerRegistry のキーになる。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueueName(String);

impl QueueName {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for QueueName {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// `queues.<name>` の中身そのまま。
///
/// 必須項目のチェックは `WorkerSpec::from_descriptor` で行うので、
/// ここでは全部 Option で受ける。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct QueueDescriptor {
    #[serde(default)]
    pub handler_class: Option<String>,

    /// `handler_class` の短縮形。両方あれば `handler_class` が優先。
    #[serde(default)]
    pub handler: Option<String>,

    #[serde(default)]
    pub method: Option<String>,

    #[serde(default)]
    pub parameters: Option<serde_yaml::Value>,
}

impl QueueDescriptor {
    pub fn new(handler_class: &str, method: &str) -> Self {
        Self {
            handler_class: Some(handler_class.to_string()),
            handler: None,
            method: Some(method.to_string()),
            parameters: None,
        }
    }

    pub fn with_parameters(mut self, parameters: serde_yaml::Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// 実際に使う handler 名（`handler_class` → `handler` の順）
    pub fn handler_name(&self) -> Option<&str> {
        self.handler_class.as_deref().or(self.handler.as_deref())
    }

    /// parameters を引数列に変換する
    ///
    /// - 未指定 / null → 空
    /// - sequence → 要素ごとに 1 引数
    /// - それ以外 → その値を 1 引数として渡す
    pub fn arguments(&self) -> Result<Vec<Value>, ConfigError> {
        match &self.parameters {
            None | Some(serde_yaml::Value::Null) => Ok(Vec::new()),
            Some(serde_yaml::Value::Sequence(items)) => items.iter().map(yaml_to_json).collect(),
            Some(other) => Ok(vec![yaml_to_json(other)?]),
        }
    }
}

fn yaml_to_json(value: &serde_yaml::Value) -> Result<Value, ConfigError> {
    serde_json::to_value(value)
        .map_err(|e| ConfigError::ConfigInvalidContent(format!("parameters: {e}")))
}
