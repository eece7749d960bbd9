//! ConfigDocument - 読み込み済みの設定ドキュメント
//!
//! ローダーが返した YAML mapping をそのまま保持し、
//! Supervisor が必要とする値だけを型付きで取り出す。
//! 値の欠落・型違いはここで ConfigError に変換される。

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_yaml::{Mapping, Value};

use super::errors::ConfigError;
use super::queue::{QueueDescriptor, QueueName};

/// heartbeat 未指定時の監視間隔（秒）
pub const DEFAULT_HEARTBEAT: Duration = Duration::from_secs(5);

/// max_restarts 未指定時の再起動上限
pub const DEFAULT_MAX_RESTARTS: u32 = 3;

pub const DEFAULT_LOG_PATH: &str = "logs/warren.log";

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    root: Mapping,
}

impl ConfigDocument {
    pub fn from_mapping(root: Mapping) -> Self {
        Self { root }
    }

    /// YAML 文字列をパースする。ルートが mapping 以外なら ConfigInvalidContent。
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::ConfigInvalidContent(e.to_string()))?;

        match value {
            Value::Mapping(root) => Ok(Self { root }),
            other => Err(ConfigError::ConfigInvalidContent(format!(
                "root must be a mapping, got {}",
                type_name(&other)
            ))),
        }
    }

    pub fn root(&self) -> &Mapping {
        &self.root
    }

    pub fn project_name(&self) -> Option<String> {
        self.root.get("name").and_then(scalar_to_string)
    }

    /// `contexts` のキー一覧（ドキュメント順）
    pub fn context_names(&self) -> Result<Vec<String>, ConfigError> {
        let Some(Value::Mapping(contexts)) = self.root.get("contexts") else {
            return Err(ConfigError::ContextNotFound);
        };

        contexts
            .keys()
            .map(|k| scalar_to_string(k).ok_or(ConfigError::ContextNotFound))
            .collect()
    }

    /// context に並んだキュー名
    ///
    /// `contexts.<context>: [..]` と `contexts.<context>.queues: [..]` のどちらも受け付ける。
    pub fn context_queues(&self, context: &str) -> Result<Vec<QueueName>, ConfigError> {
        let queues = match self.root.get("contexts").and_then(|c| c.get(context)) {
            Some(Value::Sequence(queues)) => Some(queues),
            Some(Value::Mapping(body)) => match body.get("queues") {
                Some(Value::Sequence(queues)) => Some(queues),
                _ => None,
            },
            _ => None,
        };

        let Some(queues) = queues else {
            return Err(ConfigError::QueueNotFound(format!("context {context}")));
        };

        queues
            .iter()
            .map(|q| {
                scalar_to_string(q).map(QueueName::new).ok_or_else(|| {
                    ConfigError::ConfigInvalidContent(format!(
                        "queue names under context {context} must be scalars"
                    ))
                })
            })
            .collect()
    }

    /// トップレベル `queues` から 1 件取り出す
    ///
    /// `queues` 自体が無い場合は、それを必要とした context 名で QueueNotFound。
    pub fn queue_descriptor(
        &self,
        context: &str,
        queue: &QueueName,
    ) -> Result<QueueDescriptor, ConfigError> {
        let Some(Value::Mapping(queues)) = self.root.get("queues") else {
            return Err(ConfigError::QueueNotFound(format!("context {context}")));
        };

        match queues.get(queue.as_str()) {
            None => Err(ConfigError::QueueNotFound(format!("queue {queue}"))),
            Some(Value::Null) => Ok(QueueDescriptor::default()),
            Some(value) => serde_yaml::from_value(value.clone()).map_err(|e| {
                ConfigError::ConfigInvalidContent(format!("queues.{queue}: {e}"))
            }),
        }
    }

    pub fn heartbeat(&self) -> Result<Duration, ConfigError> {
        match self.root.get("heartbeat") {
            None | Some(Value::Null) => Ok(DEFAULT_HEARTBEAT),
            Some(value) => value
                .as_f64()
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
                .ok_or_else(|| {
                    ConfigError::ConfigInvalidContent(
                        "heartbeat must be a non-negative number of seconds".to_string(),
                    )
                }),
        }
    }

    pub fn max_restarts(&self) -> Result<u32, ConfigError> {
        match self.root.get("max_restarts") {
            None | Some(Value::Null) => Ok(DEFAULT_MAX_RESTARTS),
            Some(value) => value
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .ok_or_else(|| {
                    ConfigError::ConfigInvalidContent(
                        "max_restarts must be a non-negative integer".to_string(),
                    )
                }),
        }
    }

    pub fn logging(&self) -> Result<LoggingSettings, ConfigError> {
        self.section("logging")
            .map(Option::unwrap_or_default)
    }

    pub fn rabbitmq(&self) -> Result<Option<RabbitMqSettings>, ConfigError> {
        self.section("rabbitmq")
    }

    /// `notifications.discord.webhook_url`。空文字は未設定扱い。
    pub fn discord_webhook_url(&self) -> Option<String> {
        self.root
            .get("notifications")
            .and_then(|n| n.get("discord"))
            .and_then(|d| d.get("webhook_url"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    }

    fn section<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.root.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_yaml::from_value(value.clone())
                .map(Some)
                .map_err(|e| ConfigError::ConfigInvalidContent(format!("{key}: {e}"))),
        }
    }
}

/// `logging` セクション
///
/// `max_size` は互換性のために受け付けるだけで、ローテーションは日次。
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub path: PathBuf,
    pub shift_count: usize,
    pub max_size: Option<u64>,
    pub level: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_LOG_PATH),
            shift_count: 1,
            max_size: None,
            level: "info".to_string(),
        }
    }
}

/// `rabbitmq` セクション（ConsumerInspector 用）
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RabbitMqSettings {
    pub url: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;

    const FULL: &str = r#"
name: billing
contexts:
  payments:
    queues: [charges, refunds]
  audit:
    queues: [refunds]
queues:
  charges:
    handler_class: Charges
    method: consume
    parameters: [charges.v1]
  refunds:
    handler: Refunds
    method: consume
heartbeat: 0.5
max_restarts: 7
notifications:
  discord:
    webhook_url: https://discord.example/hook
logging:
  path: /tmp/warren/test.log
  shift_count: 4
rabbitmq:
  url: http://localhost:15672
  username: guest
  password: guest
"#;

    fn doc(yaml: &str) -> ConfigDocument {
        ConfigDocument::from_yaml_str(yaml).unwrap()
    }

    #[test]
    fn reads_full_document() {
        let doc = doc(FULL);

        assert_eq!(doc.project_name().as_deref(), Some("billing"));
        assert_eq!(doc.context_names().unwrap(), vec!["payments", "audit"]);
        assert_eq!(
            doc.context_queues("payments").unwrap(),
            vec![QueueName::new("charges"), QueueName::new("refunds")]
        );
        assert_eq!(doc.heartbeat().unwrap(), Duration::from_millis(500));
        assert_eq!(doc.max_restarts().unwrap(), 7);
        assert_eq!(
            doc.discord_webhook_url().as_deref(),
            Some("https://discord.example/hook")
        );

        let logging = doc.logging().unwrap();
        assert_eq!(logging.path, PathBuf::from("/tmp/warren/test.log"));
        assert_eq!(logging.shift_count, 4);
        assert_eq!(logging.level, "info");

        let rabbit = doc.rabbitmq().unwrap().unwrap();
        assert_eq!(rabbit.url, "http://localhost:15672");
        assert_eq!(rabbit.username.as_deref(), Some("guest"));
    }

    #[test]
    fn defaults_apply_when_keys_are_absent() {
        let doc = doc("contexts: {}\n");

        assert_eq!(doc.heartbeat().unwrap(), DEFAULT_HEARTBEAT);
        assert_eq!(doc.heartbeat().unwrap(), Duration::from_secs(5));
        assert_eq!(doc.max_restarts().unwrap(), 3);
        assert_eq!(doc.logging().unwrap(), LoggingSettings::default());
        assert_eq!(doc.rabbitmq().unwrap(), None);
        assert_eq!(doc.discord_webhook_url(), None);
        assert_eq!(doc.project_name(), None);
    }

    #[rstest]
    #[case::missing("queues: {}\n")]
    #[case::sequence("contexts: [a, b]\n")]
    #[case::scalar("contexts: nope\n")]
    fn malformed_contexts_are_context_not_found(#[case] yaml: &str) {
        assert_matches!(doc(yaml).context_names(), Err(ConfigError::ContextNotFound));
    }

    #[test]
    fn flat_and_nested_context_lists_are_equivalent() {
        let doc = doc("contexts:\n  flat: [q1, q2]\n  nested:\n    queues: [q1, q2]\n");
        let expected = vec![QueueName::new("q1"), QueueName::new("q2")];

        assert_eq!(doc.context_queues("flat").unwrap(), expected);
        assert_eq!(doc.context_queues("nested").unwrap(), expected);
    }

    #[test]
    fn context_without_queue_list_is_queue_not_found() {
        let doc = doc("contexts:\n  c1:\n    other: 1\n");
        assert_matches!(
            doc.context_queues("c1"),
            Err(ConfigError::QueueNotFound(msg)) if msg.contains("c1")
        );
    }

    #[test]
    fn missing_top_level_queues_names_the_context() {
        let doc = doc("contexts:\n  c1:\n    queues: [q1]\n");
        assert_matches!(
            doc.queue_descriptor("c1", &QueueName::new("q1")),
            Err(ConfigError::QueueNotFound(msg)) if msg.contains("c1")
        );
    }

    #[test]
    fn unknown_queue_is_queue_not_found() {
        let doc = doc(FULL);
        assert_matches!(
            doc.queue_descriptor("payments", &QueueName::new("ghost")),
            Err(ConfigError::QueueNotFound(msg)) if msg.contains("ghost")
        );
    }

    #[rstest]
    #[case::scalar("just a string")]
    #[case::sequence("- a\n- b\n")]
    #[case::syntax("contexts: [unclosed\n")]
    fn non_mapping_documents_are_invalid(#[case] yaml: &str) {
        assert_matches!(
            ConfigDocument::from_yaml_str(yaml),
            Err(ConfigError::ConfigInvalidContent(_))
        );
    }

    #[rstest]
    #[case::negative_heartbeat("heartbeat: -1\n")]
    #[case::string_heartbeat("heartbeat: soon\n")]
    fn invalid_heartbeat_is_rejected(#[case] yaml: &str) {
        assert_matches!(doc(yaml).heartbeat(), Err(ConfigError::ConfigInvalidContent(_)));
    }

    #[test]
    fn invalid_max_restarts_is_rejected() {
        assert_matches!(
            doc("max_restarts: -2\n").max_restarts(),
            Err(ConfigError::ConfigInvalidContent(_))
        );
    }

    #[test]
    fn blank_webhook_url_is_treated_as_unset() {
        let doc = doc("notifications:\n  discord:\n    webhook_url: '  '\n");
        assert_eq!(doc.discord_webhook_url(), None);
    }
}
