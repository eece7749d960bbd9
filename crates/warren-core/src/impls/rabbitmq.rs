//! ConsumerInspector - RabbitMQ Management API でコンシューマの生存確認
//!
//! Supervisor とは独立した補助機能。
//! `GET <url>/api/queues/%2F/<queue>` の `consumer_details` を見る。
//! 設定なし・通信エラー・想定外のレスポンスはすべて「非アクティブ」。

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::{ConfigDocument, ConfigError, RabbitMqSettings};

const DEFAULT_VHOST: &str = "/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct QueueDetails {
    consumer_details: Vec<ConsumerDetail>,
}

#[derive(Debug, Deserialize)]
struct ConsumerDetail {
    #[serde(default)]
    consumer_tag: Option<String>,
    #[serde(default)]
    active: Option<bool>,
}

#[derive(Debug, Clone)]
pub struct ConsumerInspector {
    settings: Option<RabbitMqSettings>,
    client: reqwest::Client,
}

impl ConsumerInspector {
    pub fn new(settings: Option<RabbitMqSettings>) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { settings, client })
    }

    /// `rabbitmq` セクションから作る。セクションが無くても Ok（常に false を返す）。
    pub fn from_config(config: &ConfigDocument) -> Result<Self, ConfigError> {
        let settings = config.rabbitmq()?;
        Self::new(settings).map_err(|e| ConfigError::ConfigInvalidContent(e.to_string()))
    }

    pub async fn is_active(&self, queue: &str, consumer_tag: &str) -> bool {
        let Some(settings) = &self.settings else {
            debug!("rabbitmq is not configured");
            return false;
        };

        match self.fetch(settings, queue).await {
            Ok(details) => details
                .consumer_details
                .iter()
                .any(|c| c.consumer_tag.as_deref() == Some(consumer_tag) && c.active == Some(true)),
            Err(err) => {
                warn!(queue, error = %err, "failed to inspect consumers");
                false
            }
        }
    }

    async fn fetch(&self, settings: &RabbitMqSettings, queue: &str) -> Result<QueueDetails, String> {
        let url = queue_url(&settings.url, queue)?;

        let mut request = self.client.get(url);
        if let Some(username) = &settings.username {
            request = request.basic_auth(username, settings.password.as_ref());
        }

        let response = request.send().await.map_err(|e| e.to_string())?;
        let response = response.error_for_status().map_err(|e| e.to_string())?;
        response.json::<QueueDetails>().await.map_err(|e| e.to_string())
    }
}

fn queue_url(base: &str, queue: &str) -> Result<Url, String> {
    let mut url = Url::parse(base).map_err(|e| format!("invalid rabbitmq url `{base}`: {e}"))?;
    url.path_segments_mut()
        .map_err(|_| format!("rabbitmq url `{base}` cannot be a base"))?
        .pop_if_empty()
        .extend(["api", "queues", DEFAULT_VHOST, queue]);
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    fn settings(url: String) -> Option<RabbitMqSettings> {
        Some(RabbitMqSettings {
            url,
            username: Some("guest".to_string()),
            password: Some("guest".to_string()),
        })
    }

    #[test]
    fn vhost_is_percent_encoded() {
        let url = queue_url("http://mq:15672", "orders").unwrap();
        assert_eq!(url.as_str(), "http://mq:15672/api/queues/%2F/orders");

        let url = queue_url("http://mq:15672/", "orders").unwrap();
        assert_eq!(url.as_str(), "http://mq:15672/api/queues/%2F/orders");
    }

    #[rstest]
    #[case::active(json!({"consumer_details": [{"consumer_tag": "ctag-1", "active": true}]}), true)]
    #[case::inactive(json!({"consumer_details": [{"consumer_tag": "ctag-1", "active": false}]}), false)]
    #[case::other_tag(json!({"consumer_details": [{"consumer_tag": "ctag-2", "active": true}]}), false)]
    #[case::empty(json!({"consumer_details": []}), false)]
    #[case::not_an_array(json!({"consumer_details": "nope"}), false)]
    #[case::missing(json!({"name": "orders"}), false)]
    #[tokio::test]
    async fn reports_consumer_activity(#[case] body: serde_json::Value, #[case] expected: bool) {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path_contains("/api/queues/")
                    .path_contains("orders")
                    .header("authorization", "Basic Z3Vlc3Q6Z3Vlc3Q=");
                then.status(200).json_body(body);
            })
            .await;

        let inspector = ConsumerInspector::new(settings(server.base_url())).unwrap();

        assert_eq!(inspector.is_active("orders", "ctag-1").await, expected);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_is_inactive() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(404);
            })
            .await;

        let inspector = ConsumerInspector::new(settings(server.base_url())).unwrap();
        assert!(!inspector.is_active("orders", "ctag-1").await);
    }

    #[tokio::test]
    async fn unreachable_server_is_inactive() {
        let inspector = ConsumerInspector::new(settings("http://127.0.0.1:9".into())).unwrap();
        assert!(!inspector.is_active("orders", "ctag-1").await);
    }

    #[tokio::test]
    async fn unconfigured_is_inactive() {
        let config = ConfigDocument::from_yaml_str("name: x\n").unwrap();
        let inspector = ConsumerInspector::from_config(&config).unwrap();
        assert!(!inspector.is_active("orders", "ctag-1").await);
    }
}
