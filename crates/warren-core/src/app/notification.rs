use chrono::{DateTime, Utc};

use crate::ports::Notifier;

pub const TITLE: &str = "Process restarting";

/// Closing 時に送る通知の中身
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    project: Option<String>,
    contexts: Vec<String>,
    restarts: u32,
    datetime: DateTime<Utc>,
}

impl Notification {
    pub fn new(
        project: Option<String>,
        contexts: Vec<String>,
        restarts: u32,
        datetime: DateTime<Utc>,
    ) -> Self {
        Self {
            project,
            contexts,
            restarts,
            datetime,
        }
    }

    pub fn title(&self) -> &'static str {
        TITLE
    }

    /// project, contexts, restarts, datetime の順
    pub fn fields(&self) -> Vec<(String, String)> {
        vec![
            (
                "project".to_string(),
                self.project.clone().unwrap_or_default(),
            ),
            ("contexts".to_string(), self.contexts.join(", ")),
            ("restarts".to_string(), self.restarts.to_string()),
            (
                "datetime".to_string(),
                self.datetime.format("%Y-%m-%d %H:%M:%S %Z").to_string(),
            ),
        ]
    }

    /// 送信結果は notifier の戻り値そのまま。失敗しても Err にはしない。
    pub async fn send(&self, notifier: &dyn Notifier) -> Option<bool> {
        notifier.notify(self.title(), &self.fields()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fields_are_ordered_and_formatted() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 8, 30, 0).unwrap();
        let n = Notification::new(
            Some("billing".into()),
            vec!["payments".into(), "audit".into()],
            3,
            at,
        );

        assert_eq!(n.title(), "Process restarting");
        assert_eq!(
            n.fields(),
            vec![
                ("project".to_string(), "billing".to_string()),
                ("contexts".to_string(), "payments, audit".to_string()),
                ("restarts".to_string(), "3".to_string()),
                ("datetime".to_string(), "2024-03-09 08:30:00 UTC".to_string()),
            ]
        );
    }

    #[test]
    fn missing_project_is_empty() {
        let n = Notification::new(None, vec![], 0, Utc::now());
        assert_eq!(n.fields()[0], ("project".to_string(), String::new()));
    }
}
