//! Notifier port - 外部通知の抽象化
//!
//! Closing 時に 1 回だけ呼ばれる副作用専用のシンク。
//! 失敗は呼び出し側に伝播させず、戻り値で「送れなかった」を表す。

use async_trait::async_trait;

/// Notifier は title と順序付きフィールドを外部チャネルに送る
///
/// # 戻り値
/// - `Some(true)`: 送信成功
/// - `Some(false)`: 相手が失敗を返した
/// - `None`: 未設定、または送信自体ができなかった
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, title: &str, fields: &[(String, String)]) -> Option<bool>;
}

/// 通知先が設定されていない場合に使う
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _title: &str, _fields: &[(String, String)]) -> Option<bool> {
        None
    }
}
