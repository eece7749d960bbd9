//! ConfigLoader port - 設定ドキュメントの取得
//!
//! 起動時に 1 回だけ呼ばれる。ホットリロードはしない。

use crate::domain::{ConfigDocument, ConfigError};

/// ConfigLoader は設定ドキュメントを返す
///
/// # エラー
/// - `ConfigFileNotFound`: 読み込み元が存在しない
/// - `ConfigInvalidContent`: テンプレート展開・パースの失敗、ルートが mapping でない
pub trait ConfigLoader {
    fn load(&self) -> Result<ConfigDocument, ConfigError>;
}
