//! 設定ファイルのテンプレート展開
//!
//! パース前のテキストに対して `${VAR}` と `${VAR:-default}` を置き換える。
//! 値は呼び出し側が渡す lookup（通常は環境変数）から引く。

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::domain::ConfigError;

const TEMPLATE_RE: &str = r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}";

fn template_re() -> &'static Regex {
    static RE_ONCE: OnceLock<Regex> = OnceLock::new();
    RE_ONCE.get_or_init(|| Regex::new(TEMPLATE_RE).expect("template regex is valid"))
}

/// content 中のプレースホルダを展開する
///
/// 未定義で default もない変数があれば `ConfigInvalidContent`。
/// 最初に見つかった 1 件だけを報告する。
pub fn render<F>(content: &str, lookup: F) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing: Option<String> = None;

    let rendered = template_re().replace_all(content, |caps: &Captures| {
        let name = &caps[1];
        match (lookup(name), caps.get(2)) {
            (Some(value), _) => value,
            (None, Some(default)) => default.as_str().to_string(),
            (None, None) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(ConfigError::ConfigInvalidContent(format!(
            "undefined variable `{name}` in config template"
        ))),
        None => Ok(rendered.into_owned()),
    }
}
