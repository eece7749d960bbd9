//! FileConfigLoader - YAML ファイルから設定を読む ConfigLoader 実装
//!
//! 読み込み → テンプレート展開 → YAML パースの順。

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use super::template;
use crate::domain::{ConfigDocument, ConfigError};
use crate::ports::ConfigLoader;

pub const DEFAULT_CONFIG_PATH: &str = "config/warren.yml";

#[derive(Debug, Clone)]
pub struct FileConfigLoader {
    path: PathBuf,
    vars: Option<HashMap<String, String>>,
}

impl FileConfigLoader {
    /// テンプレート変数はプロセスの環境変数から引く
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            vars: None,
        }
    }

    /// 環境変数の代わりに固定の変数表を使う
    pub fn with_vars(mut self, vars: HashMap<String, String>) -> Self {
        self.vars = Some(vars);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match &self.vars {
            Some(vars) => vars.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
    }
}

impl Default for FileConfigLoader {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_PATH)
    }
}

impl ConfigLoader for FileConfigLoader {
    fn load(&self) -> Result<ConfigDocument, ConfigError> {
        let shown = self.path.display().to_string();
        let raw = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::ConfigFileNotFound(shown.clone()),
            _ => ConfigError::ConfigInvalidContent(format!("{shown}: {e}")),
        })?;

        let rendered = template::render(&raw, |name| self.lookup(name))?;
        let document = ConfigDocument::from_yaml_str(&rendered)?;
        debug!(path = %shown, "config loaded");
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tracing_test::traced_test;

    fn write(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_and_renders_templates() {
        let file = write(
            r#"
name: ${PROJECT:-warren}
rabbitmq:
  url: http://${RABBIT_HOST}:15672
contexts:
  c1:
    queues: [q1]
"#,
        );
        let vars = HashMap::from([("RABBIT_HOST".to_string(), "mq.internal".to_string())]);

        let config = FileConfigLoader::new(file.path())
            .with_vars(vars)
            .load()
            .unwrap();

        assert_eq!(config.project_name(), Some("warren".to_string()));
        assert_eq!(
            config.rabbitmq().unwrap().unwrap().url,
            "http://mq.internal:15672"
        );
        assert_eq!(config.context_names().unwrap(), vec!["c1"]);
    }

    #[test]
    #[traced_test]
    fn logs_the_loaded_path() {
        let file = write("name: warren\n");

        FileConfigLoader::new(file.path()).load().unwrap();

        assert!(logs_contain("config loaded"));
        assert!(logs_contain(&file.path().display().to_string()));
    }

    #[test]
    fn missing_file_is_config_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.yml");

        let result = FileConfigLoader::new(&path).load();

        assert_matches!(result, Err(ConfigError::ConfigFileNotFound(p)) if p.ends_with("nope.yml"));
    }

    #[test]
    fn undefined_variable_is_invalid_content() {
        let file = write("name: ${UNSET_PROJECT_NAME}\n");
        let result = FileConfigLoader::new(file.path())
            .with_vars(HashMap::new())
            .load();
        assert_matches!(result, Err(ConfigError::ConfigInvalidContent(_)));
    }

    #[test]
    fn non_mapping_root_is_invalid_content() {
        let file = write("- just\n- a list\n");
        let result = FileConfigLoader::new(file.path()).load();
        assert_matches!(result, Err(ConfigError::ConfigInvalidContent(_)));
    }

    #[test]
    fn default_path() {
        assert_eq!(
            FileConfigLoader::default().path(),
            Path::new("config/warren.yml")
        );
    }
}
