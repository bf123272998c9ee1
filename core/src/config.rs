use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::undo::DEFAULT_UNDO_LIMIT;

/// Editor settings loaded from `mapedit.toml`.
///
/// Every section and key is optional.
///
/// ```toml
/// [history]
/// max_undo = 100
///
/// [render]
/// format = "png"
///
/// [output_formats]
/// name_template = "outfmt{}"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    pub render: RenderConfig,
    pub output_formats: OutputFormatConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Depth of every undo stack built from this config.
    pub max_undo: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_undo: DEFAULT_UNDO_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Encoder used for previews when the map names no image type.
    pub format: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: "png".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputFormatConfig {
    /// Pattern for fresh output format names; `{}` is replaced by a counter
    /// starting at 1.
    pub name_template: String,
}

impl Default for OutputFormatConfig {
    fn default() -> Self {
        Self {
            name_template: "outfmt{}".into(),
        }
    }
}

impl OutputFormatConfig {
    /// The template with `{}` replaced by `n`. A template without `{}` gets
    /// the counter appended.
    pub fn format_name(&self, n: usize) -> String {
        if self.name_template.contains("{}") {
            self.name_template.replacen("{}", &n.to_string(), 1)
        } else {
            format!("{}{n}", self.name_template)
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

/// Loads editor settings from a TOML file.
pub fn load_config(path: &Path) -> Result<EditorConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Loads editor settings, falling back to defaults if the file is missing
/// or malformed.
pub fn load_or_default(path: &Path) -> EditorConfig {
    match load_config(path) {
        Ok(config) => {
            log::info!(
                "Loaded editor config from {} (max_undo {})",
                path.display(),
                config.history.max_undo
            );
            config
        }
        Err(e) => {
            log::warn!("No editor config ({e}), using defaults");
            EditorConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: EditorConfig = toml::from_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.history.max_undo, 100);
        assert_eq!(config.render.format, "png");
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config: EditorConfig = toml::from_str(
            r#"
            [history]
            max_undo = 5

            [output_formats]
            name_template = "fmt_{}"
            "#,
        )
        .unwrap();
        assert_eq!(config.history.max_undo, 5);
        assert_eq!(config.render.format, "png");
        assert_eq!(config.output_formats.format_name(3), "fmt_3");
    }

    #[test]
    fn template_without_placeholder_appends_counter() {
        let config = OutputFormatConfig {
            name_template: "format".into(),
        };
        assert_eq!(config.format_name(2), "format2");
    }

    #[test]
    fn load_config_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapedit.toml");
        std::fs::write(&path, "[history]\nmax_undo = \"lots\"\n").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn load_or_default_falls_back_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_or_default(&dir.path().join("missing.toml"));
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn load_or_default_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapedit.toml");
        std::fs::write(&path, "[render]\nformat = \"image/png\"\n").unwrap();
        assert_eq!(load_or_default(&path).render.format, "image/png");
    }
}
