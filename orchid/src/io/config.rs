//! Engine configuration stored in `orchid.toml`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::Draft;
use serde::{Deserialize, Serialize};

/// Engine configuration (TOML).
///
/// Missing fields default so an absent or partial file behaves like the
/// built-in setup: JSON Schema with draft auto-detection, every violation
/// reported.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub schema: SchemaConfig,
    pub validation: ValidationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SchemaConfig {
    /// Which backend compiles state schemas.
    pub backend: SchemaBackend,
    /// JSON Schema draft; only meaningful for the `json-schema` backend.
    pub draft: SchemaDraft,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum SchemaBackend {
    #[default]
    JsonSchema,
    Field,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum SchemaDraft {
    /// Detect from the schema's `$schema` keyword.
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "4")]
    Draft4,
    #[serde(rename = "6")]
    Draft6,
    #[serde(rename = "7")]
    Draft7,
    #[serde(rename = "2019-09")]
    Draft201909,
    #[serde(rename = "2020-12")]
    Draft202012,
}

impl SchemaDraft {
    /// The pinned `jsonschema` draft, or `None` for auto-detection.
    pub fn as_jsonschema(self) -> Option<Draft> {
        match self {
            SchemaDraft::Auto => None,
            SchemaDraft::Draft4 => Some(Draft::Draft4),
            SchemaDraft::Draft6 => Some(Draft::Draft6),
            SchemaDraft::Draft7 => Some(Draft::Draft7),
            SchemaDraft::Draft201909 => Some(Draft::Draft201909),
            SchemaDraft::Draft202012 => Some(Draft::Draft202012),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ValidationConfig {
    pub report: ReportMode,
}

/// How many structural violations `orchid validate` prints.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    #[default]
    All,
    First,
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.schema.backend == SchemaBackend::Field && self.schema.draft != SchemaDraft::Auto {
            return Err(anyhow!(
                "schema.draft applies only to the json-schema backend"
            ));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `EngineConfig::default()`.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    if !path.exists() {
        let cfg = EngineConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: EngineConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("validate {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &EngineConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
