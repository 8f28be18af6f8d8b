//! Run configuration loaded from YAML.
//!
//! ```yaml
//! root_directory: ./my_project
//! output_directory: ./docs
//! ignore_patterns: ["__pycache__", "tests/*"]
//! visualization_types: [files, classes]
//! output_format: json
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::core::module_map::DEFAULT_ROOT_NAMESPACE;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("required field '{0}' is missing from the configuration")]
    MissingField(&'static str),

    #[error("root directory does not exist: {0}")]
    RootNotFound(PathBuf),

    #[error("invalid visualization type '{0}'. Valid types: files, classes, both")]
    InvalidVisualization(String),

    #[error("invalid output format '{0}'. Valid formats: json, dot")]
    InvalidOutputFormat(String),

    #[error("invalid ignore pattern '{pattern}': {message}")]
    InvalidIgnorePattern { pattern: String, message: String },

    #[error("root_namespace must not be empty")]
    EmptyNamespace,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualizationType {
    Files,
    Classes,
    Both,
}

impl VisualizationType {
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "files" | "arquivos" => Ok(Self::Files),
            "classes" => Ok(Self::Classes),
            "both" | "ambos" => Ok(Self::Both),
            _ => Err(ConfigError::InvalidVisualization(value.to_string())),
        }
    }

    pub fn includes_files(self) -> bool {
        matches!(self, Self::Files | Self::Both)
    }

    pub fn includes_classes(self) -> bool {
        matches!(self, Self::Classes | Self::Both)
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Dot,
}

impl OutputFormat {
    pub fn parse(value: &str) -> ConfigResult<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "dot" => Ok(Self::Dot),
            "html" => {
                warn!("output format 'html' is not supported, writing json instead");
                Ok(Self::Json)
            }
            _ => Err(ConfigError::InvalidOutputFormat(value.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Dot => "dot",
        }
    }
}

/// Layout hints passed to graph renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Force-directed layout instead of a layered one.
    pub physics_enabled: bool,
    /// Top-down ranking instead of left-to-right.
    pub hierarchical_layout: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            physics_enabled: true,
            hierarchical_layout: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub root_directory: PathBuf,
    pub output_directory: PathBuf,
    pub ignore_patterns: Vec<String>,
    pub visualization_types: Vec<VisualizationType>,
    pub output_format: OutputFormat,
    /// Namespace prefix under which every module is also registered.
    pub root_namespace: String,
    /// Import roots never reported as external libraries.
    pub internal_prefixes: Vec<String>,
    pub cache_directory: Option<PathBuf>,
    pub graph: GraphConfig,
}

/// On-disk shape; every field optional so validation can name what is missing.
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    root_directory: Option<PathBuf>,
    output_directory: Option<PathBuf>,
    ignore_patterns: Option<Vec<String>>,
    visualization_types: Option<Vec<String>>,
    output_format: Option<String>,
    root_namespace: Option<String>,
    internal_prefixes: Option<Vec<String>>,
    cache_directory: Option<PathBuf>,
    #[serde(alias = "graph_config")]
    graph: Option<GraphConfig>,
}

pub fn default_ignore_patterns() -> Vec<String> {
    ["__pycache__", "*.pyc", ".git", "venv", "env"]
        .iter()
        .map(|pattern| pattern.to_string())
        .collect()
}

pub fn default_internal_prefixes() -> Vec<String> {
    vec![DEFAULT_ROOT_NAMESPACE.to_string(), "core".to_string()]
}

impl Config {
    /// Configuration with every optional setting at its default. Not validated.
    pub fn new(root_directory: impl Into<PathBuf>, output_directory: impl Into<PathBuf>) -> Self {
        Self {
            root_directory: root_directory.into(),
            output_directory: output_directory.into(),
            ignore_patterns: default_ignore_patterns(),
            visualization_types: vec![VisualizationType::Files],
            output_format: OutputFormat::default(),
            root_namespace: DEFAULT_ROOT_NAMESPACE.to_string(),
            internal_prefixes: default_internal_prefixes(),
            cache_directory: None,
            graph: GraphConfig::default(),
        }
    }

    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        let raw: RawConfig = if content.trim().is_empty() {
            RawConfig::default()
        } else {
            serde_yaml::from_str(content)?
        };
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawConfig) -> ConfigResult<Self> {
        let root_directory = raw
            .root_directory
            .ok_or(ConfigError::MissingField("root_directory"))?;
        let output_directory = raw
            .output_directory
            .ok_or(ConfigError::MissingField("output_directory"))?;

        let mut config = Self::new(root_directory, output_directory);

        if let Some(patterns) = raw.ignore_patterns {
            config.ignore_patterns = patterns;
        }
        if let Some(types) = raw.visualization_types {
            config.visualization_types = types
                .iter()
                .map(|value| VisualizationType::parse(value))
                .collect::<ConfigResult<_>>()?;
        }
        if let Some(format) = raw.output_format {
            config.output_format = OutputFormat::parse(&format)?;
        }
        if let Some(namespace) = raw.root_namespace {
            config.root_namespace = namespace;
        }
        if let Some(prefixes) = raw.internal_prefixes {
            config.internal_prefixes = prefixes;
        }
        config.cache_directory = raw.cache_directory;
        if let Some(graph) = raw.graph {
            config.graph = graph;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks everything that must hold before any file is scanned.
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.root_directory.is_dir() {
            return Err(ConfigError::RootNotFound(self.root_directory.clone()));
        }
        if self.root_namespace.trim().is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }
        for pattern in &self.ignore_patterns {
            glob::Pattern::new(pattern).map_err(|err| ConfigError::InvalidIgnorePattern {
                pattern: pattern.clone(),
                message: err.msg.to_string(),
            })?;
        }
        Ok(())
    }

    pub fn wants_file_graph(&self) -> bool {
        self.visualization_types
            .iter()
            .any(|kind| kind.includes_files())
    }

    pub fn wants_class_graph(&self) -> bool {
        self.visualization_types
            .iter()
            .any(|kind| kind.includes_classes())
    }
}
