//! Runtime configuration
//!
//! Settings come from three layers, highest priority first: command-line
//! flags and their environment variables, an optional TOML file, and
//! built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use kubeask_llm::ModelSettings;
use kubeask_types::DEFAULT_NAMESPACE;

/// Config file picked up from the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "kubeask.toml";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

/// Kubeask - ask questions about a Kubernetes cluster over HTTP
#[derive(Parser, Debug, Default)]
#[command(name = "kubeask")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to a TOML config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Address to bind the HTTP server to
    #[arg(long, env = "KUBEASK_HOST")]
    pub host: Option<String>,

    /// Port for the HTTP server
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Kubeconfig file (defaults to $KUBECONFIG or ~/.kube/config, then in-cluster)
    #[arg(long, value_name = "PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// Namespace used when a request doesn't name one
    #[arg(long, env = "KUBEASK_NAMESPACE")]
    pub default_namespace: Option<String>,

    /// AWS region of the Bedrock runtime
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Bedrock model identifier
    #[arg(long, env = "BEDROCK_MODEL_ID")]
    pub model_id: Option<String>,

    /// Maximum tokens in a generated answer
    #[arg(long, env = "BEDROCK_MAX_TOKENS")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk config file layout
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: ServerSection,
    pub cluster: ClusterSection,
    pub model: ModelSection,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ClusterSection {
    pub kubeconfig: Option<PathBuf>,
    pub default_namespace: Option<String>,
}

#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ModelSection {
    pub region: Option<String>,
    pub model_id: Option<String>,
    pub max_tokens: Option<u32>,
}

impl FileConfig {
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load the file named by `--config`, or the default file if present
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&content, &path)
    }
}

/// Resolved settings, built once at startup
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub kubeconfig: Option<PathBuf>,
    pub default_namespace: String,
    pub model: ModelSettings,
}

impl Config {
    /// Read the config file named by the arguments and merge everything
    pub fn load(args: Args) -> Result<Self, ConfigError> {
        let file = FileConfig::load(args.config.as_deref())?;
        Ok(Self::merge(args, file))
    }

    /// Arguments override the file, the file overrides defaults
    pub fn merge(args: Args, file: FileConfig) -> Self {
        let defaults = ModelSettings::default();

        Self {
            host: args
                .host
                .or(file.server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: args.port.or(file.server.port).unwrap_or(DEFAULT_PORT),
            kubeconfig: args.kubeconfig.or(file.cluster.kubeconfig),
            default_namespace: args
                .default_namespace
                .or(file.cluster.default_namespace)
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            model: ModelSettings {
                region: args
                    .region
                    .or(file.model.region)
                    .unwrap_or(defaults.region),
                model_id: args
                    .model_id
                    .or(file.model.model_id)
                    .unwrap_or(defaults.model_id),
                max_tokens: args
                    .max_tokens
                    .or(file.model.max_tokens)
                    .unwrap_or(defaults.max_tokens),
            },
        }
    }
}
