//! Configuration for the inference gateway.
//!
//! Two groups of settings are loaded from the same sources:
//! - [`Config`] is read once at startup (listener, logging, AWS region).
//! - [`Targets`] names the backends and is re-read on every invocation
//!   through a [`TargetSource`], so endpoints can change without a restart.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

use crate::gateway::TensorModel;

/// Optional config file name (without extension), looked up in the working directory.
pub const CONFIG_FILE: &str = "gateway";
/// Prefix of environment overrides (`GATEWAY__SECTION__KEY`).
pub const ENV_PREFIX: &str = "GATEWAY";

/// Startup configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub aws: AwsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Largest request body accepted over HTTP; larger bodies get a 413.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Region the SageMaker and Bedrock clients are bound to.
#[derive(Debug, Clone, Deserialize)]
pub struct AwsConfig {
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
        }
    }
}

/// Backend identifiers, resolved per invocation.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Targets {
    #[serde(default)]
    pub tensor: TensorTargets,
    #[serde(default)]
    pub foundation: FoundationTarget,
    #[serde(default)]
    pub completion: CompletionTarget,
}

/// SageMaker endpoint name per tensor-model route.
#[derive(Debug, Clone, Deserialize)]
pub struct TensorTargets {
    #[serde(default = "default_mnist_classical")]
    pub mnist_classical: String,
    #[serde(default = "default_mnist_hybrid")]
    pub mnist_hybrid: String,
    #[serde(default = "default_sentiment_hf")]
    pub sentiment_hf: String,
    #[serde(default = "default_sentiment_svm_cv")]
    pub sentiment_svm_cv: String,
    #[serde(default = "default_sentiment_svm_tfidf")]
    pub sentiment_svm_tfidf: String,
    #[serde(default = "default_pneumonia")]
    pub pneumonia: String,
}

impl TensorTargets {
    pub fn endpoint(&self, model: TensorModel) -> &str {
        match model {
            TensorModel::MnistClassical => &self.mnist_classical,
            TensorModel::MnistHybrid => &self.mnist_hybrid,
            TensorModel::SentimentHf => &self.sentiment_hf,
            TensorModel::SentimentSvmCv => &self.sentiment_svm_cv,
            TensorModel::SentimentSvmTfidf => &self.sentiment_svm_tfidf,
            TensorModel::Pneumonia => &self.pneumonia,
        }
    }
}

impl Default for TensorTargets {
    fn default() -> Self {
        Self {
            mnist_classical: default_mnist_classical(),
            mnist_hybrid: default_mnist_hybrid(),
            sentiment_hf: default_sentiment_hf(),
            sentiment_svm_cv: default_sentiment_svm_cv(),
            sentiment_svm_tfidf: default_sentiment_svm_tfidf(),
            pneumonia: default_pneumonia(),
        }
    }
}

/// Active Bedrock model and the system instructions sent with every prompt.
#[derive(Debug, Clone, Deserialize)]
pub struct FoundationTarget {
    #[serde(default = "default_model_id")]
    pub model_id: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for FoundationTarget {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            system_prompt: default_system_prompt(),
        }
    }
}

/// Hosted completion service.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionTarget {
    #[serde(default = "default_completion_url")]
    pub url: String,
}

impl Default for CompletionTarget {
    fn default() -> Self {
        Self {
            url: default_completion_url(),
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_max_body_bytes() -> usize {
    10 * 1024 * 1024
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_region() -> String {
    "us-east-1".to_string()
}
fn default_mnist_classical() -> String {
    "mnist-classical-endpoint".to_string()
}
fn default_mnist_hybrid() -> String {
    "mnist-quantum-endpoint".to_string()
}
fn default_sentiment_hf() -> String {
    "sentiment-hf-endpoint".to_string()
}
fn default_sentiment_svm_cv() -> String {
    "sentiment-svm-cv-endpoint".to_string()
}
fn default_sentiment_svm_tfidf() -> String {
    "sentiment-svm-tfidf-endpoint".to_string()
}
fn default_pneumonia() -> String {
    "pneumonia-endpoint".to_string()
}
fn default_model_id() -> String {
    "anthropic.claude-3-haiku-20240307-v1:0".to_string()
}
fn default_system_prompt() -> String {
    "You are the assistant of a machine learning portfolio. Answer clearly and concisely, \
     in the language the user writes in."
        .to_string()
}
fn default_completion_url() -> String {
    "http://localhost:8000/generate".to_string()
}

/// `GATEWAY__SECTION__KEY` overrides, e.g. `GATEWAY__TENSOR__MNIST_CLASSICAL`.
fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

/// Built-in defaults, then `gateway.toml`, then `env`.
fn layered(env: Environment) -> Result<ConfigLoader, ConfigError> {
    ConfigLoader::builder()
        .add_source(File::with_name(CONFIG_FILE).required(false))
        .add_source(env)
        .build()
}

fn loader() -> Result<ConfigLoader, ConfigError> {
    layered(environment())
}

impl Config {
    /// Load startup configuration.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (GATEWAY__SECTION__KEY format)
    /// 2. gateway.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        loader()?.try_deserialize()
    }
}

impl Targets {
    pub fn load() -> Result<Self, ConfigError> {
        loader()?.try_deserialize()
    }
}

/// Where the gateway looks up backend identifiers at call time.
pub trait TargetSource: Send + Sync {
    fn resolve(&self) -> Result<Targets, ConfigError>;
}

/// Reads the layered configuration on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct LayeredTargets;

impl TargetSource for LayeredTargets {
    fn resolve(&self) -> Result<Targets, ConfigError> {
        Targets::load()
    }
}

/// Fixed targets, resolved once by the caller.
impl TargetSource for Targets {
    fn resolve(&self) -> Result<Targets, ConfigError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_config() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 8080);
        assert_eq!(server.max_body_bytes, 10 * 1024 * 1024);
    }

    #[test]
    fn test_default_targets() {
        let targets = Targets::default();
        assert_eq!(
            targets.tensor.endpoint(TensorModel::MnistClassical),
            "mnist-classical-endpoint"
        );
        assert_eq!(
            targets.tensor.endpoint(TensorModel::MnistHybrid),
            "mnist-quantum-endpoint"
        );
        assert!(targets.foundation.model_id.contains("claude-3"));
        assert!(!targets.foundation.system_prompt.is_empty());
    }

    #[test]
    fn test_every_tensor_model_has_an_endpoint() {
        let targets = TensorTargets::default();
        for model in TensorModel::ALL {
            assert!(!targets.endpoint(model).is_empty(), "{model} has no endpoint");
        }
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let loader = ConfigLoader::builder()
            .set_override("tensor.mnist_hybrid", "hybrid-v2")
            .unwrap()
            .set_override("foundation.model_id", "amazon.nova-lite-v1:0")
            .unwrap()
            .build()
            .unwrap();
        let targets: Targets = loader.try_deserialize().unwrap();

        assert_eq!(targets.tensor.mnist_hybrid, "hybrid-v2");
        assert_eq!(targets.tensor.mnist_classical, "mnist-classical-endpoint");
        assert_eq!(targets.foundation.model_id, "amazon.nova-lite-v1:0");
        assert_eq!(targets.completion.url, "http://localhost:8000/generate");
    }

    fn env_vars(vars: &[(&str, &str)]) -> Environment {
        let map: config::Map<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_environment_overrides_targets() {
        let env = env_vars(&[
            ("GATEWAY__TENSOR__MNIST_CLASSICAL", "mnist-classical-v2"),
            ("GATEWAY__TENSOR__PNEUMONIA", "xray-endpoint"),
            ("GATEWAY__FOUNDATION__MODEL_ID", "amazon.nova-lite-v1:0"),
            ("GATEWAY__COMPLETION__URL", "http://completion.internal/generate"),
        ]);
        let targets: Targets = layered(env).unwrap().try_deserialize().unwrap();

        assert_eq!(targets.tensor.mnist_classical, "mnist-classical-v2");
        assert_eq!(targets.tensor.endpoint(TensorModel::Pneumonia), "xray-endpoint");
        assert_eq!(targets.tensor.mnist_hybrid, "mnist-quantum-endpoint");
        assert_eq!(targets.foundation.model_id, "amazon.nova-lite-v1:0");
        assert_eq!(targets.completion.url, "http://completion.internal/generate");
    }

    #[test]
    fn test_environment_overrides_startup_config() {
        let env = env_vars(&[
            ("GATEWAY__SERVER__PORT", "9090"),
            ("GATEWAY__SERVER__MAX_BODY_BYTES", "1048576"),
            ("GATEWAY__AWS__REGION", "eu-west-1"),
        ]);
        let config: Config = layered(env).unwrap().try_deserialize().unwrap();

        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.max_body_bytes, 1_048_576);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.aws.region, "eu-west-1");
    }

    #[test]
    fn test_unknown_section_is_ignored() {
        let env = env_vars(&[("GATEWAY__TARGETS__MNIST_CLASSICAL", "ignored")]);
        let targets: Targets = layered(env).unwrap().try_deserialize().unwrap();
        assert_eq!(targets.tensor.mnist_classical, "mnist-classical-endpoint");
    }

    #[test]
    fn test_fixed_targets_resolve_to_themselves() {
        let mut targets = Targets::default();
        targets.completion.url = "http://example.test/complete".to_string();
        let resolved = targets.resolve().unwrap();
        assert_eq!(resolved.completion.url, "http://example.test/complete");
    }
}
