// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! TOML deployment configuration for the gateway deployer.
//!
//! This crate only parses the file into string-typed tables; validation of
//! the individual fields (CIDR grammar, secret reference grammar, strategy
//! names) happens in the deployer, which maps each failure to the error
//! naming the offending field.

use std::path::Path;

use gateway_api_types::DeploymentConfig;
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

/// The raw, unvalidated deployment configuration.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Config {
    pub deployment: Deployment,

    #[serde(default)]
    pub registry: Registry,
}

/// The `[deployment]` table. Only the secret reference is mandatory;
/// everything else defaults to the published gateway's values.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Deployment {
    /// The reference to the secret holding the gateway's API key.
    #[serde(rename = "api-key-secret-arn")]
    pub api_key_secret_arn: String,

    /// `function` or `service`.
    #[serde(default = "default_strategy")]
    pub strategy: String,

    #[serde(rename = "network-cidr", default = "default_network_cidr")]
    pub network_cidr: String,

    #[serde(default = "default_region")]
    pub region: String,

    #[serde(rename = "default-model-id", default = "default_model_id")]
    pub default_model_id: String,

    #[serde(
        rename = "default-embedding-model-id",
        default = "default_embedding_model_id"
    )]
    pub default_embedding_model_id: String,

    #[serde(rename = "cross-region-inference", default = "default_true")]
    pub cross_region_inference: bool,
}

/// The optional `[registry]` table overriding where workload images are
/// pulled from.
#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct Registry {
    #[serde(rename = "account-id", default = "default_registry_account")]
    pub account_id: String,

    #[serde(
        rename = "function-repository",
        default = "default_function_repository"
    )]
    pub function_repository: String,

    #[serde(
        rename = "service-repository",
        default = "default_service_repository"
    )]
    pub service_repository: String,
}

impl Default for Registry {
    fn default() -> Self {
        let defaults = gateway_api_types::ImageRegistry::default();
        Self {
            account_id: defaults.account_id,
            function_repository: defaults.function_repository,
            service_repository: defaults.service_repository,
        }
    }
}

fn default_strategy() -> String {
    "function".to_owned()
}

fn default_network_cidr() -> String {
    DeploymentConfig::DEFAULT_NETWORK_CIDR.to_owned()
}

fn default_region() -> String {
    DeploymentConfig::DEFAULT_REGION.to_owned()
}

fn default_model_id() -> String {
    DeploymentConfig::DEFAULT_MODEL_ID.to_owned()
}

fn default_embedding_model_id() -> String {
    DeploymentConfig::DEFAULT_EMBEDDING_MODEL_ID.to_owned()
}

fn default_true() -> bool {
    true
}

fn default_registry_account() -> String {
    gateway_api_types::ImageRegistry::default().account_id
}

fn default_function_repository() -> String {
    gateway_api_types::ImageRegistry::default().function_repository
}

fn default_service_repository() -> String {
    gateway_api_types::ImageRegistry::default().service_repository
}

/// Errors which may be returned when parsing the deployment configuration.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Cannot parse toml: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Parses a TOML file into a configuration object.
pub fn parse<P: AsRef<Path>>(path: P) -> Result<Config, ParseError> {
    let contents = std::fs::read_to_string(path.as_ref())?;
    let cfg = toml::from_str::<Config>(&contents)?;
    Ok(cfg)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_minimal_config() {
        let raw = r#"
[deployment]
api-key-secret-arn = "arn:aws:secretsmanager:us-east-1:123:secret:key"
"#;
        let cfg: Config = toml::de::from_str(raw).unwrap();

        assert_eq!(
            cfg.deployment.api_key_secret_arn,
            "arn:aws:secretsmanager:us-east-1:123:secret:key"
        );
        assert_eq!(cfg.deployment.strategy, "function");
        assert_eq!(cfg.deployment.network_cidr, "10.250.0.0/16");
        assert_eq!(cfg.deployment.region, "us-east-1");
        assert_eq!(
            cfg.deployment.default_model_id,
            "anthropic.claude-3-sonnet-20240229-v1:0"
        );
        assert_eq!(
            cfg.deployment.default_embedding_model_id,
            "cohere.embed-multilingual-v3"
        );
        assert!(cfg.deployment.cross_region_inference);
        assert_eq!(cfg.registry, Registry::default());
    }

    #[test]
    fn parse_full_config() {
        let raw = r#"
[deployment]
strategy = "service"
network-cidr = "10.0.0.0/16"
region = "eu-west-1"
default-model-id = "anthropic.claude-3-haiku-20240307-v1:0"
default-embedding-model-id = "cohere.embed-english-v3"
api-key-secret-arn = "arn:aws:secretsmanager:eu-west-1:123:secret:key"
cross-region-inference = false

[registry]
account-id = "999999999999"
function-repository = "my-proxy"
service-repository = "my-proxy-ecs"
"#;
        let cfg: Config = toml::de::from_str(raw).unwrap();

        assert_eq!(cfg.deployment.strategy, "service");
        assert_eq!(cfg.deployment.network_cidr, "10.0.0.0/16");
        assert_eq!(cfg.deployment.region, "eu-west-1");
        assert!(!cfg.deployment.cross_region_inference);
        assert_eq!(cfg.registry.account_id, "999999999999");
        assert_eq!(cfg.registry.function_repository, "my-proxy");
        assert_eq!(cfg.registry.service_repository, "my-proxy-ecs");
    }

    #[test]
    fn missing_secret_reference_is_rejected() {
        let raw = r#"
[deployment]
strategy = "service"
"#;
        assert!(toml::de::from_str::<Config>(raw).is_err());
    }

    #[test]
    fn config_round_trips_as_toml() {
        let raw = r#"
[deployment]
api-key-secret-arn = "arn:aws:secretsmanager:us-east-1:123:secret:key"
strategy = "service"
"#;
        let cfg: Config = toml::de::from_str(raw).unwrap();
        let serialized = toml::ser::to_string(&cfg).unwrap();
        let deserialized: Config = toml::de::from_str(&serialized).unwrap();
        assert_eq!(cfg, deserialized);
    }
}
