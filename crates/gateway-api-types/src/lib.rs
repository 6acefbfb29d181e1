// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Definitions for the deployment topology document emitted by the gateway
//! deployer.
//!
//! A [`Deployment`] is a fully-composed description of one provisioning
//! request: an isolated network, exactly one compute backend behind a
//! load-balanced front, the permission grants and secret bindings the
//! backend needs, and the derived public endpoint. These types are the wire
//! format consumed by the external provisioning executor; they describe
//! resources, they never create them.

use gateway_types::{CidrBlock, SecretArn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub mod components;

use components::compute::Compute;
use components::frontend::{Listener, LoadBalancer};
use components::network::Network;
use components::permissions::Principal;

/// Selects which of the two compute execution strategies backs the
/// deployment. Exactly one is instantiated per assembly; there is no
/// runtime switching.
#[derive(
    Clone,
    Copy,
    Deserialize,
    Serialize,
    Debug,
    PartialEq,
    Eq,
    JsonSchema,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StrategyKind {
    /// An on-demand, invocation-triggered function backend.
    Function,

    /// A persistently-running, scheduler-managed replica group.
    Service,
}

/// A validated deployment configuration. Immutable once constructed; the
/// deployer's config module is responsible for producing one from raw
/// string input, so a value of this type always holds well-formed fields.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeploymentConfig {
    pub network_cidr: CidrBlock,
    pub strategy: StrategyKind,
    pub region: String,
    pub default_model_id: String,
    pub default_embedding_model_id: String,
    pub api_key_secret_arn: SecretArn,
    pub cross_region_inference: bool,
}

impl DeploymentConfig {
    pub const DEFAULT_NETWORK_CIDR: &'static str = "10.250.0.0/16";
    pub const DEFAULT_REGION: &'static str = "us-east-1";
    pub const DEFAULT_MODEL_ID: &'static str =
        "anthropic.claude-3-sonnet-20240229-v1:0";
    pub const DEFAULT_EMBEDDING_MODEL_ID: &'static str =
        "cohere.embed-multilingual-v3";
}

/// The container registry the workload images are pulled from. These are
/// build-time constants of the published gateway images, modeled as an
/// explicit read-only value resolved once at assembly start rather than as
/// ambient global state.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ImageRegistry {
    pub account_id: String,
    pub function_repository: String,
    pub service_repository: String,
}

impl Default for ImageRegistry {
    fn default() -> Self {
        Self {
            account_id: "366590864501".to_owned(),
            function_repository: "bedrock-proxy-api".to_owned(),
            service_repository: "bedrock-proxy-api-ecs".to_owned(),
        }
    }
}

impl ImageRegistry {
    /// The ARN of the named repository in `region`.
    pub fn repository_arn(&self, region: &str, repository: &str) -> String {
        format!(
            "arn:aws:ecr:{}:{}:repository/{}",
            region, self.account_id, repository
        )
    }
}

/// The fully-composed resource graph for one deployment.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Topology {
    pub network: Network,
    pub principals: Vec<Principal>,
    pub compute: Compute,
    pub load_balancer: LoadBalancer,
    pub listener: Listener,
}

/// The caller-visible result of a successful assembly.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TopologyOutput {
    /// The public base URL of the deployed API, of the form
    /// `http://<front-address>/api/v1`.
    pub base_endpoint: String,
}

/// A topology plus its derived output: the complete document handed to the
/// provisioning executor.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Deployment {
    pub topology: Topology,
    pub output: TopologyOutput,
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn strategy_kind_round_trips_as_snake_case() {
        assert_eq!(StrategyKind::Function.to_string(), "function");
        assert_eq!(StrategyKind::Service.to_string(), "service");
        assert_eq!(
            StrategyKind::from_str("service").unwrap(),
            StrategyKind::Service
        );
        assert!(StrategyKind::from_str("fargate").is_err());

        let json = serde_json::to_string(&StrategyKind::Function).unwrap();
        assert_eq!(json, "\"function\"");
    }

    #[test]
    fn default_registry_arns() {
        let registry = ImageRegistry::default();
        assert_eq!(
            registry.repository_arn(
                "us-east-1",
                &registry.function_repository
            ),
            "arn:aws:ecr:us-east-1:366590864501:repository/bedrock-proxy-api"
        );
    }
}
