// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Turns raw string-typed configuration into a validated
//! [`DeploymentConfig`], mapping each failure to an error naming the field
//! that caused it. All validation happens here, before any resource
//! descriptor exists.

use std::str::FromStr;

use gateway_api_types::{DeploymentConfig, ImageRegistry, StrategyKind};
use gateway_types::CidrBlock;
use thiserror::Error;

use crate::assembler::AssemblyError;
use crate::secrets;

/// Errors caused by malformed or out-of-range configuration input. These
/// always fail an assembly before any resource is described.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("malformed network CIDR {cidr:?}: {reason}")]
    MalformedCidr { cidr: String, reason: String },

    #[error("network CIDR {cidr} is not a private address range")]
    NotPrivateRange { cidr: CidrBlock },

    #[error(
        "network CIDR {cidr} cannot hold {subnets_needed} /24 subnets"
    )]
    AddressSpaceTooSmall { cidr: CidrBlock, subnets_needed: u8 },

    #[error("at least one availability zone is required")]
    NoAvailabilityZones,

    #[error(
        "{requested} availability zones requested, at most {supported} \
         supported"
    )]
    TooManyAvailabilityZones { requested: u8, supported: u8 },

    #[error("unknown strategy {strategy:?}, expected function or service")]
    UnknownStrategy { strategy: String },
}

/// Validates a parsed configuration file into the deployment config and
/// image registry the assembler consumes.
pub fn resolve(
    raw: &gateway_config_toml::Config,
) -> Result<(DeploymentConfig, ImageRegistry), AssemblyError> {
    let strategy = StrategyKind::from_str(&raw.deployment.strategy)
        .map_err(|_| ConfigurationError::UnknownStrategy {
            strategy: raw.deployment.strategy.clone(),
        })?;

    let network_cidr = CidrBlock::from_str(&raw.deployment.network_cidr)
        .map_err(|e| ConfigurationError::MalformedCidr {
            cidr: raw.deployment.network_cidr.clone(),
            reason: e.to_string(),
        })?;

    let secret = secrets::resolve(&raw.deployment.api_key_secret_arn)?;

    let config = DeploymentConfig {
        network_cidr,
        strategy,
        region: raw.deployment.region.clone(),
        default_model_id: raw.deployment.default_model_id.clone(),
        default_embedding_model_id: raw
            .deployment
            .default_embedding_model_id
            .clone(),
        api_key_secret_arn: secret.arn().clone(),
        cross_region_inference: raw.deployment.cross_region_inference,
    };

    let registry = ImageRegistry {
        account_id: raw.registry.account_id.clone(),
        function_repository: raw.registry.function_repository.clone(),
        service_repository: raw.registry.service_repository.clone(),
    };

    Ok((config, registry))
}
