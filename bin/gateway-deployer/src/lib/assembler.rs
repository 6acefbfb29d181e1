// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The top-level orchestrator: builds one complete deployment topology
//! from a validated configuration.
//!
//! Assembly is single-threaded and dependency-ordered; each step's output
//! is fully materialized before the next consumes it, and a failure at any
//! step aborts the whole assembly. No partial resource graph is ever
//! returned: a half-wired target with the wrong permissions is worse than
//! no target.

use gateway_api_types::{
    Deployment, DeploymentConfig, ImageRegistry, Topology, TopologyOutput,
};
use slog::{info, Logger};
use thiserror::Error;

use crate::config::ConfigurationError;
use crate::front::{AttachmentError, LoadBalancerFront, LISTENER_PORT};
use crate::network;
use crate::secrets::SecretResolutionError;
use crate::strategy::{ComputeStrategy, StrategyError};

/// The fixed path suffix appended to the front's public address to form
/// the deployment's base endpoint.
pub const API_PATH_SUFFIX: &str = "/api/v1";

/// Subnets are spread across this many availability zones.
pub const DEFAULT_AZ_COUNT: u8 = 2;

/// Errors that can arise while assembling a deployment.
#[derive(Debug, Error)]
pub enum AssemblyError {
    #[error("invalid configuration")]
    Configuration(#[from] ConfigurationError),

    #[error("failed to resolve secret reference")]
    Secret(#[from] SecretResolutionError),

    #[error("compute strategy protocol violation")]
    Strategy(#[from] StrategyError),

    #[error("load balancer attachment protocol violation")]
    Attachment(#[from] AttachmentError),
}

/// Assembles a fresh deployment from `config`. Each call is an
/// independent provisioning request: identical configurations produce
/// structurally identical topologies with independently assigned
/// identifiers.
pub fn assemble(
    config: &DeploymentConfig,
    registry: &ImageRegistry,
    log: &Logger,
) -> Result<Deployment, AssemblyError> {
    let network = network::build(
        config.network_cidr,
        &config.region,
        DEFAULT_AZ_COUNT,
    )?;
    info!(log, "built network";
          "id" => &network.id,
          "cidr" => %network.cidr,
          "subnets" => network.subnets.len());

    let mut strategy = ComputeStrategy::for_kind(config.strategy);
    let instantiation = strategy.instantiate(config, registry, &network)?;
    info!(log, "instantiated compute strategy";
          "kind" => %strategy.kind(),
          "compute" => instantiation.compute.kind(),
          "health_check" => instantiation.health_check.enabled);

    let mut front = LoadBalancerFront::create(&network);
    front.attach(
        instantiation.target.clone(),
        instantiation.health_check.clone(),
        LISTENER_PORT,
    )?;
    strategy.mark_attached()?;
    info!(log, "attached target to front"; "dns_name" => front.dns_name());

    // Derived only now, after front creation has succeeded and a target is
    // attached; an endpoint must never exist for an unroutable front.
    let output = TopologyOutput {
        base_endpoint: format!(
            "http://{}{}",
            front.dns_name(),
            API_PATH_SUFFIX
        ),
    };

    let (load_balancer, listener) = front.finish()?;

    Ok(Deployment {
        topology: Topology {
            network,
            principals: instantiation.principals,
            compute: instantiation.compute,
            load_balancer,
            listener,
        },
        output,
    })
}
