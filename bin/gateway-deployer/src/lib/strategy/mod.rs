// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The two compute execution strategies behind the uniform front-facing
//! contract.
//!
//! Each variant independently produces a runnable workload descriptor, a
//! front-attachable target, a health-check policy, and the principals that
//! carry its grants and secret binding. The variants share only the grant
//! and secret helper modules; there is no common base to inherit from, so
//! the two resource shapes can diverge freely.
//!
//! A strategy instance moves through `Unconfigured -> Instantiated ->
//! Attached` exactly once. The transitions are terminal: instantiating
//! twice or recording an attachment out of order is a [`StrategyError`].

use std::collections::BTreeMap;

use gateway_api_types::components::compute::{Compute, FrontTarget};
use gateway_api_types::components::frontend::HealthCheck;
use gateway_api_types::components::network::Network;
use gateway_api_types::components::permissions::Principal;
use gateway_api_types::{DeploymentConfig, ImageRegistry, StrategyKind};
use thiserror::Error;

pub(crate) mod function;
pub(crate) mod service;

pub use function::FunctionStrategy;
pub use service::ServiceStrategy;

/// Errors raised by misuse of a strategy instance's lifecycle.
#[derive(Debug, Error)]
pub enum StrategyError {
    #[error("{0} strategy is already instantiated")]
    AlreadyInstantiated(StrategyKind),

    #[error("{0} strategy cannot be attached before instantiation")]
    NotInstantiated(StrategyKind),

    #[error("{0} strategy is already attached")]
    AlreadyAttached(StrategyKind),
}

/// The lifecycle of a strategy instance within one deployment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyState {
    Unconfigured,
    Instantiated,
    Attached,
}

/// Everything a strategy produces when instantiated: the compute
/// descriptor (owning its workload), the principals carrying the grants
/// and secret wiring, the target the front can attach, and the
/// health-check policy the front must apply verbatim.
#[derive(Clone, Debug)]
pub struct Instantiation {
    pub compute: Compute,
    pub principals: Vec<Principal>,
    pub target: FrontTarget,
    pub health_check: HealthCheck,
}

/// A compute strategy instance. Exactly one is created per assembly,
/// selected by [`DeploymentConfig::strategy`].
#[derive(Debug)]
pub enum ComputeStrategy {
    Function(FunctionStrategy),
    Service(ServiceStrategy),
}

impl ComputeStrategy {
    pub fn for_kind(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Function => {
                Self::Function(FunctionStrategy::new())
            }
            StrategyKind::Service => Self::Service(ServiceStrategy::new()),
        }
    }

    pub fn kind(&self) -> StrategyKind {
        match self {
            Self::Function(_) => StrategyKind::Function,
            Self::Service(_) => StrategyKind::Service,
        }
    }

    pub fn state(&self) -> StrategyState {
        match self {
            Self::Function(s) => s.state,
            Self::Service(s) => s.state,
        }
    }

    fn set_state(&mut self, state: StrategyState) {
        match self {
            Self::Function(s) => s.state = state,
            Self::Service(s) => s.state = state,
        }
    }

    /// Builds this strategy's slice of the resource graph. Consumes the
    /// `Unconfigured` state; a second call is an error.
    pub fn instantiate(
        &mut self,
        config: &DeploymentConfig,
        registry: &ImageRegistry,
        network: &Network,
    ) -> Result<Instantiation, StrategyError> {
        if self.state() != StrategyState::Unconfigured {
            return Err(StrategyError::AlreadyInstantiated(self.kind()));
        }

        let instantiation = match self {
            Self::Function(s) => s.build(config, registry),
            Self::Service(s) => s.build(config, registry, network),
        };

        self.set_state(StrategyState::Instantiated);
        Ok(instantiation)
    }

    /// Records that the front has accepted this strategy's target. Only
    /// valid once, and only after instantiation.
    pub fn mark_attached(&mut self) -> Result<(), StrategyError> {
        match self.state() {
            StrategyState::Unconfigured => {
                Err(StrategyError::NotInstantiated(self.kind()))
            }
            StrategyState::Attached => {
                Err(StrategyError::AlreadyAttached(self.kind()))
            }
            StrategyState::Instantiated => {
                self.set_state(StrategyState::Attached);
                Ok(())
            }
        }
    }
}

/// The environment entries common to both strategies, populated from
/// configuration. Strategy-specific secret wiring is layered on top by
/// each variant.
pub(crate) fn base_environment(
    config: &DeploymentConfig,
) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("DEBUG".to_owned(), "false".to_owned()),
        ("DEFAULT_MODEL".to_owned(), config.default_model_id.clone()),
        (
            "DEFAULT_EMBEDDING_MODEL".to_owned(),
            config.default_embedding_model_id.clone(),
        ),
        (
            "ENABLE_CROSS_REGION_INFERENCE".to_owned(),
            config.cross_region_inference.to_string(),
        ),
    ])
}
