// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The on-demand, invocation-triggered compute strategy.

use gateway_api_types::components::compute::{
    Compute, FrontTarget, FunctionCompute, ImageReference, Workload,
};
use gateway_api_types::components::frontend::HealthCheck;
use gateway_api_types::components::permissions::Principal;
use gateway_api_types::{DeploymentConfig, ImageRegistry};
use gateway_types::CpuArchitecture;

use super::{base_environment, Instantiation, StrategyState};
use crate::grants;
use crate::resource_id;
use crate::secrets::BoundSecret;

/// Fixed memory ceiling for the invocation unit.
const MEMORY_MIB: u32 = 1024;

/// Invocation deadline. Generous because a single invocation may stream a
/// long model response end to end.
const TIMEOUT_SECONDS: u32 = 600;

const ASSUMED_BY: &str = "lambda.amazonaws.com";

/// Environment key through which the workload receives the secret's
/// reference (never its value) for fetch-at-invocation-time resolution.
const SECRET_REFERENCE_ENV: &str = "API_KEY_SECRET_ARN";

#[derive(Debug)]
pub struct FunctionStrategy {
    pub(super) state: StrategyState,
}

impl FunctionStrategy {
    pub(super) fn new() -> Self {
        Self { state: StrategyState::Unconfigured }
    }

    /// Builds the function-shaped slice of the resource graph: one
    /// execution principal holding all three grants, one workload sized
    /// for long-running invocations, and a singleton invocation target.
    ///
    /// No health-check probing is possible here: there is no persistent
    /// listener, so the policy is disabled and the front routes to the
    /// invocation endpoint directly.
    pub(super) fn build(
        &self,
        config: &DeploymentConfig,
        registry: &ImageRegistry,
    ) -> Instantiation {
        let secret: BoundSecret = config.api_key_secret_arn.clone().into();

        let role = Principal {
            id: resource_id("role"),
            assumed_by: ASSUMED_BY.to_owned(),
            grants: vec![
                grants::discovery_grant(),
                grants::invocation_grant(),
                secret.read_grant(),
            ],
        };

        let mut environment = base_environment(config);
        environment.insert(
            SECRET_REFERENCE_ENV.to_owned(),
            secret.deferred_reference(),
        );

        let workload = Workload {
            image: ImageReference {
                repository_arn: registry.repository_arn(
                    &config.region,
                    &registry.function_repository,
                ),
                repository_name: registry.function_repository.clone(),
            },
            cpu_arch: CpuArchitecture::Arm64,
            memory_mib: MEMORY_MIB,
            timeout_seconds: Some(TIMEOUT_SECONDS),
            environment,
            secret_environment: Default::default(),
        };

        let function = FunctionCompute {
            id: resource_id("fn"),
            role: role.id.clone(),
            workload,
        };

        let target =
            FrontTarget::FunctionInvocation { function: function.id.clone() };

        Instantiation {
            compute: Compute::Function(function),
            principals: vec![role],
            target,
            health_check: HealthCheck::disabled(),
        }
    }
}

#[cfg(test)]
mod test {
    use gateway_api_types::StrategyKind;

    use super::super::test_support::*;
    use super::super::ComputeStrategy;
    use super::*;

    fn instantiate() -> Instantiation {
        let config = test_config(StrategyKind::Function);
        let network = test_network(&config);
        let mut strategy = ComputeStrategy::for_kind(config.strategy);
        strategy
            .instantiate(&config, &test_registry(), &network)
            .unwrap()
    }

    #[test]
    fn produces_singleton_invocation_target() {
        let inst = instantiate();

        let Compute::Function(function) = &inst.compute else {
            panic!("expected function compute, got {:?}", inst.compute);
        };
        assert_eq!(
            inst.target,
            FrontTarget::FunctionInvocation { function: function.id.clone() }
        );
    }

    #[test]
    fn health_checking_is_disabled() {
        let inst = instantiate();
        assert!(!inst.health_check.enabled);
        assert!(inst.health_check.path.is_none());
        assert!(inst.health_check.interval_seconds.is_none());
        assert!(inst.health_check.timeout_seconds.is_none());
    }

    #[test]
    fn secret_binding_is_deferred_by_reference() {
        let inst = instantiate();
        let workload = inst.compute.workload();

        assert_eq!(
            workload.environment["API_KEY_SECRET_ARN"],
            TEST_SECRET_ARN
        );
        assert!(workload.secret_environment.is_empty());
    }

    #[test]
    fn workload_shape_matches_invocation_model() {
        let inst = instantiate();
        let workload = inst.compute.workload();

        assert_eq!(workload.cpu_arch, CpuArchitecture::Arm64);
        assert_eq!(workload.memory_mib, 1024);
        assert_eq!(workload.timeout_seconds, Some(600));
        assert_eq!(workload.image.repository_name, "bedrock-proxy-api");
        assert_eq!(
            workload.image.repository_arn,
            "arn:aws:ecr:us-east-1:366590864501:repository/bedrock-proxy-api"
        );
    }

    #[test]
    fn single_principal_carries_all_grants() {
        let inst = instantiate();
        assert_eq!(inst.principals.len(), 1);

        let role = &inst.principals[0];
        assert_eq!(role.assumed_by, "lambda.amazonaws.com");
        assert_eq!(role.grants.len(), 3);
        assert!(role.grants.contains(&crate::grants::discovery_grant()));
        assert!(role.grants.contains(&crate::grants::invocation_grant()));
    }
}
