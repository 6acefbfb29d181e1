// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The persistently-running, scheduler-managed compute strategy.

use gateway_api_types::components::compute::{
    Compute, FrontTarget, ImageReference, ServiceCompute, Workload,
};
use gateway_api_types::components::frontend::HealthCheck;
use gateway_api_types::components::network::Network;
use gateway_api_types::components::permissions::Principal;
use gateway_api_types::{DeploymentConfig, ImageRegistry};
use gateway_types::CpuArchitecture;

use super::{base_environment, Instantiation, StrategyState};
use crate::grants;
use crate::resource_id;
use crate::secrets::BoundSecret;

const CPU_UNITS: u32 = 1024;
const MEMORY_MIB: u32 = 2048;

/// Replicas at initial provisioning; the scheduler owns the count from
/// then on.
const DESIRED_COUNT: u32 = 1;

const CONTAINER_PORT: u16 = 80;

const ASSUMED_BY: &str = "ecs-tasks.amazonaws.com";

/// Environment key the scheduler fills with the secret's value at
/// container start.
const SECRET_VALUE_ENV: &str = "API_KEY";

const HEALTH_CHECK_PATH: &str = "/health";

// Interval well above the timeout so one transiently slow probe cannot
// flap the target out of service.
const HEALTH_CHECK_INTERVAL_SECONDS: u32 = 60;
const HEALTH_CHECK_TIMEOUT_SECONDS: u32 = 30;

#[derive(Debug)]
pub struct ServiceStrategy {
    pub(super) state: StrategyState,
}

impl ServiceStrategy {
    pub(super) fn new() -> Self {
        Self { state: StrategyState::Unconfigured }
    }

    /// Builds the service-shaped slice of the resource graph: a cluster,
    /// a replica group of identical tasks with split task/execution
    /// principals, an injected secret binding, and a live target
    /// referencing the group.
    ///
    /// The target is the group itself rather than any member address; the
    /// scheduler keeps membership registered with the front as replicas
    /// start and stop, which is exactly what makes this variant's target
    /// different from the function strategy's singleton.
    pub(super) fn build(
        &self,
        config: &DeploymentConfig,
        registry: &ImageRegistry,
        network: &Network,
    ) -> Instantiation {
        let secret: BoundSecret = config.api_key_secret_arn.clone().into();

        // The application's own permissions.
        let task_role = Principal {
            id: resource_id("role"),
            assumed_by: ASSUMED_BY.to_owned(),
            grants: vec![
                grants::discovery_grant(),
                grants::invocation_grant(),
            ],
        };

        // The scheduler acts with this principal before the application
        // runs: pulling the image, opening the log stream, and reading the
        // secret it injects.
        let execution_role = Principal {
            id: resource_id("role"),
            assumed_by: ASSUMED_BY.to_owned(),
            grants: vec![grants::pull_and_log_grant(), secret.read_grant()],
        };

        let workload = Workload {
            image: ImageReference {
                repository_arn: registry.repository_arn(
                    &config.region,
                    &registry.service_repository,
                ),
                repository_name: registry.service_repository.clone(),
            },
            cpu_arch: CpuArchitecture::Arm64,
            memory_mib: MEMORY_MIB,
            timeout_seconds: None,
            environment: base_environment(config),
            secret_environment: [(
                SECRET_VALUE_ENV.to_owned(),
                secret.injected_api_key(),
            )]
            .into(),
        };

        let service = ServiceCompute {
            id: resource_id("svc"),
            cluster: resource_id("cluster"),
            task_role: task_role.id.clone(),
            execution_role: execution_role.id.clone(),
            cpu_units: CPU_UNITS,
            desired_count: DESIRED_COUNT,
            container_port: CONTAINER_PORT,
            subnets: network.subnets.iter().map(|s| s.id.clone()).collect(),
            assign_public_ip: true,
            workload,
        };

        let target = FrontTarget::ServiceGroup {
            service: service.id.clone(),
            port: CONTAINER_PORT,
        };

        Instantiation {
            compute: Compute::Service(service),
            principals: vec![task_role, execution_role],
            target,
            health_check: HealthCheck::enabled(
                HEALTH_CHECK_PATH,
                HEALTH_CHECK_INTERVAL_SECONDS,
                HEALTH_CHECK_TIMEOUT_SECONDS,
            ),
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
        let config = test_config(StrategyKind::Service);
        let network = test_network(&config);
        let mut strategy = ComputeStrategy::for_kind(config.strategy);
        strategy
            .instantiate(&config, &test_registry(), &network)
            .unwrap()
    }

    #[test]
    fn produces_live_group_target() {
        let inst = instantiate();

        let Compute::Service(service) = &inst.compute else {
            panic!("expected service compute, got {:?}", inst.compute);
        };
        assert_eq!(
            inst.target,
            FrontTarget::ServiceGroup {
                service: service.id.clone(),
                port: 80
            }
        );
        assert_eq!(service.desired_count, 1);
        assert_eq!(service.subnets.len(), 2);
        assert!(service.assign_public_ip);
    }

    #[test]
    fn health_checking_probes_liveness_path() {
        let inst = instantiate();

        assert!(inst.health_check.enabled);
        assert_eq!(inst.health_check.path.as_deref(), Some("/health"));
        assert_eq!(inst.health_check.interval_seconds, Some(60));
        assert_eq!(inst.health_check.timeout_seconds, Some(30));
        assert!(
            inst.health_check.timeout_seconds.unwrap()
                < inst.health_check.interval_seconds.unwrap()
        );
    }

    #[test]
    fn secret_binding_is_injected_at_start() {
        let inst = instantiate();
        let workload = inst.compute.workload();

        let api_key = &workload.secret_environment["API_KEY"];
        assert_eq!(api_key.secret.as_str(), TEST_SECRET_ARN);
        assert_eq!(api_key.json_field.as_deref(), Some("api_key"));

        // The deferred-reference key belongs to the function strategy
        // only.
        assert!(!workload.environment.contains_key("API_KEY_SECRET_ARN"));
    }

    #[test]
    fn workload_shape_matches_replica_model() {
        let inst = instantiate();

        let Compute::Service(service) = &inst.compute else {
            panic!("expected service compute");
        };
        assert_eq!(service.cpu_units, 1024);
        assert_eq!(service.workload.memory_mib, 2048);
        assert_eq!(service.workload.timeout_seconds, None);
        assert_eq!(service.workload.cpu_arch, CpuArchitecture::Arm64);
        assert_eq!(
            service.workload.image.repository_name,
            "bedrock-proxy-api-ecs"
        );
    }

    #[test]
    fn task_and_execution_principals_are_split() {
        let inst = instantiate();
        assert_eq!(inst.principals.len(), 2);

        let Compute::Service(service) = &inst.compute else {
            panic!("expected service compute");
        };
        let task = inst
            .principals
            .iter()
            .find(|p| p.id == service.task_role)
            .unwrap();
        let exec = inst
            .principals
            .iter()
            .find(|p| p.id == service.execution_role)
            .unwrap();

        assert!(task.grants.contains(&crate::grants::discovery_grant()));
        assert!(task.grants.contains(&crate::grants::invocation_grant()));
        assert!(exec.grants.contains(&crate::grants::pull_and_log_grant()));

        // The secret read grant rides on the execution principal, which
        // performs the injection.
        assert!(exec
            .grants
            .iter()
            .any(|g| g.actions.contains("secretsmanager:GetSecretValue")));
        assert!(!task
            .grants
            .iter()
            .any(|g| g.actions.contains("secretsmanager:GetSecretValue")));
    }
}
