// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Compute backend components: the two structurally different ways the
//! gateway workload can run, and the workload description they share.

use std::collections::BTreeMap;

use gateway_types::{CpuArchitecture, SecretArn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A container image in a registry, referenced by repository.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ImageReference {
    pub repository_arn: String,
    pub repository_name: String,
}

/// A secret value injected into the workload's environment at start time.
/// Only the reference and the field to extract travel in the description;
/// the executing scheduler performs the actual fetch.
#[derive(Clone, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SecretValueRef {
    pub secret: SecretArn,
    /// The JSON field of the secret to extract, if the secret is a JSON
    /// document rather than a bare string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_field: Option<String>,
}

impl std::fmt::Debug for SecretValueRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The reference is not the value, but keep the rendering terse so
        // log scrapers never mistake it for one.
        f.debug_struct("SecretValueRef")
            .field("secret", &self.secret.as_str())
            .field("json_field", &self.json_field)
            .finish()
    }
}

/// The runnable workload description shared by both compute strategies.
/// Created once by the active strategy and immutable thereafter.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Workload {
    pub image: ImageReference,
    pub cpu_arch: CpuArchitecture,
    pub memory_mib: u32,

    /// The invocation deadline. Only meaningful for the function strategy;
    /// a persistent service has no per-invocation lifetime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,

    pub environment: BTreeMap<String, String>,

    /// Environment entries whose values are fetched from a secret at start
    /// time rather than written into the description.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub secret_environment: BTreeMap<String, SecretValueRef>,
}

/// An invocation-triggered function backend.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FunctionCompute {
    pub id: String,
    /// The execution principal the function runs as.
    pub role: String,
    pub workload: Workload,
}

/// A persistently-running replica group managed by a cluster scheduler.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ServiceCompute {
    pub id: String,
    pub cluster: String,
    /// The principal the application code runs as.
    pub task_role: String,
    /// The principal the scheduler uses to pull images and write logs.
    pub execution_role: String,
    pub cpu_units: u32,
    pub desired_count: u32,
    pub container_port: u16,
    /// The subnets replicas are placed in, by id. Public assignment is
    /// what gives replicas outbound access for image pulls; there is no
    /// NAT path.
    pub subnets: Vec<String>,
    pub assign_public_ip: bool,
    pub workload: Workload,
}

/// The compute half of a topology. Exactly one variant exists per
/// deployment.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields, tag = "type", content = "component")]
pub enum Compute {
    Function(FunctionCompute),
    Service(ServiceCompute),
}

impl Compute {
    pub fn kind(&self) -> &'static str {
        match self {
            Compute::Function(_) => "function",
            Compute::Service(_) => "service",
        }
    }

    pub fn workload(&self) -> &Workload {
        match self {
            Compute::Function(f) => &f.workload,
            Compute::Service(s) => &s.workload,
        }
    }
}

/// The opaque handle a front can route traffic to without knowledge of the
/// strategy that produced it.
///
/// The service form deliberately references the replica group itself, not a
/// snapshot of member addresses: the scheduler keeps the group's membership
/// registered with the front as replicas start and stop.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields, tag = "type", content = "component")]
pub enum FrontTarget {
    /// A singleton invocation endpoint.
    FunctionInvocation { function: String },

    /// A live reference to a replica group and the port its members listen
    /// on.
    ServiceGroup { service: String, port: u16 },
}
