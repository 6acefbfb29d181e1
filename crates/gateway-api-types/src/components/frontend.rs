// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The internet-facing front: a load balancer and its single listener.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::compute::FrontTarget;

/// A health-check policy, applied to a listener's target verbatim from the
/// strategy that produced it.
///
/// The two strategies are intentionally asymmetric here: an
/// invocation-triggered function has no persistent listener to probe, so
/// its policy is disabled and carries no probe parameters at all.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct HealthCheck {
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
}

impl HealthCheck {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            path: None,
            interval_seconds: None,
            timeout_seconds: None,
        }
    }

    /// A policy probing `path` every `interval_seconds`, failing a probe
    /// after `timeout_seconds`. The timeout must be strictly shorter than
    /// the interval so a slow probe cannot overlap the next one.
    pub fn enabled(
        path: &str,
        interval_seconds: u32,
        timeout_seconds: u32,
    ) -> Self {
        assert!(timeout_seconds < interval_seconds);
        Self {
            enabled: true,
            path: Some(path.to_owned()),
            interval_seconds: Some(interval_seconds),
            timeout_seconds: Some(timeout_seconds),
        }
    }
}

/// The single internet-facing entry point of a deployment.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LoadBalancer {
    pub id: String,
    /// The public DNS name assigned when the front is created. The
    /// deployment's base endpoint is derived from this, never the other
    /// way around.
    pub dns_name: String,
    pub internet_facing: bool,
    pub idle_timeout_seconds: u32,
    /// The subnets the front spans, by id.
    pub subnets: Vec<String>,
}

/// The front's one listener, forwarding all matching traffic to the single
/// attached target.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Listener {
    pub id: String,
    pub port: u16,
    pub target: FrontTarget,
    pub health_check: HealthCheck,
}
