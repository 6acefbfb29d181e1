// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The single internet-facing entry point of a deployment.
//!
//! A front is created over the network, then exactly one target is
//! attached with the active strategy's health-check policy applied
//! verbatim. The front never second-guesses the policy and never touches
//! the workload behind the target.

use gateway_api_types::components::compute::FrontTarget;
use gateway_api_types::components::frontend::{
    HealthCheck, Listener, LoadBalancer,
};
use gateway_api_types::components::network::Network;
use thiserror::Error;

use crate::resource_id;
use uuid::Uuid;

/// The one listener port of every deployment.
pub const LISTENER_PORT: u16 = 80;

/// Keep idle streaming connections open for a long while; model responses
/// can trickle.
const IDLE_TIMEOUT_SECONDS: u32 = 600;

/// Protocol violations in front usage.
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("a target is already attached via listener {listener}")]
    AlreadyAttached { listener: String },

    #[error("front {front} was never attached to a target")]
    NothingAttached { front: String },
}

/// An internet-facing front under construction. Owns the listener state
/// exclusively; the attached target is consumed, never mutated.
#[derive(Debug)]
pub struct LoadBalancerFront {
    descriptor: LoadBalancer,
    listener: Option<Listener>,
}

impl LoadBalancerFront {
    /// Creates a front spanning all of the network's (public) subnets.
    /// The public DNS name is assigned here; endpoint derivation must wait
    /// until after this returns.
    pub fn create(network: &Network) -> Self {
        let id = resource_id("alb");
        let suffix = Uuid::new_v4().simple().to_string();
        let dns_name = format!(
            "{}-{}.{}.elb.amazonaws.com",
            id,
            &suffix[..12],
            network.region
        );

        Self {
            descriptor: LoadBalancer {
                id,
                dns_name,
                internet_facing: true,
                idle_timeout_seconds: IDLE_TIMEOUT_SECONDS,
                subnets: network
                    .subnets
                    .iter()
                    .map(|s| s.id.clone())
                    .collect(),
            },
            listener: None,
        }
    }

    pub fn dns_name(&self) -> &str {
        &self.descriptor.dns_name
    }

    /// Attaches the strategy's target behind a new listener on `port`,
    /// applying `health_check` verbatim. A second attachment is an error
    /// and leaves the first unmodified: this topology never balances
    /// across distinct backends within one deployment.
    pub fn attach(
        &mut self,
        target: FrontTarget,
        health_check: HealthCheck,
        port: u16,
    ) -> Result<&Listener, AttachmentError> {
        if let Some(listener) = &self.listener {
            return Err(AttachmentError::AlreadyAttached {
                listener: listener.id.clone(),
            });
        }

        self.listener = Some(Listener {
            id: resource_id("listener"),
            port,
            target,
            health_check,
        });

        // Just set above.
        Ok(self.listener.as_ref().unwrap())
    }

    /// Yields the completed front, consuming the builder.
    pub fn finish(self) -> Result<(LoadBalancer, Listener), AttachmentError> {
        let Some(listener) = self.listener else {
            return Err(AttachmentError::NothingAttached {
                front: self.descriptor.id,
            });
        };

        Ok((self.descriptor, listener))
    }
}
