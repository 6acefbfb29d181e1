// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Assembles gateway deployment topologies.
//!
//! Given a validated [`gateway_api_types::DeploymentConfig`], the
//! [`assembler`] builds the complete resource graph for one deployment: an
//! isolated network, one of two compute strategies behind a uniform
//! load-balanced front, and the permission grants and secret bindings the
//! strategy needs. Assembly is a synchronous, dependency-ordered,
//! description-building step; nothing here talks to a cloud provider.

pub mod assembler;
pub mod config;
pub mod front;
pub mod grants;
pub mod network;
pub mod secrets;
pub mod strategy;

pub use assembler::{assemble, AssemblyError};

use uuid::Uuid;

/// Produces a fresh provisioning-time identifier with a resource-kind
/// prefix, e.g. `vpc-3f2a9c1d`. Every assembly call mints new ids, so two
/// assemblies of the same configuration are structurally identical but
/// independently addressed.
pub(crate) fn resource_id(prefix: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}", prefix, &id[..8])
}

#[cfg(test)]
mod test {
    use super::resource_id;

    #[test]
    fn resource_ids_are_prefixed_and_unique() {
        let a = resource_id("vpc");
        let b = resource_id("vpc");
        assert!(a.starts_with("vpc-"));
        assert_eq!(a.len(), "vpc-".len() + 8);
        assert_ne!(a, b);
    }
}
