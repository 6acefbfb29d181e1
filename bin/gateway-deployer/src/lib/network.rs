// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Builds the isolated network segment a deployment runs in.

use gateway_api_types::components::network::{
    Network, Subnet, SubnetVisibility,
};
use gateway_types::CidrBlock;

use crate::config::ConfigurationError;
use crate::resource_id;

/// The fixed prefix length of every subnet carved from the address space.
pub const SUBNET_PREFIX_LEN: u8 = 24;

/// One letter per availability zone the builder will place subnets in.
const AZ_SUFFIXES: &[char] = &['a', 'b', 'c', 'd', 'e', 'f'];

/// Builds a network over `address_space` with one public /24 subnet in each
/// of `az_count` availability zones of `region`. No NAT egress path is
/// provisioned; backends that need outbound access get it from their public
/// subnet assignment.
///
/// This is a pure builder: it returns a descriptor and has no other effect.
pub fn build(
    address_space: CidrBlock,
    region: &str,
    az_count: u8,
) -> Result<Network, ConfigurationError> {
    if az_count == 0 {
        return Err(ConfigurationError::NoAvailabilityZones);
    }

    if usize::from(az_count) > AZ_SUFFIXES.len() {
        return Err(ConfigurationError::TooManyAvailabilityZones {
            requested: az_count,
            supported: AZ_SUFFIXES.len() as u8,
        });
    }

    if !address_space.is_private() {
        return Err(ConfigurationError::NotPrivateRange {
            cidr: address_space,
        });
    }

    let capacity = address_space
        .subnet_capacity(SUBNET_PREFIX_LEN)
        .unwrap_or(0);
    if capacity < az_count.into() {
        return Err(ConfigurationError::AddressSpaceTooSmall {
            cidr: address_space,
            subnets_needed: az_count,
        });
    }

    let subnets = (0..az_count)
        .map(|i| {
            // In range by the capacity check above.
            let cidr = address_space
                .subnet(SUBNET_PREFIX_LEN, i.into())
                .unwrap();
            Subnet {
                id: resource_id("subnet"),
                cidr,
                availability_zone: format!(
                    "{}{}",
                    region,
                    AZ_SUFFIXES[usize::from(i)]
                ),
                visibility: SubnetVisibility::Public,
            }
        })
        .collect();

    Ok(Network {
        id: resource_id("vpc"),
        region: region.to_owned(),
        cidr: address_space,
        subnets,
        nat_gateways: 0,
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;

    fn cidr(s: &str) -> CidrBlock {
        CidrBlock::from_str(s).unwrap()
    }

    #[test]
    fn builds_one_public_subnet_per_az() {
        let network = build(cidr("10.250.0.0/16"), "us-east-1", 2).unwrap();

        assert_eq!(network.subnets.len(), 2);
        assert_eq!(network.nat_gateways, 0);
        assert_eq!(network.subnets[0].availability_zone, "us-east-1a");
        assert_eq!(network.subnets[1].availability_zone, "us-east-1b");
        assert_eq!(network.subnets[0].cidr.to_string(), "10.250.0.0/24");
        assert_eq!(network.subnets[1].cidr.to_string(), "10.250.1.0/24");
        for subnet in &network.subnets {
            assert_eq!(subnet.visibility, SubnetVisibility::Public);
            assert_eq!(subnet.cidr.prefix_len(), SUBNET_PREFIX_LEN);
        }
    }

    #[test]
    fn rejects_public_range() {
        assert!(matches!(
            build(cidr("8.8.0.0/16"), "us-east-1", 2),
            Err(ConfigurationError::NotPrivateRange { .. })
        ));
    }

    #[test]
    fn rejects_space_too_small_for_azs() {
        // A /24 yields exactly one /24 subnet.
        assert!(matches!(
            build(cidr("10.0.0.0/24"), "us-east-1", 2),
            Err(ConfigurationError::AddressSpaceTooSmall { .. })
        ));

        // A /25 yields none at all.
        assert!(matches!(
            build(cidr("10.0.0.0/25"), "us-east-1", 1),
            Err(ConfigurationError::AddressSpaceTooSmall { .. })
        ));

        assert!(build(cidr("10.0.0.0/24"), "us-east-1", 1).is_ok());
    }

    #[test]
    fn rejects_zero_azs() {
        assert!(matches!(
            build(cidr("10.250.0.0/16"), "us-east-1", 0),
            Err(ConfigurationError::NoAvailabilityZones)
        ));
    }

    #[test]
    fn fresh_ids_per_build() {
        let a = build(cidr("10.250.0.0/16"), "us-east-1", 2).unwrap();
        let b = build(cidr("10.250.0.0/16"), "us-east-1", 2).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.cidr, b.cidr);
        assert_eq!(a.subnets.len(), b.subnets.len());
    }
}
