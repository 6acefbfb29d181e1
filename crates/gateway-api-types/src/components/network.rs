// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The isolated network segment a deployment runs in.

use gateway_types::CidrBlock;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Whether a subnet's addresses are reachable from the internet. The
/// gateway workload is internet-facing, so only public subnets exist; the
/// variant is kept explicit so consumers never have to guess.
#[derive(
    Clone, Copy, Deserialize, Serialize, Debug, PartialEq, Eq, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum SubnetVisibility {
    Public,
}

/// One subnet within the network, pinned to an availability zone.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Subnet {
    pub id: String,
    pub cidr: CidrBlock,
    pub availability_zone: String,
    pub visibility: SubnetVisibility,
}

/// An isolated network with public-reachable address space.
///
/// Outbound internet access, where a compute backend needs it, comes from
/// public-subnet assignment; no NAT egress path is ever provisioned, so
/// `nat_gateways` is always zero.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Network {
    pub id: String,
    pub region: String,
    pub cidr: CidrBlock,
    pub subnets: Vec<Subnet>,
    pub nat_gateways: u8,
}
