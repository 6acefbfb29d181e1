// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Execution principals and the access grants attached to them.

use std::collections::BTreeSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The effect of a grant. Only `Allow` exists; the topology never emits
/// deny statements.
#[derive(
    Clone, Copy, Deserialize, Serialize, Debug, PartialEq, Eq, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Allow,
}

/// A scoped authorization statement: a set of actions allowed against a set
/// of resource patterns.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Grant {
    pub effect: Effect,
    pub actions: BTreeSet<String>,
    pub resources: BTreeSet<String>,
}

impl Grant {
    pub fn allow<A, R, S, T>(actions: A, resources: R) -> Self
    where
        A: IntoIterator<Item = S>,
        R: IntoIterator<Item = T>,
        S: Into<String>,
        T: Into<String>,
    {
        Self {
            effect: Effect::Allow,
            actions: actions.into_iter().map(Into::into).collect(),
            resources: resources.into_iter().map(Into::into).collect(),
        }
    }

    /// True if this grant's resource scope matches every resource.
    pub fn is_unscoped(&self) -> bool {
        self.resources.iter().any(|r| r == "*")
    }
}

/// An execution principal a compute backend runs as, with the grants it
/// has been given. The grant *shapes* are strategy-agnostic; only the
/// principal receiving them differs between strategies.
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Principal {
    pub id: String,
    /// The service allowed to assume this principal, e.g.
    /// `lambda.amazonaws.com` or `ecs-tasks.amazonaws.com`.
    pub assumed_by: String,
    pub grants: Vec<Grant>,
}
