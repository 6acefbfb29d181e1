// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Derives the access grants a compute strategy's principals need.
//!
//! These are deliberately strategy-agnostic pure functions: the principal
//! receiving a grant differs between strategies, but the grant shape does
//! not, so the two compute paths cannot drift apart in their effective
//! permissions.

use gateway_api_types::components::permissions::Grant;

const DISCOVERY_ACTIONS: &[&str] =
    &["bedrock:ListFoundationModels", "bedrock:ListInferenceProfiles"];

const INVOCATION_ACTIONS: &[&str] =
    &["bedrock:InvokeModel", "bedrock:InvokeModelWithResponseStream"];

/// Resource patterns for model invocation. Scoped to foundation models and
/// inference profiles; this must never be widened to `*`.
const INVOCATION_RESOURCES: &[&str] = &[
    "arn:aws:bedrock:*::foundation-model/*",
    "arn:aws:bedrock:*:*:inference-profile/*",
];

const PULL_AND_LOG_ACTIONS: &[&str] = &[
    "ecr:GetAuthorizationToken",
    "ecr:BatchCheckLayerAvailability",
    "ecr:GetDownloadUrlForLayer",
    "ecr:BatchGetImage",
    "logs:CreateLogStream",
    "logs:PutLogEvents",
];

/// Allows listing the available models and inference profiles. Listing has
/// no per-resource semantics, so the scope is unrestricted.
pub fn discovery_grant() -> Grant {
    Grant::allow(DISCOVERY_ACTIONS.iter().copied(), ["*"])
}

/// Allows invoking models, synchronously and streaming, against foundation
/// models and inference profiles only.
pub fn invocation_grant() -> Grant {
    Grant::allow(
        INVOCATION_ACTIONS.iter().copied(),
        INVOCATION_RESOURCES.iter().copied(),
    )
}

/// Allows a scheduler's execution principal to pull workload images and
/// write logs on the workload's behalf.
pub fn pull_and_log_grant() -> Grant {
    Grant::allow(PULL_AND_LOG_ACTIONS.iter().copied(), ["*"])
}
