// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Resolves an externally supplied credential reference into bindings a
//! compute strategy can consume.
//!
//! Two binding modes exist. The function strategy defers: only the secret's
//! reference is placed in the workload environment and the running workload
//! fetches the value itself. The service strategy injects: the cluster
//! scheduler reads the value at container start and places it in the
//! environment. In neither mode does the value appear in the assembled
//! description.

use std::str::FromStr;

use gateway_api_types::components::compute::SecretValueRef;
use gateway_api_types::components::permissions::Grant;
use gateway_types::SecretArn;
use thiserror::Error;

/// The JSON field of the API-key secret holding the key itself.
const API_KEY_FIELD: &str = "api_key";

/// Errors arising while resolving a secret reference.
#[derive(Debug, Error)]
pub enum SecretResolutionError {
    #[error("malformed secret reference {reference:?}: {reason}")]
    MalformedReference { reference: String, reason: String },
}

/// A resolved secret binding. Holds the validated reference only, never
/// the value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoundSecret {
    arn: SecretArn,
}

/// Validates `reference` against the secret-reference grammar and returns
/// a binding handle for it. Existence of the referenced secret is checked
/// by the provisioning executor, not here; assembly stays a pure
/// description-building step.
pub fn resolve(reference: &str) -> Result<BoundSecret, SecretResolutionError> {
    let arn = SecretArn::from_str(reference).map_err(|e| {
        SecretResolutionError::MalformedReference {
            reference: reference.to_owned(),
            reason: e.to_string(),
        }
    })?;

    Ok(BoundSecret { arn })
}

impl From<SecretArn> for BoundSecret {
    fn from(arn: SecretArn) -> Self {
        Self { arn }
    }
}

impl BoundSecret {
    pub fn arn(&self) -> &SecretArn {
        &self.arn
    }

    /// A grant authorizing a principal to read this one secret's value at
    /// runtime, scoped to the secret itself.
    pub fn read_grant(&self) -> Grant {
        Grant::allow(
            [
                "secretsmanager:GetSecretValue",
                "secretsmanager:DescribeSecret",
            ],
            [self.arn.as_str()],
        )
    }

    /// The deferred binding: the reference string the workload uses to
    /// fetch the value itself at invocation time.
    pub fn deferred_reference(&self) -> String {
        self.arn.as_str().to_owned()
    }

    /// The injected binding: a start-time environment entry the cluster
    /// scheduler fills with the `api_key` field of the secret.
    pub fn injected_api_key(&self) -> SecretValueRef {
        SecretValueRef {
            secret: self.arn.clone(),
            json_field: Some(API_KEY_FIELD.to_owned()),
        }
    }
}
