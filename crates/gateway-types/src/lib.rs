// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fundamental types shared by other gateway deployment crates.
//!
//! This crate defines some basic validated value types that are shared by
//! multiple other crates (the descriptor model, the configuration loader,
//! and the deployer) such that they can all use those types without any
//! layering oddities.

use std::fmt::Display;
use std::io::{Error, ErrorKind};
use std::net::Ipv4Addr;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

const MAX_PREFIX_LEN: u8 = 32;

/// An IPv4 CIDR block. Supports conversion from a string formatted as
/// "A.B.C.D/LEN", e.g. "10.250.0.0/16".
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug, JsonSchema)]
pub struct CidrBlock {
    addr: Ipv4Addr,
    prefix_len: u8,
}

impl CidrBlock {
    pub fn new(addr: Ipv4Addr, prefix_len: u8) -> Result<Self, Error> {
        if prefix_len > MAX_PREFIX_LEN {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!(
                    "prefix length {} outside range of 0-{}",
                    prefix_len, MAX_PREFIX_LEN
                ),
            ));
        }

        let mask = Self::netmask(prefix_len);
        if u32::from(addr) & !mask != 0 {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("{}/{} has host bits set", addr, prefix_len),
            ));
        }

        Ok(Self { addr, prefix_len })
    }

    fn netmask(prefix_len: u8) -> u32 {
        if prefix_len == 0 {
            0
        } else {
            u32::MAX << (MAX_PREFIX_LEN - prefix_len)
        }
    }

    #[inline]
    pub fn addr(&self) -> Ipv4Addr {
        self.addr
    }

    #[inline]
    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    /// Returns true if this block lies entirely within one of the RFC 1918
    /// private ranges.
    pub fn is_private(&self) -> bool {
        // The network address being private is not sufficient on its own:
        // 10.0.0.0/7 starts in 10/8 but extends past it, so the prefix must
        // also be at least as long as the containing range's.
        let octets = self.addr.octets();
        match octets {
            [10, ..] => self.prefix_len >= 8,
            [172, b, ..] if (16..32).contains(&b) => self.prefix_len >= 12,
            [192, 168, ..] => self.prefix_len >= 16,
            _ => false,
        }
    }

    /// The number of subnets of `new_prefix_len` this block can be divided
    /// into, or `None` if `new_prefix_len` is shorter than this block's
    /// prefix or not a valid prefix length.
    pub fn subnet_capacity(&self, new_prefix_len: u8) -> Option<u32> {
        if new_prefix_len < self.prefix_len || new_prefix_len > MAX_PREFIX_LEN
        {
            return None;
        }

        // Splitting a /16 into /24s yields 2^8 blocks. Saturate rather than
        // overflow for pathological splits like /0 -> /32.
        Some(1u32.checked_shl((new_prefix_len - self.prefix_len).into())
            .unwrap_or(u32::MAX))
    }

    /// Returns the `index`th subnet of `new_prefix_len` within this block,
    /// or `None` if the index is out of range.
    pub fn subnet(
        &self,
        new_prefix_len: u8,
        index: u32,
    ) -> Option<CidrBlock> {
        let capacity = self.subnet_capacity(new_prefix_len)?;
        if index >= capacity {
            return None;
        }

        // A nonzero index implies a nonzero prefix (capacity > 1), so the
        // shift below cannot reach the full register width.
        if index == 0 {
            return Some(Self { addr: self.addr, prefix_len: new_prefix_len });
        }

        let step = 1u32 << (MAX_PREFIX_LEN - new_prefix_len);
        let base = u32::from(self.addr) + index * step;
        Some(Self { addr: Ipv4Addr::from(base), prefix_len: new_prefix_len })
    }
}

impl FromStr for CidrBlock {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((addr, prefix)) = s.split_once('/') else {
            return Err(Self::Err::new(
                ErrorKind::InvalidInput,
                format!("expected A.B.C.D/LEN in CIDR block {}", s),
            ));
        };

        let addr = Ipv4Addr::from_str(addr).map_err(|e| {
            Self::Err::new(
                ErrorKind::InvalidInput,
                format!("failed to parse address in CIDR block {}: {}", s, e),
            )
        })?;

        let prefix_len = u8::from_str(prefix).map_err(|e| {
            Self::Err::new(
                ErrorKind::InvalidInput,
                format!("failed to parse prefix length in {}: {}", s, e),
            )
        })?;

        Self::new(addr, prefix_len)
    }
}

impl Display for CidrBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

impl Serialize for CidrBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(format!("{}", self).as_str())
    }
}

impl<'d> Deserialize<'d> for CidrBlock {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'d>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(de::Error::custom)
    }
}

/// A validated reference to a Secrets Manager secret, formatted as
/// "arn:aws:secretsmanager:REGION:ACCOUNT:secret:NAME". Only the reference
/// is ever held; the secret's value is never present at assembly time.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug, JsonSchema)]
pub struct SecretArn(String);

impl SecretArn {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for SecretArn {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.splitn(7, ':').collect();
        if fields.len() != 7 {
            return Err(Self::Err::new(
                ErrorKind::InvalidInput,
                format!(
                    "expected 7 colon-separated fields in secret ARN {}, \
                     got {}",
                    s,
                    fields.len()
                ),
            ));
        }

        if fields[0] != "arn" || !fields[1].starts_with("aws") {
            return Err(Self::Err::new(
                ErrorKind::InvalidInput,
                format!("secret ARN {} does not begin with arn:aws", s),
            ));
        }

        if fields[2] != "secretsmanager" {
            return Err(Self::Err::new(
                ErrorKind::InvalidInput,
                format!(
                    "secret ARN {} names service {:?}, not secretsmanager",
                    s, fields[2]
                ),
            ));
        }

        if fields[5] != "secret" || fields[6].is_empty() {
            return Err(Self::Err::new(
                ErrorKind::InvalidInput,
                format!("secret ARN {} has no secret name", s),
            ));
        }

        Ok(Self(s.to_owned()))
    }
}

impl Display for SecretArn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl Serialize for SecretArn {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'d> Deserialize<'d> for SecretArn {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'d>,
    {
        let s = String::deserialize(deserializer)?;
        FromStr::from_str(&s).map_err(de::Error::custom)
    }
}

/// The CPU architecture a workload image is built for.
#[derive(
    Clone, Copy, Deserialize, Serialize, Debug, PartialEq, Eq, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CpuArchitecture {
    X86_64,
    Arm64,
}

impl Display for CpuArchitecture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                CpuArchitecture::X86_64 => "x86_64",
                CpuArchitecture::Arm64 => "arm64",
            }
        )
    }
}

#[cfg(test)]
mod test {
    use super::{CidrBlock, SecretArn};
    use serde::Deserialize;
    use serde_test::{assert_tokens, Token};
    use std::net::Ipv4Addr;
    use std::str::FromStr;

    const CIDR_CASES: &[(&str, Result<(Ipv4Addr, u8), ()>)] = &[
        ("10.250.0.0/16", Ok((Ipv4Addr::new(10, 250, 0, 0), 16))),
        ("192.168.1.0/24", Ok((Ipv4Addr::new(192, 168, 1, 0), 24))),
        ("0.0.0.0/0", Ok((Ipv4Addr::new(0, 0, 0, 0), 0))),
        ("10.0.0.1/16", Err(())),
        ("10.0.0.0/33", Err(())),
        ("10.0.0.0", Err(())),
        ("10.0.0/16", Err(())),
        ("a.b.c.d/8", Err(())),
        ("", Err(())),
    ];

    #[test]
    fn cidr_from_str() {
        for (input, expected) in CIDR_CASES {
            match CidrBlock::from_str(input) {
                Ok(cidr) => {
                    let (addr, prefix_len) = expected.unwrap();
                    assert_eq!(cidr.addr(), addr);
                    assert_eq!(cidr.prefix_len(), prefix_len);
                }
                Err(_) => assert!(
                    expected.is_err(),
                    "expected error parsing CIDR block {}",
                    input
                ),
            }
        }
    }

    #[test]
    fn cidr_serialization() {
        for (input, expected) in CIDR_CASES {
            match expected {
                Ok((addr, prefix_len)) => {
                    let cidr = CidrBlock::new(*addr, *prefix_len).unwrap();
                    assert_tokens(&cidr, &[Token::Str(input)]);
                }
                Err(_) => {
                    let tokens = [Token::Str(input)];
                    let mut de = serde_test::Deserializer::new(&tokens);
                    assert!(CidrBlock::deserialize(&mut de).is_err());
                }
            }
        }
    }

    #[test]
    fn cidr_privacy() {
        let private =
            ["10.250.0.0/16", "172.16.0.0/12", "192.168.0.0/16", "10.0.0.0/8"];
        for input in private {
            assert!(
                CidrBlock::from_str(input).unwrap().is_private(),
                "{} should be private",
                input
            );
        }

        let public = ["8.0.0.0/8", "172.32.0.0/16", "10.0.0.0/7", "0.0.0.0/0"];
        for input in public {
            assert!(
                !CidrBlock::from_str(input).unwrap().is_private(),
                "{} should not be private",
                input
            );
        }
    }

    #[test]
    fn cidr_subnet_carving() {
        let block = CidrBlock::from_str("10.250.0.0/16").unwrap();
        assert_eq!(block.subnet_capacity(24), Some(256));
        assert_eq!(block.subnet_capacity(16), Some(1));
        assert_eq!(block.subnet_capacity(8), None);

        assert_eq!(
            block.subnet(24, 0).unwrap().to_string(),
            "10.250.0.0/24"
        );
        assert_eq!(
            block.subnet(24, 1).unwrap().to_string(),
            "10.250.1.0/24"
        );
        assert_eq!(
            block.subnet(24, 255).unwrap().to_string(),
            "10.250.255.0/24"
        );
        assert!(block.subnet(24, 256).is_none());

        let small = CidrBlock::from_str("10.1.2.0/25").unwrap();
        assert_eq!(small.subnet_capacity(24), None);
        assert!(small.subnet(24, 0).is_none());
    }

    const ARN_CASES: &[(&str, bool)] = &[
        ("arn:aws:secretsmanager:us-east-1:123:secret:key", true),
        (
            "arn:aws:secretsmanager:eu-west-1:366590864501:secret:prod/api-key",
            true,
        ),
        ("arn:aws-cn:secretsmanager:cn-north-1:1:secret:k", true),
        ("not-an-arn", false),
        ("arn:aws:secretsmanager:us-east-1:123:secret:", false),
        ("arn:aws:s3:us-east-1:123:secret:key", false),
        ("arn:gcp:secretsmanager:us-east-1:123:secret:key", false),
        ("arn:aws:secretsmanager:us-east-1:123", false),
        ("", false),
    ];

    #[test]
    fn secret_arn_from_str() {
        for (input, ok) in ARN_CASES {
            let parsed = SecretArn::from_str(input);
            assert_eq!(
                parsed.is_ok(),
                *ok,
                "unexpected parse result for {:?}: {:?}",
                input,
                parsed
            );
            if let Ok(arn) = parsed {
                assert_eq!(arn.as_str(), *input);
            }
        }
    }
}
