//! Shared newtypes and utilities used across all service modules.
//!
//! The identifier newtypes are serialization-transparent: they serialize and
//! deserialize exactly like the raw strings the API sends, so they can sit
//! directly in wire types.

mod broadcast;

pub use broadcast::PerItem;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
        pub struct $name(String);

        impl $name {
            pub fn new(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.trim().is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl FromStr for $name {
            type Err = std::convert::Infallible;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok($name(s.to_string()))
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                serializer.serialize_str(&self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(deserializer)?;
                Ok($name(s))
            }
        }
    };
}

// ─── Identifiers ─────────────────────────────────────────────────────────────

string_id!(
    /// Handle for a triggered dataset collection (e.g. `"s_m4x7enmven8djfqak"`).
    SnapshotId
);

string_id!(
    /// Identifier of a remote scraper template (e.g. `"gd_l7q7dkf244hwxbl93"`).
    DatasetId
);

string_id!(
    /// Name of an account-configured zone (e.g. `"sdk_unlocker"`).
    ZoneName
);

string_id!(
    /// Handle for an async Web Unlocker request, read from `x-response-id`.
    ResponseId
);

// ─── ApiToken ────────────────────────────────────────────────────────────────

/// Bearer token for the Bright Data API.
///
/// `Debug` and `Display` only reveal the first four characters so the token
/// can travel through logs and error messages without leaking.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into().trim().to_string())
    }

    /// The raw token. Only used when building the `Authorization` header.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(4).collect();
        format!("{prefix}***")
    }
}

impl std::fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ApiToken").field(&self.redacted()).finish()
    }
}

impl std::fmt::Display for ApiToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl From<&str> for ApiToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ApiToken {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}
