//! Entity verification lookups (`/auth/validate-*`).

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ApiResult;
use crate::http::Transport;
use crate::tokens::TokenStorage;

/// Identifier families the backend can verify against USAC records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Consultant Registration Number.
    Crn,
    /// Service Provider Identification Number.
    Spin,
    /// Billed Entity Number.
    Ben,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crn => "crn",
            Self::Spin => "spin",
            Self::Ben => "ben",
        }
    }

    fn path(self) -> String {
        format!("/auth/validate-{}", self.as_str())
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().to_uppercase())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crn" => Ok(Self::Crn),
            "spin" => Ok(Self::Spin),
            "ben" => Ok(Self::Ben),
            other => Err(format!("unknown entity kind '{other}' (expected crn, spin or ben)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntityValidation {
    pub valid: bool,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    number: &'a str,
}

impl<T: Transport, S: TokenStorage> ApiClient<T, S> {
    /// Look up `number`. An unknown number is `Ok` with `valid == false`.
    pub async fn validate_entity(&self, kind: EntityKind, number: &str) -> ApiResult<EntityValidation> {
        let number = number.trim();
        self.post(&kind.path(), &ValidateRequest { number }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_parsing() {
        assert_eq!("BEN".parse::<EntityKind>(), Ok(EntityKind::Ben));
        assert_eq!("spin".parse::<EntityKind>(), Ok(EntityKind::Spin));
        assert!("frn".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_entity_kind_paths() {
        assert_eq!(EntityKind::Crn.path(), "/auth/validate-crn");
        assert_eq!(EntityKind::Ben.to_string(), "BEN");
    }

    #[test]
    fn test_invalid_lookup_deserializes() {
        let v: EntityValidation =
            serde_json::from_str(r#"{"valid":false,"error":"Not found"}"#).expect("deserialize");
        assert!(!v.valid);
        assert_eq!(v.error.as_deref(), Some("Not found"));
        assert!(v.name.is_none());
    }
}
