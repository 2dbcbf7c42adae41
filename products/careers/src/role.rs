use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Composite identity of a role in the catalog.
///
/// The same role name can appear at several bands and paygrades, so a role is
/// only addressed by the full triple.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
pub struct RoleId {
    pub name: String,
    pub band: String,
    pub paygrade: String,
}

impl RoleId {
    pub fn new(
        name: impl Into<String>,
        band: impl Into<String>,
        paygrade: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            band: band.into(),
            paygrade: paygrade.into(),
        }
    }
}

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.name, self.band, self.paygrade)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoleIdError {
    #[error("role must be written as NAME/BAND/PAYGRADE, got {0:?}")]
    Malformed(String),
    #[error("role {0:?} has an empty field")]
    EmptyField(String),
}

/// Parses the `NAME/BAND/PAYGRADE` form used on the command line.
///
/// Names that contain `/` cannot be written this way and are rejected instead
/// of being split in the wrong place.
impl FromStr for RoleId {
    type Err = RoleIdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let parts = raw.split('/').map(str::trim).collect::<Vec<_>>();
        let [name, band, paygrade] = parts.as_slice() else {
            return Err(RoleIdError::Malformed(raw.to_string()));
        };
        if name.is_empty() || band.is_empty() || paygrade.is_empty() {
            return Err(RoleIdError::EmptyField(raw.to_string()));
        }
        Ok(Self::new(*name, *band, *paygrade))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Role {
    pub name: String,
    pub department: String,
    pub paygrade: String,
    pub level: u32,
    pub band: String,
}

impl Role {
    pub fn new(
        name: impl Into<String>,
        department: impl Into<String>,
        paygrade: impl Into<String>,
        level: u32,
        band: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            department: department.into(),
            paygrade: paygrade.into(),
            level,
            band: band.into(),
        }
    }

    pub fn id(&self) -> RoleId {
        RoleId::new(&self.name, &self.band, &self.paygrade)
    }

    pub fn is(&self, id: &RoleId) -> bool {
        self.name == id.name && self.band == id.band && self.paygrade == id.paygrade
    }
}

/// Proficiency a role asks for in one skill.
///
/// Serialised as the level or `null`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "Option<u8>", into = "Option<u8>")]
pub enum Requirement {
    Level(u8),
    NotRequired,
}

impl Requirement {
    pub fn level(self) -> Option<u8> {
        match self {
            Requirement::Level(level) => Some(level),
            Requirement::NotRequired => None,
        }
    }

    pub fn is_required(self) -> bool {
        matches!(self, Requirement::Level(_))
    }
}

impl From<Option<u8>> for Requirement {
    fn from(value: Option<u8>) -> Self {
        value.map_or(Requirement::NotRequired, Requirement::Level)
    }
}

impl From<Requirement> for Option<u8> {
    fn from(value: Requirement) -> Self {
        value.level()
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Level(level) => write!(f, "{level}"),
            Requirement::NotRequired => f.write_str("-"),
        }
    }
}

/// One row of a role's skill table.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SkillLevel {
    pub skill: String,
    pub level: u8,
}

/// Matrix cell used when building a catalog.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SkillRequirement {
    pub role: RoleId,
    pub skill: String,
    pub requirement: Requirement,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_slash_separated_role() {
        let id: RoleId = "Senior Developer / B2 / PG3".parse().unwrap();
        assert_eq!(id, RoleId::new("Senior Developer", "B2", "PG3"));
    }

    #[test]
    fn rejects_ambiguous_role_strings() {
        assert!(matches!(
            "CI/CD Engineer/B1/PG2".parse::<RoleId>(),
            Err(RoleIdError::Malformed(_))
        ));
        assert!(matches!(
            "Developer//PG2".parse::<RoleId>(),
            Err(RoleIdError::EmptyField(_))
        ));
    }

    #[test]
    fn requirement_serialises_as_nullable_level() {
        let json = serde_json::to_string(&[Requirement::Level(3), Requirement::NotRequired]).unwrap();
        assert_eq!(json, "[3,null]");
        assert_eq!(Requirement::NotRequired.to_string(), "-");
    }

    #[test]
    fn role_identity_matches_all_three_fields() {
        let role = Role::new("Developer", "Engineering", "PG2", 2, "B1");
        assert!(role.is(&RoleId::new("Developer", "B1", "PG2")));
        assert!(!role.is(&RoleId::new("Developer", "B3", "PG2")));
    }
}
