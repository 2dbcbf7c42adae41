//! Static role catalog and skill-requirement matrix.

use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::role::{Requirement, Role, RoleId, SkillLevel, SkillRequirement};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("role {0} is listed more than once")]
    DuplicateRole(RoleId),
    #[error("skill {0:?} is listed more than once")]
    DuplicateSkill(String),
    #[error("paygrade {paygrade} is mapped to levels {first} and {second}")]
    ConflictingPaygrade {
        paygrade: String,
        first: u32,
        second: u32,
    },
    #[error("requirement references unknown role {0}")]
    UnknownRole(RoleId),
    #[error("requirement references unknown skill {0:?}")]
    UnknownSkill(String),
    #[error("role {role} has more than one entry for skill {skill:?}")]
    DuplicateRequirement { role: RoleId, skill: String },
    #[error("role {role} has no entry for skill {skill:?}")]
    MissingRequirement { role: RoleId, skill: String },
}

/// How roles inside one ladder level are ordered.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LadderOrder {
    /// Keep catalog order.
    Catalog,
    /// Alphabetical by role name, then band and paygrade.
    #[default]
    #[serde(alias = "by_name")]
    Name,
}

impl fmt::Display for LadderOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LadderOrder::Catalog => "catalog",
            LadderOrder::Name => "name",
        })
    }
}

impl FromStr for LadderOrder {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "catalog" => Ok(LadderOrder::Catalog),
            "name" | "by_name" => Ok(LadderOrder::Name),
            other => Err(format!("unknown ladder order {other:?} (use catalog|name)")),
        }
    }
}

/// Immutable role catalog joined with the skill matrix.
///
/// Construction validates that the matrix is total over roles and skills, so
/// lookups on a known role never miss a skill.
#[derive(Clone, Debug)]
pub struct Catalog {
    roles: Vec<Role>,
    skills: Vec<String>,
    paygrades: BTreeMap<String, u32>,
    // Indexed by position in `skills`.
    matrix: BTreeMap<RoleId, Vec<Requirement>>,
}

impl Catalog {
    pub fn new(
        roles: Vec<Role>,
        skills: Vec<String>,
        requirements: Vec<SkillRequirement>,
    ) -> Result<Self, CatalogError> {
        let mut paygrades = BTreeMap::new();
        let mut cells: BTreeMap<RoleId, Vec<Option<Requirement>>> = BTreeMap::new();
        for role in &roles {
            if let Some(first) = paygrades.insert(role.paygrade.clone(), role.level) {
                if first != role.level {
                    return Err(CatalogError::ConflictingPaygrade {
                        paygrade: role.paygrade.clone(),
                        first,
                        second: role.level,
                    });
                }
            }
            if cells.insert(role.id(), vec![None; skills.len()]).is_some() {
                return Err(CatalogError::DuplicateRole(role.id()));
            }
        }

        let mut seen = BTreeSet::new();
        for skill in &skills {
            if !seen.insert(skill.as_str()) {
                return Err(CatalogError::DuplicateSkill(skill.clone()));
            }
        }

        for cell in requirements {
            let index = skills
                .iter()
                .position(|skill| *skill == cell.skill)
                .ok_or_else(|| CatalogError::UnknownSkill(cell.skill.clone()))?;
            let row = cells
                .get_mut(&cell.role)
                .ok_or_else(|| CatalogError::UnknownRole(cell.role.clone()))?;
            if row[index].replace(cell.requirement).is_some() {
                return Err(CatalogError::DuplicateRequirement {
                    role: cell.role,
                    skill: cell.skill,
                });
            }
        }

        let mut matrix = BTreeMap::new();
        for (role, row) in cells {
            let mut filled = Vec::with_capacity(row.len());
            for (index, requirement) in row.into_iter().enumerate() {
                let requirement = requirement.ok_or_else(|| CatalogError::MissingRequirement {
                    role: role.clone(),
                    skill: skills[index].clone(),
                })?;
                filled.push(requirement);
            }
            matrix.insert(role, filled);
        }

        Ok(Self {
            roles,
            skills,
            paygrades,
            matrix,
        })
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn skills(&self) -> &[String] {
        &self.skills
    }

    /// Paygrade code to level.
    pub fn paygrades(&self) -> &BTreeMap<String, u32> {
        &self.paygrades
    }

    pub fn paygrade_level(&self, paygrade: &str) -> Option<u32> {
        self.paygrades.get(paygrade).copied()
    }

    pub fn role(&self, id: &RoleId) -> Option<&Role> {
        self.roles.iter().find(|role| role.is(id))
    }

    pub fn roles_at_paygrade(&self, paygrade: &str) -> Vec<Role> {
        self.roles
            .iter()
            .filter(|role| role.paygrade == paygrade)
            .cloned()
            .collect()
    }

    pub fn roles_by_level(&self, order: LadderOrder) -> BTreeMap<u32, Vec<Role>> {
        let mut levels: BTreeMap<u32, Vec<Role>> = BTreeMap::new();
        for role in &self.roles {
            levels.entry(role.level).or_default().push(role.clone());
        }
        if order == LadderOrder::Name {
            for roles in levels.values_mut() {
                roles.sort_by(|a, b| {
                    a.name
                        .cmp(&b.name)
                        .then_with(|| a.band.cmp(&b.band))
                        .then_with(|| a.paygrade.cmp(&b.paygrade))
                });
            }
        }
        levels
    }

    pub fn requirement(&self, role: &RoleId, skill: &str) -> Option<Requirement> {
        let index = self.skills.iter().position(|name| name == skill)?;
        self.matrix.get(role).map(|row| row[index])
    }

    /// Full matrix row for a role, in skill vocabulary order.
    pub fn requirements(&self, role: &RoleId) -> Option<&[Requirement]> {
        self.matrix.get(role).map(Vec::as_slice)
    }

    /// Skills the role actually asks for; "not required" rows are dropped.
    pub fn skill_profile(&self, role: &RoleId) -> Option<Vec<SkillLevel>> {
        let row = self.requirements(role)?;
        Some(
            self.skills
                .iter()
                .zip(row)
                .filter_map(|(skill, requirement)| {
                    requirement.level().map(|level| SkillLevel {
                        skill: skill.clone(),
                        level,
                    })
                })
                .collect(),
        )
    }
}
