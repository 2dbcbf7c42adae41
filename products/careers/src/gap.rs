//! Skill gap between a current role and a target role.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{
    catalog::Catalog,
    role::{Requirement, Role, RoleId},
};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GapError {
    #[error("unknown role {0}")]
    UnknownRole(RoleId),
    #[error(
        "{target} (level {target_level}) is below {current} (level {current_level}); pick a role at or above your level"
    )]
    TargetBelowCurrent {
        current: RoleId,
        current_level: u32,
        target: RoleId,
        target_level: u32,
    },
}

/// Classification of one skill when moving between roles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum GapKind {
    /// Held today, not asked for by the target role.
    GoodToHave,
    /// Not held today; carries the full required level.
    NewSkill(u8),
    /// Required minus current. Zero or negative means already met.
    Gap(i32),
}

impl GapKind {
    pub fn needs_attention(self) -> bool {
        match self {
            GapKind::GoodToHave => false,
            GapKind::NewSkill(_) => true,
            GapKind::Gap(gap) => gap > 0,
        }
    }
}

/// Returns `None` when neither role asks for the skill.
pub fn classify(current: Requirement, required: Requirement) -> Option<GapKind> {
    match (current, required) {
        (Requirement::NotRequired, Requirement::NotRequired) => None,
        (Requirement::Level(_), Requirement::NotRequired) => Some(GapKind::GoodToHave),
        (Requirement::NotRequired, Requirement::Level(required)) => {
            Some(GapKind::NewSkill(required))
        }
        (Requirement::Level(current), Requirement::Level(required)) => {
            Some(GapKind::Gap(i32::from(required) - i32::from(current)))
        }
    }
}

/// Which rows make it into a report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GapPolicy {
    pub include_good_to_have: bool,
}

impl GapPolicy {
    pub fn keeps(self, kind: GapKind) -> bool {
        kind.needs_attention() || (self.include_good_to_have && kind == GapKind::GoodToHave)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GapEntry {
    pub skill: String,
    pub current: Requirement,
    pub required: Requirement,
    #[serde(flatten)]
    pub kind: GapKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GapReport {
    pub current: Role,
    pub target: Role,
    pub include_good_to_have: bool,
    /// False when met gaps and good-to-have rows were kept as well.
    pub filtered: bool,
    pub entries: Vec<GapEntry>,
}

impl GapReport {
    /// Every classified skill for the move, met gaps included.
    pub fn unfiltered(
        catalog: &Catalog,
        current: &RoleId,
        target: &RoleId,
    ) -> Result<Self, GapError> {
        catalog.compare_all(current, target)
    }
}

impl Catalog {
    /// Every classified skill for the move, in vocabulary order, before any
    /// filtering. Rejects targets below the current level.
    pub fn compare_all(&self, current: &RoleId, target: &RoleId) -> Result<GapReport, GapError> {
        let from = self
            .role(current)
            .ok_or_else(|| GapError::UnknownRole(current.clone()))?;
        let to = self
            .role(target)
            .ok_or_else(|| GapError::UnknownRole(target.clone()))?;
        if to.level < from.level {
            debug!(%current, %target, "rejected comparison below current level");
            return Err(GapError::TargetBelowCurrent {
                current: current.clone(),
                current_level: from.level,
                target: target.clone(),
                target_level: to.level,
            });
        }
        let (Some(have), Some(want)) = (self.requirements(current), self.requirements(target))
        else {
            return Err(GapError::UnknownRole(current.clone()));
        };

        let entries = self
            .skills()
            .iter()
            .zip(have.iter().zip(want))
            .filter_map(|(skill, (&current, &required))| {
                classify(current, required).map(|kind| GapEntry {
                    skill: skill.clone(),
                    current,
                    required,
                    kind,
                })
            })
            .collect();
        Ok(GapReport {
            current: from.clone(),
            target: to.clone(),
            include_good_to_have: true,
            filtered: false,
            entries,
        })
    }

    /// Skills needing attention when moving from `current` to `target`.
    pub fn gap(
        &self,
        current: &RoleId,
        target: &RoleId,
        policy: GapPolicy,
    ) -> Result<GapReport, GapError> {
        let mut report = self.compare_all(current, target)?;
        report.entries.retain(|entry| policy.keeps(entry.kind));
        report.include_good_to_have = policy.include_good_to_have;
        report.filtered = true;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn developer() -> RoleId {
        RoleId::new("Developer", "B1", "PG2")
    }

    fn senior_developer() -> RoleId {
        RoleId::new("Senior Developer", "B2", "PG3")
    }

    fn summary(report: &GapReport) -> Vec<(&str, GapKind)> {
        report
            .entries
            .iter()
            .map(|entry| (entry.skill.as_str(), entry.kind))
            .collect()
    }

    #[test]
    fn developer_to_senior_developer() {
        let catalog = seed::catalog().unwrap();
        let report = catalog
            .gap(&developer(), &senior_developer(), GapPolicy::default())
            .unwrap();
        assert_eq!(
            summary(&report),
            vec![
                ("Python", GapKind::Gap(2)),
                ("Project Management", GapKind::Gap(2)),
                ("System Design", GapKind::NewSkill(6)),
                ("Communication", GapKind::Gap(2)),
            ]
        );
        assert_eq!(report.entries[0].current, Requirement::Level(1));
        assert_eq!(report.entries[0].required, Requirement::Level(3));
    }

    #[test]
    fn good_to_have_is_opt_in() {
        let catalog = seed::catalog().unwrap();
        let policy = GapPolicy {
            include_good_to_have: true,
        };
        let report = catalog
            .gap(&developer(), &senior_developer(), policy)
            .unwrap();
        assert_eq!(report.entries.len(), 5);
        assert_eq!(report.entries[1].skill, "Data Analysis");
        assert_eq!(report.entries[1].kind, GapKind::GoodToHave);
        assert_eq!(report.entries[1].required, Requirement::NotRequired);
    }

    #[test]
    fn unfiltered_report_keeps_met_gaps() {
        let catalog = seed::catalog().unwrap();
        let report = GapReport::unfiltered(&catalog, &developer(), &developer()).unwrap();
        assert!(!report.filtered);
        // every skill except the blank System Design cell, all at zero
        assert_eq!(report.entries.len(), 4);
        assert!(report.entries.iter().all(|entry| entry.kind == GapKind::Gap(0)));

        let full = catalog
            .compare_all(&developer(), &senior_developer())
            .unwrap();
        assert_eq!(full.entries.len(), 5);
        assert!(matches!(
            GapReport::unfiltered(&catalog, &senior_developer(), &developer()),
            Err(GapError::TargetBelowCurrent { .. })
        ));
    }

    #[test]
    fn comparing_a_role_with_itself_is_empty() {
        let catalog = seed::catalog().unwrap();
        let report = catalog
            .gap(&developer(), &developer(), GapPolicy::default())
            .unwrap();
        assert!(report.entries.is_empty());
    }

    #[test]
    fn lower_target_is_rejected() {
        let catalog = seed::catalog().unwrap();
        let err = catalog
            .gap(&senior_developer(), &developer(), GapPolicy::default())
            .unwrap_err();
        assert!(matches!(
            err,
            GapError::TargetBelowCurrent {
                current_level: 3,
                target_level: 2,
                ..
            }
        ));
    }

    #[test]
    fn unknown_roles_are_reported() {
        let catalog = seed::catalog().unwrap();
        let ghost = RoleId::new("Ghost", "B1", "PG2");
        assert_eq!(
            catalog
                .gap(&ghost, &developer(), GapPolicy::default())
                .unwrap_err(),
            GapError::UnknownRole(ghost.clone())
        );
        assert_eq!(
            catalog
                .gap(&developer(), &ghost, GapPolicy::default())
                .unwrap_err(),
            GapError::UnknownRole(ghost)
        );
    }

    #[test]
    fn classification_table() {
        use Requirement::{Level, NotRequired};
        assert_eq!(classify(NotRequired, NotRequired), None);
        assert_eq!(classify(Level(0), NotRequired), Some(GapKind::GoodToHave));
        assert_eq!(classify(NotRequired, Level(0)), Some(GapKind::NewSkill(0)));
        assert_eq!(classify(Level(4), Level(1)), Some(GapKind::Gap(-3)));
        assert!(!GapKind::Gap(0).needs_attention());
        assert!(GapKind::NewSkill(0).needs_attention());
    }

    #[test]
    fn entries_serialise_with_kind_tag() {
        let entry = GapEntry {
            skill: "System Design".into(),
            current: Requirement::NotRequired,
            required: Requirement::Level(6),
            kind: GapKind::NewSkill(6),
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "skill": "System Design",
                "current": null,
                "required": 6,
                "kind": "new_skill",
                "value": 6
            })
        );
    }
}
