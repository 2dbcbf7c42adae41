//! Per-request reconstruction of the career dashboard.
//!
//! A view is rebuilt from the static catalog and the viewer's selections on
//! every call. Nothing is remembered between calls; lookup failures end up as
//! notices on the view rather than errors.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    catalog::{Catalog, LadderOrder},
    directory::{Directory, Employee},
    gap::{GapPolicy, GapReport},
    role::{Role, RoleId, SkillLevel},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

/// User-facing message attached to a view.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }
}

/// The viewer's selections, carried by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ViewRequest {
    pub employee: String,
    pub current: Option<RoleId>,
    pub target: Option<RoleId>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LadderEntry {
    pub role: Role,
    pub highlighted: bool,
    pub comparable: bool,
    pub skills: Vec<SkillLevel>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LevelGroup {
    pub level: u32,
    pub roles: Vec<LadderEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DashboardView {
    pub viewer: Employee,
    pub selectable_roles: Vec<Role>,
    pub current: Option<Role>,
    pub ladder: Vec<LevelGroup>,
    pub comparison: Option<GapReport>,
    pub notices: Vec<Notice>,
}

impl DashboardView {
    pub fn build(
        catalog: &Catalog,
        directory: &Directory,
        request: &ViewRequest,
        policy: GapPolicy,
        order: LadderOrder,
    ) -> Self {
        let mut notices = Vec::new();
        let resolution = directory.resolve(&request.employee);
        notices.extend(resolution.notice);
        let viewer = resolution.employee;

        let selectable_roles = catalog.roles_at_paygrade(&viewer.paygrade);
        if selectable_roles.is_empty() {
            notices.push(Notice::info(format!(
                "no roles are defined for paygrade {}",
                viewer.paygrade
            )));
        }

        let current = select_current(&selectable_roles, request.current.as_ref(), &mut notices);
        let ladder = ladder(catalog, current.as_ref(), order);

        let comparison = match (&current, &request.target) {
            (Some(current), Some(target)) => {
                match catalog.gap(&current.id(), target, policy) {
                    Ok(report) => Some(report),
                    Err(err) => {
                        debug!(error = %err, "comparison rejected");
                        notices.push(Notice::warning(err.to_string()));
                        None
                    }
                }
            }
            (None, Some(_)) => {
                notices.push(Notice::warning(
                    "select a current role before comparing skills",
                ));
                None
            }
            _ => None,
        };

        Self {
            viewer,
            selectable_roles,
            current,
            ladder,
            comparison,
            notices,
        }
    }
}

fn select_current(
    selectable: &[Role],
    requested: Option<&RoleId>,
    notices: &mut Vec<Notice>,
) -> Option<Role> {
    if let Some(requested) = requested {
        if let Some(role) = selectable.iter().find(|role| role.is(requested)) {
            return Some(role.clone());
        }
        notices.push(Notice::info(format!(
            "{requested} is not selectable at your paygrade; using the default role"
        )));
    }
    selectable.first().cloned()
}

/// Level groups in ascending order. With no current role nothing is
/// highlighted or comparable.
pub fn ladder(catalog: &Catalog, current: Option<&Role>, order: LadderOrder) -> Vec<LevelGroup> {
    catalog
        .roles_by_level(order)
        .into_iter()
        .map(|(level, roles)| LevelGroup {
            level,
            roles: roles
                .into_iter()
                .map(|role| {
                    let highlighted = current.is_some_and(|current| *current == role);
                    let comparable =
                        !highlighted && current.is_some_and(|current| role.level >= current.level);
                    let skills = catalog.skill_profile(&role.id()).unwrap_or_default();
                    LadderEntry {
                        role,
                        highlighted,
                        comparable,
                        skills,
                    }
                })
                .collect(),
        })
        .collect()
}
