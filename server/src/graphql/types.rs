use async_graphql::{Enum, InputObject, SimpleObject};
use products_careers::{
    DashboardView, Employee, GapEntry, GapKind, GapReport, LadderEntry, LadderOrder, LevelGroup,
    Notice, Requirement, Role, RoleId, Severity, SkillLevel,
};

#[derive(Clone, Debug, InputObject)]
pub struct RoleIdInput {
    pub name: String,
    pub band: String,
    pub paygrade: String,
}

impl From<RoleIdInput> for RoleId {
    fn from(value: RoleIdInput) -> Self {
        RoleId::new(value.name, value.band, value.paygrade)
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum LadderOrderArg {
    Catalog,
    Name,
}

impl From<LadderOrderArg> for LadderOrder {
    fn from(value: LadderOrderArg) -> Self {
        match value {
            LadderOrderArg::Catalog => LadderOrder::Catalog,
            LadderOrderArg::Name => LadderOrder::Name,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct RoleNode {
    pub name: String,
    pub department: String,
    pub paygrade: String,
    pub level: u32,
    pub band: String,
}

impl From<Role> for RoleNode {
    fn from(role: Role) -> Self {
        Self {
            name: role.name,
            department: role.department,
            paygrade: role.paygrade,
            level: role.level,
            band: role.band,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct SkillLevelNode {
    pub skill: String,
    pub level: i32,
}

impl From<SkillLevel> for SkillLevelNode {
    fn from(row: SkillLevel) -> Self {
        Self {
            skill: row.skill,
            level: i32::from(row.level),
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum GapKindTag {
    GoodToHave,
    NewSkill,
    Gap,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct GapEntryNode {
    pub skill: String,
    /// `null` when the current role does not require the skill.
    pub current: Option<i32>,
    /// `null` when the target role does not require the skill.
    pub required: Option<i32>,
    pub kind: GapKindTag,
    /// Gap size for `GAP`, required level for `NEW_SKILL`.
    pub value: Option<i32>,
}

fn level(requirement: Requirement) -> Option<i32> {
    requirement.level().map(i32::from)
}

impl From<GapEntry> for GapEntryNode {
    fn from(entry: GapEntry) -> Self {
        let (kind, value) = match entry.kind {
            GapKind::GoodToHave => (GapKindTag::GoodToHave, None),
            GapKind::NewSkill(required) => (GapKindTag::NewSkill, Some(i32::from(required))),
            GapKind::Gap(gap) => (GapKindTag::Gap, Some(gap)),
        };
        Self {
            skill: entry.skill,
            current: level(entry.current),
            required: level(entry.required),
            kind,
            value,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct GapReportNode {
    pub current: RoleNode,
    pub target: RoleNode,
    pub include_good_to_have: bool,
    pub filtered: bool,
    pub entries: Vec<GapEntryNode>,
}

impl From<GapReport> for GapReportNode {
    fn from(report: GapReport) -> Self {
        Self {
            current: report.current.into(),
            target: report.target.into(),
            include_good_to_have: report.include_good_to_have,
            filtered: report.filtered,
            entries: report.entries.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct LadderEntryNode {
    pub role: RoleNode,
    pub highlighted: bool,
    pub comparable: bool,
    pub skills: Vec<SkillLevelNode>,
}

impl From<LadderEntry> for LadderEntryNode {
    fn from(entry: LadderEntry) -> Self {
        Self {
            role: entry.role.into(),
            highlighted: entry.highlighted,
            comparable: entry.comparable,
            skills: entry.skills.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct LevelGroupNode {
    pub level: u32,
    pub roles: Vec<LadderEntryNode>,
}

impl From<LevelGroup> for LevelGroupNode {
    fn from(group: LevelGroup) -> Self {
        Self {
            level: group.level,
            roles: group.roles.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct EmployeeNode {
    pub id: u32,
    pub full_name: String,
    pub paygrade: String,
}

impl From<Employee> for EmployeeNode {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id,
            full_name: employee.full_name,
            paygrade: employee.paygrade,
        }
    }
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum SeverityTag {
    Info,
    Warning,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct NoticeNode {
    pub severity: SeverityTag,
    pub message: String,
}

impl From<Notice> for NoticeNode {
    fn from(notice: Notice) -> Self {
        Self {
            severity: match notice.severity {
                Severity::Info => SeverityTag::Info,
                Severity::Warning => SeverityTag::Warning,
            },
            message: notice.message,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DashboardNode {
    pub viewer: EmployeeNode,
    pub selectable_roles: Vec<RoleNode>,
    pub current: Option<RoleNode>,
    pub ladder: Vec<LevelGroupNode>,
    pub comparison: Option<GapReportNode>,
    pub notices: Vec<NoticeNode>,
}

impl From<DashboardView> for DashboardNode {
    fn from(view: DashboardView) -> Self {
        Self {
            viewer: view.viewer.into(),
            selectable_roles: view.selectable_roles.into_iter().map(Into::into).collect(),
            current: view.current.map(Into::into),
            ladder: view.ladder.into_iter().map(Into::into).collect(),
            comparison: view.comparison.map(Into::into),
            notices: view.notices.into_iter().map(Into::into).collect(),
        }
    }
}
