//! Built-in organisation data served by the ladder.

use crate::{
    catalog::{Catalog, CatalogError},
    directory::{Directory, DirectoryError, Employee},
    role::{Requirement, Role, SkillRequirement},
};

pub const SKILLS: [&str; 5] = [
    "Python",
    "Data Analysis",
    "Project Management",
    "System Design",
    "Communication",
];

// (name, department, paygrade, level, band)
const ROLES: [(&str, &str, &str, u32, &str); 10] = [
    ("Analyst", "Data", "PG1", 1, "B1"),
    ("Developer", "Engineering", "PG2", 2, "B1"),
    ("Senior Analyst", "Data", "PG2", 2, "B2"),
    ("Senior Developer", "Engineering", "PG3", 3, "B2"),
    ("Developer", "Engineering", "PG3", 3, "B3"),
    ("Senior Analyst", "Data", "PG3", 3, "B3"),
    ("Team Lead", "Engineering", "PG4", 4, "B3"),
    ("Project Manager", "Operations", "PG4", 4, "B2"),
    ("Solutions Architect", "Engineering", "PG5", 5, "B4"),
    ("Engineering Manager", "Operations", "PG5", 5, "B4"),
];

const EMPLOYEES: [(u32, &str, &str); 5] = [
    (1001, "Jordan Lee", "PG2"),
    (1002, "Priya Nair", "PG3"),
    (1003, "Sam Ortiz", "PG1"),
    (1004, "Alex Chen", "PG4"),
    (1005, "Morgan Diaz", "PG5"),
];

/// Matrix cell for skill `skill_index` of role `role_index`.
pub fn seeded_requirement(skill_index: usize, role_index: usize) -> Requirement {
    if (skill_index + role_index) % 4 == 0 {
        Requirement::NotRequired
    } else {
        Requirement::Level((skill_index + role_index % 5) as u8)
    }
}

pub fn roles() -> Vec<Role> {
    ROLES
        .iter()
        .map(|&(name, department, paygrade, level, band)| {
            Role::new(name, department, paygrade, level, band)
        })
        .collect()
}

pub fn requirements() -> Vec<SkillRequirement> {
    roles()
        .iter()
        .enumerate()
        .flat_map(|(role_index, role)| {
            SKILLS
                .iter()
                .enumerate()
                .map(move |(skill_index, skill)| SkillRequirement {
                    role: role.id(),
                    skill: (*skill).to_string(),
                    requirement: seeded_requirement(skill_index, role_index),
                })
        })
        .collect()
}

pub fn catalog() -> Result<Catalog, CatalogError> {
    Catalog::new(
        roles(),
        SKILLS.iter().map(|skill| (*skill).to_string()).collect(),
        requirements(),
    )
}

pub fn employees() -> Vec<Employee> {
    EMPLOYEES
        .iter()
        .map(|&(id, name, paygrade)| Employee::new(id, name, paygrade))
        .collect()
}

pub fn directory(catalog: &Catalog) -> Result<Directory, DirectoryError> {
    Directory::new(employees(), catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::RoleId;

    #[test]
    fn seed_builds_a_consistent_catalog() {
        let catalog = catalog().unwrap();
        assert_eq!(catalog.roles().len(), ROLES.len());
        assert_eq!(catalog.skills().len(), SKILLS.len());
        assert!(directory(&catalog).is_ok());
    }

    #[test]
    fn repeated_role_names_are_distinct_identities() {
        let catalog = catalog().unwrap();
        let developers = catalog
            .roles()
            .iter()
            .filter(|role| role.name == "Developer")
            .count();
        assert_eq!(developers, 2);
        assert!(catalog.role(&RoleId::new("Developer", "B1", "PG2")).is_some());
        assert!(catalog.role(&RoleId::new("Developer", "B3", "PG3")).is_some());
    }

    #[test]
    fn generation_rule_marks_every_fourth_diagonal_as_not_required() {
        assert_eq!(seeded_requirement(0, 0), Requirement::NotRequired);
        assert_eq!(seeded_requirement(3, 1), Requirement::NotRequired);
        assert_eq!(seeded_requirement(0, 1), Requirement::Level(1));
        assert_eq!(seeded_requirement(4, 3), Requirement::Level(7));
        // role index wraps at 5 for the level but not for the blank rule
        assert_eq!(seeded_requirement(1, 6), Requirement::Level(2));
    }
}
