//! Employee directory used to pick the viewer's identity.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::{catalog::Catalog, view::Notice};

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Employee {
    pub id: u32,
    pub full_name: String,
    pub paygrade: String,
}

impl Employee {
    pub fn new(id: u32, full_name: impl Into<String>, paygrade: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            paygrade: paygrade.into(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("directory needs at least one employee")]
    Empty,
    #[error("employee id {0} is listed more than once")]
    DuplicateId(u32),
    #[error("employee {id} has paygrade {paygrade} which no role uses")]
    UnknownPaygrade { id: u32, paygrade: String },
}

/// Outcome of resolving a typed identifier.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Resolution {
    pub employee: Employee,
    pub notice: Option<Notice>,
}

#[derive(Clone, Debug)]
pub struct Directory {
    employees: Vec<Employee>,
}

impl Directory {
    pub fn new(employees: Vec<Employee>, catalog: &Catalog) -> Result<Self, DirectoryError> {
        if employees.is_empty() {
            return Err(DirectoryError::Empty);
        }
        let mut ids = BTreeSet::new();
        for employee in &employees {
            if !ids.insert(employee.id) {
                return Err(DirectoryError::DuplicateId(employee.id));
            }
            if catalog.paygrade_level(&employee.paygrade).is_none() {
                return Err(DirectoryError::UnknownPaygrade {
                    id: employee.id,
                    paygrade: employee.paygrade.clone(),
                });
            }
        }
        Ok(Self { employees })
    }

    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    pub fn get(&self, id: u32) -> Option<&Employee> {
        self.employees.iter().find(|employee| employee.id == id)
    }

    /// Identity used when the typed identifier cannot be resolved.
    pub fn fallback(&self) -> &Employee {
        // `new` rejects an empty list
        &self.employees[0]
    }

    /// Resolves free-form identifier input, falling back to the first
    /// employee with a notice instead of failing.
    pub fn resolve(&self, input: &str) -> Resolution {
        let trimmed = input.trim();
        let fallback = self.fallback();
        let notice = match trimmed.parse::<u32>() {
            Ok(id) => match self.get(id) {
                Some(employee) => {
                    return Resolution {
                        employee: employee.clone(),
                        notice: None,
                    };
                }
                None => Notice::info(format!(
                    "employee {id} not found; showing {} ({})",
                    fallback.full_name, fallback.id
                )),
            },
            Err(_) => Notice::info(format!(
                "{trimmed:?} is not a valid employee id; showing {} ({})",
                fallback.full_name, fallback.id
            )),
        };
        debug!(input = trimmed, fallback = fallback.id, "viewer identity fell back");
        Resolution {
            employee: fallback.clone(),
            notice: Some(notice),
        }
    }
}
