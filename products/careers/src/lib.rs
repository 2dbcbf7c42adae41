//! Career ladder vertical slice.
//!
//! Holds the role catalog, the skill-requirement matrix and the employee
//! directory, and computes skill gaps between roles. Everything here is pure
//! and synchronous; the server crate wraps it in HTTP and GraphQL.

pub mod catalog;
pub mod directory;
pub mod gap;
pub mod role;
pub mod seed;
pub mod view;

use thiserror::Error;

pub use catalog::{Catalog, CatalogError, LadderOrder};
pub use directory::{Directory, DirectoryError, Employee, Resolution};
pub use gap::{GapEntry, GapError, GapKind, GapPolicy, GapReport, classify};
pub use role::{Requirement, Role, RoleId, RoleIdError, SkillLevel, SkillRequirement};
pub use view::{DashboardView, LadderEntry, LevelGroup, Notice, Severity, ViewRequest, ladder};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
    #[error("invalid directory: {0}")]
    Directory(#[from] DirectoryError),
}

/// Catalog and directory served together for the lifetime of the process.
#[derive(Clone, Debug)]
pub struct CareersModule {
    pub catalog: Catalog,
    pub directory: Directory,
}

impl CareersModule {
    pub fn seeded() -> Result<Self, SeedError> {
        let catalog = seed::catalog()?;
        let directory = seed::directory(&catalog)?;
        Ok(Self { catalog, directory })
    }

    pub fn view(
        &self,
        request: &ViewRequest,
        policy: GapPolicy,
        order: LadderOrder,
    ) -> DashboardView {
        DashboardView::build(&self.catalog, &self.directory, request, policy, order)
    }
}
