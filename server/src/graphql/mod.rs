mod types;

use std::sync::Arc;

use async_graphql::{
    Context, EmptyMutation, EmptySubscription, ErrorExtensions, Object, Schema, SimpleObject,
};
use platform_api::{ApiError, internal_error};
use products_careers::{CareersModule, GapReport, RoleId, ViewRequest, ladder};
use tracing::instrument;

use crate::{config::AppConfig, errors::gap_error};

pub use types::*;

pub type SchemaType = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

pub fn build_schema(careers: Arc<CareersModule>, config: Arc<AppConfig>) -> SchemaType {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(careers)
        .data(config)
        .finish()
}

fn careers<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Arc<CareersModule>> {
    ctx.data::<Arc<CareersModule>>()
        .map_err(|err| internal_error(anyhow::anyhow!("{}", err.message)))
}

fn config<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a Arc<AppConfig>> {
    ctx.data::<Arc<AppConfig>>()
        .map_err(|err| internal_error(anyhow::anyhow!("{}", err.message)))
}

#[derive(Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    #[instrument(name = "graphql.health", skip_all)]
    async fn health(&self) -> HealthPayload {
        HealthPayload { ok: true }
    }

    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// Fixed skill vocabulary, in report order.
    #[instrument(name = "graphql.skills", skip_all)]
    async fn skills(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<String>> {
        Ok(careers(ctx)?.catalog.skills().to_vec())
    }

    /// Roles at a paygrade, or every role when no paygrade is given.
    #[instrument(name = "graphql.roles", skip(self, ctx))]
    async fn roles(
        &self,
        ctx: &Context<'_>,
        paygrade: Option<String>,
    ) -> async_graphql::Result<Vec<RoleNode>> {
        let catalog = &careers(ctx)?.catalog;
        let roles = match paygrade {
            Some(paygrade) => catalog.roles_at_paygrade(&paygrade),
            None => catalog.roles().to_vec(),
        };
        Ok(roles.into_iter().map(Into::into).collect())
    }

    #[instrument(name = "graphql.ladder", skip(self, ctx))]
    async fn ladder(
        &self,
        ctx: &Context<'_>,
        order: Option<LadderOrderArg>,
    ) -> async_graphql::Result<Vec<LevelGroupNode>> {
        let order = order.map(Into::into).unwrap_or(config(ctx)?.ladder_order);
        Ok(ladder(&careers(ctx)?.catalog, None, order)
            .into_iter()
            .map(Into::into)
            .collect())
    }

    #[instrument(name = "graphql.skill_profile", skip(self, ctx))]
    async fn skill_profile(
        &self,
        ctx: &Context<'_>,
        role: RoleIdInput,
    ) -> async_graphql::Result<Vec<SkillLevelNode>> {
        let id = RoleId::from(role);
        careers(ctx)?
            .catalog
            .skill_profile(&id)
            .map(|rows| rows.into_iter().map(Into::into).collect())
            .ok_or_else(|| ApiError::NotFound(format!("unknown role {id}")).extend())
    }

    /// Skill gap between two roles. `all` skips filtering and lists every
    /// classified skill, met gaps included.
    #[instrument(name = "graphql.gap", skip(self, ctx))]
    async fn gap(
        &self,
        ctx: &Context<'_>,
        from: RoleIdInput,
        to: RoleIdInput,
        include_good_to_have: Option<bool>,
        #[graphql(default)] all: bool,
    ) -> async_graphql::Result<GapReportNode> {
        let (from, to) = (RoleId::from(from), RoleId::from(to));
        let catalog = &careers(ctx)?.catalog;
        let report = if all {
            GapReport::unfiltered(catalog, &from, &to)
        } else {
            catalog.gap(&from, &to, config(ctx)?.policy(include_good_to_have))
        };
        report
            .map(Into::into)
            .map_err(|err| gap_error(err).extend())
    }

    #[instrument(name = "graphql.employee", skip(self, ctx))]
    async fn employee(
        &self,
        ctx: &Context<'_>,
        id: u32,
    ) -> async_graphql::Result<Option<EmployeeNode>> {
        Ok(careers(ctx)?.directory.get(id).cloned().map(Into::into))
    }

    /// Whole dashboard for a viewer and their current selections.
    #[instrument(name = "graphql.viewer", skip(self, ctx))]
    async fn viewer(
        &self,
        ctx: &Context<'_>,
        employee: String,
        current: Option<RoleIdInput>,
        target: Option<RoleIdInput>,
        include_good_to_have: Option<bool>,
        order: Option<LadderOrderArg>,
    ) -> async_graphql::Result<DashboardNode> {
        let config = config(ctx)?;
        let request = ViewRequest {
            employee,
            current: current.map(Into::into),
            target: target.map(Into::into),
        };
        let view = careers(ctx)?.view(
            &request,
            config.policy(include_good_to_have),
            order.map(Into::into).unwrap_or(config.ladder_order),
        );
        Ok(view.into())
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct HealthPayload {
    pub ok: bool,
}
