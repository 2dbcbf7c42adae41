mod config;
mod errors;
mod graphql;
mod http;

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use platform_obs::{ObsConfig, init_tracing};
use products_careers::{CareersModule, GapReport, LadderOrder, RoleId, ViewRequest, ladder};
use serde::Serialize;
use tracing::info;

use crate::{
    config::AppConfig,
    http::{AppState, ServeConfig},
};

#[derive(Parser, Debug)]
#[command(name = "ladder-server", version, about = "Career ladder and skill gap service")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP + GraphQL server.
    Serve(ServeCommand),
    /// List roles, optionally at one paygrade.
    Roles {
        #[arg(long)]
        paygrade: Option<String>,
    },
    /// Print roles grouped by paygrade level.
    Ladder {
        #[arg(long, value_parser = parse_order)]
        order: Option<LadderOrder>,
    },
    /// Compute the skill gap between two roles.
    Gap(GapCommand),
    /// Print the full dashboard for a viewer.
    View(ViewCommand),
    /// Print the GraphQL schema.
    #[command(name = "schema:print")]
    SchemaPrint {
        #[arg(long, value_name = "FILE", help = "Destination file path")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Debug)]
struct ServeCommand {
    #[arg(long, env = "LADDER_HOST", default_value = "0.0.0.0")]
    host: std::net::IpAddr,
    #[arg(long, env = "LADDER_PORT", default_value_t = 8080)]
    port: u16,
}

impl From<ServeCommand> for ServeConfig {
    fn from(value: ServeCommand) -> Self {
        ServeConfig::new(value.host, value.port)
    }
}

#[derive(Args, Debug)]
struct GapCommand {
    /// Current role as NAME/BAND/PAYGRADE.
    #[arg(long)]
    from: RoleId,
    /// Target role as NAME/BAND/PAYGRADE.
    #[arg(long)]
    to: RoleId,
    /// Also list skills the target role does not need.
    #[arg(long)]
    include_good_to_have: bool,
    /// List every classified skill, met gaps included.
    #[arg(long, conflicts_with = "include_good_to_have")]
    all: bool,
}

#[derive(Args, Debug)]
struct ViewCommand {
    #[arg(long, default_value = "")]
    employee: String,
    /// Current role as NAME/BAND/PAYGRADE.
    #[arg(long)]
    current: Option<RoleId>,
    /// Target role as NAME/BAND/PAYGRADE.
    #[arg(long)]
    target: Option<RoleId>,
    #[arg(long)]
    include_good_to_have: bool,
    #[arg(long, value_parser = parse_order)]
    order: Option<LadderOrder>,
}

fn parse_order(raw: &str) -> Result<LadderOrder, String> {
    raw.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing(ObsConfig::from_env())?;
    let cli = Cli::parse();
    let config = Arc::new(AppConfig::load()?);
    let careers = Arc::new(CareersModule::seeded().context("failed to load seed catalog")?);
    match cli.command {
        Command::Serve(cmd) => run_server(cmd, careers, config).await,
        Command::Roles { paygrade } => {
            let roles = match paygrade {
                Some(paygrade) => careers.catalog.roles_at_paygrade(&paygrade),
                None => careers.catalog.roles().to_vec(),
            };
            print_json(&roles)
        }
        Command::Ladder { order } => print_json(&ladder(
            &careers.catalog,
            None,
            order.unwrap_or(config.ladder_order),
        )),
        Command::Gap(cmd) => {
            let report = if cmd.all {
                GapReport::unfiltered(&careers.catalog, &cmd.from, &cmd.to)?
            } else {
                let policy = config.policy(cmd.include_good_to_have.then_some(true));
                careers.catalog.gap(&cmd.from, &cmd.to, policy)?
            };
            print_json(&report)
        }
        Command::View(cmd) => {
            let request = ViewRequest {
                employee: cmd.employee,
                current: cmd.current,
                target: cmd.target,
            };
            let view = careers.view(
                &request,
                config.policy(cmd.include_good_to_have.then_some(true)),
                cmd.order.unwrap_or(config.ladder_order),
            );
            print_json(&view)
        }
        Command::SchemaPrint { output } => schema_print(careers, config, output),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn schema_print(
    careers: Arc<CareersModule>,
    config: Arc<AppConfig>,
    path: Option<PathBuf>,
) -> Result<()> {
    let sdl = graphql::build_schema(careers, config).sdl();
    match path {
        Some(path) => {
            std::fs::write(&path, sdl)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "schema written");
        }
        None => println!("{sdl}"),
    }
    Ok(())
}

async fn run_server(
    cmd: ServeCommand,
    careers: Arc<CareersModule>,
    config: Arc<AppConfig>,
) -> Result<()> {
    info!(
        roles = careers.catalog.roles().len(),
        employees = careers.directory.employees().len(),
        "catalog loaded"
    );
    let schema = graphql::build_schema(careers.clone(), config.clone());
    let state = AppState {
        careers,
        schema,
        config,
    };
    http::serve(cmd.into(), state).await
}
