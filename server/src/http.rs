use std::{
    net::{IpAddr, SocketAddr},
    sync::Arc,
};

use anyhow::Context;
use async_graphql_axum::{GraphQLRequest, GraphQLResponse};
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use platform_api::ApiError;
use products_careers::{
    CareersModule, DashboardView, Employee, GapReport, LadderOrder, LevelGroup, Notice, Role,
    RoleId, SkillLevel, ViewRequest, ladder,
};
use serde::{Deserialize, Serialize};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{debug, info, instrument};

use crate::{
    config::{AppConfig, parse_bool},
    errors::gap_error,
    graphql::SchemaType,
};

#[derive(Clone)]
pub struct AppState {
    pub careers: Arc<CareersModule>,
    pub schema: SchemaType,
    pub config: Arc<AppConfig>,
}

#[derive(Clone, Debug)]
pub struct ServeConfig {
    addr: SocketAddr,
}

impl ServeConfig {
    pub fn new(host: IpAddr, port: u16) -> Self {
        Self {
            addr: SocketAddr::from((host, port)),
        }
    }
}

pub async fn serve(config: ServeConfig, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;

    info!(%config.addr, "ladder server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE])
        .allow_methods([Method::POST, Method::GET])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let request_id = MakeRequestUuid;
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route("/roles", get(roles_handler))
        .route("/roles/skills", get(skill_profile_handler))
        .route("/ladder", get(ladder_handler))
        .route("/gap", get(gap_handler))
        .route("/employees/{id}", get(employee_handler))
        .route("/view", get(view_handler))
        .route("/graphql", get(graphql_handler).post(graphql_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), request_id))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
    roles: usize,
    skills: usize,
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
        roles: state.careers.catalog.roles().len(),
        skills: state.careers.catalog.skills().len(),
    })
}

#[derive(Debug, Deserialize)]
struct RolesQuery {
    paygrade: Option<String>,
}

#[instrument(skip(state))]
async fn roles_handler(
    State(state): State<AppState>,
    query: Result<Query<RolesQuery>, QueryRejection>,
) -> HttpResult<Json<Vec<Role>>> {
    let Query(query) = query?;
    let catalog = &state.careers.catalog;
    Ok(Json(match query.paygrade {
        Some(paygrade) => catalog.roles_at_paygrade(&paygrade),
        None => catalog.roles().to_vec(),
    }))
}

#[derive(Debug, Deserialize)]
struct LadderQuery {
    order: Option<LadderOrder>,
}

#[instrument(skip(state))]
async fn ladder_handler(
    State(state): State<AppState>,
    query: Result<Query<LadderQuery>, QueryRejection>,
) -> HttpResult<Json<Vec<LevelGroup>>> {
    let Query(query) = query?;
    Ok(Json(ladder(
        &state.careers.catalog,
        None,
        query.order.unwrap_or(state.config.ladder_order),
    )))
}

#[instrument(skip(state))]
async fn skill_profile_handler(
    State(state): State<AppState>,
    role: Result<Query<RoleId>, QueryRejection>,
) -> HttpResult<Json<Vec<SkillLevel>>> {
    let Query(role) = role?;
    state
        .careers
        .catalog
        .skill_profile(&role)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("unknown role {role}")).into())
}

#[derive(Debug, Deserialize)]
struct GapQuery {
    from_name: String,
    from_band: String,
    from_paygrade: String,
    to_name: String,
    to_band: String,
    to_paygrade: String,
    include_good_to_have: Option<bool>,
    /// Return every classified skill, met gaps included.
    #[serde(default)]
    all: bool,
}

#[instrument(skip(state))]
async fn gap_handler(
    State(state): State<AppState>,
    query: Result<Query<GapQuery>, QueryRejection>,
) -> HttpResult<Json<GapReport>> {
    let Query(query) = query?;
    let from = RoleId::new(query.from_name, query.from_band, query.from_paygrade);
    let to = RoleId::new(query.to_name, query.to_band, query.to_paygrade);
    let catalog = &state.careers.catalog;
    let report = if query.all {
        GapReport::unfiltered(catalog, &from, &to)
    } else {
        catalog.gap(&from, &to, state.config.policy(query.include_good_to_have))
    };
    report.map(Json).map_err(|err| gap_error(err).into())
}

#[instrument(skip(state))]
async fn employee_handler(
    State(state): State<AppState>,
    id: Result<Path<u32>, PathRejection>,
) -> HttpResult<Json<Employee>> {
    let Path(id) = id?;
    state
        .careers
        .directory
        .get(id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("employee {id} not found")).into())
}

#[derive(Debug, Default, Deserialize)]
struct ViewQuery {
    #[serde(default)]
    employee: String,
    current_name: Option<String>,
    current_band: Option<String>,
    current_paygrade: Option<String>,
    target_name: Option<String>,
    target_band: Option<String>,
    target_paygrade: Option<String>,
    include_good_to_have: Option<String>,
    order: Option<String>,
}

/// Builds a role id only when all three parts are present.
fn role_from_parts(
    label: &str,
    name: Option<String>,
    band: Option<String>,
    paygrade: Option<String>,
    notices: &mut Vec<Notice>,
) -> Option<RoleId> {
    match (name, band, paygrade) {
        (Some(name), Some(band), Some(paygrade)) => Some(RoleId::new(name, band, paygrade)),
        (None, None, None) => None,
        _ => {
            notices.push(Notice::info(format!(
                "incomplete {label} role selection ignored; name, band and paygrade are all needed"
            )));
            None
        }
    }
}

/// Parses an optional view setting, keeping the configured default and
/// leaving a notice when the value is not understood.
fn view_setting<T: Copy + std::fmt::Display>(
    key: &str,
    raw: Option<String>,
    default: T,
    parse: impl Fn(&str) -> Option<T>,
    notices: &mut Vec<Notice>,
) -> Option<T> {
    let raw = raw?;
    match parse(&raw) {
        Some(value) => Some(value),
        None => {
            notices.push(Notice::info(format!(
                "ignored {key}={raw:?}; using the default ({default})"
            )));
            None
        }
    }
}

#[instrument(skip(state))]
async fn view_handler(
    State(state): State<AppState>,
    query: Result<Query<ViewQuery>, QueryRejection>,
) -> Json<DashboardView> {
    let mut notices = Vec::new();
    let query = match query {
        Ok(Query(query)) => query,
        Err(rejection) => {
            debug!(error = %rejection.body_text(), "unreadable view query");
            notices.push(Notice::info(
                "could not read the request parameters; showing the default view",
            ));
            ViewQuery::default()
        }
    };
    let include_good_to_have = view_setting(
        "include_good_to_have",
        query.include_good_to_have,
        state.config.gap_policy.include_good_to_have,
        |raw| parse_bool("include_good_to_have", raw).ok(),
        &mut notices,
    );
    let order = view_setting(
        "order",
        query.order,
        state.config.ladder_order,
        |raw| raw.parse::<LadderOrder>().ok(),
        &mut notices,
    );
    let current = role_from_parts(
        "current",
        query.current_name,
        query.current_band,
        query.current_paygrade,
        &mut notices,
    );
    let target = role_from_parts(
        "target",
        query.target_name,
        query.target_band,
        query.target_paygrade,
        &mut notices,
    );
    let request = ViewRequest {
        employee: query.employee,
        current,
        target,
    };
    let mut view = state.careers.view(
        &request,
        state.config.policy(include_good_to_have),
        order.unwrap_or(state.config.ladder_order),
    );
    view.notices.extend(notices);
    Json(view)
}

async fn graphql_handler(State(state): State<AppState>, request: GraphQLRequest) -> GraphQLResponse {
    state.schema.execute(request.into_inner()).await.into()
}

type HttpResult<T> = Result<T, HttpError>;

#[derive(Debug)]
struct HttpError(ApiError);

impl From<ApiError> for HttpError {
    fn from(value: ApiError) -> Self {
        Self(value)
    }
}

impl From<QueryRejection> for HttpError {
    fn from(rejection: QueryRejection) -> Self {
        Self(ApiError::InvalidInput(rejection.body_text()))
    }
}

impl From<PathRejection> for HttpError {
    fn from(rejection: PathRejection) -> Self {
        Self(ApiError::InvalidInput(rejection.body_text()))
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.0.body())).into_response()
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    ctrl_c.await;

    #[cfg(unix)]
    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::build_schema;
    use axum::body::Body;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn router() -> Router {
        let careers = Arc::new(CareersModule::seeded().unwrap());
        let config = Arc::new(AppConfig::default());
        let schema = build_schema(careers.clone(), config.clone());
        build_router(AppState {
            careers,
            schema,
            config,
        })
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let response = router()
            .oneshot(
                http::Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_catalog_size() {
        let (status, body) = get_json("/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], json!(true));
        assert_eq!(body["roles"], json!(10));
        assert_eq!(body["skills"], json!(5));
    }

    #[tokio::test]
    async fn roles_filter_by_paygrade() {
        let (status, body) = get_json("/roles?paygrade=PG2").await;
        assert_eq!(status, StatusCode::OK);
        let names = body
            .as_array()
            .unwrap()
            .iter()
            .map(|role| role["name"].as_str().unwrap().to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Developer", "Senior Analyst"]);

        let (_, body) = get_json("/roles?paygrade=PG9").await;
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn gap_endpoint_returns_ordered_report() {
        let (status, body) = get_json(
            "/gap?from_name=Developer&from_band=B1&from_paygrade=PG2\
             &to_name=Senior%20Developer&to_band=B2&to_paygrade=PG3",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(
            entries[2],
            json!({
                "skill": "System Design",
                "current": null,
                "required": 6,
                "kind": "new_skill",
                "value": 6
            })
        );
    }

    #[tokio::test]
    async fn gap_endpoint_honours_good_to_have_flag() {
        let (_, body) = get_json(
            "/gap?from_name=Developer&from_band=B1&from_paygrade=PG2\
             &to_name=Senior%20Developer&to_band=B2&to_paygrade=PG3&include_good_to_have=true",
        )
        .await;
        assert_eq!(body["entries"].as_array().map(Vec::len), Some(5));
        assert_eq!(body["entries"][1]["kind"], json!("good_to_have"));
    }

    #[tokio::test]
    async fn gap_endpoint_rejects_lower_target() {
        let (status, body) = get_json(
            "/gap?from_name=Team%20Lead&from_band=B3&from_paygrade=PG4\
             &to_name=Developer&to_band=B1&to_paygrade=PG2",
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["error"], json!("REJECTED"));
    }

    #[tokio::test]
    async fn unknown_lookups_return_not_found() {
        let (status, body) = get_json(
            "/gap?from_name=Ghost&from_band=B1&from_paygrade=PG2\
             &to_name=Developer&to_band=B1&to_paygrade=PG2",
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], json!("NOT_FOUND"));

        let (status, _) = get_json("/employees/9999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = get_json("/roles/skills?name=Ghost&band=B1&paygrade=PG1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn employee_and_skill_profile_lookups() {
        let (status, body) = get_json("/employees/1004").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["full_name"], json!("Alex Chen"));

        let (status, body) =
            get_json("/roles/skills?name=Developer&band=B1&paygrade=PG2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"skill": "Python", "level": 1},
                {"skill": "Data Analysis", "level": 2},
                {"skill": "Project Management", "level": 3},
                {"skill": "Communication", "level": 5},
            ])
        );
    }

    #[tokio::test]
    async fn ladder_groups_every_role_once() {
        let (status, body) = get_json("/ladder?order=catalog").await;
        assert_eq!(status, StatusCode::OK);
        let groups = body.as_array().unwrap();
        let levels = groups
            .iter()
            .map(|group| group["level"].as_u64().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(levels, vec![1, 2, 3, 4, 5]);
        let total: usize = groups
            .iter()
            .map(|group| group["roles"].as_array().unwrap().len())
            .sum();
        assert_eq!(total, 10);
    }

    #[tokio::test]
    async fn view_never_fails_and_reports_notices() {
        let (status, body) = get_json(
            "/view?employee=abc&target_name=Analyst&target_band=B1&target_paygrade=PG1\
             &current_name=Developer",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["viewer"]["id"], json!(1001));
        assert_eq!(body["comparison"], Value::Null);
        // fallback identity, lower target, incomplete current selection
        assert_eq!(body["notices"].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn view_computes_selected_comparison() {
        let (status, body) = get_json(
            "/view?employee=1002&current_name=Developer&current_band=B3&current_paygrade=PG3\
             &target_name=Team%20Lead&target_band=B3&target_paygrade=PG4",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current"]["band"], json!("B3"));
        assert_eq!(body["comparison"]["target"]["name"], json!("Team Lead"));
        assert_eq!(body["notices"], json!([]));
    }

    #[tokio::test]
    async fn view_ignores_unreadable_settings() {
        let (status, body) = get_json(
            "/view?employee=1001&current_name=Developer&current_band=B1&current_paygrade=PG2\
             &target_name=Senior%20Developer&target_band=B2&target_paygrade=PG3\
             &include_good_to_have=maybe",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["comparison"]["include_good_to_have"], json!(false));
        assert_eq!(body["comparison"]["entries"].as_array().map(Vec::len), Some(4));
        let notices = body["notices"].as_array().unwrap();
        assert_eq!(notices.len(), 1);
        assert!(
            notices[0]["message"]
                .as_str()
                .unwrap()
                .contains("include_good_to_have")
        );

        let (status, body) = get_json("/view?employee=1001&order=salary").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["viewer"]["id"], json!(1001));
        assert_eq!(body["ladder"].as_array().map(Vec::len), Some(5));
        let notices = body["notices"].as_array().unwrap();
        assert_eq!(notices.len(), 1);
        assert!(notices[0]["message"].as_str().unwrap().contains("order"));
    }

    #[tokio::test]
    async fn malformed_requests_return_json_errors() {
        for uri in [
            "/gap?from_name=Developer",
            "/gap?from_name=Developer&from_band=B1&from_paygrade=PG2\
             &to_name=Senior%20Developer&to_band=B2&to_paygrade=PG3&include_good_to_have=maybe",
            "/ladder?order=salary",
            "/employees/abc",
            "/roles/skills?name=Developer",
        ] {
            let (status, body) = get_json(uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body["error"], json!("INVALID_INPUT"), "{uri}");
            assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()), "{uri}");
        }
    }

    #[tokio::test]
    async fn gap_endpoint_lists_every_skill_on_request() {
        let (status, body) = get_json(
            "/gap?from_name=Developer&from_band=B1&from_paygrade=PG2\
             &to_name=Developer&to_band=B1&to_paygrade=PG2&all=true",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["filtered"], json!(false));
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 4);
        assert!(
            entries
                .iter()
                .all(|entry| entry["kind"] == json!("gap") && entry["value"] == json!(0))
        );

        let (_, body) = get_json(
            "/gap?from_name=Developer&from_band=B1&from_paygrade=PG2\
             &to_name=Developer&to_band=B1&to_paygrade=PG2",
        )
        .await;
        assert_eq!(body["filtered"], json!(true));
        assert_eq!(body["entries"], json!([]));
    }

    #[tokio::test]
    async fn responses_carry_request_id() {
        let response = router()
            .oneshot(
                http::Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert!(response.headers().contains_key("x-request-id"));
    }
}
