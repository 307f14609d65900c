//! HTTP surface for the dashboard.

use anyhow::{Context, Result};
use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Credentials;
use crate::dashboard::html::{render_dashboard, render_death_toggle, render_map_tabs};
use crate::dashboard::{AnalysisView, ChartOption, DEATH_TOGGLES, Dashboard};

type SharedDashboard = Arc<Dashboard>;

/// Error response carrying a status and a JSON `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, error = %self.message, "Request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SelectionParams {
    pub view: Option<String>,
    pub charts: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ToggleParams {
    pub charts: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub options: Vec<ChartOption>,
    pub value: Vec<String>,
}

/// Builds the application router.
///
/// With `credentials` every route except `/health` requires HTTP basic auth.
pub fn router(dashboard: SharedDashboard, credentials: Option<&Credentials>) -> Router {
    let mut app = Router::new()
        .route("/", get(index))
        .route("/deaths", get(deaths))
        .route("/maps", get(maps))
        .route("/maps/{id}", get(map_document))
        .route("/api/options", get(options))
        .route("/api/components", get(components))
        .with_state(dashboard);

    if let Some(c) = credentials {
        app = app.layer(middleware::from_fn_with_state(
            Arc::new(c.clone()),
            require_basic_auth,
        ));
    }

    app.route("/health", get(health))
        .layer(TraceLayer::new_for_http())
}

async fn require_basic_auth(
    State(credentials): State<Arc<Credentials>>,
    req: Request,
    next: Next,
) -> Response {
    if is_authorized(req.headers(), &credentials) {
        return next.run(req).await;
    }

    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, r#"Basic realm="dashboard", charset="UTF-8""#)],
        Json(json!({ "error": "Unauthorized" })),
    )
        .into_response()
}

/// True when `Authorization: Basic <base64(username:password)>` matches.
fn is_authorized(headers: &HeaderMap, credentials: &Credentials) -> bool {
    let Some(encoded) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Basic "))
    else {
        return false;
    };

    let Ok(decoded) = STANDARD.decode(encoded.trim()) else {
        return false;
    };

    match String::from_utf8(decoded) {
        Ok(pair) => pair
            .split_once(':')
            .is_some_and(|(u, p)| u == credentials.username && p == credentials.password),
        Err(_) => false,
    }
}

/// Serves `app` on `addr` until Ctrl-C.
pub async fn serve(addr: SocketAddr, app: Router) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!(%addr, "Dashboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("Shutting down");
        })
        .await?;

    Ok(())
}

async fn index(
    State(dashboard): State<SharedDashboard>,
    Query(params): Query<SelectionParams>,
) -> Result<Html<String>, ApiError> {
    let selection = dashboard.selection_from(params.view.as_deref(), params.charts.as_deref());
    Ok(Html(render_dashboard(&dashboard, &selection)?))
}

async fn deaths(
    State(dashboard): State<SharedDashboard>,
    Query(params): Query<ToggleParams>,
) -> Result<Html<String>, ApiError> {
    let toggles: Vec<String> = match params.charts.as_deref() {
        Some(charts) => charts
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect(),
        None => DEATH_TOGGLES.iter().map(|t| t.to_string()).collect(),
    };

    let panels = dashboard.death_panels(&toggles);
    Ok(Html(render_death_toggle(&panels)?))
}

async fn maps(State(dashboard): State<SharedDashboard>) -> Html<String> {
    Html(render_map_tabs(&dashboard))
}

async fn map_document(
    State(dashboard): State<SharedDashboard>,
    Path(id): Path<String>,
) -> Result<Html<String>, ApiError> {
    dashboard
        .map(&id)
        .map(|doc| Html(doc.html.clone()))
        .ok_or_else(|| ApiError::not_found(format!("No map document '{id}'")))
}

async fn options(
    State(dashboard): State<SharedDashboard>,
    Query(params): Query<SelectionParams>,
) -> Result<Json<OptionsResponse>, ApiError> {
    let view = parse_view(params.view.as_deref())?;
    Ok(Json(OptionsResponse {
        options: dashboard.options(view),
        value: dashboard.default_charts(view),
    }))
}

async fn components(
    State(dashboard): State<SharedDashboard>,
    Query(params): Query<SelectionParams>,
) -> Result<Response, ApiError> {
    parse_view(params.view.as_deref())?;
    let selection = dashboard.selection_from(params.view.as_deref(), params.charts.as_deref());
    let components = dashboard.render(&selection);
    Ok(Json(json!({ "selection": selection, "components": components })).into_response())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn parse_view(view: Option<&str>) -> Result<AnalysisView, ApiError> {
    match view {
        None => Ok(AnalysisView::default()),
        Some(v) => v.parse().map_err(|e: anyhow::Error| ApiError::bad_request(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::tests::create_dashboard;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    // "admin:secret"
    const BASIC_AUTH: &str = "Basic YWRtaW46c2VjcmV0";

    #[tokio::test]
    async fn test_health() {
        let (status, body) = get_text(app(None), "/health", None).await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_index_renders_selection() {
        let (status, body) = get_text(
            app(None),
            "/?view=death-analysis&charts=hourly-bar-chart,pie-chart",
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<div id="hourly-death-bar-chart""#));
        assert!(body.contains(r#"<div id="seasonal-death-pie-chart""#));
        assert!(!body.contains(r#"<div id="weekday-death-bar-chart""#));
    }

    #[tokio::test]
    async fn test_deaths_defaults_to_all_visible() {
        let (status, body) = get_text(app(None), "/deaths", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains(r#"style="display: none""#));

        let (_, body) = get_text(app(None), "/deaths?charts=hourly", None).await;
        assert_eq!(body.matches(r#"style="display: none""#).count(), 3);
    }

    #[tokio::test]
    async fn test_map_document() {
        let (status, body) = get_text(app(None), "/maps/black-spot-2022", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<html><body>black-spot-2022</body></html>");

        let (status, _) = get_text(app(None), "/maps/black-spot-1999", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_maps_page() {
        let (status, body) = get_text(app(None), "/maps", None).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("22년 블랙스팟"));
    }

    #[tokio::test]
    async fn test_api_options() {
        let (status, body) = get_text(app(None), "/api/options?view=death-analysis", None).await;

        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["options"].as_array().unwrap().len(), 4);
        assert_eq!(json["value"], json!(["pie-chart"]));

        let (status, _) = get_text(app(None), "/api/options?view=nope", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_api_components_skips_unknown_ids() {
        let (_, body) = get_text(
            app(None),
            "/api/components?view=black-spot&charts=death-analysis,pie-chart",
            None,
        )
        .await;

        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        let components = json["components"].as_array().unwrap();
        assert_eq!(components.len(), 1);
        assert_eq!(components[0]["id"], "deck-iframe");
        assert_eq!(components[0]["kind"], "map-frame");
    }

    #[tokio::test]
    async fn test_basic_auth() {
        let creds = credentials();

        let (status, _) = get_text(app(Some(&creds)), "/", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = get_text(app(Some(&creds)), "/maps/death-analysis", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = get_text(app(Some(&creds)), "/", Some(BASIC_AUTH)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = get_text(app(Some(&creds)), "/health", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_basic_auth_rejects_wrong_credentials() {
        let creds = credentials();

        // "admin:wrong"
        let (status, _) = get_text(app(Some(&creds)), "/", Some("Basic YWRtaW46d3Jvbmc=")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = get_text(app(Some(&creds)), "/", Some("Bearer YWRtaW46c2VjcmV0")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_is_authorized() {
        let creds = credentials();
        let headers = |value: &str| {
            let mut map = HeaderMap::new();
            map.insert(header::AUTHORIZATION, value.parse().unwrap());
            map
        };

        assert!(is_authorized(&headers(BASIC_AUTH), &creds));
        assert!(!is_authorized(&HeaderMap::new(), &creds));
        assert!(!is_authorized(&headers("Basic !!!"), &creds));
        // "admin" without a colon
        assert!(!is_authorized(&headers("Basic YWRtaW4="), &creds));
    }

    // Helper functions for tests
    fn credentials() -> Credentials {
        Credentials {
            username: "admin".to_string(),
            password: "secret".to_string(),
        }
    }

    fn app(credentials: Option<&Credentials>) -> Router {
        router(Arc::new(create_dashboard()), credentials)
    }

    async fn get_text(app: Router, uri: &str, auth: Option<&str>) -> (StatusCode, String) {
        let mut request = Request::builder().uri(uri);
        if let Some(auth) = auth {
            request = request.header(header::AUTHORIZATION, auth);
        }

        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }
}
