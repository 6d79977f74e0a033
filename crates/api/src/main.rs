use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Html,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use analyst_core::collect::{collect_actions, collect_ratings, ActionsReport, RatingsReport};
use analyst_core::ingest::finnhub::FinnhubClient;
use analyst_core::ingest::yahoo::YahooClient;
use analyst_core::pipeline::NormalizeOptions;
use analyst_core::render::html::dashboard_html;
use analyst_core::time::window::LookbackWindow;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = analyst_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    // Startup requires FINNHUB_API_KEY.
    let finnhub = match FinnhubClient::from_settings(&settings) {
        Ok(client) => client,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "finnhub client unavailable");
            return Err(e);
        }
    };
    let yahoo = YahooClient::from_settings(&settings)?;

    let state = AppState {
        symbols: Arc::new(settings.symbols.clone()),
        yahoo: Arc::new(yahoo),
        finnhub: Arc::new(finnhub),
    };

    let app = Router::new()
        .route("/healthz", get(healthz))
        .route("/", get(dashboard))
        .route("/api/ratings", get(get_ratings))
        .route("/api/actions", get(get_actions))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, symbols = ?settings.symbols, "dashboard listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    symbols: Arc<Vec<String>>,
    yahoo: Arc<YahooClient>,
    finnhub: Arc<FinnhubClient>,
}

#[derive(Debug, Deserialize)]
struct ActionsQuery {
    window_hours: Option<i64>,
}

fn resolve_window(window_hours: Option<i64>) -> Result<LookbackWindow, StatusCode> {
    match window_hours {
        Some(hours) => LookbackWindow::from_hours(hours).map_err(|_| StatusCode::BAD_REQUEST),
        None => Ok(LookbackWindow::last_90_days()),
    }
}

async fn load_actions(state: &AppState, window: LookbackWindow) -> Result<ActionsReport, StatusCode> {
    let options = NormalizeOptions::new(window.date_format());
    collect_actions(
        state.yahoo.as_ref(),
        &state.symbols,
        window,
        &options,
        chrono::Utc::now(),
    )
    .await
    .map_err(|e| {
        sentry_anyhow::capture_anyhow(&e);
        tracing::error!(error = %format!("{e:#}"), "analyst actions could not be normalized");
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

async fn load_ratings(state: &AppState) -> RatingsReport {
    collect_ratings(state.yahoo.as_ref(), state.finnhub.as_ref(), &state.symbols).await
}

async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, StatusCode> {
    let window = LookbackWindow::last_90_days();
    let ratings = load_ratings(&state).await;
    let actions = load_actions(&state, window).await?;
    Ok(Html(dashboard_html(&ratings, &actions, &window)))
}

async fn get_ratings(State(state): State<AppState>) -> Json<RatingsReport> {
    Json(load_ratings(&state).await)
}

async fn get_actions(
    State(state): State<AppState>,
    Query(query): Query<ActionsQuery>,
) -> Result<Json<ActionsReport>, StatusCode> {
    let window = resolve_window(query.window_hours)?;
    Ok(Json(load_actions(&state, window).await?))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &analyst_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
