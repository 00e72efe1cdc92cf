#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the SAD alert dashboards.
//!
//! Loads every registered dashboard's dataset and boundary file once at
//! startup, then serves each dashboard under its own base path
//! (`/sad/<id>/`). Selection state lives on the client and is sent back
//! with every update, so request handling only ever reads shared data.

mod handlers;

use std::collections::BTreeMap;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware, web};
use futures::stream::{self, StreamExt as _};
use sad_dashboard::{LoadedDashboard, loader, registry};
use sad_dashboard_models::DashboardDescriptor;

/// Dashboards loaded concurrently at startup.
const CONCURRENT_LOADS: usize = 4;

/// Shared application state. Read-only after startup.
pub struct AppState {
    /// Every registered dashboard, in registry order, whether or not it
    /// loaded.
    pub registered: Vec<DashboardDescriptor>,
    /// Dashboards whose dataset loaded, by id.
    pub dashboards: BTreeMap<String, Arc<LoadedDashboard>>,
}

impl AppState {
    /// Builds state from already-loaded dashboards.
    #[must_use]
    pub fn new(registered: Vec<DashboardDescriptor>, loaded: Vec<LoadedDashboard>) -> Self {
        let dashboards = loaded
            .into_iter()
            .map(|d| (d.id().to_string(), Arc::new(d)))
            .collect();
        Self {
            registered,
            dashboards,
        }
    }

    /// Looks up a loaded dashboard.
    #[must_use]
    pub fn dashboard(&self, id: &str) -> Option<Arc<LoadedDashboard>> {
        self.dashboards.get(id).cloned()
    }
}

/// Server settings read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind (`BIND_ADDR`, default `127.0.0.1`).
    pub bind_addr: String,
    /// Port to bind (`PORT`, default 8051).
    pub port: u16,
    /// Dashboard ids to load (`SAD_DASHBOARDS`, comma-separated). Empty
    /// loads all.
    pub dashboards: Vec<String>,
}

impl ServerConfig {
    /// Reads settings from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let bind_addr = var("BIND_ADDR").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = var("PORT")
            .and_then(|p| p.parse().ok())
            .unwrap_or(8051);
        let dashboards = var("SAD_DASHBOARDS")
            .map(|s| {
                s.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            bind_addr,
            port,
            dashboards,
        }
    }
}

/// Registered descriptors, or only those named in `ids` (in that order)
/// when non-empty. Unknown and repeated ids are logged and ignored.
#[must_use]
pub fn select_dashboards(ids: &[String]) -> Vec<DashboardDescriptor> {
    if ids.is_empty() {
        return registry::all_dashboards();
    }

    let mut selected: Vec<DashboardDescriptor> = Vec::with_capacity(ids.len());
    for id in ids {
        if selected.iter().any(|d| &d.id == id) {
            log::warn!("Dashboard '{id}' listed more than once");
            continue;
        }
        match registry::find(id) {
            Ok(descriptor) => selected.push(descriptor),
            Err(e) => log::warn!("Ignoring dashboard: {e}"),
        }
    }
    selected
}

/// Loads the given dashboards. A dashboard whose dataset fails to load is
/// logged and left out; the others are still served.
pub async fn load_dashboards(descriptors: &[DashboardDescriptor]) -> Vec<LoadedDashboard> {
    let client = reqwest::Client::new();

    let results: Vec<_> = stream::iter(descriptors.iter().cloned().map(|descriptor| {
        let client = &client;
        async move {
            let id = descriptor.id.clone();
            (id, loader::load_dashboard(client, descriptor).await)
        }
    }))
    .buffer_unordered(CONCURRENT_LOADS)
    .collect()
    .await;

    let mut loaded = Vec::with_capacity(results.len());
    for (id, result) in results {
        match result {
            Ok(dashboard) => {
                log::info!(
                    "{id}: ready ({} records, years {}-{}, boundaries {})",
                    dashboard.dataset.len(),
                    dashboard.dataset.min_year(),
                    dashboard.dataset.max_year(),
                    if dashboard.boundaries.is_some() {
                        "loaded"
                    } else {
                        "missing"
                    }
                );
                loaded.push(dashboard);
            }
            Err(e) => log::error!("{id}: failed to load dataset: {e}"),
        }
    }
    loaded
}

/// Registers all routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/dashboards", web::get().to(handlers::dashboards)),
    )
    .service(
        web::scope("/sad/{dashboard}")
            .route("", web::get().to(handlers::layout))
            .route("/", web::get().to(handlers::layout))
            .route("/api/boundaries", web::get().to(handlers::boundaries))
            .route("/api/regions", web::get().to(handlers::regions))
            .route("/api/update", web::post().to(handlers::update))
            .route("/api/export", web::post().to(handlers::export))
            .route("/api/modal", web::post().to(handlers::modal)),
    );
}

/// Starts the SAD dashboard server.
///
/// Reads [`ServerConfig`] from the environment, loads the selected
/// dashboards, and serves them until shutdown. The caller provides the
/// async runtime (e.g. via `#[actix_web::main]`).
///
/// # Errors
///
/// Returns an `std::io::Result` error if the HTTP server fails to bind or
/// encounters a runtime error.
#[allow(clippy::future_not_send)]
pub async fn run_server() -> std::io::Result<()> {
    pretty_env_logger::init_custom_env("RUST_LOG");

    let config = ServerConfig::from_env();
    let registered = select_dashboards(&config.dashboards);

    log::info!("Loading {} dashboards...", registered.len());
    let loaded = load_dashboards(&registered).await;
    log::info!("{}/{} dashboards loaded", loaded.len(), registered.len());

    let state = web::Data::new(AppState::new(registered, loaded));

    log::info!("Starting server on {}:{}", config.bind_addr, config.port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((config.bind_addr, config.port))?
    .run()
    .await
}
