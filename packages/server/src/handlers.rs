//! HTTP handler functions for the dashboard API.

use std::sync::Arc;

use actix_web::{HttpResponse, http::header, web};
use sad_dashboard::{LoadedDashboard, export, reducer, view};
use sad_dashboard_models::{ExportOptions, ModalState};
use sad_server_models::{
    ApiDashboardSummary, ApiError, ApiHealth, ModalRequest, RegionsQuery, UpdateRequest,
};

use crate::AppState;

/// Resolves the `{dashboard}` path segment, or a 404 response.
fn lookup(state: &AppState, id: &str) -> Result<Arc<LoadedDashboard>, HttpResponse> {
    state.dashboard(id).ok_or_else(|| {
        log::warn!("Request for unknown or unloaded dashboard '{id}'");
        HttpResponse::NotFound().json(ApiError::new(format!("Unknown dashboard: {id}")))
    })
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        dashboards_loaded: state.dashboards.len(),
    })
}

/// `GET /api/dashboards`
///
/// Lists every registered dashboard and whether its data loaded.
pub async fn dashboards(state: web::Data<AppState>) -> HttpResponse {
    let list: Vec<ApiDashboardSummary> = state
        .registered
        .iter()
        .map(|d| ApiDashboardSummary::new(d, state.dashboards.contains_key(&d.id)))
        .collect();

    HttpResponse::Ok().json(list)
}

/// `GET /sad/{dashboard}/`
///
/// Returns the page metadata: year marks, state options, feature switches.
pub async fn layout(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    match lookup(&state, &path) {
        Ok(dashboard) => HttpResponse::Ok().json(view::layout(&dashboard)),
        Err(response) => response,
    }
}

/// `GET /sad/{dashboard}/api/boundaries`
pub async fn boundaries(state: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let dashboard = match lookup(&state, &path) {
        Ok(d) => d,
        Err(response) => return response,
    };

    dashboard.boundaries.as_ref().map_or_else(
        || {
            HttpResponse::NotFound().json(ApiError::new(format!(
                "Boundaries not loaded for {}",
                dashboard.id()
            )))
        },
        |b| HttpResponse::Ok().json(b.as_json()),
    )
}

/// `GET /sad/{dashboard}/api/regions?states=PA,MT`
///
/// Region picker options for the chosen states.
pub async fn regions(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<RegionsQuery>,
) -> HttpResponse {
    match lookup(&state, &path) {
        Ok(dashboard) => {
            HttpResponse::Ok().json(view::region_options(&dashboard, &query.state_list()))
        }
        Err(response) => response,
    }
}

/// `POST /sad/{dashboard}/api/update`
///
/// Applies one event to the client's selection and returns the new
/// selection with every chart rebuilt.
pub async fn update(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<UpdateRequest>,
) -> HttpResponse {
    let dashboard = match lookup(&state, &path) {
        Ok(d) => d,
        Err(response) => return response,
    };
    let UpdateRequest { state: selection, event } = body.into_inner();

    let result = tokio::task::spawn_blocking(move || {
        let selection = selection.unwrap_or_else(|| reducer::initial_state(&dashboard));
        view::update(&dashboard, selection, &event)
    })
    .await;

    match result {
        Ok(view) => HttpResponse::Ok().json(view),
        Err(e) => {
            log::error!("Update task failed: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to update dashboard"))
        }
    }
}

/// `POST /sad/{dashboard}/api/export`
///
/// Returns the filtered dataset as a CSV attachment.
pub async fn export(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ExportOptions>,
) -> HttpResponse {
    let dashboard = match lookup(&state, &path) {
        Ok(d) => d,
        Err(response) => return response,
    };
    let options = body.into_inner();

    let result = tokio::task::spawn_blocking(move || {
        export::export_csv(&dashboard.dataset, &dashboard.descriptor, &options)
    })
    .await;

    match result {
        Ok(Ok(csv)) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", csv.filename),
            ))
            .body(csv.bytes),
        Ok(Err(e)) => {
            log::error!("Failed to export CSV: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to export CSV"))
        }
        Err(e) => {
            log::error!("Export task failed: {e}");
            HttpResponse::InternalServerError().json(ApiError::new("Failed to export CSV"))
        }
    }
}

/// `POST /sad/{dashboard}/api/modal`
///
/// Flips a dialog's visibility.
pub async fn modal(
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Json<ModalRequest>,
) -> HttpResponse {
    if let Err(response) = lookup(&state, &path) {
        return response;
    }
    let ModalRequest { open, trigger } = body.into_inner();
    HttpResponse::Ok().json(reducer::toggle_modal(ModalState { open }, trigger))
}
