use anyhow::Result;
use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use tracing::{debug, error};

use crate::fetcher::FetchError;
use crate::ledger::{
    LedgerError, LedgerStore, NewDownload, NewFavorite, NewPlaylist, PlaylistUpdate,
};
use tower_http::services::ServeDir;
use uuid::Uuid;

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::{log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

fn error_body(message: &str) -> Json<serde_json::Value> {
    Json(serde_json::json!({ "error": message }))
}

#[derive(Deserialize, Debug)]
struct SearchParams {
    q: Option<String>,
    limit: Option<usize>,
}

#[derive(Serialize)]
struct IsFavoriteResponse {
    #[serde(rename = "isFavorite")]
    is_favorite: bool,
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
    };
    Json(stats)
}

// ----- search & audio (external fetcher) -----

async fn search(
    State(catalog_search): State<OptionalCatalogSearch>,
    Query(params): Query<SearchParams>,
) -> Response {
    let Some(catalog_search) = catalog_search else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            error_body("Fetcher service not configured"),
        )
            .into_response();
    };

    let query = match params.q.as_deref() {
        Some(q) if !q.trim().is_empty() => q.trim(),
        _ => {
            return (
                StatusCode::BAD_REQUEST,
                error_body("Query parameter is required"),
            )
                .into_response()
        }
    };
    let limit = params.limit.unwrap_or(12);

    match catalog_search.search(query, limit).await {
        Ok(results) => Json(results).into_response(),
        Err(err) => {
            error!("Search failed: {}", err);
            (StatusCode::BAD_GATEWAY, error_body("Failed to search videos")).into_response()
        }
    }
}

async fn download_audio(
    State(media_fetcher): State<OptionalMediaFetcher>,
    Path(video_id): Path<String>,
) -> Response {
    let Some(media_fetcher) = media_fetcher else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            error_body("Fetcher service not configured"),
        )
            .into_response();
    };

    match media_fetcher.fetch_audio(&video_id).await {
        Ok(audio) => Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, audio.content_type)
            .header(
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", audio.file_name),
            )
            .body(Body::from_stream(audio.bytes))
            .unwrap(),
        Err(FetchError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, error_body("Video not found")).into_response()
        }
        Err(err) => {
            error!("Audio fetch for {} failed: {}", video_id, err);
            (StatusCode::BAD_GATEWAY, error_body("Failed to fetch audio")).into_response()
        }
    }
}

// ----- download history -----

async fn get_history(State(ledger): State<GuardedLedger>) -> Response {
    Json(ledger.lock().unwrap().download_history()).into_response()
}

async fn post_history(
    State(ledger): State<GuardedLedger>,
    Json(body): Json<NewDownload>,
) -> Response {
    let entry = ledger.lock().unwrap().add_download(body);
    (StatusCode::CREATED, Json(entry)).into_response()
}

async fn delete_history(State(ledger): State<GuardedLedger>, Path(id): Path<Uuid>) -> Response {
    ledger.lock().unwrap().delete_download(id);
    StatusCode::NO_CONTENT.into_response()
}

// ----- favorites -----

async fn get_favorites(State(ledger): State<GuardedLedger>) -> Response {
    Json(ledger.lock().unwrap().favorites()).into_response()
}

async fn post_favorite(
    State(ledger): State<GuardedLedger>,
    Json(body): Json<NewFavorite>,
) -> Response {
    match ledger.lock().unwrap().add_favorite(body) {
        Ok(favorite) => (StatusCode::CREATED, Json(favorite)).into_response(),
        Err(LedgerError::Conflict { video_id }) => {
            debug!("Favorite for {} already exists", video_id);
            (StatusCode::CONFLICT, error_body("Already in favorites")).into_response()
        }
    }
}

async fn delete_favorite(State(ledger): State<GuardedLedger>, Path(id): Path<Uuid>) -> Response {
    ledger.lock().unwrap().remove_favorite(id);
    StatusCode::NO_CONTENT.into_response()
}

async fn get_favorite_by_video(
    State(ledger): State<GuardedLedger>,
    Path(video_id): Path<String>,
) -> Response {
    let is_favorite = ledger.lock().unwrap().is_favorite(&video_id);
    Json(IsFavoriteResponse { is_favorite }).into_response()
}

async fn delete_favorite_by_video(
    State(ledger): State<GuardedLedger>,
    Path(video_id): Path<String>,
) -> Response {
    ledger.lock().unwrap().remove_favorite_by_video(&video_id);
    StatusCode::NO_CONTENT.into_response()
}

// ----- playlists -----

async fn get_playlists(State(ledger): State<GuardedLedger>) -> Response {
    Json(ledger.lock().unwrap().playlists()).into_response()
}

async fn post_playlist(
    State(ledger): State<GuardedLedger>,
    Json(body): Json<NewPlaylist>,
) -> Response {
    let playlist = ledger.lock().unwrap().create_playlist(body);
    (StatusCode::CREATED, Json(playlist)).into_response()
}

async fn get_playlist(State(ledger): State<GuardedLedger>, Path(id): Path<Uuid>) -> Response {
    match ledger.lock().unwrap().playlist(id) {
        Some(playlist) => Json(playlist).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn patch_playlist(
    State(ledger): State<GuardedLedger>,
    Path(id): Path<Uuid>,
    Json(body): Json<PlaylistUpdate>,
) -> Response {
    match ledger.lock().unwrap().update_playlist(id, body) {
        Some(playlist) => Json(playlist).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn delete_playlist(State(ledger): State<GuardedLedger>, Path(id): Path<Uuid>) -> Response {
    ledger.lock().unwrap().delete_playlist(id);
    StatusCode::NO_CONTENT.into_response()
}

// ----- stats & badges -----

async fn get_stats(State(ledger): State<GuardedLedger>) -> Response {
    Json(ledger.lock().unwrap().stats()).into_response()
}

async fn get_badges(State(ledger): State<GuardedLedger>) -> Response {
    Json(ledger.lock().unwrap().all_badges()).into_response()
}

async fn get_unlocked_badges(State(ledger): State<GuardedLedger>) -> Response {
    Json(ledger.lock().unwrap().unlocked_badges()).into_response()
}

async fn post_unlock_badge(
    State(ledger): State<GuardedLedger>,
    Path(badge_id): Path<String>,
) -> Response {
    match ledger.lock().unwrap().unlock_badge(&badge_id) {
        Some(badge) => Json(badge).into_response(),
        None => (StatusCode::NOT_FOUND, error_body("Unknown badge")).into_response(),
    }
}

pub fn make_app(
    config: ServerConfig,
    ledger: LedgerStore,
    media_fetcher: OptionalMediaFetcher,
    catalog_search: OptionalCatalogSearch,
) -> Result<Router> {
    let state = ServerState {
        config: config.clone(),
        start_time: Instant::now(),
        ledger: Arc::new(Mutex::new(ledger)),
        media_fetcher,
        catalog_search,
        hash: env!("GIT_HASH").to_owned(),
    };

    let api_routes: Router = Router::new()
        .route("/search", get(search))
        .route("/download/{video_id}", get(download_audio))
        .route("/history", get(get_history))
        .route("/history", post(post_history))
        .route("/history/{id}", delete(delete_history))
        .route("/favorites", get(get_favorites))
        .route("/favorites", post(post_favorite))
        .route("/favorites/{id}", delete(delete_favorite))
        .route("/favorites/by-video/{video_id}", get(get_favorite_by_video))
        .route(
            "/favorites/by-video/{video_id}",
            delete(delete_favorite_by_video),
        )
        .route("/playlists", get(get_playlists))
        .route("/playlists", post(post_playlist))
        .route("/playlists/{id}", get(get_playlist))
        .route("/playlists/{id}", patch(patch_playlist))
        .route("/playlists/{id}", delete(delete_playlist))
        .route("/stats", get(get_stats))
        .route("/badges", get(get_badges))
        .route("/badges/unlocked", get(get_unlocked_badges))
        .route("/badges/{id}/unlock", post(post_unlock_badge))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .with_state(state.clone()),
    };

    let app: Router = home_router
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            log_requests,
        ));

    Ok(app)
}

pub async fn run_server(
    ledger: LedgerStore,
    media_fetcher: OptionalMediaFetcher,
    catalog_search: OptionalCatalogSearch,
    config: ServerConfig,
) -> Result<()> {
    let port = config.port;
    let app = make_app(config, ledger, media_fetcher, catalog_search)?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
