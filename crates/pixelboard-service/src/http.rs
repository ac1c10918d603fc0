//! HTTP front of the service.
//!
//! Routes:
//! - `GET /board/{id}[?grid=<bool>]`: PNG image of the board (grid defaults to true)
//! - `PUT /board/{id}`: create or restart a board, `{ "width", "height", "cooldown_secs" }`
//! - `POST /board/{id}/pixel`: place a pixel, `{ "author", "x", "y", "color" }`
//! - `GET /board/{id}/stats`: placements per author, as JSON

use std::convert::Infallible;
use std::error::Error as StdError;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, Full, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{CONTENT_TYPE, HeaderValue, RETRY_AFTER};
use hyper::{Method, Request, Response, StatusCode};
use log::{debug, info, warn};
use pixelboard_common::{BoardConfig, BoardId, DrawEvent, PixelColor};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::encode::{EncodeError, encode_png};
use crate::render::BoardRenderer;
use crate::store::{AuthorStat, MemoryStore, StoreError};

/// Largest accepted request body, in bytes.
const MAX_BODY_SIZE: usize = 16 * 1024;

/// Longest accepted placement cooldown: a thousand years.
const MAX_COOLDOWN_SECS: u64 = 1000 * 365 * 24 * 60 * 60;

/// Shared state of the request handlers.
pub struct AppState {
    pub store: Arc<MemoryStore>,
    pub renderer: BoardRenderer,
}

impl AppState {
    pub fn new(store: MemoryStore) -> Self {
        AppState {
            store: Arc::new(store),
            renderer: BoardRenderer::default(),
        }
    }
}

#[derive(Debug, Error)]
enum HandlerError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Encode(#[from] EncodeError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("render task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl HandlerError {
    fn status(&self) -> StatusCode {
        match self {
            HandlerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HandlerError::Store(StoreError::BoardNotFound(_)) => StatusCode::NOT_FOUND,
            HandlerError::Store(StoreError::OutOfBounds { .. }) => StatusCode::BAD_REQUEST,
            HandlerError::Store(StoreError::Cooldown { .. }) => StatusCode::TOO_MANY_REQUESTS,
            HandlerError::Store(StoreError::SequenceExhausted(_)) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn into_response(self) -> Response<Full<Bytes>> {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed: {}", self);
            return text(status, "internal error");
        }

        debug!("Request rejected ({}): {}", status, self);
        let mut response = text(status, self.to_string());
        if let HandlerError::Store(StoreError::Cooldown { retry_after_secs, .. }) = self {
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
        }
        response
    }
}

/// Requests that never reach a handler.
#[derive(Debug, PartialEq, Eq)]
enum Rejection {
    NotFound,
    MethodNotAllowed,
    BadRequest(String),
}

impl Rejection {
    fn into_response(self) -> Response<Full<Bytes>> {
        match self {
            Rejection::NotFound => text(StatusCode::NOT_FOUND, "not found"),
            Rejection::MethodNotAllowed => {
                text(StatusCode::METHOD_NOT_ALLOWED, "method not allowed")
            }
            Rejection::BadRequest(message) => text(StatusCode::BAD_REQUEST, message),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Route {
    Image { id: BoardId, grid: bool },
    Configure { id: BoardId },
    Place { id: BoardId },
    Stats { id: BoardId },
}

/// Board settings, as sent to `PUT /board/{id}`.
#[derive(Debug, Serialize, Deserialize)]
struct BoardSettings {
    width: i32,
    height: i32,
    #[serde(default)]
    cooldown_secs: u64,
}

#[derive(Debug, Deserialize)]
struct Placement {
    author: i64,
    x: i64,
    y: i64,
    color: PixelColor,
}

#[derive(Serialize)]
struct PlacementBody {
    event: DrawEvent,
    /// The placement filled the board, which started over
    restarted: bool,
}

#[derive(Serialize)]
struct StatsBody {
    board: BoardId,
    total: usize,
    authors: Vec<AuthorStat>,
}

/// Parse a boolean query value, the way form parameters usually are.
fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Value of the `grid` query parameter, true when absent or empty.
fn grid_param(query: Option<&str>) -> Result<bool, String> {
    let Some(query) = query else {
        return Ok(true);
    };
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key == "grid" {
            if value.is_empty() {
                return Ok(true);
            }
            return parse_bool(value).ok_or_else(|| format!("invalid grid value {value:?}"));
        }
    }
    Ok(true)
}

fn route(method: &Method, path: &str, query: Option<&str>) -> Result<Route, Rejection> {
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
    let (id, tail) = match segments.as_slice() {
        ["board", id] => (*id, None),
        ["board", id, tail @ ("stats" | "pixel")] => (*id, Some(*tail)),
        _ => return Err(Rejection::NotFound),
    };
    let id: BoardId = id
        .parse()
        .map_err(|_| Rejection::BadRequest(format!("invalid board id {id:?}")))?;

    match tail {
        None if *method == Method::GET => Ok(Route::Image {
            id,
            grid: grid_param(query).map_err(Rejection::BadRequest)?,
        }),
        None if *method == Method::PUT => Ok(Route::Configure { id }),
        Some("pixel") if *method == Method::POST => Ok(Route::Place { id }),
        Some("stats") if *method == Method::GET => Ok(Route::Stats { id }),
        _ => Err(Rejection::MethodNotAllowed),
    }
}

fn response(
    status: StatusCode,
    content_type: &'static str,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn text(status: StatusCode, message: impl Into<String>) -> Response<Full<Bytes>> {
    response(status, "text/plain; charset=utf-8", Bytes::from(message.into()))
}

fn json<T: Serialize>(value: &T) -> Result<Response<Full<Bytes>>, HandlerError> {
    let body = serde_json::to_vec(value)?;
    Ok(response(StatusCode::OK, "application/json", Bytes::from(body)))
}

/// Read and decode a JSON request body.
async fn read_json<T, B>(body: B) -> Result<T, HandlerError>
where
    T: DeserializeOwned,
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let bytes = Limited::new(body, MAX_BODY_SIZE)
        .collect()
        .await
        .map_err(|e| HandlerError::BadRequest(format!("cannot read body: {e}")))?
        .to_bytes();
    serde_json::from_slice(&bytes)
        .map_err(|e| HandlerError::BadRequest(format!("malformed body: {e}")))
}

/// Render and encode the board, None for an image without pixels.
async fn board_image(
    state: &Arc<AppState>,
    id: BoardId,
    grid: bool,
) -> Result<Option<Vec<u8>>, HandlerError> {
    let state = Arc::clone(state);
    tokio::task::spawn_blocking(move || -> Result<Option<Vec<u8>>, HandlerError> {
        let canvas = state.renderer.render(state.store.as_ref(), id, grid)?;
        match encode_png(&canvas) {
            Ok(png) => Ok(Some(png)),
            Err(EncodeError::EmptyImage { width, height }) => {
                debug!("Board {}: empty {}x{} image", id, width, height);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    })
    .await?
}

/// Create the board, or restart it with new settings.
fn configure_board(
    state: &AppState,
    id: BoardId,
    settings: BoardSettings,
) -> Result<Response<Full<Bytes>>, HandlerError> {
    let config = BoardConfig::new(settings.width, settings.height);
    if config.width < 1 || config.height < 1 {
        return Err(HandlerError::BadRequest(format!(
            "board {config} must be at least 1x1"
        )));
    }
    if config.area().is_none_or(|area| area > BoardConfig::MAX_AREA) {
        return Err(HandlerError::BadRequest(format!(
            "board {config} is larger than {} cells",
            BoardConfig::MAX_AREA
        )));
    }
    if settings.cooldown_secs > MAX_COOLDOWN_SECS {
        return Err(HandlerError::BadRequest(format!(
            "cooldown of {}s is too long",
            settings.cooldown_secs
        )));
    }

    state.store.set_board(id, config)?;
    state
        .store
        .set_cooldown(id, Duration::from_secs(settings.cooldown_secs))?;
    info!(
        "Board {}: started as {}, cooldown {}s",
        id, config, settings.cooldown_secs
    );
    json(&settings)
}

/// Place a pixel, and start the board over once every cell is painted.
fn place_pixel(
    state: &AppState,
    id: BoardId,
    placement: Placement,
) -> Result<Response<Full<Bytes>>, HandlerError> {
    let event = state.store.place_pixel(
        id,
        placement.author,
        placement.x,
        placement.y,
        placement.color,
    )?;
    let restarted = state.store.is_filled(id)?;
    if restarted {
        info!("Board {}: filled, starting over", id);
        state.store.clear_log(id)?;
    }
    json(&PlacementBody { event, restarted })
}

fn board_stats(state: &AppState, id: BoardId) -> Result<Response<Full<Bytes>>, HandlerError> {
    json(&StatsBody {
        board: id,
        total: state.store.count_events(id)?,
        authors: state.store.author_stats(id)?,
    })
}

/// Handle a single request.
///
/// Never fails: every error is turned into an HTTP error response.
pub async fn handle<B>(
    state: Arc<AppState>,
    req: Request<B>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body,
    B::Error: Into<Box<dyn StdError + Send + Sync>>,
{
    let (parts, body) = req.into_parts();
    info!("{} {}", parts.method, parts.uri);

    let route = match route(&parts.method, parts.uri.path(), parts.uri.query()) {
        Ok(route) => route,
        Err(rejection) => return Ok(rejection.into_response()),
    };

    let result = match route {
        Route::Image { id, grid } => board_image(&state, id, grid).await.map(|png| match png {
            Some(png) => response(StatusCode::OK, "image/png", Bytes::from(png)),
            None => {
                let mut empty = Response::new(Full::new(Bytes::new()));
                *empty.status_mut() = StatusCode::NO_CONTENT;
                empty
            }
        }),
        Route::Configure { id } => match read_json(body).await {
            Ok(settings) => configure_board(&state, id, settings),
            Err(e) => Err(e),
        },
        Route::Place { id } => match read_json(body).await {
            Ok(placement) => place_pixel(&state, id, placement),
            Err(e) => Err(e),
        },
        Route::Stats { id } => board_stats(&state, id),
    };

    Ok(result.unwrap_or_else(HandlerError::into_response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::BoardStore;
    use http_body_util::Empty;
    use pixelboard_common::colors;

    fn state() -> Arc<AppState> {
        let store = MemoryStore::new();
        store.set_board(1, BoardConfig::new(10, 10)).unwrap();
        store.place_pixel(1, 7, 0, 0, colors::RED).unwrap();
        store.place_pixel(1, 8, 1, 0, colors::BLUE).unwrap();
        store.place_pixel(1, 7, 2, 0, colors::GREEN).unwrap();
        store.set_board(2, BoardConfig::new(0, 3)).unwrap();
        Arc::new(AppState::new(store))
    }

    async fn send(
        state: Arc<AppState>,
        method: Method,
        uri: &str,
        body: &str,
    ) -> (StatusCode, Option<String>, Bytes) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Full::new(Bytes::from(body.to_string())))
            .unwrap();
        let res = handle(state, req).await.unwrap();
        let status = res.status();
        let content_type = res
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let body = res.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, body)
    }

    async fn get(state: Arc<AppState>, uri: &str) -> (StatusCode, Option<String>, Bytes) {
        send(state, Method::GET, uri, "").await
    }

    fn png_size(bytes: &[u8]) -> (u32, u32) {
        let reader = png::Decoder::new(bytes).read_info().unwrap();
        let info = reader.info();
        (info.width, info.height)
    }

    #[test]
    fn test_parse_grid_param() {
        assert_eq!(grid_param(None), Ok(true));
        assert_eq!(grid_param(Some("")), Ok(true));
        assert_eq!(grid_param(Some("grid=false")), Ok(false));
        assert_eq!(grid_param(Some("foo=1&grid=TRUE")), Ok(true));
        assert_eq!(grid_param(Some("grid=0")), Ok(false));
        assert!(grid_param(Some("grid=maybe")).is_err());
    }

    #[test]
    fn test_parse_empty_grid_param_is_default() {
        assert_eq!(grid_param(Some("grid=")), Ok(true));
        assert_eq!(grid_param(Some("grid")), Ok(true));
        assert_eq!(grid_param(Some("other=x&grid=")), Ok(true));
    }

    #[test]
    fn test_route() {
        assert_eq!(
            route(&Method::GET, "/board/42", None),
            Ok(Route::Image { id: 42, grid: true })
        );
        assert_eq!(
            route(&Method::GET, "/board/-7", Some("grid=false")),
            Ok(Route::Image { id: -7, grid: false })
        );
        assert_eq!(
            route(&Method::GET, "/board/3/stats", None),
            Ok(Route::Stats { id: 3 })
        );
        assert_eq!(
            route(&Method::PUT, "/board/3", None),
            Ok(Route::Configure { id: 3 })
        );
        assert_eq!(
            route(&Method::POST, "/board/3/pixel", None),
            Ok(Route::Place { id: 3 })
        );
        assert_eq!(route(&Method::GET, "/", None), Err(Rejection::NotFound));
        assert_eq!(route(&Method::GET, "/boards/1", None), Err(Rejection::NotFound));
        assert_eq!(route(&Method::GET, "/board/1/other", None), Err(Rejection::NotFound));
        assert_eq!(
            route(&Method::GET, "/board/1/pixel", None),
            Err(Rejection::MethodNotAllowed)
        );
        assert!(matches!(
            route(&Method::GET, "/board/abc", None),
            Err(Rejection::BadRequest(_))
        ));
    }

    #[tokio::test]
    async fn test_handle_board_image() {
        let (status, content_type, body) = get(state(), "/board/1?grid=false").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("image/png"));
        assert_eq!(png_size(&body), (250, 250));

        let (status, _, body) = get(state(), "/board/1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(png_size(&body), (400, 400));

        let (status, _, body) = get(state(), "/board/1?grid=").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(png_size(&body), (400, 400));
    }

    #[tokio::test]
    async fn test_handle_missing_board_is_diagnostic_image() {
        let (status, content_type, body) = get(state(), "/board/99").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("image/png"));
        assert_eq!(png_size(&body), (250, 100));
    }

    #[tokio::test]
    async fn test_handle_degenerate_board() {
        let (status, _, body) = get(state(), "/board/2?grid=false").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert!(body.is_empty());

        let (status, _, body) = get(state(), "/board/2?grid=true").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(png_size(&body), (150, 225));
    }

    #[tokio::test]
    async fn test_handle_stats() {
        let (status, content_type, body) = get(state(), "/board/1/stats").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["board"], 1);
        assert_eq!(json["total"], 3);
        assert_eq!(json["authors"][0]["author"], 7);
        assert_eq!(json["authors"][0]["placements"], 2);
        assert_eq!(json["authors"][1]["author"], 8);
    }

    #[tokio::test]
    async fn test_handle_configure_board() {
        let state = state();
        let body = r#"{ "width": 5, "height": 4, "cooldown_secs": 30 }"#;
        let (status, _, _) = send(state.clone(), Method::PUT, "/board/1", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            state.store.board_config(1).unwrap(),
            Some(BoardConfig::new(5, 4))
        );
        // A restarted board starts with an empty log
        assert_eq!(state.store.count_events(1).unwrap(), 0);

        let (status, _, body) = get(state.clone(), "/board/1?grid=false").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(png_size(&body), (125, 100));
    }

    #[tokio::test]
    async fn test_handle_configure_rejects_bad_settings() {
        for body in [
            r#"{ "width": 0, "height": 4 }"#,
            r#"{ "width": -3, "height": 4 }"#,
            r#"{ "width": 101, "height": 100 }"#,
            r#"{ "width": 4, "height": 4, "cooldown_secs": 99999999999 }"#,
            r#"{ "width": 4 }"#,
            "not json",
        ] {
            let (status, _, _) = send(state(), Method::PUT, "/board/5", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {body}");
        }
    }

    #[tokio::test]
    async fn test_handle_place_pixel() {
        let state = state();
        let body = r#"{ "author": 9, "x": -4, "y": 5, "color": 255 }"#;
        let (status, content_type, body) =
            send(state.clone(), Method::POST, "/board/1/pixel", body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["event"]["sequence"], 3);
        assert_eq!(json["event"]["color"], 255);
        assert_eq!(json["restarted"], false);
        assert_eq!(state.store.count_events(1).unwrap(), 4);
    }

    #[tokio::test]
    async fn test_handle_place_pixel_errors() {
        let state = state();
        let outside = r#"{ "author": 9, "x": 6, "y": 0, "color": 0 }"#;
        let (status, _, _) = send(state.clone(), Method::POST, "/board/1/pixel", outside).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let pixel = r#"{ "author": 9, "x": 0, "y": 0, "color": 0 }"#;
        let (status, _, _) = send(state.clone(), Method::POST, "/board/77/pixel", pixel).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _, _) = send(state.clone(), Method::POST, "/board/1/pixel", "{}").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_handle_place_pixel_cooldown() {
        let state = state();
        let settings = r#"{ "width": 4, "height": 4, "cooldown_secs": 600 }"#;
        send(state.clone(), Method::PUT, "/board/3", settings).await;

        let pixel = r#"{ "author": 9, "x": 0, "y": 0, "color": 0 }"#;
        let (status, _, _) = send(state.clone(), Method::POST, "/board/3/pixel", pixel).await;
        assert_eq!(status, StatusCode::OK);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/board/3/pixel")
            .body(Full::new(Bytes::from(pixel)))
            .unwrap();
        let res = handle(state.clone(), req).await.unwrap();
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        let retry_after: u64 = res.headers()[RETRY_AFTER].to_str().unwrap().parse().unwrap();
        assert!(retry_after > 0 && retry_after <= 600);
    }

    #[tokio::test]
    async fn test_handle_filling_the_board_restarts_it() {
        let state = state();
        send(state.clone(), Method::PUT, "/board/4", r#"{ "width": 2, "height": 1 }"#).await;

        // x in [0, 2), y in [0, 1)
        let first = r#"{ "author": 1, "x": 0, "y": 0, "color": 0 }"#;
        let (_, _, body) = send(state.clone(), Method::POST, "/board/4/pixel", first).await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["restarted"], false);

        let second = r#"{ "author": 1, "x": 1, "y": 0, "color": 0 }"#;
        let (_, _, body) = send(state.clone(), Method::POST, "/board/4/pixel", second).await;
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["restarted"], true);
        assert_eq!(state.store.count_events(4).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_handle_bad_requests() {
        let (status, _, _) = get(state(), "/board/x").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _, _) = get(state(), "/board/1?grid=perhaps").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _, _) = get(state(), "/nothing/here").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let req = Request::builder()
            .method(Method::POST)
            .uri("/board/1")
            .body(Empty::<Bytes>::new())
            .unwrap();
        let res = handle(state(), req).await.unwrap();
        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);

        let oversized = "x".repeat(MAX_BODY_SIZE + 1);
        let (status, _, _) = send(state(), Method::PUT, "/board/1", &oversized).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
