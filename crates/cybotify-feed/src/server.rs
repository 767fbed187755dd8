//! HTTP + WebSocket routes of the feed.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    http::StatusCode,
    response::{Json, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

use cybotify_proto::model::PlaylistSummary;
use cybotify_proto::protocol::{AnalysisPayload, PlaylistPayload};

use crate::library::Library;

#[derive(Clone)]
pub struct FeedState {
    pub library: Arc<Library>,
    pub stage_delay: Duration,
}

pub fn router(state: FeedState) -> Router {
    Router::new()
        .route("/api/playlists", get(list_playlists))
        .route("/api/playlists/:id", get(get_playlist))
        .route("/api/playlists/:id/analysis", get(get_analysis))
        .route("/ws/playlist_detail/:id/", get(playlist_detail_ws))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(bind_address: String, port: u16, state: FeedState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", bind_address, port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        error!("Failed to bind feed server to {}: {}", addr, e);
        e
    })?;

    info!("Feed listening on http://{}", addr);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn list_playlists(State(state): State<FeedState>) -> Json<Vec<PlaylistSummary>> {
    Json(state.library.summaries())
}

async fn get_playlist(
    State(state): State<FeedState>,
    Path(id): Path<u64>,
) -> Result<Json<PlaylistPayload>, StatusCode> {
    let playlist = state.library.get(id).ok_or(StatusCode::NOT_FOUND)?;
    debug!("Serving playlist {} ({} tracks)", id, playlist.tracks.len());
    Ok(Json(playlist.payload()))
}

async fn get_analysis(
    State(state): State<FeedState>,
    Path(id): Path<u64>,
) -> Result<Json<AnalysisPayload>, StatusCode> {
    let playlist = state.library.get(id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(playlist.analysis()))
}

async fn playlist_detail_ws(
    ws: WebSocketUpgrade,
    State(state): State<FeedState>,
    Path(id): Path<u64>,
) -> Response {
    ws.on_upgrade(move |socket| stream_stages(socket, id, state))
}

/// Send name, then name+tracks, then name+tracks+features, and close. The
/// server ends the stream; clients never do.
async fn stream_stages(mut socket: WebSocket, id: u64, state: FeedState) {
    let Some(playlist) = state.library.get(id) else {
        warn!("Stage stream requested for unknown playlist {}", id);
        let _ = socket.send(Message::Close(None)).await;
        return;
    };

    info!("Streaming stages for playlist {}", id);
    let frames = playlist.stage_frames();
    let last = frames.len().saturating_sub(1);
    for (i, frame) in frames.iter().enumerate() {
        let text = match frame.encode() {
            Ok(t) => t,
            Err(e) => {
                error!("Failed to encode stage frame {} for playlist {}: {}", i, id, e);
                break;
            }
        };
        if socket.send(Message::Text(text.into())).await.is_err() {
            debug!("Client went away during stage {} of playlist {}", i, id);
            return;
        }
        if i < last {
            tokio::time::sleep(state.stage_delay).await;
        }
    }
    let _ = socket.send(Message::Close(None)).await;
    debug!("Stage stream for playlist {} complete", id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn state() -> FeedState {
        FeedState {
            library: Arc::new(Library::demo()),
            stage_delay: Duration::from_millis(0),
        }
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router(state())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_list_playlists() {
        let (status, body) = get_json("/api/playlists").await;
        assert_eq!(status, StatusCode::OK);
        let summaries: Vec<PlaylistSummary> = serde_json::from_value(body).unwrap();
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[2].name, "Road Trip");
    }

    #[tokio::test]
    async fn test_playlist_and_analysis_round_trip_through_proto_types() {
        let (status, body) = get_json("/api/playlists/1").await;
        assert_eq!(status, StatusCode::OK);
        let payload: PlaylistPayload = serde_json::from_value(body).unwrap();
        assert_eq!(payload.name, "My Mix");

        let (status, body) = get_json("/api/playlists/1/analysis").await;
        assert_eq!(status, StatusCode::OK);
        let analysis: AnalysisPayload = serde_json::from_value(body).unwrap();
        assert_eq!(analysis.track_features.len(), 4);
    }

    #[tokio::test]
    async fn test_unknown_playlist_is_404() {
        let (status, _) = get_json("/api/playlists/99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = get_json("/api/playlists/99/analysis").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
