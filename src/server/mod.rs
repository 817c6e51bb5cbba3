//! HTTP surface.
//!
//! Raw hyper over a tokio accept loop; each connection gets its own task,
//! each request dispatches by method and path. Model work never runs on
//! these tasks directly (see routes), so a long synthesis does not stall
//! health checks or other connections.

pub mod fetch;
pub mod multipart;
pub mod routes;

use crate::config::Config;
use crate::error::Result;
use crate::models::ModelLifecycle;
use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response};
use hyper_util::rt::TokioIo;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared per-process server state.
pub struct ServerState {
    pub config: Config,
    pub lifecycle: Arc<ModelLifecycle>,
    pub http: reqwest::Client,
}

impl ServerState {
    pub fn new(config: Config, lifecycle: Arc<ModelLifecycle>) -> Self {
        Self {
            config,
            lifecycle,
            http: reqwest::Client::new(),
        }
    }
}

async fn collect_body_bytes(req: Request<Incoming>) -> Vec<u8> {
    BodyExt::collect(req.into_body())
        .await
        .map(|b| b.to_bytes().to_vec())
        .unwrap_or_default()
}

fn content_type_of(req: &Request<Incoming>) -> String {
    req.headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

async fn handle_request(
    req: Request<Incoming>,
    state: Arc<ServerState>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    log::info!("{} {}", method, path);

    let outcome = match (method.clone(), path.as_str()) {
        (Method::GET, "/health") => Ok(routes::handle_health(&state)),

        (Method::POST, "/tts") => {
            let body = collect_body_bytes(req).await;
            routes::handle_tts(&state, &body).await
        }

        (Method::POST, "/tts-with-ref") => {
            let content_type = content_type_of(&req);
            let body = collect_body_bytes(req).await;
            routes::handle_tts_with_ref(&state, &body, &content_type).await
        }

        (Method::POST, "/transcribe") => {
            let content_type = content_type_of(&req);
            let body = collect_body_bytes(req).await;
            routes::handle_transcribe(&state, &body, &content_type).await
        }

        (Method::POST, "/transcribe-url") => {
            let body = collect_body_bytes(req).await;
            routes::handle_transcribe_url(&state, &body).await
        }

        _ => Ok(routes::json_response(
            404,
            json!({"success": false, "error": format!("no route for {} {}", method, path)}),
        )),
    };

    Ok(outcome.unwrap_or_else(|e| routes::error_response(&e)))
}

/// Bind and serve until the process is stopped.
pub async fn serve(state: Arc<ServerState>) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let listener = TcpListener::bind(addr).await?;
    log::info!("listening on http://{}", addr);

    loop {
        let (stream, peer) = listener.accept().await?;
        let io = TokioIo::new(stream);
        let state = Arc::clone(&state);

        tokio::task::spawn(async move {
            if let Err(e) = http1::Builder::new()
                .serve_connection(io, service_fn(move |req| handle_request(req, state.clone())))
                .await
            {
                log::debug!("connection error from {}: {:?}", peer, e);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{MockRecognizer, MockSynthesizer, Recognizer, Synthesizer};

    fn test_state() -> Arc<ServerState> {
        let lifecycle = Arc::new(ModelLifecycle::new(
            || Ok(Arc::new(MockSynthesizer::new()) as Arc<dyn Synthesizer>),
            || Ok(Arc::new(MockRecognizer::new("mock")) as Arc<dyn Recognizer>),
        ));
        Arc::new(ServerState::new(Config::default(), lifecycle))
    }

    #[tokio::test]
    async fn test_health_reports_unloaded_models_as_false() {
        let state = test_state();
        let response = routes::handle_health(&state);
        assert_eq!(response.status(), 200);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["status"], "ok");
        assert!(body["device"] == "cuda" || body["device"] == "cpu");
        assert_eq!(body["models"]["tts"], false);
        assert_eq!(body["models"]["whisper"], false);
        // Always an object, empty on CPU-only hosts.
        assert!(body["gpu"].is_object());
    }

    #[tokio::test]
    async fn test_tts_with_mock_engine_returns_audio() {
        let state = test_state();
        let body = br#"{"text": "Hello world. How are you? Great!"}"#;

        let response = routes::handle_tts(&state, body).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["Content-Type"], "audio/wav");
        assert!(response.headers().contains_key("X-Duration-Seconds"));
        assert!(response.headers().contains_key("X-Sample-Rate"));
        assert!(response.headers().contains_key("X-Generation-Time-Ms"));
    }

    #[tokio::test]
    async fn test_tts_rejects_bad_output_format() {
        let state = test_state();
        let body = br#"{"text": "hi there.", "output_format": "mp3"}"#;

        let err = routes::handle_tts(&state, body).await.unwrap_err();
        assert_eq!(err.status_code(), 400);
    }

    #[tokio::test]
    async fn test_transcribe_upload_rejects_zero_beam_size() {
        let state = test_state();
        let boundary = "reqbound";
        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"audio\"; filename=\"a.wav\"\r\n\r\n\
             RIFFnotreallyawav\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"beam_size\"\r\n\r\n\
             0\r\n\
             --{b}--\r\n",
            b = boundary
        );
        let content_type = format!("multipart/form-data; boundary={}", boundary);

        let err = routes::handle_transcribe(&state, body.as_bytes(), &content_type)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert!(err.to_string().contains("beam_size"));
    }

    #[tokio::test]
    async fn test_unavailable_model_maps_to_503() {
        let lifecycle = Arc::new(ModelLifecycle::new(
            || {
                Err(crate::error::VoxError::Config {
                    message: "no weights".to_string(),
                })
            },
            || Ok(Arc::new(MockRecognizer::new("mock")) as Arc<dyn Recognizer>),
        ));
        let state = Arc::new(ServerState::new(Config::default(), lifecycle));

        let err = routes::handle_tts(&state, br#"{"text": "hi."}"#)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 503);
    }
}
