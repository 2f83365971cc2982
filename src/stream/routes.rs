// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::anyhow;
use http::{Response, StatusCode};
use serde_json::json;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use warp::filters::BoxedFilter;
use warp::{Filter, Reply};

use super::mjpeg::MjpegStream;
use super::status::StatusSources;
use crate::render::RenderCommand;

type Route = BoxedFilter<(warp::reply::Response,)>;

/// Render commands are tiny, anything bigger than this is rejected outright.
const MAX_COMMAND_LENGTH: u64 = 4 * 1024;

fn mjpeg_route(mjpeg: MjpegStream) -> Route {
    warp::path("mjpeg")
        .and(warp::path::end())
        .and(warp::get())
        .map(move || {
            debug!("new MJPEG client");
            Response::builder()
                .status(StatusCode::OK)
                .header("Content-Type", mjpeg.content_type())
                .body(mjpeg.body())
                .into_response()
        })
        .boxed()
}

fn status_route(status: StatusSources) -> Route {
    warp::path("status")
        .and(warp::path::end())
        .and(warp::get())
        .map(move || warp::reply::json(&status.snapshot()).into_response())
        .boxed()
}

fn render_route(commands: mpsc::Sender<RenderCommand>) -> Route {
    warp::path("render")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_COMMAND_LENGTH))
        .and(warp::body::json())
        .and_then(move |command: RenderCommand| {
            let commands = commands.clone();
            async move {
                debug!(?command, "received render command");
                let reply = match commands.send(command).await {
                    Ok(_) => warp::reply::json(&json!({ "ok": true })).into_response(),
                    Err(_) => {
                        warn!("render task is not running, dropping render command");
                        warp::reply::with_status(
                            warp::reply::json(&json!({ "error": "renderer unavailable" })),
                            StatusCode::SERVICE_UNAVAILABLE,
                        )
                        .into_response()
                    }
                };
                Ok::<_, warp::Rejection>(reply)
            }
        })
        .boxed()
}

/// Build the viewer's HTTP routes. The MJPEG stream is only served if one is given.
pub(crate) fn routes(
    mjpeg: Option<MjpegStream>,
    status: StatusSources,
    commands: mpsc::Sender<RenderCommand>,
) -> anyhow::Result<Route> {
    let mut routes = vec![status_route(status), render_route(commands)];
    if let Some(mjpeg) = mjpeg {
        routes.push(mjpeg_route(mjpeg));
    }
    routes
        .into_iter()
        .reduce(|combined, next| combined.or(next).unify().boxed())
        .ok_or_else(|| anyhow!("problem creating viewer routes"))
}

#[cfg(test)]
mod test {
    use http::StatusCode;
    use tokio::sync::{mpsc, watch};

    use super::routes;
    use crate::connection::FrameSource;
    use crate::render::{Method, RenderCommand};
    use crate::settings::DeviceSettings;
    use crate::stream::mjpeg::MjpegStream;
    use crate::stream::status::{RenderStatus, StatusSources};

    fn status_sources() -> StatusSources {
        let (_source, receivers) = FrameSource::new(&DeviceSettings::default()).unwrap();
        let (_render_tx, render_rx) = watch::channel(RenderStatus::default());
        StatusSources::new(render_rx, &receivers)
    }

    #[tokio::test]
    async fn status_json() {
        let (commands, _rx) = mpsc::channel(1);
        let filter = routes(None, status_sources(), commands).unwrap();
        let response = warp::test::request()
            .method("GET")
            .path("/status")
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
        assert_eq!(body["connection"], "disconnected");
    }

    #[tokio::test]
    async fn render_command_forwarded() {
        let (commands, mut rx) = mpsc::channel(1);
        let filter = routes(None, status_sources(), commands).unwrap();
        let response = warp::test::request()
            .method("POST")
            .path("/render")
            .body(r#"{"command": "set_method", "method": "nearest"}"#)
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(&response.body()[..], br#"{"ok":true}"#);
        assert_eq!(
            rx.recv().await,
            Some(RenderCommand::SetMethod {
                method: Method::Nearest
            })
        );
    }

    #[tokio::test]
    async fn invalid_render_command() {
        let (commands, _rx) = mpsc::channel(1);
        let filter = routes(None, status_sources(), commands).unwrap();
        let response = warp::test::request()
            .method("POST")
            .path("/render")
            .body(r#"{"command": "explode"}"#)
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn render_task_gone() {
        let (commands, rx) = mpsc::channel(1);
        drop(rx);
        let filter = routes(None, status_sources(), commands).unwrap();
        let response = warp::test::request()
            .method("POST")
            .path("/render")
            .body(r#"{"command": "show_hotspot", "enabled": false}"#)
            .reply(&filter)
            .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn mjpeg_only_when_enabled() {
        let (commands, _rx) = mpsc::channel(1);
        let filter = routes(None, status_sources(), commands.clone()).unwrap();
        assert!(
            !warp::test::request()
                .path("/mjpeg")
                .matches(&filter)
                .await
        );
        let filter = routes(Some(MjpegStream::new()), status_sources(), commands).unwrap();
        assert!(
            warp::test::request()
                .path("/mjpeg")
                .matches(&filter)
                .await
        );
    }
}
