mod config;
mod net;

use std::{sync::Arc, time::Duration};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use config::Config;
use drawgpx::{
    compute_statistics, export_geojson, BoundingBox, ExportError, RenderFormat, RenderRequest,
    Statistics, TrackModel,
};
use net::response::{ResponseError, Result};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{info, instrument};

#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
}

#[derive(Serialize)]
struct TrackReport {
    statistics: Statistics,
    bbox: BoundingBox,
    render: RenderRequest,
}

struct Upload {
    gpx: Bytes,
    zoom: Option<u8>,
    format: Option<RenderFormat>,
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    // initialize tracing
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let bind_addr = config.bind_addr;
    let app = app(config);

    info!("Running on {bind_addr}");

    axum::Server::bind(&bind_addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

fn app(config: Config) -> Router {
    let max_upload_bytes = config.max_upload_bytes;
    Router::new()
        .route("/gpx", post(track_report))
        .route("/gpx/geojson", post(track_geojson))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(AppState {
            config: Arc::new(config),
        })
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload> {
    let mut gpx_opt: Option<Bytes> = None;
    let mut zoom: Option<u8> = None;
    let mut format: Option<RenderFormat> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ResponseError::bad_request(e.to_string()))?
    {
        let name = field
            .name()
            .ok_or(ResponseError::bad_request("No name on form field"))?
            .to_owned();
        let content = field
            .bytes()
            .await
            .map_err(|e| ResponseError::bad_request(e.to_string()))?;
        match name.as_str() {
            "gpx" => gpx_opt = Some(content),
            "zoom" => {
                let text = String::from_utf8_lossy(&content);
                zoom = Some(text.trim().parse().map_err(|_| {
                    ResponseError::bad_request(format!("zoom {text:?} is not a number"))
                })?);
            }
            "format" => {
                format = Some(
                    String::from_utf8_lossy(&content)
                        .parse()
                        .map_err(ResponseError::render)?,
                )
            }
            _ => continue,
        }
    }
    Ok(Upload {
        gpx: gpx_opt.ok_or(ResponseError::bad_request("gpx not provided"))?,
        zoom,
        format,
    })
}

/// Parse on the blocking pool, giving up after `timeout`. The parser cannot
/// be interrupted, so a timed-out parse still runs to completion in the
/// background; the upload size limit bounds how long that takes.
#[instrument(skip(gpx), fields(bytes = gpx.len()))]
async fn parse_upload(gpx: Bytes, timeout: Duration) -> Result<TrackModel> {
    let parsing = tokio::task::spawn_blocking(move || drawgpx::parse(&gpx[..]));
    let model = tokio::time::timeout(timeout, parsing)
        .await
        .map_err(|_| {
            ResponseError::with_status(StatusCode::REQUEST_TIMEOUT, "parsing the track timed out")
        })??
        .map_err(ResponseError::parse)?;
    Ok(model)
}

#[instrument(skip_all)]
async fn track_report(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<TrackReport>> {
    let upload = read_upload(multipart).await?;
    let model = parse_upload(upload.gpx, state.config.parse_timeout).await?;
    let statistics = compute_statistics(&model).map_err(ResponseError::empty_track)?;
    let bbox = model.bounding_box().map_err(ResponseError::empty_track)?;
    let render = RenderRequest::for_track(&model, upload.zoom, upload.format)
        .map_err(ResponseError::render)?;
    info!("track statistics: {statistics}");
    Ok(Json(TrackReport {
        statistics,
        bbox,
        render,
    }))
}

#[instrument(skip_all)]
async fn track_geojson(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse> {
    let upload = read_upload(multipart).await?;
    let model = parse_upload(upload.gpx, state.config.parse_timeout).await?;
    let document = export_geojson(&model).map_err(|error| match error {
        ExportError::EmptyTrack(error) => ResponseError::empty_track(error),
        error => error.into(),
    })?;
    Ok(([(header::CONTENT_TYPE, "application/geo+json")], document))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    use super::*;

    const BOUNDARY: &str = "drawgpx-test-boundary";

    const TRACK: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<gpx version="1.1" creator="test" xmlns="http://www.topografix.com/GPX/1/1">
  <trk><trkseg>
    <trkpt lat="50.000" lon="10.0"><time>2020-01-01T00:00:00Z</time></trkpt>
    <trkpt lat="50.001" lon="10.0"><time>2020-01-01T00:00:10Z</time></trkpt>
    <trkpt lat="50.002" lon="10.0"><time>2020-01-01T00:00:20Z</time></trkpt>
  </trkseg></trk>
</gpx>"#;

    fn multipart_body(fields: &[(&str, &str)]) -> String {
        let mut body = String::new();
        for (name, value) in fields {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    async fn post_form(uri: &str, fields: &[(&str, &str)]) -> (StatusCode, String, String) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(fields)))
            .unwrap();
        let response = app(Config::default()).oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap();
        (status, content_type, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn report_for_timed_track() {
        let (status, _, body) = post_form(
            "/gpx",
            &[("gpx", TRACK), ("zoom", "10"), ("format", "svg")],
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let report: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(report["statistics"]["time"], 20);
        assert_eq!(report["statistics"]["starttime"], 1_577_836_800);
        assert_eq!(report["statistics"]["endtime"], 1_577_836_820);
        assert!(report["statistics"]["length"].as_f64().unwrap() > 200.0);
        assert_eq!(report["bbox"]["xmin"], 10.0);
        assert!((report["bbox"]["ymax"].as_f64().unwrap() - 50.002).abs() < 1e-9);
        assert_eq!(report["render"]["zoom"], 10);
        assert_eq!(report["render"]["format"], "svg");
    }

    #[tokio::test]
    async fn geojson_document() {
        let (status, content_type, body) = post_form("/gpx/geojson", &[("gpx", TRACK)]).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(content_type, "application/geo+json");
        let document: serde_json::Value = serde_json::from_str(&body).unwrap();
        let second = &document["features"][0]["geometry"]["coordinates"][1];
        assert_eq!(second[0], 10.0);
        assert!((second[1].as_f64().unwrap() - 50.001).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_track_is_unprocessable() {
        let empty = r#"<gpx version="1.1" creator="test"><trk><trkseg/></trk></gpx>"#;
        let (status, _, _) = post_form("/gpx", &[("gpx", empty)]).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        let (status, _, _) = post_form("/gpx/geojson", &[("gpx", empty)]).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn malformed_track_is_bad_request() {
        let broken = r#"<gpx><trk><trkseg><trkpt lat="x" lon="1"/></trkseg></trk></gpx>"#;
        let (status, _, body) = post_form("/gpx", &[("gpx", broken)]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("lat"), "{body}");
    }

    #[tokio::test]
    async fn bad_options_are_rejected() {
        let (status, _, _) = post_form("/gpx", &[("gpx", TRACK), ("zoom", "20")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _, _) = post_form("/gpx", &[("gpx", TRACK), ("format", "gif")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _, body) = post_form("/gpx", &[("zoom", "3")]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "gpx not provided");
    }
}
