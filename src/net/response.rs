use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use drawgpx::{EmptyTrackError, ParseError, RenderError};
use tracing::warn;

pub struct ResponseError(Response);

impl IntoResponse for ResponseError {
    fn into_response(self) -> Response {
        self.0
    }
}

impl<E> From<E> for ResponseError
where
    E: Into<color_eyre::eyre::Error>,
{
    fn from(value: E) -> Self {
        let report = Into::<color_eyre::eyre::Error>::into(value);
        warn!("request failed: {report}");
        Self((StatusCode::INTERNAL_SERVER_ERROR, report.to_string()).into_response())
    }
}

impl ResponseError {
    pub fn with_status<T>(status_code: StatusCode, data: T) -> Self
    where
        (StatusCode, T): IntoResponse,
    {
        ResponseError((status_code, data).into_response())
    }

    pub fn bad_request<T>(data: T) -> Self
    where
        (StatusCode, T): IntoResponse,
    {
        ResponseError((StatusCode::BAD_REQUEST, data).into_response())
    }

    pub fn parse(error: ParseError) -> Self {
        warn!("cannot parse gpx: {error}");
        Self::bad_request(format!("cannot parse GPX: {error}"))
    }

    pub fn empty_track(error: EmptyTrackError) -> Self {
        warn!("nothing to process: {error}");
        Self::with_status(StatusCode::UNPROCESSABLE_ENTITY, error.to_string())
    }

    pub fn render(error: RenderError) -> Self {
        warn!("invalid render options: {error}");
        match error {
            RenderError::EmptyTrack(error) => Self::empty_track(error),
            error => Self::bad_request(error.to_string()),
        }
    }
}

pub type Result<T, E = ResponseError> = axum::response::Result<T, E>;

#[cfg(test)]
mod tests {
    use drawgpx::{RenderFormat, TrackModel};

    use super::*;

    fn status(error: ResponseError) -> StatusCode {
        error.into_response().status()
    }

    #[test]
    fn error_kinds_map_to_statuses() {
        let parse_error = drawgpx::parse(&b"<gpx><trk><trkpt/></trk></gpx>"[..]).unwrap_err();
        assert_eq!(status(ResponseError::parse(parse_error)), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(ResponseError::empty_track(EmptyTrackError)),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status(ResponseError::render(RenderError::InvalidZoom(20))),
            StatusCode::BAD_REQUEST
        );
        let empty = drawgpx::RenderRequest::for_track(&TrackModel::new(), None, Some(RenderFormat::Svg))
            .unwrap_err();
        assert_eq!(status(ResponseError::render(empty)), StatusCode::UNPROCESSABLE_ENTITY);
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        assert_eq!(status(ResponseError::from(io)), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
