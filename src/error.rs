use thiserror::Error;

/// Failure while reading a track document. The parse is abandoned at the
/// first error and no partial model is returned.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML at byte {position}: {source}")]
    Xml {
        position: usize,
        #[source]
        source: quick_xml::Error,
    },

    #[error("malformed markup: {0}")]
    Markup(#[from] quick_xml::Error),

    #[error("track point is missing the `{0}` attribute")]
    MissingAttribute(&'static str),

    #[error("track point has a non-numeric `{attribute}` value {value:?}")]
    InvalidCoordinate {
        attribute: &'static str,
        value: String,
    },

    #[error("track point `{attribute}` value {value} is out of range")]
    CoordinateOutOfRange { attribute: &'static str, value: f64 },

    #[error("unrecognised date-time {0:?}")]
    InvalidTime(String),

    #[error("invalid document structure: {0}")]
    Structure(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The track has no points, so nothing can be measured or drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("GPX track is empty")]
pub struct EmptyTrackError;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    EmptyTrack(#[from] EmptyTrackError),

    #[error("cannot serialize GeoJSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    EmptyTrack(#[from] EmptyTrackError),

    #[error("zoom {0} is outside 1..=14")]
    InvalidZoom(u8),

    #[error("unknown image format {0:?}, expected png or svg")]
    UnknownFormat(String),
}
