//! Ingest GPX tracks and derive trip statistics.
//!
//! A track is read with a streaming parser into a [`TrackModel`], which can
//! then be summarised with [`compute_statistics`], exported as GeoJSON with
//! [`export_geojson`], or turned into a [`RenderRequest`] for an external map
//! renderer.

mod error;
mod export;
mod import;
mod render;
mod track_geo;
mod track_stats;
mod types;

pub use error::{EmptyTrackError, ExportError, ParseError, RenderError};
pub use export::{export_geojson, IntoTrackGeoJson};
pub use import::gpx::{parse, parse_file, AttributeSource, TrackBuilder};
pub use render::{RenderFormat, RenderRequest, RENDER_MARGIN};
pub use track_geo::geodesic_distance;
pub use track_stats::{compute_statistics, MAXSPEED_WINDOW_SECS, MIN_MOVING_SPEED};
pub use types::feature::{SegmentStyle, TRACK_STYLE};
pub use types::statistics::Statistics;
pub use types::track::{BoundingBox, TrackModel, TrackPoint, TrackSegment};
