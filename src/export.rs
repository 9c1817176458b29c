use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use tracing::{info, instrument};

use crate::error::{EmptyTrackError, ExportError};
use crate::types::feature::TRACK_STYLE;
use crate::types::track::{TrackModel, TrackSegment};

pub trait IntoTrackGeoJson {
    fn to_geojson(&self) -> Result<GeoJson, EmptyTrackError>;
}

impl IntoTrackGeoJson for TrackModel {
    /// One styled LineString feature per segment, in file order.
    fn to_geojson(&self) -> Result<GeoJson, EmptyTrackError> {
        let bbox = self.bounding_box()?;
        info!("number of segments in track: {}", self.segments().len());
        let features = self
            .segments()
            .iter()
            // Empty segments have no geometry to draw
            .filter(|segment| !segment.is_empty())
            .map(segment_feature)
            .collect();
        Ok(FeatureCollection {
            bbox: Some(bbox.to_vec()),
            features,
            foreign_members: None,
        }
        .into())
    }
}

fn segment_feature(segment: &TrackSegment) -> Feature {
    let coordinates = segment
        .points()
        .iter()
        .map(|point| vec![point.lon, point.lat])
        .collect();
    Feature {
        geometry: Some(Geometry::new(Value::LineString(coordinates))),
        properties: Some(TRACK_STYLE.into()),
        ..Default::default()
    }
}

/// Pretty-printed GeoJSON document for the track.
#[instrument(skip_all, fields(points = model.num_points()))]
pub fn export_geojson(model: &TrackModel) -> Result<String, ExportError> {
    let geo_json = model.to_geojson()?;
    Ok(serde_json::to_string_pretty(&geo_json)?)
}
