use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::RenderError;
use crate::types::track::{BoundingBox, TrackModel};

/// Share of the track's width/height added on each side of the rendered area.
pub const RENDER_MARGIN: f64 = 0.05;

const ZOOM_LEVELS: std::ops::RangeInclusive<u8> = 1..=14;
const DEFAULT_ZOOM: u8 = 12;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderFormat {
    #[default]
    Png,
    Svg,
}

impl FromStr for RenderFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "svg" => Ok(Self::Svg),
            _ => Err(RenderError::UnknownFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for RenderFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Png => "png",
            Self::Svg => "svg",
        })
    }
}

/// What an external map renderer needs to draw a track: the area to cover,
/// the zoom level and the image format.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderRequest {
    pub bbox: BoundingBox,
    pub zoom: u8,
    pub format: RenderFormat,
}

impl RenderRequest {
    pub fn for_track(
        model: &TrackModel,
        zoom: Option<u8>,
        format: Option<RenderFormat>,
    ) -> Result<Self, RenderError> {
        let zoom = zoom.unwrap_or(DEFAULT_ZOOM);
        if !ZOOM_LEVELS.contains(&zoom) {
            return Err(RenderError::InvalidZoom(zoom));
        }
        Ok(Self {
            bbox: model.bounding_box()?.with_margin(RENDER_MARGIN),
            zoom,
            format: format.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EmptyTrackError;
    use crate::types::track::TrackPoint;

    fn two_point_track() -> TrackModel {
        let mut model = TrackModel::new();
        model.open_segment();
        model.push_point(TrackPoint::new(0.0, 0.0)).unwrap();
        model.push_point(TrackPoint::new(10.0, 20.0)).unwrap();
        model
    }

    #[test]
    fn defaults_and_margin() {
        let request = RenderRequest::for_track(&two_point_track(), None, None).unwrap();
        assert_eq!(request.zoom, 12);
        assert_eq!(request.format, RenderFormat::Png);
        assert_eq!(request.bbox.to_vec(), vec![-0.5, -1.0, 10.5, 21.0]);
    }

    #[test]
    fn zoom_is_validated() {
        let model = two_point_track();
        assert!(RenderRequest::for_track(&model, Some(1), None).is_ok());
        assert!(RenderRequest::for_track(&model, Some(14), None).is_ok());
        assert!(matches!(
            RenderRequest::for_track(&model, Some(0), None),
            Err(RenderError::InvalidZoom(0))
        ));
        assert!(matches!(
            RenderRequest::for_track(&model, Some(15), None),
            Err(RenderError::InvalidZoom(15))
        ));
    }

    #[test]
    fn empty_track_has_nothing_to_render() {
        assert!(matches!(
            RenderRequest::for_track(&TrackModel::new(), None, None),
            Err(RenderError::EmptyTrack(EmptyTrackError))
        ));
    }

    #[test]
    fn formats() {
        assert_eq!("SVG".parse::<RenderFormat>().unwrap(), RenderFormat::Svg);
        assert_eq!("png".parse::<RenderFormat>().unwrap().to_string(), "png");
        assert!(matches!(
            "jpeg".parse::<RenderFormat>(),
            Err(RenderError::UnknownFormat(f)) if f == "jpeg"
        ));
        assert_eq!(
            serde_json::to_string(&RenderFormat::Svg).unwrap(),
            r#""svg""#
        );
    }
}
