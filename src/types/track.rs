use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EmptyTrackError, ParseError};

/// A single recorded position. `time` is in whole seconds since the UTC epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackPoint {
    pub lon: f64,
    pub lat: f64,
    pub time: Option<i64>,
}

impl TrackPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon,
            lat,
            time: None,
        }
    }

    pub fn with_time(lon: f64, lat: f64, time: i64) -> Self {
        Self {
            lon,
            lat,
            time: Some(time),
        }
    }
}

/// A contiguous recording run, points in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackSegment {
    points: Vec<TrackPoint>,
}

impl TrackSegment {
    pub fn points(&self) -> &[TrackPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Axis-aligned lon/lat rectangle, x is longitude and y latitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingBox {
    /// A box that any point will widen.
    pub fn inverted() -> Self {
        Self {
            xmin: f64::INFINITY,
            ymin: f64::INFINITY,
            xmax: f64::NEG_INFINITY,
            ymax: f64::NEG_INFINITY,
        }
    }

    pub fn extend(&mut self, lon: f64, lat: f64) {
        self.xmin = self.xmin.min(lon);
        self.xmax = self.xmax.max(lon);
        self.ymin = self.ymin.min(lat);
        self.ymax = self.ymax.max(lat);
    }

    /// Grow every side by `ratio` of the box's own width (x) or height (y).
    pub fn with_margin(&self, ratio: f64) -> Self {
        let dx = (self.xmax - self.xmin) * ratio;
        let dy = (self.ymax - self.ymin) * ratio;
        Self {
            xmin: self.xmin - dx,
            ymin: self.ymin - dy,
            xmax: self.xmax + dx,
            ymax: self.ymax + dy,
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.xmin, self.ymin, self.xmax, self.ymax]
    }
}

/// A parsed track: segments in file order plus the aggregates maintained while
/// points are appended.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackModel {
    segments: Vec<TrackSegment>,
    bbox: BoundingBox,
    has_timestamps: bool,
    num_points: usize,
}

impl Default for TrackModel {
    fn default() -> Self {
        Self {
            segments: Vec::new(),
            bbox: BoundingBox::inverted(),
            has_timestamps: true,
            num_points: 0,
        }
    }
}

impl TrackModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new, empty segment; following points are appended to it.
    pub fn open_segment(&mut self) {
        debug!("track segment start");
        self.segments.push(TrackSegment::default());
    }

    /// Append a point to the most recently opened segment.
    ///
    /// Timestamp availability is checked one point behind: only the previous
    /// point of the same segment is inspected, so the last point of a segment
    /// never disproves `has_timestamps`.
    pub fn push_point(&mut self, point: TrackPoint) -> Result<(), ParseError> {
        let segment = self
            .segments
            .last_mut()
            .ok_or_else(|| ParseError::Structure("track point outside of a segment".into()))?;
        if self.has_timestamps {
            if let Some(previous) = segment.points.last() {
                if previous.time.is_none() {
                    self.has_timestamps = false;
                }
            }
        }
        self.bbox.extend(point.lon, point.lat);
        segment.points.push(point);
        self.num_points += 1;
        Ok(())
    }

    pub fn segments(&self) -> &[TrackSegment] {
        &self.segments
    }

    /// All points of all segments in file order.
    pub fn points(&self) -> impl Iterator<Item = &TrackPoint> + '_ {
        self.segments.iter().flat_map(|segment| segment.points.iter())
    }

    pub fn has_timestamps(&self) -> bool {
        self.has_timestamps
    }

    pub fn num_points(&self) -> usize {
        self.num_points
    }

    pub fn is_empty(&self) -> bool {
        self.num_points == 0
    }

    pub fn bounding_box(&self) -> Result<BoundingBox, EmptyTrackError> {
        if self.is_empty() {
            return Err(EmptyTrackError);
        }
        Ok(self.bbox)
    }
}
