use tracing::{debug, instrument};

use crate::error::EmptyTrackError;
use crate::track_geo::geodesic_distance;
use crate::types::statistics::Statistics;
use crate::types::track::TrackModel;

/// Intervals slower than this (m/s, about 1 km/h) count as standing still.
pub const MIN_MOVING_SPEED: f64 = 0.3;

/// Target duration of the max speed smoothing window, in seconds.
pub const MAXSPEED_WINDOW_SECS: f64 = 5.0;

/// Two consecutive points of a segment with a usable, non-zero time delta.
#[derive(Debug, Clone, Copy)]
struct Interval {
    distance: f64,
    duration: i64,
}

impl Interval {
    fn speed(&self) -> f64 {
        self.distance / self.duration as f64
    }
}

/// Derive trip statistics from a parsed track.
///
/// Only consecutive points inside one segment form an interval. Time based
/// metrics are reported only for tracks that carry timestamps.
#[instrument(skip_all, fields(points = model.num_points()))]
pub fn compute_statistics(model: &TrackModel) -> Result<Statistics, EmptyTrackError> {
    if model.is_empty() {
        return Err(EmptyTrackError);
    }

    let mut length = 0.0;
    let mut num_intervals = 0usize;
    let mut timed = Vec::new();
    for segment in model.segments() {
        for pair in segment.points().windows(2) {
            let distance = geodesic_distance(&pair[0], &pair[1]);
            length += distance;
            num_intervals += 1;
            if !model.has_timestamps() {
                continue;
            }
            match (pair[0].time, pair[1].time) {
                (Some(t1), Some(t2)) if t2 != t1 => timed.push(Interval {
                    distance,
                    duration: t2 - t1,
                }),
                _ => {}
            }
        }
    }
    debug!(num_intervals, timed = timed.len(), "collected intervals");

    let mut stats = Statistics {
        length,
        ..Default::default()
    };
    if num_intervals == 0 || !model.has_timestamps() {
        return Ok(stats);
    }

    let time: i64 = timed.iter().map(|i| i.duration).sum();
    let (movelength, movetime) = timed
        .iter()
        .filter(|i| i.speed() > MIN_MOVING_SPEED)
        .fold((0.0, 0i64), |(d, t), i| (d + i.distance, t + i.duration));

    stats.time = Some(time);
    stats.speed = (time != 0).then(|| length / time as f64);
    stats.movetime = Some(movetime);
    stats.movelength = Some(movelength);
    stats.movespeed = (movetime != 0).then(|| movelength / movetime as f64);
    stats.maxspeed = smoothed_max_speed(&timed);
    stats.starttime = model.points().next().and_then(|p| p.time);
    stats.endtime = model.points().last().and_then(|p| p.time);
    Ok(stats)
}

/// Highest average speed over a fixed number of consecutive intervals.
///
/// The window width is derived once, from the first interval, so that it
/// spans roughly [`MAXSPEED_WINDOW_SECS`]; it is not adjusted as the window
/// slides.
fn smoothed_max_speed(intervals: &[Interval]) -> Option<f64> {
    let first = intervals.first()?;
    let npnt = (MAXSPEED_WINDOW_SECS / first.duration as f64).ceil();
    let npnt = if npnt >= 1.0 {
        (npnt as usize).min(intervals.len())
    } else {
        1
    };
    debug!(npnt, "max speed window");

    intervals
        .windows(npnt)
        .filter_map(|window| {
            let (distance, duration) = window
                .iter()
                .fold((0.0, 0i64), |(d, t), i| (d + i.distance, t + i.duration));
            (duration > 0).then(|| distance / duration as f64)
        })
        .reduce(f64::max)
}
