use std::fmt;

use serde::Serialize;

/// Trip metrics for one track. Distances are metres, durations seconds,
/// speeds metres per second and timestamps epoch seconds. Metrics that cannot
/// be derived (no timestamps, zero duration) are `None` and left out of the
/// serialized form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub length: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movetime: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movelength: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movespeed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxspeed: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starttime: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endtime: Option<i64>,
}

fn km(metres: f64) -> f64 {
    metres / 1000.0
}

fn kmh(metres_per_second: f64) -> f64 {
    metres_per_second * 3.6
}

struct Hms(i64);

impl fmt::Display for Hms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let secs = self.0.unsigned_abs();
        write!(f, "{sign}{}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
    }
}

/// One-line summary, e.g. `12.34 km, 1:02:03, 11.9 km/h (moving 1:00:00, 12.3 km/h), max 25.0 km/h`.
impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} km", km(self.length))?;
        if let Some(time) = self.time {
            write!(f, ", {}", Hms(time))?;
        }
        if let Some(speed) = self.speed {
            write!(f, ", {:.1} km/h", kmh(speed))?;
        }
        match (self.movetime, self.movespeed) {
            (Some(movetime), Some(movespeed)) => {
                write!(f, " (moving {}, {:.1} km/h)", Hms(movetime), kmh(movespeed))?
            }
            (Some(movetime), None) => write!(f, " (moving {})", Hms(movetime))?,
            _ => {}
        }
        if let Some(maxspeed) = self.maxspeed {
            write!(f, ", max {:.1} km/h", kmh(maxspeed))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_only_summary() {
        let stats = Statistics {
            length: 1234.0,
            ..Default::default()
        };
        assert_eq!(stats.to_string(), "1.23 km");
        assert_eq!(serde_json::to_string(&stats).unwrap(), r#"{"length":1234.0}"#);
    }

    #[test]
    fn timed_summary() {
        let stats = Statistics {
            length: 12_340.0,
            time: Some(3723),
            speed: Some(12_340.0 / 3723.0),
            movetime: Some(3600),
            movelength: Some(12_340.0),
            movespeed: Some(12_340.0 / 3600.0),
            maxspeed: Some(10.0),
            starttime: Some(0),
            endtime: Some(3723),
        };
        assert_eq!(
            stats.to_string(),
            "12.34 km, 1:02:03, 11.9 km/h (moving 1:00:00, 12.3 km/h), max 36.0 km/h"
        );
    }
}
