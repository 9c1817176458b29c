use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::{debug, info, instrument};

use super::time::parse_timestamp;
use crate::error::ParseError;
use crate::types::track::{TrackModel, TrackPoint};

/// Attribute lookup for an element start, independent of the XML reader.
pub trait AttributeSource {
    /// Value of the attribute whose local name is `name`, if present.
    fn attribute(&self, name: &str) -> Result<Option<String>, ParseError>;
}

impl AttributeSource for BytesStart<'_> {
    fn attribute(&self, name: &str) -> Result<Option<String>, ParseError> {
        for attr in self.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            if attr.key.local_name().as_ref() == name.as_bytes() {
                let value = std::str::from_utf8(&attr.value).map_err(quick_xml::Error::from)?;
                let value = quick_xml::escape::unescape(value).map_err(quick_xml::Error::from)?;
                return Ok(Some(value.into_owned()));
            }
        }
        Ok(None)
    }
}

impl AttributeSource for [(&str, &str)] {
    fn attribute(&self, name: &str) -> Result<Option<String>, ParseError> {
        Ok(self
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    OutsideTrack,
    InTrack,
    InSegment,
    InPoint,
    InTime,
}

/// Event-driven track reader. Feed it element starts, text and element ends
/// in document order, then call [`TrackBuilder::close`].
///
/// Elements are matched by local name. Anything the builder does not know
/// about inside a track is skipped along with its children.
#[derive(Debug)]
pub struct TrackBuilder {
    model: TrackModel,
    state: State,
    // depth inside an ignored element
    skip: usize,
    pending: Option<TrackPoint>,
    time_text: String,
}

impl Default for TrackBuilder {
    fn default() -> Self {
        Self {
            model: TrackModel::new(),
            state: State::OutsideTrack,
            skip: 0,
            pending: None,
            time_text: String::new(),
        }
    }
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start<A>(&mut self, tag: &str, attrs: &A) -> Result<(), ParseError>
    where
        A: AttributeSource + ?Sized,
    {
        if self.skip > 0 {
            self.skip += 1;
            return Ok(());
        }
        match (self.state, tag) {
            (State::OutsideTrack, "trk") => {
                debug!("track start");
                self.state = State::InTrack;
            }
            (State::OutsideTrack, "trkseg" | "trkpt") | (State::InTrack, "trkpt") => {
                return Err(ParseError::Structure(format!(
                    "<{tag}> outside of {}",
                    if tag == "trkseg" { "a track" } else { "a track segment" }
                )));
            }
            (State::OutsideTrack, _) => {}
            (State::InTrack, "trkseg") => {
                self.model.open_segment();
                self.state = State::InSegment;
            }
            (State::InTrack | State::InSegment, "trk") | (State::InSegment, "trkseg") => {
                return Err(ParseError::Structure(format!("nested <{tag}>")));
            }
            (State::InSegment, "trkpt") => {
                self.pending = Some(TrackPoint::new(
                    coordinate(attrs, "lon", 180.0)?,
                    coordinate(attrs, "lat", 90.0)?,
                ));
                self.state = State::InPoint;
            }
            (State::InPoint, "time") => {
                self.time_text.clear();
                self.state = State::InTime;
            }
            _ => self.skip = 1,
        }
        Ok(())
    }

    /// Whether the next text event is part of a value the builder keeps.
    /// Other text can be skipped without decoding it.
    pub fn wants_text(&self) -> bool {
        self.skip == 0 && self.state == State::InTime
    }

    pub fn text(&mut self, text: &str) -> Result<(), ParseError> {
        if self.wants_text() {
            self.time_text.push_str(text);
        }
        Ok(())
    }

    pub fn end(&mut self, tag: &str) -> Result<(), ParseError> {
        if self.skip > 0 {
            self.skip -= 1;
            return Ok(());
        }
        match (self.state, tag) {
            (State::InTime, "time") => {
                let time = parse_timestamp(&self.time_text)?;
                if let Some(point) = self.pending.as_mut() {
                    point.time = Some(time);
                }
                self.state = State::InPoint;
            }
            (State::InPoint, "trkpt") => {
                if let Some(point) = self.pending.take() {
                    self.model.push_point(point)?;
                }
                self.state = State::InSegment;
            }
            (State::InSegment, "trkseg") => {
                debug!("track segment end");
                self.state = State::InTrack;
            }
            (State::InTrack, "trk") => {
                debug!("track end");
                self.state = State::OutsideTrack;
            }
            _ => {}
        }
        Ok(())
    }

    /// Finish the document. An empty model is not an error here.
    pub fn close(self) -> Result<TrackModel, ParseError> {
        if self.state != State::OutsideTrack {
            return Err(ParseError::Structure(format!(
                "document ended inside a track ({:?})",
                self.state
            )));
        }
        info!("finished reading track, {} points found", self.model.num_points());
        Ok(self.model)
    }
}

fn coordinate<A>(attrs: &A, name: &'static str, limit: f64) -> Result<f64, ParseError>
where
    A: AttributeSource + ?Sized,
{
    let raw = attrs
        .attribute(name)?
        .ok_or(ParseError::MissingAttribute(name))?;
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| ParseError::InvalidCoordinate {
            attribute: name,
            value: raw.clone(),
        })?;
    if !value.is_finite() {
        return Err(ParseError::InvalidCoordinate {
            attribute: name,
            value: raw,
        });
    }
    if value.abs() > limit {
        return Err(ParseError::CoordinateOutOfRange {
            attribute: name,
            value,
        });
    }
    Ok(value)
}

fn local_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

/// Read a GPX document from `input` in a single streaming pass.
#[instrument(skip_all)]
pub fn parse<R: BufRead>(input: R) -> Result<TrackModel, ParseError> {
    info!("reading gpx track");
    let mut reader = Reader::from_reader(input);
    reader.trim_text(true);
    let mut builder = TrackBuilder::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Err(source) => {
                return Err(ParseError::Xml {
                    position: reader.buffer_position(),
                    source,
                })
            }
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => builder.start(&local_name(&e), &e)?,
            Ok(Event::Empty(e)) => {
                let tag = local_name(&e);
                builder.start(&tag, &e)?;
                builder.end(&tag)?;
            }
            Ok(Event::End(e)) => {
                builder.end(&String::from_utf8_lossy(e.local_name().as_ref()))?
            }
            Ok(Event::Text(e)) if builder.wants_text() => builder.text(&e.unescape()?)?,
            Ok(Event::CData(e)) if builder.wants_text() => builder.text(&reader.decoder().decode(&e)?)?,
            Ok(_) => {}
        }
        buf.clear();
    }
    builder.close()
}

#[instrument]
pub fn parse_file(path: &Path) -> Result<TrackModel, ParseError> {
    parse(BufReader::new(File::open(path)?))
}
