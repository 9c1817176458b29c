use geojson::JsonObject;
use serde::Serialize;

/// Line style attached to every exported track segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentStyle {
    pub stroke: &'static str,
    #[serde(rename = "stroke-width")]
    pub stroke_width: u32,
    #[serde(rename = "stroke-opacity")]
    pub stroke_opacity: u32,
}

pub const TRACK_STYLE: SegmentStyle = SegmentStyle {
    stroke: "#ff2b00",
    stroke_width: 2,
    stroke_opacity: 1,
};

/// For converting a style to geojson properties
impl From<SegmentStyle> for JsonObject {
    fn from(style: SegmentStyle) -> Self {
        let mut properties = JsonObject::new();
        properties.insert("stroke".into(), style.stroke.into());
        properties.insert("stroke-width".into(), style.stroke_width.into());
        properties.insert("stroke-opacity".into(), style.stroke_opacity.into());
        properties
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn properties_match_serde_names() {
        let properties = JsonObject::from(TRACK_STYLE);
        let serialized = serde_json::to_value(TRACK_STYLE).unwrap();
        assert_eq!(serialized.as_object(), Some(&properties));
        assert_eq!(properties["stroke"], "#ff2b00");
        assert_eq!(properties["stroke-width"], 2);
    }
}
