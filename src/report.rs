use crate::earthquake::Earthquake;
use crate::error::FetchError;
use crate::intensity::Intensity;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub response_id: String,
    pub response_time: String,
    pub status: String,
    pub items: Vec<Item>,
}

/// A single EEW report. Several items may share an `event_id`, one per
/// `serial` issued for the event.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub event_id: String,
    pub serial: i64,
    pub date_time: String,
    pub is_last_info: bool,
    pub is_canceled: bool,
    pub is_warning: bool,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earthquake: Option<Earthquake>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intensity: Option<Intensity>,
}

impl Item {
    pub fn hypocenter_name(&self) -> Option<&str> {
        self.earthquake
            .as_ref()
            .map(|eq| eq.hypocenter.name.as_str())
    }

    pub fn depth_text(&self) -> Option<String> {
        self.earthquake.as_ref().map(|eq| {
            let depth = &eq.hypocenter.depth;
            format!("{} {}", depth.value, depth.unit)
        })
    }

    /// The magnitude value, falling back to its condition (e.g. "不明") and
    /// then to "unknown" when neither was sent.
    pub fn magnitude_text(&self) -> Option<&str> {
        let magnitude = self.earthquake.as_ref()?.magnitude.as_ref()?;
        Some(
            magnitude
                .value
                .as_deref()
                .or(magnitude.condition.as_deref())
                .unwrap_or("unknown"),
        )
    }

    pub fn max_intensity_text(&self) -> Option<String> {
        self.intensity.as_ref().map(|i| i.range_text())
    }
}

/// Decode a response body. Any missing required field fails the whole
/// document, as do bytes that aren't valid UTF-8.
pub fn decode(body: impl AsRef<[u8]>) -> Result<Response, FetchError> {
    Ok(serde_json::from_slice(body.as_ref())?)
}
