use serde::{Deserialize, Serialize};

// Sub-object values stay as text: the API sends sentinels such as "不明"
// or blanks where a number would otherwise be.

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Earthquake {
    pub arrival_time: String,
    pub hypocenter: Hypocenter,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub magnitude: Option<Magnitude>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Hypocenter {
    pub code: String,
    pub name: String,
    pub coordinate: Coordinate,
    pub depth: Depth,
    pub reduce: Reduce,
    pub accuracy: Accuracy,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Coordinate {
    pub latitude: ValueText,
    pub longitude: ValueText,
    pub height: Height,
}

/// A raw value paired with its human readable rendering, e.g. "37.5" and
/// "北緯37.5度".
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct ValueText {
    pub value: String,
    pub text: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Height {
    pub r#type: String,
    pub unit: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Depth {
    pub r#type: String,
    pub unit: String,
    pub value: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Reduce {
    pub code: String,
    pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Accuracy {
    pub epicenters: Vec<String>,
    pub depth: String,
    pub magnitude_calculation: String,
    pub number_of_magnitude_calculation: String,
}

/// `value` and `condition` are both absent while the magnitude is
/// undetermined.
#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct Magnitude {
    pub r#type: String,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}
