use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Intensity {
    pub forecast_max_int: MaxIntensity,
}

#[derive(Clone, Debug, Serialize, Deserialize, Eq, PartialEq)]
pub struct MaxIntensity {
    pub from: String,
    pub to: String,
}

impl Intensity {
    pub fn range_text(&self) -> String {
        let MaxIntensity { from, to } = &self.forecast_max_int;
        if from == to {
            from.to_owned()
        } else {
            format!("{from}~{to}")
        }
    }
}
