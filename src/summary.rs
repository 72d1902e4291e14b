use crate::report::Item;
use anyhow::{anyhow, Result};

pub const DEFAULT_FSTRING: &str = "{date_time} {hypocenter} M{magnitude} depth {depth} max {max_intensity}";

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

/// One-line rendering of a report driven by a user format string.
pub struct Summary<'a> {
    item: &'a Item,
}

impl<'a> Summary<'a> {
    pub fn new(item: &'a Item) -> Self {
        Self { item }
    }

    /// Process a user-provided format string e.g. "{event_id} M{magnitude}".
    /// Fields an item doesn't carry render as "-".
    pub fn process_fstring(&self, fstring: &str) -> Result<String> {
        let mut remainder = fstring;
        let mut output = String::new();
        while let Some(start) = remainder.find('{') {
            output.push_str(&remainder[..start]);
            let Some(len) = remainder[start..].find('}') else {
                return Err(anyhow!("{fstring} is not a valid format string"));
            };
            let key = &remainder[start + 1..start + len];
            self.push_value(key, &mut output)?;
            remainder = &remainder[start + len + 1..];
        }
        output.push_str(remainder);
        Ok(output)
    }

    fn push_value(&self, key: &str, output: &mut String) -> Result<()> {
        let item = self.item;
        let earthquake = item.earthquake.as_ref();
        let value = match key {
            "id" => Some(item.id.to_string()),
            "event_id" => Some(item.event_id.clone()),
            "serial" => Some(item.serial.to_string()),
            "date_time" => Some(item.date_time.clone()),
            "text" => Some(item.text.clone()),
            "last_info" => Some(yes_no(item.is_last_info).to_string()),
            "canceled" => Some(yes_no(item.is_canceled).to_string()),
            "warning" => Some(yes_no(item.is_warning).to_string()),
            "arrival_time" => earthquake.map(|eq| eq.arrival_time.clone()),
            "hypocenter" => item.hypocenter_name().map(str::to_string),
            "depth" => item.depth_text(),
            "magnitude" => item.magnitude_text().map(str::to_string),
            "max_intensity" => item.max_intensity_text(),
            "latitude" => earthquake.map(|eq| eq.hypocenter.coordinate.latitude.text.clone()),
            "longitude" => earthquake.map(|eq| eq.hypocenter.coordinate.longitude.text.clone()),
            _ => return Err(anyhow!("{} is not a valid key", key)),
        };
        output.push_str(value.as_deref().unwrap_or("-"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::decode;

    fn sample() -> Vec<Item> {
        decode(include_str!("../tests/data/eew.json")).unwrap().items
    }

    #[test]
    fn renders_known_keys() {
        let items = sample();
        let summary = Summary::new(&items[0]);
        let output = summary
            .process_fstring("#{serial} {hypocenter} M{magnitude} ({warning})")
            .unwrap();
        assert_eq!(output, "#3 石川県能登地方 M7.4 (yes)");
    }

    #[test]
    fn default_fstring() {
        let items = sample();
        let output = Summary::new(&items[0])
            .process_fstring(DEFAULT_FSTRING)
            .unwrap();
        assert_eq!(
            output,
            "2024-01-01T16:10:35+09:00 石川県能登地方 M7.4 depth 10 km max 6+~over"
        );
    }

    #[test]
    fn missing_earthquake_renders_placeholder() {
        let items = sample();
        let output = Summary::new(&items[2])
            .process_fstring("{event_id} {hypocenter} {canceled}")
            .unwrap();
        assert_eq!(output, "20240101160955 - yes");
    }

    #[test]
    fn plain_text_passes_through() {
        let items = sample();
        let output = Summary::new(&items[0]).process_fstring("no keys").unwrap();
        assert_eq!(output, "no keys");
    }

    #[test]
    fn rejects_unknown_key() {
        let items = sample();
        let err = Summary::new(&items[0]).process_fstring("{nope}").unwrap_err();
        assert_eq!(err.to_string(), "nope is not a valid key");
    }

    #[test]
    fn rejects_unterminated_brace() {
        let items = sample();
        assert!(Summary::new(&items[0]).process_fstring("{serial").is_err());
    }
}
