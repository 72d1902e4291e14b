use crate::report::Item;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};

const HEADER: [&str; 10] = [
    "Event ID",
    "Serial",
    "Date/time",
    "Last",
    "Canceled",
    "Warning",
    "Hypocenter",
    "Depth",
    "Magnitude",
    "Max intensity",
];

fn flag(value: bool) -> &'static str {
    if value {
        "✔"
    } else {
        ""
    }
}

pub fn render(items: &[Item]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(HEADER);

    for item in items {
        table.add_row(vec![
            item.event_id.clone(),
            item.serial.to_string(),
            item.date_time.clone(),
            flag(item.is_last_info).to_string(),
            flag(item.is_canceled).to_string(),
            flag(item.is_warning).to_string(),
            item.hypocenter_name().unwrap_or("-").to_string(),
            item.depth_text().unwrap_or_else(|| "-".into()),
            item.magnitude_text().unwrap_or("-").to_string(),
            item.max_intensity_text().unwrap_or_else(|| "-".into()),
        ]);
        if !item.text.is_empty() {
            table.add_row(vec![String::new(), item.text.clone()]);
        }
    }
    table
}
