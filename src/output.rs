// Renders buckets as tables
#![forbid(unsafe_code)]
#![deny(missing_docs)]
use chrono::{
    DateTime,
    Utc,
};
use crate::common::{
    Bucket,
    BucketGroup,
    HumanSize,
    SizeUnit,
    StorageClasses,
};
use tabled::builder::Builder;
use tabled::settings::Style;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MISSING: &str = "-";

/// Format a storage class distribution as `CLASS(12.3%)` entries.
pub fn format_storage_classes(classes: &StorageClasses) -> String {
    classes
        .iter()
        .map(|(class, percent)| format!("{}({:.1}%)", class, percent))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_date(date: Option<DateTime<Utc>>) -> String {
    date.map_or_else(
        || MISSING.to_string(),
        |d| d.format(DATE_FORMAT).to_string(),
    )
}

fn header(unit: &SizeUnit, show_cost: bool) -> Vec<String> {
    let mut header = vec![
        "NAME".to_string(),
        "REGION".to_string(),
        format!("SIZE ({})", unit.label()),
        "FILES".to_string(),
        "STORAGE CLASSES".to_string(),
        "CREATED ON".to_string(),
        "LAST MODIFIED".to_string(),
    ];

    if show_cost {
        header.push("COST".to_string());
    }

    header
}

fn row(bucket: &Bucket, unit: &SizeUnit, show_cost: bool) -> Vec<String> {
    let mut row = vec![
        bucket.name.clone(),
        bucket.region_name().to_string(),
        bucket.size_bytes.humansize(unit),
        bucket.object_count.to_string(),
        format_storage_classes(&bucket.storage_classes),
        format_date(bucket.creation_date),
        format_date(bucket.last_modified),
    ];

    if show_cost {
        let cost = bucket.cost
            .map_or_else(|| MISSING.to_string(), |c| format!("{:.2}", c));

        row.push(cost);
    }

    row
}

/// Render a single table of `buckets`.
pub fn render_table(buckets: &[Bucket], unit: &SizeUnit, show_cost: bool) -> String {
    let mut builder = Builder::default();

    builder.push_record(header(unit, show_cost));

    for bucket in buckets {
        builder.push_record(row(bucket, unit, show_cost));
    }

    builder.build()
        .with(Style::blank())
        .to_string()
}

/// Render every group, each headed by its label when it has one.
pub fn render(groups: &[BucketGroup], unit: &SizeUnit, show_cost: bool) -> String {
    groups
        .iter()
        .map(|(label, buckets)| {
            let table = render_table(buckets, unit, show_cost);

            match label {
                Some(label) => format!("Region: {}\n{}", label, table),
                None        => table,
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
