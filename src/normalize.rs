use std::collections::HashMap;

use tracing::{debug, instrument};

use crate::error::Result;
use crate::model::{Source, Table};

const FACEBOOK_COLUMNS: &[(&str, &str)] = &[
    ("name", "company_name"),
    ("domain", "domain_name"),
    ("categories", "category"),
    ("phone", "phone_number"),
    ("country_name", "country"),
    ("region_name", "region"),
];

const GOOGLE_COLUMNS: &[(&str, &str)] = &[
    ("name", "company_name"),
    ("domain", "domain_name"),
    ("category", "category"),
    ("phone", "phone_number"),
    ("country_name", "country"),
    ("region_name", "region"),
];

const WEBSITE_COLUMNS: &[(&str, &str)] = &[
    ("site_name", "company_name"),
    ("root_domain", "domain_name"),
    ("s_category", "category"),
    ("phone", "phone_number"),
    ("main_country", "country"),
    ("main_region", "region"),
    ("main_city", "city"),
];

/// Source-specific column name → common schema name.
pub fn column_mapping(source: Source) -> &'static [(&'static str, &'static str)] {
    match source {
        Source::Facebook => FACEBOOK_COLUMNS,
        Source::Google => GOOGLE_COLUMNS,
        Source::Website => WEBSITE_COLUMNS,
    }
}

/// Renames the source's columns onto the common schema. Columns outside the
/// mapping are kept as they are, so normalising twice is a no-op.
#[instrument(level = "debug", skip(table), fields(columns = table.columns.len()))]
pub fn normalize(table: Table, source: Source) -> Table {
    let mapping: HashMap<&str, &str> = column_mapping(source).iter().copied().collect();
    let renamed = table
        .columns
        .iter()
        .filter(|column| {
            matches!(mapping.get(column.as_str()), Some(target) if *target != column.as_str())
        })
        .count();
    debug!(renamed, "columns mapped onto the common schema");
    table.rename_columns(&mapping)
}

/// Same as [`normalize`] for a textual source tag. Tags other than
/// `facebook`, `google` and `website` are rejected.
pub fn normalize_named(table: Table, source: &str) -> Result<Table> {
    let source = source.parse::<Source>()?;
    Ok(normalize(table, source))
}
