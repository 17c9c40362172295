use tracing::{debug, instrument};

use crate::error::Result;
use crate::model::Table;

const STAGE: &str = "cleaning field values";

/// Cleans a normalised table and returns the result:
///
/// 1. missing phone numbers become empty strings,
/// 2. phone numbers keep their ASCII digits only,
/// 3. company names are lowercased,
/// 4. every remaining missing cell becomes an empty string.
///
/// Fails when `phone_number` or `company_name` is absent.
#[instrument(level = "debug", skip_all, fields(rows = table.len()))]
pub fn clean(table: Table) -> Result<Table> {
    let phone = table.require_column("phone_number", STAGE)?;
    let name = table.require_column("company_name", STAGE)?;

    let mut changed_phones = 0usize;
    let table = table
        .map_column(phone, |cell| {
            let raw = cell.unwrap_or_default();
            let digits = digits_only(&raw);
            if digits.len() != raw.len() {
                changed_phones += 1;
            }
            Some(digits)
        })
        .map_column(name, |cell| cell.map(|value| value.to_lowercase()))
        .fill_missing();

    debug!(changed_phones, "phone numbers reduced to digits");
    Ok(table)
}

/// Strips every character that is not an ASCII digit. Country prefixes,
/// punctuation and extensions are all discarded.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}
