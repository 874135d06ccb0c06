//! Defines the four domain entities and their repository configurations.
//!
//! Each entity declares its remote table, the mapping between domain fields
//! and storage columns, and the defaults applied to optional fields. Dates
//! travel on the wire as `YYYY-MM-DD` strings.

pub mod budget;
pub mod category;
pub mod savings_goal;
pub mod transaction;

pub use budget::{Budget, BudgetPatch, NewBudget};
pub use category::{Category, CategoryPatch, NewCategory};
pub use savings_goal::{NewSavingsGoal, SavingsGoal, SavingsGoalPatch};
pub use transaction::{NewTransaction, Transaction, TransactionPatch};

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use crate::{Error, record::Record};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parse the date stored under `column`, failing closed when the column is
/// missing or malformed.
pub(crate) fn parse_date(record: &Record, column: &'static str) -> Result<Date, Error> {
    let text = record.text(column).ok_or(Error::MalformedField(column))?;

    Date::parse(text, DATE_FORMAT)
        .map_err(|error| Error::InvalidDate(error.to_string(), text.to_owned()))
}

/// Render a date in the store's wire format.
pub(crate) fn format_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// The display name stored under `name_column`, falling back to the system
/// display-name column when the custom column is absent or empty.
pub(crate) fn display_name(record: &Record, name_column: &'static str) -> Result<String, Error> {
    match record.text(name_column) {
        Some(name) if !name.is_empty() => Ok(name.to_owned()),
        _ => record
            .text(crate::record::NAME_COLUMN)
            .map(ToOwned::to_owned)
            .ok_or(Error::MalformedField(name_column)),
    }
}

#[cfg(test)]
mod date_format_tests {
    use time::macros::date;

    use crate::record::Record;

    use super::{format_date, parse_date};

    #[test]
    fn dates_round_trip_through_the_wire_format() {
        let mut record = Record::new();
        record.set("deadline_c", format_date(date!(2024 - 06 - 05)));

        let parsed = parse_date(&record, "deadline_c").unwrap();

        assert_eq!(parsed, date!(2024 - 06 - 05));
    }

    #[test]
    fn malformed_dates_fail_closed() {
        let mut record = Record::new();
        record.set("deadline_c", "sometime next year");

        assert!(parse_date(&record, "deadline_c").is_err());
    }
}
