//! Defines the `Transaction` entity: one income or expense event, listed
//! newest first by default.

use time::Date;

use crate::{
    Error,
    models::{format_date, parse_date},
    record::{Record, RecordId, Reference},
    repository::Entity,
};

use crate::remote::{SortDirection, SortKey};

/// One income or expense event.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The identifier assigned by the remote store.
    pub id: RecordId,
    /// The discriminator, e.g. "income" or "expense".
    pub kind: String,
    /// The amount of money involved.
    pub amount: f64,
    /// The category of the transaction.
    pub category: Reference,
    /// The date the transaction happened.
    pub date: Date,
    /// A free-form note; empty when none was given.
    pub description: String,
}

/// The input for creating a transaction. An omitted description defaults to
/// the empty string.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// The discriminator, e.g. "income" or "expense".
    pub kind: String,
    /// The amount of money involved.
    pub amount: f64,
    /// The category of the transaction.
    pub category: Reference,
    /// The date the transaction happened.
    pub date: Date,
    /// A free-form note, if any.
    pub description: Option<String>,
}

/// A partial update to a transaction. Only `Some` fields are sent to the
/// store.
#[derive(Debug, Clone, Default)]
pub struct TransactionPatch {
    /// Change the discriminator.
    pub kind: Option<String>,
    /// Change the amount.
    pub amount: Option<f64>,
    /// Change the category.
    pub category: Option<Reference>,
    /// Change the date.
    pub date: Option<Date>,
    /// Change the note.
    pub description: Option<String>,
}

impl Entity for Transaction {
    const TABLE: &'static str = "transaction_c";

    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Name",
        "type_c",
        "amount_c",
        "date_c",
        "description_c",
        "category_c",
    ];

    const SORT: Option<SortKey> = Some(SortKey {
        column: "date_c",
        direction: SortDirection::Descending,
    });

    type Draft = NewTransaction;
    type Patch = TransactionPatch;

    fn from_record(record: &Record) -> Result<Self, Error> {
        Ok(Self {
            id: record.id().ok_or(Error::MalformedField("Id"))?,
            kind: record
                .text("type_c")
                .ok_or(Error::MalformedField("type_c"))?
                .to_owned(),
            amount: record
                .number("amount_c")
                .ok_or(Error::MalformedField("amount_c"))?,
            category: record
                .reference("category_c")
                .ok_or(Error::MalformedField("category_c"))?,
            date: parse_date(record, "date_c")?,
            description: record.text("description_c").unwrap_or_default().to_owned(),
        })
    }

    fn create_record(draft: &NewTransaction) -> Record {
        let mut record = Record::new();
        record.set("Name", format!("{} - {}", draft.kind, draft.amount));
        record.set("type_c", draft.kind.as_str());
        record.set("amount_c", draft.amount);
        record.set("category_c", draft.category.to_value());
        record.set("date_c", format_date(draft.date));
        record.set("description_c", draft.description.as_deref().unwrap_or(""));

        record
    }

    fn patch_record(id: RecordId, patch: &TransactionPatch) -> Record {
        let mut record = Record::new();
        record.set("Id", id);
        // The display name derives from the kind and amount, so it can only
        // be refreshed when both are part of the patch.
        if let (Some(kind), Some(amount)) = (&patch.kind, patch.amount) {
            record.set("Name", format!("{kind} - {amount}"));
        }
        record.set_if_some("type_c", patch.kind.as_deref());
        record.set_if_some("amount_c", patch.amount);
        record.set_if_some("category_c", patch.category.as_ref().map(Reference::to_value));
        record.set_if_some("date_c", patch.date.map(format_date));
        record.set_if_some("description_c", patch.description.as_deref());

        record
    }
}

#[cfg(test)]
mod transaction_tests {
    use serde_json::json;
    use time::macros::date;

    use crate::{record::Reference, repository::Entity};

    use super::{NewTransaction, Transaction, TransactionPatch};

    fn sample_draft() -> NewTransaction {
        NewTransaction {
            kind: "expense".to_owned(),
            amount: 42.5,
            category: Reference::Id(7),
            date: date!(2024 - 01 - 15),
            description: None,
        }
    }

    #[test]
    fn create_record_defaults_description_to_empty() {
        let record = Transaction::create_record(&sample_draft());

        assert_eq!(record.text("description_c"), Some(""));
        assert_eq!(record.text("Name"), Some("expense - 42.5"));
        assert_eq!(record.get("category_c"), Some(&json!(7)));
    }

    #[test]
    fn missing_description_reads_back_as_empty() {
        let record: crate::record::Record = serde_json::from_value(json!({
            "Id": 5,
            "type_c": "expense",
            "amount_c": 42.5,
            "category_c": { "Id": 7, "Name": "Groceries" },
            "date_c": "2024-01-15",
        }))
        .unwrap();

        let transaction = Transaction::from_record(&record).unwrap();

        assert_eq!(transaction.description, "");
        assert_eq!(
            transaction.category,
            Reference::Named("Groceries".to_owned())
        );
    }

    #[test]
    fn patch_without_amount_does_not_touch_display_name() {
        let patch = TransactionPatch {
            kind: Some("income".to_owned()),
            ..TransactionPatch::default()
        };

        let record = Transaction::patch_record(5, &patch);

        assert_eq!(record.get("Name"), None);
        assert_eq!(record.text("type_c"), Some("income"));
    }

    #[test]
    fn patch_with_kind_and_amount_refreshes_display_name() {
        let patch = TransactionPatch {
            kind: Some("income".to_owned()),
            amount: Some(99.0),
            ..TransactionPatch::default()
        };

        let record = Transaction::patch_record(5, &patch);

        assert_eq!(record.text("Name"), Some("income - 99"));
    }
}
