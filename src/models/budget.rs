//! Defines the `Budget` entity: a monthly spending cap for one category,
//! with an alert threshold and the channels the alert goes out on.

use crate::{
    Error,
    record::{Record, RecordId, Reference},
    repository::Entity,
};

/// The alert threshold (percent of the monthly limit) used when a budget
/// does not declare one.
pub const DEFAULT_ALERT_THRESHOLD: f64 = 80.0;

/// The alert channels used when a budget does not declare any.
pub fn default_alert_methods() -> Vec<String> {
    vec!["email".to_owned(), "push".to_owned()]
}

/// A monthly spending cap for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    /// The identifier assigned by the remote store.
    pub id: RecordId,
    /// The category this budget caps.
    pub category: Reference,
    /// The spending cap for the month.
    pub monthly_limit: f64,
    /// The amount spent so far.
    pub spent: f64,
    /// The month the budget applies to, e.g. "2024-01".
    pub month: String,
    /// The percentage of the limit at which the user is alerted.
    pub alert_threshold: f64,
    /// The channels the alert goes out on, in preference order.
    pub alert_methods: Vec<String>,
}

/// The input for creating a budget. Omitted optional fields receive the
/// documented defaults: `spent` 0, `alert_threshold`
/// [DEFAULT_ALERT_THRESHOLD], `alert_methods` [default_alert_methods].
#[derive(Debug, Clone)]
pub struct NewBudget {
    /// The category to cap.
    pub category: Reference,
    /// The spending cap for the month.
    pub monthly_limit: f64,
    /// The amount already spent, if any.
    pub spent: Option<f64>,
    /// The month the budget applies to.
    pub month: String,
    /// The alert threshold, if different from the default.
    pub alert_threshold: Option<f64>,
    /// The alert channels, if different from the default.
    pub alert_methods: Option<Vec<String>>,
}

/// A partial update to a budget. Only `Some` fields are sent to the store.
#[derive(Debug, Clone, Default)]
pub struct BudgetPatch {
    /// Change the category the budget caps.
    pub category: Option<Reference>,
    /// Change the spending cap.
    pub monthly_limit: Option<f64>,
    /// Change the amount spent so far.
    pub spent: Option<f64>,
    /// Change the month the budget applies to.
    pub month: Option<String>,
    /// Change the alert threshold.
    pub alert_threshold: Option<f64>,
    /// Change the alert channels.
    pub alert_methods: Option<Vec<String>>,
}

impl Entity for Budget {
    const TABLE: &'static str = "budget_c";

    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Name",
        "monthly_limit_c",
        "spent_c",
        "month_c",
        "alert_threshold_c",
        "alert_methods_c",
        "category_c",
    ];

    type Draft = NewBudget;
    type Patch = BudgetPatch;

    fn from_record(record: &Record) -> Result<Self, Error> {
        Ok(Self {
            id: record.id().ok_or(Error::MalformedField("Id"))?,
            category: record
                .reference("category_c")
                .ok_or(Error::MalformedField("category_c"))?,
            monthly_limit: record
                .number("monthly_limit_c")
                .ok_or(Error::MalformedField("monthly_limit_c"))?,
            spent: record
                .number("spent_c")
                .ok_or(Error::MalformedField("spent_c"))?,
            month: record
                .text("month_c")
                .ok_or(Error::MalformedField("month_c"))?
                .to_owned(),
            alert_threshold: record
                .number("alert_threshold_c")
                .unwrap_or(DEFAULT_ALERT_THRESHOLD),
            alert_methods: match record.text("alert_methods_c") {
                Some(methods) if !methods.is_empty() => parse_alert_methods(methods),
                _ => default_alert_methods(),
            },
        })
    }

    fn create_record(draft: &NewBudget) -> Record {
        let mut record = Record::new();
        record.set("Name", format!("{} Budget", draft.category));
        record.set("monthly_limit_c", draft.monthly_limit);
        record.set("spent_c", draft.spent.unwrap_or(0.0));
        record.set("month_c", draft.month.as_str());
        record.set(
            "alert_threshold_c",
            draft.alert_threshold.unwrap_or(DEFAULT_ALERT_THRESHOLD),
        );
        record.set(
            "alert_methods_c",
            join_alert_methods(
                draft
                    .alert_methods
                    .as_deref()
                    .unwrap_or(&default_alert_methods()),
            ),
        );
        record.set("category_c", draft.category.to_value());

        record
    }

    fn patch_record(id: RecordId, patch: &BudgetPatch) -> Record {
        let mut record = Record::new();
        record.set("Id", id);
        record.set_if_some("monthly_limit_c", patch.monthly_limit);
        record.set_if_some("spent_c", patch.spent);
        record.set_if_some("month_c", patch.month.as_deref());
        record.set_if_some("alert_threshold_c", patch.alert_threshold);
        record.set_if_some(
            "alert_methods_c",
            patch.alert_methods.as_deref().map(join_alert_methods),
        );
        record.set_if_some("category_c", patch.category.as_ref().map(Reference::to_value));

        record
    }
}

// The store holds the channels as one comma-delimited string.
fn parse_alert_methods(text: &str) -> Vec<String> {
    text.split(',').map(ToOwned::to_owned).collect()
}

fn join_alert_methods(methods: &[String]) -> String {
    methods.join(",")
}

#[cfg(test)]
mod budget_tests {
    use serde_json::json;

    use crate::{record::Reference, repository::Entity};

    use super::{Budget, BudgetPatch, DEFAULT_ALERT_THRESHOLD, NewBudget, default_alert_methods};

    fn stored_budget() -> crate::record::Record {
        serde_json::from_value(json!({
            "Id": 3,
            "Name": "Groceries Budget",
            "monthly_limit_c": 500.0,
            "spent_c": 120.0,
            "month_c": "2024-01",
            "category_c": { "Id": 7, "Name": "Groceries" },
        }))
        .unwrap()
    }

    #[test]
    fn missing_optional_columns_read_back_as_defaults() {
        let budget = Budget::from_record(&stored_budget()).unwrap();

        assert_eq!(budget.alert_threshold, DEFAULT_ALERT_THRESHOLD);
        assert_eq!(budget.alert_methods, default_alert_methods());
    }

    #[test]
    fn alert_methods_keep_their_order() {
        let mut record = stored_budget();
        record.set("alert_methods_c", "sms,push,email");

        let budget = Budget::from_record(&record).unwrap();

        assert_eq!(budget.alert_methods, vec!["sms", "push", "email"]);
    }

    #[test]
    fn missing_required_column_fails_closed() {
        let record: crate::record::Record = serde_json::from_value(json!({
            "Id": 3,
            "month_c": "2024-01",
        }))
        .unwrap();

        assert!(Budget::from_record(&record).is_err());
    }

    #[test]
    fn create_record_synthesizes_display_name_and_defaults() {
        let draft = NewBudget {
            category: Reference::Named("Groceries".to_owned()),
            monthly_limit: 500.0,
            spent: None,
            month: "2024-01".to_owned(),
            alert_threshold: None,
            alert_methods: None,
        };

        let record = Budget::create_record(&draft);

        assert_eq!(record.text("Name"), Some("Groceries Budget"));
        assert_eq!(record.number("spent_c"), Some(0.0));
        assert_eq!(
            record.number("alert_threshold_c"),
            Some(DEFAULT_ALERT_THRESHOLD)
        );
        assert_eq!(record.text("alert_methods_c"), Some("email,push"));
        assert_eq!(record.text("category_c"), Some("Groceries"));
    }

    #[test]
    fn patch_record_contains_only_provided_fields() {
        let patch = BudgetPatch {
            spent: Some(250.0),
            ..BudgetPatch::default()
        };

        let record = Budget::patch_record(3, &patch);

        assert_eq!(record.id(), Some(3));
        assert_eq!(record.number("spent_c"), Some(250.0));
        assert_eq!(record.get("monthly_limit_c"), None);
        assert_eq!(record.get("month_c"), None);
        assert_eq!(record.get("alert_methods_c"), None);
        assert_eq!(record.get("category_c"), None);
    }
}
