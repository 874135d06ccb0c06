//! Defines the `SavingsGoal` entity: a target amount to save towards by a
//! deadline.

use time::Date;

use crate::{
    Error,
    models::{display_name, format_date, parse_date},
    record::{Record, RecordId},
    repository::Entity,
};

/// A target amount to save towards by a deadline.
#[derive(Debug, Clone, PartialEq)]
pub struct SavingsGoal {
    /// The identifier assigned by the remote store.
    pub id: RecordId,
    /// The display name, e.g. "Emergency fund".
    pub name: String,
    /// The amount to save.
    pub target_amount: f64,
    /// The amount saved so far.
    pub current_amount: f64,
    /// The date the goal should be reached by.
    pub deadline: Date,
}

/// The input for creating a savings goal.
#[derive(Debug, Clone)]
pub struct NewSavingsGoal {
    /// The display name.
    pub name: String,
    /// The amount to save.
    pub target_amount: f64,
    /// The amount already saved.
    pub current_amount: f64,
    /// The date the goal should be reached by.
    pub deadline: Date,
}

/// A partial update to a savings goal. Only `Some` fields are sent to the
/// store.
#[derive(Debug, Clone, Default)]
pub struct SavingsGoalPatch {
    /// Change the display name.
    pub name: Option<String>,
    /// Change the amount to save.
    pub target_amount: Option<f64>,
    /// Change the amount saved so far.
    pub current_amount: Option<f64>,
    /// Change the deadline.
    pub deadline: Option<Date>,
}

impl Entity for SavingsGoal {
    const TABLE: &'static str = "savings_goal_c";

    const FIELDS: &'static [&'static str] = &[
        "Id",
        "Name",
        "name_c",
        "target_amount_c",
        "current_amount_c",
        "deadline_c",
    ];

    type Draft = NewSavingsGoal;
    type Patch = SavingsGoalPatch;

    fn from_record(record: &Record) -> Result<Self, Error> {
        Ok(Self {
            id: record.id().ok_or(Error::MalformedField("Id"))?,
            name: display_name(record, "name_c")?,
            target_amount: record
                .number("target_amount_c")
                .ok_or(Error::MalformedField("target_amount_c"))?,
            current_amount: record
                .number("current_amount_c")
                .ok_or(Error::MalformedField("current_amount_c"))?,
            deadline: parse_date(record, "deadline_c")?,
        })
    }

    fn create_record(draft: &NewSavingsGoal) -> Record {
        let mut record = Record::new();
        record.set("Name", draft.name.as_str());
        record.set("name_c", draft.name.as_str());
        record.set("target_amount_c", draft.target_amount);
        record.set("current_amount_c", draft.current_amount);
        record.set("deadline_c", format_date(draft.deadline));

        record
    }

    fn patch_record(id: RecordId, patch: &SavingsGoalPatch) -> Record {
        let mut record = Record::new();
        record.set("Id", id);
        record.set_if_some("Name", patch.name.as_deref());
        record.set_if_some("name_c", patch.name.as_deref());
        record.set_if_some("target_amount_c", patch.target_amount);
        record.set_if_some("current_amount_c", patch.current_amount);
        record.set_if_some("deadline_c", patch.deadline.map(format_date));

        record
    }
}
