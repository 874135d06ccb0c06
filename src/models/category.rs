//! Defines the `Category` entity: a label for incomes and expenses, e.g.
//! 'Groceries' or 'Wages', with the icon and color the UI renders it with.

use crate::{
    Error,
    models::display_name,
    record::{Record, RecordId},
    repository::Entity,
};

/// The storage column holding the income/expense discriminator, for use
/// with filtered listing.
pub const KIND_COLUMN: &str = "type_c";

/// A label for incomes and expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// The identifier assigned by the remote store.
    pub id: RecordId,
    /// The display name, e.g. "Groceries".
    pub name: String,
    /// The discriminator, e.g. "income" or "expense".
    pub kind: String,
    /// The icon the UI renders for the category.
    pub icon: String,
    /// The color the UI renders the category in.
    pub color: String,
}

/// The input for creating a category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    /// The display name.
    pub name: String,
    /// The discriminator, e.g. "income" or "expense".
    pub kind: String,
    /// The icon the UI renders for the category.
    pub icon: String,
    /// The color the UI renders the category in.
    pub color: String,
}

/// A partial update to a category. Only `Some` fields are sent to the store.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    /// Change the display name.
    pub name: Option<String>,
    /// Change the discriminator.
    pub kind: Option<String>,
    /// Change the icon.
    pub icon: Option<String>,
    /// Change the color.
    pub color: Option<String>,
}

impl Entity for Category {
    const TABLE: &'static str = "category_c";

    const FIELDS: &'static [&'static str] =
        &["Id", "Name", "name_c", "type_c", "icon_c", "color_c"];

    type Draft = NewCategory;
    type Patch = CategoryPatch;

    fn from_record(record: &Record) -> Result<Self, Error> {
        Ok(Self {
            id: record.id().ok_or(Error::MalformedField("Id"))?,
            name: display_name(record, "name_c")?,
            kind: record
                .text("type_c")
                .ok_or(Error::MalformedField("type_c"))?
                .to_owned(),
            icon: record
                .text("icon_c")
                .ok_or(Error::MalformedField("icon_c"))?
                .to_owned(),
            color: record
                .text("color_c")
                .ok_or(Error::MalformedField("color_c"))?
                .to_owned(),
        })
    }

    fn create_record(draft: &NewCategory) -> Record {
        let mut record = Record::new();
        record.set("Name", draft.name.as_str());
        record.set("name_c", draft.name.as_str());
        record.set("type_c", draft.kind.as_str());
        record.set("icon_c", draft.icon.as_str());
        record.set("color_c", draft.color.as_str());

        record
    }

    fn patch_record(id: RecordId, patch: &CategoryPatch) -> Record {
        let mut record = Record::new();
        record.set("Id", id);
        // The display name is mirrored into the system column on rename.
        record.set_if_some("Name", patch.name.as_deref());
        record.set_if_some("name_c", patch.name.as_deref());
        record.set_if_some("type_c", patch.kind.as_deref());
        record.set_if_some("icon_c", patch.icon.as_deref());
        record.set_if_some("color_c", patch.color.as_deref());

        record
    }
}

#[cfg(test)]
mod category_tests {
    use serde_json::json;

    use crate::{record::Record, repository::Entity};

    use super::Category;

    fn record_from(value: serde_json::Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn name_prefers_the_custom_column() {
        let record = record_from(json!({
            "Id": 1,
            "Name": "groceries (old)",
            "name_c": "Groceries",
            "type_c": "expense",
            "icon_c": "cart",
            "color_c": "#00AA55",
        }));

        let category = Category::from_record(&record).unwrap();

        assert_eq!(category.name, "Groceries");
    }

    #[test]
    fn name_falls_back_to_the_system_column() {
        let record = record_from(json!({
            "Id": 1,
            "Name": "Groceries",
            "name_c": "",
            "type_c": "expense",
            "icon_c": "cart",
            "color_c": "#00AA55",
        }));

        let category = Category::from_record(&record).unwrap();

        assert_eq!(category.name, "Groceries");
    }

    #[test]
    fn record_without_any_name_fails_closed() {
        let record = record_from(json!({
            "Id": 1,
            "type_c": "expense",
            "icon_c": "cart",
            "color_c": "#00AA55",
        }));

        assert!(Category::from_record(&record).is_err());
    }
}
