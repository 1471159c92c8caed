//! Arrow schema of the exploded judgment table.

use arrow::datatypes::{DataType, Field, Schema};

/// Canonical column names of the working table.
pub mod columns {
    pub const ID: &str = "id";
    pub const TITLE: &str = "title";
    pub const THESIS: &str = "thesis";
    pub const SUMMARY: &str = "summary";
    pub const LEGISLATION: &str = "legislation";
    pub const PROCESS_CLASS: &str = "process_class";
    pub const BULLETIN: &str = "bulletin";
    pub const REPERCUSSION: &str = "repercussion";
    pub const JUDGMENT_DATE: &str = "judgment_date";
    pub const YEAR: &str = "year";
    pub const MONTH: &str = "month";
    pub const YEAR_MONTH: &str = "year_month";
    pub const BRANCH: &str = "branch";
    pub const AREA: &str = "area";
}

/// Schema for the exploded working table: one row per (judgment × branch).
///
/// Every column is non-nullable. Missing text becomes an empty string at load time.
pub fn working_table_schema() -> Schema {
    use columns::*;
    Schema::new(vec![
        Field::new(ID, DataType::Utf8, false),
        Field::new(TITLE, DataType::Utf8, false),
        Field::new(THESIS, DataType::Utf8, false),
        Field::new(SUMMARY, DataType::Utf8, false),
        Field::new(LEGISLATION, DataType::Utf8, false),
        Field::new(PROCESS_CLASS, DataType::Utf8, false),
        Field::new(BULLETIN, DataType::Utf8, false),
        Field::new(REPERCUSSION, DataType::Utf8, false),
        Field::new(JUDGMENT_DATE, DataType::Date32, false),
        Field::new(YEAR, DataType::Int32, false),
        Field::new(MONTH, DataType::Int32, false),
        Field::new(YEAR_MONTH, DataType::Utf8, false),
        Field::new(BRANCH, DataType::Utf8, false),
        Field::new(AREA, DataType::Utf8, false),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn working_table_schema_has_expected_fields() {
        let schema = working_table_schema();
        assert_eq!(schema.fields().len(), 14);
        assert!(schema.field_with_name(columns::ID).is_ok());
        assert!(schema.field_with_name(columns::AREA).is_ok());
        assert_eq!(
            schema.field_with_name(columns::JUDGMENT_DATE).unwrap().data_type(),
            &DataType::Date32
        );
    }

    #[test]
    fn no_nullable_columns() {
        let schema = working_table_schema();
        assert!(schema.fields().iter().all(|f| !f.is_nullable()));
    }
}
