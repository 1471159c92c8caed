pub mod areas;
pub mod judgment;
pub mod schema;

pub use areas::{DEFAULT_AREA, area_for};
pub use judgment::{ExplodedRow, Judgment, Repercussion, split_branches};
pub use schema::{columns, working_table_schema};
