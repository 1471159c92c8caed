//! Loading, filtering and sampling of the exploded judgment table.

mod error;
pub use error::{LoadFailure, StoreError};

pub mod catalog;
pub mod filter;
pub mod loader;
pub mod sampler;
pub mod source;
pub mod stats;
pub mod table;

#[cfg(feature = "parquet")]
mod export;
#[cfg(feature = "parquet")]
pub use export::write_parquet;

pub use catalog::Catalog;
pub use filter::{
    DateSelection, FilterOutcome, FilterSelection, QueryMode, RepercussionChoice, apply,
};
pub use loader::{Dataset, LoadReport, YEAR_RANGE, load_dataset};
pub use sampler::{SampleOutcome, StudyFilter, StudySet, sample_study_set};
pub use stats::Statistics;
pub use table::{FilterOptions, InformativoTable};

#[cfg(test)]
mod fixtures;
