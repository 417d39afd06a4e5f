//! Credential records and their metadata

mod id;
mod search;
mod types;

pub use id::derive_id;
pub use search::filter_records;
pub use types::*;
