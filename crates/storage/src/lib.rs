#![forbid(unsafe_code)]
//! Embedded SQLite index for design cards (split-friendly module root).

mod store;

pub use store::{SqliteStore, StoreError};
pub use store::{
    CardBundle, CardFilter, CardRow, CodeLinkRow, PruneResult, RelationRow, SpecifiedSets,
};
