//! String catalog model, storage and the single-writer catalog task.
/// Single-writer catalog task
mod actor;
/// Catalog errors
mod error;
/// Xcode-compatible JSON output
mod format;
pub mod model;
/// Load, merge and save
mod store;

pub use actor::CatalogHandle;
pub use error::CatalogError;
pub use format::to_xcode_json;
pub use model::{
    Catalog,
    Entry,
    Localization,
    StringUnit,
    TranslationState,
};
pub use store::{
    CatalogStore,
    MergeReport,
};
