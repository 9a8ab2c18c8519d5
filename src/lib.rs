//! xcstrings-localize
//!
//! Xcode String Catalog (`.xcstrings`) の未翻訳文字列を LLM で翻訳して書き戻す

pub mod catalog;
pub mod commands;
pub mod config;
pub mod error;
pub mod normalize;
pub mod orchestrator;
pub mod reconcile;
pub mod translator;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use catalog::{
    Catalog,
    CatalogHandle,
    CatalogStore,
};
pub use error::LocalizeError;
pub use orchestrator::BatchOrchestrator;
