//! `localize` subcommands.

/// `localize info`
mod info;
/// `localize translate`
mod translate;

pub use info::info;
pub use translate::{
    TranslateOptions,
    TranslateSummary,
    translate,
};
