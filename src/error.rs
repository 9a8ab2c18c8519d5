//! Top-level error of the `localize` commands.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::config::ConfigError;
use crate::orchestrator::OrchestratorError;
use crate::translator::TranslationError;

#[derive(Error, Debug)]
pub enum LocalizeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The translator could not be set up.
    #[error(transparent)]
    Translator(#[from] TranslationError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),
}

impl LocalizeError {
    /// 設定・入力ファイルの問題かどうか（翻訳を始める前に失敗した）
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Config(_) | Self::Catalog(CatalogError::Read { .. }))
    }
}
