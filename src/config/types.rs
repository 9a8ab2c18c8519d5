use std::time::Duration;

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Configuration error in '{field_path}': {message}")]
pub struct ValidationError {
    /// JSON path to the field (e.g., "targetLanguages[0]")
    pub field_path: String,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self { field_path: field_path.into(), message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration validation failed:\n{}", format_validation_errors(.0))]
    ValidationErrors(Vec<ValidationError>),

    #[error("Failed to load configuration file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("No API key provided. Pass --api-key or set the {API_KEY_ENV} environment variable")]
    MissingApiKey,
}

/// API キーを読む環境変数
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// 番号付きの一覧に整形する
fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .map(|(i, err)| format!("  {}. {} - {}", i + 1, err.field_path, err.message))
        .collect::<Vec<_>>()
        .join("\n")
}

/// 翻訳の実行設定
///
/// カタログと同じディレクトリの `.xcstrings-localize.json` から読み込む。
/// 省略したフィールドはデフォルト値になる。
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocalizeSettings {
    /// Chat model name.
    pub model: String,

    /// Maximum number of concurrent requests per language.
    pub batch_size: usize,

    /// Base URL of an OpenAI-compatible API, without the trailing `/chat/completions`.
    pub api_base_url: String,

    /// Sampling temperature (0.0 - 2.0).
    pub temperature: f32,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Delay between consecutive batches of one language, in milliseconds.
    pub pacing_millis: u64,

    /// Languages to translate into.
    ///
    /// - `None`: every language already present in the catalog (default)
    /// - `Some([...])`: only the listed languages
    pub target_languages: Option<Vec<String>>,
}

impl Default for LocalizeSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4".to_string(),
            batch_size: 5,
            api_base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.7,
            request_timeout_secs: 60,
            pacing_millis: 1000,
            target_languages: None,
        }
    }
}

/// コマンドラインから上書きする値
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub model: Option<String>,
    pub batch_size: Option<usize>,
    pub target_languages: Option<Vec<String>>,
}

impl LocalizeSettings {
    /// # Errors
    /// - Required field is empty
    /// - Value out of range
    /// - Base URL is not http(s)
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.model.trim().is_empty() {
            errors.push(ValidationError::new(
                "model",
                "The model cannot be empty. Example: \"gpt-4\"",
            ));
        }

        if self.batch_size == 0 {
            errors.push(ValidationError::new("batchSize", "Must be at least 1"));
        }

        if !(self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://"))
        {
            errors.push(ValidationError::new(
                "apiBaseUrl",
                format!(
                    "Invalid URL '{}'. Expected an http(s) URL such as \"https://api.openai.com/v1\"",
                    self.api_base_url
                ),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            errors.push(ValidationError::new(
                "temperature",
                format!("Must be between 0.0 and 2.0, got {}", self.temperature),
            ));
        }

        if self.request_timeout_secs == 0 {
            errors.push(ValidationError::new("requestTimeoutSecs", "Must be at least 1"));
        }

        if let Some(languages) = &self.target_languages {
            for (index, language) in languages.iter().enumerate() {
                if language.trim().is_empty() {
                    errors.push(ValidationError::new(
                        format!("targetLanguages[{index}]"),
                        "Language code cannot be empty. Example: \"es\"",
                    ));
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// 上書き値を適用した設定を返す
    #[must_use]
    pub fn with_overrides(mut self, overrides: SettingsOverrides) -> Self {
        if let Some(model) = overrides.model {
            self.model = model;
        }
        if let Some(batch_size) = overrides.batch_size {
            self.batch_size = batch_size;
        }
        if let Some(languages) = overrides.target_languages {
            self.target_languages = Some(languages);
        }
        self
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub const fn pacing(&self) -> Duration {
        Duration::from_millis(self.pacing_millis)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[rstest]
    fn validate_valid_settings() {
        let settings = LocalizeSettings::default();

        assert_that!(settings.validate(), ok(anything()));
    }

    #[rstest]
    fn deserialize_partial_settings() {
        let json = r#"{"model": "gpt-4o", "targetLanguages": ["es", "fr"]}"#;

        let settings: LocalizeSettings = serde_json::from_str(json).unwrap();

        assert_that!(settings.model, eq("gpt-4o"));
        assert_that!(settings.batch_size, eq(5));
        assert_that!(settings.target_languages, some(elements_are![eq("es"), eq("fr")]));
    }

    #[rstest]
    fn deserialize_empty_settings() {
        let settings: LocalizeSettings = serde_json::from_str("{}").unwrap();

        assert_that!(settings, eq(&LocalizeSettings::default()));
        assert_that!(settings.pacing(), eq(Duration::from_secs(1)));
        assert_that!(settings.request_timeout(), eq(Duration::from_secs(60)));
    }

    #[rstest]
    #[case::empty_model(LocalizeSettings { model: " ".to_string(), ..LocalizeSettings::default() }, "model")]
    #[case::zero_batch(LocalizeSettings { batch_size: 0, ..LocalizeSettings::default() }, "batchSize")]
    #[case::bad_url(LocalizeSettings { api_base_url: "api.openai.com".to_string(), ..LocalizeSettings::default() }, "apiBaseUrl")]
    #[case::temperature_too_high(LocalizeSettings { temperature: 2.5, ..LocalizeSettings::default() }, "temperature")]
    #[case::temperature_negative(LocalizeSettings { temperature: -0.1, ..LocalizeSettings::default() }, "temperature")]
    #[case::zero_timeout(LocalizeSettings { request_timeout_secs: 0, ..LocalizeSettings::default() }, "requestTimeoutSecs")]
    #[case::empty_language(
        LocalizeSettings { target_languages: Some(vec!["es".to_string(), String::new()]), ..LocalizeSettings::default() },
        "targetLanguages[1]"
    )]
    fn validate_rejects_invalid_field(#[case] settings: LocalizeSettings, #[case] field_path: &str) {
        let result = settings.validate();

        assert_that!(
            result,
            err(elements_are![field!(ValidationError.field_path, eq(field_path))])
        );
    }

    #[rstest]
    fn overrides_replace_only_given_fields() {
        let settings = LocalizeSettings { pacing_millis: 10, ..LocalizeSettings::default() };
        let overrides = SettingsOverrides {
            batch_size: Some(2),
            target_languages: Some(vec!["de".to_string()]),
            ..SettingsOverrides::default()
        };

        let merged = settings.with_overrides(overrides);

        assert_that!(merged.batch_size, eq(2));
        assert_that!(merged.model, eq("gpt-4"));
        assert_that!(merged.pacing_millis, eq(10));
        assert_that!(merged.target_languages, some(elements_are![eq("de")]));
    }

    #[rstest]
    fn config_error_validation_errors_format() {
        let settings = LocalizeSettings {
            model: String::new(),
            batch_size: 0,
            ..LocalizeSettings::default()
        };

        let errors = settings.validate().unwrap_err();
        let config_error = ConfigError::ValidationErrors(errors);

        let error_message = format!("{config_error}");
        assert_that!(error_message, contains_substring("Configuration validation failed"));
        assert_that!(error_message, contains_substring("1. model"));
        assert_that!(error_message, contains_substring("2. batchSize"));
    }
}
