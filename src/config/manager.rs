//! 設定管理を行うモジュール

use std::path::PathBuf;

use super::{
    API_KEY_ENV,
    ConfigError,
    LocalizeSettings,
    SettingsOverrides,
    loader,
};

/// 設定管理を行う
///
/// 優先順位はコマンドライン > 設定ファイル > デフォルト値
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: LocalizeSettings,

    /// 設定ファイルを探したディレクトリ
    settings_dir: Option<PathBuf>,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: LocalizeSettings::default(), settings_dir: None }
    }

    /// 設定を読み込む
    ///
    /// # Arguments
    /// * `settings_dir` - 設定ファイルを探すディレクトリ（通常はカタログのあるディレクトリ）
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(&mut self, settings_dir: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings from: {:?}", settings_dir);

        let settings = if let Some(dir) = &settings_dir {
            loader::load_from_dir(dir)?.map_or_else(LocalizeSettings::default, |loaded| {
                tracing::debug!("Loaded settings file: {:?}", loaded);
                loaded
            })
        } else {
            LocalizeSettings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.settings_dir = settings_dir;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    /// コマンドラインの値で設定を上書きする
    ///
    /// # Errors
    /// 上書き後の設定が不正な場合
    pub fn apply_overrides(&mut self, overrides: SettingsOverrides) -> Result<(), ConfigError> {
        tracing::debug!("Applying overrides: {:?}", overrides);

        let settings = self.current_settings.clone().with_overrides(overrides);
        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &LocalizeSettings {
        &self.current_settings
    }

    #[must_use]
    pub const fn settings_dir(&self) -> Option<&PathBuf> {
        self.settings_dir.as_ref()
    }

    /// API キーを決める
    ///
    /// `--api-key` を優先し、なければ環境変数 `OPENAI_API_KEY` を使う。
    /// 空文字列は未指定として扱う。
    ///
    /// # Errors
    /// どちらも指定されていない場合は [`ConfigError::MissingApiKey`]
    pub fn resolve_api_key(
        flag: Option<String>,
        env: impl FnOnce(&str) -> Option<String>,
    ) -> Result<String, ConfigError> {
        flag.filter(|key| !key.trim().is_empty())
            .or_else(|| env(API_KEY_ENV).filter(|key| !key.trim().is_empty()))
            .ok_or(ConfigError::MissingApiKey)
    }
}
