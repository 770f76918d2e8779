use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::catalog::{Difficulty, Grade, QuestionType};
use crate::flow::{DEFAULT_QUESTION_COUNT, MAX_QUESTION_COUNT};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Gemini,
    Sample,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default = "default_grade")]
    pub default_grade: Grade,
    #[serde(default = "default_difficulty")]
    pub default_difficulty: Difficulty,
    #[serde(default = "default_question_type")]
    pub default_question_type: QuestionType,
    #[serde(default = "default_question_count")]
    pub default_question_count: usize,
    #[serde(default = "default_provider")]
    pub provider: ProviderKind,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_purge_stores")]
    pub purge_stores: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}
fn default_grade() -> Grade {
    Grade::Five
}
fn default_difficulty() -> Difficulty {
    Difficulty::Easy
}
fn default_question_type() -> QuestionType {
    QuestionType::MultipleChoice
}
fn default_question_count() -> usize {
    DEFAULT_QUESTION_COUNT
}
fn default_provider() -> ProviderKind {
    ProviderKind::Gemini
}
fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}
fn default_api_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}
fn default_request_timeout_secs() -> u64 {
    60
}
fn default_temperature() -> f64 {
    0.8
}
fn default_purge_stores() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: default_theme(),
            default_grade: default_grade(),
            default_difficulty: default_difficulty(),
            default_question_type: default_question_type(),
            default_question_count: default_question_count(),
            provider: default_provider(),
            model: default_model(),
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            temperature: default_temperature(),
            purge_stores: default_purge_stores(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("quizcraft")
            .join("config.toml")
    }

    /// Clamp numeric fields into their supported ranges and replace blank
    /// strings with defaults.
    pub fn validate(&mut self) {
        self.default_question_count = self.default_question_count.clamp(1, MAX_QUESTION_COUNT);
        self.request_timeout_secs = self.request_timeout_secs.clamp(5, 300);
        self.temperature = if self.temperature.is_finite() {
            self.temperature.clamp(0.0, 2.0)
        } else {
            default_temperature()
        };
        if self.model.trim().is_empty() {
            self.model = default_model();
        }
        if self.api_base_url.trim().is_empty() {
            self.api_base_url = default_api_base_url();
        }
        if self.log_level.trim().is_empty() {
            self.log_level = default_log_level();
        }
    }
}
