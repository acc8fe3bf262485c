use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read site config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid site config: {0}")]
    Invalid(String),
}

/// Timings, thresholds and copy used by the page controllers.
///
/// Every field has a default, so a YAML file only needs the keys it changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SiteConfig {
    pub menu: MenuConfig,
    pub scroll: ScrollConfig,
    pub counter: CounterConfig,
    pub form: FormConfig,
    pub notifications: NotificationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MenuConfig {
    pub resize_debounce_ms: u64,
    /// Viewports at least this wide close the burger menu on resize.
    pub desktop_min_width: f64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            resize_debounce_ms: 200,
            desktop_min_width: 1024.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScrollConfig {
    pub spy_debounce_ms: u64,
    /// Added to the header height when deciding which section is current.
    pub spy_extra_offset: f64,
    /// Used instead of header height + extra when the page has no header.
    pub spy_fallback_offset: f64,
    /// Header clearance for anchor scrolling when the page has no header.
    pub anchor_fallback_offset: f64,
    pub top_button_debounce_ms: u64,
    pub top_button_threshold: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            spy_debounce_ms: 100,
            spy_extra_offset: 50.0,
            spy_fallback_offset: 120.0,
            anchor_fallback_offset: 70.0,
            top_button_debounce_ms: 100,
            top_button_threshold: 300.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CounterConfig {
    pub duration_ms: u64,
    pub frame_ms: u64,
    /// Fraction of the element that must be inside the viewport.
    pub visibility_threshold: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            duration_ms: 2000,
            frame_ms: 16,
            visibility_threshold: 0.5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormConfig {
    pub revalidate_debounce_ms: u64,
    pub submit_delay_ms: u64,
    pub redirect_delay_ms: u64,
    pub thank_you_path: String,
    pub messages: FormMessages,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            revalidate_debounce_ms: 300,
            submit_delay_ms: 1500,
            redirect_delay_ms: 1500,
            thank_you_path: "thank_you.html".to_string(),
            messages: FormMessages::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FormMessages {
    pub required: String,
    pub email: String,
    pub phone: String,
    pub name: String,
    pub message_too_short: String,
    pub terms: String,
    pub blocked: String,
    pub success: String,
    pub busy_label: String,
}

impl Default for FormMessages {
    fn default() -> Self {
        Self {
            required: "Dit veld is verplicht".to_string(),
            email: "Voer een geldig e-mailadres in".to_string(),
            phone: "Voer een geldig telefoonnummer in".to_string(),
            name: "Voer een geldige naam in (2-50 tekens)".to_string(),
            message_too_short: "Bericht moet minimaal 10 tekens bevatten".to_string(),
            terms: "U moet akkoord gaan met de voorwaarden".to_string(),
            blocked: "Vul alle verplichte velden correct in.".to_string(),
            success: "Bedankt! Uw aanvraag is verzonden.".to_string(),
            busy_label: "Verzenden...".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotificationConfig {
    pub auto_dismiss_ms: u64,
    pub fade_ms: u64,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            auto_dismiss_ms: 5000,
            fade_ms: 150,
        }
    }
}

impl SiteConfig {
    /// Loads the config from `config_path`, falling back to defaults when no
    /// path is given or the file does not exist.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = match config_path {
            Some(path) if path.exists() => {
                let contents = fs::read_to_string(path)?;
                Self::from_yaml(&contents)?
            }
            _ => Self::default(),
        };
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.counter.frame_ms == 0 {
            return Err(ConfigError::Invalid("counter.frame_ms must be positive".into()));
        }
        let threshold = self.counter.visibility_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(ConfigError::Invalid(format!(
                "counter.visibility_threshold must be in (0, 1], got {threshold}"
            )));
        }
        if self.form.thank_you_path.trim().is_empty() {
            return Err(ConfigError::Invalid("form.thank_you_path is empty".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn loads_default() {
        let config = SiteConfig::load(None).unwrap();
        assert_eq!(config.menu.resize_debounce_ms, 200);
        assert_eq!(config.form.thank_you_path, "thank_you.html");
        assert_eq!(config.notifications.auto_dismiss_ms, 5000);
    }

    #[test]
    fn missing_file_falls_back_to_default() {
        let config = SiteConfig::load(Some(PathBuf::from("/nonexistent/sitekit.yaml"))).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn loads_partial_overrides_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(
            file,
            "form:\n  submit_delay_ms: 10\n  messages:\n    success: Thanks!\nscroll:\n  top_button_threshold: 120"
        )
        .unwrap();
        let config = SiteConfig::load(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.form.submit_delay_ms, 10);
        assert_eq!(config.form.redirect_delay_ms, 1500);
        assert_eq!(config.form.messages.success, "Thanks!");
        assert_eq!(config.form.messages.required, "Dit veld is verplicht");
        assert_eq!(config.scroll.top_button_threshold, 120.0);
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            SiteConfig::from_yaml("counter:\n  frame_ms: 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SiteConfig::from_yaml("counter:\n  visibility_threshold: 1.5"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            SiteConfig::from_yaml("menu: [1, 2]"),
            Err(ConfigError::Yaml(_))
        ));
    }
}
