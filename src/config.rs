//! Configuration loading for the designer
//!
//! Loads settings from YAML configuration files. Values are validated when
//! they are assigned or loaded; invalid values are rejected, never clamped.

use crate::error::ConfigError;
use crate::logging::DebugContext;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default seconds to wait after a change before updating the preview.
pub const DEFAULT_UPDATE_INTERVAL: f64 = 0.3;

/// Default relative size of the preview panel.
pub const DEFAULT_PANEL_SIZE: f64 = 0.4;

/// Config file names probed by [`DesignerConfig::load_default`], in order.
pub const CONFIG_FILE_NAMES: [&str; 4] = [
    ".wix-ui-designer.yaml",
    ".wix-ui-designer.yml",
    "wix-ui-designer.yaml",
    "wix-ui-designer.yml",
];

/// Editor side the preview panel docks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelPosition {
    #[default]
    Top,
    Bottom,
    Left,
    Right,
}

impl PanelPosition {
    /// Top and bottom panels split the editor horizontally.
    pub fn is_horizontal(&self) -> bool {
        matches!(self, PanelPosition::Top | PanelPosition::Bottom)
    }
}

/// User-facing designer options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignerConfig {
    /// Seconds to wait after changes before updating the preview
    update_interval: f64,
    /// Where the preview panel appears
    panel_position: PanelPosition,
    /// Initial relative size of the panel, in (0, 1)
    panel_size: f64,
    /// Enabled debug contexts (names such as `margin`, `wix`, `all`)
    debug_context: Vec<String>,
    /// tracing filter used by the binary
    log_level: String,
}

impl Default for DesignerConfig {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            panel_position: PanelPosition::default(),
            panel_size: DEFAULT_PANEL_SIZE,
            debug_context: Vec::new(),
            log_level: "info".to_string(),
        }
    }
}

impl DesignerConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate YAML content
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the first config file found in `dir`.
    ///
    /// Returns defaults when no file exists; a file that exists but is
    /// invalid is an error.
    pub fn load_default(dir: &Path) -> Result<Self, ConfigError> {
        for name in CONFIG_FILE_NAMES {
            let candidate = dir.join(name);
            if candidate.exists() {
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }

    /// Check every value against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        update_interval_delay(self.update_interval)?;
        check_panel_size(self.panel_size)?;
        self.debug_mask()?;
        Ok(())
    }

    pub fn update_interval(&self) -> f64 {
        self.update_interval
    }

    /// The update interval as a non-zero [`Duration`]. A value that never
    /// went through validation falls back to the default.
    pub fn update_delay(&self) -> Duration {
        update_interval_delay(self.update_interval)
            .unwrap_or_else(|_| Duration::from_secs_f64(DEFAULT_UPDATE_INTERVAL))
    }

    pub fn set_update_interval(&mut self, seconds: f64) -> Result<(), ConfigError> {
        update_interval_delay(seconds)?;
        self.update_interval = seconds;
        Ok(())
    }

    pub fn panel_position(&self) -> PanelPosition {
        self.panel_position
    }

    pub fn set_panel_position(&mut self, position: PanelPosition) {
        self.panel_position = position;
    }

    pub fn panel_size(&self) -> f64 {
        self.panel_size
    }

    pub fn set_panel_size(&mut self, fraction: f64) -> Result<(), ConfigError> {
        check_panel_size(fraction)?;
        self.panel_size = fraction;
        Ok(())
    }

    /// Combined mask of the configured debug contexts.
    pub fn debug_mask(&self) -> Result<DebugContext, ConfigError> {
        self.debug_context
            .iter()
            .try_fold(DebugContext::empty(), |mask, name| {
                DebugContext::parse_name(name)
                    .map(|context| mask | context)
                    .ok_or_else(|| ConfigError::UnknownDebugContext(name.clone()))
            })
    }

    pub fn set_debug_contexts(&mut self, names: Vec<String>) -> Result<(), ConfigError> {
        for name in &names {
            if DebugContext::parse_name(name).is_none() {
                return Err(ConfigError::UnknownDebugContext(name.clone()));
            }
        }
        self.debug_context = names;
        Ok(())
    }

    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Seconds to a non-zero delay that `Duration` can hold.
fn update_interval_delay(seconds: f64) -> Result<Duration, ConfigError> {
    if seconds.is_nan() || seconds <= 0.0 {
        return Err(ConfigError::NonPositiveUpdateInterval(seconds));
    }
    Duration::try_from_secs_f64(seconds)
        .ok()
        .filter(|delay| !delay.is_zero())
        .ok_or(ConfigError::InvalidUpdateInterval(seconds))
}

fn check_panel_size(fraction: f64) -> Result<(), ConfigError> {
    if fraction > 0.0 && fraction < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidPanelSize(fraction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = DesignerConfig::default();
        assert_eq!(config.update_interval(), 0.3);
        assert_eq!(config.panel_position(), PanelPosition::Top);
        assert_eq!(config.panel_size(), 0.4);
        assert_eq!(config.debug_mask().unwrap(), DebugContext::empty());
        assert_eq!(config.log_level(), "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_set_update_interval_rejects_non_positive() {
        let mut config = DesignerConfig::default();
        assert!(matches!(
            config.set_update_interval(0.0),
            Err(ConfigError::NonPositiveUpdateInterval(_))
        ));
        assert!(config.set_update_interval(-1.0).is_err());
        assert!(config.set_update_interval(f64::NAN).is_err());
        assert_eq!(config.update_interval(), 0.3);

        config.set_update_interval(1.5).unwrap();
        assert_eq!(config.update_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn test_update_interval_must_fit_a_duration() {
        assert!(matches!(
            DesignerConfig::from_yaml("update_interval: 1.0e20"),
            Err(ConfigError::InvalidUpdateInterval(_))
        ));
        assert!(matches!(
            DesignerConfig::from_yaml("update_interval: .inf"),
            Err(ConfigError::InvalidUpdateInterval(_))
        ));

        let mut config = DesignerConfig::default();
        assert!(matches!(
            config.set_update_interval(1.0e-12),
            Err(ConfigError::InvalidUpdateInterval(_))
        ));
        assert_eq!(config.update_interval(), 0.3);
    }

    #[test]
    fn test_unvalidated_interval_falls_back_to_default() {
        let config: DesignerConfig = serde_yaml::from_str("update_interval: 1.0e20").unwrap();
        assert_eq!(config.update_delay(), Duration::from_millis(300));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_set_panel_size_rejects_out_of_range() {
        let mut config = DesignerConfig::default();
        assert!(config.set_panel_size(0.0).is_err());
        assert!(config.set_panel_size(1.0).is_err());
        assert!(config.set_panel_size(-0.2).is_err());
        assert_eq!(config.panel_size(), 0.4);

        config.set_panel_size(0.25).unwrap();
        assert_eq!(config.panel_size(), 0.25);
    }

    #[test]
    fn test_debug_mask() {
        let mut config = DesignerConfig::default();
        config
            .set_debug_contexts(vec!["margin".to_string(), "WiX".to_string()])
            .unwrap();
        assert_eq!(
            config.debug_mask().unwrap(),
            DebugContext::MARGIN | DebugContext::WIX
        );
        assert!(config.set_debug_contexts(vec!["nope".to_string()]).is_err());
    }

    #[test]
    fn test_load_config_from_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("settings.yaml");

        let yaml = r#"
update_interval: 0.5
panel_position: left
panel_size: 0.3
debug_context:
  - margin
  - document
log_level: debug
"#;
        fs::write(&config_path, yaml).unwrap();

        let config = DesignerConfig::load(&config_path).unwrap();
        assert_eq!(config.update_interval(), 0.5);
        assert_eq!(config.panel_position(), PanelPosition::Left);
        assert!(!config.panel_position().is_horizontal());
        assert_eq!(config.panel_size(), 0.3);
        assert_eq!(
            config.debug_mask().unwrap(),
            DebugContext::MARGIN | DebugContext::DOCUMENT
        );
        assert_eq!(config.log_level(), "debug");
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        assert!(matches!(
            DesignerConfig::from_yaml("update_interval: 0"),
            Err(ConfigError::NonPositiveUpdateInterval(_))
        ));
        assert!(matches!(
            DesignerConfig::from_yaml("panel_size: 1.2"),
            Err(ConfigError::InvalidPanelSize(_))
        ));
        assert!(matches!(
            DesignerConfig::from_yaml("debug_context: [loud]"),
            Err(ConfigError::UnknownDebugContext(_))
        ));
    }

    #[test]
    fn test_load_default_without_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = DesignerConfig::load_default(temp_dir.path()).unwrap();
        assert_eq!(config, DesignerConfig::default());
    }

    #[test]
    fn test_load_default_with_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(".wix-ui-designer.yaml"),
            "panel_position: bottom\n",
        )
        .unwrap();

        let config = DesignerConfig::load_default(temp_dir.path()).unwrap();
        assert_eq!(config.panel_position(), PanelPosition::Bottom);
        assert!(config.panel_position().is_horizontal());
        assert_eq!(config.update_interval(), DEFAULT_UPDATE_INTERVAL);
    }
}
