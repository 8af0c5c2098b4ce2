use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::visibility::{Margin, WatchGroup, WatchOptions};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    #[serde(default)]
    pub scroll: ScrollConfig,
    #[serde(default)]
    pub reveal: RevealConfig,
    #[serde(default)]
    pub counter: CounterConfig,
    #[serde(default)]
    pub progress: ProgressConfig,
    #[serde(default)]
    pub typing: TypingConfig,
    #[serde(default)]
    pub parallax: ParallaxConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollConfig {
    /// Scroll offset past which the navbar gets its background
    #[serde(default = "default_navbar_threshold")]
    pub navbar_threshold: f64,
    /// Scroll offset past which the back-to-top button is shown
    #[serde(default = "default_back_to_top_threshold")]
    pub back_to_top_threshold: f64,
    /// How far above a section's top its active range starts
    #[serde(default = "default_section_offset")]
    pub section_offset: f64,
    /// Throttle window for scroll recomputation
    #[serde(default = "default_scroll_throttle")]
    pub throttle_ms: u64,
    /// Quiet period after the last resize before recomputing
    #[serde(default = "default_resize_debounce")]
    pub resize_debounce_ms: u64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            navbar_threshold: default_navbar_threshold(),
            back_to_top_threshold: default_back_to_top_threshold(),
            section_offset: default_section_offset(),
            throttle_ms: default_scroll_throttle(),
            resize_debounce_ms: default_resize_debounce(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealConfig {
    /// Visible fraction (0-1) at which an element is revealed
    #[serde(default = "default_reveal_threshold")]
    pub threshold: f64,
    /// Viewport margin; a negative bottom triggers before full entry
    #[serde(default = "default_reveal_margin")]
    pub margin: Margin,
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            threshold: default_reveal_threshold(),
            margin: default_reveal_margin(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterConfig {
    /// Total counting time
    #[serde(default = "default_counter_duration")]
    pub duration_ms: u64,
    /// Time between displayed steps
    #[serde(default = "default_counter_tick")]
    pub tick_ms: u64,
    #[serde(default = "default_half_threshold")]
    pub threshold: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            duration_ms: default_counter_duration(),
            tick_ms: default_counter_tick(),
            threshold: default_half_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Delay between becoming visible and setting the width
    #[serde(default = "default_progress_delay")]
    pub delay_ms: u64,
    #[serde(default = "default_half_threshold")]
    pub threshold: f64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_progress_delay(),
            threshold: default_half_threshold(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingConfig {
    #[serde(default = "default_typing_start_delay")]
    pub start_delay_ms: u64,
    #[serde(default = "default_typing_char_interval")]
    pub char_interval_ms: u64,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            start_delay_ms: default_typing_start_delay(),
            char_interval_ms: default_typing_char_interval(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParallaxConfig {
    /// Hero offset per scrolled pixel
    #[serde(default = "default_parallax_factor")]
    pub factor: f64,
    #[serde(default = "default_parallax_throttle")]
    pub throttle_ms: u64,
}

impl Default for ParallaxConfig {
    fn default() -> Self {
        Self {
            factor: default_parallax_factor(),
            throttle_ms: default_parallax_throttle(),
        }
    }
}

fn default_navbar_threshold() -> f64 {
    50.0
}

fn default_back_to_top_threshold() -> f64 {
    300.0
}

fn default_section_offset() -> f64 {
    100.0
}

fn default_scroll_throttle() -> u64 {
    10
}

fn default_resize_debounce() -> u64 {
    100
}

fn default_reveal_threshold() -> f64 {
    0.1
}

fn default_reveal_margin() -> Margin {
    Margin {
        bottom: -50.0,
        ..Margin::default()
    }
}

fn default_half_threshold() -> f64 {
    0.5
}

fn default_counter_duration() -> u64 {
    2000
}

fn default_counter_tick() -> u64 {
    16 // ~60 steps per second
}

fn default_progress_delay() -> u64 {
    200
}

fn default_typing_start_delay() -> u64 {
    1000
}

fn default_typing_char_interval() -> u64 {
    100
}

fn default_parallax_factor() -> f64 {
    0.5
}

fn default_parallax_throttle() -> u64 {
    10
}

impl ScrollConfig {
    pub fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

impl CounterConfig {
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Tick period, falling back to 16ms when configured as zero
    pub fn tick(&self) -> Duration {
        if self.tick_ms == 0 {
            Duration::from_millis(default_counter_tick())
        } else {
            Duration::from_millis(self.tick_ms)
        }
    }
}

impl SiteConfig {
    /// Load configuration from the default path or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit TOML file
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&config_path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/folio/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("folio")
            .join("config.toml")
    }

    /// Intersection options a host observer for `group` should use
    pub fn watch_options(&self, group: WatchGroup) -> WatchOptions {
        match group {
            WatchGroup::Reveal => {
                WatchOptions::once(self.reveal.threshold).with_margin(self.reveal.margin)
            }
            WatchGroup::Counters => WatchOptions::once(self.counter.threshold),
            WatchGroup::ProgressBars => WatchOptions::once(self.progress.threshold),
        }
    }

    /// Reject thresholds outside the 0-1 range an intersection ratio can take
    pub fn validate(&self) -> crate::Result<()> {
        for (name, value) in [
            ("reveal.threshold", self.reveal.threshold),
            ("counter.threshold", self.counter.threshold),
            ("progress.threshold", self.progress.threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(crate::Error::Config(format!(
                    "{name} must be between 0 and 1, got {value}"
                )));
            }
        }
        Ok(())
    }
}
