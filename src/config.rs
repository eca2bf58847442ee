//! Configuration management
//!
//! Loaded from a TOML file; every section and field falls back to its
//! default, so a partial file is enough. Defaults are tuned for a 640x480
//! webcam driving a 1920x1080 display.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::controller::DragMode;
use crate::error::{Error, Result};
use crate::fingers::Handedness;
use crate::gesture::GestureRules;
use crate::landmarks::CoordinateSpace;
use crate::motion::CursorMapper;

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Target display
    #[serde(default)]
    pub screen: ScreenConfig,
    /// Landmark source geometry
    #[serde(default)]
    pub camera: CameraConfig,
    /// Smoothing and debouncing
    #[serde(default)]
    pub motion: MotionConfig,
    /// Gesture thresholds and scroll speeds
    #[serde(default)]
    pub gestures: GestureConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Target display configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Display width in pixels
    pub width: u32,
    /// Display height in pixels
    pub height: u32,
    /// Replace width/height with the size reported by the injection backend
    pub detect: bool,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            detect: true,
        }
    }
}

/// Landmark source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Camera frame width in pixels
    pub width: u32,
    /// Camera frame height in pixels
    pub height: u32,
    /// Edge band (pixels) excluded from the active region
    pub margin: f64,
    /// How incoming landmark coordinates are expressed
    pub coordinate_space: CoordinateSpace,
    /// Mirror the horizontal axis on output
    pub mirror_x: bool,
    /// Tracked hand, for the thumb test
    pub handedness: Handedness,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            margin: 170.0,
            coordinate_space: CoordinateSpace::Normalized,
            mirror_x: false,
            handedness: Handedness::Right,
        }
    }
}

/// Smoothing and click debounce configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// EMA weight of the new sample, in (0, 1]
    pub smooth_alpha: f64,
    /// Positions required before a click may fire
    pub stabilization_capacity: usize,
    /// Maximum distance (screen pixels) from the first buffered position
    pub stabilization_radius: f64,
    /// Drag behaviour
    pub drag_mode: DragMode,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            smooth_alpha: 0.2,
            stabilization_capacity: 10,
            stabilization_radius: 10.0,
            drag_mode: DragMode::Tap,
        }
    }
}

/// Gesture thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Thumb tip to index MCP distance separating pinched from away (per-mille of frame)
    pub pinch_distance: f64,
    /// Joint angle (degrees) below which a finger is curled
    pub curled_angle_deg: f64,
    /// Joint angle (degrees) above which a finger is extended
    pub extended_angle_deg: f64,
    /// Scroll amount for ScrollUp (positive scrolls up)
    pub scroll_speed_up: i32,
    /// Scroll amount for ScrollDown
    pub scroll_speed_down: i32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        let rules = GestureRules::default();
        Self {
            pinch_distance: rules.pinch_distance,
            curled_angle_deg: rules.curled_angle_deg,
            extended_angle_deg: rules.extended_angle_deg,
            scroll_speed_up: 70,
            scroll_speed_down: -70,
        }
    }
}

impl GestureConfig {
    pub fn rules(&self) -> GestureRules {
        GestureRules {
            pinch_distance: self.pinch_distance,
            curled_angle_deg: self.curled_angle_deg,
            extended_angle_deg: self.extended_angle_deg,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level for this crate (trace, debug, info, warn, error)
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content).map_err(|e| Error::Toml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// TOML representation
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Toml(e.to_string()))
    }

    /// Override the display resolution
    pub fn with_screen_size(mut self, width: u32, height: u32) -> Self {
        self.screen.width = width;
        self.screen.height = height;
        self
    }

    /// Camera-to-screen mapping described by this configuration
    pub fn mapper(&self) -> CursorMapper {
        CursorMapper {
            frame_width: f64::from(self.camera.width),
            frame_height: f64::from(self.camera.height),
            screen_width: f64::from(self.screen.width),
            screen_height: f64::from(self.screen.height),
            margin: self.camera.margin,
        }
    }

    /// Validate configuration. Every failure is fatal.
    pub fn validate(&self) -> Result<()> {
        if self.screen.width == 0 || self.screen.height == 0 {
            return Err(Error::Config(format!(
                "screen size must be positive, got {}x{}",
                self.screen.width, self.screen.height
            )));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(Error::Config(format!(
                "camera size must be positive, got {}x{}",
                self.camera.width, self.camera.height
            )));
        }

        let margin = self.camera.margin;
        let shortest = f64::from(self.camera.width.min(self.camera.height));
        if !margin.is_finite() || margin < 0.0 || margin * 2.0 >= shortest {
            return Err(Error::Config(format!(
                "margin must be in [0, {}), got {}",
                shortest / 2.0,
                margin
            )));
        }

        let alpha = self.motion.smooth_alpha;
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(Error::Config(format!(
                "smooth_alpha must be in (0, 1], got {alpha}"
            )));
        }
        if self.motion.stabilization_capacity == 0 {
            return Err(Error::Config(
                "stabilization_capacity must be > 0".to_string(),
            ));
        }
        let radius = self.motion.stabilization_radius;
        if !radius.is_finite() || radius <= 0.0 {
            return Err(Error::Config(format!(
                "stabilization_radius must be positive, got {radius}"
            )));
        }

        for (name, value) in [
            ("pinch_distance", self.gestures.pinch_distance),
            ("curled_angle_deg", self.gestures.curled_angle_deg),
            ("extended_angle_deg", self.gestures.extended_angle_deg),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        let gestures = &self.gestures;
        if gestures.curled_angle_deg > gestures.extended_angle_deg {
            return Err(Error::Config(format!(
                "curled_angle_deg ({}) must not exceed extended_angle_deg ({})",
                gestures.curled_angle_deg, gestures.extended_angle_deg
            )));
        }

        // Positive scrolls up
        if gestures.scroll_speed_up <= 0 {
            return Err(Error::Config(format!(
                "scroll_speed_up must be positive, got {}",
                gestures.scroll_speed_up
            )));
        }
        if gestures.scroll_speed_down >= 0 {
            return Err(Error::Config(format!(
                "scroll_speed_down must be negative, got {}",
                gestures.scroll_speed_down
            )));
        }

        Ok(())
    }
}
