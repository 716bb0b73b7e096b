//! Editor configuration.

use crate::elements::ElementKind;
use kurbo::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

/// Minimum and maximum size allowed for one element kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SizeConstraints {
    pub min_width: f64,
    pub min_height: f64,
    pub max_width: f64,
    pub max_height: f64,
}

impl SizeConstraints {
    pub const fn new(min_width: f64, min_height: f64, max_width: f64, max_height: f64) -> Self {
        Self {
            min_width,
            min_height,
            max_width,
            max_height,
        }
    }

    /// Clamp a width into `[min_width, max_width]`.
    ///
    /// NaN collapses to the minimum.
    pub fn clamp_width(&self, width: f64) -> f64 {
        if width.is_nan() {
            return self.min_width;
        }
        width.clamp(self.min_width, self.max_width.max(self.min_width))
    }

    /// Clamp a height into `[min_height, max_height]`.
    pub fn clamp_height(&self, height: f64) -> f64 {
        if height.is_nan() {
            return self.min_height;
        }
        height.clamp(self.min_height, self.max_height.max(self.min_height))
    }

    pub fn min_size(&self) -> Size {
        Size::new(self.min_width, self.min_height)
    }
}

/// Per-kind size constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KindConstraints {
    pub panel: SizeConstraints,
    pub bubble: SizeConstraints,
    pub text: SizeConstraints,
    pub image: SizeConstraints,
    pub sprite: SizeConstraints,
}

impl Default for KindConstraints {
    fn default() -> Self {
        Self {
            panel: SizeConstraints::new(20.0, 20.0, 5000.0, 5000.0),
            bubble: SizeConstraints::new(60.0, 40.0, 1200.0, 800.0),
            text: SizeConstraints::new(40.0, 20.0, 2000.0, 1000.0),
            image: SizeConstraints::new(10.0, 10.0, 5000.0, 5000.0),
            sprite: SizeConstraints::new(10.0, 10.0, 2000.0, 2000.0),
        }
    }
}

impl KindConstraints {
    pub fn for_kind(&self, kind: ElementKind) -> SizeConstraints {
        match kind {
            ElementKind::Panel => self.panel,
            ElementKind::Dialogue => self.bubble,
            ElementKind::Text => self.text,
            ElementKind::Image => self.image,
            ElementKind::Sprite => self.sprite,
        }
    }
}

/// Size given to an element created by a click instead of a drag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSizes {
    pub panel: Size,
    pub bubble: Size,
    pub text: Size,
}

impl Default for DefaultSizes {
    fn default() -> Self {
        Self {
            panel: Size::new(300.0, 200.0),
            bubble: Size::new(150.0, 80.0),
            text: Size::new(200.0, 50.0),
        }
    }
}

/// Tunables for the editing surface.
///
/// Every field has a default, so a JSON file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Drags shorter than this (canvas units) create a default-sized element.
    pub click_threshold: f64,
    /// Offset applied to a new element that lands on an existing one.
    pub collision_offset: f64,
    /// Shortest tail the tail handle can produce. There is no maximum.
    pub min_tail_length: f64,
    /// Radius around a handle that still counts as a hit.
    pub handle_hit_tolerance: f64,
    /// Distance from an image edge that selects the parent panel instead.
    pub border_tolerance: f64,
    /// Tolerance for element body hit tests.
    pub hit_tolerance: f64,
    /// Virtual page size in canvas units.
    pub page_size: Size,
    pub min_scale: f64,
    pub max_scale: f64,
    pub default_sizes: DefaultSizes,
    pub constraints: KindConstraints,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            click_threshold: 5.0,
            collision_offset: 10.0,
            min_tail_length: 10.0,
            handle_hit_tolerance: 8.0,
            border_tolerance: 8.0,
            hit_tolerance: 2.0,
            page_size: Size::new(800.0, 1200.0),
            min_scale: 0.1,
            max_scale: 10.0,
            default_sizes: DefaultSizes::default(),
            constraints: KindConstraints::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the geometry code cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_scale > 0.0 && self.min_scale <= self.max_scale) {
            return Err(ConfigError::InvalidValue {
                field: "min_scale",
                reason: format!("must be > 0 and <= max_scale, got {}", self.min_scale),
            });
        }
        if self.min_tail_length < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "min_tail_length",
                reason: format!("must not be negative, got {}", self.min_tail_length),
            });
        }
        if self.page_size.width <= 0.0 || self.page_size.height <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: format!("must be positive, got {:?}", self.page_size),
            });
        }
        Ok(())
    }

    /// Size constraints for an element kind.
    pub fn constraints_for(&self, kind: ElementKind) -> SizeConstraints {
        self.constraints.for_kind(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert!((config.click_threshold - 5.0).abs() < f64::EPSILON);
        assert!((config.collision_offset - 10.0).abs() < f64::EPSILON);
        let bubble = config.constraints_for(ElementKind::Dialogue);
        assert!((bubble.min_width - 60.0).abs() < f64::EPSILON);
        assert!((bubble.min_height - 40.0).abs() < f64::EPSILON);
        let panel = config.constraints_for(ElementKind::Panel);
        assert!((panel.min_width - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = EditorConfig::from_json(r#"{ "collision_offset": 25.0 }"#).unwrap();
        assert!((config.collision_offset - 25.0).abs() < f64::EPSILON);
        assert!((config.min_tail_length - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let result = EditorConfig::from_json(r#"{ "min_scale": 0.0 }"#);
        assert!(matches!(result, Err(ConfigError::InvalidValue { field: "min_scale", .. })));
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(EditorConfig::from_json("{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_clamp() {
        let c = SizeConstraints::new(20.0, 20.0, 100.0, 100.0);
        assert!((c.clamp_width(5.0) - 20.0).abs() < f64::EPSILON);
        assert!((c.clamp_width(500.0) - 100.0).abs() < f64::EPSILON);
        assert!((c.clamp_height(f64::NAN) - 20.0).abs() < f64::EPSILON);
    }
}
