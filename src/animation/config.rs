//! Animation configuration

use super::embedding::ClassLabel;
use super::encode::GifSettings;
use super::interpolate::MIN_TRANSITION_FRAMES;
use super::render::{ColorMap, RenderStyle, Rgb, TAB10};
use crate::error::{MorphError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Configuration for building an animation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationConfig {
    /// Pixel dimensions of each frame (width, height)
    pub figure_size: (u32, u32),

    /// Interpolated frames per transition, endpoints included
    pub frames_per_transition: usize,

    /// Display time of every frame in milliseconds
    pub frame_duration_ms: u32,

    /// Whether the GIF repeats indefinitely
    pub repeat: bool,

    /// Static frames shown for each embedding before it starts moving
    pub hold_frames: usize,

    /// Add a final transition from the last embedding back to the first
    pub close_loop: bool,

    /// Space added around the normalized data on each side, in data units
    pub axis_margin: f64,

    /// Marker radius in pixels
    pub marker_radius: u32,

    /// Marker alpha in [0, 1]
    pub marker_opacity: f64,

    /// Figure background
    pub background: Rgb,

    /// Plotting-area outline; `None` disables it
    pub border: Option<Rgb>,

    /// Colors assigned to distinct labels in ascending label order
    pub palette: Vec<Rgb>,

    /// Explicit label → color overrides
    pub colors: BTreeMap<ClassLabel, Rgb>,

    /// Legend name of each label by id; unnamed labels show their id
    pub class_names: Vec<String>,

    /// Names of the x and y axes; empty strings draw nothing
    pub axis_names: (String, String),

    /// Draw a class legend on every frame
    pub legend: bool,

    /// TrueType font for axis names and the legend
    pub font: Option<PathBuf>,

    /// Render frames on the rayon thread pool
    pub parallel: bool,

    /// GIF color quantization speed, 1 (best) to 30 (fastest)
    pub encoder_speed: i32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        let style = RenderStyle::default();
        let gif = GifSettings::default();
        Self {
            figure_size: style.figure_size,
            frames_per_transition: 30,
            frame_duration_ms: gif.frame_duration_ms,
            repeat: gif.repeat,
            hold_frames: 0,
            close_loop: false,
            axis_margin: 0.1,
            marker_radius: style.marker_radius,
            marker_opacity: style.marker_opacity,
            background: style.background,
            border: style.border,
            palette: TAB10.to_vec(),
            colors: BTreeMap::new(),
            class_names: Vec::new(),
            axis_names: style.axis_names,
            legend: style.legend,
            font: style.font,
            parallel: false,
            encoder_speed: gif.speed,
        }
    }
}

impl AnimationConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_figure_size(mut self, width: u32, height: u32) -> Self {
        self.figure_size = (width, height);
        self
    }

    pub fn with_frames_per_transition(mut self, frames: usize) -> Self {
        self.frames_per_transition = frames;
        self
    }

    pub fn with_frame_duration_ms(mut self, ms: u32) -> Self {
        self.frame_duration_ms = ms;
        self
    }

    pub fn with_repeat(mut self, repeat: bool) -> Self {
        self.repeat = repeat;
        self
    }

    pub fn with_hold_frames(mut self, frames: usize) -> Self {
        self.hold_frames = frames;
        self
    }

    pub fn with_close_loop(mut self, close_loop: bool) -> Self {
        self.close_loop = close_loop;
        self
    }

    pub fn with_axis_margin(mut self, margin: f64) -> Self {
        self.axis_margin = margin;
        self
    }

    pub fn with_marker(mut self, radius: u32, opacity: f64) -> Self {
        self.marker_radius = radius;
        self.marker_opacity = opacity;
        self
    }

    pub fn with_palette(mut self, palette: Vec<Rgb>) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_color(mut self, label: ClassLabel, color: Rgb) -> Self {
        self.colors.insert(label, color);
        self
    }

    pub fn with_class_names(mut self, names: Vec<String>) -> Self {
        self.class_names = names;
        self
    }

    pub fn with_axis_names(mut self, x: impl Into<String>, y: impl Into<String>) -> Self {
        self.axis_names = (x.into(), y.into());
        self
    }

    pub fn with_legend(mut self, legend: bool) -> Self {
        self.legend = legend;
        self
    }

    pub fn with_font(mut self, path: impl Into<PathBuf>) -> Self {
        self.font = Some(path.into());
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Check every field, reporting the first invalid one
    pub fn validate(&self) -> Result<()> {
        if self.frames_per_transition < MIN_TRANSITION_FRAMES {
            return Err(MorphError::InsufficientData(format!(
                "frames_per_transition must be at least {}, got {}",
                MIN_TRANSITION_FRAMES, self.frames_per_transition
            )));
        }
        if !self.axis_margin.is_finite() || self.axis_margin < 0.0 {
            return Err(MorphError::invalid_parameter(
                "axis_margin",
                self.axis_margin,
                "must be a non-negative number",
            ));
        }
        self.render_style().validate()?;
        self.gif_settings().validate()
    }

    /// Frame appearance derived from this configuration
    pub fn render_style(&self) -> RenderStyle {
        RenderStyle {
            figure_size: self.figure_size,
            background: self.background,
            border: self.border,
            marker_radius: self.marker_radius,
            marker_opacity: self.marker_opacity,
            axis_names: self.axis_names.clone(),
            legend: self.legend,
            font: self.font.clone(),
            ..RenderStyle::default()
        }
    }

    pub fn gif_settings(&self) -> GifSettings {
        GifSettings {
            frame_duration_ms: self.frame_duration_ms,
            repeat: self.repeat,
            speed: self.encoder_speed,
        }
    }

    /// Color map for `labels`: palette assignment, then explicit overrides,
    /// named by `class_names`
    pub fn color_map(&self, labels: &[ClassLabel]) -> ColorMap {
        self.colors
            .iter()
            .fold(ColorMap::from_labels(labels, &self.palette), |map, (&label, &color)| {
                map.with_color(label, color)
            })
            .with_names(&self.class_names)
    }

    /// Load from a JSON file. Missing fields take their default values.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        Ok(config)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = AnimationConfig::default();
        assert_eq!(config.figure_size, (640, 480));
        assert_eq!(config.frames_per_transition, 30);
        assert_eq!(config.frame_duration_ms, 40);
        assert!(config.repeat);
        assert_eq!(config.hold_frames, 0);
        assert!(!config.close_loop);
        assert_eq!(config.axis_margin, 0.1);
        assert_eq!(config.marker_opacity, 0.5);
        assert_eq!(config.palette.len(), 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = AnimationConfig::new()
            .with_figure_size(320, 240)
            .with_frames_per_transition(12)
            .with_frame_duration_ms(100)
            .with_repeat(false)
            .with_hold_frames(3)
            .with_close_loop(true)
            .with_marker(6, 0.8)
            .with_parallel(true);

        assert_eq!(config.render_style().figure_size, (320, 240));
        assert_eq!(config.render_style().marker_radius, 6);
        assert_eq!(config.gif_settings().frame_duration_ms, 100);
        assert!(!config.gif_settings().repeat);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let config = AnimationConfig::new().with_frames_per_transition(1);
        assert!(matches!(config.validate(), Err(MorphError::InsufficientData(_))));

        let config = AnimationConfig::new().with_axis_margin(-0.5);
        assert!(matches!(config.validate(), Err(MorphError::InvalidParameter { .. })));

        let config = AnimationConfig::new().with_marker(4, 2.0);
        assert!(config.validate().is_err());

        let config = AnimationConfig::new().with_frame_duration_ms(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_color_map_overrides() {
        let config = AnimationConfig::new().with_color(1, Rgb::BLACK);
        let map = config.color_map(&[0, 1, 2]);
        assert_eq!(map.color_for(0), TAB10[0]);
        assert_eq!(map.color_for(1), Rgb::BLACK);
        assert_eq!(map.color_for(2), TAB10[2]);
    }

    #[test]
    fn test_chrome_options_reach_render_style() {
        let config = AnimationConfig::new()
            .with_axis_names("dim 1", "dim 2")
            .with_legend(true)
            .with_font("/fonts/custom.ttf")
            .with_class_names(vec!["setosa".into(), "versicolor".into()]);

        let style = config.render_style();
        assert_eq!(style.axis_names, ("dim 1".to_string(), "dim 2".to_string()));
        assert!(style.legend);
        assert_eq!(style.font, Some(PathBuf::from("/fonts/custom.ttf")));

        let map = config.color_map(&[0, 1, 2]);
        assert_eq!(map.name_for(1), "versicolor");
        assert_eq!(map.name_for(2), "2");

        let defaults = AnimationConfig::default().render_style();
        assert!(!defaults.legend);
        assert_eq!(defaults.axis_names, (String::new(), String::new()));
    }

    #[test]
    fn test_config_json_roundtrip_and_partial() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let config = AnimationConfig::new()
            .with_frames_per_transition(8)
            .with_color(3, Rgb(1, 2, 3));
        config.to_json_file(file.path()).unwrap();
        let loaded = AnimationConfig::from_json_file(file.path()).unwrap();
        assert_eq!(loaded, config);

        let partial: AnimationConfig =
            serde_json::from_str(r#"{ "frames_per_transition": 5, "repeat": false }"#).unwrap();
        assert_eq!(partial.frames_per_transition, 5);
        assert!(!partial.repeat);
        assert_eq!(partial.figure_size, (640, 480));
    }

    #[test]
    fn test_config_bad_json() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "{ not json").unwrap();
        assert!(matches!(
            AnimationConfig::from_json_file(file.path()),
            Err(MorphError::SerializationError(_))
        ));
    }
}
