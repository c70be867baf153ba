//! Scatter-plot rendering of a single frame
//!
//! Everything that affects the look of a frame travels in explicit values:
//! [`RenderStyle`] for the figure, [`ColorMap`] for label colors and
//! [`AxisLimits`] for the viewport. Limits are computed once per animation so
//! the view never rescales between frames.
//!
//! Axis names and the class legend are static chrome: they look the same on
//! every frame. Text needs a registered font (see [`super::font`]); without
//! one the legend keeps its color swatches and the text is left out.

use super::embedding::{Axis2, ClassLabel, NormalizedEmbedding, Point2};
use super::font::{ensure_font, FONT_FAMILY};
use crate::error::{MorphError, Result};
use image::{DynamicImage, RgbImage, RgbaImage};
use plotters::coord::Shift;
use plotters::drawing::DrawingArea;
use plotters::element::Text;
use plotters::prelude::{
    BitMapBackend, ChartBuilder, Circle, Color, FontDesc, IntoDrawingArea, IntoFont, RGBColor,
    Rectangle,
};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::Range;
use std::path::PathBuf;
use std::str::FromStr;

/// Narrowest span an axis may have before it is widened around its center
const MIN_AXIS_SPAN: f64 = 1e-9;

/// Text height in pixels for axis names and legend entries
const TEXT_SIZE: f64 = 12.0;

const LEGEND_TITLE: &str = "Classes";
/// Height of one legend row in pixels
const LEGEND_ROW: i32 = 16;
/// Offset of the legend box from the plotting-area corner
const LEGEND_INSET: i32 = 6;
/// Inner padding of the legend box
const LEGEND_PAD: i32 = 4;
const LEGEND_SWATCH_RADIUS: i32 = 5;

/// An opaque 8-bit RGB color. Serializes as `[r, g, b]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const GRAY: Rgb = Rgb(127, 127, 127);

    fn to_plotters(self) -> RGBColor {
        RGBColor(self.0, self.1, self.2)
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.0, self.1, self.2]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = MorphError;

    /// Parse `#rrggbb` or `rrggbb`
    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        let invalid = || MorphError::invalid_parameter("color", s, "expected #rrggbb");
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// matplotlib's "tab10" qualitative palette
pub const TAB10: [Rgb; 10] = [
    Rgb(31, 119, 180),
    Rgb(255, 127, 14),
    Rgb(44, 160, 44),
    Rgb(214, 39, 40),
    Rgb(148, 103, 189),
    Rgb(140, 86, 75),
    Rgb(227, 119, 194),
    Rgb(127, 127, 127),
    Rgb(188, 189, 34),
    Rgb(23, 190, 207),
];

/// Fixed label → color assignment for a whole animation, plus the display
/// name of each label for the legend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorMap {
    colors: BTreeMap<ClassLabel, Rgb>,
    fallback: Rgb,
    #[serde(default)]
    names: BTreeMap<ClassLabel, String>,
}

impl Default for ColorMap {
    fn default() -> Self {
        Self {
            colors: BTreeMap::new(),
            fallback: Rgb::GRAY,
            names: BTreeMap::new(),
        }
    }
}

impl ColorMap {
    /// Assign palette colors to the distinct labels in ascending label order,
    /// cycling through the palette when there are more labels than colors.
    pub fn from_labels(labels: &[ClassLabel], palette: &[Rgb]) -> Self {
        let palette = if palette.is_empty() { &TAB10[..] } else { palette };
        let distinct: BTreeSet<ClassLabel> = labels.iter().copied().collect();
        let colors = distinct
            .into_iter()
            .enumerate()
            .map(|(i, label)| (label, palette[i % palette.len()]))
            .collect();
        Self {
            colors,
            ..Self::default()
        }
    }

    /// Override the color of one label
    pub fn with_color(mut self, label: ClassLabel, color: Rgb) -> Self {
        self.colors.insert(label, color);
        self
    }

    /// Color used for labels without an assignment
    pub fn with_fallback(mut self, color: Rgb) -> Self {
        self.fallback = color;
        self
    }

    /// Name label `label` in the legend
    pub fn with_name(mut self, label: ClassLabel, name: impl Into<String>) -> Self {
        self.names.insert(label, name.into());
        self
    }

    /// Name labels by position: `names[i]` names label `i`
    pub fn with_names(mut self, names: &[String]) -> Self {
        for (i, name) in names.iter().enumerate() {
            self.names.insert(i as ClassLabel, name.clone());
        }
        self
    }

    /// Legend text of `label`; the label id when it has no name
    pub fn name_for(&self, label: ClassLabel) -> String {
        self.names
            .get(&label)
            .cloned()
            .unwrap_or_else(|| label.to_string())
    }

    pub fn color_for(&self, label: ClassLabel) -> Rgb {
        self.colors.get(&label).copied().unwrap_or(self.fallback)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassLabel, Rgb)> + '_ {
        self.colors.iter().map(|(&label, &color)| (label, color))
    }
}

/// Fixed viewport shared by every frame of an animation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisLimits {
    pub x: (f64, f64),
    pub y: (f64, f64),
}

impl AxisLimits {
    pub fn new(x: (f64, f64), y: (f64, f64)) -> Self {
        Self {
            x: widen(x),
            y: widen(y),
        }
    }

    /// Union of the bounding boxes of all embeddings, widened by `margin` on
    /// every side.
    ///
    /// Straight-line paths between two layouts stay inside the union of their
    /// bounding boxes, so these limits hold every interpolated frame as well.
    pub fn from_embeddings<'a, I>(embeddings: I, margin: f64) -> Result<Self>
    where
        I: IntoIterator<Item = &'a NormalizedEmbedding>,
    {
        let mut bounds: [Option<(f64, f64)>; 2] = [None, None];
        for embedding in embeddings {
            for axis in Axis2::BOTH {
                if let Some((lo, hi)) = embedding.axis_range(axis) {
                    let slot = &mut bounds[axis.index()];
                    *slot = Some(match *slot {
                        None => (lo, hi),
                        Some((a, b)) => (a.min(lo), b.max(hi)),
                    });
                }
            }
        }

        match bounds {
            [Some((x0, x1)), Some((y0, y1))] => Ok(Self::new(
                (x0 - margin, x1 + margin),
                (y0 - margin, y1 + margin),
            )),
            _ => Err(MorphError::InsufficientData(
                "cannot compute axis limits without points".to_string(),
            )),
        }
    }

    pub fn contains(&self, p: Point2) -> bool {
        p[0] >= self.x.0 && p[0] <= self.x.1 && p[1] >= self.y.0 && p[1] <= self.y.1
    }
}

fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if hi - lo < MIN_AXIS_SPAN {
        let center = (lo + hi) / 2.0;
        (center - 0.5, center + 0.5)
    } else {
        (lo, hi)
    }
}

/// Static look of every frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// Frame size in pixels (width, height)
    pub figure_size: (u32, u32),
    pub background: Rgb,
    /// Plotting-area outline; `None` draws no border
    pub border: Option<Rgb>,
    /// Marker radius in pixels
    pub marker_radius: u32,
    /// Marker alpha in [0, 1]
    pub marker_opacity: f64,
    /// Space between the figure edge and the plotting area, in pixels
    pub padding: u32,
    /// Names drawn under the x axis and above the y axis; empty draws nothing
    pub axis_names: (String, String),
    /// Draw a class legend in the upper-left corner of the plotting area
    pub legend: bool,
    /// TrueType font for text, tried before the system fonts
    pub font: Option<PathBuf>,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            figure_size: (640, 480),
            background: Rgb::WHITE,
            border: Some(Rgb::BLACK),
            marker_radius: 4,
            marker_opacity: 0.5,
            padding: 16,
            axis_names: (String::new(), String::new()),
            legend: false,
            font: None,
        }
    }
}

impl RenderStyle {
    pub fn validate(&self) -> Result<()> {
        let (w, h) = self.figure_size;
        if w == 0 || h == 0 {
            return Err(MorphError::invalid_parameter(
                "figure_size",
                format!("{}x{}", w, h),
                "width and height must be positive",
            ));
        }
        if 2 * self.padding >= w.min(h) {
            return Err(MorphError::invalid_parameter(
                "padding",
                self.padding,
                "must leave room for the plotting area",
            ));
        }
        if !(0.0..=1.0).contains(&self.marker_opacity) {
            return Err(MorphError::invalid_parameter(
                "marker_opacity",
                self.marker_opacity,
                "must be in [0, 1]",
            ));
        }
        Ok(())
    }

    fn has_axis_names(&self) -> bool {
        !self.axis_names.0.is_empty() || !self.axis_names.1.is_empty()
    }
}

fn render_err<E: fmt::Display>(err: E) -> MorphError {
    MorphError::RenderError(err.to_string())
}

fn text_font() -> FontDesc<'static> {
    (FONT_FAMILY, TEXT_SIZE).into_font()
}

/// Pixel center of the swatch of legend entry `index`, for a plotting area
/// whose top-left corner is `origin`. Row 0 holds the title.
fn legend_swatch_center(origin: (i32, i32), index: usize) -> (i32, i32) {
    let x = origin.0 + LEGEND_INSET + LEGEND_PAD + LEGEND_SWATCH_RADIUS;
    let y = origin.1 + LEGEND_INSET + LEGEND_PAD + LEGEND_ROW * (index as i32 + 1) + LEGEND_ROW / 2;
    (x, y)
}

fn draw_axis_names(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    (x_name, y_name): &(String, String),
    x_range: &Range<i32>,
    y_range: &Range<i32>,
) -> Result<()> {
    let black = Rgb::BLACK.to_plotters();
    if !x_name.is_empty() {
        let style = text_font().color(&black).pos(Pos::new(HPos::Right, VPos::Top));
        root.draw(&Text::new(x_name.as_str(), (x_range.end, y_range.end + 2), style))
            .map_err(render_err)?;
    }
    if !y_name.is_empty() {
        let style = text_font().color(&black).pos(Pos::new(HPos::Left, VPos::Bottom));
        root.draw(&Text::new(y_name.as_str(), (x_range.start, y_range.start - 2), style))
            .map_err(render_err)?;
    }
    Ok(())
}

/// One entry per distinct label of the frame, in ascending label order
fn draw_legend(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    labels: &[ClassLabel],
    color_map: &ColorMap,
    origin: (i32, i32),
    with_text: bool,
) -> Result<()> {
    let entries: Vec<(ClassLabel, String)> = labels
        .iter()
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(|label| (label, color_map.name_for(label)))
        .collect();
    if entries.is_empty() {
        return Ok(());
    }

    let font = text_font();
    let mut text_width = 0;
    if with_text {
        for text in entries.iter().map(|(_, n)| n.as_str()).chain([LEGEND_TITLE]) {
            let (w, _) = font.box_size(text).map_err(render_err)?;
            text_width = text_width.max(w as i32);
        }
    }

    let left = origin.0 + LEGEND_INSET;
    let top = origin.1 + LEGEND_INSET;
    let width = LEGEND_PAD * 3 + LEGEND_SWATCH_RADIUS * 2 + text_width;
    let height = LEGEND_PAD * 2 + LEGEND_ROW * (entries.len() as i32 + 1);
    let corners = [(left, top), (left + width, top + height)];
    root.draw(&Rectangle::new(corners, Rgb::WHITE.to_plotters().filled()))
        .map_err(render_err)?;
    root.draw(&Rectangle::new(corners, Rgb::GRAY.to_plotters().stroke_width(1)))
        .map_err(render_err)?;

    let black = Rgb::BLACK.to_plotters();
    let text_style = font.color(&black).pos(Pos::new(HPos::Left, VPos::Center));
    if with_text {
        let title_y = top + LEGEND_PAD + LEGEND_ROW / 2;
        root.draw(&Text::new(LEGEND_TITLE, (left + LEGEND_PAD, title_y), text_style.clone()))
            .map_err(render_err)?;
    }

    for (i, (label, name)) in entries.iter().enumerate() {
        let center = legend_swatch_center(origin, i);
        let color = color_map.color_for(*label).to_plotters();
        root.draw(&Circle::new(center, LEGEND_SWATCH_RADIUS as u32, color.filled()))
            .map_err(render_err)?;
        if with_text {
            let at = (center.0 + LEGEND_SWATCH_RADIUS + LEGEND_PAD, center.1);
            root.draw(&Text::new(name.as_str(), at, text_style.clone()))
                .map_err(render_err)?;
        }
    }
    Ok(())
}

/// Rasterize one scatter plot: one marker per point, colored by its label.
pub fn render_frame(
    coordinates: &[Point2],
    labels: &[ClassLabel],
    color_map: &ColorMap,
    limits: &AxisLimits,
    style: &RenderStyle,
) -> Result<RgbaImage> {
    style.validate()?;
    draw_frame(coordinates, labels, color_map, limits, style)
}

/// [`render_frame`] for a style that was already validated, as every
/// [`AnimationPlan`](super::animator::AnimationPlan) style is.
pub(crate) fn draw_frame(
    coordinates: &[Point2],
    labels: &[ClassLabel],
    color_map: &ColorMap,
    limits: &AxisLimits,
    style: &RenderStyle,
) -> Result<RgbaImage> {
    if coordinates.len() != labels.len() {
        return Err(MorphError::ShapeMismatch {
            name: "labels".to_string(),
            expected: coordinates.len(),
            actual: labels.len(),
        });
    }
    let with_text = (style.legend || style.has_axis_names()) && ensure_font(style.font.as_deref());

    let (width, height) = style.figure_size;
    let mut buffer = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        root.fill(&style.background.to_plotters()).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(style.padding)
            .build_cartesian_2d(limits.x.0..limits.x.1, limits.y.0..limits.y.1)
            .map_err(render_err)?;

        if let Some(border) = style.border {
            chart
                .plotting_area()
                .draw(&Rectangle::new(
                    [(limits.x.0, limits.y.0), (limits.x.1, limits.y.1)],
                    border.to_plotters().stroke_width(1),
                ))
                .map_err(render_err)?;
        }

        chart
            .draw_series(coordinates.iter().zip(labels).map(|(p, &label)| {
                let color = color_map
                    .color_for(label)
                    .to_plotters()
                    .mix(style.marker_opacity);
                Circle::new((p[0], p[1]), style.marker_radius, color.filled())
            }))
            .map_err(render_err)?;

        let (x_range, y_range) = chart.plotting_area().get_pixel_range();
        if with_text {
            draw_axis_names(&root, &style.axis_names, &x_range, &y_range)?;
        }
        if style.legend {
            draw_legend(&root, labels, color_map, (x_range.start, y_range.start), with_text)?;
        }

        root.present().map_err(render_err)?;
    }

    let rgb = RgbImage::from_raw(width, height, buffer)
        .ok_or_else(|| MorphError::RenderError("frame buffer size mismatch".to_string()))?;
    Ok(DynamicImage::ImageRgb8(rgb).into_rgba8())
}
