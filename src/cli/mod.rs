//! projection-morph CLI Module
//!
//! Command-line interface for building transition GIFs from datasets and
//! precomputed embeddings.

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::animation::{AnimationConfig, AnimationSummary, ClassLabel, Embedding, Rgb, TransitionAnimator};
use crate::data::{load_dataset, load_embedding, make_blobs, Dataset, Projection};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString    { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn kv(key: &str, val: &str) {
    println!("  {:<14} {}", muted(key), val.white());
}

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
    let _ = std::io::stdout().flush();
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn progress_line(done: usize, total: usize) {
    let pct = done as f64 / total.max(1) as f64 * 100.0;
    print!("\r  {} Rendering {:>6.2} %  {}", accent("›"), pct, dim(&format!("{}/{}", done, total)));
    let _ = std::io::stdout().flush();
    if done == total {
        println!();
    }
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "projection-morph")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Animate a labeled dataset morphing between 2-D projections")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a transition GIF from a labeled CSV dataset
    Animate {
        /// Input data file (CSV with a header row)
        #[arg(short, long)]
        data: PathBuf,

        /// Name of the class label column
        #[arg(short, long, default_value = "label")]
        label_column: String,

        /// Projection of the dataset: `pca` or `raw:<x>,<y>` (repeatable, in order)
        #[arg(short, long = "projection")]
        projections: Vec<String>,

        /// Precomputed embedding CSV, one row per data point (repeatable, after projections)
        #[arg(short, long = "embedding")]
        embeddings: Vec<PathBuf>,

        /// Output GIF file
        #[arg(short, long, default_value = "transitions.gif")]
        output: PathBuf,

        /// JSON configuration file (see the `config` command)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Frames per transition
        #[arg(long)]
        frames: Option<usize>,

        /// Milliseconds per frame
        #[arg(long)]
        duration: Option<u32>,

        /// Frame width in pixels
        #[arg(long)]
        width: Option<u32>,

        /// Frame height in pixels
        #[arg(long)]
        height: Option<u32>,

        /// Static frames shown for each embedding
        #[arg(long)]
        hold: Option<usize>,

        /// Transition from the last embedding back to the first
        #[arg(long)]
        close_loop: bool,

        /// Play the GIF once instead of looping
        #[arg(long)]
        no_repeat: bool,

        /// Render frames in parallel
        #[arg(long)]
        parallel: bool,

        /// Color override `<label>=#rrggbb`, label by name or id (repeatable)
        #[arg(long = "color")]
        colors: Vec<String>,

        #[command(flatten)]
        chrome: ChromeArgs,
    },

    /// Build a demo GIF from synthetic clusters
    Demo {
        /// Output GIF file
        #[arg(short, long, default_value = "demo.gif")]
        output: PathBuf,

        /// Points per class
        #[arg(long, default_value = "60")]
        points: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Print the default animation configuration as JSON
    Config,
}

/// Axis names and legend options
#[derive(Args, Debug, Clone, Default)]
pub struct ChromeArgs {
    /// Draw a class legend
    #[arg(long)]
    pub legend: bool,

    /// Name of the x axis
    #[arg(long)]
    pub x_label: Option<String>,

    /// Name of the y axis
    #[arg(long)]
    pub y_label: Option<String>,

    /// TrueType font for axis names and the legend
    #[arg(long)]
    pub font: Option<PathBuf>,
}

impl ChromeArgs {
    fn apply(&self, config: &mut AnimationConfig) {
        config.legend |= self.legend;
        if let Some(x) = &self.x_label {
            config.axis_names.0 = x.clone();
        }
        if let Some(y) = &self.y_label {
            config.axis_names.1 = y.clone();
        }
        if let Some(font) = &self.font {
            config.font = Some(font.clone());
        }
    }
}

// ─── Helpers ───────────────────────────────────────────────────────────────────

fn parse_color_override(arg: &str, dataset: &Dataset) -> anyhow::Result<(ClassLabel, Rgb)> {
    let (label, color) = arg
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Invalid color override '{}', expected <label>=#rrggbb", arg))?;

    let id = match dataset.label_names().iter().position(|n| n == label) {
        Some(i) => i as ClassLabel,
        None => label
            .parse::<ClassLabel>()
            .map_err(|_| anyhow::anyhow!("Unknown label '{}'", label))?,
    };
    Ok((id, color.parse()?))
}

fn print_summary(summary: &AnimationSummary, embeddings: &[Embedding]) {
    println!();
    let names: Vec<&str> = embeddings.iter().map(Embedding::name).collect();
    kv("Sequence", &names.join(" → "));
    kv("Frames", &summary.frame_count.to_string());
    kv("Transitions", &summary.transition_count.to_string());
    kv("Size", &format!("{}×{}", summary.figure_size.0, summary.figure_size.1));
    kv("File", &format!("{} ({} KiB)", summary.path.display(), summary.bytes / 1024));
    kv("Time", &format!("{:.2}s", summary.elapsed.as_secs_f64()));
    println!();
}

fn run_animation(
    config: AnimationConfig,
    embeddings: &[Embedding],
    labels: &[ClassLabel],
    output: &Path,
) -> anyhow::Result<AnimationSummary> {
    let animator = TransitionAnimator::new(config)?;
    let summary =
        animator.build_animation_with_progress(embeddings, labels, output, progress_line)?;
    step_ok(&format!("Saved {}", output.display().to_string().cyan()));
    Ok(summary)
}

// ─── Commands ──────────────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn cmd_animate(
    data_path: &Path,
    label_column: &str,
    projections: &[String],
    embedding_paths: &[PathBuf],
    output: &Path,
    config_path: Option<&Path>,
    frames: Option<usize>,
    duration: Option<u32>,
    size: (Option<u32>, Option<u32>),
    hold: Option<usize>,
    close_loop: bool,
    no_repeat: bool,
    parallel: bool,
    colors: &[String],
    chrome: &ChromeArgs,
) -> anyhow::Result<()> {
    section("Animate");

    let mut config = match config_path {
        Some(path) => AnimationConfig::from_json_file(path)?,
        None => AnimationConfig::default(),
    };
    if let Some(frames) = frames {
        config.frames_per_transition = frames;
    }
    if let Some(ms) = duration {
        config.frame_duration_ms = ms;
    }
    if let Some(w) = size.0 {
        config.figure_size.0 = w;
    }
    if let Some(h) = size.1 {
        config.figure_size.1 = h;
    }
    if let Some(hold) = hold {
        config.hold_frames = hold;
    }
    config.close_loop |= close_loop;
    config.parallel |= parallel;
    if no_repeat {
        config.repeat = false;
    }
    chrome.apply(&mut config);

    step_run("Loading data");
    let start = Instant::now();
    let dataset = load_dataset(data_path, label_column)?;
    step_done(&format!(
        "{} rows × {} features, {} classes in {:?}",
        dataset.n_samples(),
        dataset.n_features(),
        dataset.label_names().len(),
        start.elapsed()
    ));

    for arg in colors {
        let (label, color) = parse_color_override(arg, &dataset)?;
        config.colors.insert(label, color);
    }
    if config.class_names.is_empty() {
        config.class_names = dataset.label_names().to_vec();
    }

    let mut embeddings = Vec::with_capacity(projections.len() + embedding_paths.len());
    for arg in projections {
        let projection: Projection = arg.parse()?;
        step_run(&format!("Projecting {}", projection.to_string().cyan()));
        let start = Instant::now();
        let embedding = projection.project(&dataset)?;
        step_done(&format!("{:?}", start.elapsed()));
        embeddings.push(embedding);
    }
    for path in embedding_paths {
        step_run(&format!("Loading embedding {}", path.display()));
        let embedding = load_embedding(path, None, None)?;
        step_done(&format!("{} points", embedding.len()));
        embeddings.push(embedding);
    }

    if embeddings.len() < 2 {
        anyhow::bail!(
            "Need at least 2 embeddings (got {}); pass --projection and/or --embedding",
            embeddings.len()
        );
    }

    let summary = run_animation(config, &embeddings, dataset.labels(), output)?;
    print_summary(&summary, &embeddings);
    Ok(())
}

pub fn cmd_demo(output: &Path, points: usize, seed: u64) -> anyhow::Result<()> {
    section("Demo");

    step_run("Generating clusters");
    let centers = vec![
        vec![0.0, 0.0, 5.0, 0.0],
        vec![4.0, 1.0, 0.0, 5.0],
        vec![1.0, 5.0, 2.5, 2.5],
    ];
    let dataset = make_blobs(points, &centers, 0.8, seed)?;
    step_done(&format!("{} points, {} classes", dataset.n_samples(), centers.len()));

    let mut embeddings = Vec::new();
    for projection in [
        Projection::Axes { x: 0, y: 1 },
        Projection::Axes { x: 2, y: 3 },
        Projection::Pca,
    ] {
        embeddings.push(projection.project(&dataset)?);
    }

    let config = AnimationConfig::default()
        .with_frames_per_transition(40)
        .with_hold_frames(15)
        .with_close_loop(true)
        .with_legend(true)
        .with_class_names(dataset.label_names().to_vec())
        .with_parallel(true);

    let summary = run_animation(config, &embeddings, dataset.labels(), output)?;
    print_summary(&summary, &embeddings);
    Ok(())
}

pub fn cmd_config() -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(&AnimationConfig::default())?);
    Ok(())
}
