//! Font lookup for frame text
//!
//! Text is rasterized with plotters' `ab_glyph` backend, which only draws
//! fonts registered at runtime. The first call to [`ensure_font`] loads one
//! TrueType file and registers it under [`FONT_FAMILY`] for the rest of the
//! process. When no file can be loaded, frames are drawn without text.

use plotters::style::{register_font, FontStyle};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Family name every text element is drawn with
pub const FONT_FAMILY: &str = "sans-serif";

/// Environment variable naming a TrueType font to use
pub const FONT_ENV_VAR: &str = "PROJECTION_MORPH_FONT";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceLock<Option<PathBuf>> = OnceLock::new();

fn candidates(preferred: Option<&Path>) -> Vec<PathBuf> {
    preferred
        .map(Path::to_path_buf)
        .into_iter()
        .chain(std::env::var_os(FONT_ENV_VAR).map(PathBuf::from))
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from))
        .collect()
}

fn register(path: &Path) -> bool {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    // plotters keeps a 'static reference; this happens once per process
    let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
    match register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
        Ok(()) => true,
        Err(_) => {
            warn!(path = %path.display(), "Ignoring unusable font");
            false
        }
    }
}

/// Register a font on first use and report whether text can be drawn.
///
/// `preferred` is tried first, then `$PROJECTION_MORPH_FONT`, then common
/// system locations. Only the first call's `preferred` path is considered.
pub fn ensure_font(preferred: Option<&Path>) -> bool {
    REGISTERED
        .get_or_init(|| {
            let found = candidates(preferred).into_iter().find(|path| register(path));
            match &found {
                Some(path) => debug!(path = %path.display(), "Registered font"),
                None => warn!(
                    env = FONT_ENV_VAR,
                    "No usable font found, frames are drawn without text"
                ),
            }
            found
        })
        .is_some()
}

/// Path of the registered font, if any
pub fn registered_font() -> Option<&'static Path> {
    REGISTERED.get().and_then(|p| p.as_deref())
}
