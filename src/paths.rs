use std::path::{Path, PathBuf};

use anyhow::Result;
use image::ImageFormat;

/// File stem used for annotated output images
pub const OUTPUT_STEM: &str = "output";

/// Derive the annotated image path for `input`: same directory, stem replaced
/// with `output`, extension kept.
pub fn output_path(input: &Path) -> PathBuf {
    let file_name = match input.extension() {
        Some(ext) => format!("{}.{}", OUTPUT_STEM, ext.to_string_lossy()),
        None => OUTPUT_STEM.to_string(),
    };
    input.with_file_name(file_name)
}

/// Check that `path` names an existing regular file.
///
/// Returns the image format implied by the extension, or `None` when the
/// extension is unknown. An unknown extension is not an error; the library
/// may still be able to read the file.
pub fn check_input(path: &Path) -> Result<Option<ImageFormat>> {
    if !path.exists() {
        anyhow::bail!("input file not found: {}", path.display());
    }
    if !path.is_file() {
        anyhow::bail!("input is not a file: {}", path.display());
    }
    Ok(ImageFormat::from_path(path).ok())
}
