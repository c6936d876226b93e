//! Export of rendered diagrams
//!
//! Artifacts are derived on demand from the last committed render result.
//! Only a successful result can be exported: while idle, while a render is
//! in flight, or after a failure there is nothing to export.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, span, warn, Level};

use crate::core::DiagramError;
use crate::render::RenderResult;

/// Raster exports are drawn at twice the natural size of the graphic
pub const RASTER_SCALE: f32 = 2.0;

/// Name used when a title sanitizes down to nothing
pub const FALLBACK_FILE_STEM: &str = "diagram";

/// Characters that cannot appear in a portable file name
const PATH_HOSTILE: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Output file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Svg,
    Png,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Png => "png",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "image/svg+xml",
            ExportFormat::Png => "image/png",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// A finished export, ready to be saved or downloaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub format: ExportFormat,
    pub bytes: Vec<u8>,
}

impl ExportArtifact {
    /// Write the artifact into `dir` under its own file name.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf, DiagramError> {
        let path = dir.join(&self.file_name);
        fs::write(&path, &self.bytes)?;
        info!(path = %path.display(), bytes = self.bytes.len(), "Export written");
        Ok(path)
    }
}

/// Build a file name from a diagram title.
///
/// # Example
/// ```
/// use mermend::export::{export_file_name, ExportFormat};
///
/// assert_eq!(export_file_name("Login  flow: v2", ExportFormat::Svg), "Login_flow_v2.svg");
/// assert_eq!(export_file_name(" ?? ", ExportFormat::Png), "diagram.png");
/// ```
pub fn export_file_name(title: &str, format: ExportFormat) -> String {
    let joined = title.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned: String = joined
        .chars()
        .filter(|c| !PATH_HOSTILE.contains(c) && !c.is_control())
        .collect();
    let stem = cleaned.trim_matches('.');

    let stem = if stem.is_empty() {
        FALLBACK_FILE_STEM
    } else {
        stem
    };
    format!("{}.{}", stem, format.extension())
}

/// The committed graphic, or the export refusal
fn committed_graphic(result: Option<&RenderResult>, format: ExportFormat) -> Result<&str, DiagramError> {
    match result.and_then(RenderResult::graphic) {
        Some(graphic) => Ok(graphic),
        None => {
            warn!(export_format = %format, "Export requested without a rendered diagram");
            Err(DiagramError::NothingToExport)
        }
    }
}

/// Export the rendered SVG as is.
pub fn export_svg(result: Option<&RenderResult>, title: &str) -> Result<ExportArtifact, DiagramError> {
    let graphic = committed_graphic(result, ExportFormat::Svg)?;
    let file_name = export_file_name(title, ExportFormat::Svg);
    debug!(file_name = %file_name, bytes = graphic.len(), "SVG export ready");

    Ok(ExportArtifact {
        file_name,
        format: ExportFormat::Svg,
        bytes: graphic.as_bytes().to_vec(),
    })
}

/// Rasterize the rendered SVG to PNG at [`RASTER_SCALE`] on opaque white.
pub fn export_png(result: Option<&RenderResult>, title: &str) -> Result<ExportArtifact, DiagramError> {
    let graphic = committed_graphic(result, ExportFormat::Png)?;
    let file_name = export_file_name(title, ExportFormat::Png);
    let bytes = rasterize(graphic, RASTER_SCALE)?;
    debug!(file_name = %file_name, bytes = bytes.len(), "PNG export ready");

    Ok(ExportArtifact {
        file_name,
        format: ExportFormat::Png,
        bytes,
    })
}

/// Render an SVG document into PNG bytes.
///
/// The pixmap is sized from the document's natural size times `scale` and
/// filled white before drawing, so the image has no transparent areas.
pub fn rasterize(svg: &str, scale: f32) -> Result<Vec<u8>, DiagramError> {
    let raster_span = span!(Level::DEBUG, "rasterize", svg_len = svg.len(), scale);
    let _enter = raster_span.enter();

    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| DiagramError::svg_parse(e.to_string()))?;

    let size = tree.size();
    let width = (size.width() * scale).ceil().max(1.0) as u32;
    let height = (size.height() * scale).ceil().max(1.0) as u32;
    debug!(width, height, "Allocating pixmap");

    let mut pixmap = tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| DiagramError::raster(format!("cannot allocate {}x{} pixmap", width, height)))?;
    pixmap.fill(tiny_skia::Color::WHITE);

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );

    pixmap
        .encode_png()
        .map_err(|e| DiagramError::raster(e.to_string()))
}
