use crate::engines::PageRenderer;
use crate::utils::KycError;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Renders page 1 of a PDF with `pdftoppm` (poppler-utils). 216 dpi is 3x
/// the 72 dpi base scale, so small or vector-rendered text stays legible for
/// OCR. The rendered image lands next to the source file; cleanup is the
/// caller's responsibility.
pub struct PdftoppmRenderer;

impl PdftoppmRenderer {
    pub fn new() -> Self {
        PdftoppmRenderer
    }
}

impl Default for PdftoppmRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn render_first_page(&self, document: &Path) -> Result<PathBuf, KycError> {
        let stem = document
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| KycError::PageRendering("Document path has no file stem".to_string()))?;

        let output_prefix = document.with_file_name(format!("{}_rendered", stem));

        let status = Command::new("pdftoppm")
            .args(["-png", "-singlefile", "-r", "216", "-f", "1", "-l", "1"])
            .arg(document)
            .arg(&output_prefix)
            .status();

        match status {
            Ok(s) if s.success() => {
                let rendered = output_prefix.with_extension("png");
                if rendered.exists() {
                    log::info!("Rendered first page to {}", rendered.display());
                    Ok(rendered)
                } else {
                    Err(KycError::PageRendering(
                        "pdftoppm produced no page image".to_string(),
                    ))
                }
            }
            Ok(_) => Err(KycError::PageRendering(
                "pdftoppm failed to render the PDF page".to_string(),
            )),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(KycError::PageRendering(
                "pdftoppm not found (install poppler-utils)".to_string(),
            )),
            Err(e) => Err(KycError::Io(e)),
        }
    }
}
