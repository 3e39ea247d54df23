use super::{ExtractorError, TextExtractor, is_pdf};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::process::Command;

const RENDER_DPI: &str = "300";

/// OCR fallback built on the `pdftoppm` and `tesseract` command-line tools.
///
/// The document is written into a scratch directory that is removed when the call returns,
/// whether recognition succeeded or not. PDFs are rendered to one PNG per page and recognized in
/// page order; other payloads are handed to `tesseract` directly as images.
#[derive(Debug, Clone)]
pub struct TesseractOcr {
    tesseract_bin: String,
    pdftoppm_bin: String,
    language: String,
}

impl TesseractOcr {
    /// Configure the binaries and language pack used for recognition.
    pub fn new(tesseract_bin: String, pdftoppm_bin: String, language: String) -> Self {
        Self {
            tesseract_bin,
            pdftoppm_bin,
            language,
        }
    }

    async fn render_pages(
        &self,
        pdf: &Path,
        workdir: &Path,
    ) -> Result<Vec<PathBuf>, ExtractorError> {
        let prefix = workdir.join("page");
        let output = Command::new(&self.pdftoppm_bin)
            .arg("-png")
            .arg("-r")
            .arg(RENDER_DPI)
            .arg(pdf)
            .arg(&prefix)
            .output()
            .await
            .map_err(|error| tool_error(&self.pdftoppm_bin, error.to_string()))?;

        if !output.status.success() {
            return Err(tool_error(
                &self.pdftoppm_bin,
                format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        let mut pages = Vec::new();
        let mut entries = tokio::fs::read_dir(workdir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if let Some(number) = page_number(&path) {
                pages.push((number, path));
            }
        }
        pages.sort_by_key(|(number, _)| *number);
        Ok(pages.into_iter().map(|(_, path)| path).collect())
    }

    async fn recognize(&self, image: &Path) -> Result<String, ExtractorError> {
        let output = Command::new(&self.tesseract_bin)
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.language)
            .output()
            .await
            .map_err(|error| tool_error(&self.tesseract_bin, error.to_string()))?;

        if !output.status.success() {
            return Err(tool_error(
                &self.tesseract_bin,
                format!(
                    "{}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl TextExtractor for TesseractOcr {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn extract_text(&self, bytes: &[u8]) -> Result<String, ExtractorError> {
        let workdir = tempfile::Builder::new().prefix("plainly-ocr-").tempdir()?;

        if !is_pdf(bytes) {
            let image = workdir.path().join("upload.img");
            tokio::fs::write(&image, bytes).await?;
            return self.recognize(&image).await;
        }

        let pdf = workdir.path().join("upload.pdf");
        tokio::fs::write(&pdf, bytes).await?;
        let pages = self.render_pages(&pdf, workdir.path()).await?;
        if pages.is_empty() {
            return Err(tool_error(&self.pdftoppm_bin, "rendered no pages".into()));
        }

        let mut page_texts = Vec::with_capacity(pages.len());
        for (index, page) in pages.iter().enumerate() {
            let text = self.recognize(page).await?;
            tracing::debug!(
                page = index + 1,
                pages = pages.len(),
                characters = text.len(),
                "Recognized page"
            );
            if !text.trim().is_empty() {
                page_texts.push(text.trim_end().to_string());
            }
        }

        Ok(page_texts.join("\n\n"))
    }
}

fn tool_error(tool: &str, message: String) -> ExtractorError {
    ExtractorError::Tool {
        tool: tool.to_string(),
        message,
    }
}

/// Parse the page number out of `pdftoppm` output names such as `page-07.png`.
fn page_number(path: &Path) -> Option<u32> {
    if path.extension()?.to_str()? != "png" {
        return None;
    }
    path.file_stem()?
        .to_str()?
        .strip_prefix("page-")?
        .parse()
        .ok()
}
