use crate::error::ExportError;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

// US letter, in points.
const PAGE_WIDTH_PT: f32 = 612.0;
const PAGE_HEIGHT_PT: f32 = 792.0;
const MARGIN_PT: f32 = 50.0;
const LINE_STEP_PT: f32 = 15.0;
const FONT_SIZE: f32 = 12.0;
const LAYER_NAME: &str = "Report";

fn mm(points: f32) -> Mm {
    Mm(points * 25.4 / 72.0)
}

/// Vertical position of each line and the page it lands on. A new page
/// starts once the cursor drops below the bottom margin.
pub fn layout(line_count: usize) -> Vec<(usize, f32)> {
    let top = PAGE_HEIGHT_PT - MARGIN_PT;
    let mut page = 0;
    let mut y = top;
    let mut positions = Vec::with_capacity(line_count);

    for _ in 0..line_count {
        positions.push((page, y));
        y -= LINE_STEP_PT;
        if y < MARGIN_PT {
            page += 1;
            y = top;
        }
    }
    positions
}

struct PageWriter {
    doc: PdfDocumentReference,
    font: IndirectFontRef,
    layer: PdfLayerReference,
    page: usize,
}

impl PageWriter {
    fn new(title: &str) -> Result<Self, ExportError> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            mm(PAGE_WIDTH_PT),
            mm(PAGE_HEIGHT_PT),
            LAYER_NAME,
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            font,
            layer,
            page: 0,
        })
    }

    fn move_to_page(&mut self, page: usize) {
        while self.page < page {
            let (page, layer) = self
                .doc
                .add_page(mm(PAGE_WIDTH_PT), mm(PAGE_HEIGHT_PT), LAYER_NAME);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.page += 1;
        }
    }

    fn write_line(&self, line: &str, y: f32) {
        self.layer
            .use_text(line, FONT_SIZE, mm(MARGIN_PT), mm(y), &self.font);
    }
}

/// Write `lines` to a paginated PDF, one report line per page line.
///
/// Returns the number of pages written.
pub fn export_pdf(lines: &[String], path: impl AsRef<Path>) -> Result<usize, ExportError> {
    let path = path.as_ref();
    let mut writer = PageWriter::new("Phishing Detector Report")?;

    for (line, (page, y)) in lines.iter().zip(layout(lines.len())) {
        writer.move_to_page(page);
        if !line.is_empty() {
            writer.write_line(line, y);
        }
    }
    let pages = writer.page + 1;

    let file = File::create(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    writer
        .doc
        .save(&mut BufWriter::new(file))
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    log::info!("Report saved as {} ({} pages)", path.display(), pages);
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_starts_below_top_margin() {
        let positions = layout(3);
        assert_eq!(positions, vec![(0, 742.0), (0, 727.0), (0, 712.0)]);
    }

    #[test]
    fn test_layout_breaks_pages_at_bottom_margin() {
        // 742 down to 52 in 15pt steps is 47 lines per page
        let positions = layout(48);
        assert_eq!(positions[46], (0, 52.0));
        assert_eq!(positions[47], (1, 742.0));
        assert!(layout(0).is_empty());
    }

    #[test]
    fn test_export_writes_multi_page_pdf() {
        let path = std::env::temp_dir().join(format!("phishlens-report-{}.pdf", std::process::id()));
        let lines: Vec<String> = (0..100).map(|i| format!("line {i}")).chain([String::new()]).collect();

        let pages = export_pdf(&lines, &path).unwrap();
        assert_eq!(pages, 3);

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_export_to_bad_path_fails() {
        let path = std::env::temp_dir().join("phishlens-missing-dir").join("x").join("r.pdf");
        let result = export_pdf(&["a".to_string()], &path);
        assert!(matches!(result, Err(ExportError::Io { .. })));
    }
}
