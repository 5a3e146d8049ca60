//! PDF printing backends.
//!
//! The host process hands a fully composed HTML document (plus optional
//! header/footer fragments) to a [`PdfPrinter`]. The default backend
//! emits a paper-sized placeholder via lopdf so the pipeline works
//! without a browser installation; the `chromium` feature adds a
//! headless-browser backend that lays the HTML out for real.

use doc_model::PdfFormat;

#[derive(Debug, thiserror::Error)]
pub enum PdfExportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF write error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("unknown paper format '{0}'")]
    UnknownPaperFormat(String),
    #[error("backend error: {0}")]
    Backend(String),
}

/// One export request. Header and footer are HTML fragments; empty
/// strings mean "none".
#[derive(Debug, Clone, Default)]
pub struct PrintJob {
    pub html: String,
    pub header: String,
    pub footer: String,
    pub format: PdfFormat,
}

pub trait PdfPrinter {
    fn print(&mut self, job: &PrintJob) -> Result<Vec<u8>, PdfExportError>;

    /// Releases any external resources. Called once on process shutdown.
    fn close(&mut self) {}
}

/// Paper dimensions in PDF points for the named formats the settings
/// file accepts.
pub fn paper_size_points(format: &str) -> Result<(f64, f64), PdfExportError> {
    match format.to_ascii_lowercase().as_str() {
        "a3" => Ok((842.0, 1191.0)),
        "a4" => Ok((595.0, 842.0)),
        "a5" => Ok((420.0, 595.0)),
        "letter" => Ok((612.0, 792.0)),
        "legal" => Ok((612.0, 1008.0)),
        "tabloid" => Ok((792.0, 1224.0)),
        other => Err(PdfExportError::UnknownPaperFormat(other.to_owned())),
    }
}

/// Parses a CSS-style length ("20mm", "0.5in", "12pt") into points.
pub fn length_to_points(length: &str) -> Option<f64> {
    let length = length.trim();
    let split = length.find(|c: char| !c.is_ascii_digit() && c != '.' && c != '-')?;
    let (number, unit) = length.split_at(split);
    let number: f64 = number.parse().ok()?;

    match unit.trim() {
        "mm" => Some(number * 72.0 / 25.4),
        "cm" => Some(number * 72.0 / 2.54),
        "in" => Some(number * 72.0),
        "px" => Some(number * 0.75),
        "pt" => Some(number),
        _ => None,
    }
}

/// Placeholder backend: a single page at the configured paper size with
/// the margin box stroked, so exports stay inspectable without a
/// browser installation.
#[derive(Debug, Default)]
pub struct LopdfPrinter;

impl LopdfPrinter {
    pub fn new() -> Self {
        Self
    }
}

impl PdfPrinter for LopdfPrinter {
    fn print(&mut self, job: &PrintJob) -> Result<Vec<u8>, PdfExportError> {
        use lopdf::content::{Content, Operation};
        use lopdf::{dictionary, Document, Object, Stream};

        let (mut width, mut height) = paper_size_points(&job.format.paper_format)?;
        if job.format.landscape {
            std::mem::swap(&mut width, &mut height);
        }

        let top = length_to_points(&job.format.margins.top).unwrap_or(0.0);
        let bottom = length_to_points(&job.format.margins.bottom).unwrap_or(0.0);
        let left = length_to_points(&job.format.margins.left).unwrap_or(0.0);
        let right = length_to_points(&job.format.margins.right).unwrap_or(0.0);

        let box_width = (width - left - right).max(0.0);
        let box_height = (height - top - bottom).max(0.0);

        let content = Content {
            operations: vec![
                Operation::new("w", vec![0.5.into()]),
                Operation::new("RG", vec![0.75.into(), 0.75.into(), 0.75.into()]),
                Operation::new(
                    "re",
                    vec![left.into(), bottom.into(), box_width.into(), box_height.into()],
                ),
                Operation::new("S", vec![]),
            ],
        };

        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), width.into(), height.into()],
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes)?;

        Ok(bytes)
    }
}

#[cfg(feature = "chromium")]
pub mod chromium_backend {
    use super::*;
    use headless_chrome::types::PrintToPdfOptions;
    use headless_chrome::Browser;
    use log::info;

    /// Headless-browser backend. The browser is launched at most once,
    /// on first use, and shut down by `close`.
    pub struct ChromiumPrinter {
        browser: Option<Browser>,
    }

    impl ChromiumPrinter {
        pub fn new() -> Self {
            Self { browser: None }
        }

        fn browser(&mut self) -> Result<&Browser, PdfExportError> {
            if self.browser.is_none() {
                info!("Launching headless browser for PDF export");
                let browser = Browser::default()
                    .map_err(|err| PdfExportError::Backend(err.to_string()))?;
                self.browser = Some(browser);
            }

            self.browser
                .as_ref()
                .ok_or_else(|| PdfExportError::Backend("browser unavailable".to_owned()))
        }
    }

    impl Default for ChromiumPrinter {
        fn default() -> Self {
            Self::new()
        }
    }

    impl PdfPrinter for ChromiumPrinter {
        fn print(&mut self, job: &PrintJob) -> Result<Vec<u8>, PdfExportError> {
            let (mut width_pt, mut height_pt) = paper_size_points(&job.format.paper_format)?;
            if job.format.landscape {
                std::mem::swap(&mut width_pt, &mut height_pt);
            }

            let margins_in = |length: &str| length_to_points(length).map(|points| points / 72.0);
            let display_header_footer = !job.header.is_empty() || !job.footer.is_empty();

            let options = PrintToPdfOptions {
                landscape: Some(job.format.landscape),
                display_header_footer: Some(display_header_footer),
                print_background: Some(true),
                paper_width: Some(width_pt / 72.0),
                paper_height: Some(height_pt / 72.0),
                margin_top: margins_in(&job.format.margins.top),
                margin_bottom: margins_in(&job.format.margins.bottom),
                margin_left: margins_in(&job.format.margins.left),
                margin_right: margins_in(&job.format.margins.right),
                header_template: display_header_footer.then(|| job.header.clone()),
                footer_template: display_header_footer.then(|| job.footer.clone()),
                ..Default::default()
            };

            let encoded = urlencoding_lite(&job.html);
            let tab = self
                .browser()?
                .new_tab()
                .map_err(|err| PdfExportError::Backend(err.to_string()))?;
            tab.navigate_to(&format!("data:text/html;charset=utf-8,{encoded}"))
                .and_then(|tab| tab.wait_until_navigated())
                .map_err(|err| PdfExportError::Backend(err.to_string()))?;

            let bytes = tab
                .print_to_pdf(Some(options))
                .map_err(|err| PdfExportError::Backend(err.to_string()))?;

            let _ = tab.close(true);
            Ok(bytes)
        }

        fn close(&mut self) {
            self.browser = None;
        }
    }

    // Data URLs tolerate raw UTF-8; only the reserved characters need
    // escaping.
    fn urlencoding_lite(html: &str) -> String {
        let mut encoded = String::with_capacity(html.len());
        for ch in html.chars() {
            match ch {
                '%' => encoded.push_str("%25"),
                '#' => encoded.push_str("%23"),
                '&' => encoded.push_str("%26"),
                other => encoded.push(other),
            }
        }
        encoded
    }
}

pub fn default_printer() -> LopdfPrinter {
    LopdfPrinter::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_backend_emits_a_pdf() {
        let mut printer = LopdfPrinter::new();
        let job = PrintJob { html: "<html></html>".to_owned(), ..PrintJob::default() };

        let bytes = printer.print(&job).expect("print should succeed");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn landscape_swaps_page_dimensions() {
        assert_eq!(paper_size_points("a4").expect("a4 should resolve"), (595.0, 842.0));

        let mut printer = LopdfPrinter::new();
        let mut job = PrintJob::default();
        job.format.landscape = true;

        // Parse the emitted MediaBox back to check orientation.
        let bytes = printer.print(&job).expect("print should succeed");
        let doc = lopdf::Document::load_mem(&bytes).expect("output should parse");
        let pages = doc.get_pages();
        let (_, page_id) = pages.iter().next().expect("one page expected");
        let media_box = doc
            .get_dictionary(*page_id)
            .and_then(|dict| dict.get(b"MediaBox"))
            .and_then(|obj| obj.as_array())
            .expect("media box expected");

        let width = media_box[2].as_float().expect("width expected");
        let height = media_box[3].as_float().expect("height expected");
        assert!(width > height);
    }

    #[test]
    fn unknown_paper_format_is_an_error() {
        let mut printer = LopdfPrinter::new();
        let mut job = PrintJob::default();
        job.format.paper_format = "napkin".to_owned();

        let err = printer.print(&job).expect_err("print should fail");
        assert!(matches!(err, PdfExportError::UnknownPaperFormat(format) if format == "napkin"));
    }

    #[test]
    fn lengths_parse_to_points() {
        assert_eq!(length_to_points("72pt"), Some(72.0));
        assert_eq!(length_to_points("1in"), Some(72.0));
        assert!((length_to_points("20mm").expect("mm should parse") - 56.6929).abs() < 0.001);
        assert_eq!(length_to_points("oops"), None);
    }
}
