//! Page-structured document extraction backed by `lopdf`.

use super::ExtractionError;
use lopdf::Document;

/// An opened paginated document.
pub trait PagedDocument {
    /// Number of pages; pages are addressed `1..=page_count()`.
    fn page_count(&self) -> u32;

    /// Ordered text fragments found on a page.
    fn page_fragments(&self, page: u32) -> Result<Vec<String>, ExtractionError>;
}

/// Opens raw bytes as a [`PagedDocument`].
pub trait DocumentParser: Send + Sync {
    /// Parse the document, failing when the bytes are not a readable document.
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn PagedDocument>, ExtractionError>;
}

/// Join a document's text: fragments with a single space, pages with a blank line, in page order.
pub fn join_pages(document: &dyn PagedDocument) -> Result<String, ExtractionError> {
    let page_count = document.page_count();
    let mut pages = Vec::with_capacity(page_count as usize);
    for page in 1..=page_count {
        pages.push(document.page_fragments(page)?.join(" "));
    }
    Ok(pages.join("\n\n"))
}

/// [`DocumentParser`] for PDF files.
#[derive(Debug, Default, Clone, Copy)]
pub struct LopdfParser;

impl DocumentParser for LopdfParser {
    fn open(&self, bytes: &[u8]) -> Result<Box<dyn PagedDocument>, ExtractionError> {
        let mut document =
            Document::load_mem(bytes).map_err(|err| ExtractionError::Document(err.to_string()))?;

        if document.is_encrypted() {
            // Owner-password-only files open with an empty user password.
            document
                .decrypt("")
                .map_err(|_| ExtractionError::Document("document is encrypted".into()))?;
            tracing::debug!("Decrypted PDF with empty password");
        }

        let page_count = document.get_pages().len() as u32;
        tracing::debug!(page_count, "Opened PDF");
        Ok(Box::new(LopdfDocument {
            document,
            page_count,
        }))
    }
}

struct LopdfDocument {
    document: Document,
    page_count: u32,
}

impl PagedDocument for LopdfDocument {
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn page_fragments(&self, page: u32) -> Result<Vec<String>, ExtractionError> {
        let text = self
            .document
            .extract_text(&[page])
            .map_err(|err| ExtractionError::Document(format!("page {page}: {err}")))?;
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Object, Stream, dictionary};

    struct Pages(Vec<Vec<&'static str>>);

    impl PagedDocument for Pages {
        fn page_count(&self) -> u32 {
            self.0.len() as u32
        }

        fn page_fragments(&self, page: u32) -> Result<Vec<String>, ExtractionError> {
            Ok(self.0[(page - 1) as usize]
                .iter()
                .map(|fragment| fragment.to_string())
                .collect())
        }
    }

    struct FailsOnPage(u32);

    impl PagedDocument for FailsOnPage {
        fn page_count(&self) -> u32 {
            3
        }

        fn page_fragments(&self, page: u32) -> Result<Vec<String>, ExtractionError> {
            if page == self.0 {
                Err(ExtractionError::Document(format!("page {page} unreadable")))
            } else {
                Ok(vec!["ok".into()])
            }
        }
    }

    fn build_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 24.into()]),
                    Operation::new("Td", vec![100.into(), 600.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().expect("encode")));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }
        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).expect("save pdf");
        bytes
    }

    #[test]
    fn join_pages_orders_pages_and_fragments() {
        let document = Pages(vec![vec!["a", "b"], vec!["c"], vec![], vec!["d", "e", "f"]]);
        let first = join_pages(&document).expect("text");
        let second = join_pages(&document).expect("text");
        assert_eq!(first, "a b\n\nc\n\n\n\nd e f");
        assert_eq!(first, second);
    }

    #[test]
    fn join_pages_of_empty_document_is_empty() {
        assert_eq!(join_pages(&Pages(vec![])).expect("text"), "");
    }

    #[test]
    fn join_pages_propagates_page_errors() {
        let error = join_pages(&FailsOnPage(2)).expect_err("page error");
        assert!(error.to_string().contains("page 2"));
    }

    #[test]
    fn lopdf_parser_rejects_non_pdf_bytes() {
        let result = LopdfParser.open(b"definitely not a pdf");
        assert!(matches!(result, Err(ExtractionError::Document(_))));
    }

    #[test]
    fn lopdf_parser_reads_pages_in_order() {
        let bytes = build_pdf(&["First page", "Second page"]);
        let document = LopdfParser.open(&bytes).expect("open pdf");
        assert_eq!(document.page_count(), 2);

        let text = join_pages(document.as_ref()).expect("text");
        let first = text.find("First").expect("first page text");
        let second = text.find("Second").expect("second page text");
        assert!(first < second);
        assert!(text.contains("\n\n"));
    }
}
