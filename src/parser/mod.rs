//! PDF parsing: styled text fragments from page content streams.

mod backend;
mod extractor;
mod options;
mod pdf_parser;

pub use backend::{
    decode_text_simple, BackendFontInfo, ContentOp, LopdfBackend, PageId, PdfBackend, PdfValue,
};
pub use extractor::StyleExtractor;
pub use options::{ErrorMode, ParseOptions};
pub use pdf_parser::{PdfParser, LETTER_SIZE};
