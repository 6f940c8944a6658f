pub mod archive;
pub mod pdf;

pub use pdf::PdfOptions;
