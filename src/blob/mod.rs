//! Blob reference marking for binary garbage collection

mod manager;
mod scanner;

pub use manager::{BinaryManager, RecordingBinaryManager};
pub use scanner::BlobReferenceScanner;
