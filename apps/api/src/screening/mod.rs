//! Screening layer around the matching engine: document text extraction,
//! contact extraction, the concurrent pipeline and batch summaries.

pub mod docx;
pub mod extraction;
pub mod pipeline;
pub mod profile;
pub mod summary;
