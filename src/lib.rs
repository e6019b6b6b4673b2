//! Legacy form-builder XML extractor.
//!
//! This crate turns a form definition (grids, popups, events, server-side
//! actions built from Groovy/SQL class fragments and reusable SQL templates)
//! into a normalized [`model::Document`] with every `actionRef` resolved.
//!
//! The binary `formlens` prints the model as JSON, expands templates for a
//! grid and scans whole directories of forms.

pub mod batch;
pub mod error;
pub mod model;
pub mod parser;
pub mod template;

pub use error::FormError;
pub use parser::parse_document;
pub use template::{expand_templates, substitute};
