//! Form definition XML parser.
//!
//! [`parse_document`] turns the text of one form definition into a
//! [`Document`]. It is a pure transform: the action catalog is rebuilt for
//! every call and nothing outside the input is read. Sub-modules split the
//! work by substructure:
//!
//! - [`helpers`] – Tree accessors (direct child, ancestor, `a > b` paths)
//! - [`actions`] – Document-wide action catalog and `actionRef` resolution
//! - [`events`] – `<events>` blocks
//! - [`grid`] – `<grid>` elements, including permission resolution
//! - [`popup`] – `<popup>` elements
//! - [`source`] – Text loading for [`FormParser`]

pub mod actions;
pub mod events;
pub mod grid;
pub mod helpers;
pub mod popup;
pub mod source;

pub use actions::{Action, ActionCatalog};
pub use events::extract_events;
pub use grid::{extract_grid, resolve_permission};
pub use popup::extract_popup;
pub use source::*;

use crate::error::FormError;
use crate::model::*;
use anyhow::{Context, Result};
use camino::Utf8Path;
use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::ParsingOptions;

/// `<!-- … Descrizione....: text -->`
static DESCRIPTION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<!--[\s\S]*?Descrizione\.+:\s*(.+?)\s*-->")
        .expect("description regex must compile")
});

/// Parse form XML text into a [`Document`].
///
/// Fails only when the text is not a well-formed element tree.
pub fn parse_document(text: &str) -> Result<Document, FormError> {
    let options = ParsingOptions {
        allow_dtd: true,
        ..ParsingOptions::default()
    };
    let tree = roxmltree::Document::parse_with_options(text, options)?;
    Ok(assemble(text, &tree))
}

/// Build the model from an already parsed tree and the text it came from.
pub fn assemble(raw_text: &str, tree: &roxmltree::Document) -> Document {
    let catalog = ActionCatalog::build(tree);
    let root = tree.root();

    let form_init_event = helpers::select(root, &["form", "events", "whenNewFormInstance"])
        .map(|evt| catalog.bind(evt.attribute("actionRef")))
        .unwrap_or_default();

    let popups: Vec<Popup> = helpers::select_all(root, &["form", "popups", "popup"])
        .map(extract_popup)
        .collect();

    let grids: Vec<Grid> = tree
        .descendants()
        .filter(|n| n.is_element() && n.has_tag_name("grid"))
        .map(|g| extract_grid(g, &catalog))
        .collect();

    log::debug!(
        "assembled form: {} grids, {} popups, {} actions",
        grids.len(),
        popups.len(),
        catalog.len()
    );

    Document {
        description: extract_description(raw_text),
        popups,
        grids,
        form_init_event,
    }
}

/// Text-level pass over the raw source: the description lives in a comment,
/// which the tree walk does not expose.
pub fn extract_description(raw_text: &str) -> Option<String> {
    DESCRIPTION_RE
        .captures(raw_text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Loads form files through a [`ContentSource`] and parses them.
pub struct FormParser<S: ContentSource> {
    source: S,
}

impl<S: ContentSource> FormParser<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Read `path` from the source and parse it.
    pub fn parse_form_file(&mut self, path: impl AsRef<Utf8Path>) -> Result<Document> {
        let path = path.as_ref();
        let text = self.source.read_to_string(path)?;
        parse_document(&text).with_context(|| format!("Failed to parse XML {}", path))
    }
}
