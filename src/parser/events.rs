//! `<events>` block extraction.

use super::actions::ActionCatalog;
use super::helpers::{attr, child_element, child_elements};
use crate::model::Event;
use roxmltree::Node;

/// Events declared in the direct `<events>` child of `node`.
///
/// Each child element of `<events>` is one event named after its tag. Deeper
/// `<events>` blocks (e.g. inside fields or buttons) are not visited.
/// `field_context` is copied onto every produced event.
pub fn extract_events(
    node: Node,
    catalog: &ActionCatalog,
    field_context: Option<&str>,
) -> Vec<Event> {
    let Some(events) = child_element(node, "events") else {
        return Vec::new();
    };
    child_elements(events)
        .map(|evt| Event {
            name: evt.tag_name().name().to_string(),
            waiting_window: attr(evt, "waitingWindow"),
            actions: catalog.bind(evt.attribute("actionRef")),
            field_context: field_context.map(str::to_string),
        })
        .collect()
}
