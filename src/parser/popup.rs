use super::helpers::{attr, params_list, select, select_all, text_trimmed};
use crate::model::Popup;
use roxmltree::Node;

/// Build a [`Popup`] from a `<popup>` element.
///
/// Without a `callFormPopup` descriptor the popup has no target form and no
/// parameters. Grids are recorded by name only.
pub fn extract_popup(popup: Node) -> Popup {
    let call_form = select(popup, &["callFormPopup"]);
    let target_form_name = call_form
        .and_then(|cf| select(cf, &["callFormName"]))
        .map(text_trimmed);
    let params = call_form.map(params_list).unwrap_or_default();

    let associated_grid_names = select_all(popup, &["grids", "grid"])
        .filter_map(|g| attr(g, "name"))
        .collect();

    Popup {
        name: attr(popup, "name"),
        title: attr(popup, "title"),
        width: attr(popup, "width"),
        height: attr(popup, "height"),
        target_form_name,
        params,
        associated_grid_names,
    }
}
