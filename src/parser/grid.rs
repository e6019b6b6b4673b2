//! `<grid>` extraction.
//!
//! A grid pulls together several independent substructures: CRUD flags that
//! are either declared or inferred from the `CheckAndSaveData` save handler,
//! templates from two locations, three alternative shapes of the expand query,
//! field descriptors, validations, toolbar buttons and events at both grid
//! and field level.

use super::actions::ActionCatalog;
use super::events::extract_events;
use super::helpers::{
    attr, child_element, child_elements, descendant_elements, nearest_ancestor, param_text,
    params_list, select, select_all, select_with_attr, text_content, text_trimmed,
};
use crate::model::*;
use indexmap::IndexMap;
use roxmltree::Node;

/// Handler class whose insert/update/delete lists drive permission inference.
pub const SAVE_HANDLER_CLASS: &str = "CheckAndSaveData";

/// Resolve one CRUD flag.
///
/// Precedence: a declared attribute is used as written; otherwise the
/// save handler's inference (`Some(non_empty)`) applies; otherwise the flag
/// is `false`. `inferred` is `None` when the grid has no save handler.
pub fn resolve_permission(declared: Option<&str>, inferred: Option<bool>) -> Permission {
    if let Some(raw) = declared {
        return Permission {
            allowed: is_truthy(raw),
            declared: Some(raw.to_string()),
            source: PermissionSource::Declared,
        };
    }
    match inferred {
        Some(allowed) => Permission {
            allowed,
            declared: None,
            source: PermissionSource::Inferred,
        },
        None => Permission {
            allowed: false,
            declared: None,
            source: PermissionSource::Default,
        },
    }
}

fn is_truthy(raw: &str) -> bool {
    let raw = raw.trim();
    raw.eq_ignore_ascii_case("true") || raw == "1" || raw.eq_ignore_ascii_case("yes")
}

/// Build the [`Grid`] for one `<grid>` element.
pub fn extract_grid(grid: Node, catalog: &ActionCatalog) -> Grid {
    let save_validation = find_save_handler(grid);
    let sv = save_validation.as_ref();

    let insert_allowed = resolve_permission(
        grid.attribute("insertAllowed"),
        sv.map(|sv| !sv.insert.is_empty()),
    );
    let update_allowed = resolve_permission(
        grid.attribute("updateAllowed"),
        sv.map(|sv| !sv.update.is_empty()),
    );
    let delete_allowed = resolve_permission(
        grid.attribute("deleteAllowed"),
        sv.map(|sv| !sv.delete.is_empty()),
    );

    let (expand_query, expand_init_order_by) = extract_expand(grid);

    let mut events = extract_events(grid, catalog, None);
    events.extend(extract_field_events(grid, catalog));

    Grid {
        name: attr(grid, "name"),
        label: attr(grid, "label"),
        grid_type: attr(grid, "type"),
        grid_ref: attr(grid, "ref"),
        insert_allowed,
        update_allowed,
        delete_allowed,
        tab: find_tab(grid),
        expand_query,
        expand_init_order_by,
        expand_init_query: extract_expand_init(grid),
        templates: collect_templates(grid),
        list_of_values: extract_list_of_values(grid),
        comboboxes: extract_comboboxes(grid),
        save_validation,
        before_commit_validations: extract_before_commit(grid),
        events,
        toolbar_buttons: extract_toolbar(grid, catalog),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Save handler & tab
// ────────────────────────────────────────────────────────────────────────────

fn find_save_handler(grid: Node) -> Option<SaveValidation> {
    let handler = descendant_elements(grid)
        .filter(|n| n.has_tag_name("action") && n.attribute("name") == Some("save"))
        .find_map(|action| select_with_attr(action, "class", "class", SAVE_HANDLER_CLASS))?;

    let statements = |op: &str| -> Vec<String> {
        descendant_elements(handler)
            .filter(|v| v.has_tag_name("value"))
            .filter(|v| {
                v.parent_element()
                    .is_some_and(|p| p.has_tag_name("list") && p.attribute("name") == Some(op))
            })
            .map(text_trimmed)
            .collect()
    };

    Some(SaveValidation {
        insert: statements("insert"),
        update: statements("update"),
        delete: statements("delete"),
    })
}

fn find_tab(grid: Node) -> Option<Tab> {
    nearest_ancestor(grid, "tab", "form").map(|tab| Tab {
        name: attr(tab, "name"),
        label: attr(tab, "label"),
        order: attr(tab, "order"),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Templates & expand queries
// ────────────────────────────────────────────────────────────────────────────

fn collect_templates(grid: Node) -> IndexMap<String, String> {
    let mut templates = IndexMap::new();
    let filter_scoped =
        child_element(grid, "filter").and_then(|filter| child_element(filter, "templates"));
    let direct = child_element(grid, "templates");
    // Direct entries are scanned last and win on name collisions.
    for block in [filter_scoped, direct].into_iter().flatten() {
        for t in child_elements(block).filter(|t| t.has_tag_name("template")) {
            match t.attribute("name").filter(|n| !n.is_empty()) {
                Some(name) => {
                    templates.insert(name.to_string(), text_trimmed(t));
                }
                None => log::warn!("ignoring <template> without a name"),
            }
        }
    }
    templates
}

/// Main expand query and its `initOrderBy`.
fn extract_expand(grid: Node) -> (Option<String>, Option<String>) {
    let Some(rpc) = child_element(grid, "rpcExpand") else {
        return (None, None);
    };
    let query = select(rpc, &["paginatedExpand", "value"])
        .or_else(|| select(rpc, &["expand", "value"]))
        .or_else(|| select(rpc, &["value"]))
        .map(text_trimmed);
    let init_order_by = select(rpc, &["paginatedExpand", "initOrderBy"]).map(text_trimmed);
    (query, init_order_by)
}

fn extract_expand_init(grid: Node) -> Option<String> {
    child_element(grid, "rpcExpandInit")
        .and_then(|init| select(init, &["expand", "value"]))
        .map(text_trimmed)
}

/// Paginated expand first, then plain expand, both under `rpcExpand`.
fn field_query(field: Node) -> Option<String> {
    select(field, &["rpcExpand", "paginatedExpand", "value"])
        .or_else(|| select(field, &["rpcExpand", "expand", "value"]))
        .map(text_trimmed)
}

// ────────────────────────────────────────────────────────────────────────────
// Fields
// ────────────────────────────────────────────────────────────────────────────

/// Events of every element directly under a `<fields>` container.
/// Fields without a name get an empty context so they still count as
/// field-level.
fn extract_field_events(grid: Node, catalog: &ActionCatalog) -> Vec<Event> {
    descendant_elements(grid)
        .filter(|f| f.parent_element().is_some_and(|p| p.has_tag_name("fields")))
        .flat_map(|field| {
            let context = field.attribute("name").unwrap_or("");
            extract_events(field, catalog, Some(context))
        })
        .collect()
}

fn extract_list_of_values(grid: Node) -> Vec<ListOfValue> {
    select_all(grid, &["fields", "listOfValue"])
        .map(|lov| ListOfValue {
            name: attr(lov, "name"),
            label: attr(lov, "label"),
            query: field_query(lov),
            init_order_by: select(lov, &["rpcExpand", "paginatedExpand", "initOrderBy"])
                .map(text_trimmed),
        })
        .collect()
}

fn extract_comboboxes(grid: Node) -> Vec<Combobox> {
    select_all(grid, &["fields", "combobox"])
        .map(|combo| Combobox {
            name: attr(combo, "name"),
            label: attr(combo, "label"),
            rows: select_all(combo, &["rpcExpand", "resultset", "row"])
                .map(|row| ComboRow {
                    id: select(row, &["id"]).map(text_content).unwrap_or_default(),
                    label: select(row, &["label"]).map(text_content).unwrap_or_default(),
                })
                .collect(),
            query: field_query(combo),
        })
        .collect()
}

fn extract_before_commit(grid: Node) -> Vec<BeforeCommitValidation> {
    descendant_elements(grid)
        .filter(|n| n.has_tag_name("beforeCommitValidation"))
        .map(|bc| BeforeCommitValidation {
            name: attr(bc, "name"),
            sql: param_text(bc, "sql").unwrap_or_default(),
            function: param_text(bc, "function").unwrap_or_default(),
            fail_message: param_text(bc, "failMessage").unwrap_or_default(),
        })
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Toolbar
// ────────────────────────────────────────────────────────────────────────────

fn extract_toolbar(grid: Node, catalog: &ActionCatalog) -> Vec<ToolbarButton> {
    let Some(toolbar) = child_element(grid, "bottomToolbar") else {
        return Vec::new();
    };
    descendant_elements(toolbar)
        .filter_map(|btn| {
            let variant = match btn.tag_name().name() {
                "button" => ButtonVariant::Button,
                "callFormButton" => ButtonVariant::CallFormButton,
                _ => return None,
            };
            let target_form_name = match variant {
                ButtonVariant::CallFormButton => {
                    select(btn, &["callFormName"]).map(text_trimmed)
                }
                ButtonVariant::Button => None,
            };
            let raw_refs = select(btn, &["events", "whenButtonPressed"])
                .and_then(|wp| wp.attribute("actionRef"));
            Some(ToolbarButton {
                variant,
                name: attr(btn, "name"),
                label: attr(btn, "label")
                    .filter(|l| !l.is_empty())
                    .or_else(|| attr(btn, "hint")),
                order: attr(btn, "order"),
                target_form_name,
                params: params_list(btn),
                actions: catalog.bind(raw_refs),
            })
        })
        .collect()
}
