//! Document-wide action catalog.
//!
//! Every `<action name="…">` contributes the executable fragments of its
//! `classes > class` declarations. References elsewhere in the form
//! (`actionRef="a, b"`) are resolved against this catalog.

use super::helpers::{attr, param_text, select_all, split_action_refs};
use crate::model::{ActionBinding, ClassFragment, FragmentBody, ResolvedAction};
use roxmltree::{Document, Node};
use std::collections::BTreeMap;

/// A named action and its fragments in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub fragments: Vec<ClassFragment>,
}

/// Action name to [`Action`]. Only actions with at least one Groovy or SQL
/// fragment are present.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    actions: BTreeMap<String, Action>,
}

impl ActionCatalog {
    /// Scan every `<action>` in `doc`, wherever it is nested.
    ///
    /// Nameless actions and classes without a `groovy`/`sql` parameter are
    /// skipped. A later action with the same name replaces an earlier one.
    pub fn build(doc: &Document) -> Self {
        let mut actions = BTreeMap::new();
        for node in doc
            .descendants()
            .filter(|n| n.is_element() && n.has_tag_name("action"))
        {
            let Some(name) = node.attribute("name").filter(|n| !n.is_empty()) else {
                log::warn!("skipping <action> without a name");
                continue;
            };
            let fragments = collect_fragments(node);
            if fragments.is_empty() {
                continue;
            }
            if actions.contains_key(name) {
                log::debug!("action '{}' declared again, keeping the later one", name);
            }
            actions.insert(
                name.to_string(),
                Action {
                    name: name.to_string(),
                    fragments,
                },
            );
        }
        log::debug!("action catalog holds {} actions", actions.len());
        Self { actions }
    }

    pub fn get(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    /// Look up each name in order. Names missing from the catalog produce
    /// no entry.
    pub fn resolve<S: AsRef<str>>(&self, refs: &[S]) -> Vec<ResolvedAction> {
        refs.iter()
            .filter_map(|r| {
                self.actions.get(r.as_ref()).map(|a| ResolvedAction {
                    action_name: a.name.clone(),
                    fragments: a.fragments.clone(),
                })
            })
            .collect()
    }

    /// Split a raw `actionRef` attribute and resolve it.
    pub fn bind(&self, raw_refs: Option<&str>) -> ActionBinding {
        let action_refs = raw_refs.map(split_action_refs).unwrap_or_default();
        let resolved_actions = self.resolve(&action_refs);
        ActionBinding {
            action_refs,
            resolved_actions,
        }
    }
}

fn collect_fragments(action: Node) -> Vec<ClassFragment> {
    let mut fragments = Vec::new();
    for class in select_all(action, &["classes", "class"]) {
        let class_name = attr(class, "name");
        let class_type = attr(class, "class");
        let fail_message = param_text(class, "failMessage").filter(|m| !m.is_empty());

        if let Some(script) = param_text(class, "groovy") {
            fragments.push(ClassFragment {
                class_name: class_name.clone(),
                class_type: class_type.clone(),
                fail_message: fail_message.clone(),
                body: FragmentBody::Groovy { script },
            });
        }
        if let Some(sql) = param_text(class, "sql") {
            fragments.push(ClassFragment {
                class_name,
                class_type,
                fail_message,
                body: FragmentBody::Sql {
                    sql,
                    function: param_text(class, "function"),
                },
            });
        }
    }
    fragments
}
