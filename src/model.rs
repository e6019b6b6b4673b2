use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

/// Resolved model of one form definition.
///
/// Built in a single pass by [`crate::parse_document`] and never mutated
/// afterwards; re-parsing the source produces a fresh value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Free text taken from the `Descrizione....:` comment, if any.
    pub description: Option<String>,
    pub popups: Vec<Popup>,
    /// Every `<grid>` in document order. Duplicate names are kept.
    pub grids: Vec<Grid>,
    /// Actions bound to the form's `whenNewFormInstance` event.
    #[serde(default)]
    pub form_init_event: ActionBinding,
}

impl Document {
    /// First grid carrying `name`.
    pub fn grid(&self, name: &str) -> Option<&Grid> {
        self.grids.iter().find(|g| g.name.as_deref() == Some(name))
    }

    /// All grids carrying `name`, in document order.
    pub fn grids_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Grid> + 'a {
        self.grids
            .iter()
            .filter(move |g| g.name.as_deref() == Some(name))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Actions
// ────────────────────────────────────────────────────────────────────────────

/// Executable payload of a [`ClassFragment`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FragmentBody {
    Groovy {
        script: String,
    },
    Sql {
        sql: String,
        /// `None` when the class declares no `function` parameter.
        function: Option<String>,
    },
}

/// One executable unit of an action, taken from a `<class>` declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassFragment {
    /// The class' `name` attribute.
    pub class_name: Option<String>,
    /// The class' `class` attribute (the handler implementation).
    pub class_type: Option<String>,
    pub fail_message: Option<String>,
    #[serde(flatten)]
    pub body: FragmentBody,
}

impl ClassFragment {
    /// Script or SQL text, whichever this fragment carries.
    pub fn code(&self) -> &str {
        match &self.body {
            FragmentBody::Groovy { script } => script,
            FragmentBody::Sql { sql, .. } => sql,
        }
    }

    pub fn is_groovy(&self) -> bool {
        matches!(self.body, FragmentBody::Groovy { .. })
    }
}

/// An action name together with the fragments the catalog holds for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAction {
    pub action_name: String,
    pub fragments: Vec<ClassFragment>,
}

/// Symbolic `actionRef` names and the subset that resolved against the
/// action catalog, in reference order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionBinding {
    pub action_refs: Vec<String>,
    pub resolved_actions: Vec<ResolvedAction>,
}

impl ActionBinding {
    pub fn is_empty(&self) -> bool {
        self.action_refs.is_empty()
    }

    /// Names that were referenced but not found in the catalog.
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.action_refs.iter().map(String::as_str).filter(|r| {
            !self
                .resolved_actions
                .iter()
                .any(|ra| ra.action_name == *r)
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Events
// ────────────────────────────────────────────────────────────────────────────

/// A child of an `<events>` block, named after its own tag
/// (e.g. `whenFinishEditValue`). The name is kept opaque.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub name: String,
    /// Raw `waitingWindow` attribute token.
    pub waiting_window: Option<String>,
    #[serde(flatten)]
    pub actions: ActionBinding,
    /// Owning field name for field-level events, `None` for grid-level ones.
    pub field_context: Option<String>,
}

impl Event {
    pub fn is_field_level(&self) -> bool {
        self.field_context.is_some()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Grid
// ────────────────────────────────────────────────────────────────────────────

/// Where a CRUD permission value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionSource {
    /// Explicit attribute on the `<grid>` element.
    Declared,
    /// Derived from the save handler's statement list.
    Inferred,
    /// Neither attribute nor save handler present.
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    pub allowed: bool,
    /// Attribute token exactly as written, when declared.
    pub declared: Option<String>,
    pub source: PermissionSource,
}

/// Owning `<tab>` of a grid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub name: Option<String>,
    pub label: Option<String>,
    pub order: Option<String>,
}

/// A `name`/`alias` pair from a `paramsList`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: Option<String>,
    pub alias: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListOfValue {
    pub name: Option<String>,
    pub label: Option<String>,
    pub query: Option<String>,
    pub init_order_by: Option<String>,
}

/// Static `id`/`label` row of a combobox result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboRow {
    pub id: String,
    pub label: String,
}

/// A combobox may carry inline rows, a query, both, or neither.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combobox {
    pub name: Option<String>,
    pub label: Option<String>,
    pub rows: Vec<ComboRow>,
    pub query: Option<String>,
}

/// Statement lists of the grid's `CheckAndSaveData` save handler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveValidation {
    pub insert: Vec<String>,
    pub update: Vec<String>,
    pub delete: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeforeCommitValidation {
    pub name: Option<String>,
    pub sql: String,
    pub function: String,
    pub fail_message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonVariant {
    Button,
    CallFormButton,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolbarButton {
    pub variant: ButtonVariant,
    pub name: Option<String>,
    /// `label` attribute, falling back to `hint`.
    pub label: Option<String>,
    pub order: Option<String>,
    pub target_form_name: Option<String>,
    pub params: Vec<Param>,
    /// Actions of the button's own `whenButtonPressed` event.
    #[serde(flatten)]
    pub actions: ActionBinding,
}

/// A data grid with everything hanging off it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub name: Option<String>,
    pub label: Option<String>,
    #[serde(rename = "type")]
    pub grid_type: Option<String>,
    #[serde(rename = "ref")]
    pub grid_ref: Option<String>,
    pub insert_allowed: Permission,
    pub update_allowed: Permission,
    pub delete_allowed: Permission,
    pub tab: Option<Tab>,
    pub expand_query: Option<String>,
    pub expand_init_order_by: Option<String>,
    pub expand_init_query: Option<String>,
    /// Template name to body. Grid-level entries override filter-scoped ones.
    pub templates: IndexMap<String, String>,
    pub list_of_values: Vec<ListOfValue>,
    pub comboboxes: Vec<Combobox>,
    pub save_validation: Option<SaveValidation>,
    pub before_commit_validations: Vec<BeforeCommitValidation>,
    /// Grid-level events first, then field-level events in field order.
    pub events: Vec<Event>,
    pub toolbar_buttons: Vec<ToolbarButton>,
}

impl Grid {
    /// Expand `@NAME@` placeholders in `code` with this grid's templates.
    pub fn substitute_templates(&self, code: &str) -> String {
        crate::template::substitute(code, &self.templates)
    }

    /// Compact `I:… U:… D:…` rendering of the resolved permissions.
    pub fn permissions_summary(&self) -> String {
        format!(
            "I:{} U:{} D:{}",
            self.insert_allowed.allowed, self.update_allowed.allowed, self.delete_allowed.allowed
        )
    }

    pub fn field_events(&self) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(|e| e.is_field_level())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Popup
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Popup {
    pub name: Option<String>,
    pub title: Option<String>,
    pub width: Option<String>,
    pub height: Option<String>,
    pub target_form_name: Option<String>,
    pub params: Vec<Param>,
    /// Grids shown in the popup, by name only.
    pub associated_grid_names: Vec<String>,
}

impl Popup {
    /// Look up the associated grids in `doc`. Names with no matching grid
    /// are skipped.
    pub fn grids<'a>(&'a self, doc: &'a Document) -> impl Iterator<Item = &'a Grid> + 'a {
        self.associated_grid_names
            .iter()
            .filter_map(move |name| doc.grid(name))
    }
}
