use std::collections::{BTreeSet, HashMap};

use dd_core::{FunctionId, FunctionTable};

/// Per-parse state shared by both passes.
#[derive(Debug, Default)]
pub struct BuildContext {
    /// Lowercase function name to its declared spelling.
    aliases: HashMap<String, String>,
    condition_functions: BTreeSet<FunctionId>,
    /// Information function to the dialog that links it.
    function_dialogs: HashMap<FunctionId, String>,
    /// Node id of the declaration that won for each name.
    dialog_nodes: HashMap<String, usize>,
    function_nodes: HashMap<FunctionId, usize>,
    declarations_collected: bool,
}

impl BuildContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn register_function(&mut self, name: &str, id: FunctionId, node_id: usize) {
        self.aliases.insert(name.to_lowercase(), name.to_string());
        self.function_nodes.insert(id, node_id);
    }

    pub(crate) fn register_dialog(&mut self, name: &str, node_id: usize) {
        self.dialog_nodes.insert(name.to_string(), node_id);
    }

    pub(crate) fn finish_declarations(&mut self) {
        self.declarations_collected = true;
    }

    pub fn declarations_collected(&self) -> bool {
        self.declarations_collected
    }

    /// Resolves a reference exactly, then case-insensitively.
    pub fn resolve_function(&self, functions: &FunctionTable, name: &str) -> Option<FunctionId> {
        functions.id_of(name).or_else(|| {
            self.aliases
                .get(&name.to_lowercase())
                .and_then(|canonical| functions.id_of(canonical))
        })
    }

    pub(crate) fn mark_condition(&mut self, id: FunctionId) {
        self.condition_functions.insert(id);
    }

    pub fn is_condition(&self, id: FunctionId) -> bool {
        self.condition_functions.contains(&id)
    }

    pub(crate) fn link_information(&mut self, id: FunctionId, dialog: &str) {
        self.function_dialogs.insert(id, dialog.to_string());
    }

    pub fn dialog_for(&self, id: FunctionId) -> Option<&str> {
        self.function_dialogs.get(&id).map(String::as_str)
    }

    pub(crate) fn is_winning_dialog(&self, name: &str, node_id: usize) -> bool {
        self.dialog_nodes.get(name) == Some(&node_id)
    }

    pub(crate) fn is_winning_function(&self, id: FunctionId, node_id: usize) -> bool {
        self.function_nodes.get(&id) == Some(&node_id)
    }
}
