use std::collections::BTreeSet;

use dd_core::{
    quote, Action, Condition, DeclarationKind, DialogInstance, FunctionId, PropertyValue,
    ScriptFunction, SemanticModel,
};
use tracing::{debug, warn};

use crate::layout::{indent_block, retab, section_banner};
use crate::options::GeneratorOptions;

const PRIMITIVE_TYPES: [&str; 4] = ["void", "int", "float", "string"];

/// Regenerates source text for a whole model.
pub fn generate(model: &SemanticModel, options: &GeneratorOptions) -> String {
    let mut generator = Generator::new(model, options);
    if model.declaration_order.is_empty() {
        generator.emit_grouped();
    } else {
        generator.emit_in_declaration_order();
    }
    generator.emit_remaining();
    if options.include_comments && !model.trailing_comments.is_empty() {
        let mut lines = model.trailing_comments.clone();
        lines.push(String::new());
        generator.sections.push(lines.join("\n"));
    }
    debug!(sections = generator.sections.len(), "source generated");
    generator.sections.join("\n")
}

/// Source text for a single dialog instance.
pub fn generate_dialog(
    model: &SemanticModel,
    dialog: &DialogInstance,
    options: &GeneratorOptions,
) -> String {
    dialog_lines(model, dialog, options).join("\n")
}

/// Source text for a single function.
pub fn generate_function(function: &ScriptFunction, options: &GeneratorOptions) -> String {
    function_lines(function, options).join("\n")
}

struct Generator<'m> {
    model: &'m SemanticModel,
    options: &'m GeneratorOptions,
    sections: Vec<String>,
    emitted_dialogs: BTreeSet<&'m str>,
    emitted_functions: BTreeSet<FunctionId>,
    emitted_globals: BTreeSet<(DeclarationKind, &'m str)>,
}

impl<'m> Generator<'m> {
    fn new(model: &'m SemanticModel, options: &'m GeneratorOptions) -> Self {
        Self {
            model,
            options,
            sections: Vec::new(),
            emitted_dialogs: BTreeSet::new(),
            emitted_functions: BTreeSet::new(),
            emitted_globals: BTreeSet::new(),
        }
    }

    fn emit_in_declaration_order(&mut self) {
        let model = self.model;
        for entry in &model.declaration_order {
            match entry.kind {
                DeclarationKind::Dialog => {
                    if let Some((name, dialog)) = model.dialogs.get_key_value(&entry.name) {
                        self.emit_dialog(name, dialog);
                    }
                }
                DeclarationKind::Function => {
                    if let Some(id) = model.functions.id_of(&entry.name) {
                        self.emit_function(id);
                    }
                }
                kind => self.emit_global(kind, &entry.name),
            }
        }
    }

    /// Globals first, then every dialog followed by the functions it links,
    /// then whatever functions are left.
    fn emit_grouped(&mut self) {
        let model = self.model;
        for name in model.constants.keys() {
            self.emit_global(DeclarationKind::Constant, name);
        }
        for name in model.variables.keys() {
            self.emit_global(DeclarationKind::Variable, name);
        }
        for name in model.verbatim.keys() {
            self.emit_global(DeclarationKind::Verbatim, name);
        }
        for name in model.instances.keys() {
            self.emit_global(DeclarationKind::Instance, name);
        }
        for (name, dialog) in &model.dialogs {
            self.emit_dialog(name, dialog);
            for key in ["condition", "information"] {
                if let Some(id) = dialog.function_property(key) {
                    self.emit_function(id);
                }
            }
        }
    }

    fn emit_remaining(&mut self) {
        let model = self.model;
        for (name, dialog) in &model.dialogs {
            self.emit_dialog(name, dialog);
        }
        for (id, _) in model.functions.iter() {
            self.emit_function(id);
        }
    }

    fn emit_dialog(&mut self, name: &'m str, dialog: &'m DialogInstance) {
        if !self.emitted_dialogs.insert(name) {
            return;
        }
        let mut lines = dialog_lines(self.model, dialog, self.options);
        lines.push(String::new());
        self.sections.push(lines.join("\n"));
    }

    fn emit_function(&mut self, id: FunctionId) {
        if !self.emitted_functions.insert(id) {
            return;
        }
        let Some(function) = self.model.functions.get(id) else {
            return;
        };
        let mut lines = function_lines(function, self.options);
        lines.push(String::new());
        self.sections.push(lines.join("\n"));
    }

    fn emit_global(&mut self, kind: DeclarationKind, name: &'m str) {
        if !self.emitted_globals.insert((kind, name)) {
            return;
        }
        let model = self.model;
        let found = match kind {
            DeclarationKind::Constant => model
                .constants
                .get(name)
                .map(|global| (&global.leading_comments, &global.source_text)),
            DeclarationKind::Variable => model
                .variables
                .get(name)
                .map(|global| (&global.leading_comments, &global.source_text)),
            DeclarationKind::Instance => model
                .instances
                .get(name)
                .map(|global| (&global.leading_comments, &global.source_text)),
            DeclarationKind::Verbatim => model
                .verbatim
                .get(name)
                .map(|global| (&global.leading_comments, &global.source_text)),
            DeclarationKind::Dialog | DeclarationKind::Function => None,
        };
        let Some((comments, source_text)) = found else {
            return;
        };
        let mut lines = Vec::new();
        if self.options.include_comments {
            lines.extend(comments.iter().cloned());
        }
        lines.push(source_text.trim().to_string());
        lines.push(String::new());
        self.sections.push(lines.join("\n"));
    }
}

fn dialog_lines(
    model: &SemanticModel,
    dialog: &DialogInstance,
    options: &GeneratorOptions,
) -> Vec<String> {
    let indent = options.indent();
    let mut lines = Vec::new();
    if options.include_comments {
        if !dialog.leading_comments.is_empty() {
            lines.extend(dialog.leading_comments.iter().cloned());
        } else if options.section_headers {
            lines.extend(section_banner(&dialog.name));
        }
    }

    let preserve = options.preserve_source_style;
    let keyword = match &dialog.keyword {
        Some(keyword) if preserve => keyword.clone(),
        _ => options.keyword("instance"),
    };
    let space = if preserve && !dialog.space_before_paren { "" } else { " " };
    lines.push(format!(
        "{} {}{}({})",
        keyword, dialog.name, space, dialog.parent_type
    ));
    lines.push("{".to_string());

    for (key, value) in dialog.properties.iter() {
        let Some(rendered) = property_text(model, dialog, key, value) else {
            continue;
        };
        let (before, after) = match dialog.formatting.spacing.get(key) {
            Some(spacing) if preserve => (spacing.before_equals.as_str(), spacing.after_equals.as_str()),
            _ => ("\t", " "),
        };
        lines.push(format!("{}{}{}={}{};", indent, key, before, after, rendered));
    }
    lines.push("};".to_string());
    lines
}

/// Value text of one property. String literals are always quoted and
/// expressions never are; other strings follow the literal rules.
fn property_text(
    model: &SemanticModel,
    dialog: &DialogInstance,
    key: &str,
    value: &PropertyValue,
) -> Option<String> {
    match value {
        PropertyValue::Function { function } => match model.functions.get(*function) {
            Some(target) => Some(target.name.clone()),
            None => {
                warn!(dialog = %dialog.name, key, id = function.0, "dangling function reference skipped");
                None
            }
        },
        PropertyValue::Primitive(primitive) => {
            let formatting = &dialog.formatting;
            let text = match primitive.as_string() {
                Some(text) if formatting.string_literal_keys.contains(key) => quote(text),
                Some(text) if formatting.expression_keys.contains(key) => text.to_string(),
                _ => primitive.render_literal(),
            };
            Some(text)
        }
    }
}

fn function_lines(function: &ScriptFunction, options: &GeneratorOptions) -> Vec<String> {
    let indent = options.indent();
    let preserve = options.preserve_source_style;
    let mut lines = Vec::new();
    if options.include_comments {
        lines.extend(function.leading_comments.iter().cloned());
    }

    let keyword = match &function.style.keyword {
        Some(keyword) if preserve => keyword.clone(),
        _ => options.keyword("func"),
    };
    let return_type = if !preserve
        && PRIMITIVE_TYPES.contains(&function.return_type.to_lowercase().as_str())
    {
        options.keyword(&function.return_type)
    } else {
        function.return_type.clone()
    };
    let space = if preserve && function.style.space_before_paren { " " } else { "" };
    lines.push(format!(
        "{} {} {}{}({})",
        keyword, return_type, function.name, space, function.parameters
    ));
    lines.push("{".to_string());

    let mut actions = function.actions.as_slice();
    if !function.conditions.is_empty() {
        let leading = actions.iter().take_while(|action| action.is_comment()).count();
        lines.extend(action_lines(&actions[..leading], options));
        actions = &actions[leading..];
        lines.extend(condition_block(&function.conditions, options));
        if function.style.explicit_false_return {
            lines.push(format!("{}{} FALSE;", indent, options.keyword("return")));
        }
    }
    lines.extend(action_lines(actions, options));

    let has_statements = function.actions.iter().any(|action| !action.is_comment());
    if function.conditions.is_empty() && !has_statements {
        let kept_empty = preserve && !function.style.has_body_content;
        let returns_int = function.return_type.eq_ignore_ascii_case("int");
        if returns_int && !kept_empty {
            lines.push(format!("{}{} TRUE;", indent, options.keyword("return")));
        } else if !returns_int
            && !kept_empty
            && options.include_comments
            && function.actions.is_empty()
        {
            lines.push(format!("{}// no statements", indent));
        }
    }
    lines.push("};".to_string());
    lines
}

/// One indented block per action, nested lines re-indented with the
/// configured unit. Comment actions are dropped without comments.
fn action_lines(actions: &[Action], options: &GeneratorOptions) -> Vec<String> {
    let indent = options.indent();
    actions
        .iter()
        .filter(|action| options.include_comments || !action.is_comment())
        .flat_map(|action| {
            indent_block(&retab(&action.render(options.include_comments), &indent), &indent)
        })
        .collect()
}

/// `if (...) { return TRUE; };` over the conjunction of `conditions`.
fn condition_block(conditions: &[Condition], options: &GeneratorOptions) -> Vec<String> {
    let indent = options.indent();
    let keyword_if = options.keyword("if");
    let terms: Vec<String> = conditions
        .iter()
        .map(|condition| {
            if conditions.len() > 1 && condition.needs_grouping() {
                format!("({})", condition.render())
            } else {
                condition.render()
            }
        })
        .collect();

    let mut lines = Vec::new();
    let single_line = format!("{}{} ({})", indent, keyword_if, terms.join(" && "));
    let fits = match options.max_line_length {
        Some(limit) => display_width(&single_line) <= limit,
        None => false,
    };
    if terms.len() == 1 || fits {
        lines.push(single_line);
    } else {
        let last = terms.len() - 1;
        for (index, term) in terms.iter().enumerate() {
            let close = if index == last { ")" } else { "" };
            if index == 0 {
                lines.push(format!("{}{} ({}{}", indent, keyword_if, term, close));
            } else {
                lines.push(format!("{}&& {}{}", indent, term, close));
            }
        }
    }
    lines.push(format!("{}{{", indent));
    lines.push(format!("{}{}{} TRUE;", indent, indent, options.keyword("return")));
    lines.push(format!("{}}};", indent));
    lines
}

/// Line width with tabs counted as four columns.
fn display_width(line: &str) -> usize {
    line.chars().map(|ch| if ch == '\t' { 4 } else { 1 }).sum()
}
