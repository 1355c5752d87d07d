use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::action::Action;
use crate::condition::Condition;
use crate::error::DaedalusError;
use crate::types::{ByteRange, SourcePoint};
use crate::value::{FunctionId, PrimitiveValue, PropertyValue};

/// Parent type that marks an instance as a dialog.
pub const DIALOG_PARENT_TYPE: &str = "C_INFO";
pub const NPC_PARENT_TYPES: [&str; 2] = ["C_NPC", "NPC_DEFAULT"];
pub const ITEM_PARENT_TYPE: &str = "C_ITEM";
pub const ANIMATION_PARENT_TYPE: &str = "C_MDS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyntaxErrorKind {
    SyntaxError,
    MissingToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticPosition {
    pub row: usize,
    pub column: usize,
}

/// Syntax problem copied from the tree. Positions are one-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyntaxDiagnostic {
    #[serde(rename = "type")]
    pub kind: SyntaxErrorKind,
    pub message: String,
    pub position: DiagnosticPosition,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionStyle {
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub space_before_paren: bool,
    #[serde(default = "default_true")]
    pub has_body_content: bool,
    /// A condition function ended with the canonical `return FALSE;`.
    #[serde(default)]
    pub explicit_false_return: bool,
}

impl Default for FunctionStyle {
    fn default() -> Self {
        Self {
            keyword: None,
            space_before_paren: false,
            has_body_content: true,
            explicit_false_return: false,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScriptFunction {
    pub name: String,
    pub return_type: String,
    /// Parameter list text between the parentheses.
    #[serde(default)]
    pub parameters: String,
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub calls: Vec<String>,
    #[serde(default)]
    pub style: FunctionStyle,
    /// Set once the body was preserved verbatim instead of classified.
    #[serde(default)]
    pub raw: bool,
    #[serde(default)]
    pub leading_comments: Vec<String>,
}

impl ScriptFunction {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            parameters: String::new(),
            actions: Vec::new(),
            conditions: Vec::new(),
            calls: Vec::new(),
            style: FunctionStyle::default(),
            raw: false,
            leading_comments: Vec::new(),
        }
    }
}

/// Function arena. Ids stay stable for the lifetime of the table, so every
/// dialog linking to an id observes later edits of that function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionTable {
    slots: Vec<ScriptFunction>,
    by_name: BTreeMap<String, FunctionId>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a function. A duplicate name replaces the earlier entry in
    /// place and keeps its id.
    pub fn insert(&mut self, function: ScriptFunction) -> FunctionId {
        if let Some(id) = self.by_name.get(&function.name).copied() {
            self.slots[id.0] = function;
            return id;
        }
        let id = FunctionId(self.slots.len());
        self.by_name.insert(function.name.clone(), id);
        self.slots.push(function);
        id
    }

    pub fn get(&self, id: FunctionId) -> Option<&ScriptFunction> {
        self.slots.get(id.0)
    }

    pub fn get_mut(&mut self, id: FunctionId) -> Option<&mut ScriptFunction> {
        self.slots.get_mut(id.0)
    }

    pub fn id_of(&self, name: &str) -> Option<FunctionId> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&ScriptFunction> {
        self.id_of(name).and_then(|id| self.get(id))
    }

    pub fn by_name_mut(&mut self, name: &str) -> Option<&mut ScriptFunction> {
        let id = self.id_of(name)?;
        self.get_mut(id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Functions in insertion order together with their ids.
    pub fn iter(&self) -> impl Iterator<Item = (FunctionId, &ScriptFunction)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(index, function)| (FunctionId(index), function))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.slots.iter().map(|function| function.name.as_str())
    }

    pub fn rename(&mut self, id: FunctionId, new_name: &str) -> Result<(), DaedalusError> {
        if let Some(existing) = self.by_name.get(new_name) {
            if *existing != id {
                return Err(DaedalusError::new(
                    "MODEL_FUNCTION_NAME_TAKEN",
                    format!("Function \"{}\" already exists.", new_name),
                ));
            }
            return Ok(());
        }
        let Some(function) = self.slots.get_mut(id.0) else {
            return Err(DaedalusError::new(
                "MODEL_FUNCTION_NOT_FOUND",
                format!("Function id {} is not registered.", id.0),
            ));
        };
        self.by_name.remove(&function.name);
        function.name = new_name.to_string();
        self.by_name.insert(new_name.to_string(), id);
        Ok(())
    }
}

/// Rebuilds a table by position, so slot `n` keeps `FunctionId(n)`. Duplicate
/// names are rejected because they would shift every later id.
impl TryFrom<Vec<ScriptFunction>> for FunctionTable {
    type Error = DaedalusError;

    fn try_from(slots: Vec<ScriptFunction>) -> Result<Self, Self::Error> {
        let mut by_name = BTreeMap::new();
        for (index, function) in slots.iter().enumerate() {
            if by_name.insert(function.name.clone(), FunctionId(index)).is_some() {
                return Err(DaedalusError::new(
                    "MODEL_FUNCTION_DUPLICATE",
                    format!("Function '{}' appears more than once.", function.name),
                ));
            }
        }
        Ok(Self { slots, by_name })
    }
}

impl Serialize for FunctionTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.slots.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for FunctionTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let slots = Vec::<ScriptFunction>::deserialize(deserializer)?;
        FunctionTable::try_from(slots).map_err(serde::de::Error::custom)
    }
}

/// Insertion-ordered property map. Serializes as a JSON object in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyMap {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a property, keeping the position of an existing key.
    pub fn insert(&mut self, key: impl Into<String>, value: PropertyValue) {
        let key = key.into();
        if let Some(entry) = self.entries.iter_mut().find(|(name, _)| *name == key) {
            entry.1 = value;
            return;
        }
        self.entries.push((key, value));
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    pub fn remove(&mut self, key: &str) -> Option<PropertyValue> {
        let index = self.entries.iter().position(|(name, _)| name == key)?;
        Some(self.entries.remove(index).1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for PropertyMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PropertyMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PropertyMapVisitor;

        impl<'de> Visitor<'de> for PropertyMapVisitor {
            type Value = PropertyMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of dialog properties")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<PropertyMap, A::Error> {
                let mut properties = PropertyMap::new();
                while let Some((key, value)) = access.next_entry::<String, PropertyValue>()? {
                    properties.insert(key, value);
                }
                Ok(properties)
            }
        }

        deserializer.deserialize_map(PropertyMapVisitor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySpacing {
    pub before_equals: String,
    pub after_equals: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertyFormatting {
    pub spacing: BTreeMap<String, PropertySpacing>,
    /// Keys whose value is a raw expression and must not be re-quoted.
    pub expression_keys: BTreeSet<String>,
    /// Keys whose value was a string literal and must always be quoted.
    pub string_literal_keys: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogInstance {
    pub name: String,
    pub parent_type: String,
    #[serde(default)]
    pub properties: PropertyMap,
    /// Actions of the function linked as `information`.
    #[serde(default)]
    pub actions: Vec<Action>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub space_before_paren: bool,
    #[serde(default)]
    pub leading_comments: Vec<String>,
    #[serde(default)]
    pub formatting: PropertyFormatting,
}

impl DialogInstance {
    pub fn new(name: impl Into<String>, parent_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent_type: parent_type.into(),
            properties: PropertyMap::new(),
            actions: Vec::new(),
            keyword: None,
            space_before_paren: false,
            leading_comments: Vec::new(),
            formatting: PropertyFormatting::default(),
        }
    }

    pub fn function_property(&self, key: &str) -> Option<FunctionId> {
        self.properties.get(key).and_then(PropertyValue::as_function)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalInstance {
    pub name: String,
    pub parent_type: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub position: SourcePoint,
    pub range: ByteRange,
    pub source_text: String,
    #[serde(default)]
    pub leading_comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConstant {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub value: PrimitiveValue,
    pub position: SourcePoint,
    pub range: ByteRange,
    pub source_text: String,
    #[serde(default)]
    pub leading_comments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalVariable {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub position: SourcePoint,
    pub range: ByteRange,
    pub source_text: String,
    #[serde(default)]
    pub leading_comments: Vec<String>,
}

/// `class` or `prototype` declaration kept as source text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerbatimDeclaration {
    pub name: String,
    pub keyword: String,
    pub position: SourcePoint,
    pub range: ByteRange,
    pub source_text: String,
    #[serde(default)]
    pub leading_comments: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeclarationKind {
    Dialog,
    Function,
    Instance,
    Constant,
    Variable,
    Verbatim,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationEntry {
    pub kind: DeclarationKind,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SemanticModel {
    pub dialogs: BTreeMap<String, DialogInstance>,
    pub functions: FunctionTable,
    pub constants: BTreeMap<String, GlobalConstant>,
    pub variables: BTreeMap<String, GlobalVariable>,
    pub instances: BTreeMap<String, GlobalInstance>,
    pub npcs: BTreeMap<String, GlobalInstance>,
    pub items: BTreeMap<String, GlobalInstance>,
    pub animations: BTreeMap<String, GlobalInstance>,
    pub verbatim: BTreeMap<String, VerbatimDeclaration>,
    pub declaration_order: Vec<DeclarationEntry>,
    /// Comments after the last declaration.
    pub trailing_comments: Vec<String>,
    pub has_errors: bool,
    pub errors: Vec<SyntaxDiagnostic>,
}

impl SemanticModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn function(&self, name: &str) -> Option<&ScriptFunction> {
        self.functions.by_name(name)
    }

    pub fn dialog(&self, name: &str) -> Option<&DialogInstance> {
        self.dialogs.get(name)
    }

    /// Function linked from a dialog property, if the property holds a link.
    pub fn linked_function(&self, dialog: &DialogInstance, key: &str) -> Option<&ScriptFunction> {
        dialog
            .function_property(key)
            .and_then(|id| self.functions.get(id))
    }

    /// Renames a function; linked dialog properties follow automatically.
    pub fn rename_function(&mut self, old_name: &str, new_name: &str) -> Result<(), DaedalusError> {
        let Some(id) = self.functions.id_of(old_name) else {
            return Err(DaedalusError::new(
                "MODEL_FUNCTION_NOT_FOUND",
                format!("Function \"{}\" is not registered.", old_name),
            ));
        };
        self.functions.rename(id, new_name)?;
        for entry in &mut self.declaration_order {
            if entry.kind == DeclarationKind::Function && entry.name == old_name {
                entry.name = new_name.to_string();
            }
        }
        Ok(())
    }

    pub fn record_declaration(&mut self, kind: DeclarationKind, name: impl Into<String>) {
        self.declaration_order.push(DeclarationEntry {
            kind,
            name: name.into(),
        });
    }
}
