use std::fmt;

use dd_core::{ByteRange, SourcePoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Program,
    InstanceDeclaration,
    FunctionDeclaration,
    VariableDeclaration,
    ClassDeclaration,
    PrototypeDeclaration,
    ClassBody,
    ArrayInitialization,
    ParameterList,
    Parameter,
    Block,
    AssignmentStatement,
    ExpressionStatement,
    IfStatement,
    ReturnStatement,
    BinaryExpression,
    UnaryExpression,
    CallExpression,
    ArgumentList,
    ArrayAccess,
    MemberAccess,
    ParenthesizedExpression,
    Identifier,
    Number,
    String,
    Boolean,
    PrimitiveType,
    Comment,
    /// Anonymous token; carries its canonical lowercase spelling.
    Token(&'static str),
    Error,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::Program => "program",
            Self::InstanceDeclaration => "instance_declaration",
            Self::FunctionDeclaration => "function_declaration",
            Self::VariableDeclaration => "variable_declaration",
            Self::ClassDeclaration => "class_declaration",
            Self::PrototypeDeclaration => "prototype_declaration",
            Self::ClassBody => "class_body",
            Self::ArrayInitialization => "array_initialization",
            Self::ParameterList => "parameter_list",
            Self::Parameter => "parameter",
            Self::Block => "block",
            Self::AssignmentStatement => "assignment_statement",
            Self::ExpressionStatement => "expression_statement",
            Self::IfStatement => "if_statement",
            Self::ReturnStatement => "return_statement",
            Self::BinaryExpression => "binary_expression",
            Self::UnaryExpression => "unary_expression",
            Self::CallExpression => "call_expression",
            Self::ArgumentList => "argument_list",
            Self::ArrayAccess => "array_access",
            Self::MemberAccess => "member_access",
            Self::ParenthesizedExpression => "parenthesized_expression",
            Self::Identifier => "identifier",
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::PrimitiveType => "primitive_type",
            Self::Comment => "comment",
            Self::Token(text) => text,
            Self::Error => "ERROR",
        }
    }

    pub fn is_named(self) -> bool {
        !matches!(self, Self::Token(_))
    }

    pub fn is_declaration(self) -> bool {
        matches!(
            self,
            Self::InstanceDeclaration
                | Self::FunctionDeclaration
                | Self::VariableDeclaration
                | Self::ClassDeclaration
                | Self::PrototypeDeclaration
        )
    }

    pub fn is_statement(self) -> bool {
        matches!(
            self,
            Self::AssignmentStatement
                | Self::ExpressionStatement
                | Self::IfStatement
                | Self::ReturnStatement
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Keyword,
    Name,
    Parent,
    Body,
    ReturnType,
    Parameters,
    Type,
    Size,
    Value,
    Left,
    Right,
    Operator,
    Condition,
    Consequence,
    Alternative,
    Operand,
    Function,
    Arguments,
    Array,
    Index,
    Object,
    Member,
}

impl Field {
    pub fn name(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Name => "name",
            Self::Parent => "parent",
            Self::Body => "body",
            Self::ReturnType => "return_type",
            Self::Parameters => "parameters",
            Self::Type => "type",
            Self::Size => "size",
            Self::Value => "value",
            Self::Left => "left",
            Self::Right => "right",
            Self::Operator => "operator",
            Self::Condition => "condition",
            Self::Consequence => "consequence",
            Self::Alternative => "alternative",
            Self::Operand => "operand",
            Self::Function => "function",
            Self::Arguments => "arguments",
            Self::Array => "array",
            Self::Index => "index",
            Self::Object => "object",
            Self::Member => "member",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) field: Option<Field>,
    pub(crate) range: ByteRange,
    pub(crate) start: SourcePoint,
    pub(crate) end: SourcePoint,
    pub(crate) parent: Option<usize>,
    pub(crate) index_in_parent: usize,
    pub(crate) children: Vec<usize>,
    pub(crate) has_error: bool,
    pub(crate) missing: bool,
}

/// Immutable parse result. Nodes live in an arena owned by the tree.
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) source: String,
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) root: usize,
}

impl SyntaxTree {
    pub fn root(&self) -> Node<'_> {
        Node {
            tree: self,
            id: self.root,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Renders the tree as an S-expression of named nodes.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        write_sexp(self.root(), &mut out);
        out
    }
}

fn write_sexp(node: Node<'_>, out: &mut String) {
    if node.is_missing() {
        out.push_str(&format!("(MISSING {})", node.kind_name()));
        return;
    }
    out.push('(');
    out.push_str(node.kind_name());
    for child in node.named_children() {
        out.push(' ');
        if let Some(field) = child.field() {
            out.push_str(field.name());
            out.push_str(": ");
        }
        write_sexp(child, out);
    }
    out.push(')');
}

/// Cheap, copyable handle to a node of a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct Node<'t> {
    tree: &'t SyntaxTree,
    id: usize,
}

impl<'t> Node<'t> {
    fn data(&self) -> &'t NodeData {
        &self.tree.nodes[self.id]
    }

    fn at(&self, id: usize) -> Node<'t> {
        Node {
            tree: self.tree,
            id,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    pub fn kind_name(&self) -> &'static str {
        self.data().kind.name()
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.data().kind == kind
    }

    pub fn is_named(&self) -> bool {
        self.data().kind.is_named()
    }

    pub fn is_error(&self) -> bool {
        self.data().kind == NodeKind::Error
    }

    pub fn is_comment(&self) -> bool {
        self.data().kind == NodeKind::Comment
    }

    pub fn is_missing(&self) -> bool {
        self.data().missing
    }

    pub fn has_error(&self) -> bool {
        self.data().has_error
    }

    /// Field under which this node is attached to its parent.
    pub fn field(&self) -> Option<Field> {
        self.data().field
    }

    pub fn text(&self) -> &'t str {
        let range = self.data().range;
        &self.tree.source[range.start..range.end]
    }

    pub fn range(&self) -> ByteRange {
        self.data().range
    }

    pub fn start_byte(&self) -> usize {
        self.data().range.start
    }

    pub fn end_byte(&self) -> usize {
        self.data().range.end
    }

    pub fn start_position(&self) -> SourcePoint {
        self.data().start
    }

    pub fn end_position(&self) -> SourcePoint {
        self.data().end
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn child(&self, index: usize) -> Option<Node<'t>> {
        self.data().children.get(index).map(|id| self.at(*id))
    }

    pub fn children(&self) -> impl Iterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .map(move |id| Node { tree, id: *id })
    }

    /// Children that are not anonymous tokens. Comments and errors count.
    pub fn named_children(&self) -> impl Iterator<Item = Node<'t>> + 't {
        self.children().filter(|child| child.is_named())
    }

    pub fn named_child_count(&self) -> usize {
        self.named_children().count()
    }

    pub fn child_by_field(&self, field: Field) -> Option<Node<'t>> {
        self.children().find(|child| child.field() == Some(field))
    }

    pub fn parent(&self) -> Option<Node<'t>> {
        self.data().parent.map(|id| self.at(id))
    }

    pub fn next_sibling(&self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        parent.child(self.data().index_in_parent + 1)
    }

    pub fn prev_sibling(&self) -> Option<Node<'t>> {
        let parent = self.parent()?;
        let index = self.data().index_in_parent.checked_sub(1)?;
        parent.child(index)
    }

    /// Pre-order walk over this node and all of its descendants.
    pub fn descendants(&self) -> impl Iterator<Item = Node<'t>> + 't {
        let tree = self.tree;
        let mut stack = vec![self.id];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(tree.nodes[id].children.iter().rev().copied());
            Some(Node { tree, id })
        })
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Node<'_> {}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}..{}]",
            self.kind_name(),
            self.start_byte(),
            self.end_byte()
        )
    }
}
