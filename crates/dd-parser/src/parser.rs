use dd_core::{ByteRange, SourcePoint};

use crate::lexer::{tokenize, Token, TokenKind};
use crate::syntax::{Field, NodeData, NodeKind, SyntaxTree};

const DECLARATION_KEYWORDS: [&str; 6] = ["instance", "func", "const", "var", "class", "prototype"];
/// Keywords that can only start a top-level declaration; seeing one inside a
/// block means its closing brace is missing.
const TOP_LEVEL_ONLY_KEYWORDS: [&str; 4] = ["instance", "func", "class", "prototype"];
const PRIMITIVE_TYPES: [&str; 4] = ["void", "int", "float", "string"];
const ASSIGNMENT_OPERATORS: [&str; 5] = ["=", "+=", "-=", "*=", "/="];
const UNARY_OPERATORS: [&str; 4] = ["!", "~", "+", "-"];

/// Parses Daedalus source into a syntax tree. Never fails: problems are
/// recorded as `ERROR` nodes and zero-width missing tokens.
pub fn parse(source: &str) -> SyntaxTree {
    let mut parser = Parser {
        source,
        tokens: tokenize(source),
        pos: 0,
        pending: Vec::new(),
        last_end: 0,
    };
    let program = parser.parse_program();
    flatten(source, program)
}

#[derive(Debug)]
struct RawNode {
    kind: NodeKind,
    field: Option<Field>,
    range: ByteRange,
    children: Vec<RawNode>,
    missing: bool,
}

impl RawNode {
    fn new(kind: NodeKind, at: usize) -> Self {
        Self {
            kind,
            field: None,
            range: ByteRange::new(at, at),
            children: Vec::new(),
            missing: false,
        }
    }

    fn leaf(kind: NodeKind, range: ByteRange) -> Self {
        Self {
            kind,
            field: None,
            range,
            children: Vec::new(),
            missing: false,
        }
    }

    fn missing(kind: NodeKind, at: usize) -> Self {
        Self {
            missing: true,
            ..Self::new(kind, at)
        }
    }

    fn with_field(mut self, field: Option<Field>) -> Self {
        self.field = field;
        self
    }

    fn append(&mut self, child: RawNode) {
        if self.children.is_empty() {
            self.range.start = child.range.start;
        }
        self.range.end = self.range.end.max(child.range.end);
        self.children.push(child);
    }
}

struct Parser<'s> {
    source: &'s str,
    tokens: Vec<Token>,
    pos: usize,
    /// Comments seen by lookahead but not attached to a node yet.
    pending: Vec<RawNode>,
    last_end: usize,
}

impl<'s> Parser<'s> {
    fn peek(&mut self) -> Option<Token> {
        while let Some(token) = self.tokens.get(self.pos).copied() {
            if token.kind != TokenKind::Comment {
                return Some(token);
            }
            self.pending
                .push(RawNode::leaf(NodeKind::Comment, token.range));
            self.pos += 1;
        }
        None
    }

    fn peek_text(&mut self) -> Option<&'s str> {
        let source = self.source;
        self.peek()
            .map(|token| &source[token.range.start..token.range.end])
    }

    fn at_punct(&mut self, punct: &str) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Punct(p), .. }) if p == punct)
    }

    fn at_keyword(&mut self, keyword: &str) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Identifier, .. }))
            && self
                .peek_text()
                .is_some_and(|text| text.eq_ignore_ascii_case(keyword))
    }

    fn at_any_keyword(&mut self, keywords: &[&str]) -> bool {
        keywords.iter().any(|keyword| self.at_keyword(keyword))
    }

    fn at_identifier(&mut self) -> bool {
        matches!(self.peek(), Some(Token { kind: TokenKind::Identifier, .. }))
    }

    fn can_start_expression(&mut self) -> bool {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Identifier,
                ..
            }) => !self.at_any_keyword(&TOP_LEVEL_ONLY_KEYWORDS) && !self.at_keyword("else"),
            Some(Token {
                kind: TokenKind::Number | TokenKind::String,
                ..
            }) => true,
            Some(Token {
                kind: TokenKind::Punct(p),
                ..
            }) => p == "(" || UNARY_OPERATORS.contains(&p),
            _ => false,
        }
    }

    /// Consumes the current token as a leaf of the given kind.
    fn bump_as(&mut self, kind: NodeKind) -> RawNode {
        let token = self.peek();
        match token {
            Some(token) => {
                self.pos += 1;
                self.last_end = token.range.end;
                RawNode::leaf(kind, token.range)
            }
            None => RawNode::missing(kind, self.last_end),
        }
    }

    /// Consumes the current token with the kind its lexeme implies.
    fn bump_natural(&mut self) -> RawNode {
        let kind = match self.peek().map(|token| token.kind) {
            Some(TokenKind::Identifier) => NodeKind::Identifier,
            Some(TokenKind::Number) => NodeKind::Number,
            Some(TokenKind::String) => NodeKind::String,
            Some(TokenKind::Punct(p)) => NodeKind::Token(p),
            _ => NodeKind::Error,
        };
        self.bump_as(kind)
    }

    /// Attaches `child`; comments seen before it move into `node` first when
    /// they fall inside `node`.
    fn push(&mut self, node: &mut RawNode, child: RawNode, field: Option<Field>) {
        if !node.children.is_empty() {
            let start = child.range.start;
            let mut index = 0;
            while index < self.pending.len() {
                if self.pending[index].range.start < start {
                    let comment = self.pending.remove(index);
                    node.append(comment);
                } else {
                    index += 1;
                }
            }
        }
        node.append(child.with_field(field));
    }

    fn flush_comments(&mut self, node: &mut RawNode) {
        for comment in std::mem::take(&mut self.pending) {
            node.append(comment);
        }
    }

    fn push_punct(&mut self, node: &mut RawNode, punct: &'static str, field: Option<Field>) {
        let leaf = self.bump_as(NodeKind::Token(punct));
        self.push(node, leaf, field);
    }

    fn expect_punct(&mut self, node: &mut RawNode, punct: &'static str) {
        if self.at_punct(punct) {
            self.push_punct(node, punct, None);
        } else {
            let missing = RawNode::missing(NodeKind::Token(punct), self.last_end);
            self.push(node, missing, None);
        }
    }

    fn optional_punct(&mut self, node: &mut RawNode, punct: &'static str) {
        if self.at_punct(punct) {
            self.push_punct(node, punct, None);
        }
    }

    fn push_keyword(&mut self, node: &mut RawNode, keyword: &'static str, field: Option<Field>) {
        let leaf = self.bump_as(NodeKind::Token(keyword));
        self.push(node, leaf, field);
    }

    fn expect_identifier(&mut self, node: &mut RawNode, field: Field) {
        let child = if self.at_identifier() {
            self.bump_as(NodeKind::Identifier)
        } else {
            RawNode::missing(NodeKind::Identifier, self.last_end)
        };
        self.push(node, child, Some(field));
    }

    fn parse_program(&mut self) -> RawNode {
        let mut program = RawNode::new(NodeKind::Program, 0);
        while self.peek().is_some() {
            self.flush_comments(&mut program);
            let before = self.pos;
            if let Some(declaration) = self.parse_declaration() {
                program.append(declaration);
            }
            if self.pos == before {
                let error = self.parse_top_level_error();
                program.append(error);
            }
        }
        self.flush_comments(&mut program);
        program.range = ByteRange::new(0, self.source.len());
        program
    }

    fn parse_top_level_error(&mut self) -> RawNode {
        let mut error = RawNode::new(NodeKind::Error, self.last_end);
        loop {
            let leaf = self.bump_natural();
            self.push(&mut error, leaf, None);
            if self.peek().is_none() || self.at_any_keyword(&DECLARATION_KEYWORDS) {
                break;
            }
        }
        error
    }

    fn parse_declaration(&mut self) -> Option<RawNode> {
        if self.at_keyword("instance") {
            Some(self.parse_instance())
        } else if self.at_keyword("func") {
            Some(self.parse_function())
        } else if self.at_keyword("const") {
            Some(self.parse_variable_declaration("const"))
        } else if self.at_keyword("var") {
            Some(self.parse_variable_declaration("var"))
        } else if self.at_keyword("class") {
            Some(self.parse_class())
        } else if self.at_keyword("prototype") {
            Some(self.parse_prototype())
        } else {
            None
        }
    }

    fn parse_instance(&mut self) -> RawNode {
        let mut node = RawNode::new(NodeKind::InstanceDeclaration, self.last_end);
        self.push_keyword(&mut node, "instance", Some(Field::Keyword));
        self.expect_identifier(&mut node, Field::Name);
        self.expect_punct(&mut node, "(");
        self.expect_identifier(&mut node, Field::Parent);
        self.expect_punct(&mut node, ")");
        if self.at_punct("{") {
            let body = self.parse_block(NodeKind::Block);
            self.push(&mut node, body, Some(Field::Body));
            self.optional_punct(&mut node, ";");
        } else {
            self.expect_punct(&mut node, ";");
        }
        node
    }

    fn parse_function(&mut self) -> RawNode {
        let mut node = RawNode::new(NodeKind::FunctionDeclaration, self.last_end);
        self.push_keyword(&mut node, "func", Some(Field::Keyword));
        let return_type = self.parse_type();
        self.push(&mut node, return_type, Some(Field::ReturnType));
        self.expect_identifier(&mut node, Field::Name);
        self.expect_punct(&mut node, "(");
        if !self.at_punct(")") && !self.at_punct("{") {
            let parameters = self.parse_parameter_list();
            self.push(&mut node, parameters, Some(Field::Parameters));
        }
        self.expect_punct(&mut node, ")");
        let body = if self.at_punct("{") {
            self.parse_block(NodeKind::Block)
        } else {
            RawNode::missing(NodeKind::Block, self.last_end)
        };
        self.push(&mut node, body, Some(Field::Body));
        self.optional_punct(&mut node, ";");
        node
    }

    fn parse_type(&mut self) -> RawNode {
        if !self.at_identifier() {
            return RawNode::missing(NodeKind::Identifier, self.last_end);
        }
        if self.at_any_keyword(&PRIMITIVE_TYPES) {
            self.bump_as(NodeKind::PrimitiveType)
        } else {
            self.bump_as(NodeKind::Identifier)
        }
    }

    fn parse_parameter_list(&mut self) -> RawNode {
        let mut list = RawNode::new(NodeKind::ParameterList, self.last_end);
        loop {
            let parameter = self.parse_parameter();
            self.push(&mut list, parameter, None);
            if !self.at_punct(",") {
                break;
            }
            self.push_punct(&mut list, ",", None);
        }
        list
    }

    fn parse_parameter(&mut self) -> RawNode {
        let mut parameter = RawNode::new(NodeKind::Parameter, self.last_end);
        if self.at_keyword("var") {
            self.push_keyword(&mut parameter, "var", None);
        } else if self.at_keyword("const") {
            self.push_keyword(&mut parameter, "const", None);
        }
        let parameter_type = self.parse_type();
        self.push(&mut parameter, parameter_type, Some(Field::Type));
        self.expect_identifier(&mut parameter, Field::Name);
        parameter
    }

    fn parse_variable_declaration(&mut self, keyword: &'static str) -> RawNode {
        let mut node = RawNode::new(NodeKind::VariableDeclaration, self.last_end);
        self.push_keyword(&mut node, keyword, Some(Field::Keyword));
        let variable_type = self.parse_type();
        self.push(&mut node, variable_type, Some(Field::Type));
        self.expect_identifier(&mut node, Field::Name);
        if self.at_punct("[") {
            self.push_punct(&mut node, "[", None);
            let size = self.parse_expression(1);
            self.push(&mut node, size, Some(Field::Size));
            self.expect_punct(&mut node, "]");
        }
        if self.at_punct("=") {
            self.push_punct(&mut node, "=", None);
            let value = if self.at_punct("{") {
                self.parse_array_initialization()
            } else {
                self.parse_expression(1)
            };
            self.push(&mut node, value, Some(Field::Value));
        }
        self.expect_punct(&mut node, ";");
        node
    }

    fn parse_array_initialization(&mut self) -> RawNode {
        let mut node = RawNode::new(NodeKind::ArrayInitialization, self.last_end);
        self.push_punct(&mut node, "{", None);
        loop {
            let element = self.parse_expression(1);
            self.push(&mut node, element, None);
            if !self.at_punct(",") {
                break;
            }
            self.push_punct(&mut node, ",", None);
            if self.at_punct("}") {
                break;
            }
        }
        self.expect_punct(&mut node, "}");
        node
    }

    fn parse_class(&mut self) -> RawNode {
        let mut node = RawNode::new(NodeKind::ClassDeclaration, self.last_end);
        self.push_keyword(&mut node, "class", Some(Field::Keyword));
        self.expect_identifier(&mut node, Field::Name);
        let body = self.parse_block(NodeKind::ClassBody);
        self.push(&mut node, body, Some(Field::Body));
        self.optional_punct(&mut node, ";");
        node
    }

    fn parse_prototype(&mut self) -> RawNode {
        let mut node = RawNode::new(NodeKind::PrototypeDeclaration, self.last_end);
        self.push_keyword(&mut node, "prototype", Some(Field::Keyword));
        self.expect_identifier(&mut node, Field::Name);
        self.expect_punct(&mut node, "(");
        self.expect_identifier(&mut node, Field::Parent);
        self.expect_punct(&mut node, ")");
        let body = self.parse_block(NodeKind::ClassBody);
        self.push(&mut node, body, Some(Field::Body));
        self.optional_punct(&mut node, ";");
        node
    }

    /// Parses `{ statement* }` as a `block` or `class_body`.
    fn parse_block(&mut self, kind: NodeKind) -> RawNode {
        let mut block = RawNode::new(kind, self.last_end);
        self.expect_punct(&mut block, "{");
        loop {
            if self.peek().is_none() || self.at_any_keyword(&TOP_LEVEL_ONLY_KEYWORDS) {
                self.expect_punct(&mut block, "}");
                break;
            }
            if self.at_punct("}") {
                self.push_punct(&mut block, "}", None);
                break;
            }
            self.flush_comments(&mut block);
            let before = self.pos;
            if let Some(statement) = self.parse_statement() {
                block.append(statement);
            }
            if self.pos == before {
                let mut error = RawNode::new(NodeKind::Error, self.last_end);
                let leaf = self.bump_natural();
                self.push(&mut error, leaf, None);
                block.append(error);
            }
        }
        block
    }

    fn parse_statement(&mut self) -> Option<RawNode> {
        if self.at_keyword("if") {
            return Some(self.parse_if());
        }
        if self.at_keyword("return") {
            return Some(self.parse_return());
        }
        if self.at_keyword("var") {
            return Some(self.parse_variable_declaration("var"));
        }
        if self.at_keyword("const") {
            return Some(self.parse_variable_declaration("const"));
        }
        if self.at_punct(";") {
            return Some(self.bump_as(NodeKind::Token(";")));
        }
        if !self.can_start_expression() {
            return None;
        }

        let start = self.last_end;
        let expression = self.parse_expression(1);
        let operator = ASSIGNMENT_OPERATORS
            .iter()
            .copied()
            .find(|operator| self.at_punct(operator));
        let assignable = matches!(
            expression.kind,
            NodeKind::Identifier | NodeKind::MemberAccess | NodeKind::ArrayAccess
        );

        match operator {
            Some(operator) if assignable => {
                let mut node = RawNode::new(NodeKind::AssignmentStatement, start);
                self.push(&mut node, expression, Some(Field::Left));
                self.push_punct(&mut node, operator, Some(Field::Operator));
                let right = self.parse_expression(1);
                self.push(&mut node, right, Some(Field::Right));
                self.expect_punct(&mut node, ";");
                Some(node)
            }
            _ => {
                let mut node = RawNode::new(NodeKind::ExpressionStatement, start);
                self.push(&mut node, expression, None);
                self.optional_punct(&mut node, ";");
                Some(node)
            }
        }
    }

    fn parse_if(&mut self) -> RawNode {
        let mut node = RawNode::new(NodeKind::IfStatement, self.last_end);
        self.push_keyword(&mut node, "if", None);
        let condition = self.parse_expression(1);
        self.push(&mut node, condition, Some(Field::Condition));
        let consequence = self.parse_branch_block();
        self.push(&mut node, consequence, Some(Field::Consequence));
        self.optional_punct(&mut node, ";");
        if self.at_keyword("else") {
            self.push_keyword(&mut node, "else", None);
            let alternative = if self.at_keyword("if") {
                self.parse_if()
            } else {
                self.parse_branch_block()
            };
            self.push(&mut node, alternative, Some(Field::Alternative));
            self.optional_punct(&mut node, ";");
        }
        node
    }

    fn parse_branch_block(&mut self) -> RawNode {
        if self.at_punct("{") {
            self.parse_block(NodeKind::Block)
        } else {
            RawNode::missing(NodeKind::Block, self.last_end)
        }
    }

    fn parse_return(&mut self) -> RawNode {
        let mut node = RawNode::new(NodeKind::ReturnStatement, self.last_end);
        self.push_keyword(&mut node, "return", None);
        if !self.at_punct(";") && self.can_start_expression() {
            let value = self.parse_expression(1);
            self.push(&mut node, value, Some(Field::Value));
        }
        self.expect_punct(&mut node, ";");
        node
    }

    fn binary_operator(&mut self) -> Option<(&'static str, u8)> {
        let Some(Token {
            kind: TokenKind::Punct(operator),
            ..
        }) = self.peek()
        else {
            return None;
        };
        let precedence = match operator {
            "||" => 1,
            "&&" => 2,
            "|" => 3,
            "^" => 4,
            "&" => 5,
            "==" | "!=" => 6,
            "<" | "<=" | ">" | ">=" => 7,
            "<<" | ">>" => 8,
            "+" | "-" => 9,
            "*" | "/" | "%" => 10,
            _ => return None,
        };
        Some((operator, precedence))
    }

    fn parse_expression(&mut self, min_precedence: u8) -> RawNode {
        let mut left = self.parse_unary();
        while let Some((operator, precedence)) = self.binary_operator() {
            if precedence < min_precedence {
                break;
            }
            let mut node = RawNode::new(NodeKind::BinaryExpression, left.range.start);
            self.push(&mut node, left, Some(Field::Left));
            self.push_punct(&mut node, operator, Some(Field::Operator));
            let right = self.parse_expression(precedence + 1);
            self.push(&mut node, right, Some(Field::Right));
            left = node;
        }
        left
    }

    fn parse_unary(&mut self) -> RawNode {
        let operator = UNARY_OPERATORS
            .iter()
            .copied()
            .find(|operator| self.at_punct(operator));
        let Some(operator) = operator else {
            return self.parse_postfix();
        };
        let mut node = RawNode::new(NodeKind::UnaryExpression, self.last_end);
        self.push_punct(&mut node, operator, Some(Field::Operator));
        let operand = self.parse_unary();
        self.push(&mut node, operand, Some(Field::Operand));
        node
    }

    fn parse_postfix(&mut self) -> RawNode {
        let mut expression = self.parse_primary();
        loop {
            let callable = matches!(
                expression.kind,
                NodeKind::Identifier | NodeKind::MemberAccess
            ) && !expression.missing;
            if callable && self.at_punct("(") {
                let mut call = RawNode::new(NodeKind::CallExpression, expression.range.start);
                self.push(&mut call, expression, Some(Field::Function));
                self.push_punct(&mut call, "(", None);
                if !self.at_punct(")") && self.can_start_expression() {
                    let arguments = self.parse_argument_list();
                    self.push(&mut call, arguments, Some(Field::Arguments));
                }
                self.expect_punct(&mut call, ")");
                expression = call;
            } else if self.at_punct("[") {
                let mut access = RawNode::new(NodeKind::ArrayAccess, expression.range.start);
                self.push(&mut access, expression, Some(Field::Array));
                self.push_punct(&mut access, "[", None);
                let index = self.parse_expression(1);
                self.push(&mut access, index, Some(Field::Index));
                self.expect_punct(&mut access, "]");
                expression = access;
            } else if self.at_punct(".") {
                let mut access = RawNode::new(NodeKind::MemberAccess, expression.range.start);
                self.push(&mut access, expression, Some(Field::Object));
                self.push_punct(&mut access, ".", None);
                self.expect_identifier(&mut access, Field::Member);
                expression = access;
            } else {
                break;
            }
        }
        expression
    }

    fn parse_argument_list(&mut self) -> RawNode {
        let mut list = RawNode::new(NodeKind::ArgumentList, self.last_end);
        loop {
            let argument = self.parse_expression(1);
            self.push(&mut list, argument, None);
            if !self.at_punct(",") {
                break;
            }
            self.push_punct(&mut list, ",", None);
        }
        list
    }

    fn parse_primary(&mut self) -> RawNode {
        match self.peek().map(|token| token.kind) {
            Some(TokenKind::Identifier) => {
                if self.at_keyword("true") || self.at_keyword("false") {
                    self.bump_as(NodeKind::Boolean)
                } else {
                    self.bump_as(NodeKind::Identifier)
                }
            }
            Some(TokenKind::Number) => self.bump_as(NodeKind::Number),
            Some(TokenKind::String) => self.bump_as(NodeKind::String),
            Some(TokenKind::Punct("(")) => {
                let mut node = RawNode::new(NodeKind::ParenthesizedExpression, self.last_end);
                self.push_punct(&mut node, "(", None);
                let inner = self.parse_expression(1);
                self.push(&mut node, inner, None);
                self.expect_punct(&mut node, ")");
                node
            }
            _ => RawNode::missing(NodeKind::Identifier, self.last_end),
        }
    }
}

fn flatten(source: &str, program: RawNode) -> SyntaxTree {
    let line_starts = line_starts(source);
    let mut nodes = Vec::new();
    insert_node(&mut nodes, &line_starts, program, None, 0);
    SyntaxTree {
        source: source.to_string(),
        nodes,
        root: 0,
    }
}

fn insert_node(
    nodes: &mut Vec<NodeData>,
    line_starts: &[usize],
    raw: RawNode,
    parent: Option<usize>,
    index_in_parent: usize,
) -> usize {
    let id = nodes.len();
    nodes.push(NodeData {
        kind: raw.kind,
        field: raw.field,
        range: raw.range,
        start: point_at(line_starts, raw.range.start),
        end: point_at(line_starts, raw.range.end),
        parent,
        index_in_parent,
        children: Vec::with_capacity(raw.children.len()),
        has_error: raw.kind == NodeKind::Error || raw.missing,
        missing: raw.missing,
    });

    let mut has_error = false;
    for (index, child) in raw.children.into_iter().enumerate() {
        let child_id = insert_node(nodes, line_starts, child, Some(id), index);
        has_error |= nodes[child_id].has_error;
        nodes[id].children.push(child_id);
    }
    nodes[id].has_error |= has_error;
    id
}

fn line_starts(source: &str) -> Vec<usize> {
    std::iter::once(0)
        .chain(
            source
                .bytes()
                .enumerate()
                .filter(|(_, byte)| *byte == b'\n')
                .map(|(index, _)| index + 1),
        )
        .collect()
}

fn point_at(line_starts: &[usize], offset: usize) -> SourcePoint {
    let row = line_starts
        .partition_point(|start| *start <= offset)
        .saturating_sub(1);
    SourcePoint {
        row,
        column: offset - line_starts[row],
    }
}

#[cfg(test)]
mod parser_tests {
    use super::*;
    use crate::syntax::Node;

    fn first_declaration(tree: &SyntaxTree) -> Node<'_> {
        tree.root()
            .named_children()
            .find(|node| node.kind().is_declaration())
            .expect("declaration should exist")
    }

    #[test]
    fn parses_dialog_instance_with_fields() {
        let source = "instance DIA_X (C_INFO)\n{\n\tnpc = NPC_A;\n\tnr = 1;\n};\n";
        let tree = parse(source);
        assert!(!tree.root().has_error());
        let instance = first_declaration(&tree);
        assert_eq!(instance.kind(), NodeKind::InstanceDeclaration);
        assert_eq!(
            instance.child_by_field(Field::Name).map(|n| n.text()),
            Some("DIA_X")
        );
        assert_eq!(
            instance.child_by_field(Field::Parent).map(|n| n.text()),
            Some("C_INFO")
        );
        let body = instance
            .child_by_field(Field::Body)
            .expect("body should exist");
        let statements = body.named_children().collect::<Vec<_>>();
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].kind(), NodeKind::AssignmentStatement);
        assert_eq!(
            statements[1].child_by_field(Field::Right).map(|n| n.kind()),
            Some(NodeKind::Number)
        );
    }

    #[test]
    fn keywords_are_case_insensitive() {
        let tree = parse("FUNC INT Foo () { RETURN TRUE; };");
        assert!(!tree.root().has_error());
        let function = first_declaration(&tree);
        assert_eq!(function.kind(), NodeKind::FunctionDeclaration);
        assert_eq!(
            function.child_by_field(Field::Keyword).map(|n| n.text()),
            Some("FUNC")
        );
        let return_type = function
            .child_by_field(Field::ReturnType)
            .expect("return type should exist");
        assert_eq!(return_type.kind(), NodeKind::PrimitiveType);
        assert_eq!(return_type.text(), "INT");
    }

    #[test]
    fn trailing_statement_comment_is_a_block_sibling() {
        let source = "func void F()\n{\n\tAI_Output (self, other, \"DIA_01\"); //Hi\n\tfoo();\n};";
        let tree = parse(source);
        let body = first_declaration(&tree)
            .child_by_field(Field::Body)
            .expect("body should exist");
        let kinds = body
            .named_children()
            .map(|node| node.kind())
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                NodeKind::ExpressionStatement,
                NodeKind::Comment,
                NodeKind::ExpressionStatement
            ]
        );
        let first = body.named_children().next().expect("statement");
        assert_eq!(
            first.next_sibling().map(|n| n.text()),
            Some("//Hi")
        );
    }

    #[test]
    fn precedence_follows_c_rules() {
        let tree = parse("func int F() { if (a || b && c == 1) { return TRUE; }; };");
        assert_eq!(
            tree.to_sexp(),
            "(program (function_declaration return_type: (primitive_type) name: (identifier) body: (block \
             (if_statement condition: (parenthesized_expression (binary_expression left: (identifier) \
             right: (binary_expression left: (identifier) right: (binary_expression left: (identifier) \
             right: (number))))) consequence: (block (return_statement value: (boolean)))))))"
        );
    }

    #[test]
    fn else_if_chains_nest() {
        let tree = parse("func void F() { if (a) { x = 1; } else if (b) { x = 2; } else { x = 3; }; };");
        assert!(!tree.root().has_error());
        let body = first_declaration(&tree)
            .child_by_field(Field::Body)
            .expect("body");
        let statement = body.named_children().next().expect("if");
        let alternative = statement
            .child_by_field(Field::Alternative)
            .expect("alternative");
        assert_eq!(alternative.kind(), NodeKind::IfStatement);
        assert!(alternative.child_by_field(Field::Alternative).is_some());
    }

    #[test]
    fn missing_semicolon_is_flagged() {
        let tree = parse("func void F() { x = 1 };");
        assert!(tree.root().has_error());
        let missing = tree
            .root()
            .descendants()
            .find(|node| node.is_missing())
            .expect("missing token");
        assert_eq!(missing.kind_name(), ";");
        assert_eq!(missing.start_byte(), missing.end_byte());
    }

    #[test]
    fn garbage_becomes_error_nodes_and_parsing_continues() {
        let tree = parse("@@ func void F() { ) foo(); };");
        assert!(tree.root().has_error());
        let errors = tree
            .root()
            .descendants()
            .filter(|node| node.is_error() && node.child_count() > 0)
            .count();
        assert_eq!(errors, 2);
        let function = first_declaration(&tree);
        assert_eq!(function.kind(), NodeKind::FunctionDeclaration);
    }

    #[test]
    fn unclosed_block_stops_at_next_declaration() {
        let tree = parse("func void F() { foo();\nfunc void G() { };");
        let declarations = tree
            .root()
            .named_children()
            .filter(|node| node.kind() == NodeKind::FunctionDeclaration)
            .count();
        assert_eq!(declarations, 2);
        assert!(tree.root().has_error());
    }

    #[test]
    fn globals_and_classes_parse() {
        let source = "const int MAX = 5;\nvar string names[2];\nconst string LIST[2] = {\"a\", \"b\"};\n\
                      class C_Foo { var int x; };\nprototype P_Foo (C_Foo) { x = 1; };\n\
                      instance self (C_NPC);";
        let tree = parse(source);
        assert!(!tree.root().has_error(), "{}", tree.to_sexp());
        let kinds = tree
            .root()
            .named_children()
            .map(|node| node.kind_name())
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                "variable_declaration",
                "variable_declaration",
                "variable_declaration",
                "class_declaration",
                "prototype_declaration",
                "instance_declaration"
            ]
        );
    }

    #[test]
    fn positions_are_zero_based_rows_and_columns() {
        let tree = parse("\n  func void F() {};");
        let function = first_declaration(&tree);
        assert_eq!(function.start_position(), SourcePoint { row: 1, column: 2 });
    }

    #[test]
    fn parameters_and_member_calls() {
        let tree = parse("func void B_X(var C_NPC slf, var int n) { slf.aivar[5] = n; Npc_SetTrueGuild(slf, 3); };");
        assert!(!tree.root().has_error(), "{}", tree.to_sexp());
        let parameters = first_declaration(&tree)
            .child_by_field(Field::Parameters)
            .expect("parameters");
        assert_eq!(parameters.text(), "var C_NPC slf, var int n");
        assert_eq!(parameters.named_child_count(), 2);
    }
}
