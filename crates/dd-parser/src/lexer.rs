use dd_core::ByteRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Number,
    String,
    Comment,
    Punct(&'static str),
    /// Unterminated string or a character outside the language.
    Invalid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: ByteRange,
}

const PUNCTUATION: [&str; 34] = [
    "||", "&&", "==", "!=", "<=", ">=", "<<", ">>", "+=", "-=", "*=", "/=", "(", ")", "{", "}",
    "[", "]", ";", ",", ".", "=", "<", ">", "+", "-", "*", "/", "%", "!", "~", "&", "|", "^",
];

pub fn tokenize(source: &str) -> Vec<Token> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while pos < bytes.len() {
        let byte = bytes[pos];
        if byte.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        let start = pos;
        let kind = if source[pos..].starts_with("//") {
            pos = source[pos..]
                .find(['\r', '\n'])
                .map_or(bytes.len(), |offset| pos + offset);
            TokenKind::Comment
        } else if source[pos..].starts_with("/*") {
            pos = source[pos + 2..]
                .find("*/")
                .map_or(bytes.len(), |offset| pos + 2 + offset + 2);
            TokenKind::Comment
        } else if byte == b'"' {
            match scan_string(bytes, pos) {
                Some(end) => {
                    pos = end;
                    TokenKind::String
                }
                None => {
                    pos = bytes.len();
                    TokenKind::Invalid
                }
            }
        } else if byte.is_ascii_digit() {
            pos = scan_number(bytes, pos);
            TokenKind::Number
        } else if let Some(ch) = source[pos..].chars().next().filter(|ch| is_identifier_start(*ch)) {
            pos += ch.len_utf8();
            while let Some(next) = source[pos..].chars().next() {
                if !is_identifier_continue(next) {
                    break;
                }
                pos += next.len_utf8();
            }
            TokenKind::Identifier
        } else if let Some(punct) = PUNCTUATION
            .iter()
            .find(|candidate| source[pos..].starts_with(**candidate))
        {
            pos += punct.len();
            TokenKind::Punct(punct)
        } else {
            pos += source[pos..].chars().next().map_or(1, char::len_utf8);
            TokenKind::Invalid
        };

        tokens.push(Token {
            kind,
            range: ByteRange::new(start, pos),
        });
    }

    tokens
}

fn scan_string(bytes: &[u8], start: usize) -> Option<usize> {
    let mut pos = start + 1;
    while pos < bytes.len() {
        match bytes[pos] {
            b'\\' => pos += 2,
            b'"' => return Some(pos + 1),
            _ => pos += 1,
        }
    }
    None
}

fn scan_number(bytes: &[u8], start: usize) -> usize {
    let mut pos = start;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    if pos + 1 < bytes.len() && bytes[pos] == b'.' && bytes[pos + 1].is_ascii_digit() {
        pos += 1;
        while pos < bytes.len() && bytes[pos].is_ascii_digit() {
            pos += 1;
        }
    }
    pos
}

fn is_identifier_start(ch: char) -> bool {
    ch == '_' || ch.is_ascii_alphabetic() || (!ch.is_ascii() && ch.is_alphabetic())
}

fn is_identifier_continue(ch: char) -> bool {
    is_identifier_start(ch) || ch.is_ascii_digit()
}
