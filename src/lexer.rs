use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

use tracing::debug;

use crate::error::{CompileError, CompileResult};

/// Relational operators. `<=` and `>=` lex and parse but have no opcode
/// in the code generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl RelOp {
    pub fn symbol(self) -> &'static str {
        match self {
            RelOp::Eq => "==",
            RelOp::Ne => "!=",
            RelOp::Lt => "<",
            RelOp::Gt => ">",
            RelOp::Le => "<=",
            RelOp::Ge => ">=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // keywords
    Print, If, Else, While, Def, Return,

    // operators
    RelOp(RelOp),
    Plus, Minus, Times, Divide, Assign,

    // punctuation
    LParen, RParen, LBrace, RBrace, Semicolon, Comma,

    // literals / identifiers
    Number(i64),
    Ident(String),

    // end of file
    Eof,
}

impl TokenKind {
    /// Upper-case kind name, independent of any payload.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Print => "PRINT",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::While => "WHILE",
            TokenKind::Def => "DEF",
            TokenKind::Return => "RETURN",
            TokenKind::RelOp(_) => "REL_OP",
            TokenKind::Plus => "PLUS",
            TokenKind::Minus => "MINUS",
            TokenKind::Times => "TIMES",
            TokenKind::Divide => "DIVIDE",
            TokenKind::Assign => "ASSIGN",
            TokenKind::LParen => "LPAREN",
            TokenKind::RParen => "RPAREN",
            TokenKind::LBrace => "LBRACE",
            TokenKind::RBrace => "RBRACE",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Comma => "COMMA",
            TokenKind::Number(_) => "NUMBER",
            TokenKind::Ident(_) => "IDENTIFIER",
            TokenKind::Eof => "EOF",
        }
    }

    fn keyword(word: &str) -> Option<TokenKind> {
        KEYWORDS.iter().find(|(text, _)| *text == word).map(|(_, kind)| kind.clone())
    }

    /// Fixed source text of keywords and punctuation, empty otherwise.
    fn spelling(&self) -> &'static str {
        KEYWORDS
            .iter()
            .chain(&SYMBOLS)
            .find(|(_, kind)| kind == self)
            .map_or("", |(text, _)| *text)
    }
}

static KEYWORDS: [(&str, TokenKind); 6] = [
    ("print", TokenKind::Print),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("def", TokenKind::Def),
    ("return", TokenKind::Return),
];

static SYMBOLS: [(&str, TokenKind); 11] = [
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Times),
    ("/", TokenKind::Divide),
    ("=", TokenKind::Assign),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
];

/// Byte range of a token in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

// `Token(KIND, payload)`: text payloads are quoted, numbers are not, and
// EOF has none.
impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.kind.name();
        match &self.kind {
            TokenKind::Number(n) => write!(f, "Token({name}, {n})"),
            TokenKind::Eof => write!(f, "Token({name}, None)"),
            TokenKind::Ident(id) => write!(f, "Token({name}, '{id}')"),
            TokenKind::RelOp(op) => write!(f, "Token({name}, '{}')", op.symbol()),
            fixed => write!(f, "Token({name}, '{}')", fixed.spelling()),
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    input: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer { source, input: source.char_indices().peekable() }
    }

    fn next_char(&mut self) -> Option<(usize, char)> {
        self.input.next()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.input.peek().map(|&(_, c)| c)
    }

    /// Offset just past the last consumed character.
    fn offset(&mut self) -> usize {
        match self.input.peek() {
            Some(&(i, _)) => i,
            None => self.source.len(),
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek_char(), Some(c) if c.is_whitespace()) {
            self.next_char();
        }
    }

    /// Consume the next character when it is `expected`.
    fn eat(&mut self, expected: char) -> bool {
        if self.peek_char() == Some(expected) {
            self.next_char();
            return true;
        }
        false
    }

    fn number(&mut self, first: u32) -> CompileResult<TokenKind> {
        let mut value = i64::from(first);
        while let Some(&(pos, ch)) = self.input.peek() {
            let Some(digit) = ch.to_digit(10) else { break };
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(i64::from(digit)))
                .ok_or(CompileError::Lex { ch, pos })?;
            self.next_char();
        }
        Ok(TokenKind::Number(value))
    }

    fn identifier(&mut self, start: usize) -> TokenKind {
        while matches!(self.peek_char(), Some(ch) if ch.is_alphanumeric() || ch == '_') {
            self.next_char();
        }
        let end = self.offset();
        let word = &self.source[start..end];
        TokenKind::keyword(word).unwrap_or_else(|| TokenKind::Ident(word.to_string()))
    }

    pub fn next_token(&mut self) -> CompileResult<Token> {
        self.skip_whitespace();
        let (start, c) = match self.next_char() {
            Some(next) => next,
            None => {
                let end = self.source.len();
                return Ok(Token { kind: TokenKind::Eof, span: Span { start: end, end } });
            }
        };

        let kind = match c {
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Times,
            '/' => TokenKind::Divide,
            '=' if self.eat('=') => TokenKind::RelOp(RelOp::Eq),
            '=' => TokenKind::Assign,
            '!' if self.eat('=') => TokenKind::RelOp(RelOp::Ne),
            '<' if self.eat('=') => TokenKind::RelOp(RelOp::Le),
            '<' => TokenKind::RelOp(RelOp::Lt),
            '>' if self.eat('=') => TokenKind::RelOp(RelOp::Ge),
            '>' => TokenKind::RelOp(RelOp::Gt),
            d if d.is_ascii_digit() => self.number(u32::from(d) - u32::from('0'))?,
            a if a.is_alphabetic() || a == '_' => self.identifier(start),
            other => return Err(CompileError::Lex { ch: other, pos: start }),
        };

        let end = self.offset();
        Ok(Token { kind, span: Span { start, end } })
    }

    pub fn tokenize(&mut self) -> CompileResult<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token()?;
            let done = tok.kind == TokenKind::Eof;
            tokens.push(tok);
            if done {
                break;
            }
        }
        debug!(tokens = tokens.len(), "lexed source");
        Ok(tokens)
    }
}

/// Lex `source` into tokens terminated by a single EOF.
pub fn tokenize(source: &str) -> CompileResult<Vec<Token>> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("def print_it while_ x1"),
            vec![
                TokenKind::Def,
                TokenKind::Ident("print_it".into()),
                TokenKind::Ident("while_".into()),
                TokenKind::Ident("x1".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_maximal_munch() {
        assert_eq!(
            kinds("a==b = c!=d<=e>=f<g>h"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::RelOp(RelOp::Eq),
                TokenKind::Ident("b".into()),
                TokenKind::Assign,
                TokenKind::Ident("c".into()),
                TokenKind::RelOp(RelOp::Ne),
                TokenKind::Ident("d".into()),
                TokenKind::RelOp(RelOp::Le),
                TokenKind::Ident("e".into()),
                TokenKind::RelOp(RelOp::Ge),
                TokenKind::Ident("f".into()),
                TokenKind::RelOp(RelOp::Lt),
                TokenKind::Ident("g".into()),
                TokenKind::RelOp(RelOp::Gt),
                TokenKind::Ident("h".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers_and_punctuation() {
        assert_eq!(
            kinds("f(12, 3) { x = 4 * 5 - 6 / 7; }"),
            vec![
                TokenKind::Ident("f".into()),
                TokenKind::LParen,
                TokenKind::Number(12),
                TokenKind::Comma,
                TokenKind::Number(3),
                TokenKind::RParen,
                TokenKind::LBrace,
                TokenKind::Ident("x".into()),
                TokenKind::Assign,
                TokenKind::Number(4),
                TokenKind::Times,
                TokenKind::Number(5),
                TokenKind::Minus,
                TokenKind::Number(6),
                TokenKind::Divide,
                TokenKind::Number(7),
                TokenKind::Semicolon,
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_single_eof_on_empty_input() {
        assert_eq!(kinds("   \n\t "), vec![TokenKind::Eof]);
    }

    #[test]
    fn test_spans_rebuild_source() {
        let source = "def f(a) {\n  return a >= 10;\n}\nx = f(2);";
        let tokens = tokenize(source).unwrap();
        let rebuilt: String =
            tokens.iter().map(|t| &source[t.span.start..t.span.end]).collect();
        let stripped: String = source.chars().filter(|c| !c.is_whitespace()).collect();
        assert_eq!(rebuilt, stripped);
    }

    #[test]
    fn test_invalid_character() {
        assert_eq!(tokenize("x = 1 $ 2;"), Err(CompileError::Lex { ch: '$', pos: 6 }));
    }

    #[test]
    fn test_lone_bang_is_rejected() {
        assert_eq!(tokenize("a ! b"), Err(CompileError::Lex { ch: '!', pos: 2 }));
    }

    #[test]
    fn test_number_overflow() {
        assert_eq!(kinds("9223372036854775807"), vec![TokenKind::Number(i64::MAX), TokenKind::Eof]);
        assert_eq!(
            tokenize("9223372036854775808"),
            Err(CompileError::Lex { ch: '8', pos: 18 })
        );
    }

    #[test]
    fn test_display() {
        let tokens = tokenize("x = 15;").unwrap();
        let shown: Vec<String> = tokens.iter().map(ToString::to_string).collect();
        assert_eq!(
            shown,
            vec![
                "Token(IDENTIFIER, 'x')",
                "Token(ASSIGN, '=')",
                "Token(NUMBER, 15)",
                "Token(SEMICOLON, ';')",
                "Token(EOF, None)",
            ]
        );
        let shown: Vec<String> =
            tokenize("while a <= b").unwrap().iter().map(ToString::to_string).collect();
        assert_eq!(
            shown,
            vec![
                "Token(WHILE, 'while')",
                "Token(IDENTIFIER, 'a')",
                "Token(REL_OP, '<=')",
                "Token(IDENTIFIER, 'b')",
                "Token(EOF, None)",
            ]
        );
    }

    #[test]
    fn test_unicode_identifiers() {
        assert_eq!(
            kinds("café = naïve2;"),
            vec![
                TokenKind::Ident("café".into()),
                TokenKind::Assign,
                TokenKind::Ident("naïve2".into()),
                TokenKind::Semicolon,
                TokenKind::Eof,
            ]
        );
        let tokens = tokenize("é = 1;").unwrap();
        assert_eq!(tokens[1].span, Span { start: 3, end: 4 });
    }
}
