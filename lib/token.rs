use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Token {
    Eof,
    Whitespace,
    Illegal,

    Assign,
    Period,
    Comma,

    Lparen,
    Rparen,
    Lbracket,
    Rbracket,

    Find,
    Word,
    Field,

    String,
    Int,
    Float,
    Char,
    Bool,
}

impl Token {
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Token::String | Token::Int | Token::Float | Token::Char | Token::Bool
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Token::Eof => write!(f, "end of input"),
            Token::Whitespace => write!(f, "whitespace"),
            Token::Illegal => write!(f, "illegal character"),

            Token::Assign => write!(f, "="),
            Token::Period => write!(f, "."),
            Token::Comma => write!(f, ","),

            Token::Lparen => write!(f, "("),
            Token::Rparen => write!(f, ")"),
            Token::Lbracket => write!(f, "["),
            Token::Rbracket => write!(f, "]"),

            Token::Find => write!(f, "find"),
            Token::Word => write!(f, "identifier"),
            Token::Field => write!(f, "field"),

            Token::String => write!(f, "string"),
            Token::Int => write!(f, "integer"),
            Token::Float => write!(f, "float"),
            Token::Char => write!(f, "character"),
            Token::Bool => write!(f, "boolean"),
        }
    }
}

/// A single lexical token: its kind plus the literal text it was scanned from.
///
/// Field fragments keep their leading period, so concatenating the text of a
/// statement's fragments gives back the input (quote delimiters aside).
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Fragment {
    pub token: Token,
    pub text: String,
}

impl Fragment {
    pub fn new(token: Token, text: impl Into<String>) -> Self {
        Self {
            token,
            text: text.into(),
        }
    }

    pub fn eof() -> Self {
        Self::new(Token::Eof, "")
    }

    pub fn is(&self, token: Token) -> bool {
        self.token == token
    }

    /// The name of a field fragment, without the period that introduced it.
    pub fn field_name(&self) -> &str {
        self.text.strip_prefix('.').unwrap_or(&self.text)
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.token {
            Token::String => write!(f, "\"{}\"", self.text),
            Token::Char => write!(f, "'{}'", self.text),
            _ => write!(f, "{}", self.text),
        }
    }
}
