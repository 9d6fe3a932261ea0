use std::fmt;

use crate::{
    lexer::Lexer,
    token::{Fragment, Token},
};

/// The ordered fragments of one input line, always terminated by a single EOF.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    fragments: Vec<Fragment>,
}

impl Statement {
    pub fn new(mut fragments: Vec<Fragment>) -> Self {
        if let Some(end) = fragments.iter().position(|fragment| fragment.is(Token::Eof)) {
            fragments.truncate(end);
        }
        fragments.push(Fragment::eof());
        Self { fragments }
    }

    pub fn parse(input: &str) -> Self {
        Lexer::new(input).statement()
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    /// True when nothing but the terminating EOF is left.
    pub fn is_empty(&self) -> bool {
        self.fragments.len() <= 1
    }

    pub fn first(&self) -> &Fragment {
        &self.fragments[0]
    }

    pub fn without_whitespace(&self) -> Self {
        Self {
            fragments: self
                .fragments
                .iter()
                .filter(|fragment| !fragment.is(Token::Whitespace))
                .cloned()
                .collect(),
        }
    }

    /// Concatenated literal text of every fragment.
    pub fn source(&self) -> String {
        self.fragments
            .iter()
            .map(|fragment| fragment.text.as_str())
            .collect()
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for fragment in &self.fragments {
            write!(f, "{}", fragment)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Lookup,
    Inspect,
    Assignment,
    MethodCall,
    PropertyCall,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Shape::Lookup => write!(f, "lookup"),
            Shape::Inspect => write!(f, "inspect"),
            Shape::Assignment => write!(f, "assignment"),
            Shape::MethodCall => write!(f, "method call"),
            Shape::PropertyCall => write!(f, "property call"),
        }
    }
}

/// A classified statement. `right` is only present for assignments; both sides
/// end with their own EOF so they can be prepared again on their own.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedStatement {
    pub statement: Statement,
    pub left: Statement,
    pub right: Option<Statement>,
    pub shape: Shape,
}
