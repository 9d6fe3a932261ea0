use lazy_static::lazy_static;

use crate::{
    error::{EvalError, EvalResult},
    statement::{PreparedStatement, Shape, Statement},
    token::{Fragment, Token},
};

lazy_static! {
    static ref EOF: Fragment = Fragment::eof();
}

/// Classifies a statement into one of the five shapes, splitting assignments at
/// their first `=`.
pub fn prepare(statement: &Statement) -> EvalResult<PreparedStatement> {
    let cleaned = statement.without_whitespace();
    if cleaned.is_empty() {
        return Err(EvalError::malformed("empty statement"));
    }

    let fragments = cleaned.fragments();
    if let Some(illegal) = fragments.iter().find(|fragment| fragment.is(Token::Illegal)) {
        return Err(EvalError::malformed(format!(
            "unexpected character {} in {}",
            illegal.text, statement
        )));
    }

    let (shape, left, right) = if cleaned.first().is(Token::Find) {
        (Shape::Lookup, cleaned.clone(), None)
    } else if cleaned.len() == 2 {
        (Shape::Inspect, cleaned.clone(), None)
    } else if let Some(position) = fragments.iter().position(|f| f.is(Token::Assign)) {
        let left = Statement::new(fragments[..position].to_vec());
        let right = Statement::new(fragments[position + 1..].to_vec());
        if left.is_empty() || right.is_empty() {
            return Err(EvalError::malformed(format!(
                "assignment needs both sides: {}",
                statement
            )));
        }
        (Shape::Assignment, left, Some(right))
    } else if fragments.iter().any(|fragment| fragment.is(Token::Lparen)) {
        (Shape::MethodCall, cleaned.clone(), None)
    } else {
        (Shape::PropertyCall, cleaned.clone(), None)
    };

    tracing::debug!(%shape, statement = %cleaned, "classified statement");

    Ok(PreparedStatement {
        statement: cleaned,
        left,
        right,
        shape,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Field(String),
    /// Raw index text; whether it is numeric is decided while crawling.
    Index(String),
}

/// A variable followed by field and index accesses, e.g. `u.Orders[1].ID`.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain {
    pub base: String,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub receiver: Chain,
    pub method: String,
    pub args: Vec<Fragment>,
}

pub struct Parser<'a> {
    fragments: &'a [Fragment],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Expects a statement without whitespace fragments.
    pub fn new(statement: &'a Statement) -> Self {
        Self {
            fragments: statement.fragments(),
            position: 0,
        }
    }

    fn cur_token(&self) -> &'a Fragment {
        self.fragments.get(self.position).unwrap_or(&*EOF)
    }

    fn next_token(&mut self) -> &mut Self {
        if self.position < self.fragments.len() {
            self.position += 1;
        }
        self
    }

    fn expect(&mut self, token: Token) -> EvalResult<&'a Fragment> {
        let fragment = self.cur_token();
        if !fragment.is(token) {
            return Err(EvalError::malformed(format!(
                "expected {}, found {}",
                token, fragment.token
            )));
        }
        self.next_token();
        Ok(fragment)
    }

    /// `find ( <tag> , <id> )`, returning the tag and the identifier.
    pub fn parse_find(&mut self) -> EvalResult<(String, String)> {
        self.expect(Token::Find)?;

        // LPAREN tag COMMA id RPAREN EOF, nothing more, nothing less
        if self.fragments.len() - self.position != 6 {
            return Err(EvalError::malformed(
                "invalid set of arguments for find, expected find(<type>, <id>)",
            ));
        }

        self.expect(Token::Lparen)?;
        let tag = self.expect(Token::Word)?;
        self.expect(Token::Comma)?;
        let id = self.cur_token();
        if !(id.is(Token::Word) || id.token.is_literal()) {
            return Err(EvalError::malformed(format!(
                "invalid identifier for find: {}",
                id.token
            )));
        }
        self.next_token();
        self.expect(Token::Rparen)?;
        self.expect(Token::Eof)?;

        Ok((tag.text.clone(), id.text.clone()))
    }

    /// Reads a chain, stopping before `(` or at end of input.
    pub fn parse_chain(&mut self) -> EvalResult<Chain> {
        let base = self.expect(Token::Word)?.text.clone();
        let mut steps = Vec::new();

        loop {
            let fragment = self.cur_token();
            match fragment.token {
                Token::Field => {
                    steps.push(Step::Field(fragment.field_name().to_string()));
                    self.next_token();
                }
                Token::Lbracket => {
                    let index = self.next_token().cur_token();
                    if matches!(index.token, Token::Rbracket | Token::Eof) {
                        return Err(EvalError::malformed("missing index between [ and ]"));
                    }
                    steps.push(Step::Index(index.text.clone()));
                    self.next_token().expect(Token::Rbracket)?;
                }
                Token::Lparen | Token::Eof => break,
                token => {
                    return Err(EvalError::malformed(format!(
                        "unexpected {} after {}",
                        token, base
                    )))
                }
            }
        }

        Ok(Chain { base, steps })
    }

    /// `chain . method ( [literal (, literal)*] )`
    pub fn parse_method_call(&mut self) -> EvalResult<MethodCall> {
        let mut receiver = self.parse_chain()?;
        let method = match receiver.steps.pop() {
            Some(Step::Field(method)) => method,
            Some(Step::Index(_)) => {
                return Err(EvalError::malformed("cannot call an indexed value"));
            }
            None => {
                return Err(EvalError::malformed(format!(
                    "{} is not a method call, expected {}.<method>(...)",
                    receiver.base, receiver.base
                )))
            }
        };

        self.expect(Token::Lparen)?;
        let args = self.parse_arguments()?;
        self.expect(Token::Eof)?;

        Ok(MethodCall {
            receiver,
            method,
            args,
        })
    }

    fn parse_arguments(&mut self) -> EvalResult<Vec<Fragment>> {
        let mut args = Vec::new();
        if self.cur_token().is(Token::Rparen) {
            self.next_token();
            return Ok(args);
        }

        loop {
            let arg = self.cur_token();
            if !arg.token.is_literal() {
                return Err(EvalError::malformed(format!(
                    "expected a literal argument, found {}",
                    arg.token
                )));
            }
            args.push(arg.clone());

            match self.next_token().cur_token().token {
                Token::Comma => {
                    self.next_token();
                }
                Token::Rparen => {
                    self.next_token();
                    return Ok(args);
                }
                token => {
                    return Err(EvalError::malformed(format!(
                        "expected , or ) after argument, found {}",
                        token
                    )))
                }
            }
        }
    }
}
