use crate::{
    statement::Statement,
    token::{Fragment, Token},
};

/// Turns raw input into fragments, one at a time. Looks at most one rune ahead.
pub struct Scanner {
    chars: Vec<char>,
    position: usize,
}

impl Scanner {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
        }
    }

    pub fn scan(&mut self) -> Fragment {
        let char = match self.read() {
            Some(char) => char,
            None => return Fragment::eof(),
        };

        match char {
            _ if is_whitespace(char) => {
                self.unread();
                Fragment::new(Token::Whitespace, self.read_while(is_whitespace))
            }
            _ if is_word_start(char) => {
                self.unread();
                self.scan_word()
            }
            '"' | '`' => self.scan_quoted(Token::String, char),
            '\'' => self.scan_quoted(Token::Char, char),
            _ if char.is_ascii_digit() => {
                self.unread();
                self.scan_number()
            }
            '.' => self.scan_field(),
            '=' => Fragment::new(Token::Assign, "="),
            ',' => Fragment::new(Token::Comma, ","),
            '(' => Fragment::new(Token::Lparen, "("),
            ')' => Fragment::new(Token::Rparen, ")"),
            '[' => Fragment::new(Token::Lbracket, "["),
            ']' => Fragment::new(Token::Rbracket, "]"),
            _ => Fragment::new(Token::Illegal, char.to_string()),
        }
    }

    fn read(&mut self) -> Option<char> {
        let char = self.chars.get(self.position).copied();
        if char.is_some() {
            self.position += 1;
        }
        char
    }

    fn unread(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    fn read_while(&mut self, mut condition: impl FnMut(char) -> bool) -> String {
        let mut literal = String::new();
        while let Some(char) = self.read() {
            if !condition(char) {
                self.unread();
                break;
            }
            literal.push(char);
        }
        literal
    }

    fn scan_word(&mut self) -> Fragment {
        let literal = self.read_while(is_word_char);
        match literal.as_str() {
            "find" => Fragment::new(Token::Find, literal),
            "true" | "false" => Fragment::new(Token::Bool, literal),
            _ => Fragment::new(Token::Word, literal),
        }
    }

    // The opening delimiter is already consumed; the closing one is dropped.
    fn scan_quoted(&mut self, token: Token, delimiter: char) -> Fragment {
        let mut literal = String::new();
        while let Some(char) = self.read() {
            if char == delimiter {
                break;
            }
            literal.push(char);
        }
        Fragment::new(token, literal)
    }

    fn scan_number(&mut self) -> Fragment {
        let mut seen_period = false;
        let literal = self.read_while(|char| {
            if char == '.' && !seen_period {
                seen_period = true;
                return true;
            }
            char.is_ascii_digit()
        });

        if seen_period {
            Fragment::new(Token::Float, literal)
        } else {
            Fragment::new(Token::Int, literal)
        }
    }

    fn scan_field(&mut self) -> Fragment {
        if self.peek().map_or(true, is_field_terminator) {
            return Fragment::new(Token::Period, ".");
        }
        let name = self.read_while(|char| !is_field_terminator(char));
        Fragment::new(Token::Field, format!(".{}", name))
    }
}

/// A scanner with room to push back exactly one fragment.
pub struct Lexer {
    scanner: Scanner,
    last: Option<Fragment>,
    buffered: bool,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            scanner: Scanner::new(input),
            last: None,
            buffered: false,
        }
    }

    pub fn scan(&mut self) -> Fragment {
        if self.buffered {
            self.buffered = false;
            if let Some(fragment) = &self.last {
                return fragment.clone();
            }
        }
        let fragment = self.scanner.scan();
        self.last = Some(fragment.clone());
        fragment
    }

    /// Pushes the most recently scanned fragment back; the next `scan` returns it again.
    pub fn unscan(&mut self) {
        self.buffered = self.last.is_some();
    }

    pub fn scan_ignore_whitespace(&mut self) -> Fragment {
        let fragment = self.scan();
        if fragment.is(Token::Whitespace) {
            return self.scan();
        }
        fragment
    }

    /// Scans until end of input. The returned statement always ends with exactly one EOF.
    pub fn statement(mut self) -> Statement {
        let mut fragments = Vec::new();
        loop {
            let fragment = self.scan();
            let done = fragment.is(Token::Eof);
            fragments.push(fragment);
            if done {
                break;
            }
        }
        Statement::new(fragments)
    }
}

fn is_whitespace(char: char) -> bool {
    char.is_whitespace()
}

// `*` lets pointer type hints such as `*int` scan as a single word.
fn is_word_start(char: char) -> bool {
    char.is_alphabetic() || char == '_' || char == '*'
}

fn is_word_char(char: char) -> bool {
    is_word_start(char) || char.is_alphanumeric()
}

fn is_field_terminator(char: char) -> bool {
    matches!(char, '.' | '(' | ')' | '[' | ']' | ',' | '=') || is_whitespace(char)
}
