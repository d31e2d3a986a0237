//! Tokenization of agent source text.
//!
//! The lexer strips whitespace and comments (`// …` and `/* … */`), tracks
//! line/column positions, and resolves the grammar's handful of lexical
//! subtleties: functors may carry a leading `~` or `.` and embedded dots
//! (`.print`, `foo.bar`) while a trailing dot stays a statement
//! terminator, `<-` is only an arrow when the two characters are adjacent,
//! and the keywords `not`, `div`, `mod`, `true`, `false` are reserved.

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

use crate::error::{Location, ParseError};

#[derive(Clone, Debug, PartialEq)]
pub enum Token {
    Functor(String),
    Variable(String),
    Number(f64),
    Bool(bool),
    Str(String),

    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Dot,
    Colon,

    /// `<-`
    Arrow,
    /// `:-`
    RuleArrow,

    Plus,
    Minus,
    /// `-+`
    MinusPlus,
    Star,
    /// `**`
    StarStar,
    Slash,
    Div,
    Mod,

    Not,
    Amp,
    Pipe,

    /// `=`
    Unify,
    /// `==`
    Eq,
    /// `\==`
    Neq,
    /// `=..`
    Deconstruct,
    Lt,
    Lte,
    Gt,
    Gte,

    Bang,
    /// `!!`
    BangBang,
    Question,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Functor(name) => write!(f, "functor '{name}'"),
            Token::Variable(name) => write!(f, "variable '{name}'"),
            Token::Number(value) => write!(f, "number {value}"),
            Token::Bool(value) => write!(f, "'{value}'"),
            Token::Str(value) => write!(f, "string {value:?}"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
            Token::LBracket => write!(f, "'['"),
            Token::RBracket => write!(f, "']'"),
            Token::Comma => write!(f, "','"),
            Token::Semicolon => write!(f, "';'"),
            Token::Dot => write!(f, "'.'"),
            Token::Colon => write!(f, "':'"),
            Token::Arrow => write!(f, "'<-'"),
            Token::RuleArrow => write!(f, "':-'"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::MinusPlus => write!(f, "'-+'"),
            Token::Star => write!(f, "'*'"),
            Token::StarStar => write!(f, "'**'"),
            Token::Slash => write!(f, "'/'"),
            Token::Div => write!(f, "'div'"),
            Token::Mod => write!(f, "'mod'"),
            Token::Not => write!(f, "'not'"),
            Token::Amp => write!(f, "'&'"),
            Token::Pipe => write!(f, "'|'"),
            Token::Unify => write!(f, "'='"),
            Token::Eq => write!(f, "'=='"),
            Token::Neq => write!(f, "'\\=='"),
            Token::Deconstruct => write!(f, "'=..'"),
            Token::Lt => write!(f, "'<'"),
            Token::Lte => write!(f, "'<='"),
            Token::Gt => write!(f, "'>'"),
            Token::Gte => write!(f, "'>='"),
            Token::Bang => write!(f, "'!'"),
            Token::BangBang => write!(f, "'!!'"),
            Token::Question => write!(f, "'?'"),
        }
    }
}

/// A token with the source position it started at.
#[derive(Clone, Debug, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub location: Location,
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    fn location(&self) -> Location {
        Location {
            line: self.line,
            column: self.column,
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.bump();
            true
        } else {
            false
        }
    }

    /// Skips whitespace and both comment styles.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    match lookahead.peek() {
                        Some('/') => {
                            while let Some(c) = self.peek() {
                                if c == '\n' {
                                    break;
                                }
                                self.bump();
                            }
                        }
                        Some('*') => {
                            self.bump();
                            self.bump();
                            loop {
                                match self.bump() {
                                    Some('*') if self.peek() == Some('/') => {
                                        self.bump();
                                        break;
                                    }
                                    Some(_) => {}
                                    None => return Ok(()),
                                }
                            }
                        }
                        _ => return Ok(()),
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn lex_number(&mut self) -> Token {
        let mut text = String::new();
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            text.push(self.bump().unwrap());
        }

        // A dot only belongs to the number when a digit follows; otherwise
        // it is the statement terminator.
        if self.peek() == Some('.') {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            if matches!(lookahead.peek(), Some(c) if c.is_ascii_digit()) {
                text.push(self.bump().unwrap());
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    text.push(self.bump().unwrap());
                }
            }
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            let mut exponent_ok = matches!(lookahead.peek(), Some(c) if c.is_ascii_digit());
            if matches!(lookahead.peek(), Some('+' | '-')) {
                lookahead.next();
                exponent_ok = matches!(lookahead.peek(), Some(c) if c.is_ascii_digit());
            }
            if exponent_ok {
                text.push(self.bump().unwrap());
                if matches!(self.peek(), Some('+' | '-')) {
                    text.push(self.bump().unwrap());
                }
                while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                    text.push(self.bump().unwrap());
                }
            }
        }

        Token::Number(text.parse().unwrap_or(f64::NAN))
    }

    fn lex_string(&mut self, start: Location) -> Result<Token, ParseError> {
        self.bump();
        let mut value = String::new();

        loop {
            match self.bump() {
                None => return Err(ParseError::UnterminatedString { location: start }),
                Some('"') => return Ok(Token::Str(value)),
                Some('\\') => {
                    let escape = self
                        .bump()
                        .ok_or(ParseError::UnterminatedString { location: start })?;
                    match escape {
                        'a' => value.push('\x07'),
                        'b' => value.push('\x08'),
                        'f' => value.push('\x0C'),
                        'n' => value.push('\n'),
                        'r' => value.push('\r'),
                        't' => value.push('\t'),
                        'v' => value.push('\x0B'),
                        '\\' => value.push('\\'),
                        '\'' => value.push('\''),
                        '"' => value.push('"'),
                        'x' => {
                            let mut code = 0u32;
                            let mut digits = 0;
                            while let Some(c) = self.peek() {
                                let Some(digit) = c.to_digit(16) else { break };
                                code = code * 16 + digit;
                                digits += 1;
                                self.bump();
                            }
                            if digits == 0 {
                                return Err(ParseError::InvalidEscape {
                                    escape: 'x',
                                    location: start,
                                });
                            }
                            value.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
                        }
                        other => {
                            return Err(ParseError::InvalidEscape {
                                escape: other,
                                location: start,
                            });
                        }
                    }
                }
                Some(c) => value.push(c),
            }
        }
    }

    /// Lexes a functor: optional `~`, optional leading `.`, a lowercase
    /// letter, then word characters with embedded dots. A dot is consumed
    /// only when a word character follows, leaving the statement
    /// terminator alone.
    fn lex_functor(&mut self) -> String {
        let mut name = String::new();

        if self.peek() == Some('~') {
            name.push(self.bump().unwrap());
        }
        if self.peek() == Some('.') {
            name.push(self.bump().unwrap());
        }

        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(self.bump().unwrap());
            } else if c == '.' {
                let mut lookahead = self.chars.clone();
                lookahead.next();
                match lookahead.peek() {
                    Some(next) if next.is_ascii_alphanumeric() || *next == '_' => {
                        name.push(self.bump().unwrap());
                    }
                    _ => break,
                }
            } else {
                break;
            }
        }

        name
    }

    fn lex_variable(&mut self, start: Location) -> Result<Token, ParseError> {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                name.push(self.bump().unwrap());
            } else {
                break;
            }
        }

        // `_` alone is the wildcard; otherwise leading underscores must be
        // followed by an uppercase letter.
        let valid = name == "_"
            || name
                .chars()
                .skip_while(|c| *c == '_')
                .next()
                .is_some_and(|c| c.is_ascii_uppercase());

        if valid {
            Ok(Token::Variable(name))
        } else {
            Err(ParseError::InvalidVariable {
                name,
                location: start,
            })
        }
    }

    fn next_token(&mut self) -> Result<Option<Spanned>, ParseError> {
        self.skip_trivia()?;
        let location = self.location();

        let Some(c) = self.peek() else {
            return Ok(None);
        };

        let token = match c {
            '0'..='9' => self.lex_number(),
            '"' => self.lex_string(location)?,
            '_' => self.lex_variable(location)?,
            c if c.is_ascii_uppercase() => self.lex_variable(location)?,
            c if c.is_ascii_lowercase() || c == '~' => {
                let name = self.lex_functor();
                match name.as_str() {
                    "not" => Token::Not,
                    "div" => Token::Div,
                    "mod" => Token::Mod,
                    "true" => Token::Bool(true),
                    "false" => Token::Bool(false),
                    _ => Token::Functor(name),
                }
            }
            '.' => {
                let mut lookahead = self.chars.clone();
                lookahead.next();
                match lookahead.peek() {
                    Some(next) if next.is_ascii_lowercase() => {
                        Token::Functor(self.lex_functor())
                    }
                    _ => {
                        self.bump();
                        Token::Dot
                    }
                }
            }
            '(' => {
                self.bump();
                Token::LParen
            }
            ')' => {
                self.bump();
                Token::RParen
            }
            '[' => {
                self.bump();
                Token::LBracket
            }
            ']' => {
                self.bump();
                Token::RBracket
            }
            ',' => {
                self.bump();
                Token::Comma
            }
            ';' => {
                self.bump();
                Token::Semicolon
            }
            ':' => {
                self.bump();
                if self.eat('-') {
                    Token::RuleArrow
                } else {
                    Token::Colon
                }
            }
            '+' => {
                self.bump();
                Token::Plus
            }
            '-' => {
                self.bump();
                if self.eat('+') {
                    Token::MinusPlus
                } else {
                    Token::Minus
                }
            }
            '*' => {
                self.bump();
                if self.eat('*') {
                    Token::StarStar
                } else {
                    Token::Star
                }
            }
            '/' => {
                self.bump();
                Token::Slash
            }
            '&' => {
                self.bump();
                Token::Amp
            }
            '|' => {
                self.bump();
                Token::Pipe
            }
            '=' => {
                self.bump();
                if self.eat('=') {
                    Token::Eq
                } else if self.peek() == Some('.') {
                    // `=..`
                    self.bump();
                    if self.eat('.') {
                        Token::Deconstruct
                    } else {
                        return Err(ParseError::UnexpectedCharacter {
                            found: '.',
                            location,
                        });
                    }
                } else {
                    Token::Unify
                }
            }
            '\\' => {
                self.bump();
                if self.eat('=') && self.eat('=') {
                    Token::Neq
                } else {
                    return Err(ParseError::UnexpectedCharacter {
                        found: '\\',
                        location,
                    });
                }
            }
            '<' => {
                self.bump();
                if self.eat('-') {
                    Token::Arrow
                } else if self.eat('=') {
                    Token::Lte
                } else {
                    Token::Lt
                }
            }
            '>' => {
                self.bump();
                if self.eat('=') {
                    Token::Gte
                } else {
                    Token::Gt
                }
            }
            '!' => {
                self.bump();
                if self.eat('!') {
                    Token::BangBang
                } else {
                    Token::Bang
                }
            }
            '?' => {
                self.bump();
                Token::Question
            }
            other => {
                return Err(ParseError::UnexpectedCharacter {
                    found: other,
                    location,
                });
            }
        };

        Ok(Some(Spanned { token, location }))
    }
}

/// Tokenizes a complete source text.
pub fn tokenize(source: &str) -> Result<Vec<Spanned>, ParseError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token()? {
        tokens.push(token);
    }
    Ok(tokens)
}
