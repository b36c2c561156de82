use std::fmt;

use super::expr::Test;
use super::Tag;

/// Leading clause keywords that change how the clause matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    /// Match when no object satisfies the clause.
    Not,
    /// Accept instances of subtypes, not only the exact target type.
    IsA,
    /// Collect every matching object instead of matching them one by one.
    Collect,
    /// Existence quantifier. Recognized, but not supported by the compiler.
    Exists,
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Modifier::Not => "not",
            Modifier::IsA => "is_a",
            Modifier::Collect => "collect",
            Modifier::Exists => "exists",
        };
        f.write_str(s)
    }
}

/// One element of a clause's token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Modifier(Modifier),
    Target(String),
    Tag(Tag),
    Where(Vec<Test>),
}

impl Token {
    /// What the token is, for syntax errors.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Token::Modifier(m) => format!("modifier '{m}'"),
            Token::Target(t) => format!("target type '{t}'"),
            Token::Tag(t) => format!("tag '{t}'"),
            Token::Where(_) => "where-block".to_owned(),
        }
    }
}

/// An ordered token list describing one pattern test.
///
/// The expected shape is `[modifier*, target?, tag?, where-block?]`. The
/// builder methods append tokens in call order without checking that shape;
/// the clause compiler rejects anything else with
/// [`CompileError::InvalidClauseSyntax`](crate::CompileError::InvalidClauseSyntax).
///
/// # Example
///
/// ```
/// use clausal::{Clause, property};
///
/// let c = Clause::new()
///     .is_a()
///     .target("Account")
///     .tag("acct")
///     .test(property("balance").gt(100_i64));
/// assert_eq!(c.to_string(), "is_a Account :acct where { balance > 100 }");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Clause {
    tokens: Vec<Token>,
}

impl Clause {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn modifier(mut self, modifier: Modifier) -> Self {
        self.tokens.push(Token::Modifier(modifier));
        self
    }

    #[must_use]
    pub fn not(self) -> Self {
        self.modifier(Modifier::Not)
    }

    #[must_use]
    pub fn is_a(self) -> Self {
        self.modifier(Modifier::IsA)
    }

    #[must_use]
    pub fn collect(self) -> Self {
        self.modifier(Modifier::Collect)
    }

    #[must_use]
    pub fn exists(self) -> Self {
        self.modifier(Modifier::Exists)
    }

    #[must_use]
    pub fn target(mut self, type_name: &str) -> Self {
        self.tokens.push(Token::Target(type_name.to_owned()));
        self
    }

    #[must_use]
    pub fn tag(mut self, tag: impl Into<Tag>) -> Self {
        self.tokens.push(Token::Tag(tag.into()));
        self
    }

    /// Append a test to the trailing where-block, opening one if the clause
    /// does not end with a where-block yet.
    #[must_use]
    pub fn test(mut self, test: impl Into<Test>) -> Self {
        match self.tokens.last_mut() {
            Some(Token::Where(tests)) => tests.push(test.into()),
            _ => self.tokens.push(Token::Where(vec![test.into()])),
        }
        self
    }

    /// Append a complete where-block token.
    #[must_use]
    pub fn tests(mut self, tests: impl IntoIterator<Item = Test>) -> Self {
        self.tokens.push(Token::Where(tests.into_iter().collect()));
        self
    }
}

/// Shorthand for a clause matching objects of exactly `type_name`.
#[must_use]
pub fn clause(type_name: &str) -> Clause {
    Clause::new().target(type_name)
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Modifier(m) => write!(f, "{m}"),
            Token::Target(t) => write!(f, "{t}"),
            Token::Tag(t) => write!(f, "{t}"),
            Token::Where(tests) => {
                let tests: Vec<String> = tests.iter().map(ToString::to_string).collect();
                write!(f, "where {{ {} }}", tests.join(", "))
            }
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tokens.is_empty() {
            return write!(f, "*");
        }
        let parts: Vec<String> = self.tokens.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" "))
    }
}
