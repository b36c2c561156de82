use std::fmt;

/// Errors produced when parsing DSL input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    message: String,
    line: usize,
    column: usize,
}

impl ParseError {
    /// Build an error for byte `offset` of `input`.
    pub(crate) fn at(input: &str, offset: usize, message: impl Into<String>) -> Self {
        let consumed = input.get(..offset).unwrap_or(input);
        let line = consumed.matches('\n').count() + 1;
        let column = consumed
            .rsplit('\n')
            .next()
            .map_or(0, |tail| tail.chars().count())
            + 1;
        Self {
            message: message.into(),
            line,
            column,
        }
    }

    /// 1-based line of the failure.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// 1-based column of the failure, in characters.
    #[must_use]
    pub fn column(&self) -> usize {
        self.column
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "parse error at line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}
