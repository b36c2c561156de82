mod error;
mod grammar;
mod parser;

pub use error::ParseError;
pub use parser::ParsedRulebook;

/// Parse a DSL input string into a [`ParsedRulebook`].
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid DSL syntax.
pub fn parse(input: &str) -> Result<ParsedRulebook, ParseError> {
    use winnow::Parser;
    grammar::parse_rulebook
        .parse(input)
        .map_err(|e| {
            let message = e.inner().to_string();
            let message = if message.is_empty() {
                "invalid syntax".to_owned()
            } else {
                message
            };
            ParseError::at(input, e.offset(), message)
        })
}
