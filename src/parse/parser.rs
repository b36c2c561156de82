use crate::RuleDefinition;

/// The result of parsing a DSL input string.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRulebook {
    /// Rule definitions in source order.
    pub rules: Vec<RuleDefinition>,
}

impl ParsedRulebook {
    /// Look up a definition by rule name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RuleDefinition> {
        self.rules.iter().find(|r| r.name == name)
    }
}
