//! Callable tools exposed to the agent

use std::fmt::Debug;

use async_trait::async_trait;

/// A named capability the agent may invoke with free-form text input
///
/// Tools never fail: errors are rendered into the returned text so the model
/// can read them as an observation.
#[async_trait]
pub trait Tool: Send + Sync + Debug {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    async fn call(&self, input: &str) -> String;
}

/// Strips whitespace and surrounding quotes that models like to add to inputs
pub fn clean_input(text: &str) -> &str {
    text.trim().trim_matches(|c| c == '\'' || c == '"')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_input_strips_quotes_and_whitespace() {
        assert_eq!(clean_input("  'Inception'  "), "Inception");
        assert_eq!(clean_input("\"Christopher Nolan\""), "Christopher Nolan");
        assert_eq!(clean_input("'\"nested\"'"), "nested");
    }

    #[test]
    fn test_clean_input_keeps_inner_quotes() {
        assert_eq!(clean_input("Schindler's List"), "Schindler's List");
    }

    #[test]
    fn test_clean_input_empty() {
        assert_eq!(clean_input("   "), "");
        assert_eq!(clean_input("''"), "");
    }
}
