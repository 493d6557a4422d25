//! Evaluator configuration.

/// Evaluator configuration.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Maximum nesting of expression evaluations before giving up with
    /// `RecursionLimit` instead of overflowing the stack.
    pub max_depth: usize,
    /// Maximum number of elements an `array [first..last]` may have.
    pub max_array_len: usize,
    /// Expression path of the top-level expression.
    pub root_path: String,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            max_depth: 1024,
            max_array_len: 1 << 20,
            root_path: "$".to_string(),
        }
    }
}

impl EvalConfig {
    /// Create a new configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum evaluation depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the largest array a comprehension may build.
    pub fn max_array_len(mut self, len: usize) -> Self {
        self.max_array_len = len;
        self
    }

    /// Set the expression path given to the top-level expression.
    pub fn root_path(mut self, path: impl Into<String>) -> Self {
        self.root_path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EvalConfig::default();
        assert_eq!(config.max_depth, 1024);
        assert_eq!(config.max_array_len, 1 << 20);
        assert_eq!(config.root_path, "$");
    }

    #[test]
    fn test_builder() {
        let config = EvalConfig::new().max_depth(16).max_array_len(8).root_path("top");
        assert_eq!(config.max_depth, 16);
        assert_eq!(config.max_array_len, 8);
        assert_eq!(config.root_path, "top");
    }
}
