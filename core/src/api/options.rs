//! Configuration options for the interpreter.

/// Configuration options for script execution.
///
/// These options control resource limits and how forgiving the language is
/// during evaluation.
///
/// # Example
///
/// ```
/// use jolt_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions {
///     max_depth: 64,
///     strict_java: true,
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Maximum nesting of method and lambda calls (for recursion protection).
    ///
    /// Default: 200
    pub max_depth: usize,

    /// Disable the script conveniences: loose overload matching, truthiness
    /// of non-boolean conditions and implicit declaration on assignment.
    ///
    /// Default: false
    pub strict_java: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_depth: 200,
            strict_java: false,
        }
    }
}

/// Configuration options for an [`Interpreter`](super::Interpreter).
///
/// # Example
///
/// ```
/// use jolt_core::api::{ExecutionOptions, InterpreterOptions};
///
/// let options = InterpreterOptions {
///     execution: ExecutionOptions {
///         max_depth: 500,
///         ..ExecutionOptions::default()
///     },
/// };
/// ```
#[derive(Debug, Clone, Default)]
pub struct InterpreterOptions {
    /// Options applied to every evaluation.
    pub execution: ExecutionOptions,
}
