//! Error rendering using miette
//!
//! Evaluation errors carry a diagnostic code (`jolt::coercion`,
//! `jolt::resolution`, ...) and sometimes a help line. This module renders
//! them with miette's graphical handler.

use std::io::Write;

use jolt_core::evaluator::EvalError;
use miette::{GraphicalReportHandler, GraphicalTheme};

/// Render an error with formatting to stderr
///
/// # Example
/// ```no_run
/// use jolt::{Interpreter, InterpreterOptions, render_error};
/// use jolt::ast::build::*;
/// use jolt::types::Type;
///
/// let interpreter = Interpreter::new(InterpreterOptions::default(), |_| {});
/// let script = program(vec![decl(Type::int(), "x", Some(null()))]);
/// if let Err(e) = interpreter.eval(&script) {
///     render_error(&e);
/// }
/// ```
pub fn render_error(error: &EvalError) {
    render_error_to(error, &mut std::io::stderr()).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &EvalError, writer: &mut dyn Write) -> std::io::Result<()> {
    writer.write_all(render(error, GraphicalTheme::unicode()).as_bytes())
}

/// Render an error to a String (useful for logs, web UIs, etc.)
pub fn render_error_to_string(error: &EvalError) -> String {
    render(error, GraphicalTheme::unicode())
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &EvalError) -> String {
    render(error, GraphicalTheme::unicode_nocolor())
}

fn render(error: &EvalError, theme: GraphicalTheme) -> String {
    let mut out = String::new();
    let handler = GraphicalReportHandler::new_themed(theme);
    if handler.render_report(&mut out, error).is_err() {
        // Fall back to the plain message.
        out = format!("Error: {error}\n");
    }
    out
}
