//! Terminal capability detection

use console::Term;

/// Whether stdout is an interactive terminal
///
/// MSYS and Cygwin pseudo-terminals on Windows count as terminals.
pub fn is_tty() -> bool {
    Term::stdout().is_term()
}

/// Whether prompts and animations are appropriate
pub fn is_interactive(non_interactive: bool) -> bool {
    !non_interactive && is_tty()
}
