//! The user-regex engine.
//!
//! Search queries accept a restricted regular-expression dialect:
//!
//! ```text
//! expr   := term ('|' term)*
//! term   := factor*
//! factor := base '*'?
//! base   := '(' expr ')' | CHAR
//! CHAR   := [A-Za-z0-9.]      ; '.' matches any character
//! ```
//!
//! Compilation runs the classic pipeline: validate the pattern's alphabet,
//! parse by recursive descent, build a Thompson NFA, then determinize it by
//! subset construction. The resulting [`Dfa`] is simulated against each index
//! term looking for a match of *any* contiguous substring, so `al.*e` finds
//! the term `alice` without anchors.
//!
//! ```text
//! pattern ──parse──▶ Ast ──thompson──▶ Nfa ──subset──▶ Dfa ──▶ matches_partial
//! ```
//!
//! A pattern outside the dialect is a [`RegexError`]; the query pipeline
//! treats that as "no results" rather than a user-facing failure.

mod dfa;
mod nfa;
mod parse;

pub use dfa::Dfa;
pub use parse::RegexError;

use nfa::Nfa;

/// Compile a user regex into a DFA ready for partial matching.
pub fn compile(pattern: &str) -> Result<Dfa, RegexError> {
    let ast = parse::parse(pattern)?;
    let nfa = Nfa::from_ast(&ast);
    Ok(Dfa::from_nfa(&nfa))
}
