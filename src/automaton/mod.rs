//! Automata: arena-backed epsilon-NFA construction, determinization into a
//! packed-table DFA, and the overlapping-match line scanner.

mod arena;
mod dfa;
mod nfa;
mod small_table;
mod sparse_set;

pub(crate) use dfa::{determinize, Dfa};
pub(crate) use nfa::{Fragment, Nfa, NfaBuilder};
