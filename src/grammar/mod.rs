pub mod analysis;
pub mod error;
pub mod first_follow;
pub mod grammar;
pub mod ll1_table;
pub mod lr0;
pub mod parse;
pub mod predictive;
pub mod pretty_print;
pub mod shift_reduce;
pub mod slr1_table;
pub mod trace;

pub use error::{GrammarError, Result, TokenizeError};
pub use grammar::{Grammar, END_MARK_INDEX, EPSILON_INDEX};

pub const EPSILON: &str = "ε";
pub const END_MARK: &str = "$";
/// Other spellings of the empty alternative accepted in grammar text.
pub const EPSILON_ALIASES: [&str; 2] = ["ϵ", "/eps"];
