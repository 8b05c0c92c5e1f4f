extern crate wasm_bindgen;

use wasm_bindgen::prelude::*;

pub mod grammar;
pub use grammar::{
    analysis::{Analysis, AnalysisConfig, Classification, ParserKind, TableParser},
    parse::load_grammars,
    trace::{ParseOutcome, RejectReason},
    Grammar, GrammarError,
};

fn error_to_json(e: impl std::fmt::Display) -> String {
    serde_json::json!({ "error": e.to_string() }).to_string()
}

fn with_analysis<F>(grammar: &str, f: F) -> String
where
    F: FnOnce(&Analysis) -> String,
{
    let g = match Grammar::parse(grammar) {
        Ok(g) => g,
        Err(e) => return error_to_json(e),
    };
    match Analysis::new(&g, AnalysisConfig::default()) {
        Ok(analysis) => f(&analysis),
        Err(e) => error_to_json(e),
    }
}

#[wasm_bindgen]
pub fn first_follow_to_json(grammar: &str) -> String {
    with_analysis(grammar, |a| {
        a.grammar
            .to_non_terminal_output_vec(&a.first, &a.follow)
            .to_json()
            .unwrap_or_else(error_to_json)
    })
}

#[wasm_bindgen]
pub fn ll1_table_to_json(grammar: &str) -> String {
    with_analysis(grammar, |a| {
        let t = a.grammar.to_ll1_parsing_table(&a.ll1_table);
        serde_json::to_string(&t).unwrap_or_else(error_to_json)
    })
}

#[wasm_bindgen]
pub fn slr1_table_to_json(grammar: &str) -> String {
    with_analysis(grammar, |a| {
        let t = a.slr1_table.to_output(a.grammar);
        serde_json::to_string(&t).unwrap_or_else(error_to_json)
    })
}

/// `mode` is `ll1` or `slr1`.
#[wasm_bindgen]
pub fn parse_to_json(grammar: &str, mode: &str, input: &str) -> String {
    let kind: ParserKind = match mode.parse() {
        Ok(kind) => kind,
        Err(e) => return error_to_json(e),
    };
    with_analysis(grammar, |a| {
        let t = a.grammar.to_trace_output(&a.parse_str(kind, input));
        serde_json::to_string(&t).unwrap_or_else(error_to_json)
    })
}
