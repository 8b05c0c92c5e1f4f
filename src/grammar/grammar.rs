use std::collections::{HashMap, HashSet};

use super::{
    error::{GrammarError, Result, TokenizeError},
    END_MARK, EPSILON, EPSILON_ALIASES,
};

/// Index of the epsilon marker in every grammar's symbol list.
pub const EPSILON_INDEX: usize = 0;
/// Index of the end-of-input marker in every grammar's symbol list.
pub const END_MARK_INDEX: usize = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonTerminal {
    pub index: usize,
    pub name: String,
    /// Alternatives in declaration order. An empty vector is the epsilon production.
    pub productions: Vec<Vec<usize>>,
}

impl NonTerminal {
    pub fn new(index: usize, name: String) -> Self {
        Self {
            index,
            name,
            productions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Epsilon,
    EndMark,
    NonTerminal(NonTerminal),
    Terminal(String),
}

impl Symbol {
    pub fn non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            _ => None,
        }
    }

    fn mut_non_terminal(&mut self) -> Option<&mut NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            _ => None,
        }
    }

    /// Terminals and the end marker can both label a column of a parsing table.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_) | Symbol::EndMark)
    }

    pub fn name(&self) -> &str {
        match self {
            Symbol::Epsilon => EPSILON,
            Symbol::EndMark => END_MARK,
            Symbol::NonTerminal(e) => e.name.as_str(),
            Symbol::Terminal(e) => e.as_str(),
        }
    }
}

/// A validated context-free grammar.
///
/// Symbols are addressed by their index in the symbol list. Index
/// [`EPSILON_INDEX`] is the epsilon marker and [`END_MARK_INDEX`] the end
/// marker; declared non-terminals follow, then declared terminals. A grammar
/// is never mutated once constructed: every analysis reads it by reference.
#[derive(Debug, Clone)]
pub struct Grammar {
    symbols: Vec<Symbol>,
    symbol_table: HashMap<String, usize>,
    start_symbol: usize,
}

impl Grammar {
    /// Builds a grammar from explicit symbol declarations.
    ///
    /// The first declared non-terminal is the start symbol. A right-hand side
    /// that is empty, or that only contains epsilon spellings, is the epsilon
    /// production.
    pub fn new<N, T, P, S, R>(non_terminals: N, terminals: T, productions: P) -> Result<Self>
    where
        N: IntoIterator<Item = S>,
        T: IntoIterator<Item = S>,
        P: IntoIterator<Item = (S, R)>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut g = Self {
            symbols: vec![Symbol::Epsilon, Symbol::EndMark],
            symbol_table: HashMap::new(),
            start_symbol: END_MARK_INDEX,
        };

        let mut non_terminal_names: Vec<String> = Vec::new();
        for name in non_terminals {
            let name = checked_name(name.as_ref())?;
            if !g.symbol_table.contains_key(&name) {
                let idx = g.symbols.len();
                g.symbols
                    .push(Symbol::NonTerminal(NonTerminal::new(idx, name.clone())));
                g.symbol_table.insert(name.clone(), idx);
                non_terminal_names.push(name);
            }
        }

        let non_terminal_set: HashSet<&str> =
            non_terminal_names.iter().map(|s| s.as_str()).collect();
        for name in terminals {
            let name = checked_name(name.as_ref())?;
            if non_terminal_set.contains(name.as_str()) {
                return Err(GrammarError::OverlappingSymbol(name));
            }
            if !g.symbol_table.contains_key(&name) {
                let idx = g.symbols.len();
                g.symbols.push(Symbol::Terminal(name.clone()));
                g.symbol_table.insert(name, idx);
            }
        }

        g.start_symbol = match non_terminal_names.first() {
            Some(name) => g.symbol_table[name],
            None => return Err(GrammarError::EmptyGrammar),
        };

        for (left, right) in productions {
            let left = left.as_ref();
            let left_idx = match g.get_symbol_index(left) {
                Some(idx) if g.is_non_terminal(idx) => idx,
                _ => {
                    return Err(GrammarError::UnknownSymbol {
                        symbol: left.to_string(),
                        left: left.to_string(),
                    })
                }
            };

            let mut symbols = Vec::new();
            for s in right {
                let s = s.as_ref();
                if is_epsilon(s) {
                    continue;
                }
                match g.get_symbol_index(s) {
                    Some(idx) if idx > END_MARK_INDEX => symbols.push(idx),
                    _ => {
                        return Err(GrammarError::UnknownSymbol {
                            symbol: s.to_string(),
                            left: left.to_string(),
                        })
                    }
                }
            }

            if let Some(nt) = g.symbols[left_idx].mut_non_terminal() {
                nt.productions.push(symbols);
            }
        }

        Ok(g)
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn start_symbol(&self) -> usize {
        self.start_symbol
    }

    /// Declared terminals, excluding the end marker.
    pub fn terminal_iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.symbols
            .iter()
            .enumerate()
            .filter_map(|(i, s)| matches!(s, Symbol::Terminal(_)).then_some(i))
    }

    /// Declared terminals followed by the end marker: the columns of a parsing table.
    pub fn lookahead_iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.terminal_iter().chain(std::iter::once(END_MARK_INDEX))
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &NonTerminal> {
        self.symbols.iter().filter_map(|s| s.non_terminal())
    }

    pub fn non_terminal(&self, index: usize) -> Option<&NonTerminal> {
        self.symbols.get(index).and_then(|s| s.non_terminal())
    }

    /// Alternatives of a non-terminal; empty for any other symbol.
    pub fn productions(&self, index: usize) -> &[Vec<usize>] {
        self.non_terminal(index)
            .map(|nt| nt.productions.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_terminal(&self, index: usize) -> bool {
        self.symbols.get(index).map_or(false, |s| s.is_terminal())
    }

    pub fn is_non_terminal(&self, index: usize) -> bool {
        self.non_terminal(index).is_some()
    }

    pub fn get_symbol_index(&self, name: &str) -> Option<usize> {
        if is_epsilon(name) {
            return Some(EPSILON_INDEX);
        }
        if name == END_MARK {
            return Some(END_MARK_INDEX);
        }
        self.symbol_table.get(name).cloned()
    }

    pub fn get_symbol_name(&self, index: usize) -> &str {
        self.symbols[index].name()
    }

    pub fn get_symbol_prime_name(&self, mut name: String) -> String {
        while self.symbol_table.contains_key(&name) {
            name.push('\'');
        }
        name
    }

    pub fn production_to_vec_str(&self, production: &[usize]) -> Vec<&str> {
        if production.is_empty() {
            vec![EPSILON]
        } else {
            production
                .iter()
                .map(|idx| self.get_symbol_name(*idx))
                .collect()
        }
    }

    pub fn production_to_string(&self, production: &[usize]) -> String {
        self.production_to_vec_str(production).join(" ")
    }

    /// Splits an input string into terminals, always taking the longest
    /// terminal name that matches. Whitespace separates tokens and is skipped.
    pub fn tokenize(&self, input: &str) -> std::result::Result<Vec<usize>, TokenizeError> {
        let mut terminals: Vec<(&str, usize)> = self
            .terminal_iter()
            .map(|idx| (self.get_symbol_name(idx), idx))
            .collect();
        terminals.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then(a.0.cmp(b.0)));

        let mut tokens = Vec::new();
        let mut position = 0;
        while position < input.len() {
            let rest = &input[position..];
            let trimmed = rest.trim_start();
            if trimmed.len() != rest.len() {
                position += rest.len() - trimmed.len();
                continue;
            }

            match terminals.iter().find(|(name, _)| rest.starts_with(name)) {
                Some((name, idx)) => {
                    tokens.push(*idx);
                    position += name.len();
                }
                None => {
                    return Err(TokenizeError {
                        position,
                        rest: rest.to_string(),
                    })
                }
            }
        }
        Ok(tokens)
    }
}

pub(crate) fn is_epsilon(name: &str) -> bool {
    name == EPSILON || EPSILON_ALIASES.contains(&name)
}

fn checked_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() || is_epsilon(name) || name == END_MARK {
        return Err(GrammarError::ReservedSymbol(name.to_string()));
    }
    Ok(name.to_string())
}
