use std::collections::HashSet;

use super::{
    error::{GrammarError, Result},
    grammar::is_epsilon,
    Grammar,
};

impl Grammar {
    /// Reads a grammar written as `A -> x y | z`, one left-hand side per line.
    ///
    /// A line starting with `|` continues the alternatives of the previous
    /// line. The first left-hand side is the start symbol; every symbol that
    /// never appears on a left-hand side is a terminal.
    pub fn parse(grammar: &str) -> Result<Self> {
        let mut raw_productions: Vec<(&str, &str)> = Vec::new();
        let mut non_terminals: Vec<&str> = Vec::new();

        let mut previous_left: Option<&str> = None;
        for (i, line) in grammar.lines().enumerate() {
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }
            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() > 2 {
                return Err(GrammarError::syntax(i + 1, "too many \"->\""));
            }
            let (left, rights): (&str, &str) = if parts.len() == 2 {
                let left_str = parts[0].trim();
                if left_str.is_empty() {
                    return Err(GrammarError::syntax(i + 1, "empty left side"));
                } else if left_str.split_whitespace().count() != 1 {
                    return Err(GrammarError::syntax(i + 1, "left side contains whitespace"));
                }
                (left_str, parts[1].trim())
            } else {
                match (previous_left, parts[0].trim().strip_prefix('|')) {
                    (Some(left), Some(rights)) => (left, rights.trim()),
                    _ => return Err(GrammarError::syntax(i + 1, "cannot find left side")),
                }
            };

            if !non_terminals.contains(&left) {
                non_terminals.push(left);
            }
            previous_left = Some(left);
            raw_productions.push((left, rights));
        }

        let declared: HashSet<&str> = non_terminals.iter().cloned().collect();
        let mut terminals: Vec<&str> = Vec::new();
        let mut productions: Vec<(&str, Vec<&str>)> = Vec::new();
        for (left, rights) in raw_productions {
            for right in rights.split('|') {
                let symbols: Vec<&str> = right.split_whitespace().collect();
                for s in &symbols {
                    if !declared.contains(s) && !is_epsilon(s) && !terminals.contains(s) {
                        terminals.push(*s);
                    }
                }
                productions.push((left, symbols));
            }
        }

        Grammar::new(non_terminals, terminals, productions)
    }
}

/// Reads a collection of grammars in the counted format: the number of
/// grammars, then for each grammar the number of its production lines
/// followed by lines `A -> alt1 alt2 ...`.
///
/// Alternatives are separated by spaces and `/eps` is the empty alternative.
/// Inside an alternative the longest non-terminal name wins; any other
/// character is a terminal of its own.
pub fn load_grammars(input: &str) -> Result<Vec<Grammar>> {
    let mut lines = input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let grammar_count = read_count(lines.next(), "number of grammars")?;
    let mut grammars = Vec::with_capacity(grammar_count);
    for _ in 0..grammar_count {
        let production_count = read_count(lines.next(), "number of productions")?;

        let mut rows: Vec<(&str, Vec<&str>)> = Vec::with_capacity(production_count);
        for _ in 0..production_count {
            let (line_no, line) = lines
                .next()
                .ok_or_else(|| GrammarError::syntax(0, "unexpected end of input"))?;
            let (left, right) = line
                .split_once("->")
                .ok_or_else(|| GrammarError::syntax(line_no, "missing \"->\""))?;
            let left = left.trim();
            if left.is_empty() {
                return Err(GrammarError::syntax(line_no, "empty left side"));
            }
            rows.push((left, right.split_whitespace().collect()));
        }
        grammars.push(grammar_from_rows(&rows)?);
    }

    Ok(grammars)
}

fn read_count(line: Option<(usize, &str)>, what: &str) -> Result<usize> {
    let (line_no, line) =
        line.ok_or_else(|| GrammarError::syntax(0, format!("missing {}", what)))?;
    line.parse().map_err(|_| {
        GrammarError::syntax(line_no, format!("expected {}, found \"{}\"", what, line))
    })
}

fn grammar_from_rows(rows: &[(&str, Vec<&str>)]) -> Result<Grammar> {
    let mut non_terminals: Vec<&str> = Vec::new();
    for (left, _) in rows {
        if !non_terminals.contains(left) {
            non_terminals.push(*left);
        }
    }
    let mut by_length = non_terminals.clone();
    by_length.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut terminals: Vec<&str> = Vec::new();
    let mut productions: Vec<(&str, Vec<&str>)> = Vec::new();
    for &(left, ref alternatives) in rows {
        for &alternative in alternatives {
            if is_epsilon(alternative) {
                productions.push((left, Vec::new()));
                continue;
            }
            let symbols = split_alternative(alternative, &by_length);
            for &s in &symbols {
                if !non_terminals.contains(&s) && !terminals.contains(&s) {
                    terminals.push(s);
                }
            }
            productions.push((left, symbols));
        }
    }

    Grammar::new(non_terminals, terminals, productions)
}

fn split_alternative<'a>(alternative: &'a str, non_terminals: &[&str]) -> Vec<&'a str> {
    let mut symbols = Vec::new();
    let mut rest = alternative;
    while let Some(c) = rest.chars().next() {
        let len = non_terminals
            .iter()
            .find(|nt| rest.starts_with(**nt))
            .map_or(c.len_utf8(), |nt| nt.len());
        symbols.push(&rest[..len]);
        rest = &rest[len..];
    }
    symbols
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::EPSILON_INDEX;

    #[test]
    fn simple_parse() {
        let g = Grammar::parse("S -> a").unwrap();

        let s = g.get_symbol_index("S").unwrap();
        let a = g.get_symbol_index("a").unwrap();

        assert_eq!(g.get_symbol_name(s), "S");
        assert_eq!(g.get_symbol_name(a), "a");
        assert_eq!(g.start_symbol(), s);
        assert_eq!(g.productions(s)[0], vec![a]);
    }

    #[test]
    fn parse_with_space_and_newline() {
        let g = Grammar::parse("  S -> a \n | b c").unwrap();

        let s = g.get_symbol_index("S").unwrap();
        let a = g.get_symbol_index("a").unwrap();
        let b = g.get_symbol_index("b").unwrap();
        let c = g.get_symbol_index("c").unwrap();

        assert_eq!(g.productions(s)[0], vec![a]);
        assert_eq!(g.productions(s)[1], vec![b, c]);
    }

    #[test]
    fn epsilon_spellings_are_empty_productions() {
        let g = Grammar::parse("S -> a S | ε | /eps").unwrap();
        let s = g.get_symbol_index("S").unwrap();

        assert!(g.productions(s)[1].is_empty());
        assert!(g.productions(s)[2].is_empty());
        assert_eq!(g.get_symbol_index("ε"), Some(EPSILON_INDEX));
        assert_eq!(g.terminal_iter().count(), 1);
    }

    #[test]
    fn empty_input_has_no_start_symbol() {
        assert_eq!(
            Grammar::parse("  \n  ").unwrap_err(),
            GrammarError::EmptyGrammar
        );
    }

    #[test]
    fn two_rightarrows_parse() {
        assert!(Grammar::parse("S -> a -> b").is_err());
    }

    #[test]
    fn no_left_parse() {
        assert!(Grammar::parse("-> a").is_err());
    }

    #[test]
    fn no_previous_left_parse() {
        assert_eq!(
            Grammar::parse("| a b\n S -> a").unwrap_err(),
            GrammarError::syntax(1, "cannot find left side")
        );
    }

    #[test]
    fn left_contain_space() {
        assert!(Grammar::parse("S a S -> x").is_err());
    }

    #[test]
    fn counted_format_loads_every_grammar() {
        let input = "2\n\
                     3\n\
                     S -> AB\n\
                     A -> aA d\n\
                     B -> bBc /eps\n\
                     1\n\
                     E -> E+i i\n";
        let grammars = load_grammars(input).unwrap();
        assert_eq!(grammars.len(), 2);

        let g = &grammars[0];
        let s = g.get_symbol_index("S").unwrap();
        let a_nt = g.get_symbol_index("A").unwrap();
        let b_nt = g.get_symbol_index("B").unwrap();
        let a = g.get_symbol_index("a").unwrap();
        let d = g.get_symbol_index("d").unwrap();
        assert_eq!(g.start_symbol(), s);
        assert_eq!(g.productions(s), &[vec![a_nt, b_nt]]);
        assert_eq!(g.productions(a_nt), &[vec![a, a_nt], vec![d]]);
        assert!(g.productions(b_nt)[1].is_empty());

        let e = &grammars[1];
        assert_eq!(e.productions(e.start_symbol()).len(), 2);
        assert_eq!(e.terminal_iter().count(), 2);
    }

    #[test]
    fn counted_format_matches_longest_non_terminal() {
        let g = &load_grammars("1\n3\nE -> TE'\nE' -> +TE' /eps\nT -> i\n").unwrap()[0];
        let e_prime = g.get_symbol_index("E'").unwrap();
        let t = g.get_symbol_index("T").unwrap();
        let plus = g.get_symbol_index("+").unwrap();
        assert_eq!(g.productions(e_prime)[0], vec![plus, t, e_prime]);
    }

    #[test]
    fn counted_format_reports_bad_counts() {
        assert_eq!(
            load_grammars("x").unwrap_err(),
            GrammarError::syntax(1, "expected number of grammars, found \"x\"")
        );
        assert!(load_grammars("1\n2\nS -> a\n").is_err());
    }
}
