use std::collections::BTreeSet;

use log::debug;

use super::{
    grammar::{Symbol, END_MARK_INDEX, EPSILON_INDEX},
    Grammar,
};

/// FIRST sets of every symbol, indexed like the grammar's symbol list.
///
/// Terminals map to themselves, non-terminals to the terminals that can begin
/// one of their derivations, plus [`EPSILON_INDEX`] when they are nullable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FirstSets {
    sets: Vec<BTreeSet<usize>>,
}

impl FirstSets {
    fn new(g: &Grammar) -> Self {
        let sets = g
            .symbols()
            .iter()
            .enumerate()
            .map(|(i, s)| match s {
                Symbol::NonTerminal(_) => BTreeSet::new(),
                _ => BTreeSet::from([i]),
            })
            .collect();
        Self { sets }
    }

    pub fn get(&self, symbol: usize) -> &BTreeSet<usize> {
        &self.sets[symbol]
    }

    pub fn is_nullable(&self, symbol: usize) -> bool {
        self.sets[symbol].contains(&EPSILON_INDEX)
    }

    /// FIRST of a symbol sequence. The empty sequence yields `{ε}`.
    pub fn first_of(&self, sequence: &[usize]) -> BTreeSet<usize> {
        let mut first = BTreeSet::new();
        for &symbol in sequence {
            let set = &self.sets[symbol];
            first.extend(set.iter().filter(|&&s| s != EPSILON_INDEX));
            if !set.contains(&EPSILON_INDEX) {
                return first;
            }
        }
        first.insert(EPSILON_INDEX);
        first
    }
}

/// FOLLOW sets of every non-terminal, indexed like the grammar's symbol list.
/// Entries of other symbols stay empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowSets {
    sets: Vec<BTreeSet<usize>>,
}

impl FollowSets {
    fn new(g: &Grammar) -> Self {
        let mut sets = vec![BTreeSet::new(); g.symbol_count()];
        sets[g.start_symbol()].insert(END_MARK_INDEX);
        Self { sets }
    }

    pub fn get(&self, symbol: usize) -> &BTreeSet<usize> {
        &self.sets[symbol]
    }
}

impl Grammar {
    pub fn compute_first_sets(&self) -> FirstSets {
        let mut first = FirstSets::new(self);
        let mut iterations = 1;
        while self.first_pass(&mut first) {
            iterations += 1;
        }
        debug!("FIRST sets stable after {} passes", iterations);
        first
    }

    /// One sweep over every production. Returns whether any set grew.
    fn first_pass(&self, first: &mut FirstSets) -> bool {
        let mut changed = false;
        for nt in self.non_terminal_iter() {
            for production in &nt.productions {
                let additions = first.first_of(production);
                for s in additions {
                    changed |= first.sets[nt.index].insert(s);
                }
            }
        }
        changed
    }

    pub fn compute_follow_sets(&self, first: &FirstSets) -> FollowSets {
        let mut follow = FollowSets::new(self);
        let mut iterations = 1;
        while self.follow_pass(first, &mut follow) {
            iterations += 1;
        }
        debug!("FOLLOW sets stable after {} passes", iterations);
        follow
    }

    fn follow_pass(&self, first: &FirstSets, follow: &mut FollowSets) -> bool {
        let mut changed = false;
        for left in self.non_terminal_iter() {
            for production in &left.productions {
                for (i, &symbol) in production.iter().enumerate() {
                    if !self.is_non_terminal(symbol) {
                        continue;
                    }

                    let rest = first.first_of(&production[i + 1..]);
                    for &s in rest.iter().filter(|&&s| s != EPSILON_INDEX) {
                        changed |= follow.sets[symbol].insert(s);
                    }
                    if rest.contains(&EPSILON_INDEX) && symbol != left.index {
                        let left_follow = follow.sets[left.index].clone();
                        for s in left_follow {
                            changed |= follow.sets[symbol].insert(s);
                        }
                    }
                }
            }
        }
        changed
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const G1: &str = "E -> T E'\n\
                                 E' -> + T E' | ε\n\
                                 T -> F T'\n\
                                 T' -> * F T' | ε\n\
                                 F -> ( E ) | id";

    pub(crate) const G2: &str = "E -> E + T | T\n\
                                 T -> T * F | F\n\
                                 F -> ( E ) | id";

    fn names(g: &Grammar, set: &BTreeSet<usize>) -> Vec<String> {
        let mut v: Vec<String> = set
            .iter()
            .map(|&i| g.get_symbol_name(i).to_string())
            .collect();
        v.sort();
        v
    }

    fn idx(g: &Grammar, name: &str) -> usize {
        g.get_symbol_index(name).unwrap()
    }

    #[test]
    fn first_follow_of_expression_grammar() {
        let g = Grammar::parse(G1).unwrap();
        let first = g.compute_first_sets();
        let follow = g.compute_follow_sets(&first);

        assert_eq!(names(&g, first.get(idx(&g, "F"))), ["(", "id"]);
        assert_eq!(first.get(idx(&g, "T")), first.get(idx(&g, "F")));
        assert_eq!(first.get(idx(&g, "E")), first.get(idx(&g, "F")));
        assert_eq!(names(&g, first.get(idx(&g, "E'"))), ["+", "ε"]);
        assert_eq!(names(&g, first.get(idx(&g, "T'"))), ["*", "ε"]);

        assert_eq!(names(&g, follow.get(idx(&g, "E"))), ["$", ")"]);
        assert_eq!(follow.get(idx(&g, "E'")), follow.get(idx(&g, "E")));
        assert_eq!(names(&g, follow.get(idx(&g, "T"))), ["$", ")", "+"]);
        assert_eq!(follow.get(idx(&g, "T'")), follow.get(idx(&g, "T")));
        assert_eq!(names(&g, follow.get(idx(&g, "F"))), ["$", ")", "*", "+"]);
    }

    #[test]
    fn first_follow_of_left_recursive_grammar() {
        let g = Grammar::parse(G2).unwrap();
        let first = g.compute_first_sets();
        let follow = g.compute_follow_sets(&first);

        for nt in ["E", "T", "F"] {
            assert_eq!(names(&g, first.get(idx(&g, nt))), ["(", "id"]);
        }
        assert_eq!(names(&g, follow.get(idx(&g, "E"))), ["$", ")", "+"]);
        assert_eq!(names(&g, follow.get(idx(&g, "T"))), ["$", ")", "*", "+"]);
        assert_eq!(names(&g, follow.get(idx(&g, "F"))), ["$", ")", "*", "+"]);
    }

    #[test]
    fn first_of_trivial_sequences() {
        let g = Grammar::parse(G1).unwrap();
        let first = g.compute_first_sets();
        let id = idx(&g, "id");

        assert_eq!(first.first_of(&[]), BTreeSet::from([EPSILON_INDEX]));
        assert_eq!(first.first_of(&[EPSILON_INDEX]), BTreeSet::from([EPSILON_INDEX]));
        assert_eq!(first.first_of(&[id]), BTreeSet::from([id]));
        assert_eq!(
            names(&g, &first.first_of(&[idx(&g, "E'"), idx(&g, "T'")])),
            ["*", "+", "ε"]
        );
        assert_eq!(
            names(&g, &first.first_of(&[idx(&g, "E'"), idx(&g, ")")])),
            [")", "+"]
        );
    }

    #[test]
    fn sets_grow_monotonically() {
        for text in [G1, G2, "S -> A x | C\nA -> B\nB -> b\nC -> B y"] {
            let g = Grammar::parse(text).unwrap();

            let mut first = FirstSets::new(&g);
            loop {
                let before = first.clone();
                let changed = g.first_pass(&mut first);
                for i in 0..g.symbol_count() {
                    assert!(before.get(i).is_subset(first.get(i)));
                }
                if !changed {
                    assert_eq!(before, first);
                    break;
                }
            }
            assert_eq!(first, g.compute_first_sets());

            let mut follow = FollowSets::new(&g);
            loop {
                let before = follow.clone();
                let changed = g.follow_pass(&first, &mut follow);
                for i in 0..g.symbol_count() {
                    assert!(before.get(i).is_subset(follow.get(i)));
                }
                if !changed {
                    assert_eq!(before, follow);
                    break;
                }
            }
            assert_eq!(follow, g.compute_follow_sets(&first));
        }
    }

    #[test]
    fn sets_do_not_depend_on_production_order() {
        let reordered = "E -> T E'\n\
                         F -> id | ( E )\n\
                         T' -> ε | * F T'\n\
                         E' -> ε | + T E'\n\
                         T -> F T'";
        let a = Grammar::parse(G1).unwrap();
        let b = Grammar::parse(reordered).unwrap();

        let (fa, fb) = (a.compute_first_sets(), b.compute_first_sets());
        let (wa, wb) = (a.compute_follow_sets(&fa), b.compute_follow_sets(&fb));
        for nt in a.non_terminal_iter() {
            let other = idx(&b, &nt.name);
            assert_eq!(names(&a, fa.get(nt.index)), names(&b, fb.get(other)));
            assert_eq!(names(&a, wa.get(nt.index)), names(&b, wb.get(other)));
        }
    }

    #[test]
    fn follow_needs_a_global_fixed_point() {
        // FOLLOW(A) depends on FOLLOW(B), which is only known after C is scanned.
        let g = Grammar::parse("S -> A x | C\nA -> B\nB -> b\nC -> B y").unwrap();
        let first = g.compute_first_sets();
        let follow = g.compute_follow_sets(&first);

        assert_eq!(names(&g, follow.get(idx(&g, "A"))), ["x"]);
        assert_eq!(names(&g, follow.get(idx(&g, "B"))), ["x", "y"]);
        assert_eq!(names(&g, follow.get(idx(&g, "C"))), ["$"]);
    }

    #[test]
    fn nullable_chain_reaches_end_marker() {
        let g = Grammar::parse("S -> A B\nA -> a | ε\nB -> b | ε").unwrap();
        let first = g.compute_first_sets();
        let follow = g.compute_follow_sets(&first);

        assert!(first.is_nullable(idx(&g, "S")));
        assert_eq!(names(&g, follow.get(idx(&g, "A"))), ["$", "b"]);
        assert_eq!(names(&g, follow.get(idx(&g, "B"))), ["$"]);
    }
}
