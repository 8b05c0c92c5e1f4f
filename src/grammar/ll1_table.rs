use std::collections::BTreeMap;

use log::debug;

use super::{
    first_follow::{FirstSets, FollowSets},
    grammar::EPSILON_INDEX,
    Grammar,
};

/// Two productions of `non_terminal` competing for the column `terminal`.
/// Productions are indices into the non-terminal's alternatives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LL1Conflict {
    pub non_terminal: usize,
    pub terminal: usize,
    pub kept: usize,
    pub rejected: usize,
}

/// Predictive parsing table plus the conflicts met while filling it.
///
/// A cell holds at most one production. When two productions claim the same
/// cell the first one stays and the clash is appended to the conflict log, so
/// the table is always complete enough to inspect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LL1Table {
    cells: BTreeMap<(usize, usize), usize>,
    conflicts: Vec<LL1Conflict>,
}

impl LL1Table {
    /// Alternative index chosen for `non_terminal` on `lookahead`.
    pub fn get(&self, non_terminal: usize, lookahead: usize) -> Option<usize> {
        self.cells.get(&(non_terminal, lookahead)).copied()
    }

    pub fn production<'g>(
        &self,
        g: &'g Grammar,
        non_terminal: usize,
        lookahead: usize,
    ) -> Option<&'g [usize]> {
        self.get(non_terminal, lookahead)
            .map(|alt| g.productions(non_terminal)[alt].as_slice())
    }

    pub fn conflicts(&self) -> &[LL1Conflict] {
        &self.conflicts
    }

    pub fn is_conflict_free(&self) -> bool {
        self.conflicts.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = ((usize, usize), usize)> + '_ {
        self.cells.iter().map(|(k, v)| (*k, *v))
    }

    fn assign(&mut self, non_terminal: usize, terminal: usize, production: usize) {
        match self.cells.get(&(non_terminal, terminal)) {
            None => {
                self.cells.insert((non_terminal, terminal), production);
            }
            Some(&kept) if kept != production => {
                debug!(
                    "LL(1) conflict at ({}, {}): {} vs {}",
                    non_terminal, terminal, kept, production
                );
                self.conflicts.push(LL1Conflict {
                    non_terminal,
                    terminal,
                    kept,
                    rejected: production,
                });
            }
            Some(_) => {}
        }
    }
}

impl Grammar {
    pub fn build_ll1_table(&self, first: &FirstSets, follow: &FollowSets) -> LL1Table {
        let mut table = LL1Table {
            cells: BTreeMap::new(),
            conflicts: Vec::new(),
        };

        for nt in self.non_terminal_iter() {
            for (alt, production) in nt.productions.iter().enumerate() {
                let f = first.first_of(production);
                for &t in f.iter().filter(|&&t| t != EPSILON_INDEX) {
                    table.assign(nt.index, t, alt);
                }
                if f.contains(&EPSILON_INDEX) {
                    for &t in follow.get(nt.index) {
                        table.assign(nt.index, t, alt);
                    }
                }
            }
        }

        table
    }

    /// First non-terminal having an alternative that starts with itself.
    pub fn direct_left_recursion(&self) -> Option<usize> {
        self.non_terminal_iter()
            .find(|nt| {
                nt.productions
                    .iter()
                    .any(|p| p.first() == Some(&nt.index))
            })
            .map(|nt| nt.index)
    }

    /// Alternatives of each non-terminal have pairwise disjoint FIRST sets and
    /// none of them is directly left-recursive. Indirect left recursion and
    /// FIRST/FOLLOW clashes are not examined here; the conflict log of
    /// [`Grammar::build_ll1_table`] covers the latter.
    pub fn is_ll1(&self) -> bool {
        if let Some(nt) = self.direct_left_recursion() {
            debug!("{} is directly left-recursive", self.get_symbol_name(nt));
            return false;
        }

        let first = self.compute_first_sets();
        self.non_terminal_iter().all(|nt| {
            let firsts: Vec<_> = nt.productions.iter().map(|p| first.first_of(p)).collect();
            firsts.iter().enumerate().all(|(i, a)| {
                firsts[i + 1..].iter().all(|b| a.is_disjoint(b))
            })
        })
    }
}
