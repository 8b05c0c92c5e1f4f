use std::collections::BTreeMap;

use log::debug;

use super::{
    error::Result,
    first_follow::FollowSets,
    grammar::END_MARK_INDEX,
    lr0::Automaton,
    Grammar,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce { left: usize, right: Vec<usize> },
    Accept,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    ShiftReduce,
    ReduceReduce,
    /// Any clash involving the accept action.
    Accept,
}

/// An attempted overwrite of an action table cell. `kept` is the action
/// that was there first and stays in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SLR1Conflict {
    pub state: usize,
    pub symbol: usize,
    pub kept: Action,
    pub rejected: Action,
}

impl SLR1Conflict {
    pub fn kind(&self) -> ConflictKind {
        match (&self.kept, &self.rejected) {
            (Action::Reduce { .. }, Action::Reduce { .. }) => ConflictKind::ReduceReduce,
            (Action::Accept, _) | (_, Action::Accept) => ConflictKind::Accept,
            _ => ConflictKind::ShiftReduce,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SLR1Table {
    state_count: usize,
    action: BTreeMap<(usize, usize), Action>,
    goto: BTreeMap<(usize, usize), usize>,
    conflicts: Vec<SLR1Conflict>,
}

impl SLR1Table {
    pub fn state_count(&self) -> usize {
        self.state_count
    }

    pub fn action(&self, state: usize, lookahead: usize) -> Option<&Action> {
        self.action.get(&(state, lookahead))
    }

    pub fn goto(&self, state: usize, non_terminal: usize) -> Option<usize> {
        self.goto.get(&(state, non_terminal)).copied()
    }

    pub fn conflicts(&self) -> &[SLR1Conflict] {
        &self.conflicts
    }

    pub fn is_conflict_free(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// First writer wins: an occupied cell keeps its action and the attempt
    /// is logged unless it would write the very same action.
    fn set_action(&mut self, state: usize, symbol: usize, action: Action) {
        match self.action.get(&(state, symbol)) {
            None => {
                self.action.insert((state, symbol), action);
            }
            Some(kept) if *kept != action => {
                debug!(
                    "SLR(1) conflict in state {} on {}: {:?} vs {:?}",
                    state, symbol, kept, action
                );
                self.conflicts.push(SLR1Conflict {
                    state,
                    symbol,
                    kept: kept.clone(),
                    rejected: action,
                });
            }
            Some(_) => {}
        }
    }
}

impl Grammar {
    pub fn build_slr1_table(&self, automaton: &Automaton, follow: &FollowSets) -> SLR1Table {
        let mut table = SLR1Table {
            state_count: automaton.states.len(),
            action: BTreeMap::new(),
            goto: BTreeMap::new(),
            conflicts: Vec::new(),
        };

        for (i, state) in automaton.states.iter().enumerate() {
            for item in state.items() {
                match item.next_symbol() {
                    None if item.left == automaton.augmented_start => {
                        if item.right == [self.start_symbol()] {
                            table.set_action(i, END_MARK_INDEX, Action::Accept);
                        }
                    }
                    None => {
                        for &t in follow.get(item.left) {
                            table.set_action(
                                i,
                                t,
                                Action::Reduce {
                                    left: item.left,
                                    right: item.right.clone(),
                                },
                            );
                        }
                    }
                    Some(symbol) => match automaton.transition(i, symbol) {
                        Some(j) if self.is_terminal(symbol) => {
                            table.set_action(i, symbol, Action::Shift(j))
                        }
                        Some(j) => {
                            table.goto.insert((i, symbol), j);
                        }
                        None => {}
                    },
                }
            }
        }

        table
    }

    /// Whether the SLR(1) table of this grammar is free of conflicts.
    /// Fails only when the LR(0) automaton exceeds the default state bound.
    pub fn is_slr1(&self) -> Result<bool> {
        let first = self.compute_first_sets();
        let follow = self.compute_follow_sets(&first);
        let automaton = self.build_automaton()?;
        Ok(self
            .build_slr1_table(&automaton, &follow)
            .is_conflict_free())
    }
}
