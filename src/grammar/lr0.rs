use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use log::debug;

use super::{
    error::{GrammarError, Result},
    grammar::END_MARK_INDEX,
    Grammar,
};

/// Bound on the canonical collection when the caller gives none.
pub const DEFAULT_MAX_STATES: usize = 10_000;

/// A production with a dot marking how much of it has been recognised.
///
/// Equality, ordering and hashing only look at the three fields, so items
/// behave as plain values inside sets and map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LR0Item {
    pub left: usize,
    pub right: Vec<usize>,
    pub position: usize,
}

impl LR0Item {
    pub fn new(left: usize, right: Vec<usize>) -> Self {
        Self {
            left,
            right,
            position: 0,
        }
    }

    /// Symbol right after the dot, if the dot is not at the end.
    pub fn next_symbol(&self) -> Option<usize> {
        self.right.get(self.position).copied()
    }

    pub fn is_complete(&self) -> bool {
        self.position == self.right.len()
    }

    pub fn generate_next(&self) -> Self {
        Self {
            left: self.left,
            right: self.right.clone(),
            position: self.position + 1,
        }
    }
}

/// A closed set of items. Two states are the same state iff they hold the
/// same items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct State {
    items: BTreeSet<LR0Item>,
}

impl State {
    pub fn items(&self) -> impl Iterator<Item = &LR0Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: &LR0Item) -> bool {
        self.items.contains(item)
    }

    /// Items that were not added by closure: the dot has moved, or the item
    /// belongs to the augmented start production.
    pub fn kernel(&self, augmented_start: usize) -> impl Iterator<Item = &LR0Item> {
        self.items
            .iter()
            .filter(move |item| item.position > 0 || item.left == augmented_start)
    }

    /// Items added by closure.
    pub fn extend(&self, augmented_start: usize) -> impl Iterator<Item = &LR0Item> {
        self.items
            .iter()
            .filter(move |item| item.position == 0 && item.left != augmented_start)
    }
}

/// Canonical collection of LR(0) states.
///
/// State 0 is the closure of `S' -> •S`. `S'` is not part of the grammar: it
/// is addressed by `augmented_start`, one past the last symbol index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Automaton {
    pub states: Vec<State>,
    pub transitions: BTreeMap<(usize, usize), usize>,
    pub augmented_start: usize,
    pub augmented_name: String,
}

impl Automaton {
    pub fn transition(&self, state: usize, symbol: usize) -> Option<usize> {
        self.transitions.get(&(state, symbol)).copied()
    }

    /// Outgoing edges of a state as `(symbol, target)`.
    pub fn edges(&self, state: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.transitions
            .range((state, 0)..(state + 1, 0))
            .map(|(&(_, symbol), &target)| (symbol, target))
    }

    pub fn symbol_name<'a>(&'a self, g: &'a Grammar, symbol: usize) -> &'a str {
        if symbol == self.augmented_start {
            self.augmented_name.as_str()
        } else {
            g.get_symbol_name(symbol)
        }
    }
}

impl Grammar {
    /// Least set containing `items` and, for every item `X -> α•Bβ`, every
    /// item `B -> •γ`.
    pub fn closure<I>(&self, items: I) -> State
    where
        I: IntoIterator<Item = LR0Item>,
    {
        let mut closure: BTreeSet<LR0Item> = BTreeSet::new();
        let mut q: VecDeque<LR0Item> = VecDeque::new();
        for item in items {
            if closure.insert(item.clone()) {
                q.push_back(item);
            }
        }

        while let Some(item) = q.pop_front() {
            let symbol = match item.next_symbol() {
                Some(symbol) if self.is_non_terminal(symbol) => symbol,
                _ => continue,
            };
            for production in self.productions(symbol) {
                let new_item = LR0Item::new(symbol, production.clone());
                if !closure.contains(&new_item) {
                    closure.insert(new_item.clone());
                    q.push_back(new_item);
                }
            }
        }

        State { items: closure }
    }

    /// Advances every item of `state` expecting `symbol` and closes the
    /// result. `None` when no item expects `symbol`.
    pub fn goto(&self, state: &State, symbol: usize) -> Option<State> {
        let moved: Vec<LR0Item> = state
            .items()
            .filter(|item| item.next_symbol() == Some(symbol))
            .map(|item| item.generate_next())
            .collect();

        if moved.is_empty() {
            None
        } else {
            Some(self.closure(moved))
        }
    }

    pub fn build_automaton(&self) -> Result<Automaton> {
        self.build_automaton_with_limit(DEFAULT_MAX_STATES)
    }

    /// Builds the canonical collection, visiting states in discovery order
    /// and symbols in index order, so the result is the same on every run.
    pub fn build_automaton_with_limit(&self, max_states: usize) -> Result<Automaton> {
        let augmented_start = self.symbol_count();
        let augmented_name =
            self.get_symbol_prime_name(self.get_symbol_name(self.start_symbol()).to_string());

        let start_state =
            self.closure([LR0Item::new(augmented_start, vec![self.start_symbol()])]);
        let mut states: Vec<State> = vec![start_state.clone()];
        let mut index: HashMap<State, usize> = HashMap::from([(start_state, 0)]);
        let mut transitions: BTreeMap<(usize, usize), usize> = BTreeMap::new();

        let mut u = 0;
        while u < states.len() {
            for symbol in END_MARK_INDEX + 1..self.symbol_count() {
                let next = match self.goto(&states[u], symbol) {
                    Some(next) => next,
                    None => continue,
                };

                let v = match index.get(&next) {
                    Some(&v) => v,
                    None => {
                        if states.len() >= max_states {
                            return Err(GrammarError::StateLimitExceeded { limit: max_states });
                        }
                        states.push(next.clone());
                        index.insert(next, states.len() - 1);
                        states.len() - 1
                    }
                };
                transitions.insert((u, symbol), v);
            }
            u += 1;
        }

        debug!(
            "LR(0) automaton: {} states, {} transitions",
            states.len(),
            transitions.len()
        );

        Ok(Automaton {
            states,
            transitions,
            augmented_start,
            augmented_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::first_follow::tests::{G1, G2};

    #[test]
    fn start_state_of_expression_grammar() {
        let g = Grammar::parse(G2).unwrap();
        let fsm = g.build_automaton().unwrap();

        assert_eq!(fsm.states.len(), 12);
        assert_eq!(fsm.states[0].len(), 7);
        assert_eq!(fsm.augmented_name, "E'");
        assert!(fsm.states[0].contains(&LR0Item::new(
            fsm.augmented_start,
            vec![g.start_symbol()]
        )));
        assert_eq!(fsm.states[0].kernel(fsm.augmented_start).count(), 1);
        assert_eq!(fsm.states[0].extend(fsm.augmented_start).count(), 6);
    }

    #[test]
    fn transitions_point_at_existing_states() {
        let g = Grammar::parse(G2).unwrap();
        let fsm = g.build_automaton().unwrap();
        let id = g.get_symbol_index("id").unwrap();
        let lparen = g.get_symbol_index("(").unwrap();

        for (&(from, symbol), &to) in &fsm.transitions {
            assert!(to < fsm.states.len());
            assert_eq!(g.goto(&fsm.states[from], symbol).as_ref(), Some(&fsm.states[to]));
        }

        // every shift on id lands in the same state F -> id•
        let targets: BTreeSet<usize> = fsm
            .transitions
            .iter()
            .filter(|((_, s), _)| *s == id)
            .map(|(_, &to)| to)
            .collect();
        assert_eq!(targets.len(), 1);
        let open = fsm.transition(0, lparen).unwrap();
        assert_eq!(fsm.transition(open, lparen), Some(open));
        assert_eq!(fsm.edges(0).count(), 5);
    }

    #[test]
    fn closure_is_idempotent() {
        let g = Grammar::parse(G1).unwrap();
        let fsm = g.build_automaton().unwrap();
        for state in &fsm.states {
            assert_eq!(&g.closure(state.items().cloned()), state);
        }
    }

    #[test]
    fn closure_does_not_depend_on_item_order() {
        let g = Grammar::parse(G2).unwrap();
        let e = g.get_symbol_index("E").unwrap();
        let t = g.get_symbol_index("T").unwrap();
        let a = LR0Item::new(e, g.productions(e)[0].clone());
        let b = LR0Item::new(t, g.productions(t)[0].clone());

        assert_eq!(
            g.closure([a.clone(), b.clone()]),
            g.closure([b, a])
        );
    }

    #[test]
    fn goto_without_matching_item_is_none() {
        let g = Grammar::parse(G2).unwrap();
        let fsm = g.build_automaton().unwrap();
        let rparen = g.get_symbol_index(")").unwrap();
        assert_eq!(g.goto(&fsm.states[0], rparen), None);
    }

    #[test]
    fn epsilon_production_yields_complete_item() {
        let g = Grammar::parse("S -> A b\nA -> ε").unwrap();
        let fsm = g.build_automaton().unwrap();
        let a = g.get_symbol_index("A").unwrap();

        let item = LR0Item::new(a, Vec::new());
        assert!(item.is_complete());
        assert!(fsm.states[0].contains(&item));
    }

    #[test]
    fn rebuilding_gives_identical_automaton() {
        let g = Grammar::parse(G1).unwrap();
        assert_eq!(g.build_automaton().unwrap(), g.build_automaton().unwrap());
    }

    #[test]
    fn state_limit_fails_fast() {
        let g = Grammar::parse(G2).unwrap();
        assert_eq!(
            g.build_automaton_with_limit(5).unwrap_err(),
            GrammarError::StateLimitExceeded { limit: 5 }
        );
    }
}
