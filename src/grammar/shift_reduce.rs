use super::{
    grammar::END_MARK_INDEX,
    slr1_table::{Action, SLR1Table},
    trace::{ParseOutcome, RejectReason, StepAction},
};

impl SLR1Table {
    /// Runs the shift-reduce parser over `tokens`.
    ///
    /// The state stack starts as `[0]` and the symbol stack empty; the end
    /// marker is appended to the input. Every reduction is also collected in
    /// [`ParseOutcome::reductions`].
    pub fn parse(&self, tokens: &[usize], max_steps: usize) -> ParseOutcome {
        self.run(tokens, max_steps, true)
    }

    /// Same as [`SLR1Table::parse`] but only keeps the final configuration.
    pub fn recognize(&self, tokens: &[usize], max_steps: usize) -> ParseOutcome {
        self.run(tokens, max_steps, false)
    }

    fn run(&self, tokens: &[usize], max_steps: usize, record: bool) -> ParseOutcome {
        let mut input = tokens.to_vec();
        input.push(END_MARK_INDEX);
        let mut states: Vec<usize> = vec![0];
        let mut symbols: Vec<usize> = Vec::new();
        let mut cursor = 0;
        let mut outcome = ParseOutcome::new(record);

        loop {
            if outcome.step_count >= max_steps {
                return outcome.reject(
                    &states,
                    &symbols,
                    &input[cursor..],
                    RejectReason::StepLimit(max_steps),
                );
            }

            let s = *states.last().unwrap_or(&0);
            let a = input[cursor];

            match self.action(s, a) {
                None => {
                    return outcome.reject(
                        &states,
                        &symbols,
                        &input[cursor..],
                        RejectReason::NoEntry {
                            top: s,
                            lookahead: a,
                        },
                    )
                }
                Some(Action::Shift(j)) => {
                    outcome.push(&states, &symbols, &input[cursor..], StepAction::Shift(*j));
                    states.push(*j);
                    symbols.push(a);
                    cursor += 1;
                }
                Some(Action::Reduce { left, right }) => {
                    let n = right.len();
                    // state uncovered once the handle is popped
                    let uncovered = match states.len().checked_sub(n + 1) {
                        Some(k) => states[k],
                        None => {
                            return outcome.reject(
                                &states,
                                &symbols,
                                &input[cursor..],
                                RejectReason::NoGoto {
                                    state: s,
                                    non_terminal: *left,
                                },
                            )
                        }
                    };
                    let next = match self.goto(uncovered, *left) {
                        Some(next) => next,
                        None => {
                            return outcome.reject(
                                &states,
                                &symbols,
                                &input[cursor..],
                                RejectReason::NoGoto {
                                    state: uncovered,
                                    non_terminal: *left,
                                },
                            )
                        }
                    };

                    outcome.push(
                        &states,
                        &symbols,
                        &input[cursor..],
                        StepAction::Reduce {
                            left: *left,
                            right: right.clone(),
                        },
                    );
                    outcome.reductions.push((*left, right.clone()));
                    states.truncate(states.len() - n);
                    symbols.truncate(symbols.len().saturating_sub(n));
                    states.push(next);
                    symbols.push(*left);
                }
                Some(Action::Accept) => {
                    outcome.push(&states, &symbols, &input[cursor..], StepAction::Accept);
                    outcome.accepted = true;
                    return outcome;
                }
            }
        }
    }
}
