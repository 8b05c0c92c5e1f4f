use super::{
    grammar::END_MARK_INDEX,
    ll1_table::LL1Table,
    trace::{ParseOutcome, RejectReason, StepAction},
    Grammar,
};

impl LL1Table {
    /// Runs the table-driven predictive parser over `tokens`.
    ///
    /// The stack starts as `[$, start]` and the end marker is appended to the
    /// input. Rejection is an ordinary outcome; the trace records every
    /// configuration together with the action taken from it.
    pub fn parse(&self, g: &Grammar, tokens: &[usize], max_steps: usize) -> ParseOutcome {
        self.run(g, tokens, max_steps, true)
    }

    /// Same as [`LL1Table::parse`] but only keeps the final configuration.
    pub fn recognize(&self, g: &Grammar, tokens: &[usize], max_steps: usize) -> ParseOutcome {
        self.run(g, tokens, max_steps, false)
    }

    fn run(&self, g: &Grammar, tokens: &[usize], max_steps: usize, record: bool) -> ParseOutcome {
        let mut input = tokens.to_vec();
        input.push(END_MARK_INDEX);
        let mut stack = vec![END_MARK_INDEX, g.start_symbol()];
        let mut cursor = 0;
        let mut outcome = ParseOutcome::new(record);

        loop {
            if outcome.step_count >= max_steps {
                return outcome.reject(
                    &[],
                    &stack,
                    &input[cursor..],
                    RejectReason::StepLimit(max_steps),
                );
            }

            let current = input[cursor];
            let top = match stack.last() {
                Some(&top) => top,
                None => {
                    return outcome.reject(
                        &[],
                        &stack,
                        &input[cursor..],
                        RejectReason::Mismatch {
                            expected: END_MARK_INDEX,
                            found: current,
                        },
                    )
                }
            };

            if top == END_MARK_INDEX && current == END_MARK_INDEX {
                outcome.push(&[], &stack, &input[cursor..], StepAction::Accept);
                outcome.accepted = true;
                return outcome;
            }

            if g.is_terminal(top) {
                if top != current {
                    return outcome.reject(
                        &[],
                        &stack,
                        &input[cursor..],
                        RejectReason::Mismatch {
                            expected: top,
                            found: current,
                        },
                    );
                }
                outcome.push(&[], &stack, &input[cursor..], StepAction::Match(top));
                stack.pop();
                cursor += 1;
                continue;
            }

            match self.production(g, top, current) {
                Some(right) => {
                    outcome.push(
                        &[],
                        &stack,
                        &input[cursor..],
                        StepAction::Derive {
                            left: top,
                            right: right.to_vec(),
                        },
                    );
                    stack.pop();
                    stack.extend(right.iter().rev());
                }
                None => {
                    return outcome.reject(
                        &[],
                        &stack,
                        &input[cursor..],
                        RejectReason::NoEntry {
                            top,
                            lookahead: current,
                        },
                    )
                }
            }
        }
    }
}
