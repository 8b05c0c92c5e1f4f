/// Why a parser stopped without accepting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// Terminal on top of the predictive stack differs from the input.
    Mismatch { expected: usize, found: usize },
    /// No table entry for the stack top (a non-terminal for the predictive
    /// parser, a state for the shift-reduce parser) on the current input.
    NoEntry { top: usize, lookahead: usize },
    /// A reduction uncovered a state without a goto on the reduced non-terminal.
    NoGoto { state: usize, non_terminal: usize },
    /// The input string could not be split into terminals.
    UnknownToken { position: usize },
    StepLimit(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepAction {
    Match(usize),
    Derive { left: usize, right: Vec<usize> },
    Shift(usize),
    Reduce { left: usize, right: Vec<usize> },
    Accept,
    Reject(RejectReason),
}

/// One row of a parse trace: the configuration before `action` was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStep {
    /// State stack, bottom first. Always empty for the predictive parser.
    pub states: Vec<usize>,
    /// Symbol stack, bottom first.
    pub stack: Vec<usize>,
    /// Remaining input, ending with the end marker.
    pub input: Vec<usize>,
    pub action: StepAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseOutcome {
    pub accepted: bool,
    /// Every configuration when the trace is recorded, otherwise only the
    /// final accepting or rejecting one.
    pub steps: Vec<ParseStep>,
    /// Transitions taken, including the final one.
    pub step_count: usize,
    /// Reductions in the order they were applied (shift-reduce parser only).
    pub reductions: Vec<(usize, Vec<usize>)>,
    record: bool,
}

impl ParseOutcome {
    pub(crate) fn new(record: bool) -> Self {
        Self {
            record,
            ..Self::default()
        }
    }

    pub fn rejection(&self) -> Option<&RejectReason> {
        match self.steps.last().map(|step| &step.action) {
            Some(StepAction::Reject(reason)) => Some(reason),
            _ => None,
        }
    }

    pub(crate) fn unknown_token(position: usize) -> Self {
        let mut outcome = Self::new(true);
        outcome.push(
            &[],
            &[],
            &[],
            StepAction::Reject(RejectReason::UnknownToken { position }),
        );
        outcome
    }

    /// Counts one transition. Its configuration is copied only when the
    /// trace is recorded or the transition ends the parse.
    pub(crate) fn push(
        &mut self,
        states: &[usize],
        stack: &[usize],
        input: &[usize],
        action: StepAction,
    ) {
        log::trace!("{:?} {:?} {:?} => {:?}", states, stack, input, action);
        self.step_count += 1;
        let last = matches!(action, StepAction::Accept | StepAction::Reject(_));
        if self.record || last {
            self.steps.push(ParseStep {
                states: states.to_vec(),
                stack: stack.to_vec(),
                input: input.to_vec(),
                action,
            });
        }
    }

    pub(crate) fn reject(
        mut self,
        states: &[usize],
        stack: &[usize],
        input: &[usize],
        reason: RejectReason,
    ) -> Self {
        self.push(states, stack, input, StepAction::Reject(reason));
        self.accepted = false;
        self
    }
}
