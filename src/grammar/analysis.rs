use std::str::FromStr;

use log::debug;
use serde::{Deserialize, Serialize};

use super::{
    error::{GrammarError, Result},
    first_follow::{FirstSets, FollowSets},
    ll1_table::LL1Table,
    lr0::{Automaton, DEFAULT_MAX_STATES},
    slr1_table::SLR1Table,
    trace::ParseOutcome,
    Grammar,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Upper bound on the number of LR(0) states.
    pub max_states: usize,
    /// Transitions a parser may take on any input, on top of the per-token
    /// allowance.
    pub max_parse_steps: usize,
    /// Transitions allowed for every input token, the end marker included.
    pub steps_per_token: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_states: DEFAULT_MAX_STATES,
            max_parse_steps: 100_000,
            steps_per_token: 100,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| GrammarError::Config(e.to_string()))?;
        if config.max_states == 0 || config.max_parse_steps == 0 {
            return Err(GrammarError::Config("limits must be positive".to_string()));
        }
        Ok(config)
    }

    /// Step bound for an input of `token_count` tokens. It grows with the
    /// input, so only cyclic grammars run into it on valid sentences.
    pub fn step_limit(&self, token_count: usize) -> usize {
        self.steps_per_token
            .saturating_mul(token_count.saturating_add(1))
            .saturating_add(self.max_parse_steps)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParserKind {
    Predictive,
    ShiftReduce,
}

impl FromStr for ParserKind {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "ll1" | "t" | "predictive" => Ok(ParserKind::Predictive),
            "slr1" | "b" | "shift-reduce" => Ok(ParserKind::ShiftReduce),
            _ => Err(GrammarError::Config(format!("unknown parser \"{}\"", s))),
        }
    }
}

/// What every table-driven parser offers its caller.
pub trait TableParser {
    fn kind(&self) -> ParserKind;

    /// Number of conflicts recorded while its table was built.
    fn conflict_count(&self) -> usize;

    /// Parses and records the full trace.
    fn parse_tokens(&self, tokens: &[usize]) -> ParseOutcome;

    /// Parses keeping only the final configuration, in time and memory
    /// linear in the number of steps.
    fn recognize_tokens(&self, tokens: &[usize]) -> ParseOutcome;
}

pub enum Parser<'a> {
    Predictive {
        grammar: &'a Grammar,
        table: &'a LL1Table,
        config: AnalysisConfig,
    },
    ShiftReduce {
        table: &'a SLR1Table,
        config: AnalysisConfig,
    },
}

impl TableParser for Parser<'_> {
    fn kind(&self) -> ParserKind {
        match self {
            Parser::Predictive { .. } => ParserKind::Predictive,
            Parser::ShiftReduce { .. } => ParserKind::ShiftReduce,
        }
    }

    fn conflict_count(&self) -> usize {
        match self {
            Parser::Predictive { table, .. } => table.conflicts().len(),
            Parser::ShiftReduce { table, .. } => table.conflicts().len(),
        }
    }

    fn parse_tokens(&self, tokens: &[usize]) -> ParseOutcome {
        match self {
            Parser::Predictive {
                grammar,
                table,
                config,
            } => table.parse(grammar, tokens, config.step_limit(tokens.len())),
            Parser::ShiftReduce { table, config } => {
                table.parse(tokens, config.step_limit(tokens.len()))
            }
        }
    }

    fn recognize_tokens(&self, tokens: &[usize]) -> ParseOutcome {
        match self {
            Parser::Predictive {
                grammar,
                table,
                config,
            } => table.recognize(grammar, tokens, config.step_limit(tokens.len())),
            Parser::ShiftReduce { table, config } => {
                table.recognize(tokens, config.step_limit(tokens.len()))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub ll1: bool,
    pub slr1: bool,
}

impl Classification {
    /// Parsers that can be trusted for this grammar, predictive first.
    pub fn available(&self) -> Vec<ParserKind> {
        let mut kinds = Vec::new();
        if self.ll1 {
            kinds.push(ParserKind::Predictive);
        }
        if self.slr1 {
            kinds.push(ParserKind::ShiftReduce);
        }
        kinds
    }

    /// The caller's choice when that parser is available, otherwise the only
    /// (or first) available one. `None` when the grammar is in neither class.
    pub fn preferred(&self, requested: Option<ParserKind>) -> Option<ParserKind> {
        let available = self.available();
        match requested {
            Some(kind) if available.contains(&kind) => Some(kind),
            _ => available.first().copied(),
        }
    }
}

/// Every artifact derived from one grammar, computed once up front.
pub struct Analysis<'g> {
    pub grammar: &'g Grammar,
    pub config: AnalysisConfig,
    pub first: FirstSets,
    pub follow: FollowSets,
    pub ll1_table: LL1Table,
    pub automaton: Automaton,
    pub slr1_table: SLR1Table,
}

impl<'g> Analysis<'g> {
    pub fn new(grammar: &'g Grammar, config: AnalysisConfig) -> Result<Self> {
        let first = grammar.compute_first_sets();
        let follow = grammar.compute_follow_sets(&first);
        let ll1_table = grammar.build_ll1_table(&first, &follow);
        let automaton = grammar.build_automaton_with_limit(config.max_states)?;
        let slr1_table = grammar.build_slr1_table(&automaton, &follow);

        debug!(
            "analysis done: {} LL(1) conflicts, {} SLR(1) conflicts",
            ll1_table.conflicts().len(),
            slr1_table.conflicts().len()
        );

        Ok(Self {
            grammar,
            config,
            first,
            follow,
            ll1_table,
            automaton,
            slr1_table,
        })
    }

    /// LL(1) requires both the structural check of [`Grammar::is_ll1`] and a
    /// conflict-free predictive table.
    pub fn classify(&self) -> Classification {
        Classification {
            ll1: self.grammar.is_ll1() && self.ll1_table.is_conflict_free(),
            slr1: self.slr1_table.is_conflict_free(),
        }
    }

    pub fn parser(&self, kind: ParserKind) -> Parser<'_> {
        let config = self.config;
        match kind {
            ParserKind::Predictive => Parser::Predictive {
                grammar: self.grammar,
                table: &self.ll1_table,
                config,
            },
            ParserKind::ShiftReduce => Parser::ShiftReduce {
                table: &self.slr1_table,
                config,
            },
        }
    }

    /// Tokenizes `input` against the grammar's terminals and parses it. Input
    /// that cannot be tokenized is rejected like any other bad input.
    pub fn parse_str(&self, kind: ParserKind, input: &str) -> ParseOutcome {
        match self.grammar.tokenize(input) {
            Ok(tokens) => self.parser(kind).parse_tokens(&tokens),
            Err(e) => ParseOutcome::unknown_token(e.position),
        }
    }

    /// [`Analysis::parse_str`] without the trace.
    pub fn recognize_str(&self, kind: ParserKind, input: &str) -> ParseOutcome {
        match self.grammar.tokenize(input) {
            Ok(tokens) => self.parser(kind).recognize_tokens(&tokens),
            Err(e) => ParseOutcome::unknown_token(e.position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{
        first_follow::tests::{G1, G2},
        trace::RejectReason,
    };

    /// Every string over `alphabet` of length at most `max_len`.
    fn strings(alphabet: &[usize], max_len: usize) -> Vec<Vec<usize>> {
        let mut all = vec![Vec::new()];
        let mut frontier = vec![Vec::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for s in &frontier {
                for &t in alphabet {
                    let mut longer = s.clone();
                    longer.push(t);
                    next.push(longer);
                }
            }
            all.extend(next.iter().cloned());
            frontier = next;
        }
        all
    }

    #[test]
    fn classification_of_example_grammars() {
        let g1 = Grammar::parse(G1).unwrap();
        let a1 = Analysis::new(&g1, AnalysisConfig::default()).unwrap();
        assert_eq!(a1.classify(), Classification { ll1: true, slr1: true });
        assert_eq!(
            a1.classify().available(),
            vec![ParserKind::Predictive, ParserKind::ShiftReduce]
        );

        let g2 = Grammar::parse(G2).unwrap();
        let a2 = Analysis::new(&g2, AnalysisConfig::default()).unwrap();
        assert_eq!(a2.classify(), Classification { ll1: false, slr1: true });
        assert_eq!(a2.classify().available(), vec![ParserKind::ShiftReduce]);
        assert_eq!(
            a2.classify().preferred(Some(ParserKind::Predictive)),
            Some(ParserKind::ShiftReduce)
        );
        assert_eq!(
            a1.classify().preferred(Some(ParserKind::ShiftReduce)),
            Some(ParserKind::ShiftReduce)
        );

        let g3 = Grammar::parse("S -> i S | i S e S | a").unwrap();
        let a3 = Analysis::new(&g3, AnalysisConfig::default()).unwrap();
        assert!(a3.classify().available().is_empty());
        assert_eq!(a3.classify().preferred(None), None);
    }

    #[test]
    fn both_parsers_agree_on_expression_grammar() {
        let g = Grammar::parse(G1).unwrap();
        let analysis = Analysis::new(&g, AnalysisConfig::default()).unwrap();
        let predictive = analysis.parser(ParserKind::Predictive);
        let shift_reduce = analysis.parser(ParserKind::ShiftReduce);
        assert_eq!(predictive.conflict_count(), 0);
        assert_eq!(shift_reduce.conflict_count(), 0);

        let alphabet: Vec<usize> = g.terminal_iter().collect();
        let mut accepted = 0;
        for tokens in strings(&alphabet, 5) {
            let a = predictive.parse_tokens(&tokens).accepted;
            let b = shift_reduce.parse_tokens(&tokens).accepted;
            assert_eq!(a, b, "{}", g.production_to_string(&tokens));
            accepted += a as usize;
        }
        // id, id+id, id*id, (id), ((id)) and friends
        assert!(accepted > 5);
    }

    #[test]
    fn both_parsers_agree_on_nullable_grammar() {
        let g = Grammar::parse("S -> a S b | c A\nA -> d A | ε").unwrap();
        let analysis = Analysis::new(&g, AnalysisConfig::default()).unwrap();
        assert_eq!(analysis.classify(), Classification { ll1: true, slr1: true });

        let alphabet: Vec<usize> = g.terminal_iter().collect();
        for tokens in strings(&alphabet, 6) {
            assert_eq!(
                analysis.parser(ParserKind::Predictive).parse_tokens(&tokens).accepted,
                analysis.parser(ParserKind::ShiftReduce).parse_tokens(&tokens).accepted,
            );
        }
    }

    #[test]
    fn parse_str_examples() {
        let g1 = Grammar::parse(G1).unwrap();
        let a1 = Analysis::new(&g1, AnalysisConfig::default()).unwrap();
        assert!(a1.parse_str(ParserKind::Predictive, "id+id*id").accepted);
        assert!(!a1.parse_str(ParserKind::Predictive, "id+").accepted);

        let g2 = Grammar::parse(G2).unwrap();
        let a2 = Analysis::new(&g2, AnalysisConfig::default()).unwrap();
        assert!(a2.parse_str(ParserKind::ShiftReduce, "id+id*id").accepted);
        assert!(!a2.parse_str(ParserKind::ShiftReduce, "id+").accepted);
        assert!(!a2.parse_str(ParserKind::ShiftReduce, "(id").accepted);
    }

    #[test]
    fn untokenizable_input_is_a_rejection() {
        let g = Grammar::parse(G1).unwrap();
        let analysis = Analysis::new(&g, AnalysisConfig::default()).unwrap();
        let outcome = analysis.parse_str(ParserKind::ShiftReduce, "id-id");

        assert!(!outcome.accepted);
        assert_eq!(
            outcome.rejection(),
            Some(&RejectReason::UnknownToken { position: 2 })
        );
    }

    #[test]
    fn config_from_json() {
        let config = AnalysisConfig::from_json(r#"{"max_states": 64}"#).unwrap();
        assert_eq!(config.max_states, 64);
        assert_eq!(
            config.max_parse_steps,
            AnalysisConfig::default().max_parse_steps
        );
        assert!(AnalysisConfig::from_json(r#"{"max_states": 0}"#).is_err());
        assert!(AnalysisConfig::from_json("not json").is_err());

        let g = Grammar::parse(G2).unwrap();
        let small = AnalysisConfig {
            max_states: 3,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            Analysis::new(&g, small),
            Err(GrammarError::StateLimitExceeded { limit: 3 })
        ));
    }

    #[test]
    fn long_sentences_are_recognized() {
        let g = Grammar::parse(G2).unwrap();
        let analysis = Analysis::new(&g, AnalysisConfig::default()).unwrap();
        // 60 001 tokens take about 150 000 steps, past the fixed allowance
        let input = format!("id{}", "+id".repeat(30_000));

        let outcome = analysis.recognize_str(ParserKind::ShiftReduce, &input);
        assert!(outcome.accepted);
        assert!(outcome.step_count > analysis.config.max_parse_steps);
        assert_eq!(outcome.steps.len(), 1);
        assert_eq!(outcome.reductions.len(), outcome.step_count - 60_002);

        let g1 = Grammar::parse(G1).unwrap();
        let a1 = Analysis::new(&g1, AnalysisConfig::default()).unwrap();
        let outcome = a1.recognize_str(ParserKind::Predictive, &input);
        assert!(outcome.accepted);
        assert_eq!(outcome.steps.len(), 1);
    }

    #[test]
    fn step_limit_grows_with_input() {
        let config = AnalysisConfig {
            max_parse_steps: 10,
            steps_per_token: 3,
            ..AnalysisConfig::default()
        };
        assert_eq!(config.step_limit(0), 13);
        assert_eq!(config.step_limit(4), 25);

        let g = Grammar::parse("S -> S | a").unwrap();
        let analysis = Analysis::new(&g, config).unwrap();
        let outcome = analysis.recognize_str(ParserKind::ShiftReduce, "a");
        assert_eq!(outcome.rejection(), Some(&RejectReason::StepLimit(16)));
        assert_eq!(outcome.step_count, 17);
    }

    #[test]
    fn parser_kind_from_str() {
        assert_eq!("LL1".parse::<ParserKind>().unwrap(), ParserKind::Predictive);
        assert_eq!("b".parse::<ParserKind>().unwrap(), ParserKind::ShiftReduce);
        assert!("lalr".parse::<ParserKind>().is_err());
    }
}
