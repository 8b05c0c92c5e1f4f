use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    #[error("symbol \"{symbol}\" in a production of {left} is not declared")]
    UnknownSymbol { symbol: String, left: String },

    #[error("\"{0}\" is declared both as a terminal and as a non-terminal")]
    OverlappingSymbol(String),

    #[error("\"{0}\" is reserved and cannot be declared as a grammar symbol")]
    ReservedSymbol(String),

    #[error("the grammar has no non-terminal to start from")]
    EmptyGrammar,

    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error(transparent)]
    UnknownToken(#[from] TokenizeError),

    #[error("the LR(0) automaton exceeds {limit} states")]
    StateLimitExceeded { limit: usize },

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// An input string that does not split into the grammar's terminals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("cannot tokenize input at position {position}: \"{rest}\"")]
pub struct TokenizeError {
    /// Byte offset of the first character no terminal matches.
    pub position: usize,
    pub rest: String,
}

impl GrammarError {
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GrammarError>;
