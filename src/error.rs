use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Empty expression")]
    Empty,

    #[error("Invalid token: '{0}'")]
    InvalidToken(String),

    #[error("Invalid vector literal: '{0}'")]
    InvalidVector(String),

    #[error("Function '{function}' expects {arity} arguments, only {available} available")]
    MissingArguments {
        function: String,
        arity: usize,
        available: usize,
    },

    #[error("Unbalanced expression: {remaining} expressions left after parsing")]
    Unbalanced { remaining: usize },
}

#[derive(Error, Debug)]
pub enum PicEvolveError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Structural invariant violated: {0}")]
    StructuralInvariant(String),

    #[error("Function with name '{0}' already exists")]
    DuplicateFunction(String),

    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    #[error("Function '{name}' failed: {source}")]
    FunctionFailed {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Gave up after {attempts} attempts: produced {produced} of {requested} distinct expressions")]
    RetryLimitExceeded {
        requested: usize,
        produced: usize,
        attempts: usize,
    },

    #[error("Invalid expression #. Index: {index}, Size: {size}")]
    NodeOutOfRange { index: usize, size: usize },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, PicEvolveError>;
