use thiserror::Error;

#[derive(Debug, Error)]
pub enum ColdCallError {
    #[error("could not find course roster: place a csv called {0} in the project root")]
    MissingInput(String),

    #[error("malformed roster: {0}")]
    MalformedInput(String),

    #[error("cannot reach mail source: {0}; try again later")]
    Connectivity(String),

    #[error("roster has {0} sections; only two-section courses are supported")]
    UnsupportedSections(usize),

    #[error("unknown section: {0}")]
    UnknownSection(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("message not found: {0}")]
    MessageNotFound(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Mail(#[from] mailparse::MailParseError),
}

pub type Result<T> = std::result::Result<T, ColdCallError>;
