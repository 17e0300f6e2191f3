use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Mail header parse failed: {0}")]
    MailParse(#[from] mailparse::MailParseError),

    #[error("TOML deserialization failed: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization failed: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Reference row {row} is missing required field `{field}`")]
    MissingField { row: usize, field: &'static str },

    #[error("Invalid rewrite pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
