use thiserror::Error;

pub type DatasheetResult<T> = Result<T, DatasheetError>;

#[derive(Error, Debug)]
pub enum DatasheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Data integrity error: {0}")]
    DataIntegrity(String),

    #[error("Template error: {0}")]
    Template(String),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Archive error: {0}")]
    Archive(String),
}
