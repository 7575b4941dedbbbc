use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid {collection} record #{index} (id: {id}): {reason}")]
    InvalidRecord { collection: &'static str, index: usize, id: String, reason: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Snapshot dump is empty")]
    EmptyDump,

    #[error("Config error: {0}")]
    Config(String),
}

impl CoreError {
    /// Wrap an error with the position of the persisted record that produced it.
    pub fn in_record(
        self,
        collection: &'static str,
        index: usize,
        id: impl Into<String>,
    ) -> Self {
        CoreError::InvalidRecord { collection, index, id: id.into(), reason: self.to_string() }
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_data() {
            CoreError::Deserialization(err.to_string())
        } else {
            CoreError::Serialization(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
