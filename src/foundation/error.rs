pub type FxResult<T> = Result<T, FxError>;

#[derive(thiserror::Error, Debug)]
pub enum FxError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("decode error: frame {index}: {message}")]
    Decode { index: usize, message: String },

    #[error("encode error: {0}")]
    Encode(String),

    #[error("sequencer error: {0}")]
    Sequencer(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FxError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn decode(index: usize, msg: impl Into<String>) -> Self {
        Self::Decode {
            index,
            message: msg.into(),
        }
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn sequencer(msg: impl Into<String>) -> Self {
        Self::Sequencer(msg.into())
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
