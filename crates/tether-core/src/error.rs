use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// A source mode tag that matches no provider kind.
    #[error("invalid configuration: unknown event source mode `{tag}`")]
    InvalidConfiguration { tag: String },

    #[error("no provider named `{name}` is registered")]
    MissingProvider { name: String },

    #[error("provider `{name}` is not a `{expected}`")]
    TypeMismatch { name: String, expected: &'static str },

    /// Strict read of a cell that was never reset or written.
    #[error("cell read before its first reset")]
    UninitializedRead,

    #[error("listener failed: {0:#}")]
    ListenerFailure(#[source] anyhow::Error),

    #[error("change notifications nested deeper than {limit} levels")]
    RecursionLimit { limit: usize },

    #[error("malformed configuration: {0}")]
    Config(#[from] serde_json::Error),
}
