use std::borrow::Cow;

/// A specialized [`ClientError`] enum of this crate.
#[spore_derive::spore_error]
pub enum ClientError {
    /// Connection, timeout or body decoding failure.
    #[error("HTTP error{}: {source}", format_context(.context))]
    Http { source: reqwest::Error, context: Option<Cow<'static, str>> },

    /// The server answered with a non-success status.
    #[error("Server replied {status}{}: {detail}", format_context(.context))]
    Api { status: u16, detail: String, context: Option<Cow<'static, str>> },

    #[error("I/O error{}: {source}", format_context(.context))]
    Io { source: std::io::Error, context: Option<Cow<'static, str>> },

    #[error("JSON error{}: {source}", format_context(.context))]
    Json { source: serde_json::Error, context: Option<Cow<'static, str>> },

    /// Input files that parse but cannot be used.
    #[error("Invalid input{}: {message}", format_context(.context))]
    Input { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
