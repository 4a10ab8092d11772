use thiserror::Error;

/// Failures talking to the remote config service. All are terminal for a
/// run; in particular `Conflict` requires a fresh fetch-merge cycle, never a
/// blind retry of the same payload.
#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(
        "no template has been published for project {0}; create one parameter in the console first"
    )]
    NotFound(String),

    #[error("unauthorized: the bearer token was rejected")]
    Unauthorized,

    #[error("forbidden: the credential lacks the remote config scope")]
    Forbidden,

    #[error("the template changed since it was fetched; fetch and merge again")]
    Conflict,

    #[error("service unavailable: HTTP {0}")]
    Transient(u16),

    #[error("fetch response carried no entity tag")]
    MissingEtag,

    #[error("fetch failed: HTTP {status}: {body}")]
    FetchFailed { status: u16, body: String },

    #[error("publish failed: HTTP {status}: {body}")]
    PublishFailed { status: u16, body: String },
}
