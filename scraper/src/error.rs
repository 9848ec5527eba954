use thiserror::Error;

/// A single failed fetch attempt. Never escapes [`crate::fetcher::Fetcher`].
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    /// A descriptor carried a selector the parser rejects
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("invalid href pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("invalid base URL `{url}`: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// A candidate's link could not be resolved
    #[error("unresolvable link `{href}`: {source}")]
    Link {
        href: String,
        #[source]
        source: url::ParseError,
    },

    #[error("candidate has no href")]
    MissingHref,
}
