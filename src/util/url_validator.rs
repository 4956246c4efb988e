use thiserror::Error;
use url::Url;

/// Errors that can occur during URL validation.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// The URL has no host component.
    #[error("URL has no host")]
    MissingHost,
    /// Query strings and fragments would be lost when paths are appended.
    #[error("Base URL must not contain a query or fragment")]
    QueryOrFragment,
}

fn parse_http(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => {}
        _ => return Err(UrlValidationError::MissingHost),
    }

    Ok(url)
}

/// Validates a service base URL (the news backend or the identity service).
///
/// Localhost and private addresses are allowed: the backend usually runs
/// next to the client during development.
///
/// # Examples
///
/// ```
/// use newsman::util::validate_base_url;
///
/// assert!(validate_base_url("http://127.0.0.1:5000").is_ok());
/// assert!(validate_base_url("https://news.example.com/api/").is_ok());
/// assert!(validate_base_url("file:///etc/passwd").is_err());
/// assert!(validate_base_url("https://news.example.com/?x=1").is_err());
/// ```
pub fn validate_base_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let url = parse_http(url_str)?;
    if url.query().is_some() || url.fragment().is_some() {
        return Err(UrlValidationError::QueryOrFragment);
    }
    Ok(url)
}

/// Validates an article's source URL before handing it to the system browser.
///
/// Only http/https with a host pass, so a crafted `source_url` cannot launch
/// `file:` or custom-scheme handlers.
pub fn validate_url_for_open(url_str: &str) -> Result<Url, UrlValidationError> {
    parse_http(url_str)
}
