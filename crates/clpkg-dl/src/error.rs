use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum DownloadError {
    #[error("Invalid URL: {url}")]
    #[diagnostic(code(clpkg_dl::invalid_url))]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error(transparent)]
    #[diagnostic(
        code(clpkg_dl::network),
        help("Check your internet connection or try again later")
    )]
    Network(#[from] Box<ureq::Error>),

    #[error("HTTP {status}: {url}")]
    #[diagnostic(code(clpkg_dl::http_error))]
    HttpError { status: u16, url: String },

    #[error("Invalid header `{header}`")]
    #[diagnostic(
        code(clpkg_dl::invalid_header),
        help("Headers must be written as `Name: value`")
    )]
    InvalidHeader { header: String },

    #[error("Invalid proxy `{proxy}`")]
    #[diagnostic(code(clpkg_dl::invalid_proxy))]
    InvalidProxy {
        proxy: String,
        #[source]
        source: Box<ureq::Error>,
    },
}

pub type Result<T> = std::result::Result<T, DownloadError>;

impl From<ureq::Error> for DownloadError {
    fn from(e: ureq::Error) -> Self {
        Self::Network(Box::new(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_error_invalid_url() {
        let err = DownloadError::InvalidUrl {
            url: "invalid".to_string(),
            source: url::ParseError::RelativeUrlWithoutBase,
        };
        let msg = err.to_string();
        assert!(msg.contains("Invalid URL"));
        assert!(msg.contains("invalid"));
    }

    #[test]
    fn test_download_error_http_error() {
        let err = DownloadError::HttpError {
            status: 404,
            url: "https://example.com/packages".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404: https://example.com/packages");
    }

    #[test]
    fn test_download_error_from_ureq() {
        let err = DownloadError::from(ureq::Error::ConnectionFailed);
        assert!(matches!(err, DownloadError::Network(_)));
    }
}
