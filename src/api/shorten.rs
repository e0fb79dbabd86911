//! Purpose: Seam to an external URL-shortening service for sharing encoded state.
//! Exports: `Shortener`, `HttpShortener`, `ShortenerConfig`, `ShortenOutcome`, `shorten_search`.
//! Role: The only networked piece; the codec itself never performs I/O.
//! Invariants: Failures surface as `Io` errors; there are no retries.
//! Invariants: An empty search (`""` or `"?"`) is reported as nothing to shorten, not an error.
use std::fmt;
use std::time::Duration;

use url::Url;

use crate::core::error::{Error, ErrorKind};

pub const DEFAULT_SHORTENER_ENDPOINT: &str = "https://tinyurl.com/api-create.php";
pub const DEFAULT_SHORTENER_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_SHORTENER_TIMEOUT: Duration =
    Duration::from_millis(DEFAULT_SHORTENER_TIMEOUT_MS);
pub const NOTHING_TO_SHORTEN: &str = "No url to shorten";

pub trait Shortener {
    fn shorten(&self, long_url: &str) -> Result<String, Error>;
}

#[derive(Clone, Debug)]
pub struct ShortenerConfig {
    pub endpoint: String,
    pub timeout: Duration,
}

impl Default for ShortenerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_SHORTENER_ENDPOINT.to_string(),
            timeout: DEFAULT_SHORTENER_TIMEOUT,
        }
    }
}

/// Calls `GET <endpoint>?url=<long_url>` and expects the short URL as the plain-text body.
#[derive(Clone, Debug)]
pub struct HttpShortener {
    endpoint: Url,
    agent: ureq::Agent,
}

impl HttpShortener {
    pub fn new(config: ShortenerConfig) -> Result<Self, Error> {
        let endpoint = parse_http_url(&config.endpoint, "shortener endpoint")?;
        let agent = ureq::AgentBuilder::new().timeout(config.timeout).build();
        Ok(Self { endpoint, agent })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Shortener for HttpShortener {
    fn shorten(&self, long_url: &str) -> Result<String, Error> {
        tracing::debug!(endpoint = %self.endpoint, "requesting short url");
        let response = self
            .agent
            .request_url("GET", &self.endpoint)
            .query("url", long_url)
            .set("Accept", "text/plain")
            .call();
        let body = match response {
            Ok(resp) => resp.into_string().map_err(|err| {
                Error::new(ErrorKind::Io)
                    .with_message("failed to read shortener response")
                    .with_source(err)
            })?,
            Err(ureq::Error::Status(code, _)) => {
                return Err(Error::new(ErrorKind::Io)
                    .with_message(format!("shortener returned status {code}")));
            }
            Err(ureq::Error::Transport(err)) => {
                return Err(Error::new(ErrorKind::Io)
                    .with_message("shortener request failed")
                    .with_source(err));
            }
        };
        let short = body.trim();
        if short.is_empty() {
            return Err(Error::new(ErrorKind::Io).with_message("shortener returned an empty body"));
        }
        parse_http_url(short, "shortener response").map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("shortener returned something other than a url")
                .with_source(err)
        })?;
        Ok(short.to_string())
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ShortenOutcome {
    Shortened(String),
    NothingToShorten,
}

impl fmt::Display for ShortenOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShortenOutcome::Shortened(url) => f.write_str(url),
            ShortenOutcome::NothingToShorten => f.write_str(NOTHING_TO_SHORTEN),
        }
    }
}

/// Joins `search` (as produced by `encode`) onto `origin` and shortens the result.
pub fn shorten_search(
    shortener: &dyn Shortener,
    origin: &str,
    search: &str,
) -> Result<ShortenOutcome, Error> {
    let query = search.strip_prefix('?').unwrap_or(search);
    if query.is_empty() {
        return Ok(ShortenOutcome::NothingToShorten);
    }
    let mut long_url = parse_http_url(origin, "origin")?;
    long_url.set_query(Some(query));
    long_url.set_fragment(None);
    shortener
        .shorten(long_url.as_str())
        .map(ShortenOutcome::Shortened)
}

fn parse_http_url(raw: &str, what: &str) -> Result<Url, Error> {
    let url = Url::parse(raw).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("invalid {what} `{raw}`"))
            .with_source(err)
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(Error::new(ErrorKind::Usage)
            .with_message(format!("{what} must use http or https scheme"))),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        HttpShortener, NOTHING_TO_SHORTEN, ShortenOutcome, Shortener, ShortenerConfig,
        shorten_search,
    };
    use crate::core::error::{Error, ErrorKind};
    use std::cell::RefCell;

    #[derive(Default)]
    struct RecordingShortener {
        seen: RefCell<Vec<String>>,
        fail: bool,
    }

    impl Shortener for RecordingShortener {
        fn shorten(&self, long_url: &str) -> Result<String, Error> {
            self.seen.borrow_mut().push(long_url.to_string());
            if self.fail {
                return Err(Error::new(ErrorKind::Io).with_message("service down"));
            }
            Ok("https://tiny.example/abc".to_string())
        }
    }

    #[test]
    fn empty_search_is_nothing_to_shorten() {
        let shortener = RecordingShortener::default();
        for search in ["", "?"] {
            let outcome = shorten_search(&shortener, "http://127.0.0.1:8050", search)
                .expect("outcome");
            assert_eq!(outcome, ShortenOutcome::NothingToShorten);
            assert_eq!(outcome.to_string(), NOTHING_TO_SHORTEN);
        }
        assert!(shortener.seen.borrow().is_empty());
    }

    #[test]
    fn search_is_joined_onto_origin() {
        let shortener = RecordingShortener::default();
        let outcome = shorten_search(
            &shortener,
            "http://127.0.0.1:8050",
            "?country=value&country=USA",
        )
        .expect("outcome");
        assert_eq!(
            outcome,
            ShortenOutcome::Shortened("https://tiny.example/abc".to_string())
        );
        assert_eq!(
            shortener.seen.borrow().as_slice(),
            ["http://127.0.0.1:8050/?country=value&country=USA"]
        );
    }

    #[test]
    fn shortener_failure_propagates() {
        let shortener = RecordingShortener {
            fail: true,
            ..RecordingShortener::default()
        };
        let err = shorten_search(&shortener, "http://127.0.0.1:8050", "?a=value&a=1")
            .expect_err("failure");
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn invalid_origin_is_usage_error() {
        let shortener = RecordingShortener::default();
        let err = shorten_search(&shortener, "ftp://host", "?a=value&a=1").expect_err("scheme");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn http_shortener_rejects_non_http_endpoint() {
        let config = ShortenerConfig {
            endpoint: "file:///tmp/shorten".to_string(),
            ..ShortenerConfig::default()
        };
        let err = HttpShortener::new(config).expect_err("scheme");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }
}
