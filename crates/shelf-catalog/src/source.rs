//! Where catalog text and thumbnails come from.
//!
//! A source is either a local file or an `http(s)` URL. Remote reads are
//! plain blocking GETs: no retry, no timeout beyond the transport's own.

use crate::parser::{ParseOutcome, parse_records};
use log::{debug, info};
use reqwest::StatusCode;
use reqwest::blocking::Client;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Terminal message shown when the catalog cannot be loaded.
pub const LOAD_FAILURE_MESSAGE: &str =
    "Error loading library. Please check the console and ensure 'library.csv' exists.";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP error! status: {status} ({url})")]
    Status { url: String, status: StatusCode },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File(PathBuf),
    Url(Url),
}

impl Source {
    /// Interpret `raw` as an `http(s)`/`file` URL when it parses as one,
    /// otherwise as a filesystem path.
    pub fn parse(raw: &str) -> Self {
        if let Some(source) = Self::parse_url(raw) {
            return source;
        }
        Source::File(PathBuf::from(raw))
    }

    fn parse_url(raw: &str) -> Option<Self> {
        let url = Url::parse(raw).ok()?;
        match url.scheme() {
            "http" | "https" => Some(Source::Url(url)),
            "file" => url.to_file_path().ok().map(Source::File),
            _ => None,
        }
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Source::Url(_))
    }

    /// Resolve a reference found inside the catalog (e.g. a relative
    /// thumbnail path) against this source's location.
    pub fn resolve(&self, reference: &str) -> Source {
        if let Some(absolute) = Self::parse_url(reference) {
            return absolute;
        }

        match self {
            Source::Url(base) => match base.join(reference) {
                Ok(url) => Source::Url(url),
                Err(e) => {
                    debug!("cannot join {reference:?} onto {base}: {e}");
                    Source::File(PathBuf::from(reference))
                }
            },
            Source::File(path) => {
                let reference = Path::new(reference);
                if reference.is_absolute() {
                    return Source::File(reference.to_path_buf());
                }
                let base = path.parent().unwrap_or_else(|| Path::new(""));
                Source::File(base.join(reference))
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::File(path) => write!(f, "{}", path.display()),
            Source::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Read the raw bytes behind `source`.
pub fn load_bytes(source: &Source) -> Result<Vec<u8>, LoadError> {
    match source {
        Source::File(path) => fs::read(path).map_err(|e| LoadError::Io {
            path: path.clone(),
            source: e,
        }),
        Source::Url(url) => {
            let response = get(url)?;
            let bytes = response.bytes().map_err(|e| LoadError::Request {
                url: url.to_string(),
                source: e,
            })?;
            Ok(bytes.to_vec())
        }
    }
}

/// Read `source` as UTF-8 text.
pub fn load_text(source: &Source) -> Result<String, LoadError> {
    match source {
        Source::File(path) => fs::read_to_string(path).map_err(|e| LoadError::Io {
            path: path.clone(),
            source: e,
        }),
        Source::Url(url) => get(url)?.text().map_err(|e| LoadError::Request {
            url: url.to_string(),
            source: e,
        }),
    }
}

/// Fetch and parse the catalog at `source`.
pub fn load_catalog(source: &Source) -> Result<ParseOutcome, LoadError> {
    let text = load_text(source)?;
    let outcome = parse_records(&text);
    info!(
        "loaded {} records from {source} ({} dropped)",
        outcome.records.len(),
        outcome.dropped
    );
    Ok(outcome)
}

fn get(url: &Url) -> Result<reqwest::blocking::Response, LoadError> {
    debug!("GET {url}");
    let response = Client::new()
        .get(url.as_str())
        .send()
        .map_err(|e| LoadError::Request {
            url: url.to_string(),
            source: e,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status,
        });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Answer exactly one request on a loopback port with `status` and `body`.
    fn serve_once(status: &'static str, body: &'static str) -> (Url, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            write!(
                stream,
                "HTTP/1.1 {status}\r\nContent-Type: text/csv\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            stream.flush().unwrap();
        });
        let url = Url::parse(&format!("http://{addr}/library.csv")).unwrap();
        (url, handle)
    }

    #[test]
    fn test_parse_source_kinds() {
        assert!(Source::parse("https://example.org/library.csv").is_remote());
        assert!(Source::parse("http://localhost:8000/library.csv").is_remote());
        assert_eq!(
            Source::parse("library.csv"),
            Source::File(PathBuf::from("library.csv"))
        );
        assert_eq!(
            Source::parse("data/library.csv"),
            Source::File(PathBuf::from("data/library.csv"))
        );
    }

    #[test]
    fn test_resolve_against_url() {
        let base = Source::parse("https://example.org/shelf/library.csv");
        assert_eq!(
            base.resolve("thumbs/a.jpg").to_string(),
            "https://example.org/shelf/thumbs/a.jpg"
        );
        assert_eq!(
            base.resolve("/img/b.png").to_string(),
            "https://example.org/img/b.png"
        );
        assert_eq!(
            base.resolve("https://cdn.example.com/c.png").to_string(),
            "https://cdn.example.com/c.png"
        );
    }

    #[test]
    fn test_resolve_against_file() {
        let base = Source::File(PathBuf::from("data/library.csv"));
        assert_eq!(
            base.resolve("thumbs/a.jpg"),
            Source::File(PathBuf::from("data/thumbs/a.jpg"))
        );

        let bare = Source::File(PathBuf::from("library.csv"));
        assert_eq!(
            bare.resolve("a.jpg"),
            Source::File(PathBuf::from("a.jpg"))
        );
        assert!(base.resolve("https://cdn.example.com/c.png").is_remote());
    }

    #[test]
    fn test_load_catalog_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("library.csv");
        fs::write(&path, "id,title\n1,One\n2,Two,extra\n").unwrap();

        let outcome = load_catalog(&Source::File(path)).unwrap();
        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.dropped, 1);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.csv");

        let err = load_catalog(&Source::File(path.clone())).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert_eq!(err.to_string(), format!("failed to read {}", path.display()));
    }

    #[test]
    fn test_load_catalog_over_http() {
        let (url, server) = serve_once("200 OK", "id,title\n1,One\n2,Two\n3\n");
        let outcome = load_catalog(&Source::Url(url)).unwrap();
        server.join().unwrap();

        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.dropped, 1);
        assert_eq!(outcome.records.get(1).unwrap().title(), "Two");
    }

    #[test]
    fn test_http_error_status_is_load_error() {
        let (url, server) = serve_once("404 Not Found", "missing");
        let err = load_catalog(&Source::Url(url.clone())).unwrap_err();
        server.join().unwrap();

        match err {
            LoadError::Status { status, url: failed } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(failed, url.to_string());
            }
            other => panic!("expected status error, got {other:?}"),
        }

        let (url, server) = serve_once("500 Internal Server Error", "");
        let err = load_bytes(&Source::Url(url)).unwrap_err();
        server.join().unwrap();
        assert!(err.to_string().starts_with("HTTP error! status: 500"));
    }

    #[test]
    fn test_refused_connection_is_request_error() {
        let addr = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let url = Url::parse(&format!("http://{addr}/library.csv")).unwrap();

        let err = load_catalog(&Source::Url(url)).unwrap_err();
        assert!(matches!(err, LoadError::Request { .. }));
    }
}
