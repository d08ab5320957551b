//! Resource descriptors for raw census data.
//!
//! A census resource can live on the local filesystem, behind an HTTP(S)
//! URL, or arrive as an already-open reader. The closed set of variants is
//! resolved exactly once, at the boundary, into the full text body; the
//! loader itself only ever sees text.

use std::io::{ErrorKind, Read};
use std::path::PathBuf;

use reqwest::{Method, Request, StatusCode};
use tracing::debug;

use crate::error::LoadError;
use crate::fetch::HttpClient;

pub enum CensusSource {
    Path(PathBuf),
    Url(String),
    Reader(Box<dyn Read + Send>),
}

impl CensusSource {
    /// Classifies a CLI argument as a URL or a filesystem path.
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            CensusSource::Url(arg.to_string())
        } else {
            CensusSource::Path(PathBuf::from(arg))
        }
    }

    /// Identifier used in error messages and logs.
    pub fn id(&self) -> String {
        match self {
            CensusSource::Path(path) => path.display().to_string(),
            CensusSource::Url(url) => url.clone(),
            CensusSource::Reader(_) => "<stream>".to_string(),
        }
    }

    /// Reads the whole resource into a string.
    ///
    /// Absent resources (missing path, HTTP 404, refused connection) map
    /// to [`LoadError::NotFound`]; everything else that prevents reading
    /// maps to [`LoadError::Read`].
    pub async fn resolve<C: HttpClient>(self, client: &C) -> Result<String, LoadError> {
        let source_id = self.id();
        debug!(source = %source_id, "Resolving census source");

        match self {
            CensusSource::Path(path) => {
                std::fs::read_to_string(&path).map_err(|e| match e.kind() {
                    ErrorKind::NotFound => LoadError::NotFound { source_id },
                    _ => LoadError::Read {
                        source_id,
                        reason: e.to_string(),
                    },
                })
            }
            CensusSource::Url(url) => {
                let parsed: reqwest::Url = url.parse().map_err(|e| LoadError::Read {
                    source_id: source_id.clone(),
                    reason: format!("{e}"),
                })?;
                let resp = client
                    .execute(Request::new(Method::GET, parsed))
                    .await
                    .map_err(|e| {
                        if e.is_connect() {
                            LoadError::NotFound {
                                source_id: source_id.clone(),
                            }
                        } else {
                            LoadError::Read {
                                source_id: source_id.clone(),
                                reason: e.to_string(),
                            }
                        }
                    })?;
                if resp.status() == StatusCode::NOT_FOUND {
                    return Err(LoadError::NotFound { source_id });
                }
                let resp = resp.error_for_status().map_err(|e| LoadError::Read {
                    source_id: source_id.clone(),
                    reason: e.to_string(),
                })?;
                resp.text().await.map_err(|e| LoadError::Read {
                    source_id,
                    reason: e.to_string(),
                })
            }
            CensusSource::Reader(mut reader) => {
                let mut body = String::new();
                reader
                    .read_to_string(&mut body)
                    .map_err(|e| LoadError::Read {
                        source_id,
                        reason: e.to_string(),
                    })?;
                Ok(body)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::BasicClient;
    use async_trait::async_trait;

    /// Stub client that answers every request with a fixed status and body.
    struct CannedClient {
        status: StatusCode,
        body: &'static str,
    }

    #[async_trait]
    impl HttpClient for CannedClient {
        async fn execute(&self, _req: Request) -> reqwest::Result<reqwest::Response> {
            let resp = http::Response::builder()
                .status(self.status)
                .body(self.body.to_string())
                .expect("canned response");
            Ok(resp.into())
        }
    }

    #[test]
    fn test_from_arg_classifies_urls_and_paths() {
        assert!(matches!(
            CensusSource::from_arg("http://example.com/fto.csv"),
            CensusSource::Url(_)
        ));
        assert!(matches!(
            CensusSource::from_arg("https://example.com/fto.csv"),
            CensusSource::Url(_)
        ));
        assert!(matches!(
            CensusSource::from_arg("data/fto.csv"),
            CensusSource::Path(_)
        ));
    }

    #[test]
    fn test_source_ids() {
        assert_eq!(CensusSource::from_arg("data/fto.csv").id(), "data/fto.csv");
        let reader = CensusSource::Reader(Box::new(std::io::Cursor::new(Vec::new())));
        assert_eq!(reader.id(), "<stream>");
    }

    #[tokio::test]
    async fn test_missing_path_is_not_found() {
        let client = BasicClient::new().unwrap();
        let source = CensusSource::Path(PathBuf::from("/definitely/not/here.csv"));
        let err = source.resolve(&client).await.unwrap_err();
        match err {
            LoadError::NotFound { source_id } => {
                assert_eq!(source_id, "/definitely/not/here.csv")
            }
            other => panic!("expected NotFound, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_url_success_resolves_to_body() {
        let client = CannedClient {
            status: StatusCode::OK,
            body: "01/01/24-00,5,100,0\n",
        };
        let source = CensusSource::Url("http://example.com/fto.csv".to_string());
        assert_eq!(source.resolve(&client).await.unwrap(), "01/01/24-00,5,100,0\n");
    }

    #[tokio::test]
    async fn test_url_404_is_not_found() {
        let client = CannedClient {
            status: StatusCode::NOT_FOUND,
            body: "",
        };
        let source = CensusSource::Url("http://example.com/gone.csv".to_string());
        match source.resolve(&client).await.unwrap_err() {
            LoadError::NotFound { source_id } => {
                assert_eq!(source_id, "http://example.com/gone.csv")
            }
            other => panic!("expected NotFound, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_url_server_error_is_read_error() {
        let client = CannedClient {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: "",
        };
        let source = CensusSource::Url("http://example.com/fto.csv".to_string());
        match source.resolve(&client).await.unwrap_err() {
            LoadError::Read { source_id, reason } => {
                assert_eq!(source_id, "http://example.com/fto.csv");
                assert!(reason.contains("500"));
            }
            other => panic!("expected Read, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_refused_connection_is_not_found() {
        // Nothing listens on the discard port; the connect fails outright.
        let client = BasicClient::new().unwrap();
        let source = CensusSource::Url("http://127.0.0.1:9/fto.csv".to_string());
        match source.resolve(&client).await.unwrap_err() {
            LoadError::NotFound { source_id } => {
                assert_eq!(source_id, "http://127.0.0.1:9/fto.csv")
            }
            other => panic!("expected NotFound, got {other}"),
        }
    }

    #[tokio::test]
    async fn test_reader_resolves_to_its_contents() {
        let client = BasicClient::new().unwrap();
        let source = CensusSource::Reader(Box::new(std::io::Cursor::new(b"a,b,c".to_vec())));
        assert_eq!(source.resolve(&client).await.unwrap(), "a,b,c");
    }
}
