use super::client::{ensure_success, parse_base};
use crate::error::ApiError;
use reqwest::{Client, Url};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub enum AssetSource {
    Remote { http: Client, base: Url },
    Local(PathBuf),
}

impl AssetSource {
    /// `http(s)://` roots are fetched over HTTP, anything else is treated as
    /// a directory (an optional `file://` prefix is stripped).
    pub fn from_root(root: &str) -> Result<Self, ApiError> {
        if root.starts_with("http://") || root.starts_with("https://") {
            Ok(AssetSource::Remote {
                http: Client::new(),
                base: parse_base(root)?,
            })
        } else {
            let dir = root.strip_prefix("file://").unwrap_or(root);
            Ok(AssetSource::Local(PathBuf::from(dir)))
        }
    }

    pub fn describe(&self, path: &str) -> String {
        match self {
            AssetSource::Remote { base, .. } => base
                .join(relative(path))
                .map(|url| url.to_string())
                .unwrap_or_else(|_| path.to_string()),
            AssetSource::Local(dir) => dir.join(relative(path)).display().to_string(),
        }
    }

    pub async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, ApiError> {
        match self {
            AssetSource::Remote { http, base } => {
                let url = base
                    .join(relative(path))
                    .map_err(|_| ApiError::InvalidUrl(path.to_string()))?;
                log::trace!("GET {url}");
                let response = ensure_success(http.get(url).send().await?).await?;
                Ok(response.bytes().await?.to_vec())
            }
            AssetSource::Local(dir) => {
                let file = dir.join(relative(path));
                tokio::fs::read(&file).await.map_err(|source| ApiError::Io {
                    path: file.display().to_string(),
                    source,
                })
            }
        }
    }

    pub async fn fetch_text(&self, path: &str) -> Result<String, ApiError> {
        let bytes = self.fetch_bytes(path).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn relative(path: &str) -> &str {
    path.trim_start_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn remote_assets_resolve_against_the_root() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/public/mri/baseline/slice_077.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
            .mount(&server)
            .await;

        let source = AssetSource::from_root(&format!("{}/public", server.uri())).unwrap();
        let bytes = source
            .fetch_bytes("/mri/baseline/slice_077.jpg")
            .await
            .unwrap();
        assert_eq!(bytes, vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn missing_remote_asset_is_a_status_error() {
        let server = MockServer::start().await;
        let source = AssetSource::from_root(&server.uri()).unwrap();
        let err = source.fetch_text("/report/report.html").await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status, .. } if status.as_u16() == 404));
    }

    #[tokio::test]
    async fn local_assets_read_from_the_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("report")).unwrap();
        std::fs::write(dir.path().join("report/report.html"), "<p>ok</p>").unwrap();

        let source = AssetSource::from_root(dir.path().to_str().unwrap()).unwrap();
        assert!(matches!(source, AssetSource::Local(_)));
        assert_eq!(
            source.fetch_text("/report/report.html").await.unwrap(),
            "<p>ok</p>"
        );

        let err = source
            .fetch_bytes("/mri/followup/slice_000.jpg")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Io { .. }));
    }

    #[test]
    fn describe_names_the_resolved_location() {
        let source = AssetSource::from_root("http://localhost:3000").unwrap();
        assert_eq!(
            source.describe("/mri/difference/slice_001.jpg"),
            "http://localhost:3000/mri/difference/slice_001.jpg"
        );
    }
}
