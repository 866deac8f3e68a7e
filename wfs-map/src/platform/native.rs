use async_trait::async_trait;
use bytes::Bytes;
use log::{debug, info};

use crate::error::WfsMapError;
use crate::platform::PlatformService;

const USER_AGENT: &str = concat!("wfs-map/", env!("CARGO_PKG_VERSION"));

/// [`PlatformService`] over a `reqwest` HTTP client.
#[derive(Debug, Clone)]
pub struct NativePlatformService {
    http_client: reqwest::Client,
}

impl NativePlatformService {
    /// Creates a service with its own HTTP client.
    pub fn new() -> Result<Self, WfsMapError> {
        let http_client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { http_client })
    }

    /// Creates a service sharing an existing HTTP client.
    pub fn with_client(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

#[async_trait]
impl PlatformService for NativePlatformService {
    async fn load_bytes_from_url(&self, url: &str) -> Result<Bytes, WfsMapError> {
        debug!("Requesting {url}");
        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            info!("Failed to load {url}: {status}, {:?}", response.text().await);
            return Err(WfsMapError::HttpStatus(status.as_u16()));
        }

        Ok(response.bytes().await?)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn loads_response_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geoserver/assets10/ows"))
            .and(query_param("request", "GetFeature"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"type":"FeatureCollection","features":[]}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let service = NativePlatformService::new().unwrap();
        let url = format!("{}/geoserver/assets10/ows?request=GetFeature", server.uri());
        let bytes = service.load_bytes_from_url(&url).await.unwrap();

        assert_eq!(
            &bytes[..],
            br#"{"type":"FeatureCollection","features":[]}"#
        );
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let service = NativePlatformService::new().unwrap();
        let result = service.load_bytes_from_url(&server.uri()).await;

        assert_matches!(result, Err(WfsMapError::HttpStatus(503)));
    }
}
