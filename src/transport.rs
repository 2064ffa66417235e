//! Wire encoding of request payloads and the HTTP transport.

use url::form_urlencoded;

/// Percent-encode `payload` as an `application/x-www-form-urlencoded` body.
pub fn encode_form(payload: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(payload)
        .finish()
}

#[cfg(feature = "http-transport")]
pub use http_transport::*;

#[cfg(feature = "http-transport")]
mod http_transport {
    use std::time::Duration;

    use http::{HeaderMap, HeaderName, HeaderValue, header::CONTENT_TYPE};
    use url::Url;

    use super::encode_form;
    use crate::{
        concepts::Transport,
        config::{Authentication, ClientConfig},
    };

    pub const API_KEY_HEADER: &str = "x-kount-api-key";
    const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

    /// Posts request payloads to RIS over HTTPS.
    #[derive(Debug, Clone)]
    pub struct HttpTransport {
        pub url: Url,
        pub client: reqwest::Client,
        pub headers: HeaderMap,
    }

    #[derive(Debug, thiserror::Error)]
    pub enum TransportError {
        #[error("HTTP request error: {0}")]
        HttpRequestError(#[from] reqwest::Error),
        #[error("Invalid header value: {0}")]
        InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
        #[error("RIS responded with status {status}: {body}")]
        UnexpectedStatus { status: u16, body: String },
    }

    impl HttpTransport {
        pub fn new(
            url: Url,
            authentication: &Authentication,
            connect_timeout: Duration,
        ) -> Result<Self, TransportError> {
            let mut headers = HeaderMap::new();
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));

            let mut builder = reqwest::Client::builder().connect_timeout(connect_timeout);
            match authentication {
                Authentication::ApiKey(key) => {
                    let mut value = HeaderValue::from_str(key)?;
                    value.set_sensitive(true);
                    headers.insert(HeaderName::from_static(API_KEY_HEADER), value);
                }
                Authentication::Certificate { pkcs12, password } => {
                    let identity = reqwest::Identity::from_pkcs12_der(pkcs12, password)?;
                    builder = builder.identity(identity);
                }
            }

            Ok(HttpTransport {
                url,
                client: builder.build()?,
                headers,
            })
        }

        pub fn from_config(config: &ClientConfig) -> Result<Self, TransportError> {
            Self::new(
                config.url.clone(),
                &config.authentication,
                config.connect_timeout,
            )
        }
    }

    impl Transport for HttpTransport {
        type Error = TransportError;

        async fn send(&self, payload: &[(String, String)]) -> Result<String, Self::Error> {
            #[cfg(feature = "tracing")]
            tracing::debug!("Posting {} fields to {}", payload.len(), self.url);

            let response = self
                .client
                .post(self.url.clone())
                .headers(self.headers.clone())
                .body(encode_form(payload))
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(TransportError::UnexpectedStatus {
                    status: status.as_u16(),
                    body,
                });
            }

            Ok(body)
        }
    }
}
