use crate::{
    concepts::{TokenHasher, Transport},
    errors::Error,
    request::Request,
    response::RisResponse,
};

/// Validates requests, sends them through a [`Transport`] and parses the reply.
#[derive(Debug, Clone)]
pub struct RisClient<T: Transport> {
    pub transport: T,
    /// Refuse to send requests that fail validation.
    pub strict_validation: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ClientError<E: std::error::Error> {
    #[error("Request error: {0}")]
    RequestError(#[from] Error),
    #[error("Transport error: {0}")]
    TransportError(E),
}

impl<T: Transport> RisClient<T> {
    pub fn new(transport: T) -> Self {
        RisClient {
            transport,
            strict_validation: true,
        }
    }

    pub fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }

    /// Validate and submit `request`.
    ///
    /// In strict mode validation errors abort before anything is sent; otherwise
    /// they are logged and the request goes out as is.
    pub async fn process<H: TokenHasher>(
        &self,
        request: &Request<H>,
    ) -> Result<RisResponse, ClientError<T::Error>> {
        let errors = request.validate(self.strict_validation)?;

        #[cfg(feature = "tracing")]
        for error in &errors {
            tracing::warn!("Sending request despite validation error: {}", error);
        }
        #[cfg(not(feature = "tracing"))]
        let _ = errors;

        let body = self
            .transport
            .send(&request.to_payload())
            .await
            .map_err(ClientError::TransportError)?;

        let response = RisResponse::parse(&body);

        #[cfg(feature = "tracing")]
        tracing::debug!(
            "RIS response: mode={:?}, auto={:?}, errors={}",
            response.mode(),
            response.auto(),
            response.errors().len()
        );

        Ok(response)
    }
}

#[cfg(feature = "http-transport")]
impl RisClient<crate::transport::HttpTransport> {
    pub fn from_config(
        config: &crate::config::ClientConfig,
    ) -> Result<Self, crate::transport::TransportError> {
        Ok(RisClient::new(crate::transport::HttpTransport::from_config(config)?)
            .with_strict_validation(config.strict_validation))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{request::CartItem, validator::ValidationErrorKind};

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Refused;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<Vec<(String, String)>>>,
        fail: bool,
    }

    impl Transport for RecordingTransport {
        type Error = Refused;

        async fn send(&self, payload: &[(String, String)]) -> Result<String, Self::Error> {
            if self.fail {
                return Err(Refused);
            }
            self.sent.lock().unwrap().push(payload.to_vec());
            Ok("MODE=Q\nAUTO=A\nSCOR=12\n".to_string())
        }
    }

    fn complete_request() -> Request {
        let mut request = Request::with_khash("999666", "secret");
        request
            .set_mode('Q')
            .set_session_id("abc123")
            .set_merchant_acknowledgment(true)
            .set_authorization_status('A')
            .set_email("buyer@example.com")
            .set_total(1500)
            .set_currency("USD")
            .set_ip_address("192.168.0.10".parse().unwrap())
            .set_card_payment("4111111111111111")
            .set_cart(&[CartItem::builder()
                .product_type("BOOKS")
                .item_name("ISBN-123")
                .quantity(1)
                .price(1500)
                .build()]);
        request
    }

    #[tokio::test]
    async fn test_process_sends_valid_request() {
        let client = RisClient::new(RecordingTransport::default());
        let response = client.process(&complete_request()).await.unwrap();

        assert_eq!(response.score(), Some(12));
        let sent = client.transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains(&("PTYP".to_string(), "CARD".to_string())));
    }

    #[tokio::test]
    async fn test_strict_validation_blocks_send() {
        let client = RisClient::new(RecordingTransport::default());
        let mut request = complete_request();
        request.remove_parameter("SESS").unwrap();

        let err = client.process(&request).await.unwrap_err();
        match err {
            ClientError::RequestError(Error::Validation(report)) => {
                assert_eq!(report.errors().len(), 1);
                assert_eq!(report.errors()[0].field, "SESS");
                assert_eq!(report.errors()[0].kind, ValidationErrorKind::Missing);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(client.transport.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_advisory_validation_still_sends() {
        let client = RisClient::new(RecordingTransport::default()).with_strict_validation(false);
        let mut request = complete_request();
        request.remove_parameter("SESS").unwrap();

        assert!(client.process(&request).await.is_ok());
        assert_eq!(client.transport.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_surfaced() {
        let client = RisClient::new(RecordingTransport {
            fail: true,
            ..Default::default()
        });
        assert!(matches!(
            client.process(&complete_request()).await,
            Err(ClientError::TransportError(Refused))
        ));
    }
}
