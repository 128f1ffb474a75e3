//! Transport contract and the blocking HTTP implementation
//!
//! The core only talks to a [`SoapTransport`]: it hands over the endpoint, the
//! action name, the enveloped body and the credentials, and receives either the
//! raw reply (whatever its HTTP status) or a connection-level failure. Nothing
//! here retries.

use base64::Engine;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use ureq::Agent;

/// Basic-auth identity for the webservice
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Value of the `Authorization` header
    pub fn basic_auth_header(&self) -> String {
        let token = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", self.username, self.password));
        format!("Basic {}", token)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// One call handed to a transport
#[derive(Debug, Clone, Copy)]
pub struct SoapRequest<'a> {
    pub endpoint: &'a str,
    pub action: &'a str,
    pub body: &'a str,
    pub credentials: &'a Credentials,
}

/// What came back from a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOutcome {
    /// An HTTP reply was received; the body is read whatever the status
    Delivered { status: u16, body: String },
    /// No usable reply (connection refused, timeout, unreadable body)
    Failed { error: String },
}

impl TransportOutcome {
    pub fn is_http_success(&self) -> bool {
        matches!(self, TransportOutcome::Delivered { status, .. } if (200..300).contains(status))
    }
}

pub trait SoapTransport {
    fn call(&self, request: &SoapRequest<'_>) -> TransportOutcome;
}

impl<T: SoapTransport + ?Sized> SoapTransport for &T {
    fn call(&self, request: &SoapRequest<'_>) -> TransportOutcome {
        (**self).call(request)
    }
}

impl<T: SoapTransport + ?Sized> SoapTransport for Box<T> {
    fn call(&self, request: &SoapRequest<'_>) -> TransportOutcome {
        (**self).call(request)
    }
}

impl<T: SoapTransport + ?Sized> SoapTransport for Arc<T> {
    fn call(&self, request: &SoapRequest<'_>) -> TransportOutcome {
        (**self).call(request)
    }
}

/// HTTPS transport built on `ureq`
///
/// 4xx/5xx replies are not turned into errors so that SOAP faults, which the
/// gateway sends with status 500, can still be read.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build();

        Self {
            agent: config.into(),
        }
    }
}

impl SoapTransport for UreqTransport {
    fn call(&self, request: &SoapRequest<'_>) -> TransportOutcome {
        debug!(
            action = %request.action,
            endpoint = %request.endpoint,
            bytes = request.body.len(),
            "Sending SOAP request"
        );

        let response = self
            .agent
            .post(request.endpoint)
            .header("Accept", "text/xml")
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", request.action)
            .header("Authorization", &request.credentials.basic_auth_header())
            .send(request.body);

        let mut response = match response {
            Ok(response) => response,
            Err(err) => {
                warn!(action = %request.action, error = %err, "SOAP request failed");
                return TransportOutcome::Failed {
                    error: err.to_string(),
                };
            }
        };

        let status = response.status().as_u16();
        match response.body_mut().read_to_string() {
            Ok(body) => {
                debug!(action = %request.action, status, "SOAP response received");
                TransportOutcome::Delivered { status, body }
            }
            Err(err) => {
                warn!(action = %request.action, status, error = %err, "Failed to read SOAP response body");
                TransportOutcome::Failed {
                    error: format!("failed to read response body: {}", err),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_auth_header() {
        let credentials = Credentials::new("Aladdin", "open sesame");
        assert_eq!(
            credentials.basic_auth_header(),
            "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ=="
        );
    }

    #[test]
    fn test_password_is_not_printed() {
        let credentials = Credentials::new("ws@Company.Shop", "hunter2");
        let printed = format!("{:?}", credentials);
        assert!(printed.contains("ws@Company.Shop"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_http_success() {
        let ok = TransportOutcome::Delivered {
            status: 200,
            body: String::new(),
        };
        let fault = TransportOutcome::Delivered {
            status: 500,
            body: String::new(),
        };
        let failed = TransportOutcome::Failed {
            error: "connection refused".into(),
        };
        assert!(ok.is_http_success());
        assert!(!fault.is_http_success());
        assert!(!failed.is_http_success());
    }
}
