//! Common contract of gateway responses
//!
//! [`SoapResponse`] wraps what the transport returned and answers the
//! questions every operation shares (was there a fault, did HTTP fail).
//! Operation-specific responses implement [`GatewayResponse`]: they declare
//! their base XPath, the fields they extract and, through
//! [`GatewayResponse::accepted`], the result code they consider a success.

use indexmap::IndexMap;
use once_cell::unsync::OnceCell;
use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::{ErrorEntry, ErrorRule, classify};
use crate::querier::{XmlBackend, XmlQuerier};
use crate::transport::TransportOutcome;

const FAULT_STRING_XPATH: &str = "//soap:Fault/faultstring";
const FAULT_CODE_XPATH: &str = "//soap:Fault/faultcode";

/// Field name and its XPath relative to the operation's base path
pub type FieldSpec = (&'static str, &'static str);

/// Values extracted from a response, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResponseParams(IndexMap<String, String>);

impl ResponseParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `field`, "" when the field was not extracted
    pub fn get(&self, field: &str) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or_default()
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.0.insert(field.into(), value.into());
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<const N: usize> From<[(&str, &str); N]> for ResponseParams {
    fn from(pairs: [(&str, &str); N]) -> Self {
        let mut params = ResponseParams::new();
        for (k, v) in pairs {
            params.insert(k, v);
        }
        params
    }
}

/// Where a response stands once read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseState {
    /// Fields have not been extracted yet
    Unparsed,
    Success,
    /// Well-formed reply whose result code is not the expected one
    BusinessFailure,
    /// The gateway or the transport reported a fault
    Fault,
}

/// Raw reply of one call and the document parsed from it
#[derive(Debug)]
pub struct SoapResponse {
    action: String,
    status: Option<u16>,
    body: String,
    transport_error: Option<String>,
    document: Result<XmlQuerier, String>,
    fault: OnceCell<Option<String>>,
}

impl SoapResponse {
    pub fn new(action: &str, outcome: TransportOutcome, backend: XmlBackend) -> Self {
        let (status, body, transport_error) = match outcome {
            TransportOutcome::Delivered { status, body } => (Some(status), body, None),
            TransportOutcome::Failed { error } => (None, String::new(), Some(error)),
        };

        let document = if transport_error.is_some() {
            Err("no response body".to_string())
        } else {
            XmlQuerier::parse(&body, backend).map_err(|err| {
                warn!(action = %action, backend = backend.name(), error = %err, "Unparseable SOAP response");
                err.to_string()
            })
        };

        Self {
            action: action.to_string(),
            status,
            body,
            transport_error,
            document,
            fault: OnceCell::new(),
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    /// HTTP status, `None` when the transport failed before any reply
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn transport_error(&self) -> Option<&str> {
        self.transport_error.as_deref()
    }

    pub fn querier(&self) -> Option<&XmlQuerier> {
        self.document.as_ref().ok()
    }

    /// True unless an HTTP 2xx reply was received
    pub fn http_failure(&self) -> bool {
        !self.status.is_some_and(|s| (200..300).contains(&s))
    }

    /// True when the gateway answered with a `Server` fault code
    pub fn server_error(&self) -> bool {
        self.querier()
            .and_then(|q| q.text(FAULT_CODE_XPATH).ok())
            .is_some_and(|code| code == "Server" || code.ends_with(":Server"))
    }

    /// The fault reported for this call, computed once
    ///
    /// In order of precedence: the SOAP `faultstring`, the transport error,
    /// the reason the body could not be parsed, then the HTTP status of a
    /// non-2xx reply.
    pub fn fault_message(&self) -> Option<&str> {
        self.fault.get_or_init(|| self.compute_fault()).as_deref()
    }

    fn compute_fault(&self) -> Option<String> {
        let fault_string = self
            .querier()
            .and_then(|q| q.text(FAULT_STRING_XPATH).ok())
            .filter(|s| !s.is_empty());

        let fault = fault_string
            .or_else(|| self.transport_error.clone())
            .or_else(|| match (&self.document, self.status) {
                (Err(err), Some(_)) => Some(format!("invalid response XML: {}", err)),
                _ => None,
            })
            .or_else(|| match self.status {
                Some(status) if self.http_failure() => {
                    Some(format!("HTTP status {}", status))
                }
                _ => None,
            });

        if let Some(fault) = &fault {
            debug!(action = %self.action, fault = %fault, "Gateway fault");
            if self.server_error() {
                warn!(action = %self.action, fault = %fault, "Gateway reported a server error");
            }
        }
        fault
    }

    /// Extracts `fields` relative to every node matching `base_xpath`
    ///
    /// Absent nodes, a missing base node and an unparsed document all give
    /// empty strings.
    pub fn extract(&self, base_xpath: &str, fields: &[FieldSpec]) -> ResponseParams {
        let mut params = ResponseParams::new();
        let base = self.querier().map(|q| q.xpath(base_xpath));

        for (name, xpath) in fields {
            let value = match &base {
                Some(Ok(nodes)) => nodes.text_at(xpath).unwrap_or_else(|err| {
                    warn!(action = %self.action, field = *name, error = %err, "Invalid field expression");
                    String::new()
                }),
                Some(Err(err)) => {
                    warn!(action = %self.action, error = %err, "Invalid base expression");
                    String::new()
                }
                None => String::new(),
            };
            params.insert(*name, value);
        }
        params
    }
}

/// Interface shared by every operation response
pub trait GatewayResponse {
    /// Path of the operation's response element
    const BASE_XPATH: &'static str;

    /// Known fault messages for this operation
    const ERRORS: &'static [ErrorRule] = &[];

    fn soap(&self) -> &SoapResponse;

    /// Extracted fields, computed on first access and reused afterwards
    fn params(&self) -> &ResponseParams;

    /// Whether [`GatewayResponse::params`] has been computed yet
    fn is_parsed(&self) -> bool;

    /// Operation-specific success condition on top of the base one
    fn accepted(&self) -> bool {
        true
    }

    fn fault_message(&self) -> Option<&str> {
        self.soap().fault_message()
    }

    /// The request was rejected before normal processing
    fn invalid_request(&self) -> bool {
        self.fault_message().is_some()
    }

    fn http_failure(&self) -> bool {
        self.soap().http_failure()
    }

    fn server_error(&self) -> bool {
        self.soap().server_error()
    }

    fn success(&self) -> bool {
        !self.invalid_request() && !self.http_failure() && self.accepted()
    }

    /// Attribute-scoped error describing why the call failed
    fn error(&self, prefix: Option<&str>) -> ErrorEntry {
        classify(Self::ERRORS, self.fault_message(), prefix)
    }

    fn psp_reference(&self) -> &str {
        self.params().get("psp_reference")
    }

    fn result_code(&self) -> &str {
        self.params().get("result_code")
    }

    fn state(&self) -> ResponseState {
        if !self.is_parsed() {
            ResponseState::Unparsed
        } else if self.invalid_request() {
            ResponseState::Fault
        } else if self.success() {
            ResponseState::Success
        } else {
            ResponseState::BusinessFailure
        }
    }
}
