//! # adysoap - SOAP plumbing for the payment gateway webservices
//!
//! Building blocks shared by the gateway service clients:
//!
//! - [`params`] : nested call parameters and their declarative validation
//! - [`template`] : positional `%s` templates used to assemble request bodies
//! - [`envelope`] : SOAP envelope and the gateway namespaces
//! - [`transport`] : the transport contract and a blocking HTTPS implementation
//! - [`querier`] : namespace-aware XPath queries over response documents,
//!   with two interchangeable XML backends
//! - [`response`] : the contract every operation response implements
//! - [`errors`] : mapping of fault messages to attribute errors
//!
//! ## Example
//!
//! ```ignore
//! use adysoap::{Params, Rule, validate};
//!
//! let params = Params::new().with("reference", "order-42");
//! validate(&params, &[Rule::Key("reference")])?;
//! ```

pub mod envelope;
pub mod error;
pub mod errors;
pub mod params;
pub mod querier;
pub mod response;
pub mod template;
pub mod transport;

pub use envelope::{NAMESPACES, wrap_in_envelope};
pub use error::SoapError;
pub use errors::{ErrorEntry, ErrorRule, classify};
pub use params::{ParamValue, Params, ParamsError, Rule, ValidationError, validate};
pub use querier::{NodeSet, XmlBackend, XmlNode, XmlQuerier};
pub use response::{FieldSpec, GatewayResponse, ResponseParams, ResponseState, SoapResponse};
pub use template::{Substitution, Template, TemplateError};
pub use transport::{Credentials, SoapRequest, SoapTransport, TransportOutcome, UreqTransport};
