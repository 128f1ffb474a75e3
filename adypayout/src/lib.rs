//! # adypayout - Client for the gateway payout webservice
//!
//! Two operations are available:
//!
//! - `storeDetail` : registers a shopper's bank account and enables the
//!   recurring `PAYOUT` contract on it
//! - `submit` : requests a payout to a previously stored account, using the
//!   dedicated payout credentials
//!
//! ## Usage
//!
//! ```rust,ignore
//! use adyconfig::Config;
//! use adypayout::{PayoutService, PayoutSettings};
//! use adysoap::{GatewayResponse, Params, UreqTransport};
//!
//! let config = Config::load_config("")?;
//! let settings = PayoutSettings::from_config(&config)?;
//! let transport = UreqTransport::new(settings.timeout);
//!
//! let params = Params::new()
//!     .with("reference", "PayoutPayment-0001")
//!     .with("selected_recurring_detail_reference", "LATEST")
//!     .with("amount", Params::new().with("currency", "EUR").with("value", "1234"))
//!     .with("shopper", Params::new().with("email", "s.hopper@example.com").with("reference", "user-id"));
//!
//! let response = PayoutService::new(settings, params, transport).submit()?;
//! if !response.success() {
//!     let error = response.error(None);
//!     eprintln!("{}", error);
//! }
//! ```

pub mod config_ext;
pub mod error;
pub mod request;
pub mod response;
pub mod service;
pub mod templates;

pub use config_ext::{PayoutConfigExt, PayoutSettings};
pub use error::{PayoutError, Result};
pub use request::{Operation, PayoutRequest};
pub use response::{StoreDetailResponse, SubmitResponse};
pub use service::PayoutService;
