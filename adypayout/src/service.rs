//! Payout webservice client
//!
//! One [`PayoutService`] is created with the parameters of the call it will
//! make, then `store_detail()` or `submit()` is invoked. Parameter errors are
//! returned before anything is sent; gateway and transport faults end up in
//! the returned response.
//!
//! ```rust,ignore
//! let service = PayoutService::new(settings, params, UreqTransport::new(settings.timeout));
//! let response = service.store_detail()?;
//! if response.detail_stored() {
//!     println!("stored as {}", response.recurring_detail_reference());
//! }
//! ```

use adysoap::{
    Credentials, Params, SoapRequest, SoapResponse, SoapTransport, wrap_in_envelope,
};
use tracing::{debug, info, warn};

use crate::config_ext::PayoutSettings;
use crate::error::Result;
use crate::request::{Operation, PayoutRequest};
use crate::response::{StoreDetailResponse, SubmitResponse};

#[derive(Debug)]
pub struct PayoutService<T: SoapTransport> {
    settings: PayoutSettings,
    request: PayoutRequest,
    transport: T,
}

impl<T: SoapTransport> PayoutService<T> {
    pub fn new(settings: PayoutSettings, params: Params, transport: T) -> Self {
        let request = PayoutRequest::new(params, settings.merchant_account.as_deref())
            .with_substitution(settings.substitution);
        Self {
            settings,
            request,
            transport,
        }
    }

    pub fn settings(&self) -> &PayoutSettings {
        &self.settings
    }

    pub fn request(&self) -> &PayoutRequest {
        &self.request
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn endpoint(&self) -> String {
        self.settings.endpoint()
    }

    /// Stores the shopper's bank details for later payouts
    pub fn store_detail(&self) -> Result<StoreDetailResponse> {
        let soap = self.call(Operation::StoreDetail)?;
        Ok(StoreDetailResponse::new(soap))
    }

    /// Submits a payout against a stored detail
    pub fn submit(&self) -> Result<SubmitResponse> {
        let soap = self.call(Operation::Submit)?;
        Ok(SubmitResponse::new(soap))
    }

    fn credentials(&self, operation: Operation) -> &Credentials {
        if operation.uses_payout_credentials() {
            &self.settings.payout_credentials
        } else {
            &self.settings.api_credentials
        }
    }

    fn call(&self, operation: Operation) -> Result<SoapResponse> {
        let body = self.request.build(operation).inspect_err(|err| {
            warn!(operation = %operation, error = %err, "Payout request not sent");
        })?;
        let envelope = wrap_in_envelope(&body)?;
        let endpoint = self.endpoint();
        let credentials = self.credentials(operation);

        info!(
            operation = %operation,
            endpoint = %endpoint,
            username = %credentials.username,
            "Calling payout service"
        );

        let outcome = self.transport.call(&SoapRequest {
            endpoint: &endpoint,
            action: operation.name(),
            body: &envelope,
            credentials,
        });

        let response = SoapResponse::new(operation.name(), outcome, self.settings.backend);
        debug!(
            operation = %operation,
            status = ?response.status(),
            "Payout service replied"
        );
        Ok(response)
    }
}
