//! Responses of the payout operations

use adysoap::{ErrorRule, GatewayResponse, ResponseParams, SoapResponse};
use once_cell::unsync::OnceCell;

const STORE_DETAIL_FIELDS: &[(&str, &str)] = &[
    ("psp_reference", "./payout:pspReference"),
    ("result_code", "./payout:resultCode"),
    ("recurring_detail_reference", "./payout:recurringDetailReference"),
];

const SUBMIT_FIELDS: &[(&str, &str)] = &[
    ("psp_reference", "./payout:pspReference"),
    ("refusal_reason", "./payout:refusalReason"),
    ("result_code", "./payout:resultCode"),
];

/// Result code of a stored detail
pub const STORE_DETAIL_SUCCESS: &str = "Success";

/// Result code of a payout accepted for processing
pub const SUBMIT_RECEIVED: &str = "[payout-submit-received]";

/// Reply to `storeDetail`
#[derive(Debug)]
pub struct StoreDetailResponse {
    soap: SoapResponse,
    params: OnceCell<ResponseParams>,
}

impl StoreDetailResponse {
    pub fn new(soap: SoapResponse) -> Self {
        Self {
            soap,
            params: OnceCell::new(),
        }
    }

    /// Alias of [`GatewayResponse::success`]
    pub fn detail_stored(&self) -> bool {
        self.success()
    }

    pub fn recurring_detail_reference(&self) -> &str {
        self.params().get("recurring_detail_reference")
    }

    /// The fault message of a rejected request, "" otherwise
    pub fn refusal_reason(&self) -> &str {
        self.params().get("refusal_reason")
    }
}

impl GatewayResponse for StoreDetailResponse {
    const BASE_XPATH: &'static str = "//payout:storeDetailResponse/payout:response";

    const ERRORS: &'static [ErrorRule] = &[
        ErrorRule::new(
            "validation 111 Invalid BankCountryCode specified",
            "country_code",
            "is not a valid country code",
        ),
        ErrorRule::new(
            "validation 161 Invalid iban",
            "iban",
            "is not a valid IBAN",
        ),
    ];

    fn soap(&self) -> &SoapResponse {
        &self.soap
    }

    fn params(&self) -> &ResponseParams {
        self.params.get_or_init(|| {
            let mut params = self.soap.extract(Self::BASE_XPATH, STORE_DETAIL_FIELDS);
            params.insert("refusal_reason", self.fault_message().unwrap_or_default());
            params
        })
    }

    fn is_parsed(&self) -> bool {
        self.params.get().is_some()
    }

    fn accepted(&self) -> bool {
        self.result_code() == STORE_DETAIL_SUCCESS
    }
}

/// Reply to `submit`
#[derive(Debug)]
pub struct SubmitResponse {
    soap: SoapResponse,
    params: OnceCell<ResponseParams>,
}

impl SubmitResponse {
    pub fn new(soap: SoapResponse) -> Self {
        Self {
            soap,
            params: OnceCell::new(),
        }
    }

    /// The gateway accepted the payout for processing
    ///
    /// The outcome itself arrives later as a notification.
    pub fn received(&self) -> bool {
        self.result_code() == SUBMIT_RECEIVED
    }

    pub fn refusal_reason(&self) -> &str {
        self.params().get("refusal_reason")
    }
}

impl GatewayResponse for SubmitResponse {
    const BASE_XPATH: &'static str = "//payout:submitResponse/payout:response";

    fn soap(&self) -> &SoapResponse {
        &self.soap
    }

    fn params(&self) -> &ResponseParams {
        self.params
            .get_or_init(|| self.soap.extract(Self::BASE_XPATH, SUBMIT_FIELDS))
    }

    fn is_parsed(&self) -> bool {
        self.params.get().is_some()
    }

    fn accepted(&self) -> bool {
        self.received()
    }
}
