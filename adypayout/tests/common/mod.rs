#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;

use adyconfig::Environment;
use adypayout::PayoutSettings;
use adysoap::{Credentials, Params, SoapRequest, SoapTransport, TransportOutcome, XmlBackend};

pub const STORE_DETAIL_RESPONSE: &str = include_str!("../fixtures/store_detail_response.xml");
pub const STORE_DETAIL_INVALID_RESPONSE: &str =
    include_str!("../fixtures/store_detail_invalid_response.xml");
pub const SUBMIT_RESPONSE: &str = include_str!("../fixtures/submit_response.xml");
pub const SUBMIT_INVALID_RESPONSE: &str = include_str!("../fixtures/submit_invalid_response.xml");

const STORE_DETAIL_PARAMS: &str = include_str!("../fixtures/store_detail_params.yaml");
const SUBMIT_PARAMS: &str = include_str!("../fixtures/submit_params.yaml");

/// A call as the transport saw it
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub endpoint: String,
    pub action: String,
    pub body: String,
    pub username: String,
    pub authorization: String,
}

/// Transport replaying canned outcomes and recording every call
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    outcomes: RefCell<VecDeque<TransportOutcome>>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl ScriptedTransport {
    pub fn replying(status: u16, body: &str) -> Self {
        let transport = Self::default();
        transport.push(TransportOutcome::Delivered {
            status,
            body: body.to_string(),
        });
        transport
    }

    pub fn failing(error: &str) -> Self {
        let transport = Self::default();
        transport.push(TransportOutcome::Failed {
            error: error.to_string(),
        });
        transport
    }

    pub fn push(&self, outcome: TransportOutcome) {
        self.outcomes.borrow_mut().push_back(outcome);
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }
}

impl SoapTransport for ScriptedTransport {
    fn call(&self, request: &SoapRequest<'_>) -> TransportOutcome {
        self.calls.borrow_mut().push(RecordedCall {
            endpoint: request.endpoint.to_string(),
            action: request.action.to_string(),
            body: request.body.to_string(),
            username: request.credentials.username.clone(),
            authorization: request.credentials.basic_auth_header(),
        });
        self.outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or(TransportOutcome::Failed {
                error: "no scripted reply".to_string(),
            })
    }
}

/// Fills the `%s` of an invalid-response fixture with a fault message
pub fn with_fault(template: &str, fault: &str) -> String {
    template.replacen("%s", fault, 1)
}

pub fn settings(backend: XmlBackend) -> PayoutSettings {
    PayoutSettings::new(
        Environment::Test,
        Credentials::new("ws@Company.SuperShopper", "secret"),
        Credentials::new("storePayout@Company.SuperShopper", "payout-secret"),
    )
    .with_merchant_account("SuperShopper")
    .with_backend(backend)
}

fn load_params(yaml: &str) -> Params {
    let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
    Params::from_yaml(&value).unwrap()
}

pub fn store_detail_params() -> Params {
    load_params(STORE_DETAIL_PARAMS)
}

pub fn submit_params() -> Params {
    load_params(SUBMIT_PARAMS)
}
