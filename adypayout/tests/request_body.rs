mod common;

use adypayout::{Operation, PayoutError, PayoutRequest};
use adysoap::{ParamValue, Params, XmlBackend, XmlQuerier};
use common::{store_detail_params, submit_params};

fn request(params: Params) -> PayoutRequest {
    PayoutRequest::new(params, Some("SuperShopper"))
}

fn assert_payout_request(querier: &XmlQuerier, base_path: &str) {
    let base = querier.xpath(base_path).unwrap();
    assert_eq!(base.len(), 1);
    assert_eq!(base.text_at("./payout:merchantAccount").unwrap(), "SuperShopper");
    assert_eq!(base.text_at("./payout:shopperReference").unwrap(), "user-id");
    assert_eq!(
        base.text_at("./payout:shopperEmail").unwrap(),
        "s.hopper@example.com"
    );
    assert_eq!(
        base.text_at("./payout:recurring/payment:contract").unwrap(),
        "PAYOUT"
    );
}

#[test]
fn test_store_detail_body() {
    let body = request(store_detail_params()).store_detail_body().unwrap();

    for backend in XmlBackend::ALL {
        let querier = XmlQuerier::parse(&body, backend).unwrap();
        assert!(!querier.xpath("/payout:storeDetail").unwrap().is_empty());
        assert_payout_request(&querier, "//payout:storeDetail/payout:request");

        let bank = querier
            .xpath("//payout:storeDetail/payout:request/payout:bank")
            .unwrap();
        assert_eq!(bank.text_at("./payment:iban").unwrap(), "NL48RABO0132394782");
        assert_eq!(bank.text_at("./payment:bic").unwrap(), "RABONL2U");
        assert_eq!(bank.text_at("./payment:bankName").unwrap(), "Rabobank");
        assert_eq!(bank.text_at("./payment:countryCode").unwrap(), "NL");
        assert_eq!(bank.text_at("./payment:ownerName").unwrap(), "Test Shopper");
    }
}

#[test]
fn test_submit_body() {
    let body = request(submit_params()).submit_body().unwrap();

    for backend in XmlBackend::ALL {
        let querier = XmlQuerier::parse(&body, backend).unwrap();
        assert!(!querier.xpath("/payout:submit").unwrap().is_empty());
        assert_payout_request(&querier, "//payout:submit/payout:request");

        let base = querier.xpath("//payout:submit/payout:request").unwrap();
        assert_eq!(base.text_at("./payout:amount/common:currency").unwrap(), "EUR");
        assert_eq!(base.text_at("./payout:amount/common:value").unwrap(), "1234");
        assert_eq!(
            base.text_at("./payout:reference").unwrap(),
            "PayoutPayment-0001"
        );
        assert_eq!(
            base.text_at("./payout:selectedRecurringDetailReference").unwrap(),
            "LATEST"
        );
    }
}

#[test]
fn test_building_is_repeatable() {
    let request = request(store_detail_params());
    assert_eq!(
        request.store_detail_body().unwrap(),
        request.store_detail_body().unwrap()
    );
}

fn missing(params: Params, operation: Operation) -> String {
    match PayoutRequest::new(params, None).build(operation) {
        Err(PayoutError::Validation(err)) => err.missing,
        other => panic!("expected a validation error, got {:?}", other),
    }
}

fn without(mut params: Params, path: &str) -> Params {
    match path.split_once('.') {
        Some((group, key)) => {
            params.group_mut(group).unwrap().remove(key);
        }
        None => {
            params.remove(path);
        }
    }
    params
}

fn blanked(mut params: Params, path: &str) -> Params {
    let (group, key) = path.split_once('.').unwrap();
    params.group_mut(group).unwrap().insert(key, "   ");
    params
}

#[test]
fn test_store_detail_validates_every_parameter() {
    let complete = store_detail_params().with("merchant_account", "SuperShopper");
    for path in [
        "bank.iban",
        "bank.bic",
        "bank.bank_name",
        "bank.country_code",
        "bank.owner_name",
        "merchant_account",
        "shopper.email",
        "shopper.reference",
    ] {
        assert_eq!(
            missing(without(complete.clone(), path), Operation::StoreDetail),
            path
        );
    }
}

#[test]
fn test_submit_validates_every_parameter() {
    let complete = submit_params().with("merchant_account", "SuperShopper");
    for path in [
        "amount.currency",
        "amount.value",
        "reference",
        "selected_recurring_detail_reference",
        "merchant_account",
        "shopper.email",
        "shopper.reference",
    ] {
        assert_eq!(
            missing(without(complete.clone(), path), Operation::Submit),
            path
        );
    }
}

#[test]
fn test_blank_values_are_missing() {
    let complete = store_detail_params().with("merchant_account", "SuperShopper");
    for path in ["shopper.email", "shopper.reference", "bank.iban"] {
        assert_eq!(
            missing(blanked(complete.clone(), path), Operation::StoreDetail),
            path
        );
    }
}

#[test]
fn test_missing_or_scalar_group() {
    let complete = store_detail_params().with("merchant_account", "SuperShopper");
    assert_eq!(
        missing(without(complete.clone(), "shopper"), Operation::StoreDetail),
        "shopper"
    );

    let mut scalar = complete.clone();
    scalar.insert("shopper", ParamValue::Text("user-id".into()));
    assert_eq!(missing(scalar, Operation::StoreDetail), "shopper");

    let mut empty = complete;
    empty.insert("shopper", Params::new());
    assert_eq!(missing(empty, Operation::StoreDetail), "shopper.email");
}

#[test]
fn test_first_failing_rule_is_reported() {
    // bank is checked before the merchant account and the shopper
    let params = Params::new().with("bank", Params::new().with("iban", "NL48RABO0132394782"));
    assert_eq!(missing(params, Operation::StoreDetail), "bank.bic");

    // amount comes first for submit
    let params = without(submit_params(), "reference");
    let params = without(params, "amount.value");
    assert_eq!(missing(params, Operation::Submit), "amount.value");
}

#[test]
fn test_parameters_from_json() {
    let json = serde_json::json!({
        "reference": "PayoutPayment-0001",
        "amount": { "currency": "EUR", "value": 1234 },
        "shopper": { "email": "s.hopper@example.com", "reference": "user-id" },
        "selected_recurring_detail_reference": "LATEST",
        "unused": null
    });
    let params = Params::from_json(&json).unwrap();
    assert!(!params.contains_key("unused"));

    let body = request(params).submit_body().unwrap();
    assert!(body.contains("<value xmlns=\"http://common.services.adyen.com\">1234</value>"));
}
