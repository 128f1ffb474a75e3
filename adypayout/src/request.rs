//! Request bodies of the payout operations
//!
//! A [`PayoutRequest`] owns the parameters of one call. Building a body first
//! validates them against the operation's rules, then renders the partials in
//! their fixed order inside the operation layout. Nothing here touches the
//! network.

use adysoap::{ParamValue, Params, Rule, Substitution, Template, validate};
use tracing::debug;

use crate::error::Result;
use crate::templates::{
    AMOUNT, BANK, ENABLE_RECURRING_PAYOUT_CONTRACT, LAYOUT, RECURRING_DETAIL_REFERENCE, REFERENCE,
    shopper_partial,
};

const BANK_FIELDS: &[&str] = &["iban", "bic", "bank_name", "country_code", "owner_name"];
const AMOUNT_FIELDS: &[&str] = &["currency", "value"];
const SHOPPER_FIELDS: &[&str] = &["email", "reference"];

const STORE_DETAIL_RULES: &[Rule] = &[
    Rule::Group("bank", BANK_FIELDS),
    Rule::Key("merchant_account"),
    Rule::Group("shopper", SHOPPER_FIELDS),
];

const SUBMIT_RULES: &[Rule] = &[
    Rule::Group("amount", AMOUNT_FIELDS),
    Rule::Key("reference"),
    Rule::Key("selected_recurring_detail_reference"),
    Rule::Key("merchant_account"),
    Rule::Group("shopper", SHOPPER_FIELDS),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Stores bank details and enables the recurring payout contract
    StoreDetail,
    /// Requests a payout against a stored detail
    Submit,
}

impl Operation {
    /// Action name, also the request root element
    pub fn name(&self) -> &'static str {
        match self {
            Operation::StoreDetail => "storeDetail",
            Operation::Submit => "submit",
        }
    }

    /// Requirements on the parameters, in the order they are checked
    pub fn rules(&self) -> &'static [Rule] {
        match self {
            Operation::StoreDetail => STORE_DETAIL_RULES,
            Operation::Submit => SUBMIT_RULES,
        }
    }

    /// `submit` authenticates with the dedicated payout account
    pub fn uses_payout_credentials(&self) -> bool {
        matches!(self, Operation::Submit)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone)]
pub struct PayoutRequest {
    params: Params,
    substitution: Substitution,
}

impl PayoutRequest {
    /// Takes the call parameters, filling `merchant_account` from
    /// `default_merchant_account` when the caller did not give one
    pub fn new(mut params: Params, default_merchant_account: Option<&str>) -> Self {
        if let Some(account) = default_merchant_account {
            if !params.contains_key("merchant_account") {
                params.insert("merchant_account", account);
            }
        }
        Self {
            params,
            substitution: Substitution::default(),
        }
    }

    pub fn with_substitution(mut self, substitution: Substitution) -> Self {
        self.substitution = substitution;
        self
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn substitution(&self) -> Substitution {
        self.substitution
    }

    /// Validates the parameters and renders the body of `operation`
    pub fn build(&self, operation: Operation) -> Result<String> {
        validate(&self.params, operation.rules())?;

        let mut content = String::new();
        match operation {
            Operation::StoreDetail => {
                content.push_str(&self.render_group(BANK, "bank", BANK_FIELDS)?);
                content.push_str(&ENABLE_RECURRING_PAYOUT_CONTRACT.render(&[])?);
            }
            Operation::Submit => {
                content.push_str(&self.render_group(AMOUNT, "amount", AMOUNT_FIELDS)?);
                content.push_str(&self.render_key(REFERENCE, "reference")?);
                content.push_str(&self.render_key(
                    RECURRING_DETAIL_REFERENCE,
                    "selected_recurring_detail_reference",
                )?);
                content.push_str(&ENABLE_RECURRING_PAYOUT_CONTRACT.render(&[])?);
            }
        }
        content.push_str(&self.shopper_content()?);

        let merchant_account = self.params.text("merchant_account").unwrap_or_default();
        let merchant_account = self.substitution.apply(merchant_account);
        let body = LAYOUT.render(&[
            operation.name(),
            merchant_account.as_ref(),
            content.as_str(),
            operation.name(),
        ])?;

        debug!(operation = %operation, bytes = body.len(), "Built payout request body");
        Ok(body)
    }

    pub fn store_detail_body(&self) -> Result<String> {
        self.build(Operation::StoreDetail)
    }

    pub fn submit_body(&self) -> Result<String> {
        self.build(Operation::Submit)
    }

    fn render_key(&self, template: Template, key: &str) -> Result<String> {
        let value = self.params.text(key).unwrap_or_default();
        Ok(template.render_with(&[value], self.substitution)?)
    }

    fn render_group(&self, template: Template, key: &str, fields: &[&str]) -> Result<String> {
        let values = self
            .params
            .group(key)
            .map(|group| group.values_at(fields))
            .unwrap_or_default();
        Ok(template.render_with(&values, self.substitution)?)
    }

    // in the caller's order; keys without a partial are skipped
    fn shopper_content(&self) -> Result<String> {
        let Some(shopper) = self.params.group("shopper") else {
            return Ok(String::new());
        };

        let mut parts = Vec::new();
        for (field, value) in shopper.iter() {
            let (Some(template), ParamValue::Text(value)) = (shopper_partial(field), value) else {
                continue;
            };
            parts.push(template.render_with(&[value.as_str()], self.substitution)?);
        }
        Ok(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PayoutError;

    fn shopper() -> Params {
        Params::new()
            .with("email", "s.hopper@example.com")
            .with("reference", "user-id")
    }

    fn store_detail_params() -> Params {
        Params::new().with("shopper", shopper()).with(
            "bank",
            Params::new()
                .with("iban", "NL48RABO0132394782")
                .with("bic", "RABONL2U")
                .with("bank_name", "Rabobank")
                .with("country_code", "NL")
                .with("owner_name", "Test Shopper"),
        )
    }

    #[test]
    fn test_store_detail_body_layout() {
        let request = PayoutRequest::new(store_detail_params(), Some("SuperShopper"));
        let body = request.store_detail_body().unwrap();

        assert!(body.starts_with("<storeDetail xmlns=\"http://payout.services.adyen.com\">\n"));
        assert!(body.ends_with("</storeDetail>\n"));
        assert!(body.contains("<merchantAccount>SuperShopper</merchantAccount>"));

        let bank = body.find("<bank>").unwrap();
        let recurring = body.find("<recurring>").unwrap();
        let shopper = body.find("<shopperEmail>").unwrap();
        assert!(bank < recurring && recurring < shopper);
        assert!(body.contains(
            "<shopperEmail>s.hopper@example.com</shopperEmail>\n<shopperReference>user-id</shopperReference>"
        ));
    }

    #[test]
    fn test_shopper_follows_caller_order() {
        let mut params = store_detail_params();
        params.insert(
            "shopper",
            Params::new()
                .with("reference", "user-id")
                .with("nickname", "shop")
                .with("email", "s.hopper@example.com"),
        );
        let body = PayoutRequest::new(params, Some("SuperShopper"))
            .store_detail_body()
            .unwrap();
        assert!(body.contains(
            "<shopperReference>user-id</shopperReference>\n<shopperEmail>s.hopper@example.com</shopperEmail>"
        ));
        assert!(!body.contains("shop<"));
    }

    #[test]
    fn test_caller_merchant_account_wins() {
        let params = store_detail_params().with("merchant_account", "OtherShop");
        let body = PayoutRequest::new(params, Some("SuperShopper"))
            .store_detail_body()
            .unwrap();
        assert!(body.contains("<merchantAccount>OtherShop</merchantAccount>"));
    }

    #[test]
    fn test_missing_merchant_account() {
        let err = PayoutRequest::new(store_detail_params(), None)
            .store_detail_body()
            .unwrap_err();
        assert!(matches!(err, PayoutError::Validation(ref e) if e.missing == "merchant_account"));
    }

    #[test]
    fn test_submit_content_order() {
        let params = Params::new()
            .with("reference", "PayoutPayment-0001")
            .with(
                "amount",
                Params::new().with("currency", "EUR").with("value", 1234u64),
            )
            .with("shopper", shopper())
            .with("selected_recurring_detail_reference", "LATEST");
        let body = PayoutRequest::new(params, Some("SuperShopper"))
            .submit_body()
            .unwrap();

        let positions: Vec<usize> = [
            "<merchantAccount>",
            "<amount>",
            "<reference>PayoutPayment-0001</reference>",
            "<selectedRecurringDetailReference>LATEST</selectedRecurringDetailReference>",
            "<recurring>",
            "<shopperEmail>",
        ]
        .iter()
        .map(|needle| body.find(needle).unwrap())
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(body.contains("<value xmlns=\"http://common.services.adyen.com\">1234</value>"));
    }

    #[test]
    fn test_escaped_substitution() {
        let mut params = store_detail_params();
        params
            .group_mut("bank")
            .unwrap()
            .insert("owner_name", "Fish & Chips");
        let request = PayoutRequest::new(params, Some("A&B"));

        let verbatim = request.store_detail_body().unwrap();
        assert!(verbatim.contains(">Fish & Chips</ownerName>"));

        let escaped = request
            .with_substitution(Substitution::Escaped)
            .store_detail_body()
            .unwrap();
        assert!(escaped.contains(">Fish &amp; Chips</ownerName>"));
        assert!(escaped.contains("<merchantAccount>A&amp;B</merchantAccount>"));
        assert!(escaped.contains("<bank>\n"));
    }

    #[test]
    fn test_operation_names() {
        assert_eq!(Operation::StoreDetail.to_string(), "storeDetail");
        assert_eq!(Operation::Submit.name(), "submit");
        assert!(Operation::Submit.uses_payout_credentials());
        assert!(!Operation::StoreDetail.uses_payout_credentials());
    }
}
