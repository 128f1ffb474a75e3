//! XML fragments of the payout service requests

use adysoap::Template;

/// Operation element wrapping the request: operation, merchant account, content, operation
pub const LAYOUT: Template = Template::new(
    "layout",
    r#"<%s xmlns="http://payout.services.adyen.com">
  <request>
    <merchantAccount>%s</merchantAccount>
    %s
    </request>
</%s>
"#,
);

/// iban, bic, bank name, country code, owner name
pub const BANK: Template = Template::new(
    "bank",
    r#"<bank>
  <iban xmlns="http://payment.services.adyen.com">%s</iban>
  <bic xmlns="http://payment.services.adyen.com">%s</bic>
  <bankName xmlns="http://payment.services.adyen.com">%s</bankName>
  <countryCode xmlns="http://payment.services.adyen.com">%s</countryCode>
  <ownerName xmlns="http://payment.services.adyen.com">%s</ownerName>
</bank>
"#,
);

pub const ENABLE_RECURRING_PAYOUT_CONTRACT: Template = Template::new(
    "recurring_payout_contract",
    r#"<recurring>
  <contract xmlns="http://payment.services.adyen.com">PAYOUT</contract>
</recurring>
"#,
);

pub const SHOPPER_REFERENCE: Template =
    Template::new("shopper_reference", "<shopperReference>%s</shopperReference>");

pub const SHOPPER_EMAIL: Template = Template::new("shopper_email", "<shopperEmail>%s</shopperEmail>");

/// currency, value
pub const AMOUNT: Template = Template::new(
    "amount",
    r#"<amount>
  <currency xmlns="http://common.services.adyen.com">%s</currency>
  <value xmlns="http://common.services.adyen.com">%s</value>
</amount>
"#,
);

pub const REFERENCE: Template = Template::new("reference", "<reference>%s</reference>\n");

pub const RECURRING_DETAIL_REFERENCE: Template = Template::new(
    "recurring_detail_reference",
    "<selectedRecurringDetailReference>%s</selectedRecurringDetailReference>\n",
);

/// Partial rendering one shopper field, `None` for fields the service ignores
pub fn shopper_partial(field: &str) -> Option<Template> {
    match field {
        "reference" => Some(SHOPPER_REFERENCE),
        "email" => Some(SHOPPER_EMAIL),
        _ => None,
    }
}
