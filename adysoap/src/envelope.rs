//! SOAP envelope and the namespaces shared by every gateway service

use crate::template::{Template, TemplateError};

pub const SOAP_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const PAYMENT_NS: &str = "http://payment.services.adyen.com";
pub const RECURRING_NS: &str = "http://recurring.services.adyen.com";
pub const PAYOUT_NS: &str = "http://payout.services.adyen.com";
pub const COMMON_NS: &str = "http://common.services.adyen.com";
pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Prefixes usable in XPath expressions against gateway documents
pub const NAMESPACES: &[(&str, &str)] = &[
    ("soap", SOAP_NS),
    ("payment", PAYMENT_NS),
    ("recurring", RECURRING_NS),
    ("payout", PAYOUT_NS),
    ("xsi", XSI_NS),
    ("common", COMMON_NS),
];

const ENVELOPE: Template = Template::new(
    "envelope",
    r#"<?xml version="1.0"?>
<soap:Envelope xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/" xmlns:xsd="http://www.w3.org/2001/XMLSchema" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">
  <soap:Body>
    %s
  </soap:Body>
</soap:Envelope>
"#,
);

/// Wraps an operation body in a SOAP envelope
pub fn wrap_in_envelope(body: &str) -> Result<String, TemplateError> {
    ENVELOPE.render(&[body])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_in_envelope() {
        let xml = wrap_in_envelope("<storeDetail/>").unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\"?>"));
        assert!(xml.contains("<soap:Body>\n    <storeDetail/>\n  </soap:Body>"));
        assert!(xml.contains(r#"xmlns:soap="http://schemas.xmlsoap.org/soap/envelope/""#));
    }

    #[test]
    fn test_prefixes_are_unique() {
        for (i, (prefix, _)) in NAMESPACES.iter().enumerate() {
            assert!(NAMESPACES[i + 1..].iter().all(|(p, _)| p != prefix));
        }
    }
}
