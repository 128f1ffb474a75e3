use thiserror::Error;

/// Errors raised while reading a gateway response document
#[derive(Debug, Error)]
pub enum SoapError {
    #[error("XML parse error: {0}")]
    XmlTree(#[from] xmltree::ParseError),

    #[error("XML parse error: {0}")]
    QuickXml(#[from] quick_xml::Error),

    #[error("Malformed XML: {0}")]
    Malformed(String),

    #[error("Empty XML document")]
    EmptyDocument,

    #[error("Invalid XPath expression `{0}`")]
    InvalidXPath(String),

    #[error("Unknown namespace prefix `{prefix}` in `{expression}`")]
    UnknownPrefix { prefix: String, expression: String },
}

impl SoapError {
    pub fn malformed(message: impl Into<String>) -> Self {
        SoapError::Malformed(message.into())
    }
}
