//! Call parameters and their declarative validation
//!
//! A [`Params`] set is the nested mapping a caller hands to a request builder.
//! Each operation declares the shape it requires as a list of [`Rule`]s, and
//! [`validate`] checks the set against them before any XML is produced.

use indexmap::IndexMap;
use thiserror::Error;

/// A parameter value: a scalar, or a nested group of parameters
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Text(String),
    Group(Params),
}

impl ParamValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            ParamValue::Group(_) => None,
        }
    }

    pub fn as_group(&self) -> Option<&Params> {
        match self {
            ParamValue::Group(g) => Some(g),
            ParamValue::Text(_) => None,
        }
    }

    /// Absent, empty and whitespace-only text all count as missing
    pub fn is_blank(&self) -> bool {
        match self {
            ParamValue::Text(s) => s.trim().is_empty(),
            ParamValue::Group(g) => g.is_empty(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::Text(value)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Text(value.to_string())
    }
}

impl From<Params> for ParamValue {
    fn from(value: Params) -> Self {
        ParamValue::Group(value)
    }
}

/// Ordered mapping from parameter name to value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(IndexMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Inserts or replaces a value; a replaced key keeps its position
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<ParamValue> {
        self.0.shift_remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut ParamValue> {
        self.0.get_mut(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(ParamValue::as_text)
    }

    pub fn group(&self, key: &str) -> Option<&Params> {
        self.get(key).and_then(ParamValue::as_group)
    }

    pub fn group_mut(&mut self, key: &str) -> Option<&mut Params> {
        match self.0.get_mut(key) {
            Some(ParamValue::Group(g)) => Some(g),
            _ => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Text values for `keys`, in the order given; missing keys yield ""
    pub fn values_at<'a>(&'a self, keys: &[&str]) -> Vec<&'a str> {
        keys.iter()
            .map(|key| self.text(key).unwrap_or_default())
            .collect()
    }

    /// Builds a parameter set from a YAML mapping
    ///
    /// Scalars become text, mappings become groups and `null` entries are
    /// skipped. Sequences are rejected.
    pub fn from_yaml(value: &serde_yaml::Value) -> Result<Self, ParamsError> {
        use serde_yaml::Value;

        let Value::Mapping(map) = value else {
            return Err(ParamsError::NotAMapping);
        };

        let mut params = Params::new();
        for (k, v) in map {
            let key = match k {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return Err(ParamsError::InvalidKey(format!("{:?}", k))),
            };
            let value = match v {
                Value::Null => continue,
                Value::String(s) => ParamValue::Text(s.clone()),
                Value::Number(n) => ParamValue::Text(n.to_string()),
                Value::Bool(b) => ParamValue::Text(b.to_string()),
                Value::Mapping(_) => ParamValue::Group(Params::from_yaml(v)?),
                Value::Sequence(_) | Value::Tagged(_) => {
                    return Err(ParamsError::UnsupportedValue(key));
                }
            };
            params.insert(key, value);
        }
        Ok(params)
    }

    /// Builds a parameter set from a JSON object, with the same rules as
    /// [`Params::from_yaml`]
    pub fn from_json(value: &serde_json::Value) -> Result<Self, ParamsError> {
        use serde_json::Value;

        let Value::Object(map) = value else {
            return Err(ParamsError::NotAMapping);
        };

        let mut params = Params::new();
        for (key, v) in map {
            let value = match v {
                Value::Null => continue,
                Value::String(s) => ParamValue::Text(s.clone()),
                Value::Number(n) => ParamValue::Text(n.to_string()),
                Value::Bool(b) => ParamValue::Text(b.to_string()),
                Value::Object(_) => ParamValue::Group(Params::from_json(v)?),
                Value::Array(_) => return Err(ParamsError::UnsupportedValue(key.clone())),
            };
            params.insert(key.clone(), value);
        }
        Ok(params)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParamsError {
    #[error("parameters must be a mapping")]
    NotAMapping,
    #[error("invalid parameter key {0}")]
    InvalidKey(String),
    #[error("unsupported value for parameter `{0}`")]
    UnsupportedValue(String),
}

/// One requirement on a parameter set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// The key must be present and non-empty
    Key(&'static str),
    /// The key must be a group holding every listed, non-empty sub-key
    Group(&'static str, &'static [&'static str]),
}

/// A required parameter was absent or empty
///
/// `missing` is the dotted path of the first failing rule (`bank.iban`).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("the required parameter `{missing}' is missing")]
pub struct ValidationError {
    pub missing: String,
}

impl ValidationError {
    fn missing(path: impl Into<String>) -> Self {
        Self {
            missing: path.into(),
        }
    }
}

fn is_present(value: Option<&ParamValue>) -> bool {
    value.is_some_and(|v| !v.is_blank())
}

/// Checks `params` against `rules` in declaration order
///
/// Stops at the first violation.
pub fn validate(params: &Params, rules: &[Rule]) -> Result<(), ValidationError> {
    for rule in rules {
        match *rule {
            Rule::Key(key) => {
                if !is_present(params.get(key)) {
                    return Err(ValidationError::missing(key));
                }
            }
            Rule::Group(key, sub_keys) => {
                // an empty mapping passes and reports its first sub-key
                let Some(group) = params.group(key) else {
                    return Err(ValidationError::missing(key));
                };
                for sub_key in sub_keys {
                    if !is_present(group.get(sub_key)) {
                        return Err(ValidationError::missing(format!("{key}.{sub_key}")));
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RULES: &[Rule] = &[
        Rule::Key("merchant_account"),
        Rule::Group("shopper", &["email", "reference"]),
    ];

    fn valid_params() -> Params {
        Params::new().with("merchant_account", "SuperShopper").with(
            "shopper",
            Params::new()
                .with("email", "s.hopper@example.com")
                .with("reference", "user-id"),
        )
    }

    #[test]
    fn test_valid_params_pass() {
        assert_eq!(validate(&valid_params(), RULES), Ok(()));
    }

    #[test]
    fn test_missing_key() {
        let mut params = valid_params();
        params.remove("merchant_account");
        assert_eq!(
            validate(&params, RULES).unwrap_err().missing,
            "merchant_account"
        );
    }

    #[test]
    fn test_empty_and_blank_strings_are_missing() {
        let mut params = valid_params();
        params.insert("merchant_account", "");
        assert!(validate(&params, RULES).is_err());

        params.insert("merchant_account", "   ");
        assert!(validate(&params, RULES).is_err());
    }

    #[test]
    fn test_missing_sub_key_reports_dotted_path() {
        let mut params = valid_params();
        params.group_mut("shopper").unwrap().insert("reference", "");
        assert_eq!(
            validate(&params, RULES).unwrap_err().missing,
            "shopper.reference"
        );
    }

    #[test]
    fn test_group_given_as_text() {
        let mut params = valid_params();
        params.insert("shopper", "not-a-group");
        assert_eq!(validate(&params, RULES).unwrap_err().missing, "shopper");
    }

    #[test]
    fn test_empty_group_reports_first_sub_key() {
        let mut params = valid_params();
        params.insert("shopper", Params::new());
        assert_eq!(
            validate(&params, RULES).unwrap_err().missing,
            "shopper.email"
        );
    }

    #[test]
    fn test_empty_group_alone() {
        let params = Params::new().with("shopper", Params::new());
        let rules = &[Rule::Group("shopper", &["email", "reference"])];
        assert_eq!(validate(&params, rules).unwrap_err().missing, "shopper.email");
    }

    #[test]
    fn test_first_violation_wins() {
        let params = Params::new();
        assert_eq!(
            validate(&params, RULES).unwrap_err().missing,
            "merchant_account"
        );
    }

    #[test]
    fn test_values_at_keeps_requested_order() {
        let group = Params::new().with("value", 1234u64).with("currency", "EUR");
        assert_eq!(group.values_at(&["currency", "value", "absent"]), vec!["EUR", "1234", ""]);
    }

    #[test]
    fn test_from_yaml() {
        let yaml: serde_yaml::Value = serde_yaml::from_str(
            "reference: PayoutPayment-0001\namount:\n  currency: EUR\n  value: 1234\nnothing: ~\n",
        )
        .unwrap();
        let params = Params::from_yaml(&yaml).unwrap();
        assert_eq!(params.text("reference"), Some("PayoutPayment-0001"));
        assert_eq!(params.group("amount").unwrap().text("value"), Some("1234"));
        assert!(!params.contains_key("nothing"));
    }

    #[test]
    fn test_from_json_rejects_arrays() {
        let json = serde_json::json!({ "shopper": { "email": ["a", "b"] } });
        assert_eq!(
            Params::from_json(&json),
            Err(ParamsError::UnsupportedValue("email".to_string()))
        );
    }
}
