//! Positional XML fragment templates
//!
//! A [`Template`] is a static pattern with `%s` slots (`%%` is a literal
//! percent sign). Values are inserted verbatim by [`Template::render`]: the
//! gateway has always received unescaped values and callers are expected to
//! pass sanitised text. [`Template::render_escaped`] is the opt-in variant that
//! escapes XML special characters.

use quick_xml::escape::escape;
use std::borrow::Cow;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("template `{template}` expects {expected} values, got {given}")]
    SlotCount {
        template: &'static str,
        expected: usize,
        given: usize,
    },
}

/// How values are written into a template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Substitution {
    /// Insert values as-is
    #[default]
    Verbatim,
    /// Escape `&`, `<`, `>`, `"` and `'` first
    Escaped,
}

impl Substitution {
    /// The value as it will be written into a template
    pub fn apply<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match self {
            Substitution::Verbatim => Cow::Borrowed(value),
            Substitution::Escaped => escape(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    name: &'static str,
    pattern: &'static str,
}

impl Template {
    pub const fn new(name: &'static str, pattern: &'static str) -> Self {
        Self { name, pattern }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn pattern(&self) -> &'static str {
        self.pattern
    }

    /// Number of `%s` slots in the pattern
    pub fn slot_count(&self) -> usize {
        let mut count = 0;
        let mut rest = self.pattern;
        while let Some(pos) = rest.find('%') {
            match rest[pos + 1..].chars().next() {
                Some('s') => count += 1,
                Some('%') => {}
                _ => {
                    rest = &rest[pos + 1..];
                    continue;
                }
            }
            rest = &rest[pos + 2..];
        }
        count
    }

    /// Substitutes `values` into the slots, in order, without escaping
    pub fn render(&self, values: &[&str]) -> Result<String, TemplateError> {
        self.render_with(values, Substitution::Verbatim)
    }

    /// Substitutes `values` after escaping XML special characters
    pub fn render_escaped(&self, values: &[&str]) -> Result<String, TemplateError> {
        self.render_with(values, Substitution::Escaped)
    }

    pub fn render_with(
        &self,
        values: &[&str],
        substitution: Substitution,
    ) -> Result<String, TemplateError> {
        let expected = self.slot_count();
        if expected != values.len() {
            return Err(TemplateError::SlotCount {
                template: self.name,
                expected,
                given: values.len(),
            });
        }

        let extra: usize = values.iter().map(|v| v.len()).sum();
        let mut out = String::with_capacity(self.pattern.len() + extra);
        let mut values = values.iter();
        let mut rest = self.pattern;

        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let after = &rest[pos + 1..];
            if after.starts_with('s') {
                // slot count was checked above
                let value = values.next().copied().unwrap_or_default();
                out.push_str(&substitution.apply(value));
                rest = &after[1..];
            } else if after.starts_with('%') {
                out.push('%');
                rest = &after[1..];
            } else {
                out.push('%');
                rest = after;
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

impl std::fmt::Display for Template {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.pattern)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAIR: Template = Template::new("pair", "<a>%s</a><b>%s</b>");

    #[test]
    fn test_render_in_order() {
        assert_eq!(PAIR.render(&["1", "2"]).unwrap(), "<a>1</a><b>2</b>");
    }

    #[test]
    fn test_slot_count_mismatch() {
        assert_eq!(
            PAIR.render(&["1"]),
            Err(TemplateError::SlotCount {
                template: "pair",
                expected: 2,
                given: 1
            })
        );
    }

    #[test]
    fn test_render_is_verbatim() {
        let xml = PAIR.render(&["Fish & Chips", "<b>"]).unwrap();
        assert_eq!(xml, "<a>Fish & Chips</a><b><b></b>");
    }

    #[test]
    fn test_render_escaped() {
        let xml = PAIR.render_escaped(&["Fish & Chips", "<b>"]).unwrap();
        assert_eq!(xml, "<a>Fish &amp; Chips</a><b>&lt;b&gt;</b>");
    }

    #[test]
    fn test_escaping_leaves_ascii_safe_values_unchanged() {
        let values = ["NL48RABO0132394782", "Test Shopper"];
        assert_eq!(PAIR.render(&values), PAIR.render_escaped(&values));
    }

    #[test]
    fn test_percent_literals() {
        let t = Template::new("pct", "%s%% of %d");
        assert_eq!(t.slot_count(), 1);
        assert_eq!(t.render(&["50"]).unwrap(), "50% of %d");
    }

    #[test]
    fn test_static_template() {
        let t = Template::new("static", "<recurring/>");
        assert_eq!(t.slot_count(), 0);
        assert_eq!(t.render(&[]).unwrap(), "<recurring/>");
    }
}
