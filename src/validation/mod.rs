//! Declarative form validation and sanitization
//!
//! Every entity form is described by a static [`RuleSet`]: an ordered table of
//! fields, each with a [`FieldKind`] that decides how the value is sanitized
//! and a list of [`Rule`]s checked against the trimmed value. Running a rule
//! set never performs I/O and never stops at the first failure, so a single
//! round-trip reports every problem with the submission.
//!
//! The sanitized [`FormValues`] are produced whether or not validation passes,
//! which lets a rejected form be echoed back to the user.

pub mod rules;
pub mod sanitize;

use chrono::NaiveDate;
use indexmap::{map::Entry, IndexMap};
use serde::{Serialize, Serializer};
use uuid::Uuid;
use validator::ValidateLength;

use crate::error::{AppError, AppResult};

pub use sanitize::{escape, normalize_multi, parse_iso_date};

/// A field exactly as it arrived in the request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Single(String),
    Many(Vec<String>),
}

impl RawValue {
    /// First submitted value, used by scalar fields
    pub fn first(&self) -> &str {
        match self {
            RawValue::Single(value) => value,
            RawValue::Many(values) => values.first().map(String::as_str).unwrap_or(""),
        }
    }
}

/// Raw form submission: field name to one or more values, in arrival order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    fields: IndexMap<String, RawValue>,
}

impl FormInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value; a repeated key turns the field into a list
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let value = value.into();
        match self.fields.entry(name.into()) {
            Entry::Occupied(mut slot) => {
                let current = slot.get_mut();
                *current = match std::mem::replace(current, RawValue::Many(Vec::new())) {
                    RawValue::Single(first) => RawValue::Many(vec![first, value]),
                    RawValue::Many(mut values) => {
                        values.push(value);
                        RawValue::Many(values)
                    }
                };
            }
            Entry::Vacant(slot) => {
                slot.insert(RawValue::Single(value));
            }
        }
    }

    /// Builder form of [`FormInput::push`]
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.push(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.fields.get(name)
    }
}

impl FromIterator<(String, String)> for FormInput {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut input = FormInput::new();
        for (name, value) in iter {
            input.push(name, value);
        }
        input
    }
}

impl From<Vec<(String, String)>> for FormInput {
    fn from(pairs: Vec<(String, String)>) -> Self {
        pairs.into_iter().collect()
    }
}

/// How a field is sanitized and stored in the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed, markup-escaped text
    Text,
    /// Trimmed text parsed as an ISO-8601 calendar date
    Date,
    /// Scalar, list or absent, normalized to a list of escaped values
    List,
}

/// A single check; the message is reported verbatim when it fails
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Trimmed value must not be empty
    Required(&'static str),
    /// Trimmed value must not exceed the given number of characters
    MaxLength(usize, &'static str),
    /// Only ASCII letters and digits
    Alphanumeric(&'static str),
    /// When non-empty, must be an ISO-8601 calendar date
    IsoDate(&'static str),
    /// When non-empty, must be a record identifier
    Identifier(&'static str),
    /// When non-empty, must be one of the listed values
    OneOf(&'static [&'static str], &'static str),
}

impl Rule {
    /// Returns the failure message when `value` violates the rule
    fn check(&self, value: &str) -> Option<&'static str> {
        let failed = match self {
            Rule::Required(_) => !value.validate_length(Some(1), None, None),
            Rule::MaxLength(max, _) => !value.validate_length(None, Some(*max as u64), None),
            Rule::Alphanumeric(_) => !value.chars().all(|c| c.is_ascii_alphanumeric()),
            Rule::IsoDate(_) => !value.is_empty() && parse_iso_date(value).is_none(),
            Rule::Identifier(_) => !value.is_empty() && Uuid::parse_str(value).is_err(),
            Rule::OneOf(allowed, _) => !value.is_empty() && !allowed.contains(&value),
        };
        failed.then(|| self.message())
    }

    fn message(&self) -> &'static str {
        match self {
            Rule::Required(m)
            | Rule::MaxLength(_, m)
            | Rule::Alphanumeric(m)
            | Rule::IsoDate(m)
            | Rule::Identifier(m)
            | Rule::OneOf(_, m) => *m,
        }
    }
}

/// Rules for one form field
#[derive(Debug, Clone, Copy)]
pub struct FieldRules {
    pub name: &'static str,
    pub kind: FieldKind,
    pub rules: &'static [Rule],
}

/// Checks spanning more than one field, run after all field rules
#[derive(Debug, Clone, Copy)]
pub enum CrossRule {
    /// When both dates parse, `later` must not precede `earlier`
    NotBefore {
        earlier: &'static str,
        later: &'static str,
        message: &'static str,
    },
}

/// The complete rule table for one entity form
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    pub fields: &'static [FieldRules],
    pub cross: &'static [CrossRule],
}

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

/// A sanitized field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    /// Escaped text kept for re-display next to the parsed date
    Date { text: String, value: Option<NaiveDate> },
    List(Vec<String>),
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(text) => serializer.serialize_str(text),
            FieldValue::Date { value: Some(date), .. } => {
                serializer.collect_str(&date.format("%Y-%m-%d"))
            }
            FieldValue::Date { text, value: None } => serializer.serialize_str(text),
            FieldValue::List(values) => values.serialize(serializer),
        }
    }
}

/// The sanitized draft of a form, keyed by field name in rule-table order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormValues(IndexMap<&'static str, FieldValue>);

impl FormValues {
    /// Text of a scalar field, empty when absent
    pub fn text(&self, name: &str) -> &str {
        match self.0.get(name) {
            Some(FieldValue::Text(text)) | Some(FieldValue::Date { text, .. }) => text,
            _ => "",
        }
    }

    pub fn date(&self, name: &str) -> Option<NaiveDate> {
        match self.0.get(name) {
            Some(FieldValue::Date { value, .. }) => *value,
            _ => None,
        }
    }

    /// Values of a list field, empty when absent
    pub fn list(&self, name: &str) -> &[String] {
        match self.0.get(name) {
            Some(FieldValue::List(values)) => values,
            _ => &[],
        }
    }

    /// Parse a reference field into an identifier
    pub fn id(&self, name: &str) -> AppResult<Uuid> {
        Uuid::parse_str(self.text(name))
            .map_err(|_| AppError::BadRequest(format!("{} is not a valid identifier", name)))
    }

    /// Parse every element of a list field into identifiers
    pub fn ids(&self, name: &str) -> AppResult<Vec<Uuid>> {
        self.list(name)
            .iter()
            .map(|value| {
                Uuid::parse_str(value)
                    .map_err(|_| AppError::BadRequest(format!("{} is not a valid identifier", name)))
            })
            .collect()
    }
}

/// A form submission rejected by its rule set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rejected {
    pub values: FormValues,
    pub errors: Vec<FieldError>,
}

/// Outcome of running a rule set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub values: FormValues,
    pub errors: Vec<FieldError>,
}

impl Validated {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<FormValues, Rejected> {
        if self.errors.is_empty() {
            Ok(self.values)
        } else {
            Err(Rejected {
                values: self.values,
                errors: self.errors,
            })
        }
    }
}

impl RuleSet {
    /// Sanitize every declared field and collect all rule violations
    pub fn validate(&self, input: &FormInput) -> Validated {
        let mut values = IndexMap::with_capacity(self.fields.len());
        let mut errors = Vec::new();

        for field in self.fields {
            let raw = input.get(field.name);
            let value = match field.kind {
                FieldKind::Text => {
                    let trimmed = raw.map(RawValue::first).unwrap_or("").trim();
                    collect(field, trimmed, &mut errors);
                    FieldValue::Text(escape(trimmed))
                }
                FieldKind::Date => {
                    let trimmed = raw.map(RawValue::first).unwrap_or("").trim();
                    collect(field, trimmed, &mut errors);
                    FieldValue::Date {
                        text: escape(trimmed),
                        value: parse_iso_date(trimmed),
                    }
                }
                FieldKind::List => {
                    let items = normalize_multi(raw);
                    let mut sanitized = Vec::with_capacity(items.len());
                    // A blank entry carries no value
                    let present = items.iter().map(|item| item.trim()).filter(|item| !item.is_empty());
                    for trimmed in present {
                        collect(field, trimmed, &mut errors);
                        sanitized.push(escape(trimmed));
                    }
                    FieldValue::List(sanitized)
                }
            };
            values.insert(field.name, value);
        }

        let values = FormValues(values);
        for rule in self.cross {
            match rule {
                CrossRule::NotBefore {
                    earlier,
                    later,
                    message,
                } => {
                    if let (Some(start), Some(end)) = (values.date(earlier), values.date(later)) {
                        if end < start {
                            errors.push(FieldError::new(later, message));
                        }
                    }
                }
            }
        }

        Validated { values, errors }
    }
}

fn collect(field: &FieldRules, value: &str, errors: &mut Vec<FieldError>) {
    for rule in field.rules {
        if let Some(message) = rule.check(value) {
            errors.push(FieldError::new(field.name, message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static SAMPLE: RuleSet = RuleSet {
        fields: &[
            FieldRules {
                name: "name",
                kind: FieldKind::Text,
                rules: &[
                    Rule::Required("Name must be specified"),
                    Rule::Alphanumeric("Name has non-alphanumeric characters"),
                ],
            },
            FieldRules {
                name: "born",
                kind: FieldKind::Date,
                rules: &[Rule::IsoDate("Invalid date")],
            },
            FieldRules {
                name: "died",
                kind: FieldKind::Date,
                rules: &[Rule::IsoDate("Invalid date")],
            },
            FieldRules {
                name: "tags",
                kind: FieldKind::List,
                rules: &[],
            },
        ],
        cross: &[CrossRule::NotBefore {
            earlier: "born",
            later: "died",
            message: "Died before born",
        }],
    };

    #[test]
    fn test_repeated_keys_become_list() {
        let input = FormInput::new().with("tags", "a").with("tags", "b").with("tags", "c");
        assert_eq!(
            input.get("tags"),
            Some(&RawValue::Many(vec!["a".into(), "b".into(), "c".into()]))
        );
    }

    #[test]
    fn test_errors_accumulate_in_table_order() {
        let input = FormInput::new()
            .with("name", "  ")
            .with("born", "not-a-date")
            .with("died", "2020-02-30");
        let result = SAMPLE.validate(&input);

        let fields: Vec<_> = result.errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "born", "died"]);
    }

    #[test]
    fn test_values_are_sanitized_even_when_rejected() {
        let input = FormInput::new().with("name", "  <b>x</b> ").with("born", " 1990-05-14 ");
        let result = SAMPLE.validate(&input);

        assert!(!result.is_valid());
        assert_eq!(result.values.text("name"), "&lt;b&gt;x&lt;&#x2F;b&gt;");
        assert_eq!(result.values.date("born"), NaiveDate::from_ymd_opt(1990, 5, 14));
    }

    #[test]
    fn test_cross_rule_only_applies_to_parsed_dates() {
        let valid = SAMPLE.validate(&FormInput::new().with("name", "x").with("died", "1900-01-01"));
        assert!(valid.is_valid());

        let reversed = SAMPLE.validate(
            &FormInput::new()
                .with("name", "x")
                .with("born", "1950-01-01")
                .with("died", "1900-01-01"),
        );
        assert_eq!(reversed.errors, vec![FieldError::new("died", "Died before born")]);
    }

    #[test]
    fn test_invalid_date_is_echoed_as_typed() {
        let result = SAMPLE.validate(&FormInput::new().with("born", "yesterday"));
        let json = serde_json::to_value(&result.values).unwrap();
        assert_eq!(json["born"], "yesterday");
        assert_eq!(json["tags"], serde_json::json!([]));
    }

    #[test]
    fn test_blank_list_items_are_dropped() {
        let input = FormInput::new()
            .with("name", "x")
            .with("tags", "")
            .with("tags", " a ")
            .with("tags", "   ");
        let result = SAMPLE.validate(&input);
        assert!(result.is_valid());
        assert_eq!(result.values.list("tags"), ["a".to_string()]);

        let single = SAMPLE.validate(&FormInput::new().with("name", "x").with("tags", ""));
        assert!(single.values.list("tags").is_empty());
    }

    #[test]
    fn test_length_rules_count_characters() {
        assert_eq!(Rule::Required("Required").check(""), Some("Required"));
        assert_eq!(Rule::Required("Required").check("a"), None);

        let max = Rule::MaxLength(3, "Too long");
        assert_eq!(max.check("\u{e9}\u{e9}\u{e9}"), None);
        assert_eq!(max.check("abcd"), Some("Too long"));
    }

    #[test]
    fn test_into_result() {
        let ok = SAMPLE.validate(&FormInput::new().with("name", "Ok"));
        assert!(ok.into_result().is_ok());

        let rejected = SAMPLE
            .validate(&FormInput::new().with("name", "Jo@n"))
            .into_result()
            .unwrap_err();
        assert_eq!(rejected.errors.len(), 1);
        assert_eq!(rejected.values.text("name"), "Jo@n");
    }
}
