//! Field validation for the registration form.
//!
//! Rules are a flat table of (field, predicate, message). Every rule runs on
//! every request and all failures are reported together.

use email_address::EmailAddress;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::services::NewUser;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// The raw body of `POST /register`. Every field is optional so that a missing
/// field becomes a validation failure rather than a deserialization error.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub address: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub contact_details: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub email: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,
}

impl RegisterForm {
    fn field(&self, param: &str) -> Option<&str> {
        match param {
            "name" => self.name.as_deref(),
            "address" => self.address.as_deref(),
            "contactDetails" => self.contact_details.as_deref(),
            "email" => self.email.as_deref(),
            "password" => self.password.as_deref(),
            _ => None,
        }
    }
}

/// Numbers and booleans are read as their text; null, arrays and objects are
/// treated as absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    })
}

/// One failed rule, shaped the way form clients expect it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub value: String,
    pub msg: &'static str,
    pub param: &'static str,
    pub location: &'static str,
}

struct FieldRule {
    param: &'static str,
    check: fn(Option<&str>) -> bool,
    message: &'static str,
    /// Whether the submitted value may be echoed back in the error
    echo_value: bool,
}

const REGISTRATION_RULES: [FieldRule; 5] = [
    FieldRule {
        param: "name",
        check: is_present,
        message: "Name is required",
        echo_value: true,
    },
    FieldRule {
        param: "address",
        check: is_present,
        message: "Address is required",
        echo_value: true,
    },
    FieldRule {
        param: "contactDetails",
        check: is_present,
        message: "Contact details are required",
        echo_value: true,
    },
    FieldRule {
        param: "email",
        check: is_email,
        message: "Valid email is required",
        echo_value: true,
    },
    FieldRule {
        param: "password",
        check: is_long_enough_password,
        message: "Password must be at least 6 characters",
        echo_value: false,
    },
];

fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

fn is_email(value: Option<&str>) -> bool {
    value.is_some_and(is_valid_email)
}

fn is_long_enough_password(value: Option<&str>) -> bool {
    value.is_some_and(|v| v.chars().count() >= MIN_PASSWORD_LENGTH)
}

/// RFC 5322 addr-spec with a dotted DNS domain. Display names and domain
/// literals are rejected.
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(|c| c.is_whitespace() || c == '<' || c == '>') {
        return false;
    }

    if !EmailAddress::is_valid(email) {
        return false;
    }

    let Some((local, domain)) = email.rsplit_once('@') else {
        return false;
    };

    if local.is_empty() {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    let Some(tld) = labels.last() else {
        return false;
    };

    labels.len() >= 2
        && !tld.chars().all(|c| c.is_ascii_digit())
        && labels.iter().all(|label| {
            !label.is_empty()
                && !label.starts_with('-')
                && !label.ends_with('-')
                && label.chars().all(|c| c.is_alphanumeric() || c == '-')
        })
}

/// Runs every rule against the form. On success the form is converted into a
/// [`NewUser`]; otherwise every failure is returned in rule order.
pub fn validate_registration(form: RegisterForm) -> Result<NewUser, Vec<FieldError>> {
    let errors: Vec<FieldError> = REGISTRATION_RULES
        .iter()
        .filter_map(|rule| {
            let value = form.field(rule.param);
            if (rule.check)(value) {
                return None;
            }

            Some(FieldError {
                kind: "field",
                value: if rule.echo_value {
                    value.unwrap_or_default().to_string()
                } else {
                    String::new()
                },
                msg: rule.message,
                param: rule.param,
                location: "body",
            })
        })
        .collect();

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewUser {
        name: form.name.unwrap_or_default(),
        address: form.address.unwrap_or_default(),
        contact_details: form.contact_details.unwrap_or_default(),
        email: form.email.unwrap_or_default(),
        password: form.password.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(json: &str) -> RegisterForm {
        serde_json::from_str(json).unwrap()
    }

    fn params(errors: &[FieldError]) -> Vec<&'static str> {
        errors.iter().map(|e| e.param).collect()
    }

    const VALID: &str = r#"{
        "name": "Ann",
        "address": "1 Main St",
        "contactDetails": "555-0100",
        "email": "ann@example.com",
        "password": "secret1"
    }"#;

    #[test]
    fn test_valid_form() {
        let user = validate_registration(form(VALID)).unwrap();
        assert_eq!(user.name, "Ann");
        assert_eq!(user.contact_details, "555-0100");
        assert_eq!(user.email, "ann@example.com");
        assert_eq!(user.password, "secret1");
    }

    #[test]
    fn test_empty_body_fails_every_rule() {
        let Err(errors) = validate_registration(RegisterForm::default()) else {
            panic!("expected validation failure");
        };
        assert_eq!(
            params(&errors),
            ["name", "address", "contactDetails", "email", "password"]
        );
    }

    #[test]
    fn test_collects_all_failures() {
        let Err(errors) = validate_registration(form(
            r#"{"name":"","address":"1 Main St","contactDetails":"555-0100","email":"bad-email","password":"123"}"#,
        )) else {
            panic!("expected validation failure");
        };

        assert_eq!(params(&errors), ["name", "email", "password"]);
        assert_eq!(errors[0].msg, "Name is required");
        assert_eq!(errors[1].msg, "Valid email is required");
        assert_eq!(errors[1].value, "bad-email");
        assert_eq!(errors[2].msg, "Password must be at least 6 characters");
    }

    #[test]
    fn test_password_value_is_never_echoed() {
        let Err(errors) = validate_registration(form(
            r#"{"name":"Ann","address":"x","contactDetails":"x","email":"ann@example.com","password":"12345"}"#,
        )) else {
            panic!("expected validation failure");
        };

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].param, "password");
        assert!(errors[0].value.is_empty());
    }

    #[test]
    fn test_password_length_counts_characters() {
        assert!(is_long_enough_password(Some("123456")));
        assert!(!is_long_enough_password(Some("12345")));
        // 5 characters, 10 bytes
        assert!(!is_long_enough_password(Some("ééééé")));
        assert!(is_long_enough_password(Some("éééééé")));
        assert!(!is_long_enough_password(None));
    }

    #[test]
    fn test_whitespace_counts_as_present() {
        assert!(is_present(Some(" ")));
        assert!(!is_present(Some("")));
        assert!(!is_present(None));
    }

    #[test]
    fn test_non_string_scalars_are_coerced() {
        let parsed = form(r#"{"name": 42, "address": true, "contactDetails": null, "email": ["a"]}"#);
        assert_eq!(parsed.name.as_deref(), Some("42"));
        assert_eq!(parsed.address.as_deref(), Some("true"));
        assert!(parsed.contact_details.is_none());
        assert!(parsed.email.is_none());
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("ann@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.co.uk"));

        assert!(!is_valid_email(""));
        assert!(!is_valid_email("bad-email"));
        assert!(!is_valid_email("ann@localhost"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("ann@.example.com"));
        assert!(!is_valid_email("ann@example.com."));
        assert!(!is_valid_email("ann@-example.com"));
        assert!(!is_valid_email("ann @example.com"));
        assert!(!is_valid_email("Ann <ann@example.com>"));
        assert!(!is_valid_email("ann@[127.0.0.1]"));
        assert!(!is_valid_email("a@example.123"));
        assert!(!is_valid_email("ann@10.0.0.7"));
        assert!(is_valid_email("ann@123.example.com"));
    }
}
