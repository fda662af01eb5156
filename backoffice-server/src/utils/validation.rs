//! Input validation helpers
//!
//! Field-schema descriptors shared by every entity family. A [`Schema`]
//! checks a raw payload field by field, in declaration order, and reports
//! only the first violated rule. Validation never touches storage.
//!
//! Messages follow one format across the API:
//! `"name" is required`, `"price" must be greater than or equal to 0`.

use serde_json::{Map, Number, Value};

use crate::utils::AppError;

/// Raw or normalized field map
pub type Document = Map<String, Value>;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: product, category, role
pub const MAX_NAME_LEN: usize = 200;

/// Product names
pub const MAX_PRODUCT_NAME_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// Passwords (before hashing)
pub const MAX_PASSWORD_LEN: usize = 128;

/// Minimum password length
pub const MIN_PASSWORD_LEN: usize = 8;

/// Minimum username length (letters only)
pub const MIN_USERNAME_LEN: usize = 3;

// ── Field rules ─────────────────────────────────────────────────────

/// Constraint applied to a single field
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Trimmed string with length bounds (in characters)
    Text { min: usize, max: usize },
    /// ASCII letters only, at least `min` of them
    Letters { min: usize },
    /// `local@domain.tld` shape
    Email,
    /// Credential; not trimmed
    Secret { min: usize, max: usize },
    /// Reference to another record: 24 hex characters
    ObjectId,
    /// Finite number, numeric strings accepted
    Number { min: Option<f64> },
    /// Whole number, numeric strings accepted
    Integer { min: Option<i64> },
    /// One of a fixed set of strings
    OneOf(&'static [&'static str]),
}

/// Named field with its rule
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub name: &'static str,
    pub rule: Rule,
}

impl Field {
    pub const fn new(name: &'static str, rule: Rule) -> Self {
        Self { name, rule }
    }
}

/// Per-entity field schema
///
/// On create every field is required and unknown keys are rejected.
/// On update every field is optional; unknown keys are rejected as a group
/// when `strict_update` is set and silently dropped otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Schema {
    pub fields: &'static [Field],
    pub strict_update: bool,
}

impl Schema {
    /// Validate a create payload, returning only the schema's fields, normalized
    pub fn validate_create(&self, input: &Document) -> Result<Document, AppError> {
        let mut output = Document::new();
        for field in self.fields {
            match input.get(field.name) {
                Some(value) => {
                    output.insert(field.name.to_string(), check(field, value)?);
                }
                None => return Err(violation(field.name, format!("\"{}\" is required", field.name))),
            }
        }

        if let Some(unknown) = input.keys().find(|key| !self.knows(key)) {
            return Err(violation(unknown, format!("\"{unknown}\" is not allowed")));
        }

        Ok(output)
    }

    /// Validate a partial update payload
    pub fn validate_update(&self, input: &Document) -> Result<Document, AppError> {
        if self.strict_update {
            let unknown: Vec<&str> = input
                .keys()
                .map(String::as_str)
                .filter(|key| !self.knows(key))
                .collect();
            if !unknown.is_empty() {
                return Err(AppError::validation(format!(
                    "Invalid fields: {}",
                    unknown.join(", ")
                ))
                .with_detail("fields", unknown));
            }
        }

        let mut output = Document::new();
        for field in self.fields {
            if let Some(value) = input.get(field.name) {
                output.insert(field.name.to_string(), check(field, value)?);
            }
        }
        Ok(output)
    }

    fn knows(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.name == key)
    }
}

fn violation(field: &str, message: String) -> AppError {
    AppError::validation(message).with_detail("field", field)
}

/// Check one value against its rule, returning the normalized value
fn check(field: &Field, value: &Value) -> Result<Value, AppError> {
    let name = field.name;
    let fail = |message: String| Err(violation(name, message));

    match field.rule {
        Rule::Text { min, max } => {
            let text = as_text(name, value)?.trim();
            let len = text.chars().count();
            if len < min {
                return fail(format!("\"{name}\" length must be at least {min} characters long"));
            }
            if len > max {
                return fail(format!(
                    "\"{name}\" length must be less than or equal to {max} characters long"
                ));
            }
            Ok(Value::String(text.to_string()))
        }
        Rule::Letters { min } => {
            let text = as_text(name, value)?;
            if text.len() < min || !text.bytes().all(|b| b.is_ascii_alphabetic()) {
                return fail(format!(
                    "\"{name}\" with value \"{text}\" fails to match the required pattern: /^[A-Za-z]{{{min},}}$/"
                ));
            }
            Ok(Value::String(text.to_string()))
        }
        Rule::Email => {
            let text = as_text(name, value)?.trim();
            if text.len() > MAX_EMAIL_LEN || !is_email(text) {
                return fail(format!("\"{name}\" must be a valid email"));
            }
            Ok(Value::String(text.to_string()))
        }
        Rule::Secret { min, max } => {
            let text = as_text(name, value)?;
            let len = text.chars().count();
            if len < min {
                return fail(format!("\"{name}\" length must be at least {min} characters long"));
            }
            if len > max {
                return fail(format!(
                    "\"{name}\" length must be less than or equal to {max} characters long"
                ));
            }
            Ok(Value::String(text.to_string()))
        }
        Rule::ObjectId => {
            let text = as_text(name, value)?.trim();
            if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
                return fail(format!("\"{name}\" must only contain hexadecimal characters"));
            }
            if text.len() != shared::util::OBJECT_ID_LEN {
                return fail(format!(
                    "\"{name}\" length must be {} characters long",
                    shared::util::OBJECT_ID_LEN
                ));
            }
            Ok(Value::String(text.to_ascii_lowercase()))
        }
        Rule::Number { min } => {
            let number = as_number(value).ok_or_else(|| {
                violation(name, format!("\"{name}\" must be a number"))
            })?;
            if let Some(min) = min
                && number < min
            {
                return fail(format!(
                    "\"{name}\" must be greater than or equal to {}",
                    display_number(min)
                ));
            }
            Number::from_f64(number)
                .map(Value::Number)
                .ok_or_else(|| violation(name, format!("\"{name}\" must be a number")))
        }
        Rule::Integer { min } => {
            let number = as_number(value).ok_or_else(|| {
                violation(name, format!("\"{name}\" must be a number"))
            })?;
            if number.fract() != 0.0 || number.abs() > i64::MAX as f64 {
                return fail(format!("\"{name}\" must be an integer"));
            }
            let integer = number as i64;
            if let Some(min) = min
                && integer < min
            {
                return fail(format!("\"{name}\" must be greater than or equal to {min}"));
            }
            Ok(Value::Number(integer.into()))
        }
        Rule::OneOf(allowed) => match value.as_str() {
            Some(text) if allowed.contains(&text) => Ok(Value::String(text.to_string())),
            _ => fail(format!(
                "\"{name}\" must be one of [{}]",
                allowed.join(", ")
            )),
        },
    }
}

fn as_text<'a>(name: &str, value: &'a Value) -> Result<&'a str, AppError> {
    match value {
        Value::String(s) if s.is_empty() => Err(violation(
            name,
            format!("\"{name}\" is not allowed to be empty"),
        )),
        Value::String(s) => Ok(s),
        _ => Err(violation(name, format!("\"{name}\" must be a string"))),
    }
}

/// Numbers arrive as JSON numbers or, from forms, as numeric text
fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn display_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Conservative `local@domain.tld` check: no whitespace, exactly one `@`,
/// and a dot inside the domain with text on both sides.
pub fn is_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("\"{field}\" is not allowed to be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "\"{field}\" length must be less than or equal to {max_len} characters long"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ACCOUNT: Schema = Schema {
        fields: &[
            Field::new("username", Rule::Letters { min: MIN_USERNAME_LEN }),
            Field::new("email", Rule::Email),
            Field::new(
                "password",
                Rule::Secret {
                    min: MIN_PASSWORD_LEN,
                    max: MAX_PASSWORD_LEN,
                },
            ),
        ],
        strict_update: false,
    };

    const ROLE: Schema = Schema {
        fields: &[
            Field::new("name", Rule::Text { min: 3, max: MAX_NAME_LEN }),
            Field::new("status", Rule::OneOf(&["active", "inactive"])),
            Field::new("limit", Rule::Integer { min: None }),
        ],
        strict_update: true,
    };

    const PRODUCT: Schema = Schema {
        fields: &[
            Field::new("name", Rule::Text { min: 3, max: MAX_PRODUCT_NAME_LEN }),
            Field::new("price", Rule::Number { min: Some(0.0) }),
            Field::new("category", Rule::ObjectId),
        ],
        strict_update: false,
    };

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    fn message(result: Result<Document, AppError>) -> String {
        result.unwrap_err().message
    }

    #[test]
    fn test_password_boundary() {
        let ok = ACCOUNT.validate_create(&doc(json!({
            "username": "abc", "email": "a@b.co", "password": "12345678"
        })));
        assert!(ok.is_ok());

        let err = message(ACCOUNT.validate_create(&doc(json!({
            "username": "abc", "email": "a@b.co", "password": "1234567"
        }))));
        assert_eq!(err, "\"password\" length must be at least 8 characters long");
    }

    #[test]
    fn test_username_boundary() {
        let base = json!({ "email": "a@b.co", "password": "12345678" });

        let mut three = doc(base.clone());
        three.insert("username".into(), json!("abc"));
        assert!(ACCOUNT.validate_create(&three).is_ok());

        let mut two = doc(base.clone());
        two.insert("username".into(), json!("ab"));
        assert!(message(ACCOUNT.validate_create(&two)).contains("fails to match the required pattern"));

        let mut digit = doc(base);
        digit.insert("username".into(), json!("abc1"));
        assert!(message(ACCOUNT.validate_create(&digit)).starts_with("\"username\" with value \"abc1\""));
    }

    #[test]
    fn test_first_violation_wins() {
        let err = message(ACCOUNT.validate_create(&doc(json!({
            "username": "a1", "email": "nope", "password": "x"
        }))));
        assert!(err.starts_with("\"username\""));
    }

    #[test]
    fn test_required_field() {
        let err = message(ACCOUNT.validate_create(&doc(json!({
            "username": "abc", "password": "12345678"
        }))));
        assert_eq!(err, "\"email\" is required");
    }

    #[test]
    fn test_unknown_key_on_create() {
        let err = message(ROLE.validate_create(&doc(json!({
            "name": "editor", "status": "active", "limit": 3, "color": "red"
        }))));
        assert_eq!(err, "\"color\" is not allowed");
    }

    #[test]
    fn test_strict_update_lists_invalid_fields() {
        let err = message(ROLE.validate_update(&doc(json!({
            "name": "editor", "color": "red", "owner": "x"
        }))));
        assert_eq!(err, "Invalid fields: color, owner");
    }

    #[test]
    fn test_lenient_update_drops_unknown_fields() {
        let out = PRODUCT
            .validate_update(&doc(json!({ "price": "12.5", "color": "red" })))
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out["price"], json!(12.5));
    }

    #[test]
    fn test_update_still_checks_present_fields() {
        let err = message(PRODUCT.validate_update(&doc(json!({ "price": -1 }))));
        assert_eq!(err, "\"price\" must be greater than or equal to 0");
    }

    #[test]
    fn test_enum_and_integer_rules() {
        let err = message(ROLE.validate_create(&doc(json!({
            "name": "editor", "status": "paused", "limit": 3
        }))));
        assert_eq!(err, "\"status\" must be one of [active, inactive]");

        let err = message(ROLE.validate_create(&doc(json!({
            "name": "editor", "status": "active", "limit": 2.5
        }))));
        assert_eq!(err, "\"limit\" must be an integer");

        let out = ROLE
            .validate_create(&doc(json!({ "name": " editor ", "status": "inactive", "limit": "4" })))
            .unwrap();
        assert_eq!(out["name"], json!("editor"));
        assert_eq!(out["limit"], json!(4));
    }

    #[test]
    fn test_object_id_rule() {
        let base = json!({ "name": "Latte", "price": 3 });

        let mut short = doc(base.clone());
        short.insert("category".into(), json!("abc123"));
        assert_eq!(
            message(PRODUCT.validate_create(&short)),
            "\"category\" length must be 24 characters long"
        );

        let mut not_hex = doc(base.clone());
        not_hex.insert("category".into(), json!("zz3456789012345678901234"));
        assert_eq!(
            message(PRODUCT.validate_create(&not_hex)),
            "\"category\" must only contain hexadecimal characters"
        );

        let mut ok = doc(base);
        ok.insert("category".into(), json!("65A1F0C2E4B0A1B2C3D4E5F6"));
        let out = PRODUCT.validate_create(&ok).unwrap();
        assert_eq!(out["category"], json!("65a1f0c2e4b0a1b2c3d4e5f6"));
    }

    #[test]
    fn test_product_name_bounds() {
        let long = "x".repeat(101);
        let err = message(PRODUCT.validate_update(&doc(json!({ "name": long }))));
        assert_eq!(err, "\"name\" length must be less than or equal to 100 characters long");

        let err = message(PRODUCT.validate_update(&doc(json!({ "name": "ab" }))));
        assert_eq!(err, "\"name\" length must be at least 3 characters long");
    }

    #[test]
    fn test_type_errors() {
        let err = message(PRODUCT.validate_update(&doc(json!({ "name": 42 }))));
        assert_eq!(err, "\"name\" must be a string");

        let err = message(PRODUCT.validate_update(&doc(json!({ "price": "cheap" }))));
        assert_eq!(err, "\"price\" must be a number");

        let err = message(PRODUCT.validate_update(&doc(json!({ "name": "" }))));
        assert_eq!(err, "\"name\" is not allowed to be empty");
    }

    #[test]
    fn test_is_email() {
        assert!(is_email("admin@example.com"));
        assert!(is_email("a@b.co"));
        assert!(!is_email("admin@example"));
        assert!(!is_email("admin example@x.com"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("a@@example.com"));
        assert!(!is_email("a@.com"));
        assert!(!is_email("a@example."));
    }

    #[test]
    fn test_validate_required_text() {
        assert!(validate_required_text("secret", "password", 10).is_ok());
        assert!(validate_required_text("  ", "password", 10).is_err());
        assert!(validate_required_text("0123456789x", "password", 10).is_err());
    }
}
