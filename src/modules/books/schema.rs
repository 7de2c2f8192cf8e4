//! Field contract for book payloads.
//!
//! Only presence and JSON type are checked. Formats (ISBN checksums, URLs) and
//! ranges are left alone; integers just have to fit the 32-bit storage columns.

use std::fmt;

use serde_json::{Map, Value};

use super::models::{Book, BookFields};

const IS_REQUIRED: &str = "is required";
const MUST_BE_STRING: &str = "must be a string";
const MUST_BE_INTEGER: &str = "must be an integer";
const MUST_BE_OBJECT: &str = "must be an object";

/// Which subset of the contract a payload must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationMode {
    /// Every field, `isbn` included
    Create,
    /// Every field except `isbn`, which is ignored if present
    Update,
}

/// A single field-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub expectation: &'static str,
}

impl Violation {
    fn new(field: &'static str, expectation: &'static str) -> Self {
        Self { field, expectation }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.expectation)
    }
}

/// A payload that passed validation. `isbn` is always set in create mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidBook {
    pub isbn: Option<String>,
    pub fields: BookFields,
}

/// Check `payload` against the contract for `mode`, reporting every violation.
pub fn validate(payload: &Value, mode: ValidationMode) -> Result<ValidBook, Vec<Violation>> {
    let Some(object) = payload.as_object() else {
        return Err(vec![Violation::new("payload", MUST_BE_OBJECT)]);
    };

    let mut reader = FieldReader {
        object,
        violations: Vec::new(),
    };

    let isbn = match mode {
        ValidationMode::Create => reader.string("isbn"),
        ValidationMode::Update => None,
    };
    let amazon_url = reader.string("amazon_url");
    let author = reader.string("author");
    let language = reader.string("language");
    let pages = reader.integer("pages");
    let publisher = reader.string("publisher");
    let title = reader.string("title");
    let year = reader.integer("year");

    if !reader.violations.is_empty() {
        return Err(reader.violations);
    }

    match (amazon_url, author, language, pages, publisher, title, year) {
        (
            Some(amazon_url),
            Some(author),
            Some(language),
            Some(pages),
            Some(publisher),
            Some(title),
            Some(year),
        ) => Ok(ValidBook {
            isbn,
            fields: BookFields {
                amazon_url,
                author,
                language,
                pages,
                publisher,
                title,
                year,
            },
        }),
        _ => Err(reader.violations),
    }
}

/// Validate a complete book for insertion.
pub fn validate_create(payload: &Value) -> Result<Book, Vec<Violation>> {
    let valid = validate(payload, ValidationMode::Create)?;
    match valid.isbn {
        Some(isbn) => Ok(Book::from_parts(isbn, valid.fields)),
        None => Err(vec![Violation::new("isbn", IS_REQUIRED)]),
    }
}

/// Validate the mutable fields of a book.
pub fn validate_update(payload: &Value) -> Result<BookFields, Vec<Violation>> {
    validate(payload, ValidationMode::Update).map(|valid| valid.fields)
}

struct FieldReader<'a> {
    object: &'a Map<String, Value>,
    violations: Vec<Violation>,
}

impl<'a> FieldReader<'a> {
    fn present(&mut self, field: &'static str) -> Option<&'a Value> {
        let object = self.object;
        match object.get(field) {
            None | Some(Value::Null) => {
                self.violations.push(Violation::new(field, IS_REQUIRED));
                None
            }
            Some(value) => Some(value),
        }
    }

    fn string(&mut self, field: &'static str) -> Option<String> {
        match self.present(field)? {
            Value::String(value) => Some(value.clone()),
            _ => {
                self.violations.push(Violation::new(field, MUST_BE_STRING));
                None
            }
        }
    }

    fn integer(&mut self, field: &'static str) -> Option<i32> {
        let value = self.present(field)?;
        let parsed = match value.as_i64() {
            Some(whole) => i32::try_from(whole).ok(),
            None => value.as_f64().and_then(whole_i32),
        };

        if parsed.is_none() {
            self.violations.push(Violation::new(field, MUST_BE_INTEGER));
        }
        parsed
    }
}

/// Numbers written with a fraction or exponent still count when they are whole.
fn whole_i32(value: f64) -> Option<i32> {
    let in_range = value >= f64::from(i32::MIN) && value <= f64::from(i32::MAX);
    (value.fract() == 0.0 && in_range).then_some(value as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn dracula() -> Value {
        json!({
            "isbn": "9780393970128",
            "amazon_url": "https://www.amazon.com/Dracula-Norton-Critical-Editions-Stoker/dp/0393970124",
            "author": "Bram Stoker",
            "language": "english",
            "pages": 512,
            "publisher": "W. W. Norton & Company",
            "title": "Dracula",
            "year": 1996
        })
    }

    fn messages(violations: &[Violation]) -> Vec<String> {
        violations.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn accepts_complete_payload_in_create_mode() {
        let book = validate_create(&dracula()).unwrap();

        assert_eq!(book.isbn, "9780393970128");
        assert_eq!(book.title, "Dracula");
        assert_eq!(book.pages, 512);
        assert_eq!(book.year, 1996);
    }

    #[test]
    fn create_requires_isbn() {
        let mut payload = dracula();
        payload.as_object_mut().unwrap().remove("isbn");

        let violations = validate_create(&payload).unwrap_err();
        assert_eq!(messages(&violations), vec!["isbn is required"]);
    }

    #[test]
    fn update_ignores_isbn() {
        let mut payload = dracula();
        payload.as_object_mut().unwrap().remove("isbn");
        assert!(validate_update(&payload).is_ok());

        payload["isbn"] = json!(12345);
        let valid = validate(&payload, ValidationMode::Update).unwrap();
        assert_eq!(valid.isbn, None);
        assert_eq!(valid.fields.author, "Bram Stoker");
    }

    #[test]
    fn missing_language_is_reported() {
        let mut payload = dracula();
        payload.as_object_mut().unwrap().remove("language");

        let violations = validate(&payload, ValidationMode::Create).unwrap_err();
        assert_eq!(
            violations,
            vec![Violation {
                field: "language",
                expectation: "is required",
            }]
        );
    }

    #[test]
    fn null_counts_as_missing() {
        let mut payload = dracula();
        payload["title"] = Value::Null;

        let violations = validate_update(&payload).unwrap_err();
        assert_eq!(messages(&violations), vec!["title is required"]);
    }

    #[test]
    fn reports_every_violation_in_contract_order() {
        let payload = json!({
            "isbn": 9780393970128u64,
            "author": "Bram Stoker",
            "pages": "512",
            "publisher": "W. W. Norton & Company",
            "title": ["Dracula"],
            "year": 1996.5
        });

        let violations = validate(&payload, ValidationMode::Create).unwrap_err();
        assert_eq!(
            messages(&violations),
            vec![
                "isbn must be a string",
                "amazon_url is required",
                "language is required",
                "pages must be an integer",
                "title must be a string",
                "year must be an integer",
            ]
        );
    }

    #[test]
    fn integers_must_fit_storage_columns() {
        let mut payload = dracula();
        payload["pages"] = json!(i64::from(i32::MAX) + 1);

        let violations = validate_update(&payload).unwrap_err();
        assert_eq!(messages(&violations), vec!["pages must be an integer"]);
    }

    #[test]
    fn whole_floats_count_as_integers() {
        let mut payload = dracula();
        payload["year"] = json!(1996.0);
        payload["pages"] = serde_json::from_str("1e2").unwrap();

        let book = validate_create(&payload).unwrap();
        assert_eq!(book.year, 1996);
        assert_eq!(book.pages, 100);

        payload["year"] = json!(1996.5);
        let violations = validate_create(&payload).unwrap_err();
        assert_eq!(messages(&violations), vec!["year must be an integer"]);

        payload["year"] = json!(3.0e10);
        let violations = validate_create(&payload).unwrap_err();
        assert_eq!(messages(&violations), vec!["year must be an integer"]);
    }

    #[test]
    fn no_range_or_format_checks() {
        let mut payload = dracula();
        payload["isbn"] = json!("not-an-isbn");
        payload["amazon_url"] = json!("");
        payload["pages"] = json!(-3);

        let book = validate_create(&payload).unwrap();
        assert_eq!(book.pages, -3);
    }

    #[test]
    fn extra_properties_are_ignored() {
        let mut payload = dracula();
        payload["edition"] = json!("Norton Critical");

        assert!(validate_create(&payload).is_ok());
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let violations = validate(&json!(["Dracula"]), ValidationMode::Create).unwrap_err();
        assert_eq!(messages(&violations), vec!["payload must be an object"]);
    }
}
