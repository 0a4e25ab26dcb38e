//! User-defined backend endpoints.
//!
//! A record is identified by its owning user plus its [`EndpointPath`]. The
//! client never holds an authoritative copy: records are rebuilt from the
//! backend on every read.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Fields of an endpoint definition that carry validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointField {
    Path,
    HandlerName,
    SourceCode,
    Description,
}

impl EndpointField {
    /// Stable field name used in error details.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::HandlerName => "handler_name",
            Self::SourceCode => "source_code",
            Self::Description => "description",
        }
    }
}

impl fmt::Display for EndpointField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for endpoint input, each naming the offending field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointValidationError {
    /// The path does not begin with `/`.
    #[error("path must start with '/'")]
    PathMissingLeadingSlash,
    /// A required field is empty once whitespace is trimmed.
    #[error("{field} must not be empty")]
    Blank { field: EndpointField },
}

impl EndpointValidationError {
    /// The field that failed validation.
    pub fn field(&self) -> EndpointField {
        match self {
            Self::PathMissingLeadingSlash => EndpointField::Path,
            Self::Blank { field } => *field,
        }
    }
}

/// Route of a user-defined endpoint, always starting with `/`.
///
/// # Examples
/// ```
/// use client::domain::EndpointPath;
///
/// let path = EndpointPath::new("/users").expect("valid path");
/// assert_eq!(path.as_str(), "/users");
/// assert!(EndpointPath::new("users").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EndpointPath(String);

impl EndpointPath {
    /// Validate and construct a path from borrowed input.
    pub fn new(value: impl AsRef<str>) -> Result<Self, EndpointValidationError> {
        Self::from_owned(value.as_ref().to_owned())
    }

    fn from_owned(value: String) -> Result<Self, EndpointValidationError> {
        if !value.starts_with('/') {
            return Err(EndpointValidationError::PathMissingLeadingSlash);
        }
        Ok(Self(value))
    }

    /// Borrow the path as a string slice.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for EndpointPath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EndpointPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<EndpointPath> for String {
    fn from(value: EndpointPath) -> Self {
        value.0
    }
}

impl TryFrom<String> for EndpointPath {
    type Error = EndpointValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Expected request body description attached to an endpoint.
///
/// The backend stores whatever the author typed; JSON objects survive as
/// structured values, everything else as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BodySchema {
    Text(String),
    Structured(Value),
}

impl BodySchema {
    /// Interpret a raw backend value, treating null and blank text as absent.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::String(text) if text.trim().is_empty() => None,
            Value::String(text) => Some(Self::Text(text)),
            other => Some(Self::Structured(other)),
        }
    }

    /// Human-readable rendering; structured schemas are pretty-printed.
    pub fn render(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Structured(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
        }
    }
}

/// Endpoint fields as stored by the backend under one path key.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointDefinition {
    pub description: String,
    pub handler_name: String,
    pub source_code: String,
    pub body_schema: Option<BodySchema>,
}

/// One user-defined endpoint as read back from the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointRecord {
    pub path: EndpointPath,
    pub description: String,
    pub handler_name: String,
    pub source_code: String,
    pub body_schema: Option<BodySchema>,
}

impl EndpointRecord {
    /// Join a mapping entry back into a record.
    pub fn from_definition(path: EndpointPath, definition: EndpointDefinition) -> Self {
        let EndpointDefinition {
            description,
            handler_name,
            source_code,
            body_schema,
        } = definition;
        Self {
            path,
            description,
            handler_name,
            source_code,
            body_schema,
        }
    }
}

/// Record paired with a presentation-only sequence number.
///
/// `id` is assigned per fetch, starting at 1, and is not stable across
/// fetches; use `record.path` as the durable key.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedEndpoint {
    pub id: usize,
    pub record: EndpointRecord,
}

/// Unvalidated endpoint input as typed by the author.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EndpointDraft {
    pub path: String,
    pub handler_name: String,
    pub source_code: String,
    pub description: String,
    pub body_schema: Option<BodySchema>,
}

impl EndpointDraft {
    /// Check the draft, reporting the first offending field.
    ///
    /// Fields are checked in form order: path, handler name, code,
    /// description. Values are kept as typed; trimming only decides blankness.
    ///
    /// # Examples
    /// ```
    /// use client::domain::{EndpointDraft, EndpointField};
    ///
    /// let draft = EndpointDraft {
    ///     path: "users".to_owned(),
    ///     ..EndpointDraft::default()
    /// };
    /// let err = draft.validate().expect_err("missing slash");
    /// assert_eq!(err.field(), EndpointField::Path);
    /// ```
    pub fn validate(self) -> Result<NewEndpoint, EndpointValidationError> {
        let path = EndpointPath::new(&self.path)?;
        require_text(&self.handler_name, EndpointField::HandlerName)?;
        require_text(&self.source_code, EndpointField::SourceCode)?;
        require_text(&self.description, EndpointField::Description)?;
        Ok(NewEndpoint {
            path,
            handler_name: self.handler_name,
            source_code: self.source_code,
            description: self.description,
            body_schema: self.body_schema,
        })
    }
}

fn require_text(value: &str, field: EndpointField) -> Result<(), EndpointValidationError> {
    if value.trim().is_empty() {
        return Err(EndpointValidationError::Blank { field });
    }
    Ok(())
}

/// Endpoint input that passed validation and may be sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEndpoint {
    path: EndpointPath,
    handler_name: String,
    source_code: String,
    description: String,
    body_schema: Option<BodySchema>,
}

impl NewEndpoint {
    pub fn path(&self) -> &EndpointPath {
        &self.path
    }

    pub fn handler_name(&self) -> &str {
        self.handler_name.as_str()
    }

    pub fn source_code(&self) -> &str {
        self.source_code.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn body_schema(&self) -> Option<&BodySchema> {
        self.body_schema.as_ref()
    }
}

/// A file stored alongside the user's endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn draft() -> EndpointDraft {
        EndpointDraft {
            path: "/users".to_owned(),
            handler_name: "list_users".to_owned(),
            source_code: "return jsonify([])".to_owned(),
            description: "List every user".to_owned(),
            body_schema: None,
        }
    }

    #[rstest]
    fn valid_drafts_keep_their_values(draft: EndpointDraft) {
        let endpoint = draft.clone().validate().expect("valid draft");
        assert_eq!(endpoint.path().as_str(), draft.path);
        assert_eq!(endpoint.handler_name(), draft.handler_name);
        assert_eq!(endpoint.source_code(), draft.source_code);
        assert_eq!(endpoint.description(), draft.description);
    }

    #[rstest]
    #[case::missing_slash(|d: &mut EndpointDraft| d.path = "users".to_owned(), EndpointField::Path)]
    #[case::blank_handler(|d: &mut EndpointDraft| d.handler_name = "  ".to_owned(), EndpointField::HandlerName)]
    #[case::blank_code(|d: &mut EndpointDraft| d.source_code = "\n\t".to_owned(), EndpointField::SourceCode)]
    #[case::blank_description(|d: &mut EndpointDraft| d.description = String::new(), EndpointField::Description)]
    fn invalid_drafts_name_the_offending_field(
        draft: EndpointDraft,
        #[case] mutate: fn(&mut EndpointDraft),
        #[case] expected: EndpointField,
    ) {
        let mut draft = draft;
        mutate(&mut draft);
        let err = draft.validate().expect_err("draft should be rejected");
        assert_eq!(err.field(), expected);
    }

    #[rstest]
    fn path_is_checked_before_other_fields() {
        let err = EndpointDraft::default()
            .validate()
            .expect_err("empty draft");
        assert_eq!(err, EndpointValidationError::PathMissingLeadingSlash);
    }

    #[rstest]
    #[case(Value::Null, None)]
    #[case(json!("   "), None)]
    #[case(json!("{ name: string }"), Some(BodySchema::Text("{ name: string }".to_owned())))]
    #[case(json!({"name": "string"}), Some(BodySchema::Structured(json!({"name": "string"}))))]
    fn body_schema_interprets_backend_values(
        #[case] raw: Value,
        #[case] expected: Option<BodySchema>,
    ) {
        assert_eq!(BodySchema::from_value(raw), expected);
    }

    #[test]
    fn structured_schemas_render_pretty() {
        let schema = BodySchema::Structured(json!({"name": "string"}));
        assert_eq!(schema.render(), "{\n  \"name\": \"string\"\n}");
    }
}
