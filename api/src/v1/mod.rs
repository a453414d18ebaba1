use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const TITLE_MAX_LEN: usize = 100;
pub const DESCRIPTION_MAX_LEN: usize = 500;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: u64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /todos`.
///
/// `title` is optional on the wire so a missing title is reported alongside
/// any other field failures instead of as a bare parse error.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of `PUT /todos/{id}`.
///
/// Each field is `None` when absent from the payload and `Some(None)` when
/// sent as an explicit `null`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "nullable",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed: Option<Option<bool>>,
}

fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A create request that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
}

/// An update request that passed validation. Only `Some` fields are applied.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

/// One entry of a 422 response's `detail` list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            loc: loc.iter().map(|part| part.to_string()).collect(),
            msg: msg.into(),
            kind: kind.into(),
        }
    }

    fn body(field: &str, msg: impl Into<String>, kind: &str) -> Self {
        Self::new(&["body", field], msg, kind)
    }

    fn missing(field: &str) -> Self {
        Self::body(field, "Field required", "missing")
    }

    fn null_string(field: &str) -> Self {
        Self::body(field, "Input should be a valid string", "string_type")
    }
}

fn check_title(title: &str, errors: &mut Vec<FieldError>) -> Option<String> {
    let title = title.trim();
    let len = title.chars().count();

    if len == 0 {
        errors.push(FieldError::body(
            "title",
            "String should have at least 1 character",
            "string_too_short",
        ));
        return None;
    }

    if len > TITLE_MAX_LEN {
        errors.push(FieldError::body(
            "title",
            format!("String should have at most {TITLE_MAX_LEN} characters"),
            "string_too_long",
        ));
        return None;
    }

    Some(title.to_string())
}

fn check_description(description: &str, errors: &mut Vec<FieldError>) -> bool {
    if description.chars().count() > DESCRIPTION_MAX_LEN {
        errors.push(FieldError::body(
            "description",
            format!("String should have at most {DESCRIPTION_MAX_LEN} characters"),
            "string_too_long",
        ));
        return false;
    }

    true
}

impl CreateTodo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks every field and reports all failures at once.
    pub fn validate(self) -> Result<NewTodo, Vec<FieldError>> {
        let mut errors = Vec::new();

        let title = match self.title {
            Some(title) => check_title(&title, &mut errors),
            None => {
                errors.push(FieldError::missing("title"));
                None
            }
        };

        if let Some(description) = &self.description {
            check_description(description, &mut errors);
        }

        match title {
            Some(title) if errors.is_empty() => Ok(NewTodo {
                title,
                description: self.description,
            }),
            _ => Err(errors),
        }
    }
}

impl UpdateTodo {
    pub fn validate(self) -> Result<TodoPatch, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut patch = TodoPatch::default();

        match self.title {
            Some(Some(title)) => patch.title = check_title(&title, &mut errors),
            Some(None) => errors.push(FieldError::null_string("title")),
            None => {}
        }

        if let Some(description) = self.description {
            let valid = match &description {
                Some(description) => check_description(description, &mut errors),
                None => true,
            };
            if valid {
                patch.description = Some(description);
            }
        }

        match self.completed {
            Some(Some(completed)) => patch.completed = Some(completed),
            Some(None) => errors.push(FieldError::body(
                "completed",
                "Input should be a valid boolean",
                "bool_type",
            )),
            None => {}
        }

        if errors.is_empty() {
            Ok(patch)
        } else {
            Err(errors)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub completion_rate: String,
}

impl Stats {
    pub fn from_counts(total: usize, completed: usize) -> Self {
        // An empty table reports "0%" rather than "0.0%"; clients match on it.
        let completion_rate = if total == 0 {
            String::from("0%")
        } else {
            format!("{:.1}%", completed as f64 / total as f64 * 100.0)
        };

        Self {
            total,
            completed,
            pending: total - completed,
            completion_rate,
        }
    }
}

/// Error body shared by 404 and 422 responses.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Detail<T> {
    pub detail: T,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Welcome {
    pub message: String,
    pub docs: String,
    pub health: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}
