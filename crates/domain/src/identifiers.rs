//! Repository identifiers.
//!
//! Both identifier types are embedded into graph queries and request paths,
//! so their character sets are checked on construction rather than escaped
//! at the call site.

use std::fmt::{Display, Formatter};

use dsretain_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Maximum datastream identifier length accepted by the repository.
const DATASTREAM_ID_MAX_LENGTH: usize = 64;

/// Maximum object identifier length accepted by the repository.
const OBJECT_PID_MAX_LENGTH: usize = 64;

/// URI scheme prefix used by the resource index for object references.
const OBJECT_URI_PREFIX: &str = "info:fedora/";

/// Validated datastream identifier, e.g. `DC` or `OBJ`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DatastreamId(NonEmptyString);

impl DatastreamId {
    /// Creates a validated datastream identifier.
    ///
    /// Accepts XML-name style tokens: a letter or `_` followed by ASCII
    /// letters, digits, `-`, `_` or `.`.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = NonEmptyString::new(value.into().trim().to_owned()).map_err(|_| {
            AppError::Validation("datastream id must not be empty".to_owned())
        })?;
        let raw = value.as_str();

        if raw.len() > DATASTREAM_ID_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "datastream id '{raw}' must not exceed {DATASTREAM_ID_MAX_LENGTH} characters"
            )));
        }

        let mut chars = raw.chars();
        let starts_well = chars
            .next()
            .is_some_and(|first| first.is_ascii_alphabetic() || first == '_');
        let rest_valid = chars.all(|character| {
            character.is_ascii_alphanumeric() || matches!(character, '-' | '_' | '.')
        });

        if !starts_well || !rest_valid {
            return Err(AppError::Validation(format!(
                "datastream id '{raw}' must start with a letter or '_' and contain only letters, digits, '-', '_' or '.'"
            )));
        }

        Ok(Self(value))
    }

    /// Returns the identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for DatastreamId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Validated persistent object identifier in `namespace:id` form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectPid(String);

impl ObjectPid {
    /// Creates a validated object identifier from its bare form.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into().trim().to_owned();

        if value.is_empty() {
            return Err(AppError::Validation("pid must not be empty".to_owned()));
        }

        if value.starts_with(OBJECT_URI_PREFIX) {
            return Err(AppError::Validation(format!(
                "pid '{value}' must be given without the '{OBJECT_URI_PREFIX}' prefix"
            )));
        }

        if value.len() > OBJECT_PID_MAX_LENGTH {
            return Err(AppError::Validation(format!(
                "pid '{value}' must not exceed {OBJECT_PID_MAX_LENGTH} characters"
            )));
        }

        let Some((namespace, local_id)) = value.split_once(':') else {
            return Err(AppError::Validation(format!(
                "pid '{value}' must have the form 'namespace:id'"
            )));
        };

        let namespace_valid = !namespace.is_empty()
            && namespace
                .chars()
                .all(|character| character.is_ascii_alphanumeric() || matches!(character, '-' | '.'));
        if !namespace_valid {
            return Err(AppError::Validation(format!(
                "pid '{value}' has an invalid namespace"
            )));
        }

        if !is_valid_local_id(local_id) {
            return Err(AppError::Validation(format!(
                "pid '{value}' has an invalid object id"
            )));
        }

        Ok(Self(value))
    }

    /// Parses a resource index reference such as `info:fedora/demo:1`.
    pub fn from_resource_uri(uri: &str) -> AppResult<Self> {
        let bare = uri.strip_prefix(OBJECT_URI_PREFIX).ok_or_else(|| {
            AppError::MalformedResponse(format!(
                "object reference '{uri}' does not start with '{OBJECT_URI_PREFIX}'"
            ))
        })?;

        Self::new(bare)
    }

    /// Returns the resource index reference for this object.
    #[must_use]
    pub fn resource_uri(&self) -> String {
        format!("{OBJECT_URI_PREFIX}{}", self.0)
    }

    /// Returns the bare identifier string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for ObjectPid {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

fn is_valid_local_id(local_id: &str) -> bool {
    if local_id.is_empty() {
        return false;
    }

    let bytes = local_id.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        let byte = bytes[index];
        if byte == b'%' {
            let escaped = bytes.get(index + 1..index + 3);
            let is_hex_pair = escaped.is_some_and(|pair| {
                pair.iter()
                    .all(|digit| digit.is_ascii_digit() || (b'A'..=b'F').contains(digit))
            });
            if !is_hex_pair {
                return false;
            }
            index += 3;
            continue;
        }

        if !(byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'~' | b'_')) {
            return false;
        }
        index += 1;
    }

    true
}
