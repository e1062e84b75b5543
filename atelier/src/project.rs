//! Project identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AtelierError, AtelierResult};

/// Maximum length of a project ID.
const MAX_PROJECT_ID_LENGTH: usize = 128;

/// The stable external identifier of a project.
///
/// A project ID is chosen by the client when the project is first saved
/// and never changes afterwards. IDs are restricted to ASCII letters,
/// digits, `.`, `_` and `-` so they can be embedded in URLs verbatim.
#[derive(Serialize, Deserialize, Clone, Debug, Hash, Eq, PartialEq)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl ProjectId {
    pub fn new(id: String) -> AtelierResult<Self> {
        validate_project_id(&id)?;
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ProjectId {
    type Error = AtelierError;

    fn try_from(id: String) -> AtelierResult<Self> {
        Self::new(id)
    }
}

impl From<ProjectId> for String {
    fn from(id: ProjectId) -> Self {
        id.0
    }
}

fn validate_project_id(id: &str) -> AtelierResult<()> {
    if id.is_empty() {
        return Err(AtelierError::InvalidProjectId(
            "project ID must not be empty".to_string(),
        ));
    }

    if id.len() > MAX_PROJECT_ID_LENGTH {
        return Err(AtelierError::InvalidProjectId(format!(
            "project ID must be at most {} characters",
            MAX_PROJECT_ID_LENGTH
        )));
    }

    if let Some(bad) = id
        .chars()
        .find(|c| !c.is_ascii_alphanumeric() && !matches!(c, '.' | '_' | '-'))
    {
        return Err(AtelierError::InvalidProjectId(format!(
            "project ID contains invalid character {:?}",
            bad
        )));
    }

    Ok(())
}
