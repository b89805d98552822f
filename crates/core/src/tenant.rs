//! Explicit tenant identifier.
//!
//! Every persistence call takes a [`Tenant`] naming the PostgreSQL schema to
//! read and write; there is no ambient/process-wide tenant switch. The value
//! is validated at construction so it can be spliced into schema-qualified
//! table names without quoting.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length of a PostgreSQL identifier.
const MAX_IDENT_LEN: usize = 63;

/// A validated tenant schema name.
///
/// Accepts lowercase ASCII letters, digits and underscores, starting with a
/// letter or underscore -- the unquoted-identifier subset, so the name never
/// needs escaping inside a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Tenant(String);

impl Tenant {
    pub fn new(name: &str) -> Result<Self, CoreError> {
        if name.is_empty() || name.len() > MAX_IDENT_LEN {
            return Err(CoreError::Validation(format!(
                "Tenant name must be 1..={MAX_IDENT_LEN} characters"
            )));
        }
        let mut chars = name.chars();
        let first = chars.next().unwrap_or('_');
        if !(first.is_ascii_lowercase() || first == '_') {
            return Err(CoreError::Validation(
                "Tenant name must start with a lowercase letter or underscore".into(),
            ));
        }
        if !name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        {
            return Err(CoreError::Validation(format!(
                "Tenant name '{name}' may only contain lowercase letters, digits and underscores"
            )));
        }
        Ok(Tenant(name.to_string()))
    }

    /// The default tenant, mapped to the `public` schema the migrations
    /// populate.
    pub fn public() -> Self {
        Tenant("public".to_string())
    }

    pub fn schema(&self) -> &str {
        &self.0
    }

    /// Schema-qualify a table name for splicing into a query.
    pub fn table(&self, name: &str) -> String {
        format!("{}.{name}", self.0)
    }
}

impl Default for Tenant {
    fn default() -> Self {
        Tenant::public()
    }
}

impl fmt::Display for Tenant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Tenant {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Tenant::new(&value)
    }
}

impl From<Tenant> for String {
    fn from(t: Tenant) -> Self {
        t.0
    }
}
