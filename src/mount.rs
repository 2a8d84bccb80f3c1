//! Auth-mount definitions and the environment that owns them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A named grouping of auth mounts, supplied by the caller.
///
/// The environment owns its auth collection; the parser appends to it in
/// document order and never removes or reorders entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    /// Environment name, used in diagnostics (`staging -> approle`).
    pub name: String,

    /// Auth mounts registered so far, in document order.
    #[serde(default)]
    pub auths: Vec<Auth>,
}

impl Environment {
    /// Creates an empty environment.
    ///
    /// # Example
    ///
    /// ```
    /// use vaultplan::Environment;
    ///
    /// let env = Environment::new("staging");
    /// assert_eq!(env.name, "staging");
    /// assert!(env.auths.is_empty());
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            auths: Vec::new(),
        }
    }

    /// Looks up a registered auth mount by name.
    pub fn auth(&self, name: &str) -> Option<&Auth> {
        self.auths.iter().find(|auth| auth.name == name)
    }

    /// Appends an auth mount to the collection.
    pub fn register(&mut self, auth: Auth) {
        self.auths.push(auth);
    }
}

/// One authentication-backend mount definition.
///
/// Built once per `auth` block and never mutated after assembly. The
/// `environment` field is a back-reference by name; the [`Environment`]
/// owns the auth, not the other way around.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Auth {
    /// Mount name, taken from the block's label.
    pub name: String,

    /// Backend type identifier (`approle`, `github`, `ldap`, ...).
    #[serde(rename = "type")]
    pub auth_type: String,

    /// Name of the owning environment.
    pub environment: String,

    /// Mount path override; empty means "mount at the auth name".
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub path: String,

    /// Default lease duration (`"1h"`); empty means unset.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub default_lease_ttl: String,

    /// Maximum lease duration (`"24h"`); empty means unset.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub max_lease_ttl: String,

    /// Backend configuration entries, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub config: Vec<AuthConfig>,

    /// Role definitions, in document order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<AuthRole>,
}

impl Auth {
    /// The path this auth is mounted at: `path` when set, the name otherwise.
    pub fn mount_path(&self) -> &str {
        if self.path.is_empty() {
            &self.name
        } else {
            &self.path
        }
    }
}

/// A named backend-configuration entry with free-form data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Entry name, taken from the block's label.
    pub name: String,

    /// Free-form configuration data; the schema varies per backend type.
    pub data: Map<String, Value>,
}

/// A named role definition with free-form data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthRole {
    /// Role name, taken from the block's label.
    pub name: String,

    /// Free-form role data; the schema varies per backend type.
    pub data: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_auth() -> Auth {
        Auth {
            name: "approle".to_string(),
            auth_type: "approle".to_string(),
            environment: "staging".to_string(),
            path: String::new(),
            default_lease_ttl: "768h".to_string(),
            max_lease_ttl: String::new(),
            config: Vec::new(),
            roles: vec![AuthRole {
                name: "reader".to_string(),
                data: {
                    let mut data = Map::new();
                    data.insert("policies".to_string(), json!("read-only"));
                    data
                },
            }],
        }
    }

    #[test]
    fn test_environment_register_and_lookup() {
        let mut env = Environment::new("staging");
        env.register(sample_auth());

        assert_eq!(env.auths.len(), 1);
        assert!(env.auth("approle").is_some());
        assert!(env.auth("github").is_none());
    }

    #[test]
    fn test_mount_path_defaults_to_name() {
        let mut auth = sample_auth();
        assert_eq!(auth.mount_path(), "approle");

        auth.path = "approle-staging".to_string();
        assert_eq!(auth.mount_path(), "approle-staging");
    }

    #[test]
    fn test_auth_serialization_roundtrip() {
        let auth = sample_auth();
        let json = serde_json::to_string(&auth).unwrap();
        let deserialized: Auth = serde_json::from_str(&json).unwrap();
        assert_eq!(auth, deserialized);
    }

    #[test]
    fn test_auth_type_serializes_as_type() {
        let value = serde_json::to_value(sample_auth()).unwrap();
        assert_eq!(value["type"], json!("approle"));
        assert!(value.get("auth_type").is_none());
        // unset optional fields are omitted entirely
        assert!(value.get("max_lease_ttl").is_none());
    }
}
