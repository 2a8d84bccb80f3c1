//! Translation of `auth` blocks into registered [`Auth`] definitions.
//!
//! The entry point is [`parse_auths`]. Validation happens in a fixed order
//! per block: schema check against the allowed key set, name and `type`
//! resolution, singleton scalar extraction, then the nested `config`/`role`
//! sections. The first violation anywhere aborts the whole document.

use serde_json::{Map, Value};
use tracing::debug;

use crate::ast::{Body, Item, Literal, Node};
use crate::coerce::{self, CoerceError, Kind};
use crate::error::{ParseError, Result};
use crate::mount::{Auth, AuthConfig, AuthRole, Environment};

/// Keys accepted inside an `auth` block.
const AUTH_KEYS: &[&str] = &[
    "config",
    "role",
    "type",
    "path",
    "max_lease_ttl",
    "default_lease_ttl",
];

/// Parses every top-level `auth` block of a document into [`Auth`]
/// definitions registered on the environment.
///
/// Blocks are processed in document order; the first violation aborts the
/// rest of the document, leaving any previously registered auths in place.
/// Top-level items other than `auth` belong to sibling translators and are
/// ignored here. An absent or empty `auth` section is a successful no-op.
///
/// # Example
///
/// ```
/// use vaultplan::ast::{Body, Item};
/// use vaultplan::{parse_auths, Environment};
///
/// let document = Body::from([Item::block(
///     "auth",
///     &["approle"],
///     Body::from([
///         Item::attr("type", "approle"),
///         Item::attr("default_lease_ttl", "768h"),
///         Item::block(
///             "role",
///             &["reader"],
///             Body::from([Item::attr("policies", "read-only")]),
///         ),
///     ]),
/// )]);
///
/// let mut staging = Environment::new("staging");
/// parse_auths(&document, &mut staging)?;
///
/// let auth = staging.auth("approle").expect("registered");
/// assert_eq!(auth.auth_type, "approle");
/// assert_eq!(auth.default_lease_ttl, "768h");
/// assert_eq!(auth.roles[0].name, "reader");
/// # Ok::<(), vaultplan::ParseError>(())
/// ```
pub fn parse_auths(document: &Body, environment: &mut Environment) -> Result<()> {
    let blocks = document.filter("auth");
    if blocks.is_empty() {
        return Ok(());
    }

    for item in &blocks {
        let auth = parse_auth(item, &environment.name)?;
        environment.register(auth);
    }

    debug!(
        environment = %environment.name,
        count = blocks.len(),
        "parsed auth blocks"
    );

    Ok(())
}

/// Assembles one `auth` block into an [`Auth`] definition.
fn parse_auth(item: &Item, environment: &str) -> Result<Auth> {
    let Node::Body(body) = &item.value else {
        return Err(ParseError::Decode {
            context: environment.to_string(),
            section: "auth",
            name: item.labels.first().cloned().unwrap_or_default(),
            source: CoerceError {
                expected: Kind::Map,
                found: item.value.kind(),
            },
        });
    };

    check_keys(body, AUTH_KEYS)?;

    if item.labels.len() != 1 {
        return Err(ParseError::MissingName {
            section: "auth",
            span: item.span,
        });
    }
    let name = item.labels[0].clone();

    let auth_type = extract_required_string(body, "type", environment, &name)?;
    let path = extract_optional_string(body, "path", environment, &name)?;
    let max_lease_ttl = extract_optional_string(body, "max_lease_ttl", environment, &name)?;
    let default_lease_ttl = extract_optional_string(body, "default_lease_ttl", environment, &name)?;

    let mut auth = Auth {
        name,
        auth_type,
        environment: environment.to_string(),
        path,
        default_lease_ttl,
        max_lease_ttl,
        config: Vec::new(),
        roles: Vec::new(),
    };

    let context = format!("{environment} -> {}", auth.name);

    let config = body.filter("config");
    if !config.is_empty() {
        auth.config = parse_named_list(&config, "config", &context, |name, data| AuthConfig {
            name,
            data,
        })?;
    }

    let roles = body.filter("role");
    if !roles.is_empty() {
        auth.roles = parse_named_list(&roles, "role", &context, |name, data| AuthRole {
            name,
            data,
        })?;
    }

    Ok(auth)
}

/// Rejects any key outside the allowed set for this nesting level.
fn check_keys(body: &Body, allowed: &[&str]) -> Result<()> {
    for item in body.items() {
        if !allowed.contains(&item.key.as_str()) {
            return Err(ParseError::UnexpectedKey {
                key: item.key.clone(),
                span: item.span,
            });
        }
    }
    Ok(())
}

/// Extracts a field that must appear exactly once as a string literal.
fn extract_required_string(
    body: &Body,
    field: &'static str,
    environment: &str,
    auth: &str,
) -> Result<String> {
    let matches = body.filter(field);
    match matches.len() {
        0 => Err(ParseError::MissingField {
            environment: environment.to_string(),
            auth: auth.to_string(),
            field,
        }),
        1 => string_literal(matches[0], field, environment, auth),
        _ => Err(duplicate(field, environment, auth)),
    }
}

/// Extracts a field that may appear at most once as a string literal.
///
/// Absence is not an error; the field comes back as the empty string.
fn extract_optional_string(
    body: &Body,
    field: &'static str,
    environment: &str,
    auth: &str,
) -> Result<String> {
    let matches = body.filter(field);
    match matches.len() {
        0 => Ok(String::new()),
        1 => string_literal(matches[0], field, environment, auth),
        _ => Err(duplicate(field, environment, auth)),
    }
}

fn string_literal(item: &Item, field: &str, environment: &str, auth: &str) -> Result<String> {
    match &item.value {
        Node::Literal(Literal::String(value)) => Ok(value.clone()),
        other => Err(ParseError::TypeMismatch {
            environment: environment.to_string(),
            auth: auth.to_string(),
            field: field.to_string(),
            expected: "string",
            found: other.kind(),
        }),
    }
}

fn duplicate(field: &str, environment: &str, auth: &str) -> ParseError {
    ParseError::DuplicateKey {
        environment: environment.to_string(),
        auth: auth.to_string(),
        field: field.to_string(),
    }
}

/// Parses a repeatable named section (`config` or `role`) into records.
///
/// Each entry needs at least one label (the record name); its body is
/// flattened into free-form data. Entries come back in document order.
fn parse_named_list<T>(
    items: &[&Item],
    section: &'static str,
    context: &str,
    make: impl Fn(String, Map<String, Value>) -> T,
) -> Result<Vec<T>> {
    let mut records = Vec::with_capacity(items.len());

    for item in items {
        let Some(name) = item.labels.first() else {
            return Err(ParseError::MissingName {
                section,
                span: item.span,
            });
        };

        let Node::Body(body) = &item.value else {
            return Err(ParseError::Decode {
                context: context.to_string(),
                section,
                name: name.clone(),
                source: CoerceError {
                    expected: Kind::Map,
                    found: item.value.kind(),
                },
            });
        };

        let data = coerce::body_to_map(body).map_err(|source| ParseError::Decode {
            context: context.to_string(),
            section,
            name: name.clone(),
            source,
        })?;

        records.push(make(name.clone(), data));
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth_body(items: Vec<Item>) -> Body {
        Body::from(items)
    }

    #[test]
    fn test_check_keys_accepts_allowed() {
        let body = auth_body(vec![
            Item::attr("type", "github"),
            Item::attr("path", "gh"),
        ]);
        assert!(check_keys(&body, AUTH_KEYS).is_ok());
    }

    #[test]
    fn test_check_keys_rejects_unknown() {
        let body = auth_body(vec![
            Item::attr("type", "github"),
            Item::attr("descriptoin", "typo").at(3, 5),
        ]);

        let err = check_keys(&body, AUTH_KEYS).unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedKey { ref key, .. } if key == "descriptoin"
        ));
        assert!(err.to_string().contains("line 3, column 5"));
    }

    #[test]
    fn test_optional_string_absent_is_unset() {
        let body = auth_body(vec![Item::attr("type", "github")]);
        let value = extract_optional_string(&body, "max_lease_ttl", "staging", "github").unwrap();
        assert_eq!(value, "");
    }

    #[test]
    fn test_optional_string_duplicate() {
        let body = auth_body(vec![
            Item::attr("max_lease_ttl", "1h"),
            Item::attr("max_lease_ttl", "2h"),
        ]);

        let err = extract_optional_string(&body, "max_lease_ttl", "staging", "github").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateKey { ref field, .. } if field == "max_lease_ttl"));
    }

    #[test]
    fn test_optional_string_wrong_kind() {
        let body = auth_body(vec![Item::attr("max_lease_ttl", 10)]);

        let err = extract_optional_string(&body, "max_lease_ttl", "staging", "github").unwrap_err();
        assert!(matches!(
            err,
            ParseError::TypeMismatch { found: "number", expected: "string", .. }
        ));
    }

    #[test]
    fn test_required_string_missing() {
        let body = auth_body(vec![Item::attr("path", "gh")]);

        let err = extract_required_string(&body, "type", "staging", "github").unwrap_err();
        assert!(matches!(err, ParseError::MissingField { field: "type", .. }));
    }

    #[test]
    fn test_required_string_duplicate() {
        let body = auth_body(vec![
            Item::attr("type", "github"),
            Item::attr("type", "ldap"),
        ]);

        let err = extract_required_string(&body, "type", "staging", "github").unwrap_err();
        assert!(matches!(err, ParseError::DuplicateKey { ref field, .. } if field == "type"));
    }

    #[test]
    fn test_auth_value_must_be_block() {
        let item = Item::attr("auth", "oops");

        let err = parse_auth(&item, "staging").unwrap_err();
        assert!(matches!(err, ParseError::Decode { section: "auth", .. }));
    }

    #[test]
    fn test_named_list_entry_needs_block_value() {
        let role = Item::new("role", &["reader"], Node::Literal(Literal::from(5)));
        let items = vec![&role];

        let err =
            parse_named_list(&items, "role", "staging -> approle", |name, data| AuthRole {
                name,
                data,
            })
            .unwrap_err();

        assert!(matches!(
            err,
            ParseError::Decode { section: "role", ref name, .. } if name == "reader"
        ));
    }
}
