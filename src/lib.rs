//! Vaultplan - declarative configuration for Vault auth provisioning.
//!
//! Vaultplan translates the `auth` blocks of a declarative configuration
//! document into strongly-typed mount definitions that a provisioning engine
//! applies against a live Vault. The document loader parses the raw markup
//! into the small tree in [`ast`]; this crate validates that tree against
//! the auth-block schema and extracts [`Auth`] definitions into the
//! caller's [`Environment`].
//!
//! # Features
//!
//! - **Schema validation**: unknown keys, duplicated singletons, and
//!   mistyped scalars are rejected with position-annotated messages
//! - **Fail-fast**: the first violation aborts the whole document
//! - **Free-form nested data**: `config`/`role` bodies flatten into
//!   JSON-shaped maps, with best-effort coercion helpers in [`coerce`]
//! - **Pure and synchronous**: no I/O, no global state, safe to run per
//!   environment in parallel
//!
//! # Quick Start
//!
//! ```
//! use vaultplan::ast::{Body, Item};
//! use vaultplan::{parse_auths, Environment};
//!
//! // auth "approle" {
//! //   type              = "approle"
//! //   default_lease_ttl = "768h"
//! //   role "reader" {
//! //     policies = "read-only"
//! //   }
//! // }
//! let document = Body::from([Item::block(
//!     "auth",
//!     &["approle"],
//!     Body::from([
//!         Item::attr("type", "approle"),
//!         Item::attr("default_lease_ttl", "768h"),
//!         Item::block(
//!             "role",
//!             &["reader"],
//!             Body::from([Item::attr("policies", "read-only")]),
//!         ),
//!     ]),
//! )]);
//!
//! let mut staging = Environment::new("staging");
//! parse_auths(&document, &mut staging)?;
//!
//! let auth = staging.auth("approle").expect("registered");
//! assert_eq!(auth.auth_type, "approle");
//! assert_eq!(auth.default_lease_ttl, "768h");
//! assert_eq!(auth.roles[0].data["policies"], "read-only");
//! # Ok::<(), vaultplan::ParseError>(())
//! ```
//!
//! # Allowed Keys
//!
//! | Key | Cardinality | Value |
//! |-----|-------------|-------|
//! | `type` | exactly one | backend type string |
//! | `path` | at most one | mount path string |
//! | `max_lease_ttl` | at most one | duration string |
//! | `default_lease_ttl` | at most one | duration string |
//! | `config` | repeatable | labeled block, free-form body |
//! | `role` | repeatable | labeled block, free-form body |
//!
//! Anything else inside an `auth` block fails the document.

pub mod ast;
pub mod coerce;
pub mod error;
pub mod mount;
pub mod parse;

pub use error::{ParseError, Result};
pub use mount::{Auth, AuthConfig, AuthRole, Environment};
pub use parse::parse_auths;
