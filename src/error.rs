//! Error types for configuration parsing.

use thiserror::Error;

use crate::ast::Span;
use crate::coerce::CoerceError;

/// Result type alias using [`ParseError`].
pub type Result<T> = std::result::Result<T, ParseError>;

/// Errors raised while translating a configuration document.
///
/// Parsing is fail-fast: the first violation anywhere aborts the whole
/// document and is surfaced verbatim. Messages carry the environment, block,
/// field, and (when the loader provides one) source position.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A key outside the allowed schema set at its nesting level.
    #[error("unexpected key {key:?} at {span}")]
    UnexpectedKey {
        /// The offending key.
        key: String,
        /// Where it appeared.
        span: Span,
    },

    /// A block that must carry exactly one name label has zero or several.
    #[error("missing {section} name at {span}")]
    MissingName {
        /// Block kind (`auth`, `config`, `role`).
        section: &'static str,
        /// Where the block starts.
        span: Span,
    },

    /// A mandatory singleton field is absent.
    #[error("missing auth {field} in {environment} -> {auth}")]
    MissingField {
        /// Owning environment name.
        environment: String,
        /// Auth block name.
        auth: String,
        /// The absent field.
        field: &'static str,
    },

    /// A field constrained to at most one occurrence appears again.
    #[error("you can only specify {field} once per mount in {environment} -> {auth}")]
    DuplicateKey {
        /// Owning environment name.
        environment: String,
        /// Auth block name.
        auth: String,
        /// The repeated field.
        field: String,
    },

    /// A field's literal value has the wrong scalar kind.
    #[error("unexpected {found} value for {environment} -> {auth} -> {field}, expected {expected}")]
    TypeMismatch {
        /// Owning environment name.
        environment: String,
        /// Auth block name.
        auth: String,
        /// The offending field.
        field: String,
        /// Kind the schema requires.
        expected: &'static str,
        /// Kind actually present.
        found: &'static str,
    },

    /// Free-form block data could not take the destination shape.
    #[error("could not decode {section} {name:?} in {context}: {source}")]
    Decode {
        /// Path to the enclosing block (`environment -> auth`).
        context: String,
        /// Section kind (`auth`, `config`, `role`).
        section: &'static str,
        /// Name of the entry that failed.
        name: String,
        /// Underlying coercion failure, propagated unchanged.
        #[source]
        source: CoerceError,
    },
}
