//! le-core: Logical English template matching and analysis library.
//!
//! Matches the statements of a Logical English document against the
//! templates it declares, checks the types bound to template slots, and
//! derives diagnostics and semantic tokens for editors.
//!
//! # Public API
//!
//! Key types are re-exported at the crate root for convenience:
//!
//! - [`analyze()`] -- run the full analysis pass over a document
//! - [`Schema`] -- templates and type hierarchy declared by one document
//! - [`Template`] -- one declared pattern, with scoring and matching
//! - [`TypeTree`] -- the frozen subtype hierarchy
//! - [`Formula`] -- the tree produced by a complete match
//! - [`Diagnostic`], [`SemanticToken`] -- analysis outputs
//! - [`SchemaError`] -- schema build failures

pub mod analysis;
pub mod config;
pub mod directive;
pub mod document;
pub mod error;
pub mod formula;
pub mod highlight;
pub mod rules;
pub mod schema;
pub mod span;
pub mod template;
pub mod types;

// ── Convenience re-exports: key types ────────────────────────────────

pub use config::AnalysisConfig;
pub use error::SchemaError;
pub use formula::{Formula, FormulaElement, LocatedFormula, Term, TermKind};
pub use highlight::{SemanticToken, TOKEN_MODIFIERS, TOKEN_TYPES};
pub use rules::{Diagnostic, Severity};
pub use schema::Schema;
pub use span::{Position, Segment, SourceSpan};
pub use template::{Template, TemplateElement};
pub use types::{Type, TypeId, TypeTree, TypeTreeBuilder};

// ── Convenience re-exports: entry points ─────────────────────────────

pub use analysis::{analyze, analyze_segments, diagnostics, semantic_tokens, Analysis};
pub use document::{segment, strip_comments, DocumentSegments};
