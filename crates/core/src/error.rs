use crate::span::SourceSpan;
use serde::Serialize;

/// Errors that fail the schema build for a document.
///
/// Each variant carries the span of the declaration that caused it when the
/// declaration came from a located segment.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
pub enum SchemaError {
    /// A template declaration could not be split into surroundings and slots.
    #[error("malformed template '{template}': {reason}")]
    MalformedTemplate {
        template: String,
        reason: String,
        span: Option<SourceSpan>,
    },

    /// A type was registered as its own direct subtype.
    #[error("Type {name} cannot set itself as a sub-type.")]
    SelfSubtype {
        name: String,
        span: Option<SourceSpan>,
    },

    /// The declared hierarchy loops back on itself through other types.
    #[error("type hierarchy cycle detected: {cycle}")]
    SubtypeCycle {
        cycle: String,
        span: Option<SourceSpan>,
    },

    /// A type hierarchy line is not of the form `<child> is a type of <parent>`.
    #[error("malformed type declaration '{declaration}'")]
    MalformedTypeDeclaration {
        declaration: String,
        span: Option<SourceSpan>,
    },
}

impl SchemaError {
    pub fn span(&self) -> Option<SourceSpan> {
        match self {
            SchemaError::MalformedTemplate { span, .. }
            | SchemaError::SelfSubtype { span, .. }
            | SchemaError::SubtypeCycle { span, .. }
            | SchemaError::MalformedTypeDeclaration { span, .. } => *span,
        }
    }

    /// Attach a span to an error raised before its declaration was located.
    pub fn with_span(self, at: SourceSpan) -> Self {
        match self {
            SchemaError::MalformedTemplate {
                template,
                reason,
                span,
            } => SchemaError::MalformedTemplate {
                template,
                reason,
                span: span.or(Some(at)),
            },
            SchemaError::SelfSubtype { name, span } => SchemaError::SelfSubtype {
                name,
                span: span.or(Some(at)),
            },
            SchemaError::SubtypeCycle { cycle, span } => SchemaError::SubtypeCycle {
                cycle,
                span: span.or(Some(at)),
            },
            SchemaError::MalformedTypeDeclaration { declaration, span } => {
                SchemaError::MalformedTypeDeclaration {
                    declaration,
                    span: span.or(Some(at)),
                }
            }
        }
    }

    pub(crate) fn malformed_template(template: &str, reason: impl Into<String>) -> Self {
        SchemaError::MalformedTemplate {
            template: template.to_owned(),
            reason: reason.into(),
            span: None,
        }
    }
}
