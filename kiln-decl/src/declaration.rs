//! Declarations as observed by generators.

use std::fmt;

use kiln_core::FileRef;
use serde::Serialize;

/// Stable identifier of a declaration inside a [`DeclarationStore`].
///
/// Ids are dense and assigned in insertion order, so they double as the
/// deterministic ordering of declarations within a round.
///
/// [`DeclarationStore`]: crate::DeclarationStore
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DeclId(pub(crate) usize);

impl DeclId {
    /// The underlying index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Kind of a top-level declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclarationKind {
    Interface,
    Class,
    Object,
    Enum,
    Annotation,
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeclarationKind::Interface => "interface",
            DeclarationKind::Class => "class",
            DeclarationKind::Object => "object",
            DeclarationKind::Enum => "enum",
            DeclarationKind::Annotation => "annotation",
        };
        f.write_str(name)
    }
}

/// An annotation applied to a declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Annotation {
    /// The name as written at the use site (last segment only).
    pub short_name: String,
    /// The fully qualified name, when it could be resolved from imports or
    /// was written qualified.
    pub qualified_name: Option<String>,
}

impl Annotation {
    /// Returns true if `name` designates this annotation, either by short or
    /// by qualified name.
    pub fn matches(&self, name: &str) -> bool {
        if self.qualified_name.as_deref() == Some(name) {
            return true;
        }
        match name.rsplit_once('.') {
            // A qualified query only matches an unresolved annotation by its
            // last segment.
            Some((_, short)) => self.qualified_name.is_none() && short == self.short_name,
            None => name == self.short_name,
        }
    }
}

/// A declaration produced by a declaration source, before the store assigns
/// its identity and visibility round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclarationDraft {
    pub package: String,
    pub short_name: String,
    pub kind: DeclarationKind,
    pub annotations: Vec<Annotation>,
    pub source: FileRef,
}

/// A declaration visible to generators.
///
/// Immutable once stored: later rounds only ever add declarations.
#[derive(Debug, Clone, Serialize)]
pub struct Declaration {
    id: DeclId,
    round: usize,
    package: String,
    short_name: String,
    kind: DeclarationKind,
    annotations: Vec<Annotation>,
    source: FileRef,
}

impl Declaration {
    pub(crate) fn from_draft(id: DeclId, round: usize, draft: DeclarationDraft) -> Self {
        Self {
            id,
            round,
            package: draft.package,
            short_name: draft.short_name,
            kind: draft.kind,
            annotations: draft.annotations,
            source: draft.source,
        }
    }

    pub fn id(&self) -> DeclId {
        self.id
    }

    /// The round in which this declaration became visible.
    pub fn round(&self) -> usize {
        self.round
    }

    /// Dotted package name, empty for the root package.
    pub fn package(&self) -> &str {
        &self.package
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Package-qualified name, e.g. `com.squareup.test.ComponentInterface`.
    pub fn qualified_name(&self) -> String {
        if self.package.is_empty() {
            self.short_name.clone()
        } else {
            format!("{}.{}", self.package, self.short_name)
        }
    }

    pub fn kind(&self) -> DeclarationKind {
        self.kind
    }

    pub fn is_interface(&self) -> bool {
        self.kind == DeclarationKind::Interface
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Returns true if the declaration carries the annotation named `name`
    /// (short or fully qualified).
    pub fn has_annotation(&self, name: &str) -> bool {
        self.annotations.iter().any(|a| a.matches(name))
    }

    /// The file this declaration was read from.
    pub fn source(&self) -> &FileRef {
        &self.source
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.qualified_name())
    }
}
