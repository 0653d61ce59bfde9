//! Append-only, round-versioned declaration store.

use crate::{DeclId, Declaration, DeclarationDraft};

/// The growing universe of declarations of one compilation.
///
/// Every declaration is stamped with the round from which it is visible.
/// Declarations are never mutated or removed, so a reference handed to a
/// generator stays valid for the whole round.
#[derive(Debug, Default)]
pub struct DeclarationStore {
    declarations: Vec<Declaration>,
}

impl DeclarationStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add declarations that become visible starting in `round`.
    ///
    /// Returns the ids assigned to the new declarations, in order.
    pub fn append(
        &mut self,
        round: usize,
        drafts: impl IntoIterator<Item = DeclarationDraft>,
    ) -> Vec<DeclId> {
        drafts
            .into_iter()
            .map(|draft| {
                let id = DeclId(self.declarations.len());
                self.declarations
                    .push(Declaration::from_draft(id, round, draft));
                id
            })
            .collect()
    }

    /// Look up a declaration by id.
    pub fn get(&self, id: DeclId) -> Option<&Declaration> {
        self.declarations.get(id.0)
    }

    /// Declarations visible to generators running in `round`.
    pub fn visible_in(&self, round: usize) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(move |d| d.round() <= round)
    }

    /// Declarations that became visible exactly in `round`.
    pub fn introduced_in(&self, round: usize) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter().filter(move |d| d.round() == round)
    }

    /// Find a declaration by its qualified name.
    pub fn find(&self, qualified_name: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .find(|d| d.qualified_name() == qualified_name)
    }

    /// All declarations in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Declaration> {
        self.declarations.iter()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use kiln_core::FileRef;

    use super::*;
    use crate::DeclarationKind;

    fn draft(name: &str) -> DeclarationDraft {
        DeclarationDraft {
            package: "com.squareup.test".to_string(),
            short_name: name.to_string(),
            kind: DeclarationKind::Class,
            annotations: Vec::new(),
            source: FileRef::new(format!("/src/{name}.kt")),
        }
    }

    #[test]
    fn test_append_assigns_dense_ids() {
        let mut store = DeclarationStore::new();
        let first = store.append(0, [draft("A"), draft("B")]);
        let second = store.append(1, [draft("C")]);

        assert_eq!(first.iter().map(|id| id.index()).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(second[0].index(), 2);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_visibility_by_round() {
        let mut store = DeclarationStore::new();
        store.append(0, [draft("A")]);
        store.append(1, [draft("B")]);
        store.append(2, [draft("C")]);

        let names = |iter: Vec<&Declaration>| {
            iter.into_iter()
                .map(|d| d.short_name().to_string())
                .collect::<Vec<_>>()
        };

        assert_eq!(names(store.visible_in(0).collect()), vec!["A"]);
        assert_eq!(names(store.visible_in(1).collect()), vec!["A", "B"]);
        assert_eq!(names(store.introduced_in(1).collect()), vec!["B"]);
        assert_eq!(names(store.visible_in(5).collect()), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_find_by_qualified_name() {
        let mut store = DeclarationStore::new();
        store.append(0, [draft("A")]);

        assert!(store.find("com.squareup.test.A").is_some());
        assert!(store.find("com.squareup.test.B").is_none());
    }
}
