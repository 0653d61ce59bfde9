//! Declaration scanner for Kotlin and Java sources.
//!
//! Sources are parsed with tree-sitter and only the top level of the syntax
//! tree is read: the package header, imports, and type declarations with
//! their modifiers and annotations. Members and nested types are never
//! declarations of their own.

use std::{collections::HashMap, fmt, path::Path};

use eyre::{Result, eyre};
use kiln_core::FileRef;
use tracing::debug;
use tree_sitter::{Language, Node, Parser};

use crate::{Annotation, DeclarationDraft, DeclarationKind, DeclarationSource, SourceFile};

/// Source languages the scanner can read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceLanguage {
    Kotlin,
    Java,
}

impl SourceLanguage {
    /// Pick the language from a file extension. Anything but `java` is
    /// read as Kotlin.
    pub fn from_extension(extension: &str) -> Self {
        if extension.eq_ignore_ascii_case("java") {
            Self::Java
        } else {
            Self::Kotlin
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(Self::Kotlin, Self::from_extension)
    }

    fn tree_sitter_language(self) -> Language {
        match self {
            Self::Kotlin => tree_sitter_kotlin_ng::LANGUAGE.into(),
            Self::Java => tree_sitter_java::LANGUAGE.into(),
        }
    }

    /// Node kinds of top-level type declarations.
    const fn type_kinds(self) -> &'static [&'static str] {
        match self {
            Self::Kotlin => &["class_declaration", "object_declaration"],
            Self::Java => &[
                "class_declaration",
                "interface_declaration",
                "enum_declaration",
                "annotation_type_declaration",
                "record_declaration",
            ],
        }
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kotlin => write!(f, "Kotlin"),
            Self::Java => write!(f, "Java"),
        }
    }
}

/// Node kinds that can carry a declaration's name when the grammar does not
/// expose a `name` field.
const NAME_KINDS: &[&str] = &["type_identifier", "simple_identifier", "identifier"];

/// The default [`DeclarationSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SourceScanner;

impl SourceScanner {
    pub fn new() -> Self {
        Self
    }

    /// Scan source text attributed to `file`. The language follows the
    /// file's extension.
    ///
    /// # Errors
    ///
    /// Returns an error if the grammar cannot be loaded or the parser gives
    /// up on the text.
    pub fn scan(&self, file: &FileRef, content: &str) -> Result<Vec<DeclarationDraft>> {
        let outline = Outline::parse(content, SourceLanguage::from_path(file.path()))?;
        Ok(outline.into_drafts(file))
    }

    /// Package and short name of the first type declared in `content`.
    ///
    /// # Errors
    ///
    /// Same as [`scan`](Self::scan).
    pub fn primary_type(
        &self,
        content: &str,
        language: SourceLanguage,
    ) -> Result<Option<(String, String)>> {
        let outline = Outline::parse(content, language)?;
        Ok(outline
            .types
            .into_iter()
            .next()
            .map(|ty| (outline.package, ty.name)))
    }
}

impl DeclarationSource for SourceScanner {
    fn ingest(&self, file: &SourceFile) -> Result<Vec<DeclarationDraft>> {
        let drafts = self.scan(&file.path, &file.content)?;
        debug!(file = %file.path, declarations = drafts.len(), "scanned source file");
        Ok(drafts)
    }
}

/// Top level of one source file.
#[derive(Debug, Default)]
struct Outline {
    package: String,
    /// Short (or alias) name to qualified name.
    imports: HashMap<String, String>,
    types: Vec<TypeOutline>,
}

#[derive(Debug)]
struct TypeOutline {
    name: String,
    kind: DeclarationKind,
    /// Annotation names as written.
    annotations: Vec<String>,
}

impl Outline {
    fn parse(source: &str, language: SourceLanguage) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&language.tree_sitter_language())
            .map_err(|e| eyre!("failed to load the {language} grammar: {e}"))?;

        let tree = parser
            .parse(source, None)
            .ok_or_else(|| eyre!("failed to parse {language} source"))?;

        let bytes = source.as_bytes();
        let root = tree.root_node();
        let mut outline = Self::default();

        for i in 0..root.child_count() {
            let Some(child) = root.child(i) else { continue };
            if !child.is_named() {
                continue;
            }

            match child.kind() {
                "package_header" | "package_declaration" => {
                    outline.package = package_name(text(child, bytes));
                }
                "import_list" => {
                    let mut cursor = child.walk();
                    for import in child.named_children(&mut cursor) {
                        outline.import(text(import, bytes));
                    }
                }
                "import_header" | "import" | "import_declaration" => {
                    outline.import(text(child, bytes));
                }
                kind if language.type_kinds().contains(&kind) => {
                    if let Some(ty) = type_outline(child, bytes) {
                        outline.types.push(ty);
                    }
                }
                _ => {}
            }
        }

        Ok(outline)
    }

    fn import(&mut self, text: &str) {
        let body = text.trim().trim_start_matches("import").trim_end_matches(';');
        let mut words = body.split_whitespace().filter(|w| *w != "static");
        let Some(path) = words.next() else { return };
        if path.ends_with(".*") {
            return;
        }

        let alias = match (words.next(), words.next()) {
            (Some("as"), Some(alias)) => alias,
            _ => last_segment(path),
        };
        self.imports.insert(alias.to_string(), path.to_string());
    }

    fn into_drafts(self, file: &FileRef) -> Vec<DeclarationDraft> {
        self.types
            .iter()
            .map(|ty| DeclarationDraft {
                package: self.package.clone(),
                short_name: ty.name.clone(),
                kind: ty.kind,
                annotations: ty
                    .annotations
                    .iter()
                    .map(|written| self.resolve_annotation(written))
                    .collect(),
                source: file.clone(),
            })
            .collect()
    }

    fn resolve_annotation(&self, written: &str) -> Annotation {
        let short_name = last_segment(written).to_string();
        let qualified_name = if written.contains('.') {
            Some(written.to_string())
        } else {
            self.imports.get(written).cloned()
        };
        Annotation {
            short_name,
            qualified_name,
        }
    }
}

fn type_outline(node: Node<'_>, bytes: &[u8]) -> Option<TypeOutline> {
    let name = node.child_by_field_name("name").or_else(|| {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .find(|child| NAME_KINDS.contains(&child.kind()))
    })?;

    let mut kind = match node.kind() {
        "interface_declaration" => DeclarationKind::Interface,
        "enum_declaration" => DeclarationKind::Enum,
        "annotation_type_declaration" => DeclarationKind::Annotation,
        "object_declaration" => DeclarationKind::Object,
        _ => DeclarationKind::Class,
    };
    let mut annotations = Vec::new();

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        match child.kind() {
            "modifiers" => {
                let mut inner = child.walk();
                for modifier in child.children(&mut inner) {
                    let written = text(modifier, bytes).trim();
                    if modifier.kind().ends_with("annotation") {
                        annotations.extend(annotation_name(written));
                    } else if written == "enum" {
                        kind = DeclarationKind::Enum;
                    } else if written == "annotation" {
                        kind = DeclarationKind::Annotation;
                    }
                }
            }
            // Kotlin keeps the keyword as an anonymous child.
            "interface" if !child.is_named() => kind = DeclarationKind::Interface,
            _ => {}
        }
    }

    Some(TypeOutline {
        name: text(name, bytes).to_string(),
        kind,
        annotations,
    })
}

fn text<'s>(node: Node<'_>, bytes: &'s [u8]) -> &'s str {
    node.utf8_text(bytes).unwrap_or("")
}

/// `package a.b.c;` → `a.b.c`
fn package_name(text: &str) -> String {
    text.trim()
        .trim_start_matches("package")
        .split_whitespace()
        .next()
        .unwrap_or("")
        .trim_end_matches(';')
        .to_string()
}

/// `@get:Named("x")` → `Named`, `@a.b.Marker` → `a.b.Marker`
fn annotation_name(text: &str) -> Option<String> {
    let body = text.strip_prefix('@')?.trim_start();
    let body = match body.split_once(':') {
        Some((target, rest))
            if !target.is_empty() && target.chars().all(|c| c.is_alphanumeric() || c == '_') =>
        {
            rest.trim_start()
        }
        _ => body,
    };

    let name: String = body
        .chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_' || *c == '.')
        .collect();
    (!name.is_empty()).then_some(name)
}

fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}
