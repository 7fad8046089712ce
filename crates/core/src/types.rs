//! Placeholder types and the declared subtype hierarchy.
//!
//! Types are collected by a [`TypeTreeBuilder`] while templates and type
//! hierarchy lines are read, then frozen into a [`TypeTree`] once the whole
//! hierarchy has been checked for cycles.

use crate::error::SchemaError;
use crate::span::SourceSpan;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Slots of this type (or of any of its descendants) may hold a nested statement.
pub const STATEMENT_TYPE: &str = "statement";

/// Determiners stripped from the front of a placeholder or type name.
const DETERMINERS: &[&str] = &["a", "an", "the"];

/// Index of a type inside the tree that declared it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(usize);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Type {
    pub name: String,
    pub subtypes: Vec<TypeId>,
}

/// Normalize a type name: lower-case, single spaces, leading determiner removed.
pub fn normalize_type_name(raw: &str) -> String {
    let lowered = raw.to_lowercase();
    let mut words: Vec<&str> = lowered.split_whitespace().collect();
    if words.len() > 1 && DETERMINERS.contains(&words[0]) {
        words.remove(0);
    } else if words.len() == 1 && DETERMINERS.contains(&words[0]) {
        // A bare determiner names nothing.
        words.clear();
    }
    words.join(" ")
}

#[derive(Debug, Default)]
pub struct TypeTreeBuilder {
    types: Vec<Type>,
    by_name: HashMap<String, TypeId>,
    edge_spans: HashMap<(TypeId, TypeId), SourceSpan>,
}

impl TypeTreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a type by (normalized) name, declaring it if unseen.
    pub fn declare(&mut self, name: &str) -> TypeId {
        let name = normalize_type_name(name);
        if let Some(id) = self.by_name.get(&name) {
            return *id;
        }
        let id = TypeId(self.types.len());
        self.types.push(Type {
            name: name.clone(),
            subtypes: Vec::new(),
        });
        self.by_name.insert(name, id);
        id
    }

    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(&normalize_type_name(name)).copied()
    }

    pub fn name(&self, id: TypeId) -> &str {
        &self.types[id.0].name
    }

    /// Register `child` as a direct subtype of `parent`.
    pub fn make_subtype(&mut self, parent: TypeId, child: TypeId) -> Result<(), SchemaError> {
        self.make_subtype_at(parent, child, None)
    }

    /// Like [`make_subtype`](Self::make_subtype), remembering where the edge was declared.
    pub fn make_subtype_at(
        &mut self,
        parent: TypeId,
        child: TypeId,
        span: Option<SourceSpan>,
    ) -> Result<(), SchemaError> {
        if self.types[parent.0].name == self.types[child.0].name {
            return Err(SchemaError::SelfSubtype {
                name: self.types[parent.0].name.clone(),
                span,
            });
        }
        let subtypes = &mut self.types[parent.0].subtypes;
        if !subtypes.contains(&child) {
            subtypes.push(child);
        }
        if let Some(span) = span {
            self.edge_spans.entry((parent, child)).or_insert(span);
        }
        Ok(())
    }

    /// Freeze the hierarchy, rejecting any cycle of subtype edges.
    pub fn finish(self) -> Result<TypeTree, SchemaError> {
        let mut visited: HashSet<TypeId> = HashSet::new();
        let mut in_stack: Vec<TypeId> = Vec::new();
        for index in 0..self.types.len() {
            self.detect_cycle(TypeId(index), &mut visited, &mut in_stack)?;
        }
        Ok(TypeTree {
            types: self.types,
            by_name: self.by_name,
        })
    }

    fn detect_cycle(
        &self,
        id: TypeId,
        visited: &mut HashSet<TypeId>,
        in_stack: &mut Vec<TypeId>,
    ) -> Result<(), SchemaError> {
        if visited.contains(&id) {
            return Ok(());
        }
        if let Some(pos) = in_stack.iter().position(|t| *t == id) {
            let mut cycle: Vec<&str> = in_stack[pos..].iter().map(|t| self.name(*t)).collect();
            cycle.push(self.name(id));
            let back_edge = in_stack.last().map(|parent| (*parent, id));
            let span = back_edge.and_then(|edge| self.edge_spans.get(&edge).copied());
            return Err(SchemaError::SubtypeCycle {
                cycle: cycle.join(" \u{2192} "),
                span,
            });
        }

        in_stack.push(id);
        for child in &self.types[id.0].subtypes {
            self.detect_cycle(*child, visited, in_stack)?;
        }
        in_stack.pop();
        visited.insert(id);
        Ok(())
    }
}

/// The immutable hierarchy of one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TypeTree {
    types: Vec<Type>,
    #[serde(skip)]
    by_name: HashMap<String, TypeId>,
}

impl TypeTree {
    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(&normalize_type_name(name)).copied()
    }

    pub fn name(&self, id: TypeId) -> &str {
        &self.types[id.0].name
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// True when `descendant` is reachable from `ancestor` through subtype edges.
    pub fn is_subtype_of(&self, descendant: TypeId, ancestor: TypeId) -> bool {
        let mut stack = self.types[ancestor.0].subtypes.clone();
        let mut seen: HashSet<TypeId> = HashSet::new();
        while let Some(next) = stack.pop() {
            if next == descendant {
                return true;
            }
            if seen.insert(next) {
                stack.extend(self.types[next.0].subtypes.iter().copied());
            }
        }
        false
    }

    /// Two types are compatible when they are the same type or one descends from the other.
    pub fn are_compatible_types(&self, a: TypeId, b: TypeId) -> bool {
        a == b || self.is_subtype_of(a, b) || self.is_subtype_of(b, a)
    }

    pub fn admits_sub_statements(&self, id: TypeId) -> bool {
        match self.get(STATEMENT_TYPE) {
            Some(statement) => id == statement || self.is_subtype_of(id, statement),
            None => false,
        }
    }
}
