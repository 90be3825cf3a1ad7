//! Resolved annotation metadata with stereotype closure
//!
//! An annotation `A` has stereotype `M` when `A` is `M` or when `M` is reachable by
//! following meta-annotations from `A`. Metadata values are immutable; layering one
//! element's metadata over another produces a new value.

use super::value::{AnnotationUse, AnnotationValue};
use crate::model::{Constructor, DeclaredType, Member, Parameter, ProgramModel};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;
use std::cell::RefCell;
use std::collections::BTreeMap;
use tracing::debug;

/// A meta-annotation reached from a direct annotation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StereotypeRef {
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, AnnotationValue>,
}

/// One direct annotation of an element
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationEntry {
    pub name: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub values: BTreeMap<String, AnnotationValue>,
    /// Written on the element itself rather than inherited or layered from an outer element
    pub declared: bool,
    /// Transitive meta-annotations in discovery order, excluding the entry itself
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub stereotypes: Vec<StereotypeRef>,
}

impl AnnotationEntry {
    pub fn has_stereotype(&self, marker: &str) -> bool {
        self.name == marker || self.stereotypes.iter().any(|s| s.name == marker)
    }

    /// Attribute values of `marker` as seen from this entry
    pub fn stereotype_values(&self, marker: &str) -> Option<&BTreeMap<String, AnnotationValue>> {
        if self.name == marker {
            return Some(&self.values);
        }
        self.stereotypes
            .iter()
            .find(|s| s.name == marker)
            .map(|s| &s.values)
    }
}

/// Annotation metadata of one element
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AnnotationMetadata {
    entries: Vec<AnnotationEntry>,
}

impl AnnotationMetadata {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[AnnotationEntry] {
        &self.entries
    }

    pub fn has_annotation(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    pub fn has_declared_annotation(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.declared && e.name == name)
    }

    pub fn has_stereotype(&self, marker: &str) -> bool {
        self.entries.iter().any(|e| e.has_stereotype(marker))
    }

    pub fn has_declared_stereotype(&self, marker: &str) -> bool {
        self.entries
            .iter()
            .any(|e| e.declared && e.has_stereotype(marker))
    }

    /// Direct annotations carrying `marker` as a stereotype
    pub fn entries_with_stereotype<'a>(
        &'a self,
        marker: &'a str,
    ) -> impl Iterator<Item = &'a AnnotationEntry> + 'a {
        self.entries.iter().filter(move |e| e.has_stereotype(marker))
    }

    pub fn annotation_names_by_stereotype(&self, marker: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.has_stereotype(marker))
            .map(|e| e.name.as_str())
            .collect()
    }

    pub fn declared_annotation_names_by_stereotype(&self, marker: &str) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.declared && e.has_stereotype(marker))
            .map(|e| e.name.as_str())
            .collect()
    }

    pub fn annotation_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// Every annotation and stereotype name, without duplicates, in discovery order
    pub fn stereotype_names(&self) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        let mut names = Vec::new();
        for entry in &self.entries {
            let all = std::iter::once(entry.name.as_str())
                .chain(entry.stereotypes.iter().map(|s| s.name.as_str()));
            for name in all {
                if seen.insert(name) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Attribute of `marker`: direct usages first, then values carried by meta-annotations
    pub fn value(&self, marker: &str, attribute: &str) -> Option<&AnnotationValue> {
        self.entries
            .iter()
            .filter(|e| e.name == marker)
            .find_map(|e| e.values.get(attribute))
            .or_else(|| {
                self.entries.iter().find_map(|e| {
                    e.stereotypes
                        .iter()
                        .filter(|s| s.name == marker)
                        .find_map(|s| s.values.get(attribute))
                })
            })
    }

    pub fn string_value(&self, marker: &str, attribute: &str) -> Option<&str> {
        self.value(marker, attribute).and_then(AnnotationValue::as_str)
    }

    pub fn bool_value(&self, marker: &str, attribute: &str) -> Option<bool> {
        self.value(marker, attribute).and_then(AnnotationValue::as_bool)
    }

    /// Layer `top` over this metadata; entries of `top` replace same-named entries
    pub fn overlay(&self, top: &AnnotationMetadata) -> AnnotationMetadata {
        let mut entries: Vec<AnnotationEntry> = self
            .entries
            .iter()
            .filter(|e| !top.has_annotation(&e.name))
            .cloned()
            .collect();
        entries.extend(top.entries.iter().cloned());
        AnnotationMetadata { entries }
    }

    /// The same metadata with every entry marked as not declared
    pub fn as_inherited(&self) -> AnnotationMetadata {
        AnnotationMetadata {
            entries: self
                .entries
                .iter()
                .cloned()
                .map(|mut e| {
                    e.declared = false;
                    e
                })
                .collect(),
        }
    }

    pub fn without(&self, name: &str) -> AnnotationMetadata {
        self.filtered(|e| e.name != name)
    }

    pub fn filtered(&self, keep: impl Fn(&AnnotationEntry) -> bool) -> AnnotationMetadata {
        AnnotationMetadata {
            entries: self.entries.iter().filter(|e| keep(e)).cloned().collect(),
        }
    }
}

/// Builds [`AnnotationMetadata`] from annotation usages, resolving meta-annotations
/// through the program model
pub struct MetadataResolver<'m> {
    model: &'m dyn ProgramModel,
    cache: RefCell<FxHashMap<String, Vec<StereotypeRef>>>,
}

impl<'m> MetadataResolver<'m> {
    pub fn new(model: &'m dyn ProgramModel) -> Self {
        MetadataResolver {
            model,
            cache: RefCell::new(FxHashMap::default()),
        }
    }

    /// Declared usages win over inherited usages of the same annotation
    pub fn resolve(&self, declared: &[AnnotationUse], inherited: &[AnnotationUse]) -> AnnotationMetadata {
        let mut entries: Vec<AnnotationEntry> = Vec::new();
        let usages = declared
            .iter()
            .map(|u| (u, true))
            .chain(inherited.iter().map(|u| (u, false)));
        for (usage, declared) in usages {
            if entries.iter().any(|e| e.name == usage.name) {
                continue;
            }
            entries.push(AnnotationEntry {
                name: usage.name.clone(),
                values: usage.values.clone(),
                declared,
                stereotypes: self.stereotypes_of(&usage.name),
            });
        }
        AnnotationMetadata { entries }
    }

    pub fn for_type(&self, ty: &DeclaredType) -> AnnotationMetadata {
        self.resolve(&ty.annotations, &ty.inherited_annotations)
    }

    pub fn for_member(&self, member: &Member) -> AnnotationMetadata {
        self.resolve(member.annotations(), member.inherited_annotations())
    }

    pub fn for_constructor(&self, constructor: &Constructor) -> AnnotationMetadata {
        self.resolve(&constructor.annotations, &[])
    }

    pub fn for_parameter(&self, parameter: &Parameter) -> AnnotationMetadata {
        self.resolve(&parameter.annotations, &[])
    }

    /// Transitive meta-annotations of `name`, depth first
    ///
    /// Each annotation is visited once. A meta-annotation that leads back into the
    /// current chain is dropped.
    pub fn stereotypes_of(&self, name: &str) -> Vec<StereotypeRef> {
        if let Some(cached) = self.cache.borrow().get(name) {
            return cached.clone();
        }
        let mut found = Vec::new();
        let mut visited = FxHashSet::default();
        visited.insert(name.to_string());
        let mut chain = vec![name.to_string()];
        self.collect(name, &mut chain, &mut visited, &mut found);
        self.cache
            .borrow_mut()
            .insert(name.to_string(), found.clone());
        found
    }

    fn collect(
        &self,
        name: &str,
        chain: &mut Vec<String>,
        visited: &mut FxHashSet<String>,
        found: &mut Vec<StereotypeRef>,
    ) {
        let Some(decl) = self.model.resolve_type(name) else {
            return;
        };
        for meta in &decl.annotations {
            if chain.contains(&meta.name) {
                debug!(annotation = name, meta = %meta.name, "meta-annotation cycle cut");
                continue;
            }
            if !visited.insert(meta.name.clone()) {
                continue;
            }
            found.push(StereotypeRef {
                name: meta.name.clone(),
                values: meta.values.clone(),
            });
            chain.push(meta.name.clone());
            self.collect(&meta.name, chain, visited, found);
            chain.pop();
        }
    }
}
