//! Configuration-properties paths and the configuration metadata they feed

use super::{Accumulator, TypeScope};
use crate::annotations::{AnnotationMetadata, MetadataResolver};
use crate::artifact::{BuilderPoint, MemberPoint};
use crate::config::Markers;
use crate::error::ProcessingError;
use crate::model::{DeclaredType, ElementRef, PrimitiveKind, ProgramModel, TypeRef};
use rustc_hash::FxHashSet;
use serde::Serialize;

/// A configuration property a bean reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigurationProperty {
    pub path: String,
    pub ty: TypeRef,
    pub declaring_type: String,
    /// Member the value is written through
    pub member: String,
}

/// Every configuration property of a compilation unit, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ConfigurationMetadata {
    properties: Vec<ConfigurationProperty>,
}

impl ConfigurationMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, property: ConfigurationProperty) {
        self.properties.push(property);
    }

    pub fn extend(&mut self, properties: impl IntoIterator<Item = ConfigurationProperty>) {
        self.properties.extend(properties);
    }

    pub fn properties(&self) -> &[ConfigurationProperty] {
        &self.properties
    }

    pub fn find(&self, path: &str) -> Option<&ConfigurationProperty> {
        self.properties.iter().find(|p| p.path == path)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// `maxPoolSize` -> `max-pool-size`, `URLPath` -> `url-path`
pub fn kebab_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c == '_' || c == '-' {
            if !out.is_empty() && !out.ends_with('-') {
                out.push('-');
            }
            continue;
        }
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_lower);
            if boundary && !out.ends_with('-') {
                out.push('-');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}

pub(crate) fn property_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        kebab_case(name)
    } else {
        format!("{}.{}", prefix, kebab_case(name))
    }
}

/// Java-bean decapitalization: `Name` -> `name`, `URL` stays `URL`
pub(crate) fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
            name.to_string()
        }
        (Some(first), _) => first.to_lowercase().chain(name.chars().skip(1)).collect(),
        (None, _) => String::new(),
    }
}

fn strip_accessor_prefix<'n>(name: &'n str, prefix: &str) -> Option<&'n str> {
    let rest = name.strip_prefix(prefix)?;
    if prefix.is_empty() {
        return Some(rest);
    }
    rest.chars().next().filter(|c| c.is_uppercase()).map(|_| rest)
}

/// `getMaxSize` -> `maxSize`, `isEnabled` -> `enabled`
pub(crate) fn getter_property_name(name: &str) -> String {
    ["get", "is"]
        .iter()
        .find_map(|prefix| strip_accessor_prefix(name, prefix))
        .map(decapitalize)
        .unwrap_or_else(|| name.to_string())
}

fn own_prefix(markers: &Markers, meta: &AnnotationMetadata) -> String {
    let prefix = meta
        .string_value(&markers.configuration_reader, "prefix")
        .or_else(|| meta.string_value(&markers.each_property, "value"))
        .or_else(|| meta.string_value(&markers.configuration_reader, "value"))
        .unwrap_or_default();
    if meta.has_stereotype(&markers.each_property) {
        if prefix.is_empty() {
            "*".to_string()
        } else {
            format!("{}.*", prefix)
        }
    } else {
        prefix.to_string()
    }
}

/// Full prefix of a configuration-properties type, including enclosing types
pub(crate) fn configuration_prefix(
    model: &dyn ProgramModel,
    resolver: &MetadataResolver<'_>,
    markers: &Markers,
    ty: &DeclaredType,
    meta: &AnnotationMetadata,
) -> Option<String> {
    if !meta.has_stereotype(&markers.configuration_reader) {
        return None;
    }
    let mut parts = vec![own_prefix(markers, meta)];
    let mut visited = FxHashSet::default();
    visited.insert(ty.qualified_name());
    let mut enclosing = ty.enclosing.clone();
    while let Some(name) = enclosing {
        if !visited.insert(name.clone()) {
            break;
        }
        let Some(outer) = model.resolve_type(&name) else {
            break;
        };
        let outer_meta = resolver.for_type(outer);
        if !outer_meta.has_stereotype(&markers.configuration_reader) {
            break;
        }
        parts.push(own_prefix(markers, &outer_meta));
        enclosing = outer.enclosing.clone();
    }

    let prefix = parts
        .iter()
        .rev()
        .filter(|p| !p.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join(".");
    Some(prefix)
}

/// Record a configuration builder and the paths of its setters
pub(crate) fn visit_builder(
    scope: &TypeScope<'_>,
    acc: &mut Accumulator,
    builder_type: &TypeRef,
    meta: &AnnotationMetadata,
    point: MemberPoint,
    element: ElementRef,
) -> Result<(), ProcessingError> {
    let marker = &scope.markers().configuration_builder;
    let decl = builder_type
        .name()
        .and_then(|name| scope.model.resolve_type(name))
        .ok_or_else(|| ProcessingError::UnresolvedType {
            element,
            name: builder_type.to_string(),
        })?;

    let mut base = scope.configuration_prefix.clone().unwrap_or_default();
    if let Some(value) = meta
        .string_value(marker, "value")
        .or_else(|| meta.string_value(marker, "configurationPrefix"))
        .filter(|v| !v.is_empty())
    {
        base = if base.is_empty() {
            value.to_string()
        } else {
            format!("{}.{}", base, value)
        };
    }
    let prefixes: Vec<&str> = match meta.value(marker, "prefixes") {
        Some(v) => v.to_list().into_iter().filter_map(|p| p.as_str()).collect(),
        None => vec!["set"],
    };
    let allow_zero_args = meta.bool_value(marker, "allowZeroArgs").unwrap_or(false);

    let mut paths = Vec::new();
    for (_, method) in decl.methods() {
        if !method.modifiers.is_public() || method.modifiers.is_static {
            continue;
        }
        let ty = match method.params.as_slice() {
            [param] => param.ty.clone(),
            [] if allow_zero_args => TypeRef::primitive(PrimitiveKind::Boolean),
            _ => continue,
        };
        let Some(stripped) = prefixes
            .iter()
            .find_map(|prefix| strip_accessor_prefix(&method.name, prefix))
            .filter(|s| !s.is_empty())
        else {
            continue;
        };
        let path = property_path(&base, stripped);
        acc.record_configuration(ConfigurationProperty {
            path: path.clone(),
            ty,
            declaring_type: decl.qualified_name(),
            member: method.name.clone(),
        });
        paths.push(path);
    }

    if let Some(definition) = acc.target() {
        definition.builder_properties.push(BuilderPoint {
            point,
            builder_type: builder_type.clone(),
            paths,
        });
    }
    Ok(())
}
