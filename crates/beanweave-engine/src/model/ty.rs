//! Type references used by declared members

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualified name of the root reference type every reference type is assignable to
pub const OBJECT_TYPE: &str = "lang.Object";

/// Primitive value types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    /// `boolean`
    Boolean,
    /// `byte`
    Byte,
    /// `short`
    Short,
    /// `char`
    Char,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
}

impl PrimitiveKind {
    /// Source-level keyword of the primitive
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A reference to a type as written on a member signature
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeRef {
    /// No value (method return only)
    Void,

    /// A primitive value type
    Primitive {
        /// Which primitive
        primitive: PrimitiveKind,
    },

    /// A declared reference type, optionally parameterized
    Named {
        /// Qualified name of the referenced type
        name: String,
        /// Type arguments
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<TypeRef>,
    },

    /// Array of some element type
    Array {
        /// Element type
        element: Box<TypeRef>,
    },

    /// A type variable, with an optional upper bound
    Var {
        /// Variable name as declared
        name: String,
        /// Upper bound (defaults to the root type)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        bound: Option<Box<TypeRef>>,
    },
}

impl TypeRef {
    /// Plain named type without arguments
    pub fn named(name: impl Into<String>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Parameterized named type
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        TypeRef::Named {
            name: name.into(),
            args,
        }
    }

    /// Primitive type
    pub fn primitive(primitive: PrimitiveKind) -> Self {
        TypeRef::Primitive { primitive }
    }

    /// Array of `element`
    pub fn array(element: TypeRef) -> Self {
        TypeRef::Array {
            element: Box::new(element),
        }
    }

    /// Unbounded type variable
    pub fn var(name: impl Into<String>) -> Self {
        TypeRef::Var {
            name: name.into(),
            bound: None,
        }
    }

    /// Type variable with an upper bound
    pub fn bounded_var(name: impl Into<String>, bound: TypeRef) -> Self {
        TypeRef::Var {
            name: name.into(),
            bound: Some(Box::new(bound)),
        }
    }

    /// The root reference type
    pub fn object() -> Self {
        TypeRef::named(OBJECT_TYPE)
    }

    pub fn is_void(&self) -> bool {
        matches!(self, TypeRef::Void)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, TypeRef::Primitive { .. })
    }

    pub fn is_array(&self) -> bool {
        matches!(self, TypeRef::Array { .. })
    }

    /// Qualified name for named types
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Named { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Name of the type after erasing arguments and variables
    pub fn erasure(&self) -> String {
        match self {
            TypeRef::Void => "void".to_string(),
            TypeRef::Primitive { primitive } => primitive.name().to_string(),
            TypeRef::Named { name, .. } => name.clone(),
            TypeRef::Array { element } => format!("{}[]", element.erasure()),
            TypeRef::Var { bound, .. } => match bound {
                Some(bound) => bound.erasure(),
                None => OBJECT_TYPE.to_string(),
            },
        }
    }

    /// Replace bound type variables
    pub fn substitute(&self, bindings: &FxHashMap<String, TypeRef>) -> TypeRef {
        match self {
            TypeRef::Var { name, .. } => match bindings.get(name) {
                Some(bound) => bound.clone(),
                None => self.clone(),
            },
            TypeRef::Named { name, args } => TypeRef::Named {
                name: name.clone(),
                args: args.iter().map(|a| a.substitute(bindings)).collect(),
            },
            TypeRef::Array { element } => TypeRef::array(element.substitute(bindings)),
            TypeRef::Void | TypeRef::Primitive { .. } => self.clone(),
        }
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeRef::Void => write!(f, "void"),
            TypeRef::Primitive { primitive } => write!(f, "{}", primitive),
            TypeRef::Named { name, args } => {
                write!(f, "{}", name)?;
                if !args.is_empty() {
                    write!(f, "<")?;
                    for (i, arg) in args.iter().enumerate() {
                        if i > 0 {
                            write!(f, ", ")?;
                        }
                        write!(f, "{}", arg)?;
                    }
                    write!(f, ">")?;
                }
                Ok(())
            }
            TypeRef::Array { element } => write!(f, "{}[]", element),
            TypeRef::Var { name, .. } => write!(f, "{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_generic() {
        let ty = TypeRef::generic(
            "util.Map",
            vec![TypeRef::named("lang.String"), TypeRef::var("V")],
        );
        assert_eq!(ty.to_string(), "util.Map<lang.String, V>");
        assert_eq!(
            TypeRef::array(TypeRef::primitive(PrimitiveKind::Int)).to_string(),
            "int[]"
        );
    }

    #[test]
    fn test_erasure_of_bounded_var() {
        let var = TypeRef::bounded_var("T", TypeRef::named("lang.Number"));
        assert_eq!(var.erasure(), "lang.Number");
        assert_eq!(TypeRef::var("T").erasure(), OBJECT_TYPE);
    }

    #[test]
    fn test_substitute_nested() {
        let mut bindings = FxHashMap::default();
        bindings.insert("T".to_string(), TypeRef::named("lang.String"));
        let ty = TypeRef::generic("util.List", vec![TypeRef::var("T")]);
        assert_eq!(
            ty.substitute(&bindings),
            TypeRef::generic("util.List", vec![TypeRef::named("lang.String")])
        );
        assert_eq!(TypeRef::var("U").substitute(&bindings), TypeRef::var("U"));
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"kind":"named","name":"a.B","args":[{"kind":"primitive","primitive":"int"}]}"#;
        let ty: TypeRef = serde_json::from_str(json).unwrap();
        assert_eq!(
            ty,
            TypeRef::generic("a.B", vec![TypeRef::primitive(PrimitiveKind::Int)])
        );
    }
}
