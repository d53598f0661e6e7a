//! Dispatch keys.
//!
//! A `TypeKey` names the runtime type of a value. Plugins claim keys, and the
//! dispatcher resolves a verb by the key of its subject plus the subject's
//! ancestry (supertypes and capability tags), nearest first.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Name of a runtime data type used as a dispatch key.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeKey(Cow<'static, str>);

impl TypeKey {
    pub const NULL: TypeKey = TypeKey::new("null");
    pub const BOOL: TypeKey = TypeKey::new("bool");
    pub const INT: TypeKey = TypeKey::new("int");
    pub const FLOAT: TypeKey = TypeKey::new("float");
    pub const STR: TypeKey = TypeKey::new("str");
    pub const LIST: TypeKey = TypeKey::new("list");
    pub const GROUPS: TypeKey = TypeKey::new("groups");
    pub const FUNCTION: TypeKey = TypeKey::new("function");
    pub const VERB: TypeKey = TypeKey::new("verb");
    pub const EXPR: TypeKey = TypeKey::new("expr");

    /// Capability tag shared by `int` and `float`.
    pub const NUMBER: TypeKey = TypeKey::new("number");
    /// Capability tag shared by all single-element values.
    pub const SCALAR: TypeKey = TypeKey::new("scalar");
    /// Root of every ancestry chain.
    pub const ANY: TypeKey = TypeKey::new("any");

    pub const fn new(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn owned(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.0)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for TypeKey {
    fn from(name: &'static str) -> Self {
        TypeKey::new(name)
    }
}

/// A dispatch key together with its ordered ancestry.
///
/// The ancestry never contains `key` itself and always ends with
/// [`TypeKey::ANY`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    pub key: TypeKey,
    pub ancestry: Vec<TypeKey>,
}

impl TypeInfo {
    pub fn new(key: TypeKey, ancestry: impl IntoIterator<Item = TypeKey>) -> Self {
        let mut chain: Vec<TypeKey> = Vec::new();
        for parent in ancestry {
            if parent != key && !chain.contains(&parent) {
                chain.push(parent);
            }
        }
        if key != TypeKey::ANY {
            chain.retain(|k| *k != TypeKey::ANY);
            chain.push(TypeKey::ANY);
        }
        Self {
            key,
            ancestry: chain,
        }
    }

    /// The key followed by its ancestry, nearest first.
    pub fn chain(&self) -> impl Iterator<Item = &TypeKey> {
        std::iter::once(&self.key).chain(self.ancestry.iter())
    }
}

impl From<TypeKey> for TypeInfo {
    fn from(key: TypeKey) -> Self {
        TypeInfo::new(key, [])
    }
}
