//! Holders and the shorthand addressing grammar
//!
//! A holder is the program element (type, method or property) that metadata is
//! attached to. References name their targets with a compact address that is
//! interpreted relative to the holder of the node declaring the reference:
//!
//! ```text
//! ""                      the holder's own type
//! "User"                  type User in the holder's namespace
//! "app::dto::User"        fully qualified type
//! "::User"                type User in the root namespace
//! ".email" / "User.email" property of a type
//! "@key" / "User@key"     method of a type
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, RoutedocError};

/// Namespace separator used in type paths
pub const NAMESPACE_SEPARATOR: &str = "::";

const METHOD_MARKER: char = '@';
const PROPERTY_MARKER: char = '.';

/// Namespace part of a type path (`app::dto` for `app::dto::User`)
pub fn namespace_of(type_name: &str) -> Option<&str> {
    type_name
        .rsplit_once(NAMESPACE_SEPARATOR)
        .map(|(ns, _)| ns)
        .filter(|ns| !ns.is_empty())
}

/// Short name of a type path (`User` for `app::dto::User`)
pub fn short_name(type_name: &str) -> &str {
    type_name
        .rsplit_once(NAMESPACE_SEPARATOR)
        .map(|(_, name)| name)
        .unwrap_or(type_name)
}

/// Member part of an address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Member {
    /// Class-level target
    None,
    /// Method of the target type
    Method(String),
    /// Property of the target type
    Property(String),
}

/// A parsed reference address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Address {
    pub type_name: String,
    pub member: Member,
}

impl Address {
    /// Split a raw address into its type part and member.
    ///
    /// The method marker wins over the property marker when both are present.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some((ty, method)) = raw.split_once(METHOD_MARKER) {
            return Self {
                type_name: ty.to_string(),
                member: Member::Method(method.to_string()),
            };
        }
        if let Some((ty, property)) = raw.split_once(PROPERTY_MARKER) {
            return Self {
                type_name: ty.to_string(),
                member: Member::Property(property.to_string()),
            };
        }
        Self {
            type_name: raw.to_string(),
            member: Member::None,
        }
    }

    /// Fill in the type part from the holder context.
    ///
    /// An empty type becomes the holder's declaring type; an unqualified type
    /// is prefixed with the holder's namespace; a leading `::` pins the type to
    /// the root namespace.
    pub fn normalize(mut self, holder: Option<&HolderRef>) -> Self {
        if let Some(rooted) = self.type_name.strip_prefix(NAMESPACE_SEPARATOR) {
            self.type_name = rooted.to_string();
            return self;
        }
        let Some(holder) = holder else {
            return self;
        };
        if self.type_name.is_empty() {
            self.type_name = holder.declaring_type().to_string();
        } else if !self.type_name.contains(NAMESPACE_SEPARATOR) {
            if let Some(ns) = holder.namespace() {
                self.type_name = format!("{}{}{}", ns, NAMESPACE_SEPARATOR, self.type_name);
            }
        }
        self
    }

    /// Check that every part of a normalized address is present
    pub fn validate(&self, raw: &str) -> Result<()> {
        let empty_member = match &self.member {
            Member::None => false,
            Member::Method(name) | Member::Property(name) => name.is_empty(),
        };
        if self.type_name.is_empty() || empty_member {
            return Err(RoutedocError::InvalidAddress(raw.to_string()));
        }
        Ok(())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Member::None => write!(f, "{}", self.type_name),
            Member::Method(m) => write!(f, "{}{}{}", self.type_name, METHOD_MARKER, m),
            Member::Property(p) => write!(f, "{}{}{}", self.type_name, PROPERTY_MARKER, p),
        }
    }
}

/// The program element a piece of metadata is attached to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum HolderRef {
    Type(String),
    Method { type_name: String, method: String },
    Property { type_name: String, property: String },
}

impl HolderRef {
    pub fn of_type(type_name: impl Into<String>) -> Self {
        HolderRef::Type(type_name.into())
    }

    pub fn method(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        HolderRef::Method {
            type_name: type_name.into(),
            method: method.into(),
        }
    }

    pub fn property(type_name: impl Into<String>, property: impl Into<String>) -> Self {
        HolderRef::Property {
            type_name: type_name.into(),
            property: property.into(),
        }
    }

    /// Parse a holder written in address form (`Type`, `Type@method`, `Type.prop`)
    pub fn parse(raw: &str) -> Result<Self> {
        let address = Address::parse(raw);
        address.validate(raw)?;
        Ok(Self::from(address))
    }

    /// The type itself, or the type declaring the method/property
    pub fn declaring_type(&self) -> &str {
        match self {
            HolderRef::Type(ty) => ty,
            HolderRef::Method { type_name, .. } | HolderRef::Property { type_name, .. } => {
                type_name
            }
        }
    }

    /// Namespace of the declaring type
    pub fn namespace(&self) -> Option<&str> {
        namespace_of(self.declaring_type())
    }
}

impl From<Address> for HolderRef {
    fn from(address: Address) -> Self {
        match address.member {
            Member::None => HolderRef::Type(address.type_name),
            Member::Method(method) => HolderRef::Method {
                type_name: address.type_name,
                method,
            },
            Member::Property(property) => HolderRef::Property {
                type_name: address.type_name,
                property,
            },
        }
    }
}

impl TryFrom<String> for HolderRef {
    type Error = RoutedocError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<HolderRef> for String {
    fn from(holder: HolderRef) -> Self {
        holder.to_string()
    }
}

impl fmt::Display for HolderRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HolderRef::Type(ty) => write!(f, "{}", ty),
            HolderRef::Method { type_name, method } => {
                write!(f, "{}{}{}", type_name, METHOD_MARKER, method)
            }
            HolderRef::Property { type_name, property } => {
                write!(f, "{}{}{}", type_name, PROPERTY_MARKER, property)
            }
        }
    }
}
