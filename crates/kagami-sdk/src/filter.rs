//! Member filters and search queries
//!
//! `MemberFilter` is the binding-flags analogue: a bit set selecting members
//! by visibility and staticness. `MemberQuery` bundles a filter with
//! value-comparable search criteria so that search results can be memoized
//! by key.

use crate::info::{MemberInfo, MemberKind, Modifiers};

/// Member selection flags (bitflags)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberFilter(u8);

impl MemberFilter {
    /// Select nothing
    pub const NONE: Self = Self(0x00);
    /// Include public members
    pub const PUBLIC: Self = Self(0x01);
    /// Include non-public members
    pub const NON_PUBLIC: Self = Self(0x02);
    /// Include instance members
    pub const INSTANCE: Self = Self(0x04);
    /// Include static members
    pub const STATIC: Self = Self(0x08);
    /// Only members declared on the type itself, not inherited ones
    pub const DECLARED_ONLY: Self = Self(0x10);

    /// PUBLIC | INSTANCE | STATIC
    pub const DEFAULT: Self = Self(0x0D);
    /// Every selection flag
    pub const ALL: Self = Self(0x1F);

    /// Create from raw bits
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Check if the filter contains all flags of `other`
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of filters
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Intersection of filters
    pub const fn intersection(&self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Difference (remove flags)
    pub const fn difference(&self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Whether a member with the given modifiers passes this filter
    ///
    /// Visibility and staticness are selected independently; a member must
    /// match on both axes. `DECLARED_ONLY` does not select members, it limits
    /// traversal and is interpreted by the provider.
    pub fn admits(&self, m: Modifiers) -> bool {
        let visibility = if m.is_public {
            self.contains(Self::PUBLIC)
        } else {
            self.contains(Self::NON_PUBLIC)
        };
        let placement = if m.is_static {
            self.contains(Self::STATIC)
        } else {
            self.contains(Self::INSTANCE)
        };
        visibility && placement
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NONE" => Some(Self::NONE),
            "PUBLIC" => Some(Self::PUBLIC),
            "NON_PUBLIC" => Some(Self::NON_PUBLIC),
            "INSTANCE" => Some(Self::INSTANCE),
            "STATIC" => Some(Self::STATIC),
            "DECLARED_ONLY" => Some(Self::DECLARED_ONLY),
            "DEFAULT" => Some(Self::DEFAULT),
            "ALL" => Some(Self::ALL),
            _ => {
                if let Some(hex) = s.strip_prefix("0x") {
                    u8::from_str_radix(hex, 16).ok().map(Self::from_bits)
                } else {
                    s.parse::<u8>().ok().map(Self::from_bits)
                }
            }
        }
    }

    /// Parse combined flags from pipe-separated string
    /// (e.g. `"PUBLIC|STATIC"`)
    pub fn parse_combined(s: &str) -> Option<Self> {
        let mut result = Self::NONE;
        for part in s.split('|') {
            let flag = Self::parse(part.trim())?;
            result = result.union(flag);
        }
        Some(result)
    }
}

impl Default for MemberFilter {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for MemberFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::NONE => write!(f, "NONE"),
            Self::PUBLIC => write!(f, "PUBLIC"),
            Self::NON_PUBLIC => write!(f, "NON_PUBLIC"),
            Self::INSTANCE => write!(f, "INSTANCE"),
            Self::STATIC => write!(f, "STATIC"),
            Self::DECLARED_ONLY => write!(f, "DECLARED_ONLY"),
            Self::DEFAULT => write!(f, "DEFAULT"),
            Self::ALL => write!(f, "ALL"),
            _ => write!(f, "0x{:02X}", self.0),
        }
    }
}

/// Value-comparable member search criteria
///
/// Every criterion is optional; an empty query matched with the default
/// filter returns all public members. The query is `Eq + Hash` so a search
/// can be memoized by (type, query). Predicate-based search is deliberately
/// kept out of this type; see
/// [`TypeIntrospection::find_members_where`](crate::TypeIntrospection::find_members_where).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct MemberQuery {
    /// Restrict to a member kind
    pub kind: Option<MemberKind>,
    /// Exact-name match
    pub name: Option<String>,
    /// Name-prefix match
    pub name_prefix: Option<String>,
    /// Member selection flags
    pub filter: MemberFilter,
}

impl MemberQuery {
    /// Create an empty query with the default filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to a member kind
    pub fn with_kind(mut self, kind: MemberKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Require an exact name
    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    /// Require a name prefix
    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.name_prefix = Some(prefix.to_string());
        self
    }

    /// Replace the member filter
    pub fn with_filter(mut self, filter: MemberFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Whether a member matches the criteria (the filter axis is checked by
    /// the provider during enumeration; this checks kind and name criteria)
    pub fn matches(&self, member: &MemberInfo) -> bool {
        if let Some(kind) = self.kind {
            if member.kind() != kind {
                return false;
            }
        }
        if let Some(name) = &self.name {
            if member.name() != name {
                return false;
            }
        }
        if let Some(prefix) = &self.name_prefix {
            if !member.name().starts_with(prefix.as_str()) {
                return false;
            }
        }
        true
    }
}
