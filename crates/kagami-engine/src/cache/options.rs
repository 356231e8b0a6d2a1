//! Cache category flags (bitflags)

/// Selects which query categories the cache memoizes
///
/// Flags compose with [`union`](CacheOptions::union); each category is an
/// independent memoization region, so enabling one never affects the
/// hit/miss behavior of another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheOptions(u8);

impl CacheOptions {
    /// Cache nothing
    pub const NONE: Self = Self(0x00);
    /// Cache attribute lookups (including the is-defined variant)
    pub const ATTRIBUTES: Self = Self(0x01);
    /// Cache member enumeration (fields, methods)
    pub const MEMBERS: Self = Self(0x02);
    /// Cache criteria-based member search
    pub const SEARCH: Self = Self(0x04);
    /// Cache generic instantiation
    pub const GENERICS: Self = Self(0x08);
    /// Cache every category
    pub const ALL: Self = Self(0x0F);

    /// Create from raw bits
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u8 {
        self.0
    }

    /// Check if the options contain all flags of `other`
    pub const fn contains(&self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }

    /// Union of options
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Intersection of options
    pub const fn intersection(&self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Difference (remove flags)
    pub const fn difference(&self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Parse from string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "NONE" => Some(Self::NONE),
            "ATTRIBUTES" => Some(Self::ATTRIBUTES),
            "MEMBERS" => Some(Self::MEMBERS),
            "SEARCH" => Some(Self::SEARCH),
            "GENERICS" => Some(Self::GENERICS),
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
    /// (e.g. `"ATTRIBUTES|GENERICS"`), as read from configuration files
    pub fn parse_combined(s: &str) -> Option<Self> {
        let mut result = Self::NONE;
        for part in s.split('|') {
            let flag = Self::parse(part.trim())?;
            result = result.union(flag);
        }
        Some(result)
    }
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self::NONE
    }
}

impl std::fmt::Display for CacheOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::NONE => write!(f, "NONE"),
            Self::ATTRIBUTES => write!(f, "ATTRIBUTES"),
            Self::MEMBERS => write!(f, "MEMBERS"),
            Self::SEARCH => write!(f, "SEARCH"),
            Self::GENERICS => write!(f, "GENERICS"),
            Self::ALL => write!(f, "ALL"),
            _ => write!(f, "0x{:02X}", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_ops() {
        let opts = CacheOptions::ATTRIBUTES.union(CacheOptions::GENERICS);
        assert!(opts.contains(CacheOptions::ATTRIBUTES));
        assert!(opts.contains(CacheOptions::GENERICS));
        assert!(!opts.contains(CacheOptions::MEMBERS));
        assert_eq!(
            opts.difference(CacheOptions::GENERICS),
            CacheOptions::ATTRIBUTES
        );
        assert_eq!(opts.intersection(CacheOptions::ALL), opts);
    }

    #[test]
    fn test_union_idempotent() {
        let opts = CacheOptions::MEMBERS;
        assert_eq!(opts.union(CacheOptions::MEMBERS), opts);
    }

    #[test]
    fn test_all_and_none() {
        assert!(CacheOptions::ALL.contains(CacheOptions::ATTRIBUTES));
        assert!(CacheOptions::ALL.contains(CacheOptions::SEARCH));
        assert!(!CacheOptions::NONE.contains(CacheOptions::ATTRIBUTES));
        assert_eq!(CacheOptions::default(), CacheOptions::NONE);
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            CacheOptions::parse("attributes"),
            Some(CacheOptions::ATTRIBUTES)
        );
        assert_eq!(CacheOptions::parse("ALL"), Some(CacheOptions::ALL));
        assert_eq!(CacheOptions::parse("0x0F"), Some(CacheOptions::ALL));
        assert_eq!(CacheOptions::parse("3"), Some(CacheOptions::from_bits(3)));
        assert_eq!(CacheOptions::parse("bogus"), None);
    }

    #[test]
    fn test_parse_combined() {
        let opts = CacheOptions::parse_combined("ATTRIBUTES | MEMBERS").unwrap();
        assert!(opts.contains(CacheOptions::ATTRIBUTES));
        assert!(opts.contains(CacheOptions::MEMBERS));
        assert!(!opts.contains(CacheOptions::SEARCH));
        assert_eq!(CacheOptions::parse_combined("ATTRIBUTES|nope"), None);
    }

    #[test]
    fn test_display_roundtrip() {
        for opts in [
            CacheOptions::NONE,
            CacheOptions::ATTRIBUTES,
            CacheOptions::MEMBERS,
            CacheOptions::SEARCH,
            CacheOptions::GENERICS,
            CacheOptions::ALL,
        ] {
            assert_eq!(CacheOptions::parse(&opts.to_string()), Some(opts));
        }
        let combo = CacheOptions::MEMBERS.union(CacheOptions::SEARCH);
        assert_eq!(combo.to_string(), "0x06");
        assert_eq!(CacheOptions::parse(&combo.to_string()), Some(combo));
    }
}
