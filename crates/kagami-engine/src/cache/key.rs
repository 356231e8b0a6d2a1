//! Composite cache keys
//!
//! One key type per cache region. Keys pair the defining element (a handle,
//! compared by value) with the query arguments; argument sequences compare
//! element-wise in order, and sequences of different lengths are never
//! equal — both properties fall out of the derived `Eq`/`Hash` on the
//! component types.

use kagami_sdk::{ElementRef, MemberFilter, MemberQuery, MethodHandle, TypeHandle};

use crate::registry::GenericDef;

/// Key for attribute lookups: the element plus the optional kind filter
///
/// The unfiltered list query and the filtered one occupy disjoint key space
/// via the `Option`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttrKey {
    /// The queried element
    pub element: ElementRef,
    /// Attribute-kind filter, if the query was filtered
    pub kind: Option<Box<str>>,
}

impl AttrKey {
    /// Key for an unfiltered attribute query
    pub fn unfiltered(element: ElementRef) -> Self {
        Self {
            element,
            kind: None,
        }
    }

    /// Key for a kind-filtered attribute query
    pub fn of_kind(element: ElementRef, kind: &str) -> Self {
        Self {
            element,
            kind: Some(kind.into()),
        }
    }
}

/// Key for member enumeration: the type plus the member filter
///
/// Field and method enumerations live in separate regions, so the key does
/// not need a kind discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemberKey {
    /// The enumerated type
    pub ty: TypeHandle,
    /// The member filter argument
    pub filter: MemberFilter,
}

/// Key for criteria-based member search: the type plus the full query
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchKey {
    /// The searched type
    pub ty: TypeHandle,
    /// The search criteria
    pub query: MemberQuery,
}

/// Key for generic instantiation: the definition plus the ordered argument
/// sequence
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenericKey {
    /// The generic definition (type or method)
    pub def: GenericDef,
    /// Ordered type arguments
    pub args: Box<[TypeHandle]>,
}

impl GenericKey {
    /// Key for a type instantiation
    pub fn for_type(def: TypeHandle, args: &[TypeHandle]) -> Self {
        Self {
            def: GenericDef::Type(def),
            args: args.into(),
        }
    }

    /// Key for a method instantiation
    pub fn for_method(def: MethodHandle, args: &[TypeHandle]) -> Self {
        Self {
            def: GenericDef::Method(def),
            args: args.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kagami_sdk::{MemberFilter, MethodHandle};

    fn t(raw: u32) -> TypeHandle {
        TypeHandle::from_raw(raw)
    }

    #[test]
    fn test_attr_key_filter_disjoint() {
        let el = ElementRef::Type(t(1));
        let unfiltered = AttrKey::unfiltered(el);
        let filtered = AttrKey::of_kind(el, "route");
        assert_ne!(unfiltered, filtered);
        assert_eq!(filtered, AttrKey::of_kind(el, "route"));
        assert_ne!(filtered, AttrKey::of_kind(el, "entity"));
    }

    #[test]
    fn test_attr_key_equality_properties() {
        let a = AttrKey::of_kind(ElementRef::Type(t(1)), "x");
        let b = AttrKey::of_kind(ElementRef::Type(t(1)), "x");
        let c = AttrKey::of_kind(ElementRef::Type(t(1)), "x");
        // Reflexive, symmetric, transitive
        assert_eq!(a, a);
        assert_eq!(a, b);
        assert_eq!(b, a);
        assert_eq!(b, c);
        assert_eq!(a, c);
    }

    #[test]
    fn test_member_key_distinguishes_filter() {
        let a = MemberKey {
            ty: t(1),
            filter: MemberFilter::DEFAULT,
        };
        let b = MemberKey {
            ty: t(1),
            filter: MemberFilter::ALL,
        };
        assert_ne!(a, b);
        assert_eq!(
            a,
            MemberKey {
                ty: t(1),
                filter: MemberFilter::DEFAULT,
            }
        );
    }

    #[test]
    fn test_generic_key_order_significant() {
        let def = t(1);
        let ab = GenericKey::for_type(def, &[t(10), t(11)]);
        let ba = GenericKey::for_type(def, &[t(11), t(10)]);
        assert_ne!(ab, ba);
        assert_eq!(ab, GenericKey::for_type(def, &[t(10), t(11)]));
    }

    #[test]
    fn test_generic_key_length_significant() {
        let def = t(1);
        let one = GenericKey::for_type(def, &[t(10)]);
        let two = GenericKey::for_type(def, &[t(10), t(10)]);
        let zero = GenericKey::for_type(def, &[]);
        assert_ne!(one, two);
        assert_ne!(one, zero);
    }

    #[test]
    fn test_generic_key_def_kind_disjoint() {
        let as_type = GenericKey::for_type(t(1), &[t(10)]);
        let as_method = GenericKey::for_method(MethodHandle::from_raw(1), &[t(10)]);
        assert_ne!(as_type, as_method);
    }

    #[test]
    fn test_search_key_by_query() {
        let q1 = MemberQuery::new().with_name("run");
        let q2 = MemberQuery::new().with_name("run");
        let q3 = MemberQuery::new().with_prefix("run");
        assert_eq!(
            SearchKey { ty: t(1), query: q1 },
            SearchKey { ty: t(1), query: q2.clone() }
        );
        assert_ne!(
            SearchKey { ty: t(1), query: q2 },
            SearchKey { ty: t(1), query: q3 }
        );
    }
}
