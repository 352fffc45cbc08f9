//! Strongly typed, zero-cost identifier wrappers.
//!
//! Two families live here:
//!
//! - **Graph indices** (`NodeId`, `EdgeId`): dense `u32` positions into the
//!   CSR arrays of a request-scoped `RoadGraph`.  They are only meaningful
//!   for the graph that produced them.
//! - **Record ids** (`LocationId`, `RouteId`, `SegmentId`, `UserId`): `i64`
//!   row ids assigned by the persistence layer.

use std::fmt;

/// Generate a typed index wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID", equal to `u32::MAX`.
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

/// Generate a persisted-row id wrapper around `i64`.
macro_rules! record_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }
    };
}

typed_id! {
    /// Index of a road-network node (intersection).
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed road-network edge (road segment).
    pub struct EdgeId(u32);
}

record_id! {
    /// Row id of a persisted `Location`.
    pub struct LocationId;
}

record_id! {
    /// Row id of a persisted `Route`.
    pub struct RouteId;
}

record_id! {
    /// Row id of a persisted `RouteSegment`.
    pub struct SegmentId;
}

record_id! {
    /// Id of the user a route was planned for.  Users are owned by an
    /// external identity service; the engine only stores the id.
    pub struct UserId;
}
