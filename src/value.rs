// (c) Copyright 2025 Helsing GmbH. All rights reserved.
use std::{
    fmt,
    hash::{Hash, Hasher},
};

/// A scalar stored under a key.
///
/// There is deliberately no null variant: "no value" is expressed as `Option::None` by the
/// operations that can observe it (for example [`KeyValueStore::get`](crate::KeyValueStore::get)),
/// so falsy values like `0`, `false` or `""` are ordinary values.
///
/// Doubles compare and hash by their bit pattern (via [`f64::total_cmp`]), which makes `Value`
/// usable as a map key. In particular `0.0` and `-0.0` are distinct values, and a NaN is equal to
/// itself.
#[derive(Clone)]
#[cfg_attr(feature = "serde", derive(::serde::Deserialize, ::serde::Serialize))]
pub enum Value {
    Bytes(#[cfg_attr(feature = "serde", serde(with = "serde_bytes"))] Vec<u8>),
    String(String),
    Double(f64),
    U64(u64),
    I64(i64),
    Bool(bool),
}

impl Value {
    /// A short name for the kind of scalar held.
    pub const fn type_name(&self) -> &'static str {
        match self {
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
            Value::Double(_) => "double",
            Value::U64(_) => "u64",
            Value::I64(_) => "i64",
            Value::Bool(_) => "bool",
        }
    }

    /// Returns the string slice if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

macro_rules! impl_from {
(
    $(
        $source:ty => $target:ident $(with $conv:ident)?
    ),* $(,)?
    ) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self {
                    Self::$target(impl_from!(value$(, $conv)?))
                }
            }
        )*
    };

    ($value:ident, $conv:ident) => {
        $value.$conv()
    };

    ($value:ident) => {
        $value
    };
}

impl_from!(
    &[u8]      => Bytes with into,
    Vec<u8>    => Bytes,
    String     => String,
    &str       => String with to_string,
    f64        => Double,
    u8         => U64 with into,
    u16        => U64 with into,
    u32        => U64 with into,
    u64        => U64,
    i8         => I64 with into,
    i16        => I64 with into,
    i32        => I64 with into,
    i64        => I64,
    bool       => Bool,
);

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(inner) => write!(f, "{inner:02X?}"),
            Self::String(inner) => inner.fmt(f),
            Self::Bool(inner) => inner.fmt(f),
            // {:?} always prints a decimal, so doubles never read like integers.
            Self::Double(inner) => write!(f, "{inner:?}d"),
            Self::U64(inner) => write!(f, "{inner}u"),
            Self::I64(inner) => write!(f, "{inner}"),
        }
    }
}

/// Renders the value the way the shell prints it: strings verbatim, numbers and booleans in
/// their usual textual form, bytes as lowercase hex.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bytes(inner) => inner.iter().try_for_each(|b| write!(f, "{b:02x}")),
            Self::String(inner) => f.write_str(inner),
            Self::Double(inner) => inner.fmt(f),
            Self::U64(inner) => inner.fmt(f),
            Self::I64(inner) => inner.fmt(f),
            Self::Bool(inner) => inner.fmt(f),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Bytes(b1), Bytes(b2)) => b1.eq(b2),
            (String(s1), String(s2)) => s1.eq(s2),
            (Double(d1), Double(d2)) => d1.total_cmp(d2).is_eq(),
            (U64(u1), U64(u2)) => u1.eq(u2),
            (I64(i1), I64(i2)) => i1.eq(i2),
            (Bool(b1), Bool(b2)) => b1.eq(b2),
            _ => false,
        }
    }
}
impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Bytes(b) => b.hash(state),
            Value::String(s) => s.hash(state),
            // consistent with `total_cmp` equality above
            Value::Double(d) => d.to_bits().hash(state),
            Value::U64(u) => u.hash(state),
            Value::I64(i) => i.hash(state),
            Value::Bool(b) => b.hash(state),
        }
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        matches!(self, Self::String(s) if s == other)
    }
}
impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        matches!(self, Self::String(s) if s == other)
    }
}
impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        matches!(self, Self::Bool(b) if b == other)
    }
}
impl PartialEq<f64> for Value {
    fn eq(&self, other: &f64) -> bool {
        matches!(self, Self::Double(f) if f.total_cmp(other).is_eq())
    }
}
impl PartialEq<u64> for Value {
    fn eq(&self, other: &u64) -> bool {
        match self {
            Self::U64(u) => u == other,
            Self::I64(i) => u64::try_from(*i).is_ok_and(|u| &u == other),
            Self::Bytes(_) | Self::String(_) | Self::Double(_) | Self::Bool(_) => false,
        }
    }
}
impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        match self {
            Self::U64(u) => i64::try_from(*u).is_ok_and(|i| &i == other),
            Self::I64(i) => i == other,
            Self::Bytes(_) | Self::String(_) | Self::Double(_) | Self::Bool(_) => false,
        }
    }
}
// i32 because it's the "default" inference integer type
impl PartialEq<i32> for Value {
    fn eq(&self, other: &i32) -> bool {
        self == &i64::from(*other)
    }
}

#[cfg(any(test, feature = "arbitrary"))]
mod arbitrary {
    use super::Value;
    use quickcheck::{Arbitrary, Gen};

    impl Arbitrary for Value {
        fn arbitrary(g: &mut Gen) -> Self {
            // A narrow domain makes distinct keys collide on the same value often, which is
            // where the count index gets interesting.
            match *g
                .choose(&["string", "i64", "u64", "bool", "double", "bytes"])
                .unwrap()
            {
                "string" => Self::String(g.choose(&["", "a", "b", "10"]).unwrap().to_string()),
                "i64" => Self::I64(*g.choose(&[0, 1, -1, 10]).unwrap()),
                "u64" => Self::U64(*g.choose(&[0, 1, 10]).unwrap()),
                "bool" => Self::Bool(bool::arbitrary(g)),
                "double" => Self::Double(*g.choose(&[0.0, -0.0, 1.5]).unwrap()),
                "bytes" => {
                    Self::Bytes(g.choose(&[&b""[..], &b"\x00"[..], &b"ab"[..]]).unwrap().to_vec())
                }
                _ => unreachable!(),
            }
        }

        fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
            match self {
                Value::Bytes(v) => Box::new(v.shrink().map(Value::Bytes)),
                Value::String(v) => Box::new(v.shrink().map(Value::String)),
                Value::Double(v) => Box::new(v.shrink().map(Value::Double)),
                Value::U64(v) => Box::new(v.shrink().map(Value::U64)),
                Value::I64(v) => Box::new(v.shrink().map(Value::I64)),
                Value::Bool(v) => Box::new(v.shrink().map(Value::Bool)),
            }
        }
    }
}
