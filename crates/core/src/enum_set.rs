use serde::{Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// A closed enumeration with a fixed, declared universe of members.
pub trait CapsEnum: Copy + Eq + fmt::Debug + 'static {
    /// Every member, in declaration order.
    const ALL: &'static [Self];

    /// Name used when rendering the member.
    fn as_str(self) -> &'static str;

    /// Position of the member in [`CapsEnum::ALL`].
    fn index(self) -> usize;
}

/// Declares a [`CapsEnum`] together with its `Display`, `FromStr` and serde
/// impls. Each variant is paired with the name it renders as.
macro_rules! caps_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $crate::CapsEnum for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            fn index(self) -> usize {
                self as usize
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str($crate::CapsEnum::as_str(*self))
            }
        }

        impl ::std::str::FromStr for $name {
            type Err = $crate::Error;

            fn from_str(s: &str) -> $crate::Result<Self> {
                match s {
                    $($text => Ok(Self::$variant),)+
                    other => Err($crate::Error::UnknownValue {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
                serializer.serialize_str($crate::CapsEnum::as_str(*self))
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> ::std::result::Result<Self, D::Error> {
                let s = <String as ::serde::Deserialize>::deserialize(deserializer)?;
                s.parse().map_err(::serde::de::Error::custom)
            }
        }
    };
}

pub(crate) use caps_enum;

/// Set of members of a [`CapsEnum`].
///
/// Iteration always follows the enum's declaration order, no matter in which
/// order members were added.
pub struct EnumSet<E: CapsEnum> {
    bits: u64,
    _marker: PhantomData<E>,
}

impl<E: CapsEnum> EnumSet<E> {
    pub fn new() -> Self {
        const { assert!(E::ALL.len() <= u64::BITS as usize) };
        Self {
            bits: 0,
            _marker: PhantomData,
        }
    }

    pub fn set(&mut self, value: E) {
        self.bits |= 1u64 << value.index();
    }

    /// Adds every member of the enum's declared universe.
    pub fn set_all(&mut self) {
        for &value in E::ALL {
            self.set(value);
        }
    }

    pub fn contains(&self, value: E) -> bool {
        self.bits & (1u64 << value.index()) != 0
    }

    pub fn clear(&mut self) {
        self.bits = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Members in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = E> + '_ {
        E::ALL.iter().copied().filter(|value| self.contains(*value))
    }

    pub fn to_vec(&self) -> Vec<E> {
        self.iter().collect()
    }
}

impl<E: CapsEnum> Default for EnumSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: CapsEnum> Clone for EnumSet<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: CapsEnum> Copy for EnumSet<E> {}

impl<E: CapsEnum> PartialEq for EnumSet<E> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<E: CapsEnum> Eq for EnumSet<E> {}

impl<E: CapsEnum> fmt::Debug for EnumSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<E: CapsEnum> FromIterator<E> for EnumSet<E> {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<E: CapsEnum> Extend<E> for EnumSet<E> {
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for value in iter {
            self.set(value);
        }
    }
}

impl<E: CapsEnum> Serialize for EnumSet<E> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().map(CapsEnum::as_str))
    }
}
