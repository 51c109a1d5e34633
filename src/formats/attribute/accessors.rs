//! Reserved-key accessors.
//!
//! Each well-known key gets three methods on its record type:
//! `contains_k`, `k` and `k_opt`. They are generated by `reserved_key!`
//! on top of the [`Attributed`] trait, which supplies the attribute set and
//! the cardinality context for `Number=A/R/G` keys.

use crate::formats::attribute::number::CardinalityContext;
use crate::formats::attribute::set::AttributeSet;

/// A record that owns an [`AttributeSet`].
pub trait Attributed {
    /// The record's attributes.
    fn attributes(&self) -> &AttributeSet;

    /// Context for resolving `Number=A/R/G`. Records without alleles only
    /// resolve fixed counts.
    fn cardinality(&self) -> CardinalityContext<'_> {
        CardinalityContext::none()
    }
}

/// Generates `contains_k`, `k` and `k_opt` for one reserved key.
///
/// Kinds: `character`, `integer`, `float`, `string`, `byte_array`, `flag`,
/// and the list kinds `integers`, `floats`, `strings`, which also take the
/// key's `Number`.
macro_rules! reserved_key {
    (@contains $key:literal, $contains:ident) => {
        #[doc = concat!("`true` if `", $key, "` is present.")]
        pub fn $contains(&self) -> bool {
            $crate::formats::attribute::Attributed::attributes(self).contains($key)
        }
    };
    (character $key:literal => $contains:ident, $get:ident, $opt:ident) => {
        $crate::formats::attribute::accessors::reserved_key!(@contains $key, $contains);
        #[doc = concat!("`", $key, "` (Character).")]
        pub fn $get(&self) -> $crate::formats::primitives::Result<char> {
            $crate::formats::attribute::Attributed::attributes(self).get_character($key)
        }
        #[doc = concat!("`", $key, "`, `None` when absent.")]
        pub fn $opt(&self) -> $crate::formats::primitives::Result<Option<char>> {
            $crate::formats::attribute::Attributed::attributes(self).get_character_opt($key)
        }
    };
    (integer $key:literal => $contains:ident, $get:ident, $opt:ident) => {
        $crate::formats::attribute::accessors::reserved_key!(@contains $key, $contains);
        #[doc = concat!("`", $key, "` (Integer).")]
        pub fn $get(&self) -> $crate::formats::primitives::Result<i64> {
            $crate::formats::attribute::Attributed::attributes(self).get_integer($key)
        }
        #[doc = concat!("`", $key, "`, `None` when absent.")]
        pub fn $opt(&self) -> $crate::formats::primitives::Result<Option<i64>> {
            $crate::formats::attribute::Attributed::attributes(self).get_integer_opt($key)
        }
    };
    (float $key:literal => $contains:ident, $get:ident, $opt:ident) => {
        $crate::formats::attribute::accessors::reserved_key!(@contains $key, $contains);
        #[doc = concat!("`", $key, "` (Float).")]
        pub fn $get(&self) -> $crate::formats::primitives::Result<f32> {
            $crate::formats::attribute::Attributed::attributes(self).get_float($key)
        }
        #[doc = concat!("`", $key, "`, `None` when absent.")]
        pub fn $opt(&self) -> $crate::formats::primitives::Result<Option<f32>> {
            $crate::formats::attribute::Attributed::attributes(self).get_float_opt($key)
        }
    };
    (string $key:literal => $contains:ident, $get:ident, $opt:ident) => {
        $crate::formats::attribute::accessors::reserved_key!(@contains $key, $contains);
        #[doc = concat!("`", $key, "` (String).")]
        pub fn $get(&self) -> $crate::formats::primitives::Result<&str> {
            $crate::formats::attribute::Attributed::attributes(self).get_string($key)
        }
        #[doc = concat!("`", $key, "`, `None` when absent.")]
        pub fn $opt(&self) -> $crate::formats::primitives::Result<Option<&str>> {
            $crate::formats::attribute::Attributed::attributes(self).get_string_opt($key)
        }
    };
    (byte_array $key:literal => $contains:ident, $get:ident, $opt:ident) => {
        $crate::formats::attribute::accessors::reserved_key!(@contains $key, $contains);
        #[doc = concat!("`", $key, "` (hex byte array).")]
        pub fn $get(&self) -> $crate::formats::primitives::Result<$crate::formats::attribute::HexBytes> {
            $crate::formats::attribute::Attributed::attributes(self).get_byte_array($key)
        }
        #[doc = concat!("`", $key, "`, `None` when absent.")]
        pub fn $opt(
            &self,
        ) -> $crate::formats::primitives::Result<Option<$crate::formats::attribute::HexBytes>> {
            $crate::formats::attribute::Attributed::attributes(self).get_byte_array_opt($key)
        }
    };
    (flag $key:literal => $contains:ident, $get:ident, $opt:ident) => {
        $crate::formats::attribute::accessors::reserved_key!(@contains $key, $contains);
        #[doc = concat!("`", $key, "` (Flag); `false` when absent.")]
        pub fn $get(&self) -> $crate::formats::primitives::Result<bool> {
            $crate::formats::attribute::Attributed::attributes(self).get_flag($key)
        }
        #[doc = concat!("`", $key, "`, `None` when absent.")]
        pub fn $opt(&self) -> $crate::formats::primitives::Result<Option<bool>> {
            $crate::formats::attribute::Attributed::attributes(self).get_flag_opt($key)
        }
    };
    (integers $key:literal [$number:expr] => $contains:ident, $get:ident, $opt:ident) => {
        $crate::formats::attribute::accessors::reserved_key!(@contains $key, $contains);
        #[doc = concat!("`", $key, "` (Integer, Number=", stringify!($number), ").")]
        pub fn $get(&self) -> $crate::formats::primitives::Result<Vec<i64>> {
            let ctx = $crate::formats::attribute::Attributed::cardinality(self);
            $crate::formats::attribute::Attributed::attributes(self).get_integers_n($key, $number, &ctx)
        }
        #[doc = concat!("`", $key, "`, `None` when absent.")]
        pub fn $opt(&self) -> $crate::formats::primitives::Result<Option<Vec<i64>>> {
            let ctx = $crate::formats::attribute::Attributed::cardinality(self);
            $crate::formats::attribute::Attributed::attributes(self).get_integers_n_opt($key, $number, &ctx)
        }
    };
    (floats $key:literal [$number:expr] => $contains:ident, $get:ident, $opt:ident) => {
        $crate::formats::attribute::accessors::reserved_key!(@contains $key, $contains);
        #[doc = concat!("`", $key, "` (Float, Number=", stringify!($number), ").")]
        pub fn $get(&self) -> $crate::formats::primitives::Result<Vec<f32>> {
            let ctx = $crate::formats::attribute::Attributed::cardinality(self);
            $crate::formats::attribute::Attributed::attributes(self).get_floats_n($key, $number, &ctx)
        }
        #[doc = concat!("`", $key, "`, `None` when absent.")]
        pub fn $opt(&self) -> $crate::formats::primitives::Result<Option<Vec<f32>>> {
            let ctx = $crate::formats::attribute::Attributed::cardinality(self);
            $crate::formats::attribute::Attributed::attributes(self).get_floats_n_opt($key, $number, &ctx)
        }
    };
    (strings $key:literal [$number:expr] => $contains:ident, $get:ident, $opt:ident) => {
        $crate::formats::attribute::accessors::reserved_key!(@contains $key, $contains);
        #[doc = concat!("`", $key, "` (String, Number=", stringify!($number), ").")]
        pub fn $get(&self) -> $crate::formats::primitives::Result<Vec<&str>> {
            let ctx = $crate::formats::attribute::Attributed::cardinality(self);
            $crate::formats::attribute::Attributed::attributes(self).get_strings_n($key, $number, &ctx)
        }
        #[doc = concat!("`", $key, "`, `None` when absent.")]
        pub fn $opt(&self) -> $crate::formats::primitives::Result<Option<Vec<&str>>> {
            let ctx = $crate::formats::attribute::Attributed::cardinality(self);
            $crate::formats::attribute::Attributed::attributes(self).get_strings_n_opt($key, $number, &ctx)
        }
    };
}

pub(crate) use reserved_key;

/// Implements [`Attributed`] for records that keep their attributes in a
/// `tags` field.
macro_rules! tagged_records {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::formats::attribute::Attributed for $ty {
                fn attributes(&self) -> &$crate::formats::attribute::AttributeSet {
                    &self.tags
                }
            }
        )*
    };
}

pub(crate) use tagged_records;
