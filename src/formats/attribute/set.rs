//! Ordered, key-unique attribute collections and their builder.
//!
//! An [`AttributeSet`] is owned by one record and never changes after the
//! record is built. Insertion order is kept so an unmodified record writes
//! back exactly the text it was parsed from.

use crate::formats::attribute::array::ArrayValue;
use crate::formats::attribute::entry::{check_vcf_key, Attribute};
use crate::formats::attribute::hex::HexBytes;
use crate::formats::attribute::number::{CardinalityContext, Number};
use crate::formats::attribute::types::TypeCode;
use crate::formats::primitives::{FormatError, Result};

/// Text layout for a serialized attribute set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeStyle {
    /// GFA/PAF: `KEY:TYPE:VALUE` tokens joined by tabs.
    Tag,
    /// VCF INFO: `KEY=VALUE` or bare `KEY`, joined by `;`, `.` when empty.
    Info,
    /// VCF sample column: values only, joined by `:`.
    Format,
}

impl AttributeStyle {
    /// Separator between attributes.
    pub fn delimiter(self) -> char {
        match self {
            AttributeStyle::Tag => '\t',
            AttributeStyle::Info => ';',
            AttributeStyle::Format => ':',
        }
    }
}

/// Attributes of one record, in insertion order, keys unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AttributeSet {
    attributes: Vec<Attribute>,
}

impl AttributeSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new builder.
    pub fn builder() -> AttributeSetBuilder {
        AttributeSetBuilder::default()
    }

    /// Copies this set into a builder, for deriving a modified record.
    pub fn to_builder(&self) -> AttributeSetBuilder {
        AttributeSetBuilder {
            attributes: self.attributes.clone(),
        }
    }

    /// Parses GFA/PAF tag tokens.
    ///
    /// # Examples
    ///
    /// ```
    /// use biotag::formats::attribute::AttributeSet;
    ///
    /// let tags = AttributeSet::from_tag_tokens(["NM:i:5", "MD:Z:10A5"])?;
    /// assert_eq!(tags.get_integer("NM")?, 5);
    /// assert!(AttributeSet::from_tag_tokens(["NM:i:5", "NM:i:6"]).is_err());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_tag_tokens<'a, I>(tokens: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut builder = AttributeSetBuilder::default();
        for token in tokens {
            builder.put(Attribute::from_tag_token(token)?)?;
        }
        Ok(builder.build())
    }

    /// Parses a VCF INFO column. `declared` supplies header types by key.
    pub fn from_info_field<F>(field: &str, declared: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<TypeCode>,
    {
        let mut builder = AttributeSetBuilder::default();
        if field != "." && !field.is_empty() {
            for entry in field.split(';') {
                let key = entry.split_once('=').map_or(entry, |(key, _)| key);
                builder.put(Attribute::from_info_entry(entry, declared(key))?)?;
            }
        }
        Ok(builder.build())
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Attribute for `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Attribute> {
        self.attributes.iter().find(|a| a.key() == key)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Attribute for `key`, or [`FormatError::MissingRequiredValue`].
    pub fn require(&self, key: &str) -> Result<&Attribute> {
        self.get(key).ok_or_else(|| FormatError::MissingRequiredValue {
            key: key.to_string(),
        })
    }

    /// Attributes in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.attributes.iter()
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(Attribute::key)
    }

    /// Decodes every attribute, failing on the first bad one.
    ///
    /// Parsing never does this; call it when a malformed attribute should
    /// reject the record even if nobody reads it.
    pub fn validate(&self) -> Result<()> {
        for attribute in &self.attributes {
            attribute.decode()?;
        }
        Ok(())
    }

    /// Serializes in the given style.
    pub fn to_text(&self, style: AttributeStyle) -> String {
        match style {
            AttributeStyle::Tag => join(self.attributes.iter().map(Attribute::to_tag_token), style),
            AttributeStyle::Info if self.attributes.is_empty() => ".".to_string(),
            AttributeStyle::Info => join(self.attributes.iter().map(Attribute::to_info_entry), style),
            AttributeStyle::Format => join(self.attributes.iter().map(Attribute::raw_value), style),
        }
    }

    /// Sample-column text aligned to a FORMAT key list; absent keys are `.`.
    pub fn format_values<S: AsRef<str>>(&self, keys: &[S]) -> String {
        join(
            keys.iter().map(|key| {
                self.get(key.as_ref())
                    .map_or_else(|| ".".to_string(), Attribute::raw_value)
            }),
            AttributeStyle::Format,
        )
    }

    /// Required `A` value.
    pub fn get_character(&self, key: &str) -> Result<char> {
        self.require(key)?.as_character()
    }

    /// Character, or `None` when absent.
    pub fn get_character_opt(&self, key: &str) -> Result<Option<char>> {
        self.get(key).map(Attribute::as_character).transpose()
    }

    /// Every value of a character field, in order.
    pub fn get_characters(&self, key: &str) -> Result<Vec<char>> {
        self.require(key)?.as_characters()
    }

    /// Characters whose count must match `number` in `ctx`.
    pub fn get_characters_n(&self, key: &str, number: Number, ctx: &CardinalityContext<'_>) -> Result<Vec<char>> {
        self.require(key)?.as_characters_n(number, ctx)
    }

    /// As [`get_characters_n`](Self::get_characters_n), `None` when absent.
    pub fn get_characters_n_opt(
        &self,
        key: &str,
        number: Number,
        ctx: &CardinalityContext<'_>,
    ) -> Result<Option<Vec<char>>> {
        self.get(key).map(|a| a.as_characters_n(number, ctx)).transpose()
    }

    /// Required integer.
    ///
    /// # Errors
    ///
    /// [`FormatError::MissingRequiredValue`] when absent, [`FormatError::WrongType`]
    /// for a non-integer type and [`FormatError::NotNumeric`] when the text
    /// does not parse.
    pub fn get_integer(&self, key: &str) -> Result<i64> {
        self.require(key)?.as_integer()
    }

    /// Integer, or `None` when absent. Other errors still propagate.
    pub fn get_integer_opt(&self, key: &str) -> Result<Option<i64>> {
        self.get(key).map(Attribute::as_integer).transpose()
    }

    /// Integer list; a `B` array with an integer subtype also qualifies.
    pub fn get_integers(&self, key: &str) -> Result<Vec<i64>> {
        self.require(key)?.as_integers()
    }

    /// Integer list, or `None` when absent.
    pub fn get_integers_opt(&self, key: &str) -> Result<Option<Vec<i64>>> {
        self.get(key).map(Attribute::as_integers).transpose()
    }

    /// Integers whose count must match `number` in `ctx`.
    ///
    /// # Examples
    ///
    /// ```
    /// use biotag::formats::attribute::{Attribute, AttributeSet, CardinalityContext, Number};
    /// use biotag::formats::primitives::FormatError;
    ///
    /// let mut builder = AttributeSet::builder();
    /// builder.put(Attribute::integers("AD", &[10, 5, 1]))?;
    /// let fields = builder.build();
    ///
    /// let biallelic = CardinalityContext::sample(1, Some("0/1"));
    /// assert!(matches!(
    ///     fields.get_integers_n("AD", Number::R, &biallelic),
    ///     Err(FormatError::WrongCardinality { expected: 2, actual: 3, .. })
    /// ));
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn get_integers_n(&self, key: &str, number: Number, ctx: &CardinalityContext<'_>) -> Result<Vec<i64>> {
        self.require(key)?.as_integers_n(number, ctx)
    }

    /// As [`get_integers_n`](Self::get_integers_n), `None` when absent.
    pub fn get_integers_n_opt(
        &self,
        key: &str,
        number: Number,
        ctx: &CardinalityContext<'_>,
    ) -> Result<Option<Vec<i64>>> {
        self.get(key).map(|a| a.as_integers_n(number, ctx)).transpose()
    }

    /// Required float.
    pub fn get_float(&self, key: &str) -> Result<f32> {
        self.require(key)?.as_float()
    }

    /// Float, or `None` when absent.
    pub fn get_float_opt(&self, key: &str) -> Result<Option<f32>> {
        self.get(key).map(Attribute::as_float).transpose()
    }

    /// Float list, from `Float` values or a `B:f` array.
    pub fn get_floats(&self, key: &str) -> Result<Vec<f32>> {
        self.require(key)?.as_floats()
    }

    /// Float list, or `None` when absent.
    pub fn get_floats_opt(&self, key: &str) -> Result<Option<Vec<f32>>> {
        self.get(key).map(Attribute::as_floats).transpose()
    }

    /// Floats whose count must match `number` in `ctx`.
    pub fn get_floats_n(&self, key: &str, number: Number, ctx: &CardinalityContext<'_>) -> Result<Vec<f32>> {
        self.require(key)?.as_floats_n(number, ctx)
    }

    /// As [`get_floats_n`](Self::get_floats_n), `None` when absent.
    pub fn get_floats_n_opt(
        &self,
        key: &str,
        number: Number,
        ctx: &CardinalityContext<'_>,
    ) -> Result<Option<Vec<f32>>> {
        self.get(key).map(|a| a.as_floats_n(number, ctx)).transpose()
    }

    /// Required `Z` or VCF `String` value, borrowed.
    pub fn get_string(&self, key: &str) -> Result<&str> {
        self.require(key)?.as_string()
    }

    /// String, or `None` when absent.
    pub fn get_string_opt(&self, key: &str) -> Result<Option<&str>> {
        self.get(key).map(Attribute::as_string).transpose()
    }

    /// Comma-separated string values.
    pub fn get_strings(&self, key: &str) -> Result<Vec<&str>> {
        self.require(key)?.as_strings()
    }

    /// Strings whose count must match `number` in `ctx`.
    pub fn get_strings_n(&self, key: &str, number: Number, ctx: &CardinalityContext<'_>) -> Result<Vec<&str>> {
        self.require(key)?.as_strings_n(number, ctx)
    }

    /// As [`get_strings_n`](Self::get_strings_n), `None` when absent.
    pub fn get_strings_n_opt(
        &self,
        key: &str,
        number: Number,
        ctx: &CardinalityContext<'_>,
    ) -> Result<Option<Vec<&str>>> {
        self.get(key).map(|a| a.as_strings_n(number, ctx)).transpose()
    }

    /// Decoded `H` value.
    pub fn get_byte_array(&self, key: &str) -> Result<HexBytes> {
        self.require(key)?.as_byte_array()
    }

    /// Byte array, or `None` when absent.
    pub fn get_byte_array_opt(&self, key: &str) -> Result<Option<HexBytes>> {
        self.get(key).map(Attribute::as_byte_array).transpose()
    }

    /// Decoded `B` value.
    pub fn get_array(&self, key: &str) -> Result<ArrayValue> {
        self.require(key)?.as_array()
    }

    /// Array, or `None` when absent.
    pub fn get_array_opt(&self, key: &str) -> Result<Option<ArrayValue>> {
        self.get(key).map(Attribute::as_array).transpose()
    }

    /// Flag state; an absent flag is `false`.
    pub fn get_flag(&self, key: &str) -> Result<bool> {
        Ok(self.get_flag_opt(key)?.unwrap_or(false))
    }

    /// Flag state, `None` when absent.
    pub fn get_flag_opt(&self, key: &str) -> Result<Option<bool>> {
        self.get(key).map(Attribute::as_flag).transpose()
    }
}

impl<'a> IntoIterator for &'a AttributeSet {
    type Item = &'a Attribute;
    type IntoIter = std::slice::Iter<'a, Attribute>;

    fn into_iter(self) -> Self::IntoIter {
        self.attributes.iter()
    }
}

/// Appends tag columns to a GFA/PAF line, if there are any.
pub(crate) fn append_tag_columns(line: &mut String, tags: &AttributeSet) {
    for attribute in tags {
        line.push('\t');
        line.push_str(&attribute.to_tag_token());
    }
}

fn join(parts: impl Iterator<Item = String>, style: AttributeStyle) -> String {
    let mut text = String::new();
    for (i, part) in parts.enumerate() {
        if i > 0 {
            text.push(style.delimiter());
        }
        text.push_str(&part);
    }
    text
}

/// Builds an [`AttributeSet`], rejecting duplicate keys.
///
/// The builder is consumed by [`build`](AttributeSetBuilder::build); call
/// [`reset`](AttributeSetBuilder::reset) to clear a builder that is still
/// owned.
#[derive(Debug, Clone, Default)]
pub struct AttributeSetBuilder {
    attributes: Vec<Attribute>,
}

impl AttributeSetBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an attribute.
    ///
    /// Keys follow the VCF rule (ASCII letters, digits, `_` and `.`), which
    /// every two-character SAM-style tag also satisfies. Tag-style output
    /// additionally needs the key to be a letter and then a letter or digit;
    /// see [`is_tag_key`](super::entry::is_tag_key).
    ///
    /// # Errors
    ///
    /// [`FormatError::MalformedToken`] for a key no parser accepts, and
    /// [`FormatError::DuplicateKey`] if the key is already present.
    pub fn put(&mut self, attribute: Attribute) -> Result<&mut Self> {
        check_vcf_key(attribute.key(), attribute.key())?;
        if self.contains(attribute.key()) {
            return Err(FormatError::DuplicateKey {
                key: attribute.key().to_string(),
            });
        }
        self.attributes.push(attribute);
        Ok(self)
    }

    /// Appends an `A` attribute.
    pub fn put_character(&mut self, key: &str, value: char) -> Result<&mut Self> {
        self.put(Attribute::character(key, value))
    }

    /// Appends an integer attribute.
    pub fn put_integer(&mut self, key: &str, value: i64) -> Result<&mut Self> {
        self.put(Attribute::integer(key, value))
    }

    /// Appends an integer list.
    pub fn put_integers(&mut self, key: &str, values: &[i64]) -> Result<&mut Self> {
        self.put(Attribute::integers(key, values))
    }

    /// Appends a float attribute.
    pub fn put_float(&mut self, key: &str, value: f32) -> Result<&mut Self> {
        self.put(Attribute::float(key, value))
    }

    /// Appends a float list.
    pub fn put_floats(&mut self, key: &str, values: &[f32]) -> Result<&mut Self> {
        self.put(Attribute::floats(key, values))
    }

    /// Appends a string attribute.
    pub fn put_string(&mut self, key: &str, value: &str) -> Result<&mut Self> {
        self.put(Attribute::string(key, value))
    }

    /// Appends an `H` attribute.
    pub fn put_byte_array(&mut self, key: &str, value: &HexBytes) -> Result<&mut Self> {
        self.put(Attribute::byte_array(key, value))
    }

    /// Appends a `B` attribute.
    pub fn put_array(&mut self, key: &str, value: &ArrayValue) -> Result<&mut Self> {
        self.put(Attribute::array(key, value))
    }

    /// Appends a VCF flag.
    pub fn put_flag(&mut self, key: &str) -> Result<&mut Self> {
        self.put(Attribute::flag(key))
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: &str) -> bool {
        self.attributes.iter().any(|a| a.key() == key)
    }

    /// Number of attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Whether there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Removes and returns the attribute for `key`.
    pub fn remove(&mut self, key: &str) -> Option<Attribute> {
        let index = self.attributes.iter().position(|a| a.key() == key)?;
        Some(self.attributes.remove(index))
    }

    /// Replaces the attribute with the same key, or appends it.
    ///
    /// Rebuilds the entry list, so this is O(n); use sparingly.
    ///
    /// # Errors
    ///
    /// [`FormatError::MalformedToken`] for a key no parser accepts.
    pub fn replace(&mut self, attribute: Attribute) -> Result<&mut Self> {
        check_vcf_key(attribute.key(), attribute.key())?;
        let rebuilt: Vec<Attribute> = self
            .attributes
            .drain(..)
            .filter(|a| a.key() != attribute.key())
            .collect();
        self.attributes = rebuilt;
        self.attributes.push(attribute);
        Ok(self)
    }

    /// Clears all attributes.
    pub fn reset(&mut self) -> &mut Self {
        self.attributes.clear();
        self
    }

    /// Finishes the set. Insertion order is kept.
    pub fn build(self) -> AttributeSet {
        AttributeSet {
            attributes: self.attributes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags() -> AttributeSet {
        AttributeSet::from_tag_tokens(["NM:i:5", "tp:A:P", "dv:f:0.0123", "SH:H:0A0b", "ZB:B:C,1,255"]).unwrap()
    }

    #[test]
    fn test_tag_round_trip() {
        let set = tags();
        assert_eq!(set.len(), 5);
        assert_eq!(
            set.to_text(AttributeStyle::Tag),
            "NM:i:5\ttp:A:P\tdv:f:0.0123\tSH:H:0A0b\tZB:B:C,1,255"
        );
    }

    #[test]
    fn test_typed_getters() {
        let set = tags();
        assert_eq!(set.get_integer("NM").unwrap(), 5);
        assert_eq!(set.get_character("tp").unwrap(), 'P');
        assert!((set.get_float("dv").unwrap() - 0.0123).abs() < 1e-6);
        assert_eq!(set.get_byte_array("SH").unwrap().bytes(), &[0x0a, 0x0b]);
        assert_eq!(set.get_integers("ZB").unwrap(), vec![1, 255]);
    }

    #[test]
    fn test_missing_vs_optional() {
        let set = tags();
        assert!(matches!(set.get_integer("AS"), Err(FormatError::MissingRequiredValue { .. })));
        assert_eq!(set.get_integer_opt("AS").unwrap(), None);
        assert_eq!(set.get_integer_opt("NM").unwrap(), Some(5));
    }

    #[test]
    fn test_optional_propagates_other_failures() {
        let set = AttributeSet::from_tag_tokens(["NM:Z:five", "AS:i:x"]).unwrap();
        assert!(matches!(set.get_integer_opt("NM"), Err(FormatError::WrongType { .. })));
        assert!(matches!(set.get_integer_opt("AS"), Err(FormatError::NotNumeric { .. })));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut builder = AttributeSet::builder();
        builder.put_integer("NM", 1).unwrap();
        match builder.put_integer("NM", 2) {
            Err(FormatError::DuplicateKey { key }) => assert_eq!(key, "NM"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(matches!(
            AttributeSet::from_tag_tokens(["NM:i:1", "NM:i:1"]),
            Err(FormatError::DuplicateKey { .. })
        ));
    }

    #[test]
    fn test_builder_rejects_unparseable_keys() {
        let mut builder = AttributeSet::builder();
        for key in ["", "N M", "DP=1", "a;b", "x:y"] {
            assert!(
                matches!(builder.put_integer(key, 1), Err(FormatError::MalformedToken { .. })),
                "accepted {:?}",
                key
            );
        }
        assert!(matches!(
            builder.replace(Attribute::string("bad\tkey", "v")),
            Err(FormatError::MalformedToken { .. })
        ));
        assert!(builder.is_empty());

        builder.put_integer("NM", 1).unwrap();
        builder.put_flag("1000G").unwrap();
        builder.put_float("AF_nfe.x", 0.5).unwrap();
        assert_eq!(builder.len(), 3);
    }

    #[test]
    fn test_lazy_validation() {
        let set = AttributeSet::from_tag_tokens(["NM:i:5", "XY:H:0"]).unwrap();
        assert_eq!(set.get_integer("NM").unwrap(), 5);
        assert!(set.validate().is_err());
        assert!(tags().validate().is_ok());
    }

    #[test]
    fn test_info_field() {
        let declared = |key: &str| match key {
            "DP" => Some(TypeCode::Integer),
            "AF" => Some(TypeCode::Float),
            "DB" => Some(TypeCode::Flag),
            _ => None,
        };
        let info = AttributeSet::from_info_field("DP=14;AF=0.5;DB;XX=foo", declared).unwrap();
        assert_eq!(info.get_integer("DP").unwrap(), 14);
        assert_eq!(info.get_floats("AF").unwrap(), vec![0.5]);
        assert!(info.get_flag("DB").unwrap());
        assert!(!info.get_flag("H2").unwrap());
        assert_eq!(info.get_flag_opt("H2").unwrap(), None);
        assert_eq!(info.get_string("XX").unwrap(), "foo");
        assert_eq!(info.to_text(AttributeStyle::Info), "DP=14;AF=0.5;DB;XX=foo");

        let empty = AttributeSet::from_info_field(".", declared).unwrap();
        assert!(empty.is_empty());
        assert_eq!(empty.to_text(AttributeStyle::Info), ".");
    }

    #[test]
    fn test_format_values() {
        let mut builder = AttributeSet::builder();
        builder.put_string("GT", "0/1").unwrap();
        builder.put_integers("AD", &[3, 4]).unwrap();
        let fields = builder.build();

        assert_eq!(fields.to_text(AttributeStyle::Format), "0/1:3,4");
        assert_eq!(fields.format_values(&["GT", "DP", "AD"]), "0/1:.:3,4");
    }

    #[test]
    fn test_remove_replace_reset() {
        let mut builder = tags().to_builder();
        assert!(builder.remove("tp").is_some());
        assert!(builder.remove("tp").is_none());

        builder.replace(Attribute::integer("NM", 7)).unwrap();
        let set = builder.build();
        assert_eq!(set.get_integer("NM").unwrap(), 7);
        assert_eq!(set.keys().collect::<Vec<_>>(), vec!["dv", "SH", "ZB", "NM"]);

        let mut builder = set.to_builder();
        builder.reset();
        assert!(builder.is_empty());
        builder.put_integer("NM", 1).unwrap();
        assert_eq!(builder.build().len(), 1);
    }

    #[test]
    fn test_cardinality_getters() {
        let mut builder = AttributeSet::builder();
        builder.put_integers("AD", &[10, 5, 1]).unwrap();
        builder.put_floats("GL", &[-0.1, -1.0, -5.0]).unwrap();
        let fields = builder.build();

        let ctx = CardinalityContext::sample(1, Some("0/1"));
        assert!(matches!(
            fields.get_integers_n("AD", Number::R, &ctx),
            Err(FormatError::WrongCardinality { expected: 2, actual: 3, .. })
        ));
        assert_eq!(fields.get_floats_n("GL", Number::G, &ctx).unwrap().len(), 3);
        assert_eq!(fields.get_integers_n_opt("PL", Number::G, &ctx).unwrap(), None);

        let haploid = CardinalityContext::sample(1, Some("1"));
        assert!(matches!(
            fields.get_floats_n("GL", Number::G, &haploid),
            Err(FormatError::WrongCardinality { expected: 2, .. })
        ));
    }
}
