//! Cardinality resolution for `Number=` declarations.
//!
//! A declared [`Number`] becomes a concrete element count only in the
//! context of a record: `A` and `R` depend on the number of alternate
//! alleles, `G` additionally on the ploidy of the sample's `GT` call.
//! Contexts are cheap and rebuilt on every access, so a count never goes
//! stale when the record changes.

use crate::formats::primitives::{FormatError, Result};
use std::fmt;
use std::str::FromStr;

/// Declared number of values for an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Number {
    /// A fixed count.
    Fixed(usize),
    /// One value per alternate allele.
    A,
    /// One value per allele, reference included.
    R,
    /// One value per possible genotype.
    G,
    /// Any count (`.`).
    Unbounded,
}

impl FromStr for Number {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" => Ok(Number::A),
            "R" => Ok(Number::R),
            "G" => Ok(Number::G),
            "." => Ok(Number::Unbounded),
            _ => s
                .parse::<usize>()
                .map(Number::Fixed)
                .map_err(|_| FormatError::malformed(s, "invalid Number")),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Fixed(n) => write!(f, "{}", n),
            Number::A => f.write_str("A"),
            Number::R => f.write_str("R"),
            Number::G => f.write_str("G"),
            Number::Unbounded => f.write_str("."),
        }
    }
}

/// Values per alternate allele.
#[inline]
pub fn number_a(alternate_alleles: usize) -> usize {
    alternate_alleles
}

/// Values per allele including the reference.
#[inline]
pub fn number_r(alternate_alleles: usize) -> usize {
    alternate_alleles + 1
}

/// Number of unordered genotypes for `alternate_alleles + 1` alleles at the
/// given ploidy.
///
/// # Examples
///
/// ```
/// use biotag::formats::attribute::number_g;
///
/// assert_eq!(number_g(1, 2)?, 3);
/// assert_eq!(number_g(2, 2)?, 6);
/// assert_eq!(number_g(1, 1)?, 2);
/// assert!(number_g(1, 0).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
///
/// # Errors
///
/// [`FormatError::InvalidGenotype`] for ploidy 0, [`FormatError::Overflow`]
/// if the count does not fit.
pub fn number_g(alternate_alleles: usize, ploidy: usize) -> Result<usize> {
    if ploidy == 0 {
        return Err(FormatError::InvalidGenotype {
            reason: "ploidy 0".to_string(),
        });
    }
    let n = alternate_alleles as u64 + ploidy as u64;
    let k = ploidy as u64;
    let count = binomial(n, k)?;
    usize::try_from(count).map_err(|_| FormatError::Overflow { n, k })
}

/// `C(n, k)` by the multiplicative formula, failing when the result does
/// not fit in `u64`.
///
/// Steps run in `u128`, where `result * i` cannot overflow while the
/// running result still fits in `u64`. Each product is divisible by `j`,
/// so the division is exact.
///
/// # Examples
///
/// ```
/// use biotag::formats::attribute::binomial;
///
/// assert_eq!(binomial(64, 32)?, 1_832_624_140_942_590_534);
/// assert!(binomial(200, 100).is_err());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn binomial(n: u64, k: u64) -> Result<u64> {
    if k > n {
        return Ok(0);
    }

    let overflow = || FormatError::Overflow { n, k };
    let k = k.min(n - k);
    let mut result: u64 = 1;
    let mut i = u128::from(n - k + 1);
    for j in 1..=u128::from(k) {
        let step = u128::from(result) * i / j;
        result = u64::try_from(step).map_err(|_| overflow())?;
        i += 1;
    }
    Ok(result)
}

/// Alleles of a `GT` call, split on `/` or `|`.
///
/// # Errors
///
/// [`FormatError::InvalidGenotype`] for an empty call or an empty allele.
pub fn genotype_alleles(genotype: &str) -> Result<Vec<&str>> {
    if genotype.is_empty() {
        return Err(FormatError::InvalidGenotype {
            reason: "empty GT".to_string(),
        });
    }

    let alleles: Vec<&str> = genotype.split(['/', '|']).collect();
    if alleles.iter().any(|allele| allele.is_empty()) {
        return Err(FormatError::InvalidGenotype {
            reason: format!("empty allele in '{}'", genotype),
        });
    }
    Ok(alleles)
}

/// Ploidy of a `GT` call: the number of alleles separated by `/` or `|`.
///
/// A partly missing call such as `0/.` keeps its ploidy. A call with no
/// called allele (`.`, `./.`) has none.
///
/// # Errors
///
/// [`FormatError::InvalidGenotype`] for a malformed or fully missing call.
pub fn ploidy(genotype: &str) -> Result<usize> {
    let alleles = genotype_alleles(genotype)?;
    if alleles.iter().all(|allele| *allele == ".") {
        return Err(FormatError::InvalidGenotype {
            reason: format!("no called alleles in '{}'", genotype),
        });
    }
    Ok(alleles.len())
}

/// Record context used to turn a [`Number`] into an element count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardinalityContext<'a> {
    alternate_alleles: usize,
    genotype: GenotypeScope<'a>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GenotypeScope<'a> {
    Record,
    Sample(Option<&'a str>),
}

impl<'a> CardinalityContext<'a> {
    /// Context for record-level attributes (VCF INFO). `Number=G` cannot be
    /// resolved here.
    pub fn record(alternate_alleles: usize) -> Self {
        CardinalityContext {
            alternate_alleles,
            genotype: GenotypeScope::Record,
        }
    }

    /// Context for one sample's attributes, with its `GT` text if present.
    pub fn sample(alternate_alleles: usize, genotype: Option<&'a str>) -> Self {
        CardinalityContext {
            alternate_alleles,
            genotype: GenotypeScope::Sample(genotype),
        }
    }

    /// Context with no record: only fixed and unbounded counts resolve.
    pub fn none() -> Self {
        Self::record(0)
    }

    /// Number of alternate alleles.
    pub fn alternate_alleles(&self) -> usize {
        self.alternate_alleles
    }

    /// Expected element count, or `None` when any count is accepted.
    ///
    /// # Errors
    ///
    /// [`FormatError::InvalidGenotype`] if `Number=G` is resolved without a
    /// usable `GT`, and [`FormatError::Overflow`] if the genotype count does
    /// not fit.
    pub fn resolve(&self, number: Number) -> Result<Option<usize>> {
        match number {
            Number::Fixed(n) => Ok(Some(n)),
            Number::Unbounded => Ok(None),
            Number::A => Ok(Some(number_a(self.alternate_alleles))),
            Number::R => Ok(Some(number_r(self.alternate_alleles))),
            Number::G => {
                let gt = match self.genotype {
                    GenotypeScope::Sample(Some(gt)) => gt,
                    GenotypeScope::Sample(None) => {
                        return Err(FormatError::InvalidGenotype {
                            reason: "GT is absent".to_string(),
                        })
                    }
                    GenotypeScope::Record => {
                        return Err(FormatError::InvalidGenotype {
                            reason: "Number=G requires a sample genotype".to_string(),
                        })
                    }
                };
                number_g(self.alternate_alleles, ploidy(gt)?).map(Some)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_parse_display() {
        for text in ["A", "R", "G", ".", "0", "4"] {
            assert_eq!(text.parse::<Number>().unwrap().to_string(), text);
        }
        assert_eq!("2".parse::<Number>().unwrap(), Number::Fixed(2));
        assert!("B".parse::<Number>().is_err());
        assert!("-1".parse::<Number>().is_err());
    }

    #[test]
    fn test_a_and_r() {
        assert_eq!(number_a(0), 0);
        assert_eq!(number_a(3), 3);
        assert_eq!(number_r(0), 1);
        assert_eq!(number_r(3), 4);
    }

    #[test]
    fn test_g_examples() {
        assert_eq!(number_g(1, 2).unwrap(), 3);
        assert_eq!(number_g(2, 2).unwrap(), 6);
        assert_eq!(number_g(3, 2).unwrap(), 10);
        assert_eq!(number_g(1, 3).unwrap(), 4);
        assert_eq!(number_g(0, 2).unwrap(), 1);
    }

    #[test]
    fn test_binomial() {
        assert_eq!(binomial(5, 0).unwrap(), 1);
        assert_eq!(binomial(5, 5).unwrap(), 1);
        assert_eq!(binomial(10, 3).unwrap(), 120);
        assert_eq!(binomial(3, 4).unwrap(), 0);
        assert_eq!(binomial(30, 15).unwrap(), 155117520);
    }

    #[test]
    fn test_binomial_overflow() {
        match binomial(200, 100) {
            Err(FormatError::Overflow { n, k }) => assert_eq!((n, k), (200, 100)),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_ploidy() {
        assert_eq!(ploidy("0/1").unwrap(), 2);
        assert_eq!(ploidy("0|1|2").unwrap(), 3);
        assert_eq!(ploidy("1").unwrap(), 1);
        assert_eq!(ploidy("0/.").unwrap(), 2);
        assert!(matches!(ploidy(""), Err(FormatError::InvalidGenotype { .. })));
        assert!(matches!(ploidy("0/"), Err(FormatError::InvalidGenotype { .. })));
    }

    #[test]
    fn test_missing_call_has_no_ploidy() {
        for gt in [".", "./.", ".|."] {
            assert!(matches!(ploidy(gt), Err(FormatError::InvalidGenotype { .. })));
            assert!(matches!(
                CardinalityContext::sample(1, Some(gt)).resolve(Number::G),
                Err(FormatError::InvalidGenotype { .. })
            ));
        }
        assert_eq!(genotype_alleles("./.").unwrap(), vec![".", "."]);
    }

    #[test]
    fn test_binomial_near_u64_limit() {
        assert_eq!(binomial(64, 32).unwrap(), 1_832_624_140_942_590_534);
        assert_eq!(binomial(66, 33).unwrap(), 7_219_428_434_016_265_740);
        assert!(matches!(binomial(68, 34), Err(FormatError::Overflow { .. })));
        assert_eq!(binomial(1000, 2).unwrap(), 499_500);
    }

    #[test]
    fn test_context_resolve() {
        let ctx = CardinalityContext::sample(2, Some("0/1"));
        assert_eq!(ctx.resolve(Number::Fixed(1)).unwrap(), Some(1));
        assert_eq!(ctx.resolve(Number::A).unwrap(), Some(2));
        assert_eq!(ctx.resolve(Number::R).unwrap(), Some(3));
        assert_eq!(ctx.resolve(Number::G).unwrap(), Some(6));
        assert_eq!(ctx.resolve(Number::Unbounded).unwrap(), None);
    }

    #[test]
    fn test_context_g_without_genotype() {
        assert!(matches!(
            CardinalityContext::sample(1, None).resolve(Number::G),
            Err(FormatError::InvalidGenotype { .. })
        ));
        assert!(matches!(
            CardinalityContext::record(1).resolve(Number::G),
            Err(FormatError::InvalidGenotype { .. })
        ));
    }
}
