//! Chemical component catalog and descriptive enrichment.
//!
//! Enrichment is presentation data only. Lookups may fail or stall; callers
//! use [`describe_or_default`] (or the timed async variant) so a failure only
//! degrades the description and never the game state.
use serde::{Deserialize, Serialize};

use crate::error::EnrichmentError;

/// The fixed set of aviation-fuel components a researcher can collect.
pub const CHEMICAL_NAMES: [&str; 15] = [
    "Dodecane",
    "Octane",
    "Benzene",
    "Ethanol",
    "Isobutanol",
    "Methanol",
    "Hexane",
    "Cyclohexane",
    "Toluene",
    "Nonane",
    "Acetone",
    "Heptane",
    "Butanol",
    "Phenol",
    "Palmitic acid",
];

/// Catalog spelling of `name`, matched case-insensitively.
#[must_use]
pub fn canonical_chemical(name: &str) -> Option<&'static str> {
    let wanted = name.trim();
    CHEMICAL_NAMES
        .iter()
        .copied()
        .find(|known| known.eq_ignore_ascii_case(wanted))
}

/// Descriptive metadata shown when a chemical is found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChemicalInfo {
    pub name: String,
    pub formula: String,
    pub molecular_weight: Option<f64>,
    pub description: String,
    pub source: String,
}

impl ChemicalInfo {
    /// Fallback used whenever enrichment has no data.
    #[must_use]
    pub fn fallback(name: &str) -> Self {
        Self {
            name: name.to_string(),
            formula: "\u{2014}".to_string(),
            molecular_weight: None,
            description: format!("Chemical component {name} used in aviation fuel research."),
            source: "default".to_string(),
        }
    }
}

/// Opaque source of chemical metadata.
pub trait EnrichmentSource: Send + Sync {
    /// Look up `name`; `Ok(None)` means the source has no entry.
    ///
    /// # Errors
    ///
    /// Returns an `EnrichmentError` when the source cannot be reached.
    fn lookup(&self, name: &str) -> Result<Option<ChemicalInfo>, EnrichmentError>;
}

/// Built-in table covering every catalog chemical.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticEnrichment;

const STATIC_TABLE: [(&str, &str, f64, &str); 15] = [
    (
        "Dodecane",
        "C12H26",
        170.33,
        "A long-chain alkane and a major component of kerosene jet fuel.",
    ),
    (
        "Octane",
        "C8H18",
        114.23,
        "An alkane whose branched isomers set the benchmark for fuel knock resistance.",
    ),
    (
        "Benzene",
        "C6H6",
        78.11,
        "The simplest aromatic hydrocarbon, tightly limited in fuels for toxicity.",
    ),
    (
        "Ethanol",
        "C2H6O",
        46.07,
        "A renewable alcohol blended into fuels as an oxygenate.",
    ),
    (
        "Isobutanol",
        "C4H10O",
        74.12,
        "A branched alcohol studied as a feedstock for alcohol-to-jet fuels.",
    ),
    (
        "Methanol",
        "CH4O",
        32.04,
        "The simplest alcohol, used in fuel synthesis and as an anti-icing additive.",
    ),
    (
        "Hexane",
        "C6H14",
        86.18,
        "A volatile alkane found in light petroleum fractions.",
    ),
    (
        "Cyclohexane",
        "C6H12",
        84.16,
        "A cycloalkane that contributes density and energy content to jet fuel.",
    ),
    (
        "Toluene",
        "C7H8",
        92.14,
        "An aromatic used to raise the octane rating of aviation gasoline.",
    ),
    (
        "Nonane",
        "C9H20",
        128.26,
        "A mid-weight alkane present in kerosene fractions.",
    ),
    (
        "Acetone",
        "C3H6O",
        58.08,
        "A ketone solvent used in fuel system cleaning and analysis.",
    ),
    (
        "Heptane",
        "C7H16",
        100.20,
        "The zero point of the octane rating scale.",
    ),
    (
        "Butanol",
        "C4H10O",
        74.12,
        "A four-carbon alcohol with a higher energy density than ethanol.",
    ),
    (
        "Phenol",
        "C6H6O",
        94.11,
        "An aromatic alcohol and a building block for fuel antioxidants.",
    ),
    (
        "Palmitic acid",
        "C16H32O2",
        256.42,
        "A saturated fatty acid and a common feedstock for sustainable aviation fuel.",
    ),
];

impl EnrichmentSource for StaticEnrichment {
    fn lookup(&self, name: &str) -> Result<Option<ChemicalInfo>, EnrichmentError> {
        let wanted = name.trim();
        Ok(STATIC_TABLE
            .iter()
            .find(|(known, ..)| known.eq_ignore_ascii_case(wanted))
            .map(|(known, formula, weight, description)| ChemicalInfo {
                name: (*known).to_string(),
                formula: (*formula).to_string(),
                molecular_weight: Some(*weight),
                description: (*description).to_string(),
                source: "built-in".to_string(),
            }))
    }
}

/// Resolve metadata for `name`, falling back to the default description.
#[must_use]
pub fn describe_or_default(source: &dyn EnrichmentSource, name: &str) -> ChemicalInfo {
    settle(name, source.lookup(name))
}

fn settle(name: &str, result: Result<Option<ChemicalInfo>, EnrichmentError>) -> ChemicalInfo {
    match result {
        Ok(Some(info)) => info,
        Ok(None) => ChemicalInfo::fallback(name),
        Err(err) => {
            log::warn!("chemical enrichment degraded: {err}");
            ChemicalInfo::fallback(name)
        }
    }
}

/// Await `lookup` for at most `timeout`, falling back to the default description.
#[cfg(feature = "async")]
pub async fn describe_with_timeout<F>(
    name: &str,
    lookup: F,
    timeout: std::time::Duration,
) -> ChemicalInfo
where
    F: std::future::Future<Output = Result<Option<ChemicalInfo>, EnrichmentError>>,
{
    let result = match tokio::time::timeout(timeout, lookup).await {
        Ok(result) => result,
        Err(_) => Err(EnrichmentError::TimedOut {
            name: name.to_string(),
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    };
    settle(name, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSource;

    impl EnrichmentSource for FailingSource {
        fn lookup(&self, name: &str) -> Result<Option<ChemicalInfo>, EnrichmentError> {
            Err(EnrichmentError::Unavailable {
                name: name.to_string(),
                reason: "offline".to_string(),
            })
        }
    }

    #[test]
    fn catalog_is_verbatim() {
        assert_eq!(CHEMICAL_NAMES.len(), 15);
        assert_eq!(CHEMICAL_NAMES[0], "Dodecane");
        assert_eq!(CHEMICAL_NAMES[14], "Palmitic acid");
        assert_eq!(canonical_chemical(" palmitic ACID"), Some("Palmitic acid"));
        assert_eq!(canonical_chemical("Kerosene"), None);
    }

    #[test]
    fn static_table_covers_catalog() {
        for name in CHEMICAL_NAMES {
            let info = StaticEnrichment.lookup(name).unwrap().expect("entry");
            assert_eq!(info.name, name);
            assert!(info.molecular_weight.is_some());
        }
    }

    #[test]
    fn failures_degrade_to_default_description() {
        let info = describe_or_default(&FailingSource, "Octane");
        assert_eq!(info, ChemicalInfo::fallback("Octane"));
        assert!(info.description.contains("aviation fuel research"));
        assert_eq!(info.molecular_weight, None);

        let missing = describe_or_default(&StaticEnrichment, "Kerosene");
        assert_eq!(missing.source, "default");

        let found = describe_or_default(&StaticEnrichment, "octane");
        assert_eq!(found.formula, "C8H18");
        assert_eq!(found.molecular_weight, Some(114.23));
    }

    #[cfg(feature = "async")]
    #[tokio::test]
    async fn stalled_lookup_times_out_to_default() {
        let stalled = async {
            tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            Ok(Some(ChemicalInfo::fallback("never")))
        };
        let info =
            describe_with_timeout("Benzene", stalled, std::time::Duration::from_millis(50)).await;
        assert_eq!(info, ChemicalInfo::fallback("Benzene"));
    }
}
