use std::convert::Infallible;
use std::str::FromStr;

use crate::mass_error::MassRange;
use crate::scan::{MsOrder, ScanEventLike, ScanPolarity, SignalContinuity};

use super::token::{tokenize, ScanFilterToken, TokenCategory};

const ANALYZERS: &[&str] = &["FTMS", "ITMS", "TQMS", "SQMS", "TOFMS", "SECTOR", "ASTMS"];

const IONIZATION: &[&str] = &[
    "EI", "CI", "FAB", "ESI", "APCI", "NSI", "TSP", "FD", "MALDI", "GD", "PSI", "CNSI", "APPI",
];

const SCAN_MODES: &[&str] = &["Full", "SIM", "SRM", "CRM", "Z", "Q1MS", "Q3MS"];

/// A precursor parsed from a `mass@activationEnergy` filter fragment
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterPrecursor {
    pub mass: f64,
    /// The lower-cased activation code, e.g. `hcd`, if one was given
    pub activation: Option<String>,
    pub energy: Option<f64>,
}

impl FilterPrecursor {
    /// Parse a [`TokenCategory::ParentMass`] fragment. Only the first activation is
    /// kept when several are chained.
    fn from_token(text: &str) -> Option<Self> {
        let mut parts = text.split('@');
        let mass: f64 = parts.next()?.parse().ok()?;
        let (activation, energy) = match parts.next() {
            Some(act) => {
                let split = act
                    .find(|c: char| c.is_ascii_digit() || c == '.')
                    .unwrap_or(act.len());
                let energy = act[split..].parse().ok();
                (Some(act[..split].to_lowercase()), energy)
            }
            None => (None, None),
        };
        Some(Self {
            mass,
            activation,
            energy,
        })
    }
}

/// A structured description built from the tokens of a scan filter string.
///
/// Parsing is lenient: fragments which cannot be interpreted are kept in
/// [`ScanFilter::keywords`] rather than rejected.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanFilter {
    pub analyzer: Option<String>,
    pub polarity: ScanPolarity,
    pub signal_continuity: SignalContinuity,
    pub ionization: Option<String>,
    pub data_dependent: bool,
    pub scan_mode: Option<String>,
    pub ms_order: MsOrder,
    pub precursors: Vec<FilterPrecursor>,
    pub mass_ranges: Vec<MassRange>,
    pub keywords: Vec<String>,
}

impl ScanFilter {
    pub fn parse(filter: &str) -> Self {
        Self::from_tokens(&tokenize(filter))
    }

    pub fn from_tokens(tokens: &[ScanFilterToken]) -> Self {
        let mut this = Self::default();
        let mut explicit_order = false;
        for token in tokens {
            let text = token.text.trim();
            match token.category {
                TokenCategory::Polarity => {
                    this.polarity = if text == "+" {
                        ScanPolarity::Positive
                    } else {
                        ScanPolarity::Negative
                    };
                }
                TokenCategory::DataFormat => {
                    this.signal_continuity = if text.eq_ignore_ascii_case("p") {
                        SignalContinuity::Profile
                    } else {
                        SignalContinuity::Centroid
                    };
                }
                TokenCategory::DataDependent => this.data_dependent = true,
                TokenCategory::MsOrder => {
                    let level = text.get(2..).and_then(|s| s.parse().ok()).unwrap_or(1u8);
                    this.ms_order = MsOrder::new(level);
                    explicit_order = true;
                }
                TokenCategory::ParentMass => match FilterPrecursor::from_token(text) {
                    Some(prec) => this.precursors.push(prec),
                    None => this.keywords.push(text.to_string()),
                },
                TokenCategory::Range => match parse_range(text) {
                    Some(range) => this.mass_ranges.push(range),
                    None => this.keywords.push(text.to_string()),
                },
                TokenCategory::Generic => this.take_keyword(text),
            }
        }
        if !explicit_order && !this.precursors.is_empty() {
            this.ms_order = MsOrder::new((this.precursors.len() + 1).min(u8::MAX as usize) as u8);
        }
        this
    }

    fn take_keyword(&mut self, text: &str) {
        let upper = text.to_ascii_uppercase();
        if self.analyzer.is_none() && ANALYZERS.contains(&upper.as_str()) {
            self.analyzer = Some(text.to_string());
        } else if self.ionization.is_none() && IONIZATION.contains(&upper.as_str()) {
            self.ionization = Some(text.to_string());
        } else if self.scan_mode.is_none() && SCAN_MODES.contains(&text) {
            self.scan_mode = Some(text.to_string());
        } else {
            self.keywords.push(text.to_string());
        }
    }

    /// The last precursor in the filter, the one selected for this scan
    pub fn precursor(&self) -> Option<&FilterPrecursor> {
        self.precursors.last()
    }
}

fn parse_range(text: &str) -> Option<MassRange> {
    let text = text.trim_matches(|c| c == '[' || c == ']');
    let (low, high) = text.split_once('-')?;
    Some(MassRange::bounded(
        low.trim().parse().ok()?,
        high.trim().parse().ok()?,
    ))
}

impl FromStr for ScanFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl ScanEventLike for ScanFilter {
    fn ms_order(&self) -> MsOrder {
        self.ms_order
    }

    fn precursor_count(&self) -> usize {
        self.precursors.len()
    }

    fn precursor_mass(&self, index: usize) -> Option<f64> {
        self.precursors.get(index).map(|p| p.mass)
    }

    fn polarity(&self) -> ScanPolarity {
        self.polarity
    }

    fn signal_continuity(&self) -> SignalContinuity {
        self.signal_continuity
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_ftms_full_scan() {
        let filter = ScanFilter::parse("FTMS + p NSI Full ms [200.00-2000.00]");
        assert_eq!(filter.polarity, ScanPolarity::Positive);
        assert_eq!(filter.signal_continuity, SignalContinuity::Profile);
        assert_eq!(filter.ms_order, MsOrder::MS1);
        assert_eq!(filter.analyzer.as_deref(), Some("FTMS"));
        assert_eq!(filter.ionization.as_deref(), Some("NSI"));
        assert_eq!(filter.scan_mode.as_deref(), Some("Full"));
        assert_eq!(filter.mass_ranges, vec![MassRange::bounded(200.0, 2000.0)]);
        assert!(filter.precursors.is_empty());
        assert!(!filter.data_dependent);
        assert!(filter.keywords.is_empty());
    }

    #[test]
    fn test_parse_negative_polarity() {
        let filter: ScanFilter = "FTMS - p NSI Full ms [100.00-1500.00]".parse().unwrap();
        assert_eq!(filter.polarity, ScanPolarity::Negative);
        assert_eq!(filter.mass_ranges[0].low(), 100.0);
    }

    #[test]
    fn test_parse_ms2() {
        let filter =
            ScanFilter::parse("FTMS + c NSI d Full ms2 524.2648@hcd28.00 [100.0000-1060.0000]");
        assert_eq!(filter.ms_order, MsOrder::MS2);
        assert!(filter.data_dependent);
        assert_eq!(filter.signal_continuity, SignalContinuity::Centroid);
        let prec = filter.precursor().unwrap();
        assert!((prec.mass - 524.2648).abs() < 1e-4);
        assert_eq!(prec.activation.as_deref(), Some("hcd"));
        assert!((prec.energy.unwrap() - 28.0).abs() < 1e-6);
        assert_eq!(filter.last_precursor_mass(), Some(524.2648));
    }

    #[test]
    fn test_parse_ms3() {
        let filter = ScanFilter::parse(
            "ITMS + c NSI d Full ms3 524.26@hcd28.00 300.15@cid35.00 [100.00-600.00]",
        );
        assert_eq!(filter.ms_order, MsOrder::MS3);
        assert_eq!(filter.precursor_count(), 2);
        let prec = filter.precursor().unwrap();
        assert!((prec.mass - 300.15).abs() < 1e-6);
        assert_eq!(prec.activation.as_deref(), Some("cid"));
    }

    #[test]
    fn test_unknown_keywords_kept() {
        let filter = ScanFilter::parse("FTMS {1,1} + p ESI sps Full ms [100-200]");
        assert_eq!(filter.keywords, vec!["{1,1}".to_string(), "sps".to_string()]);
        assert_eq!(ScanFilter::parse(""), ScanFilter::default());
    }

    #[test]
    fn test_malformed_order_token() {
        let tokens = [ScanFilterToken {
            text: "m".into(),
            category: TokenCategory::MsOrder,
        }];
        let filter = ScanFilter::from_tokens(&tokens);
        assert_eq!(filter.ms_order, MsOrder::MS1);

        let tokens = [ScanFilterToken {
            text: "\u{20ac}".into(),
            category: TokenCategory::MsOrder,
        }];
        assert_eq!(ScanFilter::from_tokens(&tokens).ms_order, MsOrder::MS1);
    }

    #[test]
    fn test_implied_order() {
        let filter = ScanFilter::parse("+ c 500.00@cid35.00");
        assert_eq!(filter.ms_order, MsOrder::MS2);
    }
}
