//! Summarize a set of scalar samples as a fixed number of display bands.
//!
//! Integer-valued categorical data such as charge states get one band per integer
//! between the smallest and largest observed value. Anything else is binned into
//! [`BandingConfig::band_count`] equal-width bands.
#[cfg(feature = "serde")]
use std::io::prelude::*;

use num_traits::ToPrimitive;
use thiserror::Error;

use crate::mass_error::MassRange;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BandIndexError {
    #[error("Band index {index} is out of range for {band_count} bands")]
    IndexOutOfRange { index: usize, band_count: usize },
}

/// What each sample adds to its band
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BandAccumulation {
    /// Every sample adds one
    #[default]
    Count,
    /// Every sample adds its weight
    Magnitude,
}

/// Parameters controlling how samples are banded
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandingConfig {
    /// The number of bands used for continuous data
    pub band_count: usize,
    /// The widest integer span, in bands, still treated as naturally discrete. Wider
    /// categorical data is binned as continuous data instead.
    pub max_discrete_bands: usize,
    /// How far a sample may be from an integer and still count as one
    pub integer_epsilon: f64,
    pub accumulation: BandAccumulation,
}

impl Default for BandingConfig {
    fn default() -> Self {
        Self {
            band_count: 20,
            max_discrete_bands: 64,
            integer_epsilon: 1e-6,
            accumulation: BandAccumulation::Count,
        }
    }
}

impl BandingConfig {
    #[cfg(feature = "serde")]
    /// Write the configuration out in JSON format to `writer`
    pub fn to_writer<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer(writer, self)
    }

    #[cfg(feature = "serde")]
    /// Read a configuration in JSON format from `reader`
    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

/// The result of banding a set of samples.
///
/// Band centers are strictly increasing and spaced `band_width` apart, and
/// `band_values()[i]` belongs to `band_centers()[i]`.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BandedData {
    band_width: f64,
    band_centers: Vec<f64>,
    band_values: Vec<f64>,
    is_naturally_discrete: bool,
}

impl BandedData {
    #[inline]
    pub fn band_count(&self) -> usize {
        self.band_centers.len()
    }

    #[inline]
    pub fn band_width(&self) -> f64 {
        self.band_width
    }

    pub fn band_centers(&self) -> &[f64] {
        &self.band_centers
    }

    pub fn band_values(&self) -> &[f64] {
        &self.band_values
    }

    /// Whether the bands are the source's own integer categories rather than bins
    #[inline]
    pub fn is_naturally_discrete(&self) -> bool {
        self.is_naturally_discrete
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.band_centers.is_empty()
    }

    /// Iterate over `(center, value)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.band_centers
            .iter()
            .copied()
            .zip(self.band_values.iter().copied())
    }

    /// The span of values covered by the band at `index`
    pub fn band_range(&self, index: usize) -> Result<MassRange, BandIndexError> {
        match self.band_centers.get(index) {
            Some(center) => Ok(MassRange::centered(*center, self.band_width / 2.0)),
            None => Err(BandIndexError::IndexOutOfRange {
                index,
                band_count: self.band_count(),
            }),
        }
    }

    /// The value of the band containing `value`, if any does
    pub fn value_at(&self, value: f64) -> Option<f64> {
        let first = *self.band_centers.first()?;
        let start = first - self.band_width / 2.0;
        let offset = (value - start) / self.band_width;
        if offset < 0.0 || !offset.is_finite() {
            return None;
        }
        // The last band is closed on the right
        let index = (offset.floor() as usize).min(self.band_count() - 1);
        let range = self.band_range(index).ok()?;
        range.contains(value).then(|| self.band_values[index])
    }
}

/// Builds [`BandedData`] according to a [`BandingConfig`]
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct BandedHistogram {
    pub config: BandingConfig,
}

impl BandedHistogram {
    pub fn new(config: BandingConfig) -> Self {
        Self { config }
    }

    /// Band `samples`, counting samples or summing them according to
    /// [`BandingConfig::accumulation`].
    ///
    /// When `is_integer_categorical` is set and every sample is an integer within
    /// [`BandingConfig::integer_epsilon`] spanning at most
    /// [`BandingConfig::max_discrete_bands`] values, each integer gets its own band.
    /// Otherwise the samples are binned as continuous data.
    pub fn build<T: ToPrimitive>(&self, samples: &[T], is_integer_categorical: bool) -> BandedData {
        let weighted: Vec<(f64, f64)> = samples
            .iter()
            .filter_map(|s| s.to_f64())
            .map(|s| {
                let weight = match self.config.accumulation {
                    BandAccumulation::Count => 1.0,
                    BandAccumulation::Magnitude => s,
                };
                (s, weight)
            })
            .collect();
        self.build_from_pairs(weighted, is_integer_categorical)
    }

    /// Band `samples`, adding the matching entry of `weights` to each band, e.g. to
    /// total the intensity observed at each charge state. Surplus entries of the
    /// longer slice are ignored.
    pub fn build_weighted<T: ToPrimitive, W: ToPrimitive>(
        &self,
        samples: &[T],
        weights: &[W],
        is_integer_categorical: bool,
    ) -> BandedData {
        let weighted: Vec<(f64, f64)> = samples
            .iter()
            .zip(weights)
            .filter_map(|(s, w)| Some((s.to_f64()?, w.to_f64()?)))
            .collect();
        self.build_from_pairs(weighted, is_integer_categorical)
    }

    fn build_from_pairs(&self, pairs: Vec<(f64, f64)>, is_integer_categorical: bool) -> BandedData {
        let n_before = pairs.len();
        let pairs: Vec<(f64, f64)> = pairs
            .into_iter()
            .filter(|(s, w)| s.is_finite() && w.is_finite())
            .collect();
        if pairs.len() != n_before {
            log::warn!(
                "Dropped {} non-finite samples while banding",
                n_before - pairs.len()
            );
        }
        let Some((min, max)) = bounds(&pairs) else {
            return BandedData::default();
        };

        if is_integer_categorical {
            if let Some(data) = self.build_discrete(&pairs, min, max) {
                return data;
            }
        }
        self.build_continuous(&pairs, min, max)
    }

    fn build_discrete(&self, pairs: &[(f64, f64)], min: f64, max: f64) -> Option<BandedData> {
        let eps = self.config.integer_epsilon;
        if let Some((s, _)) = pairs.iter().find(|(s, _)| (s - s.round()).abs() > eps) {
            log::debug!("Sample {s} is not an integer, banding as continuous data");
            return None;
        }
        let (low, high) = (min.round(), max.round());
        if high - low >= self.config.max_discrete_bands as f64 {
            log::debug!(
                "Integer span {low}..={high} exceeds {} bands, banding as continuous data",
                self.config.max_discrete_bands
            );
            return None;
        }
        let n_bands = (high - low) as usize + 1;
        let mut band_values = vec![0.0; n_bands];
        for (s, w) in pairs {
            band_values[(s.round() - low) as usize] += w;
        }
        Some(BandedData {
            band_width: 1.0,
            band_centers: (0..n_bands).map(|i| low + i as f64).collect(),
            band_values,
            is_naturally_discrete: true,
        })
    }

    fn build_continuous(&self, pairs: &[(f64, f64)], min: f64, max: f64) -> BandedData {
        // A single distinct value cannot be divided, so it gets one unit-width band
        if max <= min {
            return BandedData {
                band_width: 1.0,
                band_centers: vec![min],
                band_values: vec![pairs.iter().map(|(_, w)| w).sum()],
                is_naturally_discrete: false,
            };
        }
        let n_bands = self.config.band_count.max(1);
        // Halved coordinates keep `max - min` finite for any pair of finite samples
        let (half_min, half_max) = (min / 2.0, max / 2.0);
        let half_width = (half_max - half_min) / n_bands as f64;
        let mut band_values = vec![0.0; n_bands];
        for (s, w) in pairs {
            let index = ((s / 2.0 - half_min) / half_width).floor().max(0.0) as usize;
            band_values[index.min(n_bands - 1)] += w;
        }
        BandedData {
            band_width: (half_width * 2.0).min(f64::MAX),
            band_centers: (0..n_bands)
                .map(|i| (half_min + half_width * (i as f64 + 0.5)) * 2.0)
                .collect(),
            band_values,
            is_naturally_discrete: false,
        }
    }
}

fn bounds(pairs: &[(f64, f64)]) -> Option<(f64, f64)> {
    pairs.iter().map(|(s, _)| *s).fold(None, |acc, s| match acc {
        None => Some((s, s)),
        Some((lo, hi)) => Some((lo.min(s), hi.max(s))),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test_log::test]
    fn test_charge_states() {
        let hist = BandedHistogram::default();
        let data = hist.build(&[1, 1, 2, 3, 3, 3, 7], true);
        assert_eq!(data.band_count(), 7);
        assert!(data.is_naturally_discrete());
        assert_eq!(data.band_width(), 1.0);
        assert_eq!(data.band_centers(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(data.band_values(), &[2.0, 1.0, 3.0, 0.0, 0.0, 0.0, 1.0]);
        assert_eq!(data.value_at(3.0), Some(3.0));
        assert_eq!(data.value_at(5.2), Some(0.0));
        assert_eq!(data.value_at(9.0), None);
    }

    #[test]
    fn test_empty() {
        let data = BandedHistogram::default().build::<f64>(&[], true);
        assert_eq!(data.band_count(), 0);
        assert!(data.band_centers().is_empty());
        assert!(data.band_values().is_empty());
        assert!(!data.is_naturally_discrete());
        assert_eq!(data.value_at(1.0), None);
    }

    #[test]
    fn test_continuous() {
        let hist = BandedHistogram::new(BandingConfig {
            band_count: 4,
            ..Default::default()
        });
        let data = hist.build(&[0.0, 0.5, 1.0, 2.5, 3.9, 4.0], false);
        assert!(!data.is_naturally_discrete());
        assert_eq!(data.band_count(), 4);
        assert_eq!(data.band_width(), 1.0);
        assert_eq!(data.band_centers(), &[0.5, 1.5, 2.5, 3.5]);
        // The maximum is clamped into the last band
        assert_eq!(data.band_values(), &[2.0, 1.0, 1.0, 2.0]);
    }

    #[test]
    fn test_non_integer_categorical_falls_back() {
        let hist = BandedHistogram::new(BandingConfig {
            band_count: 2,
            ..Default::default()
        });
        let data = hist.build(&[1.0, 1.5, 3.0], true);
        assert!(!data.is_naturally_discrete());
        assert_eq!(data.band_count(), 2);

        let hist = BandedHistogram::new(BandingConfig {
            max_discrete_bands: 5,
            band_count: 3,
            ..Default::default()
        });
        let data = hist.build(&[1, 10], true);
        assert!(!data.is_naturally_discrete());
        assert_eq!(data.band_count(), 3);
    }

    #[test]
    fn test_single_value() {
        let data = BandedHistogram::default().build(&[4.2, 4.2], false);
        assert_eq!(data.band_count(), 1);
        assert_eq!(data.band_centers(), &[4.2]);
        assert_eq!(data.band_values(), &[2.0]);
    }

    #[test]
    fn test_weighted() {
        let hist = BandedHistogram::new(BandingConfig {
            accumulation: BandAccumulation::Magnitude,
            ..Default::default()
        });
        let data = hist.build_weighted(&[2, 2, 3], &[100.0, 50.0, 10.0], true);
        assert_eq!(data.band_values(), &[150.0, 10.0]);

        let data = hist.build(&[2, 2, 4], true);
        assert_eq!(data.band_values(), &[4.0, 0.0, 4.0]);
    }

    #[test_log::test]
    fn test_non_finite_dropped() {
        let data = BandedHistogram::default().build(&[1.0, f64::NAN, 2.0], true);
        assert_eq!(data.band_values(), &[1.0, 1.0]);
    }

    #[test]
    fn test_continuous_extreme_span() {
        let hist = BandedHistogram::new(BandingConfig {
            band_count: 4,
            ..Default::default()
        });
        let data = hist.build(&[-f64::MAX, 0.0, f64::MAX], false);
        assert_eq!(data.band_count(), 4);
        assert!(data.band_width().is_finite());
        let centers = data.band_centers();
        assert!(centers.iter().all(|c| c.is_finite()));
        assert!(centers.windows(2).all(|w| w[1] > w[0]));
        let spacing = centers[1] - centers[0];
        assert!(((spacing - data.band_width()) / data.band_width()).abs() < 1e-9);
        assert_eq!(data.band_values(), &[1.0, 0.0, 1.0, 1.0]);
    }

    #[test]
    fn test_band_range() {
        let hist = BandedHistogram::new(BandingConfig {
            band_count: 5,
            ..Default::default()
        });
        let data = hist.build(&[10.0, 12.0, 13.3, 20.0], false);
        for i in 0..data.band_count() {
            let range = data.band_range(i).unwrap();
            assert!((range.center() - data.band_centers()[i]).abs() < 1e-9);
            assert!((range.half_width() - data.band_width() / 2.0).abs() < 1e-9);
        }
        assert_eq!(
            data.band_range(5),
            Err(BandIndexError::IndexOutOfRange {
                index: 5,
                band_count: 5
            })
        );
        let centers = data.band_centers();
        assert!(centers.windows(2).all(|w| w[1] > w[0]));
    }
}
