//! The per-scan view the rest of the crate computes over: acquisition metadata
//! through [`ScanEventLike`], and mass/intensity pairs through [`SimpleScanData`].
use std::fmt::Display;

use mzpeaks::{CentroidPeak, PeakSet};
use thiserror::Error;

use crate::mass_error::MassRange;

/// The MSⁿ order of a scan. `MsOrder(1)` is a survey scan, `MsOrder(2)` has had one
/// stage of fragmentation and so on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MsOrder(u8);

impl Default for MsOrder {
    fn default() -> Self {
        Self::MS1
    }
}

impl MsOrder {
    pub const MS1: MsOrder = MsOrder(1);
    pub const MS2: MsOrder = MsOrder(2);
    pub const MS3: MsOrder = MsOrder(3);

    /// Create an order from its level. A level of zero is treated as MS1.
    pub const fn new(level: u8) -> Self {
        if level == 0 {
            Self::MS1
        } else {
            Self(level)
        }
    }

    #[inline]
    pub const fn level(&self) -> u8 {
        self.0
    }

    /// Whether at least one stage of fragmentation precedes this scan
    #[inline]
    pub const fn is_tandem(&self) -> bool {
        self.0 >= 2
    }
}

impl Display for MsOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0 == 1 {
            f.write_str("ms")
        } else {
            write!(f, "ms{}", self.0)
        }
    }
}

impl From<u8> for MsOrder {
    fn from(value: u8) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScanPolarity {
    #[default]
    Unknown,
    Positive,
    Negative,
}

/// The data format flag of a scan
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SignalContinuity {
    #[default]
    Unknown,
    Centroid,
    Profile,
}

/// Read-only access to the acquisition metadata of one scan.
///
/// Precursor masses are ordered by fragmentation stage, so for an MS3 scan index 0 is
/// the MS2 precursor and the last index is the precursor of this scan.
pub trait ScanEventLike {
    fn ms_order(&self) -> MsOrder;

    fn precursor_count(&self) -> usize;

    /// Get the `index`-th precursor mass, if it exists
    fn precursor_mass(&self, index: usize) -> Option<f64>;

    fn polarity(&self) -> ScanPolarity;

    fn signal_continuity(&self) -> SignalContinuity;

    /// The most recently selected precursor mass
    fn last_precursor_mass(&self) -> Option<f64> {
        self.precursor_count()
            .checked_sub(1)
            .and_then(|i| self.precursor_mass(i))
    }
}

/// An owned [`ScanEventLike`] implementation
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanEventSummary {
    pub ms_order: MsOrder,
    pub precursor_masses: Vec<f64>,
    pub polarity: ScanPolarity,
    pub signal_continuity: SignalContinuity,
}

impl ScanEventSummary {
    pub fn new(
        ms_order: MsOrder,
        precursor_masses: Vec<f64>,
        polarity: ScanPolarity,
        signal_continuity: SignalContinuity,
    ) -> Self {
        Self {
            ms_order,
            precursor_masses,
            polarity,
            signal_continuity,
        }
    }
}

impl ScanEventLike for ScanEventSummary {
    fn ms_order(&self) -> MsOrder {
        self.ms_order
    }

    fn precursor_count(&self) -> usize {
        self.precursor_masses.len()
    }

    fn precursor_mass(&self, index: usize) -> Option<f64> {
        self.precursor_masses.get(index).copied()
    }

    fn polarity(&self) -> ScanPolarity {
        self.polarity
    }

    fn signal_continuity(&self) -> SignalContinuity {
        self.signal_continuity
    }
}

impl<T: ScanEventLike + ?Sized> ScanEventLike for &T {
    fn ms_order(&self) -> MsOrder {
        (**self).ms_order()
    }

    fn precursor_count(&self) -> usize {
        (**self).precursor_count()
    }

    fn precursor_mass(&self, index: usize) -> Option<f64> {
        (**self).precursor_mass(index)
    }

    fn polarity(&self) -> ScanPolarity {
        (**self).polarity()
    }

    fn signal_continuity(&self) -> SignalContinuity {
        (**self).signal_continuity()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScanDataError {
    #[error("m/z array of length {masses} does not match intensity array of length {intensities}")]
    LengthMismatch { masses: usize, intensities: usize },
}

/// The profile or centroid points of one scan.
///
/// Masses are expected to be sorted in non-decreasing order. This is not checked,
/// but the range queries below rely on it.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleScanData {
    masses: Vec<f64>,
    intensities: Vec<f64>,
}

impl SimpleScanData {
    pub fn new(masses: Vec<f64>, intensities: Vec<f64>) -> Result<Self, ScanDataError> {
        if masses.len() != intensities.len() {
            return Err(ScanDataError::LengthMismatch {
                masses: masses.len(),
                intensities: intensities.len(),
            });
        }
        Ok(Self {
            masses,
            intensities,
        })
    }

    pub const fn empty() -> Self {
        Self {
            masses: Vec::new(),
            intensities: Vec::new(),
        }
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn intensities(&self) -> &[f64] {
        &self.intensities
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.masses.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.masses.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.masses
            .iter()
            .copied()
            .zip(self.intensities.iter().copied())
    }

    /// The slice bounds of the points whose mass falls within `range`
    fn span_of(&self, range: &MassRange) -> (usize, usize) {
        let start = self.masses.partition_point(|m| *m < range.low());
        let end = start + self.masses[start..].partition_point(|m| *m <= range.high());
        (start, end)
    }

    /// The largest intensity among points within `range`, or `None` if no point
    /// falls in it
    pub fn max_intensity_in(&self, range: &MassRange) -> Option<f64> {
        let (start, end) = self.span_of(range);
        self.intensities[start..end]
            .iter()
            .copied()
            .reduce(f64::max)
    }

    /// The summed intensity of points within `range`
    pub fn sum_intensity_in(&self, range: &MassRange) -> f64 {
        let (start, end) = self.span_of(range);
        self.intensities[start..end].iter().sum()
    }

    /// The total ion current of the scan
    pub fn total_intensity(&self) -> f64 {
        self.intensities.iter().sum()
    }

    /// The mass and intensity of the most intense point
    pub fn base_peak(&self) -> Option<(f64, f64)> {
        self.iter()
            .reduce(|best, point| if point.1 > best.1 { point } else { best })
    }

    /// Copy the points into an [`mzpeaks::PeakSet`] for tolerance-based searching
    pub fn to_peaks(&self) -> PeakSet {
        let peaks: Vec<CentroidPeak> = self
            .iter()
            .enumerate()
            .map(|(i, (mz, intensity))| CentroidPeak::new(mz, intensity as f32, i as u32))
            .collect();
        PeakSet::new(peaks)
    }
}
