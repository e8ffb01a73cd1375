use crate::mass_error::{MassRange, MassTolerance, ToleranceError};
use crate::scan::{ScanEventLike, SimpleScanData};

/// The mass axis target of a [`NeutralLossWindow`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MassWindow {
    /// Search this range directly
    Absolute(MassRange),
    /// Search around `last precursor mass - offset`
    NeutralLossOffset(f64),
}

impl MassWindow {
    /// Decode a legacy range pair, where a negative `low` marks a neutral loss offset
    /// of `-low` and `high` is ignored.
    pub fn from_signed_range(low: f64, high: f64) -> Self {
        if low < 0.0 {
            Self::NeutralLossOffset(-low)
        } else {
            Self::Absolute(MassRange::bounded(low, high))
        }
    }
}

/// Tracks a fixed mass offset below the precursor of each MSⁿ scan.
///
/// Only scans of order MS2 or higher with at least one recorded precursor are
/// applicable. The last precursor is used, so for an MS3 scan the offset is taken from
/// the MS3 precursor rather than the MS2 precursor.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NeutralLossWindow {
    pub window: MassWindow,
    pub tolerance: MassTolerance,
}

impl NeutralLossWindow {
    pub fn new(offset: f64, tolerance: MassTolerance) -> Self {
        Self {
            window: MassWindow::NeutralLossOffset(offset),
            tolerance,
        }
    }

    pub fn from_signed_range(low: f64, high: f64, tolerance: MassTolerance) -> Self {
        Self {
            window: MassWindow::from_signed_range(low, high),
            tolerance,
        }
    }

    pub fn mass_range_for<E: ScanEventLike + ?Sized>(
        &self,
        event: &E,
    ) -> Result<Option<MassRange>, ToleranceError> {
        match self.window {
            MassWindow::Absolute(range) => Ok(Some(range)),
            MassWindow::NeutralLossOffset(offset) => {
                if !event.ms_order().is_tandem() {
                    return Ok(None);
                }
                let Some(precursor) = event.last_precursor_mass() else {
                    return Ok(None);
                };
                let target = precursor - offset;
                let half_width = self.tolerance.half_width_at(target)?;
                Ok(Some(MassRange::centered(target, half_width)))
            }
        }
    }
}

/// A fixed window over the product ions of MSⁿ scans.
///
/// When `precursor` is set, a scan only applies if its last precursor mass lies within
/// the tolerance window of that mass.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProductIonWindow {
    pub range: MassRange,
    pub precursor: Option<(f64, MassTolerance)>,
}

impl ProductIonWindow {
    pub fn new(range: MassRange) -> Self {
        Self {
            range,
            precursor: None,
        }
    }

    pub fn with_precursor(mut self, mass: f64, tolerance: MassTolerance) -> Self {
        self.precursor = Some((mass, tolerance));
        self
    }

    pub fn mass_range_for<E: ScanEventLike + ?Sized>(
        &self,
        event: &E,
    ) -> Result<Option<MassRange>, ToleranceError> {
        if !event.ms_order().is_tandem() {
            return Ok(None);
        }
        if let Some((mass, tolerance)) = self.precursor {
            let Some(observed) = event.last_precursor_mass() else {
                return Ok(None);
            };
            if !tolerance.window_at(mass)?.contains(observed) {
                return Ok(None);
            }
        }
        Ok(Some(self.range))
    }
}

/// A rule for computing one chromatogram point from one scan.
///
/// A scan the request does not apply to, or one with no signal in the derived
/// window, yields `0.0`. Errors are reserved for tolerances that cannot be evaluated.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChromatogramPointRequest {
    /// The largest intensity within an absolute mass window, on any scan
    MassWindow(MassRange),
    /// The summed intensity within an absolute mass window, on any scan
    SummedWindow(MassRange),
    ProductIon(ProductIonWindow),
    NeutralLoss(NeutralLossWindow),
    /// The summed intensity of the whole scan
    TotalIonCurrent,
    /// The largest intensity anywhere in the scan
    BasePeak,
}

impl ChromatogramPointRequest {
    pub fn mass_window(low: f64, high: f64) -> Self {
        Self::MassWindow(MassRange::bounded(low, high))
    }

    pub fn summed_window(low: f64, high: f64) -> Self {
        Self::SummedWindow(MassRange::bounded(low, high))
    }

    pub fn neutral_loss(offset: f64, tolerance: MassTolerance) -> Self {
        Self::NeutralLoss(NeutralLossWindow::new(offset, tolerance))
    }

    /// The window this request samples in a scan described by `event`, or `None`
    /// when the request does not apply to that scan. Whole-scan requests have no
    /// window and always return `None`.
    pub fn mass_range_for<E: ScanEventLike + ?Sized>(
        &self,
        event: &E,
    ) -> Result<Option<MassRange>, ToleranceError> {
        match self {
            Self::MassWindow(range) | Self::SummedWindow(range) => Ok(Some(*range)),
            Self::ProductIon(window) => window.mass_range_for(event),
            Self::NeutralLoss(window) => window.mass_range_for(event),
            Self::TotalIonCurrent | Self::BasePeak => Ok(None),
        }
    }

    /// Compute the chromatogram value for one scan
    pub fn value_for_scan<E: ScanEventLike + ?Sized>(
        &self,
        scan: &SimpleScanData,
        event: &E,
    ) -> Result<f64, ToleranceError> {
        let value = match self {
            Self::TotalIonCurrent => scan.total_intensity(),
            Self::BasePeak => scan.base_peak().map(|(_, i)| i).unwrap_or_default(),
            Self::SummedWindow(range) => scan.sum_intensity_in(range),
            _ => match self.mass_range_for(event)? {
                Some(range) => scan.max_intensity_in(&range).unwrap_or_default(),
                None => 0.0,
            },
        };
        Ok(value)
    }
}

impl From<NeutralLossWindow> for ChromatogramPointRequest {
    fn from(value: NeutralLossWindow) -> Self {
        Self::NeutralLoss(value)
    }
}

impl From<ProductIonWindow> for ChromatogramPointRequest {
    fn from(value: ProductIonWindow) -> Self {
        Self::ProductIon(value)
    }
}

impl From<MassRange> for ChromatogramPointRequest {
    fn from(value: MassRange) -> Self {
        Self::MassWindow(value)
    }
}
