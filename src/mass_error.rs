//! Mass windows and the tolerance rules that produce them.
//!
//! A [`MassTolerance`] turns a nominal mass into a half-width, and a [`MassRange`] is
//! the concrete `[low, high]` interval that is then searched.
use std::fmt::Display;

use mzpeaks::Tolerance;
use thiserror::Error;

/// Errors raised when a tolerance cannot be evaluated
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ToleranceError {
    #[error("Tolerance value {0} is negative")]
    NegativeTolerance(f64),
    #[error("Tolerance value {0} is not finite")]
    NonFiniteTolerance(f64),
    #[error("A resolution tolerance must be greater than zero")]
    ZeroResolution,
    #[error("Cannot compute a tolerance window around the non-finite mass {0}")]
    NonFiniteMass(f64),
}

/// A closed interval over the mass axis. `low <= high` always holds.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "MassRangeBounds"))]
pub struct MassRange {
    low: f64,
    high: f64,
}

/// The unchecked serialized form of a [`MassRange`]
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct MassRangeBounds {
    low: f64,
    high: f64,
}

#[cfg(feature = "serde")]
impl From<MassRangeBounds> for MassRange {
    fn from(value: MassRangeBounds) -> Self {
        Self::bounded(value.low, value.high)
    }
}

impl MassRange {
    /// Build a range from explicit bounds. The bounds are re-ordered if given
    /// backwards.
    pub fn bounded(low: f64, high: f64) -> Self {
        if low <= high {
            Self { low, high }
        } else {
            Self {
                low: high,
                high: low,
            }
        }
    }

    /// Build a range spanning `center ± half_width`
    pub fn centered(center: f64, half_width: f64) -> Self {
        let half_width = half_width.abs();
        Self {
            low: center - half_width,
            high: center + half_width,
        }
    }

    #[inline]
    pub fn low(&self) -> f64 {
        self.low
    }

    #[inline]
    pub fn high(&self) -> f64 {
        self.high
    }

    #[inline]
    pub fn center(&self) -> f64 {
        (self.low + self.high) / 2.0
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.high - self.low
    }

    #[inline]
    pub fn half_width(&self) -> f64 {
        self.width() / 2.0
    }

    /// Test whether `mass` falls inside the range, bounds included
    #[inline]
    pub fn contains(&self, mass: f64) -> bool {
        self.low <= mass && mass <= self.high
    }

    pub fn overlaps(&self, other: &MassRange) -> bool {
        self.low <= other.high && other.low <= self.high
    }
}

impl Display for MassRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}-{}]", self.low, self.high)
    }
}

/// How a [`MassTolerance`] value is interpreted
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ToleranceMode {
    /// Parts-per-million of the nominal mass
    #[default]
    PPM,
    /// Milli-Daltons, independent of the nominal mass
    MilliDalton,
    /// The mass resolution, `m / Δm`
    Resolution,
    /// Atomic mass units (Daltons), independent of the nominal mass
    AMU,
}

impl Display for ToleranceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ToleranceMode::PPM => "ppm",
            ToleranceMode::MilliDalton => "mDa",
            ToleranceMode::Resolution => "resolution",
            ToleranceMode::AMU => "amu",
        };
        f.write_str(s)
    }
}

/// A tolerance rule that produces a half-width around a nominal mass.
///
/// The value is validated on construction, so a `MassTolerance` in hand always has a
/// finite, non-negative value (and a non-zero one in [`ToleranceMode::Resolution`]).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MassTolerance {
    mode: ToleranceMode,
    value: f64,
}

impl MassTolerance {
    pub fn new(mode: ToleranceMode, value: f64) -> Result<Self, ToleranceError> {
        Self::validate(mode, value)?;
        Ok(Self { mode, value })
    }

    pub fn ppm(value: f64) -> Result<Self, ToleranceError> {
        Self::new(ToleranceMode::PPM, value)
    }

    pub fn millidalton(value: f64) -> Result<Self, ToleranceError> {
        Self::new(ToleranceMode::MilliDalton, value)
    }

    pub fn resolution(value: f64) -> Result<Self, ToleranceError> {
        Self::new(ToleranceMode::Resolution, value)
    }

    pub fn amu(value: f64) -> Result<Self, ToleranceError> {
        Self::new(ToleranceMode::AMU, value)
    }

    fn validate(mode: ToleranceMode, value: f64) -> Result<(), ToleranceError> {
        if !value.is_finite() {
            return Err(ToleranceError::NonFiniteTolerance(value));
        }
        if value < 0.0 {
            return Err(ToleranceError::NegativeTolerance(value));
        }
        if mode == ToleranceMode::Resolution && value == 0.0 {
            return Err(ToleranceError::ZeroResolution);
        }
        Ok(())
    }

    #[inline]
    pub fn mode(&self) -> ToleranceMode {
        self.mode
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Compute the half-width of the window around `nominal_mass`.
    ///
    /// The result is never negative. For [`ToleranceMode::PPM`] and
    /// [`ToleranceMode::Resolution`] it grows with the magnitude of the mass.
    pub fn half_width_at(&self, nominal_mass: f64) -> Result<f64, ToleranceError> {
        // Deserialized values skip the constructor
        Self::validate(self.mode, self.value)?;
        if !nominal_mass.is_finite() {
            return Err(ToleranceError::NonFiniteMass(nominal_mass));
        }
        let mass = nominal_mass.abs();
        let half_width = match self.mode {
            ToleranceMode::PPM => mass * self.value / 1e6,
            ToleranceMode::MilliDalton => self.value / 1000.0,
            ToleranceMode::Resolution => mass / self.value,
            ToleranceMode::AMU => self.value,
        };
        Ok(half_width)
    }

    /// The [`MassRange`] centered on `nominal_mass`
    pub fn window_at(&self, nominal_mass: f64) -> Result<MassRange, ToleranceError> {
        let half_width = self.half_width_at(nominal_mass)?;
        Ok(MassRange::centered(nominal_mass, half_width))
    }

    /// Express this tolerance as an [`mzpeaks::Tolerance`] for peak searches
    /// around `nominal_mass`.
    ///
    /// Resolution tolerances have no fixed equivalent, so they are resolved to an
    /// absolute width at that mass.
    pub fn to_peak_tolerance(&self, nominal_mass: f64) -> Result<Tolerance, ToleranceError> {
        let tol = match self.mode {
            ToleranceMode::PPM => Tolerance::PPM(self.value),
            ToleranceMode::MilliDalton => Tolerance::Da(self.value / 1000.0),
            ToleranceMode::AMU => Tolerance::Da(self.value),
            ToleranceMode::Resolution => Tolerance::Da(self.half_width_at(nominal_mass)?),
        };
        Ok(tol)
    }
}

impl Display for MassTolerance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.value, self.mode)
    }
}
