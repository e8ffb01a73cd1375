//! Extracted chromatograms: one scalar per scan, computed by a
//! [`ChromatogramPointRequest`] and accumulated in scan order.
//!
//! ```
//! use mzextract::chromatogram::{extract_chromatogram, ChromatogramPointRequest, ExtractionSettings, SimpleScan};
//! use mzextract::scan::{MsOrder, ScanEventSummary, ScanPolarity, SignalContinuity, SimpleScanData};
//! use mzextract::MassTolerance;
//!
//! let event = ScanEventSummary::new(MsOrder::MS2, vec![500.0], ScanPolarity::Positive, SignalContinuity::Centroid);
//! let data = SimpleScanData::new(vec![300.0, 482.0], vec![20.0, 1000.0]).unwrap();
//! let scans = vec![SimpleScan::new(0.5, data, event)];
//!
//! let request = ChromatogramPointRequest::neutral_loss(18.0, MassTolerance::millidalton(5.0).unwrap());
//! let chrom = extract_chromatogram(&request, &scans, &ExtractionSettings::default()).unwrap();
//! assert_eq!(chrom.intensity, vec![1000.0]);
//! ```
mod extract;
mod request;

pub use extract::{
    extract_chromatogram, extract_chromatograms, Chromatogram, ExtractionSettings, ScanPointSource,
    SimpleScan,
};
pub use request::{ChromatogramPointRequest, MassWindow, NeutralLossWindow, ProductIonWindow};
