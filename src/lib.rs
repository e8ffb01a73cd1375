//! `mzextract` computes per-scan quantities from mass spectrometry data: chromatogram
//! points over mass windows and neutral losses, banded summaries of scalar samples,
//! scan filter token classification, and the assembly of instrument scan records.
//!
//! Reading raw files is left to the caller, who supplies scans through the
//! [`ScanPointSource`](crate::chromatogram::ScanPointSource) and
//! [`RawScan`](crate::instrument::RawScan) traits.
pub mod banding;
pub mod chromatogram;
pub mod filter;
pub mod instrument;
pub mod labels;
pub mod mass_error;
pub mod prelude;
pub mod scan;

pub use crate::mass_error::{MassRange, MassTolerance, ToleranceError, ToleranceMode};
pub use crate::scan::{MsOrder, ScanEventSummary, ScanPolarity, SignalContinuity, SimpleScanData};

pub use crate::banding::{BandedData, BandedHistogram, BandingConfig};
pub use crate::chromatogram::{
    extract_chromatogram, extract_chromatograms, Chromatogram, ChromatogramPointRequest,
    ExtractionSettings,
};
pub use crate::filter::{classify, tokenize, ScanFilter, TokenCategory};
pub use crate::instrument::{InstrumentScanAssembler, InstrumentScanRecord};
pub use crate::labels::UserLabels;
