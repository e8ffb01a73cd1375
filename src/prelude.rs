pub use crate::chromatogram::ScanPointSource;
pub use crate::instrument::RawScan;
pub use crate::labels::LabelStore;
pub use crate::scan::ScanEventLike;
