//! Assemble the pieces of one instrument scan into a single [`InstrumentScanRecord`].
//!
//! The raw scan itself is supplied by a [`RawScan`] implementation, typically a file
//! reader. Profile and centroid data are borrowed from it, while the noise and
//! frequency tables are generated anew on every call to
//! [`InstrumentScanAssembler::assemble`].
use indexmap::IndexMap;
use mzpeaks::PeakSet;

use crate::chromatogram::ScanPointSource;
use crate::scan::{ScanEventLike, SimpleScanData};

/// Centroided peaks along with the per-peak annotations some instruments report.
///
/// Annotation arrays are either empty or the same length as the centroid data.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CentroidStream {
    pub data: SimpleScanData,
    pub resolutions: Vec<f64>,
    pub noises: Vec<f64>,
    pub baselines: Vec<f64>,
    pub charges: Vec<i32>,
}

impl CentroidStream {
    pub fn new(data: SimpleScanData) -> Self {
        Self {
            data,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The signal-to-noise ratio of each peak, when noise values are available
    pub fn signal_to_noise(&self) -> Option<Vec<f64>> {
        if self.noises.len() != self.data.len() {
            return None;
        }
        Some(
            self.data
                .intensities()
                .iter()
                .zip(self.noises.iter())
                .map(|(i, n)| if *n > 0.0 { i / n } else { 0.0 })
                .collect(),
        )
    }

    pub fn to_peaks(&self) -> PeakSet {
        self.data.to_peaks()
    }
}

/// One entry of a noise table
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoisePoint {
    pub mass: f64,
    pub noise: f64,
    pub baseline: f64,
}

/// The noise and baseline levels sampled across the mass range of a scan
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NoiseTable {
    pub points: Vec<NoisePoint>,
}

impl NoiseTable {
    pub fn new(points: Vec<NoisePoint>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The noise level at `mass`, linearly interpolated between the neighbouring
    /// table entries and held constant beyond either end
    pub fn noise_at(&self, mass: f64) -> Option<f64> {
        let i = self.points.partition_point(|p| p.mass < mass);
        let first = self.points.first()?;
        let last = self.points.last()?;
        if i == 0 {
            return Some(first.noise);
        }
        if i == self.points.len() {
            return Some(last.noise);
        }
        let (a, b) = (&self.points[i - 1], &self.points[i]);
        let span = b.mass - a.mass;
        if span <= 0.0 {
            return Some(b.noise);
        }
        let t = (mass - a.mass) / span;
        Some(a.noise + t * (b.noise - a.noise))
    }
}

/// Convert an FT detector frequency into m/z using an instrument calibration.
///
/// Four coefficients use the LTQ-FT model `m/z = A / (f / 1e6 + B)`, seven use the
/// Orbitrap polynomial in `f`. Any other coefficient count leaves `frequency` as-is.
pub fn frequency_to_mz(frequency: f64, coefficients: &[f64]) -> f64 {
    match coefficients {
        [a, b, _, _] => {
            let denominator = frequency / 1e6 + b;
            if denominator != 0.0 {
                a / denominator
            } else {
                frequency
            }
        }
        [c0, c1, c2, c3, c4, c5, c6] => {
            if frequency == 0.0 {
                return 0.0;
            }
            let f = frequency;
            let f2 = f * f;
            c0 / f2 + c1 / f + c2 + c3 * f + c4 * f2 + c5 * f2 * f + c6 * f2 * f2
        }
        _ => frequency,
    }
}

/// The detector frequencies of an FT scan with the calibration mapping them to m/z.
/// Empty for scans from other analyzers.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FrequencyTable {
    pub frequencies: Vec<f64>,
    pub coefficients: Vec<f64>,
}

impl FrequencyTable {
    pub fn new(frequencies: Vec<f64>, coefficients: Vec<f64>) -> Self {
        Self {
            frequencies,
            coefficients,
        }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn masses(&self) -> Vec<f64> {
        self.frequencies
            .iter()
            .map(|f| frequency_to_mz(*f, &self.coefficients))
            .collect()
    }
}

/// Additional named arrays attached to a scan, in the order the source reported them
pub type ExtendedBlocks = IndexMap<String, Vec<f64>>;

/// A raw scan as exposed by a data source
pub trait RawScan {
    type Error: std::error::Error;

    /// The scan start time, in minutes
    fn start_time(&self) -> f64;

    fn profile(&self) -> Option<&SimpleScanData>;

    fn centroids(&self) -> Option<&CentroidStream>;

    fn extended_blocks(&self) -> &ExtendedBlocks;

    fn generate_noise_table(&self) -> Result<NoiseTable, Self::Error>;

    /// Generate the frequency table of the scan. Scans not acquired by an FT analyzer
    /// may return an empty table.
    fn generate_frequency_table(&self) -> Result<FrequencyTable, Self::Error>;
}

/// Everything known about one scan. Profile, centroid and extended data are borrowed
/// from the [`RawScan`] they came from.
#[derive(Debug, Clone)]
pub struct InstrumentScanRecord<'a, E: ScanEventLike> {
    start_time: f64,
    profile: Option<&'a SimpleScanData>,
    centroids: Option<&'a CentroidStream>,
    extended_blocks: &'a ExtendedBlocks,
    event: &'a E,
    pub noise_table: NoiseTable,
    pub frequency_table: FrequencyTable,
}

impl<'a, E: ScanEventLike> InstrumentScanRecord<'a, E> {
    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    pub fn profile(&self) -> Option<&'a SimpleScanData> {
        self.profile
    }

    pub fn centroids(&self) -> Option<&'a CentroidStream> {
        self.centroids
    }

    pub fn extended_blocks(&self) -> &'a ExtendedBlocks {
        self.extended_blocks
    }

    pub fn event(&self) -> &'a E {
        self.event
    }

    /// The best available mass/intensity data: centroids if present, else the
    /// profile, else nothing
    pub fn simple_data(&self) -> Option<&'a SimpleScanData> {
        self.centroids
            .filter(|c| !c.is_empty())
            .map(|c| &c.data)
            .or(self.profile)
    }

    /// The charge state of each centroid, for banding with
    /// [`BandedHistogram`](crate::banding::BandedHistogram)
    pub fn charge_states(&self) -> &'a [i32] {
        self.centroids.map(|c| c.charges.as_slice()).unwrap_or_default()
    }
}

static EMPTY_SCAN: SimpleScanData = SimpleScanData::empty();

impl<E: ScanEventLike> ScanPointSource for InstrumentScanRecord<'_, E> {
    type Event = E;

    fn start_time(&self) -> f64 {
        self.start_time
    }

    fn scan_data(&self) -> &SimpleScanData {
        self.simple_data().unwrap_or(&EMPTY_SCAN)
    }

    fn scan_event(&self) -> &Self::Event {
        self.event
    }
}

/// Builds [`InstrumentScanRecord`]s
#[derive(Debug, Default, Clone, Copy)]
pub struct InstrumentScanAssembler {}

impl InstrumentScanAssembler {
    pub fn new() -> Self {
        Self {}
    }

    /// Compose `scan` and `event` into one record.
    ///
    /// The noise and frequency tables are requested from `scan` on every call and
    /// never cached. A failure to generate either is returned unchanged.
    pub fn assemble<'a, S: RawScan, E: ScanEventLike>(
        &self,
        scan: &'a S,
        event: &'a E,
    ) -> Result<InstrumentScanRecord<'a, E>, S::Error> {
        let noise_table = scan.generate_noise_table()?;
        let frequency_table = scan.generate_frequency_table()?;
        log::debug!(
            "Assembled scan at {:.4} min with {} noise points and {} frequencies",
            scan.start_time(),
            noise_table.len(),
            frequency_table.len()
        );
        Ok(InstrumentScanRecord {
            start_time: scan.start_time(),
            profile: scan.profile(),
            centroids: scan.centroids(),
            extended_blocks: scan.extended_blocks(),
            event,
            noise_table,
            frequency_table,
        })
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use thiserror::Error;

    use super::*;
    use crate::banding::BandedHistogram;
    use crate::chromatogram::{extract_chromatogram, ChromatogramPointRequest, ExtractionSettings};
    use crate::scan::{MsOrder, ScanEventSummary, ScanPolarity, SignalContinuity};

    #[derive(Debug, Error)]
    #[error("noise table unavailable")]
    struct TableError;

    #[derive(Debug, Default)]
    struct MockScan {
        start_time: f64,
        profile: Option<SimpleScanData>,
        centroids: Option<CentroidStream>,
        blocks: ExtendedBlocks,
        fail_noise: bool,
        noise_calls: Cell<usize>,
        frequency_calls: Cell<usize>,
    }

    impl RawScan for MockScan {
        type Error = TableError;

        fn start_time(&self) -> f64 {
            self.start_time
        }

        fn profile(&self) -> Option<&SimpleScanData> {
            self.profile.as_ref()
        }

        fn centroids(&self) -> Option<&CentroidStream> {
            self.centroids.as_ref()
        }

        fn extended_blocks(&self) -> &ExtendedBlocks {
            &self.blocks
        }

        fn generate_noise_table(&self) -> Result<NoiseTable, Self::Error> {
            self.noise_calls.set(self.noise_calls.get() + 1);
            if self.fail_noise {
                return Err(TableError);
            }
            Ok(NoiseTable::new(vec![
                NoisePoint {
                    mass: 100.0,
                    noise: 10.0,
                    baseline: 1.0,
                },
                NoisePoint {
                    mass: 200.0,
                    noise: 20.0,
                    baseline: 2.0,
                },
            ]))
        }

        fn generate_frequency_table(&self) -> Result<FrequencyTable, Self::Error> {
            self.frequency_calls.set(self.frequency_calls.get() + 1);
            Ok(FrequencyTable::default())
        }
    }

    fn make_scan() -> MockScan {
        let mut centroids = CentroidStream::new(
            SimpleScanData::new(vec![150.0, 300.0, 450.0], vec![100.0, 400.0, 50.0]).unwrap(),
        );
        centroids.charges = vec![1, 2, 2];
        centroids.noises = vec![10.0, 20.0, 0.0];
        let mut blocks = ExtendedBlocks::new();
        blocks.insert("resolution".to_string(), vec![60000.0, 45000.0, 30000.0]);
        MockScan {
            start_time: 1.25,
            profile: Some(
                SimpleScanData::new(vec![149.9, 150.0, 150.1], vec![5.0, 100.0, 5.0]).unwrap(),
            ),
            centroids: Some(centroids),
            blocks,
            ..Default::default()
        }
    }

    fn make_event() -> ScanEventSummary {
        ScanEventSummary::new(
            MsOrder::MS1,
            vec![],
            ScanPolarity::Positive,
            SignalContinuity::Profile,
        )
    }

    #[test_log::test]
    fn test_assemble() {
        let scan = make_scan();
        let event = make_event();
        let assembler = InstrumentScanAssembler::new();
        let record = assembler.assemble(&scan, &event).unwrap();
        assert_eq!(record.start_time(), 1.25);
        assert!(std::ptr::eq(record.profile().unwrap(), scan.profile.as_ref().unwrap()));
        assert!(std::ptr::eq(record.centroids().unwrap(), scan.centroids.as_ref().unwrap()));
        assert_eq!(record.noise_table.len(), 2);
        assert!(record.frequency_table.is_empty());
        assert_eq!(record.extended_blocks().len(), 1);
        assert_eq!(record.simple_data().unwrap().len(), 3);
        assert_eq!(record.charge_states(), &[1, 2, 2]);
    }

    #[test]
    fn test_tables_not_cached() {
        let scan = make_scan();
        let event = make_event();
        let assembler = InstrumentScanAssembler::new();
        for _ in 0..3 {
            assembler.assemble(&scan, &event).unwrap();
        }
        assert_eq!(scan.noise_calls.get(), 3);
        assert_eq!(scan.frequency_calls.get(), 3);
    }

    #[test]
    fn test_collaborator_failure_propagates() {
        let scan = MockScan {
            fail_noise: true,
            ..make_scan()
        };
        let event = make_event();
        let result = InstrumentScanAssembler::new().assemble(&scan, &event);
        assert!(result.is_err());
        assert_eq!(scan.noise_calls.get(), 1);
        assert_eq!(scan.frequency_calls.get(), 0);
    }

    #[test]
    fn test_record_feeds_extraction_and_banding() {
        let scans = [make_scan(), make_scan()];
        let event = make_event();
        let assembler = InstrumentScanAssembler::new();
        let records: Vec<_> = scans
            .iter()
            .map(|s| assembler.assemble(s, &event))
            .collect::<Result<_, _>>()
            .unwrap();
        let chrom = extract_chromatogram(
            &ChromatogramPointRequest::mass_window(299.0, 301.0),
            &records,
            &ExtractionSettings::default(),
        )
        .unwrap();
        assert_eq!(chrom.intensity, vec![400.0, 400.0]);

        let bands = BandedHistogram::default().build(records[0].charge_states(), true);
        assert_eq!(bands.band_values(), &[1.0, 2.0]);
    }

    #[test]
    fn test_profile_fallback() {
        let scan = MockScan {
            centroids: None,
            ..make_scan()
        };
        let event = make_event();
        let record = InstrumentScanAssembler::new().assemble(&scan, &event).unwrap();
        assert_eq!(record.scan_data().base_peak(), Some((150.0, 100.0)));
        assert!(record.charge_states().is_empty());

        let bare = MockScan::default();
        let record = InstrumentScanAssembler::new().assemble(&bare, &event).unwrap();
        assert!(record.scan_data().is_empty());
    }

    #[test]
    fn test_noise_interpolation() {
        let scan = make_scan();
        let table = scan.generate_noise_table().unwrap();
        assert_eq!(table.noise_at(50.0), Some(10.0));
        assert_eq!(table.noise_at(150.0), Some(15.0));
        assert_eq!(table.noise_at(500.0), Some(20.0));
        assert_eq!(NoiseTable::default().noise_at(150.0), None);

        let sn = scan.centroids.as_ref().unwrap().signal_to_noise().unwrap();
        assert_eq!(sn, vec![10.0, 20.0, 0.0]);
    }

    #[test]
    fn test_frequency_conversion() {
        assert_eq!(frequency_to_mz(1234.5, &[]), 1234.5);
        let mz = frequency_to_mz(1e6, &[1000.0, 1.0, 0.0, 0.0]);
        assert!((mz - 500.0).abs() < 1e-9);
        let mz = frequency_to_mz(2.0, &[4.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]);
        assert!((mz - 2.0).abs() < 1e-9);
        assert_eq!(frequency_to_mz(0.0, &[4.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0]), 0.0);

        let table = FrequencyTable::new(vec![1e6, 3e6], vec![1000.0, 1.0, 0.0, 0.0]);
        let masses = table.masses();
        assert!((masses[0] - 500.0).abs() < 1e-9);
        assert!((masses[1] - 250.0).abs() < 1e-9);
    }
}
