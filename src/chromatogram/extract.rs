#[cfg(feature = "serde")]
use std::io::prelude::*;

#[cfg(feature = "parallelism")]
use rayon::prelude::*;

use crate::mass_error::ToleranceError;
use crate::scan::{MsOrder, ScanEventLike, ScanEventSummary, SimpleScanData};

use super::request::ChromatogramPointRequest;

/// A scan that can contribute a point to a chromatogram
pub trait ScanPointSource {
    type Event: ScanEventLike;

    /// The scan start time, in minutes
    fn start_time(&self) -> f64;

    fn scan_data(&self) -> &SimpleScanData;

    fn scan_event(&self) -> &Self::Event;
}

/// An owned [`ScanPointSource`]
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleScan {
    pub start_time: f64,
    pub data: SimpleScanData,
    pub event: ScanEventSummary,
}

impl SimpleScan {
    pub fn new(start_time: f64, data: SimpleScanData, event: ScanEventSummary) -> Self {
        Self {
            start_time,
            data,
            event,
        }
    }
}

impl ScanPointSource for SimpleScan {
    type Event = ScanEventSummary;

    fn start_time(&self) -> f64 {
        self.start_time
    }

    fn scan_data(&self) -> &SimpleScanData {
        &self.data
    }

    fn scan_event(&self) -> &Self::Event {
        &self.event
    }
}

/// Restrict which scans contribute points to a chromatogram
#[derive(Debug, Default, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExtractionSettings {
    /// Only use scans of this MS order
    pub ms_order: Option<MsOrder>,
    /// Only use scans whose start time lies within this inclusive interval
    pub time_range: Option<(f64, f64)>,
}

impl ExtractionSettings {
    pub fn ms1_only() -> Self {
        Self {
            ms_order: Some(MsOrder::MS1),
            ..Default::default()
        }
    }

    pub fn accepts<S: ScanPointSource + ?Sized>(&self, scan: &S) -> bool {
        if let Some(order) = self.ms_order {
            if scan.scan_event().ms_order() != order {
                return false;
            }
        }
        if let Some((start, end)) = self.time_range {
            let time = scan.start_time();
            if time < start || time > end {
                return false;
            }
        }
        true
    }

    #[cfg(feature = "serde")]
    /// Write the settings out in JSON format to `writer`
    pub fn to_writer<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer(writer, self)
    }

    #[cfg(feature = "serde")]
    /// Read settings in JSON format from `reader`
    pub fn from_reader<R: Read>(reader: R) -> serde_json::Result<Self> {
        serde_json::from_reader(reader)
    }
}

/// A series of chromatogram points in scan order.
///
/// `scan_index` holds the position of each point's scan in the source sequence, since
/// [`ExtractionSettings`] may skip scans.
#[derive(Debug, Default, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Chromatogram {
    pub time: Vec<f64>,
    pub intensity: Vec<f64>,
    pub scan_index: Vec<usize>,
}

impl Chromatogram {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            time: Vec::with_capacity(capacity),
            intensity: Vec::with_capacity(capacity),
            scan_index: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, scan_index: usize, time: f64, intensity: f64) {
        self.scan_index.push(scan_index);
        self.time.push(time);
        self.intensity.push(intensity);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.time.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time
            .iter()
            .copied()
            .zip(self.intensity.iter().copied())
    }

    /// The time and intensity of the most intense point
    pub fn apex(&self) -> Option<(f64, f64)> {
        self.iter()
            .reduce(|best, point| if point.1 > best.1 { point } else { best })
    }

    /// The trapezoidal area under the trace
    pub fn area(&self) -> f64 {
        self.time
            .windows(2)
            .zip(self.intensity.windows(2))
            .map(|(t, i)| (t[1] - t[0]) * (i[0] + i[1]) / 2.0)
            .sum()
    }
}

/// Evaluate every request against one scan
fn evaluate_scan<S: ScanPointSource>(
    requests: &[ChromatogramPointRequest],
    scan: &S,
) -> Result<Vec<f64>, ToleranceError> {
    let data = scan.scan_data();
    let event = scan.scan_event();
    requests
        .iter()
        .map(|request| request.value_for_scan(data, event))
        .collect()
}

type ScanPoint = (usize, f64, Vec<f64>);

#[cfg(not(feature = "parallelism"))]
fn evaluate_all<S: ScanPointSource + Sync>(
    requests: &[ChromatogramPointRequest],
    scans: &[S],
    settings: &ExtractionSettings,
) -> Result<Vec<ScanPoint>, ToleranceError> {
    scans
        .iter()
        .enumerate()
        .filter(|(_, scan)| settings.accepts(*scan))
        .map(|(i, scan)| Ok((i, scan.start_time(), evaluate_scan(requests, scan)?)))
        .collect()
}

#[cfg(feature = "parallelism")]
fn evaluate_all<S: ScanPointSource + Sync>(
    requests: &[ChromatogramPointRequest],
    scans: &[S],
    settings: &ExtractionSettings,
) -> Result<Vec<ScanPoint>, ToleranceError> {
    // rayon collects into a Vec in input order, filtered or not
    scans
        .par_iter()
        .enumerate()
        .filter(|(_, scan)| settings.accepts(*scan))
        .map(|(i, scan)| Ok((i, scan.start_time(), evaluate_scan(requests, scan)?)))
        .collect()
}

/// Build one [`Chromatogram`] per request in a single pass over `scans`.
///
/// Each scan is visited once and every request evaluated against it. Points are
/// returned in the order of `scans`, regardless of whether they were computed in
/// parallel.
pub fn extract_chromatograms<S: ScanPointSource + Sync>(
    requests: &[ChromatogramPointRequest],
    scans: &[S],
    settings: &ExtractionSettings,
) -> Result<Vec<Chromatogram>, ToleranceError> {
    let points = evaluate_all(requests, scans, settings)?;
    log::debug!(
        "Extracted {} points for {} requests from {} scans",
        points.len(),
        requests.len(),
        scans.len()
    );
    let mut chromatograms: Vec<_> = requests
        .iter()
        .map(|_| Chromatogram::with_capacity(points.len()))
        .collect();
    for (scan_index, time, values) in points {
        for (chrom, value) in chromatograms.iter_mut().zip(values) {
            chrom.push(scan_index, time, value);
        }
    }
    Ok(chromatograms)
}

/// Build a [`Chromatogram`] for a single request
pub fn extract_chromatogram<S: ScanPointSource + Sync>(
    request: &ChromatogramPointRequest,
    scans: &[S],
    settings: &ExtractionSettings,
) -> Result<Chromatogram, ToleranceError> {
    let mut chromatograms =
        extract_chromatograms(std::slice::from_ref(request), scans, settings)?;
    log::trace!("Extracted chromatogram for {request:?}");
    Ok(chromatograms.pop().unwrap_or_default())
}
