//! Scan filter strings, e.g. `FTMS + c NSI d Full ms2 524.2648@hcd28.00 [100.0000-1060.0000]`.
//!
//! [`classify`] assigns a [`TokenCategory`] to one fragment, [`tokenize`] splits and
//! classifies a whole filter, and [`ScanFilter`] folds those tokens into a structured
//! description.
mod description;
mod token;

pub use description::{FilterPrecursor, ScanFilter};
pub use token::{classify, tokenize, ScanFilterToken, TokenCategory};
