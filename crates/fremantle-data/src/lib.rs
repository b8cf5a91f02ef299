#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fremantle/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod csv_file;
pub mod error;
pub mod options;
pub mod prices;
pub mod yahoo;

pub use csv_file::{read_price_csv, read_price_file};
pub use error::{DataError, Result};
pub use options::{GroupBy, Interval, LoadOptions};
pub use prices::{PriceSeries, PriceStore, PriceTable, PriceWindow, Symbol, symbols};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
