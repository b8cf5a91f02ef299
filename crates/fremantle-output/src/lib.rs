#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/fremantle/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chart;
pub mod export;
pub mod report;
pub mod summary;

pub use chart::{BetaChart, DEFAULT_TITLE};
pub use export::{ExportError, ExportFormat, Exporter};
pub use report::{ReportError, STAMP_FORMAT, artifact_path, render_to_dir, render_to_dir_at};
pub use summary::to_ascii_table;
