//! # toolshed
//!
//! A small collection of independent file utilities behind one binary:
//!
//! - Social-preview card composition (GitHub 1280x640 PNG)
//! - Bulk renaming of a directory's files with collision-safe planning
//! - QR code PNG generation with an optional caption
//! - PLCopen XML cross-reference and call-graph export (CSV + Mermaid)
//!
//! The utilities share no state; each is usable on its own.
//!
//! ## Quick Start
//!
//! ```no_run
//! use toolshed::export::{self, ExportOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let stats = export::run(&ExportOptions {
//!     search_dir: "./my-plc-project".into(),
//!     ..ExportOptions::default()
//! })?;
//! println!("{} call edges", stats.call_edges);
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic
)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod font;
mod output;
mod text;

pub mod callgraph;
pub mod card;
pub mod crossref;
pub mod export;
pub mod plcopen;
pub mod qr;
pub mod rename;

pub use card::{CardOptions, CardOptionsBuilder};
pub use error::{Error, Result};
pub use export::{ExportOptions, ExportStats};
pub use qr::QrOptions;
pub use rename::{RenameEntry, RenameOp, RenameOptions};
