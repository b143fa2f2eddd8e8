//! fontdesc-core: the font descriptor index that remembers every face it meets
//!
//! Point it at a font directory and it reads each file's identity (family,
//! full name, PostScript name, subfamily, weight, width, italic, monospace,
//! symbolic) into an in-memory index. Ask it a partial question and it hands
//! back every face that fits all of it, no ranking, no guessing.
//!
//! ## How the Pieces Fit
//!
//! - [`discovery`]: lists the files directly inside the font directory,
//!   following symlinks to their real homes
//! - [`parser`]: turns a font file (or a `.ttc` collection) into descriptors
//! - [`index`]: stores descriptors once and files their IDs under names and
//!   style flags, then narrows candidates step by step at query time
//! - [`scanner`]: clears the index and refills it from one directory
//! - [`sources`]: stylish and installed font lists, kept apart from matching
//! - [`manager`]: runs scans in the background and makes queries wait until
//!   the index is whole
//! - [`facade`]: accepts binding-style partial descriptors and sorts results
//!
//! ## A Sample Conversation
//!
//! ```rust,no_run
//! use fontdesc_core::config::IndexConfig;
//! use fontdesc_core::manager::IndexManager;
//! use fontdesc_core::query::DescriptorQuery;
//!
//! let config = IndexConfig::default().with_font_dir("/usr/share/fonts/truetype/dejavu");
//! let manager = IndexManager::with_opentype_parser(config)?;
//!
//! // Blocks only until the initial background scan has finished.
//! let bold = manager.match_query(&DescriptorQuery::new().with_family("DejaVu Sans").with_weight(700));
//! for face in bold {
//!     println!("{face}");
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! ---
//!
//! Crafted with care at FontLab https://www.fontlab.com/

pub mod config;
pub mod descriptor;
pub mod discovery;
pub mod facade;
pub mod index;
pub mod manager;
pub mod output;
pub mod parser;
pub mod query;
pub mod scanner;
pub mod sources;
pub mod worker;

pub use descriptor::{FontDescriptor, FontId, TypeStyle};
pub use index::FontIndex;
pub use manager::IndexManager;
pub use query::DescriptorQuery;
pub use sources::SystemFontType;
