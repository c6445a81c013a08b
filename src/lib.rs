//! # kmzkit
//!
//! Bulk expansion of KMZ ground-overlay containers.
//!
//! A KMZ is a zip archive holding one KML document plus image assets. Given
//! a container whose KML carries a single template `GroundOverlay` and a set
//! of new overlay images, kmzkit clones the template once per image, rewrites
//! each clone's `<Icon><href>` and `<name>`, groups the overlays under a
//! single renamed `Document`/`Folder`, orders them by the trailing number in
//! their names, and repacks everything into a new container with members in
//! alphabetical order.
//!
//! ## Quick Start
//!
//! ```no_run
//! use kmzkit::process_root;
//!
//! // One output container per subfolder of the input root.
//! let summary = process_root("tiles/", "out/").unwrap();
//! println!("processed {} subfolders", summary.processed);
//! ```
//!
//! ## Working with documents directly
//!
//! The tree transformation is pure and usable without any archives on disk:
//!
//! ```
//! use std::path::PathBuf;
//! use kmzkit::{parse_kml, expand_overlays};
//!
//! let kml = r#"<kml xmlns="http://www.opengis.net/kml/2.2">
//!   <Document>
//!     <GroundOverlay>
//!       <name>N56E29-001</name>
//!       <Icon><href>base.png</href></Icon>
//!     </GroundOverlay>
//!   </Document>
//! </kml>"#;
//!
//! let mut root = parse_kml(kml).unwrap();
//! let assets = [PathBuf::from("base.png"), PathBuf::from("N56E29-002.png")];
//! let report = expand_overlays(&mut root, &assets, "N56E29").unwrap();
//! assert_eq!(report.overlay_count, 2);
//! ```

pub mod archive;
pub mod batch;
pub mod error;
pub mod kml;
pub mod overlay;
pub(crate) mod util;

pub use archive::{create_kmz, extract_kmz, list_members};
pub use batch::{BatchSummary, UnitOutcome, process_root, process_unit};
pub use error::{Error, Result};
pub use kml::{Element, Node, parse_kml, write_kml};
pub use overlay::{ExpandReport, copy_assets, expand_overlays};
