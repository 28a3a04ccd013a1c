//! Clipsmith Edit Model
//!
//! Defines the data contracts shared by every Clipsmith crate:
//! - **Input:** Discovered source videos and their output namespaces
//! - **Edits:** Raw rule text and the typed edit operations parsed from it
//! - **Stages:** The fixed stage sequence and tagged stage outcomes
//! - **Results:** Per-file processing results and the batch report
//!
//! Every artifact path is derived from the input file name, so two inputs
//! never share an output path.

pub mod analysis;
pub mod edit;
pub mod input;
pub mod result;
pub mod stage;

pub use analysis::*;
pub use edit::*;
pub use input::*;
pub use result::*;
pub use stage::*;
