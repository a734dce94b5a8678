//! codebook-cli - export writers behind the `codebook` command
//!
//! Each module turns analyzed variables into one downstream artifact:
//! - [`guide`]: reversal guide CSV for manual review
//! - [`recode`]: R script with keyword-validated reversal transforms
//! - [`phrases`]: validation phrases and adjacent-question confusion check
//! - [`concepts`]: concept CSVs from annotated variables
//!
//! [`keywords`] holds the wave-wide word frequency both the guide and the R
//! script use to pick a distinctive keyword per question. [`pipeline`] wires
//! the stages to files for the command-line front end.

pub mod concepts;
pub mod guide;
pub mod keywords;
pub mod phrases;
pub mod pipeline;
pub mod recode;
pub mod waves;

pub use guide::{build_guide_rows, GuideRow};
pub use keywords::WordFrequency;
pub use phrases::{check_adjacent_confusion, ConfusionIssue, PhraseFinder, ValidationPhrase};
pub use recode::RecodeGenerator;
pub use waves::{WaveInput, WaveSpecError};
