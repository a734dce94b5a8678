//! codebook-classify - response-scale classification for survey codebooks
//!
//! Given the value labels of one question, [`ScaleClassifier`] decides the
//! scale shape, where the missing-value codes start, and whether the coding
//! direction must be flipped so that higher values mean "more".
//!
//! ```
//! use codebook_classify::ScaleClassifier;
//! use codebook_common::{QuestionLabelSet, ScaleType};
//!
//! let classifier = ScaleClassifier::default();
//! let labels = QuestionLabelSet::from_pairs(&[
//!     (1, "Very Satisfied"),
//!     (2, "Satisfied"),
//!     (3, "Dissatisfied"),
//!     (4, "Very Dissatisfied"),
//! ]);
//!
//! let analysis = classifier.classify(&labels);
//! assert_eq!(analysis.scale_type, ScaleType::Likert4);
//! assert!(analysis.needs_reversal);
//! ```

pub mod analysis;
pub mod boundary;
pub mod classifier;
pub mod lexicon;

pub use analysis::{analyze_questionnaire, AnalyzedQuestionnaire, DistributionRow, ScaleStatistics};
pub use boundary::{Boundary, BoundaryRule};
pub use classifier::{Partition, ScaleClassifier};
pub use lexicon::{LabelMatcher, Lexicon, LexiconError};
