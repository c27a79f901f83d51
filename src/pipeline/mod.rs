// Per-event processing: cleaning, augmentation, weights, conversion and assembly

pub mod augment;
pub mod cleaning;
pub mod convert;
pub mod event_pipeline;
pub mod record;
pub mod sorting;
pub mod weights;

pub use event_pipeline::{EventOutcome, EventPipeline, ProcessedEvent};
pub use record::{Branch, EventInfo, FilterEntry, OutputRecord};
pub use sorting::JetSortPermutations;
pub use weights::{EventWeights, WeightTable};
