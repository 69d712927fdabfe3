//! Random plan-graph generation.
//!
//! [`PlanGenerator`] draws weighted segments ([`TicketSampler`]) until the target duration is
//! reached, cuts clips from tag-filtered sources ([`SourcePool`]), and balances the resulting
//! segment sequence into a bounded fan-out concat tree ([`LayerStack`]).

pub mod blend;
pub mod filter;
pub mod generator;
pub mod layers;
pub mod params;
pub mod pool;
pub mod sampler;

pub use blend::{BlendCatalog, BlendSlot, BlendTemplate, builtin_templates};
pub use filter::TagFilter;
pub use generator::{GenerateReport, PlanGenerator, cut, quantize};
pub use layers::LayerStack;
pub use params::{DurationRange, GeneratorParameters, SegmentTemplate};
pub use pool::{EligibleSource, SourcePool};
pub use sampler::TicketSampler;
