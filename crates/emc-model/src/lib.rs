mod domain;
pub use domain::{LABEL_AFFINITY, KEY_SEPARATOR};
pub use domain::{Labels, ObjectKey, ResourceVersion};

mod error;
pub use error::{ModelError, ModelResult};

mod selector;
pub use selector::{SelectorOperator, SelectorRequirement, SelectorSpec};

mod placement;
pub use placement::PlacementSpec;

mod event;
pub use event::{CandidateKind, ChangeEvent, EventOp, Payload, ResourceKind};

mod binding;
pub use binding::{Binding, BindingDelta, BindingOp};

mod strategy;
pub use strategy::{BackoffStrategy, FeedPolicy, JitterStrategy, RestartStrategy};
