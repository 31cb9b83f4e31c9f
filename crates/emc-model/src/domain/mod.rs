mod labels;
pub use labels::Labels;

mod key;
pub use key::ObjectKey;

mod version;
pub use version::ResourceVersion;

mod constants;
pub use constants::{KEY_SEPARATOR, LABEL_AFFINITY};
