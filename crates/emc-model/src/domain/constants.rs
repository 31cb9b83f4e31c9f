//! Well-known string constants shared across the model layer.

/// Separator between the logical cluster and the object name in an [`crate::ObjectKey`].
///
/// Keys render as `"<cluster>|<name>"`, e.g. `"root:compute|dev"`.
pub const KEY_SEPARATOR: char = '|';

/// Label key consulted by the label-affinity compatibility rule.
///
/// When both an endpoint and a location carry this label, a binding between them
/// is only produced if the two values are equal.
pub const LABEL_AFFINITY: &str = "edge.kcp.io/affinity";
