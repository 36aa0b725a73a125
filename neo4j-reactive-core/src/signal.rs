/// The single value emitted by publishers that only report "done".
///
/// Publishers never emit nothing-at-all for an item, so operations such as
/// closing a client emit one `VoidSignal` before completing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct VoidSignal;
