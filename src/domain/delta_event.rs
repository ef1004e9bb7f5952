/// One normalized increment of model output.
///
/// The relay closes its channel when the exchange ends; there is no explicit terminal variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeltaEvent {
    Delta(String),
    Error(String),
}
