//! Messages handed back to the embedding UI.

/// A message for the embedding UI's event loop.
///
/// Dispatch and the process runner produce these; the engine never consumes
/// them itself. How they are routed (channel, queue, direct call) is the
/// embedder's choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiMsg {
    /// A command finished and may have changed repo state; reload the model.
    Refresh,
    /// Open the diff pager with the captured bytes.
    ShowDiff { output: Vec<u8> },
}
