//! Transition records stored in the replay memory.
//!
//! A record is a value type: the memory owns all stored bytes, and sampled
//! records are handed back to the caller as owned copies. State and action
//! payloads are opaque fixed-shape binary blobs; the memory never inspects
//! their contents, only their lengths.

/// A single environment transition.
///
/// The payload fields (`state`, `action`, `next_state`) are opaque byte
/// buffers whose lengths are fixed by the first record inserted into a
/// memory. Scalar metadata rides alongside: the reward obtained on the
/// transition and whether it ended the episode.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionRecord {
    /// Observation before the action was taken.
    pub state: Vec<u8>,

    /// Action taken, encoded by the caller.
    pub action: Vec<u8>,

    /// Reward obtained on this transition.
    pub reward: f64,

    /// Observation after the action was taken.
    pub next_state: Vec<u8>,

    /// Whether the episode terminated on this transition.
    pub is_terminal: bool,
}

impl TransitionRecord {
    /// Creates a transition record from its parts.
    pub fn new(
        state: Vec<u8>,
        action: Vec<u8>,
        reward: f64,
        next_state: Vec<u8>,
        is_terminal: bool,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            next_state,
            is_terminal,
        }
    }
}
