//! Inter-agent message envelope.

use aspeak_core::Term;
use serde::{Deserialize, Serialize};

/// A belief in flight from one agent to another.
///
/// Messages are queued on the environment by `.send_belief` and delivered
/// by the system driver between interpreter sweeps, never concurrently
/// with a step.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub recipient: String,
    pub term: Term,
}

#[cfg(test)]
mod tests {
    use super::*;
    use aspeak_core::BeliefAtom;

    #[test]
    fn test_message_round_trip() {
        let message = Message {
            recipient: "dos".to_string(),
            term: Term::Atom(BeliefAtom::new("ping", vec![Term::Num(1.0)])),
        };
        let encoded = serde_json::to_string(&message).expect("serialize message");
        let decoded: Message = serde_json::from_str(&encoded).expect("deserialize message");
        assert_eq!(message, decoded);
    }
}
