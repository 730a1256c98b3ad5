use serde::{Serialize, Serializer};
use serde_json::{json, Value};

use crate::kernel::collab::Address;

// Wire shape: a positional JSON array headed by the event tag.
//   ["call", f, name]
//   ["br", f, name, label]
//   ["set_local", f, name, slot, value, value_name]
// Unresolved names are encoded as null.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    Call {
        function: Address,
        name: Option<String>,
    },

    Branch {
        function: Address,
        name: Option<String>,
        label: u32,
    },

    SetLocal {
        function: Address,
        name: Option<String>,
        slot: u32,
        value: u64,
        value_name: Option<String>,
    },
}

impl TraceEvent {
    pub fn tag(&self) -> &'static str {
        match self {
            TraceEvent::Call { .. } => "call",
            TraceEvent::Branch { .. } => "br",
            TraceEvent::SetLocal { .. } => "set_local",
        }
    }

    pub fn function(&self) -> Address {
        match self {
            TraceEvent::Call { function, .. }
            | TraceEvent::Branch { function, .. }
            | TraceEvent::SetLocal { function, .. } => *function,
        }
    }

    pub fn to_record(&self) -> Value {
        match self {
            TraceEvent::Call { function, name } => json!([self.tag(), function, name]),
            TraceEvent::Branch { function, name, label } => {
                json!([self.tag(), function, name, label])
            }
            TraceEvent::SetLocal { function, name, slot, value, value_name } => {
                json!([self.tag(), function, name, slot, value, value_name])
            }
        }
    }
}

impl Serialize for TraceEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record().serialize(serializer)
    }
}
