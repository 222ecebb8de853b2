//! Message receipt info

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::MessageKey;

/// Read and delivery receipts for one message, participant -> timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInfo {
    #[serde(default)]
    pub reads: HashMap<String, u64>,
    #[serde(default)]
    pub deliveries: HashMap<String, u64>,
}

impl MessageInfo {
    /// Create info with no receipts
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge each sub-map entry by entry
    pub fn merge(&mut self, patch: &MessageInfoPatch) {
        if let Some(reads) = &patch.reads {
            self.reads
                .extend(reads.iter().map(|(k, v)| (k.clone(), *v)));
        }
        if let Some(deliveries) = &patch.deliveries {
            self.deliveries
                .extend(deliveries.iter().map(|(k, v)| (k.clone(), *v)));
        }
    }
}

/// Partial receipt info; present maps merge key by key
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInfoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reads: Option<HashMap<String, u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliveries: Option<HashMap<String, u64>>,
}

/// A keyed receipt info update
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInfoUpdate {
    pub key: MessageKey,
    pub update: MessageInfoPatch,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_is_per_participant() {
        let mut info = MessageInfo::new();
        info.reads.insert("a".to_string(), 1);

        info.merge(&MessageInfoPatch {
            reads: Some(HashMap::from([("b".to_string(), 2)])),
            deliveries: Some(HashMap::from([("a".to_string(), 1)])),
        });

        assert_eq!(info.reads.len(), 2);
        assert_eq!(info.deliveries["a"], 1);
    }
}
