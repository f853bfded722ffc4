use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ids::{operator_prefix, StopId};
use crate::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferCategory {
    SameStationSameOperator,
    SameStationCrossOperator,
    InterCitySameMetro,
}

impl TransferCategory {
    /// Minimum dwell time that must elapse before a transfer across an edge
    /// of this category can be boarded on.
    pub fn min_dwell(self) -> Duration {
        match self {
            TransferCategory::SameStationSameOperator => Duration::minutes(3),
            TransferCategory::SameStationCrossOperator => Duration::minutes(10),
            TransferCategory::InterCitySameMetro => Duration::minutes(45),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferLink {
    pub sibling: StopId,
    pub category: TransferCategory,
}

/// For each stop, the sibling stops reachable by walking. Symmetry is not
/// guaranteed by construction: category is a property of the edge as seen
/// from its originating side, and consumers must not assume the reverse
/// edge carries the same category (or exists at all, outside of the
/// manifest-sourced same-station links, which are always produced in both
/// directions).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferIndex(pub HashMap<StopId, Vec<TransferLink>>);

impl TransferIndex {
    pub fn neighbours(&self, stop: &str) -> &[TransferLink] {
        self.0.get(stop).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn add(&mut self, from: StopId, link: TransferLink) {
        self.0.entry(from).or_default().push(link);
    }

    pub fn add_symmetric(&mut self, a: StopId, b: StopId, category: TransferCategory) {
        self.add(
            a.clone(),
            TransferLink {
                sibling: b.clone(),
                category,
            },
        );
        self.add(b, TransferLink { sibling: a, category });
    }
}

/// The shape persisted in `transfer_index.json`: a mix of bare sibling ids
/// (default same-operator category) and tagged inter-city objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTransferEntry {
    Plain(StopId),
    Tagged { id: StopId, inter_city: bool },
}

/// Lift the heterogeneous persisted shape into a uniform `TransferIndex`,
/// deciding the default category for plain entries from operator-prefix
/// equality between the two sides of the edge.
pub fn normalize(raw: HashMap<StopId, Vec<RawTransferEntry>>) -> TransferIndex {
    let mut index = TransferIndex::default();
    for (from, entries) in raw {
        for entry in entries {
            let (sibling, category) = match entry {
                RawTransferEntry::Tagged { id, inter_city: true } => {
                    (id, TransferCategory::InterCitySameMetro)
                }
                RawTransferEntry::Tagged { id, inter_city: false } | RawTransferEntry::Plain(id) => {
                    let category = if operator_prefix(&from) == operator_prefix(&id) {
                        TransferCategory::SameStationSameOperator
                    } else {
                        TransferCategory::SameStationCrossOperator
                    };
                    (id, category)
                }
            };
            index.add(from.clone(), TransferLink { sibling, category });
        }
    }
    index
}
