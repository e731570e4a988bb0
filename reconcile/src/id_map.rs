//! Map every raw identifier to the consensus identifier of its cluster.
use definitions::*;
use std::collections::HashMap;

/// Build raw_id -> consensus_id. A cluster and its record are matched by (contig, cluster_index),
/// not by their positions in the slices. Clusters without a record are skipped.
pub fn identifier_map(clusters: &[Cluster], records: &[ConsensusRecord]) -> IdentifierMap {
    let consensus_ids: HashMap<(&str, usize), &str> = records
        .iter()
        .map(|r| ((r.contig.as_str(), r.cluster_index), r.consensus_id.as_str()))
        .collect();
    let mut map = IdentifierMap::new();
    for cluster in clusters.iter() {
        let key = (cluster.contig.as_str(), cluster.cluster_index);
        let consensus_id = match consensus_ids.get(&key) {
            Some(&id) => id,
            None => {
                warn!("NOCONSENSUS\t{}\t{}", cluster.contig, cluster.cluster_index);
                continue;
            }
        };
        for call in cluster.members.iter() {
            if let Some(prev) = map.insert(&call.raw_id, consensus_id) {
                if prev != consensus_id {
                    debug!("REMAPPED\t{}\t{}\t{}", call.raw_id, prev, consensus_id);
                }
            }
        }
    }
    map
}
