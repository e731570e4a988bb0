//! Collapse the calls of the same tool in a cluster into one representative interval.
use crate::misc::floor_median;
use definitions::*;
use std::collections::BTreeMap;

/// One representative per distinct tool in `cluster`, ordered by tool.
/// The start (end) of a representative is the median of the starts (ends) of the calls of the tool.
pub fn representatives(cluster: &Cluster) -> Vec<Representative> {
    let mut per_tool: BTreeMap<Tool, (Vec<u64>, Vec<u64>)> = BTreeMap::new();
    for call in cluster.members.iter() {
        let (starts, ends) = per_tool.entry(call.tool).or_default();
        starts.push(call.start);
        ends.push(call.end);
    }
    per_tool
        .into_iter()
        .filter_map(|(tool, (mut starts, mut ends))| {
            let start = floor_median(&mut starts)?;
            let end = floor_median(&mut ends)?;
            Some(Representative {
                contig: cluster.contig.clone(),
                cluster_index: cluster.cluster_index,
                tool,
                start,
                end,
            })
        })
        .collect()
}
