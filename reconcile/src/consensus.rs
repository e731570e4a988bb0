//! Decide one consensus interval per cluster from the representatives of the tools.
//!
//! Start and end are resolved independently. If a majority group of tools agrees on an edge,
//! the median of the group is taken. Otherwise, the outermost value is taken (min for start, max for end).
use crate::majority::best_group;
use crate::misc::floor_median;
use definitions::*;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsensusConfig {
    /// Two values within this distance (bp) agree.
    tolerance: u64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self { tolerance: 200 }
    }
}

impl ConsensusConfig {
    pub fn new(tolerance: u64) -> Self {
        Self { tolerance }
    }
    pub fn tolerance(&self) -> u64 {
        self.tolerance
    }
}

/// The resolved value of an edge, the tools used, and how it was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEdge {
    pub value: u64,
    pub used_tools: BTreeSet<Tool>,
    pub resolution: EdgeResolution,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Start,
    End,
}

fn resolve_edge(values: &[u64], tools: &[Tool], side: Side, tolerance: u64) -> ResolvedEdge {
    match best_group(values, tools, tolerance) {
        Some(mut group) => ResolvedEdge {
            // Group has at least two values.
            value: floor_median(&mut group.values).unwrap_or(0),
            used_tools: group.tools.iter().copied().collect(),
            resolution: EdgeResolution::Consensus(group.len()),
        },
        None => {
            let value = match side {
                Side::Start => values.iter().min(),
                Side::End => values.iter().max(),
            };
            ResolvedEdge {
                value: value.copied().unwrap_or(0),
                used_tools: tools.iter().copied().collect(),
                resolution: EdgeResolution::Fallback,
            }
        }
    }
}

pub fn resolve_start(values: &[u64], tools: &[Tool], config: &ConsensusConfig) -> ResolvedEdge {
    resolve_edge(values, tools, Side::Start, config.tolerance)
}

pub fn resolve_end(values: &[u64], tools: &[Tool], config: &ConsensusConfig) -> ResolvedEdge {
    resolve_edge(values, tools, Side::End, config.tolerance)
}

/// Resolve the consensus record of a cluster from its representatives (one per tool).
/// `reps` should not be empty, and all of them should come from the same cluster.
pub fn resolve(reps: &[Representative], config: &ConsensusConfig) -> ConsensusRecord {
    assert!(!reps.is_empty());
    let (contig, cluster_index) = (&reps[0].contig, reps[0].cluster_index);
    debug_assert!(reps
        .iter()
        .all(|r| &r.contig == contig && r.cluster_index == cluster_index));
    let tools: Vec<Tool> = reps.iter().map(|r| r.tool).collect();
    let tool_set: BTreeSet<Tool> = tools.iter().copied().collect();
    if let [rep] = reps {
        let interval = (rep.start, rep.end);
        let method = Method::SingleTool;
        let used = tool_set.clone();
        return ConsensusRecord::new(
            contig,
            cluster_index,
            tool_set,
            interval,
            method,
            used.clone(),
            used,
        );
    }
    let starts: Vec<u64> = reps.iter().map(|r| r.start).collect();
    let ends: Vec<u64> = reps.iter().map(|r| r.end).collect();
    let start = resolve_start(&starts, &tools, config);
    let end = resolve_end(&ends, &tools, config);
    if end.value < start.value {
        // The two majorities crossed each other. Take the envelope.
        debug!(
            "CROSSED\t{}\t{}\t{}\t{}",
            contig, cluster_index, start.value, end.value
        );
        let min = starts.iter().min().copied().unwrap_or(0);
        let max = ends.iter().max().copied().unwrap_or(0);
        let method = Method::envelope();
        let used = tool_set.clone();
        return ConsensusRecord::new(
            contig,
            cluster_index,
            tool_set,
            (min, max),
            method,
            used.clone(),
            used,
        );
    }
    let method = Method::Edgewise {
        start: start.resolution,
        end: end.resolution,
    };
    let interval = (start.value, end.value);
    ConsensusRecord::new(
        contig,
        cluster_index,
        tool_set,
        interval,
        method,
        start.used_tools,
        end.used_tools,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    fn rep(tool: Tool, start: u64, end: u64) -> Representative {
        Representative {
            contig: "ctg1".to_string(),
            cluster_index: 1,
            tool,
            start,
            end,
        }
    }
    fn set(tools: &[Tool]) -> BTreeSet<Tool> {
        tools.iter().copied().collect()
    }
    #[test]
    fn majority_start() {
        let tools = [Tool::GeNomad, Tool::Vibrant, Tool::VirSorter2];
        let config = ConsensusConfig::default();
        let start = resolve_start(&[100, 105, 900], &tools, &config);
        assert_eq!(start.value, 102);
        assert_eq!(start.used_tools, set(&[Tool::GeNomad, Tool::Vibrant]));
        assert_eq!(start.resolution, EdgeResolution::Consensus(2));
    }
    #[test]
    fn fallback_start_and_end() {
        let tools = [Tool::GeNomad, Tool::Vibrant, Tool::VirSorter2];
        let config = ConsensusConfig::default();
        let start = resolve_start(&[100, 500, 900], &tools, &config);
        assert_eq!(start.value, 100);
        assert_eq!(start.used_tools, set(&tools));
        assert_eq!(start.resolution, EdgeResolution::Fallback);
        let end = resolve_end(&[100, 500, 900], &tools, &config);
        assert_eq!(end.value, 900);
        assert_eq!(end.resolution, EdgeResolution::Fallback);
    }
    #[test]
    fn single_tool() {
        let config = ConsensusConfig::default();
        let record = resolve(&[rep(Tool::Vibrant, 3000, 3100)], &config);
        assert_eq!((record.consensus_start, record.consensus_end), (3000, 3100));
        assert_eq!(record.method, Method::SingleTool);
        assert_eq!(record.method.to_string(), "single_tool");
        assert_eq!(record.n_tools, 1);
        assert_eq!(record.used_tools_start, set(&[Tool::Vibrant]));
        assert_eq!(record.used_tools_end, set(&[Tool::Vibrant]));
        assert_eq!(record.consensus_id, "ctg1_prophage_3000_3100");
    }
    #[test]
    fn two_tools_agree() {
        let config = ConsensusConfig::default();
        let reps = [rep(Tool::GeNomad, 110, 4995), rep(Tool::VirSorter2, 100, 5000)];
        let record = resolve(&reps, &config);
        assert_eq!((record.consensus_start, record.consensus_end), (105, 4997));
        assert_eq!(record.method.to_string(), "start_consensus_2+end_consensus_2");
        assert_eq!(record.n_tools, 2);
        assert_eq!(record.consensus_id, "ctg1_prophage_105_4997");
        assert_eq!(record.cluster_index, 1);
    }
    #[test]
    fn mixed_resolution() {
        let config = ConsensusConfig::default();
        let reps = [
            rep(Tool::GeNomad, 100, 5000),
            rep(Tool::Vibrant, 140, 9000),
            rep(Tool::VirSorter2, 2000, 7000),
        ];
        let record = resolve(&reps, &config);
        assert_eq!(record.consensus_start, 120);
        assert_eq!(record.used_tools_start, set(&[Tool::GeNomad, Tool::Vibrant]));
        assert_eq!(record.consensus_end, 9000);
        assert_eq!(record.used_tools_end, set(&Tool::ALL));
        assert_eq!(record.method.to_string(), "start_consensus_2+end_max");
        assert_eq!(record.tools, set(&Tool::ALL));
    }
    #[test]
    fn crossed_majorities() {
        // VIBRANT and VirSorter2 agree on the start at 302,
        // geNomad and VIBRANT agree on the end at 200.
        let config = ConsensusConfig::new(200);
        let reps = [
            rep(Tool::GeNomad, 10, 100),
            rep(Tool::Vibrant, 300, 300),
            rep(Tool::VirSorter2, 305, 900),
        ];
        let record = resolve(&reps, &config);
        assert!(record.consensus_start <= record.consensus_end);
        assert_eq!((record.consensus_start, record.consensus_end), (10, 900));
        assert_eq!(record.used_tools_start, set(&Tool::ALL));
        assert_eq!(record.method, Method::envelope());
    }
}
