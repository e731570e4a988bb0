//! Find the group of tools agreeing on a coordinate.
//!
//! Two values are linked if they differ by at most the tolerance. Among the connected components with two or more values,
//! the largest one wins, and among the largest ones, the one with the smallest range (max - min) wins.
//! If several components are still tied, the one containing the smallest index wins.
use crate::connectivity::ProximityGraph;
use definitions::Tool;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MajorityGroup {
    /// Indices to the input, in ascending order.
    pub indices: Vec<usize>,
    /// The tools of the values in the group, in the same order as `indices`.
    pub tools: Vec<Tool>,
    /// The values in the group, in the same order as `indices`.
    pub values: Vec<u64>,
}

impl MajorityGroup {
    pub fn len(&self) -> usize {
        self.indices.len()
    }
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
    pub fn range(&self) -> u64 {
        let max = self.values.iter().max().copied().unwrap_or(0);
        let min = self.values.iter().min().copied().unwrap_or(0);
        max - min
    }
}

/// Return the best majority group of `values`, or None if no two values are within `tolerance`.
/// `tools[i]` is the tool which reported `values[i]`.
pub fn best_group(values: &[u64], tools: &[Tool], tolerance: u64) -> Option<MajorityGroup> {
    assert_eq!(values.len(), tools.len());
    let range = |component: &[usize]| {
        let max = component.iter().map(|&i| values[i]).max().unwrap_or(0);
        let min = component.iter().map(|&i| values[i]).min().unwrap_or(0);
        max - min
    };
    // min_by_key returns the first one among the minimums.
    let indices = ProximityGraph::within_tolerance(values, tolerance)
        .connected_components()
        .into_iter()
        .filter(|component| 2 <= component.len())
        .min_by_key(|component| (std::cmp::Reverse(component.len()), range(component)))?;
    let tools = indices.iter().map(|&i| tools[i]).collect();
    let values = indices.iter().map(|&i| values[i]).collect();
    Some(MajorityGroup {
        indices,
        tools,
        values,
    })
}
