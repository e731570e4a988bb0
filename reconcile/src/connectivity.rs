//! Connected components of a graph whose edges are given by a predicate on pairs of nodes.
#[derive(Debug, Clone, Default)]
pub struct ProximityGraph {
    /// adjacency[i] is the list of the nodes adjacent to the i-th node, in ascending order.
    adjacency: Vec<Vec<usize>>,
}

impl ProximityGraph {
    /// Create a graph on `size` nodes, where `i` and `j` are adjacent iff `is_near(i,j)`.
    /// `is_near` should be symmetric. It is called once for each unordered pair.
    pub fn new<F: Fn(usize, usize) -> bool>(size: usize, is_near: F) -> Self {
        let mut adjacency = vec![vec![]; size];
        for i in 0..size {
            for j in i + 1..size {
                if is_near(i, j) {
                    adjacency[i].push(j);
                    adjacency[j].push(i);
                }
            }
        }
        Self { adjacency }
    }
    /// Create a graph on values, where two values are adjacent iff they differ by at most `tolerance`.
    pub fn within_tolerance(values: &[u64], tolerance: u64) -> Self {
        Self::new(values.len(), |i, j| {
            values[i].max(values[j]) - values[i].min(values[j]) <= tolerance
        })
    }
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }
    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }
    pub fn neighbors(&self, node: usize) -> &[usize] {
        &self.adjacency[node]
    }
    /// Return the connected components. Each component is sorted in ascending order,
    /// and the components are ordered by their smallest node.
    pub fn connected_components(&self) -> Vec<Vec<usize>> {
        let mut arrived = vec![false; self.len()];
        let mut components = vec![];
        for root in 0..self.len() {
            if arrived[root] {
                continue;
            }
            arrived[root] = true;
            let mut stack = vec![root];
            let mut component = vec![];
            while let Some(node) = stack.pop() {
                component.push(node);
                for &next in self.adjacency[node].iter() {
                    if !arrived[next] {
                        arrived[next] = true;
                        stack.push(next);
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }
}
