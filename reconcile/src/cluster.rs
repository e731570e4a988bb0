//! Group the calls on a contig into clusters, one per putative prophage.
//!
//! The calls are swept once from left to right, sorted by (start, end). A call joins the open cluster if
//! its reciprocal overlap with the envelope of the cluster is large enough, or if it lies close enough to the envelope.
//! Otherwise the open cluster is closed and the call opens a new one. A closed cluster is never re-opened.
use crate::misc::{gap, reciprocal_overlap};
use definitions::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusteringConfig {
    /// Minimum reciprocal overlap to merge a call into the open cluster.
    overlap_threshold: f64,
    /// Maximum gap (bp) to merge a call into the open cluster.
    max_distance: u64,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.5,
            max_distance: 1_000,
        }
    }
}

impl ClusteringConfig {
    pub fn new(overlap_threshold: f64, max_distance: u64) -> Self {
        Self {
            overlap_threshold,
            max_distance,
        }
    }
    pub fn overlap_threshold(&self) -> f64 {
        self.overlap_threshold
    }
    pub fn max_distance(&self) -> u64 {
        self.max_distance
    }
    fn should_merge(&self, call: (u64, u64), envelope: (u64, u64)) -> bool {
        self.overlap_threshold <= reciprocal_overlap(call, envelope)
            || gap(call, envelope) <= self.max_distance
    }
}

/// The cluster under construction.
#[derive(Debug, Clone)]
struct Envelope {
    start: u64,
    end: u64,
    members: Vec<Call>,
}

impl Envelope {
    fn open(call: Call) -> Self {
        Self {
            start: call.start,
            end: call.end,
            members: vec![call],
        }
    }
    fn extend(mut self, call: Call) -> Self {
        self.start = self.start.min(call.start);
        self.end = self.end.max(call.end);
        self.members.push(call);
        self
    }
}

/// The accumulator of the sweep.
#[derive(Debug, Clone, Default)]
struct Sweep {
    open: Option<Envelope>,
    flushed: Vec<Vec<Call>>,
}

impl Sweep {
    fn push(self, call: Call, config: &ClusteringConfig) -> Self {
        let Sweep { open, mut flushed } = self;
        let open = match open {
            None => Envelope::open(call),
            Some(env) if config.should_merge((call.start, call.end), (env.start, env.end)) => {
                env.extend(call)
            }
            Some(env) => {
                flushed.push(env.members);
                Envelope::open(call)
            }
        };
        Sweep {
            open: Some(open),
            flushed,
        }
    }
    fn finish(self, contig: &str) -> Vec<Cluster> {
        let Sweep { open, mut flushed } = self;
        flushed.extend(open.map(|env| env.members));
        flushed
            .into_iter()
            .enumerate()
            .map(|(idx, members)| Cluster::new(contig, idx + 1, members))
            .collect()
    }
}

/// Cluster the calls on `contig`. Every call belongs to exactly one cluster,
/// and clusters are ordered by their minimum start. Empty input gives no clusters.
pub fn cluster_contig(
    contig: &str,
    mut calls: Vec<Call>,
    config: &ClusteringConfig,
) -> Vec<Cluster> {
    debug_assert!(calls.iter().all(|c| c.contig == contig));
    // Stable; ties keep the input order.
    calls.sort_by_key(|c| (c.start, c.end));
    let clusters = calls
        .into_iter()
        .fold(Sweep::default(), |sweep, call| sweep.push(call, config))
        .finish(contig);
    trace!("CLUSTER\t{}\t{}", contig, clusters.len());
    clusters
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoshiro256StarStar;
    fn call(tool: Tool, start: u64, end: u64) -> Call {
        let id = ProphageId::new("ctg1", start, end).to_string();
        Call::new(tool, "ctg1", start, end, &id)
    }
    fn ids(cluster: &Cluster) -> Vec<(Tool, u64, u64)> {
        cluster
            .members
            .iter()
            .map(|c| (c.tool, c.start, c.end))
            .collect()
    }
    #[test]
    fn empty_contig() {
        let config = ClusteringConfig::default();
        assert!(cluster_contig("ctg1", vec![], &config).is_empty());
    }
    #[test]
    fn singleton() {
        let config = ClusteringConfig::default();
        let clusters = cluster_contig("ctg1", vec![call(Tool::Vibrant, 10, 20)], &config);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].cluster_index, 1);
        assert_eq!(clusters[0].contig, "ctg1");
    }
    #[test]
    fn overlapping_and_distant() {
        let config = ClusteringConfig::default();
        let calls = vec![
            call(Tool::Vibrant, 8000, 9000),
            call(Tool::VirSorter2, 100, 5000),
            call(Tool::GeNomad, 110, 4995),
        ];
        let clusters = cluster_contig("ctg1", calls, &config);
        assert_eq!(clusters.len(), 2);
        assert_eq!(
            ids(&clusters[0]),
            vec![(Tool::VirSorter2, 100, 5000), (Tool::GeNomad, 110, 4995)]
        );
        assert_eq!(ids(&clusters[1]), vec![(Tool::Vibrant, 8000, 9000)]);
        assert_eq!(clusters[1].cluster_index, 2);
    }
    #[test]
    fn contained_call_merges() {
        // Reciprocal overlap is small, but the call lies inside the envelope.
        let config = ClusteringConfig::default();
        let calls = vec![
            call(Tool::VirSorter2, 100, 5000),
            call(Tool::Vibrant, 3000, 3100),
        ];
        assert_eq!(cluster_contig("ctg1", calls, &config).len(), 1);
    }
    #[test]
    fn proximity_boundary() {
        let config = ClusteringConfig::default();
        let calls = vec![call(Tool::VirSorter2, 0, 100), call(Tool::GeNomad, 1100, 1200)];
        assert_eq!(cluster_contig("ctg1", calls, &config).len(), 1);
        let calls = vec![call(Tool::VirSorter2, 0, 100), call(Tool::GeNomad, 1101, 1200)];
        assert_eq!(cluster_contig("ctg1", calls, &config).len(), 2);
    }
    #[test]
    fn overlap_only_merge() {
        let config = ClusteringConfig::new(0.5, 0);
        let calls = vec![call(Tool::VirSorter2, 0, 100), call(Tool::GeNomad, 50, 150)];
        assert_eq!(cluster_contig("ctg1", calls, &config).len(), 1);
        let calls = vec![call(Tool::VirSorter2, 0, 100), call(Tool::GeNomad, 60, 160)];
        // Overlap 0.4, but they intersect, so the gap is zero.
        assert_eq!(cluster_contig("ctg1", calls, &config).len(), 1);
        let calls = vec![call(Tool::VirSorter2, 0, 100), call(Tool::GeNomad, 101, 160)];
        assert_eq!(cluster_contig("ctg1", calls, &config).len(), 2);
    }
    #[test]
    fn bridging_call() {
        // The middle call bridges two calls which are too far from each other.
        let config = ClusteringConfig::default();
        let calls = vec![
            call(Tool::VirSorter2, 0, 1000),
            call(Tool::GeNomad, 3500, 4000),
            call(Tool::Vibrant, 1800, 2600),
        ];
        let clusters = cluster_contig("ctg1", calls, &config);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].members.len(), 3);
    }
    #[test]
    fn compare_with_envelope() {
        // The third call is far from the second call, but it overlaps the envelope of the cluster.
        let config = ClusteringConfig::new(0.5, 10);
        let calls = vec![
            call(Tool::VirSorter2, 0, 10_000),
            call(Tool::GeNomad, 200, 300),
            call(Tool::Vibrant, 9_500, 10_500),
        ];
        let clusters = cluster_contig("ctg1", calls, &config);
        assert_eq!(clusters.len(), 1);
        assert_eq!((clusters[0].min_start(), clusters[0].max_end()), (0, 10_500));
    }
    #[test]
    fn stable_ties() {
        let config = ClusteringConfig::default();
        let calls = vec![
            call(Tool::Vibrant, 10, 20),
            call(Tool::GeNomad, 10, 20),
            call(Tool::VirSorter2, 10, 20),
        ];
        let clusters = cluster_contig("ctg1", calls, &config);
        let tools: Vec<_> = clusters[0].members.iter().map(|c| c.tool).collect();
        assert_eq!(tools, vec![Tool::Vibrant, Tool::GeNomad, Tool::VirSorter2]);
    }
    fn random_calls<R: Rng>(rng: &mut R, num: usize) -> Vec<Call> {
        (0..num)
            .map(|i| {
                let tool = Tool::ALL[rng.gen_range(0..Tool::ALL.len())];
                let start = rng.gen_range(0..200_000);
                let len = rng.gen_range(0..30_000);
                Call::new(tool, "ctg1", start, start + len, &format!("call{i}"))
            })
            .collect()
    }
    #[test]
    fn partition_and_order() {
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(4832);
        for _ in 0..50 {
            let num = rng.gen_range(1..80);
            let calls = random_calls(&mut rng, num);
            let max_distance = rng.gen_range(0..3000);
            let config = ClusteringConfig::new(rng.gen_range(0.1..1.0), max_distance);
            let clusters = cluster_contig("ctg1", calls.clone(), &config);
            let mut clustered: Vec<_> = clusters
                .iter()
                .flat_map(|c| c.members.iter().map(|m| m.raw_id.clone()))
                .collect();
            clustered.sort();
            let mut answer: Vec<_> = calls.iter().map(|c| c.raw_id.clone()).collect();
            answer.sort();
            assert_eq!(clustered, answer);
            assert!(clusters.iter().all(|c| !c.members.is_empty()));
            for (i, w) in clusters.windows(2).enumerate() {
                assert!(w[0].min_start() <= w[1].min_start());
                assert_eq!(w[0].cluster_index, i + 1);
                // Adjacent clusters were split because the call was neither overlapping nor close.
                let envelope = (w[0].min_start(), w[0].max_end());
                let first = w[1]
                    .members
                    .iter()
                    .map(|c| (c.start, c.end))
                    .min()
                    .unwrap();
                assert!(max_distance < gap(first, envelope));
            }
        }
    }
}
