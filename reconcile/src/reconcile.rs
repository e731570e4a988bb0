//! Reconcile -- cluster the calls, resolve the consensus of each cluster, and map the identifiers.
//!
//! Contigs never interact with each other, so each contig is processed on its own thread.
use crate::cluster::{cluster_contig, ClusteringConfig};
use crate::consensus::{resolve, ConsensusConfig};
use crate::errors::{ReconcileError, Result};
use crate::id_map::identifier_map;
use crate::representative::representatives;
use definitions::*;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The parameters of a run. They are applied to every contig.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Minimum reciprocal overlap for a call to join a cluster.
    pub overlap_threshold: f64,
    /// Maximum gap (bp) for a call to join a cluster.
    pub max_distance: u64,
    /// Maximum difference (bp) between two agreeing coordinates.
    pub tolerance: u64,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            overlap_threshold: 0.5,
            max_distance: 1_000,
            tolerance: 200,
        }
    }
}

impl ReconcileConfig {
    pub fn new(overlap_threshold: f64, max_distance: u64, tolerance: u64) -> Self {
        Self {
            overlap_threshold,
            max_distance,
            tolerance,
        }
    }
    pub fn check(&self) -> Result<()> {
        if (0f64..=1f64).contains(&self.overlap_threshold) {
            Ok(())
        } else {
            Err(ReconcileError::InvalidParameter {
                parameter: "overlap_threshold".to_string(),
                reason: format!("{} is not within [0, 1]", self.overlap_threshold),
            })
        }
    }
    pub fn clustering(&self) -> ClusteringConfig {
        ClusteringConfig::new(self.overlap_threshold, self.max_distance)
    }
    pub fn consensus(&self) -> ConsensusConfig {
        ConsensusConfig::new(self.tolerance)
    }
}

/// Cluster the calls on `contig` and resolve the consensus of each cluster.
/// The records are in the same order as the clusters.
pub fn reconcile_contig(
    contig: &str,
    calls: Vec<Call>,
    config: &ReconcileConfig,
) -> (Vec<Cluster>, Vec<ConsensusRecord>) {
    let clusters = cluster_contig(contig, calls, &config.clustering());
    let consensus_config = config.consensus();
    let records: Vec<_> = clusters
        .iter()
        .map(|cluster| resolve(&representatives(cluster), &consensus_config))
        .collect();
    debug!(
        "CONSENSUS\t{}\t{}\t{}",
        contig,
        clusters.iter().map(|c| c.members.len()).sum::<usize>(),
        records.len()
    );
    (clusters, records)
}

pub trait Reconcile {
    fn reconcile(&self, config: &ReconcileConfig) -> Reconciliation;
}

impl Reconcile for [Call] {
    fn reconcile(&self, config: &ReconcileConfig) -> Reconciliation {
        let mut calls_on_contig: BTreeMap<&str, Vec<Call>> = BTreeMap::new();
        for call in self.iter() {
            calls_on_contig
                .entry(call.contig.as_str())
                .or_default()
                .push(call.clone());
        }
        debug!("RECONCILE\t{}\t{}", self.len(), calls_on_contig.len());
        let per_contig: Vec<_> = calls_on_contig
            .into_par_iter()
            .map(|(contig, calls)| reconcile_contig(contig, calls, config))
            .collect();
        let (mut clusters, mut consensus) = (vec![], vec![]);
        for (cls, records) in per_contig {
            clusters.extend(cls);
            consensus.extend(records);
        }
        // Stable. Already sorted by contig.
        consensus.sort_by(|x, y| {
            (&x.contig, x.consensus_start).cmp(&(&y.contig, y.consensus_start))
        });
        let identifier_map = identifier_map(&clusters, &consensus);
        info!(
            "RECONCILE\t{}\tCalls\t{}\tClusters\t{}\tMapped",
            self.len(),
            clusters.len(),
            identifier_map.len()
        );
        Reconciliation {
            clusters,
            consensus,
            identifier_map,
        }
    }
}
