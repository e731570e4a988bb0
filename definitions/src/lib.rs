//! Definitions -- A tiny interface for the prophage coordinate reconciliation.
//! Every tool reports its own interval for the same putative prophage. The calls are passed around as [Call](Call)s,
//! grouped into [Cluster](Cluster)s, and finally summarized into one [ConsensusRecord](ConsensusRecord) per cluster.
//! The whole output of one run is packed into a [Reconciliation](Reconciliation), which can be dumped as a JSON object.

use serde::{Deserialize, Serialize};
use serde_with::rust::StringWithSeparator;
use serde_with::{CommaSeparator, DeserializeFromStr, SerializeDisplay};
use std::collections::{BTreeSet, HashMap};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DefinitionError {
    #[error("Unknown tool '{0}' (expected one of geNomad, VIBRANT, VirSorter2)")]
    InvalidTool(String),
    #[error("'{0}' is not a prophage identifier of the form <contig>_prophage_<start>_<end>")]
    InvalidProphageId(String),
    #[error("Invalid consensus method tag '{0}'")]
    InvalidMethod(String),
}

/// The detection tools whose calls we reconcile.
/// The order of the variants is the order in which tools are listed everywhere.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub enum Tool {
    GeNomad,
    Vibrant,
    VirSorter2,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::GeNomad, Tool::Vibrant, Tool::VirSorter2];
    pub fn name(&self) -> &'static str {
        match self {
            Tool::GeNomad => "geNomad",
            Tool::Vibrant => "VIBRANT",
            Tool::VirSorter2 => "VirSorter2",
        }
    }
}

impl std::fmt::Display for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Tool {
    type Err = DefinitionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tool::ALL
            .iter()
            .find(|tool| tool.name().eq_ignore_ascii_case(s.trim()))
            .copied()
            .ok_or_else(|| DefinitionError::InvalidTool(s.to_string()))
    }
}

/// `{contig}_prophage_{start}_{end}`. This is how the tools name their provirus calls,
/// and how we name the consensus intervals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProphageId {
    pub contig: String,
    pub start: u64,
    pub end: u64,
}

impl ProphageId {
    /// Create a new id. The coordinates are swapped if `end < start`.
    pub fn new(contig: &str, start: u64, end: u64) -> Self {
        Self {
            contig: contig.to_string(),
            start: start.min(end),
            end: start.max(end),
        }
    }
}

impl std::fmt::Display for ProphageId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}_prophage_{}_{}", self.contig, self.start, self.end)
    }
}

fn parse_digits(xs: &str) -> Option<u64> {
    if !xs.is_empty() && xs.bytes().all(|x| x.is_ascii_digit()) {
        xs.parse().ok()
    } else {
        None
    }
}

impl std::str::FromStr for ProphageId {
    type Err = DefinitionError;
    /// The shortest contig name such that the rest is exactly `_prophage_<digits>_<digits>` wins.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        const INFIX: &[u8] = b"_prophage_";
        let bytes = s.as_bytes();
        (1..bytes.len())
            .filter(|&pos| bytes[pos..].starts_with(INFIX))
            .find_map(|pos| {
                // `pos` is at an ASCII underscore, thus at a char boundary.
                let (start, end) = s[pos + INFIX.len()..].split_once('_')?;
                let (start, end) = (parse_digits(start)?, parse_digits(end)?);
                Some(ProphageId::new(&s[..pos], start, end))
            })
            .ok_or_else(|| DefinitionError::InvalidProphageId(s.to_string()))
    }
}

/// One tool's reported interval for a candidate prophage.
/// `start <= end` always holds; it is normalized on construction and on deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UncheckedCall")]
pub struct Call {
    pub tool: Tool,
    pub contig: String,
    pub start: u64,
    pub end: u64,
    /// The identifier the tool used for this call.
    pub raw_id: String,
}

#[derive(Deserialize)]
struct UncheckedCall {
    tool: Tool,
    contig: String,
    start: u64,
    end: u64,
    raw_id: String,
}

impl From<UncheckedCall> for Call {
    fn from(call: UncheckedCall) -> Self {
        let UncheckedCall {
            tool,
            contig,
            start,
            end,
            raw_id,
        } = call;
        Call::new(tool, &contig, start, end, &raw_id)
    }
}

impl Call {
    pub fn new(tool: Tool, contig: &str, start: u64, end: u64, raw_id: &str) -> Self {
        Self {
            tool,
            contig: contig.to_string(),
            start: start.min(end),
            end: start.max(end),
            raw_id: raw_id.to_string(),
        }
    }
    pub fn from_prophage_id(tool: Tool, id: &ProphageId, raw_id: &str) -> Self {
        Self::new(tool, &id.contig, id.start, id.end, raw_id)
    }
    pub fn len(&self) -> u64 {
        self.end - self.start
    }
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

impl std::fmt::Display for Call {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (tool, contig, start, end, id) =
            (self.tool, &self.contig, self.start, self.end, &self.raw_id);
        write!(f, "{tool}\t{contig}\t{start}\t{end}\t{id}")
    }
}

/// Calls on one contig believed to represent the same prophage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cluster {
    pub contig: String,
    /// 1-based, per contig.
    pub cluster_index: usize,
    pub members: Vec<Call>,
}

impl Cluster {
    pub fn new(contig: &str, cluster_index: usize, members: Vec<Call>) -> Self {
        assert!(!members.is_empty());
        Self {
            contig: contig.to_string(),
            cluster_index,
            members,
        }
    }
    pub fn min_start(&self) -> u64 {
        self.members.iter().map(|c| c.start).min().unwrap_or(0)
    }
    pub fn max_end(&self) -> u64 {
        self.members.iter().map(|c| c.end).max().unwrap_or(0)
    }
    pub fn tools(&self) -> BTreeSet<Tool> {
        self.members.iter().map(|c| c.tool).collect()
    }
}

/// The median-reduced interval of one tool inside a cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Representative {
    pub contig: String,
    pub cluster_index: usize,
    pub tool: Tool,
    pub start: u64,
    pub end: u64,
}

/// How one edge (start or end) of a consensus interval was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeResolution {
    /// A majority group of this many tools agreed.
    Consensus(usize),
    /// No majority. The outermost value was taken.
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub enum Method {
    SingleTool,
    Edgewise {
        start: EdgeResolution,
        end: EdgeResolution,
    },
}

impl Method {
    pub fn envelope() -> Self {
        Method::Edgewise {
            start: EdgeResolution::Fallback,
            end: EdgeResolution::Fallback,
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Method::SingleTool => write!(f, "single_tool"),
            Method::Edgewise { start, end } => {
                match start {
                    EdgeResolution::Consensus(k) => write!(f, "start_consensus_{k}")?,
                    EdgeResolution::Fallback => write!(f, "start_min")?,
                }
                match end {
                    EdgeResolution::Consensus(k) => write!(f, "+end_consensus_{k}"),
                    EdgeResolution::Fallback => write!(f, "+end_max"),
                }
            }
        }
    }
}

impl std::str::FromStr for Method {
    type Err = DefinitionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || DefinitionError::InvalidMethod(s.to_string());
        if s == "single_tool" {
            return Ok(Method::SingleTool);
        }
        let (start, end) = s.split_once('+').ok_or_else(err)?;
        let start = match start {
            "start_min" => EdgeResolution::Fallback,
            _ => start
                .strip_prefix("start_consensus_")
                .and_then(|k| k.parse().ok())
                .map(EdgeResolution::Consensus)
                .ok_or_else(err)?,
        };
        let end = match end {
            "end_max" => EdgeResolution::Fallback,
            _ => end
                .strip_prefix("end_consensus_")
                .and_then(|k| k.parse().ok())
                .map(EdgeResolution::Consensus)
                .ok_or_else(err)?,
        };
        Ok(Method::Edgewise { start, end })
    }
}

/// The agreed-upon interval of a cluster, together with which tools agreed.
/// Tool sets are written as comma-joined lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusRecord {
    pub consensus_id: String,
    pub contig: String,
    /// The index of the cluster this record summarizes. Not a column of the table.
    #[serde(skip)]
    pub cluster_index: usize,
    /// The number of distinct tools, not the number of calls.
    pub n_tools: usize,
    #[serde(with = "StringWithSeparator::<CommaSeparator>")]
    pub tools: BTreeSet<Tool>,
    pub consensus_start: u64,
    pub consensus_end: u64,
    pub method: Method,
    #[serde(with = "StringWithSeparator::<CommaSeparator>")]
    pub used_tools_start: BTreeSet<Tool>,
    #[serde(with = "StringWithSeparator::<CommaSeparator>")]
    pub used_tools_end: BTreeSet<Tool>,
}

impl ConsensusRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        contig: &str,
        cluster_index: usize,
        tools: BTreeSet<Tool>,
        (consensus_start, consensus_end): (u64, u64),
        method: Method,
        used_tools_start: BTreeSet<Tool>,
        used_tools_end: BTreeSet<Tool>,
    ) -> Self {
        assert!(consensus_start <= consensus_end);
        let consensus_id = ProphageId::new(contig, consensus_start, consensus_end).to_string();
        Self {
            consensus_id,
            contig: contig.to_string(),
            cluster_index,
            n_tools: tools.len(),
            tools,
            consensus_start,
            consensus_end,
            method,
            used_tools_start,
            used_tools_end,
        }
    }
    pub fn prophage_id(&self) -> ProphageId {
        ProphageId::new(&self.contig, self.consensus_start, self.consensus_end)
    }
}

/// raw_id -> consensus_id. Many to one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierMap {
    map: HashMap<String, String>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn insert(&mut self, raw_id: &str, consensus_id: &str) -> Option<String> {
        self.map
            .insert(raw_id.to_string(), consensus_id.to_string())
    }
    pub fn get(&self, raw_id: &str) -> Option<&str> {
        self.map.get(raw_id).map(|x| x.as_str())
    }
    /// Return the consensus id of `raw_id`, or `raw_id` itself if it is not mapped.
    pub fn resolve<'a>(&'a self, raw_id: &'a str) -> &'a str {
        self.get(raw_id).unwrap_or(raw_id)
    }
    pub fn len(&self) -> usize {
        self.map.len()
    }
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
    /// (raw_id, consensus_id) pairs, sorted by raw_id.
    pub fn sorted_pairs(&self) -> Vec<(&str, &str)> {
        let mut pairs: Vec<_> = self
            .map
            .iter()
            .map(|(raw, cons)| (raw.as_str(), cons.as_str()))
            .collect();
        pairs.sort_unstable();
        pairs
    }
}

impl std::iter::FromIterator<(String, String)> for IdentifierMap {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            map: iter.into_iter().collect(),
        }
    }
}

/// The output of one run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Sorted by (contig, cluster_index).
    pub clusters: Vec<Cluster>,
    /// Sorted by (contig, consensus_start).
    pub consensus: Vec<ConsensusRecord>,
    pub identifier_map: IdentifierMap,
}
