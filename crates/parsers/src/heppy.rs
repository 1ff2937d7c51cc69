//! Parser for Heppy analysis ROOT ntuples.
//!
//! Heppy stores one flat `Vec` branch per quantity, one entry per event:
//! the particle at array position i has PDG code `pdgId[i]` and its mother
//! is the array position `motherIndex[i]` (-1 for none). Needs the ROOT
//! reader, so the whole module sits behind the `heppy` cargo feature; a
//! build without it only loses this one input mode.

use crate::{ParsedEvent, ParseError, Records};
use evplot_event::{EventInfo, NodeParticle, Particle};
use oxyroot::{ReaderTree, RootFile};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Branch names, overridable for ntuples with different conventions.
#[derive(Debug, Clone)]
pub struct HeppyBranches {
    pub pdgid: String,
    pub mother_index: String,
    pub status: String,
}

impl Default for HeppyBranches {
    fn default() -> Self {
        HeppyBranches {
            pdgid: "GenPart_pdgId".to_string(),
            mother_index: "GenPart_motherIndex".to_string(),
            status: "GenPart_status".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HeppyParser {
    path: PathBuf,
    tree_name: String,
    branches: HeppyBranches,
    event_num: Option<i64>,
}

impl HeppyParser {
    pub fn new(path: &Path) -> Self {
        HeppyParser {
            path: path.to_path_buf(),
            tree_name: "tree".to_string(),
            branches: HeppyBranches::default(),
            event_num: None,
        }
    }

    pub fn tree_name(mut self, name: &str) -> Self {
        self.tree_name = name.to_string();
        self
    }

    pub fn branches(mut self, branches: HeppyBranches) -> Self {
        self.branches = branches;
        self
    }

    /// Pick the 0-based tree entry; None takes the first.
    pub fn event_num(mut self, event_num: Option<i64>) -> Self {
        self.event_num = event_num;
        self
    }

    pub fn parse(&self) -> Result<ParsedEvent, ParseError> {
        let mut file = RootFile::open(&self.path).map_err(|err| {
            ParseError::Root(format!(
                "failed to open ROOT file '{}': {err}",
                self.path.display()
            ))
        })?;
        let tree = file.get_tree(&self.tree_name).map_err(|err| {
            ParseError::Root(format!("failed to read tree '{}': {err}", self.tree_name))
        })?;

        let pdgids = read_vec_branch(&tree, &self.branches.pdgid)?;
        let mothers = read_vec_branch(&tree, &self.branches.mother_index)?;
        let statuses = read_vec_branch(&tree, &self.branches.status).ok();

        if pdgids.is_empty() {
            return Err(ParseError::MissingBlock {
                wanted: format!("entries in tree '{}'", self.tree_name),
            });
        }

        let entry = match self.event_num {
            None => 0,
            Some(n) if n >= 0 && (n as usize) < pdgids.len() => n as usize,
            Some(n) => {
                warn!("cannot find entry {n}, using first entry in tree");
                0
            }
        };

        let records = build_records(
            &pdgids[entry],
            &mothers[entry],
            statuses.as_ref().map(|s| s[entry].as_slice()),
        )?;
        Ok(ParsedEvent {
            info: EventInfo {
                event_num: entry as i64,
                label: None,
            },
            records: Records::Nodes(records),
        })
    }
}

fn read_vec_branch(tree: &ReaderTree, name: &str) -> Result<Vec<Vec<i32>>, ParseError> {
    let branch = tree
        .branch(name)
        .ok_or_else(|| ParseError::Root(format!("missing branch '{name}'")))?;
    Ok(branch
        .as_iter::<Vec<i32>>()
        .map_err(|err| ParseError::Root(format!("failed to read branch '{name}': {err}")))?
        .collect())
}

/// Assemble node records from the per-event columns. Barcode is the array
/// position; mother index -1 means no parent.
fn build_records(
    pdgids: &[i32],
    mothers: &[i32],
    statuses: Option<&[i32]>,
) -> Result<Vec<NodeParticle>, ParseError> {
    if pdgids.len() != mothers.len() {
        return Err(ParseError::Root(format!(
            "pdgid and mother branches disagree on length ({} vs {})",
            pdgids.len(),
            mothers.len()
        )));
    }
    Ok(pdgids
        .iter()
        .enumerate()
        .map(|(idx, &pdgid)| {
            let status = statuses.map_or(0, |s| s[idx] as i64);
            let particle = Particle::new(idx as i64, pdgid as i64, status);
            let parent_barcodes = if mothers[idx] < 0 {
                Vec::new()
            } else {
                vec![mothers[idx] as i64]
            };
            NodeParticle::new(particle, parent_barcodes)
        })
        .collect())
}
