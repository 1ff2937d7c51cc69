//! Parser for `ParticleListDrawer` output from CMSSW piped into a file.
//!
//! Pipe-delimited table rows between framework log chatter:
//!
//! ```text
//!  idx  |    ID -       Name |Stat|  Mo1  Mo2  Da1  Da2 |nMo nDa|    pt       eta     phi   |     px         py         pz        m     |
//!     0 |  2212 -         p+ |   3 |   -1   -1    2    2 |  0  1 |    0.000     0.000   0.000 |    0.000      0.000   6500.000    0.938 |
//! ```
//!
//! Unlike Pythia8, index 0 is a real particle here; "no mother" is -1.

use crate::error::{parse_field, parse_int_field};
use crate::{ParsedEvent, ParseError, Records};
use evplot_event::{EventInfo, Kinematics, NodeParticle, Particle};
use std::path::{Path, PathBuf};
use tracing::debug;

/// idx | ID - Name | Stat | Mo1 Mo2 Da1 Da2 | nMo nDa | pt eta phi | px py pz m
const SEGMENTS: usize = 7;

#[derive(Debug, Clone)]
pub struct CmsswParser {
    path: PathBuf,
}

impl CmsswParser {
    pub fn new(path: &Path) -> Self {
        CmsswParser {
            path: path.to_path_buf(),
        }
    }

    pub fn parse(&self) -> Result<ParsedEvent, ParseError> {
        let text = crate::read_input(&self.path)?;
        self.parse_str(&text)
    }

    pub fn parse_str(&self, text: &str) -> Result<ParsedEvent, ParseError> {
        let mut node_particles = Vec::new();
        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let segments: Vec<&str> = line.split('|').map(str::trim).collect();
            // A data row leads with the particle index; the header leads
            // with "idx" and log chatter has no pipes at all.
            if segments.len() < 2 || segments[0].parse::<i64>().is_err() {
                continue;
            }
            node_particles.push(parse_row(line_no, &segments)?);
        }

        if node_particles.is_empty() {
            return Err(ParseError::MissingBlock {
                wanted: "ParticleListDrawer table".to_string(),
            });
        }
        debug!(count = node_particles.len(), "parsed CMSSW particle rows");

        Ok(ParsedEvent {
            info: EventInfo::default(),
            records: Records::Nodes(node_particles),
        })
    }
}

fn parse_row(line_no: usize, segments: &[&str]) -> Result<NodeParticle, ParseError> {
    if segments.len() < SEGMENTS {
        return Err(ParseError::ColumnCount {
            line: line_no,
            expected: SEGMENTS,
            found: segments.len(),
        });
    }
    let barcode: i64 = parse_field(line_no, "idx", segments[0])?;

    // "2212 -         p+": PDG code, a dash, then the name.
    let id_name: Vec<&str> = segments[1].split_whitespace().collect();
    if id_name.len() < 3 || id_name[1] != "-" {
        return Err(ParseError::Malformed {
            line: line_no,
            reason: format!("expected 'ID - Name', found '{}'", segments[1]),
        });
    }
    let pdgid = parse_int_field(line_no, "ID", id_name[0])?;
    let name = id_name[2..].join(" ");

    let status = parse_int_field(line_no, "Stat", segments[2])?;

    let mothers: Vec<&str> = segments[3].split_whitespace().collect();
    if mothers.len() != 4 {
        return Err(ParseError::ColumnCount {
            line: line_no,
            expected: 4,
            found: mothers.len(),
        });
    }
    let mother1 = parse_int_field(line_no, "Mo1", mothers[0])?;
    let mother2 = parse_int_field(line_no, "Mo2", mothers[1])?;

    let momentum: Vec<&str> = segments[6].split_whitespace().collect();
    if momentum.len() != 4 {
        return Err(ParseError::ColumnCount {
            line: line_no,
            expected: 4,
            found: momentum.len(),
        });
    }
    let px: f64 = parse_field(line_no, "px", momentum[0])?;
    let py: f64 = parse_field(line_no, "py", momentum[1])?;
    let pz: f64 = parse_field(line_no, "pz", momentum[2])?;
    let mass: f64 = parse_field(line_no, "m", momentum[3])?;

    let mut particle = Particle::new(barcode, pdgid, status);
    particle.name = name;
    particle.kinematics = Some(Kinematics {
        px,
        py,
        pz,
        energy: (px * px + py * py + pz * pz + mass * mass).sqrt(),
        mass,
    });

    // Mo1..Mo2 is an inclusive index range; -1 means no mother.
    let parent_barcodes: Vec<i64> = if mother1 < 0 {
        Vec::new()
    } else if mother2 <= mother1 {
        vec![mother1]
    } else {
        (mother1..=mother2).collect()
    };

    Ok(NodeParticle::new(particle, parent_barcodes))
}
