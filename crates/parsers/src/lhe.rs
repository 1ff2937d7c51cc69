//! Parser for Les Houches Event files.
//!
//! LHE is XML-shaped but its `<event>` payload is plain whitespace
//! columns, so the parsing is line-oriented: one header line (NUP first),
//! then NUP particle rows of 13 columns. Particle barcodes are the 1-based
//! row indices, and MOTHUP1..MOTHUP2 is an inclusive index range.

use crate::error::{parse_field, parse_int_field};
use crate::{ParsedEvent, ParseError, Records};
use evplot_event::{EventInfo, Kinematics, NodeParticle, Particle};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Row layout: IDUP ISTUP MOTHUP1 MOTHUP2 ICOL1 ICOL2 PX PY PZ E M
/// VTIMUP SPINUP.
const COLUMNS: usize = 13;

#[derive(Debug, Clone)]
pub struct LheParser {
    path: PathBuf,
    event_num: Option<i64>,
}

impl LheParser {
    pub fn new(path: &Path) -> Self {
        LheParser {
            path: path.to_path_buf(),
            event_num: None,
        }
    }

    /// Pick the 1-based n-th `<event>` block; None takes the first.
    pub fn event_num(mut self, event_num: Option<i64>) -> Self {
        self.event_num = event_num;
        self
    }

    pub fn parse(&self) -> Result<ParsedEvent, ParseError> {
        let text = crate::read_input(&self.path)?;
        self.parse_str(&text)
    }

    pub fn parse_str(&self, text: &str) -> Result<ParsedEvent, ParseError> {
        let mut events: Vec<ParsedEvent> = Vec::new();
        let mut block: Option<Vec<(usize, &str)>> = None;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let trimmed = line.trim();
            if trimmed.starts_with("<event") {
                if block.is_some() {
                    return Err(ParseError::Malformed {
                        line: line_no,
                        reason: "nested <event> block".to_string(),
                    });
                }
                block = Some(Vec::new());
            } else if trimmed.starts_with("</event>") {
                let Some(lines) = block.take() else {
                    return Err(ParseError::Malformed {
                        line: line_no,
                        reason: "</event> without matching <event>".to_string(),
                    });
                };
                let event_num = events.len() as i64 + 1;
                events.push(parse_event_block(event_num, &lines)?);
            } else if let Some(lines) = block.as_mut() {
                // Generator comments and nested tags (<rwgt>, weights) are
                // tolerated inside the block.
                if !trimmed.is_empty() && !trimmed.starts_with('#') && !trimmed.starts_with('<') {
                    lines.push((line_no, trimmed));
                }
            }
        }

        if events.is_empty() {
            return Err(ParseError::MissingBlock {
                wanted: "<event> block".to_string(),
            });
        }
        debug!(count = events.len(), "parsed LHE events");

        match self.event_num {
            None => Ok(events.swap_remove(0)),
            Some(n) if n >= 1 && (n as usize) <= events.len() => {
                Ok(events.swap_remove(n as usize - 1))
            }
            Some(n) => {
                warn!("cannot find event number {n}, using first event in file");
                Ok(events.swap_remove(0))
            }
        }
    }
}

fn parse_event_block(
    event_num: i64,
    lines: &[(usize, &str)],
) -> Result<ParsedEvent, ParseError> {
    let Some(&(header_line, header)) = lines.first() else {
        return Err(ParseError::MissingBlock {
            wanted: "event header inside <event> block".to_string(),
        });
    };
    let header_fields: Vec<&str> = header.split_whitespace().collect();
    if header_fields.len() < 6 {
        return Err(ParseError::ColumnCount {
            line: header_line,
            expected: 6,
            found: header_fields.len(),
        });
    }
    let nup = parse_int_field(header_line, "NUP", header_fields[0])?;
    let rows = &lines[1..];
    if rows.len() < nup as usize {
        return Err(ParseError::Malformed {
            line: header_line,
            reason: format!("event declares {nup} particles but block has {}", rows.len()),
        });
    }

    let mut node_particles = Vec::with_capacity(nup as usize);
    for (offset, &(line_no, row)) in rows.iter().take(nup as usize).enumerate() {
        let barcode = offset as i64 + 1;
        node_particles.push(parse_particle_row(line_no, row, barcode)?);
    }

    Ok(ParsedEvent {
        info: EventInfo {
            event_num,
            label: None,
        },
        records: Records::Nodes(node_particles),
    })
}

fn parse_particle_row(
    line_no: usize,
    row: &str,
    barcode: i64,
) -> Result<NodeParticle, ParseError> {
    let fields: Vec<&str> = row.split_whitespace().collect();
    if fields.len() != COLUMNS {
        return Err(ParseError::ColumnCount {
            line: line_no,
            expected: COLUMNS,
            found: fields.len(),
        });
    }
    let pdgid = parse_int_field(line_no, "IDUP", fields[0])?;
    let status = parse_int_field(line_no, "ISTUP", fields[1])?;
    let mother1 = parse_int_field(line_no, "MOTHUP1", fields[2])?;
    let mother2 = parse_int_field(line_no, "MOTHUP2", fields[3])?;

    let mut particle = Particle::new(barcode, pdgid, status);
    particle.kinematics = Some(Kinematics {
        px: parse_field(line_no, "PX", fields[6])?,
        py: parse_field(line_no, "PY", fields[7])?,
        pz: parse_field(line_no, "PZ", fields[8])?,
        energy: parse_field(line_no, "E", fields[9])?,
        mass: parse_field(line_no, "M", fields[10])?,
    });

    // MOTHUP 0 means no mother; otherwise m1..m2 is an inclusive range of
    // 1-based particle indices (a single mother has m2 = 0 or m2 = m1).
    let parent_barcodes: Vec<i64> = if mother1 <= 0 {
        Vec::new()
    } else if mother2 <= mother1 {
        vec![mother1]
    } else {
        (mother1..=mother2).collect()
    };

    Ok(NodeParticle::new(particle, parent_barcodes))
}
