//! Parser for HepMC ASCII event files.
//!
//! Line-oriented: `E` opens an event, `V` names the current vertex, and
//! each `P` is a particle outgoing from that vertex, carrying the barcode
//! of the vertex it flows into. This is the natural EDGE representation.

use crate::error::parse_field;
use crate::{ParsedEvent, ParseError, Records};
use evplot_event::{EdgeParticle, EventInfo, Kinematics, Particle};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const END_MARKER: &str = "END_EVENT_LISTING";

#[derive(Debug, Clone)]
pub struct HepMCParser {
    path: PathBuf,
    event_num: Option<i64>,
}

impl HepMCParser {
    pub fn new(path: &Path) -> Self {
        HepMCParser {
            path: path.to_path_buf(),
            event_num: None,
        }
    }

    /// Pick the event with this number; None takes the first event.
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
        let mut current_event: Option<EventInfo> = None;
        let mut current_vertex: Option<i64> = None;
        let mut particles: Vec<EdgeParticle> = Vec::new();

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            let fields: Vec<&str> = line.split_whitespace().collect();
            let record_type = fields.first().copied().unwrap_or("");

            if record_type == "E" || line.contains(END_MARKER) {
                if let Some(info) = current_event.take() {
                    events.push(ParsedEvent {
                        info,
                        records: Records::Edges(std::mem::take(&mut particles)),
                    });
                    current_vertex = None;
                }
                if record_type == "E" {
                    current_event = Some(parse_event_line(line_no, &fields)?);
                }
            } else if record_type == "V" {
                // GenVertex: barcode id x y z ctau n_orphan_in n_out
                if fields.len() < 2 {
                    return Err(ParseError::ColumnCount {
                        line: line_no,
                        expected: 2,
                        found: fields.len(),
                    });
                }
                current_vertex = Some(parse_field(line_no, "vertex barcode", fields[1])?);
            } else if record_type == "P" {
                if current_event.is_none() {
                    return Err(ParseError::Malformed {
                        line: line_no,
                        reason: "particle record before any E line".to_string(),
                    });
                }
                let Some(vertex) = current_vertex else {
                    return Err(ParseError::Malformed {
                        line: line_no,
                        reason: "particle record before any V line".to_string(),
                    });
                };
                particles.push(parse_particle_line(line_no, &fields, vertex)?);
            }
            // Version banners, U/F records and other noise are skipped.
        }
        if let Some(info) = current_event.take() {
            // Input ended without the END_EVENT_LISTING marker.
            events.push(ParsedEvent {
                info,
                records: Records::Edges(particles),
            });
        }

        if events.is_empty() {
            return Err(ParseError::MissingBlock {
                wanted: "HepMC event record".to_string(),
            });
        }
        debug!(count = events.len(), "parsed HepMC events");
        select_event(events, self.event_num)
    }
}

fn select_event(
    mut events: Vec<ParsedEvent>,
    wanted: Option<i64>,
) -> Result<ParsedEvent, ParseError> {
    match wanted {
        None => Ok(events.remove(0)),
        Some(n) => {
            if let Some(pos) = events.iter().position(|e| e.info.event_num == n) {
                Ok(events.remove(pos))
            } else {
                warn!("cannot find an event with event number {n}, using first event in file");
                Ok(events.remove(0))
            }
        }
    }
}

/// GenEvent line: event_num num_mpi scale aQCD aQED signal_process_id
/// signal_process_vtx_id n_vtx beam1_pdgid beam2_pdgid ...
fn parse_event_line(line_no: usize, fields: &[&str]) -> Result<EventInfo, ParseError> {
    if fields.len() < 2 {
        return Err(ParseError::ColumnCount {
            line: line_no,
            expected: 2,
            found: fields.len(),
        });
    }
    Ok(EventInfo {
        event_num: parse_field(line_no, "event number", fields[1])?,
        label: None,
    })
}

/// GenParticle line: barcode pdgid px py pz energy mass status pol_theta
/// pol_phi vtx_in_barcode [flow...]
fn parse_particle_line(
    line_no: usize,
    fields: &[&str],
    current_vertex: i64,
) -> Result<EdgeParticle, ParseError> {
    if fields.len() < 12 {
        return Err(ParseError::ColumnCount {
            line: line_no,
            expected: 12,
            found: fields.len(),
        });
    }
    let barcode: i64 = parse_field(line_no, "barcode", fields[1])?;
    let pdgid: i64 = parse_field(line_no, "pdgid", fields[2])?;
    let status: i64 = parse_field(line_no, "status", fields[8])?;

    let mut particle = Particle::new(barcode, pdgid, status);
    particle.kinematics = Some(Kinematics {
        px: parse_field(line_no, "px", fields[3])?,
        py: parse_field(line_no, "py", fields[4])?,
        pz: parse_field(line_no, "pz", fields[5])?,
        energy: parse_field(line_no, "energy", fields[6])?,
        mass: parse_field(line_no, "mass", fields[7])?,
    });

    let mut vtx_out: i64 = current_vertex;
    let mut vtx_in: i64 = parse_field(line_no, "vtx_in_barcode", fields[11])?;

    // File vertex barcodes are negative, so abs(vertex) + barcode is free
    // for synthetic vertices.
    if vtx_in == 0 {
        // Dangling end: a final-state particle with no decay vertex on file.
        vtx_in = vtx_out.abs() + barcode;
    }
    if vtx_in == vtx_out {
        // Self-loop, the convention for an incoming beam; give it its own
        // source vertex so other particles can still leave the shared one.
        vtx_out = vtx_out.abs() + barcode;
    }

    Ok(EdgeParticle {
        particle,
        vtx_out_barcode: vtx_out,
        vtx_in_barcode: vtx_in,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
HepMC::Version 2.06.09
HepMC::IO_GenEvent-START_EVENT_LISTING
E 1 -1 1.0000e+00 1.0e-01 2.0e-01 0 0 2 2212 2212
U GEV MM
V -1 0 0 0 0 0 0 1 0
P 1 2212 0 0 7000.0 7000.0 0.938 4 0 0 -1 0
P 3 21 0 0 100.0 100.0 0.0 21 0 0 -2 0
V -2 0 0 0 0 0 0 2 0
P 5 5 1.0 2.0 3.0 10.0 4.8 1 0 0 0 0
P 6 -5 -1.0 -2.0 -3.0 10.0 4.8 1 0 0 0 0
HepMC::IO_GenEvent-END_EVENT_LISTING
";

    fn parser() -> HepMCParser {
        HepMCParser::new(Path::new("event.hepmc"))
    }

    #[test]
    fn test_parse_single_event() {
        let parsed = parser().parse_str(SAMPLE).unwrap();
        assert_eq!(parsed.info.event_num, 1);
        let Records::Edges(particles) = &parsed.records else {
            panic!("hepmc must produce edge records");
        };
        assert_eq!(particles.len(), 4);

        let gluon = particles.iter().find(|ep| ep.barcode() == 3).unwrap();
        assert_eq!(gluon.vtx_out_barcode, -1);
        assert_eq!(gluon.vtx_in_barcode, -2);
        assert_eq!(gluon.particle.name, "g");
    }

    #[test]
    fn test_beam_self_loop_gets_a_source_vertex() {
        let parsed = parser().parse_str(SAMPLE).unwrap();
        let Records::Edges(particles) = &parsed.records else {
            panic!();
        };
        let beam = particles.iter().find(|ep| ep.barcode() == 1).unwrap();
        // vtx_in was -1 == its production vertex: rewired to abs(-1) + 1.
        assert_eq!(beam.vtx_out_barcode, 2);
        assert_eq!(beam.vtx_in_barcode, -1);
    }

    #[test]
    fn test_dangling_end_vertex_is_synthesised() {
        let parsed = parser().parse_str(SAMPLE).unwrap();
        let Records::Edges(particles) = &parsed.records else {
            panic!();
        };
        let b = particles.iter().find(|ep| ep.barcode() == 5).unwrap();
        assert_eq!(b.vtx_out_barcode, -2);
        assert_eq!(b.vtx_in_barcode, 7, "abs(-2) + barcode 5");
    }

    #[test]
    fn test_event_selection_and_fallback() {
        let two_events = format!(
            "{}E 2 -1 1.0 0.1 0.2 0 0 1 2212 2212\nV -1 0 0 0 0 0 0 1 0\nP 9 22 0 0 1.0 1.0 0.0 1 0 0 0 0\nHepMC::IO_GenEvent-END_EVENT_LISTING\n",
            SAMPLE
        );
        let second = parser()
            .event_num(Some(2))
            .parse_str(&two_events)
            .unwrap();
        assert_eq!(second.info.event_num, 2);
        assert_eq!(second.records.len(), 1);

        // Unknown event number falls back to the first event.
        let fallback = parser()
            .event_num(Some(99))
            .parse_str(&two_events)
            .unwrap();
        assert_eq!(fallback.info.event_num, 1);
    }

    #[test]
    fn test_particle_before_vertex_is_malformed() {
        let text = "E 1 -1 1.0 0.1 0.2 0 0 1 2212 2212\nP 1 21 0 0 1.0 1.0 0.0 1 0 0 0 0\n";
        let err = parser().parse_str(text).unwrap_err();
        assert!(matches!(err, ParseError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_no_events_is_an_error() {
        let err = parser().parse_str("just a log file\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingBlock { .. }));
    }
}
