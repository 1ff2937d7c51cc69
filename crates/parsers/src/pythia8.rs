//! Parser for Pythia 8 screen output piped into a file.
//!
//! The particle table sits inside arbitrary log noise, bracketed by
//! `--------  PYTHIA Event Listing  (complete event)` and
//! `--------  End PYTHIA Event Listing` marker lines. Pythia prints two
//! listings per event, the hard process and the complete event; which one
//! to read is an option.

use crate::error::{parse_field, parse_int_field};
use crate::{ParsedEvent, ParseError, Records};
use evplot_event::{EventInfo, Kinematics, NodeParticle, Particle};
use std::path::{Path, PathBuf};
use tracing::debug;

const LISTING_MARKER: &str = "PYTHIA Event Listing";
const END_MARKER: &str = "End PYTHIA Event Listing";

/// Row layout: no, id, name, status, mothers (2), daughters (2),
/// colours (2), p_x, p_y, p_z, e, m.
const COLUMNS: usize = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Listing {
    HardProcess,
    #[default]
    CompleteEvent,
}

impl Listing {
    fn tag(&self) -> &'static str {
        match self {
            Listing::HardProcess => "(hard process)",
            Listing::CompleteEvent => "(complete event)",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pythia8Parser {
    path: PathBuf,
    listing: Listing,
}

impl Pythia8Parser {
    pub fn new(path: &Path) -> Self {
        Pythia8Parser {
            path: path.to_path_buf(),
            listing: Listing::default(),
        }
    }

    pub fn listing(mut self, listing: Listing) -> Self {
        self.listing = listing;
        self
    }

    pub fn parse(&self) -> Result<ParsedEvent, ParseError> {
        let text = crate::read_input(&self.path)?;
        self.parse_str(&text)
    }

    pub fn parse_str(&self, text: &str) -> Result<ParsedEvent, ParseError> {
        let wanted_tag = self.listing.tag();
        let mut node_particles = Vec::new();
        let mut in_listing = false;
        let mut found_listing = false;
        let mut footer_seen = false;

        for (idx, line) in text.lines().enumerate() {
            let line_no = idx + 1;
            if !in_listing {
                if line.contains(LISTING_MARKER)
                    && !line.contains(END_MARKER)
                    && line.contains(wanted_tag)
                {
                    debug!(line_no, "found {wanted_tag} listing");
                    in_listing = true;
                    found_listing = true;
                }
                continue;
            }
            if line.contains(END_MARKER) {
                footer_seen = true;
                break;
            }
            if let Some(np) = parse_row(line_no, line)? {
                node_particles.push(np);
            }
        }

        if !found_listing {
            return Err(ParseError::MissingBlock {
                wanted: format!("{LISTING_MARKER} {wanted_tag} table"),
            });
        }
        if !footer_seen {
            return Err(ParseError::MissingBlock {
                wanted: format!("'{END_MARKER}' footer"),
            });
        }

        Ok(ParsedEvent {
            info: EventInfo::default(),
            records: Records::Nodes(node_particles),
        })
    }
}

/// Parse one listing line. Header, sum and blank lines come back as None;
/// a line that starts with an entry number must have the full column set.
fn parse_row(line_no: usize, line: &str) -> Result<Option<NodeParticle>, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let Some(first) = fields.first() else {
        return Ok(None);
    };
    if first.parse::<i64>().is_err() {
        // Column headers, "Charge sum:" / "Momentum sum:" trailers, etc.
        return Ok(None);
    }
    if fields.len() != COLUMNS {
        return Err(ParseError::ColumnCount {
            line: line_no,
            expected: COLUMNS,
            found: fields.len(),
        });
    }

    let barcode: i64 = parse_field(line_no, "no", fields[0])?;
    if barcode == 0 {
        // The `(system)` pseudo-particle; mother number 0 means "none", so
        // keeping it would fake a parent for every primary particle.
        return Ok(None);
    }
    let pdgid: i64 = parse_field(line_no, "id", fields[1])?;
    let status: i64 = parse_field(line_no, "status", fields[3])?;
    let mother1 = parse_int_field(line_no, "mother1", fields[4])?;
    let mother2 = parse_int_field(line_no, "mother2", fields[5])?;

    let mut particle = Particle::new(barcode, pdgid, status);
    particle.name = fields[2].to_string();
    particle.kinematics = Some(Kinematics {
        px: parse_field(line_no, "p_x", fields[10])?,
        py: parse_field(line_no, "p_y", fields[11])?,
        pz: parse_field(line_no, "p_z", fields[12])?,
        energy: parse_field(line_no, "e", fields[13])?,
        mass: parse_field(line_no, "m", fields[14])?,
    });

    let mut parent_barcodes: Vec<i64> = [mother1, mother2]
        .into_iter()
        .filter(|&m| m > 0)
        .collect();
    parent_barcodes.dedup();

    Ok(Some(NodeParticle::new(particle, parent_barcodes)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPLETE_EVENT: &str = "\
 PYTHIA data will be interpolated.
 --------  PYTHIA Event Listing  (hard process)  -----------------------------------------------------------------------------------

    no         id  name            status     mothers   daughters     colours      p_x        p_y        p_z         e          m
     0         90  (system)           -11     0     0     0     0     0     0      0.000      0.000      0.000  14000.000  14000.000
     1         21  (g)                -21     0     0     3     0   101   102      0.000      0.000    157.874    157.874      0.000
     2         21  (g)                -21     0     0     3     0   102   103      0.000      0.000    -91.338     91.338      0.000
     3         25  (h0)               -22     1     2     0     0     0     0      0.000      0.000     66.535    249.212    240.136

 --------  End PYTHIA Event Listing  -----------------------------------------------------------------------------------------------

 --------  PYTHIA Event Listing  (complete event)  ---------------------------------------------------------------------------------

    no         id  name            status     mothers   daughters     colours      p_x        p_y        p_z         e          m
     0         90  (system)           -11     0     0     0     0     0     0      0.000      0.000      0.000  14000.000  14000.000
     1       2212  (p+)               -12     0     0     3     0     0     0      0.000      0.000   7000.000   7000.000      0.938
     2       2212  (p+)               -12     0     0     4     0     0     0      0.000      0.000  -7000.000   7000.000      0.938
     3         21  (g)                -21     1     0     5     0   101   102      0.000      0.000    157.874    157.874      0.000
     4         21  (g)                -21     2     0     5     0   102   103      0.000      0.000    -91.338     91.338      0.000
     5         25  (h0)               -22     3     4     6     7     0     0      0.000      0.000     66.535    249.212    240.136
     6          5  b                   23     5     0     0     0   101     0     57.201     11.376     43.967     74.988      4.800
     7         -5  bbar                23     5     0     0     0     0   103    -57.201    -11.376     22.568     64.224      4.800
                                   Charge sum:  0.000           Momentum sum:      0.000      0.000     66.535  14000.000  13999.452

 --------  End PYTHIA Event Listing  -----------------------------------------------------------------------------------------------
";

    fn parser() -> Pythia8Parser {
        Pythia8Parser::new(Path::new("event.txt"))
    }

    #[test]
    fn test_complete_event_listing_is_selected() {
        let parsed = parser().parse_str(COMPLETE_EVENT).unwrap();
        let Records::Nodes(particles) = &parsed.records else {
            panic!("pythia8 must produce node records");
        };
        // 8 rows minus the skipped system entry.
        assert_eq!(particles.len(), 7);

        let higgs = particles.iter().find(|np| np.barcode() == 5).unwrap();
        assert_eq!(higgs.particle.pdgid, 25);
        assert_eq!(higgs.particle.name, "(h0)");
        assert_eq!(higgs.parent_barcodes, vec![3, 4]);

        let beam = particles.iter().find(|np| np.barcode() == 1).unwrap();
        assert!(beam.parent_barcodes.is_empty(), "mother 0 means no parent");

        let b = particles.iter().find(|np| np.barcode() == 6).unwrap();
        assert_eq!(b.parent_barcodes, vec![5]);
        let kin = b.particle.kinematics.unwrap();
        assert_eq!(kin.energy, 74.988);
    }

    #[test]
    fn test_hard_process_listing_is_selectable() {
        let parsed = parser()
            .listing(Listing::HardProcess)
            .parse_str(COMPLETE_EVENT)
            .unwrap();
        let Records::Nodes(particles) = &parsed.records else {
            panic!("pythia8 must produce node records");
        };
        assert_eq!(particles.len(), 3, "hard process has only the 2->1 core");
    }

    #[test]
    fn test_parsing_is_deterministic() {
        let a = parser().parse_str(COMPLETE_EVENT).unwrap();
        let b = parser().parse_str(COMPLETE_EVENT).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_missing_listing() {
        let err = parser().parse_str("no event here\n").unwrap_err();
        assert!(matches!(err, ParseError::MissingBlock { .. }));
    }

    #[test]
    fn test_missing_footer() {
        let truncated = COMPLETE_EVENT
            .rfind("--------  End")
            .map(|pos| &COMPLETE_EVENT[..pos])
            .unwrap();
        let err = parser().parse_str(truncated).unwrap_err();
        assert!(err.to_string().contains("End PYTHIA Event Listing"));
    }

    #[test]
    fn test_short_row_is_an_error() {
        let text = "\
 --------  PYTHIA Event Listing  (complete event)  ----
    no         id  name            status     mothers   daughters     colours      p_x        p_y        p_z         e          m
     1       2212  (p+)               -12     0     0
 --------  End PYTHIA Event Listing  ----
";
        let err = parser().parse_str(text).unwrap_err();
        assert!(matches!(
            err,
            ParseError::ColumnCount {
                line: 3,
                expected: 15,
                found: 6
            }
        ));
    }
}
