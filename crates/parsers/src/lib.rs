//! Parsers turning event-generator output into particle records.
//!
//! Each supported format has its own parser, because the five formats share
//! no structure worth a common grammar: Pythia8 and CMSSW are fixed-column
//! tables buried in log noise, HepMC is a line-record format, LHE is
//! XML-ish, and Heppy ntuples are ROOT binaries. They all meet the same
//! contract: `parse() -> ParsedEvent`, a list of particle records in the
//! format's natural representation, or a [`ParseError`] naming the
//! offending line.

pub mod cmssw;
pub mod error;
pub mod hepmc;
#[cfg(feature = "heppy")]
pub mod heppy;
pub mod lhe;
pub mod pythia8;

pub use error::ParseError;

use evplot_event::{EdgeParticle, EventInfo, NodeParticle, Representation};
use std::path::Path;

/// One parsed event: metadata plus the particle records in the
/// representation native to the source format.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEvent {
    pub info: EventInfo,
    pub records: Records,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Records {
    Nodes(Vec<NodeParticle>),
    Edges(Vec<EdgeParticle>),
}

impl Records {
    pub fn representation(&self) -> Representation {
        match self {
            Records::Nodes(_) => Representation::Node,
            Records::Edges(_) => Representation::Edge,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Records::Nodes(v) => v.len(),
            Records::Edges(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Input format selector. Formats are chosen explicitly (or guessed from
/// the file extension), never sniffed from content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Screen output from Pythia 8 piped into a file.
    Pythia,
    /// HepMC ASCII event files.
    Hepmc,
    /// Les Houches Event files.
    Lhe,
    /// ParticleListDrawer output from CMSSW piped into a file.
    Cmssw,
    /// Heppy analysis ROOT ntuples.
    Heppy,
}

impl Format {
    pub fn all() -> [Format; 5] {
        [
            Format::Pythia,
            Format::Hepmc,
            Format::Lhe,
            Format::Cmssw,
            Format::Heppy,
        ]
    }

    pub fn description(&self) -> &'static str {
        match self {
            Format::Pythia => "screen output from Pythia 8 piped into a file",
            Format::Hepmc => "HepMC event file",
            Format::Lhe => "LHE file",
            Format::Cmssw => "ParticleListDrawer output from CMSSW piped into a file",
            Format::Heppy => "Heppy analysis ROOT ntuple",
        }
    }

    /// Default file extension, used to guess the format when the user does
    /// not name one. CMSSW dumps have no conventional extension.
    pub fn file_extension(&self) -> Option<&'static str> {
        match self {
            Format::Pythia => Some("txt"),
            Format::Hepmc => Some("hepmc"),
            Format::Lhe => Some("lhe"),
            Format::Cmssw => None,
            Format::Heppy => Some("root"),
        }
    }

    pub fn default_representation(&self) -> Representation {
        match self {
            Format::Hepmc => Representation::Edge,
            _ => Representation::Node,
        }
    }

    /// Whether this build can parse the format. Only Heppy is conditional:
    /// it needs the ROOT reader compiled in via the `heppy` feature.
    pub fn available(&self) -> bool {
        match self {
            Format::Heppy => cfg!(feature = "heppy"),
            _ => true,
        }
    }

    pub fn guess_from_path(path: &Path) -> Option<Format> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        Format::all()
            .into_iter()
            .find(|f| f.file_extension() == Some(extension.as_str()))
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Format::Pythia => "pythia",
            Format::Hepmc => "hepmc",
            Format::Lhe => "lhe",
            Format::Cmssw => "cmssw",
            Format::Heppy => "heppy",
        };
        write!(f, "{name}")
    }
}

/// Knobs shared across parsers; each parser reads the ones that apply.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Which event to pick from a multi-event file (HepMC event number,
    /// LHE 1-based block index). None means the first event.
    pub event_num: Option<i64>,
    /// Pythia8 only: read the hard-process listing instead of the complete
    /// event listing.
    pub hard_process: bool,
}

/// Parse one event from `path` in the given format.
pub fn parse_event(
    format: Format,
    path: &Path,
    options: &ParseOptions,
) -> Result<ParsedEvent, ParseError> {
    match format {
        Format::Pythia => {
            let listing = if options.hard_process {
                pythia8::Listing::HardProcess
            } else {
                pythia8::Listing::CompleteEvent
            };
            pythia8::Pythia8Parser::new(path).listing(listing).parse()
        }
        Format::Hepmc => hepmc::HepMCParser::new(path)
            .event_num(options.event_num)
            .parse(),
        Format::Lhe => lhe::LheParser::new(path)
            .event_num(options.event_num)
            .parse(),
        Format::Cmssw => cmssw::CmsswParser::new(path).parse(),
        #[cfg(feature = "heppy")]
        Format::Heppy => heppy::HeppyParser::new(path)
            .event_num(options.event_num)
            .parse(),
        #[cfg(not(feature = "heppy"))]
        Format::Heppy => Err(ParseError::Unavailable {
            format: format.to_string(),
        }),
    }
}

pub(crate) fn read_input(path: &Path) -> Result<String, ParseError> {
    std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })
}
