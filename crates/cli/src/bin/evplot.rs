use anyhow::{bail, Context, Result};
use clap::Parser;
use evplot_event::Representation;
use evplot_graph::chains::remove_redundants;
use evplot_graph::convert::{edge_to_node, node_to_edge};
use evplot_graph::eg::{assign_particles_edges, assign_particles_nodes, EventGraph};
use evplot_graph::highlight::Highlights;
use evplot_parsers::{parse_event, Format, ParseOptions, Records};
use evplot_printer::{open_diagram, DotPrinter, DotStyle, RenderOutcome};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "evplot",
    version,
    about = "Convert a Monte Carlo event into a particle evolution diagram",
    long_about = None
)]
struct Cli {
    /// Input event file.
    input: PathBuf,

    /// Input format; guessed from the file extension when omitted.
    #[arg(short = 'f', long, value_enum)]
    input_format: Option<FormatArg>,

    /// Event to plot from a multi-event file (HepMC event number, LHE block
    /// index starting at 1). Defaults to the first event.
    #[arg(short = 'n', long)]
    event_number: Option<i64>,

    /// Pythia8 only: plot the hard-process listing instead of the complete
    /// event listing.
    #[arg(long)]
    hard_process: bool,

    /// Output diagram filename (defaults to INPUT_<event>.pdf next to the
    /// input; the extension picks the output format).
    #[arg(short = 'O', long)]
    output: Option<PathBuf>,

    /// Graph representation: particles as nodes or as edges between
    /// vertices. Each format has a natural default.
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Keep redundant same-species chains (default is to collapse them).
    #[arg(long)]
    redundants: bool,

    /// Particle name to pick out in the diagram; repeatable.
    #[arg(long = "highlight", value_name = "NAME")]
    highlights: Vec<String>,

    /// Stop after writing the Graphviz description file.
    #[arg(long)]
    no_output: bool,

    /// Graphviz layout program used to render the diagram.
    #[arg(long, default_value = "dot")]
    renderer: String,

    /// TOML style file overriding diagram colours and layout.
    #[arg(long)]
    style: Option<PathBuf>,

    /// Automatically open the diagram once plotted.
    #[arg(long)]
    open: bool,

    /// Print statistics about the event graph.
    #[arg(long)]
    stats: bool,

    /// Print debug statements to screen.
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum FormatArg {
    Pythia,
    Hepmc,
    Lhe,
    Cmssw,
    Heppy,
}

impl From<FormatArg> for Format {
    fn from(arg: FormatArg) -> Format {
        match arg {
            FormatArg::Pythia => Format::Pythia,
            FormatArg::Hepmc => Format::Hepmc,
            FormatArg::Lhe => Format::Lhe,
            FormatArg::Cmssw => Format::Cmssw,
            FormatArg::Heppy => Format::Heppy,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum ModeArg {
    Node,
    Edge,
}

impl From<ModeArg> for Representation {
    fn from(arg: ModeArg) -> Representation {
        match arg {
            ModeArg::Node => Representation::Node,
            ModeArg::Edge => Representation::Edge,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    evplot_logging::init_subscriber(cli.verbose);

    if !cli.input.is_file() {
        bail!("no such file: '{}'", cli.input.display());
    }

    // 1. Resolve the input format.
    let format = match cli.input_format {
        Some(arg) => arg.into(),
        None => match Format::guess_from_path(&cli.input) {
            Some(format) => {
                info!("no input format given, assuming {format}");
                format
            }
            None => {
                let known = Format::all()
                    .iter()
                    .map(|f| f.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                bail!(
                    "cannot determine the input format of '{}'; pass --input-format (one of: {known})",
                    cli.input.display()
                );
            }
        },
    };
    if !format.available() {
        bail!(
            "input format '{format}' requires ROOT support; rebuild with the 'heppy' feature enabled"
        );
    }

    // 2. Parse the event.
    let options = ParseOptions {
        event_num: cli.event_number,
        hard_process: cli.hard_process,
    };
    let parsed = parse_event(format, &cli.input, &options)
        .with_context(|| format!("failed to parse '{}' as {format}", cli.input.display()))?;
    info!(
        "parsed {} particle records from event {}",
        parsed.records.len(),
        parsed.info.event_num
    );

    // 3. Build the graph in the format's natural representation, then
    // convert if the user asked for the other one.
    let mut graph = match &parsed.records {
        Records::Nodes(records) => assign_particles_nodes(records),
        Records::Edges(records) => assign_particles_edges(records),
    }
    .context("failed to build the event graph")?;

    let mode = cli
        .mode
        .map(Representation::from)
        .unwrap_or_else(|| format.default_representation());
    info!("using {mode} particle representation");
    if mode != graph.representation() {
        graph = match mode {
            Representation::Node => edge_to_node(&graph),
            Representation::Edge => node_to_edge(&graph),
        }
        .context("failed to convert the graph representation")?;
    }

    // 4. Simplify and annotate.
    if !cli.redundants {
        let before = (graph.node_count(), graph.edge_count());
        remove_redundants(&mut graph);
        info!(
            "removed redundant chains: {} -> {} nodes, {} -> {} edges",
            before.0,
            graph.node_count(),
            before.1,
            graph.edge_count()
        );
    }

    let highlights = Highlights::new(&cli.highlights);
    if !highlights.is_empty() {
        let marked = highlights.apply(&mut graph);
        if marked == 0 {
            warn!("no particles matched the highlight names");
        }
    }

    if cli.stats {
        print_stats(&graph);
    }

    // 5. Print: write the Graphviz file, render, open.
    let output = cli.output.clone().unwrap_or_else(|| {
        let stem = cli
            .input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("event");
        cli.input
            .with_file_name(format!("{stem}_{}.pdf", parsed.info.event_num))
    });

    let style = match &cli.style {
        Some(path) => DotStyle::load(path)
            .with_context(|| format!("failed to load style file '{}'", path.display()))?,
        None => DotStyle::default(),
    };
    let title = parsed.info.label.clone().unwrap_or_else(|| {
        format!(
            "{}, event {}",
            cli.input
                .file_name()
                .and_then(|s| s.to_str())
                .unwrap_or("event"),
            parsed.info.event_num
        )
    });
    let config = style.export_config(Some(title));

    let printer = DotPrinter::new(&output).renderer(&cli.renderer);
    let outcome = printer
        .print_event(&graph, "Event", &config, !cli.no_output)
        .context("failed to print the event")?;

    match outcome {
        RenderOutcome::Rendered(diagram) => {
            info!("diagram written to {}", diagram.display());
            if cli.open {
                open_diagram(&diagram)?;
            }
        }
        RenderOutcome::DescriptionOnly(gv) => {
            info!("graph description written to {}", gv.display());
        }
    }
    Ok(())
}

fn print_stats(graph: &EventGraph) {
    let initial = graph.iter_particles().filter(|p| p.initial_state).count();
    let final_state = graph.iter_particles().filter(|p| p.final_state).count();
    println!("representation: {}", graph.representation());
    println!("nodes:          {}", graph.node_count());
    println!("edges:          {}", graph.edge_count());
    println!("particles:      {}", graph.iter_particles().count());
    println!("initial state:  {initial}");
    println!("final state:    {final_state}");
}
