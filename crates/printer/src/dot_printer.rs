//! Prints an event graph to a Graphviz file and renders it to a diagram.
//!
//! Stages: export the graph to DOT text, write the `.gv` description file,
//! then run the layout program over it. The layout program being absent is
//! a recoverable condition: the description file has already been written,
//! which is still a useful artifact, so the caller gets a
//! [`RenderOutcome::DescriptionOnly`] instead of an error.

use evplot_graph::eg::EventGraph;
use evplot_graph::eg_dot::{DotExportConfig, EgToDot};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum PrintError {
    #[error("cannot write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("style file '{path}': {reason}")]
    Style { path: PathBuf, reason: String },

    #[error("renderer '{renderer}' failed with {status} on '{path}'")]
    RenderFailed {
        renderer: String,
        status: String,
        path: PathBuf,
    },
}

/// What the printer managed to produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// The layout tool ran and wrote the diagram.
    Rendered(PathBuf),
    /// Only the Graphviz description was written, either by request or
    /// because the layout tool is not installed.
    DescriptionOnly(PathBuf),
}

#[derive(Debug, Clone)]
pub struct DotPrinter {
    pub gv_path: PathBuf,
    pub output_path: PathBuf,
    pub renderer: String,
    pub output_format: String,
}

impl DotPrinter {
    /// Printer for `output_path`, deriving the description filename from it
    /// (`event.pdf` -> `event.gv`) and the output format from its extension.
    pub fn new(output_path: &Path) -> Self {
        let output_format = output_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("pdf")
            .to_string();
        DotPrinter {
            gv_path: output_path.with_extension("gv"),
            output_path: output_path.to_path_buf(),
            renderer: "dot".to_string(),
            output_format,
        }
    }

    pub fn renderer(mut self, renderer: &str) -> Self {
        self.renderer = renderer.to_string();
        self
    }

    /// Write the Graphviz file, then render it unless `make_diagram` is
    /// false.
    pub fn print_event(
        &self,
        graph: &EventGraph,
        name: &str,
        config: &DotExportConfig,
        make_diagram: bool,
    ) -> Result<RenderOutcome, PrintError> {
        let dot_text = graph.to_dot(name, config);
        info!("writing Graphviz file to {}", self.gv_path.display());
        std::fs::write(&self.gv_path, dot_text).map_err(|source| PrintError::Io {
            path: self.gv_path.clone(),
            source,
        })?;

        if !make_diagram {
            return Ok(RenderOutcome::DescriptionOnly(self.gv_path.clone()));
        }
        self.render()
    }

    fn render(&self) -> Result<RenderOutcome, PrintError> {
        info!("printing diagram to {}", self.output_path.display());
        let mut command = Command::new(&self.renderer);
        command
            .arg(format!("-T{}", self.output_format))
            .arg(&self.gv_path)
            .arg("-o")
            .arg(&self.output_path);

        match command.status() {
            Ok(status) if status.success() => {
                Ok(RenderOutcome::Rendered(self.output_path.clone()))
            }
            Ok(status) => Err(PrintError::RenderFailed {
                renderer: self.renderer.clone(),
                status: status.to_string(),
                path: self.gv_path.clone(),
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                warn!(
                    "renderer '{}' not found; wrote the graph description to {} but no diagram",
                    self.renderer,
                    self.gv_path.display()
                );
                Ok(RenderOutcome::DescriptionOnly(self.gv_path.clone()))
            }
            Err(err) => Err(PrintError::RenderFailed {
                renderer: self.renderer.clone(),
                status: err.to_string(),
                path: self.gv_path.clone(),
            }),
        }
    }
}

/// Open a finished diagram with the platform viewer. Best effort: a missing
/// opener is only worth a warning.
pub fn open_diagram(path: &Path) -> Result<(), PrintError> {
    let opener = if cfg!(target_os = "macos") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else {
        "xdg-open"
    };
    match Command::new(opener).arg(path).status() {
        Ok(_) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            warn!("no '{opener}' available to open {}", path.display());
            Ok(())
        }
        Err(source) => Err(PrintError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evplot_event::{NodeParticle, Particle};
    use evplot_graph::eg::assign_particles_nodes;

    fn test_graph() -> EventGraph {
        let records = vec![
            NodeParticle::new(Particle::new(1, 21, 1), vec![]),
            NodeParticle::new(Particle::new(2, 5, 1), vec![1]),
        ];
        assign_particles_nodes(&records).unwrap()
    }

    #[test]
    fn test_paths_derived_from_output() {
        let printer = DotPrinter::new(Path::new("/tmp/run_0.pdf"));
        assert_eq!(printer.gv_path, Path::new("/tmp/run_0.gv"));
        assert_eq!(printer.output_format, "pdf");
    }

    #[test]
    fn test_description_only_run_writes_gv() {
        let dir = tempfile::tempdir().unwrap();
        let printer = DotPrinter::new(&dir.path().join("event.pdf"));
        let outcome = printer
            .print_event(&test_graph(), "Event", &DotExportConfig::default(), false)
            .unwrap();
        assert_eq!(outcome, RenderOutcome::DescriptionOnly(printer.gv_path.clone()));

        let written = std::fs::read_to_string(&printer.gv_path).unwrap();
        assert!(written.starts_with("digraph \"Event\" {"));
        assert!(written.contains("\"1\" -> \"2\""));
    }

    #[test]
    fn test_missing_renderer_is_recoverable() {
        let dir = tempfile::tempdir().unwrap();
        let printer = DotPrinter::new(&dir.path().join("event.pdf"))
            .renderer("definitely-not-a-layout-tool");
        let outcome = printer
            .print_event(&test_graph(), "Event", &DotExportConfig::default(), true)
            .unwrap();
        // The description file survives even though nothing rendered it.
        assert_eq!(outcome, RenderOutcome::DescriptionOnly(printer.gv_path.clone()));
        assert!(printer.gv_path.exists());
    }

    #[test]
    fn test_unwritable_description_path_is_fatal() {
        let printer = DotPrinter::new(Path::new("/no/such/dir/event.pdf"));
        let err = printer
            .print_event(&test_graph(), "Event", &DotExportConfig::default(), false)
            .unwrap_err();
        assert!(matches!(err, PrintError::Io { .. }));
    }
}
