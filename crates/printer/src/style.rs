//! Diagram styling, overridable from a TOML file.

use crate::dot_printer::PrintError;
use evplot_graph::eg_dot::{DotExportConfig, Palette};
use serde::Deserialize;
use std::path::Path;

/// Style knobs for the emitted Graphviz description. Every field has a
/// default, so a style file only needs the entries it wants to change:
///
/// ```toml
/// rankdir = "TB"
/// highlight_color = "orange"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DotStyle {
    pub rankdir: String,
    pub ranksep: f64,
    pub nodesep: f64,
    pub initial_color: String,
    pub final_color: String,
    pub highlight_color: String,
}

impl Default for DotStyle {
    fn default() -> Self {
        DotStyle {
            rankdir: "LR".to_string(),
            ranksep: 0.6,
            nodesep: 0.6,
            initial_color: "green3".to_string(),
            final_color: "dodgerblue1".to_string(),
            highlight_color: "gold".to_string(),
        }
    }
}

impl DotStyle {
    pub fn load(path: &Path) -> Result<Self, PrintError> {
        let text = std::fs::read_to_string(path).map_err(|source| PrintError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|err| PrintError::Style {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })
    }

    /// Lower the style into the graph crate's export configuration.
    pub fn export_config(&self, title: Option<String>) -> DotExportConfig {
        DotExportConfig {
            graph_attrs: vec![
                ("rankdir".to_string(), self.rankdir.clone()),
                ("ranksep".to_string(), self.ranksep.to_string()),
                ("nodesep".to_string(), self.nodesep.to_string()),
            ],
            title,
            rank_initial: true,
            palette: Palette {
                initial: self.initial_color.clone(),
                final_state: self.final_color.clone(),
                highlight: self.highlight_color.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let style = DotStyle::default();
        let config = style.export_config(Some("Event".to_string()));
        assert!(config
            .graph_attrs
            .contains(&("rankdir".to_string(), "LR".to_string())));
        assert_eq!(config.palette.highlight, "gold");
        assert_eq!(config.title.as_deref(), Some("Event"));
    }

    #[test]
    fn test_partial_override_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "rankdir = \"TB\"\nhighlight_color = \"orange\"").unwrap();

        let style = DotStyle::load(&path).unwrap();
        assert_eq!(style.rankdir, "TB");
        assert_eq!(style.highlight_color, "orange");
        // Untouched fields keep their defaults.
        assert_eq!(style.final_color, "dodgerblue1");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("style.toml");
        std::fs::write(&path, "rankdri = \"TB\"\n").unwrap();
        let err = DotStyle::load(&path).unwrap_err();
        assert!(matches!(err, PrintError::Style { .. }));
    }
}
