use crate::error::{GraphError, Result};
use crate::types::KnowledgeGraph;
use crate::{node_link, render, xml};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Output document formats for an assembled graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphFormat {
    /// Node-link JSON
    Json,
    GraphMl,
    Gexf,
    /// Graphviz, styled with the render palette
    Dot,
}

impl GraphFormat {
    pub const ALL: [Self; 4] = [Self::Json, Self::GraphMl, Self::Gexf, Self::Dot];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::GraphMl => "graphml",
            Self::Gexf => "gexf",
            Self::Dot => "dot",
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        self.as_str()
    }
}

impl fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GraphFormat {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == wanted)
            .ok_or_else(|| GraphError::UnsupportedFormat(s.to_string()))
    }
}

/// Serialize the graph in `format`.
pub fn render_document(graph: &KnowledgeGraph, format: GraphFormat) -> Result<Vec<u8>> {
    match format {
        GraphFormat::Json => Ok(serde_json::to_vec_pretty(&node_link::to_node_link(graph))?),
        GraphFormat::GraphMl => xml::to_graphml(graph),
        GraphFormat::Gexf => xml::to_gexf(graph),
        GraphFormat::Dot => Ok(render::to_dot(graph).into_bytes()),
    }
}

/// Write the graph to `path`, creating parent directories. The file is
/// written to a temporary sibling and renamed into place.
pub fn write_graph(graph: &KnowledgeGraph, path: &Path, format: GraphFormat) -> Result<()> {
    let bytes = render_document(graph, format)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension(format!("{}.tmp", format.extension()));
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;

    log::info!(
        "Graph written to {} ({} nodes, {} edges)",
        path.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(())
}

/// `<analysis stem>_graph.<ext>` next to the analysis file.
#[must_use]
pub fn default_output_path(analysis: &Path, format: GraphFormat) -> PathBuf {
    let stem = analysis
        .file_stem()
        .map_or_else(|| "analysis".into(), |s| s.to_string_lossy());
    analysis.with_file_name(format!("{stem}_graph.{}", format.extension()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("GraphML".parse::<GraphFormat>().unwrap(), GraphFormat::GraphMl);
        assert_eq!(" json ".parse::<GraphFormat>().unwrap(), GraphFormat::Json);
        assert!(matches!(
            "svg".parse::<GraphFormat>(),
            Err(GraphError::UnsupportedFormat(name)) if name == "svg"
        ));
    }

    #[test]
    fn default_path_sits_next_to_analysis() {
        assert_eq!(
            default_output_path(Path::new("/out/analysis.json"), GraphFormat::Gexf),
            PathBuf::from("/out/analysis_graph.gexf")
        );
    }
}
