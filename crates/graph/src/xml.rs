//! Attributed XML documents (GraphML, GEXF). All attributes are string-typed.

use crate::error::{GraphError, Result};
use crate::types::KnowledgeGraph;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Node attribute keys, in the order [`crate::GraphNode::attributes`] yields them.
const NODE_KEYS: [&str; 9] = [
    "type",
    "label",
    "name",
    "external",
    "owner",
    "file",
    "start_line",
    "end_line",
    "description",
];

const GRAPHML_NS: &str = "http://graphml.graphdrawing.org/xmlns";
const GEXF_NS: &str = "http://www.gexf.net/1.2draft";

struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Result<Self> {
        let mut out = Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        };
        out.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(out)
    }

    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| GraphError::XmlError(e.to_string()))
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Start(start))
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attrs.iter().copied());
        self.event(Event::Empty(start))
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn text_element(&mut self, name: &str, attrs: &[(&str, &str)], text: &str) -> Result<()> {
        self.open(name, attrs)?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn finish(self) -> Vec<u8> {
        let mut bytes = self.writer.into_inner();
        bytes.push(b'\n');
        bytes
    }
}

fn key_index(key: &str) -> usize {
    NODE_KEYS.iter().position(|k| *k == key).unwrap_or_default()
}

pub(crate) fn to_graphml(graph: &KnowledgeGraph) -> Result<Vec<u8>> {
    let mut out = XmlOut::new()?;
    out.open("graphml", &[("xmlns", GRAPHML_NS)])?;

    let node_key_ids: Vec<String> = (0..NODE_KEYS.len()).map(|i| format!("d{i}")).collect();
    let edge_key_id = format!("d{}", NODE_KEYS.len());
    for (key, id) in NODE_KEYS.iter().zip(&node_key_ids) {
        out.empty(
            "key",
            &[
                ("id", id.as_str()),
                ("for", "node"),
                ("attr.name", *key),
                ("attr.type", "string"),
            ],
        )?;
    }
    out.empty(
        "key",
        &[
            ("id", edge_key_id.as_str()),
            ("for", "edge"),
            ("attr.name", "type"),
            ("attr.type", "string"),
        ],
    )?;

    out.open("graph", &[("edgedefault", "directed")])?;
    for (_, node) in graph.nodes() {
        out.open("node", &[("id", node.id.as_str())])?;
        for (key, value) in node.attributes() {
            let key_id = node_key_ids[key_index(key)].as_str();
            out.text_element("data", &[("key", key_id)], &value)?;
        }
        out.close("node")?;
    }
    for (source, target, kind) in graph.edges() {
        out.open(
            "edge",
            &[("source", source.id.as_str()), ("target", target.id.as_str())],
        )?;
        out.text_element("data", &[("key", edge_key_id.as_str())], kind.as_str())?;
        out.close("edge")?;
    }
    out.close("graph")?;
    out.close("graphml")?;
    Ok(out.finish())
}

pub(crate) fn to_gexf(graph: &KnowledgeGraph) -> Result<Vec<u8>> {
    let mut out = XmlOut::new()?;
    out.open("gexf", &[("xmlns", GEXF_NS), ("version", "1.2")])?;
    out.open("meta", &[])?;
    out.text_element("creator", &[], concat!("kgraph ", env!("CARGO_PKG_VERSION")))?;
    out.close("meta")?;
    out.open("graph", &[("defaultedgetype", "directed"), ("mode", "static")])?;

    let ids: Vec<String> = (0..NODE_KEYS.len()).map(|i| i.to_string()).collect();
    out.open("attributes", &[("class", "node"), ("mode", "static")])?;
    for (key, id) in NODE_KEYS.iter().zip(&ids) {
        out.empty(
            "attribute",
            &[("id", id.as_str()), ("title", *key), ("type", "string")],
        )?;
    }
    out.close("attributes")?;
    out.open("attributes", &[("class", "edge"), ("mode", "static")])?;
    out.empty("attribute", &[("id", "0"), ("title", "type"), ("type", "string")])?;
    out.close("attributes")?;

    out.open("nodes", &[])?;
    for (_, node) in graph.nodes() {
        out.open(
            "node",
            &[("id", node.id.as_str()), ("label", node.label.as_str())],
        )?;
        out.open("attvalues", &[])?;
        for (key, value) in node.attributes() {
            out.empty(
                "attvalue",
                &[("for", ids[key_index(key)].as_str()), ("value", value.as_str())],
            )?;
        }
        out.close("attvalues")?;
        out.close("node")?;
    }
    out.close("nodes")?;

    out.open("edges", &[])?;
    for (index, (source, target, kind)) in graph.edges().enumerate() {
        let id = index.to_string();
        out.open(
            "edge",
            &[
                ("id", id.as_str()),
                ("source", source.id.as_str()),
                ("target", target.id.as_str()),
                ("label", kind.as_str()),
            ],
        )?;
        out.open("attvalues", &[])?;
        out.empty("attvalue", &[("for", "0"), ("value", kind.as_str())])?;
        out.close("attvalues")?;
        out.close("edge")?;
    }
    out.close("edges")?;

    out.close("graph")?;
    out.close("gexf")?;
    Ok(out.finish())
}
