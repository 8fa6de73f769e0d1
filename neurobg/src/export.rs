//! Graphviz rendering of a topology, for eyeballing the wiring.

use graphviz_rust::{
    cmd::{CommandArg, Format},
    dot_structures::{
        Attribute, Edge, EdgeTy, Graph, GraphAttributes, Id, Node, NodeId, Stmt, Vertex,
    },
    exec,
    printer::{DotPrinter, PrinterContext},
};

use crate::{error::Result, neuron::LayerKind, topology::Topology};

/// Graphviz takes points, the layout is in px.
const PX_PER_POINT: f32 = 72.0;

fn attr(key: &str, value: impl Into<String>) -> Attribute {
    Attribute(Id::Plain(key.into()), Id::Escaped(format!("\"{}\"", value.into())))
}

fn node_id(i: usize) -> NodeId {
    NodeId(Id::Plain(format!("n{i}")), None)
}

pub fn to_graph(topology: &Topology) -> Graph {
    let mut g = Graph::DiGraph {
        id: Id::Plain("network".to_string()),
        strict: false,
        stmts: Vec::new(),
    };

    g.add_stmt(Stmt::GAttribute(GraphAttributes::Graph(vec![
        attr("layout", "neato"),
        attr("splines", "line"),
        attr("bgcolor", "black"),
    ])));

    for (i, neuron) in topology.neurons.iter().enumerate() {
        let color = match neuron.kind {
            LayerKind::Input => "white",
            LayerKind::Hidden => "gray50",
            LayerKind::Output => "gray80",
        };
        // Pinned at the layout position, y flipped since graphviz grows upwards
        let pos = format!(
            "{},{}!",
            neuron.origin.x / PX_PER_POINT,
            -neuron.origin.y / PX_PER_POINT
        );
        g.add_stmt(Stmt::Node(Node::new(
            node_id(i),
            vec![
                attr("shape", "point"),
                attr("color", color),
                attr("pos", pos),
            ],
        )));
    }

    for synapse in &topology.synapses {
        g.add_stmt(Stmt::Edge(Edge {
            ty: EdgeTy::Pair(
                Vertex::N(node_id(synapse.source as usize)),
                Vertex::N(node_id(synapse.target as usize)),
            ),
            attributes: vec![attr("dir", "none"), attr("color", "gray25")],
        }));
    }

    g
}

pub fn to_dot(topology: &Topology) -> String {
    to_graph(topology).print(&mut PrinterContext::default())
}

/// Render with the **neato** engine into a PNG in memory.
/// Needs a Graphviz installation on the `PATH`.
pub fn to_png(topology: &Topology) -> Result<Vec<u8>> {
    let mut ctx = PrinterContext::default();
    let png = exec(
        to_graph(topology),
        &mut ctx,
        vec![CommandArg::Format(Format::Png)],
    )?;
    Ok(png)
}
