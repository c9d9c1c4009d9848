//! Interactive graph page
//!
//! The graph data is embedded in the page. The D3 force layout is loaded from
//! the d3js.org CDN, so the page needs network access to render.

use super::{ensure_parent, may_write, GraphView, WriteOutcome};
use crate::errors::Result;
use std::path::Path;
use tracing::info;

const D3_URL: &str = "https://d3js.org/d3.v7.min.js";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Paper connections</title>
<style>
  html, body { margin: 0; height: 100%; background: #ffffff; font-family: sans-serif; }
  svg { width: 100%; height: 100%; }
  line { stroke: #999999; stroke-opacity: 0.5; }
  text { font-size: 10px; pointer-events: none; }
  #legend { position: absolute; top: 8px; left: 8px; font-size: 12px; }
  #legend span { display: inline-block; width: 10px; height: 10px; margin: 0 4px 0 12px; border-radius: 50%; }
</style>
</head>
<body>
<div id="legend">
  <span style="background:#1e90ff"></span>owned
  <span style="background:#ff8c00"></span>recommended
  <span style="background:#a9a9a9"></span>new
</div>
<svg></svg>
<script src="__D3_URL__"></script>
<script>
const graph = __GRAPH_DATA__;
const svg = d3.select("svg");
const width = window.innerWidth, height = window.innerHeight;
const scale = 4;

const links = graph.edges.map(e => ({ source: e.source, target: e.target }));
const simulation = d3.forceSimulation(graph.nodes)
  .force("link", d3.forceLink(links).id(d => d.id).distance(60))
  .force("charge", d3.forceManyBody().strength(-80))
  .force("center", d3.forceCenter(width / 2, height / 2))
  .force("collide", d3.forceCollide(d => d.size * scale + 2));

const root = svg.append("g");
svg.call(d3.zoom().on("zoom", event => root.attr("transform", event.transform)));

const link = root.append("g").selectAll("line").data(links).join("line");
const node = root.append("g").selectAll("circle").data(graph.nodes).join("circle")
  .attr("r", d => d.size * scale)
  .attr("fill", d => d.color)
  .call(d3.drag()
    .on("start", (event, d) => { if (!event.active) simulation.alphaTarget(0.3).restart(); d.fx = d.x; d.fy = d.y; })
    .on("drag", (event, d) => { d.fx = event.x; d.fy = event.y; })
    .on("end", (event, d) => { if (!event.active) simulation.alphaTarget(0); d.fx = null; d.fy = null; }));
node.append("title").text(d => d.title);
const label = root.append("g").selectAll("text").data(graph.nodes).join("text").text(d => d.label);

simulation.on("tick", () => {
  link.attr("x1", d => d.source.x).attr("y1", d => d.source.y)
      .attr("x2", d => d.target.x).attr("y2", d => d.target.y);
  node.attr("cx", d => d.x).attr("cy", d => d.y);
  label.attr("x", d => d.x + d.size * scale + 2).attr("y", d => d.y + 3);
});
</script>
</body>
</html>
"#;

/// Render the page with the graph embedded as JSON
pub fn render_graph_page(view: &GraphView) -> Result<String> {
    // A literal `</` inside the data would close the script element
    let data = serde_json::to_string(view)?.replace("</", "<\\/");
    Ok(PAGE_TEMPLATE.replace("__D3_URL__", D3_URL).replace("__GRAPH_DATA__", &data))
}

pub fn write_graph_page(path: &Path, view: &GraphView, overwrite: bool) -> Result<WriteOutcome> {
    if !may_write(path, overwrite) {
        return Ok(WriteOutcome::Skipped);
    }
    ensure_parent(path)?;

    std::fs::write(path, render_graph_page(view)?)?;

    info!(
        path = %path.display(),
        nodes = view.nodes.len(),
        edges = view.edges.len(),
        "Graph page written"
    );
    Ok(WriteOutcome::Written)
}
