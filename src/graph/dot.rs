// src/graph/dot.rs
// =============================================================================
// Renders the crawl graph in Graphviz DOT format.
//
// Output shape:
//   digraph dotler {
//       "example.com/" [shape=ellipse];
//       "example.com/" -> "example.com/docs" [label="3"];
//       "example.com/" -> "asset:cdn.example.com/app.js" [style=dashed];
//       "asset:cdn.example.com/app.js" [shape=box, label="app.js"];
//   }
//
// Pages and edges are sorted so the same crawl always renders the same text.
// Edges may point at pages that were never registered (off-site links, or
// links past the depth limit); Graphviz creates those nodes implicitly.
// =============================================================================

use std::fmt::Write;
use std::sync::Arc;

use super::Page;

const ASSET_PREFIX: &str = "asset:";

pub fn render_dot(pages: &[(String, Arc<Page>)]) -> String {
    let mut pages: Vec<&(String, Arc<Page>)> = pages.iter().collect();
    pages.sort_by(|a, b| a.0.cmp(&b.0));

    let mut out = String::from("digraph dotler {\n");

    for (key, page) in pages {
        let id = quote(key);
        // Writing to a String cannot fail
        let _ = writeln!(out, "    {} [shape=ellipse];", id);

        for link in page.out_links() {
            let _ = writeln!(out, "    {} -> {} [label=\"{}\"];", id, quote(&link.key), link.card);
        }

        for (asset_key, asset) in page.static_assets() {
            let asset_id = quote(&format!("{}{}", ASSET_PREFIX, asset_key));
            let _ = writeln!(out, "    {} -> {} [style=dashed];", id, asset_id);
            let _ = writeln!(out, "    {} [shape=box, label={}];", asset_id, quote(&asset.title));
        }
    }

    out.push_str("}\n");
    out
}

// Quotes a DOT identifier, escaping backslashes and double quotes
fn quote(raw: &str) -> String {
    let mut quoted = String::with_capacity(raw.len() + 2);
    quoted.push('"');
    for c in raw.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}
