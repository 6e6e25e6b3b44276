//! Mermaid diagram templates per content class

use crate::classify::ContentClass;
use crate::nodes::{derive_labels, heading_label};
use std::fmt::Write;

/// Id of the root node
pub const ROOT_ID: &str = "A";

/// Id of the terminal node
pub const TERMINAL_ID: &str = "Z";

/// Label of the terminal node
pub const TERMINAL_LABEL: &str = "Complete";

/// Visual role of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRole {
    /// Heading node
    Root,
    /// Derived node
    Step,
    /// Convergence node
    Terminal,
}

impl NodeRole {
    fn style(self) -> &'static str {
        match self {
            Self::Root => "fill:#6366f1,stroke:#4338ca,stroke-width:2px,color:#ffffff",
            Self::Step => "fill:#eef2ff,stroke:#6366f1,color:#1e1b4b",
            Self::Terminal => "fill:#10b981,stroke:#047857,stroke-width:2px,color:#ffffff",
        }
    }
}

/// Layout of one diagram family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    /// Mermaid graph direction
    pub direction: &'static str,
    /// Edge syntax between root and derived nodes
    pub link: &'static str,
    /// Maximum derived nodes
    pub max_nodes: usize,
    /// Whether derived nodes converge on a terminal node
    pub terminal: bool,
    /// Label used when no sentence qualifies
    pub placeholder: Option<&'static str>,
}

impl ContentClass {
    /// Diagram template for this class
    #[must_use]
    pub fn template(self) -> Template {
        match self {
            Self::Workflow => Template {
                direction: "TD",
                link: "-->",
                max_nodes: 4,
                terminal: true,
                placeholder: None,
            },
            Self::Architecture => Template {
                direction: "TD",
                link: "---",
                max_nodes: 5,
                terminal: false,
                placeholder: Some("Core Components"),
            },
            Self::Comparison => Template {
                direction: "LR",
                link: "-->",
                max_nodes: 4,
                terminal: false,
                placeholder: Some("Key Differences"),
            },
            Self::Concept => Template {
                direction: "TD",
                link: "-->",
                max_nodes: 4,
                terminal: false,
                placeholder: Some("Key Concepts"),
            },
        }
    }
}

/// Render a diagram for a classified section
#[must_use]
pub fn render(class: ContentClass, heading: &str, body: &str) -> String {
    let template = class.template();
    let mut labels = derive_labels(body, template.max_nodes);
    if labels.is_empty() {
        labels.extend(template.placeholder.map(str::to_string));
    }

    let mut out = String::new();
    let mut styles: Vec<(String, NodeRole)> = vec![(ROOT_ID.to_string(), NodeRole::Root)];

    // Writing into a String cannot fail
    let _ = writeln!(out, "graph {}", template.direction);
    let _ = writeln!(out, "    {ROOT_ID}[\"{}\"]", heading_label(heading));

    for (i, label) in labels.iter().enumerate() {
        let id = format!("B{}", i + 1);
        let _ = writeln!(out, "    {ROOT_ID} {} {id}[\"{label}\"]", template.link);
        styles.push((id, NodeRole::Step));
    }

    if template.terminal {
        let _ = writeln!(out, "    {TERMINAL_ID}[\"{TERMINAL_LABEL}\"]");
        if labels.is_empty() {
            let _ = writeln!(out, "    {ROOT_ID} --> {TERMINAL_ID}");
        }
        for i in 0..labels.len() {
            let _ = writeln!(out, "    B{} --> {TERMINAL_ID}", i + 1);
        }
        styles.push((TERMINAL_ID.to_string(), NodeRole::Terminal));
    }

    for (id, role) in &styles {
        let _ = writeln!(out, "    style {id} {}", role.style());
    }

    out.trim_end().to_string()
}
