//! Terminal rendering of the selector view model with termtree

use colored::Colorize;
use termtree::Tree;

use crate::domain::{NodeView, SelectorView};

pub trait ToTermTree {
    fn to_term_tree(&self) -> Tree<String>;
}

impl ToTermTree for SelectorView {
    fn to_term_tree(&self) -> Tree<String> {
        let root = if self.is_empty {
            "(no nodes)".dimmed().to_string()
        } else if self.root.hidden {
            // termtree needs a root line; a hidden root item only gets a summary
            format!("{} selected", self.selected_count).dimmed().to_string()
        } else {
            format!("{} {}", radio(self.root.checked), self.root.label)
        };

        let mut tree = Tree::new(root);
        if self.root.adding {
            tree.push(Tree::new(draft_line(self.buffer.as_deref())));
        }
        for node in &self.nodes {
            tree.push(node_tree(self, node));
        }
        tree
    }
}

fn node_tree(view: &SelectorView, node: &NodeView) -> Tree<String> {
    let mut tree = Tree::new(node_line(view, node));
    if node.unfolded {
        if node.adding_child {
            tree.push(Tree::new(draft_line(view.buffer.as_deref())));
        }
        for child in &node.children {
            tree.push(node_tree(view, child));
        }
    }
    tree
}

/// One node: fold marker, check mark, label, annotations.
pub fn node_line(view: &SelectorView, node: &NodeView) -> String {
    let fold = match (node.is_leaf, node.unfolded) {
        (true, _) => " ",
        (false, true) => "▾",
        (false, false) => "▸",
    };
    let mark = if view.check_marks {
        format!("{} ", mark(view, node))
    } else if node.state.checked {
        "* ".to_string()
    } else {
        String::new()
    };

    let label = if node.editing {
        format!("✎ {}", view.buffer.as_deref().unwrap_or_default())
            .yellow()
            .to_string()
    } else if node.state.self_checked {
        node.label.green().bold().to_string()
    } else {
        node.label.clone()
    };

    let mut line = format!("{fold} {mark}{label}");
    if let Some(value) = &node.value_key {
        line.push_str(&format!(" {}", format!("<{value}>").dimmed()));
    }
    if let Some(reason) = node.state.disabled {
        line.push_str(&format!(" {}", format!("[{reason}]").red()));
    }
    line
}

fn mark(view: &SelectorView, node: &NodeView) -> &'static str {
    let state = &node.state;
    if view.radio {
        radio(state.self_checked)
    } else if state.self_checked {
        "[x]"
    } else if state.indeterminate {
        "[-]"
    } else {
        "[ ]"
    }
}

fn radio(checked: bool) -> &'static str {
    if checked {
        "(o)"
    } else {
        "( )"
    }
}

fn draft_line(buffer: Option<&str>) -> String {
    format!("+ {}", buffer.unwrap_or_default()).yellow().to_string()
}
