//! # Tree Command Implementation
//!
//! Displays a store subtree hierarchically: directories end in `/`, leaves
//! show their value. Read-only.

use anyhow::Result;
use clap::Args;
use ptree::{print_tree, TreeItem};
use std::borrow::Cow;
use std::process::ExitCode;

use keyport::output;
use keyport::path;
use keyport::store::{GetOptions, KeyValueStore, Node};
use keyport::suggestions;

use crate::cli::Context;

/// Display the keys under a store directory
#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Store directory to display
    #[arg(value_name = "DIR", default_value = "/")]
    pub dir: String,

    /// Maximum depth to display.
    ///
    /// Use 0 to show only the directory itself, 1 for its direct children, etc.
    #[arg(long, value_name = "NUM")]
    pub depth: Option<usize>,
}

/// Execute the `tree` command.
pub fn execute(args: TreeArgs, context: &Context) -> Result<ExitCode> {
    let store = context.store()?;
    let directory = path::normalize(&args.dir);
    let node = store
        .get(&directory, GetOptions { recursive: true })
        .map_err(suggestions::explain)?;

    println!("{}", output::tree_header(&context.output, &directory));
    let tree = build_tree_node(&node, args.depth.unwrap_or(usize::MAX), 0);
    print_tree(&tree).map_err(|e| anyhow::anyhow!("Failed to display tree: {}", e))?;

    Ok(ExitCode::SUCCESS)
}

/// Build a display node from a store node, children sorted by name.
fn build_tree_node(node: &Node, max_depth: usize, current_depth: usize) -> TreeNode {
    let name = path::file_name(&node.key);
    if !node.dir {
        return TreeNode {
            label: format!("{} = {}", name, node.value.as_deref().unwrap_or_default()),
            children: vec![],
        };
    }

    let label = if name == "/" {
        name.to_string()
    } else {
        format!("{}/", name)
    };
    let children = if current_depth >= max_depth {
        vec![]
    } else {
        let mut children: Vec<&Node> = node.nodes.iter().collect();
        children.sort_by(|a, b| a.key.cmp(&b.key));
        children
            .into_iter()
            .map(|child| build_tree_node(child, max_depth, current_depth + 1))
            .collect()
    };
    TreeNode { label, children }
}

/// Tree node structure for ptree visualization
#[derive(Clone)]
struct TreeNode {
    label: String,
    children: Vec<TreeNode>,
}

impl TreeItem for TreeNode {
    type Child = TreeNode;

    fn write_self<W: std::io::Write>(
        &self,
        f: &mut W,
        _style: &ptree::Style,
    ) -> std::io::Result<()> {
        write!(f, "{}", self.label)
    }

    fn children(&self) -> Cow<'_, [Self::Child]> {
        Cow::Borrowed(&self.children)
    }
}
