use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::Path;

/// Planned destinations as a sorted folder tree.
///
/// Renders like `tree(1)`, folders before files:
///
/// ```text
/// .
/// ├── image_files
/// │   └── cat.png
/// └── text_files
///     └── pdf_files
///         ├── report.pdf
///         └── report_1.pdf
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanTree {
    root: Node,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Node {
    folders: BTreeMap<String, Node>,
    files: BTreeSet<String>,
}

impl PlanTree {
    pub(crate) fn from_paths<'a>(paths: impl IntoIterator<Item = &'a Path>) -> Self {
        let mut root = Node::default();
        for path in paths {
            let mut components: Vec<String> =
                path.components().map(|c| c.as_os_str().to_string_lossy().into_owned()).collect();
            let Some(file) = components.pop() else {
                continue;
            };
            let node = components.into_iter().fold(&mut root, |node, folder| node.folders.entry(folder).or_default());
            node.files.insert(file);
        }
        Self { root }
    }

    /// Total number of files in the tree.
    pub fn files(&self) -> usize {
        self.root.count().0
    }

    /// Total number of folders in the tree, at any depth.
    pub fn folders(&self) -> usize {
        self.root.count().1
    }
}

impl Node {
    fn count(&self) -> (usize, usize) {
        self.folders.values().fold((self.files.len(), self.folders.len()), |(files, folders), child| {
            let (f, d) = child.count();
            (files + f, folders + d)
        })
    }

    fn render(&self, f: &mut Formatter<'_>, prefix: &str) -> FmtResult {
        let total = self.folders.len() + self.files.len();
        let entries = self
            .folders
            .iter()
            .map(|(name, node)| (name, Some(node)))
            .chain(self.files.iter().map(|name| (name, None)));
        for (i, (name, child)) in entries.enumerate() {
            let last = i + 1 == total;
            let (branch, indent) = match last {
                true => ("└── ", "    "),
                false => ("├── ", "│   "),
            };
            writeln!(f, "{prefix}{branch}{name}")?;
            if let Some(child) = child {
                child.render(f, &format!("{prefix}{indent}"))?;
            }
        }
        Ok(())
    }
}

impl Display for PlanTree {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, ".")?;
        self.root.render(f, "")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(paths: &[&str]) -> PlanTree {
        PlanTree::from_paths(paths.iter().map(Path::new))
    }

    #[test]
    fn test_render() {
        let tree = tree(&[
            "text_files/pdf_files/report_1.pdf",
            "image_files/cat.png",
            "text_files/pdf_files/report.pdf",
            "text_files/notes.txt",
        ]);
        let expected = "\
.
├── image_files
│   └── cat.png
└── text_files
    ├── pdf_files
    │   ├── report.pdf
    │   └── report_1.pdf
    └── notes.txt
";
        assert_eq!(tree.to_string(), expected);
    }

    #[test]
    fn test_counts() {
        let tree = tree(&["a/b/c.txt", "a/d.txt", "e.txt"]);
        assert_eq!(tree.files(), 3);
        assert_eq!(tree.folders(), 2);
    }

    #[test]
    fn test_empty() {
        assert_eq!(PlanTree::default().to_string(), ".\n");
    }
}
