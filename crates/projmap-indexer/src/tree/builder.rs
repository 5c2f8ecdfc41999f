//! Tree builder from the sorted node list.

use super::TreeNode;
use std::collections::HashMap;
use tracing::debug;

/// Flat node used while building; children are arena indices.
struct ArenaNode<'p> {
    name: &'p str,
    is_dir: bool,
    children: Vec<usize>,
}

/// Builds the directory/file tree for a set of relative paths.
///
/// Each directory is created once and children keep the order in which
/// they first appear in the input, so sorted input gives a deterministic
/// tree. No file system access.
pub struct TreeBuilder {
    root_name: String,
}

impl TreeBuilder {
    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            root_name: root_name.into(),
        }
    }

    /// Build a tree from sorted, unique, `/`-separated relative paths.
    pub fn build(&self, paths: &[String]) -> TreeNode {
        let mut arena = vec![ArenaNode {
            name: "",
            is_dir: true,
            children: Vec::new(),
        }];

        // Track directory nodes by path for efficient lookup
        let mut dir_map: HashMap<&str, usize> = HashMap::new();
        dir_map.insert("", 0);

        for path in paths {
            let parent = ensure_directories(path, &mut arena, &mut dir_map);
            let name = path.rsplit('/').next().unwrap_or(path);

            let id = arena.len();
            arena.push(ArenaNode {
                name,
                is_dir: false,
                children: Vec::new(),
            });
            arena[parent].children.push(id);
        }

        debug!(files = paths.len(), nodes = arena.len(), "Tree built");

        let mut root = materialize(&arena, 0);
        root.name = self.root_name.clone();
        root
    }
}

/// Ensure all parent directories of `path` exist; returns the parent's id.
fn ensure_directories<'p>(
    path: &'p str,
    arena: &mut Vec<ArenaNode<'p>>,
    dir_map: &mut HashMap<&'p str, usize>,
) -> usize {
    let mut parent = 0;
    let mut end = 0;

    for segment in path.split('/') {
        let seg_end = end + segment.len();
        if seg_end >= path.len() {
            // Last segment is the file itself.
            break;
        }
        let dir_path = &path[..seg_end];

        parent = match dir_map.get(dir_path) {
            Some(&id) => id,
            None => {
                let id = arena.len();
                arena.push(ArenaNode {
                    name: segment,
                    is_dir: true,
                    children: Vec::new(),
                });
                arena[parent].children.push(id);
                dir_map.insert(dir_path, id);
                id
            }
        };
        end = seg_end + 1;
    }

    parent
}

fn materialize(arena: &[ArenaNode<'_>], id: usize) -> TreeNode {
    let node = &arena[id];
    if node.is_dir {
        TreeNode {
            name: node.name.to_string(),
            kind: super::NodeKind::Directory,
            children: Some(
                node.children
                    .iter()
                    .map(|&child| materialize(arena, child))
                    .collect(),
            ),
        }
    } else {
        TreeNode::file(node.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(list: &[&str]) -> Vec<String> {
        list.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_empty_tree() {
        let tree = TreeBuilder::new("proj").build(&[]);
        assert_eq!(tree.name, "proj");
        assert!(tree.is_directory());
        assert!(tree.children().is_empty());
    }

    #[test]
    fn test_directories_created_once() {
        let tree = TreeBuilder::new("proj").build(&paths(&[
            "README.ts",
            "src/a.ts",
            "src/lib/b.ts",
            "src/lib/c.ts",
            "src/z.ts",
        ]));

        let names: Vec<&str> = tree.children().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["README.ts", "src"]);

        let src = tree.find("src").unwrap();
        let names: Vec<&str> = src.children().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a.ts", "lib", "z.ts"]);

        assert_eq!(tree.find("src/lib").unwrap().children().len(), 2);
        assert_eq!(tree.file_count(), 5);
        assert!(tree.find("src/lib/b.ts").unwrap().children.is_none());
    }

    #[test]
    fn test_tree_is_deterministic() {
        let input = paths(&["a/b/c.ts", "a/d.ts", "e.ts"]);
        let first = TreeBuilder::new("root").build(&input);
        let second = TreeBuilder::new("root").build(&input);
        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[test]
    fn test_similar_prefixes_are_distinct_directories() {
        let tree = TreeBuilder::new("root").build(&paths(&["ab/x.ts", "a/y.ts"]));
        assert!(tree.find("ab/x.ts").is_some());
        assert!(tree.find("a/y.ts").is_some());
        assert!(tree.find("a/x.ts").is_none());
    }
}
