use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub type UploadId = i64;
pub type RepositoryId = i64;

/// One indexer's output for one repository, commit and root.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash, JsonSchema)]
pub struct Upload {
    pub id: UploadId,
    pub repository_id: RepositoryId,
    pub repository_name: String,
    pub commit: String,
    /// Directory within the repository the indexer ran in. Either empty or
    /// terminated by `/`.
    pub root: String,
    pub indexer: String,
}

impl Upload {
    /// Strips the upload root from a repository-relative path.
    ///
    /// Returns `None` if the path does not live under the root.
    pub fn path_within_root<'a>(&self, path: &'a str) -> Option<&'a str> {
        path.strip_prefix(self.root.as_str())
    }

    /// Repository-relative path for a path stored in this upload.
    pub fn full_path(&self, path: &str) -> String {
        format!("{}{}", self.root, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(root: &str) -> Upload {
        Upload {
            id: 1,
            repository_id: 7,
            repository_name: "github.com/example/repo".to_string(),
            commit: "deadbeef".to_string(),
            root: root.to_string(),
            indexer: "scip-go".to_string(),
        }
    }

    #[test]
    fn path_within_root() {
        assert_eq!(upload("sub/").path_within_root("sub/main.go"), Some("main.go"));
        assert_eq!(upload("sub/").path_within_root("other/main.go"), None);
        assert_eq!(upload("").path_within_root("main.go"), Some("main.go"));
    }

    #[test]
    fn full_path_prepends_root() {
        assert_eq!(upload("sub/").full_path("main.go"), "sub/main.go");
    }
}
