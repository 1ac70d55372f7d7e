//! Working tree materialization and scanning.

use std::fs;
use std::path::Path;

use bstr::{BString, ByteSlice, ByteVec};
use tgit_hash::ObjectId;
use tgit_index::{Index, IndexEntry, StatData};
use tgit_object::{FileMode, Object};

use crate::{RepoError, Repository};

/// Check out a commit: materialize its tree into the working tree and
/// write a fresh index describing it.
pub fn checkout_commit(repo: &Repository, commit_oid: &ObjectId) -> Result<(), RepoError> {
    let commit = match repo.store().read(commit_oid)? {
        Object::Commit(c) => c,
        other => {
            return Err(RepoError::WrongObjectType {
                oid: *commit_oid,
                expected: "commit",
                actual: other.object_type().as_str(),
            });
        }
    };

    let mut index = Index::new();
    materialize_tree(repo, &commit.tree, &BString::from(""), &mut index)?;
    index.write_to(repo.index_path())?;
    Ok(())
}

fn materialize_tree(
    repo: &Repository,
    tree_oid: &ObjectId,
    prefix: &BString,
    index: &mut Index,
) -> Result<(), RepoError> {
    let tree = match repo.store().read(tree_oid)? {
        Object::Tree(t) => t,
        other => {
            return Err(RepoError::WrongObjectType {
                oid: *tree_oid,
                expected: "tree",
                actual: other.object_type().as_str(),
            });
        }
    };

    for entry in tree.iter() {
        let mut rel = prefix.clone();
        if !rel.is_empty() {
            rel.push_byte(b'/');
        }
        rel.extend_from_slice(&entry.name);

        let on_disk = repo.work_tree().join(rel.to_str_lossy().as_ref());

        if entry.mode.is_tree() {
            fs::create_dir_all(&on_disk)?;
            materialize_tree(repo, &entry.oid, &rel, index)?;
            continue;
        }

        let blob = match repo.store().read(&entry.oid)? {
            Object::Blob(b) => b,
            other => {
                return Err(RepoError::WrongObjectType {
                    oid: entry.oid,
                    expected: "blob",
                    actual: other.object_type().as_str(),
                });
            }
        };

        if let Some(parent) = on_disk.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&on_disk, &blob.data)?;

        #[cfg(unix)]
        if entry.mode == FileMode::Executable {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&on_disk, fs::Permissions::from_mode(0o755))?;
        }

        let metadata = fs::metadata(&on_disk)?;
        index.add(IndexEntry {
            path: rel,
            oid: entry.oid,
            mode: entry.mode,
            stat: StatData::from_metadata(&metadata),
        });
    }

    Ok(())
}

/// List every file under the working tree as a repo-relative path,
/// skipping the `.git` directory. Paths come back sorted.
pub fn list_files(repo: &Repository) -> Result<Vec<BString>, RepoError> {
    let mut files = Vec::new();
    walk(repo.work_tree(), repo.work_tree(), &mut files)?;
    files.sort();
    Ok(files)
}

fn walk(root: &Path, dir: &Path, out: &mut Vec<BString>) -> Result<(), RepoError> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            if entry.file_name() == ".git" {
                continue;
            }
            walk(root, &path, out)?;
        } else if file_type.is_file() {
            let rel = path
                .strip_prefix(root)
                .expect("walk stays under the root");
            out.push(BString::from(rel.to_string_lossy().as_bytes()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tgit_object::{ObjectType, Tree, TreeEntry};

    fn write_blob(repo: &Repository, data: &[u8]) -> ObjectId {
        repo.store().write_raw(ObjectType::Blob, data).unwrap()
    }

    fn write_tree(repo: &Repository, entries: Vec<TreeEntry>) -> ObjectId {
        let tree = Tree { entries };
        repo.store()
            .write_raw(ObjectType::Tree, &tree.serialize_payload())
            .unwrap()
    }

    fn write_commit(repo: &Repository, tree: ObjectId) -> ObjectId {
        let payload = format!(
            "tree {}\nauthor A U Thor <au@example.com> 0 +0000\n\
committer A U Thor <au@example.com> 0 +0000\n\nseed\n",
            tree.to_hex()
        );
        repo.store()
            .write_raw(ObjectType::Commit, payload.as_bytes())
            .unwrap()
    }

    #[test]
    fn checkout_materializes_files_and_index() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        let readme = write_blob(&repo, b"hello\n");
        let main_rs = write_blob(&repo, b"fn main() {}\n");
        let src = write_tree(
            &repo,
            vec![TreeEntry {
                mode: FileMode::Regular,
                name: BString::from("main.rs"),
                oid: main_rs,
            }],
        );
        let root = write_tree(
            &repo,
            vec![
                TreeEntry {
                    mode: FileMode::Regular,
                    name: BString::from("README"),
                    oid: readme,
                },
                TreeEntry {
                    mode: FileMode::Tree,
                    name: BString::from("src"),
                    oid: src,
                },
            ],
        );
        let commit = write_commit(&repo, root);

        checkout_commit(&repo, &commit).unwrap();

        assert_eq!(
            fs::read(dir.path().join("README")).unwrap(),
            b"hello\n"
        );
        assert_eq!(
            fs::read(dir.path().join("src/main.rs")).unwrap(),
            b"fn main() {}\n"
        );

        let index = repo.load_index().unwrap();
        assert_eq!(index.len(), 2);
        assert!(index.get(bstr::BStr::new("README")).is_some());
        assert!(index.get(bstr::BStr::new("src/main.rs")).is_some());
    }

    #[test]
    fn checkout_requires_a_commit() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let blob = write_blob(&repo, b"not a commit");
        assert!(matches!(
            checkout_commit(&repo, &blob),
            Err(RepoError::WrongObjectType { .. })
        ));
    }

    #[test]
    fn list_files_skips_git_dir() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        fs::write(dir.path().join("tracked.txt"), b"x").unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/inner.txt"), b"y").unwrap();

        let files = list_files(&repo).unwrap();
        assert_eq!(
            files,
            vec![BString::from("sub/inner.txt"), BString::from("tracked.txt")]
        );
    }
}
