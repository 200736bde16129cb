//! Git-backed template repositories
//!
//! [`GitFetcher`] clones a template repository into a temporary directory,
//! checks out the requested ref, and reads the working tree into a
//! [`FileTree`]. The clone is discarded once the tree is read.
//!
//! Authentication is delegated to git's native mechanisms (see [`auth`]).

pub mod auth;
pub mod url;

use std::path::Path;

use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{FetchOptions, RemoteCallbacks, Repository};
use tracing::debug;

use crate::error::{Result, source};
use crate::source::{RepoId, RepositoryFetcher};
use crate::tree::FileTree;

/// Clones repositories with libgit2
///
/// Remote repositories without a ref are cloned shallow; local ones and
/// pinned refs get full history so the ref can be resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitFetcher;

impl GitFetcher {
    pub fn new() -> Self {
        Self
    }
}

impl RepositoryFetcher for GitFetcher {
    fn fetch(&self, repo: &RepoId) -> Result<FileTree> {
        let temp = tempfile::Builder::new()
            .prefix("specify-template-")
            .tempdir()
            .map_err(|e| source::unavailable(repo.to_string(), e.to_string()))?;

        let shallow = repo.git_ref.is_none() && !url::is_local(&repo.url);
        debug!(url = %repo.url, shallow, "Cloning template repository");

        let describe = |e: git2::Error| source::unavailable(repo.to_string(), url::describe_error(&e));
        let repository = clone(&repo.url, temp.path(), shallow).map_err(describe)?;
        if let Some(git_ref) = &repo.git_ref {
            checkout(&repository, git_ref).map_err(describe)?;
        }

        let tree = FileTree::from_dir(temp.path())?;
        debug!(repo = %repo, files = tree.len(), "Read template repository");
        Ok(tree)
    }
}

fn clone(url: &str, dest: &Path, shallow: bool) -> std::result::Result<Repository, git2::Error> {
    let mut callbacks = RemoteCallbacks::new();
    auth::configure(&mut callbacks);

    let mut fetch_options = FetchOptions::new();
    fetch_options.remote_callbacks(callbacks);
    if shallow {
        fetch_options.depth(1);
    }

    RepoBuilder::new()
        .fetch_options(fetch_options)
        .clone(&url::for_clone(url), dest)
}

/// Check out `git_ref` (branch, tag, or SHA) as a detached HEAD.
fn checkout(repo: &Repository, git_ref: &str) -> std::result::Result<(), git2::Error> {
    let object = repo
        .revparse_single(git_ref)
        .or_else(|_| repo.revparse_single(&format!("origin/{git_ref}")))?;
    let commit = object.peel_to_commit()?;

    repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().force()))?;
    repo.set_head_detached(commit.id())?;
    debug!(git_ref, sha = %commit.id(), "Checked out ref");
    Ok(())
}
