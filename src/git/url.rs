//! Clone URL normalization and error wording

use std::borrow::Cow;

use git2::{Error, ErrorClass};

/// Rewrite SCP-style `git@host:owner/name.git` to `ssh://git@host/owner/name.git`.
pub fn normalize_ssh(url: &str) -> Cow<'_, str> {
    if !url.starts_with("git@") {
        return Cow::Borrowed(url);
    }
    match url.split_once(':') {
        Some((host, path)) => {
            let path = path.strip_prefix('/').unwrap_or(path);
            Cow::Owned(format!("ssh://{host}/{path}"))
        }
        None => Cow::Borrowed(url),
    }
}

/// Give `file://` URLs the three slashes libgit2 expects.
pub fn normalize_file(url: &str) -> Cow<'_, str> {
    let Some(rest) = url.strip_prefix("file://") else {
        return Cow::Borrowed(url);
    };
    if rest.contains('\\') {
        return Cow::Owned(format!("file:///{}", rest.replace('\\', "/").trim_start_matches('/')));
    }
    if !rest.is_empty() && !rest.starts_with('/') {
        return Cow::Owned(format!("file:///{rest}"));
    }
    Cow::Borrowed(url)
}

/// URL handed to libgit2
pub fn for_clone(url: &str) -> String {
    normalize_file(&normalize_ssh(url)).into_owned()
}

/// Whether `url` names a repository on the local file system
pub fn is_local(url: &str) -> bool {
    url.starts_with("file://") || url.starts_with('/') || std::path::Path::new(url).is_absolute()
}

/// Short, user-facing reason for a failed clone or checkout
pub fn describe_error(err: &Error) -> String {
    let message = err.message().to_lowercase();

    let summary = if message.contains("not found") || message.contains("404") {
        "repository not found"
    } else if message.contains("authentication") || message.contains("credentials") {
        "authentication failed"
    } else if message.contains("permission denied") || message.contains("access denied") {
        "permission denied"
    } else if message.contains("connection")
        || message.contains("network")
        || message.contains("timed out")
        || message.contains("timeout")
    {
        "network error"
    } else if err.class() == ErrorClass::Http
        && (message.contains("certificate") || message.contains("ssl"))
    {
        "TLS error"
    } else {
        return err.message().to_string();
    };

    format!("{summary} ({})", err.message())
}
