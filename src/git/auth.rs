//! Credential callbacks for template repository clones
//!
//! Credentials come from git's own mechanisms only: the SSH agent, keys under
//! `~/.ssh/`, and configured credential helpers.

use git2::{Cred, CredentialType, Error, ErrorClass, ErrorCode, RemoteCallbacks};

const SSH_KEY_NAMES: &[&str] = &["id_ed25519", "id_rsa", "id_ecdsa"];

fn auth_failed(message: &str) -> Error {
    Error::new(ErrorCode::Auth, ErrorClass::Http, message)
}

fn ssh_key_from_home(username: &str) -> Result<Cred, Error> {
    let ssh_dir = dirs::home_dir().unwrap_or_default().join(".ssh");

    SSH_KEY_NAMES
        .iter()
        .map(|name| (ssh_dir.join(name), ssh_dir.join(format!("{name}.pub"))))
        .filter(|(private_key, _)| private_key.exists())
        .find_map(|(private_key, public_key)| {
            let public_key = public_key.exists().then_some(public_key.as_path());
            Cred::ssh_key(username, public_key, &private_key, None).ok()
        })
        .ok_or_else(|| auth_failed("no usable SSH key in ~/.ssh"))
}

fn helper_credentials(url: &str, username: Option<&str>) -> Result<Cred, Error> {
    let config = git2::Config::open_default().or_else(|_| git2::Config::new())?;

    Cred::credential_helper(&config, url, username)
        .or_else(|_| Cred::userpass_plaintext(username.unwrap_or_default(), ""))
        .map_err(|_| auth_failed("authentication failed"))
}

/// Install credential callbacks on `callbacks`.
pub fn configure(callbacks: &mut RemoteCallbacks<'_>) {
    callbacks.credentials(|url, username_from_url, allowed| {
        if allowed.contains(CredentialType::DEFAULT) {
            return Cred::default();
        }

        if allowed.contains(CredentialType::SSH_KEY) {
            let username = username_from_url.unwrap_or("git");
            return Cred::ssh_key_from_agent(username).or_else(|_| ssh_key_from_home(username));
        }

        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            return helper_credentials(url, username_from_url);
        }

        Err(auth_failed("no supported credential type"))
    });
}
