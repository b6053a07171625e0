//! # Kegmon (IoT keg telemetry backend)
//!
//! `kegmon` is the backend for a small fleet of keg sensors. Devices report
//! readings over HTTP and users authenticate to view them.
//!
//! ## Authentication
//!
//! Credentials are salted bcrypt hashes; plaintext passwords are never
//! persisted. A successful login (or registration, which auto-logs-in) issues
//! a bearer session token: a UUID v4 with an absolute expiry 90 days out.
//! Sessions are never extended; expired tokens are evicted lazily on their
//! first failed validation.
//!
//! ## API dispatch
//!
//! All API calls go through `/api/1.0/<resource>`. The dispatcher maps
//! `(verb, resource)` to exactly one handler, checks the handler's required
//! parameters in order (failing fast on the first missing key), validates the
//! session token for protected resources, and only then runs business logic.
//!
//! ## Persistence
//!
//! Every read and write goes through the [`storage::Store`] trait; nothing is
//! cached in-process across requests. The backing engine (PostgreSQL, SQLite,
//! or in-memory) is chosen from the DSN scheme at startup, and uniqueness of
//! usernames and session tokens is enforced by the store itself.

pub mod api;
pub mod cli;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        // Should be a hex string (full SHA-1 is 40 chars, but could be short)
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }
}
