// Error types returned by the catbox client. Library code returns these;
// the binary wraps them in `anyhow` at the top.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatboxError>;

#[derive(Error, Debug)]
pub enum CatboxError {
    /// An operation that needs an account was called on an anonymous client.
    #[error("a userhash must be specified to use the `{caller}` method")]
    MissingUserhash { caller: &'static str },

    /// The delete request joins names with spaces, so a name may not hold one.
    #[error("files cannot have spaces in their name: `{name}` is an invalid file name")]
    InvalidFileName { name: String },

    #[error("could not delete one or more files (status: {status} {message}): {}", .files.join(" "))]
    DeleteFailed {
        status: u16,
        message: String,
        files: Vec<String>,
    },

    #[error("failed to read `{}`: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("request to catbox failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("settings error: {0}")]
    Settings(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_failed_lists_every_requested_file() {
        let err = CatboxError::DeleteFailed {
            status: 400,
            message: "Bad Request".into(),
            files: vec!["a.png".into(), "b.png".into()],
        };
        assert_eq!(
            err.to_string(),
            "could not delete one or more files (status: 400 Bad Request): a.png b.png"
        );
    }

    #[test]
    fn missing_userhash_names_the_caller() {
        let err = CatboxError::MissingUserhash { caller: "delete_files" };
        assert!(err.to_string().contains("`delete_files`"));
    }
}
