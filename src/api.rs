// API client module: a small blocking HTTP client for the catbox.moe
// user API. Every operation is one multipart POST to the same endpoint;
// the service answers with plain text.

use hyper::ext::ReasonPhrase;
use reqwest::blocking::{multipart, Client, Response};
use reqwest::{StatusCode, Url};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::{CatboxError, Result};

/// Public catbox endpoint used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "https://catbox.moe/user/api.php";

/// Catbox API client. Holds the reqwest blocking client, the endpoint and
/// an optional userhash. Cloning is cheap and clones share the connection
/// handle.
#[derive(Clone, Debug)]
pub struct CatboxClient {
    client: Client,
    api_url: String,
    userhash: Option<String>,
}

/// Value of a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FormValue {
    Text(String),
    File(PathBuf),
}

/// Form field; `None` values are left out of the request body.
type FormField = (&'static str, Option<FormValue>);

/// What came back from the service, with the body already read in full.
#[derive(Debug)]
struct ServiceResponse {
    status: StatusCode,
    /// Reason phrase from the status line as the server sent it.
    message: String,
    body: String,
}

/// hyper only keeps the reason phrase when it differs from the canonical one.
fn status_message(res: &Response) -> String {
    match res.extensions().get::<ReasonPhrase>() {
        Some(reason) => String::from_utf8_lossy(reason.as_bytes()).into_owned(),
        None => res
            .status()
            .canonical_reason()
            .unwrap_or("Unknown Status")
            .to_string(),
    }
}

/// Interpretation of an upload response body. Catbox answers uploads with
/// 200 either way, so the only signal is the text itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The file is hosted at this URL.
    Hosted(String),
    /// The service sent back something that is not a URL, usually an error.
    Rejected(String),
}

impl UploadOutcome {
    pub fn from_body(body: &str) -> Self {
        let trimmed = body.trim();
        match Url::parse(trimmed) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
                UploadOutcome::Hosted(trimmed.to_string())
            }
            _ => UploadOutcome::Rejected(trimmed.to_string()),
        }
    }

    pub fn is_hosted(&self) -> bool {
        matches!(self, UploadOutcome::Hosted(_))
    }
}

impl CatboxClient {
    /// Client against the public catbox API.
    pub fn new(userhash: Option<String>) -> Result<Self> {
        Self::with_api_url(userhash, DEFAULT_API_URL)
    }

    /// Client against an arbitrary endpoint (a mirror, or a test server).
    pub fn with_api_url(userhash: Option<String>, api_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("catbox-cli/", env!("CARGO_PKG_VERSION")))
            .timeout(None)
            .build()?;
        Ok(CatboxClient {
            client,
            api_url: api_url.into(),
            userhash,
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Self::with_api_url(settings.userhash.clone(), settings.api_url())
    }

    /// Same endpoint and connection handle, different account.
    pub fn with_userhash(&self, userhash: Option<String>) -> Self {
        CatboxClient {
            client: self.client.clone(),
            api_url: self.api_url.clone(),
            userhash,
        }
    }

    pub fn userhash(&self) -> Option<&str> {
        self.userhash.as_deref()
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Upload a local file. Returns the response text: the hosted URL on
    /// success, the service's error message otherwise.
    pub fn upload_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let fields = vec![
            ("reqtype", Some(FormValue::Text("fileupload".into()))),
            ("userhash", self.userhash_field()),
            ("fileToUpload", Some(FormValue::File(path.to_path_buf()))),
        ];
        let res = self.send(fields)?;
        info!(path = %path.display(), status = %res.status, "file upload finished");
        Ok(res.body)
    }

    /// Have catbox fetch and host the file at `url`. Returns the response
    /// text, same as `upload_file`.
    pub fn upload_url(&self, url: &str) -> Result<String> {
        let fields = vec![
            ("reqtype", Some(FormValue::Text("urlupload".into()))),
            ("userhash", self.userhash_field()),
            ("url", Some(FormValue::Text(url.to_string()))),
        ];
        let res = self.send(fields)?;
        info!(url, status = %res.status, "url upload finished");
        Ok(res.body)
    }

    /// Delete files owned by this client's account. Needs a userhash.
    pub fn delete_files<S: AsRef<str>>(&self, files: &[S]) -> Result<bool> {
        let userhash = self.require_userhash("delete_files")?;

        let files: Vec<String> = files.iter().map(|f| f.as_ref().to_string()).collect();
        if let Some(bad) = files.iter().find(|f| f.contains(' ')) {
            return Err(CatboxError::InvalidFileName { name: bad.clone() });
        }

        let fields = vec![
            ("reqtype", Some(FormValue::Text("deletefiles".into()))),
            ("userhash", Some(FormValue::Text(userhash.to_string()))),
            ("files", Some(FormValue::Text(files.join(" ")))),
        ];
        let res = self.send(fields)?;

        if res.status == StatusCode::OK {
            info!(count = files.len(), "deleted files");
            Ok(true)
        } else {
            warn!(status = %res.status, body = %res.body, "delete rejected");
            Err(CatboxError::DeleteFailed {
                status: res.status.as_u16(),
                message: res.message,
                files,
            })
        }
    }

    /// Fails unless a non-empty userhash is configured.
    fn require_userhash(&self, caller: &'static str) -> Result<&str> {
        match self.userhash.as_deref() {
            Some(hash) if !hash.is_empty() => Ok(hash),
            _ => Err(CatboxError::MissingUserhash { caller }),
        }
    }

    fn userhash_field(&self) -> Option<FormValue> {
        self.userhash.clone().map(FormValue::Text)
    }

    /// POST the fields as multipart/form-data and read the whole reply.
    fn send(&self, fields: Vec<FormField>) -> Result<ServiceResponse> {
        let form = build_form(fields)?;

        debug!(api_url = %self.api_url, "sending catbox request");
        let res = self.client.post(&self.api_url).multipart(form).send()?;
        let status = res.status();
        let message = status_message(&res);
        let body = res.text()?;
        debug!(%status, %message, len = body.len(), "catbox responded");

        Ok(ServiceResponse {
            status,
            message,
            body,
        })
    }
}

fn build_form(fields: Vec<FormField>) -> Result<multipart::Form> {
    let mut form = multipart::Form::new();
    for (name, value) in fields {
        form = match value {
            None => continue,
            Some(FormValue::Text(text)) => form.text(name, text),
            Some(FormValue::File(path)) => form.part(name, file_part(&path)?),
        };
    }
    Ok(form)
}

/// Open the file and wrap it in a part. Regular files get a known length so
/// the body is not sent chunked; pipes and other special files report a
/// bogus size and are streamed instead.
fn file_part(path: &Path) -> Result<multipart::Part> {
    let io_err = |source| CatboxError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(io_err)?;
    let metadata = file.metadata().map_err(io_err)?;
    let file_name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("upload")
        .to_string();

    let part = match known_length(&metadata) {
        Some(len) => multipart::Part::reader_with_length(file, len),
        None => multipart::Part::reader(file),
    };
    Ok(part.file_name(file_name))
}

fn known_length(metadata: &std::fs::Metadata) -> Option<u64> {
    metadata.is_file().then(|| metadata.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(userhash: Option<&str>) -> CatboxClient {
        CatboxClient::new(userhash.map(String::from)).unwrap()
    }

    #[test]
    fn anonymous_client_leaves_userhash_out() {
        assert_eq!(client(None).userhash_field(), None);
        assert_eq!(
            client(Some("abc")).userhash_field(),
            Some(FormValue::Text("abc".into()))
        );
    }

    #[test]
    fn empty_userhash_does_not_count_as_credential() {
        let err = client(Some("")).require_userhash("delete_files").unwrap_err();
        assert!(matches!(
            err,
            CatboxError::MissingUserhash { caller: "delete_files" }
        ));
        assert_eq!(client(Some("abc")).require_userhash("x").unwrap(), "abc");
    }

    #[test]
    fn first_name_with_space_is_reported() {
        let err = client(Some("abc"))
            .delete_files(&["ok.png", "a b.png", "c d.png"])
            .unwrap_err();
        match err {
            CatboxError::InvalidFileName { name } => assert_eq!(name, "a b.png"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_upload_file_is_an_io_error() {
        let err = build_form(vec![(
            "fileToUpload",
            Some(FormValue::File(PathBuf::from("/definitely/not/here.png"))),
        )])
        .unwrap_err();
        assert!(matches!(err, CatboxError::Io { .. }));
    }

    #[test]
    fn only_regular_files_get_a_fixed_length() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, b"12345").unwrap();
        let regular = std::fs::metadata(file.path()).unwrap();
        assert_eq!(known_length(&regular), Some(5));

        let dir = tempfile::tempdir().unwrap();
        let not_a_file = std::fs::metadata(dir.path()).unwrap();
        assert_eq!(known_length(&not_a_file), None);
    }

    #[cfg(unix)]
    #[test]
    fn character_devices_are_streamed() {
        let dev_null = std::fs::metadata("/dev/null").unwrap();
        assert_eq!(known_length(&dev_null), None);
    }

    #[test]
    fn with_userhash_keeps_endpoint() {
        let base = CatboxClient::with_api_url(None, "http://localhost:1/api.php").unwrap();
        let authed = base.with_userhash(Some("abc".into()));
        assert_eq!(authed.api_url(), "http://localhost:1/api.php");
        assert_eq!(authed.userhash(), Some("abc"));
        assert_eq!(base.userhash(), None);
    }

    #[test]
    fn classifies_upload_bodies() {
        assert_eq!(
            UploadOutcome::from_body("https://files.catbox.moe/abc123.png\n"),
            UploadOutcome::Hosted("https://files.catbox.moe/abc123.png".into())
        );
        assert!(!UploadOutcome::from_body("No files given.").is_hosted());
        assert!(!UploadOutcome::from_body("mailto:someone@example.com").is_hosted());
    }
}
