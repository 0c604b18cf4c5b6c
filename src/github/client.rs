// src/github/client.rs
// =============================================================================
// A small client for GitHub's repository "contents" API.
//
// Every operation is one or two plain HTTP exchanges:
//   check_access   GET    /repos/{owner}/{repo}
//   ensure_folder  GET    /repos/{owner}/{repo}/contents/{folder}/.gitkeep
//                  PUT    (same URL, only when the placeholder is missing)
//   upload         GET + PUT    .../contents/{folder}/{file}
//   delete         GET + DELETE .../contents/{folder}/{file}
//   list           GET    .../contents/{folder}
//
// The GET before a write fetches the file's current revision tag ("sha").
// GitHub refuses to overwrite or delete a file unless the request carries
// the sha it currently has, and refuses to create one if a sha is given.
//
// Nothing is retried: one unexpected status ends the operation and is
// handed back to the caller as ApiOutcome::Failed.
// =============================================================================

use super::error::ClientError;
use super::types::{
    ApiOutcome, DeleteContentRequest, FolderStatus, PutContentRequest, RemoteFile, UploadReport,
    WriteResponse,
};
use crate::config::Config;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use log::{debug, info, warn};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::io::ErrorKind;
use std::path::Path;
use url::Url;

const GITHUB_JSON: &str = "application/vnd.github.v3+json";

// GitHub rejects requests without a User-Agent
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

pub struct RepoClient {
    client: Client,
    config: Config,
}

impl RepoClient {
    /// Creates a client for the repository and folder described by `config`.
    ///
    /// The underlying HTTP client is created once and reused for every
    /// request (connection pooling).
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns true only when GitHub answers the repository lookup with 200.
    ///
    /// A bad token, a missing repository and a network failure all look the
    /// same to the caller: no access.
    pub async fn check_access(&self) -> bool {
        let url = match self.endpoint(&["repos", self.config.owner.as_str(), self.config.repo.as_str()]) {
            Ok(url) => url,
            Err(e) => {
                warn!("{}", e);
                return false;
            }
        };

        match self.request(Method::GET, url).send().await {
            Ok(response) if response.status() == StatusCode::OK => true,
            Ok(response) => {
                warn!("Repository check answered HTTP {}", response.status().as_u16());
                false
            }
            Err(e) => {
                warn!("Repository check failed: {}", e);
                false
            }
        }
    }

    /// Makes sure the target folder exists by creating its placeholder file
    /// when it is missing.
    pub async fn ensure_folder(&self) -> Result<ApiOutcome<FolderStatus>, ClientError> {
        let url = self.contents_url(&self.config.placeholder_path())?;

        let response = self
            .request(Method::GET, self.on_branch(url.clone()))
            .send()
            .await?;
        if response.status() == StatusCode::OK {
            debug!("Placeholder found, folder {} exists", self.config.folder);
            return Ok(ApiOutcome::Success(FolderStatus::AlreadyExists));
        }

        let body = PutContentRequest {
            message: format!("Create {} folder", self.config.folder),
            content: STANDARD.encode(b""),
            branch: &self.config.branch,
            sha: None,
        };
        let response = self.request(Method::PUT, url).json(&body).send().await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                info!("Created folder {}", self.config.folder);
                Ok(ApiOutcome::Success(FolderStatus::Created))
            }
            _ => Ok(failure(response).await),
        }
    }

    /// Uploads a local file into the target folder under its own file name,
    /// creating the remote file or overwriting the existing one.
    ///
    /// A missing local file is reported before any request is sent.
    pub async fn upload(&self, local_path: &Path) -> Result<ApiOutcome<UploadReport>, ClientError> {
        match tokio::fs::metadata(local_path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => {
                return Err(ClientError::NotAFile {
                    path: local_path.to_path_buf(),
                })
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ClientError::LocalFileNotFound {
                    path: local_path.to_path_buf(),
                })
            }
            Err(source) => {
                return Err(ClientError::LocalRead {
                    path: local_path.to_path_buf(),
                    source,
                })
            }
        }

        let name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| ClientError::NotAFile {
                path: local_path.to_path_buf(),
            })?;

        let bytes = tokio::fs::read(local_path)
            .await
            .map_err(|source| ClientError::LocalRead {
                path: local_path.to_path_buf(),
                source,
            })?;
        let content = STANDARD.encode(&bytes);

        let remote_path = self.config.remote_path(&name);
        let sha = self.current_sha(&remote_path).await?;
        match &sha {
            Some(_) => info!("Updating existing file {} ({} bytes)", remote_path, bytes.len()),
            None => info!("Uploading new file {} ({} bytes)", remote_path, bytes.len()),
        }

        let replaced = sha.is_some();
        let body = PutContentRequest {
            message: format!("Upload {}", name),
            content,
            branch: &self.config.branch,
            sha,
        };
        let url = self.contents_url(&remote_path)?;
        let response = self.request(Method::PUT, url).json(&body).send().await?;

        match response.status() {
            StatusCode::OK | StatusCode::CREATED => {
                let written: WriteResponse = response.json().await?;
                Ok(ApiOutcome::Success(UploadReport {
                    remote_path,
                    replaced,
                    download_url: written.content.download_url,
                }))
            }
            _ => Ok(failure(response).await),
        }
    }

    /// Deletes `filename` from the target folder.
    ///
    /// Returns NotFound, without sending a DELETE, when the file's current
    /// revision tag can't be fetched.
    pub async fn delete(&self, filename: &str) -> Result<ApiOutcome<()>, ClientError> {
        let remote_path = self.config.remote_path(filename);
        let Some(sha) = self.current_sha(&remote_path).await? else {
            return Ok(ApiOutcome::NotFound);
        };

        let body = DeleteContentRequest {
            message: format!("Delete {}", filename),
            sha,
            branch: &self.config.branch,
        };
        let url = self.contents_url(&remote_path)?;
        let response = self.request(Method::DELETE, url).json(&body).send().await?;

        if response.status() == StatusCode::OK {
            info!("Deleted {}", remote_path);
            Ok(ApiOutcome::Success(()))
        } else {
            Ok(failure(response).await)
        }
    }

    /// Lists the entries of the target folder, in the order GitHub returns them.
    pub async fn list(&self) -> Result<ApiOutcome<Vec<RemoteFile>>, ClientError> {
        let url = self.on_branch(self.contents_url(&self.config.folder)?);
        let response = self.request(Method::GET, url).send().await?;

        if response.status() == StatusCode::OK {
            let files: Vec<RemoteFile> = response.json().await?;
            debug!("Folder {} has {} entries", self.config.folder, files.len());
            for file in &files {
                debug!("  {} {} ({} bytes)", file.sha, file.name, file.size);
            }
            Ok(ApiOutcome::Success(files))
        } else {
            Ok(failure(response).await)
        }
    }

    // Current revision tag of a file, or None when GitHub doesn't answer 200
    async fn current_sha(&self, remote_path: &str) -> Result<Option<String>, ClientError> {
        let url = self.on_branch(self.contents_url(remote_path)?);
        let response = self.request(Method::GET, url).send().await?;

        if response.status() != StatusCode::OK {
            debug!("{} lookup answered HTTP {}", remote_path, response.status().as_u16());
            return Ok(None);
        }

        // A directory answers with an array, which has no sha
        let value: Value = response.json().await?;
        Ok(value.get("sha").and_then(Value::as_str).map(str::to_string))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        let request = self.client.request(method, url).header(ACCEPT, GITHUB_JSON);
        if self.config.token.is_empty() {
            request
        } else {
            request.header(AUTHORIZATION, format!("token {}", self.config.token))
        }
    }

    // .../repos/{owner}/{repo}/contents/{path}, one segment per path component
    fn contents_url(&self, path: &str) -> Result<Url, ClientError> {
        let mut segments = vec![
            "repos",
            self.config.owner.as_str(),
            self.config.repo.as_str(),
            "contents",
        ];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        self.endpoint(&segments)
    }

    // Appends percent-encoded segments to the API base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.config.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.config.api_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    // Reads go to the configured branch, not the repository's default one
    fn on_branch(&self, mut url: Url) -> Url {
        url.query_pairs_mut().append_pair("ref", &self.config.branch);
        url
    }
}

async fn failure<T>(response: Response) -> ApiOutcome<T> {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    warn!("GitHub answered HTTP {}", status);
    ApiOutcome::Failed { status, body }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Result<ApiOutcome<T>, ClientError> and not just one of them?
//    - Err means we never got a usable answer (no network, unreadable file)
//    - Ok(Failed { .. }) means GitHub answered, just not the way we hoped
//    - Callers print both, but only the second carries a status and body
//
// 2. What is `let Some(sha) = ... else { ... };`?
//    - "let-else": bind the value if the pattern matches, otherwise run the
//      else block, which must leave the function (return, break...)
//
// 3. Why does response.json() consume the response?
//    - The body is a stream that can only be read once, so reading it takes
//      ownership of the Response
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PHOTO_PATH: &str = "/repos/octo/pics/contents/image/photo.png";

    fn client_for(server: &MockServer) -> RepoClient {
        let config = Config::new(&server.uri(), "octo", "pics", "main", "image", "test-token").unwrap();
        RepoClient::new(config).unwrap()
    }

    fn file_json(name: &str, sha: &str, size: u64) -> Value {
        json!({
            "name": name,
            "path": format!("image/{}", name),
            "sha": sha,
            "size": size,
            "type": "file",
            "download_url": format!("https://raw.githubusercontent.com/octo/pics/main/image/{}", name)
        })
    }

    // A local file whose name ends in photo.png is awkward with tempfile,
    // so put one inside a temp dir instead
    fn local_photo(bytes: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("photo.png");
        std::fs::write(&file_path, bytes).unwrap();
        (dir, file_path)
    }

    async fn requests_with_method(server: &MockServer, verb: &str) -> Vec<wiremock::Request> {
        server
            .received_requests()
            .await
            .unwrap()
            .into_iter()
            .filter(|r| r.method.as_str() == verb)
            .collect()
    }

    #[tokio::test]
    async fn test_check_access_ok() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/pics"))
            .and(header("authorization", "token test-token"))
            .and(header("accept", GITHUB_JSON))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"full_name": "octo/pics"})))
            .expect(1)
            .mount(&server)
            .await;

        assert!(client_for(&server).check_access().await);
    }

    #[tokio::test]
    async fn test_check_access_denied() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/pics"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Bad credentials"))
            .mount(&server)
            .await;

        assert!(!client_for(&server).check_access().await);
    }

    #[tokio::test]
    async fn test_check_access_network_error_is_no_access() {
        // Nothing listens on port 9 (discard) on the loopback interface
        let config = Config::new("http://127.0.0.1:9", "octo", "pics", "main", "image", "").unwrap();
        let client = RepoClient::new(config).unwrap();
        assert!(!client.check_access().await);
    }

    #[tokio::test]
    async fn test_ensure_folder_existing_does_not_write() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/pics/contents/image/.gitkeep"))
            .and(query_param("ref", "main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_json(".gitkeep", "k1", 0)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = client_for(&server).ensure_folder().await.unwrap();
        assert_eq!(outcome, ApiOutcome::Success(FolderStatus::AlreadyExists));
    }

    #[tokio::test]
    async fn test_ensure_folder_creates_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/pics/contents/image/.gitkeep"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/repos/octo/pics/contents/image/.gitkeep"))
            .and(body_json(json!({
                "message": "Create image folder",
                "content": "",
                "branch": "main"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "content": file_json(".gitkeep", "k1", 0)
            })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client_for(&server).ensure_folder().await.unwrap();
        assert_eq!(outcome, ApiOutcome::Success(FolderStatus::Created));
    }

    #[tokio::test]
    async fn test_ensure_folder_creation_failure() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(409).set_body_string("conflict"))
            .mount(&server)
            .await;

        let outcome = client_for(&server).ensure_folder().await.unwrap();
        assert_eq!(
            outcome,
            ApiOutcome::Failed {
                status: 409,
                body: "conflict".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_upload_missing_local_file_sends_nothing() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.png");

        let result = client_for(&server).upload(&missing).await;

        assert!(matches!(result, Err(ClientError::LocalFileNotFound { .. })));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_directory_is_rejected() {
        let server = MockServer::start().await;
        let dir = tempfile::tempdir().unwrap();

        let result = client_for(&server).upload(dir.path()).await;

        assert!(matches!(result, Err(ClientError::NotAFile { .. })));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_new_file_has_no_sha() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PHOTO_PATH))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(PHOTO_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "content": file_json("photo.png", "new-sha", 3)
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, local) = local_photo(b"png");
        let outcome = client_for(&server).upload(&local).await.unwrap();

        assert_eq!(
            outcome,
            ApiOutcome::Success(UploadReport {
                remote_path: "image/photo.png".to_string(),
                replaced: false,
                download_url: Some(
                    "https://raw.githubusercontent.com/octo/pics/main/image/photo.png".to_string()
                ),
            })
        );

        let puts = requests_with_method(&server, "PUT").await;
        let body: Value = puts[0].body_json().unwrap();
        assert!(body.get("sha").is_none());
        assert_eq!(body["content"], STANDARD.encode(b"png"));
        assert_eq!(body["message"], "Upload photo.png");
        assert_eq!(body["branch"], "main");
    }

    #[tokio::test]
    async fn test_upload_existing_file_sends_fetched_sha() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PHOTO_PATH))
            .and(query_param("ref", "main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_json("photo.png", "old-sha", 10)))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path(PHOTO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": file_json("photo.png", "new-sha", 4)
            })))
            .expect(1)
            .mount(&server)
            .await;

        let (_dir, local) = local_photo(b"png2");
        let outcome = client_for(&server).upload(&local).await.unwrap();

        match outcome {
            ApiOutcome::Success(report) => assert!(report.replaced),
            other => panic!("unexpected outcome: {:?}", other),
        }
        let puts = requests_with_method(&server, "PUT").await;
        let body: Value = puts[0].body_json().unwrap();
        assert_eq!(body["sha"], "old-sha");
    }

    #[tokio::test]
    async fn test_upload_rejected_returns_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(422).set_body_string("sha wasn't supplied"))
            .mount(&server)
            .await;

        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"data").unwrap();
        let outcome = client_for(&server).upload(file.path()).await.unwrap();

        assert_eq!(
            outcome,
            ApiOutcome::Failed {
                status: 422,
                body: "sha wasn't supplied".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_delete_missing_file_sends_no_delete() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PHOTO_PATH))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = client_for(&server).delete("photo.png").await.unwrap();
        assert_eq!(outcome, ApiOutcome::NotFound);
    }

    #[tokio::test]
    async fn test_delete_existing_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(PHOTO_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_json("photo.png", "abc", 3)))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path(PHOTO_PATH))
            .and(body_json(json!({
                "message": "Delete photo.png",
                "sha": "abc",
                "branch": "main"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": null})))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = client_for(&server).delete("photo.png").await.unwrap();
        assert_eq!(outcome, ApiOutcome::Success(()));
    }

    #[tokio::test]
    async fn test_delete_non_200_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(file_json("photo.png", "abc", 3)))
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(409).set_body_string("conflict"))
            .mount(&server)
            .await;

        let outcome = client_for(&server).delete("photo.png").await.unwrap();
        assert_eq!(
            outcome,
            ApiOutcome::Failed {
                status: 409,
                body: "conflict".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_list_returns_entries_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/octo/pics/contents/image"))
            .and(query_param("ref", "main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                file_json(".gitkeep", "k", 0),
                file_json("photo.png", "p", 2048)
            ])))
            .mount(&server)
            .await;

        let outcome = client_for(&server).list().await.unwrap();
        match outcome {
            ApiOutcome::Success(files) => {
                let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
                assert_eq!(names, vec![".gitkeep", "photo.png"]);
                assert_eq!(files[1].size, 2048);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_list_failure_keeps_raw_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string(r#"{"message":"Not Found"}"#))
            .mount(&server)
            .await;

        let outcome = client_for(&server).list().await.unwrap();
        assert_eq!(
            outcome,
            ApiOutcome::Failed {
                status: 404,
                body: r#"{"message":"Not Found"}"#.to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_token_header_is_omitted_when_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let config = Config::new(&server.uri(), "octo", "pics", "main", "image", "").unwrap();
        assert!(RepoClient::new(config).unwrap().check_access().await);

        let requests = server.received_requests().await.unwrap();
        assert!(!requests[0].headers.contains_key("authorization"));
    }

    #[test]
    fn test_contents_url_encodes_segments() {
        let config = Config::new("https://ghe.example.com/api/v3/", "octo", "pics", "main", "my images", "").unwrap();
        let client = RepoClient::new(config).unwrap();
        let url = client.contents_url("my images/a b.png").unwrap();
        assert_eq!(
            url.as_str(),
            "https://ghe.example.com/api/v3/repos/octo/pics/contents/my%20images/a%20b.png"
        );
    }
}
