use kestrel_core::{ChangedFile, KestrelError, PrContext};
use serde::Deserialize;

const GITHUB_API_BASE: &str = "https://api.github.com";
const FILES_PER_PAGE: usize = 100;

/// File extensions never sent to the reviewer.
///
/// Diffs for these are binary noise at best; the file still counts toward
/// the PR's `changed_files` total reported by the API.
pub const BINARY_EXTENSIONS: &[&str] = &[
    ".png", ".jpg", ".jpeg", ".gif", ".svg", ".ico", ".pdf", ".zip", ".gz", ".tar", ".jar",
    ".class", ".dll", ".exe",
];

/// Check whether a path ends in one of the fixed binary extensions.
///
/// # Examples
///
/// ```
/// use kestrel_review::github::is_binary_path;
///
/// assert!(is_binary_path("docs/image.png"));
/// assert!(!is_binary_path("src/main.py"));
/// ```
pub fn is_binary_path(path: &str) -> bool {
    BINARY_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

/// GitHub pull request client for collecting diffs and posting the review.
///
/// # Examples
///
/// ```
/// use kestrel_review::github::parse_repo_name;
///
/// let (owner, repo) = parse_repo_name("octocat/hello-world").unwrap();
/// assert_eq!(owner, "octocat");
/// assert_eq!(repo, "hello-world");
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    http: reqwest::Client,
    token: String,
}

#[derive(Deserialize)]
struct PullResponse {
    title: Option<String>,
    body: Option<String>,
    state: String,
    user: Option<UserRef>,
    base: BranchRef,
    head: BranchRef,
    commits: u64,
    additions: u64,
    deletions: u64,
    changed_files: u64,
}

#[derive(Deserialize)]
struct BranchRef {
    #[serde(rename = "ref")]
    name: String,
}

#[derive(Deserialize)]
struct UserRef {
    login: String,
}

#[derive(Deserialize)]
struct FileEntry {
    filename: String,
    status: String,
    additions: u64,
    deletions: u64,
    patch: Option<String>,
}

impl GitHubClient {
    /// Create a client from an explicit token or the `GITHUB_TOKEN` environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`KestrelError::Config`] if no token is available, or
    /// [`KestrelError::GitHub`] if the client cannot be built.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use kestrel_review::github::GitHubClient;
    ///
    /// let client = GitHubClient::new(Some("ghp_xxxx")).unwrap();
    /// ```
    pub fn new(token: Option<&str>) -> Result<Self, KestrelError> {
        let token = match token {
            Some(t) => t.to_string(),
            None => std::env::var("GITHUB_TOKEN").map_err(|_| {
                KestrelError::Config(
                    "GITHUB_TOKEN not set. Pass --github-token or set GITHUB_TOKEN env var".into(),
                )
            })?,
        };

        let octocrab = octocrab::Octocrab::builder()
            .personal_token(token.clone())
            .build()
            .map_err(|e| KestrelError::GitHub(format!("failed to create GitHub client: {e}")))?;

        let http = reqwest::Client::new();

        Ok(Self {
            octocrab,
            http,
            token,
        })
    }

    /// Fetch pull request metadata and per-file diffs into a [`PrContext`].
    ///
    /// Files with a binary extension are excluded; files the API returns
    /// without a `patch` get an empty diff.
    ///
    /// # Errors
    ///
    /// Returns [`KestrelError::GitHub`] on network or API errors. There is no
    /// retry; the first failure aborts the run.
    pub async fn fetch_pr_context(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<PrContext, KestrelError> {
        let url = format!("{GITHUB_API_BASE}/repos/{owner}/{repo}/pulls/{pr_number}");
        let pull: PullResponse = self.get_json(&url).await?;

        let files = self.fetch_changed_files(owner, repo, pr_number).await?;

        Ok(PrContext {
            title: pull.title.unwrap_or_default(),
            description: pull.body.unwrap_or_default(),
            state: pull.state,
            author: pull.user.map(|u| u.login).unwrap_or_default(),
            base_branch: pull.base.name,
            head_branch: pull.head.name,
            commits: pull.commits,
            additions: pull.additions,
            deletions: pull.deletions,
            changed_files: pull.changed_files,
            files,
        })
    }

    /// List the pull request's changed files, excluding binary extensions.
    ///
    /// # Errors
    ///
    /// Returns [`KestrelError::GitHub`] on network or API errors.
    pub async fn fetch_changed_files(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> Result<Vec<ChangedFile>, KestrelError> {
        let mut files = Vec::new();
        let mut page = 1u32;

        loop {
            let url = format!(
                "{GITHUB_API_BASE}/repos/{owner}/{repo}/pulls/{pr_number}/files\
                 ?per_page={FILES_PER_PAGE}&page={page}"
            );
            let batch: Vec<FileEntry> = self.get_json(&url).await?;
            let batch_len = batch.len();

            for entry in batch {
                if is_binary_path(&entry.filename) {
                    continue;
                }
                files.push(ChangedFile {
                    path: entry.filename,
                    status: entry.status,
                    additions: entry.additions,
                    deletions: entry.deletions,
                    patch: entry.patch.unwrap_or_default(),
                });
            }

            if batch_len < FILES_PER_PAGE {
                break;
            }
            page += 1;
        }

        Ok(files)
    }

    /// Post the rendered review as a new issue comment on the pull request.
    ///
    /// Always creates a new comment; previous bot comments are left alone.
    ///
    /// # Errors
    ///
    /// Returns [`KestrelError::GitHub`] on API errors.
    pub async fn post_comment(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        body: &str,
    ) -> Result<(), KestrelError> {
        let route = format!("/repos/{owner}/{repo}/issues/{pr_number}/comments");
        let payload = serde_json::json!({ "body": body });

        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&payload))
            .await
            .map_err(|e| KestrelError::GitHub(format!("failed to post comment: {e}")))?;

        Ok(())
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<T, KestrelError> {
        let response = self
            .http
            .get(url)
            .header("Accept", "application/vnd.github+json")
            .header("Authorization", format!("Bearer {}", self.token))
            .header("User-Agent", "kestrel")
            .send()
            .await
            .map_err(|e| KestrelError::GitHub(format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(KestrelError::GitHub(format!(
                "GitHub API error {status}: {body}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| KestrelError::GitHub(format!("failed to parse response: {e}")))
    }
}

/// Parse a repository identifier (`owner/repo`) into its components.
///
/// # Errors
///
/// Returns [`KestrelError::Config`] if the format is invalid.
///
/// # Examples
///
/// ```
/// use kestrel_review::github::parse_repo_name;
///
/// let (owner, repo) = parse_repo_name("rust-lang/rust").unwrap();
/// assert_eq!(owner, "rust-lang");
/// assert_eq!(repo, "rust");
/// ```
pub fn parse_repo_name(repo_name: &str) -> Result<(String, String), KestrelError> {
    let Some((owner, repo)) = repo_name.split_once('/') else {
        return Err(KestrelError::Config(format!(
            "invalid repository name '{repo_name}', expected owner/repo"
        )));
    };
    if owner.is_empty() || repo.is_empty() || repo.contains('/') {
        return Err(KestrelError::Config(format!(
            "invalid repository name '{repo_name}', expected owner/repo"
        )));
    }
    Ok((owner.to_string(), repo.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_repo_name() {
        let (owner, repo) = parse_repo_name("rust-lang/rust").unwrap();
        assert_eq!(owner, "rust-lang");
        assert_eq!(repo, "rust");
    }

    #[test]
    fn parse_repo_name_missing_slash() {
        assert!(parse_repo_name("rust").is_err());
    }

    #[test]
    fn parse_repo_name_empty_components() {
        assert!(parse_repo_name("/repo").is_err());
        assert!(parse_repo_name("owner/").is_err());
    }

    #[test]
    fn parse_repo_name_extra_slash() {
        assert!(parse_repo_name("a/b/c").is_err());
    }

    #[test]
    fn every_binary_extension_is_excluded() {
        for ext in BINARY_EXTENSIONS {
            let path = format!("assets/file{ext}");
            assert!(is_binary_path(&path), "expected {path} to be excluded");
        }
    }

    #[test]
    fn text_files_are_kept() {
        for path in ["main.py", "src/lib.rs", "README.md", "a/b/c.ts", "Makefile"] {
            assert!(!is_binary_path(path), "expected {path} to be kept");
        }
    }

    #[test]
    fn extension_match_is_suffix_only() {
        // The extension has to end the name, not merely appear in it.
        assert!(!is_binary_path("png_decoder.rs"));
        assert!(!is_binary_path("src/exe/runner.rs"));
        assert!(is_binary_path("nested/archive.tar"));
    }
}
