//! Common test utilities and helpers for forksync tests
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use forksync::Config;

/// Run a git command in `dir`, panicking on failure. Identity and default
/// branch are pinned so fixtures behave the same on any git installation.
pub fn git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args([
            "-c",
            "user.name=forksync-test",
            "-c",
            "user.email=forksync-test@example.com",
            "-c",
            "init.defaultBranch=master",
        ])
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");

    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
}

/// Run a git command in `dir` and return its trimmed stdout.
pub fn git_stdout(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run git");

    assert!(
        output.status.success(),
        "git {:?} failed in {}: {}",
        args,
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// A parent repository, a server-side fork of it, and a local clone of the
/// fork, all as plain directories under `root`.
pub struct ForkFixture {
    pub parent_bare: PathBuf,
    pub fork_bare: PathBuf,
    pub clone_dir: PathBuf,
}

/// Build the fixture: seed a repository with one commit on master, make a
/// bare "parent", a bare "fork" of it, and clone the fork locally.
pub fn setup_fork_fixture(root: &Path) -> ForkFixture {
    let seed = root.join("seed");
    std::fs::create_dir(&seed).unwrap();
    git(&seed, &["init", "--quiet"]);
    std::fs::write(seed.join("README.md"), "widgets\n").unwrap();
    git(&seed, &["add", "README.md"]);
    git(&seed, &["commit", "--quiet", "-m", "initial commit"]);

    git(root, &["clone", "--quiet", "--bare", "seed", "parent.git"]);
    git(root, &["clone", "--quiet", "--bare", "parent.git", "fork.git"]);
    git(root, &["clone", "--quiet", "fork.git", "clone"]);

    ForkFixture {
        parent_bare: root.join("parent.git"),
        fork_bare: root.join("fork.git"),
        clone_dir: root.join("clone"),
    }
}

/// Push one new commit to the parent repository so the fork is behind it.
pub fn advance_parent(root: &Path, parent_bare: &Path) {
    let work = root.join("parent-work");
    git(
        root,
        &[
            "clone",
            "--quiet",
            parent_bare.to_str().unwrap(),
            "parent-work",
        ],
    );
    std::fs::write(work.join("feature.txt"), "new upstream work\n").unwrap();
    git(&work, &["add", "feature.txt"]);
    git(&work, &["commit", "--quiet", "-m", "add feature"]);
    git(&work, &["push", "--quiet", "origin", "master"]);
}

/// Rewrite a GitHub-looking URL to a local path inside `repo`, so fetch and
/// push against "github.com" URLs hit local fixtures instead of the network.
pub fn map_url_to_path(repo: &Path, github_url: &str, local: &Path) {
    git(
        repo,
        &[
            "config",
            &format!("url.{}.insteadOf", local.display()),
            github_url,
        ],
    );
}

pub fn rev_parse(repo: &Path, refname: &str) -> String {
    git_stdout(repo, &["rev-parse", refname])
}

/// Config pointed at a mock API server, with retries disabled.
pub fn test_config(api_url: &str, base_dir: &Path) -> Config {
    let mut config = Config::default();
    config.base_directory = base_dir.to_string_lossy().into_owned();
    config.github.api_url = api_url.to_string();
    config.github.auth_method = "token".to_string();
    config.sync.retry_attempts = 1;
    config.sync.retry_delay_secs = 0;
    config
}

/// Token sourced by the "token" auth method in tests. Every test sets the
/// same value, so parallel test execution is safe.
pub fn set_test_token() {
    std::env::set_var("GITHUB_TOKEN", "forksync-test-token");
}

/// GitHub user object, complete enough for octocrab's Author model.
pub fn author_json(login: &str) -> Value {
    json!({
        "login": login,
        "id": 1,
        "node_id": "MDQ6VXNlcjE=",
        "avatar_url": "https://avatars.githubusercontent.com/u/1?v=4",
        "gravatar_id": "",
        "url": format!("https://api.github.com/users/{login}"),
        "html_url": format!("https://github.com/{login}"),
        "followers_url": format!("https://api.github.com/users/{login}/followers"),
        "following_url": format!("https://api.github.com/users/{login}/following{{/other_user}}"),
        "gists_url": format!("https://api.github.com/users/{login}/gists{{/gist_id}}"),
        "starred_url": format!("https://api.github.com/users/{login}/starred{{/owner}}{{/repo}}"),
        "subscriptions_url": format!("https://api.github.com/users/{login}/subscriptions"),
        "organizations_url": format!("https://api.github.com/users/{login}/orgs"),
        "repos_url": format!("https://api.github.com/users/{login}/repos"),
        "events_url": format!("https://api.github.com/users/{login}/events{{/privacy}}"),
        "received_events_url": format!("https://api.github.com/users/{login}/received_events"),
        "type": "User",
        "site_admin": false
    })
}

/// Full GitHub user profile, as returned by `GET /users/{username}`.
pub fn user_profile_json(login: &str) -> Value {
    let mut profile = author_json(login);
    let extra = json!({
        "name": login,
        "company": null,
        "blog": "",
        "location": null,
        "email": null,
        "hireable": null,
        "bio": null,
        "twitter_username": null,
        "public_repos": 2,
        "public_gists": 0,
        "followers": 1,
        "following": 1,
        "created_at": "2019-01-01T00:00:00Z",
        "updated_at": "2024-01-01T00:00:00Z"
    });
    profile
        .as_object_mut()
        .unwrap()
        .extend(extra.as_object().unwrap().clone());
    profile
}

/// GitHub repository object for `owner/name`.
pub fn repo_json(owner: &str, name: &str) -> Value {
    json!({
        "id": 100,
        "node_id": "R_100",
        "name": name,
        "full_name": format!("{owner}/{name}"),
        "private": false,
        "owner": author_json(owner),
        "fork": false,
        "url": format!("https://api.github.com/repos/{owner}/{name}"),
        "html_url": format!("https://github.com/{owner}/{name}"),
        "ssh_url": format!("git@github.com:{owner}/{name}.git"),
        "clone_url": format!("https://github.com/{owner}/{name}.git")
    })
}

/// GitHub error body in the shape octocrab expects.
pub fn error_json(message: &str) -> Value {
    json!({
        "message": message,
        "documentation_url": "https://docs.github.com/rest",
        "errors": []
    })
}

/// Start a mock GitHub API that answers the authenticated-user lookup.
pub async fn mock_api(login: &str) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(author_json(login)))
        .mount(&server)
        .await;

    server
}
