mod helpers;

use gitcall::{GitError, GitVersion, Repository};
use helpers::{configure_identity, create_commit, create_test_repo};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_git_version_detection() {
    let version = GitVersion::detect().expect("Failed to detect git version");
    assert!(version.major >= 2);
}

#[test]
fn test_git_version_validation() {
    let version = GitVersion::validate().expect("Git version should be >= 2.20");
    assert!(version.is_supported());
}

#[test]
fn test_discover_repository() {
    let (_temp, repo_path) = create_test_repo();

    let repo = Repository::discover_from(&repo_path).expect("Failed to discover repository");
    assert_eq!(repo.path(), repo_path.as_path());
    assert!(repo.is_repository());
}

#[test]
fn test_discover_not_a_repository() {
    let temp_dir = TempDir::new().unwrap();
    let result = Repository::discover_from(temp_dir.path());

    assert!(matches!(result.unwrap_err(), GitError::NotARepository));
}

#[test]
fn test_init_add_commit_log_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let repo_path = temp_dir.path().to_path_buf();

    let repo = Repository::new(&repo_path);
    assert!(!repo.is_repository());

    repo.init(&[]).expect("Failed to init");
    configure_identity(&repo_path);

    fs::write(repo_path.join("hello.txt"), "hello").expect("Failed to write file");
    repo.add(&["hello.txt"]).expect("Failed to add");

    let message = "Initial commit: add hello.txt (v1)";
    let summary = repo
        .commit(message)
        .expect("Failed to commit")
        .expect("Commit produced no acknowledgement");
    assert!(!summary.commit.is_empty());
    assert_eq!(summary.message, message);

    let log = repo.log().expect("Failed to get log");
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].message, message);
    assert_eq!(log[0].author, "Test User <test@example.com>");
    assert!(log[0].timestamp().is_some());
}

#[test]
fn test_log_is_most_recent_first() {
    let (_temp, repo_path) = create_test_repo();
    let repo = Repository::new(&repo_path);

    create_commit(&repo_path, "a.txt", "a", "First commit");
    create_commit(&repo_path, "b.txt", "b", "Second commit");
    create_commit(&repo_path, "c.txt", "c", "Third commit");

    let log = repo.log().expect("Failed to get log");
    assert_eq!(log.len(), 3);
    assert_eq!(log[0].message, "Third commit");
    assert_eq!(log[1].message, "Second commit");
    assert_eq!(log[2].message, "First commit");
}

#[test]
fn test_status_sections() {
    let (_temp, repo_path) = create_test_repo();
    let repo = Repository::new(&repo_path);

    create_commit(&repo_path, "tracked.txt", "original", "Initial commit");

    // One staged file, one unstaged modification, one untracked file
    fs::write(repo_path.join("staged.txt"), "new").unwrap();
    repo.add(&["staged.txt"]).unwrap();
    fs::write(repo_path.join("tracked.txt"), "modified").unwrap();
    fs::write(repo_path.join("loose.txt"), "loose").unwrap();

    let status = repo.status().expect("Failed to get status");
    assert_eq!(status.staged, vec!["staged.txt"]);
    assert_eq!(status.unstaged, vec!["tracked.txt"]);
    assert_eq!(status.untracked, vec!["loose.txt"]);
}

#[test]
fn test_status_clean_repo() {
    let (_temp, repo_path) = create_test_repo();
    let repo = Repository::new(&repo_path);

    create_commit(&repo_path, "file.txt", "content", "Initial commit");

    let status = repo.status().expect("Failed to get status");
    assert!(status.is_clean());
}

#[test]
fn test_unstage() {
    let (_temp, repo_path) = create_test_repo();
    let repo = Repository::new(&repo_path);

    create_commit(&repo_path, "base.txt", "base", "Initial commit");

    fs::write(repo_path.join("new.txt"), "new").unwrap();
    repo.add(&["new.txt"]).unwrap();
    assert_eq!(repo.status().unwrap().staged, vec!["new.txt"]);

    repo.unstage(&["new.txt"]).expect("Failed to unstage");

    let status = repo.status().unwrap();
    assert!(status.staged.is_empty());
    assert_eq!(status.untracked, vec!["new.txt"]);
}

#[test]
fn test_remove_keeps_file_on_disk() {
    let (_temp, repo_path) = create_test_repo();
    let repo = Repository::new(&repo_path);

    create_commit(&repo_path, "file.txt", "content", "Initial commit");

    repo.remove(&["file.txt"]).expect("Failed to remove");

    assert!(repo_path.join("file.txt").exists());
    let status = repo.status().unwrap();
    assert_eq!(status.untracked, vec!["file.txt"]);
}

#[test]
fn test_create_branch_and_checkout() {
    let (_temp, repo_path) = create_test_repo();
    let repo = Repository::new(&repo_path);

    create_commit(&repo_path, "file.txt", "content", "Initial commit");
    let original = repo.branches().unwrap().current.expect("No current branch");

    repo.create_branch("feature-b").expect("Failed to create branch");

    let branches = repo.checkout("feature-b").expect("Failed to checkout");
    assert_eq!(branches.current.as_deref(), Some("feature-b"));
    assert!(branches.others.contains(&original));

    // And the next listing agrees with the checkout result
    let listed = repo.branches().unwrap();
    assert_eq!(listed.current.as_deref(), Some("feature-b"));
}

#[test]
fn test_merge_fast_forward() {
    let (_temp, repo_path) = create_test_repo();
    let repo = Repository::new(&repo_path);

    create_commit(&repo_path, "file.txt", "content", "Initial commit");
    let original = repo.branches().unwrap().current.expect("No current branch");

    repo.create_branch("feature").unwrap();
    repo.checkout("feature").unwrap();
    create_commit(&repo_path, "feature.txt", "feature", "Feature commit");

    repo.checkout(&original).unwrap();
    repo.merge("feature").expect("Failed to merge");

    let log = repo.log().unwrap();
    assert_eq!(log.len(), 2);
    assert_eq!(log[0].message, "Feature commit");
}

#[test]
fn test_remote_lifecycle() {
    let (_temp, repo_path) = create_test_repo();
    let repo = Repository::new(&repo_path);
    let remotes = repo.remotes();

    assert!(remotes.list().unwrap().is_empty());

    remotes
        .add("origin", "http://example.com/a.git")
        .expect("Failed to add remote");
    let listed = remotes.list().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed["origin"], "http://example.com/a.git");

    remotes
        .set_url("origin", "http://example.com/b.git")
        .expect("Failed to set url");
    assert_eq!(remotes.list().unwrap()["origin"], "http://example.com/b.git");

    remotes.remove("origin").expect("Failed to remove remote");
    assert!(remotes.list().unwrap().is_empty());
}

#[test]
fn test_commit_message_travels_verbatim() {
    let (_temp, repo_path) = create_test_repo();
    let repo = Repository::new(&repo_path);

    fs::write(repo_path.join("file.txt"), "content").unwrap();
    repo.add(&["file.txt"]).unwrap();

    // Spaces and shell metacharacters survive the argv boundary untouched
    let message = "fix: handle $(HOME) and `pwd` in paths; see #7";
    repo.commit(message).unwrap();

    let log = repo.log().unwrap();
    assert_eq!(log[0].message, message);
}
