//! Runs CLI commands against files on disk.

use clap::Parser;
use gquery_cli::{run, Cli};
use std::path::PathBuf;
use tempfile::TempDir;

fn fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

async fn run_args(args: &[&str]) -> i32 {
    let cli = Cli::try_parse_from(std::iter::once("gquery").chain(args.iter().copied())).unwrap();
    run(cli).await.unwrap()
}

#[tokio::test]
async fn test_print_valid_and_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let good = fixture(&dir, "good.graphql", "query Q {\n  a { b }\n}\n");
    let bad = fixture(&dir, "bad.graphql", "query Q {");

    assert_eq!(run_args(&["print", good.to_str().unwrap()]).await, 0);
    assert_eq!(
        run_args(&["print", "--typename", good.to_str().unwrap()]).await,
        0
    );
    assert_eq!(
        run_args(&["print", good.to_str().unwrap(), bad.to_str().unwrap()]).await,
        1
    );
}

#[tokio::test]
async fn test_typename_check() {
    let dir = tempfile::tempdir().unwrap();
    let bare = fixture(&dir, "bare.graphql", "{ viewer { id } }");
    let complete = fixture(&dir, "complete.graphql", "{ viewer { id __typename } }");

    assert_eq!(
        run_args(&["typename", "--check", bare.to_str().unwrap()]).await,
        1
    );
    assert_eq!(
        run_args(&["typename", "--check", complete.to_str().unwrap()]).await,
        0
    );
    assert_eq!(run_args(&["typename", bare.to_str().unwrap()]).await, 0);
}

#[tokio::test]
async fn test_types() {
    let dir = tempfile::tempdir().unwrap();
    let response = fixture(
        &dir,
        "response.json",
        r#"{"data":{"viewer":{"__typename":"User","posts":[{"__typename":"Post"}]}}}"#,
    );
    assert_eq!(run_args(&["types", response.to_str().unwrap()]).await, 0);

    let broken = fixture(&dir, "broken.json", "{");
    let cli = Cli::try_parse_from(["gquery", "types", broken.to_str().unwrap()]).unwrap();
    assert!(run(cli).await.is_err());
}

#[tokio::test]
async fn test_fetch_failure_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let query = fixture(&dir, "fetch.graphql", "{ viewer { id } }");
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let endpoint = format!("http://127.0.0.1:{}/graphql", port);

    assert_eq!(
        run_args(&[
            "fetch",
            query.to_str().unwrap(),
            "--endpoint",
            &endpoint,
            "--typename",
            "--timeout-ms",
            "1000",
        ])
        .await,
        1
    );
}

#[tokio::test]
async fn test_fetch_rejects_bad_header() {
    let dir = tempfile::tempdir().unwrap();
    let query = fixture(&dir, "header.graphql", "{ a }");
    let cli = Cli::try_parse_from([
        "gquery",
        "fetch",
        query.to_str().unwrap(),
        "--endpoint",
        "http://127.0.0.1:1/graphql",
        "-H",
        "missing-separator",
    ])
    .unwrap();
    assert!(run(cli).await.is_err());
}

#[test]
fn test_fixtures_are_removed_with_their_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = fixture(&dir, "scratch.graphql", "{ a }");
    assert!(path.exists());

    drop(dir);
    assert!(!path.exists());
}
