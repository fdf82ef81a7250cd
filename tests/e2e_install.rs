//! Install / run E2E tests against a fake network and a shell-script PHP

#![cfg(unix)]

mod helper;

use std::path::Path;
use std::sync::Arc;

use mockito::{Mock, Server, ServerGuard};
use tempfile::TempDir;

use helper::{FakeDownloader, binary_path, fake_php_script, read_log, test_catalog};
use pocus::config::{COMPOSER_PHAR, PocusConfig};
use pocus::installer::{Pocus, workspace_key};
use pocus::php::CacheState;
use pocus::platform::Platform;
use pocus::version::SemVersion;

struct Fixture {
    temp: TempDir,
    downloader: Arc<FakeDownloader>,
    pocus: Pocus,
}

impl Fixture {
    fn new(packagist_url: &str, downloader: FakeDownloader) -> Self {
        let temp = TempDir::new().unwrap();
        let downloader = Arc::new(downloader);
        let platform = Platform::current().unwrap();
        let config = PocusConfig {
            packagist_url: packagist_url.to_string(),
            github_raw_url: "https://raw.test".to_string(),
            composer_url: "https://composer.test/composer.phar".to_string(),
        };

        let pocus = Pocus::new(
            temp.path().join("data"),
            config,
            platform,
            test_catalog(platform),
            downloader.clone(),
        )
        .unwrap();

        Self {
            temp,
            downloader,
            pocus,
        }
    }

    fn data_dir(&self) -> std::path::PathBuf {
        self.temp.path().join("data")
    }
}

fn log_path(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("php-invocations.log")
}

async fn packagist_with(package: &str, body: &str) -> (ServerGuard, Mock) {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", format!("/packages/{package}.json").as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;
    (server, mock)
}

#[tokio::test(flavor = "multi_thread")]
async fn install_resolves_php_from_latest_release_and_runs_composer() {
    let logs = TempDir::new().unwrap();
    let log = log_path(&logs);
    let (server, _mock) = packagist_with(
        "acme/tool",
        r#"{"package": {"versions": {
            "2.0.0": {"require": {"php": ">=8.1 <8.3"}},
            "1.5.0": {"require": {"php": "^7.4"}},
            "3.0.0-beta1": {"require": {"php": "^8.3"}}
        }}}"#,
    )
    .await;
    let fixture = Fixture::new(&server.url(), FakeDownloader::new(fake_php_script(&log, "tool")));

    let installation = fixture.pocus.install("acme/tool").await.unwrap();

    let platform = fixture.pocus.platform();
    let expected = SemVersion::new(8, 2, 27);
    assert_eq!(installation.version, expected);
    assert_eq!(installation.php, binary_path(&fixture.data_dir(), &expected, platform));
    assert_eq!(
        installation.workspace,
        fixture.data_dir().join(workspace_key("acme/tool"))
    );
    assert_eq!(fixture.pocus.state(&expected), CacheState::Ready);

    let manifest: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(installation.workspace.join("composer.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(manifest["require"]["acme/tool"], "2.0.0");
    assert_eq!(manifest["require"]["php"], ">=8.1 <8.3");

    let composer = fixture.data_dir().join(COMPOSER_PHAR);
    assert_eq!(
        read_log(&log),
        vec![format!("{} install --no-interaction", composer.display())]
    );
    assert!(installation.workspace.join("vendor/bin/tool").is_file());
}

#[tokio::test(flavor = "multi_thread")]
async fn second_install_reuses_cached_php_and_composer() {
    let logs = TempDir::new().unwrap();
    let log = log_path(&logs);
    let (server, _mock) = packagist_with(
        "acme/tool",
        r#"{"package": {"versions": {"1.0.0": {"require": {"php": "^7.4"}}}}}"#,
    )
    .await;
    let fixture = Fixture::new(&server.url(), FakeDownloader::new(fake_php_script(&log, "tool")));

    fixture.pocus.install("acme/tool").await.unwrap();
    fixture.pocus.install("acme/tool").await.unwrap();

    assert_eq!(fixture.downloader.count(".tar.gz"), 1);
    assert_eq!(fixture.downloader.count("composer.phar"), 1);
    assert_eq!(read_log(&log).len(), 2);
    assert_eq!(
        fixture.pocus.installed_versions(),
        vec![SemVersion::new(7, 4, 33)]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn install_from_github_uses_repository_requirement() {
    let logs = TempDir::new().unwrap();
    let log = log_path(&logs);
    let downloader = FakeDownloader::new(fake_php_script(&log, "tool"))
        .with_github_manifest(r#"{"name": "acme/tool", "require": {"php": "~8.3.0"}}"#);
    let fixture = Fixture::new("http://packagist.invalid", downloader);

    let installation = fixture
        .pocus
        .install("https://github.com/acme/tool")
        .await
        .unwrap();

    assert_eq!(installation.version, SemVersion::new(8, 3, 15));
    assert!(
        fixture
            .downloader
            .requests()
            .contains(&"https://raw.test/acme/tool/HEAD/composer.json".to_string())
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn install_fails_without_matching_php() {
    let (server, _mock) = packagist_with(
        "acme/future",
        r#"{"package": {"versions": {"1.0.0": {"require": {"php": "^9.0"}}}}}"#,
    )
    .await;
    let fixture = Fixture::new(&server.url(), FakeDownloader::new("#!/bin/sh\n"));

    let error = fixture.pocus.install("acme/future").await.unwrap_err();

    assert!(error.to_string().contains("^9.0.0"));
    assert_eq!(fixture.downloader.count(".tar.gz"), 0);
    assert!(fixture.pocus.installed_versions().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn run_installs_missing_package_then_executes_bin_script() {
    let logs = TempDir::new().unwrap();
    let log = log_path(&logs);
    let (server, _mock) = packagist_with(
        "acme/tool",
        r#"{"package": {"versions": {"1.0.0": {"require": {"php": "^8.2"}}}}}"#,
    )
    .await;
    let fixture = Fixture::new(&server.url(), FakeDownloader::new(fake_php_script(&log, "tool")));

    let code = fixture
        .pocus
        .run("acme/tool", None, &["--version".to_string()])
        .await
        .unwrap();

    assert_eq!(code, 5);
    let script = fixture
        .data_dir()
        .join(workspace_key("acme/tool"))
        .join("vendor/bin/tool");
    let invocations = read_log(&log);
    assert_eq!(invocations.len(), 2);
    assert_eq!(invocations[1], format!("{} --version", script.display()));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_reports_missing_bin_script() {
    let logs = TempDir::new().unwrap();
    let log = log_path(&logs);
    let (server, _mock) = packagist_with(
        "acme/tool",
        r#"{"package": {"versions": {"1.0.0": {}}}}"#,
    )
    .await;
    let fixture = Fixture::new(&server.url(), FakeDownloader::new(fake_php_script(&log, "tool")));

    let error = fixture
        .pocus
        .run("acme/tool", Some("other"), &[])
        .await
        .unwrap_err();

    assert!(error.to_string().contains("vendor/bin/other"));
}

#[tokio::test(flavor = "multi_thread")]
async fn run_reinstalls_when_vendor_lacks_the_script() {
    let logs = TempDir::new().unwrap();
    let log = log_path(&logs);
    let (server, _mock) = packagist_with(
        "acme/tool",
        r#"{"package": {"versions": {"1.0.0": {"require": {"php": "^8.2"}}}}}"#,
    )
    .await;
    let fixture = Fixture::new(&server.url(), FakeDownloader::new(fake_php_script(&log, "tool")));
    let workspace = fixture.data_dir().join(workspace_key("acme/tool"));
    std::fs::create_dir_all(workspace.join("vendor/composer")).unwrap();

    let code = fixture.pocus.run("acme/tool", None, &[]).await.unwrap();

    assert_eq!(code, 5);
    let composer = fixture.data_dir().join(COMPOSER_PHAR);
    assert_eq!(
        read_log(&log)[0],
        format!("{} install --no-interaction", composer.display())
    );
    assert!(workspace.join("vendor/bin/tool").is_file());
}

#[tokio::test(flavor = "multi_thread")]
async fn run_file_uses_newest_matching_php() {
    let logs = TempDir::new().unwrap();
    let log = log_path(&logs);
    let fixture = Fixture::new(
        "http://packagist.invalid",
        FakeDownloader::new(fake_php_script(&log, "tool")),
    );

    let code = fixture
        .pocus
        .run_file("^7.4|~8.2.0", Path::new("hello.php"), &["world".to_string()])
        .await
        .unwrap();

    assert_eq!(code, 0);
    assert_eq!(read_log(&log), vec!["hello.php world".to_string()]);
    assert_eq!(
        fixture.pocus.installed_versions(),
        vec![SemVersion::new(8, 2, 27)]
    );
}
