mod common;

use common::{default_pip, pip_with, FakeFs, RecordingRunner, TableCache};
use pipctl::runner::{ExecutionResult, RunOptions};
use pipctl::{InstallOutcome, InstallRequest};
use std::path::PathBuf;

const MIRRORS: [&str; 3] = [
    "http://g.pypi.python.org",
    "http://c.pypi.python.org",
    "http://pypi.crate.io",
];

const MIRRORS_COMMAND: &str = "pip install --use-mirrors \
    --mirrors=http://g.pypi.python.org \
    --mirrors=http://c.pypi.python.org \
    --mirrors=http://pypi.crate.io";

#[test]
fn test_requirements_file_command() {
    let runner = RecordingRunner::succeeding();
    let outcome =
        default_pip(&runner).install(&InstallRequest::new().requirements("requirements.txt"));

    assert!(outcome.result);
    runner.assert_called_once_with("pip install --requirement='requirements.txt'");
}

#[test]
fn test_multiple_mirrors_as_list() {
    let runner = RecordingRunner::succeeding();
    default_pip(&runner).install(&InstallRequest::new().mirrors(MIRRORS));

    runner.assert_called_once_with(MIRRORS_COMMAND);
}

#[test]
fn test_multiple_mirrors_as_comma_separated_string() {
    let runner = RecordingRunner::succeeding();
    default_pip(&runner).install(&InstallRequest::new().mirrors(MIRRORS.join(",")));

    runner.assert_called_once_with(MIRRORS_COMMAND);
}

#[test]
fn test_failed_cached_requirements() {
    let runner = RecordingRunner::succeeding();
    let cache = TableCache::default();
    let lookups = cache.lookups.clone();

    let outcome = pip_with(&runner, cache, FakeFs::everything_exists())
        .install(&InstallRequest::new().requirements("salt://my_test_reqs"));

    assert!(!outcome.result);
    assert!(outcome.comment.contains("my_test_reqs"));
    assert!(runner.calls().is_empty());
    assert_eq!(*lookups.lock().unwrap(), vec!["salt://my_test_reqs"]);
}

#[test]
fn test_cached_requirements_used() {
    let runner = RecordingRunner::succeeding();
    let cache = TableCache::default().with_entry("salt://requirements.txt", "my_cached_reqs");

    let outcome = pip_with(&runner, cache, FakeFs::everything_exists())
        .install(&InstallRequest::new().requirements("salt://requirements.txt"));

    assert!(outcome.result);
    runner.assert_called_once_with("pip install --requirement='my_cached_reqs'");
}

#[test]
fn test_local_requirements_skip_cache() {
    let runner = RecordingRunner::succeeding();
    let cache = TableCache::default();
    let lookups = cache.lookups.clone();

    pip_with(&runner, cache, FakeFs::everything_exists())
        .install(&InstallRequest::new().requirements("/srv/app/requirements.txt"));

    assert!(lookups.lock().unwrap().is_empty());
    runner.assert_called_once_with("pip install --requirement='/srv/app/requirements.txt'");
}

#[test]
fn test_activate_env() {
    let runner = RecordingRunner::succeeding();
    default_pip(&runner).install(
        &InstallRequest::new()
            .packages("mock")
            .bin_env("/test_env")
            .activate(true),
    );

    runner.assert_called_once_with(". /test_env/bin/activate && /test_env/bin/pip install mock");
}

#[test]
fn test_activate_requested_but_env_missing_script() {
    let runner = RecordingRunner::succeeding();
    let fs = FakeFs::default()
        .with_dir("/test_env")
        .with_file("/test_env/bin/pip");

    pip_with(&runner, TableCache::default(), fs).install(
        &InstallRequest::new()
            .packages("mock")
            .bin_env("/test_env")
            .activate(true),
    );

    runner.assert_called_once_with("/test_env/bin/pip install mock");
}

#[test]
fn test_runas_and_cwd_pass_through() {
    let runner = RecordingRunner::succeeding();
    default_pip(&runner).install(
        &InstallRequest::new()
            .packages("mock")
            .runas("www-data")
            .cwd("/srv/www"),
    );

    runner.assert_called_once_with_options(
        "pip install mock",
        &RunOptions::new(Some("www-data".to_string()), Some(PathBuf::from("/srv/www"))),
    );
}

#[test]
fn test_bare_install_is_not_validated() {
    let runner = RecordingRunner::succeeding();
    let outcome = default_pip(&runner).install(&InstallRequest::new());

    assert!(outcome.result);
    runner.assert_called_once_with("pip install");
}

#[test]
fn test_packages_as_comma_string() {
    let runner = RecordingRunner::succeeding();
    default_pip(&runner).install(&InstallRequest::new().packages("mock,nose==1.2.1"));

    runner.assert_called_once_with("pip install mock 'nose==1.2.1'");
}

#[test]
fn test_version_specifiers_reach_pip_as_single_words() {
    let runner = RecordingRunner::succeeding();
    let request = InstallRequest::new().packages("requests>=2.0,six<2,a;rm -rf x");
    default_pip(&runner).install(&request);

    runner.assert_called_once_with("pip install 'requests>=2.0' 'six<2' 'a;rm -rf x'");
}

#[test]
fn test_requirements_path_with_quote_stays_literal() {
    let runner = RecordingRunner::succeeding();
    default_pip(&runner).install(&InstallRequest::new().requirements("/srv/it's $(id).txt"));

    runner.assert_called_once_with(r"pip install --requirement='/srv/it'\''s $(id).txt'");
}

#[test]
fn test_activate_env_with_space_in_path() {
    let runner = RecordingRunner::succeeding();
    default_pip(&runner).install(
        &InstallRequest::new()
            .packages("mock")
            .bin_env("/srv/my env")
            .activate(true),
    );

    runner.assert_called_once_with(
        ". '/srv/my env/bin/activate' && '/srv/my env/bin/pip' install mock",
    );
}

#[test]
fn test_requirements_mirrors_and_packages_order() {
    let runner = RecordingRunner::succeeding();
    default_pip(&runner).install(
        &InstallRequest::new()
            .requirements("reqs.txt")
            .mirrors("http://a.pypi.python.org")
            .packages("mock"),
    );

    runner.assert_called_once_with(
        "pip install --requirement='reqs.txt' --use-mirrors \
         --mirrors=http://a.pypi.python.org mock",
    );
}

#[test]
fn test_success_comment_is_stdout() {
    let runner = RecordingRunner::new(ExecutionResult::success("Successfully installed mock"));
    let outcome = default_pip(&runner).install(&InstallRequest::new().packages("mock"));

    assert_eq!(outcome, InstallOutcome::success("Successfully installed mock"));
}

#[test]
fn test_failure_comment_is_process_output() {
    let runner = RecordingRunner::new(ExecutionResult::failure(1, "Could not find any downloads"));
    let outcome = default_pip(&runner).install(&InstallRequest::new().packages("nope"));

    assert_eq!(outcome, InstallOutcome::failure("Could not find any downloads"));
}

#[test]
fn test_install_request_from_json() {
    let request: InstallRequest = serde_json::from_str(&format!(
        r#"{{"mirrors": "{}", "runas": null, "cwd": null}}"#,
        MIRRORS.join(",")
    ))
    .unwrap();

    let runner = RecordingRunner::succeeding();
    default_pip(&runner).install(&request);
    runner.assert_called_once_with(MIRRORS_COMMAND);
}
