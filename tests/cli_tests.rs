//! Tests for the `ezid` command line tool.

use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{basic_auth, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ezid() -> Command {
    let mut cmd = Command::cargo_bin("ezid").expect("Failed to find ezid binary");
    cmd.env_remove("EZID_SERVER")
        .env_remove("EZID_TIMEOUT")
        .env_remove("EZID_PROXY")
        .env_remove("RUST_LOG");
    cmd
}

mod usage_errors {
    use super::*;

    #[test]
    fn test_missing_arguments() {
        ezid()
            .arg("-")
            .assert()
            .code(1)
            .stderr(predicate::str::contains("Usage: ezid"));
    }

    #[test]
    fn test_unknown_operation() {
        ezid()
            .args(["-", "frobnicate", "x"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("unknown operation"));
    }

    #[test]
    fn test_ambiguous_operation() {
        ezid()
            .args(["-", "log"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("ambiguous operation"));
    }

    #[test]
    fn test_zero_count() {
        ezid()
            .args(["--count", "0", "-", "mint", "ark:/99999/fk4"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("--count must be at least 1"));
    }

    #[test]
    fn test_wrong_arity() {
        ezid()
            .args(["-", "view"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("wrong number of arguments"));

        ezid()
            .args(["-", "mint", "ark:/99999/fk4", "dangling-label"])
            .assert()
            .code(1);
    }

    #[test]
    fn test_help() {
        ezid()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("EZID"));
    }
}

mod against_mock_server {
    use super::*;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_view_prints_raw_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/id/ark:/13030/c88s4n09"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("success: ark:/13030/c88s4n09\n_profile: dc\n"),
            )
            .expect(1)
            .mount(&server)
            .await;

        ezid()
            .args(["--server", &server.uri(), "-", "v", "ark:/13030/c88s4n09"])
            .assert()
            .success()
            .stdout("success: ark:/13030/c88s4n09\n_profile: dc\n");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_view_json_format() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/id/ark:/13030/c88s4n09"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("success: ark:/13030/c88s4n09\n_profile: dc\n"),
            )
            .mount(&server)
            .await;

        ezid()
            .args([
                "--server",
                &server.uri(),
                "--format",
                "json",
                "-",
                "view",
                "ark:/13030/c88s4n09",
            ])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"status\": \"success\""))
            .stdout(predicate::str::contains("\"_profile\": \"dc\""));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_http_error_goes_to_stderr() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/id/ark:/13030/c88s"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string("error: bad request - no such identifier\n"),
            )
            .mount(&server)
            .await;

        ezid()
            .args(["--server", &server.uri(), "-", "view", "ark:/13030/c88s"])
            .assert()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("400 Bad Request"))
            .stderr(predicate::str::contains("no such identifier"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mint_with_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/login"))
            .and(basic_auth("apitest", "secret"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("Set-Cookie", "sessionid=cli123; Path=/"),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/shoulder/ark:/99999/fk4"))
            .and(header("Cookie", "sessionid=cli123"))
            .respond_with(ResponseTemplate::new(201).set_body_string("success: ark:/99999/fk4cli\n"))
            .expect(1)
            .mount(&server)
            .await;

        ezid()
            .args([
                "--server",
                &server.uri(),
                "apitest:secret",
                "mint",
                "ark:/99999/fk4",
                "_profile",
                "dc",
            ])
            .assert()
            .success()
            .stdout("ark:/99999/fk4cli\n");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mint_without_credentials_fails() {
        let server = MockServer::start().await;
        Mock::given(wiremock::matchers::any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        ezid()
            .args(["--server", &server.uri(), "-", "mint", "ark:/99999/fk4"])
            .assert()
            .code(1)
            .stderr(predicate::str::contains("no credentials"));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_login_prints_session_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(200).insert_header("Set-Cookie", "sessionid=cli123; Path=/"),
            )
            .mount(&server)
            .await;

        ezid()
            .args(["--server", &server.uri(), "apitest:secret", "login"])
            .assert()
            .success()
            .stdout("cli123\n");
    }
}
