//! Smoke tests for the workspace's binaries as external processes via
//! `assert_cmd`, exercising the compiled binary rather than its internal
//! functions.

use assert_cmd::Command;
use predicates::str::contains;

#[test]
fn seed_binary_fails_fast_on_an_unparseable_database_url() {
    let mut cmd = Command::cargo_bin("koel-seed").unwrap();
    cmd.env("DATABASE_URL", "not-a-connection-string")
        .env("REDIS_URL", "redis://127.0.0.1:6379/0")
        .env_remove("RUST_LOG");

    cmd.assert().failure().stderr(contains("Error"));
}
