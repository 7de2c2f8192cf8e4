use assert_cmd::Command;
use predicates::prelude::*;

fn bookshelf() -> Command {
    let mut cmd = Command::cargo_bin("bookshelf").unwrap();
    cmd.env("BOOKSHELF_CONFIG_DIR", env!("CARGO_MANIFEST_DIR"))
        .env("BOOKSHELF_ENV", "local")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn help_lists_subcommands() {
    bookshelf()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("migrate"))
        .stdout(predicate::str::contains("routes"));
}

#[test]
fn routes_prints_book_endpoints() {
    bookshelf()
        .arg("routes")
        .assert()
        .success()
        .stdout(predicate::str::contains("GET     /books"))
        .stdout(predicate::str::contains("POST    /books"))
        .stdout(predicate::str::contains("PUT     /books/{isbn}"))
        .stdout(predicate::str::contains("DELETE  /books/{isbn}"))
        .stdout(predicate::str::contains("GET     /healthz"));
}

#[test]
fn unknown_environment_fails() {
    bookshelf()
        .env("BOOKSHELF_ENV", "qa")
        .arg("routes")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported environment 'qa'"));
}
