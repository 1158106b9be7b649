use assert_cmd::Command;

fn version_output() -> String {
    format!("folproof {}\n", env!("CARGO_PKG_VERSION"))
}

fn folproof() -> Command {
    Command::cargo_bin("folproof").expect("binary exists")
}

#[test]
fn version_flag_prints_package_version() {
    let expected = version_output();
    folproof()
        .arg("--version")
        .assert()
        .success()
        .stdout(expected.clone())
        .stderr("");

    folproof()
        .arg("-v")
        .assert()
        .success()
        .stdout(expected)
        .stderr("");
}

#[test]
fn help_flag_prints_usage() {
    let output = folproof().arg("--help").output().expect("help output");

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"), "stdout was: {stdout}");
    assert!(
        stdout.contains("-v, --version"),
        "stdout was missing version flag: {stdout}"
    );
    assert!(stdout.contains("--propositional"), "stdout was: {stdout}");
    assert!(stdout.contains("--signature"), "stdout was: {stdout}");
    assert!(output.stderr.is_empty(), "stderr was not empty");
}

#[test]
fn valid_proof_succeeds() {
    folproof()
        .arg("tests/case_studies/de_morgan.folproof")
        .assert()
        .success()
        .stdout("Proof is valid.\n")
        .stderr("");
}

#[test]
fn sorries_are_reported() {
    folproof()
        .arg("tests/cli/sorry.folproof")
        .assert()
        .success()
        .stdout("Proof is valid.\n1 sorry step(s) remaining.\n");
}

#[test]
fn invalid_proof_fails_with_the_step() {
    let output = folproof()
        .arg("tests/cli/mismatch.folproof")
        .assert()
        .failure()
        .get_output()
        .clone();

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.starts_with(
            "Step 2: Copy: Current step is not semantically equal to the referenced step."
        ),
        "stdout was: {stdout}"
    );
    assert!(
        stdout.contains("tests/cli/mismatch.folproof:2:1"),
        "stdout was: {stdout}"
    );
}

#[test]
fn restrictions_from_flags() {
    folproof()
        .arg("tests/cli/forall.folproof")
        .assert()
        .success();

    folproof()
        .args(["--propositional", "tests/cli/forall.folproof"])
        .assert()
        .failure();

    folproof()
        .args(["--signature", "P/1 a/0", "tests/cli/forall.folproof"])
        .assert()
        .success();

    let output = folproof()
        .args(["--signature", "P", "tests/cli/forall.folproof"])
        .assert()
        .failure()
        .get_output()
        .clone();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.starts_with("Invalid signature restriction"),
        "stdout was: {stdout}"
    );
}

#[test]
fn debug_flag_logs_steps() {
    let output = folproof()
        .args(["--debug", "tests/cli/forall.folproof"])
        .env_remove("RUST_LOG")
        .assert()
        .success()
        .get_output()
        .clone();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("step 2"), "stderr was: {stderr}");
}

#[test]
fn running_with_missing_file_returns_error() {
    let output = folproof()
        .arg("tests/does-not-exist.folproof")
        .assert()
        .failure()
        .get_output()
        .clone();

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("failed to read `tests/does-not-exist.folproof`"),
        "stderr was: {stderr}"
    );
}
