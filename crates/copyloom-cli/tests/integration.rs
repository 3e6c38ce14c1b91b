#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn copyloom(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("copyloom").unwrap();
    cmd.current_dir(dir.path())
        .env("COPYLOOM_ROOT", dir.path())
        .env_remove("COPYLOOM_API_KEY");
    cmd
}

fn init_workspace(dir: &TempDir) {
    copyloom(dir).arg("init").assert().success();
}

fn create_client(dir: &TempDir, slug: &str) {
    copyloom(dir)
        .args(["client", "create", slug, "--name", "Acme Co"])
        .assert()
        .success();
}

fn edit(dir: &TempDir, slug: &str, op: &str, value: &str) {
    copyloom(dir)
        .args(["kb", "edit", slug, op, value])
        .assert()
        .success();
}

/// Fill eight of the fifteen checks (53%).
fn fill_to_threshold(dir: &TempDir, slug: &str) {
    edit(dir, slug, "set_value_proposition", "Invoices in one click");
    edit(dir, slug, "add_differentiator", "No setup fees");
    edit(dir, slug, "add_word_we_use", "effortless");
    edit(dir, slug, "add_banned_word", "cheap");
    edit(dir, slug, "set_sector", "Fintech");
    edit(dir, slug, "set_market", "SMB");
    edit(dir, slug, "set_category_maturity", "Growing");
    edit(dir, slug, "add_main_keyword", "invoicing");
}

/// Point the workspace at a mock content service with fast progress.
fn use_service(dir: &TempDir, url: &str) {
    let mut config = copyloom_core::config::Config::load(dir.path()).unwrap();
    config.generation.base_url = url.to_string();
    config.progress.generation_step_ms = 5;
    config.progress.generation_total_ms = 40;
    config.progress.chat_step_ms = 5;
    config.progress.chat_total_ms = 20;
    config.save(dir.path()).unwrap();
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.arg("--json").output().unwrap();
    assert!(output.status.success(), "{:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// copyloom init / config
// ---------------------------------------------------------------------------

#[test]
fn init_creates_workspace() {
    let dir = TempDir::new().unwrap();
    copyloom(&dir).arg("init").assert().success();

    assert!(dir.path().join(".copyloom").is_dir());
    assert!(dir.path().join(".copyloom/clients").is_dir());
    assert!(dir.path().join(".copyloom/config.yaml").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    copyloom(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists"));
}

#[test]
fn config_validate_passes_on_fresh_workspace() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    copyloom(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No warnings"));
}

#[test]
fn config_validate_fails_on_bad_base_url() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    use_service(&dir, "ftp://nowhere");
    copyloom(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("config validation found errors"));
}

// ---------------------------------------------------------------------------
// clients and knowledge base
// ---------------------------------------------------------------------------

#[test]
fn client_create_and_list() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    create_client(&dir, "acme");

    copyloom(&dir)
        .args(["client", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("acme"))
        .stdout(predicate::str::contains("0%"));
}

#[test]
fn duplicate_client_fails() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    create_client(&dir, "acme");
    copyloom(&dir)
        .args(["client", "create", "acme"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[test]
fn completeness_tracks_edits() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    create_client(&dir, "acme");
    fill_to_threshold(&dir, "acme");

    let json = json_output(copyloom(&dir).args(["completeness", "acme"]));
    assert_eq!(json["filled_fields"], 8);
    assert_eq!(json["completion_percentage"], 53);
    assert_eq!(json["can_generate_content"], true);

    edit(&dir, "acme", "remove_main_keyword", "0");
    let json = json_output(copyloom(&dir).args(["completeness", "acme"]));
    assert_eq!(json["completion_percentage"], 47);
    assert_eq!(json["missing_fields"][0], "Brand personality");
}

#[test]
fn out_of_range_remove_fails() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    create_client(&dir, "acme");
    copyloom(&dir)
        .args(["kb", "edit", "acme", "remove_persona", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("out of range"));
}

#[test]
fn kb_import_replaces_knowledge_base() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    create_client(&dir, "acme");
    let file = dir.path().join("kb.yaml");
    std::fs::write(
        &file,
        "business:\n  sector: Retail\n  products:\n    - name: Gift cards\nseo:\n  search_intents: [buy gift card]\n",
    )
    .unwrap();

    copyloom(&dir)
        .args(["kb", "import", "acme"])
        .arg(&file)
        .assert()
        .success();

    let json = json_output(copyloom(&dir).args(["kb", "show", "acme"]));
    assert_eq!(json["business"]["sector"], "Retail");
    assert_eq!(json["business"]["products"][0]["name"], "Gift cards");
}

// ---------------------------------------------------------------------------
// readiness / generate / chat
// ---------------------------------------------------------------------------

#[test]
fn readiness_reports_first_failing_rule() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    create_client(&dir, "acme");

    copyloom(&dir)
        .args(["readiness", "acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no_category_selected"));

    copyloom(&dir)
        .args(["readiness", "acme", "--category", "post"])
        .assert()
        .success()
        .stdout(predicate::str::contains("no_source_or_context"));

    copyloom(&dir)
        .args(["readiness", "acme", "--category", "post", "--context", "Launch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("knowledge_base_incomplete"));
}

#[test]
fn generate_is_blocked_below_threshold() {
    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    create_client(&dir, "acme");
    copyloom(&dir)
        .args(["generate", "acme", "--category", "blog", "--context", "Launch"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("generation blocked"));
}

#[test]
fn generate_and_chat_against_service() {
    let mut server = mockito::Server::new();
    let generate = server
        .mock("POST", "/generate-content")
        .match_body(mockito::Matcher::PartialJson(serde_json::json!({
            "client": "acme",
            "category": "blog",
            "use_knowledge_base": true,
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"id":"blog-42"}"#)
        .create();
    let chat = server
        .mock("POST", "/chat")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"id":"m-2","sender":"assistant","content":"Shorter version","timestamp":"2026-10-19T10:00:00Z"}"#,
        )
        .create();

    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    use_service(&dir, &server.url());
    create_client(&dir, "acme");
    fill_to_threshold(&dir, "acme");

    copyloom(&dir)
        .args(["generate", "acme", "--category", "blog", "--context", "Launch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("blog-42"));
    generate.assert();

    copyloom(&dir)
        .args(["chat", "acme", "blog-42", "Make it shorter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Shorter version"));
    chat.assert();

    let json = json_output(copyloom(&dir).args(["content", "show", "acme", "blog-42"]));
    let messages = json["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["sender"], "user");
    assert_eq!(messages[1]["content"], "Shorter version");
}

#[test]
fn generate_reports_service_failure() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/generate-content")
        .with_status(500)
        .with_body("boom")
        .create();

    let dir = TempDir::new().unwrap();
    init_workspace(&dir);
    use_service(&dir, &server.url());
    create_client(&dir, "acme");
    fill_to_threshold(&dir, "acme");

    copyloom(&dir)
        .args(["generate", "acme", "--category", "post", "--context", "Hiring"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("content service failed"));

    copyloom(&dir)
        .args(["content", "list", "acme"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No content yet"));
}
