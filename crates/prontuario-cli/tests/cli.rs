use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::fs;
use std::path::Path;
use std::process::Output;
use tempfile::TempDir;

fn prontuario(home: &Path, db_path: &Path, args: &[&str]) -> Output {
    cargo_bin_cmd!("prontuario")
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env_remove("RUST_LOG")
        .args(["--db-path", db_path.to_str().expect("db path")])
        .args(args)
        .output()
        .expect("run command")
}

fn run_cmd(home: &Path, db_path: &Path, args: &[&str]) -> String {
    let output = prontuario(home, db_path, args);
    assert!(output.status.success(), "command failed: {:?}", output);
    String::from_utf8(output.stdout).expect("utf8")
}

fn run_cmd_json(home: &Path, db_path: &Path, args: &[&str]) -> Value {
    let mut full = vec!["--json"];
    full.extend_from_slice(args);
    let output = prontuario(home, db_path, &full);
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).expect("parse json")
}

/// Runs a command expected to fail and returns its stderr.
fn run_fail(home: &Path, db_path: &Path, args: &[&str], code: i32) -> String {
    let output = prontuario(home, db_path, args);
    assert_eq!(output.status.code(), Some(code), "unexpected status: {:?}", output);
    String::from_utf8(output.stderr).expect("utf8")
}

fn setup() -> (TempDir, std::path::PathBuf) {
    let temp = TempDir::new().expect("temp dir");
    let db_path = temp.path().join("prontuario.sqlite3");
    run_cmd(
        temp.path(),
        &db_path,
        &["practitioner", "add", "--username", "dra.souza", "--name", "Dra. Souza"],
    );
    (temp, db_path)
}

fn add_patient(home: &Path, db_path: &Path, name: &str, cpf: &str, phone: &str) -> String {
    let detail = run_cmd_json(
        home,
        db_path,
        &[
            "--practitioner",
            "dra.souza",
            "add-patient",
            "--name",
            name,
            "--birth-date",
            "15/03/1985",
            "--cpf",
            cpf,
            "--sex",
            "F",
            "--phone",
            phone,
            "--address",
            "Rua das Flores, 10",
            "--city",
            "São Paulo",
            "--state",
            "sp",
            "--cep",
            "01001000",
        ],
    );
    detail["id"].as_str().expect("id").to_string()
}

#[test]
fn patient_lifecycle_flow() {
    let (temp, db_path) = setup();
    let home = temp.path();
    let id = add_patient(home, &db_path, "ana  maria silva", "11144477735", "11987654321");
    let as_owner = |args: &[&str]| {
        let mut full = vec!["--practitioner", "dra.souza"];
        full.extend_from_slice(args);
        full.into_iter().map(str::to_string).collect::<Vec<_>>()
    };

    let args = as_owner(&["show", &id]);
    let args: Vec<&str> = args.iter().map(String::as_str).collect();
    let detail = run_cmd_json(home, &db_path, &args);
    assert_eq!(detail["full_name"], "Ana Maria Silva");
    assert_eq!(detail["cpf"], "111.444.777-35");
    assert_eq!(detail["phone"], "(11) 98765-4321");
    assert_eq!(detail["cep"], "01001-000");
    assert_eq!(detail["state"], "SP");
    assert_eq!(detail["birth_date"], "1985-03-15");
    assert_eq!(detail["sex"], "F");
    assert_eq!(detail["active"], true);

    let text = run_cmd(home, &db_path, &args);
    assert!(text.contains("birth_date: 15/03/1985"));
    assert!(text.contains("allergies: -"));

    let list = run_cmd_json(
        home,
        &db_path,
        &["--practitioner", "dra.souza", "list", "--search", "11144477735"],
    );
    assert_eq!(list["total_active"], 1);
    assert_eq!(list["patients"].as_array().expect("array").len(), 1);

    let edited = run_cmd_json(
        home,
        &db_path,
        &[
            "--practitioner",
            "dra.souza",
            "edit-patient",
            &id,
            "--allergies",
            "penicilina",
            "--blood-type",
            "O-",
        ],
    );
    assert_eq!(edited["allergies"], "penicilina");
    assert_eq!(edited["blood_type"], "O-");
    assert_eq!(edited["full_name"], "Ana Maria Silva");

    run_cmd(
        home,
        &db_path,
        &["--practitioner", "dra.souza", "deactivate-patient", &id],
    );
    let list = run_cmd_json(home, &db_path, &["--practitioner", "dra.souza", "list"]);
    assert_eq!(list["total_active"], 0);
    assert!(list["patients"].as_array().expect("array").is_empty());
    let list = run_cmd_json(
        home,
        &db_path,
        &["--practitioner", "dra.souza", "list", "--include-inactive"],
    );
    assert_eq!(list["patients"][0]["active"], false);

    run_cmd(
        home,
        &db_path,
        &["--practitioner", "dra.souza", "reactivate-patient", &id],
    );
    run_cmd(home, &db_path, &["--practitioner", "dra.souza", "delete", &id]);
    run_fail(home, &db_path, &args, 2);
}

#[test]
fn duplicate_cpf_is_rejected() {
    let (temp, db_path) = setup();
    let home = temp.path();
    add_patient(home, &db_path, "Ana Silva", "111.444.777-35", "11987654321");
    let output = prontuario(
        home,
        &db_path,
        &[
            "--practitioner",
            "dra.souza",
            "add-patient",
            "--name",
            "Bruno Costa",
            "--birth-date",
            "1990-01-01",
            "--cpf",
            "11144477735",
            "--sex",
            "M",
            "--phone",
            "21912345678",
            "--address",
            "Av. Central, 5",
            "--city",
            "Rio de Janeiro",
            "--state",
            "RJ",
            "--cep",
            "20040-002",
        ],
    );
    assert_eq!(output.status.code(), Some(3), "unexpected status: {:?}", output);
}

#[test]
fn invalid_form_lists_every_failing_field() {
    let (temp, db_path) = setup();
    let stderr = run_fail(
        temp.path(),
        &db_path,
        &[
            "--practitioner",
            "dra.souza",
            "add-patient",
            "--name",
            "Ana",
            "--cpf",
            "123.456.789-00",
            "--phone",
            "1133334444",
        ],
        3,
    );
    assert!(stderr.contains("full_name"), "stderr: {stderr}");
    assert!(stderr.contains("cpf"), "stderr: {stderr}");
    assert!(stderr.contains("phone"), "stderr: {stderr}");
    assert!(stderr.contains("birth_date"), "stderr: {stderr}");

    let list = run_cmd_json(temp.path(), &db_path, &["--practitioner", "dra.souza", "list"]);
    assert_eq!(list["total_active"], 0);
}

#[test]
fn check_normalizes_and_reports() {
    let temp = TempDir::new().expect("temp dir");
    let db_path = temp.path().join("prontuario.sqlite3");

    let results = run_cmd_json(
        temp.path(),
        &db_path,
        &["check", "--cpf", "01234567890", "--cep", "01001000"],
    );
    let items = results.as_array().expect("array");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["field"], "cpf");
    assert_eq!(items[0]["normalized"], "012.345.678-90");
    assert_eq!(items[1]["normalized"], "01001-000");

    let output = prontuario(
        temp.path(),
        &db_path,
        &["--json", "check", "--phone", "11898765432"],
    );
    assert_eq!(output.status.code(), Some(3));
    let results: Value = serde_json::from_slice(&output.stdout).expect("parse json");
    assert_eq!(results[0]["error"]["reason"], "not_mobile_number");

    run_fail(temp.path(), &db_path, &["check"], 3);
}

#[test]
fn patient_commands_need_a_practitioner() {
    let (temp, db_path) = setup();
    run_fail(temp.path(), &db_path, &["list"], 3);
    run_fail(temp.path(), &db_path, &["--practitioner", "nobody", "list"], 2);
}

#[test]
fn config_selects_practitioner_and_flag_overrides() {
    let (temp, db_path) = setup();
    let home = temp.path();
    run_cmd(home, &db_path, &["practitioner", "add", "--username", "dr.lima"]);

    let config_dir = home.join("config").join("prontuario");
    fs::create_dir_all(&config_dir).expect("config dir");
    let config_path = config_dir.join("config.toml");
    fs::write(&config_path, "practitioner = \"dr.lima\"\n").expect("write config");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&config_path, fs::Permissions::from_mode(0o600))
            .expect("chmod config");
    }

    add_patient(home, &db_path, "Ana Silva", "11144477735", "11987654321");
    let own = run_cmd_json(home, &db_path, &["list"]);
    assert!(own["patients"].as_array().expect("array").is_empty());
    let other = run_cmd_json(home, &db_path, &["--practitioner", "dra.souza", "list"]);
    assert_eq!(other["patients"].as_array().expect("array").len(), 1);
}

#[test]
fn patients_are_private_to_their_practitioner() {
    let (temp, db_path) = setup();
    let home = temp.path();
    run_cmd(home, &db_path, &["practitioner", "add", "--username", "dr.lima"]);
    let id = add_patient(home, &db_path, "Ana Silva", "11144477735", "11987654321");

    run_fail(home, &db_path, &["--practitioner", "dr.lima", "show", &id], 2);
    run_fail(home, &db_path, &["--practitioner", "dr.lima", "delete", &id], 2);
    run_fail(
        home,
        &db_path,
        &["--practitioner", "dr.lima", "edit-patient", &id, "--notes", "x"],
        2,
    );
    run_fail(home, &db_path, &["--practitioner", "dr.lima", "show", "not-an-id"], 3);
}

#[test]
fn attach_and_detach_files() {
    let (temp, db_path) = setup();
    let home = temp.path();
    let id = add_patient(home, &db_path, "Ana Silva", "11144477735", "11987654321");

    let pdf = home.join("exame.pdf");
    fs::write(&pdf, b"%PDF-1.4\n").expect("write pdf");
    let attachment = run_cmd_json(
        home,
        &db_path,
        &[
            "--practitioner",
            "dra.souza",
            "attach",
            &id,
            "--kind",
            "document",
            "--title",
            "Hemograma",
            "--file",
            pdf.to_str().expect("pdf path"),
        ],
    );
    let stored = attachment["file_path"].as_str().expect("file path");
    assert!(stored.starts_with("documents/"), "stored: {stored}");
    let absolute = home.join("attachments").join(stored);
    assert!(absolute.exists());

    let detail = run_cmd_json(home, &db_path, &["--practitioner", "dra.souza", "show", &id]);
    assert_eq!(detail["documents"].as_array().expect("array").len(), 1);
    assert!(detail["photos"].as_array().expect("array").is_empty());

    run_fail(
        home,
        &db_path,
        &[
            "--practitioner",
            "dra.souza",
            "attach",
            &id,
            "--kind",
            "photo",
            "--title",
            "Foto",
            "--file",
            pdf.to_str().expect("pdf path"),
        ],
        3,
    );

    let attachment_id = attachment["id"].as_str().expect("attachment id");
    run_cmd(
        home,
        &db_path,
        &["--practitioner", "dra.souza", "detach", attachment_id],
    );
    assert!(!absolute.exists());
}

#[test]
fn backup_writes_snapshot_next_to_database() {
    let (temp, db_path) = setup();
    let report = run_cmd_json(temp.path(), &db_path, &["backup"]);
    let output = report["output"].as_str().expect("output");
    assert!(output.contains("backups"), "output: {output}");
    assert!(Path::new(output).exists());
    assert!(report["size_bytes"].as_u64().expect("size") > 0);

    let db = db_path.to_str().expect("db path");
    run_fail(temp.path(), &db_path, &["backup", "--out", db], 3);
}

#[test]
fn completions_render_without_database() {
    let temp = TempDir::new().expect("temp dir");
    let db_path = temp.path().join("prontuario.sqlite3");
    let script = run_cmd(temp.path(), &db_path, &["completions", "bash"]);
    assert!(script.contains("prontuario"));
    assert!(!db_path.exists());
}
