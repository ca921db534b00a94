use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_config,
            xdg_state,
        }
    }

    fn write_config(&self, contents: &str) {
        let dir = self.xdg_config.join("vidsynth");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        fs::write(dir.join("config.toml"), contents).expect("failed to write config");
    }
}

fn run_bin(env: &CliTestEnv, args: &[&str], vars: &[(&str, &str)]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("vidsynth"));

    let mut command = Command::new(bin_path);

    command
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("VIDSYNTH_API_BASE")
        .env_remove("RUST_LOG");
    for (key, value) in vars {
        command.env(key, value);
    }

    command
        .output()
        .unwrap_or_else(|e| panic!("failed to execute vidsynth: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "vidsynth {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

#[test]
fn version_flag_prints_package_version() {
    let env = CliTestEnv::new();

    let output = run_bin(&env, &["--version"], &[]);
    assert_success(&["--version"], &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")), "got:\n{stdout}");
}

#[test]
fn print_config_shows_defaults_without_config_file() {
    let env = CliTestEnv::new();

    let output = run_bin(&env, &["--print-config"], &[]);
    assert_success(&["--print-config"], &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[api]"), "got:\n{stdout}");
    assert!(stdout.contains("base_url = \"http://127.0.0.1:8000\""));
    assert!(stdout.contains("reconnect_ms = 3000"));
    assert!(stdout.contains("default_k = 3"));
}

#[test]
fn print_config_applies_overrides_in_order() {
    let env = CliTestEnv::new();
    env.write_config("[api]\nbase_url = \"http://from-file:9000/\"\n\n[sandbox]\ndefault_k = 42\n");

    let from_file = run_bin(&env, &["--print-config"], &[]);
    assert_success(&["--print-config"], &from_file);
    let stdout = String::from_utf8_lossy(&from_file.stdout);
    assert!(stdout.contains("base_url = \"http://from-file:9000\""), "got:\n{stdout}");
    assert!(stdout.contains("default_k = 10"));

    let from_env = run_bin(
        &env,
        &["--print-config"],
        &[("VIDSYNTH_API_BASE", "http://from-env:7000")],
    );
    assert_success(&["--print-config"], &from_env);
    let stdout = String::from_utf8_lossy(&from_env.stdout);
    assert!(stdout.contains("base_url = \"http://from-env:7000\""), "got:\n{stdout}");

    let args = ["--print-config", "--api-base", "https://from-flag/"];
    let from_flag = run_bin(&env, &args, &[("VIDSYNTH_API_BASE", "http://from-env:7000")]);
    assert_success(&args, &from_flag);
    let stdout = String::from_utf8_lossy(&from_flag.stdout);
    assert!(stdout.contains("base_url = \"https://from-flag\""), "got:\n{stdout}");
}

#[test]
fn invalid_api_base_is_rejected() {
    let env = CliTestEnv::new();

    let output = run_bin(&env, &["--print-config", "--api-base", "ftp://nope"], &[]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid --api-base"), "got:\n{stderr}");
}
