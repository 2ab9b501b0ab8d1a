use std::error::Error;
use std::io::Write;

use tempfile::NamedTempFile;

use runwatch::config::{ConfigFile, load_and_validate, validate_config};

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> Result<NamedTempFile, Box<dyn Error>> {
    let mut file = NamedTempFile::new()?;
    write!(file, "{contents}")?;
    Ok(file)
}

#[test]
fn empty_file_gets_all_defaults() -> TestResult {
    let file = write_config("")?;
    let cfg = load_and_validate(file.path())?;

    assert!(cfg.command.is_none());
    assert_eq!(cfg.run.poll_interval_ms, 300);
    assert!(cfg.run.suppress_blank_stdout);
    assert!(!cfg.run.suppress_blank_stderr);
    assert!(cfg.run.progress_pattern.contains("Progress"));
    Ok(())
}

#[test]
fn full_command_section_is_parsed() -> TestResult {
    let file = write_config(
        r#"
[command]
cmd = "sdnaintegral"
args = ["--net", "network.shp"]
cwd = "/data/run"
env_remove = ["PYTHONHOME"]
inherit_env = true

[command.env]
PYTHONUNBUFFERED = "1"

[run]
poll_interval_ms = 50
suppress_blank_stderr = true
"#,
    )?;
    let cfg = load_and_validate(file.path())?;

    let command = cfg.command.as_ref().expect("command section");
    assert_eq!(command.cmd, "sdnaintegral");
    assert_eq!(command.args, vec!["--net", "network.shp"]);
    assert!(!command.shell);
    assert_eq!(command.cwd.as_deref(), Some("/data/run"));
    assert_eq!(command.env.get("PYTHONUNBUFFERED").map(String::as_str), Some("1"));
    assert_eq!(command.env_remove, vec!["PYTHONHOME"]);

    assert_eq!(cfg.run.poll_interval_ms, 50);
    assert!(cfg.run.suppress_blank_stderr);
    Ok(())
}

#[test]
fn custom_progress_pattern_is_accepted() -> TestResult {
    let file = write_config(
        r#"
[run]
progress_pattern = '^\[(\d+)/100\]$'
"#,
    )?;
    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.run.progress_pattern, r"^\[(\d+)/100\]$");
    Ok(())
}

#[test]
fn pattern_without_capture_group_is_rejected() -> TestResult {
    let file = write_config(
        r#"
[run]
progress_pattern = '^done$'
"#,
    )?;
    assert!(load_and_validate(file.path()).is_err());
    Ok(())
}

#[test]
fn unparseable_pattern_is_rejected() -> TestResult {
    let file = write_config(
        r#"
[run]
progress_pattern = '('
"#,
    )?;
    assert!(load_and_validate(file.path()).is_err());
    Ok(())
}

#[test]
fn zero_poll_interval_is_rejected() -> TestResult {
    let file = write_config(
        r#"
[run]
poll_interval_ms = 0
"#,
    )?;
    assert!(load_and_validate(file.path()).is_err());
    Ok(())
}

#[test]
fn empty_cmd_is_rejected() -> TestResult {
    let file = write_config(
        r#"
[command]
cmd = "  "
"#,
    )?;
    assert!(load_and_validate(file.path()).is_err());
    Ok(())
}

#[test]
fn shell_mode_with_args_is_rejected() -> TestResult {
    let file = write_config(
        r#"
[command]
cmd = "echo hi"
shell = true
args = ["stray"]
"#,
    )?;
    assert!(load_and_validate(file.path()).is_err());
    Ok(())
}

#[test]
fn default_config_value_passes_validation() {
    assert!(validate_config(&ConfigFile::default()).is_ok());
}
