use clap::Parser;
use dedup_drive::cli::Cli;
use dedup_drive::config::ConfigError;
use dedup_drive::duplicates::FinderError;
use dedup_drive::error::ExitCode;
use dedup_drive::run_with_output;
use figment::Jail;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Run with an empty config file so the user's own config is never read.
fn run(jail: &mut Jail, args: &[&str]) -> (anyhow::Result<ExitCode>, String) {
    jail.create_file("empty.toml", "").unwrap();
    let mut argv = vec!["dedup-drive", "--config", "empty.toml", "-q"];
    argv.extend_from_slice(args);

    let cli = Cli::try_parse_from(argv).unwrap();
    let mut out = Vec::new();
    let result = run_with_output(&cli, &mut out);
    (result, String::from_utf8(out).unwrap())
}

fn hello_world(dir: &Path) {
    fs::write(dir.join("a.txt"), b"hello").unwrap();
    fs::write(dir.join("b.txt"), b"hello").unwrap();
    fs::write(dir.join("c.txt"), b"world").unwrap();
}

#[test]
fn test_missing_directory_is_config_error() {
    Jail::expect_with(|jail| {
        let (result, out) = run(jail, &[]);
        let err = result.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ConfigError>(),
            Some(ConfigError::MissingDirectory)
        ));
        assert_eq!(ExitCode::for_error(&err), ExitCode::ConfigError);
        assert!(out.is_empty());
        Ok(())
    });
}

#[test]
fn test_nonexistent_directory_is_general_error() {
    Jail::expect_with(|jail| {
        let (result, out) = run(jail, &["-d", "no/such/dir"]);
        let err = result.unwrap_err();

        assert!(err.downcast_ref::<FinderError>().is_some());
        assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
        assert!(out.is_empty());
        Ok(())
    });
}

#[test]
fn test_zero_workers_flag_is_config_error() {
    Jail::expect_with(|jail| {
        let dir = tempdir().unwrap();
        let root = dir.path().to_str().unwrap();

        let (result, _) = run(jail, &["-d", root, "--workers", "0"]);
        assert_eq!(
            ExitCode::for_error(&result.unwrap_err()),
            ExitCode::ConfigError
        );
        Ok(())
    });
}

#[test]
fn test_report_without_delete_keeps_files() {
    Jail::expect_with(|jail| {
        let dir = tempdir().unwrap();
        hello_world(dir.path());
        let root = dir.path().to_str().unwrap();

        let (result, out) = run(jail, &["-d", root]);

        assert_eq!(result.unwrap(), ExitCode::Success);
        assert!(out.contains("Errors (0):"));
        assert!(out.contains("Duplicates (1):"));
        assert!(out.contains("To delete the duplicate files run with --delete=true"));
        assert!(!out.contains("Deleting"));
        for name in ["a.txt", "b.txt", "c.txt"] {
            assert!(dir.path().join(name).exists());
        }
        Ok(())
    });
}

#[test]
fn test_report_with_delete_removes_one_of_pair() {
    Jail::expect_with(|jail| {
        let dir = tempdir().unwrap();
        hello_world(dir.path());
        let root = dir.path().to_str().unwrap();

        let (result, out) = run(jail, &["-d", root, "--delete=true"]);

        assert_eq!(result.unwrap(), ExitCode::Success);
        assert_eq!(out.matches("Deleting ").count(), 1);
        assert!(!out.contains("--delete=true"));
        let a = dir.path().join("a.txt").exists();
        let b = dir.path().join("b.txt").exists();
        assert!(a ^ b);
        assert!(dir.path().join("c.txt").exists());
        Ok(())
    });
}

#[test]
fn test_delete_false_is_report_only() {
    Jail::expect_with(|jail| {
        let dir = tempdir().unwrap();
        hello_world(dir.path());
        let root = dir.path().to_str().unwrap();

        let (result, _) = run(jail, &["-d", root, "--delete=false"]);

        assert_eq!(result.unwrap(), ExitCode::Success);
        assert!(dir.path().join("a.txt").exists());
        assert!(dir.path().join("b.txt").exists());
        Ok(())
    });
}

#[test]
fn test_json_output_with_delete() {
    Jail::expect_with(|jail| {
        let dir = tempdir().unwrap();
        hello_world(dir.path());
        let root = dir.path().to_str().unwrap();

        let (result, out) = run(jail, &["-d", root, "-o", "json", "--delete"]);
        assert_eq!(result.unwrap(), ExitCode::Success);

        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["duplicates"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["summary"]["total_files"], 3);
        assert_eq!(parsed["deletion"]["deleted"].as_array().unwrap().len(), 1);
        assert_eq!(parsed["deletion"]["bytes_freed"], 5);
        Ok(())
    });
}

#[test]
fn test_json_output_without_delete_has_no_deletion() {
    Jail::expect_with(|jail| {
        let dir = tempdir().unwrap();
        hello_world(dir.path());
        let root = dir.path().to_str().unwrap();

        let (result, out) = run(jail, &["-d", root, "--output", "json"]);
        assert_eq!(result.unwrap(), ExitCode::Success);

        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert!(parsed.get("deletion").is_none());
        assert_eq!(parsed["errors"].as_array().unwrap().len(), 0);
        Ok(())
    });
}

#[test]
fn test_delete_hint_printed_without_duplicates() {
    Jail::expect_with(|jail| {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("only.txt"), b"single").unwrap();
        let root = dir.path().to_str().unwrap();

        let (result, out) = run(jail, &["-d", root]);

        assert_eq!(result.unwrap(), ExitCode::Success);
        assert!(out.contains("Duplicates (0):"));
        assert!(out.trim_end().ends_with("To delete the duplicate files run with --delete=true"));
        Ok(())
    });
}
