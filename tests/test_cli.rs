
use anyhow::Result;
use std::fs;
use std::process::Command;
use tempfile::TempDir;
use test_utils::create_kinase_directory;

fn kinase_dir() -> Result<TempDir> {
    let dir = TempDir::new()?;
    create_kinase_directory(dir.path(), &["PKA", "PKG", "AKT1", "CK2A1"]);
    Ok(dir)
}

#[test]
fn test_pepsweep_writes_report() -> Result<()> {
    let dir = kinase_dir()?;
    let output = dir.path().join("report.tsv");

    let status = Command::new(env!("CARGO_BIN_EXE_pepsweep"))
        .arg("-d")
        .arg(dir.path())
        .args(["-t", "PKA", "-k", "PKG", "-n", "20", "--quiet", "-j", "2"])
        .arg("-o")
        .arg(&output)
        .status()?;
    assert!(status.success());

    let text = fs::read_to_string(&output)?;
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("rank\tsequence\tkinase\tgroup\tscore"));
    // 20 peptides x 4 kinases
    assert_eq!(lines.len(), 1 + 20 * 4);
    Ok(())
}

#[test]
fn test_pepsweep_lowest_csv_to_stdout() -> Result<()> {
    let dir = kinase_dir()?;

    let output = Command::new(env!("CARGO_BIN_EXE_pepsweep"))
        .arg("-d")
        .arg(dir.path())
        .args(["-t", "PKA", "-n", "5", "--lowest", "--csv", "--quiet"])
        .output()?;
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.starts_with("rank,sequence,kinase,group,score,min,max,range,normalized\n"));
    assert_eq!(stdout.lines().count(), 1 + 5 * 4);
    Ok(())
}

#[test]
fn test_pepsweep_missing_target_fails() -> Result<()> {
    let dir = kinase_dir()?;

    let output = Command::new(env!("CARGO_BIN_EXE_pepsweep"))
        .arg("-d")
        .arg(dir.path())
        .args(["-t", "NOPE", "--quiet"])
        .output()?;

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("NOPE"), "Should name the missing kinase, got: {stderr}");
    Ok(())
}

#[test]
fn test_scoredist_table() -> Result<()> {
    let dir = kinase_dir()?;

    let output = Command::new(env!("CARGO_BIN_EXE_scoredist"))
        .arg("-d")
        .arg(dir.path())
        .args([
            "-t",
            "PKA",
            "-k",
            "PKG",
            "AKT1",
            "-s",
            "RRASSLAAAA",
            "AAAAASAAAA",
            "--quiet",
        ])
        .output()?;
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout)?;
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines[0], "kinase\tseq\tscore\tgroup");
    assert_eq!(lines.len(), 1 + 2 * 4);
    assert!(lines[1].starts_with("PKA\tRRASSLAAAA\t"));
    assert!(lines[1].ends_with("\ttarget"));
    assert!(lines[4].ends_with("\tbackground"));
    Ok(())
}

#[test]
fn test_scoredist_rejects_wrong_length() -> Result<()> {
    let dir = kinase_dir()?;

    let output = Command::new(env!("CARGO_BIN_EXE_scoredist"))
        .arg("-d")
        .arg(dir.path())
        .args(["-t", "PKA", "-s", "RRAS", "--quiet"])
        .output()?;
    assert!(!output.status.success());
    Ok(())
}
