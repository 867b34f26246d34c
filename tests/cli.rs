use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::process::Command;
use tempfile::tempdir;

const LOANS: &str = "\
id,funded_amount,loan_amount,sector,country,region,funded_time,borrower_genders
653051,300.0,300.0,Food,Pakistan,Lahore,2014-01-02 10:06:32+00:00,female
653053,200.0,400.0,Retail,Pakistan,Lahore,2014-01-03 08:00:00+00:00,male
653068,150.0,0,Food,India,Maharashtra,2014-01-02 09:17:23+00:00,female
";

#[test]
fn cli_shows_help() {
    let mut cmd = Command::cargo_bin("kiva-dashboard").unwrap();
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("kiva-dashboard"));
}

#[test]
fn prints_kpis_and_writes_outputs() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("loans.csv");
    fs::write(&csv, LOANS).unwrap();
    let out = dir.path().join("out");

    let mut cmd = Command::cargo_bin("kiva-dashboard").unwrap();
    cmd.arg("--csv")
        .arg(&csv)
        .args(["--region", "Lahore", "--mode", "all", "--total-scope", "filtered"])
        .arg("--out-dir")
        .arg(&out);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Total Loans: 2"))
        .stdout(predicate::str::contains("Total Funding: 700.00"))
        .stdout(predicate::str::contains("Average Funding Rate: 75.00%"));

    let view = fs::read_to_string(out.join("filtered_view.csv")).unwrap();
    assert_eq!(view.lines().count(), 3);
    assert!(out.join("rate_by_day.csv").exists());
    assert!(out.join("rate_by_sector.csv").exists());
    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("summary.json")).unwrap()).unwrap();
    assert_eq!(summary["kpis"]["loan_count"], 2);
    assert_eq!(summary["quality"]["zero_loan_amount"], 1);
    assert_eq!(summary["config"]["combination_mode"], "all");
}

#[test]
fn empty_view_renders_placeholder() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("loans.csv");
    fs::write(&csv, LOANS).unwrap();

    let mut cmd = Command::cargo_bin("kiva-dashboard").unwrap();
    cmd.arg("--csv")
        .arg(&csv)
        .args(["--region", "Nowhere", "--mode", "all"]);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Total Loans: 0"))
        .stdout(predicate::str::contains("Average Funding Rate: n/a"));
}

#[test]
fn missing_column_fails_with_its_name() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("bad.csv");
    fs::write(&csv, "id,region,country,sector,funded_time,funded_amount,loan_amount\n1,X,Y,Food,,1,1\n")
        .unwrap();

    let mut cmd = Command::cargo_bin("kiva-dashboard").unwrap();
    cmd.arg("--csv").arg(&csv);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("borrower_genders"));
}

#[test]
fn duplicated_column_fails_instead_of_loading_nothing() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("dup.csv");
    fs::write(
        &csv,
        "id,region,country,sector,borrower_genders,funded_time,funded_amount,loan_amount,region\n\
         1,X,Y,Food,female,2017-01-01,10,10,X\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("kiva-dashboard").unwrap();
    cmd.arg("--csv").arg(&csv);
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("duplicated column(s): region"))
        .stdout(predicate::str::contains("Total Loans").not());
}

#[test]
fn missing_ids_alone_do_not_report_undefined_rates() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("noid.csv");
    fs::write(
        &csv,
        "id,region,country,sector,borrower_genders,funded_time,funded_amount,loan_amount\n\
         ,Lahore,Pakistan,Food,female,2014-01-02,100,100\n",
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("kiva-dashboard").unwrap();
    cmd.arg("--csv").arg(&csv);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1 rows without id"))
        .stdout(predicate::str::contains("undefined funding rate").not());
}
