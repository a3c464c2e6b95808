use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use predicates::prelude::*;

const SAMPLE_VTT: &str = "WEBVTT\n\n\
    00:00:00.000 --> 00:00:05.000\nWelcome to the course\n\n\
    00:01:00.000 --> 00:01:05.000\nFirst topic begins\n\n\
    00:02:05.000 --> 00:02:10.000\nSecond topic begins\n\n\
    00:03:30.000 --> 00:03:40.000\nThird topic begins\n\n\
    00:05:00.000 --> 00:05:10.000\nClosing thoughts\n";

fn write_vtt(dir: &tempfile::TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("talk.vtt");
    fs::write(&path, content).unwrap();
    path
}

fn glavki() -> Command {
    let mut cmd = Command::cargo_bin("glavki").unwrap();
    // keep runs hermetic: no provider keys, no inference
    cmd.env_remove("XAI_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("GEMINI_API_KEY");
    cmd
}

#[test]
fn rejects_out_of_range_chapter_counts() {
    let dir = tempfile::tempdir().unwrap();
    let vtt = write_vtt(&dir, SAMPLE_VTT);

    glavki()
        .arg(&vtt)
        .arg("0")
        .assert()
        .failure()
        .stderr(predicate::str::contains("chapter count"));

    glavki()
        .arg(&vtt)
        .arg("500")
        .assert()
        .failure()
        .stderr(predicate::str::contains("chapter count"));
}

#[test]
fn rejects_missing_source_files() {
    let dir = tempfile::tempdir().unwrap();
    glavki()
        .arg(dir.path().join("nope.vtt"))
        .arg("3")
        .assert()
        .failure()
        .stderr(predicate::str::contains("source file not found"));
}

#[test]
fn empty_transcript_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    let vtt = write_vtt(&dir, "WEBVTT\n");

    glavki()
        .arg(&vtt)
        .arg("3")
        .arg("--force")
        .assert()
        .failure()
        .stderr(predicate::str::contains("no segments"));
}

#[test]
fn falls_back_to_time_based_chapters_without_an_api_key() {
    let dir = tempfile::tempdir().unwrap();
    let vtt = write_vtt(&dir, SAMPLE_VTT);
    let out_dir = dir.path().join("chapters");

    glavki()
        .arg(&vtt)
        .arg("3")
        .arg("--force")
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("CHAPTERS:"))
        .stdout(predicate::str::contains("00:00:00 Introduction"));

    let doc = fs::read_to_string(out_dir.join("talk.txt")).unwrap();
    assert!(doc.starts_with("CHAPTERS:\n"));
    // deterministic path emits one line per requested chapter
    assert_eq!(doc.trim_end().lines().count(), 4);
}

#[test]
fn structured_layout_emits_intro_questions_and_closing() {
    let dir = tempfile::tempdir().unwrap();
    let vtt = write_vtt(&dir, SAMPLE_VTT);
    let out_dir = dir.path().join("chapters");

    glavki()
        .arg(&vtt)
        .arg("2")
        .arg("--questions")
        .arg("--force")
        .arg("--out-dir")
        .arg(&out_dir)
        .assert()
        .success()
        .stdout(predicate::str::contains("00:00:00 Introduction"))
        .stdout(predicate::str::contains("Q1: Topic 1"))
        .stdout(predicate::str::contains("Q2: Topic 2"))
        .stdout(predicate::str::contains("Closing Remarks"));
}

#[test]
fn output_file_name_honors_the_title_flag() {
    let dir = tempfile::tempdir().unwrap();
    let vtt = write_vtt(&dir, SAMPLE_VTT);
    let out_dir = dir.path().join("chapters");

    glavki()
        .arg(&vtt)
        .arg("2")
        .arg("--force")
        .arg("--out-dir")
        .arg(&out_dir)
        .arg("--title")
        .arg("My Video: A/B Test?")
        .assert()
        .success();

    assert!(out_dir.join("My_Video_AB_Test.txt").is_file());
}
