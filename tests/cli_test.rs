//! End-to-end runs of the binary against stand-in engine executables.
#![cfg(unix)]

use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};
use tempfile::{tempdir, TempDir};

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: tempdir().unwrap(),
        }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn script(&self, name: &str, body: &str) -> PathBuf {
        let path = self.path(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(format!("#!/bin/sh\n{}\n", body).as_bytes())
            .unwrap();
        // Closed before exec, or the kernel reports the file busy.
        file.sync_all().unwrap();
        drop(file);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    /// Every engine missing unless a test installs a stand-in.
    fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_castvoice"));
        cmd.current_dir(self.dir.path())
            .env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path())
            .env("RUST_LOG", "info")
            .env("CASTVOICE_PYTHON_BINARY", "/nonexistent/python3")
            .env("CASTVOICE_PIPER_BINARY", "/nonexistent/piper")
            .env("CASTVOICE_ESPEAK_BINARY", "/nonexistent/espeak-ng")
            .env("CASTVOICE_FFMPEG_BINARY", "/nonexistent/ffmpeg")
            .env("CASTVOICE_GTTS_BASE_URL", "http://127.0.0.1:9")
            .env("CASTVOICE_GTTS_TIMEOUT_SECS", "2")
            .stdin(Stdio::null());
        cmd
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn working_piper(sandbox: &Sandbox) -> PathBuf {
    // argv: --model M --output_file OUT
    sandbox.script("piper", "cat > \"$4\"")
}

#[test]
fn test_literal_text_with_piper() {
    let sandbox = Sandbox::new();
    let piper = working_piper(&sandbox);
    let out = sandbox.path("x.wav");

    let output = sandbox
        .command()
        .env("CASTVOICE_PIPER_BINARY", &piper)
        .args(["--text", "Hello", "--out"])
        .arg(&out)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout(&output));
    assert_eq!(fs::read_to_string(&out).unwrap(), "Hello");
    assert!(stdout(&output).contains("Voice generated with Piper"));
}

#[test]
fn test_empty_text_file_fails_before_any_backend() {
    let sandbox = Sandbox::new();
    let marker = sandbox.path("piper-ran");
    let piper = sandbox.script(
        "piper",
        &format!("touch {}; cat > \"$4\"", marker.display()),
    );
    let text = sandbox.path("empty.txt");
    fs::write(&text, "   \n").unwrap();
    let out = sandbox.path("x.wav");

    let output = sandbox
        .command()
        .env("CASTVOICE_PIPER_BINARY", &piper)
        .arg("--text")
        .arg(&text)
        .arg("--out")
        .arg(&out)
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("No text provided"));
    assert!(!marker.exists());
    assert!(!out.exists());
}

#[test]
fn test_text_from_stdin_and_nested_output_dir() {
    let sandbox = Sandbox::new();
    let piper = working_piper(&sandbox);
    let out = sandbox.path("broadcasts/2026/10/x.wav");

    let mut child = sandbox
        .command()
        .env("CASTVOICE_PIPER_BINARY", &piper)
        .arg("--out")
        .arg(&out)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all("أخبار المساء".as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();

    assert_eq!(output.status.code(), Some(0), "stdout: {}", stdout(&output));
    assert_eq!(fs::read_to_string(&out).unwrap(), "أخبار المساء");
}

#[test]
fn test_all_backends_fail() {
    let sandbox = Sandbox::new();
    let voice = sandbox.path("anchor.wav");
    fs::write(&voice, b"RIFF").unwrap();
    // Each stand-in leaves a partial file behind before failing.
    let python = sandbox.script("python3", "cat >/dev/null; echo partial > \"$5\"; exit 1");
    let piper = sandbox.script("piper", "cat > \"$4\"; exit 1");
    let espeak = sandbox.script("espeak-ng", "echo partial > \"$6\"; echo 'no voice' >&2; exit 1");
    let out = sandbox.path("x.wav");

    let output = sandbox
        .command()
        .env("CASTVOICE_PYTHON_BINARY", &python)
        .env("CASTVOICE_PIPER_BINARY", &piper)
        .env("CASTVOICE_ESPEAK_BINARY", &espeak)
        .args(["--text", "Hello", "--voice"])
        .arg(&voice)
        .arg("--out")
        .arg(&out)
        .output()
        .unwrap();

    let log = stdout(&output);
    assert_eq!(output.status.code(), Some(1));
    assert!(log.contains("All TTS methods failed"));
    assert!(log.contains("espeak-ng error: no voice"));
    assert!(!out.exists());
}

#[test]
fn test_espeak_is_last_resort() {
    let sandbox = Sandbox::new();
    let espeak = sandbox.script("espeak-ng", "printf RIFF > \"$6\"");
    let out: PathBuf = sandbox.path("x.wav");

    let output = sandbox
        .command()
        .env("CASTVOICE_ESPEAK_BINARY", &espeak)
        .args(["--text", "Hello", "--lang", "en", "--out"])
        .arg(&out)
        .output()
        .unwrap();

    let log = stdout(&output);
    assert_eq!(output.status.code(), Some(0), "stdout: {}", log);
    assert!(log.contains("Piper not installed"));
    assert!(log.contains("Voice generated with espeak-ng"));
    assert!(Path::new(&out).exists());
}

#[test]
fn test_check_lists_backends() {
    let sandbox = Sandbox::new();
    let piper = working_piper(&sandbox);

    let output = sandbox
        .command()
        .env("CASTVOICE_PIPER_BINARY", &piper)
        .arg("--check")
        .output()
        .unwrap();

    let log = stdout(&output);
    assert_eq!(output.status.code(), Some(0));
    assert!(log.contains("piper"));
    assert!(log.contains("available"));
    assert!(log.contains("missing"));
}

#[test]
fn test_invalid_backend_order_is_rejected() {
    let sandbox = Sandbox::new();

    let output = sandbox
        .command()
        .env("CASTVOICE_BACKEND_ORDER", "piper,festival")
        .args(["--text", "Hello", "--out"])
        .arg(sandbox.path("x.wav"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
}
