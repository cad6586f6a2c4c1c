#![cfg(unix)]

use castvoice::backends::gtts::intermediate_path;
use castvoice::backends::{BackendKind, GttsBackend, PiperBackend, SynthesisRequest};
use castvoice::config_loader::Settings;
use castvoice::orchestrator::Orchestrator;
use mockito::Matcher;
use std::fs;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use tempfile::tempdir;

#[test]
fn test_cloud_mp3_is_bridged_to_requested_wav() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/translate_tts")
        .match_query(Matcher::UrlEncoded("tl".into(), "ar".into()))
        .with_status(200)
        .with_header("content-type", "audio/mpeg")
        .with_body("ID3-mp3-bytes")
        .create();

    let dir = tempdir().unwrap();
    // Stand-in ffmpeg: copy the input (after -i) to the last argument.
    let ffmpeg = dir.path().join("ffmpeg");
    let mut file = fs::File::create(&ffmpeg).unwrap();
    file.write_all(
        b"#!/bin/sh\nwhile [ \"$1\" != \"-i\" ]; do shift; done\nin=\"$2\"\nfor a; do last=\"$a\"; done\ncp \"$in\" \"$last\"\n",
    )
    .unwrap();
    file.sync_all().unwrap();
    drop(file);
    fs::set_permissions(&ffmpeg, fs::Permissions::from_mode(0o755)).unwrap();

    let settings = Settings {
        piper_binary: "/nonexistent/piper".to_string(),
        ffmpeg_binary: ffmpeg.to_string_lossy().into_owned(),
        gtts_base_url: server.url(),
        gtts_timeout_secs: 5,
        ..Settings::default()
    };
    let orch = Orchestrator::new(vec![
        Box::new(PiperBackend::new(&settings)),
        Box::new(GttsBackend::new(&settings)),
    ]);

    let out = dir.path().join("bulletin/news.wav");
    let req = SynthesisRequest::new("أخبار الساعة", "ar", None, &out).unwrap();
    let outcome = orch.run(&req).unwrap();

    mock.assert();
    assert_eq!(outcome.winner, BackendKind::Gtts);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(out.extension().unwrap(), "wav");
    assert_eq!(fs::read(&out).unwrap(), b"ID3-mp3-bytes");
    assert!(!intermediate_path(&out).exists());
}
