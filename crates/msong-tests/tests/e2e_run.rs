//! End-to-end runs against the stub oracle: configuration in, five artifacts out.

use msong_chain::artifacts::{EVENT_LIST_FILE, MIDI_FILE, NOTATION_FILE, SUMMARY_FILE, TABULAR_FILE};
use msong_chain::notation::beat_fragment;
use msong_chain::{
    generate_collection, Beat, BeatOracle, ChainError, EventListDocument, OracleError, Run, RunPhase,
};
use msong_tests::fixtures::{stub_config, FailingOracle, RunDirFixture, StubOracle};
use pretty_assertions::assert_eq;

const ROW_0: &str = "1000,0,2026,\"suspension | allegro | chord | counterpoint | chromatic | harmony | chromatic\",60,4,36,4,5c92beeb,test phrase";
const ROW_1: &str = "1007,1,2027,\"diatonic | scale | transpose | polyphony | allegro | symphony | ornament\",61,4,37,4,df4936c6,test phrase";

#[test]
fn three_token_tabular_output() {
    let artifacts = generate_collection(stub_config(3), StubOracle).unwrap();
    let lines: Vec<&str> = artifacts.tabular().split('\n').collect();

    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], msong_chain::aggregate::CSV_HEADER);
    assert_eq!(lines[1], ROW_0);
    assert_eq!(lines[2], ROW_1);
    assert!(lines[3].starts_with("1014,2,2028,\""));
    assert!(lines[3].ends_with(",62,4,38,4,f5f91c38,test phrase"));
    assert!(!artifacts.tabular().ends_with('\n'));
}

#[test]
fn three_token_event_list() {
    let artifacts = generate_collection(stub_config(3), StubOracle).unwrap();
    let json = artifacts.event_list_json();
    assert!(!json.ends_with('\n'));
    assert!(json.starts_with("{\n  \"metadata\": {\n    \"collection\": \"test phrase\""));

    let doc = EventListDocument::from_json(json).unwrap();
    assert_eq!(&doc, artifacts.event_list());
    assert_eq!(doc.metadata.key, "Eb major");
    assert_eq!(doc.metadata.num_tokens, 3);

    let beats: Vec<u32> = doc.events.iter().map(|e| e.beat).collect();
    assert_eq!(beats, vec![0, 1, 2]);
    let leads: Vec<u8> = doc.events.iter().map(|e| e.lead.pitch).collect();
    assert_eq!(leads, vec![60, 61, 62]);

    let value: serde_json::Value = serde_json::from_str(json).unwrap();
    assert_eq!(value["metadata"]["numTokens"], 3);
    assert_eq!(value["events"][1]["bass"]["pitch"], 37);
    assert_eq!(value["events"][1]["lead"]["duration"], 4);
}

#[test]
fn three_token_notation_and_summary() {
    let artifacts = generate_collection(stub_config(3), StubOracle).unwrap();
    let notation = artifacts.notation();

    assert!(notation.starts_with("X:1\n"));
    assert!(notation.contains("K:Eb\n"));
    assert!(notation.contains("C:Collection: \"test phrase\"\n"));
    assert_eq!(notation.matches("[V:1]").count(), 3);
    assert!(notation.contains("% Token 1000 - Year 2026 - Beat 0\n[V:1] c/2 |\n[V:2] C,/2 |\n"));
    assert!(notation.contains("% Token 1014 - Year 2028 - Beat 2\n"));

    let summary = artifacts.summary();
    assert!(summary.starts_with("# Blockchain Simulation Output\n"));
    assert!(summary.contains("**Collection:** test phrase\n"));
    assert!(summary.contains("**Tokens:** 3\n"));
    assert!(summary.contains("**Years:** 2026 to 2028\n"));
}

#[test]
fn midi_has_three_tracks() {
    let artifacts = generate_collection(stub_config(3), StubOracle).unwrap();
    let midi = artifacts.midi().unwrap();
    assert_eq!(&midi[0..4], b"MThd");
    // format 1, 3 tracks, 480 ticks per quarter
    assert_eq!(&midi[8..14], &[0, 1, 0, 3, 0x01, 0xE0]);
    assert_eq!(midi.windows(4).filter(|w| *w == b"MTrk").count(), 3);
}

#[test]
fn artifacts_written_to_directory() {
    let fixture = RunDirFixture::generate(stub_config(3), StubOracle);
    for name in [NOTATION_FILE, EVENT_LIST_FILE, TABULAR_FILE, SUMMARY_FILE, MIDI_FILE] {
        assert!(fixture.path().join(name).is_file(), "missing {}", name);
    }
    assert_eq!(fixture.read(TABULAR_FILE), fixture.artifacts.tabular());
    assert_eq!(fixture.read(EVENT_LIST_FILE), fixture.artifacts.event_list_json());
    assert_eq!(
        std::fs::read(fixture.path().join(MIDI_FILE)).unwrap(),
        fixture.artifacts.midi().unwrap()
    );
}

#[test]
fn row_and_event_counts_match_token_count() {
    for n in [1u32, 2, 7, 30] {
        let artifacts = generate_collection(stub_config(n), StubOracle).unwrap();
        assert_eq!(artifacts.tabular().lines().count(), n as usize + 1);
        assert_eq!(artifacts.event_list().events.len(), n as usize);
        assert_eq!(artifacts.notation().matches("% Token ").count(), n as usize);
    }
}

#[test]
fn single_token_run() {
    let artifacts = generate_collection(stub_config(1), StubOracle).unwrap();
    assert_eq!(artifacts.tabular().split('\n').nth(1), Some(ROW_0));
    assert!(artifacts.summary().contains("**Years:** 2026 to 2026\n"));
}

#[test]
fn oracle_failure_aborts_without_artifacts() {
    let err = generate_collection(stub_config(3), FailingOracle { fail_at: 1 }).unwrap_err();
    match err {
        ChainError::OracleFailure { index, ref source } => {
            assert_eq!(index, 1);
            assert_eq!(source.code, "STUB_001");
        }
        other => panic!("expected OracleFailure, got {:?}", other),
    }
}

#[test]
fn failed_run_keeps_completed_tokens() {
    let mut run = Run::new(stub_config(3), FailingOracle { fail_at: 1 }).unwrap();
    run.step().unwrap();
    assert!(run.step().is_err());

    assert_eq!(run.phase(), RunPhase::Failed(1));
    assert_eq!(run.records().len(), 1);
    assert!(matches!(run.step(), Err(ChainError::RunState(_))));
    assert!(run.finalize().is_err());
}

/// Stub oracle that answers with a lead pitch above the MIDI note range at one index.
struct HighPitchOracle {
    at: u32,
}

impl BeatOracle for HighPitchOracle {
    fn generate_beat(&self, index: u32, _seed: u32) -> Result<Beat, OracleError> {
        let mut beat = StubOracle::beat(index);
        if index == self.at {
            beat.lead.pitch = 200;
        }
        Ok(beat)
    }

    fn generate_abc_beat(&self, index: u32, seed: u32) -> Result<String, OracleError> {
        Ok(beat_fragment(&self.generate_beat(index, seed)?))
    }
}

#[test]
fn high_pitch_keeps_text_artifacts() {
    let artifacts = generate_collection(stub_config(3), HighPitchOracle { at: 1 }).unwrap();

    let row = artifacts.tabular().split('\n').nth(2).unwrap();
    assert!(row.starts_with("1007,1,2027,"));
    assert!(row.contains(",200,4,37,4,"));
    assert_eq!(artifacts.event_list().events[1].lead.pitch, 200);
    assert_eq!(artifacts.notation().matches("% Token ").count(), 3);
    assert!(artifacts.summary().contains("**Tokens:** 3\n"));

    let err = artifacts.midi().unwrap_err();
    assert!(matches!(err, ChainError::SerializationFailure { .. }));

    let tmp = tempfile::tempdir().unwrap();
    assert!(artifacts.write_to_dir(tmp.path()).is_err());
    for name in [NOTATION_FILE, EVENT_LIST_FILE, TABULAR_FILE, SUMMARY_FILE] {
        assert!(tmp.path().join(name).is_file(), "missing {}", name);
    }
    assert!(!tmp.path().join(MIDI_FILE).exists());
}
