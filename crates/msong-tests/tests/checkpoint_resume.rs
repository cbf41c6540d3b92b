//! Interrupted runs resumed from a checkpoint match uninterrupted runs.

use msong_backend_reference::ReferenceOracle;
use msong_chain::{generate_collection, AuxDigestPolicy, ChainError, Checkpoint, Digest, Run};
use msong_tests::fixtures::{stub_config, FailingOracle, StubOracle};
use pretty_assertions::assert_eq;

#[test]
fn resume_after_oracle_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("run.ckpt.json");

    let mut failing = Run::new(stub_config(6), FailingOracle { fail_at: 4 }).unwrap();
    let err = failing
        .run_to_end_with(|run| run.checkpoint().save(&path))
        .unwrap_err();
    assert_eq!(err.token_index(), Some(4));

    let saved = Checkpoint::load(&path).unwrap();
    assert_eq!(saved.next_index, 4);

    let mut resumed = Run::resume(stub_config(6), StubOracle, saved).unwrap();
    resumed.run_to_end().unwrap();
    let resumed = resumed.finalize().unwrap();

    let fresh = generate_collection(stub_config(6), StubOracle).unwrap();
    assert_eq!(resumed, fresh);
}

#[test]
fn resume_reference_run_mid_way() {
    let mut first = Run::new(stub_config(10), ReferenceOracle::new()).unwrap();
    for _ in 0..3 {
        first.step().unwrap();
    }
    let json = first.checkpoint().to_json_pretty().unwrap();

    let checkpoint = Checkpoint::from_json(&json).unwrap();
    let mut resumed = Run::resume(stub_config(10), ReferenceOracle::new(), checkpoint).unwrap();
    resumed.run_to_end().unwrap();

    let fresh = generate_collection(stub_config(10), ReferenceOracle::new()).unwrap();
    assert_eq!(resumed.finalize().unwrap().fingerprint(), fresh.fingerprint());
}

#[test]
fn tampered_checkpoint_is_rejected() {
    let mut run = Run::new(stub_config(4), StubOracle).unwrap();
    run.step().unwrap();
    run.step().unwrap();

    let mut checkpoint = run.checkpoint();
    checkpoint.records[1].beat.lead.pitch += 1;

    let err = Run::resume(stub_config(4), StubOracle, checkpoint).err().unwrap();
    assert!(matches!(err, ChainError::InvalidCheckpoint(_)));
}

#[test]
fn checkpoint_for_other_collection_is_rejected() {
    let mut run = Run::new(stub_config(2), StubOracle).unwrap();
    run.step().unwrap();

    let mut other = stub_config(2);
    other.collection_phrase = "another phrase".to_string();
    let err = Run::resume(other, StubOracle, run.checkpoint()).err().unwrap();
    assert!(matches!(err, ChainError::InvalidCheckpoint(_)));
}

#[test]
fn checkpoint_under_other_aux_policy_is_rejected() {
    let mut run = Run::new(stub_config(4), StubOracle).unwrap();
    run.step().unwrap();
    run.step().unwrap();

    let zero = stub_config(4).with_aux_digest(AuxDigestPolicy::Zero);
    let err = Run::resume(zero, StubOracle, run.checkpoint()).err().unwrap();
    assert!(matches!(err, ChainError::InvalidCheckpoint(_)));
}

#[test]
fn edited_final_seed_is_rejected() {
    let mut run = Run::new(stub_config(4), StubOracle).unwrap();
    run.step().unwrap();
    run.step().unwrap();

    let mut checkpoint = run.checkpoint();
    checkpoint.records[0].final_seed = Digest::ZERO;
    let err = Run::resume(stub_config(4), StubOracle, checkpoint).err().unwrap();
    assert!(matches!(err, ChainError::InvalidCheckpoint(_)));
}
