mod common;

use common::{artifact, edible, poisonous};
use spore_prediction::inference::{classify, probabilities};

#[test]
fn batch_answers_keep_input_order() {
    let artifact = artifact();
    let records = [poisonous(), edible(), edible(), poisonous()];

    assert_eq!(classify(&artifact, &records).unwrap(), [true, false, false, true]);

    let proba = probabilities(&artifact, &records).unwrap();
    assert_eq!(proba.len(), 4);
    assert!(proba.iter().all(|p| (0.0..=1.0).contains(p)));
    assert!(proba[0] > 0.0);
}

#[test]
fn empty_batch_is_empty() {
    let artifact = artifact();
    assert!(classify(&artifact, &[]).unwrap().is_empty());
    assert!(probabilities(&artifact, &[]).unwrap().is_empty());
}

#[test]
fn single_record_matches_its_batch_answer() {
    let artifact = artifact();
    let alone = probabilities(&artifact, &[poisonous()]).unwrap();
    let batch = probabilities(&artifact, &[edible(), poisonous()]).unwrap();
    assert!((alone[0] - batch[1]).abs() < 1e-12);
}
