use std::fs;

use opver_core::pure;
use opver_engine::{
    aggregate, canonical_field_bytes, estimate, estimate_description, estimate_field, generate,
    AggregateOptions, Description, DualEvaluator,
};

#[test]
fn estimates_are_eight_bits_per_byte() {
    assert_eq!(estimate(b""), 0);
    assert_eq!(estimate(b"abc"), 24);
    assert_eq!(estimate_description(&"f(x) = x".into()).unwrap(), 64);
    assert_eq!(
        estimate_description(&Description::Bytes(vec![0; 5])).unwrap(),
        40
    );
}

#[test]
fn file_descriptions_are_read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("candidate.rs");
    fs::write(&path, "fn f() {}\n").unwrap();
    assert_eq!(
        estimate_description(&Description::File(path.clone())).unwrap(),
        80
    );

    fs::write(&path, "").unwrap();
    let err = estimate_description(&Description::File(path)).unwrap_err();
    assert_eq!(err.info().code, "description-empty");
}

#[test]
fn field_bytes_follow_probe_order() {
    let domain = generate(1, 3).unwrap();
    let reference = pure(|x: &[f64]| vec![x[0], 1.0]);
    let candidate = pure(|_: &[f64]| vec![0.0, 0.0]);
    let dual = DualEvaluator::new(&reference, &candidate);
    let field = aggregate(&domain, &dual, &AggregateOptions::default()).unwrap();

    let bytes = canonical_field_bytes(&field);
    assert_eq!(bytes.len(), 3 * 2 * 8);
    let decoded: Vec<f64> = bytes
        .chunks_exact(8)
        .map(|chunk| f64::from_le_bytes(chunk.try_into().unwrap()))
        .collect();
    assert_eq!(decoded, vec![0.0, 1.0, 0.5, 1.0, 1.0, 1.0]);
    assert_eq!(estimate_field(&field), 48 * 8);
}
