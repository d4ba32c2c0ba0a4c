use opver_core::provenance::{RunProvenance, SchemaVersion};
use opver_core::{EvaluatorError, OpverError, Side};

#[test]
fn provenance_round_trip_json() {
    let provenance = RunProvenance {
        schema_version: SchemaVersion::new(1, 0, 0),
        config_hash: "config".into(),
        seed: Some(99),
        tool_versions: [("opver-core".into(), "0.1.0".into())].into_iter().collect(),
    };

    let json = serde_json::to_string_pretty(&provenance).expect("serialize");
    let decoded: RunProvenance = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(decoded, provenance);
}

#[test]
fn errors_round_trip_with_family_tag() {
    let err = OpverError::evaluation(Side::Reference, 2, "no convergence");
    let json = serde_json::to_value(&err).expect("serialize");
    assert_eq!(json["family"], "Evaluation");
    let decoded: OpverError = serde_json::from_value(json).expect("deserialize");
    assert_eq!(decoded, err);
}

#[test]
fn evaluator_errors_render() {
    let err = EvaluatorError::NonConvergence { iterations: 100 };
    assert_eq!(err.to_string(), "no convergence after 100 iterations");
}
