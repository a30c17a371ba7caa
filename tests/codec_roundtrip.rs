#[path = "common.rs"]
mod common;

use std::sync::Arc;

use addrmq::{
    FieldDef, FieldType, MemoryEngine, PayloadCodec, QueueError, Record, SchemaDescriptor, Value,
};

fn profile_schema() -> SchemaDescriptor {
    SchemaDescriptor::new(
        "profile",
        vec![
            FieldDef::required("name", FieldType::Text),
            FieldDef::nullable("score", FieldType::Number),
            FieldDef::required("joined", FieldType::Timestamp),
        ],
    )
}

fn codec() -> PayloadCodec {
    PayloadCodec::new(Arc::new(profile_schema()))
}

#[test]
fn round_trip_preserves_every_field() {
    common::init_logging();
    let codec = codec();
    let record = Record::new("profile")
        .with("name", Value::from("scott"))
        .with("score", Value::Number(12.5))
        .with("joined", Value::Timestamp(1_655_424_000_000));

    let wire = codec.encode(&record).unwrap();
    let decoded = codec.decode(&wire).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn null_in_nullable_field_round_trips() {
    let codec = codec();
    let record = Record::new("profile")
        .with("name", Value::from("scott"))
        .with("score", Value::Null)
        .with("joined", Value::Timestamp(0));

    let decoded = codec.decode(&codec.encode(&record).unwrap()).unwrap();
    assert_eq!(decoded.get("score"), Some(&Value::Null));
}

#[test]
fn null_in_required_field_is_a_schema_violation() {
    let codec = codec();
    let record = Record::new("profile")
        .with("name", Value::Null)
        .with("score", Value::Number(1.0))
        .with("joined", Value::Timestamp(0));

    let err = codec.encode(&record).unwrap_err();
    assert!(matches!(err, QueueError::SchemaViolation(_)));
}

#[test]
fn mismatched_field_type_is_rejected() {
    let codec = codec();
    let record = Record::new("profile")
        .with("name", Value::Number(3.0))
        .with("score", Value::Number(1.0))
        .with("joined", Value::Timestamp(0));

    assert!(matches!(
        codec.encode(&record),
        Err(QueueError::SchemaViolation(_))
    ));
}

#[test]
fn wrong_schema_tag_is_rejected() {
    let codec = codec();
    let record = Record::new("somebody_elses_type").with("name", Value::from("scott"));
    assert!(matches!(
        codec.encode(&record),
        Err(QueueError::SchemaViolation(_))
    ));
}

#[test]
fn missing_and_extra_fields_are_rejected() {
    let codec = codec();

    let missing = Record::new("profile").with("name", Value::from("scott"));
    assert!(matches!(
        codec.encode(&missing),
        Err(QueueError::SchemaViolation(_))
    ));

    let extra = Record::new("profile")
        .with("name", Value::from("scott"))
        .with("score", Value::Null)
        .with("joined", Value::Timestamp(0))
        .with("shoe_size", Value::Number(44.0));
    assert!(matches!(
        codec.encode(&extra),
        Err(QueueError::SchemaViolation(_))
    ));
}

#[test]
fn misordered_fields_are_rejected() {
    let codec = codec();
    let record = Record::new("profile")
        .with("score", Value::Number(1.0))
        .with("name", Value::from("scott"))
        .with("joined", Value::Timestamp(0));

    assert!(matches!(
        codec.encode(&record),
        Err(QueueError::SchemaViolation(_))
    ));
}

#[test]
fn truncated_frame_is_rejected() {
    let codec = codec();
    let record = Record::new("profile")
        .with("name", Value::from("scott"))
        .with("score", Value::Number(12.5))
        .with("joined", Value::Timestamp(1_655_424_000_000));

    let wire = codec.encode(&record).unwrap();
    let err = codec.decode(&wire[..wire.len() - 3]).unwrap_err();
    assert!(matches!(err, QueueError::SchemaViolation(_)));
}

#[test]
fn lob_fields_carry_only_the_opaque_reference() {
    let schema = SchemaDescriptor::new(
        "report",
        vec![
            FieldDef::required("title", FieldType::Text),
            FieldDef::required("body", FieldType::Lob),
        ],
    );
    let codec = PayloadCodec::new(Arc::new(schema));

    let engine = MemoryEngine::new();
    let lob = engine.lobs().create();
    {
        let mut stream = engine.lobs().open(lob).unwrap();
        stream.write_chunk(b"a very large body");
    }

    let record = Record::new("report")
        .with("title", Value::from("quarterly"))
        .with("body", Value::Lob(lob));
    let decoded = codec.decode(&codec.encode(&record).unwrap()).unwrap();
    assert_eq!(decoded.get("body"), Some(&Value::Lob(lob)));

    // The bytes never travel through the codec; they stay in the store.
    let mut stream = engine.lobs().open(lob).unwrap();
    let chunk = stream.read_chunk(1024).unwrap();
    assert_eq!(&chunk[..], b"a very large body");
}
