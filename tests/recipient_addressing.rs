#[path = "common.rs"]
mod common;

use std::sync::Arc;

use addrmq::{
    ConsumerFilter, ConsumerMode, ConsumerName, FieldDef, FieldType, MemoryEngine, QueueEngine,
    QueueError, QueueRegistry, QueueSpec, Record, SchemaDescriptor, Value,
};

fn address_schema() -> SchemaDescriptor {
    SchemaDescriptor::new(
        "address",
        vec![
            FieldDef::required("name", FieldType::Text),
            FieldDef::required("address", FieldType::Text),
        ],
    )
}

fn address(name: &str, addr: &str) -> Record {
    Record::new("address")
        .with("name", Value::from(name))
        .with("address", Value::from(addr))
}

async fn setup(defaults: &[&str]) -> (Arc<MemoryEngine>, QueueRegistry<MemoryEngine>) {
    common::init_logging();
    let engine = Arc::new(MemoryEngine::new());
    let registry = QueueRegistry::new(Arc::clone(&engine));
    registry.register_schema(address_schema());
    engine
        .provision(QueueSpec {
            name: "addr_queue".into(),
            payload_schema: "address".into(),
            mode: ConsumerMode::Multi,
            default_subscribers: defaults.iter().map(|s| ConsumerName::from(*s)).collect(),
        })
        .await
        .unwrap();
    (engine, registry)
}

#[tokio::test]
async fn single_recipient_message_reaches_that_consumer_only() {
    let (_engine, registry) = setup(&[]).await;
    let queue = registry.resolve("addr_queue", "address").await.unwrap();
    let session = registry.open_session();

    queue
        .enqueue_one(&session, &address("scott", "The kennel"), &[Value::from("sub1")])
        .await
        .unwrap();
    session.commit().await.unwrap();

    let other = queue
        .dequeue_one(&session, &ConsumerFilter::for_consumer("sub2"))
        .await
        .unwrap();
    assert!(other.is_none());

    let msg = queue
        .dequeue_one(&session, &ConsumerFilter::for_consumer("sub1"))
        .await
        .unwrap()
        .expect("sub1 should see the message");
    assert_eq!(msg.payload.get("name"), Some(&Value::from("scott")));
    assert_eq!(msg.recipients, vec![ConsumerName::from("sub1")]);

    // Consumed: a second fetch comes back empty.
    let again = queue
        .dequeue_one(&session, &ConsumerFilter::for_consumer("sub1"))
        .await
        .unwrap();
    assert!(again.is_none());
}

#[tokio::test]
async fn message_addressed_to_several_recipients_is_visible_to_each_once() {
    let (_engine, registry) = setup(&[]).await;
    let queue = registry.resolve("addr_queue", "address").await.unwrap();
    let session = registry.open_session();

    queue
        .enqueue_one(
            &session,
            &address("scott", "The kennel"),
            &[Value::from("sub1"), Value::from("sub2")],
        )
        .await
        .unwrap();
    session.commit().await.unwrap();

    for consumer in ["sub1", "sub2"] {
        let msg = queue
            .dequeue_one(&session, &ConsumerFilter::for_consumer(consumer))
            .await
            .unwrap();
        assert!(msg.is_some(), "{consumer} should see its copy");
    }
    for consumer in ["sub1", "sub2"] {
        let msg = queue
            .dequeue_one(&session, &ConsumerFilter::for_consumer(consumer))
            .await
            .unwrap();
        assert!(msg.is_none(), "{consumer} already consumed its copy");
    }
}

#[tokio::test]
async fn empty_recipients_route_to_default_subscribers() {
    let (_engine, registry) = setup(&["fallback"]).await;
    let queue = registry.resolve("addr_queue", "address").await.unwrap();
    let session = registry.open_session();

    queue
        .enqueue_one(&session, &address("scott", "The kennel"), &[])
        .await
        .unwrap();
    session.commit().await.unwrap();

    let stranger = queue
        .dequeue_one(&session, &ConsumerFilter::for_consumer("stranger"))
        .await
        .unwrap();
    assert!(stranger.is_none());

    let msg = queue
        .dequeue_one(&session, &ConsumerFilter::for_consumer("fallback"))
        .await
        .unwrap();
    assert!(msg.is_some());
}

#[tokio::test]
async fn empty_recipients_without_defaults_enqueue_fine_but_never_deliver() {
    let (_engine, registry) = setup(&[]).await;
    let queue = registry.resolve("addr_queue", "address").await.unwrap();
    let session = registry.open_session();

    // No error at enqueue time on the single-item path.
    queue
        .enqueue_one(&session, &address("scott", "The kennel"), &[])
        .await
        .unwrap();
    session.commit().await.unwrap();

    for consumer in ["", "sub1", "anyone"] {
        let msg = queue
            .dequeue_one(&session, &ConsumerFilter::for_consumer(consumer))
            .await
            .unwrap();
        assert!(msg.is_none(), "message without recipients is unreachable");
    }
}

#[tokio::test]
async fn non_string_recipients_fail_fast_with_position() {
    let (_engine, registry) = setup(&[]).await;
    let queue = registry.resolve("addr_queue", "address").await.unwrap();
    let session = registry.open_session();

    let err = queue
        .enqueue_one(
            &session,
            &address("scott", "The kennel"),
            &[
                Value::Number(1.0),
                Value::from("abc"),
                Value::Timestamp(1_655_424_000_000),
            ],
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        QueueError::InvalidArgument {
            position: Some(0),
            ..
        }
    ));

    let err = queue
        .enqueue_one(&session, &address("scott", "The kennel"), &[Value::Null])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        QueueError::InvalidArgument {
            position: Some(0),
            ..
        }
    ));

    // Nothing reached the engine: commit publishes nothing.
    session.commit().await.unwrap();
    let msg = queue
        .dequeue_one(&session, &ConsumerFilter::for_consumer("abc"))
        .await
        .unwrap();
    assert!(msg.is_none());
}

#[tokio::test]
async fn unknown_consumer_gets_empty_result_not_error() {
    let (_engine, registry) = setup(&[]).await;
    let queue = registry.resolve("addr_queue", "address").await.unwrap();
    let session = registry.open_session();

    for who in ["scott", "John", "Nick"] {
        queue
            .enqueue_one(
                &session,
                &address(who, "somewhere"),
                &[Value::from("sub1"), Value::from("sub2"), Value::from("sub3")],
            )
            .await
            .unwrap();
    }
    session.commit().await.unwrap();

    let messages = queue
        .dequeue_many(&session, &ConsumerFilter::for_consumer("unknown"), 5)
        .await
        .unwrap();
    assert_eq!(messages.len(), 0);
}

#[tokio::test]
async fn single_consumer_queue_ignores_addressing() {
    common::init_logging();
    let engine = Arc::new(MemoryEngine::new());
    let registry = QueueRegistry::new(Arc::clone(&engine));
    registry.register_schema(address_schema());
    engine
        .provision(QueueSpec {
            name: "solo_queue".into(),
            payload_schema: "address".into(),
            mode: ConsumerMode::Single,
            default_subscribers: vec![],
        })
        .await
        .unwrap();

    let queue = registry.resolve("solo_queue", "address").await.unwrap();
    let session = registry.open_session();

    queue
        .enqueue_one(&session, &address("scott", "The kennel"), &[])
        .await
        .unwrap();
    session.commit().await.unwrap();

    let msg = queue
        .dequeue_one(&session, &ConsumerFilter::for_consumer("whoever"))
        .await
        .unwrap();
    assert!(msg.is_some());

    // Consumed once, gone for everyone.
    let msg = queue
        .dequeue_one(&session, &ConsumerFilter::for_consumer("someone-else"))
        .await
        .unwrap();
    assert!(msg.is_none());
}
