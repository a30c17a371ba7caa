//! CLI for addrmq.
//!
//! Provisions a multi-consumer demo queue on a local in-memory engine and
//! drives it interactively: enqueue addressed messages, dequeue per
//! consumer, commit. Handy for poking at addressing and visibility rules
//! without wiring up a real storage engine.

use clap::Parser;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use addrmq::config::CONFIG;
use addrmq::{
    ConsumerFilter, ConsumerMode, FieldDef, FieldType, MemoryEngine, QueueEngine, QueueRegistry,
    QueueSpec, Record, SchemaDescriptor, Value, WaitMode,
};

/// Command-line interface for addrmq.
#[derive(Debug, Parser)]
#[command(
    name = "addrmq-cli",
    version,
    about = "addrmq CLI: enqueue/dequeue REPL over a demo in-memory engine"
)]
pub struct Cli {
    /// Name of the demo queue to provision
    #[arg(short, long, default_value = "demo")]
    queue: String,

    /// Default subscriber for messages enqueued without recipients
    /// (repeatable)
    #[arg(short, long)]
    subscriber: Vec<String>,
}

const SCHEMA: &str = "note";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    addrmq::logging::init_logging();

    let cli = Cli::parse();

    let engine = Arc::new(MemoryEngine::new());
    let registry = QueueRegistry::new(Arc::clone(&engine));
    registry.register_schema(SchemaDescriptor::new(
        SCHEMA,
        vec![
            FieldDef::required("subject", FieldType::Text),
            FieldDef::nullable("body", FieldType::Text),
        ],
    ));
    engine
        .provision(QueueSpec {
            name: cli.queue.clone(),
            payload_schema: SCHEMA.to_string(),
            mode: ConsumerMode::Multi,
            default_subscribers: cli.subscriber.iter().map(|s| s.as_str().into()).collect(),
        })
        .await?;

    let queue = registry.resolve(&cli.queue, SCHEMA).await?;
    let session = registry.open_session();
    info!(queue = %cli.queue, "demo queue ready");

    println!("addrmq demo queue '{}' (multi-consumer). Type 'help' for commands.", cli.queue);

    let mut editor = DefaultEditor::new()?;
    loop {
        let line = match editor.readline("addrmq> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        editor.add_history_entry(line)?;

        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("enq") => {
                let rest: Vec<&str> = tokens.collect();
                let subject: Vec<&str> = rest
                    .iter()
                    .filter(|t| !t.starts_with('@'))
                    .copied()
                    .collect();
                let recipients: Vec<Value> = rest
                    .iter()
                    .filter_map(|t| t.strip_prefix('@'))
                    .map(Value::from)
                    .collect();
                if subject.is_empty() {
                    println!("usage: enq <subject..> [@recipient ..]");
                    continue;
                }
                let record = Record::new(SCHEMA)
                    .with("subject", Value::Text(subject.join(" ")))
                    .with("body", Value::Null);
                match queue.enqueue_one(&session, &record, &recipients).await {
                    Ok(()) => println!("pending (commit to publish)"),
                    Err(e) => println!("error: {e}"),
                }
            }
            Some("deq") => {
                let Some(consumer) = tokens.next() else {
                    println!("usage: deq <consumer> [count] [no_wait|block:<ms>]");
                    continue;
                };
                let mut count = CONFIG.queues.default_deq_batch;
                let mut wait = WaitMode::NoWait;
                let mut bad = false;
                for token in tokens {
                    if let Ok(n) = token.parse::<usize>() {
                        count = n;
                    } else if token == "block" {
                        wait = WaitMode::Block(Duration::from_millis(
                            CONFIG.queues.default_wait_ms,
                        ));
                    } else {
                        match token.parse::<WaitMode>() {
                            Ok(parsed) => wait = parsed,
                            Err(e) => {
                                println!("error: {e}");
                                bad = true;
                                break;
                            }
                        }
                    }
                }
                if bad {
                    continue;
                }
                let filter = ConsumerFilter::for_consumer(consumer).wait(wait);
                match queue.dequeue_many(&session, &filter, count).await {
                    Ok(messages) if messages.is_empty() => println!("(empty)"),
                    Ok(messages) => {
                        for msg in messages {
                            let subject = msg
                                .payload
                                .get("subject")
                                .and_then(|v| v.as_text())
                                .unwrap_or("");
                            println!("{} {} @{}", msg.id, subject, msg.enqueued_at);
                        }
                    }
                    Err(e) => println!("error: {e}"),
                }
            }
            Some("commit") => match session.commit().await {
                Ok(()) => println!("committed"),
                Err(e) => println!("error: {e}"),
            },
            Some("help") => {
                println!("enq <subject..> [@recipient ..]   buffer a message in this transaction");
                println!("deq <consumer> [count] [no_wait|block:<ms>]   fetch eligible messages");
                println!("commit                            publish pending messages");
                println!("quit                              leave the REPL");
            }
            Some("quit") | Some("exit") => break,
            Some(other) => println!("unknown command '{other}' (try 'help')"),
            None => {}
        }
    }

    Ok(())
}
