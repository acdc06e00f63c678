use std::sync::Arc;

use bot_adapters::stub::{EchoAdapter, ScriptedAdapter};
use bot_adapters::{CompletionOracle, ModelAdapter, OracleSettings};
use bot_kernel::{EXHAUSTED_SENTINEL, ResponseOutcome, ResponsePipeline};
use bot_memory::{AuditLog, FileAuditLog, MemoryAuditLog};
use bot_policy::ProfanityFilter;
use bot_prompts::{PromptSet, extract};

fn oracle_for(adapter: Arc<dyn ModelAdapter>) -> CompletionOracle {
    CompletionOracle::new(adapter, OracleSettings::default())
}

fn chat_prompts() -> PromptSet {
    PromptSet::parse([r#"Me: "INPUT"\nBot: ""#]).unwrap()
}

#[tokio::test]
async fn echo_oracle_reply_is_extracted() {
    let audit = Arc::new(MemoryAuditLog::new());
    let pipeline = ResponsePipeline::builder(
        oracle_for(Arc::new(EchoAdapter::new("Hello there!\""))),
        audit.clone(),
    )
    .prompts(chat_prompts())
    .profanity(ProfanityFilter::default())
    .build();

    assert_eq!(pipeline.generate("hi").await, "Hello there!");
    assert_eq!(
        audit.records().await.unwrap(),
        vec!["Me: \"hi\"\nBot: \"Hello there!\""]
    );
}

#[tokio::test]
async fn bare_echo_exhausts_attempts() {
    let adapter = Arc::new(EchoAdapter::new(""));
    let audit = Arc::new(MemoryAuditLog::new());
    let pipeline = ResponsePipeline::builder(oracle_for(adapter.clone()), audit.clone())
        .prompts(chat_prompts())
        .build();

    assert_eq!(pipeline.generate("hi").await, EXHAUSTED_SENTINEL);
    assert_eq!(adapter.calls(), 11);
    assert_eq!(audit.records().await.unwrap().len(), 11);
}

#[tokio::test]
async fn always_profane_output_stops_after_eleven_attempts() {
    let adapter = Arc::new(ScriptedAdapter::new(|prompt, _| {
        format!("{prompt}you absolute Gremlin\"")
    }));
    let audit = Arc::new(MemoryAuditLog::new());
    let pipeline = ResponsePipeline::builder(oracle_for(adapter.clone()), audit.clone())
        .prompts(chat_prompts())
        .profanity(ProfanityFilter::new(["gremlin"]).unwrap())
        .build();

    let outcome = pipeline.generate_outcome("hi").await;
    assert_eq!(outcome, ResponseOutcome::Exhausted { attempts: 11 });
    assert_eq!(outcome.into_reply(), "Error: could not generate a proper response!");
    assert_eq!(adapter.calls(), 11);
}

#[tokio::test]
async fn every_attempt_is_audited_before_review() {
    // Attempts 0..3 are rejected for different reasons; attempt 4 is accepted.
    let adapter = Arc::new(ScriptedAdapter::new(|prompt, index| match index {
        0 => format!("{prompt}gremlin\""),
        1 => prompt.to_owned(),
        2 => format!("{prompt}\"quoted too early"),
        3 => "an answer that never echoed the prompt\"".to_owned(),
        _ => format!("{prompt}finally\""),
    }));
    let audit = Arc::new(MemoryAuditLog::new());
    let pipeline = ResponsePipeline::builder(oracle_for(adapter.clone()), audit.clone())
        .prompts(chat_prompts())
        .profanity(ProfanityFilter::new(["gremlin"]).unwrap())
        .build();

    let outcome = pipeline.generate_outcome("hi").await;
    assert_eq!(
        outcome,
        ResponseOutcome::Accepted {
            text: "finally".to_owned(),
            attempts: 5
        }
    );
    let records = audit.records().await.unwrap();
    assert_eq!(records.len(), adapter.calls());
    assert_eq!(records[3], "an answer that never echoed the prompt\"");
}

#[tokio::test]
async fn names_are_drawn_per_attempt() {
    let adapter = Arc::new(ScriptedAdapter::new(|prompt, _| format!("{prompt}ok\"")));
    let audit = Arc::new(MemoryAuditLog::new());
    let pipeline = ResponsePipeline::builder(oracle_for(adapter), audit.clone())
        .prompts(PromptSet::parse([r#"NAME: "INPUT"\nNAME: ""#]).unwrap())
        .seed(11)
        .build();

    for _ in 0..5 {
        assert_eq!(pipeline.generate("hey").await, "ok");
    }
    let records = audit.records().await.unwrap();
    assert_eq!(records.len(), 5);
    for record in &records {
        assert!(!record.contains("NAME"));
        assert!(record.contains(": \"hey\"\n"));
    }
}

#[tokio::test]
async fn file_audit_log_matches_attempt_count() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("responses.txt");
    let audit = Arc::new(FileAuditLog::open(&path).await.unwrap());
    let adapter = Arc::new(ScriptedAdapter::new(|prompt, index| {
        if index == 0 {
            prompt.to_owned()
        } else {
            format!("{prompt}second time lucky\" trailing")
        }
    }));
    let pipeline = ResponsePipeline::builder(oracle_for(adapter), audit.clone())
        .prompts(chat_prompts())
        .build();

    assert_eq!(pipeline.generate("hi").await, "second time lucky");

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.matches("\n---\n").count(), 2);
    assert_eq!(audit.records().await.unwrap().len(), 2);
}

#[test]
fn extractor_contract() {
    let prompt = "Me: \"hi\"\nBot: \"";
    assert_eq!(extract(&format!("{prompt}reply text\"tail"), prompt), "reply text");
    assert_eq!(extract(prompt, prompt), "");
}
