use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use codegen_core::GenerationError;
use tokio::sync::oneshot;

use super::generation_session::GenerationSession;
use crate::llm::{CodeGenerator, CompletionFuture, CompletionProvider};

pub(crate) type Reply = Result<String, GenerationError>;

/// Holds each completion until the test releases the reply for its prompt.
#[derive(Default)]
pub(crate) struct GatedProvider {
    gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    calls: AtomicUsize,
}

impl GatedProvider {
    pub(crate) fn gate(&self, prompt: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .unwrap()
            .insert(format!("User Request: \"{prompt}\""), rx);
        tx
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CompletionProvider for GatedProvider {
    fn complete<'a>(&'a self, instruction: &'a str) -> CompletionFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let gate = {
                let mut gates = self.gates.lock().unwrap();
                let key = gates
                    .keys()
                    .find(|key| instruction.contains(key.as_str()))
                    .cloned()
                    .expect("no gate registered for instruction");
                gates.remove(&key).unwrap()
            };
            gate.await
                .unwrap_or_else(|_| Err(GenerationError::Transport("gate dropped".into())))
        })
    }
}

pub(crate) fn gated_session() -> (GenerationSession, Arc<GatedProvider>) {
    let provider = Arc::new(GatedProvider::default());
    let session = GenerationSession::new(CodeGenerator::new(provider.clone()));
    (session, provider)
}
