//! Transport to the language model. The engine only needs "prompt in, text out"; how the text is
//! produced lives behind [`ChatModel`].

pub mod command;
pub mod replay;

use std::time::Duration;

use sha2::{Digest, Sha256};

pub use command::CommandModel;
pub use replay::{RecordingModel, ReplayModel};

#[derive(Clone, Debug, PartialEq)]
pub struct ModelRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub timeout: Duration,
    pub temperature: f32,
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model call timed out after {0:?}")]
    Timeout(Duration),
    #[error("model backend failed: {0}")]
    Backend(String),
    #[error("no recorded response: {0}")]
    Missing(String),
    #[error("model io: {0}")]
    Io(#[from] std::io::Error),
}

pub trait ChatModel {
    fn name(&self) -> &str;

    fn complete(&mut self, req: &ModelRequest) -> Result<String, ModelError>;
}

impl<M: ChatModel + ?Sized> ChatModel for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn complete(&mut self, req: &ModelRequest) -> Result<String, ModelError> {
        (**self).complete(req)
    }
}

impl<M: ChatModel + ?Sized> ChatModel for &mut M {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn complete(&mut self, req: &ModelRequest) -> Result<String, ModelError> {
        (**self).complete(req)
    }
}

/// Adapter for closures; handy for scripted models in tests and embedding callers.
pub struct FnModel<F> {
    name: String,
    f: F,
}

impl<F> FnModel<F>
where
    F: FnMut(&ModelRequest) -> Result<String, ModelError>,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> ChatModel for FnModel<F>
where
    F: FnMut(&ModelRequest) -> Result<String, ModelError>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn complete(&mut self, req: &ModelRequest) -> Result<String, ModelError> {
        (self.f)(req)
    }
}

/// Hex SHA-256 of the prompt; keys recorded responses and trace files.
#[must_use]
pub fn prompt_fingerprint(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    hex::encode(hasher.finalize())
}
