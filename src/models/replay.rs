use std::path::{Path, PathBuf};

use super::{prompt_fingerprint, ChatModel, ModelError, ModelRequest};

/// Answers from `<dir>/<sha256(prompt)>.txt`. Deterministic runs without a live model.
pub struct ReplayModel {
    dir: PathBuf,
}

impl ReplayModel {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn response_path(&self, prompt: &str) -> PathBuf {
        response_path(&self.dir, prompt)
    }
}

impl ChatModel for ReplayModel {
    fn name(&self) -> &str {
        "replay"
    }

    fn complete(&mut self, req: &ModelRequest) -> Result<String, ModelError> {
        let path = self.response_path(&req.prompt);
        if !path.exists() {
            return Err(ModelError::Missing(path.display().to_string()));
        }
        Ok(std::fs::read_to_string(&path)?)
    }
}

fn response_path(dir: &Path, prompt: &str) -> PathBuf {
    dir.join(format!("{}.txt", prompt_fingerprint(prompt)))
}

/// Wraps a live model and stores every successful reply where [`ReplayModel`] will look for it.
pub struct RecordingModel<M> {
    inner: M,
    dir: PathBuf,
}

impl<M: ChatModel> RecordingModel<M> {
    pub fn new(inner: M, dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { inner, dir })
    }
}

impl<M: ChatModel> ChatModel for RecordingModel<M> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn complete(&mut self, req: &ModelRequest) -> Result<String, ModelError> {
        let reply = self.inner.complete(req)?;
        std::fs::write(response_path(&self.dir, &req.prompt), &reply)?;
        Ok(reply)
    }
}
