use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::{ChatModel, ModelError, ModelRequest};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const STDERR_HEAD_CHARS: usize = 400;

/// Runs an external command per call: the prompt goes to stdin, the reply is read from stdout.
/// `GRAMMAR_LENS_MAX_TOKENS` and `GRAMMAR_LENS_TEMPERATURE` are exported to the child.
pub struct CommandModel {
    name: String,
    program: String,
    args: Vec<String>,
}

impl CommandModel {
    pub fn new(argv: &[String]) -> Result<Self, ModelError> {
        let (program, args) = argv
            .split_first()
            .filter(|(p, _)| !p.trim().is_empty())
            .ok_or_else(|| ModelError::Backend("empty model command".to_string()))?;
        Ok(Self {
            name: program.clone(),
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    fn spawn(&self, req: &ModelRequest) -> Result<Child, ModelError> {
        Command::new(&self.program)
            .args(&self.args)
            .env("GRAMMAR_LENS_MAX_TOKENS", req.max_tokens.to_string())
            .env("GRAMMAR_LENS_TEMPERATURE", format!("{:.2}", req.temperature))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ModelError::Backend(format!("spawn {}: {e}", self.program)))
    }
}

impl ChatModel for CommandModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn complete(&mut self, req: &ModelRequest) -> Result<String, ModelError> {
        let mut child = self.spawn(req)?;

        // Feed stdin and drain the pipes on helper threads so a chatty child cannot deadlock us.
        let stdin = child.stdin.take();
        let prompt = req.prompt.clone();
        let writer = thread::spawn(move || -> std::io::Result<()> {
            if let Some(mut stdin) = stdin {
                stdin.write_all(prompt.as_bytes())?;
            }
            Ok(())
        });
        let stdout = child.stdout.take();
        let reader = thread::spawn(move || -> std::io::Result<Vec<u8>> {
            let mut buf = Vec::new();
            if let Some(mut out) = stdout {
                out.read_to_end(&mut buf)?;
            }
            Ok(buf)
        });
        let stderr = child.stderr.take();
        let err_reader = thread::spawn(move || -> Vec<u8> {
            let mut buf = Vec::new();
            if let Some(mut err) = stderr {
                let _ = err.read_to_end(&mut buf);
            }
            buf
        });

        let deadline = Instant::now() + req.timeout;
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if Instant::now() >= deadline {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ModelError::Timeout(req.timeout));
            }
            thread::sleep(POLL_INTERVAL);
        };

        // A child that exits without reading stdin makes the write fail with a broken pipe; the
        // exit status below is the better error in that case.
        let _ = writer.join();
        let out = reader
            .join()
            .map_err(|_| ModelError::Backend("stdout reader panicked".to_string()))??;
        let err = err_reader.join().unwrap_or_default();

        if !status.success() {
            let stderr_head: String = String::from_utf8_lossy(&err)
                .chars()
                .take(STDERR_HEAD_CHARS)
                .collect();
            return Err(ModelError::Backend(format!(
                "{} exited with {status}: {}",
                self.program,
                stderr_head.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }
}
