use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::debug;

use crate::audio::AudioFormat;
use crate::config::CommandConfig;
use crate::error::ProviderError;
use crate::summary::{ProviderResult, SpeechSynthesizer, Summarizer};

/// Runs an external program with text on stdin and collects its stdout
#[derive(Debug, Clone)]
pub struct CommandRunner {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandRunner {
    pub fn new(config: &CommandConfig, role: &str) -> ProviderResult<Self> {
        let (program, args) = config
            .command
            .split_first()
            .ok_or_else(|| ProviderError::NotConfigured(format!("no {} command set", role)))?;

        if program.trim().is_empty() {
            return Err(ProviderError::NotConfigured(format!(
                "{} command has an empty program name",
                role
            )));
        }

        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Feed `input` to the program and return its trimmed stdout
    pub async fn run(&self, input: &str) -> ProviderResult<String> {
        let start = Instant::now();

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProviderError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdin = child.stdin.take();
        let feed = async move {
            if let Some(mut stdin) = stdin {
                match stdin.write_all(input.as_bytes()).await {
                    // Programs may exit without reading their input
                    Err(e) if e.kind() != std::io::ErrorKind::BrokenPipe => return Err(e),
                    _ => {}
                }
                // Dropping stdin closes it so the program sees EOF
            }
            Ok(())
        };

        let (fed, output) = tokio::time::timeout(self.timeout, async {
            tokio::join!(feed, child.wait_with_output())
        })
        .await
        .map_err(|_| ProviderError::Timeout(self.program.clone(), self.timeout.as_secs()))?;
        fed?;
        let output = output?;

        if !output.status.success() {
            return Err(ProviderError::CommandFailed {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8(output.stdout).map_err(|e| {
            ProviderError::InvalidOutput(format!("{} wrote non UTF-8 output: {}", self.program, e))
        })?;

        debug!(
            "`{}` returned {} bytes in {:?}",
            self.program,
            stdout.len(),
            start.elapsed()
        );

        Ok(stdout.trim().to_string())
    }
}

/// Summarizer backed by an external command
pub struct CommandSummarizer {
    runner: CommandRunner,
}

impl CommandSummarizer {
    pub fn new(config: &CommandConfig) -> ProviderResult<Self> {
        Ok(Self {
            runner: CommandRunner::new(config, "summarizer")?,
        })
    }
}

#[async_trait]
impl Summarizer for CommandSummarizer {
    fn name(&self) -> &str {
        self.runner.program()
    }

    async fn summarize(&self, text: &str) -> ProviderResult<String> {
        self.runner.run(text).await
    }
}

/// Speech synthesizer backed by an external command printing base64 PCM
pub struct CommandSynthesizer {
    runner: CommandRunner,
    format: AudioFormat,
}

impl CommandSynthesizer {
    pub fn new(config: &CommandConfig, format: AudioFormat) -> ProviderResult<Self> {
        Ok(Self {
            runner: CommandRunner::new(config, "tts")?,
            format,
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    fn name(&self) -> &str {
        self.runner.program()
    }

    async fn synthesize(&self, text: &str) -> ProviderResult<String> {
        self.runner.run(text).await
    }

    fn format(&self) -> AudioFormat {
        self.format
    }
}
