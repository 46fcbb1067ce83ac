use std::time::Instant;
use tracing::{debug, info};

use crate::audio::{self, to_data_uri};
use crate::error::{PayloadError, PipelineError, ProviderError};
use crate::summary::{AudioSummary, SpeechSynthesizer, Summarizer};

/// Page text -> summary -> speech -> WAV data URI
pub struct Pipeline {
    summarizer: Box<dyn Summarizer>,
    synthesizer: Option<Box<dyn SpeechSynthesizer>>,
    max_content_chars: usize,
}

impl Pipeline {
    pub fn new(summarizer: Box<dyn Summarizer>, max_content_chars: usize) -> Self {
        Self {
            summarizer,
            synthesizer: None,
            max_content_chars,
        }
    }

    /// Speak summaries with `synthesizer`
    pub fn with_synthesizer(mut self, synthesizer: Box<dyn SpeechSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Reject blank page text and cut it to the first `max_content_chars` characters
    pub fn prepare_content<'a>(&self, text: &'a str) -> Result<&'a str, PipelineError> {
        check_content(text)?;

        let truncated = match text.char_indices().nth(self.max_content_chars) {
            Some((idx, _)) => &text[..idx],
            None => text,
        };

        if truncated.len() < text.len() {
            debug!(
                "Truncated page content from {} to {} bytes",
                text.len(),
                truncated.len()
            );
        }

        Ok(truncated)
    }

    /// Summarize page text as given
    pub async fn summarize(&self, text: &str) -> Result<String, PipelineError> {
        check_content(text)?;
        self.summarize_content(text).await
    }

    async fn summarize_content(&self, content: &str) -> Result<String, PipelineError> {
        let start = Instant::now();

        let summary = self.summarizer.summarize(content).await?;
        if summary.trim().is_empty() {
            return Err(PipelineError::EmptySummary);
        }

        info!(
            "{} summarized {} chars into {} chars in {:?}",
            self.summarizer.name(),
            content.chars().count(),
            summary.chars().count(),
            start.elapsed()
        );

        Ok(summary)
    }

    /// Summarize the first `max_content_chars` characters of page text and
    /// speak the summary
    pub async fn generate_audio_summary(&self, text: &str) -> Result<AudioSummary, PipelineError> {
        let synthesizer = self.synthesizer.as_ref().ok_or_else(|| {
            ProviderError::NotConfigured("no speech synthesizer for audio summaries".into())
        })?;

        let content = self.prepare_content(text)?;
        let summary = self.summarize_content(content).await?;
        let start = Instant::now();

        let payload = synthesizer.synthesize(&summary).await?;
        let pcm = audio::extract_pcm(&payload)?;
        if pcm.is_empty() {
            return Err(PipelineError::EmptyAudio);
        }

        let format = synthesizer.format();
        let wav = audio::encode(&pcm, format).map_err(PayloadError::from)?;

        info!(
            "{} produced {:.2}s of audio ({}) in {:?}",
            synthesizer.name(),
            format.duration(pcm.len()).as_secs_f32(),
            format,
            start.elapsed()
        );

        Ok(AudioSummary {
            summary,
            audio_data_uri: to_data_uri(&wav),
        })
    }
}

fn check_content(text: &str) -> Result<(), PipelineError> {
    if text.trim().is_empty() {
        return Err(PipelineError::EmptyContent);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{AudioFormat, WAV_DATA_URI_PREFIX};
    use crate::summary::ProviderResult;
    use async_trait::async_trait;
    use base64::{engine::general_purpose, Engine as _};
    use std::sync::{Arc, Mutex};

    /// Records its input and answers with a fixed reply
    struct Echo {
        reply: ProviderResult<String>,
        seen: Arc<Mutex<Vec<String>>>,
    }

    impl Echo {
        fn replying(reply: &str) -> (Self, Arc<Mutex<Vec<String>>>) {
            let seen = Arc::new(Mutex::new(Vec::new()));
            let echo = Self {
                reply: Ok(reply.to_string()),
                seen: seen.clone(),
            };
            (echo, seen)
        }

        fn answer(&self, text: &str) -> ProviderResult<String> {
            self.seen.lock().unwrap().push(text.to_string());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(e) => Err(ProviderError::InvalidOutput(e.to_string())),
            }
        }
    }

    #[async_trait]
    impl Summarizer for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn summarize(&self, text: &str) -> ProviderResult<String> {
            self.answer(text)
        }
    }

    #[async_trait]
    impl SpeechSynthesizer for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn synthesize(&self, text: &str) -> ProviderResult<String> {
            self.answer(text)
        }
    }

    fn pipeline(summary: &str, payload: &str, max_chars: usize) -> (Pipeline, Arc<Mutex<Vec<String>>>, Arc<Mutex<Vec<String>>>) {
        let (summarizer, summarized) = Echo::replying(summary);
        let (tts, spoken) = Echo::replying(payload);
        (
            Pipeline::new(Box::new(summarizer), max_chars).with_synthesizer(Box::new(tts)),
            summarized,
            spoken,
        )
    }

    #[test]
    fn blank_content_is_rejected() {
        let (pipeline, _, _) = pipeline("s", "AAAA", 10);
        assert!(matches!(pipeline.prepare_content(""), Err(PipelineError::EmptyContent)));
        assert!(matches!(pipeline.prepare_content(" \n\t "), Err(PipelineError::EmptyContent)));
    }

    #[test]
    fn truncates_on_char_boundaries() {
        let (pipeline, _, _) = pipeline("s", "AAAA", 3);
        assert_eq!(pipeline.prepare_content("héllo").unwrap(), "hél");
        assert_eq!(pipeline.prepare_content("hé").unwrap(), "hé");
    }

    #[tokio::test]
    async fn plain_summary_sends_full_text() {
        let (pipeline, summarized, _) = pipeline("short", "AAAA", 5);
        assert_eq!(pipeline.summarize("0123456789").await.unwrap(), "short");
        assert_eq!(summarized.lock().unwrap().as_slice(), ["0123456789"]);
        assert!(matches!(pipeline.summarize("  ").await, Err(PipelineError::EmptyContent)));
    }

    #[tokio::test]
    async fn audio_summary_sends_truncated_text() {
        let (pipeline, summarized, _) = pipeline("short", "AAECAw==", 5);
        pipeline.generate_audio_summary("0123456789").await.unwrap();
        assert_eq!(summarized.lock().unwrap().as_slice(), ["01234"]);
    }

    #[tokio::test]
    async fn blank_summary_is_an_error() {
        let (pipeline, _, spoken) = pipeline("   ", "AAAA", 100);
        assert!(matches!(
            pipeline.generate_audio_summary("page").await,
            Err(PipelineError::EmptySummary)
        ));
        assert!(spoken.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn produces_wav_data_uri() {
        let (pipeline, _, spoken) = pipeline("the gist", "data:audio/L16;codec=pcm;rate=24000;base64,AAECAw==", 100);
        let result = pipeline.generate_audio_summary("a long page").await.unwrap();

        assert_eq!(result.summary, "the gist");
        assert_eq!(spoken.lock().unwrap().as_slice(), ["the gist"]);

        let wav = general_purpose::STANDARD
            .decode(result.audio_data_uri.strip_prefix(WAV_DATA_URI_PREFIX).unwrap())
            .unwrap();
        assert_eq!(wav.len(), 48);
        let (format, data) = audio::decode(&wav).unwrap();
        assert_eq!(format, AudioFormat::tts_default());
        assert_eq!(data, &[0u8, 1, 2, 3]);
    }

    #[tokio::test]
    async fn empty_audio_is_an_error() {
        let (pipeline, _, _) = pipeline("the gist", "data:audio/L16;base64,", 100);
        assert!(matches!(
            pipeline.generate_audio_summary("page").await,
            Err(PipelineError::EmptyAudio)
        ));
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let summarizer = Echo {
            reply: Err(ProviderError::NotConfigured("down".into())),
            seen: Arc::default(),
        };
        let (tts, _) = Echo::replying("AAAA");
        let pipeline = Pipeline::new(Box::new(summarizer), 100).with_synthesizer(Box::new(tts));

        assert!(matches!(
            pipeline.generate_audio_summary("page").await,
            Err(PipelineError::Provider(_))
        ));
    }

    #[tokio::test]
    async fn audio_needs_a_synthesizer() {
        let (summarizer, summarized) = Echo::replying("the gist");
        let pipeline = Pipeline::new(Box::new(summarizer), 100);

        assert_eq!(pipeline.summarize("page").await.unwrap(), "the gist");
        assert!(matches!(
            pipeline.generate_audio_summary("page").await,
            Err(PipelineError::Provider(ProviderError::NotConfigured(_)))
        ));
        assert_eq!(summarized.lock().unwrap().len(), 1);
    }

    #[test]
    fn audio_summary_serializes_camel_case() {
        let json = serde_json::to_value(AudioSummary {
            summary: "s".into(),
            audio_data_uri: "data:audio/wav;base64,".into(),
        })
        .unwrap();
        assert_eq!(json["audioDataUri"], "data:audio/wav;base64,");
        assert_eq!(json["summary"], "s");
    }
}
