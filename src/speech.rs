//! Narration via the ElevenLabs text-to-speech API.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::SynthesisError;
use crate::models::SUMMARY_FAILED;

const MODEL_ID: &str = "eleven_monolingual_v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Turns a summary into an audio file keyed by the product's 1-based index.
pub trait Synthesizer {
    fn synthesize(&self, text: &str, index: usize) -> Result<PathBuf, SynthesisError>;
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

pub fn audio_file_name(index: usize) -> String {
    format!("product-{index}.mp3")
}

pub struct ElevenLabsSynthesizer {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
    audio_dir: PathBuf,
}

impl ElevenLabsSynthesizer {
    pub fn new(
        api_key: Option<String>,
        voice_id: &str,
        base_url: &str,
        audio_dir: impl Into<PathBuf>,
    ) -> Result<Self, SynthesisError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/v1/text-to-speech/{voice_id}", base_url.trim_end_matches('/')),
            audio_dir: audio_dir.into(),
        })
    }
}

/// Streams `body` into `path`. A partially written file is removed.
fn write_stream(body: &mut impl std::io::Read, path: &Path) -> Result<(), SynthesisError> {
    let result = (|| -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        std::io::copy(body, &mut writer)?;
        writer.flush()
    })();

    if let Err(e) = result {
        let _ = fs::remove_file(path);
        return Err(e.into());
    }
    Ok(())
}

impl Synthesizer for ElevenLabsSynthesizer {
    fn synthesize(&self, text: &str, index: usize) -> Result<PathBuf, SynthesisError> {
        let text = text.trim();
        if text.is_empty() || text == SUMMARY_FAILED {
            return Err(SynthesisError::Skipped);
        }
        let api_key = self.api_key.as_deref().ok_or(SynthesisError::MissingApiKey)?;

        let request = SpeechRequest {
            text,
            model_id: MODEL_ID,
            voice_settings: VoiceSettings {
                stability: 0.5,
                similarity_boost: 0.5,
            },
        };

        debug!(index, "Calling ElevenLabs API");
        let mut response = self
            .client
            .post(&self.endpoint)
            .header(ACCEPT, "audio/mpeg")
            .header("xi-api-key", api_key)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SynthesisError::Status { status, body });
        }

        fs::create_dir_all(&self.audio_dir)?;
        let path = self.audio_dir.join(audio_file_name(index));
        write_stream(&mut response, &path)?;

        info!(path = %path.display(), "Audio saved");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn synthesize_against(
        server: &MockServer,
        audio_dir: PathBuf,
        text: &str,
        index: usize,
    ) -> Result<PathBuf, SynthesisError> {
        let base = server.uri();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || {
            ElevenLabsSynthesizer::new(Some("xi-test".into()), "voice-1", &base, audio_dir)
                .and_then(|synthesizer| synthesizer.synthesize(&text, index))
        })
        .await
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn writes_audio_named_by_index() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/text-to-speech/voice-1"))
            .and(header("xi-api-key", "xi-test"))
            .and(header("accept", "audio/mpeg"))
            .and(body_json(json!({
                "text": "A short summary.",
                "model_id": "eleven_monolingual_v1",
                "voice_settings": { "stability": 0.5, "similarity_boost": 0.5 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3-fake-mp3".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let audio_dir = dir.path().join("audio");
        let saved = synthesize_against(&server, audio_dir.clone(), "A short summary.", 2)
            .await
            .unwrap();

        assert_eq!(saved, audio_dir.join("product-2.mp3"));
        assert_eq!(fs::read(&saved).unwrap(), b"ID3-fake-mp3");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn failed_summary_is_skipped_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let result = synthesize_against(&server, dir.path().to_path_buf(), SUMMARY_FAILED, 1).await;

        assert!(matches!(result, Err(SynthesisError::Skipped)));
        assert!(!dir.path().join("product-1.mp3").exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn error_status_reports_body_and_writes_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"detail":"invalid api key"}"#))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let result = synthesize_against(&server, dir.path().to_path_buf(), "Some text.", 3).await;

        match result {
            Err(SynthesisError::Status { status, body }) => {
                assert_eq!(status.as_u16(), 401);
                assert!(body.contains("invalid api key"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
        assert!(!dir.path().join("product-3.mp3").exists());
    }

    #[test]
    fn file_names_are_one_based_indices() {
        assert_eq!(audio_file_name(1), "product-1.mp3");
        assert_eq!(audio_file_name(12), "product-12.mp3");
    }
}
