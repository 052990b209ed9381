//! OCR Providers
//!
//! Defines the provider trait and implementations for different OCR backends.

use std::io::Cursor;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use image::DynamicImage;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::types::{
    language_name, tesseract_language, OcrError, OcrFragment, OcrProvider, Region,
};

/// OCR provider trait
#[async_trait]
pub trait OcrProviderTrait: Send + Sync {
    /// Get the provider type
    fn provider_type(&self) -> OcrProvider;

    /// Check if the provider is available
    async fn is_available(&self) -> bool;

    /// Read the text regions of a decoded image, in reading order
    async fn read_text(
        &self,
        image: &DynamicImage,
        languages: &[String],
    ) -> Result<Vec<OcrFragment>, OcrError>;
}

/// Encode a decoded image as PNG for engines that take files
pub(crate) fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, OcrError> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), image::ImageFormat::Png)
        .map_err(|e| OcrError::ImageEncodingError(format!("Failed to encode image: {}", e)))?;
    Ok(buffer)
}

// ============================================================================
// Tesseract
// ============================================================================

/// Tesseract OCR provider
///
/// Pipes a PNG into the `tesseract` CLI and parses its TSV report.
pub struct TesseractProvider {
    /// Executable name or path
    command: String,
}

impl TesseractProvider {
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }
}

impl Default for TesseractProvider {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl OcrProviderTrait for TesseractProvider {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Tesseract
    }

    async fn is_available(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn read_text(
        &self,
        image: &DynamicImage,
        languages: &[String],
    ) -> Result<Vec<OcrFragment>, OcrError> {
        let png = encode_png(image)?;

        let lang = languages
            .iter()
            .map(|code| tesseract_language(code))
            .collect::<Vec<_>>()
            .join("+");

        let mut command = Command::new(&self.command);
        command.arg("stdin").arg("stdout");
        if !lang.is_empty() {
            command.arg("-l").arg(&lang);
        }
        let mut child = command
            .arg("--psm")
            .arg("3")
            .arg("tsv")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to run tesseract: {}", e)))?;

        // Tesseract reads the whole image before writing anything
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&png)
                .await
                .map_err(|e| OcrError::ProcessingError(format!("Failed to send image: {}", e)))?;
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| OcrError::ProcessingError(format!("Failed to run tesseract: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(OcrError::ProcessingError(format!(
                "Tesseract failed: {}",
                stderr.trim()
            )));
        }

        let tsv = String::from_utf8_lossy(&output.stdout);
        Ok(parse_tsv(&tsv))
    }
}

/// Parse Tesseract TSV output into one fragment per text line.
///
/// Word rows (level 5) sharing a page/block/paragraph/line key are merged in
/// order; their boxes are unioned and their confidences averaged.
pub fn parse_tsv(tsv: &str) -> Vec<OcrFragment> {
    struct Line {
        key: (u32, u32, u32, u32),
        region: Region,
        words: Vec<String>,
        confidence_sum: f32,
    }

    let mut lines: Vec<Line> = Vec::new();

    for row in tsv.lines() {
        let cols: Vec<&str> = row.splitn(12, '\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }

        let text = cols[11].trim();
        if text.is_empty() {
            continue;
        }

        let nums: Option<Vec<u32>> = cols[1..10].iter().map(|c| c.trim().parse().ok()).collect();
        let Some(nums) = nums else {
            continue;
        };
        let confidence = cols[10].trim().parse::<f32>().unwrap_or(0.0).max(0.0);

        let key = (nums[0], nums[1], nums[2], nums[3]);
        let region = Region {
            left: nums[5],
            top: nums[6],
            width: nums[7],
            height: nums[8],
        };

        match lines.last_mut() {
            Some(line) if line.key == key => {
                line.region = line.region.union(&region);
                line.words.push(text.to_string());
                line.confidence_sum += confidence;
            }
            _ => lines.push(Line {
                key,
                region,
                words: vec![text.to_string()],
                confidence_sum: confidence,
            }),
        }
    }

    lines
        .into_iter()
        .map(|line| {
            let confidence = line.confidence_sum / line.words.len() as f32;
            OcrFragment::new(line.region, line.words.join(" "), confidence)
        })
        .collect()
}

// ============================================================================
// Ollama
// ============================================================================

/// Connect timeout for Ollama, also the budget of the availability check
pub const OLLAMA_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on a whole recognition request
pub const OLLAMA_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Ollama vision model provider
pub struct OllamaProvider {
    /// Ollama API URL
    base_url: String,
    /// Model name (e.g., "llava", "bakllava")
    model: String,
    client: reqwest::Client,
    connect_timeout: Duration,
}

impl OllamaProvider {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self::with_timeouts(base_url, model, OLLAMA_CONNECT_TIMEOUT, OLLAMA_REQUEST_TIMEOUT)
    }

    pub fn with_timeouts(base_url: &str, model: &str, connect: Duration, request: Duration) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(connect)
            .timeout(request)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build Ollama client, using defaults: {}", e);
                reqwest::Client::new()
            });

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            client,
            connect_timeout: connect,
        }
    }
}

#[async_trait]
impl OcrProviderTrait for OllamaProvider {
    fn provider_type(&self) -> OcrProvider {
        OcrProvider::Ollama
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);

        // Runs before every recognition, so it must fail fast
        match self
            .client
            .get(&url)
            .timeout(self.connect_timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    async fn read_text(
        &self,
        image: &DynamicImage,
        languages: &[String],
    ) -> Result<Vec<OcrFragment>, OcrError> {
        use base64::Engine;

        let url = format!("{}/api/generate", self.base_url);
        let image_base64 = base64::engine::general_purpose::STANDARD.encode(encode_png(image)?);

        let lang_hint = if languages.is_empty() {
            String::new()
        } else {
            let names: Vec<&str> = languages.iter().map(|l| language_name(l)).collect();
            format!(" The text may be in {}.", names.join(" or "))
        };

        let prompt = format!(
            "Extract all text from this image exactly as written.{} Return only the extracted text, nothing else.",
            lang_hint
        );

        let request = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "images": [image_base64],
            "stream": false
        });

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to call Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(OcrError::ApiError(format!(
                "Ollama returned {}: {}",
                status, body
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OcrError::ApiError(format!("Failed to parse response: {}", e)))?;

        let text = result["response"].as_str().unwrap_or("").trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }

        // LLMs give neither boxes nor confidences: one fragment per line,
        // covering the whole image
        let region = Region {
            left: 0,
            top: 0,
            width: image.width(),
            height: image.height(),
        };
        Ok(text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| OcrFragment::new(region, line, 75.0))
            .collect())
    }
}

// ============================================================================
// Test support
// ============================================================================

/// Mock provider for testing
#[cfg(test)]
pub struct MockProvider {
    pub provider: OcrProvider,
    pub fragments: Vec<OcrFragment>,
    pub available: bool,
    pub failure: Option<String>,
}

#[cfg(test)]
impl MockProvider {
    /// Provider returning one fragment per given text
    pub fn with_texts(texts: &[&str]) -> Self {
        Self {
            provider: OcrProvider::Tesseract,
            fragments: texts
                .iter()
                .map(|t| OcrFragment::new(Region::default(), *t, 90.0))
                .collect(),
            available: true,
            failure: None,
        }
    }

    /// Provider whose recognition always fails
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::with_texts(&[])
        }
    }
}

#[cfg(test)]
#[async_trait]
impl OcrProviderTrait for MockProvider {
    fn provider_type(&self) -> OcrProvider {
        self.provider
    }

    async fn is_available(&self) -> bool {
        self.available
    }

    async fn read_text(
        &self,
        _image: &DynamicImage,
        _languages: &[String],
    ) -> Result<Vec<OcrFragment>, OcrError> {
        match &self.failure {
            Some(message) => Err(OcrError::ProcessingError(message.clone())),
            None => Ok(self.fragments.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t
2\t1\t1\t0\t0\t0\t40\t30\t300\t80\t-1\t
4\t1\t1\t1\t1\t0\t40\t30\t300\t30\t-1\t
5\t1\t1\t1\t1\t1\t40\t30\t140\t30\t96.5\tINVOICE
5\t1\t1\t1\t1\t2\t200\t32\t140\t28\t91.5\t2024
5\t1\t1\t1\t2\t1\t40\t80\t60\t20\t-1\t
5\t1\t1\t1\t2\t2\t110\t80\t90\t20\t88\tTotal:
5\t1\t1\t1\t2\t3\t210\t80\t60\t20\t80\t₹500
";

    #[test]
    fn test_parse_tsv_groups_words_into_lines() {
        let fragments = parse_tsv(TSV);

        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "INVOICE 2024");
        assert_eq!(
            fragments[0].region,
            Region { left: 40, top: 30, width: 300, height: 30 }
        );
        assert!((fragments[0].confidence - 94.0).abs() < 0.01);

        // Blank words are skipped
        assert_eq!(fragments[1].text, "Total: ₹500");
        assert!((fragments[1].confidence - 84.0).abs() < 0.01);
    }

    #[test]
    fn test_parse_tsv_ignores_garbage() {
        assert!(parse_tsv("").is_empty());
        assert!(parse_tsv("not\ttsv\n5\tx\ty").is_empty());
    }

    #[test]
    fn test_encode_png() {
        let image = DynamicImage::new_rgb8(4, 4);
        let png = encode_png(&image).unwrap();
        assert_eq!(&png[1..4], b"PNG");
    }

    #[tokio::test]
    async fn test_missing_tesseract_is_unavailable() {
        let provider = TesseractProvider::new("definitely-not-a-tesseract-binary");
        assert!(!provider.is_available().await);

        let result = provider
            .read_text(&DynamicImage::new_rgb8(2, 2), &["en".to_string()])
            .await;
        assert!(matches!(result, Err(OcrError::ProcessingError(_))));
    }

    #[tokio::test]
    async fn test_unresponsive_ollama_is_unavailable() {
        // Accepts connections but never answers
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let provider = OllamaProvider::with_timeouts(
            &format!("http://{}", addr),
            "llava",
            Duration::from_millis(200),
            Duration::from_millis(500),
        );

        let available = tokio::time::timeout(Duration::from_secs(5), provider.is_available())
            .await
            .expect("availability check hung");
        assert!(!available);

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            provider.read_text(&DynamicImage::new_rgb8(2, 2), &["en".to_string()]),
        )
        .await
        .expect("recognition hung");
        assert!(matches!(result, Err(OcrError::ApiError(_))));
    }
}
