//! Interactive captioning session
//!
//! Drives the image-load / generate / copy state machine over a command loop.
//! The session owns the display state (selected image, current captions) and
//! mutates it only in response to user commands.

use crate::ai::{CaptionService, GeminiCaptionClient, OpenAiCaptionClient};
use crate::clipboard::{ClipboardService, SystemClipboard};
use crate::models::{AiProvider, CaptionRequest, Config};
use crate::{data_url, Error, Result};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of a generation attempt that did not fail.
#[derive(Debug, PartialEq, Eq)]
pub enum GenerateOutcome {
    /// No image is selected; no flow call was made.
    NoImageSelected,
    /// Captions were generated and are now displayed.
    Captioned(usize),
}

/// The image currently selected in the session.
pub struct SelectedImage {
    pub path: PathBuf,
    pub data_url: String,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub captioner: Box<dyn CaptionService>,
    pub clipboard: Box<dyn ClipboardService>,
}

pub struct App {
    captioner: Box<dyn CaptionService>,
    clipboard: Box<dyn ClipboardService>,
    default_caption_count: u32,
    image: Option<SelectedImage>,
    captions: Vec<String>,
}

impl App {
    /// Build an app from concrete service dependencies.
    pub fn with_services(services: AppServices, default_caption_count: u32) -> Self {
        Self {
            captioner: services.captioner,
            clipboard: services.clipboard,
            default_caption_count,
            image: None,
            captions: Vec::new(),
        }
    }

    /// Construct an app from environment configuration (`Config::from_env`).
    pub fn from_config(config: &Config, default_caption_count: u32) -> Self {
        let captioner: Box<dyn CaptionService> = match config.provider {
            AiProvider::Gemini => {
                info!("Caption provider: Gemini (model: {})", config.model);
                Box::new(GeminiCaptionClient::new(
                    config.api_key.clone(),
                    config.model.clone(),
                ))
            }
            AiProvider::OpenAi => {
                info!("Caption provider: OpenAI (model: {})", config.model);
                Box::new(OpenAiCaptionClient::new(
                    config.api_key.clone(),
                    config.model.clone(),
                ))
            }
        };

        Self::with_services(
            AppServices {
                captioner,
                clipboard: Box::new(SystemClipboard::new()),
            },
            default_caption_count,
        )
    }

    pub fn has_image(&self) -> bool {
        self.image.is_some()
    }

    pub fn captions(&self) -> &[String] {
        &self.captions
    }

    /// Read a local file and select it as the current image.
    ///
    /// The bytes are held as a data URL; previously displayed captions stay
    /// on screen until the next generation.
    pub async fn load_image(&mut self, path: &Path) -> Result<()> {
        let bytes = tokio::fs::read(path).await?;
        let data_url = data_url::encode(&bytes);
        info!(
            "Selected image {} ({} bytes)",
            path.display(),
            bytes.len()
        );

        self.image = Some(SelectedImage {
            path: path.to_path_buf(),
            data_url,
        });
        Ok(())
    }

    /// Request captions for the selected image.
    ///
    /// With no image selected this is handled locally and no flow call is
    /// made. A flow failure propagates without touching displayed captions.
    pub async fn generate(&mut self, count: Option<u32>) -> Result<GenerateOutcome> {
        let image = match &self.image {
            Some(image) => image,
            None => return Ok(GenerateOutcome::NoImageSelected),
        };

        let request = CaptionRequest::new(image.data_url.clone())
            .with_caption_count(count.unwrap_or(self.default_caption_count));

        let response = self.captioner.generate_captions(&request).await?;
        info!("Received {} captions", response.captions.len());

        self.captions = response.captions;
        Ok(GenerateOutcome::Captioned(self.captions.len()))
    }

    /// Copy the caption at `index` (zero-based) to the clipboard.
    ///
    /// Returns the copied string so the caller can confirm it. Session state
    /// is not altered.
    pub fn copy_caption(&self, index: usize) -> Result<&str> {
        let caption = self.captions.get(index).ok_or_else(|| {
            Error::InvalidRequest(format!(
                "no caption {} (have {})",
                index + 1,
                self.captions.len()
            ))
        })?;

        self.clipboard.copy(caption)?;
        Ok(caption)
    }

    /// Run the interactive command loop until `quit` or end of input.
    ///
    /// Generation is awaited before the next command is read, so a second
    /// request can never overlap one in flight.
    pub async fn run(&mut self, input: &mut dyn BufRead, out: &mut dyn Write) -> Result<()> {
        writeln!(out, "Bangla Captioner")?;
        writeln!(
            out,
            "Commands: load <path> | generate [n] | copy <i> | show | quit"
        )?;

        let mut line = String::new();
        loop {
            write!(out, "> ")?;
            out.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            if trimmed == "quit" || trimmed == "exit" {
                break;
            }

            self.handle_command(trimmed, out).await?;
        }

        Ok(())
    }

    async fn handle_command(&mut self, command: &str, out: &mut dyn Write) -> Result<()> {
        if let Some(path) = command.strip_prefix("load ") {
            match self.load_image(Path::new(path.trim())).await {
                Ok(()) => writeln!(out, "Image loaded: {}", path.trim())?,
                Err(e) => writeln!(out, "Could not load image: {}", e)?,
            }
            return Ok(());
        }

        if command == "generate" || command.starts_with("generate ") {
            let count = match parse_count_arg(command) {
                Ok(count) => count,
                Err(message) => {
                    writeln!(out, "{}", message)?;
                    return Ok(());
                }
            };

            match self.generate(count).await {
                Ok(GenerateOutcome::NoImageSelected) => {
                    writeln!(out, "Please load an image first.")?;
                }
                Ok(GenerateOutcome::Captioned(_)) => {
                    self.write_captions(out)?;
                }
                Err(e) => {
                    writeln!(out, "Caption generation failed: {}", e)?;
                }
            }
            return Ok(());
        }

        if let Some(arg) = command.strip_prefix("copy ") {
            match arg.trim().parse::<usize>() {
                Ok(number) if number >= 1 => match self.copy_caption(number - 1) {
                    Ok(_) => writeln!(out, "Caption {} copied to clipboard.", number)?,
                    Err(e) => writeln!(out, "Copy failed: {}", e)?,
                },
                _ => writeln!(out, "Usage: copy <caption number>")?,
            }
            return Ok(());
        }

        match command {
            "show" => self.write_captions(out)?,
            "help" => writeln!(
                out,
                "Commands: load <path> | generate [n] | copy <i> | show | quit"
            )?,
            other => writeln!(out, "Unknown command: {}", other)?,
        }
        Ok(())
    }

    fn write_captions(&self, out: &mut dyn Write) -> Result<()> {
        if self.captions.is_empty() {
            writeln!(out, "No captions yet.")?;
            return Ok(());
        }

        for (i, caption) in self.captions.iter().enumerate() {
            writeln!(out, "{}. {}", i + 1, caption)?;
        }
        Ok(())
    }
}

fn parse_count_arg(command: &str) -> std::result::Result<Option<u32>, String> {
    match command.strip_prefix("generate ") {
        None => Ok(None),
        Some(arg) => match arg.trim().parse::<u32>() {
            Ok(count) if count >= 1 => Ok(Some(count)),
            _ => Err("Usage: generate [count >= 1]".to_string()),
        },
    }
}
