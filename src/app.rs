//! Terminal front end: command parsing, the interactive event loop and the
//! one-shot generate mode.

use crate::ai::GeminiImageClient;
use crate::models::{AspectRatio, Config, GenerationRequest, GenerationResult};
use crate::session::{Session, WallpaperState};
use crate::view;
use crate::wallpaper::WallpaperGenerator;
use crate::{Error, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub const HELP: &str = "\
Commands:
  prompt <text>     replace the prompt
  ratio <format>    desktop | mobile (also wide, tall, 16:9, 9:16)
  generate          create a wallpaper from the current prompt
  download          save the current wallpaper
  status            redraw the screen
  help              show this help
  quit              leave
Any other line replaces the prompt and generates right away.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SetPrompt(String),
    SetRatio(AspectRatio),
    Generate,
    PromptAndGenerate(String),
    Download,
    Status,
    Help,
    Quit,
}

impl Command {
    /// Parse one input line. Blank lines yield `Ok(None)`.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let command = match (head.to_ascii_lowercase().as_str(), rest.is_empty()) {
            ("prompt", _) => Command::SetPrompt(rest.to_string()),
            ("ratio" | "format", false) => Command::SetRatio(rest.parse()?),
            ("ratio" | "format", true) => {
                return Err(Error::Config(
                    "Usage: ratio <desktop|mobile>".to_string(),
                ))
            }
            ("generate", true) => Command::Generate,
            ("download", true) => Command::Download,
            ("status", true) => Command::Status,
            ("help" | "?", true) => Command::Help,
            ("quit" | "exit", true) => Command::Quit,
            _ => Command::PromptAndGenerate(line.to_string()),
        };
        Ok(Some(command))
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Owns the session and drives it from user input.
pub struct App {
    generator: Arc<WallpaperGenerator>,
    session: Session,
    output_dir: PathBuf,
}

impl App {
    /// Build an app from concrete dependencies; tests inject a mock-backed generator.
    pub fn with_generator(
        generator: WallpaperGenerator,
        session: Session,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            generator: Arc::new(generator),
            session,
            output_dir,
        }
    }

    /// Construct an app talking to the Gemini API as configured.
    pub fn new(config: &Config) -> Self {
        let client = GeminiImageClient::new(
            config.api_key.clone(),
            config.image_model.clone(),
            config.request_timeout,
        )
        .with_base_url(config.api_base_url.clone());
        info!("Image provider: Gemini (model: {})", client.model());

        Self::with_generator(
            WallpaperGenerator::new(Box::new(client)),
            Session::for_viewport(config.viewport_width),
            config.output_dir.clone(),
        )
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Generate once from the current session and save the result.
    ///
    /// A classified generation failure comes back as `Error::AiProvider`
    /// carrying the user-facing message.
    pub async fn generate_once(&mut self) -> Result<PathBuf> {
        if !self.session.generate(&self.generator).await {
            return Err(Error::Config("Prompt must not be blank".to_string()));
        }

        match self.session.state() {
            WallpaperState::Failed(message) => Err(Error::AiProvider(message.clone())),
            _ => self.session.download(&self.output_dir)?.ok_or_else(|| {
                Error::Invariant("Generation finished without an image".to_string())
            }),
        }
    }

    /// Run the interactive loop until `quit` or end of input.
    ///
    /// Generation runs on a spawned task and reports back over a channel, so
    /// input keeps flowing while a request is in flight. End of input waits
    /// for an in-flight request before returning.
    pub async fn run_interactive<R, W>(&mut self, mut input: R, out: &mut W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<GenerationResult>();
        // Bytes of a partially read line survive a cancelled read here.
        let mut buf = Vec::new();
        let mut input_open = true;

        writeln!(out, "{}\n\n{}", view::render(&self.session), HELP)?;

        loop {
            tokio::select! {
                read = input.read_until(b'\n', &mut buf), if input_open => {
                    let read = read?;
                    if !buf.is_empty() {
                        let line = decode_line(&buf, out)?;
                        buf.clear();
                        if let Flow::Quit = self.handle_line(&line, &tx, out)? {
                            break;
                        }
                    }
                    if read == 0 {
                        input_open = false;
                        if !self.session.is_loading() {
                            break;
                        }
                    }
                }
                Some(result) = rx.recv() => {
                    self.session.complete(result);
                    writeln!(out, "\n{}", view::render(&self.session))?;
                    if !input_open {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    fn handle_line<W: Write>(
        &mut self,
        line: &str,
        tx: &mpsc::UnboundedSender<GenerationResult>,
        out: &mut W,
    ) -> Result<Flow> {
        let command = match Command::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(Flow::Continue),
            Err(e) => {
                writeln!(out, "{}", e)?;
                return Ok(Flow::Continue);
            }
        };

        match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => {
                writeln!(out, "{}", HELP)?;
                return Ok(Flow::Continue);
            }
            Command::SetPrompt(prompt) => {
                self.update_prompt(prompt, out)?;
            }
            Command::SetRatio(aspect_ratio) => self.session.set_aspect_ratio(aspect_ratio),
            Command::Generate => self.trigger_generate(tx, out)?,
            Command::PromptAndGenerate(prompt) => {
                if self.update_prompt(prompt, out)? {
                    self.trigger_generate(tx, out)?;
                }
            }
            Command::Download => self.download(out)?,
            Command::Status => {}
        }

        writeln!(out, "\n{}", view::render(&self.session))?;
        Ok(Flow::Continue)
    }

    fn update_prompt<W: Write>(&mut self, prompt: String, out: &mut W) -> Result<bool> {
        let accepted = self.session.set_prompt(prompt);
        if !accepted {
            writeln!(out, "The prompt is locked while a wallpaper is generating.")?;
        }
        Ok(accepted)
    }

    fn trigger_generate<W: Write>(
        &mut self,
        tx: &mpsc::UnboundedSender<GenerationResult>,
        out: &mut W,
    ) -> Result<()> {
        match self.session.begin_generation() {
            Some(request) => self.spawn_generation(request, tx.clone()),
            None if self.session.is_loading() => {
                writeln!(out, "Already generating; please wait.")?;
            }
            None => writeln!(out, "Enter a prompt before generating.")?,
        }
        Ok(())
    }

    fn spawn_generation(
        &self,
        request: GenerationRequest,
        tx: mpsc::UnboundedSender<GenerationResult>,
    ) {
        let generator = Arc::clone(&self.generator);
        tokio::spawn(async move {
            let result = generator.generate(&request).await;
            if tx.send(result).is_err() {
                error!("Session closed before the generation result arrived");
            }
        });
    }

    fn download<W: Write>(&self, out: &mut W) -> Result<()> {
        match self.session.download(&self.output_dir) {
            Ok(Some(path)) => writeln!(out, "Saved wallpaper to {}", path.display())?,
            Ok(None) => {}
            Err(e) => {
                error!("Failed to save wallpaper: {}", e);
                writeln!(out, "Error: could not save wallpaper ({})", e)?;
            }
        }
        Ok(())
    }
}

/// Decode one raw input line, replacing bytes that are not valid UTF-8.
fn decode_line<W: Write>(raw: &[u8], out: &mut W) -> Result<String> {
    let line = String::from_utf8_lossy(raw);
    if let std::borrow::Cow::Owned(_) = line {
        warn!("Input line contained invalid UTF-8");
        writeln!(out, "Some input bytes were not valid UTF-8 and were replaced.")?;
    }
    Ok(line.trim_end_matches(|c: char| c == '\n' || c == '\r').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::MockImageGenerationClient;
    use crate::classify::QUOTA_EXCEEDED_MESSAGE;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    fn build_test_app(mock: MockImageGenerationClient, prompt: &str, output_dir: &Path) -> App {
        App::with_generator(
            WallpaperGenerator::new(Box::new(mock)),
            Session::new(prompt, AspectRatio::Wide),
            output_dir.to_path_buf(),
        )
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!(Command::parse("   ").unwrap(), None);
        assert_eq!(Command::parse("generate").unwrap(), Some(Command::Generate));
        assert_eq!(Command::parse(" DOWNLOAD ").unwrap(), Some(Command::Download));
        assert_eq!(Command::parse("quit").unwrap(), Some(Command::Quit));
        assert_eq!(
            Command::parse("ratio mobile").unwrap(),
            Some(Command::SetRatio(AspectRatio::Tall))
        );
        assert_eq!(
            Command::parse("prompt  liquid metal ").unwrap(),
            Some(Command::SetPrompt("liquid metal".to_string()))
        );
        assert_eq!(
            Command::parse("prompt").unwrap(),
            Some(Command::SetPrompt(String::new()))
        );
    }

    #[test]
    fn test_free_text_generates() {
        assert_eq!(
            Command::parse("download the stars").unwrap(),
            Some(Command::PromptAndGenerate("download the stars".to_string()))
        );
        assert_eq!(
            Command::parse("fractal aurora").unwrap(),
            Some(Command::PromptAndGenerate("fractal aurora".to_string()))
        );
    }

    #[test]
    fn test_parse_bad_ratio() {
        assert!(Command::parse("ratio square").is_err());
        assert!(Command::parse("ratio").is_err());
    }

    #[tokio::test]
    async fn test_interactive_generate_then_wait_on_eof() {
        let dir = tempdir().unwrap();
        let mock = MockImageGenerationClient::new().with_image_response(vec![7, 7, 7]);
        let mut app = build_test_app(mock, "waves", dir.path());

        let mut out = Vec::new();
        app.run_interactive(&b"generate\n"[..], &mut out)
            .await
            .unwrap();

        assert_eq!(app.session().image(), Some(&[7u8, 7, 7][..]));
        let screen = String::from_utf8(out).unwrap();
        assert!(screen.contains("Generating your masterpiece..."));
        assert!(screen.contains("Wallpaper ready: 3 bytes"));
    }

    #[tokio::test]
    async fn test_interactive_ignores_trigger_while_loading() {
        let dir = tempdir().unwrap();
        let mock = MockImageGenerationClient::new().with_delay(Duration::from_millis(50));
        let observer = mock.clone();
        let mut app = build_test_app(mock, "waves", dir.path());

        let mut out = Vec::new();
        app.run_interactive(&b"generate\ngenerate\nprompt other\n"[..], &mut out)
            .await
            .unwrap();

        assert_eq!(observer.get_call_count(), 1);
        assert_eq!(app.session().prompt(), "waves");
        let screen = String::from_utf8(out).unwrap();
        assert!(screen.contains("Already generating"));
        assert!(screen.contains("locked"));
    }

    #[tokio::test]
    async fn test_interactive_failure_shows_banner() {
        let dir = tempdir().unwrap();
        let mock = MockImageGenerationClient::new().with_error_response("RESOURCE_EXHAUSTED");
        let mut app = build_test_app(mock, "waves", dir.path());

        let mut out = Vec::new();
        app.run_interactive(&b"generate\n"[..], &mut out)
            .await
            .unwrap();

        assert_eq!(app.session().error_message(), Some(QUOTA_EXCEEDED_MESSAGE));
        let screen = String::from_utf8(out).unwrap();
        assert!(screen.contains(&format!("Error: {}", QUOTA_EXCEEDED_MESSAGE)));
    }

    #[tokio::test]
    async fn test_interactive_survives_invalid_utf8_line() {
        let dir = tempdir().unwrap();
        let mock = MockImageGenerationClient::new().with_image_response(vec![4, 2]);
        let observer = mock.clone();
        let mut app = build_test_app(mock, "waves", dir.path());

        let mut out = Vec::new();
        app.run_interactive(&b"prompt caf\xE9 nebula\ngenerate\r\n"[..], &mut out)
            .await
            .unwrap();

        assert_eq!(app.session().prompt(), "caf\u{FFFD} nebula");
        assert_eq!(observer.get_call_count(), 1);
        assert_eq!(app.session().image(), Some(&[4u8, 2][..]));
        let screen = String::from_utf8(out).unwrap();
        assert!(screen.contains("not valid UTF-8"));
    }

    #[tokio::test]
    async fn test_interactive_reads_last_line_without_newline() {
        let dir = tempdir().unwrap();
        let mock = MockImageGenerationClient::new().with_image_response(vec![9]);
        let mut app = build_test_app(mock, "waves", dir.path());

        let mut out = Vec::new();
        app.run_interactive(&b"ratio mobile\ngenerate"[..], &mut out)
            .await
            .unwrap();

        assert_eq!(app.session().aspect_ratio(), AspectRatio::Tall);
        assert_eq!(app.session().image(), Some(&[9u8][..]));
    }

    #[tokio::test]
    async fn test_interactive_quit_and_download_noop() {
        let dir = tempdir().unwrap();
        let observer = MockImageGenerationClient::new();
        let mut app = build_test_app(observer.clone(), "waves", dir.path());

        let mut out = Vec::new();
        app.run_interactive(&b"ratio mobile\ndownload\nquit\ngenerate\n"[..], &mut out)
            .await
            .unwrap();

        assert_eq!(app.session().aspect_ratio(), AspectRatio::Tall);
        assert_eq!(observer.get_call_count(), 0);
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_generate_once_saves_file() {
        let dir = tempdir().unwrap();
        let mock = MockImageGenerationClient::new().with_image_response(vec![0xFF, 0xD8, 0xFF]);
        let mut app = build_test_app(mock, "Liquid Metal Waves!", dir.path());

        let path = app.generate_once().await.unwrap();
        assert_eq!(
            path,
            dir.path().join("wallpaper_desktop_liquid_metal_waves_.jpeg")
        );
        assert_eq!(fs::read(path).unwrap(), vec![0xFF, 0xD8, 0xFF]);
    }

    #[tokio::test]
    async fn test_generate_once_reports_classified_failure() {
        let dir = tempdir().unwrap();
        let mock = MockImageGenerationClient::new().with_empty_response();
        let mut app = build_test_app(mock, "waves", dir.path());

        let err = app.generate_once().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "No image was generated. The response may have been blocked."
        );
    }

    #[tokio::test]
    async fn test_generate_once_rejects_blank_prompt() {
        let dir = tempdir().unwrap();
        let mut app = build_test_app(MockImageGenerationClient::new(), " ", dir.path());
        assert!(matches!(
            app.generate_once().await.unwrap_err(),
            Error::Config(_)
        ));
    }
}
