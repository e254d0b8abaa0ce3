//! Application entry point — image-to-speech console client.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (current-thread: the audio sink is not
//!    `Send`, so the pipeline stays on the main thread).
//! 4. Build the [`ApiClient`] gateway from config.
//! 5. Health-check the backend (connectivity notice, never fatal).
//! 6. Open the audio output (degrades to a stub sink without a device).
//! 7. Account sign-in loop (login or register).
//! 8. Command loop — one line per command until `quit`.

use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image_to_speech::{
    api::{ApiClient, LanguageInfo, OperationData, OperationGateway, OperationKind, OperationOutcome},
    config::{AppConfig, AppPaths, CaptionMode},
    media::{AudioSink, NoDeviceSink, RodioSink, SourceImage},
    pipeline::{new_shared_state, OperationParams, PipelineOrchestrator, SharedState},
    session::{AccountStore, DEFAULT_PASSWORD, DEFAULT_USERNAME},
};

use tokio::runtime::Runtime;

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("image-to-speech client starting up");

    // 2. Configuration
    let first_run = AppConfig::is_first_run();
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    if first_run {
        match config.save() {
            Ok(()) => println!(
                "First run: wrote default settings to {}",
                AppPaths::new().settings_file.display()
            ),
            Err(e) => log::warn!("Could not write initial settings file: {e}"),
        }
    }

    // 3. Tokio runtime (current-thread — the rodio output stream must stay
    //    on the thread that created it)
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    // 4. API gateway
    let api = Arc::new(ApiClient::from_config(&config.api));
    let gateway: Arc<dyn OperationGateway> = api.clone();

    // 5. Health check — informative only; the client starts either way
    match rt.block_on(api.health()) {
        Ok(report) if report.is_healthy() => {
            println!(
                "Connected to {} (backend version {}).",
                config.api.base_url, report.version
            );
        }
        Ok(report) => {
            println!(
                "Backend at {} reports status '{}'.",
                config.api.base_url, report.status
            );
        }
        Err(e) => {
            println!("Warning: backend not reachable at {} ({e}).", config.api.base_url);
            println!("Operations will fail until it is up.");
        }
    }

    // 6. Audio output (may fail on headless hosts — degrade gracefully)
    let sink: Box<dyn AudioSink> = match RodioSink::open() {
        Ok(sink) => {
            log::info!("Audio output ready");
            Box::new(sink)
        }
        Err(e) => {
            log::warn!("Audio output unavailable: {e}. Playback is disabled; `save` still works.");
            Box::new(NoDeviceSink::new(e.to_string()))
        }
    };

    let shared_state = new_shared_state();
    let mut orchestrator = PipelineOrchestrator::new(Arc::clone(&shared_state), gateway, sink);

    // 7. Account sign-in
    let mut accounts = AccountStore::load_or_default();

    println!();
    println!("image-to-speech console client — type `help` for commands.");

    loop {
        let user = match sign_in(&mut accounts) {
            Some(user) => user,
            None => break, // EOF at the sign-in prompt
        };
        orchestrator.begin_session(user.as_str());
        println!("Signed in as {user}.");

        // 8. Command loop
        match command_loop(&rt, &mut orchestrator, &api, &config, &shared_state) {
            LoopExit::Quit => break,
            LoopExit::Logout => {
                accounts.logout();
                orchestrator.end_session();
                println!("Signed out.");
            }
        }
    }

    log::info!("image-to-speech client shutting down");
}

// ---------------------------------------------------------------------------
// Sign-in
// ---------------------------------------------------------------------------

/// Prompt until a login or registration succeeds.
///
/// Returns `None` on EOF so the caller can exit cleanly. A session restored
/// from the account store skips the prompt entirely.
fn sign_in(accounts: &mut AccountStore) -> Option<String> {
    if let Some(user) = accounts.current_user() {
        let user = user.to_string();
        println!("Restored session for {user}.");
        return Some(user);
    }

    println!();
    println!("Sign in (default account: {DEFAULT_USERNAME} / {DEFAULT_PASSWORD}).");

    loop {
        let choice = prompt_line("login or register [l/r]: ")?;
        let register = match choice.trim() {
            "" | "l" | "login" => false,
            "r" | "register" => true,
            other => {
                println!("Unrecognized choice `{other}`; answer `l` or `r`.");
                continue;
            }
        };

        let username = prompt_line("username: ")?;
        let password = prompt_line("password: ")?;

        let result = if register {
            accounts.register(username.trim(), &password)
        } else {
            accounts.login(username.trim(), &password)
        };

        match result {
            Ok(()) => return Some(username.trim().to_string()),
            Err(e) => println!("{e}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Command loop
// ---------------------------------------------------------------------------

enum LoopExit {
    Quit,
    Logout,
}

fn command_loop(
    rt: &Runtime,
    orchestrator: &mut PipelineOrchestrator,
    api: &ApiClient,
    config: &AppConfig,
    shared_state: &SharedState,
) -> LoopExit {
    loop {
        let Some(line) = prompt_line("> ") else {
            return LoopExit::Quit;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        // Poll playback first so end-of-media is reflected before the
        // command runs.
        orchestrator.playback_mut().refresh();

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or_default();

        match command {
            "help" => print_help(),

            "quit" | "exit" => return LoopExit::Quit,

            "logout" | "login" => return LoopExit::Logout,

            "image" => {
                let path = parts.collect::<Vec<_>>().join(" ");
                if path.is_empty() {
                    println!("usage: image <path>");
                    continue;
                }
                match SourceImage::from_path(Path::new(&path)) {
                    Ok(image) if !image.is_image() => {
                        println!(
                            "{} does not look like an image (unrecognized extension).",
                            image.file_name()
                        );
                    }
                    Ok(image) => {
                        println!(
                            "Loaded {} ({} bytes, {}). Previous results cleared.",
                            image.file_name(),
                            image.len(),
                            image.content_type()
                        );
                        orchestrator.set_image(image);
                    }
                    Err(e) => println!("Could not read {path}: {e}"),
                }
            }

            "ocr" => {
                let requested: Vec<String> = parts
                    .flat_map(|a| a.split(','))
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                let languages = if requested.is_empty() {
                    config.ocr.languages.clone()
                } else {
                    requested
                };
                run_operation(rt, orchestrator, OperationParams::TextExtraction { languages });
            }

            "caption" => {
                let mode = match parts.next() {
                    None => config.caption.mode,
                    Some("local") => CaptionMode::Local,
                    Some("cloud") => CaptionMode::Cloud,
                    Some(other) => {
                        println!("Unknown caption mode `{other}` (expected `local` or `cloud`).");
                        continue;
                    }
                };
                run_operation(rt, orchestrator, OperationParams::Captioning { mode });
            }

            "translate" => {
                let target_language = parts
                    .next()
                    .map(str::to_string)
                    .unwrap_or_else(|| config.translation.target_language.clone());
                let text = remainder_text(parts);
                run_operation(
                    rt,
                    orchestrator,
                    OperationParams::Translation {
                        text,
                        target_language,
                    },
                );
            }

            "speak" => {
                let text = remainder_text(parts);
                run_operation(
                    rt,
                    orchestrator,
                    OperationParams::SpeechSynthesis {
                        text,
                        language: config.speech.language.clone(),
                        rate: config.speech.rate,
                    },
                );
            }

            "play" => {
                if let Err(e) = orchestrator.playback_mut().play() {
                    println!("Playback failed: {e}");
                }
            }

            "pause" => orchestrator.playback_mut().pause(),

            "toggle" => {
                if let Err(e) = orchestrator.playback_mut().toggle() {
                    println!("Playback failed: {e}");
                }
            }

            "save" => {
                let arg = parts.collect::<Vec<_>>().join(" ");
                save_audio(orchestrator, &arg);
            }

            "voices" => match rt.block_on(api.voices()) {
                Ok(voices) => {
                    println!("{} synthesizer voices:", voices.len());
                    for voice in voices {
                        println!("  {:<8} {}", voice.code, voice.name);
                    }
                }
                Err(e) => println!("Could not fetch voices: {e}"),
            },

            "languages" => {
                match rt.block_on(api.ocr_languages()) {
                    Ok(languages) => print_language_table("Extraction", &languages),
                    Err(e) => println!("Could not fetch extraction languages: {e}"),
                }
                match rt.block_on(api.translation_languages()) {
                    Ok(languages) => print_language_table("Translation", &languages),
                    Err(e) => println!("Could not fetch translation languages: {e}"),
                }
            }

            "status" => print_status(orchestrator, shared_state),

            other => println!("Unknown command `{other}`; type `help` for the list."),
        }
    }
}

/// Dispatch one operation and report the outcome. Local precondition
/// failures and remote failures both print without ending the loop.
fn run_operation(rt: &Runtime, orchestrator: &mut PipelineOrchestrator, params: OperationParams) {
    match rt.block_on(orchestrator.run(params)) {
        Ok(outcome) => report_outcome(&outcome),
        Err(e) => println!("{e}"),
    }
}

/// Trailing words of a command as explicit operation text.
fn remainder_text<'a>(parts: impl Iterator<Item = &'a str>) -> Option<String> {
    let words: Vec<&str> = parts.collect();
    if words.is_empty() {
        None
    } else {
        Some(words.join(" "))
    }
}

// ---------------------------------------------------------------------------
// Output helpers
// ---------------------------------------------------------------------------

fn report_outcome(outcome: &OperationOutcome) {
    match outcome.data() {
        Some(OperationData::TextExtraction(data)) => {
            println!(
                "Extracted {} words, {} characters (confidence {:.2}):",
                data.word_count, data.character_count, data.confidence
            );
            println!("{}", data.text);
            if !data.languages_detected.is_empty() {
                println!("Languages detected: {}", data.languages_detected.join(", "));
            }
        }
        Some(OperationData::Captioning(data)) => {
            println!("Caption ({} mode, confidence {:.2}):", data.mode, data.confidence);
            println!("{}", data.caption);
            if let Some(detail) = &data.detailed_description {
                println!();
                println!("{detail}");
            }
            if let Some(insights) = &data.insights {
                if !insights.keywords.is_empty() {
                    println!("Keywords: {}", insights.keywords.join(", "));
                }
            }
        }
        Some(OperationData::Translation(data)) => {
            println!(
                "Translated {} -> {} ({} words):",
                data.source_language, data.target_language, data.word_count
            );
            println!("{}", data.translated_text);
        }
        Some(OperationData::SpeechSynthesis(audio)) => {
            println!("Synthesized {} bytes of {}.", audio.len(), audio.content_type);
            println!("Use `play` to listen or `save [path]` to export.");
        }
        None => {
            println!(
                "{} failed: {}",
                outcome.kind.label(),
                outcome.error().unwrap_or("unknown error")
            );
        }
    }
}

/// Write the current synthesized audio to `arg`, or to the exports
/// directory when no path is given.
fn save_audio(orchestrator: &PipelineOrchestrator, arg: &str) {
    let Some(handle) = orchestrator.current_audio() else {
        println!("No synthesized audio to save; run `speak` first.");
        return;
    };

    let path = if arg.is_empty() {
        AppPaths::new()
            .exports_dir
            .join(default_export_name(handle.content_type()))
    } else {
        PathBuf::from(arg)
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                println!("Could not create {}: {e}", parent.display());
                return;
            }
        }
    }

    match std::fs::write(&path, handle.bytes()) {
        Ok(()) => println!("Saved {} bytes to {}.", handle.len(), path.display()),
        Err(e) => println!("Could not write {}: {e}", path.display()),
    }
}

fn default_export_name(content_type: &str) -> String {
    let ext = if content_type.contains("aiff") { "aiff" } else { "wav" };
    format!("speech.{ext}")
}

fn print_language_table(label: &str, languages: &[LanguageInfo]) {
    println!("{} languages ({}):", label, languages.len());
    for language in languages {
        println!("  {:<8} {}", language.code, language.name);
    }
}

fn print_status(orchestrator: &PipelineOrchestrator, shared_state: &SharedState) {
    let (user, image, results, in_flight, error) = {
        let st = shared_state.lock().unwrap();
        let image = st
            .image
            .as_ref()
            .map(|i| format!("{} ({} bytes)", i.file_name(), i.len()));
        let results: Vec<(&'static str, String)> = OperationKind::ALL
            .iter()
            .map(|&kind| {
                let summary = match st.results.get(kind) {
                    None => "-".to_string(),
                    Some(outcome) => outcome_summary(outcome),
                };
                (kind.label(), summary)
            })
            .collect();
        (
            st.user.clone(),
            image,
            results,
            st.in_flight,
            st.error_message.clone(),
        )
    };

    println!("Session:");
    println!("  user:     {}", user.as_deref().unwrap_or("-"));
    println!("  image:    {}", image.as_deref().unwrap_or("-"));
    if let Some(kind) = in_flight {
        println!("  running:  {}", kind.label());
    }
    println!("Results:");
    for (label, summary) in results {
        println!("  {:<18} {}", label, summary);
    }
    println!("Playback:");
    println!("  state:    {}", orchestrator.playback().state().label());
    let audio = match orchestrator.current_audio() {
        Some(handle) => format!(
            "{} bytes of {} (handle #{})",
            handle.len(),
            handle.content_type(),
            handle.id()
        ),
        None => "-".to_string(),
    };
    println!("  audio:    {audio}");
    if let Some(message) = error {
        println!("Last error: {message}");
    }
}

fn outcome_summary(outcome: &OperationOutcome) -> String {
    match outcome.data() {
        Some(OperationData::SpeechSynthesis(audio)) => {
            format!("{} bytes of {}", audio.len(), audio.content_type)
        }
        Some(data) => preview(data.primary_text().unwrap_or_default()),
        None => format!("failed: {}", outcome.error().unwrap_or("unknown error")),
    }
}

/// First 60 characters of a result for single-line status output.
fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 60;
    let flat = text.replace(['\r', '\n'], " ");
    let mut out: String = flat.chars().take(MAX_CHARS).collect();
    if flat.chars().count() > MAX_CHARS {
        out.push_str("...");
    }
    out
}

fn print_help() {
    println!("Commands:");
    println!("  image <path>              load an image (clears previous results)");
    println!("  ocr [langs]               extract text, e.g. `ocr en,es`");
    println!("  caption [local|cloud]     describe the image");
    println!("  translate [lang] [text]   translate text (defaults to the best available text)");
    println!("  speak [text]              synthesize speech (defaults to the best available text)");
    println!("  play / pause / toggle     control playback");
    println!("  save [path]               write the synthesized audio to disk");
    println!("  voices                    list synthesizer voices");
    println!("  languages                 list extraction and translation languages");
    println!("  status                    show session, results and playback state");
    println!("  login / logout            switch accounts");
    println!("  quit                      exit");
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// One line from stdin, prompt included. `None` means EOF.
fn prompt_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();

    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) => None,
        Ok(_) => Some(line.trim_end_matches('\n').trim_end_matches('\r').to_string()),
        Err(e) => {
            log::warn!("stdin read failed: {e}");
            None
        }
    }
}
