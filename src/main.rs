mod config;
mod core;
mod export;
mod input;
mod playback;
mod provider;
mod session;
mod ui;

use crate::config::AppSettings;
use crate::core::{CompilerAnalysis, QuizSession};
use crate::provider::StudyProvider;
use crate::session::VisualizerSession;
use crate::ui::render;
use crate::ui::shortcuts::apply_command;
use crate::ui::{help_text, parse_command, Command, Tab};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ai-mentor", version, about = "Study notes, keyword guides and animated code walkthroughs")]
struct Cli {
    /// Use the built-in offline provider instead of the Gemini API
    #[arg(long, global = true)]
    offline: bool,

    /// Settings file to use instead of the one in the config directory
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only log warnings and errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate study notes for a topic
    Notes {
        topic: String,
        /// Take the quiz after reading the notes
        #[arg(long)]
        quiz: bool,
    },
    /// List the keywords of a language
    Keywords {
        /// Defaults to the configured language
        language: Option<String>,
    },
    /// Explain one keyword
    Explain { language: String, keyword: String },
    /// Trace a program and animate its execution
    Visualize(VisualizeArgs),
    /// Show the active settings
    Config {
        /// Write the active settings back to disk
        #[arg(long)]
        write: bool,
    },
}

#[derive(Args, Debug)]
struct VisualizeArgs {
    /// Source file to analyze
    #[arg(required_unless_present = "replay")]
    file: Option<PathBuf>,

    /// Language of the source file (inferred from the extension otherwise)
    #[arg(short, long)]
    language: Option<String>,

    /// Standard input fed to the program
    #[arg(short, long)]
    input: Option<String>,

    /// Delay between animation steps in milliseconds
    #[arg(short, long)]
    speed: Option<u64>,

    /// Show a saved analysis instead of asking the provider
    #[arg(long, conflicts_with = "file")]
    replay: Option<PathBuf>,

    /// Save the analysis as JSON
    #[arg(long)]
    save: Option<PathBuf>,

    /// Export the state table as CSV
    #[arg(long)]
    export_csv: Option<PathBuf>,

    /// View shown first
    #[arg(long, default_value = "animation")]
    tab: Tab,

    /// Play the animation once and exit
    #[arg(long)]
    autoplay: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.quiet { "warn" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let settings = match &cli.config {
        Some(path) => AppSettings::load_from(path)?,
        None => AppSettings::load(),
    };

    match cli.command {
        Commands::Config { write } => show_config(&settings, cli.config.as_ref(), write),
        Commands::Notes { topic, quiz } => {
            let provider = provider::from_settings(&settings, cli.offline)?;
            notes(provider.as_ref(), &topic, quiz).await
        }
        Commands::Keywords { language } => {
            let provider = provider::from_settings(&settings, cli.offline)?;
            let language = language.unwrap_or_else(|| settings.default_language.clone());
            let keywords = provider
                .list_keywords(&language)
                .await
                .with_context(|| format!("Failed to list {} keywords", language))?;
            println!("{}", render::render_keywords(&language, &keywords));
            Ok(())
        }
        Commands::Explain { language, keyword } => {
            let provider = provider::from_settings(&settings, cli.offline)?;
            let detail = provider
                .explain_keyword(&language, &keyword)
                .await
                .with_context(|| format!("Failed to explain {:?}", keyword))?;
            println!("{}", render::render_keyword_detail(&detail));
            Ok(())
        }
        Commands::Visualize(args) => {
            let provider = provider::from_settings(&settings, cli.offline)?;
            visualize(provider, &settings, args).await
        }
    }
}

fn show_config(settings: &AppSettings, path: Option<&PathBuf>, write: bool) -> Result<()> {
    if write {
        let saved = match path {
            Some(path) => {
                settings.save_to(path)?;
                path.clone()
            }
            None => settings.save()?,
        };
        info!("Settings written to {}", saved.display());
    }
    match path.cloned().or_else(AppSettings::config_path) {
        Some(path) => println!("# {}", path.display()),
        None => println!("# no configuration directory"),
    }
    println!("{}", serde_json::to_string_pretty(settings)?);
    Ok(())
}

async fn notes(provider: &dyn StudyProvider, topic: &str, quiz: bool) -> Result<()> {
    let notes = provider
        .generate_notes(topic)
        .await
        .with_context(|| format!("Failed to generate notes for {:?}", topic))?;
    println!("{}", render::render_notes(topic, &notes));

    if !quiz {
        return Ok(());
    }
    if notes.quiz.is_empty() {
        warn!("No quiz questions for {:?}", topic);
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session = QuizSession::new();
    loop {
        println!("\nQuiz (answer with the option number, empty line skips)");
        for (idx, question) in notes.quiz.iter().enumerate() {
            println!("\n{}", render::render_question(idx, question));
            let Some(line) = lines.next_line().await? else {
                break;
            };
            match line.trim().parse::<usize>() {
                Ok(choice) if (1..=question.options.len()).contains(&choice) => {
                    session.select(idx, choice - 1)
                }
                _ if line.trim().is_empty() => {}
                _ => println!("Not an option, skipped"),
            }
        }
        session.submit();
        println!("\n{}", render::render_quiz_result(&notes.quiz, &session));

        println!("\nRetake the quiz? [y/N]");
        match lines.next_line().await? {
            Some(answer) if answer.trim().eq_ignore_ascii_case("y") => session.reset(),
            _ => return Ok(()),
        }
    }
}

async fn visualize(
    provider: Box<dyn StudyProvider>,
    settings: &AppSettings,
    args: VisualizeArgs,
) -> Result<()> {
    let speed = args.speed.unwrap_or(settings.playback_speed_ms);
    let mut session = VisualizerSession::new(provider, speed);

    let analysis = match (&args.replay, &args.file) {
        (Some(path), _) => session.replay(input::load_analysis(path)?).analysis.clone(),
        (None, Some(file)) => {
            let source =
                input::load_code(file, args.language.as_deref(), &settings.default_language)?;
            let input = args.input.as_deref().unwrap_or("");
            session
                .analyze(&source.code, &source.language, input)
                .await
                .context("Analysis failed")?
                .analysis
                .clone()
        }
        (None, None) => anyhow::bail!("Nothing to visualize, pass a file or --replay"),
    };

    if let Some(loaded) = session.current() {
        info!("Analysis ready at {}", loaded.received_at.format("%H:%M:%S"));
    }
    if let Some(path) = &args.save {
        input::save_analysis(path, &analysis)?;
    }
    if let Some(path) = &args.export_csv {
        export::export_state_table(path, &analysis.state_table)?;
        info!("State table exported to {}", path.display());
    }

    if args.autoplay {
        autoplay(&mut session, &analysis).await
    } else {
        interactive(&mut session, &analysis, args.tab).await
    }
}

/// Play once from the first step, printing every frame
async fn autoplay(session: &mut VisualizerSession, analysis: &CompilerAnalysis) -> Result<()> {
    let data = &analysis.animation_data;
    println!("{}", render::render_animation(data, &session.playback().snapshot()));
    if !session.playback_mut().play() {
        return Ok(());
    }

    let mut updates = session.playback().subscribe();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                println!("{}", render::render_animation(data, &snapshot));
                if !snapshot.state.is_playing {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                session.playback_mut().pause();
                break;
            }
        }
    }
    if let Some(event) = session.playback().current_event() {
        info!("Playback stopped on node {}", event.node_id);
    }
    println!("\n{}", render::render_tab(analysis, Tab::Output, &session.playback().snapshot()));
    Ok(())
}

async fn interactive(
    session: &mut VisualizerSession,
    analysis: &CompilerAnalysis,
    mut tab: Tab,
) -> Result<()> {
    let mut updates = session.playback().subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("{}\n", help_text());
    println!("{}", render::render_tab(analysis, tab, &session.playback().snapshot()));

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = updates.borrow_and_update().clone();
                if tab == Tab::Animation {
                    println!("{}", render::render_animation(&analysis.animation_data, &snapshot));
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(Command::Help) => println!("{}", help_text()),
                    Ok(Command::ShowTab(next)) => {
                        tab = next;
                        println!("{}", render::render_tab(analysis, tab, &session.playback().snapshot()));
                    }
                    Ok(command) => {
                        // transport commands always bring the animation into view
                        tab = Tab::Animation;
                        apply_command(session.playback_mut(), &command);
                    }
                    Err(msg) => eprintln!("{}", msg),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    session.playback_mut().pause();
    Ok(())
}
