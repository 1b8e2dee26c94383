use anyhow::Context;
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::thread;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;

use grammar_watch::config::DEFAULT_CONFIG_PATH;
use grammar_watch::replay::ReplayFactory;
use grammar_watch::{
    DetectorConfig, EventKind, MatchThrottle, RecognitionSession, SelectionPolicy,
    SessionCommand, SessionEvent, run_session,
};

#[derive(Parser, Debug)]
#[command(
    name = "grammar-watch",
    about = "Watch a transcript stream on stdin for target phrases"
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Phrase to detect (repeatable, replaces the configured phrases)
    #[arg(long = "phrase")]
    phrases: Vec<String>,

    /// Recognition locale, e.g. fr-FR
    #[arg(long)]
    lang: Option<String>,

    /// Sentence selection policy: confidence-scan or windowed
    #[arg(long)]
    policy: Option<SelectionPolicy>,

    /// Minimum seconds between two delivered matches
    #[arg(long)]
    cooldown_secs: Option<u64>,

    /// Accept interim (~prefixed) lines
    #[arg(long)]
    interim: bool,

    /// Logging verbosity level
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,
}

impl Cli {
    fn apply(&self, config: &mut DetectorConfig) {
        if !self.phrases.is_empty() {
            config.phrases = self.phrases.clone();
        }
        if let Some(lang) = &self.lang {
            config.lang = lang.clone();
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        if let Some(cooldown) = self.cooldown_secs {
            config.cooldown_secs = cooldown;
        }
        if self.interim {
            config.interim_results = true;
        }
    }
}

fn main() -> anyhow::Result<()> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = DetectorConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    cli.apply(&mut config);
    let configuration = config.build().context("invalid detector configuration")?;
    let grammar = configuration.grammar().clone();
    info!(pattern = grammar.pattern(), "watching for phrases");

    let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<SessionCommand>();
    let (line_tx, line_rx) = flume::unbounded::<String>();

    let ctrlc_tx = cmd_tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send(SessionCommand::Shutdown);
    })?;

    // Bridge blocking stdin into the engine's line channel
    let eof_tx = cmd_tx.clone();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("stdin read error: {}", e);
                    break;
                }
            }
        }
        let _ = eof_tx.send(SessionCommand::Shutdown);
    });

    let mut session = RecognitionSession::new(configuration, ReplayFactory::new(line_rx));

    session.on(EventKind::Start, |_| info!("listening"));
    session.on(EventKind::End, |_| info!("recognition ended"));
    session.on(EventKind::Error, |event| {
        if let SessionEvent::Error(err) = event {
            warn!("recognition error: {}", err);
        }
    });

    let highlight = grammar.clone();
    session.on(EventKind::Sentence, move |event| {
        if let SessionEvent::Sentence(sentence) = event {
            if sentence.is_final && sentence.matched {
                println!(
                    "> {}",
                    highlight.highlight(&sentence.value, "\x1b[1;32m", "\x1b[0m")
                );
            }
        }
    });

    let throttle = Arc::new(Mutex::new(MatchThrottle::new(
        config.cooldown(),
        |value: &str, is_final: bool| {
            println!("MATCH{} {}", if is_final { "" } else { " (interim)" }, value);
        },
    )));
    let gate = throttle.clone();
    session.on(EventKind::Match, move |event| {
        if let SessionEvent::Match(sentence) = event {
            if let Ok(mut gate) = gate.lock() {
                gate.offer(sentence);
            }
        }
    });

    cmd_tx.send(SessionCommand::Start)?;
    let session = run_session(session, cmd_rx).await;

    let delivered = throttle.lock().map(|t| t.accepted()).unwrap_or(0);
    info!(delivered, state = %session.state(), "done");
    Ok(())
}
