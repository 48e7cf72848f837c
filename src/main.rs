mod args;
mod middle;
mod session;
mod shared;
mod tui;

use std::fs::File;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::terminal;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use simplelog::{Config, LevelFilter, WriteLogger};

use args::{Cli, Command, TuneArgs};
use middle::Middle;
use seqtone::{AudioManager, CpalDevice, OfflineDevice, OutputDevice};
use session::Session;
use shared::InputEvent;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let project_dir = match &cli.project {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("no current directory")?,
    };
    init_logging(&project_dir, cli.verbose);

    let session = session::load_session(&project_dir).unwrap_or_default();

    match cli.command.unwrap_or(Command::Jukebox) {
        Command::Jukebox => run_jukebox(&cli.data, &project_dir, session),
        Command::List => list(&cli.data),
        Command::Sequence { name, root, tune, sfx } => {
            let mut manager = build_manager(CpalDevice::new(), &cli.data, &session);
            manager.on_user_gesture();
            let options = tune.options();
            let played = if sfx {
                manager.play_sfx_with(&name, &root, options)?
            } else {
                manager.play_sequence_with(&name, &root, options)?
            };
            wait_and_close(manager, played, &name)
        }
        Command::Song { name, tune, sfx } => {
            let mut manager = build_manager(CpalDevice::new(), &cli.data, &session);
            manager.on_user_gesture();
            let options = tune.options();
            let played = if sfx {
                // sfx songs don't use a root; the steps carry their own
                manager.play_sfx_with(&name, "C4", options)?
            } else {
                manager.play_song_with(&name, options)?
            };
            wait_and_close(manager, played, &name)
        }
        Command::Render { out, song, sequence, root, tune, sample_rate } => {
            render(&cli.data, &session, &out, song, sequence.zip(root), &tune, sample_rate)
        }
    }
}

// The terminal belongs to the tui, so logs go to <project>/.seqtone/seqtone.log
fn init_logging(project_dir: &Path, verbose: bool) {
    let log_level = if verbose { LevelFilter::Debug } else { LevelFilter::Warn };
    let dir = project_dir.join(session::SEQTONE_DIR);
    let log_file = std::fs::create_dir_all(&dir).and_then(|_| File::create(dir.join(session::LOG_FILE)));
    match log_file {
        Ok(file) => {
            if WriteLogger::init(log_level, Config::default(), file).is_ok() {
                log::info!("seqtone starting (log level: {:?})", log_level);
            }
        }
        Err(e) => eprintln!("logging disabled: {e}"),
    }
}

fn build_manager<D: OutputDevice>(device: D, data: &Path, session: &Session) -> AudioManager<D> {
    let mut manager = AudioManager::new(device, data, session.audio.clone());
    manager.set_mode(session.mode);
    manager
}

fn list(data: &Path) -> anyhow::Result<()> {
    let data = seqtone::MusicData::read(data)?;
    println!("songs:");
    for name in data.sorted_song_names() {
        let sfx = if data.songs[name].is_sfx() { " (sfx)" } else { "" };
        println!("  {name}{sfx}");
    }
    println!("sequences:");
    for name in data.sorted_sequence_names() {
        println!("  {name}");
    }
    Ok(())
}

fn wait_and_close(mut manager: AudioManager<CpalDevice>, played: Option<f64>, name: &str) -> anyhow::Result<()> {
    let Some(duration) = played else {
        manager.shutdown();
        anyhow::bail!("{name} was not played (mode {}, see log for details)", manager.mode());
    };
    let lead = manager.config().schedule_lead;
    println!("playing {name} ({duration:.2}s)");
    std::thread::sleep(Duration::from_secs_f64(duration + lead + 0.1));
    manager.shutdown();
    Ok(())
}

fn render(
    data: &Path,
    session: &Session,
    out: &Path,
    song: Option<String>,
    sequence: Option<(String, String)>,
    tune: &TuneArgs,
    sample_rate: u32,
) -> anyhow::Result<()> {
    let mut manager = AudioManager::new(OfflineDevice::new(), data, session.audio.clone());
    let options = tune.options();
    let (name, played) = match (song, sequence) {
        (Some(song), _) => {
            let played = manager.play_song_with(&song, options)?;
            (song, played)
        }
        (None, Some((sequence, root))) => {
            let played = manager.play_sequence_with(&sequence, &root, options)?;
            (sequence, played)
        }
        (None, None) => anyhow::bail!("render needs --song or --sequence with --root"),
    };
    if played.is_none() {
        anyhow::bail!("nothing rendered for {name} (see log for details)");
    }
    let frames = manager
        .device()
        .write_wav(out, sample_rate)
        .with_context(|| format!("writing {}", out.display()))?;
    println!("wrote {} ({:.2}s)", out.display(), frames as f64 / sample_rate as f64);
    Ok(())
}

fn run_jukebox(data: &Path, project_dir: &Path, session: Session) -> anyhow::Result<()> {
    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope

    let mut middle = Middle::new(build_manager(CpalDevice::new(), data, &session));
    if let Some(root) = &session.root {
        middle.set_root(root);
    }

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let tick_rate = Duration::from_millis(16); // ~60fps

    loop {
        let ds = middle.display_state();
        term.draw(|frame| {
            tui::view::render(frame, frame.area(), &ds);
        })?;

        let events = tui::input::poll_input(tick_rate)?;
        for event in events {
            if event == InputEvent::Quit {
                // save before quitting
                let saved = Session {
                    mode: middle.manager.mode(),
                    audio: middle.manager.config().clone(),
                    root: Some(middle.root_name()),
                };
                if let Err(e) = session::save_session(project_dir, &saved) {
                    log::warn!("could not save session: {e:#}");
                }
                middle.manager.shutdown();
                term.clear()?;
                return Ok(());
            }
            middle.handle_input(event);
        }
    }
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
