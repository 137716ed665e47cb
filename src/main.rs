mod audio;
mod audio_api;
mod config;
mod debounce;
mod dispatch;
mod events;
mod instrument;
mod loader;
mod middle;
mod note;
mod piano;
mod pipeline;
mod player;
mod shared;
mod timers;
mod tui;
mod window;

#[cfg(test)]
mod testutil;

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::event::{
    DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
    KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use dispatch::KeyboardArea;
use instrument::SampleInstrument;
use middle::Middle;
use piano::Piano;
use shared::InputEvent;

const LOG_FILE: &str = "pianotty.log";
const FALLBACK_SAMPLE_RATE: u32 = 44100;

#[derive(Parser)]
#[clap(author, version, about = "A terminal piano with sampled sound and a built-in demo song.")]
struct Cli {
    /// Project directory holding .pianotty/config.json (defaults to the current directory).
    project_dir: Option<PathBuf>,

    /// Directory of anchor WAV files, overriding the config file.
    #[arg(short, long)]
    samples: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

// The terminal belongs to the UI, so logs go to a file in the project dir.
fn init_logging(project_dir: &Path, level: &str) -> anyhow::Result<()> {
    let dir = project_dir.join(config::PIANOTTY_DIR);
    std::fs::create_dir_all(&dir)?;
    let file = std::fs::File::create(dir.join(LOG_FILE))?;
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))?;
    Ok(())
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let project_dir = match cli.project_dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    let mut config = config::load_config(&project_dir)?;
    if let Some(samples) = cli.samples {
        config.samples_dir = samples;
    }
    init_logging(&project_dir, &cli.log_level)?;
    info!(project = ?project_dir, "Starting pianotty");

    // no output device still gives a working (silent, unloadable) piano
    let audio = match audio::start_audio(&config.audio) {
        Ok(handle) => Some(handle),
        Err(err) => {
            error!(err = %err, "Audio output unavailable");
            None
        }
    };
    let instrument = SampleInstrument::new(
        audio.as_ref().map(|a| a.sender()),
        config.samples_path(&project_dir),
        audio.as_ref().map_or(FALLBACK_SAMPLE_RATE, |a| a.sample_rate()),
    );
    let piano = Piano::new(Box::new(instrument), &config);
    let mut middle = Middle::new(piano, &config, pipeline::scores::fur_elise()?);
    let events = middle.subscribe();

    terminal::enable_raw_mode()?;
    // real press/release detection where the terminal supports it
    let release_reporting = terminal::supports_keyboard_enhancement().unwrap_or(false);
    let _guard = RawModeGuard { release_reporting }; // auto drops when out of scope
    let mut stdout = std::io::stdout();
    if release_reporting {
        crossterm::execute!(
            stdout,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    crossterm::execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableFocusChange)?;
    info!(release_reporting, "Terminal ready");

    let backend = CrosstermBackend::new(stdout);
    let mut term = Terminal::new(backend)?;
    term.clear()?;

    let frame_time = Duration::from_millis(config.input.frame_ms.max(1)); // ~60fps
    let epoch = Instant::now();
    let now_ms = || epoch.elapsed().as_millis() as u64;
    let mut tui_state = tui::mode::TuiState::new(
        release_reporting,
        Duration::from_millis(config.input.tap_release_ms),
    );

    loop {
        let now = now_ms();
        middle.fire_timers(now);
        middle.tick(now);
        for event in events.try_iter() {
            debug!(?event, "Piano event");
        }

        let ds = middle.display_state();
        let mut keyboard = KeyboardArea::default();
        term.draw(|frame| {
            keyboard = tui::view::render(frame, frame.area(), &ds);
        })?;
        middle.set_keyboard_area(keyboard);

        // wake for the next note-off even if it falls mid-frame
        let timeout = match middle.next_deadline() {
            Some(due) => frame_time.min(Duration::from_millis(due.saturating_sub(now_ms()))),
            None => frame_time,
        };
        let inputs = tui::input::poll_input(timeout, &mut tui_state)?;
        let now = now_ms();
        for input in inputs {
            if input == InputEvent::Quit {
                info!("Quit requested");
                return Ok(());
            }
            middle.handle_input(input, now);
        }
    }
}

struct RawModeGuard {
    release_reporting: bool,
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let mut stdout = std::io::stdout();
        if self.release_reporting {
            let _ = crossterm::execute!(stdout, PopKeyboardEnhancementFlags);
        }
        let _ = crossterm::execute!(
            stdout,
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}
