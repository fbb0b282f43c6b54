use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::config::Settings;
use crate::keys::{Debouncer, RawKey};
use crate::remote::{SyncClient, SyncSettings};
use crate::ui::{self, MiniView};

const FRAME: Duration = Duration::from_millis(50);

pub fn run(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let client = SyncClient::start(SyncSettings::from(&settings.remote))?;
    let mut debouncer = Debouncer::new(Duration::from_millis(settings.keys.debounce_ms));
    let mut message: Option<String> = None;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        loop {
            let now_playing = client.now_playing();
            let view = MiniView {
                endpoint: &settings.remote.endpoint,
                connection: client.connection(),
                now_playing: now_playing.as_ref(),
                progress: client.progress(),
                message: message.as_deref(),
            };
            terminal.draw(|f| ui::draw_mini(f, &view))?;

            if !event::poll(FRAME)? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => break,
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => break,
                KeyCode::Char(c) => {
                    if let Some(key) = debouncer.handle(RawKey::Char(c)) {
                        message = client.send_command(key).err().map(|e| e.to_string());
                    }
                }
                _ => {}
            }
        }
        Ok(())
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    let stats = debouncer.stats();
    info!("mini player: {} of {} key presses sent", stats.accepted, stats.pressed);
    run_result
}
