/////////////////////
/// POMOTIMER - a work/break countdown for the terminal
///
/// Counts down a work period, then a break, then work again, until paused or reset.
/// A desktop notification goes out every time one period hands over to the next.
/// - 'space' starts / pauses
/// - 'r' resets the current period
/// - 's' switches between work and break (only while paused)
/// - 'tab' moves between the work and break minute fields, digits edit them
/// - 'q' quits
///
pub const APP_VERSION: &str = "POMOTIMER V0.1.0";
const LOG_FILE_NAME: &str = "pomotimer.log";

#[macro_use] extern crate log;
extern crate simplelog;
use simplelog::*;
use std::fs::File;
#[macro_use]
extern crate ini;

use color_eyre::eyre::Result;
use build_time::build_time_local;

mod app;
mod config;
mod countdown;
mod notify;
mod timer;
mod tui;

use crate::app::PomodoroApp;
use crate::countdown::Countdown;
use crate::notify::{DesktopNotifier, Notifier, SilentNotifier};
use crate::timer::TimerController;
use crate::tui::Tui;

/// File logging only. The TUI draws the terminal in raw mode, so log lines on
/// stdout or stderr would land in the middle of the screen.
fn init_logging() {
  let log_file = match File::create(LOG_FILE_NAME) {
    Ok(log_file) => log_file,
    Err(e) => {
      eprintln!("Warning: Could not create log file: {}", e);
      eprintln!("Continuing without logging.");
      return;
    }
  };

  WriteLogger::init(LevelFilter::Info, Config::default(), log_file).unwrap_or_else(|e| {
    eprintln!("Warning: Could not initialize logger: {}", e);
  });
}

#[tokio::main]
async fn main() -> Result<()> {
  init_logging();
  info!("Logging for {} initialized", APP_VERSION);

  let settings = config::load(config::CONF_FILE_NAME);
  let notifier: Box<dyn Notifier> = if settings.notifications {
    Box::new(DesktopNotifier::default())
  } else {
    info!("Notifications disabled by config");
    Box::new(SilentNotifier)
  };

  let mut tui = Tui::new()?;
  let countdown = Countdown::new(tui.sender());
  let mut app = PomodoroApp::new(TimerController::new(settings.timer, countdown, notifier));

  tui.enter()?;
  let result = app.run(&mut tui).await;
  tui.exit()?;
  result?;

  println!("Thanks for using {} (built: {})\n", APP_VERSION, build_time_local!("%Y-%b-%d at %H:%M:%S"));
  Ok(())
}
