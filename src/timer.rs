//! Work/break countdown state machine.
//!
//! The controller never touches a clock itself: it asks a `Ticker` to schedule a
//! repeating one-second countdown and gets called back with `tick(id)`. Ticks whose
//! id is not the currently scheduled one are dropped, so a tick that was already in
//! flight when the countdown got cancelled can't change anything.

use strum::{Display, EnumIs};

use crate::notify::Notifier;

pub const DEFAULT_WORK_MINUTES: u32 = 25;
pub const DEFAULT_BREAK_MINUTES: u32 = 5;
pub const TICK_MILLIS: u64 = 1000;
const MILLIS_PER_MINUTE: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIs)]
pub enum Mode {
  Work,
  Break,
}

impl Mode {
  pub fn flipped(self) -> Self {
    match self {
      Mode::Work => Mode::Break,
      Mode::Break => Mode::Work,
    }
  }

  /// Notification (title, body) announcing that this interval just ended.
  pub fn ended_message(self) -> (&'static str, &'static str) {
    match self {
      Mode::Work => ("Work period ended!", "Break time."),
      Mode::Break => ("Break ended!", "Start working."),
    }
  }
}

/// Identifies one scheduled countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickId(pub u64);

/// A cancellable repeating one-second countdown.
pub trait Ticker {
  /// Starts a fresh countdown, cancelling any previous one first.
  fn schedule(&mut self) -> TickId;
  /// Stops the current countdown, if any. Its id is never handed out again.
  fn cancel(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
  pub work_minutes: u32,
  pub break_minutes: u32,
}

impl Default for TimerConfig {
  fn default() -> Self {
    Self { work_minutes: DEFAULT_WORK_MINUTES, break_minutes: DEFAULT_BREAK_MINUTES }
  }
}

impl TimerConfig {
  pub fn full_millis(&self, mode: Mode) -> u64 {
    let minutes = match mode {
      Mode::Work => self.work_minutes,
      Mode::Break => self.break_minutes,
    };
    minutes as u64 * MILLIS_PER_MINUTE
  }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumIs)]
pub enum TimerState {
  #[default]
  Idle,
  Running(TickId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
  /// Not the active countdown, or not running at all.
  Stale,
  Counted,
  /// The interval that just ended.
  Transitioned(Mode),
}

/// What the screen shows for the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerView {
  pub time_text: String,
  pub status_label: String,
  pub button_label: &'static str,
  pub inputs_enabled: bool,
}

pub struct TimerController<T: Ticker> {
  config: TimerConfig,
  mode: Mode,
  remaining_millis: u64,
  state: TimerState,
  ticker: T,
  notifier: Box<dyn Notifier>,
}

impl<T: Ticker> TimerController<T> {
  pub fn new(config: TimerConfig, ticker: T, notifier: Box<dyn Notifier>) -> Self {
    Self {
      config,
      mode: Mode::Work,
      remaining_millis: config.full_millis(Mode::Work),
      state: TimerState::Idle,
      ticker,
      notifier,
    }
  }

  pub fn config(&self) -> TimerConfig {
    self.config
  }

  pub fn mode(&self) -> Mode {
    self.mode
  }

  pub fn remaining_millis(&self) -> u64 {
    self.remaining_millis
  }

  pub fn is_running(&self) -> bool {
    self.state.is_running()
  }

  pub fn start(&mut self) {
    if self.state.is_running() { return };
    let id = self.ticker.schedule();
    self.state = TimerState::Running(id);
    info!("Started {} countdown at {}", self.mode, format_millis(self.remaining_millis));
  }

  pub fn pause(&mut self) {
    if self.state.is_idle() { return };
    self.ticker.cancel();
    self.state = TimerState::Idle;
    info!("Paused {} countdown at {}", self.mode, format_millis(self.remaining_millis));
  }

  pub fn toggle(&mut self) {
    if self.state.is_running() { self.pause() } else { self.start() };
  }

  pub fn reset(&mut self) {
    if self.state.is_running() {
      self.ticker.cancel();
    }
    self.state = TimerState::Idle;
    self.remaining_millis = self.config.full_millis(self.mode);
    info!("Reset {} countdown to {}", self.mode, format_millis(self.remaining_millis));
  }

  pub fn switch_mode(&mut self) {
    if self.state.is_running() { return };
    self.mode = self.mode.flipped();
    self.remaining_millis = self.config.full_millis(self.mode);
    info!("Switched to {} mode", self.mode);
  }

  pub fn set_work_minutes(&mut self, raw: &str) {
    if let Some(minutes) = parse_minutes(raw) {
      self.config.work_minutes = minutes;
      info!("Work minutes set to {}", minutes);
      self.refresh_idle(Mode::Work);
    } else {
      debug!("Ignoring work minutes input '{}'", raw);
    }
  }

  pub fn set_break_minutes(&mut self, raw: &str) {
    if let Some(minutes) = parse_minutes(raw) {
      self.config.break_minutes = minutes;
      info!("Break minutes set to {}", minutes);
      self.refresh_idle(Mode::Break);
    } else {
      debug!("Ignoring break minutes input '{}'", raw);
    }
  }

  fn refresh_idle(&mut self, edited: Mode) {
    if self.mode == edited && self.state.is_idle() {
      self.remaining_millis = self.config.full_millis(self.mode);
    }
  }

  pub fn tick(&mut self, id: TickId) -> TickOutcome {
    if self.state != TimerState::Running(id) {
      debug!("Dropping stale tick {:?}", id);
      return TickOutcome::Stale;
    }

    self.remaining_millis = self.remaining_millis.saturating_sub(TICK_MILLIS);
    if self.remaining_millis > 0 {
      return TickOutcome::Counted;
    }

    let ended = self.mode;
    self.mode = ended.flipped();
    self.remaining_millis = self.config.full_millis(self.mode);
    info!("{} period over, switching to {} ({})", ended, self.mode, format_millis(self.remaining_millis));

    let (title, body) = ended.ended_message();
    self.notifier.notify(title, body);

    self.ticker.cancel();
    let id = self.ticker.schedule();
    self.state = TimerState::Running(id);
    TickOutcome::Transitioned(ended)
  }

  pub fn view(&self) -> TimerView {
    TimerView {
      time_text: format_millis(self.remaining_millis),
      status_label: self.mode.to_string(),
      button_label: if self.state.is_running() { "Pause" } else { "Start" },
      inputs_enabled: self.state.is_idle(),
    }
  }
}

fn parse_minutes(raw: &str) -> Option<u32> {
  match raw.parse::<u32>() {
    Ok(minutes) if minutes > 0 => Some(minutes),
    _ => None,
  }
}

pub fn format_millis(millis: u64) -> String {
  let secs = millis / 1000;
  format!("{:02}:{:02}", secs / 60, secs % 60)
}
