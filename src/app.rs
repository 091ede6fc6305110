use color_eyre::eyre::{eyre, Result};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{prelude::*, widgets::*};
use strum::EnumIs;
use tui_big_text::BigText;

use crate::timer::{Mode, TickId, TickOutcome, Ticker, TimerController};
use crate::tui::{Event, Tui};
use crate::APP_VERSION;

const MAX_INPUT_LEN: usize = 4;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, EnumIs)]
enum AppState {
  #[default]
  Active,
  Quitting,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Field {
  #[default]
  Work,
  Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Message {
  StartOrPause,
  Reset,
  SwitchMode,
  NextField,
  Digit(char),
  Backspace,
  Tick(TickId),
  Redraw,
  Quit,
}

/// The terminal screen: owns the controller and the raw text of both duration inputs.
pub struct PomodoroApp<T: Ticker> {
  state: AppState,
  timer: TimerController<T>,
  focus: Field,
  work_input: String,
  break_input: String,
}

impl<T: Ticker> PomodoroApp<T> {
  pub fn new(timer: TimerController<T>) -> Self {
    let config = timer.config();
    Self {
      state: AppState::default(),
      timer,
      focus: Field::default(),
      work_input: config.work_minutes.to_string(),
      break_input: config.break_minutes.to_string(),
    }
  }

  pub async fn run(&mut self, tui: &mut Tui) -> Result<()> {
    while !self.state.is_quitting() {
      tui.draw(|f| self.ui(f).expect("Unexpected error during drawing"))?;
      let event = tui.next().await.ok_or(eyre!("Unable to get event"))?; // blocks until next event
      let message = self.handle_event(event);
      self.update(message);
    }
    Ok(())
  }

  // Event handler (keyboard, countdown)
  fn handle_event(&self, event: Event) -> Message {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick(id) => Message::Tick(id),
      Event::Render | Event::Error => Message::Redraw,
    }
  }

  fn handle_key(&self, key: KeyEvent) -> Message {
    match key.code {
      KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Message::Quit,
      KeyCode::Char(' ') | KeyCode::Enter => Message::StartOrPause,
      KeyCode::Char('r') | KeyCode::Char('R') => Message::Reset,
      KeyCode::Char('s') | KeyCode::Char('S') => Message::SwitchMode,
      KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => Message::NextField,
      KeyCode::Char(c) if c.is_ascii_digit() => Message::Digit(c),
      KeyCode::Backspace => Message::Backspace,
      _ => Message::Redraw,
    }
  }

  fn update(&mut self, message: Message) {
    match message {
      Message::StartOrPause => self.timer.toggle(),
      Message::Reset => self.timer.reset(),
      Message::SwitchMode => self.timer.switch_mode(),
      Message::NextField => self.next_field(),
      Message::Digit(c) => self.edit_input(|input| {
        if input.len() < MAX_INPUT_LEN { input.push(c) }
      }),
      Message::Backspace => self.edit_input(|input| { input.pop(); }),
      Message::Tick(id) => {
        if let TickOutcome::Transitioned(ended) = self.timer.tick(id) {
          debug!("Transition after {} period", ended);
        }
      }
      Message::Redraw => {}
      Message::Quit => self.quit(),
    }
  }

  fn next_field(&mut self) {
    self.focus = match self.focus {
      Field::Work => Field::Break,
      Field::Break => Field::Work,
    };
  }

  /// Applies an edit to the focused input and forwards its raw text to the controller.
  /// Inputs are locked while the countdown runs.
  fn edit_input(&mut self, edit: impl FnOnce(&mut String)) {
    if self.timer.is_running() { return };
    match self.focus {
      Field::Work => {
        edit(&mut self.work_input);
        self.timer.set_work_minutes(&self.work_input);
      }
      Field::Break => {
        edit(&mut self.break_input);
        self.timer.set_break_minutes(&self.break_input);
      }
    }
  }

  fn quit(&mut self) {
    self.timer.pause();
    self.state = AppState::Quitting;
  }

  fn ui(&self, f: &mut Frame) -> Result<()> {
    let layout = self.layout(f.size());
    f.render_widget(self.title_paragraph(), layout[0]);
    f.render_widget(self.status_paragraph()?, layout[1]);
    f.render_widget(self.timer_paragraph()?, layout[2]);
    f.render_widget(self.inputs_paragraph(), layout[3]);
    f.render_widget(self.help_paragraph(), layout[4]);
    Ok(())
  }

  fn layout(&self, area: Rect) -> Vec<Rect> {
    let layout = Layout::default()
      .direction(Direction::Vertical)
      .constraints(vec![
        Constraint::Length(3), // top bar
        Constraint::Length(9), // mode
        Constraint::Length(9), // timer
        Constraint::Length(2), // duration inputs
        Constraint::Length(2), // help
      ])
      .split(area);

    layout.to_vec()
  }

  fn mode_style(&self) -> Style {
    if !self.timer.is_running() {
      return Style::new().gray();
    }
    match self.timer.mode() {
      Mode::Work => Style::new().red(),
      Mode::Break => Style::new().green(),
    }
  }

  fn title_paragraph(&self) -> Paragraph<'_> {
    let title_text = Line::from(vec![APP_VERSION.into(), " - work".into(), " / ".dim(), "break".into(), " timer".dim()]);
    Paragraph::new(title_text).gray()
  }

  fn status_paragraph(&self) -> Result<BigText<'_>> {
    let lines = vec![self.timer.view().status_label.into()];
    tui_big_text::BigTextBuilder::default()
      .lines(lines)
      .style(Style::new().blue())
      .build()
      .map_err(|e| eyre!("Failed to build big text: {}", e))
  }

  fn timer_paragraph(&self) -> Result<BigText<'_>> {
    let lines = vec![self.timer.view().time_text.into()];
    tui_big_text::BigTextBuilder::default()
      .lines(lines)
      .style(self.mode_style())
      .build()
      .map_err(|e| eyre!("Failed to build big text: {}", e))
  }

  fn inputs_paragraph(&self) -> Paragraph<'_> {
    let view = self.timer.view();
    let field = |label: &'static str, value: &str, focused: bool| -> Vec<Span<'static>> {
      let mut value_style = Style::new();
      if !view.inputs_enabled {
        value_style = value_style.dim();
      } else if focused {
        value_style = value_style.reversed();
      }
      vec![label.into(), Span::styled(format!(" {:>4} ", value), value_style)]
    };
    let mut spans = field("Work minutes:", &self.work_input, self.focus == Field::Work);
    spans.push("   ".into());
    spans.extend(field("Break minutes:", &self.break_input, self.focus == Field::Break));
    Paragraph::new(Line::from(spans)).gray()
  }

  fn help_paragraph(&self) -> Paragraph<'_> {
    let view = self.timer.view();
    let space_action = view.button_label.to_lowercase();
    let help_text =
      Line::from(vec!["space ".into(), Span::from(space_action).dim(), " : r ".into(), "reset".dim(),
        " : s ".into(), "switch mode".dim(), " : tab ".into(), "next field".dim(),
        " : q ".into(), "quit".dim()]);
    Paragraph::new(help_text).gray()
  }
}
