use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::timer::{TickId, Ticker, TICK_MILLIS};
use crate::tui::Event;

/// Repeating countdown task feeding `Event::Tick` into the UI event channel.
pub struct Countdown {
  event_tx: UnboundedSender<Event>,
  period: Duration,
  next_id: u64,
  cancellation_token: CancellationToken,
  task: Option<JoinHandle<()>>,
}

impl Countdown {
  pub fn new(event_tx: UnboundedSender<Event>) -> Self {
    Self::with_period(event_tx, Duration::from_millis(TICK_MILLIS))
  }

  pub fn with_period(event_tx: UnboundedSender<Event>, period: Duration) -> Self {
    Self {
      event_tx,
      period,
      next_id: 0,
      cancellation_token: CancellationToken::new(),
      task: None,
    }
  }
}

impl Ticker for Countdown {
  fn schedule(&mut self) -> TickId {
    self.cancel();
    self.next_id += 1;
    let id = TickId(self.next_id);

    self.cancellation_token = CancellationToken::new();
    let cancellation_token = self.cancellation_token.clone();
    let event_tx = self.event_tx.clone();
    let period = self.period;
    self.task = Some(tokio::spawn(async move {
      // First tick fires one full period after scheduling.
      let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
      loop {
        tokio::select! {
          _ = cancellation_token.cancelled() => {
            break;
          }
          _ = interval.tick() => {
            if let Err(e) = event_tx.send(Event::Tick(id)) {
              log::error!("Failed to send countdown tick: {}", e);
              break;
            }
          }
        }
      }
    }));
    id
  }

  fn cancel(&mut self) {
    self.cancellation_token.cancel();
    if let Some(task) = self.task.take() {
      task.abort();
    }
  }
}

impl Drop for Countdown {
  fn drop(&mut self) {
    self.cancel();
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[tokio::test(start_paused = true)]
  async fn test_ticks_once_per_period() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut countdown = Countdown::new(tx);
    let id = countdown.schedule();

    tokio::time::sleep(Duration::from_millis(999)).await;
    assert!(rx.try_recv().is_err());

    for _ in 0..3 {
      match rx.recv().await {
        Some(Event::Tick(got)) => assert_eq!(got, id),
        other => panic!("unexpected event {:?}", other),
      }
    }
  }

  #[tokio::test(start_paused = true)]
  async fn test_custom_period() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut countdown = Countdown::with_period(tx, Duration::from_millis(50));
    let id = countdown.schedule();

    tokio::time::sleep(Duration::from_millis(175)).await;
    let mut seen = Vec::new();
    while let Ok(Event::Tick(got)) = rx.try_recv() {
      seen.push(got);
    }
    assert_eq!(seen, vec![id, id, id]);
  }

  #[tokio::test(start_paused = true)]
  async fn test_cancel_stops_ticks() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut countdown = Countdown::new(tx);
    countdown.schedule();
    assert!(matches!(rx.recv().await, Some(Event::Tick(_))));

    countdown.cancel();
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(rx.try_recv().is_err());
  }

  #[tokio::test(start_paused = true)]
  async fn test_reschedule_replaces_previous() {
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let mut countdown = Countdown::new(tx);
    let first = countdown.schedule();
    let second = countdown.schedule();
    assert_ne!(first, second);

    tokio::time::sleep(Duration::from_millis(3500)).await;
    let mut seen = Vec::new();
    while let Ok(Event::Tick(id)) = rx.try_recv() {
      seen.push(id);
    }
    assert_eq!(seen, vec![second, second, second]);
  }
}
