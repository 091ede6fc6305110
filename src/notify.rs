use notify_rust::Notification;
use tokio::task::JoinHandle;

pub const APP_NAME: &str = "pomotimer";

type SendFn = fn(&str, &str) -> Result<(), Box<dyn std::error::Error>>;

/// Delivers interval transition notifications. Must never block the caller.
pub trait Notifier {
  fn notify(&self, title: &str, body: &str);
}

/// Desktop notification through the platform notification server.
#[derive(Clone)]
pub struct DesktopNotifier {
  send: SendFn,
}

impl Default for DesktopNotifier {
  fn default() -> Self {
    Self { send: send_notification }
  }
}

impl DesktopNotifier {
  /// Hands the notification to a blocking worker. `None` when there is no runtime to run it on.
  fn dispatch(&self, title: &str, body: &str) -> Option<JoinHandle<()>> {
    let handle = match tokio::runtime::Handle::try_current() {
      Ok(handle) => handle,
      Err(e) => {
        warn!("No runtime to deliver notification '{}': {}", title, e);
        return None;
      }
    };
    let send = self.send;
    let title = title.to_string();
    let body = body.to_string();
    Some(handle.spawn_blocking(move || {
      if let Err(e) = send(&title, &body) {
        warn!("Failed to send notification '{}': {}", title, e);
      }
    }))
  }
}

impl Notifier for DesktopNotifier {
  fn notify(&self, title: &str, body: &str) {
    // Never awaited.
    let _ = self.dispatch(title, body);
  }
}

fn send_notification(title: &str, body: &str) -> Result<(), Box<dyn std::error::Error>> {
  Notification::new()
    .summary(title)
    .body(body)
    .appname(APP_NAME)
    .show()?;
  Ok(())
}

/// Used when notifications are turned off in the config file.
#[derive(Debug, Default, Clone)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
  fn notify(&self, title: &str, _body: &str) {
    debug!("Notifications disabled, skipping '{}'", title);
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::time::Duration;

  use super::*;
  use crate::timer::tests::FakeTicker;
  use crate::timer::{Mode, TickId, TickOutcome, TimerConfig, TimerController};

  static FAILED_SENDS: AtomicUsize = AtomicUsize::new(0);

  fn failing_send(_title: &str, _body: &str) -> Result<(), Box<dyn std::error::Error>> {
    FAILED_SENDS.fetch_add(1, Ordering::SeqCst);
    Err("Failed to connect to address unix:path=/run/user/0/bus".into())
  }

  fn no_bus() -> DesktopNotifier {
    DesktopNotifier { send: failing_send }
  }

  #[test]
  fn test_dispatch_without_runtime_is_skipped() {
    assert!(DesktopNotifier::default().dispatch("Work period ended!", "Break time.").is_none());
  }

  #[tokio::test]
  async fn test_failed_send_is_swallowed() {
    let task = no_bus().dispatch("Break ended!", "Start working.").expect("runtime is available");
    assert!(task.await.is_ok());
  }

  #[tokio::test]
  async fn test_failed_send_leaves_timer_alone() {
    let before = FAILED_SENDS.load(Ordering::SeqCst);
    let mut ctl = TimerController::new(TimerConfig::default(), FakeTicker::default(), Box::new(no_bus()));
    ctl.set_work_minutes("1");
    ctl.start();
    for _ in 0..59 {
      assert_eq!(ctl.tick(TickId(1)), TickOutcome::Counted);
    }
    assert_eq!(ctl.tick(TickId(1)), TickOutcome::Transitioned(Mode::Work));

    tokio::time::timeout(Duration::from_secs(5), async {
      while FAILED_SENDS.load(Ordering::SeqCst) == before {
        tokio::time::sleep(Duration::from_millis(10)).await;
      }
    }).await.expect("notification was never attempted");

    assert_eq!(ctl.mode(), Mode::Break);
    assert!(ctl.is_running());
    assert_eq!(ctl.view().time_text, "05:00");
    assert_eq!(ctl.tick(TickId(2)), TickOutcome::Counted);
    assert_eq!(ctl.view().time_text, "04:59");
  }
}
