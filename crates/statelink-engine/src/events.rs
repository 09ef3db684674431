//! Transition events and notifiers for observability.
//!
//! Every state assignment made by the engine, whether requested by a caller or
//! driven by a link, produces one [`Transition`]. The graph hands it to its
//! notifier; implementations decide what to do with it (print, record,
//! forward, ignore).

use std::fmt;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};
use statelink_config::EntityKind;
use tokio::sync::mpsc;

use crate::state::State;

/// A single state assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
  pub entity: String,
  pub kind: EntityKind,
  pub from: State,
  pub to: State,
  /// Link hops from the entity the cascade started at.
  pub depth: usize,
}

impl fmt::Display for Transition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} '{}' changing state: {} -> {}",
      self.kind.label(),
      self.entity,
      self.from,
      self.to
    )
  }
}

/// Trait for receiving transitions.
///
/// `notify` is called synchronously from inside a cascade and must not block.
pub trait TransitionNotifier: Send + Sync {
  fn notify(&self, transition: Transition);
}

/// A notifier that discards all transitions.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl TransitionNotifier for NoopNotifier {
  fn notify(&self, _transition: Transition) {}
}

/// A notifier that forwards transitions to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  sender: mpsc::UnboundedSender<Transition>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<Transition>) -> Self {
    Self { sender }
  }
}

impl TransitionNotifier for ChannelNotifier {
  fn notify(&self, transition: Transition) {
    // Receiver may have been dropped
    let _ = self.sender.send(transition);
  }
}

/// A notifier that keeps every transition in memory.
///
/// Clones share the same log, so one handle can be given to the graph and
/// another kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
  log: Arc<Mutex<Vec<Transition>>>,
}

impl RecordingNotifier {
  pub fn new() -> Self {
    Self::default()
  }

  /// Copy of all transitions recorded so far, oldest first.
  pub fn transitions(&self) -> Vec<Transition> {
    self.lock().clone()
  }

  pub fn len(&self) -> usize {
    self.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.lock().is_empty()
  }

  pub fn clear(&self) {
    self.lock().clear();
  }

  fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Transition>> {
    self.log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
  }
}

impl TransitionNotifier for RecordingNotifier {
  fn notify(&self, transition: Transition) {
    self.lock().push(transition);
  }
}

/// Adapts a closure into a notifier.
pub struct FnNotifier<F> {
  callback: F,
}

impl<F> FnNotifier<F>
where
  F: Fn(Transition) + Send + Sync,
{
  pub fn new(callback: F) -> Self {
    Self { callback }
  }
}

impl<F> TransitionNotifier for FnNotifier<F>
where
  F: Fn(Transition) + Send + Sync,
{
  fn notify(&self, transition: Transition) {
    (self.callback)(transition)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicUsize, Ordering};

  fn sample() -> Transition {
    Transition {
      entity: "Sign Up".to_string(),
      kind: EntityKind::Task,
      from: State::pending(),
      to: State::completed(),
      depth: 0,
    }
  }

  #[test]
  fn test_transition_display() {
    assert_eq!(
      sample().to_string(),
      "Task 'Sign Up' changing state: Pending -> Completed"
    );
  }

  #[test]
  fn test_workflow_transition_display() {
    let transition = Transition {
      entity: "Onboarding".to_string(),
      kind: EntityKind::Workflow,
      from: State::pending(),
      to: State::completed(),
      depth: 2,
    };
    assert_eq!(
      transition.to_string(),
      "Workflow 'Onboarding' changing state: Pending -> Completed"
    );
  }

  #[test]
  fn test_recording_notifier_shares_log() {
    let recorder = RecordingNotifier::new();
    let handle = recorder.clone();

    recorder.notify(sample());
    assert_eq!(handle.len(), 1);
    assert_eq!(handle.transitions()[0], sample());

    handle.clear();
    assert!(recorder.is_empty());
  }

  #[test]
  fn test_channel_notifier_forwards() {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let notifier = ChannelNotifier::new(tx);

    notifier.notify(sample());
    assert_eq!(rx.try_recv().unwrap(), sample());
  }

  #[test]
  fn test_channel_notifier_ignores_closed_receiver() {
    let (tx, rx) = mpsc::unbounded_channel();
    drop(rx);
    ChannelNotifier::new(tx).notify(sample());
  }

  #[test]
  fn test_fn_notifier_invokes_callback() {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = count.clone();
    let notifier = FnNotifier::new(move |_t: Transition| {
      seen.fetch_add(1, Ordering::SeqCst);
    });

    notifier.notify(sample());
    notifier.notify(sample());
    assert_eq!(count.load(Ordering::SeqCst), 2);
  }

  #[test]
  fn test_transition_serializes_labels() {
    let value = serde_json::to_value(sample()).unwrap();
    assert_eq!(value["entity"], "Sign Up");
    assert_eq!(value["kind"], "task");
    assert_eq!(value["from"], "Pending");
    assert_eq!(value["to"], "Completed");
  }
}
