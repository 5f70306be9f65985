//! Warning broadcast channel.
//!
//! Validation failures and workflow notices are shown to whoever is watching the
//! desk. A [`WarningManager`] holds the registered [`WarningListener`]s and fans
//! every message out to them synchronously, in registration order.
//!
//! The manager is an ordinary value: construct one at startup and pass it by
//! reference to the components that report through it.

use std::sync::{Arc, Mutex};

/// Receives warning messages.
pub trait WarningListener {
    fn show_warning(&self, message: &str);
}

/// Handle returned by [`WarningManager::add_listener`], used to unregister.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct WarningManager {
    listeners: Vec<(ListenerId, Box<dyn WarningListener>)>,
    next_id: u64,
}

impl std::fmt::Debug for WarningManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WarningManager")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl WarningManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_listener(&mut self, listener: Box<dyn WarningListener>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Unregisters a listener. Returns `false` if it was not registered.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn show_warning_to_all(&self, message: &str) {
        tracing::debug!(listeners = self.listeners.len(), "{}", message);
        for (_, listener) in &self.listeners {
            listener.show_warning(message);
        }
    }
}

/// Listener that records every message into a shared buffer.
///
/// Clones share the same buffer, so one clone can be registered while another
/// is kept to read the messages back.
#[derive(Clone, Debug, Default)]
pub struct CollectingListener {
    messages: Arc<Mutex<Vec<String>>>,
}

impl CollectingListener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.lock().ok().and_then(|m| m.last().cloned())
    }
}

impl WarningListener for CollectingListener {
    fn show_warning(&self, message: &str) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push(message.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcasts_to_every_listener() {
        let mut manager = WarningManager::new();
        let first = CollectingListener::new();
        let second = CollectingListener::new();
        manager.add_listener(Box::new(first.clone()));
        manager.add_listener(Box::new(second.clone()));

        manager.show_warning_to_all("Invalid Input, Range of 0-200 BPM");

        assert_eq!(first.messages(), vec!["Invalid Input, Range of 0-200 BPM"]);
        assert_eq!(second.messages(), vec!["Invalid Input, Range of 0-200 BPM"]);
    }

    #[test]
    fn removed_listeners_stop_receiving() {
        let mut manager = WarningManager::new();
        let kept = CollectingListener::new();
        let removed = CollectingListener::new();
        manager.add_listener(Box::new(kept.clone()));
        let id = manager.add_listener(Box::new(removed.clone()));

        assert!(manager.remove_listener(id));
        assert!(!manager.remove_listener(id));
        manager.show_warning_to_all("Discharge Complete");

        assert_eq!(manager.listener_count(), 1);
        assert_eq!(kept.last().as_deref(), Some("Discharge Complete"));
        assert!(removed.messages().is_empty());
    }

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn logged_at(level: tracing::Level, message: &str) -> String {
        let buffer = LogBuffer::default();
        let sink = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(level)
            .with_ansi(false)
            .with_writer(move || sink.clone())
            .finish();

        let mut manager = WarningManager::new();
        manager.add_listener(Box::new(CollectingListener::new()));
        tracing::subscriber::with_default(subscriber, || manager.show_warning_to_all(message));

        let bytes = buffer.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn broadcasts_are_logged_at_debug_only() {
        assert!(logged_at(tracing::Level::INFO, "Patient Checked-In!").is_empty());

        let debug = logged_at(tracing::Level::DEBUG, "Patient Checked-In!");
        assert!(debug.contains("DEBUG"));
        assert!(debug.contains("Patient Checked-In!"));
    }

    #[test]
    fn broadcasting_with_no_listeners_is_fine() {
        let manager = WarningManager::new();
        manager.show_warning_to_all("nobody is listening");
        assert_eq!(manager.listener_count(), 0);
    }
}
