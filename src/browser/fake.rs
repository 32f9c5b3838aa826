//! Recording session manager used by tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use super::{Session, SessionError, SessionManager};

#[derive(Clone, Debug)]
enum Behavior {
    Return(Value),
    FailStart,
    FailNavigation,
    FailScript,
}

#[derive(Default)]
struct Recorder {
    acquired: AtomicUsize,
    released: AtomicUsize,
    navigations: Mutex<Vec<String>>,
    script_calls: Mutex<Vec<Vec<Value>>>,
}

/// Hands out scripted sessions and counts acquisitions and releases.
#[derive(Clone)]
pub(crate) struct FakeSessionManager {
    behavior: Behavior,
    recorder: Arc<Recorder>,
}

impl FakeSessionManager {
    fn with(behavior: Behavior) -> Self {
        Self {
            behavior,
            recorder: Arc::new(Recorder::default()),
        }
    }

    /// Sessions whose in-page script yields `value`.
    pub(crate) fn returning(value: Value) -> Self {
        Self::with(Behavior::Return(value))
    }

    pub(crate) fn failing_start() -> Self {
        Self::with(Behavior::FailStart)
    }

    pub(crate) fn failing_navigation() -> Self {
        Self::with(Behavior::FailNavigation)
    }

    pub(crate) fn failing_script() -> Self {
        Self::with(Behavior::FailScript)
    }

    pub(crate) fn acquisitions(&self) -> usize {
        self.recorder.acquired.load(Ordering::SeqCst)
    }

    pub(crate) fn releases(&self) -> usize {
        self.recorder.released.load(Ordering::SeqCst)
    }

    pub(crate) fn navigations(&self) -> Vec<String> {
        self.recorder.navigations.lock().unwrap().clone()
    }

    pub(crate) fn script_calls(&self) -> Vec<Vec<Value>> {
        self.recorder.script_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionManager for FakeSessionManager {
    async fn acquire(&self) -> Result<Box<dyn Session>, SessionError> {
        if let Behavior::FailStart = self.behavior {
            return Err(SessionError::Start("no browser in tests".to_string()));
        }
        self.recorder.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            behavior: self.behavior.clone(),
            recorder: self.recorder.clone(),
        }))
    }
}

struct FakeSession {
    behavior: Behavior,
    recorder: Arc<Recorder>,
}

#[async_trait]
impl Session for FakeSession {
    async fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        self.recorder
            .navigations
            .lock()
            .unwrap()
            .push(url.to_string());
        if let Behavior::FailNavigation = self.behavior {
            return Err(SessionError::Navigation {
                url: url.to_string(),
                message: "net::ERR_NAME_NOT_RESOLVED".to_string(),
            });
        }
        Ok(())
    }

    async fn run_in_page(&mut self, _script: &str, args: &[Value]) -> Result<Value, SessionError> {
        self.recorder
            .script_calls
            .lock()
            .unwrap()
            .push(args.to_vec());
        match &self.behavior {
            Behavior::Return(value) => Ok(value.clone()),
            Behavior::FailScript => Err(SessionError::Script(
                "Execution context was destroyed".to_string(),
            )),
            Behavior::FailStart | Behavior::FailNavigation => Ok(Value::Null),
        }
    }

    async fn release(self: Box<Self>) {
        self.recorder.released.fetch_add(1, Ordering::SeqCst);
    }
}
