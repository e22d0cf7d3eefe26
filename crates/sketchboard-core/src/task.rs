//! Background tasks polled from the UI loop.
//!
//! Natively each task gets a worker thread running a current-thread tokio
//! runtime (required by reqwest) and reports back over a channel. On WASM the
//! future is spawned on the browser event loop and writes into a shared slot.
//! Either way the UI thread calls [`PendingTask::try_take`] once per frame.

use std::future::Future;
use thiserror::Error;

/// Errors starting a background task.
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("failed to start async runtime: {0}")]
    Runtime(std::io::Error),
    #[error("failed to spawn worker thread: {0}")]
    Thread(std::io::Error),
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use super::*;
    use std::sync::mpsc::{Receiver, TryRecvError, channel};
    use std::thread;

    /// Result of an async operation that completes later.
    pub struct PendingTask<T> {
        label: &'static str,
        rx: Receiver<T>,
        finished: bool,
        abandoned: bool,
    }

    impl<T: Send + 'static> PendingTask<T> {
        /// Run the future produced by `make` on a worker thread.
        pub fn spawn<F, Fut>(label: &'static str, make: F) -> Result<Self, TaskError>
        where
            F: FnOnce() -> Fut + Send + 'static,
            Fut: Future<Output = T> + 'static,
        {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(TaskError::Runtime)?;
            let (tx, rx) = channel();

            thread::Builder::new()
                .name(format!("sketchboard-{label}"))
                .spawn(move || {
                    let output = runtime.block_on(make());
                    if tx.send(output).is_err() {
                        log::debug!("Task '{label}' finished after its receiver was dropped");
                    }
                })
                .map_err(TaskError::Thread)?;

            log::debug!("Task '{label}' started");
            Ok(Self {
                label,
                rx,
                finished: false,
                abandoned: false,
            })
        }
    }

    impl<T> PendingTask<T> {
        /// Take the output if the task has finished. Returns `Some` at most once.
        pub fn try_take(&mut self) -> Option<T> {
            if self.finished || self.abandoned {
                return None;
            }
            match self.rx.try_recv() {
                Ok(output) => {
                    self.finished = true;
                    Some(output)
                }
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => {
                    log::error!("Task '{}' ended without a result", self.label);
                    self.abandoned = true;
                    None
                }
            }
        }

        /// Whether the task stopped without producing output (worker panicked).
        pub fn is_abandoned(&self) -> bool {
            self.abandoned
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod wasm {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Result of an async operation that completes later.
    pub struct PendingTask<T> {
        slot: Rc<RefCell<Option<T>>>,
        finished: bool,
    }

    impl<T: 'static> PendingTask<T> {
        /// Spawn the future produced by `make` on the browser event loop.
        pub fn spawn<F, Fut>(label: &'static str, make: F) -> Result<Self, TaskError>
        where
            F: FnOnce() -> Fut + 'static,
            Fut: Future<Output = T> + 'static,
        {
            let slot = Rc::new(RefCell::new(None));
            let writer = Rc::clone(&slot);
            wasm_bindgen_futures::spawn_local(async move {
                let output = make().await;
                *writer.borrow_mut() = Some(output);
            });
            log::debug!("Task '{label}' started");
            Ok(Self { slot, finished: false })
        }
    }

    impl<T> PendingTask<T> {
        /// Take the output if the task has finished. Returns `Some` at most once.
        pub fn try_take(&mut self) -> Option<T> {
            if self.finished {
                return None;
            }
            let output = self.slot.borrow_mut().take();
            self.finished = output.is_some();
            output
        }

        /// Futures on the browser event loop cannot be abandoned.
        pub fn is_abandoned(&self) -> bool {
            false
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::PendingTask;

#[cfg(target_arch = "wasm32")]
pub use wasm::PendingTask;

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for<T>(task: &mut PendingTask<T>) -> Option<T> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            if let Some(output) = task.try_take() {
                return Some(output);
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn test_task_delivers_output_once() {
        let mut task = PendingTask::spawn("test", || async { 21 * 2 }).unwrap();
        assert_eq!(wait_for(&mut task), Some(42));
        assert_eq!(task.try_take(), None);
        assert!(!task.is_abandoned());
    }

    #[test]
    fn test_panicking_task_is_abandoned() {
        let mut task: PendingTask<u32> = PendingTask::spawn("panics", || async {
            if true {
                panic!("boom");
            }
            0
        })
        .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while !task.is_abandoned() && Instant::now() < deadline {
            assert_eq!(task.try_take(), None);
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(task.is_abandoned());
    }
}
