// Copyright (c) 2025 The Stealth Core Developers
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/stealth-dev/stealth-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Lock-ordered node context: subsystems register with a [`Manager`] and
//! exchange calls through the [`Handle`] it hands back, instead of reaching
//! into each other's state directly. This keeps the main/mempool/registry
//! lock order an emergent property of which subsystem a call targets, rather
//! than something every caller has to remember.

use std::{pin::Pin, task};

use futures::future::BoxFuture;
use logging::log;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Defines hooks into a subsystem lifecycle.
#[async_trait::async_trait]
pub trait Subsystem: 'static + Send + Sized {
    /// Custom shutdown procedure.
    async fn shutdown(self) {}
}

/// Subsystem configuration
pub struct SubsystemConfig {
    /// Subsystem name
    pub subsystem_name: &'static str,
}

impl SubsystemConfig {
    /// New configuration with given name, all other options are defaults.
    pub(crate) fn named(subsystem_name: &'static str) -> Self {
        Self { subsystem_name }
    }
}

// Internal action type sent in the channel.
type Action<T, R> = Box<dyn Send + for<'a> FnOnce(&'a mut T) -> BoxFuture<'a, R>>;

/// Call request
pub struct CallRequest<T>(pub(crate) mpsc::UnboundedReceiver<Action<T, ()>>);

impl<T: 'static> CallRequest<T> {
    /// Receive an external call to this subsystem.
    pub async fn recv(&mut self) -> Action<T, ()> {
        match self.0.recv().await {
            // We have a call, return it
            Some(action) => action,
            // All handles to this subsystem dropped, suspend call handling.
            None => std::future::pending().await,
        }
    }
}

/// Call response that can be polled for result
pub struct CallResponse<T>(oneshot::Receiver<T>);

impl<T> std::future::Future for CallResponse<T> {
    type Output = Result<T, CallError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> task::Poll<Self::Output> {
        Pin::new(&mut self.0).poll(cx).map_err(|_| CallError::ResultFetchFailed)
    }
}

/// Shutdown request
pub struct ShutdownRequest(pub(crate) broadcast::Receiver<()>);

impl ShutdownRequest {
    /// Receive a shutdown request.
    pub async fn recv(&mut self) {
        match self.0.recv().await {
            Err(broadcast::error::RecvError::Lagged(_)) => {
                panic!("Multiple shutdown broadcast requests issued")
            }
            Err(broadcast::error::RecvError::Closed) => {
                panic!("Shutdown channel sender closed prematurely")
            }
            Ok(()) => (),
        }
    }
}

pub type ActionSender<T> = mpsc::UnboundedSender<Action<T, ()>>;

/// Subsystem handle.
///
/// This allows the user to interact with the subsystem from the outside. Currently, it only
/// supports calling functions on the subsystem.
///
/// There are two sets of methods for communication with and control of subsystem:
/// * Methods starting with `submit_` will submit the closure given as the argument for processing
///   by the subsystem. The result is not immediately ready and the current task is free to
///   continue its operation and `.await` the return value at a later point (or decide not to).
/// * Methods starting with `call_` will also submit the closure and suspend the current task until
///   the result is ready, returning it directly.
pub struct Handle<T> {
    // Send the subsystem stuff to do.
    action_tx: ActionSender<T>,
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        Self {
            action_tx: self.action_tx.clone(),
        }
    }
}

#[derive(Debug, Ord, PartialOrd, PartialEq, Eq, Clone, Copy, thiserror::Error)]
pub enum CallError {
    #[error("Call submission failed")]
    SubmissionFailed,
    #[error("Result retrieval failed")]
    ResultFetchFailed,
}

pub struct CallResult<T>(Result<CallResponse<T>, CallError>);

impl<T> CallResult<T> {
    /// Get the corresponding [`CallResponse`], with the opportunity to handle errors at send time.
    pub fn response(self) -> Result<CallResponse<T>, CallError> {
        self.0
    }
}

impl<T> std::future::Future for CallResult<T> {
    type Output = Result<T, CallError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut task::Context<'_>) -> task::Poll<Self::Output> {
        self.0.as_mut().map_or_else(
            |err| task::Poll::Ready(Err(*err)),
            |res| Pin::new(res).poll(cx),
        )
    }
}

impl<T: Send + 'static> Handle<T> {
    /// Crate a new subsystem handle.
    pub(crate) fn new(action_tx: ActionSender<T>) -> Self {
        Self { action_tx }
    }

    /// Call an async procedure to the subsystem. Result has to be await-ed explicitly
    pub fn call_async_mut<R: Send + 'static>(
        &self,
        func: impl for<'a> FnOnce(&'a mut T) -> BoxFuture<'a, R> + Send + 'static,
    ) -> CallResult<R> {
        let (rtx, rrx) = oneshot::channel::<R>();

        let res = self
            .action_tx
            .send(Box::new(move |subsys| {
                Box::pin(async move {
                    if rtx.send(func(subsys).await).is_err() {
                        log::trace!("Subsystem call result ignored");
                    }
                })
            }))
            .map(|()| CallResponse(rrx))
            .map_err(|_e| CallError::SubmissionFailed);

        CallResult(res)
    }

    /// Call an async procedure to the subsystem (immutable).
    pub fn call_async<R: Send + 'static>(
        &self,
        func: impl for<'a> FnOnce(&'a T) -> BoxFuture<'a, R> + Send + 'static,
    ) -> CallResult<R> {
        self.call_async_mut(|this| func(this))
    }

    /// Call a procedure to the subsystem.
    pub fn call_mut<R: Send + 'static>(
        &self,
        func: impl for<'a> FnOnce(&'a mut T) -> R + Send + 'static,
    ) -> CallResult<R> {
        self.call_async_mut(|this| Box::pin(core::future::ready(func(this))))
    }

    /// Call a procedure to the subsystem (immutable).
    pub fn call<R: Send + 'static>(
        &self,
        func: impl for<'a> FnOnce(&'a T) -> R + Send + 'static,
    ) -> CallResult<R> {
        self.call_mut(|this| func(this))
    }
}

/// A handle by which callers reach a running subsystem.
pub type Subsystem<T> = Handle<T>;

/// Owns every subsystem started under one name and the broadcast channel
/// used to tell them to shut down.
///
/// Subsystems come in two flavors. "Active" ones (started with
/// [`start`](Manager::start)) run their own event loop and are expected to
/// terminate on their own, typically once they see the node's shutdown
/// signal; the node's lifetime is the time it takes every active subsystem to
/// finish. "Passive" ones (started with
/// [`start_passive`](Manager::start_passive)) have no event loop of their
/// own -- they only answer calls -- so they run until the manager tells them
/// to stop, which happens once every active subsystem has finished.
pub struct Manager {
    name: &'static str,
    shutdown_tx: broadcast::Sender<()>,
    active: Vec<(&'static str, tokio::task::JoinHandle<()>)>,
    passive: Vec<(&'static str, tokio::task::JoinHandle<()>)>,
}

impl Manager {
    /// Creates a new, empty manager.
    pub fn new(name: &'static str) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self { name, shutdown_tx, active: Vec::new(), passive: Vec::new() }
    }

    /// Returns a sender that, when sent to, asks every subsystem's
    /// [`ShutdownRequest`] to resolve.
    pub fn shutdown_trigger(&self) -> broadcast::Sender<()> {
        self.shutdown_tx.clone()
    }

    /// Starts a subsystem that only answers calls, with no event loop of its
    /// own. It keeps running until every active subsystem has finished.
    pub fn start_passive<T: Send + 'static>(&mut self, name: &'static str, mut subsys: T) -> Handle<T> {
        let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action<T, ()>>();
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let manager_name = self.name;
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    action = action_rx.recv() => match action {
                        Some(action) => action(&mut subsys).await,
                        None => break,
                    },
                    _ = shutdown_rx.recv() => break,
                }
            }
            log::debug!("[{}] subsystem '{}' stopped", manager_name, name);
        });
        self.passive.push((name, task));
        Handle::new(action_tx)
    }

    /// Starts a subsystem driven by its own event loop. `run` receives the
    /// [`CallRequest`] channel through which others call into it and a
    /// [`ShutdownRequest`] it should watch to know when to exit.
    pub fn start<F, Fut>(&mut self, name: &'static str, run: F) -> Handle<()>
    where
        F: FnOnce(CallRequest<()>, ShutdownRequest) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let (action_tx, action_rx) = mpsc::unbounded_channel::<Action<(), ()>>();
        let shutdown_rx = self.shutdown_tx.subscribe();
        let call_rq = CallRequest(action_rx);
        let shut_rq = ShutdownRequest(shutdown_rx);
        let manager_name = self.name;
        let task = tokio::spawn(async move {
            run(call_rq, shut_rq).await;
            log::debug!("[{}] subsystem '{}' stopped", manager_name, name);
        });
        self.active.push((name, task));
        Handle::new(action_tx)
    }

    /// Waits for every active subsystem to finish, then broadcasts shutdown
    /// and waits for every passive subsystem to follow.
    pub async fn main(self) {
        for (name, task) in self.active {
            if let Err(err) = task.await {
                log::error!("[{}] subsystem '{}' panicked: {}", self.name, name, err);
            }
        }
        let _ = self.shutdown_tx.send(());
        for (name, task) in self.passive {
            if let Err(err) = task.await {
                log::error!("[{}] subsystem '{}' panicked: {}", self.name, name, err);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn named_config() {
        let config = SubsystemConfig::named("foo");
        assert_eq!(config.subsystem_name, "foo");
    }
}
