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

//! Logging engine. A thin facade over [`tracing`] so the rest of the
//! workspace depends on one crate rather than on `tracing` directly, and so
//! the subscriber setup lives in one place.
//!
//! Call sites use the [`log`] module, which just re-exports the `tracing`
//! macros under the name the reference client's callers expect
//! (`log::info!`, `log::warn!`, ...).

use once_cell::sync::OnceCell;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Macro re-exports, so `logging::log::info!(...)` reads like the familiar
/// `log` crate while actually going through `tracing`.
pub mod log {
    pub use tracing::{debug, error, info, trace, warn};
}

static INIT: OnceCell<()> = OnceCell::new();

/// Installs the global subscriber once. Safe to call from multiple
/// subsystems' startup paths; only the first call takes effect.
///
/// The filter defaults to `info` and honors `RUST_LOG` if set.
pub fn init() {
    INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Installs a subscriber suited to test output: no ANSI codes, `debug`
/// level, writes go through the test harness's captured stdout.
pub fn init_for_tests() {
    INIT.get_or_init(|| {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(EnvFilter::new("debug"))
            .with_ansi(false)
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
