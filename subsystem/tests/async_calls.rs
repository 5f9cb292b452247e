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

use subsystem::*;

// Logger (as a subsystem)
pub struct Logger {
    prefix: String,
}

impl Logger {
    fn new(prefix: String) -> Self {
        Logger { prefix }
    }

    fn write(&self, message: &str) {
        logging::log::warn!("{}: {}", self.prefix, message);
    }
}

// Logging counter
pub struct Counter {
    count: u64,
    logger: Subsystem<Logger>,
}

impl Counter {
    fn new(logger: Subsystem<Logger>) -> Self {
        let count = 0u64;
        Self { count, logger }
    }

    async fn bump(&mut self) {
        self.count += 1;
        let message = format!("Bumped counter to {}", self.count);
        self.logger.call(move |logger| logger.write(&message)).await;
    }
}

#[tokio::test]
async fn async_calls() {
    let mut app = Manager::new("app");
    let logger = app.start_passive("logger", Logger::new("logging".to_string()));
    let counter = app.start_passive("counter", Counter::new(logger.clone()));

    app.start("test", |_call_rq: CallRequest<()>, _shut_rq| async move {
        logger.call(|l| l.write("starting")).await.expect("logger call failed");
        // Bump the counter twice
        counter.call_async_mut(|c| Box::pin(c.bump())).await.expect("counter call failed");
        counter.call_async_mut(|c| Box::pin(c.bump())).await.expect("counter call failed");
        logger.call(|l| l.write("done")).await.expect("logger call failed");
    });

    app.main().await
}
