//! Headless mode for scripted wallet sessions.
//!
//! Drives a [`ConnectionManager`] against an in-memory wallet, executing
//! scripted user and wallet events and capturing the final chip and status
//! line for verification.

mod events;

pub use events::{Assertion, Event, EventParser};

use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::config::Config;
use crate::connection::{ConnectionManager, ConnectionSnapshot};
use crate::error::{Result, WalletError};
use crate::ui::{chip_label, RecordingStatus};
use crate::wallet::{MockConnector, MockEnvironment, MockWallet, WalletEvent};

/// Output format for headless mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Chip and status line as plain text.
    #[default]
    Text,
    /// JSON with chip, status, state and counters.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid output format: {s}. Expected: text or json")),
        }
    }
}

/// The simulated wallet a headless session runs against.
#[derive(Debug, Clone)]
pub struct HeadlessWallet {
    /// Accounts the wallet exposes.
    pub accounts: Vec<String>,
    /// Chain the wallet starts on.
    pub chain_id: u64,
    /// Balance of every account, as an RPC hex quantity.
    pub balance: String,
    /// Whether the wallet already has the target chain registered.
    pub knows_target_chain: bool,
    /// Whether a wallet is injected into the environment.
    pub injected: bool,
}

impl Default for HeadlessWallet {
    fn default() -> Self {
        Self {
            accounts: vec!["0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed".to_string()],
            chain_id: 137,
            balance: "0x0".to_string(),
            knows_target_chain: true,
            injected: true,
        }
    }
}

/// Configuration for headless mode execution.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Simulated wallet.
    pub wallet: HeadlessWallet,
    /// Output format.
    pub output_format: OutputFormat,
    /// Whether to stop on first assertion failure.
    pub fail_fast: bool,
}

/// Result of headless execution.
#[derive(Debug, Clone, Serialize)]
pub struct HeadlessResult {
    /// Final chip label.
    pub chip: String,
    /// Final status line, if any.
    pub message: Option<String>,
    /// Final connection state.
    pub state: ConnectionSnapshot,
    /// Number of events executed.
    pub events_executed: usize,
    /// Number of assertions passed.
    pub assertions_passed: usize,
    /// Number of assertions failed.
    pub assertions_failed: usize,
    /// Failed assertions, in script order.
    pub failures: Vec<String>,
    /// Total execution time in milliseconds.
    pub duration_ms: u128,
}

impl HeadlessResult {
    /// Returns true if every assertion held.
    pub fn passed(&self) -> bool {
        self.assertions_failed == 0
    }

    /// Renders the result in the given format.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => {
                let mut out = format!("[{}]\n", self.chip);
                if let Some(message) = &self.message {
                    out.push_str(message);
                    out.push('\n');
                }
                if self.assertions_passed + self.assertions_failed > 0 {
                    out.push_str(&format!(
                        "assertions: {} passed, {} failed\n",
                        self.assertions_passed, self.assertions_failed
                    ));
                }
                for failure in &self.failures {
                    out.push_str(&format!("FAILED: {failure}\n"));
                }
                Ok(out)
            }
            OutputFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| WalletError::unknown(format!("Failed to serialize result: {e}"))),
        }
    }
}

/// Runs a scripted wallet session.
pub struct HeadlessRunner {
    config: HeadlessConfig,
    symbol: String,
    wallet: Arc<MockWallet>,
    manager: ConnectionManager<RecordingStatus>,
    events: Vec<Event>,
}

impl HeadlessRunner {
    /// Creates a runner whose manager uses `app_config` and a simulated wallet.
    pub fn new(config: HeadlessConfig, app_config: Config) -> Self {
        let sim = &config.wallet;
        let mut wallet = MockWallet::new()
            .with_chain(sim.chain_id)
            .with_accounts(sim.accounts.iter().cloned())
            .with_balance(sim.balance.clone())
            .with_session();
        if !sim.knows_target_chain {
            wallet = wallet.with_known_chains([sim.chain_id]);
        } else {
            wallet = wallet.with_known_chains([sim.chain_id, app_config.chain.chain_id]);
        }
        let wallet = Arc::new(wallet);

        let environment = if sim.injected {
            MockEnvironment::with_wallet(wallet.clone())
        } else {
            MockEnvironment::empty()
        };

        let symbol = app_config.chain.native_currency.symbol.clone();
        let manager = ConnectionManager::new(
            app_config,
            Arc::new(environment),
            Arc::new(MockConnector::new(wallet.clone())),
            RecordingStatus::new(),
        );

        Self {
            config,
            symbol,
            wallet,
            manager,
            events: Vec::new(),
        }
    }

    /// Loads events from a string (comma-separated or newline-separated).
    pub fn load_events(&mut self, input: &str) -> Result<()> {
        let parser = EventParser::new();
        self.events = parser.parse_all(input)?;
        Ok(())
    }

    /// Loads events from a script file ("-" reads stdin).
    pub fn load_script(&mut self, path: &str) -> Result<()> {
        let content = if path == "-" {
            use std::io::Read;
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .map_err(|e| WalletError::config(format!("Failed to read stdin: {e}")))?;
            buffer
        } else {
            std::fs::read_to_string(path)
                .map_err(|e| WalletError::config(format!("Failed to read script file: {e}")))?
        };

        self.load_events(&content)
    }

    /// Returns the simulated wallet.
    pub fn wallet(&self) -> &Arc<MockWallet> {
        &self.wallet
    }

    /// Runs the loaded events and returns the result.
    pub async fn run(mut self) -> HeadlessResult {
        let start = Instant::now();
        let events = std::mem::take(&mut self.events);
        let mut events_executed = 0;
        let mut assertions_passed = 0;
        let mut failures = Vec::new();

        for event in events {
            debug!(event = %event, "headless event");

            match &event {
                Event::Connect(choice) => {
                    let outcome = self.manager.connect(*choice).await;
                    info!(choice = %choice, connected = outcome.is_connected(), "connect");
                }
                Event::Disconnect => self.manager.disconnect().await,
                Event::WalletAccounts(accounts) => {
                    self.wallet
                        .emit(WalletEvent::AccountsChanged(accounts.clone()));
                }
                Event::WalletChain(chain) => {
                    self.wallet.emit(WalletEvent::ChainChanged(chain.clone()));
                }
                Event::WalletDisconnect => self.wallet.emit(WalletEvent::Disconnect),
                Event::Wait(duration) => tokio::time::sleep(*duration).await,
                Event::Assert(assertion) => {
                    if self.check(assertion) {
                        assertions_passed += 1;
                    } else {
                        failures.push(assertion.to_string());
                        if self.config.fail_fast {
                            events_executed += 1;
                            break;
                        }
                    }
                }
            }

            self.manager.drain_events().await;
            events_executed += 1;
        }

        let snapshot = self.manager.snapshot();
        HeadlessResult {
            chip: chip_label(&snapshot, &self.symbol),
            message: self.manager.status().message().map(String::from),
            state: snapshot,
            events_executed,
            assertions_passed,
            assertions_failed: failures.len(),
            failures,
            duration_ms: start.elapsed().as_millis(),
        }
    }

    fn check(&self, assertion: &Assertion) -> bool {
        let snapshot = self.manager.snapshot();
        let chip = chip_label(&snapshot, &self.symbol);
        assertion.check(&chip, self.manager.status().message(), &snapshot)
    }
}
