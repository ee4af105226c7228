//! `pinkit`: drive the PIN setup, login and reveal gates from a terminal.
//!
//! The PIN lives in a plain JSON file under the local data directory and the
//! biometric sensor is scripted with `--biometric pass,fail,error`.

mod flows;
mod store;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use eyre::{bail, eyre, WrapErr};
use pinkit_core::{
    ledger::format_amount, AmountStyle, BiometricScript, GateConfig, LaunchRouter, Ledger,
    LoginGate, LoginOutcome, PinEnrollment, PinGate, PinVault, ScriptedBiometricSensor,
    DEFAULT_MAX_BIOMETRIC_ATTEMPTS,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::store::FileSecretStore;

#[derive(Parser)]
#[command(name = "pinkit", version, about = "PinKit developer CLI")]
struct Cli {
    /// Directory holding the secret file. Defaults to the user's local data directory.
    #[arg(long, env = "PINKIT_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Biometric failures tolerated before a reveal requires the PIN.
    #[arg(long, env = "PINKIT_MAX_ATTEMPTS", default_value_t = DEFAULT_MAX_BIOMETRIC_ATTEMPTS, global = true)]
    max_attempts: u32,

    /// Enable debug logging (overridden by `RUST_LOG`).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show which screen the app would open on.
    Status,
    /// Save a new 6-digit PIN, replacing any existing one.
    Setup {
        /// The new PIN.
        pin: String,
    },
    /// Authenticate on the login screen.
    Login {
        /// PIN to type if biometrics do not let the user in.
        #[arg(long)]
        pin: Option<String>,
        #[command(flatten)]
        sensor: SensorArgs,
    },
    /// Delete the stored PIN.
    Reset,
    /// Run one reveal attempt on a protected amount.
    Reveal {
        #[command(flatten)]
        unlock: UnlockArgs,
    },
    /// List transactions grouped by day.
    Transactions {
        /// Try to reveal amounts before listing.
        #[arg(long)]
        reveal: bool,
        #[command(flatten)]
        unlock: UnlockArgs,
        #[command(flatten)]
        ledger: LedgerArgs,
    },
    /// Show a single transaction.
    Show {
        /// Transaction id.
        id: String,
        /// Try to reveal the amount.
        #[arg(long)]
        reveal: bool,
        #[command(flatten)]
        unlock: UnlockArgs,
        #[command(flatten)]
        ledger: LedgerArgs,
    },
}

#[derive(Args)]
struct SensorArgs {
    /// Scripted biometric results, in order. Challenges past the end fail.
    #[arg(long, value_delimiter = ',')]
    biometric: Vec<BiometricScript>,

    /// Simulate a device without enrolled biometrics.
    #[arg(long)]
    no_biometrics: bool,
}

impl SensorArgs {
    fn sensor(&self) -> Arc<ScriptedBiometricSensor> {
        let available = !self.no_biometrics;
        Arc::new(ScriptedBiometricSensor::with_capabilities(
            available,
            available,
            self.biometric.iter().copied(),
        ))
    }
}

#[derive(Args)]
struct UnlockArgs {
    #[command(flatten)]
    sensor: SensorArgs,

    /// PINs to try, in order, once the PIN prompt opens.
    #[arg(long = "pin")]
    pins: Vec<String>,
}

#[derive(Args)]
struct LedgerArgs {
    /// Simulated loading delay of the transaction source.
    #[arg(long, env = "PINKIT_LEDGER_DELAY_MS", default_value_t = 1000)]
    delay_ms: u64,
}

struct App {
    vault: Arc<PinVault>,
    config: GateConfig,
}

impl App {
    fn open(cli: &Cli) -> eyre::Result<Self> {
        let dir = match &cli.data_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .ok_or_else(|| eyre!("no local data directory; pass --data-dir"))?
                .join("pinkit"),
        };
        let store = FileSecretStore::open(&dir)
            .wrap_err_with(|| format!("opening secret store in {}", dir.display()))?;
        tracing::debug!(path = %store.path().display(), "using secret store");

        let config = GateConfig {
            max_biometric_attempts: cli.max_attempts,
            ..GateConfig::default()
        };
        config.validate()?;

        Ok(Self {
            vault: Arc::new(PinVault::new(Arc::new(store))),
            config,
        })
    }

    fn reveal_gate(&self, sensor: &SensorArgs) -> eyre::Result<PinGate> {
        Ok(PinGate::new(
            self.vault.clone(),
            sensor.sensor(),
            self.config.clone(),
        )?)
    }

    async fn unlock(&self, reveal: bool, unlock: &UnlockArgs) -> eyre::Result<PinGate> {
        let gate = self.reveal_gate(&unlock.sensor)?;
        if reveal && !flows::reveal(&gate, &unlock.pins).await? {
            println!("Amounts stay hidden.");
        }
        Ok(gate)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> eyre::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let app = App::open(&cli)?;

    match &cli.command {
        Command::Status => {
            let route = LaunchRouter::new(app.vault.clone()).route();
            println!("launch route: {route}");
        }
        Command::Setup { pin } => {
            flows::enroll(&PinEnrollment::new(app.vault.clone()), pin)?;
            println!("PIN set. Your PIN has been saved.");
        }
        Command::Login { pin, sensor } => {
            let gate = LoginGate::new(app.vault.clone(), sensor.sensor(), app.config.clone());
            let mut outcome = gate.mount().await?;
            if outcome == LoginOutcome::RedirectToEnrollment {
                bail!("no PIN configured; run `pinkit setup <PIN>` first");
            }
            if outcome == LoginOutcome::BiometricFailed {
                println!("Biometric authentication failed. Please enter your PIN.");
            }
            if outcome != LoginOutcome::Authenticated {
                let Some(pin) = pin else {
                    bail!("not authenticated; pass --pin");
                };
                outcome = flows::login_with_pin(&gate, pin).await?;
            }
            match outcome {
                LoginOutcome::Authenticated => println!("Logged in."),
                LoginOutcome::IncorrectPin => bail!("incorrect PIN"),
                other => bail!("login did not complete: {other:?}"),
            }
        }
        Command::Reset => {
            let sensor = Arc::new(ScriptedBiometricSensor::with_capabilities(false, false, []));
            let gate = LoginGate::new(app.vault.clone(), sensor, app.config.clone());
            gate.reset().await?;
            println!("Data cleared. The stored PIN has been reset.");
        }
        Command::Reveal { unlock } => {
            let gate = app.unlock(true, unlock).await?;
            let snapshot = gate.snapshot();
            info!(state = %snapshot.state, attempts = snapshot.attempt_count, "reveal finished");
            println!("{}", serde_json::to_string_pretty(&snapshot_json(&snapshot))?);
        }
        Command::Transactions {
            reveal,
            unlock,
            ledger,
        } => {
            let gate = app.unlock(*reveal, unlock).await?;
            let groups = Ledger::mock(ledger.delay_ms).load().await?;
            for group in groups {
                println!("{}", group.label);
                for tx in group.transactions {
                    println!(
                        "  {:>4}  {:<20} {:>10}",
                        tx.id,
                        tx.description,
                        gate.display_amount(tx.clone(), AmountStyle::List)
                    );
                }
            }
        }
        Command::Show {
            id,
            reveal,
            unlock,
            ledger,
        } => {
            let tx = Ledger::mock(ledger.delay_ms)
                .transaction(id.clone())
                .await
                .wrap_err("Transaction not found!")?;
            let gate = app.unlock(*reveal, unlock).await?;
            let revealed = gate.snapshot().revealed;
            println!("Transaction Details");
            let amount = format_amount(&tx, AmountStyle::Detail, revealed);
            println!("  amount:      {amount}");
            println!("  description: {}", tx.description);
            println!("  date:        {}", tx.date);
            println!("  type:        {}", tx.kind);
        }
    }
    Ok(())
}

fn snapshot_json(snapshot: &pinkit_core::GateSnapshot) -> serde_json::Value {
    serde_json::json!({
        "state": snapshot.state.to_string(),
        "revealed": snapshot.revealed,
        "bio_enabled": snapshot.bio_enabled,
        "attempt_count": snapshot.attempt_count,
    })
}
