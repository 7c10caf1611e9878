//! Command-line frontend for the receipt printing pipeline.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use struk::settings::JsonFileStore;
use struk::transport::RfcommConnector;
use struk::{PaperProfile, PrintError, PrintResult, PrinterService, ReceiptData};

#[derive(Parser)]
#[command(name = "struk", version, about = "Bluetooth thermal receipt printing")]
struct Cli {
    /// Paper width in millimeters (58 or 80)
    #[arg(long, default_value_t = 58, global = true)]
    paper: u16,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List paired Bluetooth devices
    Devices,
    /// Save a device as the active printer
    Use {
        /// Printer MAC address, e.g. 66:22:D4:2A:0F:91
        address: String,
    },
    /// Show the active printer
    Active,
    /// Print the diagnostic test page
    Test {
        /// Print to this address instead of the active printer
        #[arg(long)]
        address: Option<String>,
    },
    /// Print a receipt from a JSON file
    Print {
        /// Receipt payload (JSON)
        file: PathBuf,
        /// Print to this address instead of the active printer
        #[arg(long)]
        address: Option<String>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> PrintResult<()> {
    let paper = PaperProfile::for_paper_mm(cli.paper)
        .ok_or_else(|| PrintError::InvalidReceipt(format!("unsupported paper width: {}mm", cli.paper)))?;
    let store = JsonFileStore::new(JsonFileStore::default_path());
    let mut service = PrinterService::new(Box::new(RfcommConnector), store, paper);

    match cli.command {
        Command::Devices => {
            let devices = service.list_paired()?;
            if devices.is_empty() {
                println!("no paired devices");
            }
            for device in devices {
                println!("{}  {}", device.address, device.display_name());
            }
        }
        Command::Use { address } => {
            service.set_active(&address)?;
            println!("active printer: {address}");
        }
        Command::Active => match service.active()? {
            Some(address) => println!("{address}"),
            None => println!("no active printer"),
        },
        Command::Test { address } => {
            service.test_print(address.as_deref())?;
            println!("test page sent");
        }
        Command::Print { file, address } => {
            let text = fs::read_to_string(&file)?;
            let data: ReceiptData = serde_json::from_str(&text)
                .map_err(|e| PrintError::InvalidReceipt(format!("{}: {e}", file.display())))?;
            service.print_receipt(&data, address.as_deref())?;
            println!("receipt {} sent", data.invoice);
        }
    }

    service.disconnect();
    Ok(())
}
