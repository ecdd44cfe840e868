//! textbox-provision entry point.
//!
//! Reads a plaintext configuration document, seals it under a freshly
//! generated key and writes `gpt.key` + `gpt_config.bin`.  Run once per
//! credential change; copy both outputs next to the agent executable.
//!
//! ```text
//! textbox-provision [--input api.json] [--out-dir .]
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use textbox_provision::{provision, ProvisioningError, EXAMPLE_INPUT};

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(
    name = "textbox-provision",
    about = "Encrypts api.json into gpt.key and gpt_config.bin for the TextBoxGPT agent",
    version
)]
struct Cli {
    /// Plaintext configuration document.
    #[arg(long, default_value = "api.json", env = "TEXTBOX_INPUT")]
    input: PathBuf,

    /// Directory the key and encrypted configuration are written to.
    #[arg(long, default_value = ".", env = "TEXTBOX_OUT_DIR")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let artifacts = match provision(&cli.input, &cli.out_dir) {
        Ok(artifacts) => artifacts,
        Err(e) => {
            error!("provisioning failed: {e}");
            eprintln!("Error: {e}");
            if matches!(
                e,
                ProvisioningError::InputMissing { .. }
                    | ProvisioningError::InvalidJson { .. }
                    | ProvisioningError::MissingField(_)
            ) {
                eprintln!("\nPlease create {} with the following format:", cli.input.display());
                eprintln!("{EXAMPLE_INPUT}");
            }
            return Err(e.into());
        }
    };

    println!("\nConfiguration encrypted successfully!");
    println!("Key file saved as: {}", artifacts.key_path.display());
    println!("Encrypted configuration saved as: {}", artifacts.blob_path.display());
    println!("Model: {}", artifacts.model_name);
    println!("\nTo use these files:");
    println!("1. Copy both files to the same directory as the textbox-gpt executable");
    println!("2. Run textbox-gpt to use the configuration");
    println!("\nTo update configuration:");
    println!("1. Create a new api.json with the new settings");
    println!("2. Run this program again to generate new key and config files");

    Ok(())
}
