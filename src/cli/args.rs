//! Command line argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "ncd-flasher")]
#[command(about = "Flash, test, factory-reset and erase NCD ESP32 sensors over USB-serial")]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease logging verbosity (only errors)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to <config dir>/ncd-flasher/config.toml)
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// List serial ports available for selection
    Ports {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the firmware catalog
    Firmware {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write a firmware image to the device
    Flash {
        /// Serial port (e.g., /dev/ttyUSB0, COM3)
        #[arg(short, long)]
        port: String,
        /// Firmware id from the catalog
        #[arg(short, long)]
        firmware: u32,
    },
    /// Run the production test sequence
    Test {
        /// Serial port (e.g., /dev/ttyUSB0, COM3)
        #[arg(short, long)]
        port: String,
        /// Firmware id (defaults to the configured default)
        #[arg(short, long)]
        firmware: Option<u32>,
    },
    /// Restore factory defaults
    Reset {
        /// Serial port (e.g., /dev/ttyUSB0, COM3)
        #[arg(short, long)]
        port: String,
        /// Firmware id (defaults to the configured default)
        #[arg(short, long)]
        firmware: Option<u32>,
    },
    /// Erase the entire flash
    Erase {
        /// Serial port (e.g., /dev/ttyUSB0, COM3)
        #[arg(short, long)]
        port: String,
        /// Firmware id (defaults to the configured default)
        #[arg(short, long)]
        firmware: Option<u32>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether the interactive TUI will run
    pub fn is_tui(&self) -> bool {
        self.command.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_subcommand_runs_tui() {
        let cli = Cli::try_parse_from(["ncd-flasher", "-v"]).unwrap();
        assert!(cli.is_tui());
        assert_eq!(cli.verbose, 1);
    }

    #[test]
    fn test_flash_requires_port_and_firmware() {
        assert!(Cli::try_parse_from(["ncd-flasher", "flash", "--port", "/dev/ttyUSB0"]).is_err());

        let cli = Cli::try_parse_from([
            "ncd-flasher",
            "flash",
            "--port",
            "/dev/ttyUSB0",
            "--firmware",
            "23",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Flash { port, firmware }) => {
                assert_eq!(port, "/dev/ttyUSB0");
                assert_eq!(firmware, 23);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_erase_flags() {
        let cli = Cli::try_parse_from(["ncd-flasher", "-q", "erase", "-p", "COM3", "--yes"]).unwrap();
        assert!(cli.quiet);
        match cli.command {
            Some(Commands::Erase { port, firmware, yes }) => {
                assert_eq!(port, "COM3");
                assert_eq!(firmware, None);
                assert!(yes);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
