//! Firmware command implementation - List the firmware catalog

use anyhow::Result;

use crate::models::FirmwareCatalog;

/// Execute the firmware command
pub fn execute_firmware_command(json: bool) -> Result<()> {
    let catalog = FirmwareCatalog::new();

    if json {
        println!("{}", serde_json::to_string_pretty(catalog.all())?);
        return Ok(());
    }

    println!("📦 Firmware Catalog:");
    println!("===================\n");
    for firmware in catalog.all() {
        println!("  {:>2}  {}", firmware.id, firmware.name);
    }
    Ok(())
}
