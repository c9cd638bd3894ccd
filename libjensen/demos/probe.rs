#![cfg(feature = "usb")]

//! Probe every HiDock on the bus and print what it reports.
//!
//! Usage:
//!   RUST_LOG=debug cargo run -p libjensen --example probe --features usb

use libjensen::device::Jensen;
use libjensen::transport::usb::{self, UsbConnector};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let devices = usb::discover()?;
    if devices.is_empty() {
        println!("no HiDock found");
        return Ok(());
    }

    for desc in devices {
        println!(
            "{} at bus {} address {} ({:04x}:{:04x})",
            desc.model, desc.bus, desc.address, desc.vendor_id, desc.product_id
        );
        let client = Jensen::builder()
            .connector(UsbConnector::for_device(desc))
            .health_check_interval_ms(None)
            .build()?;

        let info = client.connect()?;
        println!("  firmware {} ({})", info.version_code, info.version_number);
        println!("  serial   {}", info.serial_number);

        match client.get_device_time()? {
            Some(t) => println!("  clock    {}", t),
            None => println!("  clock    not set"),
        }
        let card = client.get_card_info()?;
        println!(
            "  storage  {} of {} MiB used",
            card.used_bytes / (1024 * 1024),
            card.total_bytes / (1024 * 1024)
        );
        println!("  settings {:?}", client.get_settings()?);
        println!("  files    {}", client.get_file_count()?);
        if let Some(name) = client.get_recording_file()? {
            println!("  recording {}", name);
        }
        client.disconnect();
    }
    Ok(())
}
