#![cfg(feature = "usb")]

//! Download recordings from the first HiDock found.
//!
//! Usage:
//!   cargo run -p libjensen --example download --features usb -- <out-dir> [filename...]
//!
//! Without filenames every recording is downloaded. Ctrl-C is not handled;
//! partial files are left in place.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

use anyhow::{Context, bail};
use libjensen::device::{ClientEvent, Jensen};
use libjensen::transfer::CancellationToken;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(out_dir) = args.next().map(PathBuf::from) else {
        bail!("usage: download <out-dir> [filename...]");
    };
    let wanted: Vec<String> = args.collect();
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let client = Jensen::builder().usb().build()?;
    let info = client.connect()?;
    println!("connected to {} firmware {}", info.serial_number, info.version_code);

    let events = client.subscribe();
    let printer = std::thread::spawn(move || {
        for event in events {
            match event {
                ClientEvent::Progress {
                    bytes_transferred,
                    total_bytes,
                } if bytes_transferred == total_bytes => println!("  {} bytes done", total_bytes),
                ClientEvent::Activity(a) => eprintln!("[{}] {}", a.level, a.message),
                _ => {}
            }
        }
    });

    let cancel = CancellationToken::new();
    for entry in client.list_files()? {
        if !wanted.is_empty() && !wanted.contains(&entry.filename) {
            continue;
        }
        println!("{} ({} bytes, {:.0}s)", entry.filename, entry.size_bytes, entry.duration_seconds);
        let path = out_dir.join(&entry.filename);
        let mut file = BufWriter::new(
            File::create(&path).with_context(|| format!("creating {}", path.display()))?,
        );
        let outcome = client.download_file_to(&entry.filename, entry.size_bytes, &cancel, &mut file)?;
        if !outcome.is_completed() {
            bail!("{} stopped after {} bytes", entry.filename, outcome.bytes_received());
        }
    }

    client.disconnect();
    drop(client);
    let _ = printer.join();
    Ok(())
}
