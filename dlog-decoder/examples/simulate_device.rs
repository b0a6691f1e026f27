//! Simulate a device byte stream and decode it
//!
//! Usage: cargo run --example simulate_device
//!
//! Interleaves valid frames with line noise and a corrupt header to show the
//! decoder resynchronizing. Run with RUST_LOG=debug to see the dropped frames.

use dlog_decoder::{encode_frame, Dictionary, FrameDecoder, Level};

const DICTIONARY: &str = r#"{
    "messages": {
        "331898": {"fmt": "System initialized", "args": "", "file": "main.c", "line": 12},
        "1048476": {"fmt": "GPIO port {d} pin {d} initialized", "args": "u8u8", "file": "drivers/gpio.c", "line": 57},
        "4096": {"fmt": "Battery {d} V, status 0x{X}", "args": "f32u16", "file": "power/battery.c", "line": 210}
    }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let dictionary = Dictionary::parse(DICTIONARY)?;

    let mut stream = vec![0x13, 0x37];
    stream.extend(encode_frame(Level::Info, 331898, 1000, &[])?);
    stream.extend(encode_frame(Level::Debug, 1048476, 10000, &[2, 5])?);
    // Header with an invalid level byte
    stream.extend([0x55, 0x08, 0x07, 0, 0, 0, 0, 0, 0, 0]);

    let mut battery = 3.7f32.to_le_bytes().to_vec();
    battery.extend(0x01A0u16.to_le_bytes());
    stream.extend(encode_frame(Level::Warning, 4096, 12345, &battery)?);
    stream.extend(encode_frame(Level::Error, 0x00BEEF, 20000, &[1, 2, 3])?);

    let mut decoder = FrameDecoder::new(&dictionary);
    let width = dictionary.max_location_len();

    for frame in decoder.feed(&stream) {
        if frame.is_unknown() {
            println!("[{:>8}] {:<7} unknown message id 0x{:06X}", frame.timestamp, frame.level, frame.raw_id);
        } else {
            let location = frame.location().unwrap_or_default();
            println!("[{:>8}] {:<7} {:<width$} {}", frame.timestamp, frame.level, location, frame.message, width = width);
        }
    }

    println!("\n{:?}", decoder.stats());
    Ok(())
}
