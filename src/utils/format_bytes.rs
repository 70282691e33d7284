/// Formats a byte count for human-readable CLI output.
///
/// Sizes at or above 1 KB are shown with two decimal places in the largest
/// fitting unit; smaller sizes are shown as raw bytes.
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match bytes {
        b if b >= GB => format!("{:.2} GB", b as f64 / GB as f64),
        b if b >= MB => format!("{:.2} MB", b as f64 / MB as f64),
        b if b >= KB => format!("{:.2} KB", b as f64 / KB as f64),
        _ => format!("{bytes} bytes"),
    }
}
