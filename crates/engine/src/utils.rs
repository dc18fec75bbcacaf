/// Human-readable byte count with decimal units, as shown in progress annotations.
pub fn format_byte_size(size: u64) -> String {
    let size = size as f64;
    if size > 1e9 {
        format!("{:.2}GB", size / 1e9)
    } else if size > 1e6 {
        format!("{:.2}MB", size / 1e6)
    } else if size > 1e3 {
        format!("{}KB", (size / 1e3) as u64)
    } else {
        format!("{}B", size as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_byte_size() {
        assert_eq!(format_byte_size(0), "0B");
        assert_eq!(format_byte_size(1000), "1000B");
        assert_eq!(format_byte_size(1001), "1KB");
        assert_eq!(format_byte_size(187_654), "187KB");
        assert_eq!(format_byte_size(2_500_000), "2.50MB");
        assert_eq!(format_byte_size(3_210_000_000), "3.21GB");
    }
}
