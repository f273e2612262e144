// Copyright 2025 Apache Doris Community
// Licensed under the Apache License, Version 2.0

//! Utility functions

/// Parse size string (e.g., "5MB", "512KB") to bytes
pub fn parse_size(size_str: &str) -> Result<u64, String> {
    let size_str = size_str.trim().to_uppercase();

    let (num_str, unit) = if let Some(pos) = size_str.find(|c: char| !c.is_numeric() && c != '.') {
        (&size_str[..pos], size_str[pos..].trim())
    } else {
        (size_str.as_str(), "")
    };

    let number: f64 = num_str.parse()
        .map_err(|e| format!("Invalid number: {}", e))?;

    let multiplier: u64 = match unit {
        "" | "B" => 1,
        "KB" | "K" => 1024,
        "MB" | "M" => 1024 * 1024,
        "GB" | "G" => 1024 * 1024 * 1024,
        _ => return Err(format!("Unknown unit: {}", unit)),
    };

    Ok((number * multiplier as f64) as u64)
}

/// Format bytes to human readable string
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB", "PB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    format!("{:.2} {}", size, UNITS[unit_idx])
}

/// Parse a boolean flag the way environment settings are usually written
pub fn parse_bool(value: &str) -> Result<bool, String> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" | "y" | "t" => Ok(true),
        "0" | "false" | "no" | "off" | "n" | "f" => Ok(false),
        other => Err(format!("Invalid boolean: {}", other)),
    }
}

/// Render a scale factor so integral values keep one decimal (`1.0`,
/// `10.0`) and fractional ones print as-is (`0.01`). Dataset directories
/// and the timing log both use this form.
pub fn format_scale_factor(scale_factor: f64) -> String {
    if scale_factor.fract() == 0.0 && scale_factor.is_finite() {
        format!("{:.1}", scale_factor)
    } else {
        format!("{}", scale_factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1KB").unwrap(), 1024);
        assert_eq!(parse_size("5MB").unwrap(), 5 * 1024 * 1024);
        assert_eq!(parse_size("1.5GB").unwrap(), (1.5 * 1024.0 * 1024.0 * 1024.0) as u64);
        assert_eq!(parse_size("  2 MB  ").unwrap(), 2 * 1024 * 1024);
    }

    #[test]
    fn test_parse_size_error() {
        assert!(parse_size("invalid").is_err());
        assert!(parse_size("10XX").is_err());
        assert!(parse_size("").is_err());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512.00 B");
        assert_eq!(format_bytes(1536 * 1024), "1.50 MB");
    }

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("1").unwrap());
        assert!(parse_bool("True").unwrap());
        assert!(!parse_bool("off").unwrap());
        assert!(parse_bool("maybe").is_err());
    }

    #[test]
    fn test_format_scale_factor() {
        assert_eq!(format_scale_factor(1.0), "1.0");
        assert_eq!(format_scale_factor(10.0), "10.0");
        assert_eq!(format_scale_factor(0.01), "0.01");
        assert_eq!(format_scale_factor(0.5), "0.5");
    }
}
