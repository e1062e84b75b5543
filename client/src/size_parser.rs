//! Human-readable size parsing utilities.

use anyhow::{anyhow, Result};

/// Suffixes and their multipliers, longest first so "KiB" wins over "B".
const UNITS: &[(&str, u64)] = &[
    ("TIB", 1 << 40),
    ("GIB", 1 << 30),
    ("MIB", 1 << 20),
    ("KIB", 1 << 10),
    ("TB", 1_000_000_000_000),
    ("GB", 1_000_000_000),
    ("MB", 1_000_000),
    ("KB", 1_000),
    ("T", 1 << 40),
    ("G", 1 << 30),
    ("M", 1 << 20),
    ("K", 1 << 10),
    ("B", 1),
];

/// Parses a human-readable size string like "64MB", "1GB", "512KiB" into bytes.
///
/// Supports both decimal (KB, MB, GB) and binary (KiB, MiB, GiB) units.
/// Can also parse plain numbers as bytes.
pub fn parse_size(input: &str) -> Result<usize> {
    let input = input.trim();

    if let Ok(bytes) = input.parse::<usize>() {
        return Ok(bytes);
    }

    let upper = input.to_uppercase();
    for (suffix, multiplier) in UNITS {
        if let Some(number) = upper.strip_suffix(suffix) {
            let number: f64 = number
                .trim()
                .parse()
                .map_err(|_| anyhow!("Invalid number in size: {}", input))?;

            return Ok((number * *multiplier as f64) as usize);
        }
    }

    Err(anyhow!(
        "Invalid size: {}. Expected e.g. 1048576, 64MB or 512KiB",
        input
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("1024").unwrap(), 1024);
        assert_eq!(parse_size("1KB").unwrap(), 1000);
        assert_eq!(parse_size("1KiB").unwrap(), 1024);
        assert_eq!(parse_size("1K").unwrap(), 1024);
        assert_eq!(parse_size("64MB").unwrap(), 64_000_000);
        assert_eq!(parse_size("64MiB").unwrap(), 67_108_864);
        assert_eq!(parse_size("64M").unwrap(), 67_108_864);
        assert_eq!(parse_size("1.5GB").unwrap(), 1_500_000_000);
        assert_eq!(parse_size("1.5GiB").unwrap(), 1_610_612_736);
        assert_eq!(parse_size("100 MB").unwrap(), 100_000_000);
    }

    #[test]
    fn test_parse_size_invalid() {
        assert!(parse_size("abc").is_err());
        assert!(parse_size("10XB").is_err());
        assert!(parse_size("").is_err());
    }
}
