use std::{fmt, str::FromStr};

/// Memory size in bytes, parsed from strings like `14GB`, `512MiB`, `5e9` or
/// `1073741824`.
///
/// Decimal suffixes (`kB`, `MB`, `GB`, `TB`, `PB`) are powers of 1000, binary
/// suffixes (`KiB`, `MiB`, `GiB`, `TiB`, `PiB`) powers of 1024. Suffixes are
/// case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteSize {
    raw: String,
    bytes: u64,
}

impl ByteSize {
    /// Value as originally written.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// A unitless value in `(0, 1]`, read as a fraction of device memory.
    pub fn device_fraction(s: &str) -> Option<f64> {
        let value: f64 = s.trim().parse().ok()?;
        (value > 0.0 && value <= 1.0).then_some(value)
    }
}

/// Length of the leading number in `s`, exponent included.
fn number_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let mut end = 0;
    while end < bytes.len() && (bytes[end].is_ascii_digit() || bytes[end] == b'.') {
        end += 1;
    }
    if end > 0 && end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp = end + 1;
        if exp < bytes.len() && matches!(bytes[exp], b'+' | b'-') {
            exp += 1;
        }
        let digits = exp;
        while exp < bytes.len() && bytes[exp].is_ascii_digit() {
            exp += 1;
        }
        if exp > digits {
            end = exp;
        }
    }
    end
}

impl FromStr for ByteSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (number, unit) = trimmed.split_at(number_len(trimmed));

        if number.is_empty() {
            return Err(format!("missing number in '{s}'"));
        }
        let value: f64 = number
            .parse()
            .map_err(|_| format!("malformed number in '{s}'"))?;

        let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
            "" | "b" => 1,
            "k" | "kb" => 1_000,
            "m" | "mb" => 1_000_000,
            "g" | "gb" => 1_000_000_000,
            "t" | "tb" => 1_000_000_000_000,
            "p" | "pb" => 1_000_000_000_000_000,
            "kib" => 1 << 10,
            "mib" => 1 << 20,
            "gib" => 1 << 30,
            "tib" => 1 << 40,
            "pib" => 1 << 50,
            other => return Err(format!("unknown size unit '{other}'")),
        };

        let bytes = value * multiplier as f64;
        if !bytes.is_finite() || bytes < 1.0 || bytes > u64::MAX as f64 {
            return Err(format!("size '{s}' is out of range"));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            bytes: bytes as u64,
        })
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
