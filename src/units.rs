//! Unit tables for durations and byte sizes.
//!
//! Byte units come in two families. Lowercase spellings (`kb`, `mb`, `mib`,
//! `k`, ...) are IEC powers of 1024. `kb`/`mb`/`gb`/`tb` written with any
//! uppercase letter (`MB`, `Gb`, `tB`) are SI powers of 1000. So `mb` is
//! 1024² while `MB` is 1000². This case rule is part of the contract.

/// Seconds per duration unit. Units are matched case-sensitively.
pub fn duration_seconds(unit: &str) -> Option<f64> {
    let secs = match unit {
        "ns" => 1e-9,
        "us" | "µs" => 1e-6,
        "ms" => 1e-3,
        "s" => 1.0,
        "m" => 60.0,
        "h" => 3_600.0,
        "d" => 86_400.0,
        "w" => 604_800.0,
        _ => return None,
    };
    Some(secs)
}

fn iec_factor(unit: &str) -> Option<u64> {
    let power = match unit {
        "b" => 0,
        "k" | "kb" | "kib" => 1,
        "m" | "mb" | "mib" => 2,
        "g" | "gb" | "gib" => 3,
        "t" | "tb" | "tib" => 4,
        _ => return None,
    };
    Some(1024u64.pow(power))
}

fn si_factor(unit: &str) -> Option<u64> {
    let power = match unit {
        "kb" => 1,
        "mb" => 2,
        "gb" => 3,
        "tb" => 4,
        _ => return None,
    };
    Some(1000u64.pow(power))
}

/// Bytes per unit for a unit token exactly as it was written.
pub fn byte_factor(raw_unit: &str) -> Option<u64> {
    let unit = raw_unit.to_lowercase();
    if raw_unit.chars().any(char::is_uppercase)
        && let Some(factor) = si_factor(&unit)
    {
        return Some(factor);
    }
    iec_factor(&unit)
}
