// src/common/fault_flags.rs

use core::fmt;

bitflags::bitflags! {
    /// Fault bits reported by the `?FF` query.
    #[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
    pub struct FaultFlags: u8 {
        const OVERHEAT = 0b0000_0001;
        const OVERVOLTAGE = 0b0000_0010;
        const UNDERVOLTAGE = 0b0000_0100;
        const SHORT_CIRCUIT = 0b0000_1000;
        const EMERGENCY_STOP = 0b0001_0000;
        const BRUSHLESS_SENSOR_FAULT = 0b0010_0000;
        const MOSFET_FAILURE = 0b0100_0000;
    }
}

impl FaultFlags {
    /// Builds the flag set from a decoded `FF=` value. Unknown bits are dropped.
    pub fn from_reading(value: i64) -> Self {
        FaultFlags::from_bits_truncate((value & 0xFF) as u8)
    }

    /// Human-readable descriptions of the raised faults, lowest bit first.
    pub fn descriptions(self) -> impl Iterator<Item = &'static str> {
        self.iter().filter_map(describe)
    }
}

static DESCRIPTIONS: [(FaultFlags, &str); 7] = [
    (FaultFlags::OVERHEAT, "Over heat"),
    (FaultFlags::OVERVOLTAGE, "Over voltage"),
    (FaultFlags::UNDERVOLTAGE, "Under voltage"),
    (FaultFlags::SHORT_CIRCUIT, "Short circuit"),
    (FaultFlags::EMERGENCY_STOP, "Emergency stop"),
    (FaultFlags::BRUSHLESS_SENSOR_FAULT, "Brushless sensor fault"),
    (FaultFlags::MOSFET_FAILURE, "Mosfet failure"),
];

/// Description of a single fault bit; `None` for combined or empty sets.
pub fn describe(flag: FaultFlags) -> Option<&'static str> {
    DESCRIPTIONS
        .iter()
        .find(|(candidate, _)| *candidate == flag)
        .map(|(_, text)| *text)
}

impl fmt::Display for FaultFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("No fault");
        }
        for (i, text) in self.descriptions().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_single_flags() {
        assert_eq!(describe(FaultFlags::OVERHEAT), Some("Over heat"));
        assert_eq!(describe(FaultFlags::MOSFET_FAILURE), Some("Mosfet failure"));
        assert_eq!(describe(FaultFlags::OVERHEAT | FaultFlags::SHORT_CIRCUIT), None);
        assert_eq!(describe(FaultFlags::empty()), None);
    }

    #[test]
    fn test_from_reading() {
        let flags = FaultFlags::from_reading(0b1001);
        assert_eq!(flags, FaultFlags::OVERHEAT | FaultFlags::SHORT_CIRCUIT);
        let texts: [&str; 2] = {
            let mut it = flags.descriptions();
            [it.next().unwrap(), it.next().unwrap()]
        };
        assert_eq!(texts, ["Over heat", "Short circuit"]);
        // Bit 7 is not assigned.
        assert_eq!(FaultFlags::from_reading(0x80), FaultFlags::empty());
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_display() {
        assert_eq!(FaultFlags::empty().to_string(), "No fault");
        assert_eq!(
            (FaultFlags::UNDERVOLTAGE | FaultFlags::EMERGENCY_STOP).to_string(),
            "Under voltage, Emergency stop"
        );
    }
}
