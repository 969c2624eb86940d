//! Size label formatting.

use serde::{Deserialize, Serialize};

const KIB: f64 = 1024.0;
const MIB: f64 = KIB * 1024.0;
const GIB: f64 = MIB * 1024.0;
const TIB: f64 = GIB * 1024.0;

/// Unit used when showing sizes in the device panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SizeUnit {
    /// Largest binary unit that keeps the value at or above one
    #[default]
    Auto,
    MiB,
    GiB,
}

impl SizeUnit {
    pub fn all() -> &'static [SizeUnit] {
        &[SizeUnit::Auto, SizeUnit::MiB, SizeUnit::GiB]
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SizeUnit::Auto => "Auto",
            SizeUnit::MiB => "MiB",
            SizeUnit::GiB => "GiB",
        }
    }

    /// Bytes in one unit (Auto is treated as MiB for input fields)
    pub fn bytes(&self) -> u64 {
        match self {
            SizeUnit::Auto | SizeUnit::MiB => MIB as u64,
            SizeUnit::GiB => GIB as u64,
        }
    }
}

pub fn format_size(bytes: u64, unit: SizeUnit) -> String {
    let value = bytes as f64;
    match unit {
        SizeUnit::MiB => format!("{:.2} MiB", value / MIB),
        SizeUnit::GiB => format!("{:.2} GiB", value / GIB),
        SizeUnit::Auto => {
            if value >= TIB {
                format!("{:.2} TiB", value / TIB)
            } else if value >= GIB {
                format!("{:.2} GiB", value / GIB)
            } else if value >= MIB {
                format!("{:.2} MiB", value / MIB)
            } else if value >= KIB {
                format!("{:.2} KiB", value / KIB)
            } else {
                format!("{} B", bytes)
            }
        }
    }
}
