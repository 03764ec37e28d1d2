//! Swap-completed notifications

use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Emitted once per committed execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapCompleted {
    pub timestamp: DateTime<Utc>,
    pub asset_in: Address,
    pub asset_out: Address,
    pub amount_in: U256,
    pub amount_out: U256,
    pub recipient: Address,
    pub hops: usize,
}

impl SwapCompleted {
    /// Append this event to a file as one JSON line
    pub fn append_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        // Create parent directories if needed
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;

        let json = serde_json::to_string(self)?;
        writeln!(file, "{}", json)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_writes_json_lines() {
        let event = SwapCompleted {
            timestamp: Utc::now(),
            asset_in: Address::repeat_byte(0xA0),
            asset_out: Address::repeat_byte(0xC0),
            amount_in: U256::from(10u64),
            amount_out: U256::from(60u64),
            recipient: Address::repeat_byte(0x02),
            hops: 2,
        };

        let path = std::env::temp_dir()
            .join(format!("swap-router-events-{}", std::process::id()))
            .join("swaps.log");
        event.append_to_file(&path).unwrap();
        event.append_to_file(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).ok();

        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let parsed: SwapCompleted = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed, event);
    }
}
