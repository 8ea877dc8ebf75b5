//! Inspection of slot usage and probe distances.
//!
//! Only compiled for tests or with the `stats` feature.

use alloc::vec::Vec;
use core::mem::size_of;

use crate::hash_table::HashTable;
use crate::hash_table::Slot;
use crate::key::KeyOps;

/// Number of entries at each distance from their home slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeHistogram {
    bins: Vec<usize>,
}

impl ProbeHistogram {
    /// Entry counts indexed by displacement. Index 0 holds entries sitting in
    /// their home slot.
    pub fn bins(&self) -> &[usize] {
        &self.bins
    }

    /// Total number of entries counted.
    pub fn entries(&self) -> usize {
        self.bins.iter().sum()
    }

    /// Largest displacement of any entry, or 0 for an empty table.
    pub fn max_displacement(&self) -> usize {
        self.bins.len().saturating_sub(1)
    }

    /// Mean displacement, or 0.0 for an empty table.
    pub fn mean_displacement(&self) -> f64 {
        let entries = self.entries();
        if entries == 0 {
            return 0.0;
        }
        let total: usize = self
            .bins
            .iter()
            .enumerate()
            .map(|(distance, &count)| distance * count)
            .sum();
        total as f64 / entries as f64
    }

    /// Prints the histogram as a horizontal bar chart on stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        let max = self.bins.iter().copied().max().unwrap_or(0);
        if max == 0 {
            println!("probe histogram: empty");
            return;
        }

        let max_bar = 60usize;
        let total_units = max_bar * 8;
        println!("probe histogram ({} entries):", self.entries());

        let make_bar = |count: usize| -> alloc::string::String {
            if count == 0 {
                return alloc::string::String::new();
            }
            let units = (count as u128 * total_units as u128).div_ceil(max as u128) as usize;
            let mut bar = "█".repeat(units / 8);
            let partial = ['▏', '▎', '▍', '▌', '▋', '▊', '▉'];
            if let Some(&ch) = (units % 8).checked_sub(1).and_then(|i| partial.get(i)) {
                bar.push(ch);
            }
            bar
        };

        for (distance, &count) in self.bins.iter().enumerate() {
            println!("{distance:>3} | {} ({count})", make_bar(count));
        }
    }
}

/// Snapshot of a table's slot usage.
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Live entries.
    pub populated: usize,
    /// Tombstones awaiting a rehash.
    pub tombstones: usize,
    /// Total slots.
    pub capacity: usize,
    /// `populated / capacity`.
    pub load_factor: f64,
    /// `(populated + tombstones) / capacity`, the figure growth is based on.
    pub effective_load_factor: f64,
    /// Largest distance of an entry from its home slot.
    pub max_displacement: usize,
    /// Bytes held by the slot array.
    pub total_bytes: usize,
    /// Bytes held by slots without a live entry.
    pub wasted_bytes: usize,
}

impl DebugStats {
    /// Prints the statistics on stdout.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Slim Hash Debug Statistics ===");
        println!(
            "Population: {}/{} ({:.2}% load factor)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "Tombstones: {} ({:.2}% effective load)",
            self.tombstones,
            self.effective_load_factor * 100.0
        );
        println!("Max displacement: {}", self.max_displacement);
        println!("Total Allocated: {} bytes", self.total_bytes);
        println!(
            "Memory: {} bytes wasted ({:.02}%)",
            self.wasted_bytes,
            if self.total_bytes == 0 {
                0.0
            } else {
                (self.wasted_bytes as f64 / self.total_bytes as f64) * 100.0
            }
        );
    }
}

impl<O: KeyOps, V> HashTable<O, V> {
    /// Counts entries by their distance from their home slot.
    pub fn probe_histogram(&self) -> ProbeHistogram {
        let mask = self.capacity() - 1;
        let mut bins = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            if let Slot::Filled { hash, .. } = slot {
                let distance = index.wrapping_sub(*hash as usize & mask) & mask;
                if bins.len() <= distance {
                    bins.resize(distance + 1, 0);
                }
                bins[distance] += 1;
            }
        }
        ProbeHistogram { bins }
    }

    /// Returns slot usage statistics.
    pub fn debug_stats(&self) -> DebugStats {
        let capacity = self.capacity();
        let slot_bytes = size_of::<Slot<O::Stored, V>>();
        DebugStats {
            populated: self.len(),
            tombstones: self.deleted(),
            capacity,
            load_factor: self.len() as f64 / capacity as f64,
            effective_load_factor: (self.len() + self.deleted()) as f64 / capacity as f64,
            max_displacement: self.probe_histogram().max_displacement(),
            total_bytes: capacity * slot_bytes,
            wasted_bytes: (capacity - self.len()) * slot_bytes,
        }
    }
}
