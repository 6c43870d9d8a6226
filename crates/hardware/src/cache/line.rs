//! Cache lines (sets) and their entries.
//!
//! A line holds `associativity` entries and owns one replacement policy. The line decides
//! *where* a tag goes; the policy is only consulted once every way is occupied.

use std::fmt;

use super::policies::ReplacementPolicy;
use crate::common::CacheAddress;

/// Metadata for one way of a line.
///
/// No payload bytes are stored; the cache only models presence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CacheEntry {
    /// Whether the way holds a block.
    pub is_present: bool,
    /// Tag of the held block. Meaningless when absent.
    pub tag: u32,
    /// References since the block was installed (1 on install, +1 per hit).
    pub usage: u32,
}

impl fmt::Display for CacheEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_present {
            write!(f, "tag {:#x} (used {}x)", self.tag, self.usage)
        } else {
            f.write_str("empty")
        }
    }
}

/// One set of a set-associative cache.
#[derive(Debug)]
pub struct CacheLine {
    entries: Vec<CacheEntry>,
    policy: Box<dyn ReplacementPolicy>,
}

impl CacheLine {
    /// Creates an empty line of `associativity` ways driven by `policy`.
    pub fn new(associativity: u16, policy: Box<dyn ReplacementPolicy>) -> Self {
        Self {
            entries: vec![CacheEntry::default(); usize::from(associativity)],
            policy,
        }
    }

    /// Returns `true` if a present entry holds `tag`.
    pub fn contains_tag(&self, tag: u32) -> bool {
        self.way_of(tag).is_some()
    }

    fn way_of(&self, tag: u32) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| entry.is_present && entry.tag == tag)
    }

    /// Records a hit on the entry holding `address.tag`.
    ///
    /// Does nothing if the tag is not present.
    pub fn update(&mut self, address: CacheAddress) {
        if let Some(way) = self.way_of(address.tag) {
            let entry = &mut self.entries[way];
            entry.usage = entry.usage.saturating_add(1);
            self.policy.notify_hit(way);
        }
    }

    /// Installs `address.tag`, evicting a victim if the line is full.
    ///
    /// The lowest empty way is used when one exists. Otherwise the policy picks the victim.
    ///
    /// # Returns
    ///
    /// The prior contents of the overwritten way. `is_present` is `false` when nothing was
    /// evicted.
    ///
    /// # Panics
    ///
    /// Panics if the policy picks a way outside the line.
    pub fn insert(&mut self, address: CacheAddress) -> CacheEntry {
        let way = match self.entries.iter().position(|entry| !entry.is_present) {
            Some(way) => way,
            None => {
                let way = self.policy.choose_eviction_victim();
                assert!(
                    way < self.entries.len(),
                    "{:?} chose way {way} for a {}-way line",
                    self.policy,
                    self.entries.len()
                );
                way
            }
        };

        let installed = CacheEntry {
            is_present: true,
            tag: address.tag,
            usage: 1,
        };
        let evicted = std::mem::replace(&mut self.entries[way], installed);
        self.policy.notify_hit(way);
        evicted
    }

    /// Marks every entry absent. Replacement state is kept.
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            entry.is_present = false;
        }
    }

    /// Returns the entry in `way`, if the way exists.
    pub fn entry(&self, way: usize) -> Option<&CacheEntry> {
        self.entries.get(way)
    }

    /// Returns every way in order.
    pub fn entries(&self) -> &[CacheEntry] {
        &self.entries
    }

    /// Returns the number of present entries.
    pub fn present_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_present).count()
    }

    /// Returns the line's replacement policy.
    pub fn policy(&self) -> &dyn ReplacementPolicy {
        self.policy.as_ref()
    }

    pub(crate) fn policy_mut(&mut self) -> &mut dyn ReplacementPolicy {
        self.policy.as_mut()
    }
}
