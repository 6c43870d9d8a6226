use cachesim_core::cache::CacheConfiguration;
use cachesim_core::cache::policies::factory_for;
use cachesim_core::common::AccessType;
use cachesim_core::config::{ReplacementAlgorithm, WriteAllocationPolicy};
use cachesim_core::soc::{MainMemory, MemoryDevice};
use cachesim_core::CacheMemory;

/// Size of the default test memory (16-bit address space).
pub const MEMORY_SIZE: usize = 64 * 1024;

/// Installs a test-friendly tracing subscriber once per process.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Fluent builder for cache configurations used throughout the tests.
#[derive(Clone, Copy, Debug)]
pub struct Geometry {
    pub tag_bits: u16,
    pub index_bits: u16,
    pub data_bits: u16,
    pub associativity: u16,
    pub write_allocation: WriteAllocationPolicy,
    pub algorithm: ReplacementAlgorithm,
    pub age_after: u32,
}

impl Geometry {
    /// `tag=8, index=4, data=4`, 2-way, no-write-allocate, LRU.
    pub const fn small() -> Self {
        Self {
            tag_bits: 8,
            index_bits: 4,
            data_bits: 4,
            associativity: 2,
            write_allocation: WriteAllocationPolicy::NoWriteAllocate,
            algorithm: ReplacementAlgorithm::Lru,
            age_after: 4,
        }
    }

    pub const fn bits(mut self, tag: u16, index: u16, data: u16) -> Self {
        self.tag_bits = tag;
        self.index_bits = index;
        self.data_bits = data;
        self
    }

    pub const fn ways(mut self, associativity: u16) -> Self {
        self.associativity = associativity;
        self
    }

    pub const fn allocate(mut self) -> Self {
        self.write_allocation = WriteAllocationPolicy::WriteAllocate;
        self
    }

    pub const fn algorithm(mut self, algorithm: ReplacementAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn configuration(self) -> CacheConfiguration {
        CacheConfiguration {
            tag_bits: self.tag_bits,
            index_bits: self.index_bits,
            data_bits: self.data_bits,
            associativity: self.associativity,
            write_allocation: self.write_allocation,
            factory: factory_for(self.algorithm, self.age_after, 1),
        }
    }

    /// Builds a cache over a fresh 64 KiB main memory.
    pub fn build(self) -> CacheMemory<MainMemory> {
        init_tracing();
        CacheMemory::new(MainMemory::new(MEMORY_SIZE), self.configuration())
            .expect("test geometry must be valid")
    }
}

/// Builds an address from its fields under `geometry`.
pub fn address(geometry: &Geometry, tag: u32, index: u32) -> u32 {
    (tag << (geometry.index_bits + geometry.data_bits)) | (index << geometry.data_bits)
}

/// Runs `body` inside one transaction of `mode`.
pub fn transaction<M, R>(
    cache: &mut CacheMemory<M>,
    mode: AccessType,
    body: impl FnOnce(&mut CacheMemory<M>) -> R,
) -> R
where
    M: MemoryDevice,
{
    cache.begin_transaction(mode);
    let result = body(cache);
    cache.end_transaction();
    result
}

/// Reads every address in its own data transaction.
pub fn read_each<M: MemoryDevice>(cache: &mut CacheMemory<M>, addresses: &[u32]) {
    for &addr in addresses {
        transaction(cache, AccessType::Data, |c| {
            c.read_byte(addr).expect("address in range");
        });
    }
}
