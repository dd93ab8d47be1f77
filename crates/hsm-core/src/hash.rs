//! FNV-1a hashing for action, guard and event names.
//!
//! The compiler writes 16-bit ids into the definition blob and the runtime
//! dispatch table looks callbacks up by the same ids, so both sides must
//! agree on this exact function.

const FNV_OFFSET: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Reserved "no action / no guard" id.
pub const NO_ID: u16 = 0;

/// 32-bit FNV-1a over the UTF-8 bytes of `name`.
pub fn fnv1a_32(name: &str) -> u32 {
    let mut hash = FNV_OFFSET;
    for &byte in name.as_bytes() {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// FNV-1a truncated to its low 16 bits.
///
/// Never returns [`NO_ID`]: a name whose truncated hash is zero maps to 1.
pub fn fnv1a_16(name: &str) -> u16 {
    match fnv1a_32(name) as u16 {
        NO_ID => 1,
        id => id,
    }
}
