//! Paged command buffer.
//!
//! Actions emit side effects as small records into a fixed 4096-byte page
//! (16-byte header + 4080-byte payload). One [`CommandWriter`] covers a whole
//! tick batch; it never allocates and reports overflow by returning `false`.
//! Pages are recycled through a shared [`PagePool`].
//!
//! Page header: used payload bytes (u16) | record count (u16) | sequence (u32)
//! | reserved (8). Record: kind (u16) | length (u16) | data.

use parking_lot::Mutex;

pub const PAGE_SIZE: usize = 4096;
pub const PAGE_HEADER_SIZE: usize = 16;
pub const PAGE_PAYLOAD_SIZE: usize = PAGE_SIZE - PAGE_HEADER_SIZE;
pub const RECORD_HEADER_SIZE: usize = 4;

const USED: usize = 0;
const COUNT: usize = 2;
const SEQUENCE: usize = 4;

#[repr(C, align(64))]
pub struct CommandPage {
    bytes: [u8; PAGE_SIZE],
}

impl Default for CommandPage {
    fn default() -> Self {
        Self {
            bytes: [0; PAGE_SIZE],
        }
    }
}

impl std::fmt::Debug for CommandPage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandPage")
            .field("sequence", &self.sequence())
            .field("used", &self.used())
            .field("count", &self.count())
            .finish()
    }
}

impl CommandPage {
    pub fn new() -> Self {
        Self::default()
    }

    fn read_u16(&self, at: usize) -> u16 {
        u16::from_le_bytes([self.bytes[at], self.bytes[at + 1]])
    }

    fn write_u16(&mut self, at: usize, value: u16) {
        self.bytes[at..at + 2].copy_from_slice(&value.to_le_bytes());
    }

    /// Payload bytes written so far.
    pub fn used(&self) -> usize {
        self.read_u16(USED) as usize
    }

    pub fn remaining(&self) -> usize {
        PAGE_PAYLOAD_SIZE - self.used()
    }

    pub fn count(&self) -> usize {
        self.read_u16(COUNT) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn sequence(&self) -> u32 {
        let b = &self.bytes[SEQUENCE..SEQUENCE + 4];
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    pub fn set_sequence(&mut self, sequence: u32) {
        self.bytes[SEQUENCE..SEQUENCE + 4].copy_from_slice(&sequence.to_le_bytes());
    }

    /// Forget every record. The sequence number is kept.
    pub fn clear(&mut self) {
        self.write_u16(USED, 0);
        self.write_u16(COUNT, 0);
    }

    pub fn as_bytes(&self) -> &[u8; PAGE_SIZE] {
        &self.bytes
    }

    /// Records in write order.
    pub fn commands(&self) -> Commands<'_> {
        Commands {
            payload: &self.bytes[PAGE_HEADER_SIZE..PAGE_HEADER_SIZE + self.used()],
        }
    }

    fn push(&mut self, kind: u16, data: &[u8]) -> bool {
        let needed = RECORD_HEADER_SIZE + data.len();
        if data.len() > u16::MAX as usize || needed > self.remaining() {
            return false;
        }
        let at = PAGE_HEADER_SIZE + self.used();
        self.write_u16(at, kind);
        self.write_u16(at + 2, data.len() as u16);
        self.bytes[at + RECORD_HEADER_SIZE..at + needed].copy_from_slice(data);

        let used = self.used() + needed;
        let count = self.count() + 1;
        self.write_u16(USED, used as u16);
        self.write_u16(COUNT, count as u16);
        true
    }
}

/// One decoded record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Command<'p> {
    pub kind: u16,
    pub data: &'p [u8],
}

pub struct Commands<'p> {
    payload: &'p [u8],
}

impl<'p> Iterator for Commands<'p> {
    type Item = Command<'p>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.payload.len() < RECORD_HEADER_SIZE {
            return None;
        }
        let kind = u16::from_le_bytes([self.payload[0], self.payload[1]]);
        let len = u16::from_le_bytes([self.payload[2], self.payload[3]]) as usize;
        let end = RECORD_HEADER_SIZE + len;
        let data = &self.payload[RECORD_HEADER_SIZE..end];
        self.payload = &self.payload[end..];
        Some(Command { kind, data })
    }
}

/// Appends records to the current page. Borrowed for one tick batch.
pub struct CommandWriter<'p> {
    page: &'p mut CommandPage,
    rejected: u32,
}

impl<'p> CommandWriter<'p> {
    pub fn new(page: &'p mut CommandPage) -> Self {
        Self { page, rejected: 0 }
    }

    /// Append a record. False when the page has no room for it.
    pub fn write(&mut self, kind: u16, data: &[u8]) -> bool {
        let ok = self.page.push(kind, data);
        if !ok {
            self.rejected += 1;
        }
        ok
    }

    pub fn remaining(&self) -> usize {
        self.page.remaining()
    }

    pub fn count(&self) -> usize {
        self.page.count()
    }

    /// Records refused for lack of space since this writer was created.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }

    pub fn page(&self) -> &CommandPage {
        self.page
    }
}

/// Thread-safe recycling pool of command pages.
#[derive(Debug)]
pub struct PagePool {
    free: Mutex<Vec<Box<CommandPage>>>,
    max_pooled: usize,
    next_sequence: Mutex<u32>,
}

impl PagePool {
    /// Pool keeping at most `max_pooled` returned pages.
    pub fn new(max_pooled: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(max_pooled)),
            max_pooled,
            next_sequence: Mutex::new(0),
        }
    }

    /// An empty page, recycled when one is available.
    pub fn rent(&self) -> Box<CommandPage> {
        let recycled = self.free.lock().pop();
        let mut page = recycled.unwrap_or_default();
        page.clear();
        let mut sequence = self.next_sequence.lock();
        page.set_sequence(*sequence);
        *sequence = sequence.wrapping_add(1);
        page
    }

    /// Hand a page back. Dropped when the pool is full.
    pub fn release(&self, page: Box<CommandPage>) {
        let mut free = self.free.lock();
        if free.len() < self.max_pooled {
            free.push(page);
        }
    }

    pub fn pooled(&self) -> usize {
        self.free.lock().len()
    }
}

impl Default for PagePool {
    fn default() -> Self {
        Self::new(16)
    }
}
