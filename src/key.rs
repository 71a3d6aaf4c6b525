/// Number of decimal digits in a record key.
pub const KEY_DIGITS: usize = 16;

const KEY_CAPACITY: usize = KEY_DIGITS + 1;
const MISSING_SUFFIX: u8 = b'.';

/// A record key: the record index as a zero-padded 16-digit decimal string.
///
/// Lives on the stack with an explicit length; nothing relies on a terminator.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct BenchKey {
    buf: [u8; KEY_CAPACITY],
    len: usize,
}

impl BenchKey {
    /// Key for record `index`, e.g. `42` -> `0000000000000042`.
    ///
    /// `index` must fit in 16 digits.
    pub fn new(index: usize) -> Self {
        let mut buf = [b'0'; KEY_CAPACITY];
        let mut rest = index;
        for slot in buf[..KEY_DIGITS].iter_mut().rev() {
            *slot = b'0' + (rest % 10) as u8;
            rest /= 10;
        }
        debug_assert_eq!(rest, 0, "record index {} overflows the key", index);
        BenchKey {
            buf,
            len: KEY_DIGITS,
        }
    }

    /// Key that can never exist: the key for `index` followed by a `.`.
    pub fn missing(index: usize) -> Self {
        let mut key = Self::new(index);
        key.buf[KEY_DIGITS] = MISSING_SUFFIX;
        key.len = KEY_CAPACITY;
        key
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for BenchKey {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl std::fmt::Display for BenchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Always ASCII.
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl std::fmt::Debug for BenchKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BenchKey({})", self)
    }
}
