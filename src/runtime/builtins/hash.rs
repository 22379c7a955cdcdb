//! Hash built-in functions
//!
//! MD5 and SHA-1 are the real digest algorithms; crc32 is the reflected
//! IEEE polynomial. hash_hmac and hash_pbkdf2 build on them.

use lazy_static::lazy_static;

use crate::runtime::Value;
use crate::vm::error::VmError;

fn arg(args: &[Value], index: usize, name: &str, expected: usize) -> Result<Value, VmError> {
    args.get(index).cloned().ok_or_else(|| {
        VmError::InvalidArgument(format!(
            "{}() expects at least {} parameter(s), {} given",
            name,
            expected,
            args.len()
        ))
    })
}

fn to_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

// ---- MD5 ----------------------------------------------------------------

const MD5_S: [u32; 64] = [
    7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, 7, 12, 17, 22, //
    5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, 5, 9, 14, 20, //
    4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, 4, 11, 16, 23, //
    6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21, 6, 10, 15, 21,
];

const MD5_K: [u32; 64] = [
    0xd76aa478, 0xe8c7b756, 0x242070db, 0xc1bdceee, 0xf57c0faf, 0x4787c62a, 0xa8304613,
    0xfd469501, 0x698098d8, 0x8b44f7af, 0xffff5bb1, 0x895cd7be, 0x6b901122, 0xfd987193,
    0xa679438e, 0x49b40821, 0xf61e2562, 0xc040b340, 0x265e5a51, 0xe9b6c7aa, 0xd62f105d,
    0x02441453, 0xd8a1e681, 0xe7d3fbc8, 0x21e1cde6, 0xc33707d6, 0xf4d50d87, 0x455a14ed,
    0xa9e3e905, 0xfcefa3f8, 0x676f02d9, 0x8d2a4c8a, 0xfffa3942, 0x8771f681, 0x6d9d6122,
    0xfde5380c, 0xa4beea44, 0x4bdecfa9, 0xf6bb4b60, 0xbebfbc70, 0x289b7ec6, 0xeaa127fa,
    0xd4ef3085, 0x04881d05, 0xd9d4d039, 0xe6db99e5, 0x1fa27cf8, 0xc4ac5665, 0xf4292244,
    0x432aff97, 0xab9423a7, 0xfc93a039, 0x655b59c3, 0x8f0ccc92, 0xffeff47d, 0x85845dd1,
    0x6fa87e4f, 0xfe2ce6e0, 0xa3014314, 0x4e0811a1, 0xf7537e82, 0xbd3af235, 0x2ad7d2bb,
    0xeb86d391,
];

pub(crate) fn md5_bytes(data: &[u8]) -> [u8; 16] {
    let mut message = data.to_vec();
    let bit_len = (data.len() as u64).wrapping_mul(8);
    message.push(0x80);
    while message.len() % 64 != 56 {
        message.push(0);
    }
    message.extend_from_slice(&bit_len.to_le_bytes());

    let mut a0: u32 = 0x67452301;
    let mut b0: u32 = 0xefcdab89;
    let mut c0: u32 = 0x98badcfe;
    let mut d0: u32 = 0x10325476;

    for chunk in message.chunks_exact(64) {
        let mut m = [0u32; 16];
        for (i, word) in m.iter_mut().enumerate() {
            *word = u32::from_le_bytes([
                chunk[i * 4],
                chunk[i * 4 + 1],
                chunk[i * 4 + 2],
                chunk[i * 4 + 3],
            ]);
        }

        let (mut a, mut b, mut c, mut d) = (a0, b0, c0, d0);
        for i in 0..64 {
            let (f, g) = match i {
                0..=15 => ((b & c) | (!b & d), i),
                16..=31 => ((d & b) | (!d & c), (5 * i + 1) % 16),
                32..=47 => (b ^ c ^ d, (3 * i + 5) % 16),
                _ => (c ^ (b | !d), (7 * i) % 16),
            };
            let rotated = f
                .wrapping_add(a)
                .wrapping_add(MD5_K[i])
                .wrapping_add(m[g])
                .rotate_left(MD5_S[i]);
            a = d;
            d = c;
            c = b;
            b = b.wrapping_add(rotated);
        }

        a0 = a0.wrapping_add(a);
        b0 = b0.wrapping_add(b);
        c0 = c0.wrapping_add(c);
        d0 = d0.wrapping_add(d);
    }

    let mut digest = [0u8; 16];
    digest[0..4].copy_from_slice(&a0.to_le_bytes());
    digest[4..8].copy_from_slice(&b0.to_le_bytes());
    digest[8..12].copy_from_slice(&c0.to_le_bytes());
    digest[12..16].copy_from_slice(&d0.to_le_bytes());
    digest
}

// ---- SHA-1 --------------------------------------------------------------

pub(crate) fn sha1_bytes(data: &[u8]) -> [u8; 20] {
    let mut message = data.to_vec();
    let bit_len = (data.len() as u64).wrapping_mul(8);
    message.push(0x80);
    while message.len() % 64 != 56 {
        message.push(0);
    }
    message.extend_from_slice(&bit_len.to_be_bytes());

    let mut h: [u32; 5] = [0x67452301, 0xefcdab89, 0x98badcfe, 0x10325476, 0xc3d2e1f0];

    for chunk in message.chunks_exact(64) {
        let mut w = [0u32; 80];
        for (i, word) in w.iter_mut().take(16).enumerate() {
            *word = u32::from_be_bytes([
                chunk[i * 4],
                chunk[i * 4 + 1],
                chunk[i * 4 + 2],
                chunk[i * 4 + 3],
            ]);
        }
        for i in 16..80 {
            w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1);
        }

        let (mut a, mut b, mut c, mut d, mut e) = (h[0], h[1], h[2], h[3], h[4]);
        for (i, &word) in w.iter().enumerate() {
            let (f, k) = match i {
                0..=19 => ((b & c) | (!b & d), 0x5a827999),
                20..=39 => (b ^ c ^ d, 0x6ed9eba1),
                40..=59 => ((b & c) | (b & d) | (c & d), 0x8f1bbcdc),
                _ => (b ^ c ^ d, 0xca62c1d6),
            };
            let temp = a
                .rotate_left(5)
                .wrapping_add(f)
                .wrapping_add(e)
                .wrapping_add(k)
                .wrapping_add(word);
            e = d;
            d = c;
            c = b.rotate_left(30);
            b = a;
            a = temp;
        }

        h[0] = h[0].wrapping_add(a);
        h[1] = h[1].wrapping_add(b);
        h[2] = h[2].wrapping_add(c);
        h[3] = h[3].wrapping_add(d);
        h[4] = h[4].wrapping_add(e);
    }

    let mut digest = [0u8; 20];
    for (i, word) in h.iter().enumerate() {
        digest[i * 4..i * 4 + 4].copy_from_slice(&word.to_be_bytes());
    }
    digest
}

// ---- CRC-32 -------------------------------------------------------------

lazy_static! {
    static ref CRC32_TABLE: [u32; 256] = {
        let mut table = [0u32; 256];
        for (n, entry) in table.iter_mut().enumerate() {
            let mut c = n as u32;
            for _ in 0..8 {
                c = if c & 1 != 0 { 0xedb88320 ^ (c >> 1) } else { c >> 1 };
            }
            *entry = c;
        }
        table
    };
}

pub(crate) fn crc32_of(data: &[u8]) -> u32 {
    let mut crc = 0xffffffffu32;
    for &byte in data {
        crc = CRC32_TABLE[((crc ^ byte as u32) & 0xff) as usize] ^ (crc >> 8);
    }
    !crc
}

// ---- HMAC / PBKDF2 ------------------------------------------------------

#[derive(Clone, Copy, PartialEq)]
enum Algo {
    Md5,
    Sha1,
}

impl Algo {
    fn from_name(name: &str) -> Option<Algo> {
        match name.to_ascii_lowercase().as_str() {
            "md5" => Some(Algo::Md5),
            "sha1" => Some(Algo::Sha1),
            _ => None,
        }
    }

    fn digest(&self, data: &[u8]) -> Vec<u8> {
        match self {
            Algo::Md5 => md5_bytes(data).to_vec(),
            Algo::Sha1 => sha1_bytes(data).to_vec(),
        }
    }
}

const HMAC_BLOCK_SIZE: usize = 64;

fn hmac_bytes(algo: Algo, key: &[u8], message: &[u8]) -> Vec<u8> {
    let mut key_block = if key.len() > HMAC_BLOCK_SIZE {
        algo.digest(key)
    } else {
        key.to_vec()
    };
    key_block.resize(HMAC_BLOCK_SIZE, 0);

    let mut inner: Vec<u8> = key_block.iter().map(|b| b ^ 0x36).collect();
    inner.extend_from_slice(message);
    let inner_digest = algo.digest(&inner);

    let mut outer: Vec<u8> = key_block.iter().map(|b| b ^ 0x5c).collect();
    outer.extend_from_slice(&inner_digest);
    algo.digest(&outer)
}

fn pbkdf2_bytes(algo: Algo, password: &[u8], salt: &[u8], iterations: u32, length: usize) -> Vec<u8> {
    let digest_len = algo.digest(&[]).len();
    let blocks = length.div_ceil(digest_len);
    let mut derived = Vec::with_capacity(blocks * digest_len);

    for block in 1..=blocks as u32 {
        let mut salted = salt.to_vec();
        salted.extend_from_slice(&block.to_be_bytes());
        let mut u = hmac_bytes(algo, password, &salted);
        let mut f = u.clone();
        for _ in 1..iterations {
            u = hmac_bytes(algo, password, &u);
            for (acc, byte) in f.iter_mut().zip(&u) {
                *acc ^= byte;
            }
        }
        derived.extend_from_slice(&f);
    }
    derived.truncate(length);
    derived
}

// ---- Builtin surface ----------------------------------------------------

/// md5 - Calculate the md5 hash of a string
pub fn md5(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "md5", 1)?.to_string_val();
    Ok(Value::String(to_hex(&md5_bytes(s.as_bytes()))))
}

/// sha1 - Calculate the sha1 hash of a string
pub fn sha1(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "sha1", 1)?.to_string_val();
    Ok(Value::String(to_hex(&sha1_bytes(s.as_bytes()))))
}

/// crc32 - Calculate the crc32 polynomial of a string
pub fn crc32(args: &[Value]) -> Result<Value, VmError> {
    let s = arg(args, 0, "crc32", 1)?.to_string_val();
    Ok(Value::Integer(crc32_of(s.as_bytes()) as i64))
}

/// hash - Generate a hash value by algorithm name
pub fn hash(args: &[Value]) -> Result<Value, VmError> {
    let algo_name = arg(args, 0, "hash", 2)?.to_string_val();
    let data = arg(args, 1, "hash", 2)?.to_string_val();
    if algo_name.eq_ignore_ascii_case("crc32b") {
        return Ok(Value::String(format!("{:08x}", crc32_of(data.as_bytes()))));
    }
    let algo = Algo::from_name(&algo_name).ok_or_else(|| {
        VmError::InvalidArgument(format!("hash(): Unknown hashing algorithm: \"{}\"", algo_name))
    })?;
    Ok(Value::String(to_hex(&algo.digest(data.as_bytes()))))
}

/// hash_hmac - Keyed hash value using the HMAC method
pub fn hash_hmac(args: &[Value]) -> Result<Value, VmError> {
    let algo_name = arg(args, 0, "hash_hmac", 3)?.to_string_val();
    let data = arg(args, 1, "hash_hmac", 3)?.to_string_val();
    let key = arg(args, 2, "hash_hmac", 3)?.to_string_val();
    let algo = Algo::from_name(&algo_name).ok_or_else(|| {
        VmError::InvalidArgument(format!(
            "hash_hmac(): Unknown hashing algorithm: \"{}\"",
            algo_name
        ))
    })?;
    Ok(Value::String(to_hex(&hmac_bytes(
        algo,
        key.as_bytes(),
        data.as_bytes(),
    ))))
}

/// hash_pbkdf2 - PBKDF2 key derivation
pub fn hash_pbkdf2(args: &[Value]) -> Result<Value, VmError> {
    let algo_name = arg(args, 0, "hash_pbkdf2", 4)?.to_string_val();
    let password = arg(args, 1, "hash_pbkdf2", 4)?.to_string_val();
    let salt = arg(args, 2, "hash_pbkdf2", 4)?.to_string_val();
    let iterations = arg(args, 3, "hash_pbkdf2", 4)?.to_int();
    let length = args.get(4).map(|v| v.to_int()).unwrap_or(0);

    if iterations <= 0 {
        return Err(VmError::InvalidArgument(
            "hash_pbkdf2(): Argument #4 ($iterations) must be greater than 0".to_string(),
        ));
    }
    let algo = Algo::from_name(&algo_name).ok_or_else(|| {
        VmError::InvalidArgument(format!(
            "hash_pbkdf2(): Unknown hashing algorithm: \"{}\"",
            algo_name
        ))
    })?;
    let digest_len = algo.digest(&[]).len();
    let byte_len = if length > 0 {
        (length as usize).div_ceil(2)
    } else {
        digest_len
    };
    let derived = pbkdf2_bytes(
        algo,
        password.as_bytes(),
        salt.as_bytes(),
        iterations as u32,
        byte_len,
    );
    let mut hex = to_hex(&derived);
    if length > 0 {
        hex.truncate(length as usize);
    }
    Ok(Value::String(hex))
}
