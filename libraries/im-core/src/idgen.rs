//! Opaque, roughly time-ordered identifier generation.
//!
//! Raw identifiers follow the sonyflake layout:
//!
//! ```text
//! | 39 bits: 10ms ticks since 2019-01-01 | 8 bits: sequence | 16 bits: machine |
//! ```
//!
//! The raw value is passed through an invertible 64-bit mix and written as a
//! fixed-width base62 string behind a caller supplied prefix. The alphabet
//! never contains `.`, so every generated id is a valid group path segment.

use std::{
    sync::{Mutex, OnceLock, PoisonError},
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use rand::{
    distributions::{Distribution, Uniform},
    rngs::OsRng,
};

/// Custom epoch: 2019-01-01 00:00:00 UTC, in milliseconds since the Unix epoch.
const EPOCH_MS: u64 = 1_546_300_800_000;

/// Length of one tick in milliseconds.
const TICK_MS: u64 = 10;

const TIME_BITS: u32 = 39;
const SEQUENCE_BITS: u32 = 8;
const MACHINE_BITS: u32 = 16;

const TIME_MASK: u64 = (1 << TIME_BITS) - 1;
const SEQUENCE_MASK: u64 = (1 << SEQUENCE_BITS) - 1;
const MACHINE_MASK: u64 = (1 << MACHINE_BITS) - 1;

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Width of the encoded body. 62^11 exceeds 2^64.
const ENCODED_LEN: usize = 11;

const MIX_A: u64 = 0x9E37_79B9_7F4A_7C15;
const MIX_B: u64 = 0xC2B2_AE3D_27D4_EB4F;
const MIX_A_INV: u64 = mod_inverse(MIX_A);
const MIX_B_INV: u64 = mod_inverse(MIX_B);

struct GeneratorState {
    elapsed: u64,
    sequence: u64,
}

impl GeneratorState {
    /// Claim the next `(elapsed, sequence)` slot at tick `now`.
    ///
    /// Once the sequence for the current tick is used up, returns the number
    /// of ticks to wait before retrying.
    fn claim(&mut self, now: u64) -> Result<(u64, u64), u64> {
        if now > self.elapsed {
            self.elapsed = now;
            self.sequence = 0;
        } else if self.sequence < SEQUENCE_MASK {
            self.sequence += 1;
        } else {
            return Err(self.elapsed + 1 - now);
        }
        Ok((self.elapsed, self.sequence))
    }
}

static STATE: Mutex<GeneratorState> = Mutex::new(GeneratorState {
    elapsed: 0,
    sequence: 0,
});

static MACHINE_ID: OnceLock<u16> = OnceLock::new();

/// Pin the machine id used by this process.
///
/// Returns `false` if a machine id was already fixed, either by an earlier
/// call or by a previously generated identifier.
pub fn set_machine_id(id: u16) -> bool {
    MACHINE_ID.set(id).is_ok()
}

/// The machine id, drawn from OS entropy mixed with the PID unless pinned.
pub fn machine_id() -> u16 {
    *MACHINE_ID.get_or_init(|| {
        let pid = std::process::id() as u16;
        rand::random::<u16>() ^ pid
    })
}

/// Generate a new prefixed identifier.
pub fn new_id(prefix: &str) -> String {
    let raw = next_raw();
    let mut out = String::with_capacity(prefix.len() + ENCODED_LEN);
    out.push_str(prefix);
    out.push_str(&encode(mix(raw)));
    out
}

/// Recover the raw sequence value from an identifier produced by [`new_id`].
pub fn decode_id(prefix: &str, id: &str) -> Option<u64> {
    let body = id.strip_prefix(prefix)?;
    decode(body).map(unmix)
}

/// Split a raw value into `(ticks, sequence, machine)`.
pub fn decompose(raw: u64) -> (u64, u64, u64) {
    (
        (raw >> (SEQUENCE_BITS + MACHINE_BITS)) & TIME_MASK,
        (raw >> MACHINE_BITS) & SEQUENCE_MASK,
        raw & MACHINE_MASK,
    )
}

/// Random alphanumeric string from the OS CSPRNG.
pub fn new_secret(length: usize) -> String {
    let dist = Uniform::from(0..ALPHABET.len());
    (0..length)
        .map(|_| char::from(ALPHABET[dist.sample(&mut OsRng)]))
        .collect()
}

fn current_ticks() -> u64 {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis() as u64);
    now_ms.saturating_sub(EPOCH_MS) / TICK_MS
}

/// Next raw sonyflake value.
///
/// The mutex is only held to claim a slot. When a tick's sequence runs out
/// the calling thread sleeps without the lock, for at most one tick unless
/// the wall clock stepped back.
fn next_raw() -> u64 {
    let machine = u64::from(machine_id());
    loop {
        let claimed = STATE
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .claim(current_ticks());
        match claimed {
            Ok((elapsed, sequence)) => {
                return ((elapsed & TIME_MASK) << (SEQUENCE_BITS + MACHINE_BITS))
                    | (sequence << MACHINE_BITS)
                    | machine;
            }
            Err(ticks) => std::thread::sleep(Duration::from_millis(ticks * TICK_MS)),
        }
    }
}

const fn mod_inverse(odd: u64) -> u64 {
    // Newton iteration doubles the correct low bits each round
    let mut inv = odd;
    let mut i = 0;
    while i < 6 {
        inv = inv.wrapping_mul(2u64.wrapping_sub(odd.wrapping_mul(inv)));
        i += 1;
    }
    inv
}

fn mix(mut x: u64) -> u64 {
    x = x.wrapping_mul(MIX_A);
    x ^= x >> 32;
    x.wrapping_mul(MIX_B)
}

fn unmix(mut x: u64) -> u64 {
    x = x.wrapping_mul(MIX_B_INV);
    x ^= x >> 32;
    x.wrapping_mul(MIX_A_INV)
}

fn encode(mut x: u64) -> String {
    let mut buf = [b'0'; ENCODED_LEN];
    for slot in buf.iter_mut().rev() {
        *slot = ALPHABET[(x % 62) as usize];
        x /= 62;
    }
    buf.iter().map(|&b| char::from(b)).collect()
}

fn decode(body: &str) -> Option<u64> {
    if body.len() != ENCODED_LEN {
        return None;
    }
    body.bytes().try_fold(0u64, |acc, b| {
        let digit = ALPHABET.iter().position(|&c| c == b)? as u64;
        acc.checked_mul(62)?.checked_add(digit)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn mix_is_invertible() {
        for raw in [0, 1, 42, u64::MAX, 0x1234_5678_9ABC_DEF0] {
            assert_eq!(unmix(mix(raw)), raw);
        }
        assert_eq!(MIX_A.wrapping_mul(MIX_A_INV), 1);
        assert_eq!(MIX_B.wrapping_mul(MIX_B_INV), 1);
    }

    #[test]
    fn encoded_ids_decode_back_to_increasing_raw_values() {
        let a = new_id("usr-");
        let b = new_id("usr-");
        let raw_a = decode_id("usr-", &a).expect("decode a");
        let raw_b = decode_id("usr-", &b).expect("decode b");
        assert!(raw_b > raw_a);
        assert_eq!(decompose(raw_a).2, u64::from(machine_id()));
    }

    #[test]
    fn ids_are_fixed_width_and_path_safe() {
        let id = new_id("grp-");
        assert_eq!(id.len(), "grp-".len() + ENCODED_LEN);
        assert!(!id.contains('.'));
        assert!(id["grp-".len()..].bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn ids_do_not_repeat_under_burst() {
        let ids: HashSet<String> = (0..2_000).map(|_| new_id("ugb-")).collect();
        assert_eq!(ids.len(), 2_000);
    }

    #[test]
    fn exhausted_sequence_waits_for_the_next_tick() {
        let mut state = GeneratorState {
            elapsed: 0,
            sequence: 0,
        };
        assert_eq!(state.claim(100), Ok((100, 0)));
        for sequence in 1..=SEQUENCE_MASK {
            assert_eq!(state.claim(100), Ok((100, sequence)));
        }
        assert_eq!(state.claim(100), Err(1));
        // Clock stepped back two ticks
        assert_eq!(state.claim(98), Err(3));
        assert_eq!(state.claim(101), Ok((101, 0)));
    }

    #[test]
    fn concurrent_bursts_stay_unique() {
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| (0..600).map(|_| new_id("ugb-")).collect::<Vec<_>>()))
            .collect();
        let ids: HashSet<String> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("generator thread"))
            .collect();
        assert_eq!(ids.len(), 2_400);
    }

    #[test]
    fn decode_rejects_foreign_strings() {
        assert_eq!(decode_id("usr-", "grp-00000000000"), None);
        assert_eq!(decode_id("usr-", "usr-short"), None);
        assert_eq!(decode_id("usr-", "usr-0000000000."), None);
        // Larger than u64::MAX
        assert_eq!(decode_id("usr-", "usr-zzzzzzzzzzz"), None);
    }

    #[test]
    fn secrets_use_the_alphanumeric_alphabet() {
        let secret = new_secret(32);
        assert_eq!(secret.len(), 32);
        assert!(secret.bytes().all(|b| b.is_ascii_alphanumeric()));
        assert_ne!(new_secret(32), secret);
    }
}
