//! Identifier generation for new persons and marriages.
//!
//! Ids only need to be unique in practice and comparable as strings. The
//! browser host uses short random base-36 tokens; collisions are not checked.

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Length of the tokens produced by [`RandomIds`].
pub const RANDOM_ID_LEN: usize = 9;

/// Source of fresh entity ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

/// Random base-36 tokens drawn from `Math.random()`.
///
/// Only usable where a JS host is present (wasm32 in a browser or Node).
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl RandomIds {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> String {
        base36_token(RANDOM_ID_LEN, js_sys::Math::random)
    }
}

/// Deterministic ids of the form `{prefix}{n}`.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Build a token of `len` base-36 digits from a uniform `[0, 1)` source.
pub(crate) fn base36_token(len: usize, mut random: impl FnMut() -> f64) -> String {
    (0..len)
        .map(|_| {
            let digit = ((random() * 36.0) as usize).min(35);
            BASE36[digit] as char
        })
        .collect()
}
