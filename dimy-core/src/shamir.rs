//! Block-wise Shamir secret sharing (spec.md §4.3).
//!
//! The underlying primitive operates on exactly one 16-byte block at a time,
//! via polynomial evaluation/interpolation over `GF(2^128)` — grounded on
//! `examples/original_source/sss.py`'s block-wise wrapper for the outer
//! shape, and on `other_examples/06815f84_avahowell-rust-shamir` for the
//! `GfOps`-module-plus-typed-share style (a `GF(2^8)` analogue of the same
//! scheme). The reduction polynomial `x^128 + x^7 + x^2 + x + 1` matches the
//! one common 128-bit Shamir implementations use; this module only promises
//! internal round-trip correctness, not byte-identical shares with any
//! particular external library (spec.md §4.3 treats that as a suggestion,
//! not a requirement).

use rand::RngCore;
use thiserror::Error;
use zeroize::Zeroize;

use dimy_types::constants::SHAMIR_BLOCK_SIZE;

/// Errors raised while splitting or combining shares (spec.md §4.3, §7).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ShamirError {
    /// A secret or share's length wasn't a multiple of
    /// [`SHAMIR_BLOCK_SIZE`].
    #[error("length {0} is not a multiple of the {SHAMIR_BLOCK_SIZE}-byte block size")]
    NotMultipleOfBlock(usize),
    /// The shares handed to [`combine`] didn't all have the same length.
    #[error("shares have inconsistent lengths")]
    InconsistentShareLengths,
    /// `k` or `n` fell outside `2 ..= 16`, or `k > n`.
    #[error("invalid threshold: k={k}, n={n}")]
    InvalidThreshold {
        /// The requested threshold.
        k: u8,
        /// The requested share count.
        n: u8,
    },
}

/// `GF(2^128)` arithmetic, reduced modulo `x^128 + x^7 + x^2 + x + 1`.
mod gf128 {
    /// Carry-less multiplication of two field elements, reduced mod the
    /// field polynomial.
    pub fn mul(mut a: u128, mut b: u128) -> u128 {
        let mut result: u128 = 0;
        while b != 0 {
            if b & 1 != 0 {
                result ^= a;
            }
            let carry = a & (1 << 127) != 0;
            a <<= 1;
            if carry {
                // Reduce by the field polynomial x^128 + x^7 + x^2 + x + 1.
                a ^= 0x87;
            }
            b >>= 1;
        }
        result
    }

    /// Multiplicative inverse via Fermat's little theorem: every nonzero
    /// element satisfies `a^(2^128 - 1) = 1`, so `a^-1 = a^(2^128 - 2)`.
    pub fn inv(a: u128) -> u128 {
        assert!(a != 0, "cannot invert zero in GF(2^128)");
        let mut result: u128 = 1;
        let mut base = a;
        // exponent = 2^128 - 2 = 0b111...110 (127 ones followed by a zero).
        for bit in 1..128 {
            base = mul(base, base);
            if bit != 127 {
                result = mul(result, base);
            }
        }
        result
    }

    pub fn add(a: u128, b: u128) -> u128 {
        a ^ b
    }
}

/// A single reconstructible point on a degree-`(k-1)` polynomial over
/// `GF(2^128)`, evaluated for one 16-byte block.
#[derive(Clone, Zeroize)]
#[zeroize(drop)]
struct BlockShare {
    x: u8,
    y: u128,
}

fn block_to_u128(block: &[u8]) -> u128 {
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(block);
    u128::from_le_bytes(bytes)
}

fn u128_to_block(value: u128) -> [u8; 16] {
    value.to_le_bytes()
}

/// Splits one 16-byte block into `n` shares, any `k` of which reconstruct
/// it, by evaluating a random degree-`(k-1)` polynomial with constant term
/// `secret` at `x = 1 ..= n`.
fn split_block(
    secret: u128,
    k: u8,
    n: u8,
    rng: &mut impl RngCore,
) -> Vec<BlockShare> {
    let mut coefficients = vec![secret];
    for _ in 1..k {
        let mut buf = [0u8; 16];
        rng.fill_bytes(&mut buf);
        coefficients.push(u128::from_le_bytes(buf));
    }
    (1..=n)
        .map(|x| {
            let y = eval_polynomial(&coefficients, x);
            BlockShare { x, y }
        })
        .collect()
}

fn eval_polynomial(coefficients: &[u128], x: u8) -> u128 {
    // Horner's method, highest-degree coefficient first.
    let mut acc = 0u128;
    for coefficient in coefficients.iter().rev() {
        acc = gf128::add(gf128::mul(acc, x as u128), *coefficient);
    }
    acc
}

/// Reconstructs the constant term of the interpolating polynomial through
/// `points` via Lagrange interpolation at `x = 0`.
fn combine_block(points: &[BlockShare]) -> u128 {
    let mut secret = 0u128;
    for (i, pi) in points.iter().enumerate() {
        let mut numerator = 1u128;
        let mut denominator = 1u128;
        for (j, pj) in points.iter().enumerate() {
            if i == j {
                continue;
            }
            // Evaluating at x=0: numerator *= (0 - x_j) = x_j (char. 2).
            numerator = gf128::mul(numerator, pj.x as u128);
            denominator = gf128::mul(denominator, gf128::add(pi.x as u128, pj.x as u128));
        }
        let term = gf128::mul(pi.y, gf128::mul(numerator, gf128::inv(denominator)));
        secret = gf128::add(secret, term);
    }
    secret
}

fn check_threshold(k: u8, n: u8) -> Result<(), ShamirError> {
    if k < 2 || n < k || n > 16 {
        return Err(ShamirError::InvalidThreshold { k, n });
    }
    Ok(())
}

/// Splits `secret` (any multiple-of-16-byte length) into `n` shares of the
/// same overall length, `k` of which reconstruct it.
///
/// # Errors
/// Returns [`ShamirError::NotMultipleOfBlock`] if `secret.len()` isn't a
/// multiple of [`SHAMIR_BLOCK_SIZE`], or [`ShamirError::InvalidThreshold`] if
/// `k`/`n` are out of range.
pub fn split(
    secret: &[u8],
    k: u8,
    n: u8,
    rng: &mut impl RngCore,
) -> Result<Vec<Vec<u8>>, ShamirError> {
    check_threshold(k, n)?;
    if secret.len() % SHAMIR_BLOCK_SIZE != 0 {
        return Err(ShamirError::NotMultipleOfBlock(secret.len()));
    }
    let mut shares = vec![Vec::with_capacity(secret.len()); n as usize];
    for block in secret.chunks(SHAMIR_BLOCK_SIZE) {
        let block_shares = split_block(block_to_u128(block), k, n, rng);
        for (share, block_share) in shares.iter_mut().zip(block_shares.iter()) {
            share.extend_from_slice(&u128_to_block(block_share.y));
        }
    }
    Ok(shares)
}

/// Reconstructs the original secret from `k`-or-more `(index, payload)`
/// shares produced by [`split`].
///
/// # Errors
/// Returns [`ShamirError::NotMultipleOfBlock`] if a payload's length isn't a
/// multiple of [`SHAMIR_BLOCK_SIZE`], or
/// [`ShamirError::InconsistentShareLengths`] if the payloads don't all share
/// the same length.
pub fn combine(shares: &[(u8, &[u8])]) -> Result<Vec<u8>, ShamirError> {
    let Some((_, first)) = shares.first() else {
        return Ok(Vec::new());
    };
    let len = first.len();
    if len % SHAMIR_BLOCK_SIZE != 0 {
        return Err(ShamirError::NotMultipleOfBlock(len));
    }
    if shares.iter().any(|(_, payload)| payload.len() != len) {
        return Err(ShamirError::InconsistentShareLengths);
    }

    let blocks = len / SHAMIR_BLOCK_SIZE;
    let mut secret = Vec::with_capacity(len);
    for block_idx in 0..blocks {
        let offset = block_idx * SHAMIR_BLOCK_SIZE;
        let points: Vec<BlockShare> = shares
            .iter()
            .map(|(index, payload)| BlockShare {
                x: *index,
                y: block_to_u128(&payload[offset..offset + SHAMIR_BLOCK_SIZE]),
            })
            .collect();
        secret.extend_from_slice(&u128_to_block(combine_block(&points)));
    }
    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn rng() -> ChaCha20Rng {
        ChaCha20Rng::seed_from_u64(7)
    }

    #[test]
    fn gf128_inverse_round_trips() {
        for a in [1u128, 2, 3, 0xdead_beef, u128::MAX] {
            let inv = gf128::inv(a);
            assert_eq!(gf128::mul(a, inv), 1);
        }
    }

    #[test]
    fn round_trips_for_every_k_subset() {
        let secret = b"thirty-two-byte-secret-value!!!!";
        assert_eq!(secret.len(), 32);
        let mut rng = rng();
        let (k, n) = (3u8, 5u8);
        let shares = split(secret, k, n, &mut rng).expect("split succeeds");

        // Every k-sized subset of the n shares reconstructs the secret.
        let indices: Vec<u8> = (1..=n).collect();
        for combo in combinations(&indices, k as usize) {
            let subset: Vec<(u8, &[u8])> = combo
                .iter()
                .map(|&idx| (idx, shares[(idx - 1) as usize].as_slice()))
                .collect();
            let recovered = combine(&subset).expect("combine succeeds");
            assert_eq!(recovered, secret);
        }
    }

    #[test]
    fn rejects_non_block_aligned_secret() {
        let mut rng = rng();
        let err = split(b"not sixteen", 2, 3, &mut rng).unwrap_err();
        assert!(matches!(err, ShamirError::NotMultipleOfBlock(_)));
    }

    #[test]
    fn rejects_inconsistent_share_lengths() {
        let shares: Vec<(u8, &[u8])> = vec![(1, &[0u8; 16]), (2, &[0u8; 32])];
        let err = combine(&shares).unwrap_err();
        assert_eq!(err, ShamirError::InconsistentShareLengths);
    }

    #[test]
    fn rejects_invalid_threshold() {
        let mut rng = rng();
        assert!(matches!(
            split(&[0u8; 16], 1, 5, &mut rng),
            Err(ShamirError::InvalidThreshold { .. })
        ));
        assert!(matches!(
            split(&[0u8; 16], 5, 3, &mut rng),
            Err(ShamirError::InvalidThreshold { .. })
        ));
    }

    fn combinations(items: &[u8], k: usize) -> Vec<Vec<u8>> {
        if k == 0 {
            return vec![Vec::new()];
        }
        let Some((&first, rest)) = items.split_first() else {
            return Vec::new();
        };
        let mut result = Vec::new();
        for mut tail in combinations(rest, k - 1) {
            tail.insert(0, first);
            result.push(tail);
        }
        result.extend(combinations(rest, k));
        result
    }
}
