//! Range (arithmetic) coder over the bit buffer.
//!
//! The coder state is an interval `[min, max)` inside `[0, 2^PREC_INTER]`
//! plus an underflow counter for intervals straddling the half line. The
//! encoder and decoder must issue the same sequence of calls: each call
//! stamps a lock on the buffer (`PREC_INTER + pending` bits ahead on the
//! write side, `PREC_INTER` on the read side, which coincide because
//! pending bits are exactly the ones not yet flushed), and the
//! constant-weight codec derives its reserved-tail decision from that
//! lock on both sides.

use crate::bitbuf::{BitReader, BitWriter};

pub(crate) const PREC_TOTAL: u32 = 32;
pub(crate) const PREC_INTER: u32 = 2 * PREC_TOTAL / 3;
pub(crate) const PREC_PROBA: u32 = PREC_TOTAL - PREC_INTER;

const TOP: u64 = 1 << PREC_INTER;
const HALF: u64 = 1 << (PREC_INTER - 1);


/// Cumulative distribution for one tree node: symbol `i` in
/// `[min, max]` occupies `[prob[i - min], prob[i + 1 - min])` out of
/// `2^PREC_PROBA`, with the top bound of the last symbol implicit.
#[derive(Clone, Debug, Default)]
pub(crate) struct Distribution {
    pub(crate) min: u32,
    pub(crate) max: u32,
    pub(crate) prob: Vec<u32>,
}

impl Distribution {
    #[inline]
    fn proba(&self, i: u32) -> u64 {
        u64::from(self.prob[(i - self.min) as usize])
    }
}

/// Largest `a` with `prob[a] <= x`, by dichotomy.
fn search(x: u64, prob: &[u32]) -> u32 {
    let (mut lo, mut hi) = (0usize, prob.len());
    while hi - lo > 1 {
        let mid = (lo + hi) / 2;
        if u64::from(prob[mid]) > x {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    lo as u32
}

#[inline]
fn bitlen(x: u64) -> u32 {
    64 - x.leading_zeros()
}


/// Coder state shared by both directions.
pub(crate) struct Coder {
    pub(crate) min: u64,
    pub(crate) max: u64,
    pub(crate) pending: u32,
}

impl Coder {
    pub(crate) fn new() -> Self {
        Coder { min: 0, max: TOP, pending: 0 }
    }

    /// Renormalize after an interval update; emits bits when encoding.
    /// Returns the shift amount, which is also the number of stream bits
    /// this step accounts for.
    fn adjust(&mut self, out: Option<&mut BitWriter>) -> u32 {
        debug_assert!(self.max > self.min);
        // leading bits common to every element of [min, max)
        let mut i = PREC_INTER - bitlen((self.max - 1) ^ self.min);
        // 2^(PREC_INTER-j-1) <= (max-1) - min < 2^(PREC_INTER-j)
        let j = PREC_INTER - bitlen(self.max - 1 - self.min) - 1;
        // never write more bits than the interval can absorb
        if i > j {
            i = j;
        }
        if i > 0 {
            if let Some(out) = out {
                let top_bit = self.min >> (PREC_INTER - 1);
                self.min &= !HALF;
                out.write_bit(top_bit);
                out.write_bits(1 - top_bit, self.pending);
                out.write(self.min >> (PREC_INTER - i), i - 1);
            }
            self.pending = 0;
        }
        self.max = (self.max << j) & (TOP - 1);
        if self.max == 0 {
            self.max = TOP;
        }
        self.min = (self.min << j) & (TOP - 1);
        if j > i {
            // straddle around the half line
            self.max ^= HALF;
            self.min ^= HALF;
            self.pending += j - i;
        }
        j
    }

    /// Encode symbol `sym` against `d`; returns the emitted bit count.
    pub(crate) fn encode(&mut self, sym: u32, d: &Distribution, out: &mut BitWriter) -> u32 {
        let delta = self.max - self.min;
        out.lock_ahead((PREC_INTER + self.pending) as usize);
        if sym < d.max {
            self.max = self.min + ((d.proba(sym + 1) * delta) >> PREC_PROBA);
        }
        self.min += (d.proba(sym) * delta) >> PREC_PROBA;
        self.adjust(Some(out))
    }

    /// Encode `i` uniform over `[0, n)`; returns the emitted bit count.
    pub(crate) fn encode_uniform(&mut self, i: u64, n: u64, out: &mut BitWriter) -> u32 {
        debug_assert!(i < n);
        if n == 1 {
            // a one-symbol alphabet carries nothing and must not touch the
            // interval (the renormalization shift would go negative)
            return 0;
        }
        let delta = self.max - self.min;
        out.lock_ahead((PREC_INTER + self.pending) as usize);
        let x = i * delta;
        self.max = self.min + (x + delta) / n;
        self.min += x / n;
        self.adjust(Some(out))
    }

    /// Decode one symbol against `d`; returns (symbol, consumed bits).
    pub(crate) fn decode(&mut self, d: &Distribution, input: &mut BitReader) -> (u32, u32) {
        let delta = self.max - self.min;
        let mut v = input.look(PREC_INTER);
        if self.pending > 0 {
            v ^= HALF;
        }
        input.lock_ahead(PREC_INTER as usize);

        debug_assert!(v >= self.min && v < self.max);
        let x = ((v - self.min) << PREC_PROBA) / delta;
        let mut sym = d.min + search(x, &d.prob);

        if sym < d.max {
            let up = self.min + ((d.proba(sym + 1) * delta) >> PREC_PROBA);
            if v >= up {
                // the truncated multiply pushed the boundary below v
                sym += 1;
                if sym < d.max {
                    self.max = self.min + ((d.proba(sym + 1) * delta) >> PREC_PROBA);
                }
            } else {
                self.max = up;
            }
        }
        self.min += (d.proba(sym) * delta) >> PREC_PROBA;

        let r = self.adjust(None);
        input.step(r);
        (sym, r)
    }

    /// Decode a symbol uniform over `[0, n)`; returns (value, consumed).
    pub(crate) fn decode_uniform(&mut self, n: u64, input: &mut BitReader) -> (u64, u32) {
        if n == 1 {
            return (0, 0);
        }
        let delta = self.max - self.min;
        let mut v = input.look(PREC_INTER);
        if self.pending > 0 {
            v ^= HALF;
        }
        input.lock_ahead(PREC_INTER as usize);

        debug_assert!(v >= self.min && v < self.max);
        let mut i = (v - self.min) * n / delta;
        let mut x = i * delta;
        self.max = self.min + (x + delta) / n;
        if v >= self.max {
            i += 1;
            x += delta;
            self.max = self.min + (x + delta) / n;
        }
        self.min += x / n;

        let r = self.adjust(None);
        input.step(r);
        (i, r)
    }

    /// Flush the encoder: one bit pins the final interval, plus the
    /// outstanding underflow bits. The decoder never reads these — their
    /// values are implied by its final state — but they occupy stream
    /// positions that count toward the coded length.
    pub(crate) fn finish(&mut self, out: &mut BitWriter) {
        if self.min == 0 {
            out.write_bit(0);
        } else {
            out.write_bit(1);
            out.write_bits(0, self.pending);
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn dist(widths: &[u32]) -> Distribution {
        // cumulative lower bounds from explicit widths summing to 2^11
        debug_assert_eq!(widths.iter().sum::<u32>(), 1 << PREC_PROBA);
        let mut prob = vec![0u32];
        for &w in &widths[..widths.len() - 1] {
            prob.push(prob.last().unwrap() + w);
        }
        Distribution { min: 0, max: widths.len() as u32 - 1, prob }
    }

    #[test]
    fn symbol_round_trip() {
        let d = dist(&[700, 600, 400, 200, 100, 48]);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let syms: Vec<u32> = (0..100).map(|_| rng.gen_range(0..6)).collect();
            let mut enc = Coder::new();
            let mut w = BitWriter::new(vec![0u8; 256], 2048);
            let mut written = 0;
            for &s in &syms {
                written += enc.encode(s, &d, &mut w);
            }
            enc.finish(&mut w);
            written += 1;

            let bytes = w.into_bytes();
            let mut dec = Coder::new();
            let mut r = BitReader::new(&bytes, 2048);
            let mut consumed = 0;
            for &s in &syms {
                let (got, n) = dec.decode(&d, &mut r);
                assert_eq!(got, s);
                consumed += n;
            }
            consumed += 1;
            assert_eq!(written, consumed);
        }
    }

    #[test]
    fn uniform_round_trip() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(4);
        for _ in 0..200 {
            let draws: Vec<(u64, u64)> = (0..80)
                .map(|_| {
                    let n = rng.gen_range(2..2000u64);
                    (rng.gen_range(0..n), n)
                })
                .collect();
            let mut enc = Coder::new();
            let mut w = BitWriter::new(vec![0u8; 512], 4096);
            for &(i, n) in &draws {
                enc.encode_uniform(i, n, &mut w);
            }
            enc.finish(&mut w);

            let bytes = w.into_bytes();
            let mut dec = Coder::new();
            let mut r = BitReader::new(&bytes, 4096);
            for &(i, n) in &draws {
                let (got, _) = dec.decode_uniform(n, &mut r);
                assert_eq!(got, i);
            }
        }
    }

    #[test]
    fn mixed_streams_stay_in_lockstep() {
        // interleave distribution symbols and uniform draws, then check
        // the locks land at identical offsets on both sides
        let d = dist(&[768, 768, 256, 256]);
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(9);
        for _ in 0..100 {
            let script: Vec<(bool, u64)> = (0..60)
                .map(|_| {
                    if rng.gen::<bool>() {
                        (true, u64::from(rng.gen_range(0..4u32)))
                    } else {
                        (false, rng.gen_range(0..37u64))
                    }
                })
                .collect();
            let mut enc = Coder::new();
            let mut w = BitWriter::new(vec![0u8; 256], 2048);
            for &(is_sym, v) in &script {
                if is_sym {
                    enc.encode(v as u32, &d, &mut w);
                } else {
                    enc.encode_uniform(v, 37, &mut w);
                }
            }
            let w_unlocked = w.unlocked();
            enc.finish(&mut w);

            let bytes = w.into_bytes();
            let mut dec = Coder::new();
            let mut r = BitReader::new(&bytes, 2048);
            for &(is_sym, v) in &script {
                if is_sym {
                    let (got, _) = dec.decode(&d, &mut r);
                    assert_eq!(got, v as u32);
                } else {
                    let (got, _) = dec.decode_uniform(37, &mut r);
                    assert_eq!(got, v);
                }
            }
            assert_eq!(w_unlocked, r.unlocked());
        }
    }
}
