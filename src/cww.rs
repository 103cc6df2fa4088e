//! Constant-weight-word codec: a bit-exact bijection between binary
//! strings and words of length 2^m with Hamming weight t.
//!
//! `b2cw` runs the arithmetic DECODER over the message bits, walking the
//! position tree and materializing a weight-t word; `cw2b` re-encodes a
//! word back into the bits that produce it. Leaf subproblems are coded by
//! combinatorial index; the raw low bits of each index land in a reserved
//! region at the buffer tail when space allows (the "accel" path), and
//! are folded through the coder as uniform symbols otherwise. Both sides
//! reach the same accel decision through the buffer lock the coder
//! maintains, so the decision never needs to be transmitted.
//!
//! The public bit convention is LSB-first within each byte; the internal
//! buffer is MSB-first. Partial boundary bytes are shifted on a local
//! copy so the internal stream sees exactly the external bit range.

use crate::arith::{Coder, PREC_PROBA};
use crate::bitbuf::{BitReader, BitWriter};
use crate::error::Error;
use crate::helpers::{ensure, lsb_ones};
use crate::precomp::{binomial, is_leaf, Precomp};


/// A leaf payload collected during the tree walk, processed after the
/// walk in reverse collection order.
struct Pending {
    /// Slot range start in the output word (decode side).
    start: usize,
    count: u32,
    /// Raw-bit budget; the window log-size for singleton entries.
    width: u32,
    value: u64,
    maximum: u64,
    /// Window base to fold back into decoded offsets.
    pos: u32,
}

/// A complemented window whose membership must be inverted once its
/// sub-decoding is complete.
struct InvFix {
    start: usize,
    count: u32,
    s: u32,
    pos: u32,
}


// ---- combinatorial (de)ranking -------------------------------------------

/// Rank of an ascending window-relative position set, in the
/// lexicographic-descending convention: sum of C(res[k], k+1).
fn cw_rank(rel: &[u32]) -> u64 {
    rel.iter().enumerate().map(|(k, &r)| binomial(u64::from(r), k as u64 + 1)).sum()
}

fn isqrt(v: u64) -> u64 {
    let mut r = (v as f64).sqrt() as u64;
    while (r + 1) * (r + 1) <= v {
        r += 1;
    }
    while r * r > v {
        r -= 1;
    }
    r
}

fn icbrt(v: u64) -> u64 {
    let mut r = (v as f64).cbrt() as u64;
    while (r + 1) * (r + 1) * (r + 1) <= v {
        r += 1;
    }
    while r * r * r > v {
        r -= 1;
    }
    r
}

fn iroot4(v: u64) -> u64 {
    let mut r = (v as f64).sqrt().sqrt() as u64;
    while (r + 1) * (r + 1) * (r + 1) * (r + 1) <= v {
        r += 1;
    }
    while r * r * r * r > v {
        r -= 1;
    }
    r
}

/// Largest r with C(r, t) <= x, for x >= 1. Small weights bracket with an
/// integer k-th root and step-correct; larger ones search dichotomically
/// within the largest window their leaf rule admits.
fn leading_position(x: u64, t: u32) -> u32 {
    let guess = match t {
        1 => return x as u32,
        2 => isqrt(2 * x),
        3 => icbrt(6 * x) + 1,
        4 => iroot4(24 * x) + 1,
        _ => {
            let cap = match t {
                5 => 128u64,
                6 | 7 => 64,
                _ => 32,
            };
            let (mut lo, mut hi) = (u64::from(t) - 1, cap);
            while hi - lo > 1 {
                let mid = (lo + hi) / 2;
                if binomial(mid, u64::from(t)) > x {
                    hi = mid;
                } else {
                    lo = mid;
                }
            }
            return lo as u32;
        }
    };
    let mut r = guess;
    while r > u64::from(t) - 1 && binomial(r, u64::from(t)) > x {
        r -= 1;
    }
    while binomial(r + 1, u64::from(t)) <= x {
        r += 1;
    }
    r as u32
}

/// Inverse of `cw_rank`: the ascending position set of rank `x`.
fn cw_unrank(mut x: u64, count: u32, res: &mut [u32]) {
    let mut t = count;
    while t > 0 {
        if x == 0 {
            for k in 0..t {
                res[k as usize] = k;
            }
            return;
        }
        if t == 1 {
            res[0] = x as u32;
            return;
        }
        let r = leading_position(x, t);
        res[(t - 1) as usize] = r;
        x -= binomial(u64::from(r), u64::from(t));
        t -= 1;
    }
}


// ---- encode: word -> bits ------------------------------------------------

fn encode_rec(
    p: &Precomp, cw: &[u32], s: u32, coder: &mut Coder, out: &mut BitWriter,
    todo: &mut Vec<Pending>,
) -> Result<usize, Error> {
    let i = cw.len() as u32;
    if i == 0 {
        return Ok(0);
    }

    if i > (1 << s) - i {
        // process the sparser complement of this window instead
        let base = cw[0] & (u32::MAX << s);
        let n2 = ((1u32 << s) - i) as usize;
        let mut cw2 = Vec::with_capacity(n2);
        let mut v = base;
        let mut j = 0usize;
        while cw2.len() < n2 && j < cw.len() {
            if cw[j] == v {
                j += 1;
            } else {
                cw2.push(v);
            }
            v += 1;
        }
        while cw2.len() < n2 {
            cw2.push(v);
            v += 1;
        }
        return encode_rec(p, &cw2, s, coder, out, todo);
    }

    if i == 1 {
        todo.push(Pending {
            start: 0,
            count: 1,
            width: s,
            value: u64::from(cw[0]) & lsb_ones(s),
            maximum: 1u64 << s,
            pos: 0,
        });
        return Ok(0);
    }

    if is_leaf(s, i) {
        let mask = lsb_ones(s) as u32;
        let rel: Vec<u32> = cw.iter().map(|&x| x & mask).collect();
        let info = p.leaf_info(s, i);
        let value = cw_rank(&rel);
        // indices in the floor-truncated sliver of the binomial are not in
        // the codec image and cannot be represented
        ensure!(value >> info.deadbits < info.maximum, Error::CwwShortBuffer);
        todo.push(Pending {
            start: 0,
            count: i,
            width: info.deadbits,
            value,
            maximum: info.maximum,
            pos: 0,
        });
        return Ok(0);
    }

    let l = cw.iter().take_while(|&&x| x & (1 << (s - 1)) == 0).count();
    let d = p.distribution(s, i);
    // a split that quantized to zero width is outside the codec image
    let hi = if (l as u32) < i { d.prob[l + 1] } else { 1 << PREC_PROBA };
    ensure!(hi > d.prob[l], Error::CwwShortBuffer);
    let mut r = coder.encode(l as u32, d, out) as usize;
    r += encode_rec(p, &cw[..l], s - 1, coder, out, todo)?;
    r += encode_rec(p, &cw[l..], s - 1, coder, out, todo)?;
    Ok(r)
}

/// Encode a full tree word; returns the number of stream bits used.
fn encode_tree(
    p: &Precomp, cw: &[u32], coder: &mut Coder, out: &mut BitWriter,
) -> Result<usize, Error> {
    let mut todo = Vec::new();
    let mut r = encode_rec(p, cw, p.m, coder, out, &mut todo)?;

    let reserved: usize = todo.iter().map(|l| l.width as usize).sum();
    // both sides must take the same branch; the coder lock guarantees the
    // operand here matches the decoder's
    let accel = out.unlocked() >= reserved as isize;
    if accel {
        out.shift_end(-(reserved as isize));
    }

    for l in todo.iter_mut().rev() {
        if l.count > 1 {
            r += coder.encode_uniform(l.value >> l.width, l.maximum, out) as usize;
            l.value &= lsb_ones(l.width);
        }
    }

    if !accel {
        // no room for a raw tail: fold every payload through the coder
        for l in todo.iter_mut().rev() {
            while l.width > PREC_PROBA {
                l.width -= PREC_PROBA;
                r += coder.encode_uniform(l.value >> l.width, 1 << PREC_PROBA, out) as usize;
                l.value &= lsb_ones(l.width);
            }
            r += coder.encode_uniform(l.value, 1u64 << l.width, out) as usize;
        }
    }

    coder.finish(out);
    r += 1;

    if accel {
        out.shift_end(reserved as isize);
        out.seek(out.fin() - reserved);
        for l in todo.iter().rev() {
            out.write(l.value, l.width);
        }
        r += reserved;
    }
    Ok(r)
}


// ---- decode: bits -> word ------------------------------------------------

#[allow(clippy::too_many_arguments)]
fn decode_rec(
    p: &Precomp, off: usize, i: u32, s: u32, x: u32, coder: &mut Coder,
    input: &mut BitReader, todo: &mut Vec<Pending>, inv: &mut Vec<InvFix>,
) -> usize {
    if i == 0 {
        return 0;
    }

    if i > (1 << s) - i {
        inv.push(InvFix { start: off, count: i, s, pos: x });
        return decode_rec(p, off, (1 << s) - i, s, x, coder, input, todo, inv);
    }

    if i == 1 {
        todo.push(Pending { start: off, count: 1, width: s, value: 0, maximum: 1u64 << s, pos: x });
        return 0;
    }

    if is_leaf(s, i) {
        let info = p.leaf_info(s, i);
        todo.push(Pending {
            start: off,
            count: i,
            width: info.deadbits,
            value: 0,
            maximum: info.maximum,
            pos: x,
        });
        return 0;
    }

    let (l, r) = coder.decode(p.distribution(s, i), input);
    let mut n = r as usize;
    n += decode_rec(p, off, l, s - 1, x, coder, input, todo, inv);
    n += decode_rec(p, off + l as usize, i - l, s - 1, x ^ (1 << (s - 1)), coder, input, todo, inv);
    n
}

/// Decode a full tree word into `cw`; returns the number of stream bits
/// the result depends on (the count may over-report in degenerate final
/// states, which callers tolerate because they only test it against a
/// lower bound).
fn decode_tree(p: &Precomp, cw: &mut [u32], coder: &mut Coder, input: &mut BitReader) -> usize {
    let mut todo = Vec::new();
    let mut inv = Vec::new();
    let mut r = decode_rec(p, 0, p.t, p.m, 0, coder, input, &mut todo, &mut inv);

    let reserved: usize = todo.iter().map(|l| l.width as usize).sum();
    let accel = input.unlocked() >= reserved as isize;
    if accel {
        input.shift_end(-(reserved as isize));
    }

    for l in todo.iter_mut().rev() {
        if l.count > 1 {
            let (x, n) = coder.decode_uniform(l.maximum, input);
            r += n as usize;
            l.value = x << l.width;
        }
    }

    if accel {
        input.shift_end(reserved as isize);
        input.seek(input.fin() - reserved);
        for l in todo.iter_mut().rev() {
            l.value ^= input.read(l.width);
        }
        r += reserved;
    } else {
        for l in todo.iter_mut().rev() {
            let mut width = l.width;
            while width > PREC_PROBA {
                let (x, n) = coder.decode_uniform(1 << PREC_PROBA, input);
                r += n as usize;
                width -= PREC_PROBA;
                l.value ^= x << width;
            }
            let (x, n) = coder.decode_uniform(1u64 << width, input);
            r += n as usize;
            l.value ^= x;
        }
    }

    // one further bit is pending in the coder state; its value is fully
    // determined by (min, pending) and is never read, but it occupies a
    // stream position
    r += 1;

    for l in todo.iter().rev() {
        let slice = &mut cw[l.start..l.start + l.count as usize];
        cw_unrank(l.value, l.count, slice);
        for e in slice.iter_mut() {
            *e ^= l.pos;
        }
    }

    // innermost complements resolve first
    for f in inv.iter().rev() {
        let n2 = ((1u32 << f.s) - f.count) as usize;
        let members: Vec<u32> = cw[f.start..f.start + n2].to_vec();
        let mut v = f.pos;
        let mut k = 0usize;
        let mut j = 0usize;
        while j < f.count as usize && k < n2 {
            if members[k] == v {
                k += 1;
            } else {
                cw[f.start + j] = v;
                j += 1;
            }
            v += 1;
        }
        while j < f.count as usize {
            cw[f.start + j] = v;
            j += 1;
            v += 1;
        }
    }

    r
}


// ---- public byte-level entry points --------------------------------------

/// Read `len` bits of `msg` starting at bit `start` (LSB-first packing)
/// and produce the corresponding weight-t word as an ascending position
/// list. Fails with `CwwShortBuffer` when the bits cannot all be carried.
pub(crate) fn b2cw(
    msg: &[u8], start: usize, len: usize, m: u32, t: u32, p: &Precomp,
) -> Result<Vec<u32>, Error> {
    ensure!(m == p.real_m && t == p.real_t, Error::InconsistentPrecomp);
    let end = start + len;
    ensure!(msg.len() * 8 >= end, Error::BufferOverrun);

    let mut buf = msg.to_vec();
    if start % 8 != 0 {
        buf[start / 8] >>= start % 8;
    }
    if end % 8 != 0 {
        buf[end / 8] <<= 8 - end % 8;
    }

    let mut input = BitReader::new(&buf, end);
    let mut coder = Coder::new();
    let reduc = m - p.m;

    // the first reduc·t bits refine positions at the end; skip them here
    input.seek(start + (reduc * t) as usize);

    let mut cw2 = vec![0u32; p.t as usize];
    let mut used = decode_tree(p, &mut cw2, &mut coder, &mut input);

    let mut cw = vec![0u32; t as usize];
    if p.t == t {
        cw.copy_from_slice(&cw2);
    } else {
        // the tree coded the complement set
        let mut k = 0;
        for j in 0..cw2[0] {
            cw[k] = j;
            k += 1;
        }
        for w in cw2.windows(2) {
            for j in w[0] + 1..w[1] {
                cw[k] = j;
                k += 1;
            }
        }
        for j in cw2[p.t as usize - 1] + 1..1 << m {
            cw[k] = j;
            k += 1;
        }
    }

    if reduc > 0 {
        input.seek(start);
        for c in cw.iter_mut() {
            *c = (*c << reduc) ^ input.read(reduc) as u32;
        }
        used += (reduc * t) as usize;
    }

    ensure!(used >= len, Error::CwwShortBuffer);
    Ok(cw)
}

/// Inverse of `b2cw`: write the `len` bits that generate `cw` into `msg`
/// at bit offset `start`. Bits outside `[start, start + len)` are
/// preserved, except those sharing the final partial byte, which follow
/// the historical byte-granular behavior of the scheme.
pub(crate) fn cw2b(
    cw: &[u32], msg: &mut [u8], start: usize, len: usize, m: u32, t: u32, p: &Precomp,
) -> Result<(), Error> {
    ensure!(m == p.real_m && t == p.real_t, Error::InconsistentPrecomp);
    ensure!(cw.len() == t as usize, Error::InvalidParameters);
    let end = start + len;
    ensure!(msg.len() * 8 >= end, Error::BufferOverrun);

    let mut buf = msg.to_vec();
    let saved_head = if start % 8 != 0 {
        let c = buf[start / 8] & lsb_ones((start % 8) as u32) as u8;
        buf[start / 8] = 0;
        Some(c)
    } else {
        None
    };

    let mut out = BitWriter::new(buf, end);
    out.seek(start);
    let mut coder = Coder::new();
    let reduc = m - p.m;

    if reduc > 0 {
        for &c in cw {
            out.write(u64::from(c) & lsb_ones(reduc), reduc);
        }
    }

    let cw2: Vec<u32> = if p.t == t {
        cw.iter().map(|&c| c >> reduc).collect()
    } else {
        let mut cw2 = Vec::with_capacity(p.t as usize);
        let mut prev = 0u32;
        for &c in cw {
            for j in prev..c >> reduc {
                cw2.push(j);
            }
            prev = (c >> reduc) + 1;
        }
        for j in prev..1 << m {
            cw2.push(j);
        }
        cw2
    };

    let used = (reduc * t) as usize + encode_tree(p, &cw2, &mut coder, &mut out)?;

    let mut buf = out.into_bytes();
    if let Some(c) = saved_head {
        buf[start / 8] <<= start % 8;
        buf[start / 8] ^= c;
    }
    if end % 8 != 0 {
        buf[end / 8] >>= 8 - end % 8;
    }
    msg.copy_from_slice(&buf);

    ensure!(used >= len, Error::CwwShortBuffer);
    Ok(())
}
