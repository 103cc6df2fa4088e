use crate::cww;
use crate::error::Error;
use crate::gf::{Field, Gf};
use crate::helpers::{ensure, flip_bit, get_bit, load_word};
use crate::poly::{self, Poly};
use crate::precomp::Precomp;


/// Decoder context reconstructed from the serialized secret key.
struct DecoderCtx<'a> {
    /// Per-position unit syndromes, one packed CODIMENSION-bit row each.
    columns: &'a [u8],
    row_words: usize,
    linv: Vec<Gf>,
    g: Poly,
    sqrtmod: Vec<Poly>,
}

fn parse_sk<'a>(sk: &'a [u8], field: &Field, t: usize) -> Result<DecoderCtx<'a>, Error> {
    let n = field.card();
    let m = field.extd() as usize;
    let row_words = 1 + (m * t - 1) / 64;
    let expect = n * row_words * 8 + (n + 1 + (t + 1) * t) * 2;
    ensure!(sk.len() == expect, Error::InvalidParameters);

    let columns = &sk[..n * row_words * 8];
    let mut off = n * row_words * 8;

    let mut linv = Vec::with_capacity(n);
    for _ in 0..n {
        linv.push(u16::from_le_bytes([sk[off], sk[off + 1]]));
        off += 2;
    }

    let read_coeffs = |count: usize, off: &mut usize| {
        let v: Vec<Gf> = (0..count)
            .map(|i| u16::from_le_bytes([sk[*off + 2 * i], sk[*off + 2 * i + 1]]))
            .collect();
        *off += 2 * count;
        Poly::from_coeffs(&v)
    };

    let g = read_coeffs(t + 1, &mut off);
    ensure!(g.deg() == t as i32, Error::InvalidParameters);

    let mut sqrtmod = Vec::with_capacity(t);
    for _ in 0..t {
        sqrtmod.push(read_coeffs(t, &mut off));
    }

    Ok(DecoderCtx { columns, row_words, linv, g, sqrtmod })
}

/// Syndrome of the received word under the stored column table, as a
/// degree-(t-1) polynomial.
fn syndrome(ctx: &DecoderCtx<'_>, field: &Field, t: usize, b: &[u8]) -> Poly {
    let n = field.card();
    let m = field.extd() as usize;
    let mut c = vec![0u64; ctx.row_words];
    for j in 0..n {
        if get_bit(b, j) {
            let row = &ctx.columns[j * ctx.row_words * 8..(j + 1) * ctx.row_words * 8];
            for (k, w) in c.iter_mut().enumerate() {
                *w ^= load_word(row, k);
            }
        }
    }

    let mut r = Poly::alloc(t - 1);
    for l in 0..t {
        let k = (l * m) / 64;
        let j = (l * m) % 64;
        let mut a = c[k] >> j;
        if j + m > 64 {
            a ^= c[k + 1] << (64 - j);
        }
        r.set_coeff(l, (a & ((1 << m) - 1)) as Gf);
    }
    r.update_degree();
    r
}

/// Berlekamp trace root finding: splits sigma along the shifted trace
/// polynomials until only linear factors remain. Returns the roots found.
fn roots_berl(field: &Field, t: usize, sigma: &Poly) -> Vec<Gf> {
    let m = field.extd() as usize;

    // sq_aux serves the repeated squarings modulo sigma
    let sq_aux = poly::sqmod_init(field, sigma);

    // tr_aux[i] = z^(2^i) mod sigma; tr[0] = the trace polynomial
    let mut tr_aux = Vec::with_capacity(m);
    tr_aux.push(Poly::z(t.saturating_sub(1).max(1)));
    let mut tr0 = Poly::alloc(t.saturating_sub(1).max(1));
    tr0.set_coeff(1, 1);
    for i in 1..m {
        let next = poly::sqmod(field, &tr_aux[i - 1], &sq_aux, t);
        for j in 0..t {
            tr0.addto_coeff(j, next.coeff(j));
        }
        tr_aux.push(next);
    }
    tr0.update_degree();

    let mut tr: Vec<Option<Poly>> = vec![None; m];
    tr[0] = Some(tr0);

    let mut res = Vec::with_capacity(t);
    roots_berl_aux(field, t, sigma, sigma.deg(), &tr_aux, &mut tr, 0, &mut res);
    res
}

#[allow(clippy::too_many_arguments)]
fn roots_berl_aux(
    field: &Field, t: usize, sigma: &Poly, d: i32, tr_aux: &[Poly], tr: &mut Vec<Option<Poly>>,
    e: usize, res: &mut Vec<Gf>,
) {
    if d <= 0 {
        return;
    }
    if d == 1 {
        res.push(field.div(sigma.coeff(0), sigma.coeff(1)));
        return;
    }
    // only now: a linear factor at e == extd still counts
    if e >= field.extd() as usize {
        return;
    }

    if tr[e].is_none() {
        // shifted trace: sum over i of tr_aux[i] · (alpha^e)^(2^i)
        let mut p = Poly::alloc(t.saturating_sub(1).max(1));
        let mut a = field.alpha_pow(e as u32);
        for aux in tr_aux {
            for j in 0..t {
                p.addto_coeff(j, field.mul(aux.coeff(j), a));
            }
            a = field.square(a);
        }
        p.update_degree();
        tr[e] = Some(p);
    }

    let te = tr[e].as_ref().expect("shifted trace was just materialized");
    let gcd1 = poly::gcd(field, te, sigma);
    let gcd2 = poly::quo(field, sigma, &gcd1);
    let i = gcd1.deg();

    roots_berl_aux(field, t, &gcd1, i, tr_aux, tr, e + 1, res);
    roots_berl_aux(field, t, &gcd2, d - i, tr_aux, tr, e + 1, res);
}

/// Patterson decoding: from the received word to the ascending list of
/// error positions. `Undecodable` whenever any stage falls short of a
/// weight-t pattern.
fn decode(ctx: &DecoderCtx<'_>, field: &Field, t: usize, b: &[u8]) -> Result<Vec<u32>, Error> {
    let r = syndrome(ctx, field, t, b);
    ensure!(r.deg() >= 0, Error::Undecodable);

    // h = R^-1 mod g, from the bounded Euclid run to a constant remainder
    let (u, rem) = poly::eeaux(field, &r, &ctx.g, 1);
    ensure!(rem.deg() == 0, Error::Undecodable);
    let mut h = u;
    h.scale(field, field.inv(rem.coeff(0)));

    // h <- h + z
    h.addto_coeff(1, 1);
    h.update_degree();

    // S = sqrt(h) mod g through the precomputed square-root table
    let mut s = Poly::alloc(t - 1);
    for i in 0..t {
        let a = field.sqrt(h.coeff(i));
        if a == 0 {
            continue;
        }
        if i % 2 == 1 {
            for j in 0..t {
                s.addto_coeff(j, field.mul(a, ctx.sqrtmod[i].coeff(j)));
            }
        } else {
            s.addto_coeff(i / 2, a);
        }
    }
    s.update_degree();

    // key equation u = S·v mod g with the degree split of Patterson
    let (v, u) = poly::eeaux(field, &s, &ctx.g, t as i32 / 2 + 1);

    // sigma = u^2 + z·v^2
    let mut sigma = Poly::alloc(t);
    for i in 0..=u.deg().max(0) as usize {
        if 2 * i <= t {
            sigma.addto_coeff(2 * i, field.square(u.coeff(i)));
        }
    }
    for i in 0..=v.deg().max(0) as usize {
        if 2 * i + 1 <= t {
            sigma.addto_coeff(2 * i + 1, field.square(v.coeff(i)));
        }
    }
    sigma.update_degree();
    ensure!(sigma.deg() == t as i32, Error::Undecodable);

    let roots = roots_berl(field, t, &sigma);
    ensure!(roots.len() == t, Error::Undecodable);

    let mut e: Vec<u32> = roots.iter().map(|&x| u32::from(ctx.linv[x as usize])).collect();
    e.sort_unstable();
    Ok(e)
}

/// Decrypt one block: locate the error pattern, strip it, copy the
/// information head and unpack the pattern back into the cleartext tail.
#[allow(clippy::too_many_arguments)]
pub(crate) fn decrypt_block(
    cleartext: &mut [u8], ciphertext: &[u8], sk: &[u8], field: &Field, m: u32, t: u32,
    dimension: usize, error_size: usize, p: &Precomp,
) -> Result<(), Error> {
    let ctx = parse_sk(sk, field, t as usize)?;
    let e = decode(&ctx, field, t as usize, ciphertext)?;

    let mut corrected = ciphertext.to_vec();
    for &pos in &e {
        flip_bit(&mut corrected, pos as usize);
    }

    // byte-granular head copy: the few redundancy bits sharing the last
    // head byte are exactly what the tail unpacking expects to overwrite
    let head_bytes = (dimension - 1) / 8 + 1;
    cleartext[..head_bytes].copy_from_slice(&corrected[..head_bytes]);

    // an error pattern the codec cannot express is as fatal as a failed
    // decode
    cww::cw2b(&e, cleartext, dimension, error_size, m, t, p).map_err(|_| Error::Undecodable)
}
