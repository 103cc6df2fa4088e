use crate::error::Error;
use crate::gf::{Field, Gf};
use crate::helpers::{ensure, store_word};
use crate::mat::BinMatrix;
use crate::poly::{randgen_irred, sqrtmod_init, syndrome_init, Poly};
use rand_core::CryptoRngCore;


/// Pack the t field-element coefficients of a unit syndrome into a
/// CODIMENSION-bit row of `row_words` little-endian words.
fn pack_syndrome_row(f: &Field, p: &Poly, t: usize, row: &mut [u64]) {
    let m = f.extd() as usize;
    row.iter_mut().for_each(|w| *w = 0);
    for l in 0..t {
        let c = u64::from(p.coeff(l));
        let k = (l * m) / 64;
        let j = (l * m) % 64;
        row[k] ^= c << j;
        if j + m > 64 {
            row[k + 1] ^= c >> (64 - j);
        }
    }
}

/// Generate a keypair into the caller's buffers. `pk` receives the
/// DIMENSION reduced parity rows; `sk` the full column table followed by
/// the inverse support, the Goppa generator and the square-root table.
pub(crate) fn keypair(
    field: &Field, t: usize, rng: &mut impl CryptoRngCore, pk: &mut [u8], sk: &mut [u8],
) -> Result<(), Error> {
    let n = field.card();
    let m = field.extd() as usize;
    let r = m * t;
    ensure!(r < n, Error::InvalidParameters);
    let row_words = 1 + (r - 1) / 64;
    debug_assert_eq!(pk.len(), (n - r) * row_words * 8);
    debug_assert_eq!(sk.len(), n * row_words * 8 + (n + 1 + (t + 1) * t) * 2);

    // random support permutation over the whole field
    let mut support: Vec<Gf> = (0..n as u16).collect();
    for i in 0..n {
        let j = i + (rng.next_u32() as usize) % (n - i);
        support.swap(i, j);
    }

    // irreducible generator; a singular parity-check matrix sends us back
    // for a fresh polynomial
    let (g, perm) = loop {
        let g = randgen_irred(field, t, rng);

        let mut h = BinMatrix::new(r, n);
        for (i, &alpha) in support.iter().enumerate() {
            let x = field.inv(g.eval(field, alpha));
            let mut y = x;
            for j in 0..t {
                for k in 0..m {
                    if y & (1 << k) != 0 {
                        h.set(j * m + k, i);
                    }
                }
                y = field.mul(y, alpha);
            }
        }

        match h.rref() {
            Ok(perm) => {
                // public key: the redundancy part read through the column
                // permutation, one row per information position
                let mut row = vec![0u64; row_words];
                for i in 0..n - r {
                    row.iter_mut().for_each(|w| *w = 0);
                    for j in 0..r {
                        if h.get(j, perm[i]) {
                            row[j / 64] ^= 1 << (j % 64);
                        }
                    }
                    for (k, &w) in row.iter().enumerate() {
                        store_word(&mut pk[i * row_words * 8..(i + 1) * row_words * 8], k, w);
                    }
                }
                break (g, perm);
            }
            Err(Error::MatrixSingular) => continue,
            Err(e) => return Err(e),
        }
    };

    // reorder the support so the identity block sits on the last r columns
    let reordered: Vec<Gf> = perm.iter().map(|&p| support[p]).collect();
    let support = reordered;

    // secret key: per-position unit syndromes as packed rows
    let syndromes = syndrome_init(field, &g, &support)?;
    let mut off = 0;
    let mut row = vec![0u64; row_words];
    for p in &syndromes {
        pack_syndrome_row(field, p, t, &mut row);
        for (k, &w) in row.iter().enumerate() {
            store_word(&mut sk[off..off + row_words * 8], k, w);
        }
        off += row_words * 8;
    }

    // inverse support
    let mut linv = vec![0 as Gf; n];
    for (i, &alpha) in support.iter().enumerate() {
        linv[alpha as usize] = i as Gf;
    }
    for &x in &linv {
        sk[off..off + 2].copy_from_slice(&x.to_le_bytes());
        off += 2;
    }

    // generator
    for i in 0..=t {
        sk[off..off + 2].copy_from_slice(&g.coeff(i).to_le_bytes());
        off += 2;
    }

    // square roots of z^i modulo g
    for p in sqrtmod_init(field, &g) {
        for i in 0..t {
            sk[off..off + 2].copy_from_slice(&p.coeff(i).to_le_bytes());
            off += 2;
        }
    }
    debug_assert_eq!(off, sk.len());

    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::SeedableRng;

    #[test]
    fn keypair_fills_both_buffers() {
        // small parameters keep the matrix work cheap
        let field = Field::new(8).unwrap();
        let (m, t, n) = (8usize, 12usize, 256usize);
        let r = m * t;
        let row_words = 1 + (r - 1) / 64;
        let mut pk = vec![0u8; (n - r) * row_words * 8];
        let mut sk = vec![0u8; n * row_words * 8 + (n + 1 + (t + 1) * t) * 2];
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(77);
        keypair(&field, t, &mut rng, &mut pk, &mut sk).unwrap();

        // the inverse support section must be a permutation of 0..n
        let base = n * row_words * 8;
        let mut seen = vec![false; n];
        for i in 0..n {
            let v = u16::from_le_bytes([sk[base + 2 * i], sk[base + 2 * i + 1]]) as usize;
            assert!(v < n && !seen[v]);
            seen[v] = true;
        }
        // the generator is monic of degree t
        let gbase = base + 2 * n;
        let lead = u16::from_le_bytes([sk[gbase + 2 * t], sk[gbase + 2 * t + 1]]);
        assert_eq!(lead, 1);
    }
}
