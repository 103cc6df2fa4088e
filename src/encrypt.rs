use crate::cww;
use crate::error::Error;
use crate::helpers::{flip_bit, get_bit, load_word, lsb_ones, store_word};
use crate::precomp::Precomp;


/// Bit-precise concatenation `ciphertext = head(DIMENSION bits) || cR`,
/// working in 64-bit words. The total is always a whole number of words
/// since DIMENSION + CODIMENSION = 2^m.
fn concat(ct: &mut [u8], head: &[u8], c_r: &[u64], dimension: usize) {
    let i = dimension % 64;
    let mut l = dimension / 64;
    for w in 0..l {
        store_word(ct, w, load_word(head, w));
    }
    if i == 0 {
        for &b in c_r {
            store_word(ct, l, b);
            l += 1;
        }
    } else {
        let mut cur = load_word(head, l) & lsb_ones(i as u32);
        for &b in c_r {
            cur ^= b << i;
            store_word(ct, l, cur);
            l += 1;
            cur = b >> (64 - i);
        }
        store_word(ct, l, cur);
    }
}

/// Encrypt one block: fold the information bits through the public column
/// table, pack the cleartext tail into a weight-t error pattern, and flip
/// those positions in head||cR.
#[allow(clippy::too_many_arguments)]
pub(crate) fn encrypt_block(
    ciphertext: &mut [u8], cleartext: &[u8], pk: &[u8], m: u32, t: u32, dimension: usize,
    error_size: usize, p: &Precomp,
) -> Result<(), Error> {
    let codimension = m as usize * t as usize;
    let row_words = 1 + (codimension - 1) / 64;

    // cR accumulates the columns selected by the information bits
    let mut c_r = vec![0u64; row_words];
    for j in 0..dimension {
        if get_bit(cleartext, j) {
            let row = &pk[j * row_words * 8..(j + 1) * row_words * 8];
            for (k, w) in c_r.iter_mut().enumerate() {
                *w ^= load_word(row, k);
            }
        }
    }

    let e = cww::b2cw(cleartext, dimension, error_size, m, t, p)?;

    concat(ciphertext, cleartext, &c_r, dimension);

    for &pos in &e {
        flip_bit(ciphertext, pos as usize);
    }
    Ok(())
}
