use crate::error::Error;

const WORD_BITS: usize = 64;


/// Dense binary matrix, rows bit-packed LSB-first into u64 words.
pub(crate) struct BinMatrix {
    rows: usize,
    cols: usize,
    row_words: usize,
    elem: Vec<u64>,
}

impl BinMatrix {
    pub(crate) fn new(rows: usize, cols: usize) -> Self {
        let row_words = 1 + (cols - 1) / WORD_BITS;
        BinMatrix { rows, cols, row_words, elem: vec![0; rows * row_words] }
    }

    #[inline]
    pub(crate) fn get(&self, i: usize, j: usize) -> bool {
        (self.elem[i * self.row_words + j / WORD_BITS] >> (j % WORD_BITS)) & 1 != 0
    }

    #[inline]
    pub(crate) fn set(&mut self, i: usize, j: usize) {
        self.elem[i * self.row_words + j / WORD_BITS] |= 1 << (j % WORD_BITS);
    }

    fn row_xor(&mut self, a: usize, b: usize) {
        for i in 0..self.row_words {
            let w = self.elem[b * self.row_words + i];
            self.elem[a * self.row_words + i] ^= w;
        }
    }

    /// Row-reduce to systematic form, scanning pivot columns from the
    /// rightmost. Returns the column permutation `perm` such that columns
    /// `perm[cols-rows..]` hold the identity and `perm[..cols-rows]` the
    /// information positions; failed pivot columns are recorded descending
    /// just below the identity block.
    pub(crate) fn rref(&mut self) -> Result<Vec<usize>, Error> {
        let (r, n) = (self.rows, self.cols);
        let mut perm: Vec<usize> = (0..n).collect();
        let mut max = n - 1;
        let mut failcnt = 0;

        let mut i = 0;
        while i < r {
            let mut found = false;
            for j in i..r {
                if self.get(j, max) {
                    if i != j {
                        self.row_xor(i, j);
                    }
                    found = true;
                    break;
                }
            }

            if !found {
                // no pivot in this column: park it just below the identity
                // block and retry one column to the left
                if failcnt >= n - r {
                    return Err(Error::MatrixSingular);
                }
                perm[n - r - 1 - failcnt] = max;
                failcnt += 1;
                if max == 0 {
                    return Err(Error::MatrixSingular);
                }
                max -= 1;
                continue;
            }

            perm[i + n - r] = max;
            for j in 0..r {
                if j != i && self.get(j, max) {
                    self.row_xor(j, i);
                }
            }

            i += 1;
            if max == 0 && i < r {
                return Err(Error::MatrixSingular);
            }
            max = max.wrapping_sub(1);
        }

        Ok(perm)
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    #[test]
    fn rref_produces_identity_on_pivot_columns() {
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(42);
        for _ in 0..20 {
            let (r, n) = (24, 80);
            let mut m = BinMatrix::new(r, n);
            for i in 0..r {
                for j in 0..n {
                    if rng.gen::<bool>() {
                        m.set(i, j);
                    }
                }
            }
            let perm = match m.rref() {
                Ok(p) => p,
                Err(Error::MatrixSingular) => continue,
                Err(e) => panic!("unexpected error {e:?}"),
            };
            // last r permuted columns form I_r
            for i in 0..r {
                for j in 0..r {
                    assert_eq!(m.get(j, perm[n - r + i]), i == j);
                }
            }
            // perm is a permutation of 0..n
            let mut seen = vec![false; n];
            for &p in &perm {
                assert!(!seen[p]);
                seen[p] = true;
            }
        }
    }

    #[test]
    fn rank_deficient_is_rejected() {
        // two identical nonzero rows in a 2-row matrix can never reach rank 2
        let mut m = BinMatrix::new(2, 8);
        for j in [1, 5, 6] {
            m.set(0, j);
            m.set(1, j);
        }
        assert_eq!(m.rref().unwrap_err(), Error::MatrixSingular);
    }
}
