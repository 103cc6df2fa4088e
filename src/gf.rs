use crate::error::Error;
use crate::helpers::ensure;
use rand_core::CryptoRngCore;


/// An element of GF(2^m), value in `[0, 2^m)`.
pub(crate) type Gf = u16;

const MAX_EXT_DEG: u32 = 16;

/// Primitive polynomial for each extension degree, in octal. Degrees 0 and
/// 1 are never used.
const PRIM_POLY: [u32; MAX_EXT_DEG as usize + 1] = [
    0o1, 0o3, 0o7, 0o13, 0o23, 0o45, 0o103, 0o203, 0o435, 0o1041, 0o2011, 0o4005, 0o10123,
    0o20033, 0o42103, 0o100003, 0o210013,
];


/// GF(2^m) arithmetic through log/antilog tables over a fixed primitive
/// element alpha.
#[derive(Debug)]
pub(crate) struct Field {
    m: u32,
    card: u32,
    ord: u32,
    exp: Vec<Gf>,
    log: Vec<Gf>,
}

impl Field {
    pub(crate) fn new(m: u32) -> Result<Self, Error> {
        ensure!(m <= MAX_EXT_DEG, Error::FieldTooLarge);
        ensure!(m >= 2, Error::InvalidParameters);
        let card = 1u32 << m;
        let ord = card - 1;

        // exp[i] = alpha^i; multiply by x and reduce by the primitive
        // polynomial one step at a time
        let mut exp = vec![0 as Gf; card as usize];
        exp[0] = 1;
        for i in 1..ord as usize {
            let mut next = u32::from(exp[i - 1]) << 1;
            if next & card != 0 {
                next ^= PRIM_POLY[m as usize];
            }
            exp[i] = next as Gf;
        }
        // wrap so that exponents reduced to the class of 0 land on alpha^0
        exp[ord as usize] = 1;

        let mut log = vec![0 as Gf; card as usize];
        log[0] = ord as Gf; // log of 0, by convention
        for i in 0..ord as usize {
            log[exp[i] as usize] = i as Gf;
        }

        Ok(Field { m, card, ord, exp, log })
    }

    pub(crate) fn extd(&self) -> u32 { self.m }

    pub(crate) fn card(&self) -> usize { self.card as usize }

    pub(crate) fn ord(&self) -> u32 { self.ord }

    /// Reduce an exponent sum into `[0, 2^m)`; the class of 0 may come out
    /// as either 0 or 2^m - 1, which the exp-table wrap absorbs.
    #[inline]
    fn modq1(&self, mut d: u32) -> u32 {
        while d >> self.m != 0 {
            d = (d & self.ord) + (d >> self.m);
        }
        d
    }

    #[inline]
    pub(crate) fn add(x: Gf, y: Gf) -> Gf { x ^ y }

    #[inline]
    pub(crate) fn mul(&self, x: Gf, y: Gf) -> Gf {
        if x == 0 || y == 0 {
            0
        } else {
            self.exp[self.modq1(u32::from(self.log[x as usize]) + u32::from(self.log[y as usize]))
                as usize]
        }
    }

    #[inline]
    pub(crate) fn square(&self, x: Gf) -> Gf {
        if x == 0 {
            0
        } else {
            self.exp[self.modq1(u32::from(self.log[x as usize]) << 1) as usize]
        }
    }

    #[inline]
    pub(crate) fn sqrt(&self, x: Gf) -> Gf {
        if x == 0 {
            0
        } else {
            self.exp[self.modq1(u32::from(self.log[x as usize]) << (self.m - 1)) as usize]
        }
    }

    /// x / y; y must be nonzero.
    #[inline]
    pub(crate) fn div(&self, x: Gf, y: Gf) -> Gf {
        debug_assert_ne!(y, 0, "division by zero in GF(2^m)");
        if x == 0 {
            0
        } else {
            self.exp[self.modq1(
                u32::from(self.log[x as usize]) + self.ord - u32::from(self.log[y as usize]),
            ) as usize]
        }
    }

    /// 1 / x; x must be nonzero.
    #[inline]
    pub(crate) fn inv(&self, x: Gf) -> Gf {
        debug_assert_ne!(x, 0, "inverse of zero in GF(2^m)");
        self.exp[(self.ord - u32::from(self.log[x as usize])) as usize]
    }

    /// alpha^i for the primitive element alpha.
    #[inline]
    pub(crate) fn alpha_pow(&self, i: u32) -> Gf {
        self.exp[self.modq1(i) as usize]
    }

    /// x^i with the convention 0^0 = 1.
    pub(crate) fn pow(&self, x: Gf, i: u32) -> Gf {
        if i == 0 {
            1
        } else if x == 0 {
            0
        } else {
            let e = self.modq1(i);
            self.exp[self.modq1(e * u32::from(self.log[x as usize])) as usize]
        }
    }

    /// Uniform random field element.
    pub(crate) fn rand(&self, rng: &mut impl CryptoRngCore) -> Gf {
        (rng.next_u32() & self.ord) as Gf
    }
}
