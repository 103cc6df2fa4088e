use crate::error::Error;
use crate::gf::{Field, Gf};
use rand_core::CryptoRngCore;


/// Polynomial over GF(2^m) with a tracked degree. The degree is -1 for the
/// zero polynomial; otherwise `coeff[deg] != 0`. Mutating coefficients
/// directly requires a later `update_degree()`.
#[derive(Clone, Debug)]
pub(crate) struct Poly {
    deg: i32,
    coeff: Vec<Gf>,
}

impl Poly {
    /// Zero polynomial with room for degree `d`.
    pub(crate) fn alloc(d: usize) -> Self {
        Poly { deg: -1, coeff: vec![0; d + 1] }
    }

    /// Monomial z.
    pub(crate) fn z(capacity: usize) -> Self {
        let mut p = Poly::alloc(capacity.max(1));
        p.coeff[1] = 1;
        p.deg = 1;
        p
    }

    pub(crate) fn from_coeffs(coeff: &[Gf]) -> Self {
        let mut p = Poly { deg: -1, coeff: coeff.to_vec() };
        p.update_degree();
        p
    }

    #[inline]
    pub(crate) fn deg(&self) -> i32 { self.deg }

    pub(crate) fn set_deg(&mut self, d: i32) { self.deg = d; }

    #[inline]
    pub(crate) fn coeff(&self, i: usize) -> Gf {
        if i < self.coeff.len() {
            self.coeff[i]
        } else {
            0
        }
    }

    #[inline]
    pub(crate) fn set_coeff(&mut self, i: usize, a: Gf) {
        debug_assert!(i < self.coeff.len(), "coefficient write beyond capacity");
        self.coeff[i] = a;
    }

    #[inline]
    pub(crate) fn addto_coeff(&mut self, i: usize, a: Gf) {
        debug_assert!(i < self.coeff.len(), "coefficient write beyond capacity");
        self.coeff[i] ^= a;
    }

    /// Leading coefficient; zero for the zero polynomial.
    #[inline]
    pub(crate) fn lead(&self) -> Gf {
        if self.deg < 0 {
            0
        } else {
            self.coeff[self.deg as usize]
        }
    }

    /// Re-tighten the tracked degree after direct coefficient mutation.
    pub(crate) fn update_degree(&mut self) {
        self.deg = -1;
        for i in (0..self.coeff.len()).rev() {
            if self.coeff[i] != 0 {
                self.deg = i as i32;
                break;
            }
        }
    }

    /// Horner evaluation at `a`.
    pub(crate) fn eval(&self, f: &Field, a: Gf) -> Gf {
        let mut r = 0;
        for i in (0..=self.deg.max(0) as usize).rev() {
            r = Field::add(f.mul(r, a), self.coeff(i));
        }
        r
    }

    /// Scale by a nonzero constant.
    pub(crate) fn scale(&mut self, f: &Field, a: Gf) {
        for i in 0..=self.deg.max(0) as usize {
            self.coeff[i] = f.mul(self.coeff[i], a);
        }
    }
}


/// Product p·q, allocated at the exact degree bound.
pub(crate) fn mul(f: &Field, p: &Poly, q: &Poly) -> Poly {
    if p.deg() < 0 || q.deg() < 0 {
        return Poly::alloc(0);
    }
    let mut r = Poly::alloc((p.deg() + q.deg()) as usize);
    for i in 0..=p.deg() as usize {
        if p.coeff(i) == 0 {
            continue;
        }
        for j in 0..=q.deg() as usize {
            r.coeff[i + j] ^= f.mul(p.coeff(i), q.coeff(j));
        }
    }
    r.update_degree();
    r
}

/// Reduce `p` in place modulo `g`.
pub(crate) fn rem(f: &Field, p: &mut Poly, g: &Poly) {
    debug_assert!(g.deg() >= 0);
    let d = g.deg() as usize;
    let ilead = f.inv(g.lead());
    while p.deg() >= g.deg() {
        let k = p.deg() as usize - d;
        let a = f.mul(p.lead(), ilead);
        for i in 0..=d {
            p.coeff[k + i] ^= f.mul(a, g.coeff(i));
        }
        p.update_degree();
    }
}

/// Quotient p / d.
pub(crate) fn quo(f: &Field, p: &Poly, d: &Poly) -> Poly {
    debug_assert!(d.deg() >= 0);
    if p.deg() < d.deg() {
        return Poly::alloc(0);
    }
    let dd = d.deg() as usize;
    let mut q = Poly::alloc((p.deg() - d.deg()) as usize);
    let mut r = p.clone();
    let ilead = f.inv(d.lead());
    while r.deg() >= d.deg() {
        let k = r.deg() as usize - dd;
        let a = f.mul(r.lead(), ilead);
        q.coeff[k] = a;
        for i in 0..=dd {
            r.coeff[k + i] ^= f.mul(a, d.coeff(i));
        }
        r.update_degree();
    }
    q.update_degree();
    q
}

/// Greatest common divisor (not normalized to monic).
pub(crate) fn gcd(f: &Field, p1: &Poly, p2: &Poly) -> Poly {
    let mut a = p1.clone();
    let mut b = p2.clone();
    while b.deg() >= 0 {
        rem(f, &mut a, &b);
        core::mem::swap(&mut a, &mut b);
    }
    a
}

/// Bounded extended Euclid on (p, g): iterate the remainder sequence until
/// `deg r < limit` and return `(u, r)` with `r = u·p mod g`.
pub(crate) fn eeaux(f: &Field, p: &Poly, g: &Poly, limit: i32) -> (Poly, Poly) {
    let cap = g.deg().max(p.deg()).max(1) as usize;
    let mut r0 = g.clone();
    let mut r1 = p.clone();
    let mut u0 = Poly::alloc(cap);
    let mut u1 = Poly::alloc(cap);
    u1.set_coeff(0, 1);
    u1.set_deg(0);

    while r1.deg() >= limit {
        // one full division step: r0 <- r0 mod r1, carrying u0 along
        let d = r1.deg() as usize;
        let ilead = f.inv(r1.lead());
        while r0.deg() >= r1.deg() {
            let k = r0.deg() as usize - d;
            let a = f.mul(r0.lead(), ilead);
            for i in 0..=d {
                r0.coeff[k + i] ^= f.mul(a, r1.coeff(i));
            }
            if u1.deg() >= 0 {
                for i in 0..=u1.deg() as usize {
                    u0.coeff[k + i] ^= f.mul(a, u1.coeff(i));
                }
            }
            r0.update_degree();
        }
        u0.update_degree();
        core::mem::swap(&mut r0, &mut r1);
        core::mem::swap(&mut u0, &mut u1);
    }
    (u1, r1)
}

/// Precompute `sq[i] = z^(d+i) mod g` for `i < d`, where `d = deg g`. Used
/// to square polynomials modulo `g` coefficient-wise.
pub(crate) fn sqmod_init(f: &Field, g: &Poly) -> Vec<Poly> {
    debug_assert!(g.deg() > 0);
    let d = g.deg() as usize;
    let mut sq = Vec::with_capacity(d);

    // z^d mod g = g - lead(g)·z^d scaled, i.e. the tail of g over its lead
    let ilead = f.inv(g.lead());
    let mut cur = Poly::alloc(d);
    for i in 0..d {
        cur.coeff[i] = f.mul(ilead, g.coeff(i));
    }
    cur.update_degree();
    sq.push(cur);

    for _ in 1..d {
        // multiply the previous entry by z and fold the overflow term
        let prev = sq.last().expect("sq is never empty here");
        let mut next = Poly::alloc(d);
        for i in 0..d - 1 {
            next.coeff[i + 1] = prev.coeff(i);
        }
        let top = prev.coeff(d - 1);
        if top != 0 {
            for i in 0..d {
                next.coeff[i] ^= f.mul(top, sq[0].coeff(i));
            }
        }
        next.update_degree();
        sq.push(next);
    }
    sq
}

/// p(z)^2 mod g via the `sqmod_init` table; `d = deg g`.
pub(crate) fn sqmod(f: &Field, p: &Poly, sq: &[Poly], d: usize) -> Poly {
    let mut res = Poly::alloc(d.saturating_sub(1));
    for i in 0..d {
        let a = f.square(p.coeff(i));
        if a == 0 {
            continue;
        }
        if 2 * i < d {
            res.coeff[2 * i] ^= a;
        } else {
            for j in 0..d {
                res.coeff[j] ^= f.mul(a, sq[2 * i - d].coeff(j));
            }
        }
    }
    res.update_degree();
    res
}

/// Degree of the smallest prime factor of `g` (only exact up to deg g / 2,
/// which is all irreducibility testing needs): the first `d` for which
/// `gcd(z^(2^(m·d)) - z, g)` is non-constant, else `deg g`.
pub(crate) fn degppf(f: &Field, g: &Poly) -> usize {
    let t = g.deg() as usize;
    let sq = sqmod_init(f, g);
    let mut u = Poly::z(t.max(1));
    for d in 1..=t / 2 {
        for _ in 0..f.extd() {
            u = sqmod(f, &u, &sq, t);
        }
        let mut s = u.clone();
        s.addto_coeff(1, 1);
        s.update_degree();
        let r = gcd(f, &s, g);
        if r.deg() > 0 {
            return d;
        }
    }
    t
}

/// Draw random monic degree-t polynomials until one is irreducible.
pub(crate) fn randgen_irred(f: &Field, t: usize, rng: &mut impl CryptoRngCore) -> Poly {
    loop {
        let mut g = Poly::alloc(t);
        for i in 0..t {
            g.coeff[i] = f.rand(rng);
        }
        g.coeff[t] = 1;
        g.set_deg(t as i32);
        if degppf(f, &g) == t {
            return g;
        }
    }
}

/// `sqrtmod[i]` with `sqrtmod[i]^2 = z^i mod g`: even powers come straight
/// from `z^(i/2)`, odd ones lift through one global square root of z.
pub(crate) fn sqrtmod_init(f: &Field, g: &Poly) -> Vec<Poly> {
    let t = g.deg() as usize;
    let sq = sqmod_init(f, g);

    // sqrt(z) = z^(2^(m·t - 1)) mod g, by repeated squaring
    let mut w = Poly::z(t - 1);
    for _ in 0..f.extd() as usize * t - 1 {
        w = sqmod(f, &w, &sq, t);
    }

    let mut table = Vec::with_capacity(t);
    for i in 0..t {
        if i % 2 == 0 {
            let mut p = Poly::alloc(t - 1);
            p.set_coeff(i / 2, 1);
            p.update_degree();
            table.push(p);
        } else {
            // z^((i-1)/2) · sqrt(z) mod g
            let k = (i - 1) / 2;
            let mut p = Poly::alloc(t - 1 + k);
            for j in 0..t {
                p.coeff[j + k] = w.coeff(j);
            }
            p.update_degree();
            rem(f, &mut p, g);
            let mut out = Poly::alloc(t - 1);
            for j in 0..t.min(p.coeff.len()) {
                out.coeff[j] = p.coeff(j);
            }
            out.update_degree();
            table.push(out);
        }
    }
    table
}

/// Per-position unit syndromes: `F[i] = (z - L[i])^-1 mod g`, computed as
/// the synthetic quotient `(g(z) - g(a)) / (z - a)` scaled by `g(a)^-1`.
pub(crate) fn syndrome_init(f: &Field, g: &Poly, support: &[Gf]) -> Result<Vec<Poly>, Error> {
    let t = g.deg() as usize;
    let mut table = Vec::with_capacity(support.len());
    for &a in support {
        let mut q = Poly::alloc(t - 1);
        let mut acc = g.coeff(t);
        for k in (1..=t - 1).rev() {
            q.coeff[k] = acc;
            acc = Field::add(f.mul(acc, a), g.coeff(k));
        }
        q.coeff[0] = acc;
        let ga = Field::add(f.mul(acc, a), g.coeff(0));
        // a support point that is a root of g would make the code degenerate
        if ga == 0 {
            return Err(Error::InvalidParameters);
        }
        q.update_degree();
        q.scale(f, f.inv(ga));
        table.push(q);
    }
    Ok(table)
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};

    fn field() -> Field {
        Field::new(7).unwrap()
    }

    fn random_poly(f: &Field, d: usize, rng: &mut impl rand::RngCore) -> Poly {
        let mut p = Poly::alloc(d);
        for i in 0..=d {
            p.coeff[i] = rng.gen_range(0..f.card() as u16);
        }
        p.update_degree();
        p
    }

    #[test]
    fn mul_quo_rem_consistency() {
        let f = field();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(11);
        for _ in 0..200 {
            let p = random_poly(&f, 12, &mut rng);
            let d = random_poly(&f, 5, &mut rng);
            if d.deg() < 0 {
                continue;
            }
            let q = quo(&f, &p, &d);
            let mut r = p.clone();
            rem(&f, &mut r, &d);
            // p = q·d + r
            let mut back = mul(&f, &q, &d);
            for i in 0..=r.deg().max(0) as usize {
                back.coeff[i] ^= r.coeff(i);
            }
            back.update_degree();
            for i in 0..=p.deg().max(0) as usize {
                assert_eq!(back.coeff(i), p.coeff(i));
            }
            assert!(r.deg() < d.deg());
        }
    }

    #[test]
    fn gcd_divides_both() {
        let f = field();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(13);
        for _ in 0..100 {
            let p = random_poly(&f, 10, &mut rng);
            let g = random_poly(&f, 10, &mut rng);
            if p.deg() < 0 || g.deg() < 0 {
                continue;
            }
            let d = gcd(&f, &p, &g);
            assert!(d.deg() >= 0);
            let mut rp = p.clone();
            rem(&f, &mut rp, &d);
            let mut rg = g.clone();
            rem(&f, &mut rg, &d);
            assert_eq!(rp.deg(), -1);
            assert_eq!(rg.deg(), -1);
        }
    }

    #[test]
    fn eeaux_bezout_relation() {
        let f = field();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(17);
        for _ in 0..100 {
            let g = randgen_irred(&f, 8, &mut rng);
            let p = random_poly(&f, 7, &mut rng);
            if p.deg() < 0 {
                continue;
            }
            let (u, r) = eeaux(&f, &p, &g, 4);
            assert!(r.deg() < 4);
            // r = u·p mod g
            let mut up = mul(&f, &u, &p);
            rem(&f, &mut up, &g);
            for i in 0..8 {
                assert_eq!(up.coeff(i), r.coeff(i));
            }
        }
    }

    #[test]
    fn sqmod_is_squaring() {
        let f = field();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(19);
        let g = randgen_irred(&f, 8, &mut rng);
        let sq = sqmod_init(&f, &g);
        for _ in 0..100 {
            let p = random_poly(&f, 7, &mut rng);
            let fast = sqmod(&f, &p, &sq, 8);
            let mut slow = mul(&f, &p, &p);
            rem(&f, &mut slow, &g);
            for i in 0..8 {
                assert_eq!(fast.coeff(i), slow.coeff(i));
            }
        }
    }

    #[test]
    fn sqrtmod_squares_back() {
        let f = field();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(23);
        let g = randgen_irred(&f, 8, &mut rng);
        let table = sqrtmod_init(&f, &g);
        for (i, s) in table.iter().enumerate() {
            let mut sq = mul(&f, s, s);
            rem(&f, &mut sq, &g);
            let mut zi = Poly::alloc(i);
            zi.set_coeff(i, 1);
            zi.update_degree();
            for j in 0..8 {
                assert_eq!(sq.coeff(j), zi.coeff(j), "sqrtmod[{i}] mismatch at z^{j}");
            }
        }
    }

    #[test]
    fn randgen_yields_irreducible() {
        let f = field();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(29);
        let g = randgen_irred(&f, 6, &mut rng);
        assert_eq!(g.deg(), 6);
        assert_eq!(g.lead(), 1);
        assert_eq!(degppf(&f, &g), 6);
    }

    #[test]
    fn unit_syndromes_invert_their_position() {
        let f = field();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(31);
        let g = randgen_irred(&f, 6, &mut rng);
        let support: Vec<Gf> = (0..f.card() as u16).collect();
        let table = syndrome_init(&f, &g, &support).unwrap();
        for (i, fi) in table.iter().enumerate() {
            // (z - L[i]) · F[i] = 1 mod g
            let mut lin = Poly::alloc(1);
            lin.set_coeff(0, support[i]);
            lin.set_coeff(1, 1);
            lin.update_degree();
            let mut prod = mul(&f, &lin, fi);
            rem(&f, &mut prod, &g);
            assert_eq!(prod.deg(), 0);
            assert_eq!(prod.coeff(0), 1);
        }
    }
}
