//! Polynomial dynamics over simulated time.

use orrery_core::{Duration, Dynamics, Expiring};
use smallvec::{smallvec, SmallVec};
use std::fmt;

type Coefficients = SmallVec<[f64; 4]>;

/// A polynomial in elapsed time, measured in seconds.
///
/// Coefficient `i` multiplies `t^i`. Trailing zero coefficients are
/// trimmed on construction, so structurally equal polynomials are the
/// same function and vice versa (up to floating-point representation).
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    coefficients: Coefficients,
}

impl Polynomial {
    /// Build from coefficients in increasing order of degree.
    ///
    /// An empty coefficient list is the zero polynomial.
    pub fn new(coefficients: impl IntoIterator<Item = f64>) -> Self {
        let mut coefficients: Coefficients = coefficients.into_iter().collect();
        while coefficients.len() > 1 && coefficients[coefficients.len() - 1] == 0.0 {
            coefficients.pop();
        }
        if coefficients.is_empty() {
            coefficients.push(0.0);
        }
        Polynomial { coefficients }
    }

    /// The degree-zero polynomial with the given value.
    pub fn constant(value: f64) -> Self {
        Polynomial {
            coefficients: smallvec![value],
        }
    }

    /// The coefficient of `t^order`, zero beyond the degree.
    pub fn coefficient(&self, order: usize) -> f64 {
        self.coefficients.get(order).copied().unwrap_or(0.0)
    }

    /// Highest power with a nonzero coefficient (zero for constants).
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// True for degree-zero polynomials.
    pub fn is_constant(&self) -> bool {
        self.degree() == 0
    }

    /// True if any coefficient is infinite or NaN.
    pub fn is_non_finite(&self) -> bool {
        self.coefficients.iter().any(|c| !c.is_finite())
    }

    /// Coefficient-wise sum.
    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let len = self.coefficients.len().max(other.coefficients.len());
        Polynomial::new((0..len).map(|i| self.coefficient(i) + other.coefficient(i)))
    }

    /// Coefficient-wise difference.
    pub fn subtract(&self, other: &Polynomial) -> Polynomial {
        self.add(&other.scale(-1.0))
    }

    /// Full polynomial product.
    pub fn multiply(&self, other: &Polynomial) -> Polynomial {
        let len = self.coefficients.len() + other.coefficients.len() - 1;
        let mut out: Coefficients = smallvec![0.0; len];
        for (i, a) in self.coefficients.iter().enumerate() {
            for (j, b) in other.coefficients.iter().enumerate() {
                out[i + j] += a * b;
            }
        }
        Polynomial::new(out)
    }

    /// Multiply every coefficient by a scalar.
    pub fn scale(&self, scalar: f64) -> Polynomial {
        Polynomial::new(self.coefficients.iter().map(|c| c * scalar))
    }

    /// Whether this polynomial is at least `other` at the current
    /// instant, breaking value ties by successive derivatives.
    ///
    /// A lexicographic comparison of coefficients: the polynomial that
    /// is larger now, or grows faster at the first order where they
    /// differ, dominates. Equal polynomials dominate each other.
    pub fn dominates(&self, other: &Polynomial) -> bool {
        for i in 0..=self.degree().max(other.degree()) {
            if self.coefficient(i) > other.coefficient(i) {
                return true;
            }
            if self.coefficient(i) < other.coefficient(i) {
                return false;
            }
        }
        true
    }

    /// The pointwise smaller of two polynomials at the current instant.
    ///
    /// A later crossing is recaptured by re-solving, not by an expiry on
    /// the result.
    pub fn min(&self, other: &Polynomial) -> Expiring<Polynomial> {
        let winner = if self.dominates(other) { other } else { self };
        Expiring::never(winner.clone())
    }

    /// The pointwise larger of two polynomials at the current instant.
    pub fn max(&self, other: &Polynomial) -> Expiring<Polynomial> {
        let winner = if self.dominates(other) { self } else { other };
        Expiring::never(winner.clone())
    }
}

impl Dynamics for Polynomial {
    type Value = f64;

    fn extract(&self) -> f64 {
        self.coefficients[0]
    }

    /// Taylor shift: the returned polynomial `q` satisfies
    /// `q(t) == p(t + elapsed)` with `elapsed` converted to seconds.
    fn step(&self, elapsed: Duration) -> Self {
        if elapsed == Duration::ZERO {
            return self.clone();
        }
        let dt = elapsed.ratio_over(Duration::SECOND);
        let n = self.coefficients.len();
        let mut out: Coefficients = smallvec![0.0; n];
        for (i, &ci) in self.coefficients.iter().enumerate() {
            if ci == 0.0 {
                continue;
            }
            // Contribution of c_i t^i: binomial expansion of (t + dt)^i.
            let mut binom = 1.0;
            let mut power = 1.0;
            for k in (0..=i).rev() {
                out[k] += ci * binom * power;
                if k > 0 {
                    binom = binom * (k as f64) / ((i - k + 1) as f64);
                    power *= dt;
                }
            }
        }
        Polynomial::new(out)
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.coefficients[0])?;
        for (i, &c) in self.coefficients.iter().enumerate().skip(1) {
            if c == 0.0 {
                continue;
            }
            let (sign, magnitude) = if c < 0.0 { ("-", -c) } else { ("+", c) };
            if i == 1 {
                write!(f, " {sign} {magnitude}t")?;
            } else {
                write!(f, " {sign} {magnitude}t^{i}")?;
            }
        }
        Ok(())
    }
}
