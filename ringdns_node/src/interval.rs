//! Modular interval predicates over the identifier ring.
//!
//! Both intervals wrap clockwise through the top of the ring back to zero.
//! When the endpoints coincide the interval covers the whole ring except the
//! endpoint itself, which is what makes a one-node ring route to itself.

/// True iff `k` lies in the half-open interval `(a, b]`.
pub fn belongs_to(k: u64, a: u64, b: u64) -> bool {
    if a < b {
        k > a && k <= b
    } else if a > b {
        k > a || k <= b
    } else {
        k != a
    }
}

/// True iff `k` lies in the open interval `(a, b)`.
pub fn between(k: u64, a: u64, b: u64) -> bool {
    if a < b {
        k > a && k < b
    } else if a > b {
        k > a || k < b
    } else {
        k != a
    }
}
