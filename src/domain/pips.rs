//! Pip conversions.
//!
//! Every price distance in the strategy is expressed in pips of a fixed size.

/// Smallest conventional price increment for the traded instrument.
pub const PIP_SIZE: f64 = 0.0001;

pub fn pips_to_price(pips: f64) -> f64 {
    pips * PIP_SIZE
}

pub fn price_to_pips(price: f64) -> f64 {
    price / PIP_SIZE
}
