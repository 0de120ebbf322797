//! Gauss-Legendre rules on the unit square.

use crate::quadrature::types::NumericalQuadratureDefinition;
use crate::types::{Error, Result};

/// Points and weights of Gauss-Legendre rules on [0, 1], indexed by number of points - 1
const GAUSS_LEGENDRE: [(&[f64], &[f64]); 4] = [
    (&[0.5], &[1.0]),
    (
        &[0.211_324_865_405_187_1, 0.788_675_134_594_812_9],
        &[0.5, 0.5],
    ),
    (
        &[0.112_701_665_379_258_3, 0.5, 0.887_298_334_620_741_7],
        &[
            0.277_777_777_777_777_8,
            0.444_444_444_444_444_4,
            0.277_777_777_777_777_8,
        ],
    ),
    (
        &[
            0.069_431_844_202_973_71,
            0.330_009_478_207_571_9,
            0.669_990_521_792_428_1,
            0.930_568_155_797_026_3,
        ],
        &[
            0.173_927_422_568_726_9,
            0.326_072_577_431_273_1,
            0.326_072_577_431_273_1,
            0.173_927_422_568_726_9,
        ],
    ),
];

/// Return a Gauss-Legendre rule on the unit square with `npoints_1d` points in each direction.
///
/// The rule is the tensor product of the rule on [0, 1] with itself. If the rule
/// does not exist, [`Error::InvalidQuadrature`] is returned.
pub fn gauss_rule(npoints_1d: usize) -> Result<NumericalQuadratureDefinition> {
    if npoints_1d == 0 || npoints_1d > GAUSS_LEGENDRE.len() {
        return Err(Error::InvalidQuadrature(npoints_1d));
    }
    let (points_1d, weights_1d) = GAUSS_LEGENDRE[npoints_1d - 1];

    let npoints = npoints_1d * npoints_1d;
    let mut points = Vec::with_capacity(2 * npoints);
    let mut weights = Vec::with_capacity(npoints);
    for (y, wy) in points_1d.iter().zip(weights_1d) {
        for (x, wx) in points_1d.iter().zip(weights_1d) {
            points.push(*x);
            points.push(*y);
            weights.push(wx * wy);
        }
    }
    Ok(NumericalQuadratureDefinition {
        dim: 2,
        order: 2 * npoints_1d - 1,
        npoints,
        weights,
        points,
    })
}
