//! Per-region pT bin edges.
//!
//! Bin widths follow detector resolution: fine below 100 GeV, growing
//! roughly with resolution above. Forward regions run out of reach earlier,
//! so their edge lists are shorter.

use jetspec_core::{Error, Region, Result};

/// Fine binning over the full pT reach, tuned to calorimeter resolution.
const STANDARD_EDGES: &[f64] = &[
    1.0, 5.0, 6.0, 8.0, 10.0, 12.0, 15.0, 18.0, 21.0, 24.0, 28.0, 32.0, 37.0, 43.0, 49.0, 56.0,
    64.0, 74.0, 84.0, 97.0, 114.0, 133.0, 153.0, 174.0, 196.0, 220.0, 245.0, 272.0, 300.0, 330.0,
    362.0, 395.0, 430.0, 468.0, 507.0, 548.0, 592.0, 638.0, 686.0, 737.0, 790.0, 846.0, 905.0,
    967.0, 1032.0, 1101.0, 1172.0, 1248.0, 1327.0, 1410.0, 1497.0, 1588.0, 1684.0, 1784.0, 1890.0,
    2000.0, 2116.0, 2238.0, 2366.0, 2500.0, 2640.0, 2787.0, 2941.0, 3103.0, 3273.0, 3450.0,
    3637.0, 3832.0, 4037.0, 4252.0, 4477.0, 4713.0, 4961.0, 5220.0, 5492.0, 5777.0, 6076.0,
    6389.0, 6717.0, 7000.0,
];

/// Coarser variant for statistics-limited spectra.
const WIDE_EDGES: &[f64] = &[
    1.0, 5.0, 15.0, 24.0, 37.0, 56.0, 84.0, 114.0, 153.0, 196.0, 245.0, 330.0, 430.0, 548.0,
    686.0, 846.0, 1032.0, 1248.0, 1497.0, 1784.0, 2116.0, 2500.0, 2941.0, 3450.0, 3637.0, 4252.0,
    4961.0, 5777.0, 6717.0, 7000.0,
];

const EDGES_Y00_05: &[f64] = &[
    10.0, 12.0, 15.0, 18.0, 21.0, 24.0, 28.0, 32.0, 37.0, 43.0, 49.0, 56.0, 64.0, 74.0, 84.0,
    97.0, 114.0, 133.0, 153.0, 174.0, 196.0, 220.0, 245.0, 272.0, 300.0, 330.0, 362.0, 395.0,
    430.0, 468.0, 507.0, 548.0, 592.0, 638.0, 686.0, 737.0, 790.0, 846.0, 905.0, 967.0, 1032.0,
    1101.0, 1172.0, 1248.0, 1327.0, 1410.0, 1497.0, 1588.0, 1684.0, 1784.0, 1890.0, 2000.0,
    2116.0, 2238.0, 2366.0, 2500.0, 2640.0, 2787.0, 2941.0, 3103.0, 3273.0, 3450.0, 3832.0,
    6076.0, 6389.0,
];

const EDGES_Y05_10: &[f64] = &[
    10.0, 12.0, 15.0, 18.0, 21.0, 24.0, 28.0, 32.0, 37.0, 43.0, 49.0, 56.0, 64.0, 74.0, 84.0,
    97.0, 114.0, 133.0, 153.0, 174.0, 196.0, 220.0, 245.0, 272.0, 300.0, 330.0, 362.0, 395.0,
    430.0, 468.0, 507.0, 548.0, 592.0, 638.0, 686.0, 737.0, 790.0, 846.0, 905.0, 967.0, 1032.0,
    1101.0, 1172.0, 1248.0, 1327.0, 1410.0, 1497.0, 1588.0, 1684.0, 1784.0, 1890.0, 2000.0,
    2116.0, 2238.0, 2366.0, 2500.0, 2640.0, 2787.0, 2941.0, 3103.0, 3273.0, 3637.0, 5220.0,
    5492.0,
];

const EDGES_Y10_15: &[f64] = &[
    10.0, 12.0, 15.0, 18.0, 21.0, 24.0, 28.0, 32.0, 37.0, 43.0, 49.0, 56.0, 64.0, 74.0, 84.0,
    97.0, 114.0, 133.0, 153.0, 174.0, 196.0, 220.0, 245.0, 272.0, 300.0, 330.0, 362.0, 395.0,
    430.0, 468.0, 507.0, 548.0, 592.0, 638.0, 686.0, 737.0, 790.0, 846.0, 905.0, 967.0, 1032.0,
    1101.0, 1172.0, 1248.0, 1327.0, 1410.0, 1497.0, 1588.0, 1684.0, 1784.0, 1890.0, 2000.0,
    2116.0, 2238.0, 2366.0, 2500.0, 2640.0, 2941.0, 3832.0, 4037.0,
];

const EDGES_Y15_20: &[f64] = &[
    10.0, 12.0, 15.0, 18.0, 21.0, 24.0, 28.0, 32.0, 37.0, 43.0, 49.0, 56.0, 64.0, 74.0, 84.0,
    97.0, 114.0, 133.0, 153.0, 174.0, 196.0, 220.0, 245.0, 272.0, 300.0, 330.0, 362.0, 395.0,
    430.0, 468.0, 507.0, 548.0, 592.0, 638.0, 686.0, 737.0, 790.0, 846.0, 905.0, 967.0, 1032.0,
    1101.0, 1172.0, 1248.0, 1327.0, 1410.0, 1497.0, 1588.0, 1684.0, 1784.0, 1890.0, 2000.0,
    2116.0, 2500.0, 2640.0,
];

const EDGES_Y20_25: &[f64] = &[
    10.0, 12.0, 15.0, 18.0, 21.0, 24.0, 28.0, 32.0, 37.0, 43.0, 49.0, 56.0, 64.0, 74.0, 84.0,
    97.0, 114.0, 133.0, 153.0, 174.0, 196.0, 220.0, 245.0, 272.0, 300.0, 330.0, 362.0, 395.0,
    430.0, 468.0, 507.0, 548.0, 592.0, 638.0, 686.0, 737.0, 790.0, 846.0, 905.0, 967.0, 1032.0,
    1101.0, 1172.0, 1248.0, 1327.0, 1410.0, 1497.0, 1588.0, 1684.0,
];

/// Everything beyond |y| = 2.5 shares one short reach.
const EDGES_FORWARD: &[f64] = &[
    10.0, 12.0, 15.0, 18.0, 21.0, 24.0, 28.0, 32.0, 37.0, 43.0, 49.0, 56.0, 64.0, 74.0, 84.0,
    97.0, 114.0, 133.0, 153.0, 174.0, 196.0, 220.0, 245.0, 272.0, 300.0, 330.0, 362.0, 395.0,
    430.0, 468.0, 507.0, 548.0, 592.0, 638.0, 686.0, 737.0, 790.0, 846.0, 905.0, 967.0, 1032.0,
];

/// Region-indexed schemes, addressed by [`Region::scheme_index`].
const REGION_SCHEMES: [&[f64]; 9] = [
    EDGES_Y00_05,
    EDGES_Y05_10,
    EDGES_Y10_15,
    EDGES_Y15_20,
    EDGES_Y20_25,
    EDGES_FORWARD,
    EDGES_FORWARD,
    EDGES_FORWARD,
    EDGES_FORWARD,
];

/// Bin edges for one rapidity region.
///
/// Fails with a configuration error when the region maps outside the
/// predefined schemes.
pub fn edges_for(region: &Region) -> Result<Vec<f64>> {
    let index = region.scheme_index();
    let scheme = REGION_SCHEMES.get(index).ok_or_else(|| {
        Error::config(format!(
            "no binning scheme for region {} (index {index}, {} schemes)",
            region.label(),
            REGION_SCHEMES.len()
        ))
    })?;
    Ok(scheme.to_vec())
}

/// The fine full-reach binning.
pub fn standard() -> &'static [f64] {
    STANDARD_EDGES
}

/// The coarse binning for statistics-limited spectra.
pub fn wide() -> &'static [f64] {
    WIDE_EDGES
}
