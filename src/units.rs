//! Unit conversions used around blood gas reports.

use crate::numeric::Scalar;

/// kPa per mmHg
pub const KPA_PER_MMHG: f64 = 0.133322368;
/// mmol/L of hemoglobin monomer per g/dL
pub const MMOL_PER_G_DL_HB: f64 = 0.62058;
/// Adult reference range of p50 (mmHg)
pub const NORMAL_P50_MMHG: (f64, f64) = (24.0, 28.0);

pub fn mmhg_to_kpa<S: Scalar>(pressure: S) -> S {
    pressure * KPA_PER_MMHG
}

pub fn kpa_to_mmhg<S: Scalar>(pressure: S) -> S {
    pressure / KPA_PER_MMHG
}

pub fn hb_g_dl_to_mmol_l<S: Scalar>(cthb: S) -> S {
    cthb * MMOL_PER_G_DL_HB
}

pub fn p50_in_normal_range<S: Scalar>(p50_kpa: &S) -> bool {
    let mmhg = kpa_to_mmhg(p50_kpa.clone()).nominal();
    mmhg >= NORMAL_P50_MMHG.0 && mmhg <= NORMAL_P50_MMHG.1
}
