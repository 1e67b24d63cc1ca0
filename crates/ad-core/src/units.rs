// ad-core/src/units.rs
//
// Engine-internal canonical units: K, m³, day, bar, kmol. Quantities cross the
// API boundary as uom types and are read back out through the getters below,
// so each conversion happens in exactly one place.

use uom::si::f64::{
    MolarEnergy as UomMolarEnergy, Pressure as UomPressure, Ratio as UomRatio,
    ThermodynamicTemperature as UomThermodynamicTemperature, Time as UomTime,
    Volume as UomVolume, VolumeRate as UomVolumeRate,
};

// Public canonical unit types (SI, f64)
pub type MolarEnergy = UomMolarEnergy;
pub type Pressure = UomPressure;
pub type Ratio = UomRatio;
pub type Temperature = UomThermodynamicTemperature;
pub type Time = UomTime;
pub type Volume = UomVolume;
pub type VolumeRate = UomVolumeRate;

#[inline]
pub fn k(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::kelvin;
    Temperature::new::<kelvin>(v)
}

#[inline]
pub fn celsius(v: f64) -> Temperature {
    use uom::si::thermodynamic_temperature::degree_celsius;
    Temperature::new::<degree_celsius>(v)
}

#[inline]
pub fn m3(v: f64) -> Volume {
    use uom::si::volume::cubic_meter;
    Volume::new::<cubic_meter>(v)
}

#[inline]
pub fn m3_per_day(v: f64) -> VolumeRate {
    use uom::si::volume_rate::cubic_meter_per_second;
    VolumeRate::new::<cubic_meter_per_second>(v / constants::SECONDS_PER_DAY)
}

#[inline]
pub fn days(v: f64) -> Time {
    use uom::si::time::day;
    Time::new::<day>(v)
}

#[inline]
pub fn bar(v: f64) -> Pressure {
    use uom::si::pressure::bar;
    Pressure::new::<bar>(v)
}

#[inline]
pub fn j_per_mol(v: f64) -> MolarEnergy {
    use uom::si::molar_energy::joule_per_mole;
    MolarEnergy::new::<joule_per_mole>(v)
}

#[inline]
pub fn unitless(v: f64) -> Ratio {
    use uom::si::ratio::ratio;
    Ratio::new::<ratio>(v)
}

#[inline]
pub fn kelvin_of(t: Temperature) -> f64 {
    use uom::si::thermodynamic_temperature::kelvin;
    t.get::<kelvin>()
}

#[inline]
pub fn m3_of(v: Volume) -> f64 {
    use uom::si::volume::cubic_meter;
    v.get::<cubic_meter>()
}

#[inline]
pub fn m3_per_day_of(q: VolumeRate) -> f64 {
    use uom::si::volume_rate::cubic_meter_per_second;
    q.get::<cubic_meter_per_second>() * constants::SECONDS_PER_DAY
}

#[inline]
pub fn days_of(t: Time) -> f64 {
    use uom::si::time::day;
    t.get::<day>()
}

#[inline]
pub fn bar_of(p: Pressure) -> f64 {
    use uom::si::pressure::bar;
    p.get::<bar>()
}

#[inline]
pub fn j_per_mol_of(e: MolarEnergy) -> f64 {
    use uom::si::molar_energy::joule_per_mole;
    e.get::<joule_per_mole>()
}

pub mod constants {
    /// Gas constant for van't Hoff corrections, paired with enthalpies in J/mol.
    pub const R_J_PER_MOL_K: f64 = 8.314_462_618;

    /// Gas constant for the ideal-gas law in the headspace: p [bar] = c [kmol/m³] · R · T.
    pub const R_BAR_M3_PER_KMOL_K: f64 = 0.083_144_626_18;

    /// Reference temperature of tabulated constants.
    pub const T_STANDARD_K: f64 = 298.15;

    pub const P_ATM_BAR: f64 = 1.013_25;

    pub const SECONDS_PER_DAY: f64 = 86_400.0;

    /// Oxygen equivalent of one electron, kg O₂ per kmol e⁻.
    pub const COD_PER_ELECTRON: f64 = 8.0;
}
