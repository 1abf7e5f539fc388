//! Properties of the air column: speed of sound, density, and loss constants
//! derived from temperature, pressure, humidity, and CO2 content.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{GAS_CONSTANT, KELVIN_OFFSET, TWO_PI};

// Molar masses (kg/mol)
const MOLAR_MASS_DRY_AIR: f64 = 28.965_46e-3;
const MOLAR_MASS_WATER: f64 = 18.015_28e-3;
const MOLAR_MASS_CARBON: f64 = 12.011e-3;
/// CO2 mole fraction at which MOLAR_MASS_DRY_AIR is quoted.
const REFERENCE_CO2_FRACTION: f64 = 0.0004;
/// Prandtl number of air, close to constant over playing conditions.
const PRANDTL: f64 = 0.71;

/// Immutable environmental snapshot used by every calculator call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalParameters {
    temperature: f64,
    pressure: f64,
    humidity: f64,
    co2_ppm: f64,
    speed_of_sound: f64,
    rho: f64,
    eta: f64,
    gamma: f64,
    alpha_constant: f64,
}

impl PhysicalParameters {
    /// Build parameters from temperature (°C), pressure (kPa), relative
    /// humidity (%), and CO2 fraction (ppm).
    pub fn new(temperature: f64, pressure: f64, humidity: f64, co2_ppm: f64) -> Result<Self> {
        if !(-50.0..=60.0).contains(&temperature) {
            return Err(Error::InvalidPhysicalParameters(format!(
                "temperature {temperature} °C out of range"
            )));
        }
        if !(pressure > 10.0 && pressure < 200.0) {
            return Err(Error::InvalidPhysicalParameters(format!(
                "pressure {pressure} kPa out of range"
            )));
        }
        if !(0.0..=100.0).contains(&humidity) {
            return Err(Error::InvalidPhysicalParameters(format!(
                "relative humidity {humidity}% out of range"
            )));
        }
        if !(0.0..=100_000.0).contains(&co2_ppm) {
            return Err(Error::InvalidPhysicalParameters(format!(
                "CO2 fraction {co2_ppm} ppm out of range"
            )));
        }

        let kelvin = temperature + KELVIN_OFFSET;
        let pascals = pressure * 1000.0;

        // Saturation vapour pressure and enhancement factor (CIPM-2007).
        let p_sat = (1.237_884_7e-5 * kelvin * kelvin - 1.912_131_6e-2 * kelvin + 33.937_110_47
            - 6.343_164_5e3 / kelvin)
            .exp();
        let enhancement = 1.000_62 + 3.14e-8 * pascals + 5.6e-7 * temperature * temperature;
        let x_water = enhancement * (humidity / 100.0) * p_sat / pascals;
        let x_co2 = co2_ppm * 1e-6;

        let dry_molar_mass = MOLAR_MASS_DRY_AIR + MOLAR_MASS_CARBON * (x_co2 - REFERENCE_CO2_FRACTION);
        let molar_mass = (1.0 - x_water) * dry_molar_mass + x_water * MOLAR_MASS_WATER;
        let rho = pascals * molar_mass / (GAS_CONSTANT * kelvin);

        // Molar heat capacity of the mixture: diatomic dry air, triatomic CO2 and water.
        let cp_dry = GAS_CONSTANT * (3.5 * (1.0 - x_co2) + 4.46 * x_co2);
        let cp = (1.0 - x_water) * cp_dry + x_water * 4.0 * GAS_CONSTANT;
        let gamma = cp / (cp - GAS_CONSTANT);

        let speed_of_sound = (gamma * GAS_CONSTANT * kelvin / molar_mass).sqrt();

        // Sutherland's law for dynamic viscosity.
        let eta = 1.458e-6 * kelvin.powf(1.5) / (kelvin + 110.4);

        let alpha_constant =
            (eta / (2.0 * rho * speed_of_sound)).sqrt() * (1.0 + (gamma - 1.0) / PRANDTL.sqrt());

        Ok(Self {
            temperature,
            pressure,
            humidity,
            co2_ppm,
            speed_of_sound,
            rho,
            eta,
            gamma,
            alpha_constant,
        })
    }

    /// Parameters for dry air at the given temperature (°C) and sea-level pressure.
    pub fn at_temperature(temperature: f64) -> Result<Self> {
        Self::new(temperature, 101.325, 0.0, 390.0)
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn humidity(&self) -> f64 {
        self.humidity
    }

    pub fn co2_ppm(&self) -> f64 {
        self.co2_ppm
    }

    /// Speed of sound (m/s).
    pub fn speed_of_sound(&self) -> f64 {
        self.speed_of_sound
    }

    /// Air density (kg/m³).
    pub fn rho(&self) -> f64 {
        self.rho
    }

    /// Dynamic viscosity (Pa·s).
    pub fn eta(&self) -> f64 {
        self.eta
    }

    /// Ratio of specific heats.
    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// Visco-thermal loss constant (√m); boundary-layer attenuation in a tube
    /// of radius r is `alpha_constant * √k / r`.
    pub fn alpha_constant(&self) -> f64 {
        self.alpha_constant
    }

    pub fn calc_wave_number(&self, frequency: f64) -> f64 {
        TWO_PI * frequency / self.speed_of_sound
    }

    pub fn calc_frequency(&self, wave_number: f64) -> f64 {
        wave_number * self.speed_of_sound / TWO_PI
    }

    /// Characteristic impedance ρc/S of a bore of the given radius.
    pub fn calc_z0(&self, radius: f64) -> f64 {
        self.rho * self.speed_of_sound / (std::f64::consts::PI * radius * radius)
    }
}

impl Default for PhysicalParameters {
    /// 20 °C, 101.325 kPa, 45% relative humidity, 390 ppm CO2.
    fn default() -> Self {
        // Constants above are inside the validated ranges.
        match Self::new(20.0, 101.325, 45.0, 390.0) {
            Ok(params) => params,
            Err(_) => unreachable!("default physical parameters are in range"),
        }
    }
}
