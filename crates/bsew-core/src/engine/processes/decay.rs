use crate::engine::error::ProcessError;
use crate::engine::process::{Ports, Process};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const NAME: &str = "decay";

const SPECIES_PORT: &str = "species";

/// First-order decay `dx/dt = -k·x` for each species with a configured rate.
///
/// Reads the `species` port (an object of amounts) and returns, on the same port,
/// the exact change over the firing interval: `x·(e^{-k·dt} − 1)`.
#[derive(Debug, Clone)]
pub struct Decay {
    rates: BTreeMap<String, f64>,
}

impl Decay {
    pub fn from_config(config: &Map<String, Value>) -> Result<Box<dyn Process>, ProcessError> {
        Ok(Box::new(Self {
            rates: parse_rates(config.get("rates"))?,
        }))
    }
}

/// Parses a `{species: rate}` object; rates must be finite and non-negative.
pub(crate) fn parse_rates(value: Option<&Value>) -> Result<BTreeMap<String, f64>, ProcessError> {
    let Some(Value::Object(rates)) = value else {
        return Err(ProcessError::InvalidConfig(
            "`rates` must be an object mapping species to decay rates".to_string(),
        ));
    };
    rates
        .iter()
        .map(|(species, rate)| match rate.as_f64() {
            Some(k) if k.is_finite() && k >= 0.0 => Ok((species.clone(), k)),
            _ => Err(ProcessError::InvalidConfig(format!(
                "rate for '{species}' must be a non-negative number, got {rate}"
            ))),
        })
        .collect()
}

impl Process for Decay {
    fn update(&mut self, inputs: &Ports, interval: f64, _time: f64) -> Result<Ports, ProcessError> {
        let species = inputs
            .get(SPECIES_PORT)
            .ok_or_else(|| ProcessError::MissingInput(SPECIES_PORT.to_string()))?
            .as_object()
            .ok_or_else(|| ProcessError::InvalidInput {
                port: SPECIES_PORT.to_string(),
                reason: "expected an object of species amounts".to_string(),
            })?;

        let mut deltas = Map::new();
        for (name, rate) in &self.rates {
            let Some(amount) = species.get(name) else {
                continue;
            };
            let amount = amount.as_f64().ok_or_else(|| ProcessError::InvalidInput {
                port: SPECIES_PORT.to_string(),
                reason: format!("amount of '{name}' is not a number"),
            })?;
            let delta = amount * ((-rate * interval).exp() - 1.0);
            deltas.insert(name.clone(), Value::from(delta));
        }

        let mut out = Ports::new();
        out.insert(SPECIES_PORT.to_string(), Value::Object(deltas));
        Ok(out)
    }
}
