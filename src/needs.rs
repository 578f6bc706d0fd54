use std::sync::Arc;

use log::info;

use crate::{
    error::{Result, TrackerError},
    models::{fmt_decimal, Gender, ProfileInputs, WaterIntakeSummary},
    store::{keys, read_decimal, KeyValueStore},
};

pub const MIN_WEIGHT_KG: f64 = 40.0;
pub const MAX_WEIGHT_KG: f64 = 400.0;

const LITERS_PER_KG: f64 = 20.0 / 1000.0;
const BASE_CAP_LITERS: f64 = 3.0;
const ACTIVITY_CAP_LITERS: f64 = 1.0;
const CLIMATE_CAP_LITERS: f64 = 0.2;
const MALE_ADJUSTMENT_LITERS: f64 = 0.4;

pub(crate) fn round_to_2dp(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Daily water need in liters from the profile inputs.
///
/// `min(weight * 20 / 1000, 3.0) + min(activity, 1.0) + min(climate, 0.2)
/// + 0.4 for men`, rounded to two decimals. Deterministic; rejects weights
/// outside `[40, 400]` kg without touching any state.
pub fn compute_daily_target(inputs: &ProfileInputs) -> Result<f64> {
    if !inputs.weight_kg.is_finite()
        || inputs.weight_kg < MIN_WEIGHT_KG
        || inputs.weight_kg > MAX_WEIGHT_KG
    {
        return Err(TrackerError::validation(format!(
            "weight must be between {MIN_WEIGHT_KG} and {MAX_WEIGHT_KG} kg"
        )));
    }

    let base = (inputs.weight_kg * LITERS_PER_KG).min(BASE_CAP_LITERS);
    let activity = inputs.activity_factor.min(ACTIVITY_CAP_LITERS);
    let climate = inputs.climate_factor.min(CLIMATE_CAP_LITERS);
    let gender_adjustment = match inputs.gender {
        Gender::Male => MALE_ADJUSTMENT_LITERS,
        Gender::Female => 0.0,
    };

    Ok(round_to_2dp(base + activity + climate + gender_adjustment))
}

/// Store-backed side of the needs calculation: persists profile inputs, the
/// computed target, and the profile screen's result-visibility flag.
#[derive(Clone)]
pub struct NeedsCalculator {
    store: Arc<dyn KeyValueStore>,
}

impl NeedsCalculator {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Reads the profile back from the store. `None` until a weight has been
    /// captured; the factor fields fall back to the form defaults (no
    /// activity, temperate climate, male).
    pub async fn load_profile(&self) -> Result<Option<ProfileInputs>> {
        let weight_kg = match read_decimal(self.store.as_ref(), keys::WEIGHT).await? {
            Some(value) => value,
            None => return Ok(None),
        };

        let activity_factor = read_decimal(self.store.as_ref(), keys::ACTIVITY_LEVEL)
            .await?
            .unwrap_or(0.0);
        let climate_factor = read_decimal(self.store.as_ref(), keys::CLIMATE)
            .await?
            .unwrap_or(0.0);
        let gender = match self.store.get(keys::GENDER).await? {
            Some(raw) => Gender::from_str_opt(raw.trim())
                .ok_or_else(|| TrackerError::corrupt(keys::GENDER, &raw))?,
            None => Gender::Male,
        };

        Ok(Some(ProfileInputs {
            weight_kg,
            activity_factor,
            climate_factor,
            gender,
        }))
    }

    /// Persists each profile field under its own key, unvalidated; validation
    /// happens when the target is calculated.
    pub async fn save_profile(&self, inputs: &ProfileInputs) -> Result<()> {
        self.store
            .set(keys::WEIGHT, &fmt_decimal(inputs.weight_kg))
            .await?;
        self.store
            .set(keys::ACTIVITY_LEVEL, &fmt_decimal(inputs.activity_factor))
            .await?;
        self.store
            .set(keys::CLIMATE, &fmt_decimal(inputs.climate_factor))
            .await?;
        self.store.set(keys::GENDER, inputs.gender.as_str()).await?;
        Ok(())
    }

    /// Validates and computes the target, then persists the profile, the
    /// target, the results summary, and `showResults = true`. Does NOT reset
    /// the logged amount: recalculating the target never erases progress.
    pub async fn calculate_and_store(&self, inputs: &ProfileInputs) -> Result<f64> {
        let target = compute_daily_target(inputs)?;

        self.save_profile(inputs).await?;
        self.store
            .set(keys::INDIVIDUAL_NEED, &fmt_decimal(target))
            .await?;

        let summary = WaterIntakeSummary {
            individual: format!("{target:.2}"),
        };
        let serialized = serde_json::to_string(&summary)
            .map_err(|err| crate::error::StoreError(format!("summary encoding failed: {err}")))?;
        self.store.set(keys::WATER_INTAKE, &serialized).await?;
        self.set_show_results(true).await?;

        info!("daily target computed: {target} L");
        Ok(target)
    }

    /// Last computed results summary, if a calculation has been stored.
    pub async fn water_intake_summary(&self) -> Result<Option<WaterIntakeSummary>> {
        match self.store.get(keys::WATER_INTAKE).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|_| TrackerError::corrupt(keys::WATER_INTAKE, &raw)),
            None => Ok(None),
        }
    }

    /// Manual target override from the home screen. Writes only the target
    /// key; progress and the profile are untouched.
    pub async fn override_target(&self, liters: f64) -> Result<f64> {
        if !liters.is_finite() || liters <= 0.0 {
            return Err(TrackerError::validation(
                "daily target must be a positive number of liters",
            ));
        }
        let target = round_to_2dp(liters);
        self.store
            .set(keys::INDIVIDUAL_NEED, &fmt_decimal(target))
            .await?;
        info!("daily target overridden: {target} L");
        Ok(target)
    }

    /// Profile screen state: whether results or the input form is shown.
    pub async fn set_show_results(&self, show: bool) -> Result<()> {
        self.store
            .set(keys::SHOW_RESULTS, if show { "true" } else { "false" })
            .await?;
        Ok(())
    }

    pub async fn show_results(&self) -> Result<bool> {
        match self.store.get(keys::SHOW_RESULTS).await? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|_| TrackerError::corrupt(keys::SHOW_RESULTS, &raw)),
            None => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs(weight_kg: f64, activity: f64, climate: f64, gender: Gender) -> ProfileInputs {
        ProfileInputs {
            weight_kg,
            activity_factor: activity,
            climate_factor: climate,
            gender,
        }
    }

    #[test]
    fn sedentary_female_at_70kg() {
        let target = compute_daily_target(&inputs(70.0, 0.0, 0.0, Gender::Female)).unwrap();
        assert_eq!(target, 1.40);
    }

    #[test]
    fn very_active_male_in_hot_climate_at_70kg() {
        let target = compute_daily_target(&inputs(70.0, 1.0, 0.2, Gender::Male)).unwrap();
        assert_eq!(target, 3.00);
    }

    #[test]
    fn base_need_caps_at_three_liters() {
        let light = compute_daily_target(&inputs(150.0, 0.0, 0.0, Gender::Female)).unwrap();
        let heavy = compute_daily_target(&inputs(400.0, 0.0, 0.0, Gender::Female)).unwrap();
        assert_eq!(light, 3.0);
        assert_eq!(heavy, 3.0);
    }

    #[test]
    fn result_never_exceeds_formula_maximum() {
        for weight in [40.0, 70.0, 99.5, 150.0, 400.0] {
            for activity in [0.0, 0.2, 0.4, 0.5, 1.0] {
                for climate in [0.0, 0.2] {
                    for gender in [Gender::Male, Gender::Female] {
                        let target =
                            compute_daily_target(&inputs(weight, activity, climate, gender))
                                .unwrap();
                        assert!(target >= 0.0 && target <= 4.7, "target {target} out of range");
                    }
                }
            }
        }
    }

    #[test]
    fn weight_out_of_range_is_rejected() {
        for weight in [39.9, 400.1, 500.0, f64::NAN, f64::INFINITY] {
            let err = compute_daily_target(&inputs(weight, 0.0, 0.0, Gender::Male)).unwrap_err();
            assert!(matches!(err, TrackerError::Validation(_)), "weight {weight}");
        }
    }

    #[test]
    fn oversized_factors_are_capped() {
        let target = compute_daily_target(&inputs(70.0, 5.0, 9.0, Gender::Female)).unwrap();
        assert_eq!(target, 2.6);
    }

    #[test]
    fn deterministic_for_equal_inputs() {
        let profile = inputs(83.0, 0.4, 0.2, Gender::Male);
        assert_eq!(
            compute_daily_target(&profile).unwrap(),
            compute_daily_target(&profile).unwrap()
        );
    }
}
