// ============================================================================
// SERVICE : FORECAST
// ============================================================================
//
// Description:
//   Générateur de prévisions de prix heuristique (pas un modèle entraîné).
//   Combine une tendance récente, un momentum type MACD (EMA12 - EMA26),
//   un rappel vers la moyenne et une perturbation aléatoire proportionnelle
//   à la volatilité observée.
//
// Points d'attention:
//   - history est ordonné du plus récent au plus ancien (ordre Twelve Data)
//   - L'aléa est injecté (Rng) : les tests passent un StdRng avec seed fixe,
//     la route un StdRng initialisé depuis l'entropie
//   - Chaque valeur prédite est bornée à [0.7, 1.5] x dernier cours pour
//     éviter la divergence de la marche aléatoire
//
// ============================================================================

use rand::Rng;
use thiserror::Error;

/// Fenêtre d'analyse : au plus 30 cours récents
const LOOKBACK: usize = 30;
const EMA_SHORT_PERIOD: usize = 12;
const EMA_LONG_PERIOD: usize = 26;
/// Nombre de pas pour la tendance récente
const TREND_STEPS: usize = 5;
/// Horizon maximal accepté : un an de pas journaliers
/// (le mapping période -> horizon plafonne déjà à 180)
pub const MAX_HORIZON: usize = 365;
const MIN_CLAMP_RATIO: f64 = 0.7;
const MAX_CLAMP_RATIO: f64 = 1.5;
/// Force du rappel vers la moyenne de la fenêtre
const MEAN_REVERSION_STRENGTH: f64 = 0.05;
/// Décroissance exponentielle du terme de tendance
const TREND_DECAY: f64 = 0.1;

#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    #[error("Insufficient historical data")]
    InsufficientData,

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub struct ForecastService;

impl ForecastService {
    /// Produit `horizon` valeurs prédites à partir de `history`
    /// (cours du plus récent au plus ancien).
    pub fn forecast<R: Rng>(
        history: &[f64],
        horizon: usize,
        rng: &mut R,
    ) -> Result<Vec<f64>, ForecastError> {
        if horizon == 0 {
            return Err(ForecastError::InvalidArgument(
                "horizon must be greater than 0".to_string(),
            ));
        }
        // L'horizon vient du corps de la requête : borné pour qu'un appel
        // public ne déclenche pas une allocation/boucle démesurée
        if horizon > MAX_HORIZON {
            return Err(ForecastError::InvalidArgument(format!(
                "horizon must not exceed {}",
                MAX_HORIZON
            )));
        }
        if history.is_empty() || history.iter().all(|v| *v == 0.0) {
            return Err(ForecastError::InsufficientData);
        }

        let latest = history[0];
        if latest <= 0.0 {
            return Err(ForecastError::InsufficientData);
        }

        // 1. Fenêtre d'analyse remise en ordre chronologique
        let window_len = history.len().min(LOOKBACK);
        let mut window: Vec<f64> = history[..window_len].to_vec();
        window.reverse();

        // 2. Momentum type MACD : EMA courte - EMA longue, normalisé
        let ema_short = ema(&window, EMA_SHORT_PERIOD);
        let ema_long = ema(&window, EMA_LONG_PERIOD);
        let momentum = (ema_short - ema_long) / latest;

        // 3. Tendance récente sur TREND_STEPS pas
        let k = TREND_STEPS.min(window.len() - 1);
        let reference = window[window.len() - 1 - k];
        let trend = if reference != 0.0 {
            (latest - reference) / reference
        } else {
            0.0
        };

        // 4. Moyenne et volatilité (écart-type) de la fenêtre
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        let variance = window
            .iter()
            .map(|v| (v - mean).powi(2))
            .sum::<f64>()
            / window.len() as f64;
        let volatility = variance.sqrt();

        // 5. Marche itérative : chaque pas part de la valeur prédite précédente
        let lower = latest * MIN_CLAMP_RATIO;
        let upper = latest * MAX_CLAMP_RATIO;

        let mut predictions = Vec::with_capacity(horizon);
        let mut previous = latest;

        for step in 1..=horizon {
            let progress = step as f64 / horizon as f64;

            let trend_term = previous * trend * (-TREND_DECAY * step as f64).exp();
            let momentum_term = previous * momentum * progress;
            let reversion_term = (mean - previous) * MEAN_REVERSION_STRENGTH;
            let noise = (rng.r#gen::<f64>() - 0.5) * volatility * progress.sqrt();

            // 6. Borne anti-divergence autour du dernier cours connu
            let predicted =
                (previous + trend_term + momentum_term + reversion_term + noise).clamp(lower, upper);

            predictions.push(predicted);
            previous = predicted;
        }

        Ok(predictions)
    }
}

/// EMA amorcée sur la première valeur.
/// Fenêtre plus courte que la période : lissage sur ce qui existe.
fn ema(values: &[f64], period: usize) -> f64 {
    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut current = values[0];

    for value in &values[1..] {
        current = value * multiplier + current * (1.0 - multiplier);
    }

    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const HISTORY: [f64; 10] = [100.0, 101.0, 99.0, 102.0, 98.0, 103.0, 97.0, 104.0, 96.0, 105.0];

    #[test]
    fn test_forecast_is_deterministic_with_fixed_seed() {
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);

        let run_a = ForecastService::forecast(&HISTORY, 5, &mut rng_a).unwrap();
        let run_b = ForecastService::forecast(&HISTORY, 5, &mut rng_b).unwrap();

        assert_eq!(run_a.len(), 5);
        assert_eq!(run_a, run_b, "same seed must produce identical forecasts");
    }

    #[test]
    fn test_forecast_stays_within_clamp_bounds() {
        // latest = 100.0 -> bornes [70, 150]
        let mut rng = StdRng::seed_from_u64(42);
        let predictions = ForecastService::forecast(&HISTORY, 5, &mut rng).unwrap();

        for predicted in predictions {
            assert!((70.0..=150.0).contains(&predicted), "out of bounds: {}", predicted);
        }
    }

    #[test]
    fn test_forecast_long_horizon_stays_bounded() {
        let mut rng = StdRng::seed_from_u64(7);
        let predictions = ForecastService::forecast(&HISTORY, 180, &mut rng).unwrap();

        assert_eq!(predictions.len(), 180);
        for predicted in predictions {
            assert!((70.0..=150.0).contains(&predicted));
        }
    }

    #[test]
    fn test_empty_history_is_insufficient() {
        let mut rng = StdRng::seed_from_u64(42);
        let err = ForecastService::forecast(&[], 5, &mut rng).unwrap_err();
        assert_eq!(err, ForecastError::InsufficientData);
    }

    #[test]
    fn test_all_zero_history_is_insufficient() {
        let mut rng = StdRng::seed_from_u64(42);
        let err = ForecastService::forecast(&[0.0, 0.0, 0.0], 5, &mut rng).unwrap_err();
        assert_eq!(err, ForecastError::InsufficientData);
    }

    #[test]
    fn test_oversized_horizon_is_invalid() {
        let mut rng = StdRng::seed_from_u64(42);

        let err = ForecastService::forecast(&HISTORY, MAX_HORIZON + 1, &mut rng).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidArgument(_)));

        let err = ForecastService::forecast(&HISTORY, 10_000_000_000, &mut rng).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidArgument(_)));

        // La borne elle-même reste acceptée
        let predictions = ForecastService::forecast(&HISTORY, MAX_HORIZON, &mut rng).unwrap();
        assert_eq!(predictions.len(), MAX_HORIZON);
    }

    #[test]
    fn test_zero_horizon_is_invalid() {
        let mut rng = StdRng::seed_from_u64(42);
        let err = ForecastService::forecast(&HISTORY, 0, &mut rng).unwrap_err();
        assert!(matches!(err, ForecastError::InvalidArgument(_)));
    }

    #[test]
    fn test_single_sample_history_works() {
        let mut rng = StdRng::seed_from_u64(42);
        let predictions = ForecastService::forecast(&[250.0], 3, &mut rng).unwrap();

        assert_eq!(predictions.len(), 3);
        for predicted in predictions {
            assert!((175.0..=375.0).contains(&predicted));
        }
    }
}
