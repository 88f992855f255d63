use serde::{Deserialize, Serialize};

/// Currency cost of one response, derived from token counts and per-model rates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UsageResponse {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

/// Cost of `tokens` at `rate_per_million_tokens`
pub fn compute_response_cost(tokens: u64, rate_per_million_tokens: f64) -> f64 {
    tokens as f64 * (rate_per_million_tokens / 1_000_000.0)
}

/// Usage is only known when both token counts and both rates are known.
/// Anything missing yields `None` rather than a misleading zero.
pub fn calculate_usage(
    input_tokens: Option<u64>,
    output_tokens: Option<u64>,
    input_token_cost: Option<f64>,
    output_token_cost: Option<f64>,
) -> Option<UsageResponse> {
    let input_cost = compute_response_cost(input_tokens?, input_token_cost?);
    let output_cost = compute_response_cost(output_tokens?, output_token_cost?);
    Some(UsageResponse {
        input_cost,
        output_cost,
        total_cost: input_cost + output_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-12,
            "expected {expected}, got {actual}"
        );
    }

    #[test]
    fn test_compute_response_cost() {
        assert_close(compute_response_cost(1_000_000, 15.0), 15.0);
        assert_close(compute_response_cost(1_000_000, 0.3), 0.3);
        assert_eq!(compute_response_cost(0, 75.0), 0.0);
    }

    #[test]
    fn test_calculate_usage() {
        let usage = calculate_usage(Some(10), Some(5), Some(15.0), Some(75.0)).unwrap();
        assert_close(usage.input_cost, 0.00015);
        assert_close(usage.output_cost, 0.000375);
        assert_close(usage.total_cost, 0.000525);
    }

    #[test]
    fn test_calculate_usage_missing_inputs() {
        assert_eq!(calculate_usage(None, Some(5), Some(15.0), Some(75.0)), None);
        assert_eq!(calculate_usage(Some(10), None, Some(15.0), Some(75.0)), None);
        assert_eq!(calculate_usage(Some(10), Some(5), None, Some(75.0)), None);
        assert_eq!(calculate_usage(Some(10), Some(5), Some(15.0), None), None);
    }
}
